use crate::depend::{Conflict, DependKind, DependencyEdge, When};
use crate::platform::Platform;
use crate::variant::{BoolDefault, Variant, VariantKind};
use crate::version::{substitute_url, VersionEntry, VersionSource};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error("duplicate variant declaration: '{0}'")]
    DuplicateVariant(String),
    #[error("duplicate version declaration: '{0}'")]
    DuplicateVersion(String),
    #[error("version '{0}' is an archive but carries no integrity hash")]
    MissingHash(String),
    #[error("version '{version}' has a malformed integrity hash: '{hash}'")]
    MalformedHash { version: String, hash: String },
    #[error("enum variant '{variant}' defaults to '{default}', which is outside its value set")]
    DefaultOutOfDomain { variant: String, default: String },
    #[error("dependency '{package}' is gated on undeclared variant '{variant}'")]
    UnknownPredicateVariant { package: String, variant: String },
    #[error("dependency '{package}' is gated on non-boolean variant '{variant}'")]
    PredicateOnEnumVariant { package: String, variant: String },
    #[error("{0}")]
    ToolchainConflict(String),
}

/// A complete, immutable build-recipe declaration for one package.
///
/// Constructed once (the built-in tables below) and never mutated; the host
/// engine reads it, resolves variants against a request, and hands the
/// resulting configure arguments to the external build system.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Descriptor {
    pub name: &'static str,
    pub homepage: &'static str,
    /// Git URL for branch-sourced versions.
    pub git: &'static str,
    /// Release tarball URL template with `{version}` placeholders.
    pub url_template: &'static str,
    /// Generator handed to the external build-configuration step.
    pub generator: &'static str,
    /// Relative path of the language-bindings subtree copied after install.
    pub bindings_subdir: &'static str,
    pub versions: &'static [VersionEntry],
    pub variants: &'static [Variant],
    pub dependencies: &'static [DependencyEdge],
    pub conflicts: &'static [Conflict],
}

/// Build recipe for the Apache TVM machine-learning compiler framework.
pub const TVM: Descriptor = Descriptor {
    name: "tvm",
    homepage: "https://tvm.apache.org/",
    git: "https://github.com/apache/tvm.git",
    url_template:
        "https://github.com/apache/tvm/releases/download/v{version}/apache-tvm-src-v{version}.tar.gz",
    generator: "Ninja",
    bindings_subdir: "python",
    versions: &[
        VersionEntry { id: "main", source: VersionSource::Branch { name: "main" } },
        VersionEntry {
            id: "0.8.0",
            source: VersionSource::Archive {
                sha256: "519fe65d27ca5f67c571ead2f5254d800890dc09baa3cd3a41142166de30a8c7",
            },
        },
        VersionEntry {
            id: "0.7.0",
            source: VersionSource::Archive {
                sha256: "3a9906ac76adc9923b02832c53eea62ebaed0564ff80febff21c71da5a118",
            },
        },
        VersionEntry {
            id: "0.6.1",
            source: VersionSource::Archive {
                sha256: "288d4d4413b4a179f01b86ba3c676840fe1cc472f0581c5489f6ab6736d6e012",
            },
        },
        VersionEntry {
            id: "0.6.0",
            source: VersionSource::Archive {
                sha256: "bc83bbe87ecafbb047645a643534f845477def2b07121dd5139578a469fee5d7",
            },
        },
    ],
    variants: &[
        Variant {
            name: "cuda",
            description: "Build with CUDA enabled",
            kind: VariantKind::Bool { default: BoolDefault::Fixed(false) },
        },
        Variant {
            name: "llvm",
            description: "Build with llvm support",
            kind: VariantKind::Bool { default: BoolDefault::Fixed(true) },
        },
        Variant {
            name: "libbacktrace",
            description: "Build with line and column information on stack traces",
            kind: VariantKind::Bool {
                default: BoolDefault::OnPlatforms(&[Platform::Linux, Platform::Darwin]),
            },
        },
        Variant {
            name: "rocm",
            description: "Build with ROCM runtime enabled",
            kind: VariantKind::Bool { default: BoolDefault::Fixed(false) },
        },
        Variant {
            name: "sdaccel",
            description: "Build with SDAccel runtime enabled",
            kind: VariantKind::Bool { default: BoolDefault::Fixed(false) },
        },
        Variant {
            name: "aocl",
            description: "Build with Intel FPGA SDK for OpenCL (AOCL) runtime enabled",
            kind: VariantKind::Bool { default: BoolDefault::Fixed(false) },
        },
        Variant {
            name: "opencl",
            description: "Build with OpenCL runtime enabled",
            kind: VariantKind::Bool { default: BoolDefault::Fixed(false) },
        },
        Variant {
            name: "metal",
            description: "Build with Metal runtime enabled",
            kind: VariantKind::Bool { default: BoolDefault::OnPlatforms(&[Platform::Darwin]) },
        },
        Variant {
            name: "opengl",
            description: "Build with OpenGL runtime enabled",
            kind: VariantKind::Bool { default: BoolDefault::Fixed(false) },
        },
        Variant {
            name: "micro",
            description: "Build with MicroTVM runtime enabled",
            kind: VariantKind::Bool { default: BoolDefault::Fixed(false) },
        },
        Variant {
            name: "rpc",
            description: "Build with RPC runtime enabled",
            kind: VariantKind::Bool { default: BoolDefault::Fixed(true) },
        },
        Variant {
            name: "cpp_rpc",
            description: "Build with C++ RPC runtime enabled",
            kind: VariantKind::Bool { default: BoolDefault::Fixed(false) },
        },
        Variant {
            name: "ios_rpc",
            description: "Build with iOS RPC runtime enabled",
            kind: VariantKind::Bool { default: BoolDefault::Fixed(false) },
        },
        Variant {
            name: "build_type",
            description: "CMake build type",
            kind: VariantKind::Enum {
                default: "Release",
                values: &["Debug", "Release", "RelWithDebInfo", "MinSizeRel"],
            },
        },
    ],
    dependencies: &[
        DependencyEdge::build_only("ninja"),
        DependencyEdge::when_enabled("llvm", "llvm").with_settings("targets=all"),
        DependencyEdge::when_enabled("rocm-cmake", "rocm"),
        DependencyEdge::when_enabled("hip", "rocm"),
        DependencyEdge::when_enabled("opencl", "opencl"),
        DependencyEdge::when_enabled("opengl", "opengl"),
        DependencyEdge::versioned("python", "@3.7:3.9"),
        DependencyEdge::versioned("cmake", "@3.5:"),
        DependencyEdge::unconditional("ncurses").with_settings("+termlib"),
        DependencyEdge::unconditional("libedit"),
        DependencyEdge::unconditional("libxml2"),
        DependencyEdge::unconditional("py-setuptools"),
        DependencyEdge::unconditional("py-cython"),
        DependencyEdge::unconditional("py-decorator"),
        DependencyEdge::unconditional("py-psutil"),
        DependencyEdge::unconditional("py-scipy"),
        DependencyEdge::unconditional("py-numpy"),
        DependencyEdge::versioned_when_enabled("cuda", "@8.0:", "cuda"),
    ],
    conflicts: &[Conflict {
        compiler: "gcc",
        max_major: 5,
        message: "C++14 support is required to build tvm",
    }],
};

impl Descriptor {
    /// The built-in TVM recipe.
    pub fn tvm() -> &'static Descriptor {
        &TVM
    }

    /// Check the descriptor's internal invariants: unique names, archive
    /// hashes present and well-formed, enum defaults in domain, predicates
    /// referencing declared boolean variants.
    pub fn validate(&self) -> Result<(), DescriptorError> {
        let mut version_ids: Vec<&str> = self.versions.iter().map(|v| v.id).collect();
        version_ids.sort_unstable();
        for pair in version_ids.windows(2) {
            if pair[0] == pair[1] {
                return Err(DescriptorError::DuplicateVersion(pair[0].to_owned()));
            }
        }

        for entry in self.versions {
            if let VersionSource::Archive { sha256 } = entry.source {
                if sha256.is_empty() {
                    return Err(DescriptorError::MissingHash(entry.id.to_owned()));
                }
                if !sha256.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()) {
                    return Err(DescriptorError::MalformedHash {
                        version: entry.id.to_owned(),
                        hash: sha256.to_owned(),
                    });
                }
            }
        }

        let mut names: Vec<&str> = self.variants.iter().map(|v| v.name).collect();
        names.sort_unstable();
        for pair in names.windows(2) {
            if pair[0] == pair[1] {
                return Err(DescriptorError::DuplicateVariant(pair[0].to_owned()));
            }
        }

        for variant in self.variants {
            if let VariantKind::Enum { default, values } = variant.kind {
                if !values.contains(&default) {
                    return Err(DescriptorError::DefaultOutOfDomain {
                        variant: variant.name.to_owned(),
                        default: default.to_owned(),
                    });
                }
            }
        }

        for edge in self.dependencies {
            if let Some(When::Enabled(name)) = edge.when {
                match self.variant(name) {
                    None => {
                        return Err(DescriptorError::UnknownPredicateVariant {
                            package: edge.package.to_owned(),
                            variant: name.to_owned(),
                        })
                    }
                    Some(v) if !v.is_bool() => {
                        return Err(DescriptorError::PredicateOnEnumVariant {
                            package: edge.package.to_owned(),
                            variant: name.to_owned(),
                        })
                    }
                    Some(_) => {}
                }
            }
        }

        Ok(())
    }

    pub fn version(&self, id: &str) -> Option<&'static VersionEntry> {
        self.versions.iter().find(|v| v.id == id)
    }

    /// The version built when the request names none: the newest archive
    /// release (branches are never picked implicitly).
    pub fn default_version(&self) -> &'static VersionEntry {
        self.versions
            .iter()
            .find(|v| !v.is_branch())
            .unwrap_or(&self.versions[0])
    }

    /// Download URL for an archive version; None for branch refs.
    pub fn archive_url(&self, entry: &VersionEntry) -> Option<String> {
        match entry.source {
            VersionSource::Archive { .. } => Some(substitute_url(self.url_template, entry.id)),
            VersionSource::Branch { .. } => None,
        }
    }

    pub fn variant(&self, name: &str) -> Option<&'static Variant> {
        self.variants.iter().find(|v| v.name == name)
    }

    /// Dependency edges active under the given variant state, in declaration
    /// order. `enabled` answers whether a boolean variant resolved to true.
    pub fn active_dependencies(
        &self,
        enabled: impl Fn(&str) -> bool,
    ) -> Vec<&'static DependencyEdge> {
        self.dependencies
            .iter()
            .filter(|edge| match edge.when {
                None => true,
                Some(When::Enabled(variant)) => enabled(variant),
            })
            .collect()
    }

    /// Reject toolchains this recipe declares a conflict with.
    pub fn check_toolchain(&self, compiler: &str, major: u32) -> Result<(), DescriptorError> {
        for conflict in self.conflicts {
            if conflict.matches(compiler, major) {
                return Err(DescriptorError::ToolchainConflict(conflict.message.to_owned()));
            }
        }
        Ok(())
    }

    /// Build-time-only dependency edges (informational; the host scopes them).
    pub fn build_dependencies(&self) -> impl Iterator<Item = &'static DependencyEdge> {
        self.dependencies
            .iter()
            .filter(|e| matches!(e.kind, DependKind::Build))
    }
}
