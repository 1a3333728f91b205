use serde::Serialize;
use std::fmt;

/// When a dependency edge participates in the build.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DependKind {
    /// Needed at build time only (e.g. the build-graph generator).
    Build,
    /// Needed to build and link against.
    Link,
}

/// Activation predicate over resolved variant state.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum When {
    /// Active only when the named boolean variant resolved to true.
    Enabled(&'static str),
}

/// A declared edge to an external package, optionally version-constrained
/// and optionally gated on variant state. Constraint satisfaction is the
/// host engine's job; this layer only declares the edge.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct DependencyEdge {
    pub package: &'static str,
    /// Version constraint in host syntax, e.g. "@3.7:3.9" (inclusive range)
    /// or "@8.0:" (minimum). None means any version.
    pub constraint: Option<&'static str>,
    /// Settings requested of the dependency itself, e.g. "targets=all".
    pub settings: Option<&'static str>,
    pub kind: DependKind,
    pub when: Option<When>,
}

impl DependencyEdge {
    pub const fn unconditional(package: &'static str) -> Self {
        Self { package, constraint: None, settings: None, kind: DependKind::Link, when: None }
    }

    pub const fn versioned(package: &'static str, constraint: &'static str) -> Self {
        Self {
            constraint: Some(constraint),
            ..Self::unconditional(package)
        }
    }

    pub const fn build_only(package: &'static str) -> Self {
        Self {
            kind: DependKind::Build,
            ..Self::unconditional(package)
        }
    }

    pub const fn when_enabled(package: &'static str, variant: &'static str) -> Self {
        Self {
            when: Some(When::Enabled(variant)),
            ..Self::unconditional(package)
        }
    }

    pub const fn versioned_when_enabled(
        package: &'static str,
        constraint: &'static str,
        variant: &'static str,
    ) -> Self {
        Self {
            constraint: Some(constraint),
            ..Self::when_enabled(package, variant)
        }
    }

    pub const fn with_settings(self, settings: &'static str) -> Self {
        Self { settings: Some(settings), ..self }
    }
}

impl fmt::Display for DependencyEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.package)?;
        if let Some(constraint) = self.constraint {
            write!(f, "{constraint}")?;
        }
        if let Some(settings) = self.settings {
            write!(f, " {settings}")?;
        }
        if matches!(self.kind, DependKind::Build) {
            write!(f, " [build]")?;
        }
        if let Some(When::Enabled(variant)) = self.when {
            write!(f, " when +{variant}")?;
        }
        Ok(())
    }
}

/// A declared toolchain conflict, surfaced by the host with a fixed message.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Conflict {
    pub compiler: &'static str,
    /// Major versions up to and including this one are rejected.
    pub max_major: u32,
    pub message: &'static str,
}

impl Conflict {
    /// Whether the given compiler and major version hit this conflict.
    pub fn matches(&self, compiler: &str, major: u32) -> bool {
        self.compiler == compiler && major <= self.max_major
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_renders_constraint_kind_and_predicate() {
        let edge = DependencyEdge::versioned_when_enabled("cuda", "@8.0:", "cuda");
        assert_eq!(edge.to_string(), "cuda@8.0: when +cuda");

        let build = DependencyEdge::build_only("ninja");
        assert_eq!(build.to_string(), "ninja [build]");

        let llvm = DependencyEdge::when_enabled("llvm", "llvm").with_settings("targets=all");
        assert_eq!(llvm.to_string(), "llvm targets=all when +llvm");
    }

    #[test]
    fn conflict_matches_old_series_only() {
        let c = Conflict {
            compiler: "gcc",
            max_major: 5,
            message: "C++14 support is required to build tvm",
        };
        assert!(c.matches("gcc", 4));
        assert!(c.matches("gcc", 5));
        assert!(!c.matches("gcc", 6));
        assert!(!c.matches("clang", 4));
    }
}
