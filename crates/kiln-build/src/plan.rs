use crate::flags::Define;
use crate::resolve::ResolvedVariants;
use crate::BuildError;
use kiln_recipe::{Descriptor, DependKind, DependencyEdge, Platform, PlanId, ShortId, VariantValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("plan file I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("plan file parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("plan file serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("plan_id mismatch: plan has '{plan_id}', recomputed '{computed_id}'")]
    PlanIdMismatch {
        plan_id: kiln_recipe::PlanId,
        computed_id: kiln_recipe::PlanId,
    },
    #[error("unsupported plan_version: {0}, expected 1")]
    UnsupportedVersion(u32),
}

/// A dependency edge as recorded in a concretized plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlannedDependency {
    pub package: String,
    #[serde(default)]
    pub constraint: Option<String>,
    #[serde(default)]
    pub settings: Option<String>,
    pub build_only: bool,
}

impl From<&DependencyEdge> for PlannedDependency {
    fn from(edge: &DependencyEdge) -> Self {
        Self {
            package: edge.package.to_owned(),
            constraint: edge.constraint.map(str::to_owned),
            settings: edge.settings.map(str::to_owned),
            build_only: matches!(edge.kind, DependKind::Build),
        }
    }
}

/// The concretization record of one build invocation.
///
/// The plan_id is computed deterministically from the concretized fields:
/// same package, version, platform, variants, dependencies, and configure
/// arguments always hash to the same identity. `created_at` is excluded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BuildPlan {
    pub plan_version: u32,
    pub plan_id: PlanId,
    pub short_id: ShortId,

    pub package: String,
    pub version: String,
    /// Release tarball URL; absent for branch-sourced versions.
    #[serde(default)]
    pub source_url: Option<String>,
    /// Git branch name; absent for archive versions.
    #[serde(default)]
    pub branch: Option<String>,
    /// Integrity hash the host fetch step verifies; absent for branches.
    #[serde(default)]
    pub sha256: Option<String>,

    pub platform: Platform,
    pub generator: String,
    pub created_at: String,
    /// Rendered configure arguments, in emission order.
    pub configure_args: Vec<String>,

    pub variants: BTreeMap<String, VariantValue>,
    pub dependencies: Vec<PlannedDependency>,
}

impl BuildPlan {
    /// Concretize a resolved build into a plan.
    ///
    /// The version id must name a registry entry; a plan without a fetchable
    /// source is never produced.
    pub fn from_resolved(
        descriptor: &Descriptor,
        version_id: &str,
        resolved: &ResolvedVariants,
        platform: Platform,
        args: &[Define],
    ) -> Result<Self, BuildError> {
        let entry = descriptor
            .version(version_id)
            .ok_or_else(|| BuildError::UnknownVersion(version_id.to_owned()))?;
        let (source_url, branch, sha256) = if entry.is_branch() {
            (None, Some(entry.id.to_owned()), None)
        } else {
            (
                descriptor.archive_url(entry),
                None,
                entry.sha256().map(str::to_owned),
            )
        };

        let dependencies: Vec<PlannedDependency> = descriptor
            .active_dependencies(|name| resolved.enabled(name))
            .into_iter()
            .map(PlannedDependency::from)
            .collect();

        let plan = BuildPlan {
            plan_version: 1,
            plan_id: PlanId::new(""), // computed below
            short_id: ShortId::new(""),
            package: descriptor.name.to_owned(),
            version: version_id.to_owned(),
            source_url,
            branch,
            sha256,
            platform,
            generator: descriptor.generator.to_owned(),
            created_at: chrono::Utc::now().to_rfc3339(),
            configure_args: args.iter().map(|d| d.to_arg()).collect(),
            variants: resolved.clone().into_map(),
            dependencies,
        };

        let (plan_id, short_id) = plan.compute_identity();
        Ok(BuildPlan { plan_id, short_id, ..plan })
    }

    /// Compute the plan identity from the concretized state.
    ///
    /// Hashes only resolved data; the creation timestamp never participates.
    pub fn compute_identity(&self) -> (PlanId, ShortId) {
        let mut hasher = blake3::Hasher::new();

        hasher.update(format!("package:{}@{}", self.package, self.version).as_bytes());
        if let Some(url) = &self.source_url {
            hasher.update(format!("source:{url}").as_bytes());
        }
        if let Some(branch) = &self.branch {
            hasher.update(format!("branch:{branch}").as_bytes());
        }
        if let Some(sha256) = &self.sha256 {
            hasher.update(format!("sha256:{sha256}").as_bytes());
        }
        hasher.update(format!("platform:{}", self.platform).as_bytes());
        hasher.update(format!("generator:{}", self.generator).as_bytes());

        // BTreeMap iteration is sorted, keeping the hash order-independent
        // of how overrides arrived.
        for (name, value) in &self.variants {
            hasher.update(format!("variant:{name}={value}").as_bytes());
        }
        for dep in &self.dependencies {
            hasher.update(
                format!(
                    "dep:{}:{}:{}:{}",
                    dep.package,
                    dep.constraint.as_deref().unwrap_or(""),
                    dep.settings.as_deref().unwrap_or(""),
                    dep.build_only
                )
                .as_bytes(),
            );
        }
        for arg in &self.configure_args {
            hasher.update(format!("arg:{arg}").as_bytes());
        }

        let hex = hasher.finalize().to_hex().to_string();
        let short = ShortId::new(&hex[..12]);
        (PlanId::new(hex), short)
    }

    /// Verify that the stored plan_id matches the recomputed identity.
    pub fn verify_integrity(&self) -> Result<(), PlanError> {
        if self.plan_version != 1 {
            return Err(PlanError::UnsupportedVersion(self.plan_version));
        }
        let (computed_id, _) = self.compute_identity();
        if self.plan_id != computed_id {
            return Err(PlanError::PlanIdMismatch {
                plan_id: self.plan_id.clone(),
                computed_id,
            });
        }
        Ok(())
    }

    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<(), PlanError> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)?;
        let dir = path.parent().unwrap_or(Path::new("."));
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        std::io::Write::write_all(&mut tmp, content.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| PlanError::Io(e.error))?;
        // Fsync parent directory to ensure rename durability on power loss.
        if let Ok(f) = fs::File::open(dir) {
            let _ = f.sync_all();
        }
        Ok(())
    }

    pub fn read_from_file(path: impl AsRef<Path>) -> Result<Self, PlanError> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }
}
