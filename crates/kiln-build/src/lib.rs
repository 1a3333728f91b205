//! Build engine for kiln recipes.
//!
//! Takes a descriptor plus a build request and produces everything the host
//! hands to the external build system: resolved variant state (`resolve`),
//! the ordered configure defines (`flags`), a concretized plan file with a
//! deterministic identity (`plan`), and the post-install bindings copy
//! (`hooks`).

pub mod flags;
pub mod hooks;
pub mod plan;
pub mod resolve;

pub use flags::{configure_args, effective, Define, DefineValue, DependencyPrefixes};
pub use hooks::install_bindings;
pub use plan::{BuildPlan, PlanError, PlannedDependency};
pub use resolve::{resolve_variants, ResolvedVariants};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("descriptor error: {0}")]
    Descriptor(#[from] kiln_recipe::DescriptorError),
    #[error("request error: {0}")]
    Request(#[from] kiln_recipe::RequestError),
    #[error("platform error: {0}")]
    Platform(#[from] kiln_recipe::PlatformError),
    #[error("plan error: {0}")]
    Plan(#[from] plan::PlanError),
    #[error("unknown variant in request: '{0}'")]
    UnknownVariant(String),
    #[error("variant '{variant}' does not accept value '{value}' (allowed: {allowed})")]
    ValueOutOfDomain {
        variant: String,
        value: String,
        allowed: String,
    },
    #[error("variant '{0}' is boolean; use +{0} or ~{0}, not a value")]
    BoolVariantGivenValue(String),
    #[error("variant '{0}' is enumerated; it cannot be toggled with +/~")]
    EnumVariantToggled(String),
    #[error("unknown version in request: '{0}'")]
    UnknownVersion(String),
    #[error("bindings subtree not found: {}", .0.display())]
    BindingsMissing(std::path::PathBuf),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
