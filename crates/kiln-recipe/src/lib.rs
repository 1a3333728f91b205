//! Package descriptor schema for kiln.
//!
//! This crate defines the declarative side of a build recipe: the version
//! registry (`VersionEntry`), user-configurable build toggles (`Variant`),
//! conditional dependency edges (`DependencyEdge`), toolchain conflicts,
//! and the build request surface (TOML file plus `+variant` spec strings).
//! The built-in descriptor (`Descriptor::tvm`) carries the recipe for the
//! Apache TVM machine-learning compiler framework.

pub mod depend;
pub mod descriptor;
pub mod platform;
pub mod request;
pub mod types;
pub mod variant;
pub mod version;

pub use depend::{Conflict, DependKind, DependencyEdge, When};
pub use descriptor::{Descriptor, DescriptorError};
pub use platform::{Platform, PlatformError};
pub use request::{
    parse_request_file, parse_request_str, parse_spec_tokens, BuildRequest, RequestError,
    VariantOverride,
};
pub use types::{PlanId, ShortId};
pub use variant::{BoolDefault, Variant, VariantKind, VariantValue};
pub use version::{VersionEntry, VersionSource};
