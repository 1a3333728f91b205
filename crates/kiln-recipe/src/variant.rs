use crate::platform::Platform;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One user-configurable build toggle declared by a descriptor.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Variant {
    pub name: &'static str,
    pub description: &'static str,
    pub kind: VariantKind,
}

/// Value domain of a variant: boolean or an enumerated string set.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase", tag = "domain")]
pub enum VariantKind {
    Bool { default: BoolDefault },
    Enum { default: &'static str, values: &'static [&'static str] },
}

/// Default of a boolean variant, possibly conditioned on the platform.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BoolDefault {
    Fixed(bool),
    /// True only on the named platforms, false elsewhere.
    OnPlatforms(&'static [Platform]),
}

/// Concrete value of one resolved variant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum VariantValue {
    Bool(bool),
    Str(String),
}

impl Variant {
    /// Resolve the variant's default for the given platform.
    pub fn default_value(&self, platform: Platform) -> VariantValue {
        match self.kind {
            VariantKind::Bool { default: BoolDefault::Fixed(v) } => VariantValue::Bool(v),
            VariantKind::Bool { default: BoolDefault::OnPlatforms(platforms) } => {
                VariantValue::Bool(platforms.contains(&platform))
            }
            VariantKind::Enum { default, .. } => VariantValue::Str(default.to_owned()),
        }
    }

    pub fn is_bool(&self) -> bool {
        matches!(self.kind, VariantKind::Bool { .. })
    }

    /// Whether `value` lies in this variant's enumerated domain.
    /// Always false for boolean variants.
    pub fn allows(&self, value: &str) -> bool {
        match self.kind {
            VariantKind::Bool { .. } => false,
            VariantKind::Enum { values, .. } => values.contains(&value),
        }
    }
}

impl VariantValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            VariantValue::Bool(b) => Some(*b),
            VariantValue::Str(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            VariantValue::Bool(_) => None,
            VariantValue::Str(s) => Some(s),
        }
    }
}

impl fmt::Display for VariantValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariantValue::Bool(b) => write!(f, "{b}"),
            VariantValue::Str(s) => f.write_str(s),
        }
    }
}
