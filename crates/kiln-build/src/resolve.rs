use crate::BuildError;
use kiln_recipe::{
    BuildRequest, Descriptor, Platform, Variant, VariantKind, VariantOverride, VariantValue,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Concrete value for every declared variant of one build invocation.
///
/// Sorted map so that serialization and identity hashing are deterministic
/// regardless of declaration or override order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct ResolvedVariants {
    values: BTreeMap<String, VariantValue>,
}

impl ResolvedVariants {
    pub fn value(&self, name: &str) -> Option<&VariantValue> {
        self.values.get(name)
    }

    /// Whether a boolean variant resolved to true. False for enum variants
    /// and undeclared names.
    pub fn enabled(&self, name: &str) -> bool {
        matches!(self.values.get(name), Some(VariantValue::Bool(true)))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &VariantValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn into_map(self) -> BTreeMap<String, VariantValue> {
        self.values
    }
}

/// Resolve every declared variant: apply the request's overrides where given,
/// fall back to the (platform-conditioned) default otherwise.
///
/// Rejects unknown variant names, enum values outside the declared set, and
/// overrides whose shape does not match the variant's domain. Nothing
/// malformed reaches the flag translator.
pub fn resolve_variants(
    descriptor: &Descriptor,
    request: &BuildRequest,
    platform: Platform,
) -> Result<ResolvedVariants, BuildError> {
    for name in request.variants.keys() {
        if descriptor.variant(name).is_none() {
            return Err(BuildError::UnknownVariant(name.clone()));
        }
    }

    let mut values = BTreeMap::new();
    for variant in descriptor.variants {
        let value = match request.variants.get(variant.name) {
            Some(overridden) => check_override(variant, overridden)?,
            None => variant.default_value(platform),
        };
        values.insert(variant.name.to_owned(), value);
    }

    debug!(platform = %platform, count = values.len(), "resolved variants");
    Ok(ResolvedVariants { values })
}

fn check_override(
    variant: &Variant,
    overridden: &VariantOverride,
) -> Result<VariantValue, BuildError> {
    match (&variant.kind, overridden) {
        (VariantKind::Bool { .. }, VariantOverride::Bool(v)) => Ok(VariantValue::Bool(*v)),
        (VariantKind::Bool { .. }, VariantOverride::Value(_)) => {
            Err(BuildError::BoolVariantGivenValue(variant.name.to_owned()))
        }
        (VariantKind::Enum { .. }, VariantOverride::Bool(_)) => {
            Err(BuildError::EnumVariantToggled(variant.name.to_owned()))
        }
        (VariantKind::Enum { values, .. }, VariantOverride::Value(v)) => {
            if variant.allows(v) {
                Ok(VariantValue::Str(v.clone()))
            } else {
                Err(BuildError::ValueOutOfDomain {
                    variant: variant.name.to_owned(),
                    value: v.clone(),
                    allowed: values.join(", "),
                })
            }
        }
    }
}
