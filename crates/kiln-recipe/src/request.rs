use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("failed to read request file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse request: {0}")]
    ParseToml(#[from] toml::de::Error),
    #[error("empty spec token")]
    EmptyToken,
    #[error("malformed spec token: '{0}' (expected +name, ~name, name=value, or @version)")]
    MalformedToken(String),
    #[error("duplicate override for variant '{0}'")]
    DuplicateOverride(String),
    #[error("version requested more than once: '{0}'")]
    DuplicateVersion(String),
}

/// A single variant override requested by the user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum VariantOverride {
    Bool(bool),
    Value(String),
}

/// A build request: which version to build and which variants to override.
///
/// Parsed from a TOML request file and/or assembled from CLI spec tokens.
/// Unresolved: defaults are applied later against the descriptor.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct BuildRequest {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub variants: BTreeMap<String, VariantOverride>,
}

impl BuildRequest {
    /// Merge CLI spec tokens over this request. Tokens win over file entries;
    /// conflicting tokens within one invocation are an error.
    pub fn apply_spec_tokens(&mut self, tokens: &[String]) -> Result<(), RequestError> {
        let parsed = parse_spec_tokens(tokens)?;
        if let Some(version) = parsed.version {
            self.version = Some(version);
        }
        for (name, value) in parsed.variants {
            self.variants.insert(name, value);
        }
        Ok(())
    }
}

pub fn parse_request_str(input: &str) -> Result<BuildRequest, RequestError> {
    Ok(toml::from_str(input)?)
}

pub fn parse_request_file(path: impl AsRef<Path>) -> Result<BuildRequest, RequestError> {
    let content = fs::read_to_string(path)?;
    parse_request_str(&content)
}

/// Parse CLI spec tokens: `+name` enables, `~name` disables, `name=value`
/// selects an enumerated value, `@version` picks a registry version.
pub fn parse_spec_tokens(tokens: &[String]) -> Result<BuildRequest, RequestError> {
    let mut request = BuildRequest::default();
    for token in tokens {
        let token = token.trim();
        if token.is_empty() {
            return Err(RequestError::EmptyToken);
        }
        if let Some(version) = token.strip_prefix('@') {
            if version.is_empty() {
                return Err(RequestError::MalformedToken(token.to_owned()));
            }
            if let Some(previous) = &request.version {
                if previous != version {
                    return Err(RequestError::DuplicateVersion(token.to_owned()));
                }
            }
            request.version = Some(version.to_owned());
            continue;
        }

        let (name, value) = if let Some(name) = token.strip_prefix('+') {
            (name, VariantOverride::Bool(true))
        } else if let Some(name) = token.strip_prefix('~') {
            (name, VariantOverride::Bool(false))
        } else if let Some((name, value)) = token.split_once('=') {
            if value.is_empty() {
                return Err(RequestError::MalformedToken(token.to_owned()));
            }
            (name, VariantOverride::Value(value.to_owned()))
        } else {
            return Err(RequestError::MalformedToken(token.to_owned()));
        };

        if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(RequestError::MalformedToken(token.to_owned()));
        }
        if request.variants.insert(name.to_owned(), value).is_some() {
            return Err(RequestError::DuplicateOverride(name.to_owned()));
        }
    }
    Ok(request)
}
