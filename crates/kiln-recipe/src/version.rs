use serde::Serialize;

/// Where one fetchable version of the package comes from.
///
/// Archive entries carry the integrity hash the host fetch step verifies;
/// branch entries track a moving ref and have nothing to verify.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase", tag = "kind")]
pub enum VersionSource {
    Archive {
        /// Hex SHA-256 digest of the release tarball.
        sha256: &'static str,
    },
    Branch {
        name: &'static str,
    },
}

/// One fetchable release or branch in the version registry.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct VersionEntry {
    pub id: &'static str,
    pub source: VersionSource,
}

impl VersionEntry {
    pub fn is_branch(&self) -> bool {
        matches!(self.source, VersionSource::Branch { .. })
    }

    pub fn sha256(&self) -> Option<&'static str> {
        match self.source {
            VersionSource::Archive { sha256 } => Some(sha256),
            VersionSource::Branch { .. } => None,
        }
    }
}

/// Substitute a version id into a download URL template.
///
/// Every `{version}` occurrence in the template is replaced.
pub fn substitute_url(template: &str, version: &str) -> String {
    template.replace("{version}", version)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_all_occurrences() {
        let url = substitute_url("https://example.com/v{version}/pkg-{version}.tar.gz", "0.8.0");
        assert_eq!(url, "https://example.com/v0.8.0/pkg-0.8.0.tar.gz");
    }

    #[test]
    fn template_without_placeholder_is_unchanged() {
        assert_eq!(substitute_url("https://example.com/pkg.tar.gz", "1.0"), "https://example.com/pkg.tar.gz");
    }

    #[test]
    fn branch_entry_has_no_hash() {
        let entry = VersionEntry {
            id: "main",
            source: VersionSource::Branch { name: "main" },
        };
        assert!(entry.is_branch());
        assert_eq!(entry.sha256(), None);
    }

    #[test]
    fn archive_entry_exposes_hash() {
        let entry = VersionEntry {
            id: "0.8.0",
            source: VersionSource::Archive { sha256: "abc123" },
        };
        assert!(!entry.is_branch());
        assert_eq!(entry.sha256(), Some("abc123"));
    }
}
