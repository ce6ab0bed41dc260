//! Minecraft server download table
//!
//! Maps a server version to the immutable download URL of its
//! `server.jar`. Add a row to support a new version. Looking up a version
//! that is not in the table fails; there is no fallback.

use thiserror::Error;

/// Version used when the configuration does not name one
pub const DEFAULT_VERSION: &str = "1.19.2";

/// Version -> `server.jar` URL, sorted by version
const DOWNLOAD_URLS: &[(&str, &str)] = &[
    (
        "1.19.2",
        "https://piston-data.mojang.com/v1/objects/f69c284232d7c7580bd89a5a4931c3581eae1378/server.jar",
    ),
];

/// Requested version has no download URL
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown Minecraft version '{version}' (known: {})", known().join(", "))]
pub struct UnknownVersion {
    pub version: String,
}

/// Download URL for a server version
pub fn download_url(version: &str) -> Result<&'static str, UnknownVersion> {
    DOWNLOAD_URLS
        .iter()
        .find(|(v, _)| *v == version)
        .map(|(_, url)| *url)
        .ok_or_else(|| UnknownVersion {
            version: version.to_string(),
        })
}

/// All supported versions
pub fn known() -> Vec<&'static str> {
    DOWNLOAD_URLS.iter().map(|(v, _)| *v).collect()
}

/// All table rows
pub fn entries() -> &'static [(&'static str, &'static str)] {
    DOWNLOAD_URLS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_version_is_known() {
        assert!(download_url(DEFAULT_VERSION).is_ok());
    }

    #[test]
    fn test_lookup_exact_url() {
        assert_eq!(
            download_url("1.19.2").unwrap(),
            "https://piston-data.mojang.com/v1/objects/f69c284232d7c7580bd89a5a4931c3581eae1378/server.jar"
        );
    }

    #[test]
    fn test_unknown_version() {
        let err = download_url("bogus").unwrap_err();
        assert_eq!(err.version, "bogus");
        assert!(err.to_string().contains("1.19.2"));
    }

    #[test]
    fn test_table_has_unique_versions() {
        let mut versions = known();
        let count = versions.len();
        versions.dedup();
        assert_eq!(versions.len(), count);
    }
}
