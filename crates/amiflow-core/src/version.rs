//! pcluster version guard

use crate::error::{BuildError, Result};
use crate::service::ImageBuildService;

/// Fail unless `expected` is a substring of `installed`
pub fn check_version(expected: &str, installed: &str) -> Result<()> {
    if installed.contains(expected) {
        Ok(())
    } else {
        Err(BuildError::VersionMismatch {
            expected: expected.to_string(),
            installed: installed.to_string(),
        })
    }
}

/// Compare `expected` against the version the build service reports
pub async fn ensure_version(builds: &dyn ImageBuildService, expected: &str) -> Result<String> {
    let installed = builds.installed_version().await?;
    tracing::debug!("Installed {} version: {}", builds.name(), installed);
    check_version(expected, &installed)?;
    Ok(installed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::FakeBuilds;

    #[test]
    fn test_substring_match() {
        assert!(check_version("3.2", "3.2.1").is_ok());
        assert!(check_version("3.2.1", "3.2.1").is_ok());
        assert!(check_version("", "3.2.1").is_ok());
    }

    #[test]
    fn test_mismatch_names_both_versions() {
        let err = check_version("3.3", "3.2.1").unwrap_err();
        assert!(matches!(err, BuildError::VersionMismatch { .. }));
        let msg = err.to_string();
        assert!(msg.contains("3.3"));
        assert!(msg.contains("3.2.1"));
    }

    #[tokio::test]
    async fn test_ensure_version() {
        let builds = FakeBuilds::with_statuses(&[]);
        assert_eq!(ensure_version(&builds, "3.2").await.unwrap(), "3.2.1");
        assert!(ensure_version(&builds, "3.14").await.is_err());
    }
}
