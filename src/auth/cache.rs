use std::path::{Path, PathBuf};

use tracing::debug;

use super::connector::TokenInfo;
use crate::error::AuthError;

/// The single persisted credential blob.
#[derive(Debug, Clone)]
pub struct TokenCache {
    path: PathBuf,
}

impl TokenCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the cached token, if any.
    ///
    /// A missing file is `Ok(None)`; an unreadable or unparsable one is an
    /// error so the caller can log it.
    pub fn load(&self) -> Result<Option<TokenInfo>, AuthError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "No cached token");
            return Ok(None);
        }

        let json = std::fs::read_to_string(&self.path)
            .map_err(|e| AuthError::Cache(format!("Failed to read token cache: {}", e)))?;
        let token: TokenInfo = serde_json::from_str(&json)
            .map_err(|e| AuthError::Cache(format!("Failed to parse token cache: {}", e)))?;

        Ok(Some(token))
    }

    /// Persist `token`, creating the parent directory if needed.
    pub fn save(&self, token: &TokenInfo) -> Result<(), AuthError> {
        let json = serde_json::to_string(token)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    AuthError::Cache(format!("Failed to create cache directory: {}", e))
                })?;
            }
        }

        std::fs::write(&self.path, json)
            .map_err(|e| AuthError::Cache(format!("Failed to write token cache: {}", e)))?;
        restrict_permissions(&self.path);

        debug!(path = %self.path.display(), "Token cache written");
        Ok(())
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    if let Err(e) = std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)) {
        tracing::warn!(error = %e, "Could not restrict token cache permissions");
    }
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) {}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_none() {
        let dir = TempDir::new().unwrap();
        let cache = TokenCache::new(dir.path().join("absent"));
        assert!(cache.load().unwrap().is_none());
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let cache = TokenCache::new(dir.path().join("nested/dir/.cache"));
        let token = TokenInfo::issued_now("abc", 3600, "streaming", Some("r".into()));

        cache.save(&token).unwrap();
        let loaded = cache.load().unwrap().unwrap();

        assert_eq!(loaded, token);
    }

    #[test]
    fn test_garbage_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".cache");
        std::fs::write(&path, "not json").unwrap();

        let err = TokenCache::new(&path).load().unwrap_err();
        assert!(matches!(err, AuthError::Cache(_)));
    }
}
