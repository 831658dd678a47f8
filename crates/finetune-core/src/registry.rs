//! Model registry seam.
//!
//! The registry is the source of truth for which models compete in a run.
//! Discovery itself (metagraph sync, hub lookups, ...) lives behind the
//! [`ModelRegistry`] trait; [`ManifestRegistry`] is a file-backed
//! implementation used by the CLI.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::domain::{ModelIdentity, RegistryError, ValidatorContext};

/// Source of the current candidate model set.
///
/// An empty result is valid and is not an error.
pub trait ModelRegistry {
    fn gather_all_models(
        &self,
        context: &ValidatorContext,
    ) -> std::result::Result<Vec<ModelIdentity>, RegistryError>;
}

impl<R: ModelRegistry + ?Sized> ModelRegistry for Box<R> {
    fn gather_all_models(
        &self,
        context: &ValidatorContext,
    ) -> std::result::Result<Vec<ModelIdentity>, RegistryError> {
        (**self).gather_all_models(context)
    }
}

/// Registry backed by a JSON array of [`ModelIdentity`] on disk.
///
/// The file is re-read on every call so each evaluation sees a fresh snapshot.
#[derive(Debug, Clone)]
pub struct ManifestRegistry {
    path: PathBuf,
}

impl ManifestRegistry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ModelRegistry for ManifestRegistry {
    fn gather_all_models(
        &self,
        context: &ValidatorContext,
    ) -> std::result::Result<Vec<ModelIdentity>, RegistryError> {
        let content = std::fs::read_to_string(&self.path)?;
        let models: Vec<ModelIdentity> = serde_json::from_str(&content)
            .map_err(|e| RegistryError::Malformed(format!("{}: {}", self.path.display(), e)))?;
        debug!(
            manifest = %self.path.display(),
            netuid = context.netuid,
            count = models.len(),
            "gathered models from manifest"
        );
        Ok(models)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_preserves_file_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("models.json");
        std::fs::write(
            &path,
            r#"[
                {"model": "org/b", "hotkey": "hk2", "uid": 2, "block": 20},
                {"model": "org/a", "hotkey": "hk1", "uid": 1, "block": 10}
            ]"#,
        )
        .expect("write");

        let registry = ManifestRegistry::new(&path);
        let models = registry
            .gather_all_models(&ValidatorContext::default())
            .expect("gather");
        let ids: Vec<_> = models.iter().map(|m| m.id()).collect();
        assert_eq!(ids, vec!["org/b", "org/a"]);
    }

    #[test]
    fn test_manifest_empty_array_is_valid() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("models.json");
        std::fs::write(&path, "[]").expect("write");

        let models = ManifestRegistry::new(&path)
            .gather_all_models(&ValidatorContext::default())
            .expect("gather");
        assert!(models.is_empty());
    }

    #[test]
    fn test_manifest_errors() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = ManifestRegistry::new(dir.path().join("absent.json"));
        assert!(matches!(
            missing.gather_all_models(&ValidatorContext::default()),
            Err(RegistryError::Io(_))
        ));

        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"{"model": "not-an-array"}"#).expect("write");
        assert!(matches!(
            ManifestRegistry::new(&path).gather_all_models(&ValidatorContext::default()),
            Err(RegistryError::Malformed(_))
        ));
    }
}
