//! Durable local storage for the defaults template.
//!
//! The template lives in `<root>/<namespace>.json`; the optional default
//! thumbnail sits next to it in `<root>/<namespace>_thumb` as an artifact
//! URI. Durability is best-effort: anything unreadable loads as the seed.

use std::path::{Path, PathBuf};

use crate::artifact::ArtifactRef;
use crate::defaults::CardDefaults;
use crate::error::StoreError;

/// Process-wide key/value store for [`CardDefaults`].
#[derive(Debug, Clone)]
pub struct DefaultsStore {
    root: PathBuf,
    namespace: String,
}

impl DefaultsStore {
    pub fn new(root: impl Into<PathBuf>, namespace: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            namespace: namespace.into(),
        }
    }

    pub fn template_path(&self) -> PathBuf {
        self.root.join(format!("{}.json", self.namespace))
    }

    pub fn thumbnail_path(&self) -> PathBuf {
        self.root.join(format!("{}_thumb", self.namespace))
    }

    /// Load the stored template, or the seed when nothing valid is stored.
    pub fn load(&self) -> CardDefaults {
        match self.try_load() {
            Ok(Some(defaults)) => defaults,
            Ok(None) => CardDefaults::default(),
            Err(e) => {
                tracing::warn!(error = %e, "Stored card defaults unusable; using seed values");
                CardDefaults::default()
            }
        }
    }

    /// Like [`DefaultsStore::load`] but reports why a stored template was rejected.
    pub fn try_load(&self) -> Result<Option<CardDefaults>, StoreError> {
        let path = self.template_path();
        let Some(content) = read_optional(&path)? else {
            return Ok(None);
        };
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|source| StoreError::ParseError { path, source })
    }

    /// Overwrite the stored template. The thumbnail is only written when
    /// one is given; an existing default thumbnail is otherwise kept.
    pub fn save(
        &self,
        defaults: &CardDefaults,
        thumbnail: Option<&ArtifactRef>,
    ) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.root).map_err(|source| StoreError::IoError {
            path: self.root.clone(),
            source,
        })?;

        let path = self.template_path();
        let json =
            serde_json::to_string_pretty(defaults).map_err(|source| StoreError::ParseError {
                path: path.clone(),
                source,
            })?;
        write_file(&path, json)?;

        if let Some(thumbnail) = thumbnail {
            write_file(&self.thumbnail_path(), thumbnail.to_uri())?;
        }

        tracing::debug!(namespace = %self.namespace, "Card defaults saved");
        Ok(())
    }

    /// The configured default thumbnail, if one was saved.
    pub fn load_thumbnail(&self) -> Option<ArtifactRef> {
        let path = self.thumbnail_path();
        let content = match read_optional(&path) {
            Ok(content) => content?,
            Err(e) => {
                tracing::warn!(error = %e, "Default thumbnail unreadable");
                return None;
            }
        };

        match ArtifactRef::parse(content.trim()) {
            Ok(artifact) if !artifact.is_empty() => Some(artifact),
            Ok(_) => None,
            Err(source) => {
                let e = StoreError::ArtifactError { path, source };
                tracing::warn!(error = %e, "Default thumbnail ignored");
                None
            }
        }
    }

    /// Forget the stored template and thumbnail so the seed applies again.
    pub fn clear(&self) -> Result<(), StoreError> {
        for path in [self.template_path(), self.thumbnail_path()] {
            match std::fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(source) => return Err(StoreError::IoError { path, source }),
            }
        }
        tracing::debug!(namespace = %self.namespace, "Card defaults cleared");
        Ok(())
    }
}

fn read_optional(path: &Path) -> Result<Option<String>, StoreError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(StoreError::IoError {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn write_file(path: &Path, content: String) -> Result<(), StoreError> {
    std::fs::write(path, content).map_err(|source| StoreError::IoError {
        path: path.to_path_buf(),
        source,
    })
}
