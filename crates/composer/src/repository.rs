//! Card persistence.

use std::path::{Path, PathBuf};

use linkcard_card_model::{MediaCard, ValidationError};
use tokio::sync::Mutex;

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error in {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Refusing to store invalid card: {0}")]
    InvalidCard(#[from] ValidationError),
}

/// Where finished cards go.
#[async_trait::async_trait]
pub trait CardRepository: Send + Sync {
    /// Create the card, or replace the stored card with the same id.
    async fn submit(&self, card: MediaCard) -> Result<(), RepositoryError>;

    /// Cards by `creator_id`, newest first.
    async fn list(&self, creator_id: &str) -> Result<Vec<MediaCard>, RepositoryError>;

    /// Remove a card. Returns whether it existed.
    async fn delete(&self, id: &str) -> Result<bool, RepositoryError>;

    async fn get(&self, id: &str) -> Result<Option<MediaCard>, RepositoryError>;
}

/// All cards in one JSON array on disk.
pub struct LocalCardRepository {
    path: PathBuf,
    lock: Mutex<()>,
}

impl LocalCardRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<Vec<MediaCard>, RepositoryError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(RepositoryError::IoError {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&content).map_err(|source| RepositoryError::ParseError {
            path: self.path.clone(),
            source,
        })
    }

    async fn write_all(&self, cards: &[MediaCard]) -> Result<(), RepositoryError> {
        let io_err = |source| RepositoryError::IoError {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(cards).map_err(|source| {
            RepositoryError::ParseError {
                path: self.path.clone(),
                source,
            }
        })?;

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await.map_err(io_err)?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(io_err)?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl CardRepository for LocalCardRepository {
    async fn submit(&self, card: MediaCard) -> Result<(), RepositoryError> {
        card.validate()?;

        let _guard = self.lock.lock().await;
        let mut cards = self.read_all().await?;
        let id = card.id.clone();
        match cards.iter_mut().find(|c| c.id == card.id) {
            Some(existing) => {
                *existing = card;
                tracing::info!(card_id = %id, "Card updated");
            }
            None => {
                cards.push(card);
                tracing::info!(card_id = %id, "Card created");
            }
        }
        self.write_all(&cards).await
    }

    async fn list(&self, creator_id: &str) -> Result<Vec<MediaCard>, RepositoryError> {
        let _guard = self.lock.lock().await;
        let mut cards: Vec<MediaCard> = self
            .read_all()
            .await?
            .into_iter()
            .filter(|c| c.creator_id.as_deref() == Some(creator_id))
            .collect();
        cards.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(cards)
    }

    async fn delete(&self, id: &str) -> Result<bool, RepositoryError> {
        let _guard = self.lock.lock().await;
        let mut cards = self.read_all().await?;
        let before = cards.len();
        cards.retain(|c| c.id != id);
        if cards.len() == before {
            tracing::debug!(card_id = %id, "Delete requested for unknown card");
            return Ok(false);
        }
        self.write_all(&cards).await?;
        tracing::info!(card_id = %id, "Card deleted");
        Ok(true)
    }

    async fn get(&self, id: &str) -> Result<Option<MediaCard>, RepositoryError> {
        let _guard = self.lock.lock().await;
        Ok(self.read_all().await?.into_iter().find(|c| c.id == id))
    }
}
