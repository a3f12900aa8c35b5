//! LinkCard Composer
//!
//! Turns a finished capture or an uploaded file into a validated
//! [`MediaCard`](linkcard_card_model::MediaCard), either from the full card
//! form or from the saved defaults template, and hands it to a
//! [`CardRepository`].

pub mod compose;
pub mod identity;
pub mod repository;
pub mod resolver;

pub use compose::*;
pub use identity::{IdentityProvider, StaticIdentity};
pub use repository::{CardRepository, LocalCardRepository, RepositoryError};
pub use resolver::{derive_thumbnail, infer_type, mime_from_path, ThumbnailCandidates};
