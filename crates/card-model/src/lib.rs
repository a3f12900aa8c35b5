//! LinkCard Card Model
//!
//! Defines the data contracts shared by capture and composition:
//! - **Card:** the persisted, monetized media card and its enums
//! - **Defaults:** the editable template used by quick composition
//! - **Artifact:** references to inline or remote media payloads
//! - **Store:** durable local storage for the defaults template
//!
//! Cards serialize with camelCase keys so they stay readable by the web
//! client that renders them.

pub mod artifact;
pub mod card;
pub mod defaults;
pub mod error;
pub mod store;

pub use artifact::*;
pub use card::*;
pub use defaults::*;
pub use error::*;
pub use store::*;
