#![deny(warnings)]

//! Persistence layer: snapshot codec, SQLite save slots and a background
//! writer that keeps saves off the game loop.

pub mod codec;
pub mod store;
pub mod worker;

pub use codec::{decode, deserialize, encode, load_or_default, serialize, Snapshot, SnapshotSettings};
pub use store::{SaveStore, StoreError};
pub use worker::SaveWorker;

/// Returns the default SQLite URL used for local saves.
pub fn default_sqlite_url() -> &'static str {
    "sqlite://./saves/banana.db"
}

/// Save slot used when none is configured.
pub const DEFAULT_SLOT: &str = "default";
