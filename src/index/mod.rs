//! Read-only similarity index over the pre-built documentation corpus.

mod sqlite;
mod store;

pub use sqlite::SqliteDocIndex;
pub use store::{DocIndex, DocMatch, IndexedDocument};
