mod error;
mod traits;
mod url;

pub mod filesystem;
pub mod memory;

pub use error::StorageError;
pub use traits::{BlobRuntime, KeyValueStore};
pub use url::BlobUrl;
