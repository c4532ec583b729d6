pub mod blob;
pub mod display;
pub mod error;
pub mod event;
pub mod filename;
pub mod id;
pub mod raw;
pub mod record;
pub mod registry;
pub mod snapshot;

pub use blob::BlobHandle;
pub use display::{FileDetails, FileKind, format_relative, format_size};
pub use error::{RegistryError, Result};
pub use event::RegistryEvent;
pub use id::FileId;
pub use raw::RawFile;
pub use record::{DEFAULT_MIME_TYPE, FileRecord};
pub use registry::FileRegistry;
