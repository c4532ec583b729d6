use std::fs::File;
use std::io::{self, Cursor, Read};
use std::path::{Path, PathBuf};

/// A file handed to the registry by the upload surface.
#[derive(Debug, Clone)]
pub struct RawFile {
    name: String,
    mime_type: Option<String>,
    size: u64,
    source: Source,
}

#[derive(Debug, Clone)]
enum Source {
    Bytes(Vec<u8>),
    Path(PathBuf),
}

impl RawFile {
    /// A file whose content is already in memory.
    pub fn from_bytes(
        name: impl Into<String>,
        mime_type: Option<String>,
        data: impl Into<Vec<u8>>,
    ) -> Self {
        let data = data.into();
        Self {
            name: name.into(),
            mime_type,
            size: data.len() as u64,
            source: Source::Bytes(data),
        }
    }

    /// A file on disk. The MIME type is guessed from the extension.
    pub fn from_path(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let metadata = std::fs::metadata(path)?;
        if !metadata.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("'{}' is not a regular file", path.display()),
            ));
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("'{}' has no file name", path.display()),
                )
            })?;

        Ok(Self {
            name,
            mime_type: mime_guess::from_path(path).first().map(|m| m.to_string()),
            size: metadata.len(),
            source: Source::Path(path.to_path_buf()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared content type, if the source offered one.
    pub fn mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Open the content for reading.
    pub(crate) fn open(&self) -> io::Result<Box<dyn Read + '_>> {
        match &self.source {
            Source::Bytes(data) => Ok(Box::new(Cursor::new(data.as_slice()))),
            Source::Path(path) => Ok(Box::new(File::open(path)?)),
        }
    }
}
