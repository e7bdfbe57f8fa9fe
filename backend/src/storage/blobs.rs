use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

/// Directory holding the raw bytes of uploaded templates.
#[derive(Debug, Clone)]
pub struct BlobStore {
    root: PathBuf,
}

impl BlobStore {
    pub fn new(root: impl AsRef<Path>) -> io::Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Writes the bytes of a document as `<document id>_<md5>.docx` and
    /// returns the storage location.
    pub fn write(&self, document_id: &str, md5_hex: &str, bytes: &[u8]) -> io::Result<String> {
        let path = self.root.join(format!("{}_{}.docx", document_id, md5_hex));
        fs::write(&path, bytes)?;
        Ok(path.to_string_lossy().into_owned())
    }

    /// Reads stored bytes, `None` when the file is gone.
    pub fn read(&self, location: &str) -> io::Result<Option<Vec<u8>>> {
        match fs::read(location) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Removes stored bytes. Removing a missing file succeeds.
    pub fn remove(&self, location: &str) -> io::Result<()> {
        match fs::remove_file(location) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err),
        }
    }
}
