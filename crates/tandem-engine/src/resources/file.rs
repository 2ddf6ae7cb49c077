use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use super::{normalize_path, ResourceData, ResourceProvider};

/// Serves resources from a directory on disk.
#[derive(Debug, Clone)]
pub struct FileResourceProvider {
    folder: PathBuf,
}

impl FileResourceProvider {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self { folder: folder.into() }
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    fn resolve(&self, path: &str) -> Option<PathBuf> {
        normalize_path(path).map(|rel| self.folder.join(rel))
    }
}

impl ResourceProvider for FileResourceProvider {
    fn access(&self, path: &str) -> Option<Box<dyn ResourceData>> {
        let full = self.resolve(path)?;
        let file = File::open(&full).ok()?;
        let meta = file.metadata().ok()?;
        if !meta.is_file() {
            return None;
        }
        log::trace!("resource open: {}", full.display());
        Some(Box::new(FileData { file, size: meta.len() as usize }))
    }

    fn has(&self, path: &str) -> bool {
        self.resolve(path).is_some_and(|p| p.is_file())
    }
}

struct FileData {
    file: File,
    size: usize,
}

impl ResourceData for FileData {
    fn size(&self) -> usize {
        self.size
    }

    fn read_all(&mut self, buf: &mut [u8]) -> io::Result<()> {
        if buf.len() < self.size {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "buffer smaller than resource"));
        }
        self.file.read_exact(&mut buf[..self.size])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("tandem-res-{}-{name}", std::process::id()));
        std::fs::create_dir_all(dir.join("tex")).unwrap();
        dir
    }

    #[test]
    fn reads_existing_file() {
        let dir = scratch_dir("read");
        File::create(dir.join("tex/a.bin")).unwrap().write_all(b"hello").unwrap();

        let provider = FileResourceProvider::new(&dir);
        assert!(provider.has("tex/a.bin"));

        let mut data = provider.access("/tex/a.bin").unwrap();
        assert_eq!(data.size(), 5);
        assert_eq!(data.read_to_vec().unwrap(), b"hello");
    }

    #[test]
    fn missing_file_is_none() {
        let dir = scratch_dir("missing");
        let provider = FileResourceProvider::new(&dir);
        assert!(provider.access("tex/nope.png").is_none());
        assert!(!provider.has("tex/nope.png"));
    }

    #[test]
    fn directory_is_not_a_resource() {
        let dir = scratch_dir("dir");
        let provider = FileResourceProvider::new(&dir);
        assert!(provider.access("tex").is_none());
    }

    #[test]
    fn short_buffer_is_an_error() {
        let dir = scratch_dir("short");
        File::create(dir.join("b.bin")).unwrap().write_all(b"abcdef").unwrap();
        let provider = FileResourceProvider::new(&dir);
        let mut data = provider.access("b.bin").unwrap();
        let mut buf = [0u8; 2];
        assert!(data.read_all(&mut buf).is_err());
    }
}
