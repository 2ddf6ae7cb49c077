//! Resource providers.
//!
//! A provider maps slash-separated resource paths to readable blobs. The
//! active provider is handed explicitly to whoever needs asset access
//! (typically as `Rc<dyn ResourceProvider>`); there is no global instance.

mod file;
mod memory;

pub use file::FileResourceProvider;
pub use memory::MemoryResourceProvider;

use std::io;

/// A readable blob returned by [`ResourceProvider::access`].
pub trait ResourceData {
    /// Total size of the blob in bytes.
    fn size(&self) -> usize;

    /// Reads the whole blob into `buf`, which must be at least `size()` bytes.
    fn read_all(&mut self, buf: &mut [u8]) -> io::Result<()>;

    /// Convenience: allocates a buffer of `size()` bytes and fills it.
    fn read_to_vec(&mut self) -> io::Result<Vec<u8>> {
        let mut buf = vec![0u8; self.size()];
        self.read_all(&mut buf)?;
        Ok(buf)
    }
}

/// Maps resource paths to blobs.
pub trait ResourceProvider {
    /// Opens `path`. Returns `None` if no such resource exists.
    fn access(&self, path: &str) -> Option<Box<dyn ResourceData>>;

    /// Returns whether `path` exists without opening it.
    fn has(&self, path: &str) -> bool {
        self.access(path).is_some()
    }
}

/// Normalizes a resource path: backslashes become slashes, leading slashes
/// and `.` segments are dropped. Returns `None` for paths escaping the root
/// through `..` and for empty paths.
pub fn normalize_path(path: &str) -> Option<String> {
    let mut parts: Vec<&str> = Vec::new();
    for seg in path.split(['/', '\\']) {
        match seg {
            "" | "." => {}
            ".." => return None,
            s => parts.push(s),
        }
    }
    (!parts.is_empty()).then(|| parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_leading_and_dot_segments() {
        assert_eq!(normalize_path("/tex/./a.png").as_deref(), Some("tex/a.png"));
        assert_eq!(normalize_path("tex\\a.png").as_deref(), Some("tex/a.png"));
    }

    #[test]
    fn normalize_refuses_parent_segments() {
        assert_eq!(normalize_path("../secret.png"), None);
        assert_eq!(normalize_path("tex/../../x"), None);
    }

    #[test]
    fn normalize_empty_is_none() {
        assert_eq!(normalize_path(""), None);
        assert_eq!(normalize_path("/"), None);
    }
}
