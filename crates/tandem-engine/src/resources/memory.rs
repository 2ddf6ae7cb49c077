use std::collections::HashMap;
use std::io;
use std::rc::Rc;

use super::{normalize_path, ResourceData, ResourceProvider};

/// Serves resources from in-memory blobs keyed by normalized path.
#[derive(Debug, Default, Clone)]
pub struct MemoryResourceProvider {
    blobs: HashMap<String, Rc<[u8]>>,
}

impl MemoryResourceProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the blob at `path`. Invalid paths are ignored.
    pub fn insert(&mut self, path: &str, bytes: impl Into<Rc<[u8]>>) {
        match normalize_path(path) {
            Some(key) => {
                self.blobs.insert(key, bytes.into());
            }
            None => log::warn!("ignoring resource with invalid path {path:?}"),
        }
    }

    pub fn with(mut self, path: &str, bytes: impl Into<Rc<[u8]>>) -> Self {
        self.insert(path, bytes);
        self
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

impl ResourceProvider for MemoryResourceProvider {
    fn access(&self, path: &str) -> Option<Box<dyn ResourceData>> {
        let blob = self.blobs.get(&normalize_path(path)?)?;
        Some(Box::new(MemoryData(Rc::clone(blob))))
    }

    fn has(&self, path: &str) -> bool {
        normalize_path(path).is_some_and(|k| self.blobs.contains_key(&k))
    }
}

struct MemoryData(Rc<[u8]>);

impl ResourceData for MemoryData {
    fn size(&self) -> usize {
        self.0.len()
    }

    fn read_all(&mut self, buf: &mut [u8]) -> io::Result<()> {
        let dst = buf
            .get_mut(..self.0.len())
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "buffer smaller than resource"))?;
        dst.copy_from_slice(&self.0);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_normalizes_path() {
        let p = MemoryResourceProvider::new().with("tex/a.png", vec![1u8, 2, 3]);
        assert!(p.has("/tex/a.png"));
        let mut d = p.access("tex/./a.png").unwrap();
        assert_eq!(d.size(), 3);
        assert_eq!(d.read_to_vec().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn miss_is_none() {
        let p = MemoryResourceProvider::new();
        assert!(p.access("a.png").is_none());
        assert!(p.is_empty());
    }

    #[test]
    fn insert_overwrites() {
        let mut p = MemoryResourceProvider::new();
        p.insert("a", vec![1u8]);
        p.insert("/a", vec![2u8, 2]);
        assert_eq!(p.len(), 1);
        assert_eq!(p.access("a").unwrap().size(), 2);
    }
}
