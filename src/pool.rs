use std::collections::HashSet;
use std::path::PathBuf;

/// Source of a clip: a local file picked up by the library scan, or a plain
/// path/URL string used verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipSource {
    File { name: String, path: PathBuf },
    Url(String),
}

/// One entry of the clip pool with its identity key resolved at ingestion.
///
/// Identity is the file name for file sources and the literal string for URL
/// sources. Two distinct files sharing a name are treated as one identity for
/// shown-tracking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolItem {
    source: ClipSource,
    key: String,
}

impl PoolItem {
    pub fn from_file(path: PathBuf) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        Self {
            key: name.clone(),
            source: ClipSource::File { name, path },
        }
    }

    pub fn from_url(url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            key: url.clone(),
            source: ClipSource::Url(url),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn source(&self) -> &ClipSource {
        &self.source
    }
}

/// A materialized playback reference for one grid cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Playable {
    /// Transient handle minted for a file source; must be revoked when the
    /// owning cell is replaced or cleared.
    Handle { id: u64, uri: String },
    /// A URL source used directly; nothing to release.
    Direct(String),
}

impl Playable {
    pub fn uri(&self) -> &str {
        match self {
            Playable::Handle { uri, .. } => uri,
            Playable::Direct(uri) => uri,
        }
    }
}

/// Mints transient playback handles for file sources and tracks which are
/// still live, mirroring object-URL create/revoke semantics.
#[derive(Debug, Default)]
pub struct HandleRegistry {
    next_id: u64,
    live: HashSet<u64>,
}

impl HandleRegistry {
    pub fn create(&mut self, item: &PoolItem) -> Playable {
        match item.source() {
            ClipSource::File { name, .. } => {
                let id = self.next_id;
                self.next_id += 1;
                self.live.insert(id);
                Playable::Handle {
                    id,
                    uri: format!("clip://{id}/{name}"),
                }
            }
            ClipSource::Url(url) => Playable::Direct(url.clone()),
        }
    }

    pub fn revoke(&mut self, playable: &Playable) {
        if let Playable::Handle { id, .. } = playable {
            self.live.remove(id);
        }
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_identity_is_the_file_name() {
        let a = PoolItem::from_file(PathBuf::from("/one/clip.mp4"));
        let b = PoolItem::from_file(PathBuf::from("/two/clip.mp4"));
        assert_eq!(a.key(), "clip.mp4");
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn url_identity_is_the_literal_string() {
        let item = PoolItem::from_url("https://example.com/clip.mp4");
        assert_eq!(item.key(), "https://example.com/clip.mp4");
    }

    #[test]
    fn revoking_a_handle_releases_it() {
        let mut registry = HandleRegistry::default();
        let item = PoolItem::from_file(PathBuf::from("/a.mp4"));
        let playable = registry.create(&item);
        assert_eq!(registry.live_count(), 1);
        registry.revoke(&playable);
        assert_eq!(registry.live_count(), 0);
    }

    #[test]
    fn url_sources_do_not_occupy_the_registry() {
        let mut registry = HandleRegistry::default();
        let playable = registry.create(&PoolItem::from_url("file:///x.webm"));
        assert_eq!(registry.live_count(), 0);
        assert_eq!(playable.uri(), "file:///x.webm");
    }
}
