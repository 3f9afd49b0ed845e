//! Image loading and caching.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, TryLockError};

use image::{DynamicImage, ImageReader};
use tracing::{debug, warn};

use super::{ImageError, ImageFetch, SharedImage};

/// One cache entry. Its mutex is held for the duration of a fetch so
/// concurrent callers for the same source wait instead of fetching twice.
type Slot = Arc<Mutex<Option<SharedImage>>>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Read a slot without waiting; a slot that is mid-fetch reads as empty.
fn peek(slot: &Mutex<Option<SharedImage>>) -> Option<SharedImage> {
    match slot.try_lock() {
        Ok(entry) => entry.as_ref().map(Arc::clone),
        Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner().as_ref().map(Arc::clone),
        Err(TryLockError::WouldBlock) => None,
    }
}

/// Cache for decoded images, keyed by the raw source string.
///
/// Clones share the same storage. Entries are never evicted; failed
/// fetches are not remembered, so a later call retries.
#[derive(Debug, Default, Clone)]
pub struct ImageCache {
    slots: Arc<Mutex<HashMap<String, Slot>>>,
}

impl ImageCache {
    /// Create an empty image cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached image for `url`, fetching it on a miss.
    ///
    /// A hit never calls `fetch`. A successful fetch is stored; a failed
    /// one returns `None` and is not remembered, so a caller already
    /// waiting on the same key performs its own fetch. Keys are compared
    /// verbatim, without any URL normalization.
    pub fn resolve<F>(&self, url: &str, fetch: &F) -> Option<SharedImage>
    where
        F: ImageFetch + ?Sized,
    {
        let slot = Arc::clone(lock(&self.slots).entry(url.to_string()).or_default());
        let mut entry = lock(&slot);

        if let Some(image) = entry.as_ref() {
            debug!(url, "image cache hit");
            return Some(Arc::clone(image));
        }

        debug!(url, "image cache miss");
        crate::perf::log_event("image.fetch", format!("src={url}"));
        let Some(image) = fetch.fetch(url) else {
            crate::perf::log_event("image.fetch_failed", format!("src={url}"));
            drop(entry);
            self.forget_if_unclaimed(url, &slot);
            return None;
        };
        let image = Arc::new(image);
        *entry = Some(Arc::clone(&image));
        Some(image)
    }

    /// Drop an empty slot after a failed fetch unless another caller is
    /// already waiting on it.
    fn forget_if_unclaimed(&self, url: &str, slot: &Slot) {
        let mut slots = lock(&self.slots);
        // One reference in the map, one held by the caller.
        let unclaimed = slots
            .get(url)
            .is_some_and(|current| Arc::ptr_eq(current, slot) && Arc::strong_count(slot) == 2);
        if unclaimed {
            slots.remove(url);
        }
    }

    /// Get an image from the cache without fetching or waiting.
    ///
    /// An image still being fetched is reported as absent.
    pub fn get(&self, url: &str) -> Option<SharedImage> {
        let slot = lock(&self.slots).get(url).cloned()?;
        peek(&slot)
    }

    /// Insert an already decoded image.
    pub fn insert(&self, url: impl Into<String>, image: DynamicImage) {
        let slot = Arc::clone(lock(&self.slots).entry(url.into()).or_default());
        *lock(&slot) = Some(Arc::new(image));
    }

    /// Check if an image is in the cache.
    pub fn contains(&self, url: &str) -> bool {
        self.get(url).is_some()
    }

    /// Clear the cache.
    pub fn clear(&self) {
        lock(&self.slots).clear();
    }

    /// Get the number of cached images. In-flight fetches are not counted.
    pub fn len(&self) -> usize {
        let slots: Vec<Slot> = lock(&self.slots).values().cloned().collect();
        slots.iter().filter(|slot| peek(slot).is_some()).count()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Loads images from the local filesystem.
///
/// Relative sources are resolved against the base path, which is
/// normally the directory of the markdown file being rendered.
#[derive(Debug, Clone)]
pub struct ImageLoader {
    base_path: PathBuf,
}

impl ImageLoader {
    /// Create a new image loader with the given base path for relative images.
    pub const fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    /// Load and decode an image.
    pub fn load(&self, src: &str) -> Result<DynamicImage, ImageError> {
        let path = self.resolve_path(src)?;
        ImageReader::open(&path)
            .and_then(|reader| reader.with_guessed_format())
            .map_err(|source| ImageError::Io {
                path: path.clone(),
                source,
            })?
            .decode()
            .map_err(|source| ImageError::Decode { path, source })
    }

    /// Resolve a source string to a filesystem path.
    ///
    /// `file://` sources are accepted; any other scheme is rejected.
    fn resolve_path(&self, src: &str) -> Result<PathBuf, ImageError> {
        let src = match src.split_once("://") {
            Some(("file", rest)) => rest,
            Some((scheme, _)) => return Err(ImageError::UnsupportedScheme(scheme.to_string())),
            None => src,
        };
        let path = Path::new(src);
        if path.is_absolute() {
            Ok(path.to_path_buf())
        } else {
            Ok(self.base_path.join(path))
        }
    }
}

impl ImageFetch for ImageLoader {
    fn fetch(&self, url: &str) -> Option<DynamicImage> {
        match self.load(url) {
            Ok(image) => Some(image),
            Err(err) => {
                warn!(url, %err, "image unavailable");
                crate::perf::log_event("image.load_error", format!("src={url} err={err}"));
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc;
    use std::time::Duration;

    use image::{Rgba, RgbaImage};
    use tempfile::tempdir;

    fn counting_fetch(
        calls: &AtomicUsize,
        succeed: bool,
    ) -> impl Fn(&str) -> Option<DynamicImage> + '_ {
        move |_url: &str| {
            calls.fetch_add(1, Ordering::SeqCst);
            succeed.then(|| DynamicImage::new_rgba8(2, 3))
        }
    }

    #[test]
    fn test_cache_new() {
        let cache = ImageCache::new();
        assert!(cache.is_empty());
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_resolve_fetches_once_per_url() {
        let cache = ImageCache::new();
        let calls = AtomicUsize::new(0);
        let fetch = counting_fetch(&calls, true);

        let first = cache.resolve("a.png", &fetch).unwrap();
        let second = cache.resolve("a.png", &fetch).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_failed_fetch_is_not_cached() {
        let cache = ImageCache::new();
        let calls = AtomicUsize::new(0);
        let failing = counting_fetch(&calls, false);

        assert!(cache.resolve("a.png", &failing).is_none());
        assert!(cache.resolve("a.png", &failing).is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(!cache.contains("a.png"));
        assert!(cache.is_empty());

        let working = counting_fetch(&calls, true);
        assert!(cache.resolve("a.png", &working).is_some());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_failed_fetches_do_not_accumulate_slots() {
        let cache = ImageCache::new();
        let calls = AtomicUsize::new(0);
        let failing = counting_fetch(&calls, false);

        for idx in 0..10 {
            assert!(cache.resolve(&format!("missing-{idx}.png"), &failing).is_none());
        }
        assert_eq!(calls.load(Ordering::SeqCst), 10);
        assert!(lock(&cache.slots).is_empty());
    }

    #[test]
    fn test_keys_are_not_normalized() {
        let cache = ImageCache::new();
        let calls = AtomicUsize::new(0);
        let fetch = counting_fetch(&calls, true);

        cache.resolve("http://x/a.png", &fetch);
        cache.resolve("http://x/a.png/", &fetch);
        cache.resolve("HTTP://x/a.png", &fetch);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn test_clones_share_storage() {
        let cache = ImageCache::new();
        let shared = cache.clone();
        cache.insert("a.png", DynamicImage::new_rgba8(1, 1));
        assert!(shared.contains("a.png"));
        shared.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_concurrent_resolves_fetch_once() {
        let cache = ImageCache::new();
        let calls = AtomicUsize::new(0);
        let slow = |_url: &str| {
            calls.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(20));
            Some(DynamicImage::new_rgba8(1, 1))
        };

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| assert!(cache.resolve("same.png", &slow).is_some()));
            }
        });
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_waiter_refetches_after_failed_concurrent_fetch() {
        let cache = ImageCache::new();
        let calls = AtomicUsize::new(0);
        let first_fails = |_url: &str| {
            let call = calls.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(20));
            (call > 0).then(|| DynamicImage::new_rgba8(1, 1))
        };

        let results: Vec<bool> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| cache.resolve("flaky.png", &first_fails).is_some()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(results.iter().filter(|ok| !**ok).count(), 1);
        assert_eq!(results.iter().filter(|ok| **ok).count(), 7);
        assert!(cache.contains("flaky.png"));
    }

    #[test]
    fn test_different_keys_do_not_wait_on_each_other() {
        let cache = ImageCache::new();
        let (started_tx, started_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let slow = move |_url: &str| {
            started_tx.send(()).unwrap();
            // Only released once the other key has resolved.
            let released = release_rx.recv_timeout(Duration::from_secs(5)).is_ok();
            released.then(|| DynamicImage::new_rgba8(1, 1))
        };
        let quick = |_url: &str| Some(DynamicImage::new_rgba8(2, 2));

        std::thread::scope(|scope| {
            let cache = &cache;
            let slow_key = scope.spawn(move || cache.resolve("a.png", &slow));
            started_rx.recv().unwrap();

            // A fetch for "a.png" is in flight here.
            assert!(cache.resolve("b.png", &quick).is_some());
            assert!(!cache.contains("a.png"));
            assert_eq!(cache.len(), 1);

            release_tx.send(()).unwrap();
            assert!(slow_key.join().unwrap().is_some());
        });
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_loader_resolve_path_absolute() {
        let loader = ImageLoader::new(PathBuf::from("/base"));
        let resolved = loader.resolve_path("/absolute/path.png").unwrap();
        assert_eq!(resolved, PathBuf::from("/absolute/path.png"));
    }

    #[test]
    fn test_loader_resolve_path_relative() {
        let loader = ImageLoader::new(PathBuf::from("/base"));
        let resolved = loader.resolve_path("relative/path.png").unwrap();
        assert_eq!(resolved, PathBuf::from("/base/relative/path.png"));
    }

    #[test]
    fn test_loader_accepts_file_scheme() {
        let loader = ImageLoader::new(PathBuf::from("/base"));
        let resolved = loader.resolve_path("file:///img/a.png").unwrap();
        assert_eq!(resolved, PathBuf::from("/img/a.png"));
    }

    #[test]
    fn test_loader_rejects_remote_scheme() {
        let loader = ImageLoader::new(PathBuf::from("/base"));
        let err = loader.load("https://example.com/a.png").unwrap_err();
        assert!(matches!(err, ImageError::UnsupportedScheme(ref s) if s == "https"));
        assert!(loader.fetch("https://example.com/a.png").is_none());
    }

    #[test]
    fn test_loader_decodes_png_from_disk() {
        let dir = tempdir().unwrap();
        RgbaImage::from_pixel(4, 2, Rgba([1, 2, 3, 255]))
            .save(dir.path().join("pic.png"))
            .unwrap();

        let loader = ImageLoader::new(dir.path().to_path_buf());
        let image = loader.load("pic.png").unwrap();
        assert_eq!((image.width(), image.height()), (4, 2));
    }

    #[test]
    fn test_loader_reports_missing_and_corrupt_files() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("bad.png"), b"not an image").unwrap();
        let loader = ImageLoader::new(dir.path().to_path_buf());

        assert!(matches!(loader.load("missing.png"), Err(ImageError::Io { .. })));
        assert!(matches!(loader.load("bad.png"), Err(ImageError::Decode { .. })));
    }
}
