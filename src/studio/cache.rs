//! Content-addressed memoization
//!
//! Results are keyed by a SHA-256 digest of their input, so the same bytes
//! (or the same decoded pixels) always map to the same entry no matter where
//! they came from. There is no eviction; [`ContentCache::clear`] is the only
//! way to invalidate.

use image::DynamicImage;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::trace;

/// SHA-256 digest identifying a cache entry
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentKey([u8; 32]);

impl ContentKey {
    /// Key for an encoded byte stream
    pub fn of_bytes(bytes: &[u8]) -> Self {
        Self(Sha256::digest(bytes).into())
    }

    /// Key for decoded pixels.
    ///
    /// Dimensions and color type are hashed along with the samples, so two
    /// buffers with the same bytes but a different layout never collide.
    pub fn of_image(image: &DynamicImage) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(image.width().to_le_bytes());
        hasher.update(image.height().to_le_bytes());
        hasher.update(format!("{:?}", image.color()).as_bytes());
        hasher.update(image.as_bytes());
        Self(hasher.finalize().into())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentKey(")?;
        for byte in &self.0[..8] {
            write!(f, "{byte:02x}")?;
        }
        write!(f, "..)")
    }
}

/// Unbounded, thread-safe map from [`ContentKey`] to a computed value
///
/// Values are cloned out on every hit, so callers never share a cached
/// value mutably. Share one cache between wrappers or invocations with
/// `Arc<ContentCache<V>>`.
pub struct ContentCache<V> {
    entries: Mutex<HashMap<ContentKey, V>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<V> Default for ContentCache<V> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }
}

impl<V: Clone> ContentCache<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &ContentKey) -> Option<V> {
        self.lock().get(key).cloned()
    }

    pub fn insert(&self, key: ContentKey, value: V) {
        self.lock().insert(key, value);
    }

    /// Returns the cached value for `key`, or runs `compute` and caches its
    /// result.
    ///
    /// Errors are returned to the caller and never cached, so a failed
    /// computation is retried on the next call. The lock is not held while
    /// `compute` runs; two callers racing on the same missing key may both
    /// compute, and the last one to finish wins.
    pub fn get_or_try_compute<E, F>(&self, key: ContentKey, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        if let Some(value) = self.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            trace!(?key, "cache hit");
            return Ok(value);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        trace!(?key, "cache miss");
        let value = compute()?;
        self.insert(key, value.clone());
        Ok(value)
    }

    /// Drops every entry. Hit and miss counters are kept.
    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ContentKey, V>> {
        // entries are only ever inserted whole, so a poisoned map is still consistent
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<V> fmt::Debug for ContentCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentCache")
            .field("hits", &self.hits.load(Ordering::Relaxed))
            .field("misses", &self.misses.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::create_test_rgb_image;
    use std::cell::Cell;

    #[test]
    fn computes_once_per_key() {
        let cache = ContentCache::new();
        let calls = Cell::new(0);
        let compute = || {
            calls.set(calls.get() + 1);
            Ok::<_, ()>(vec![1u8, 2, 3])
        };

        let key = ContentKey::of_bytes(b"photo");
        assert_eq!(cache.get_or_try_compute(key, compute), Ok(vec![1, 2, 3]));
        assert_eq!(cache.get_or_try_compute(key, compute), Ok(vec![1, 2, 3]));

        assert_eq!(calls.get(), 1);
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.misses(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn errors_are_not_cached() {
        let cache: ContentCache<u32> = ContentCache::new();
        let key = ContentKey::of_bytes(b"flaky");

        assert_eq!(cache.get_or_try_compute(key, || Err("boom")), Err("boom"));
        assert!(cache.is_empty());
        assert_eq!(cache.get_or_try_compute(key, || Ok::<_, &str>(7)), Ok(7));
        assert_eq!(cache.get(&key), Some(7));
    }

    #[test]
    fn clear_forces_recompute() {
        let cache = ContentCache::new();
        let key = ContentKey::of_bytes(b"x");
        cache.insert(key, 1);
        cache.clear();
        assert_eq!(cache.get_or_try_compute(key, || Ok::<_, ()>(2)), Ok(2));
    }

    #[test]
    fn image_keys_depend_on_layout_and_content() {
        let rgb = DynamicImage::ImageRgb8(create_test_rgb_image());
        let same = DynamicImage::ImageRgb8(create_test_rgb_image());
        assert_eq!(ContentKey::of_image(&rgb), ContentKey::of_image(&same));

        let rgba = DynamicImage::ImageRgba8(rgb.to_rgba8());
        assert_ne!(ContentKey::of_image(&rgb), ContentKey::of_image(&rgba));

        let mut changed = create_test_rgb_image();
        changed.put_pixel(0, 0, image::Rgb([0, 0, 0]));
        assert_ne!(
            ContentKey::of_image(&rgb),
            ContentKey::of_image(&DynamicImage::ImageRgb8(changed))
        );

        // 1x6 and 2x3 gray with identical samples
        let tall = DynamicImage::ImageLuma8(image::GrayImage::new(1, 6));
        let wide = DynamicImage::ImageLuma8(image::GrayImage::new(2, 3));
        assert_ne!(ContentKey::of_image(&tall), ContentKey::of_image(&wide));
    }

    #[test]
    fn key_debug_is_abbreviated() {
        let key = ContentKey::of_bytes(b"");
        assert_eq!(format!("{key:?}"), "ContentKey(e3b0c44298fc1c14..)");
    }
}
