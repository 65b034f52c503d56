use crate::error::RemoverError;
use crate::studio::cache::{ContentCache, ContentKey};
use std::sync::Arc;
use tracing::debug;

/// External background-removal model
///
/// Receives a PNG-encoded image and returns a PNG-encoded image of the same
/// subject whose alpha channel marks the foreground. Implementations must
/// be pure in their input: identical bytes give identical replies.
pub trait BackgroundRemover: Send + Sync {
    fn remove_background(&self, png: &[u8]) -> Result<Vec<u8>, RemoverError>;
}

impl<F> BackgroundRemover for F
where
    F: Fn(&[u8]) -> Result<Vec<u8>, RemoverError> + Send + Sync,
{
    fn remove_background(&self, png: &[u8]) -> Result<Vec<u8>, RemoverError> {
        self(png)
    }
}

/// Memoizes a [`BackgroundRemover`] by the SHA-256 of the request bytes
#[derive(Debug)]
pub struct CachedRemover<R> {
    inner: R,
    cache: Arc<ContentCache<Vec<u8>>>,
}

impl<R: BackgroundRemover> CachedRemover<R> {
    pub fn new(inner: R) -> Self {
        Self::with_cache(inner, Arc::default())
    }

    /// Wraps `inner` with a cache that may be shared with other wrappers.
    pub fn with_cache(inner: R, cache: Arc<ContentCache<Vec<u8>>>) -> Self {
        Self { inner, cache }
    }

    pub fn cache(&self) -> &Arc<ContentCache<Vec<u8>>> {
        &self.cache
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: BackgroundRemover> BackgroundRemover for CachedRemover<R> {
    fn remove_background(&self, png: &[u8]) -> Result<Vec<u8>, RemoverError> {
        let key = ContentKey::of_bytes(png);
        self.cache.get_or_try_compute(key, || {
            debug!(?key, bytes = png.len(), "calling background remover");
            self.inner.remove_background(png)
        })
    }
}
