//! Fingerprint-keyed capture cache using moka
//!
//! Entries expire a fixed time after insertion. Expired entries are never
//! returned; moka removes them lazily and during its maintenance passes.
//! Only successful captures are stored.

use crate::outcome::ImageBytes;
use chartshot_descriptor::Fingerprint;
use chrono::{DateTime, Utc};
use moka::future::Cache;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Default time-to-live
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Default entry bound
pub const DEFAULT_MAX_ENTRIES: u64 = 256;

/// One cached capture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// Cache key
    pub fingerprint: Fingerprint,
    /// Cropped PNG
    pub image: ImageBytes,
    /// Insertion time
    pub created_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Create entry stamped now
    #[must_use]
    pub fn new(fingerprint: Fingerprint, image: ImageBytes) -> Self {
        Self {
            fingerprint,
            image,
            created_at: Utc::now(),
        }
    }
}

/// Cache sizing and freshness
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheSettings {
    /// Lifetime from insertion
    pub ttl: Duration,
    /// Entry bound, `None` for unbounded
    pub max_entries: Option<u64>,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            max_entries: Some(DEFAULT_MAX_ENTRIES),
        }
    }
}

impl CacheSettings {
    /// Set TTL (builder style)
    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set entry bound (builder style)
    #[must_use]
    pub fn with_max_entries(mut self, max_entries: Option<u64>) -> Self {
        self.max_entries = max_entries;
        self
    }
}

/// Statistics for cache monitoring
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of entries (approximate until maintenance runs)
    pub entry_count: u64,
}

/// Concurrent TTL cache of captured images
#[derive(Debug, Clone)]
pub struct CaptureCache {
    inner: Cache<Fingerprint, Arc<CacheEntry>>,
    settings: CacheSettings,
}

impl Default for CaptureCache {
    fn default() -> Self {
        Self::new(CacheSettings::default())
    }
}

impl CaptureCache {
    /// Create cache with the given settings
    #[must_use]
    pub fn new(settings: CacheSettings) -> Self {
        let mut builder = Cache::builder().time_to_live(settings.ttl);
        if let Some(max) = settings.max_entries {
            builder = builder.max_capacity(max);
        }
        Self {
            inner: builder.build(),
            settings,
        }
    }

    /// Settings in use
    #[inline]
    #[must_use]
    pub fn settings(&self) -> CacheSettings {
        self.settings
    }

    /// Live image for `fingerprint`
    pub async fn get(&self, fingerprint: &Fingerprint) -> Option<ImageBytes> {
        self.entry(fingerprint)
            .await
            .map(|entry| Arc::clone(&entry.image))
    }

    /// Live entry for `fingerprint`, including its timestamp
    pub async fn entry(&self, fingerprint: &Fingerprint) -> Option<Arc<CacheEntry>> {
        self.inner.get(fingerprint).await
    }

    /// Store an image, replacing any previous entry
    pub async fn put(&self, fingerprint: Fingerprint, image: ImageBytes) {
        self.inner
            .insert(fingerprint, Arc::new(CacheEntry::new(fingerprint, image)))
            .await;
    }

    /// Return the live image or run `capture` to produce it
    ///
    /// Concurrent callers for the same fingerprint share one in-flight
    /// capture. Errors are handed to every waiting caller and nothing is
    /// stored.
    ///
    /// # Errors
    /// Returns the capture error, shared between waiters
    pub async fn get_or_capture<F, E>(
        &self,
        fingerprint: Fingerprint,
        capture: F,
    ) -> Result<ImageBytes, Arc<E>>
    where
        F: Future<Output = Result<ImageBytes, E>>,
        E: Send + Sync + 'static,
    {
        let entry = self
            .inner
            .try_get_with(fingerprint, async move {
                let image = capture.await?;
                Ok(Arc::new(CacheEntry::new(fingerprint, image)))
            })
            .await?;
        Ok(Arc::clone(&entry.image))
    }

    /// Drop one entry
    pub async fn invalidate(&self, fingerprint: &Fingerprint) {
        self.inner.invalidate(fingerprint).await;
    }

    /// Drop all entries
    pub fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }

    /// Run pending maintenance (expiry and eviction)
    pub async fn sync(&self) {
        self.inner.run_pending_tasks().await;
    }

    /// Get cache statistics
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entry_count: self.inner.entry_count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn image(byte: u8) -> ImageBytes {
        Arc::from(vec![byte; 4])
    }

    #[tokio::test]
    async fn put_then_get() {
        let cache = CaptureCache::default();
        let fp = Fingerprint::of_url("https://example.com/a");

        assert!(cache.get(&fp).await.is_none());
        cache.put(fp, image(7)).await;

        assert_eq!(cache.get(&fp).await, Some(image(7)));
        let entry = cache.entry(&fp).await.unwrap();
        assert_eq!(entry.fingerprint, fp);
        assert!(entry.created_at <= Utc::now());
    }

    #[tokio::test]
    async fn get_or_capture_runs_once() {
        let cache = CaptureCache::default();
        let fp = Fingerprint::of_url("https://example.com/b");
        let calls = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let calls = Arc::clone(&calls);
            let got = cache
                .get_or_capture(fp, async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, String>(image(1))
                })
                .await
                .unwrap();
            assert_eq!(got, image(1));
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn errors_are_not_cached() {
        let cache = CaptureCache::default();
        let fp = Fingerprint::of_url("https://example.com/c");

        let err = cache
            .get_or_capture(fp, async { Err::<ImageBytes, _>("render failed".to_string()) })
            .await
            .unwrap_err();
        assert_eq!(err.as_str(), "render failed");
        assert!(cache.get(&fp).await.is_none());

        let ok = cache
            .get_or_capture(fp, async { Ok::<_, String>(image(2)) })
            .await
            .unwrap();
        assert_eq!(ok, image(2));
    }

    #[tokio::test]
    async fn concurrent_callers_share_capture() {
        let cache = CaptureCache::default();
        let fp = Fingerprint::of_url("https://example.com/d");
        let calls = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let cache = cache.clone();
                let calls = Arc::clone(&calls);
                tokio::spawn(async move {
                    cache
                        .get_or_capture(fp, async move {
                            calls.fetch_add(1, Ordering::SeqCst);
                            tokio::time::sleep(Duration::from_millis(50)).await;
                            Ok::<_, String>(image(3))
                        })
                        .await
                })
            })
            .collect();

        for task in tasks {
            assert_eq!(task.await.unwrap().unwrap(), image(3));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn entries_expire_after_ttl() {
        let cache = CaptureCache::new(
            CacheSettings::default().with_ttl(Duration::from_millis(200)),
        );
        let fp = Fingerprint::of_url("https://example.com/e");
        cache.put(fp, image(4)).await;
        assert!(cache.get(&fp).await.is_some());

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert!(cache.get(&fp).await.is_none());
    }

    #[tokio::test]
    async fn bounded_cache_evicts() {
        let cache = CaptureCache::new(CacheSettings::default().with_max_entries(Some(2)));
        for i in 0..10u8 {
            cache
                .put(Fingerprint::of_url(&format!("https://example.com/{i}")), image(i))
                .await;
        }
        cache.sync().await;
        assert!(cache.stats().entry_count <= 2);
    }

    #[tokio::test]
    async fn invalidate_removes_entry() {
        let cache = CaptureCache::default();
        let fp = Fingerprint::of_url("https://example.com/f");
        cache.put(fp, image(5)).await;

        cache.invalidate(&fp).await;
        assert!(cache.get(&fp).await.is_none());
    }
}
