//! Per-request de-duplication of content fetches.
//!
//! A [`RequestScope`] lives exactly as long as one inbound request. Within it,
//! the first caller for a key runs the computation and every other caller,
//! concurrent or later, gets a clone of the same result. Nothing is shared
//! across requests; cross-request reuse is the freshness window's job.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::OnceCell;
use tracing::trace;

use crate::api::ContentKind;
use crate::i18n::Locale;

static NEXT_SCOPE_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one memoized fetch within a request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub kind: ContentKind,
    pub locale: Locale,
    /// Extra discriminator for lookups by identifier
    pub id: Option<String>,
}

impl CacheKey {
    pub fn new(kind: ContentKind, locale: Locale) -> Self {
        Self {
            kind,
            locale,
            id: None,
        }
    }

    pub fn with_id(kind: ContentKind, locale: Locale, id: impl Into<String>) -> Self {
        Self {
            kind,
            locale,
            id: Some(id.into()),
        }
    }
}

type Slot = Arc<dyn Any + Send + Sync>;

struct ScopeInner {
    id: u64,
    slots: Mutex<HashMap<(CacheKey, TypeId), Slot>>,
}

/// Memoization scope for a single inbound request.
///
/// Cloning is cheap and clones share the same slots, so the scope can be put
/// in request extensions and handed to every render path.
#[derive(Clone)]
pub struct RequestScope {
    inner: Arc<ScopeInner>,
}

impl RequestScope {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ScopeInner {
                id: NEXT_SCOPE_ID.fetch_add(1, Ordering::Relaxed),
                slots: Mutex::new(HashMap::new()),
            }),
        }
    }

    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// Number of distinct keys seen in this scope.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run `computation` at most once per key for this scope.
    ///
    /// If the caller that started the computation is cancelled, the next
    /// waiter takes over, so a result is still produced exactly once.
    pub async fn memoize<T, F, Fut>(&self, key: CacheKey, computation: F) -> T
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let cell = self.slot::<T>(key);
        cell.get_or_init(computation).await.clone()
    }

    fn slot<T: Send + Sync + 'static>(&self, key: CacheKey) -> Arc<OnceCell<T>> {
        let mut slots = self.lock();
        let scope_id = self.inner.id;

        let slot = slots
            .entry((key, TypeId::of::<T>()))
            .or_insert_with_key(|(key, _)| {
                trace!(scope = scope_id, kind = %key.kind, locale = %key.locale, "New request cache slot");
                let slot: Slot = Arc::new(OnceCell::<T>::new());
                slot
            })
            .clone();

        // The TypeId in the key guarantees the downcast; an unshared cell
        // keeps this total regardless.
        slot.downcast::<OnceCell<T>>()
            .unwrap_or_else(|_| Arc::new(OnceCell::new()))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<(CacheKey, TypeId), Slot>> {
        self.inner
            .slots
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for RequestScope {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RequestScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestScope")
            .field("id", &self.inner.id)
            .field("slots", &self.len())
            .finish()
    }
}
