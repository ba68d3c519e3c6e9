//! Process-wide store of last-known-good entity snapshots.
//!
//! Keys are `(entity family, scope)` pairs. Writers never patch cached
//! values; a confirmed write marks the affected keys stale and the next
//! read through that key refetches from the server.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, trace, warn};

use crate::domain::errors::ClientResult;
use crate::domain::models::CacheConfig;

/// Resource type, the first component of every cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityFamily {
    Agents,
    Simulations,
}

impl EntityFamily {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Agents => "agents",
            Self::Simulations => "simulations",
        }
    }
}

/// Which view of the family a key addresses.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyScope {
    /// The collection listing.
    List,
    /// A single entity.
    Detail(String),
    /// Status view of a single entity.
    Status(String),
    /// Fragment listing of a single entity.
    Fragments(String),
}

/// Compound cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub family: EntityFamily,
    pub scope: KeyScope,
}

impl CacheKey {
    pub const fn list(family: EntityFamily) -> Self {
        Self {
            family,
            scope: KeyScope::List,
        }
    }

    pub fn detail(family: EntityFamily, id: impl Into<String>) -> Self {
        Self {
            family,
            scope: KeyScope::Detail(id.into()),
        }
    }

    pub fn status(id: impl Into<String>) -> Self {
        Self {
            family: EntityFamily::Simulations,
            scope: KeyScope::Status(id.into()),
        }
    }

    pub fn fragments(id: impl Into<String>) -> Self {
        Self {
            family: EntityFamily::Agents,
            scope: KeyScope::Fragments(id.into()),
        }
    }

    /// Entity id the key is scoped to; `None` for list keys.
    pub fn entity_id(&self) -> Option<&str> {
        match &self.scope {
            KeyScope::List => None,
            KeyScope::Detail(id) | KeyScope::Status(id) | KeyScope::Fragments(id) => Some(id),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.scope {
            KeyScope::List => write!(f, "{}", self.family.as_str()),
            KeyScope::Detail(id) => write!(f, "{}/{id}", self.family.as_str()),
            KeyScope::Status(id) => write!(f, "{}/{id}/status", self.family.as_str()),
            KeyScope::Fragments(id) => write!(f, "{}/{id}/fragments", self.family.as_str()),
        }
    }
}

/// Set of keys to mark stale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invalidation {
    /// Every key of the family.
    Family(EntityFamily),
    /// Only the family's list key.
    List(EntityFamily),
    /// Every key scoped to one entity (detail, status, fragments).
    Entity(EntityFamily, String),
}

impl Invalidation {
    pub const fn family(&self) -> EntityFamily {
        match self {
            Self::Family(family) | Self::List(family) | Self::Entity(family, _) => *family,
        }
    }

    /// True when `key` falls inside this invalidation.
    pub fn matches(&self, key: &CacheKey) -> bool {
        if key.family != self.family() {
            return false;
        }
        match self {
            Self::Family(_) => true,
            Self::List(_) => key.scope == KeyScope::List,
            Self::Entity(_, id) => key.entity_id() == Some(id.as_str()),
        }
    }
}

impl fmt::Display for Invalidation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Family(family) => write!(f, "{}/*", family.as_str()),
            Self::List(family) => write!(f, "{}", family.as_str()),
            Self::Entity(family, id) => write!(f, "{}/{id}/*", family.as_str()),
        }
    }
}

/// A cached value together with its staleness.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<T> {
    pub value: T,
    pub stale: bool,
}

#[derive(Debug)]
struct CacheEntry {
    value: Value,
    stale: bool,
    stored_at: Instant,
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<CacheKey, CacheEntry>,
    /// Bumped by every invalidation touching the family.
    generations: HashMap<EntityFamily, u64>,
}

impl CacheState {
    fn generation(&self, family: EntityFamily) -> u64 {
        self.generations.get(&family).copied().unwrap_or(0)
    }
}

/// Explicit cache component shared by reads, mutations and pollers.
///
/// Values are stored as JSON snapshots so one map can hold every entity
/// shape. The lock is never held across a fetch; concurrent writers of
/// the same key are last-writer-wins.
#[derive(Debug, Default)]
pub struct QueryCache {
    state: RwLock<CacheState>,
    ttl: Option<Duration>,
}

impl QueryCache {
    /// Create a cache whose entries stay fresh until invalidated.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cache whose entries also expire after `ttl`.
    pub fn with_ttl(ttl: Option<Duration>) -> Self {
        Self {
            state: RwLock::default(),
            ttl,
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::with_ttl(config.ttl_secs.map(Duration::from_secs))
    }

    /// Return the fresh snapshot for `key`, or run `fetcher` and store its result.
    ///
    /// A fetch failure leaves any existing entry untouched and is returned
    /// unchanged. If the key's family is invalidated while the fetch is in
    /// flight, the result is returned but stored as stale, so the next
    /// reader refetches.
    pub async fn read_through<T, F, Fut>(&self, key: CacheKey, fetcher: F) -> ClientResult<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = ClientResult<T>>,
    {
        let generation_before = {
            let state = self.state.read().await;
            if let Some(entry) = state.entries.get(&key) {
                if self.is_fresh(entry) {
                    match serde_json::from_value::<T>(entry.value.clone()) {
                        Ok(value) => {
                            trace!(key = %key, "cache hit");
                            return Ok(value);
                        }
                        Err(err) => {
                            warn!(key = %key, error = %err, "cached snapshot has unexpected shape, refetching");
                        }
                    }
                }
            }
            state.generation(key.family)
        };

        debug!(key = %key, "cache miss, fetching");
        let value = fetcher().await?;

        match serde_json::to_value(&value) {
            Ok(json) => {
                let mut state = self.state.write().await;
                let stale = state.generation(key.family) != generation_before;
                if stale {
                    debug!(key = %key, "invalidated during fetch, storing as stale");
                }
                state.entries.insert(
                    key,
                    CacheEntry {
                        value: json,
                        stale,
                        stored_at: Instant::now(),
                    },
                );
            }
            Err(err) => warn!(key = %key, error = %err, "failed to snapshot value, not cached"),
        }

        Ok(value)
    }

    /// Store `value` as the fresh snapshot for `key`.
    pub async fn put<T: Serialize>(&self, key: CacheKey, value: &T) {
        match serde_json::to_value(value) {
            Ok(json) => {
                trace!(key = %key, "cache put");
                self.state.write().await.entries.insert(
                    key,
                    CacheEntry {
                        value: json,
                        stale: false,
                        stored_at: Instant::now(),
                    },
                );
            }
            Err(err) => warn!(key = %key, error = %err, "failed to snapshot value, not cached"),
        }
    }

    /// Last-known snapshot for `key`, stale or not.
    ///
    /// Expired entries are reported as stale.
    pub async fn peek<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<Snapshot<T>> {
        let state = self.state.read().await;
        let entry = state.entries.get(key)?;
        let value = serde_json::from_value(entry.value.clone()).ok()?;
        Some(Snapshot {
            value,
            stale: !self.is_fresh(entry),
        })
    }

    /// `Some(true)` if the key is cached but must be refetched, `None` if absent.
    pub async fn is_stale(&self, key: &CacheKey) -> Option<bool> {
        let state = self.state.read().await;
        state.entries.get(key).map(|entry| !self.is_fresh(entry))
    }

    /// Mark every key matching `target` stale. Returns the number of keys touched.
    pub async fn invalidate(&self, target: &Invalidation) -> usize {
        let mut state = self.state.write().await;
        *state.generations.entry(target.family()).or_insert(0) += 1;

        let mut touched = 0;
        for (key, entry) in &mut state.entries {
            if target.matches(key) {
                entry.stale = true;
                touched += 1;
            }
        }

        debug!(target = %target, touched, "cache invalidated");
        touched
    }

    /// Drop every entry.
    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        state.entries.clear();
        for generation in state.generations.values_mut() {
            *generation += 1;
        }
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.entries.is_empty()
    }

    fn is_fresh(&self, entry: &CacheEntry) -> bool {
        if entry.stale {
            return false;
        }
        self.ttl
            .is_none_or(|ttl| entry.stored_at.elapsed() < ttl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::ClientError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    async fn fetch_counted(counter: &AtomicUsize, value: &str) -> ClientResult<String> {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(value.to_string())
    }

    #[tokio::test]
    async fn test_read_through_caches_until_invalidated() {
        let cache = QueryCache::new();
        let calls = AtomicUsize::new(0);
        let key = CacheKey::list(EntityFamily::Agents);

        let first: String = cache
            .read_through(key.clone(), || fetch_counted(&calls, "v1"))
            .await
            .unwrap();
        let second: String = cache
            .read_through(key.clone(), || fetch_counted(&calls, "v2"))
            .await
            .unwrap();
        assert_eq!(first, "v1");
        assert_eq!(second, "v1");
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        cache.invalidate(&Invalidation::List(EntityFamily::Agents)).await;
        assert_eq!(cache.is_stale(&key).await, Some(true));

        let third: String = cache
            .read_through(key.clone(), || fetch_counted(&calls, "v3"))
            .await
            .unwrap();
        assert_eq!(third, "v3");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.is_stale(&key).await, Some(false));
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_previous_snapshot() {
        let cache = QueryCache::new();
        let key = CacheKey::detail(EntityFamily::Simulations, "s1");
        cache.put(key.clone(), &"old".to_string()).await;
        cache
            .invalidate(&Invalidation::Entity(EntityFamily::Simulations, "s1".to_string()))
            .await;

        let result: ClientResult<String> = cache
            .read_through(key.clone(), || async {
                Err(ClientError::request_failed("Internal Server Error", 500))
            })
            .await;
        assert_eq!(result.unwrap_err().status_code(), Some(500));

        let snapshot = cache.peek::<String>(&key).await.unwrap();
        assert_eq!(snapshot.value, "old");
        assert!(snapshot.stale);
    }

    #[tokio::test]
    async fn test_entity_invalidation_is_scoped() {
        let cache = QueryCache::new();
        cache.put(CacheKey::list(EntityFamily::Simulations), &1).await;
        cache.put(CacheKey::detail(EntityFamily::Simulations, "s1"), &2).await;
        cache.put(CacheKey::status("s1"), &3).await;
        cache.put(CacheKey::detail(EntityFamily::Simulations, "s2"), &4).await;
        cache.put(CacheKey::detail(EntityFamily::Agents, "s1"), &5).await;

        let touched = cache
            .invalidate(&Invalidation::Entity(EntityFamily::Simulations, "s1".to_string()))
            .await;
        assert_eq!(touched, 2);

        assert_eq!(cache.is_stale(&CacheKey::detail(EntityFamily::Simulations, "s1")).await, Some(true));
        assert_eq!(cache.is_stale(&CacheKey::status("s1")).await, Some(true));
        assert_eq!(cache.is_stale(&CacheKey::list(EntityFamily::Simulations)).await, Some(false));
        assert_eq!(cache.is_stale(&CacheKey::detail(EntityFamily::Simulations, "s2")).await, Some(false));
        assert_eq!(cache.is_stale(&CacheKey::detail(EntityFamily::Agents, "s1")).await, Some(false));
    }

    #[tokio::test]
    async fn test_family_invalidation_marks_everything_in_family() {
        let cache = QueryCache::new();
        cache.put(CacheKey::list(EntityFamily::Agents), &1).await;
        cache.put(CacheKey::detail(EntityFamily::Agents, "a1"), &2).await;
        cache.put(CacheKey::list(EntityFamily::Simulations), &3).await;

        let touched = cache.invalidate(&Invalidation::Family(EntityFamily::Agents)).await;
        assert_eq!(touched, 2);
        assert_eq!(cache.is_stale(&CacheKey::list(EntityFamily::Simulations)).await, Some(false));
    }

    #[tokio::test]
    async fn test_invalidation_during_fetch_stores_stale() {
        let cache = QueryCache::new();
        let key = CacheKey::list(EntityFamily::Simulations);

        let value: u32 = cache
            .read_through(key.clone(), || async {
                cache.invalidate(&Invalidation::List(EntityFamily::Simulations)).await;
                Ok(7)
            })
            .await
            .unwrap();

        assert_eq!(value, 7);
        assert_eq!(cache.is_stale(&key).await, Some(true));
    }

    #[tokio::test(start_paused = true)]
    async fn test_ttl_expires_entries() {
        let cache = QueryCache::with_ttl(Some(Duration::from_secs(10)));
        let key = CacheKey::detail(EntityFamily::Agents, "a1");
        cache.put(key.clone(), &"v1".to_string()).await;
        assert_eq!(cache.is_stale(&key).await, Some(false));

        tokio::time::advance(Duration::from_secs(11)).await;
        assert_eq!(cache.is_stale(&key).await, Some(true));

        let refreshed: String = cache
            .read_through(key.clone(), || async { Ok("v2".to_string()) })
            .await
            .unwrap();
        assert_eq!(refreshed, "v2");
    }

    #[tokio::test]
    async fn test_clear_and_len() {
        let cache = QueryCache::new();
        assert!(cache.is_empty().await);
        cache.put(CacheKey::status("s1"), &"running").await;
        assert_eq!(cache.len().await, 1);
        cache.clear().await;
        assert!(cache.is_empty().await);
        assert_eq!(cache.is_stale(&CacheKey::status("s1")).await, None);
    }

    #[test]
    fn test_key_display() {
        assert_eq!(CacheKey::list(EntityFamily::Agents).to_string(), "agents");
        assert_eq!(CacheKey::status("s1").to_string(), "simulations/s1/status");
        assert_eq!(
            Invalidation::Entity(EntityFamily::Simulations, "s1".to_string()).to_string(),
            "simulations/s1/*"
        );
    }
}
