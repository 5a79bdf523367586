//! Narrative generation for packaged threads.
//!
//! Prose is produced by an external collaborator (typically a language
//! model call) behind [`NarrativeGenerator`]. This module ships a
//! deterministic [`TemplateNarrator`] and an LRU-caching wrapper.
//!
//! Generators receive a thread by reference and return text; they cannot
//! alter the thread's structural data.

use async_trait::async_trait;
use lru::LruCache;
use parking_lot::RwLock;
use std::num::NonZeroUsize;
use std::sync::Arc;

use crate::miner::ThreadPattern;
use crate::packager::{PackagedHop, PackagedThread, PaperRef};
use crate::types::RelationType;

/// Produces prose for a packaged thread.
#[async_trait]
pub trait NarrativeGenerator: Send + Sync {
    /// Error type for generation failures.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Describe the evolutionary story of a thread.
    ///
    /// Must tolerate threads with a single hop.
    async fn narrate(&self, thread: &PackagedThread) -> Result<String, Self::Error>;
}

/// Deterministic, offline narrator built from the thread structure.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateNarrator;

impl TemplateNarrator {
    /// Create a new template narrator.
    pub fn new() -> Self {
        Self
    }

    fn verb(relation_type: &RelationType) -> &'static str {
        match relation_type {
            RelationType::Overcomes => "overcomes a limitation of",
            RelationType::Extends => "extends",
            RelationType::Realizes => "realizes an idea from",
            RelationType::AdaptsTo => "adapts",
            RelationType::AlternativeTo => "offers an alternative to",
            RelationType::Baselines => "benchmarks against",
            RelationType::Cites | RelationType::Unknown(_) => "cites",
        }
    }

    fn name(paper: &PaperRef) -> String {
        let title = if paper.title.trim().is_empty() {
            paper.paper_id.as_str()
        } else {
            paper.title.trim()
        };
        match paper.year {
            Some(year) => format!("{title} ({year})"),
            None => title.to_string(),
        }
    }

    fn sentence(hop: &PackagedHop) -> String {
        format!(
            "{} {} {}.",
            Self::name(&hop.from_paper),
            Self::verb(&hop.relation_type),
            Self::name(&hop.to_paper)
        )
    }

    /// Render the narrative synchronously.
    pub fn render(&self, thread: &PackagedThread) -> String {
        let dominant = thread
            .relation_stats
            .dominant_relation
            .as_ref()
            .map(|r| r.label().to_string())
            .unwrap_or_else(|| "no single relation".to_string());
        let hops = thread.relation_chain.len();

        let mut text = match thread.thread_type {
            ThreadPattern::Chain => format!(
                "{}: a chain of {} {} dominated by {}.",
                thread.title,
                hops,
                if hops == 1 { "step" } else { "steps" },
                dominant
            ),
            ThreadPattern::Star => format!(
                "{}: {} routes branch from {}, dominated by {}.",
                thread.title,
                thread.routes.len(),
                thread
                    .center_paper
                    .as_ref()
                    .map(Self::name)
                    .unwrap_or_default(),
                dominant
            ),
        };

        let mut current_route = None;
        for hop in &thread.relation_chain {
            if hop.route_id.is_some() && hop.route_id != current_route {
                current_route = hop.route_id;
                if let Some(route_id) = current_route {
                    text.push_str(&format!(" Route {route_id}:"));
                }
            }
            text.push(' ');
            text.push_str(&Self::sentence(hop));
        }
        text
    }
}

#[async_trait]
impl NarrativeGenerator for TemplateNarrator {
    type Error = std::convert::Infallible;

    async fn narrate(&self, thread: &PackagedThread) -> Result<String, Self::Error> {
        Ok(self.render(thread))
    }
}

/// Configuration for the narrative cache.
#[derive(Debug, Clone)]
pub struct NarrativeCacheConfig {
    /// Maximum number of entries in the cache.
    pub max_entries: usize,
    /// Whether to enable the cache.
    pub enabled: bool,
}

impl Default for NarrativeCacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 1_000,
            enabled: true,
        }
    }
}

/// Cache statistics.
#[derive(Debug, Clone, Copy)]
pub struct CacheStats {
    /// Current number of entries in the cache.
    pub len: usize,
    /// Maximum capacity of the cache.
    pub cap: usize,
}

/// Wraps a generator with an LRU cache keyed by
/// [`PackagedThread::content_fingerprint`].
///
/// Re-running an analysis on an unchanged graph reuses earlier prose; any
/// edit to a title, year or paper claim in the thread misses the cache.
pub struct CachedNarrator<G> {
    inner: G,
    cache: Option<Arc<RwLock<LruCache<String, String>>>>,
}

impl<G: NarrativeGenerator> CachedNarrator<G> {
    /// Wrap a generator with the default cache configuration.
    pub fn new(inner: G) -> Self {
        Self::with_config(inner, NarrativeCacheConfig::default())
    }

    /// Wrap a generator with a custom cache configuration.
    pub fn with_config(inner: G, config: NarrativeCacheConfig) -> Self {
        let cache = config.enabled.then(|| {
            let size = NonZeroUsize::new(config.max_entries).unwrap_or(NonZeroUsize::MIN);
            Arc::new(RwLock::new(LruCache::new(size)))
        });
        Self { inner, cache }
    }

    /// The wrapped generator.
    pub fn inner(&self) -> &G {
        &self.inner
    }

    /// Get cache statistics.
    ///
    /// Returns `None` if caching is disabled.
    pub fn cache_stats(&self) -> Option<CacheStats> {
        self.cache.as_ref().map(|cache| {
            let cache = cache.read();
            CacheStats {
                len: cache.len(),
                cap: cache.cap().get(),
            }
        })
    }

    /// Clear the narrative cache.
    pub fn clear_cache(&self) {
        if let Some(cache) = &self.cache {
            cache.write().clear();
        }
    }
}

#[async_trait]
impl<G: NarrativeGenerator> NarrativeGenerator for CachedNarrator<G> {
    type Error = G::Error;

    async fn narrate(&self, thread: &PackagedThread) -> Result<String, Self::Error> {
        let Some(cache) = &self.cache else {
            return self.inner.narrate(thread).await;
        };

        let key = thread.content_fingerprint();
        // Read lock only; peek does not promote
        let cached = cache.read().peek(&key).cloned();
        if let Some(text) = cached {
            tracing::trace!(key = %key, thread_id = thread.thread_id, "Narrative cache hit");
            return Ok(text);
        }

        let text = self.inner.narrate(thread).await?;
        cache.write().put(key, text.clone());
        Ok(text)
    }
}
