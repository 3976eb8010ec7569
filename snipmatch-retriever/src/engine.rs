//! The match engine: one-time initialization, concurrent queries and snapshot reloads.
//!
//! ```text
//! Uninitialized ──initialize()──> Loading ──ok──> Ready
//!                                    │
//!                                    └──err──> Failed ──initialize()──> Loading ...
//! ```
//!
//! Initialization loads the embedding provider and builds the corpus. It runs at most
//! once at a time: callers that arrive while an attempt is in progress wait for it and
//! receive its outcome, success or failure, instead of starting their own. Once the
//! engine is ready the provider is never loaded again. An attempt whose caller is
//! cancelled (for example by a timeout around `initialize`) leaves the state it started
//! from, and the next call starts over.
//!
//! The current corpus is an `Arc<Corpus>` snapshot. Queries clone the `Arc` and rank
//! against it without holding any lock, so a [`MatchEngine::reload`] that swaps in a
//! new snapshot never disturbs queries already running.

use crate::config::EngineConfig;
use crate::corpus::{Corpus, CorpusEntry, CorpusIndex, CorpusSource, JsonFileSource};
use crate::error::{EngineError, FatalInitError};
use crate::loader::{FastEmbedLoader, HashingLoader, ProviderLoader};
use crate::ranker::{self, MatchResult};
use parking_lot::RwLock;
use snipmatch_embed::embed_with_timeout;
use snipmatch_text::TextNormalizer;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// Default bound on embedding a single query.
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Lifecycle state of a [`MatchEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineState {
    Uninitialized,
    Loading,
    Ready,
    Failed,
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EngineState::Uninitialized => "uninitialized",
            EngineState::Loading => "loading",
            EngineState::Ready => "ready",
            EngineState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Per-query ranking options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchOptions {
    /// Maximum number of results; `<= 0` returns nothing
    pub top_k: i64,
    /// Minimum star rating; clamped into `1..=5`
    pub min_stars: i64,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            top_k: 3,
            min_stars: 2,
        }
    }
}

impl MatchOptions {
    pub fn new(top_k: i64, min_stars: i64) -> Self {
        Self { top_k, min_stars }
    }
}

/// Everything that exists only once the engine is ready.
struct Runtime {
    index: CorpusIndex,
    snapshot: RwLock<Arc<Corpus>>,
}

/// Bookkeeping guarded by the initialization lock.
#[derive(Default)]
struct InitRecord {
    last_error: Option<Arc<FatalInitError>>,
}

/// Holds the state at `Loading` for one initialization attempt.
///
/// If the attempt is dropped before [`AttemptGuard::finish`], the state goes back to what
/// it was before the attempt started, so a cancelled `initialize` can be retried.
struct AttemptGuard<'a> {
    state: &'a RwLock<EngineState>,
    previous: EngineState,
    finished: bool,
}

impl<'a> AttemptGuard<'a> {
    fn begin(state: &'a RwLock<EngineState>) -> Self {
        let previous = std::mem::replace(&mut *state.write(), EngineState::Loading);
        Self {
            state,
            previous,
            finished: false,
        }
    }

    fn finish(&mut self, outcome: EngineState) {
        *self.state.write() = outcome;
        self.finished = true;
    }
}

impl Drop for AttemptGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            warn!(
                "Match engine initialization was cancelled, returning to {}",
                self.previous
            );
            *self.state.write() = self.previous;
        }
    }
}

/// Snippet retrieval engine.
pub struct MatchEngine {
    source: Arc<dyn CorpusSource>,
    loader: Arc<dyn ProviderLoader>,
    normalizer: TextNormalizer,
    query_timeout: Duration,
    state: RwLock<EngineState>,
    runtime: OnceLock<Runtime>,
    init_lock: tokio::sync::Mutex<InitRecord>,
    /// Completed initialization attempts, successful or not
    attempts: AtomicU64,
    reload_lock: tokio::sync::Mutex<()>,
}

impl fmt::Debug for MatchEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatchEngine")
            .field("source", &self.source.describe())
            .field("loader", &self.loader.describe())
            .field("query_timeout", &self.query_timeout)
            .field("state", &self.state())
            .finish()
    }
}

impl MatchEngine {
    /// Create an uninitialized engine.
    pub fn new(source: Arc<dyn CorpusSource>, loader: Arc<dyn ProviderLoader>) -> Self {
        Self {
            source,
            loader,
            normalizer: TextNormalizer::new(),
            query_timeout: DEFAULT_QUERY_TIMEOUT,
            state: RwLock::new(EngineState::Uninitialized),
            runtime: OnceLock::new(),
            init_lock: tokio::sync::Mutex::new(InitRecord::default()),
            attempts: AtomicU64::new(0),
            reload_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Set how long a single query may spend being embedded.
    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    /// Create an uninitialized engine reading the corpus file and model named in `config`.
    ///
    /// With `config.offline` set, the feature-hashing provider replaces the fastembed model.
    pub fn from_config(config: &EngineConfig) -> Self {
        let source = Arc::new(JsonFileSource::new(&config.corpus_path));
        let loader: Arc<dyn ProviderLoader> = if config.offline {
            Arc::new(HashingLoader::default())
        } else {
            Arc::new(FastEmbedLoader::new(config.embed.clone()))
        };
        Self::new(source, loader).with_query_timeout(config.query_timeout())
    }

    pub fn state(&self) -> EngineState {
        *self.state.read()
    }

    pub fn query_timeout(&self) -> Duration {
        self.query_timeout
    }

    /// Bring the engine to [`EngineState::Ready`] and return the corpus snapshot.
    ///
    /// Returns immediately once ready. If an attempt is already running, waits for it
    /// and returns its result; a failure is returned to every caller that waited on that
    /// attempt. Calling again after a failure starts a new attempt.
    pub async fn initialize(&self) -> Result<Arc<Corpus>, EngineError> {
        if let Some(runtime) = self.runtime.get() {
            return Ok(runtime.snapshot.read().clone());
        }

        let seen_attempts = self.attempts.load(Ordering::Acquire);
        let mut record = self.init_lock.lock().await;

        if let Some(runtime) = self.runtime.get() {
            return Ok(runtime.snapshot.read().clone());
        }
        if self.attempts.load(Ordering::Acquire) != seen_attempts {
            // An attempt finished while we waited for the lock; it can only have failed
            if let Some(error) = &record.last_error {
                return Err(EngineError::Init(Arc::clone(error)));
            }
        }

        let mut attempt = AttemptGuard::begin(&self.state);
        info!(
            "Initializing match engine: {} with {}",
            self.source.describe(),
            self.loader.describe()
        );
        let started = Instant::now();

        let outcome = self.load_runtime().await;

        let result = match outcome {
            Ok(runtime) => {
                let snapshot = runtime.snapshot.read().clone();
                // Only the holder of `init_lock` sets the runtime, so this cannot fail
                let _ = self.runtime.set(runtime);
                record.last_error = None;
                attempt.finish(EngineState::Ready);
                info!(
                    "Match engine ready: {} snippets in {:.2?}",
                    snapshot.len(),
                    started.elapsed()
                );
                Ok(snapshot)
            }
            Err(fatal) => {
                error!("Match engine initialization failed: {}", fatal);
                let fatal = Arc::new(fatal);
                record.last_error = Some(Arc::clone(&fatal));
                attempt.finish(EngineState::Failed);
                Err(EngineError::Init(fatal))
            }
        };
        // Counted only once the outcome is visible to the next holder of `init_lock`
        self.attempts.fetch_add(1, Ordering::AcqRel);
        result
    }

    async fn load_runtime(&self) -> Result<Runtime, FatalInitError> {
        let provider = self.loader.load().await.map_err(FatalInitError::Model)?;
        let index = CorpusIndex::new(self.normalizer.clone(), provider);
        let records = self.source.load_records().await?;
        let corpus = index.build(records).await?;
        Ok(Runtime {
            index,
            snapshot: RwLock::new(Arc::new(corpus)),
        })
    }

    fn runtime(&self) -> Result<&Runtime, EngineError> {
        self.runtime.get().ok_or_else(|| EngineError::NotReady {
            state: self.state(),
        })
    }

    /// The current corpus snapshot.
    pub fn snapshot(&self) -> Result<Arc<Corpus>, EngineError> {
        Ok(self.runtime()?.snapshot.read().clone())
    }

    /// Find a snippet by title in the current snapshot.
    pub fn lookup(&self, title: &str) -> Result<Option<CorpusEntry>, EngineError> {
        Ok(self.snapshot()?.lookup(title).cloned())
    }

    /// Rank the corpus against `query`.
    ///
    /// Queries that normalize to nothing match nothing and are not embedded. A query
    /// whose embedding fails or exceeds the timeout returns
    /// [`EngineError::QueryEmbedding`]; the engine stays ready.
    pub async fn match_query(
        &self,
        query: &str,
        options: MatchOptions,
    ) -> Result<Vec<MatchResult>, EngineError> {
        let runtime = self.runtime()?;

        let normalized = runtime.index.normalizer().normalize(query);
        if normalized.is_empty() {
            info!("Query normalized to nothing; no matches");
            return Ok(Vec::new());
        }

        let corpus = runtime.snapshot.read().clone();
        if corpus.is_empty() || options.top_k <= 0 {
            return Ok(Vec::new());
        }

        let provider = runtime.index.provider();
        let embedding = embed_with_timeout(provider.as_ref(), &normalized, self.query_timeout)
            .await
            .inspect_err(|e| warn!("Failed to embed query '{}': {}", normalized, e))?;

        Ok(ranker::rank(
            &embedding,
            &corpus,
            options.top_k,
            options.min_stars,
        ))
    }

    /// Like [`MatchEngine::match_query`], for queries that arrive as JSON.
    ///
    /// Anything other than a string matches nothing.
    pub async fn match_value(
        &self,
        query: &serde_json::Value,
        options: MatchOptions,
    ) -> Result<Vec<MatchResult>, EngineError> {
        self.runtime()?;
        match query.as_str() {
            Some(text) => self.match_query(text, options).await,
            None => Ok(Vec::new()),
        }
    }

    /// Re-read the corpus source and swap in a freshly built snapshot.
    ///
    /// The new corpus is embedded with the already-loaded provider. On failure the
    /// previous snapshot stays in place. Snapshots already handed out are unaffected.
    pub async fn reload(&self) -> Result<Arc<Corpus>, EngineError> {
        let runtime = self.runtime()?;
        let _guard = self.reload_lock.lock().await;

        let started = Instant::now();
        let rebuilt = async {
            let records = self.source.load_records().await?;
            runtime.index.build(records).await
        }
        .await;

        match rebuilt {
            Ok(corpus) => {
                let corpus = Arc::new(corpus);
                let previous = std::mem::replace(&mut *runtime.snapshot.write(), Arc::clone(&corpus));
                info!(
                    "Corpus reloaded: {} -> {} snippets in {:.2?}",
                    previous.len(),
                    corpus.len(),
                    started.elapsed()
                );
                Ok(corpus)
            }
            Err(e) => {
                warn!("Corpus reload failed, keeping previous snapshot: {}", e);
                Err(EngineError::Reload(Arc::new(e)))
            }
        }
    }
}
