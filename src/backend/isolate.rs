//! Isolated backend environments and the process-wide handle cache.
//!
//! A backend is loaded with a private classpath (its own artifact plus
//! the transitive dependency closure) so its dependencies never leak
//! into, or collide with, the host build tool's own. The environment
//! records a fingerprint of the host context that was current when it
//! was built: a cached handle is only valid while that parent
//! fingerprint is unchanged. When the host reloads its own module set
//! between calls, every handle built under the old context is
//! discarded and rebuilt, never reused.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use miette::Diagnostic;
use thiserror::Error;

use crate::artifact::{ArtifactResolver, ResolveError};
use crate::backend::contract::Backend;
use crate::backend::registry::{BackendRegistry, BackendSelection};
use crate::core::coordinate::Coordinate;
use crate::util::hash::sha256_str;

/// Group id under which well-known backend artifacts are published.
pub const BACKEND_GROUP_ID: &str = "build.caravel";

/// Fingerprint of the host build tool's own loading context.
///
/// Opaque; two fingerprints are either equal or not. The host derives
/// one from whatever defines its context identity (its own classpath,
/// a reload generation counter, a session id).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParentFingerprint(String);

impl ParentFingerprint {
    /// Fingerprint from an opaque token.
    pub fn from_token(token: impl Into<String>) -> Self {
        ParentFingerprint(sha256_str(&token.into()))
    }

    /// Fingerprint over the host context's visible artifact paths.
    pub fn from_paths<'a>(paths: impl IntoIterator<Item = &'a PathBuf>) -> Self {
        let mut joined = String::new();
        for path in paths {
            joined.push_str(&path.to_string_lossy());
            joined.push('\n');
        }
        ParentFingerprint(sha256_str(&joined))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ParentFingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Short prefix is plenty for log correlation.
        write!(f, "{}", &self.0[..12.min(self.0.len())])
    }
}

/// Private loading environment for one backend.
#[derive(Debug, Clone)]
pub struct IsolatedEnv {
    pub backend: BackendSelection,

    /// Backend artifact plus its transitive dependency closure.
    pub classpath: Vec<PathBuf>,

    /// Host context this environment was built under.
    pub parent: ParentFingerprint,
}

/// A cached, instantiated backend with its environment.
pub struct BackendHandle {
    pub env: IsolatedEnv,
    pub backend: Arc<dyn Backend>,
}

/// Isolation failure.
#[derive(Debug, Error, Diagnostic)]
pub enum IsolationError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Resolution(#[from] ResolveError),

    /// Implementation discovery found the wrong number of providers.
    #[error("expected exactly one backend implementation for `{backend}`, found {found}")]
    #[diagnostic(
        code(caravel::isolate::provider_cardinality),
        help("Exactly one backend implementation must be registered for the selected backend")
    )]
    ProviderCardinality {
        backend: BackendSelection,
        found: usize,
    },

    #[error("failed to instantiate backend `{backend}`")]
    #[diagnostic(code(caravel::isolate::instantiate))]
    Instantiate {
        backend: BackendSelection,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

type Slot = Arc<Mutex<Option<Arc<BackendHandle>>>>;

/// Process-wide cache of isolated backend handles, keyed by selection.
///
/// Lookups of different backends never contend. Creation for one
/// backend is serialized by a per-key mutex, so concurrent callers
/// requesting the same uncached backend build exactly one environment
/// and the rest wait for it. A failed build leaves the slot empty.
#[derive(Default)]
pub struct HandleCache {
    slots: DashMap<BackendSelection, Slot>,
}

impl HandleCache {
    pub fn new() -> Self {
        HandleCache::default()
    }

    /// Get the cached handle for `selection`, rebuilding when absent or
    /// when its parent fingerprint no longer matches `parent`.
    pub fn get_or_create<F>(
        &self,
        selection: &BackendSelection,
        parent: &ParentFingerprint,
        build: F,
    ) -> Result<Arc<BackendHandle>, IsolationError>
    where
        F: FnOnce() -> Result<BackendHandle, IsolationError>,
    {
        let slot = self.slots.entry(selection.clone()).or_default().clone();

        // Per-key lock: readers of other backends proceed, a rebuild of
        // this backend is atomic with respect to its readers.
        let mut guard = slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(handle) = guard.as_ref() {
            if handle.env.parent == *parent {
                tracing::debug!("using cached backend environment for `{selection}`");
                return Ok(Arc::clone(handle));
            }
            tracing::debug!(
                "invalidated cached backend environment for `{selection}`: parent context changed from {} to {}",
                handle.env.parent,
                parent
            );
            *guard = None;
        } else {
            tracing::debug!("no cached backend environment for `{selection}`");
        }

        let handle = Arc::new(build()?);
        *guard = Some(Arc::clone(&handle));
        Ok(handle)
    }

    /// Number of backends with a live cached handle.
    pub fn len(&self) -> usize {
        self.slots
            .iter()
            .filter(|entry| entry.value().lock().map(|g| g.is_some()).unwrap_or(false))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Builds isolated environments and instantiates backends in them.
pub struct IsolationManager {
    cache: HandleCache,

    /// Version of the well-known backend artifacts to resolve; normally
    /// the bridge's own version.
    backend_version: String,
}

impl IsolationManager {
    pub fn new() -> Self {
        IsolationManager {
            cache: HandleCache::new(),
            backend_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn with_backend_version(mut self, version: impl Into<String>) -> Self {
        self.backend_version = version.into();
        self
    }

    /// Get or build the isolated backend handle for `selection`.
    pub fn get_or_create(
        &self,
        selection: &BackendSelection,
        parent: &ParentFingerprint,
        registry: &BackendRegistry,
        resolver: &dyn ArtifactResolver,
    ) -> Result<Arc<BackendHandle>, IsolationError> {
        self.cache.get_or_create(selection, parent, || {
            let env = self.build_env(selection, parent, resolver)?;
            let backend = registry.instantiate(&env)?;
            Ok(BackendHandle { env, backend })
        })
    }

    /// Number of backends with a live cached handle.
    pub fn cached_handles(&self) -> usize {
        self.cache.len()
    }

    fn backend_coordinate(&self, selection: &BackendSelection) -> Coordinate {
        match selection {
            BackendSelection::WellKnown(id) => Coordinate::new(
                BACKEND_GROUP_ID,
                id.backend_artifact_id(),
                self.backend_version.clone(),
            ),
            BackendSelection::Custom(coordinate) => coordinate.clone(),
        }
    }

    fn build_env(
        &self,
        selection: &BackendSelection,
        parent: &ParentFingerprint,
        resolver: &dyn ArtifactResolver,
    ) -> Result<IsolatedEnv, IsolationError> {
        let coordinate = self.backend_coordinate(selection);

        let artifact = resolver.resolve(&coordinate)?;
        let closure = resolver.resolve_transitive(&coordinate, &|_| false)?;

        let mut classpath = Vec::with_capacity(closure.len() + 1);
        classpath.push(artifact);
        for file in closure {
            if !classpath.contains(&file) {
                classpath.push(file);
            }
        }

        tracing::debug!(
            "built isolated environment for `{selection}` with {} classpath entries under parent {parent}",
            classpath.len()
        );

        Ok(IsolatedEnv {
            backend: selection.clone(),
            classpath,
            parent: parent.clone(),
        })
    }
}

impl Default for IsolationManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::contract::{BackendFailure, Invocation};
    use crate::backend::identity::CompilerId;
    use crate::core::analysis::{Analysis, FileAnalysis};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug)]
    struct StubBackend;

    impl Backend for StubBackend {
        fn default_scala_version(&self) -> &str {
            "3.4.2"
        }
        fn default_zinc_version(&self) -> &str {
            "2.0.5"
        }
        fn compile(&self, _: &Invocation) -> Result<Box<dyn Analysis>, BackendFailure> {
            Ok(Box::new(FileAnalysis::new()))
        }
    }

    fn selection() -> BackendSelection {
        BackendSelection::WellKnown(CompilerId::Zinc205)
    }

    fn handle(parent: &ParentFingerprint) -> BackendHandle {
        BackendHandle {
            env: IsolatedEnv {
                backend: selection(),
                classpath: vec![PathBuf::from("/repo/backend.jar")],
                parent: parent.clone(),
            },
            backend: Arc::new(StubBackend),
        }
    }

    #[test]
    fn test_cache_reuses_handle_while_parent_unchanged() {
        let cache = HandleCache::new();
        let parent = ParentFingerprint::from_token("host-1");
        let builds = AtomicUsize::new(0);

        let first = cache
            .get_or_create(&selection(), &parent, || {
                builds.fetch_add(1, Ordering::SeqCst);
                Ok(handle(&parent))
            })
            .unwrap();
        let second = cache
            .get_or_create(&selection(), &parent, || {
                builds.fetch_add(1, Ordering::SeqCst);
                Ok(handle(&parent))
            })
            .unwrap();

        assert_eq!(builds.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_concurrent_callers_build_once_and_share_handle() {
        let cache = HandleCache::new();
        let parent = ParentFingerprint::from_token("host-1");
        let builds = AtomicUsize::new(0);

        let handles: Vec<Arc<BackendHandle>> = std::thread::scope(|scope| {
            let threads: Vec<_> = (0..8)
                .map(|_| {
                    scope.spawn(|| {
                        cache
                            .get_or_create(&selection(), &parent, || {
                                builds.fetch_add(1, Ordering::SeqCst);
                                // Widen the window in which other
                                // callers arrive at the same slot.
                                std::thread::sleep(std::time::Duration::from_millis(20));
                                Ok(handle(&parent))
                            })
                            .unwrap()
                    })
                })
                .collect();
            threads.into_iter().map(|t| t.join().unwrap()).collect()
        });

        assert_eq!(builds.load(Ordering::SeqCst), 1);
        assert!(handles.iter().all(|h| Arc::ptr_eq(h, &handles[0])));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_rebuilds_when_parent_changes() {
        let cache = HandleCache::new();
        let old_parent = ParentFingerprint::from_token("host-1");
        let new_parent = ParentFingerprint::from_token("host-2");

        let first = cache
            .get_or_create(&selection(), &old_parent, || Ok(handle(&old_parent)))
            .unwrap();
        let second = cache
            .get_or_create(&selection(), &new_parent, || Ok(handle(&new_parent)))
            .unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(second.env.parent, new_parent);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_distinct_backends_cached_independently() {
        let cache = HandleCache::new();
        let parent = ParentFingerprint::from_token("host-1");
        let custom =
            BackendSelection::Custom(Coordinate::new("org.example", "my-backend", "1.0.0"));

        cache
            .get_or_create(&selection(), &parent, || Ok(handle(&parent)))
            .unwrap();
        cache
            .get_or_create(&custom, &parent, || {
                Ok(BackendHandle {
                    env: IsolatedEnv {
                        backend: custom.clone(),
                        classpath: Vec::new(),
                        parent: parent.clone(),
                    },
                    backend: Arc::new(StubBackend),
                })
            })
            .unwrap();

        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_failed_build_does_not_poison_cache() {
        let cache = HandleCache::new();
        let parent = ParentFingerprint::from_token("host-1");

        let failed = cache.get_or_create(&selection(), &parent, || {
            Err(IsolationError::ProviderCardinality {
                backend: selection(),
                found: 0,
            })
        });
        assert!(failed.is_err());
        assert!(cache.is_empty());

        // Next attempt builds normally.
        let handle = cache
            .get_or_create(&selection(), &parent, || Ok(handle(&parent)))
            .unwrap();
        assert_eq!(handle.env.backend, selection());
    }

    #[test]
    fn test_fingerprint_from_paths_is_order_sensitive_and_stable() {
        let a = PathBuf::from("/repo/a.jar");
        let b = PathBuf::from("/repo/b.jar");

        let fp1 = ParentFingerprint::from_paths([&a, &b]);
        let fp2 = ParentFingerprint::from_paths([&a, &b]);
        let fp3 = ParentFingerprint::from_paths([&b, &a]);

        assert_eq!(fp1, fp2);
        assert_ne!(fp1, fp3);
    }
}
