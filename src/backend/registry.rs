//! Backend registry: declared-backend selection and provider lookup.
//!
//! A host project may declare the backend to use on the bridge's own
//! dependency list, either one well-known backend artifact or one
//! custom implementation. Declaring none selects a well-known default
//! from the configured versions. Declaring more than one is a
//! configuration error, reported with concrete remediation steps.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use miette::Diagnostic;
use thiserror::Error;

use crate::backend::contract::Backend;
use crate::backend::identity::{CompilerId, LATEST_COMPILER_ID};
use crate::backend::isolate::{IsolatedEnv, IsolationError, BACKEND_GROUP_ID};
use crate::backend::resolve::suggested_compiler_id;
use crate::core::coordinate::Coordinate;

/// Prefix shared by all well-known backend artifact ids.
pub const BACKEND_ARTIFACT_PREFIX: &str = "caravel-backend-";

/// Outcome of inspecting the declared-backend slot. Also the key under
/// which isolated environments are cached.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BackendSelection {
    /// A well-known backend, either declared or defaulted.
    WellKnown(CompilerId),

    /// A custom backend implementation declared by coordinate.
    Custom(Coordinate),
}

impl fmt::Display for BackendSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendSelection::WellKnown(id) => write!(f, "{id}"),
            BackendSelection::Custom(coordinate) => write!(f, "{coordinate}"),
        }
    }
}

/// Declared-backend configuration error.
#[derive(Debug, Error, Diagnostic)]
pub enum SelectionError {
    #[error("too many backends declared on the plugin dependency list ({count})")]
    #[diagnostic(code(caravel::registry::too_many_backends), help("{remediation}"))]
    TooManyBackends { count: usize, remediation: String },

    #[error("declared backend artifact `{artifact_id}` is not a known backend")]
    #[diagnostic(
        code(caravel::registry::unknown_backend),
        help("Known well-known backends: caravel-backend-zinc19, caravel-backend-zinc200, caravel-backend-zinc201, caravel-backend-zinc205")
    )]
    UnknownWellKnown { artifact_id: String },
}

fn remediation_text(suggested: Option<CompilerId>) -> String {
    let examples = match suggested {
        Some(id) => format!("`{BACKEND_GROUP_ID}:{BACKEND_ARTIFACT_PREFIX}{id}`"),
        None => format!(
            "`{BACKEND_GROUP_ID}:{BACKEND_ARTIFACT_PREFIX}{LATEST_COMPILER_ID}` \
             or `{BACKEND_GROUP_ID}:{BACKEND_ARTIFACT_PREFIX}zinc19`"
        ),
    };
    format!(
        "Either remove all backend declarations to use the default backend \
         for your configured versions, or declare exactly one well-known \
         backend artifact (e.g. {examples}), or declare exactly one custom \
         backend implementation. ONLY ONE!"
    )
}

fn well_known_id(coordinate: &Coordinate) -> Option<Result<CompilerId, SelectionError>> {
    if coordinate.group != BACKEND_GROUP_ID {
        return None;
    }
    let suffix = coordinate.artifact.strip_prefix(BACKEND_ARTIFACT_PREFIX)?;
    Some(suffix.parse::<CompilerId>().map_err(|_| {
        SelectionError::UnknownWellKnown {
            artifact_id: coordinate.artifact.clone(),
        }
    }))
}

/// Select the backend for a project from its declared backends and its
/// configured versions.
///
/// With an empty slot the well-known default for the versions wins;
/// with exactly one declaration that declaration wins; anything more
/// is rejected.
pub fn select_backend(
    declared: &[Coordinate],
    zinc_version: Option<&str>,
    framework_version: Option<&str>,
) -> Result<BackendSelection, SelectionError> {
    match declared {
        [] => {
            let id = suggested_compiler_id(zinc_version, framework_version)
                .unwrap_or(LATEST_COMPILER_ID);
            tracing::debug!("no backend declared, selected well-known default `{id}`");
            Ok(BackendSelection::WellKnown(id))
        }
        [only] => match well_known_id(only) {
            Some(id) => {
                let id = id?;
                tracing::debug!("using declared well-known backend `{id}`");
                Ok(BackendSelection::WellKnown(id))
            }
            None => {
                tracing::debug!("using declared custom backend `{only}`");
                Ok(BackendSelection::Custom(only.clone()))
            }
        },
        many => Err(SelectionError::TooManyBackends {
            count: many.len(),
            remediation: remediation_text(suggested_compiler_id(
                zinc_version,
                framework_version,
            )),
        }),
    }
}

/// Creates backend instances inside a prepared isolated environment.
pub trait BackendProvider: Send + Sync {
    fn create(
        &self,
        env: &IsolatedEnv,
    ) -> Result<Arc<dyn Backend>, Box<dyn std::error::Error + Send + Sync>>;
}

/// Registered backend implementations.
///
/// Instantiation requires exactly one provider per backend: none means
/// the backend artifact shipped without an implementation, more than
/// one means conflicting implementations ended up on the same list.
/// Both are environment defects, not user errors.
#[derive(Default)]
pub struct BackendRegistry {
    well_known: HashMap<CompilerId, Vec<Arc<dyn BackendProvider>>>,
    custom: Vec<Arc<dyn BackendProvider>>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        BackendRegistry::default()
    }

    pub fn register(&mut self, id: CompilerId, provider: Arc<dyn BackendProvider>) {
        self.well_known.entry(id).or_default().push(provider);
    }

    /// Register the provider for a declared custom backend.
    pub fn register_custom(&mut self, provider: Arc<dyn BackendProvider>) {
        self.custom.push(provider);
    }

    pub fn with_provider(mut self, id: CompilerId, provider: Arc<dyn BackendProvider>) -> Self {
        self.register(id, provider);
        self
    }

    pub fn with_custom_provider(mut self, provider: Arc<dyn BackendProvider>) -> Self {
        self.register_custom(provider);
        self
    }

    /// Instantiate the backend selected by `env`.
    pub fn instantiate(&self, env: &IsolatedEnv) -> Result<Arc<dyn Backend>, IsolationError> {
        let found = match &env.backend {
            BackendSelection::WellKnown(id) => {
                self.well_known.get(id).map(Vec::as_slice).unwrap_or(&[])
            }
            BackendSelection::Custom(_) => self.custom.as_slice(),
        };
        match found {
            [only] => only
                .create(env)
                .map_err(|source| IsolationError::Instantiate {
                    backend: env.backend.clone(),
                    source,
                }),
            other => Err(IsolationError::ProviderCardinality {
                backend: env.backend.clone(),
                found: other.len(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::contract::{BackendFailure, Invocation};
    use crate::backend::isolate::ParentFingerprint;
    use crate::core::analysis::{Analysis, FileAnalysis};

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

    struct StubProvider;

    impl BackendProvider for StubProvider {
        fn create(
            &self,
            _: &IsolatedEnv,
        ) -> Result<Arc<dyn Backend>, Box<dyn std::error::Error + Send + Sync>> {
            Ok(Arc::new(StubBackend))
        }
    }

    fn env(backend: BackendSelection) -> IsolatedEnv {
        IsolatedEnv {
            backend,
            classpath: Vec::new(),
            parent: ParentFingerprint::from_token("host"),
        }
    }

    fn well_known(id: &str) -> Coordinate {
        Coordinate::new(
            BACKEND_GROUP_ID,
            format!("{BACKEND_ARTIFACT_PREFIX}{id}"),
            "0.3.0",
        )
    }

    #[test]
    fn test_empty_slot_selects_default_from_versions() {
        let selection = select_backend(&[], Some("2.0.1"), None).unwrap();
        assert_eq!(selection, BackendSelection::WellKnown(CompilerId::Zinc201));

        let selection = select_backend(&[], None, None).unwrap();
        assert_eq!(selection, BackendSelection::WellKnown(CompilerId::Zinc205));
    }

    #[test]
    fn test_single_well_known_declaration_wins_over_versions() {
        let declared = vec![well_known("zinc19")];
        let selection = select_backend(&declared, Some("2.0.5"), None).unwrap();
        assert_eq!(selection, BackendSelection::WellKnown(CompilerId::Zinc19));
    }

    #[test]
    fn test_single_custom_declaration() {
        let custom = Coordinate::new("org.example", "my-backend", "1.0.0");
        let selection = select_backend(std::slice::from_ref(&custom), None, None).unwrap();
        assert_eq!(selection, BackendSelection::Custom(custom));
    }

    #[test]
    fn test_too_many_declarations_rejected_with_remediation() {
        let declared = vec![well_known("zinc205"), well_known("zinc19")];
        let err = select_backend(&declared, Some("1.9.6"), None).unwrap_err();
        match err {
            SelectionError::TooManyBackends { count, remediation } => {
                assert_eq!(count, 2);
                // Suggestion is targeted at the configured versions.
                assert!(remediation.contains("zinc19"));
                assert!(remediation.contains("ONLY ONE!"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unknown_well_known_artifact_rejected() {
        let declared = vec![well_known("zinc999")];
        let err = select_backend(&declared, None, None).unwrap_err();
        assert!(matches!(err, SelectionError::UnknownWellKnown { .. }));
    }

    #[test]
    fn test_registry_requires_exactly_one_provider() {
        let selection = BackendSelection::WellKnown(CompilerId::Zinc205);

        let empty = BackendRegistry::new();
        let err = empty.instantiate(&env(selection.clone())).unwrap_err();
        assert!(matches!(
            err,
            IsolationError::ProviderCardinality { found: 0, .. }
        ));

        let duplicated = BackendRegistry::new()
            .with_provider(CompilerId::Zinc205, Arc::new(StubProvider))
            .with_provider(CompilerId::Zinc205, Arc::new(StubProvider));
        let err = duplicated.instantiate(&env(selection.clone())).unwrap_err();
        assert!(matches!(
            err,
            IsolationError::ProviderCardinality { found: 2, .. }
        ));

        let ok = BackendRegistry::new().with_provider(CompilerId::Zinc205, Arc::new(StubProvider));
        assert!(ok.instantiate(&env(selection)).is_ok());
    }

    #[test]
    fn test_custom_provider_lookup() {
        let custom = BackendSelection::Custom(Coordinate::new("org.example", "my-backend", "1.0.0"));

        let registry = BackendRegistry::new().with_custom_provider(Arc::new(StubProvider));
        assert!(registry.instantiate(&env(custom.clone())).is_ok());

        let empty = BackendRegistry::new();
        assert!(matches!(
            empty.instantiate(&env(custom)).unwrap_err(),
            IsolationError::ProviderCardinality { found: 0, .. }
        ));
    }
}
