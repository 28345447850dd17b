//! Backend identities, selection, isolation, and the backend contract.

pub mod contract;
pub mod identity;
pub mod isolate;
pub mod registry;
pub mod resolve;

pub use contract::{Backend, BackendFailure, CompileOrder, Invocation};
pub use identity::{BackendDescriptor, CompilerId, LATEST_COMPILER_ID};
pub use isolate::{
    BackendHandle, HandleCache, IsolatedEnv, IsolationError, IsolationManager, ParentFingerprint,
    BACKEND_GROUP_ID,
};
pub use registry::{
    select_backend, BackendProvider, BackendRegistry, BackendSelection, SelectionError,
    BACKEND_ARTIFACT_PREFIX,
};
pub use resolve::{default_compiler_id, suggested_compiler_id};
