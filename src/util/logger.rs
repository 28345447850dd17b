//! Logging boundary between the host build tool and the bridge.
//!
//! The build tool owns the console; the bridge and its backends log
//! through a [`CompilerLogger`] handed in with the configuration.
//! [`TracingLogger`] is the default adapter onto the `tracing`
//! ecosystem; [`CapturingLogger`] additionally records error-level
//! output so javac console errors can be recovered after a failed
//! invocation.

use std::sync::{Arc, Mutex};

use tracing_subscriber::EnvFilter;

/// Install a global tracing subscriber for hosts that have none of
/// their own. Filtering is controlled by `CARAVEL_LOG` and defaults to
/// `info`. Safe to call more than once; only the first call wins.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_env("CARAVEL_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Logger contract satisfied by the host build tool.
///
/// Four levels, each with an enabled check so callers can skip
/// expensive message formatting.
pub trait CompilerLogger: Send + Sync {
    fn debug_enabled(&self) -> bool;
    fn debug(&self, message: &str);

    fn info_enabled(&self) -> bool;
    fn info(&self, message: &str);

    fn warn_enabled(&self) -> bool;
    fn warn(&self, message: &str);

    fn error_enabled(&self) -> bool;
    fn error(&self, message: &str);

    /// Log an error value with its cause chain at debug level.
    fn debug_error(&self, error: &anyhow::Error) {
        if self.debug_enabled() {
            self.debug(&format!("{error:?}"));
        }
    }

    /// Log an error value with its cause chain at error level.
    fn error_error(&self, error: &anyhow::Error) {
        if self.error_enabled() {
            self.error(&format!("{error:?}"));
        }
    }
}

/// Logger that forwards everything to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl CompilerLogger for TracingLogger {
    fn debug_enabled(&self) -> bool {
        tracing::enabled!(tracing::Level::DEBUG)
    }

    fn debug(&self, message: &str) {
        tracing::debug!("{message}");
    }

    fn info_enabled(&self) -> bool {
        tracing::enabled!(tracing::Level::INFO)
    }

    fn info(&self, message: &str) {
        tracing::info!("{message}");
    }

    fn warn_enabled(&self) -> bool {
        tracing::enabled!(tracing::Level::WARN)
    }

    fn warn(&self, message: &str) {
        tracing::warn!("{message}");
    }

    fn error_enabled(&self) -> bool {
        tracing::enabled!(tracing::Level::ERROR)
    }

    fn error(&self, message: &str) {
        tracing::error!("{message}");
    }
}

/// Logger that records error-level lines while delegating everything
/// to an inner logger.
///
/// Some backends report javac problems only as raw console text on the
/// error level; the recorded lines feed the fallback diagnostic parser.
pub struct CapturingLogger {
    inner: Arc<dyn CompilerLogger>,
    error_lines: Mutex<Vec<String>>,
}

impl CapturingLogger {
    pub fn new(inner: Arc<dyn CompilerLogger>) -> Self {
        CapturingLogger {
            inner,
            error_lines: Mutex::new(Vec::new()),
        }
    }

    /// Error-level lines recorded so far, in emission order.
    pub fn error_lines(&self) -> Vec<String> {
        self.error_lines.lock().unwrap().clone()
    }
}

impl CompilerLogger for CapturingLogger {
    fn debug_enabled(&self) -> bool {
        self.inner.debug_enabled()
    }

    fn debug(&self, message: &str) {
        self.inner.debug(message);
    }

    fn info_enabled(&self) -> bool {
        self.inner.info_enabled()
    }

    fn info(&self, message: &str) {
        self.inner.info(message);
    }

    fn warn_enabled(&self) -> bool {
        self.inner.warn_enabled()
    }

    fn warn(&self, message: &str) {
        self.inner.warn(message);
    }

    fn error_enabled(&self) -> bool {
        true
    }

    fn error(&self, message: &str) {
        self.error_lines.lock().unwrap().push(message.to_string());
        self.inner.error(message);
    }
}
