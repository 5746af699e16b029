use log::{error, info, warn};

/// `Diagnostics` is the logging sink handed to the loader and the aggregator.
///
/// Components never log through a process-wide handle directly; they report
/// through whatever implementation the caller injects.
pub trait Diagnostics {
    /// Startup and summary facts.
    fn info(&self, message: &str);

    /// Recoverable anomalies: skipped lines, unknown protocols.
    fn warn(&self, message: &str);

    /// Fatal aborts, reported by the binary before it exits.
    fn error(&self, message: &str);
}

/// Forwards diagnostics to the `log` facade (and thus `env_logger`).
#[derive(Debug, Default, Clone, Copy)]
pub struct LogDiagnostics;

impl Diagnostics for LogDiagnostics {
    fn info(&self, message: &str) {
        info!("{}", message);
    }

    fn warn(&self, message: &str) {
        warn!("{}", message);
    }

    fn error(&self, message: &str) {
        error!("{}", message);
    }
}
