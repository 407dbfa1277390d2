//! Error Reporting
//!
//! Every failure surfaced by the resource adapters goes through
//! [`ErrorHandler::make_and_report_error`], so callers always receive a
//! [`Diagnostic`] carrying a short summary and a detailed message,
//! whatever went wrong underneath.

use std::fmt;
use std::sync::Mutex;

/// What went wrong underneath a [`Diagnostic`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ErrorKind {
    /// The request failed or the server answered with a non-success status
    #[error("transport error (status {status}): {message}")]
    Transport { status: u16, message: String },

    /// A successful call returned no body where one was expected
    #[error("no response for {api}")]
    EmptyResponse { api: String },

    /// A single-record lookup matched nothing
    #[error("no record found for {api}")]
    NotFound { api: String },

    /// A local structure could not be flattened into a request payload
    #[error("encode error: {0}")]
    Encode(String),

    /// A response could not be mapped onto the expected shape
    #[error("decode error: {0}")]
    Decode(String),
}

/// Caller-visible error: summary + detail, plus the underlying kind
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{summary}: {detail}")]
pub struct Diagnostic {
    pub summary: String,
    pub detail: String,
    pub kind: ErrorKind,
}

impl Diagnostic {
    pub fn new(summary: impl Into<String>, detail: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            summary: summary.into(),
            detail: detail.into(),
            kind,
        }
    }

    /// True when the diagnostic stands for "nothing matched" rather than a failure
    pub fn is_not_found(&self) -> bool {
        matches!(self.kind, ErrorKind::NotFound { .. })
    }

    /// HTTP status behind a transport failure, if any
    pub fn status_code(&self) -> Option<u16> {
        match self.kind {
            ErrorKind::Transport { status, .. } => Some(status),
            _ => None,
        }
    }
}

/// Builds and collects diagnostics for one unit of work
///
/// `context` is attached to every log line (typically the resource being
/// managed) so failures can be traced back in the log file.
pub struct ErrorHandler {
    context: String,
    diagnostics: Mutex<Vec<Diagnostic>>,
}

impl ErrorHandler {
    pub fn new(context: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            diagnostics: Mutex::new(Vec::new()),
        }
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    /// Log the error, record it, and hand it back to the caller
    pub fn make_and_report_error(
        &self,
        summary: impl Into<String>,
        detail: impl Into<String>,
        kind: ErrorKind,
    ) -> Diagnostic {
        let diagnostic = Diagnostic::new(summary, detail, kind);
        tracing::error!(
            context = %self.context,
            "{}: {}",
            diagnostic.summary,
            diagnostic.detail
        );

        // A poisoned lock only means another reporter panicked mid-push
        let mut diagnostics = match self.diagnostics.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        diagnostics.push(diagnostic.clone());

        diagnostic
    }

    /// All diagnostics reported so far, oldest first
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        match self.diagnostics.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.diagnostics().is_empty()
    }
}

impl Default for ErrorHandler {
    fn default() -> Self {
        Self::new("lifctl")
    }
}

impl fmt::Debug for ErrorHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorHandler")
            .field("context", &self.context)
            .field("diagnostics", &self.diagnostics().len())
            .finish()
    }
}
