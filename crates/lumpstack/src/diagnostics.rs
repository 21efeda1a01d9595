//! Collects warning and error events for later inspection.
//!
//! Resource problems (undersized lumps, unnamed images, missing exact-path
//! files) are advisory: they are emitted through `tracing` and the load goes
//! on. [`DiagnosticLog`] is a [`tracing_subscriber::Layer`] that keeps a copy of
//! those events so a front end can summarise them and tests can count them.
//!
//! ```
//! use lumpstack::DiagnosticLog;
//! use tracing_subscriber::layer::SubscriberExt;
//!
//! let log = DiagnosticLog::new();
//! let subscriber = tracing_subscriber::registry().with(log.clone());
//! tracing::subscriber::with_default(subscriber, || {
//!     tracing::warn!("Invalid palette 'PLAYPAL'");
//! });
//! assert_eq!(log.warning_count(), 1);
//! ```

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::field::{Field, Visit};
use tracing::Level;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticLevel {
    Warning,
    Error,
}

impl fmt::Display for DiagnosticLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => f.write_str("warning"),
            Self::Error => f.write_str("error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub target: String,
    pub message: String,
}

/// Shared, clonable sink of WARN and ERROR events. Clones record into the
/// same list.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticLog {
    entries: Arc<Mutex<Vec<Diagnostic>>>,
}

impl DiagnosticLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Diagnostic>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn entries(&self) -> Vec<Diagnostic> {
        self.lock().clone()
    }

    pub fn warning_count(&self) -> usize {
        self.count(DiagnosticLevel::Warning)
    }

    pub fn error_count(&self) -> usize {
        self.count(DiagnosticLevel::Error)
    }

    fn count(&self, level: DiagnosticLevel) -> usize {
        self.lock().iter().filter(|d| d.level == level).count()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}

/// Joins an event's fields into one line, message first.
struct MessageVisitor {
    message: String,
}

impl MessageVisitor {
    fn push(&mut self, field: &Field, value: String) {
        if field.name() == "message" {
            if self.message.is_empty() {
                self.message = value;
            } else {
                self.message = format!("{} {}", value, self.message);
            }
        } else if self.message.is_empty() {
            self.message = format!("{}={}", field.name(), value);
        } else {
            self.message.push_str(&format!(" {}={}", field.name(), value));
        }
    }
}

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.push(field, format!("{:?}", value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.push(field, value.to_string());
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for DiagnosticLog {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let metadata = event.metadata();
        let level = match *metadata.level() {
            Level::ERROR => DiagnosticLevel::Error,
            Level::WARN => DiagnosticLevel::Warning,
            _ => return,
        };

        let mut visitor = MessageVisitor {
            message: String::new(),
        };
        event.record(&mut visitor);

        self.lock().push(Diagnostic {
            level,
            target: metadata.target().to_string(),
            message: visitor.message,
        });
    }
}
