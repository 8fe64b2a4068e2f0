//! Progress events for streamed tool calls

use tracing::debug;

/// Maximum characters of a result kept in a `Finished` event
const SUMMARY_MAX_CHARS: usize = 120;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolEvent {
    Started { tool: String },
    Finished { tool: String, ok: bool, summary: String },
}

/// Receives progress events. Implementations decide how (and whether) to show them.
pub trait ToolObserver: Send + Sync {
    fn on_event(&self, event: &ToolEvent);
}

/// Default observer: logs events at debug level
pub struct TracingObserver;

impl ToolObserver for TracingObserver {
    fn on_event(&self, event: &ToolEvent) {
        match event {
            ToolEvent::Started { tool } => debug!("starting tool {}", tool),
            ToolEvent::Finished { tool, ok, summary } => {
                debug!("finished tool {} (ok={}): {}", tool, ok, summary)
            }
        }
    }
}

pub(crate) fn truncate_summary(s: &str) -> String {
    s.chars().take(SUMMARY_MAX_CHARS).collect()
}
