//! Per-invocation runtime reports.

use serde::{Deserialize, Serialize};

/// Statistics of one engine invocation, serializable as a JSON object with
/// at least a `"runtime"` field in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RuntimeReport {
    /// Wall-clock runtime in milliseconds.
    #[serde(rename = "runtime")]
    pub runtime_ms: u64,
    /// Number of solver rounds (exact engine only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rounds: Option<usize>,
    /// Last probed layout size in tiles (exact engine only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_size: Option<usize>,
}

impl RuntimeReport {
    /// Creates a report carrying only the runtime.
    pub fn with_runtime(runtime_ms: u64) -> Self {
        RuntimeReport {
            runtime_ms,
            ..RuntimeReport::default()
        }
    }

    /// Renders the report as a JSON value.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).expect("report serialization cannot fail")
    }
}
