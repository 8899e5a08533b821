//! Persisted graph configuration
//!
//! Configurations are stored as JSON blobs. Decoding is deliberately
//! forgiving in release builds: a malformed blob is logged and treated as
//! absent so one corrupt row cannot break loading everything else. Debug
//! builds panic instead, so schema drift is caught during development.

use crate::error::{EngineError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Stored definition of one scripted graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphScriptConfig {
    /// Display name of the graph.
    pub name: String,
    /// The script source evaluated to render the graph.
    pub script: String,
    /// Identifiers of the tracked features whose samples the script binds.
    #[serde(default)]
    pub feature_ids: Vec<i64>,
}

/// Encode a configuration for storage.
pub fn encode_config<T: Serialize>(config: &T) -> Result<String> {
    serde_json::to_string(config).map_err(|e| EngineError::Serialization(e.to_string()))
}

/// Decode a stored configuration blob. Returns `None` (release) or panics
/// (debug) when the blob does not match the expected shape.
pub fn decode_config<T: DeserializeOwned>(json: &str) -> Option<T> {
    match serde_json::from_str(json) {
        Ok(config) => Some(config),
        Err(e) => {
            if cfg!(debug_assertions) {
                panic!("Malformed stored config: {e}");
            }
            tracing::warn!("Failed to decode stored config, ignoring it: {}", e);
            None
        }
    }
}
