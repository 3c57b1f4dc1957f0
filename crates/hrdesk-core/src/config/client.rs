//! Local client session configuration.

use serde::{Deserialize, Serialize};

/// Where a signed-in client keeps its persisted session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Path of the JSON session file.
    #[serde(default = "default_session_file")]
    pub session_file: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            session_file: default_session_file(),
        }
    }
}

fn default_session_file() -> String {
    ".hrdesk/session.json".to_string()
}
