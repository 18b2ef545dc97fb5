use serde::{Deserialize, Serialize};

use crate::api::types::StudyLevel;

const SCHEMA_VERSION: u32 = 1;

/// What survives a restart: the backend's opaque bearer token plus the
/// display data shown before verification completes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    #[serde(rename = "session_token", alias = "sessionToken")]
    pub token: String,
    #[serde(default, alias = "displayName")]
    pub display_name: String,
    #[serde(default, alias = "studyLevel")]
    pub study_level: StudyLevel,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl Session {
    pub fn new(token: impl Into<String>, display_name: impl Into<String>, study_level: StudyLevel) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            token: token.into(),
            display_name: display_name.into(),
            study_level,
        }
    }

    /// Stale schema or an empty token means the file cannot be trusted.
    pub fn needs_reset(&self) -> bool {
        self.schema_version != SCHEMA_VERSION || self.token.trim().is_empty()
    }
}
