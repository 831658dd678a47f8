//! Candidate model identity and validator context.

use serde::{Deserialize, Serialize};

/// Opaque validator handle passed through to the registry and the scorer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ValidatorContext {
    /// Hotkey the validator signs with.
    pub hotkey: String,

    /// Subnet the validator is evaluating.
    pub netuid: u16,

    /// Free-form collaborator-specific data.
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl ValidatorContext {
    pub fn new(hotkey: impl Into<String>, netuid: u16) -> Self {
        Self {
            hotkey: hotkey.into(),
            netuid,
            metadata: serde_json::Value::Null,
        }
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Identity and provenance of one candidate model.
///
/// Owned by the registry; the pipeline keeps a read-only copy per run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModelIdentity {
    /// Opaque model handle (repository path, URI, ...).
    pub model: String,

    /// Hotkey of the submitter.
    pub hotkey: String,

    /// Submitter uid on the subnet.
    pub uid: u16,

    /// Block at which the model was registered.
    pub block: u64,

    /// Competition the submission targets, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub competition_id: Option<String>,
}

impl ModelIdentity {
    pub fn new(model: impl Into<String>, hotkey: impl Into<String>, uid: u16, block: u64) -> Self {
        Self {
            model: model.into(),
            hotkey: hotkey.into(),
            uid,
            block,
            competition_id: None,
        }
    }

    pub fn with_competition(mut self, competition_id: impl Into<String>) -> Self {
        self.competition_id = Some(competition_id.into());
        self
    }

    /// The model handle.
    pub fn id(&self) -> &str {
        &self.model
    }
}

impl std::fmt::Display for ModelIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (uid {}, block {})", self.model, self.uid, self.block)
    }
}
