//! Home-automation collaborator seams.
//!
//! The conversation core never talks to a device registry directly. The host
//! implements these traits over its own service registry and state store.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Snapshot of one entity as read from the host's state store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityState {
    pub entity_id: String,
    /// Friendly name; empty when the entity has none.
    #[serde(default)]
    pub name: String,
    pub state: String,
}

impl EntityState {
    /// Friendly name, falling back to the entity id.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.entity_id
        } else {
            &self.name
        }
    }
}

/// Authorization context of the user who started the turn.
///
/// Passed through untouched to [`HomeActions::call_service`] so the host can
/// attribute and permission-check the side effect.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub request_id: Option<String>,
}

/// A validated request to run one service against one target.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceCall {
    pub domain: String,
    pub service: String,
    pub entity_id: String,
    /// Extra service parameters supplied by the model.
    pub data: Map<String, Value>,
}

impl ServiceCall {
    /// Service data as sent to the registry: the extra parameters plus
    /// `entity_id`. The target always wins over a model-supplied `entity_id`.
    pub fn service_data(&self) -> Value {
        let mut data = self.data.clone();
        data.insert("entity_id".into(), Value::String(self.entity_id.clone()));
        Value::Object(data)
    }

    /// `domain.service`, the form used in logs and refusal messages.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.domain, self.service)
    }
}

/// Failure reported by the action capability.
#[derive(thiserror::Error, Debug)]
pub enum HomeError {
    /// The registry rejected or failed the call (unknown entity, invalid
    /// parameters, device offline).
    #[error("{0}")]
    Service(String),

    /// Anything the registry did not anticipate.
    #[error("unexpected: {0}")]
    Unexpected(String),
}

/// Performs actions and reads state on the host platform.
#[async_trait::async_trait]
pub trait HomeActions: Send + Sync {
    /// Run a service call and wait for it to finish.
    async fn call_service(&self, call: &ServiceCall, ctx: &AuthContext) -> Result<(), HomeError>;

    /// Current state of a single entity, `None` when unknown.
    fn entity_state(&self, entity_id: &str) -> Option<EntityState>;
}

/// Lists the entities the user has exposed to the conversation agent.
pub trait ExposedEntities: Send + Sync {
    fn exposed_entities(&self) -> Vec<EntityState>;
}
