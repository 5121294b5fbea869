use serde::{Deserialize, Serialize};

use crate::home::EntityState;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Home description
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Location metadata plus the entity table used by the development host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HomeConfig {
    /// Rendered into the prompt as `ha_name`.
    #[serde(default = "d_location_name")]
    pub location_name: String,
    /// IANA time zone name for `now()` in the prompt; UTC when unset.
    #[serde(default)]
    pub time_zone: Option<String>,
    #[serde(default)]
    pub entities: Vec<EntityConfig>,
}

impl Default for HomeConfig {
    fn default() -> Self {
        Self {
            location_name: d_location_name(),
            time_zone: None,
            entities: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityConfig {
    pub entity_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default = "d_state")]
    pub state: String,
    /// Whether the conversation agent may see this entity.
    #[serde(default = "d_true")]
    pub exposed: bool,
}

impl EntityConfig {
    pub fn to_state(&self) -> EntityState {
        EntityState {
            entity_id: self.entity_id.clone(),
            name: self.name.clone(),
            state: self.state.clone(),
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_location_name() -> String {
    "Home".into()
}
fn d_state() -> String {
    "unknown".into()
}
fn d_true() -> bool {
    true
}
