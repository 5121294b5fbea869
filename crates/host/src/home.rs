//! In-memory stand-in for a home-automation registry.
//!
//! Entities come from `[home.entities]` in the config file. Service calls
//! change entity state the way a real device would report it afterwards,
//! so a chat session can be exercised end to end without hardware.

use std::collections::BTreeMap;

use parking_lot::RwLock;

use mc_domain::config::HomeConfig;
use mc_domain::home::{AuthContext, EntityState, ExposedEntities, HomeActions, HomeError, ServiceCall};

#[derive(Debug, Clone)]
struct Entity {
    name: String,
    state: String,
    exposed: bool,
}

/// One service call the simulated home accepted.
#[derive(Debug, Clone, PartialEq)]
pub struct CallRecord {
    pub call: ServiceCall,
    /// Payload a registry would receive, `entity_id` included.
    pub data: serde_json::Value,
    pub user_id: Option<String>,
}

pub struct SimulatedHome {
    entities: RwLock<BTreeMap<String, Entity>>,
    log: RwLock<Vec<CallRecord>>,
}

impl SimulatedHome {
    pub fn from_config(cfg: &HomeConfig) -> Self {
        let entities = cfg
            .entities
            .iter()
            .map(|e| {
                (
                    e.entity_id.clone(),
                    Entity {
                        name: e.name.clone(),
                        state: e.state.clone(),
                        exposed: e.exposed,
                    },
                )
            })
            .collect();
        Self {
            entities: RwLock::new(entities),
            log: RwLock::new(Vec::new()),
        }
    }

    /// Every entity, exposed or not, in id order.
    pub fn all_entities(&self) -> Vec<(EntityState, bool)> {
        self.entities
            .read()
            .iter()
            .map(|(id, e)| (to_state(id, e), e.exposed))
            .collect()
    }

    pub fn call_log(&self) -> Vec<CallRecord> {
        self.log.read().clone()
    }
}

fn to_state(entity_id: &str, e: &Entity) -> EntityState {
    EntityState {
        entity_id: entity_id.to_string(),
        name: e.name.clone(),
        state: e.state.clone(),
    }
}

/// State after running `service` on an entity currently in `current`.
///
/// `None` means the service is not something the simulation understands.
/// `Some(None)` means the service runs but leaves state alone.
fn next_state(service: &str, current: &str) -> Option<Option<&'static str>> {
    let next = match service {
        "turn_on" => Some("on"),
        "turn_off" => Some("off"),
        "toggle" => Some(if current == "on" { "off" } else { "on" }),
        "open_cover" => Some("open"),
        "close_cover" => Some("closed"),
        "stop_cover" => Some("stopped"),
        "lock" => Some("locked"),
        "unlock" => Some("unlocked"),
        "media_play" => Some("playing"),
        "media_pause" => Some("paused"),
        "media_stop" => Some("idle"),
        "alarm_arm_away" => Some("armed_away"),
        "alarm_arm_home" => Some("armed_home"),
        "alarm_disarm" => Some("disarmed"),
        "volume_up" | "volume_down" | "trigger" => None,
        _ => return None,
    };
    Some(next)
}

#[async_trait::async_trait]
impl HomeActions for SimulatedHome {
    async fn call_service(&self, call: &ServiceCall, ctx: &AuthContext) -> Result<(), HomeError> {
        let entity_domain = call.entity_id.split('.').next().unwrap_or_default();
        if call.domain != "homeassistant" && entity_domain != call.domain {
            return Err(HomeError::Service(format!(
                "{} is not a {} entity",
                call.entity_id, call.domain
            )));
        }

        let mut entities = self.entities.write();
        let entity = entities
            .get_mut(&call.entity_id)
            .ok_or_else(|| HomeError::Service(format!("unknown entity {}", call.entity_id)))?;

        let next = next_state(&call.service, &entity.state).ok_or_else(|| {
            HomeError::Service(format!("service {} is not supported", call.qualified_name()))
        })?;

        // Scenes and scripts activate without holding an on/off state.
        let stateless = matches!(entity_domain, "scene" | "script");
        if let (Some(next), false) = (next, stateless) {
            tracing::debug!(entity_id = %call.entity_id, from = %entity.state, to = next, "entity state change");
            entity.state = next.to_string();
        }
        drop(entities);

        let data = call.service_data();
        tracing::debug!(service = %call.qualified_name(), %data, "service call accepted");
        self.log.write().push(CallRecord {
            call: call.clone(),
            data,
            user_id: ctx.user_id.clone(),
        });
        Ok(())
    }

    fn entity_state(&self, entity_id: &str) -> Option<EntityState> {
        self.entities
            .read()
            .get(entity_id)
            .map(|e| to_state(entity_id, e))
    }
}

impl ExposedEntities for SimulatedHome {
    fn exposed_entities(&self) -> Vec<EntityState> {
        self.entities
            .read()
            .iter()
            .filter(|(_, e)| e.exposed)
            .map(|(id, e)| to_state(id, e))
            .collect()
    }
}
