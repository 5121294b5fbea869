//! Turns a model reply into spoken text, running the embedded action (if
//! any) through the allow-list and the host's action capability.

use std::sync::Arc;

use serde::Serialize;

use mc_domain::home::{AuthContext, HomeActions, HomeError, ServiceCall};
use mc_domain::trace::TraceEvent;

use crate::extract::ActionRequest;
use crate::i18n::{self, Lang};
use crate::policy::ActionPolicy;

/// What happened to the reply.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DispatchOutcome {
    /// No action requested (or control disabled); the reply is spoken as-is.
    PassThrough,
    /// The action was refused by the allow-list. Nothing ran.
    Blocked { domain: String, service: String },
    /// The service call completed.
    Executed(ServiceCall),
    /// The host rejected the call.
    Failed { call: ServiceCall, detail: String },
    /// The host failed in a way it did not anticipate.
    Unexpected { call: ServiceCall },
}

/// Speech for the user plus what the dispatcher did.
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatch {
    pub speech: String,
    pub outcome: DispatchOutcome,
}

impl Dispatch {
    fn pass_through(reply: &str) -> Self {
        Self {
            speech: reply.to_string(),
            outcome: DispatchOutcome::PassThrough,
        }
    }
}

pub struct Dispatcher {
    home: Arc<dyn HomeActions>,
}

impl Dispatcher {
    pub fn new(home: Arc<dyn HomeActions>) -> Self {
        Self { home }
    }

    /// Inspect `reply` for an action and carry it out.
    ///
    /// The service call is awaited to completion; there is no timeout and
    /// no cancellation once it has started.
    pub async fn dispatch(
        &self,
        reply: &str,
        control_enabled: bool,
        policy: ActionPolicy,
        lang: Lang,
        auth: &AuthContext,
    ) -> Dispatch {
        if !control_enabled {
            return Dispatch::pass_through(reply);
        }
        let Some(action) = ActionRequest::from_reply(reply) else {
            return Dispatch::pass_through(reply);
        };

        let verdict = policy.check(&action.domain, &action.service);
        if !verdict.is_permitted() {
            tracing::warn!(
                domain = %action.domain,
                service = %action.service,
                entity_id = %action.entity_id,
                "Blocked service call"
            );
            TraceEvent::ActionBlocked {
                domain: action.domain.clone(),
                service: action.service.clone(),
                entity_id: action.entity_id.clone(),
            }
            .emit();
            return Dispatch {
                speech: i18n::blocked(lang, &action.domain, &action.service),
                outcome: DispatchOutcome::Blocked {
                    domain: action.domain,
                    service: action.service,
                },
            };
        }

        let call = action.to_service_call();
        tracing::info!(
            domain = %call.domain,
            service = %call.service,
            entity_id = %call.entity_id,
            "dispatching service call"
        );

        let result = self.home.call_service(&call, auth).await;
        let (speech, outcome, label) = match result {
            Ok(()) => {
                let speech = match action.response {
                    Some(text) => text,
                    None => {
                        let friendly = self
                            .home
                            .entity_state(&call.entity_id)
                            .map(|s| s.display_name().to_string())
                            .unwrap_or_else(|| call.entity_id.clone());
                        i18n::confirmation(lang, &friendly, &call.service)
                    }
                };
                (speech, DispatchOutcome::Executed(call.clone()), "ok")
            }
            Err(HomeError::Service(detail)) => {
                tracing::error!(call = %call.qualified_name(), error = %detail, "Service call failed");
                (
                    i18n::failed(lang, &detail),
                    DispatchOutcome::Failed {
                        call: call.clone(),
                        detail,
                    },
                    "failed",
                )
            }
            Err(HomeError::Unexpected(detail)) => {
                tracing::error!(
                    call = %call.qualified_name(),
                    error = %detail,
                    "Unexpected error in service call"
                );
                (
                    i18n::unexpected(lang).to_string(),
                    DispatchOutcome::Unexpected { call: call.clone() },
                    "unexpected",
                )
            }
        };

        TraceEvent::ActionDispatched {
            domain: call.domain,
            service: call.service,
            entity_id: call.entity_id,
            outcome: label.into(),
        }
        .emit();

        Dispatch { speech, outcome }
    }
}
