//! System prompt assembly.
//!
//! The user-editable template is rendered with `minijinja`, then the live
//! entity inventory and the action instruction block are appended when home
//! control is enabled.

use std::fmt;
use std::sync::Arc;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Datelike, Timelike};
use chrono_tz::Tz;
use minijinja::value::{Object, Value};
use minijinja::{Environment, ErrorKind, State};

use mc_domain::home::EntityState;
use mc_domain::trace::TraceEvent;

/// Appended after the inventory. Describes the single action shape the
/// extractor understands.
pub const ACTION_INSTRUCTIONS: &str = "\n\nWhen the user wants to control a device, respond with ONLY a raw JSON \
object on one line, no extra text, no markdown:\n\
{\"action\":\"call_service\",\"domain\":\"DOMAIN\",\"service\":\"SERVICE\",\"entity_id\":\"ENTITY_ID\"}\n\
Optional keys: \"data\" (an object of extra service parameters) and \"response\" \
(a short confirmation in the user's language).\n\
For questions or information, reply normally in plain text.";

pub const INVENTORY_HEADER: &str = "Exposed smart home devices:";

/// Renders system prompts.
///
/// Stateless apart from the template environment; one instance is shared by
/// every turn.
pub struct PromptBuilder {
    env: Environment<'static>,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self {
            env: Environment::new(),
        }
    }

    /// Build the full system prompt for one turn.
    ///
    /// `entities` is `Some` when home control is enabled; an empty slice
    /// still gets the instruction block but no inventory section.
    pub fn build(
        &self,
        template: &str,
        location_name: &str,
        now: DateTime<Tz>,
        entities: Option<&[EntityState]>,
    ) -> String {
        let (mut prompt, template_fallback) = match self.render(template, location_name, now) {
            Ok(rendered) => (rendered, false),
            Err(e) => {
                tracing::error!(error = %e, "Error rendering prompt template");
                (template.to_string(), true)
            }
        };

        let exposed = entities.map_or(0, <[EntityState]>::len);
        if let Some(entities) = entities {
            if !entities.is_empty() {
                prompt.push_str("\n\n");
                prompt.push_str(&entity_inventory(entities));
            }
            prompt.push_str(ACTION_INSTRUCTIONS);
        }

        TraceEvent::PromptBuilt {
            prompt_chars: prompt.chars().count(),
            exposed_entities: exposed,
            template_fallback,
        }
        .emit();

        prompt
    }

    /// Render the template alone. Exposed for `config validate`.
    pub fn render(
        &self,
        template: &str,
        location_name: &str,
        now: DateTime<Tz>,
    ) -> Result<String, minijinja::Error> {
        let clock = Value::from_object(Clock(now));
        let now_fn = Value::from_function(move || clock.clone());
        self.env.render_str(
            template,
            minijinja::context! {
                ha_name => location_name,
                now => now_fn,
            },
        )
    }
}

/// `"Exposed smart home devices:"` followed by one line per entity.
pub fn entity_inventory(entities: &[EntityState]) -> String {
    let mut out = String::from(INVENTORY_HEADER);
    for e in entities {
        out.push_str(&format!(
            "\n  {} | {} | state: {}",
            e.entity_id,
            e.display_name(),
            e.state
        ));
    }
    out
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// now() template object
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The value returned by `now()` inside templates.
///
/// Supports `.strftime(fmt)`, `.isoformat()`, `.weekday()` and the
/// `year`/`month`/`day`/`hour`/`minute`/`second` attributes.
#[derive(Debug)]
struct Clock(DateTime<Tz>);

impl Object for Clock {
    fn get_value(self: &Arc<Self>, key: &Value) -> Option<Value> {
        let dt = &self.0;
        let v = match key.as_str()? {
            "year" => dt.year() as i64,
            "month" => i64::from(dt.month()),
            "day" => i64::from(dt.day()),
            "hour" => i64::from(dt.hour()),
            "minute" => i64::from(dt.minute()),
            "second" => i64::from(dt.second()),
            _ => return None,
        };
        Some(Value::from(v))
    }

    fn call_method(
        self: &Arc<Self>,
        _state: &State<'_, '_>,
        method: &str,
        args: &[Value],
    ) -> Result<Value, minijinja::Error> {
        match method {
            "strftime" => {
                let fmt = args.first().and_then(Value::as_str).ok_or_else(|| {
                    minijinja::Error::new(
                        ErrorKind::MissingArgument,
                        "strftime() takes a format string",
                    )
                })?;
                strftime(&self.0, fmt).map(Value::from)
            }
            "isoformat" => Ok(Value::from(
                self.0.format("%Y-%m-%dT%H:%M:%S%:z").to_string(),
            )),
            "weekday" => Ok(Value::from(i64::from(
                self.0.weekday().num_days_from_monday(),
            ))),
            _ => Err(minijinja::Error::from(ErrorKind::UnknownMethod)),
        }
    }

    fn render(self: &Arc<Self>, f: &mut fmt::Formatter<'_>) -> fmt::Result
    where
        Self: Sized + 'static,
    {
        write!(f, "{}", self.0.format("%Y-%m-%d %H:%M:%S%:z"))
    }
}

/// Format with a validated pattern. chrono panics on display of an invalid
/// pattern, so it is checked item by item first.
fn strftime(dt: &DateTime<Tz>, fmt: &str) -> Result<String, minijinja::Error> {
    if StrftimeItems::new(fmt).any(|item| matches!(item, Item::Error)) {
        return Err(minijinja::Error::new(
            ErrorKind::InvalidOperation,
            format!("invalid strftime format: {fmt:?}"),
        ));
    }
    Ok(dt.format(fmt).to_string())
}
