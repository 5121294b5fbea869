//! Allow-list of services the model may invoke.

/// Static `domain → services` table.
const ALLOWED_SERVICES: &[(&str, &[&str])] = &[
    ("homeassistant", &["turn_on", "turn_off", "toggle"]),
    ("light", &["turn_on", "turn_off", "toggle"]),
    ("switch", &["turn_on", "turn_off", "toggle"]),
    ("cover", &["open_cover", "close_cover", "stop_cover"]),
    (
        "media_player",
        &[
            "turn_on",
            "turn_off",
            "toggle",
            "media_play",
            "media_pause",
            "media_stop",
            "volume_up",
            "volume_down",
        ],
    ),
    ("fan", &["turn_on", "turn_off", "toggle"]),
    ("climate", &["turn_on", "turn_off"]),
    ("lock", &["lock", "unlock"]),
    (
        "alarm_control_panel",
        &["alarm_arm_away", "alarm_arm_home", "alarm_disarm"],
    ),
    ("scene", &["turn_on"]),
    ("script", &["turn_on"]),
    ("automation", &["turn_on", "turn_off", "trigger"]),
];

const BYPASS_DOMAIN: &str = "homeassistant";

/// Why a call was admitted or refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The service is listed for its domain.
    Allowed,
    /// Not listed, but the `homeassistant` domain accepts any service.
    Bypassed,
    Denied,
}

impl Verdict {
    pub fn is_permitted(self) -> bool {
        !matches!(self, Verdict::Denied)
    }
}

/// Decides whether an extracted action may run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionPolicy {
    strict: bool,
}

impl Default for ActionPolicy {
    /// The `homeassistant` domain accepts any service.
    fn default() -> Self {
        Self { strict: false }
    }
}

impl ActionPolicy {
    /// Every domain, `homeassistant` included, is held to its table entry.
    pub fn strict() -> Self {
        Self { strict: true }
    }

    pub fn from_options(strict_homeassistant_domain: bool) -> Self {
        Self {
            strict: strict_homeassistant_domain,
        }
    }

    pub fn check(&self, domain: &str, service: &str) -> Verdict {
        let listed = Self::services_for(domain).iter().any(|s| *s == service);

        if listed {
            Verdict::Allowed
        } else if domain == BYPASS_DOMAIN && !self.strict {
            tracing::warn!(
                domain,
                service,
                "service admitted only because the homeassistant domain is unrestricted"
            );
            Verdict::Bypassed
        } else {
            Verdict::Denied
        }
    }

    /// Services listed for a domain; empty for unknown domains.
    pub fn services_for(domain: &str) -> &'static [&'static str] {
        match ALLOWED_SERVICES.iter().find(|(d, _)| *d == domain) {
            Some((_, services)) => services,
            None => &[],
        }
    }
}
