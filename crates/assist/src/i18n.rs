//! User-facing strings in the five languages the assistant answers in.
//!
//! Anything outside `nl`, `en`, `de`, `fr`, `es` falls back to English.

/// Reply language, normalized from a BCP-47 tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lang {
    Nl,
    #[default]
    En,
    De,
    Fr,
    Es,
}

impl Lang {
    /// `de-DE` → `De`, `NL` → `Nl`, empty or unknown → `En`.
    pub fn from_tag(tag: &str) -> Self {
        let primary = tag.split(['-', '_']).next().unwrap_or_default();
        match primary.trim().to_ascii_lowercase().as_str() {
            "nl" => Lang::Nl,
            "de" => Lang::De,
            "fr" => Lang::Fr,
            "es" => Lang::Es,
            _ => Lang::En,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Lang::Nl => "nl",
            Lang::En => "en",
            Lang::De => "de",
            Lang::Fr => "fr",
            Lang::Es => "es",
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Replies
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// "Done! {name} is {verb}." after a successful action.
pub fn confirmation(lang: Lang, name: &str, service: &str) -> String {
    let (done, is) = match lang {
        Lang::Nl => ("Klaar", "is"),
        Lang::En => ("Done", "is"),
        Lang::De => ("Erledigt", "ist"),
        Lang::Fr => ("Fait", "est"),
        Lang::Es => ("Listo", "está"),
    };
    format!("{done}! {name} {is} {}.", service_verb(service, lang))
}

/// Refusal for an action outside the allow-list.
pub fn blocked(lang: Lang, domain: &str, service: &str) -> String {
    let target = format!("{domain}.{service}");
    match lang {
        Lang::Nl => format!("Ik kan die actie niet uitvoeren ({target} is niet toegestaan)."),
        Lang::En => format!("I cannot perform that action ({target} is not allowed)."),
        Lang::De => {
            format!("Ich kann diese Aktion nicht ausführen ({target} ist nicht erlaubt).")
        }
        Lang::Fr => {
            format!("Je ne peux pas effectuer cette action ({target} n'est pas autorisé).")
        }
        Lang::Es => format!("No puedo realizar esa acción ({target} no está permitido)."),
    }
}

/// The host rejected the service call.
pub fn failed(lang: Lang, err: &str) -> String {
    match lang {
        Lang::Nl => format!("Sorry, dat is mislukt: {err}"),
        Lang::En => format!("Sorry, that failed: {err}"),
        Lang::De => format!("Entschuldigung, das hat nicht geklappt: {err}"),
        Lang::Fr => format!("Désolé, ça a échoué : {err}"),
        Lang::Es => format!("Lo siento, eso falló: {err}"),
    }
}

/// Generic apology for failures nobody anticipated.
pub fn unexpected(lang: Lang) -> &'static str {
    match lang {
        Lang::Nl => "Sorry, er ging iets onverwachts mis.",
        Lang::En => "Sorry, something unexpected went wrong.",
        Lang::De => "Entschuldigung, es ist ein unerwarteter Fehler aufgetreten.",
        Lang::Fr => "Désolé, une erreur inattendue s'est produite.",
        Lang::Es => "Lo siento, algo inesperado salió mal.",
    }
}

/// The completion request failed.
pub fn api_error(lang: Lang, err: &str) -> String {
    match lang {
        Lang::Nl => format!("Sorry, kon Mistral AI niet bereiken: {err}"),
        Lang::En => format!("Sorry, could not reach Mistral AI: {err}"),
        Lang::De => format!("Entschuldigung, Mistral AI war nicht erreichbar: {err}"),
        Lang::Fr => format!("Désolé, impossible de contacter Mistral AI : {err}"),
        Lang::Es => format!("Lo siento, no se pudo conectar a Mistral AI: {err}"),
    }
}

/// Agent mode is selected but no agent id is set.
pub fn no_agent_id(lang: Lang) -> &'static str {
    match lang {
        Lang::Nl => "Fout: geen Agent ID ingesteld. Vul een Agent ID in via de integratie-opties.",
        Lang::En => {
            "Error: no Agent ID configured. Please set an Agent ID in the integration options."
        }
        Lang::De => {
            "Fehler: Keine Agent-ID konfiguriert. Bitte legen Sie eine Agent-ID in den \
             Integrationsoptionen fest."
        }
        Lang::Fr => {
            "Erreur : aucun identifiant d'agent configuré. Veuillez en définir un dans les \
             options d'intégration."
        }
        Lang::Es => {
            "Error: no hay ID de agente configurado. Por favor, configure uno en las opciones \
             de integración."
        }
    }
}

/// The turn was abandoned before the model answered.
pub fn cancelled(lang: Lang) -> &'static str {
    match lang {
        Lang::Nl => "Het verzoek is geannuleerd.",
        Lang::En => "The request was cancelled.",
        Lang::De => "Die Anfrage wurde abgebrochen.",
        Lang::Fr => "La demande a été annulée.",
        Lang::Es => "La solicitud fue cancelada.",
    }
}

// ── Internal: past-tense service verbs ──────────────────────────────

/// Past-tense verb for a service; unknown services read as the service
/// name with underscores replaced by spaces.
pub fn service_verb(service: &str, lang: Lang) -> String {
    let verbs: [&str; 5] = match service {
        "turn_on" => ["aangezet", "turned on", "eingeschaltet", "allumé", "encendido"],
        "turn_off" => ["uitgezet", "turned off", "ausgeschaltet", "éteint", "apagado"],
        "toggle" => ["omgeschakeld", "toggled", "umgeschaltet", "basculé", "alternado"],
        "open_cover" => ["geopend", "opened", "geöffnet", "ouvert", "abierto"],
        "close_cover" => ["gesloten", "closed", "geschlossen", "fermé", "cerrado"],
        "stop_cover" => ["gestopt", "stopped", "gestoppt", "arrêté", "detenido"],
        "lock" => ["vergrendeld", "locked", "verriegelt", "verrouillé", "bloqueado"],
        "unlock" => ["ontgrendeld", "unlocked", "entriegelt", "déverrouillé", "desbloqueado"],
        "media_play" => ["gestart", "started", "gestartet", "démarré", "iniciado"],
        "media_pause" => ["gepauzeerd", "paused", "pausiert", "mis en pause", "pausado"],
        "media_stop" => ["gestopt", "stopped", "gestoppt", "arrêté", "detenido"],
        "volume_up" => ["harder gezet", "turned up", "lauter gestellt", "monté", "subido"],
        "volume_down" => ["zachter gezet", "turned down", "leiser gestellt", "baissé", "bajado"],
        other => return other.replace('_', " "),
    };
    let idx = match lang {
        Lang::Nl => 0,
        Lang::En => 1,
        Lang::De => 2,
        Lang::Fr => 3,
        Lang::Es => 4,
    };
    verbs[idx].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_are_normalized() {
        assert_eq!(Lang::from_tag("de-DE"), Lang::De);
        assert_eq!(Lang::from_tag("NL"), Lang::Nl);
        assert_eq!(Lang::from_tag("fr_CA"), Lang::Fr);
        assert_eq!(Lang::from_tag(""), Lang::En);
        assert_eq!(Lang::from_tag("ja"), Lang::En);
        assert_eq!(Lang::from_tag("es").code(), "es");
        assert_eq!(Lang::from_tag("pt-BR").code(), "en");
    }

    #[test]
    fn confirmation_per_language() {
        assert_eq!(
            confirmation(Lang::En, "Kitchen", "turn_off"),
            "Done! Kitchen is turned off."
        );
        assert_eq!(
            confirmation(Lang::Nl, "Keuken", "turn_on"),
            "Klaar! Keuken is aangezet."
        );
        assert_eq!(
            confirmation(Lang::De, "Tür", "lock"),
            "Erledigt! Tür ist verriegelt."
        );
    }

    #[test]
    fn unknown_service_verb_falls_back_to_name() {
        assert_eq!(service_verb("alarm_arm_away", Lang::Fr), "alarm arm away");
        assert_eq!(service_verb("trigger", Lang::En), "trigger");
    }

    #[test]
    fn blocked_names_the_service() {
        let text = blocked(Lang::Es, "light", "reboot");
        assert!(text.contains("light.reboot"));
    }
}
