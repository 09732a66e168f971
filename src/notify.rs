/*!
 # Status notices and translations

 The editor reports outcomes through a [`Notify`] collaborator and builds
 its messages through a [`Translate`] collaborator. [`StatusBoard`] and
 [`Catalog`] are the implementations used by the bundled tools.
*/

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{error, info};

/// How long success and error notices stay visible
pub const DEFAULT_NOTICE_TIMEOUT: Duration = Duration::from_secs(5);

/// Kind of a status notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
    /// Stays until replaced
    Info,
}

/// Receiver of status notices, addressed by status element id
pub trait Notify {
    fn notify(&self, element_id: &str, message: &str, kind: NoticeKind);
}

/// Message lookup for the current language
pub trait Translate {
    /// Returns the message for `key` with `{name}` placeholders replaced from `params`
    fn translate(&self, key: &str, params: &[(&str, &str)]) -> String;
}

/// A notice posted to a status element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub kind: NoticeKind,
    pub posted_at: Instant,
}

impl Notice {
    /// Whether the notice is still shown at `now`
    pub fn is_visible(&self, now: Instant, timeout: Duration) -> bool {
        match self.kind {
            NoticeKind::Info => true,
            _ => now.saturating_duration_since(self.posted_at) < timeout,
        }
    }
}

/// Keeps the latest notice of every status element and auto-dismisses it
#[derive(Debug)]
pub struct StatusBoard {
    timeout: Duration,
    notices: Mutex<HashMap<String, Notice>>,
}

impl StatusBoard {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            notices: Mutex::new(HashMap::new()),
        }
    }

    /// Notice currently shown on `element_id`, if it has not been dismissed yet
    pub fn current(&self, element_id: &str) -> Option<Notice> {
        self.current_at(element_id, Instant::now())
    }

    pub fn current_at(&self, element_id: &str, now: Instant) -> Option<Notice> {
        let notices = self.notices.lock();
        notices
            .get(element_id)
            .filter(|notice| notice.is_visible(now, self.timeout))
            .cloned()
    }
}

impl Default for StatusBoard {
    fn default() -> Self {
        Self::new(DEFAULT_NOTICE_TIMEOUT)
    }
}

impl Notify for StatusBoard {
    fn notify(&self, element_id: &str, message: &str, kind: NoticeKind) {
        match kind {
            NoticeKind::Error => error!(target: "schema_editor::status", "{}: {}", element_id, message),
            _ => info!(target: "schema_editor::status", "{}: {}", element_id, message),
        }

        self.notices.lock().insert(
            element_id.to_string(),
            Notice {
                message: message.to_string(),
                kind,
                posted_at: Instant::now(),
            },
        );
    }
}

/// Supported UI languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    En,
    De,
}

impl std::str::FromStr for Language {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().as_str() {
            "en" | "english" => Ok(Language::En),
            "de" | "german" | "deutsch" => Ok(Language::De),
            other => Err(crate::Error::General(format!("unsupported language {other:?}"))),
        }
    }
}

const EN: &[(&str, &str)] = &[
    ("schema.loading", "Loading schema..."),
    ("schema.loaded", "{file} loaded successfully"),
    ("schema.saved", "{file} saved successfully!"),
    ("schema.demo", "Demo data loaded (server unreachable)"),
    ("schema.activated", "Active schema: {file}"),
    ("error", "Error"),
];

const DE: &[(&str, &str)] = &[
    ("schema.loading", "Schema wird geladen..."),
    ("schema.loaded", "{file} erfolgreich geladen"),
    ("schema.saved", "{file} erfolgreich gespeichert!"),
    ("schema.demo", "Demo-Daten geladen (Server nicht erreichbar)"),
    ("schema.activated", "Aktives Schema: {file}"),
    ("error", "Fehler"),
];

/// Built-in message catalog
#[derive(Debug, Clone, Copy, Default)]
pub struct Catalog {
    pub language: Language,
}

impl Catalog {
    pub fn new(language: Language) -> Self {
        Self { language }
    }

    fn lookup(&self, key: &str) -> Option<&'static str> {
        let table = match self.language {
            Language::En => EN,
            Language::De => DE,
        };
        table.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
    }
}

impl Translate for Catalog {
    fn translate(&self, key: &str, params: &[(&str, &str)]) -> String {
        let Some(template) = self.lookup(key) else {
            return key.to_string();
        };

        params
            .iter()
            .fold(template.to_string(), |text, (name, value)| {
                text.replace(&format!("{{{name}}}"), value)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_substitutes_params() {
        let en = Catalog::new(Language::En);
        assert_eq!(
            en.translate("schema.loaded", &[("file", "schema_01.csv")]),
            "schema_01.csv loaded successfully"
        );
        let de = Catalog::new(Language::De);
        assert_eq!(
            de.translate("schema.saved", &[("file", "schema_02.csv")]),
            "schema_02.csv erfolgreich gespeichert!"
        );
        assert_eq!(en.translate("no.such.key", &[]), "no.such.key");
    }

    #[test]
    fn languages_parse() {
        assert_eq!("DE".parse::<Language>().unwrap(), Language::De);
        assert_eq!("english".parse::<Language>().unwrap(), Language::En);
        assert!("fr".parse::<Language>().is_err());
    }

    #[test]
    fn notices_auto_dismiss() {
        let board = StatusBoard::new(Duration::from_secs(5));
        board.notify("schema-status", "saved", NoticeKind::Success);
        let notice = board.current("schema-status").unwrap();
        assert_eq!(notice.message, "saved");

        let later = notice.posted_at + Duration::from_secs(6);
        assert!(board.current_at("schema-status", later).is_none());
        assert!(board.current("other").is_none());
    }

    #[test]
    fn info_notices_stay() {
        let board = StatusBoard::default();
        board.notify("schema-status", "Loading schema...", NoticeKind::Info);
        let notice = board.current("schema-status").unwrap();
        let later = notice.posted_at + Duration::from_secs(3600);
        assert!(board.current_at("schema-status", later).is_some());
    }
}
