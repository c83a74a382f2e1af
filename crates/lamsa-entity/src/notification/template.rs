//! Bilingual notification templates.

use serde::{Deserialize, Serialize};

use super::channel::Channel;
use super::event::NotificationEvent;
use super::recipient::Language;

/// A text pair in both supported languages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalizedText {
    /// Arabic text.
    pub ar: String,
    /// English text.
    pub en: String,
}

impl LocalizedText {
    pub fn new(ar: impl Into<String>, en: impl Into<String>) -> Self {
        Self {
            ar: ar.into(),
            en: en.into(),
        }
    }

    /// Text for the given language.
    pub fn get(&self, language: Language) -> &str {
        match language {
            Language::Ar => &self.ar,
            Language::En => &self.en,
        }
    }
}

/// A static notification template keyed by (event, channel).
///
/// Title and body use `{{variable}}` placeholder syntax; `variables`
/// declares the names a caller is expected to supply. Loaded once at
/// startup and immutable during dispatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Template {
    /// Event this template renders.
    pub event: NotificationEvent,
    /// Channel this template targets.
    pub channel: Channel,
    /// Bilingual title with placeholders.
    pub title: LocalizedText,
    /// Bilingual body with placeholders.
    pub body: LocalizedText,
    /// Optional call-to-action label.
    #[serde(default)]
    pub action_text: Option<LocalizedText>,
    /// Placeholder names the caller should supply.
    #[serde(default)]
    pub variables: Vec<String>,
    /// Whether clients may collapse several of these into one entry.
    #[serde(default)]
    pub groupable: bool,
    /// Seconds until a rendered notification is considered stale.
    #[serde(default = "default_ttl")]
    pub ttl_seconds: u64,
}

fn default_ttl() -> u64 {
    86_400
}

/// The output of rendering a template for one recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedMessage {
    /// Rendered title.
    pub title: String,
    /// Rendered body.
    pub body: String,
    /// Rendered call-to-action label, if the template has one.
    pub action_text: Option<String>,
}
