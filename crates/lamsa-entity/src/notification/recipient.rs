//! Notification recipient snapshot.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::preference::Preferences;

/// Which side of the marketplace a recipient belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "recipient_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RecipientKind {
    Customer,
    Provider,
}

/// Content language for a recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "content_language", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Arabic.
    Ar,
    /// English.
    En,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ar => "ar",
            Self::En => "en",
        }
    }
}

impl Default for Language {
    fn default() -> Self {
        Self::Ar
    }
}

/// Identity and addressing for one delivery target.
///
/// An immutable snapshot owned by the account subsystem; the dispatcher
/// reads it and never mutates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipient {
    /// Account identifier.
    pub id: Uuid,
    /// Customer or provider.
    pub kind: RecipientKind,
    /// Mobile number in local or international form, if known.
    #[serde(default)]
    pub phone: Option<String>,
    /// Email address, if known.
    #[serde(default)]
    pub email: Option<String>,
    /// Push token for the recipient's current device, if registered.
    #[serde(default)]
    pub device_token: Option<String>,
    /// Preferred content language.
    #[serde(default)]
    pub language: Language,
    /// Delivery preferences. `None` means the recipient has never
    /// configured them; filtering fails open in that case.
    #[serde(default)]
    pub preferences: Option<Preferences>,
}

impl Recipient {
    /// Minimal recipient with only an id and language.
    pub fn new(id: Uuid, kind: RecipientKind) -> Self {
        Self {
            id,
            kind,
            phone: None,
            email: None,
            device_token: None,
            language: Language::default(),
            preferences: None,
        }
    }
}
