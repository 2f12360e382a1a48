//! The signup payload the `web` module receives and how it is normalized into a `SignupForm`.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use serde_with::{serde_as, DefaultOnError, DeserializeAs};

use crate::model::SignupForm;

// ###################################
// ->   STRUCTS
// ###################################
/// Deserializable, untrusted signup submission.
///
/// Every field may be missing. Text fields also accept numbers and bools, which are kept as their
/// JSON text. Any other value counts as missing, and consent is only given by a literal `true`.
#[serde_as]
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupSubmission {
    #[serde_as(as = "Stringified")]
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde_as(as = "Stringified")]
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde_as(as = "Stringified")]
    #[serde(default)]
    pub email: Option<String>,
    #[serde_as(as = "Stringified")]
    #[serde(default)]
    pub phone: Option<String>,
    #[serde_as(as = "Stringified")]
    #[serde(default)]
    pub role: Option<String>,
    #[serde_as(as = "Stringified")]
    #[serde(default)]
    pub location: Option<String>,
    #[serde_as(as = "Stringified")]
    #[serde(default)]
    pub message: Option<String>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub consent: Option<bool>,
    #[serde_as(as = "Stringified")]
    #[serde(default)]
    pub source: Option<String>,
    #[serde_as(as = "Stringified")]
    #[serde(default)]
    pub user_agent: Option<String>,
}

/// Reads a JSON string, number or bool as text. `null`, arrays and objects count as missing.
struct Stringified;

// ###################################
// ->   IMPLs
// ###################################
impl<'de> DeserializeAs<'de, Option<String>> for Stringified {
    fn deserialize_as<D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = match Value::deserialize(deserializer)? {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        };
        Ok(text)
    }
}

impl From<SignupSubmission> for SignupForm {
    fn from(sub: SignupSubmission) -> Self {
        SignupForm {
            first_name: sub.first_name.unwrap_or_default(),
            last_name: sub.last_name.unwrap_or_default(),
            email: sub.email.unwrap_or_default(),
            phone: sub.phone.unwrap_or_default(),
            role: sub.role.unwrap_or_default(),
            location: sub.location.unwrap_or_default(),
            message: sub.message.unwrap_or_default(),
            consent: sub.consent.unwrap_or_default(),
            source: sub.source.unwrap_or_default(),
            user_agent: sub.user_agent.unwrap_or_default(),
        }
    }
}
