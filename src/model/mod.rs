//! The entity stored for every accepted signup.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

mod form;

pub use form::SignupForm;

/// Partition used when the submission has no usable location.
pub const DEFAULT_PARTITION_KEY: &str = "signup";

/// Characters the table service does not accept in `PartitionKey` or `RowKey`.
const FORBIDDEN_KEY_CHARS: [char; 4] = ['/', '\\', '#', '?'];

/// 256 chars always fit the 1 KiB the table service allows for a key.
pub const MAX_PARTITION_KEY_CHARS: usize = 256;

/// One row in the signups table.
///
/// Property names are PascalCase, the way the table has always been written.
/// Every attribute is present, absent input is stored as `""` or `false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SignupRecord {
    pub partition_key: String,
    pub row_key: String,

    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub role: String,
    pub location: String,
    pub message: String,
    pub consent: bool,
    pub source: String,
    pub user_agent: String,
    pub submitted_at_utc: DateTime<Utc>,
}

impl SignupRecord {
    /// Builds the record for a validated form, generating a fresh row key.
    pub fn new(form: SignupForm, submitted_at_utc: DateTime<Utc>) -> Self {
        let SignupForm {
            first_name,
            last_name,
            email,
            phone,
            role,
            location,
            message,
            consent,
            source,
            user_agent,
        } = form;

        SignupRecord {
            partition_key: partition_key_for(&location),
            row_key: Uuid::new_v4().to_string(),
            first_name,
            last_name,
            email,
            phone,
            role,
            location,
            message,
            consent,
            source,
            user_agent,
            submitted_at_utc,
        }
    }
}

/// Trimmed, lowercased location with forbidden key characters removed and cut to
/// `MAX_PARTITION_KEY_CHARS`, or `DEFAULT_PARTITION_KEY` when nothing is left.
pub fn partition_key_for(location: &str) -> String {
    let key = location
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| !FORBIDDEN_KEY_CHARS.contains(c) && !c.is_control())
        .take(MAX_PARTITION_KEY_CHARS)
        .collect::<String>();
    let key = key.trim();

    if key.is_empty() {
        DEFAULT_PARTITION_KEY.to_string()
    } else {
        key.to_string()
    }
}
