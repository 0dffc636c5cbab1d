use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Timestamps carried by every entity. Serialized as ISO-8601 strings.
pub type Timestamp = DateTime<Utc>;

/// Generates a fresh, never reused identifier.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// The current time, used to stamp `created_at` / `updated_at`.
pub fn now() -> Timestamp {
    Utc::now()
}
