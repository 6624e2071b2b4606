//! Database models for the activity log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// A stored row from the `event_activity` table.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoredActivity {
    /// Auto-increment row ID.
    pub id: i64,
    /// Event the activity belongs to.
    pub event_id: Uuid,
    /// Activity type discriminator (e.g. `"status_changed"`).
    pub activity_type: String,
    /// JSONB payload with activity-specific data.
    #[schema(value_type = Object)]
    pub payload: serde_json::Value,
    /// Server-side insertion timestamp.
    pub created_at: DateTime<Utc>,
}
