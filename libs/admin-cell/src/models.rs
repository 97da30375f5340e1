use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==============================================================================
// USER PROVISIONING MODELS
// ==============================================================================

/// Application profile row paired with a Supabase auth user of the same id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
}

pub const ALLOWED_ROLES: &[&str] = &["admin", "doctor", "secretary"];

// ==============================================================================
// AUDIT LOG MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub action: String,
    pub entity: String,
    pub entity_id: Option<String>,
    pub detail: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordAuditRequest {
    pub action: String,
    pub entity: String,
    pub entity_id: Option<String>,
    pub detail: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditListQuery {
    pub user_id: Option<Uuid>,
    pub entity: Option<String>,
    pub action: Option<String>,
    pub limit: Option<i32>,
    pub offset: Option<i32>,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, thiserror::Error)]
pub enum AdminError {
    #[error("Invalid email address")]
    InvalidEmail,

    #[error("Password must be at least 8 characters")]
    WeakPassword,

    #[error("Unknown role: {0}")]
    InvalidRole(String),

    #[error("User with email {email} already exists")]
    EmailAlreadyExists { email: String },

    #[error("Failed to create auth user: {0}")]
    AuthCreateFailed(String),

    #[error("Failed to create profile, auth user rolled back: {0}")]
    ProfileCreateFailed(String),

    #[error("Failed to create profile AND rollback failed, orphan auth user {user_id}: {message}")]
    RollbackFailed { user_id: String, message: String },

    #[error("Database error: {0}")]
    DatabaseError(String),
}
