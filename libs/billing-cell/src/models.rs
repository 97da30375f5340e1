use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==============================================================================
// INSURANCE PROVIDER MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsuranceProvider {
    pub id: Uuid,
    pub name: String,
    pub acronym: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateInsuranceProviderRequest {
    pub name: String,
    pub acronym: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateInsuranceProviderRequest {
    pub name: Option<String>,
    pub acronym: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub notes: Option<String>,
}

// ==============================================================================
// NOMENCLATURE CODE MODELS
// ==============================================================================

/// Billing nomenclature entry: a tariff code with its current monetary value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NomenclatureCode {
    pub id: Uuid,
    pub code: String,
    pub description: String,
    pub value: f64,
    pub chapter: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateNomenclatureCodeRequest {
    pub code: String,
    pub description: String,
    pub value: f64,
    pub chapter: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateNomenclatureCodeRequest {
    pub code: Option<String>,
    pub description: Option<String>,
    pub value: Option<f64>,
    pub chapter: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NomenclatureSearchQuery {
    pub term: Option<String>,
    pub chapter: Option<String>,
    pub limit: Option<i32>,
    pub offset: Option<i32>,
}

/// Percentage applied to every code's value, e.g. `12.5` raises all tariffs
/// by 12.5% and `-10` lowers them by 10%.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkAdjustRequest {
    pub percentage: f64,
}

/// Outcome of a bulk adjustment. The updates run sequentially, so on failure
/// `updated` tells how many rows had already been written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkAdjustResult {
    pub total: usize,
    pub updated: usize,
    pub percentage: f64,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, thiserror::Error)]
pub enum BillingError {
    #[error("Insurance provider not found")]
    ProviderNotFound,

    #[error("Nomenclature code not found")]
    CodeNotFound,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Bulk adjustment aborted after {updated} of {total} rows: {message}")]
    BulkAdjustAborted {
        updated: usize,
        total: usize,
        message: String,
    },

    #[error("Database error: {0}")]
    DatabaseError(String),
}
