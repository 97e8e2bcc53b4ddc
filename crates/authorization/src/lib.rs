//! Wire/boundary support for treatment-authorization requests.
//!
//! The clinic backend hands the document generator one authorization record, serialised
//! as JSON with the column names of its relational store. This crate provides:
//! - a strict wire model for that JSON (path-aware errors via `serde_path_to_error`)
//! - the domain-level [`AuthorizationRecord`] the generator reads
//! - the two-source medication model ([`MedicationSource`]) and the decoder for the
//!   structured protocol list
//!
//! Nothing in this crate renders or persists anything.

mod flexible;
pub mod medication;
pub mod record;

pub use medication::{decode_structured_list, MedicationSource, StructuredMedication};
pub use record::{
    AuthorizationRecord, Diagnosis, Dosing, Institution, PatientIdentity, PriorTreatment,
    ProtocolParameters, TnmStaging,
};

pub use onkhos_types::{AuthorizationStatus, NonEmptyText, Sex};

/// Errors returned by the `authorization` boundary crate.
#[derive(Debug, thiserror::Error)]
pub enum AuthorizationError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("authorization record schema mismatch at {path}: {message}")]
    RecordSchema { path: String, message: String },

    #[error("structured medication list mismatch at {path}: {message}")]
    MedicationSchema { path: String, message: String },
}

/// Type alias for Results that can fail with an [`AuthorizationError`].
pub type AuthorizationResult<T> = Result<T, AuthorizationError>;

/// Splits a `serde_path_to_error` failure into a printable path and message.
pub(crate) fn path_and_message(
    err: serde_path_to_error::Error<serde_json::Error>,
) -> (String, String) {
    let path = err.path().to_string();
    let message = err.into_inner().to_string();
    let path = if path.is_empty() || path == "." {
        "<root>".to_string()
    } else {
        path
    };
    (path, message)
}
