//! Shared primitives for the Onkhos authorization workspace.
//!
//! - [`NonEmptyText`]: text that is guaranteed to carry at least one visible character
//! - [`AuthorizationStatus`]: lifecycle vocabulary of a treatment-authorization request
//! - [`Sex`]: administrative sex as recorded on the request

use serde::{Deserialize, Serialize};

/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
}

/// A string type that guarantees non-empty content.
///
/// The input is trimmed of leading and trailing whitespace during construction, so two
/// values that differ only in surrounding whitespace compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// # Errors
    ///
    /// Returns [`TextError::Empty`] if the trimmed input is empty.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Lifts an optional clinician-entered field into `Option<NonEmptyText>`.
    ///
    /// Missing, empty and whitespace-only values all collapse to `None`; this is how
    /// conditional document sections decide whether they exist at all.
    pub fn from_optional(input: Option<impl AsRef<str>>) -> Option<Self> {
        input.and_then(|value| Self::new(value).ok())
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the wrapper and returns the owned string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(&s).map_err(serde::de::Error::custom)
    }
}

/// Lifecycle state of a treatment-authorization request.
///
/// Wire values are the Portuguese identifiers stored by the clinic backend.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthorizationStatus {
    /// Awaiting review by the health plan operator.
    #[default]
    #[serde(rename = "pendente")]
    Pending,
    /// Authorized; the protocol may be administered.
    #[serde(rename = "aprovada")]
    Approved,
    /// Refused by the operator.
    #[serde(rename = "rejeitada")]
    Rejected,
    /// Under clinical audit.
    #[serde(rename = "em_analise")]
    UnderReview,
}

impl AuthorizationStatus {
    /// Wire identifier, as persisted by the clinic backend.
    pub fn as_wire(self) -> &'static str {
        match self {
            AuthorizationStatus::Pending => "pendente",
            AuthorizationStatus::Approved => "aprovada",
            AuthorizationStatus::Rejected => "rejeitada",
            AuthorizationStatus::UnderReview => "em_analise",
        }
    }

    /// Human-readable label shown on printed documents.
    pub fn label(self) -> &'static str {
        match self {
            AuthorizationStatus::Pending => "Pendente",
            AuthorizationStatus::Approved => "Aprovada",
            AuthorizationStatus::Rejected => "Rejeitada",
            AuthorizationStatus::UnderReview => "Em Análise",
        }
    }

    pub fn is_approved(self) -> bool {
        self == AuthorizationStatus::Approved
    }
}

impl std::fmt::Display for AuthorizationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_wire())
    }
}

/// Administrative sex recorded on the request (`M`/`F` on the wire).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
}

impl Sex {
    /// Label used on printed documents.
    pub fn label(self) -> &'static str {
        match self {
            Sex::Male => "Masculino",
            Sex::Female => "Feminino",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_and_rejects_blank_text() {
        let text = NonEmptyText::new("  Cisplatina  ").expect("non-empty");
        assert_eq!(text.as_str(), "Cisplatina");
        assert!(matches!(NonEmptyText::new(" \n\t "), Err(TextError::Empty)));
    }

    #[test]
    fn from_optional_collapses_blank_values() {
        assert_eq!(NonEmptyText::from_optional(None::<&str>), None);
        assert_eq!(NonEmptyText::from_optional(Some("   ")), None);
        assert_eq!(
            NonEmptyText::from_optional(Some(" fígado ")).map(NonEmptyText::into_inner),
            Some("fígado".to_string())
        );
    }

    #[test]
    fn status_uses_portuguese_wire_values() {
        let status: AuthorizationStatus =
            serde_json::from_str("\"em_analise\"").expect("parse status");
        assert_eq!(status, AuthorizationStatus::UnderReview);
        assert_eq!(status.label(), "Em Análise");
        assert_eq!(
            serde_json::to_string(&AuthorizationStatus::Approved).expect("serialize"),
            "\"aprovada\""
        );
        assert!(serde_json::from_str::<AuthorizationStatus>("\"approved\"").is_err());
    }

    #[test]
    fn sex_labels() {
        let sex: Sex = serde_json::from_str("\"F\"").expect("parse sex");
        assert_eq!(sex.label(), "Feminino");
        assert_eq!(Sex::Male.label(), "Masculino");
    }
}
