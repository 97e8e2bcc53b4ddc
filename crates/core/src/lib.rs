//! # Onkhos Core
//!
//! Turns an oncology treatment authorization request into a printable A4 PDF.
//!
//! The crate is split into pure and effectful halves:
//! - [`medication`] normalizes prescriptions into canonical entries
//! - [`document`] composes the body markup and per-page header/footer templates
//! - [`logo`] resolves the institution logo through its fallback chain
//! - [`render`] drives a headless browser to print the result
//!
//! [`AuthorizationPdfService`] ties them together. Record parsing lives in the
//! `authorization` crate; process-level concerns (environment, CLI, logging setup) belong
//! in `onkhos-cli`.

pub mod config;
pub mod constants;
pub mod document;
pub mod error;
pub mod logo;
pub mod medication;
pub mod render;

pub use config::{CoreConfig, RenderTimeouts};
pub use document::{compose_document, PageTemplates};
pub use error::{DocumentError, DocumentResult, RenderError, RenderStage};
pub use logo::{LogoImage, LogoResolver, LogoSource};
pub use medication::{CanonicalMedicationEntry, NormalizedMedications};
pub use render::{RenderedDocument, RenderingEngine};

use authorization::AuthorizationRecord;
use chrono::{Local, NaiveDateTime};
use tracing::Instrument;

/// Generates authorization PDFs.
///
/// Holds only startup configuration; each [`generate`](Self::generate) call is
/// independent and may run concurrently with others.
#[derive(Clone, Debug)]
pub struct AuthorizationPdfService {
    engine: RenderingEngine,
    logos: LogoResolver,
}

impl AuthorizationPdfService {
    pub fn new(config: CoreConfig) -> Self {
        Self {
            engine: RenderingEngine::new(&config),
            logos: LogoResolver::new(config.default_logo_path()),
        }
    }

    /// Canonical medication entries for the record's prescription.
    pub fn normalize_medications(&self, record: &AuthorizationRecord) -> NormalizedMedications {
        medication::normalize_medications(record)
    }

    /// Complete document body markup for the record.
    pub fn compose_document(&self, record: &AuthorizationRecord) -> String {
        compose_document(record, &self.normalize_medications(record))
    }

    /// Header and footer templates stamped with the current local time.
    pub fn page_templates(
        &self,
        record: &AuthorizationRecord,
        logo: Option<&[u8]>,
    ) -> PageTemplates {
        self.page_templates_at(record, logo, Local::now().naive_local())
    }

    /// Header and footer templates stamped with `generated_at`.
    pub fn page_templates_at(
        &self,
        record: &AuthorizationRecord,
        logo: Option<&[u8]>,
        generated_at: NaiveDateTime,
    ) -> PageTemplates {
        let (image, source) = self.logos.resolve(logo);
        tracing::debug!("using {:?} logo ({})", source, image.mime_type());
        PageTemplates::build(record, &image, generated_at)
    }

    /// Renders the record as a PDF.
    ///
    /// `logo` is the institution's own logo; when absent or empty the default asset is
    /// used.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Render`] when the browser cannot be launched, a stage
    /// times out or printing fails. No partial document is returned.
    pub async fn generate(
        &self,
        record: &AuthorizationRecord,
        logo: Option<&[u8]>,
    ) -> DocumentResult<RenderedDocument> {
        let span = tracing::info_span!("generate_pdf", request_id = ?record.id);
        async {
            tracing::info!("generating authorization PDF");
            let html = self.compose_document(record);
            let templates = self.page_templates(record, logo);

            let document = self.engine.render(&html, &templates).await?;
            tracing::info!("generated authorization PDF ({} bytes)", document.len());
            Ok(document)
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use authorization::{MedicationSource, NonEmptyText};
    use chrono::NaiveDate;
    use std::path::PathBuf;

    fn service() -> AuthorizationPdfService {
        let config = CoreConfig::new(
            None,
            PathBuf::from("/nonexistent/onkhos/logo.png"),
            RenderTimeouts::default(),
        )
        .unwrap();
        AuthorizationPdfService::new(config)
    }

    fn record() -> AuthorizationRecord {
        let mut record = AuthorizationRecord {
            id: Some(42),
            ..AuthorizationRecord::default()
        };
        record.patient.name = "Maria da Silva".into();
        record.medications = MedicationSource::Structured {
            protocol_name: NonEmptyText::from_optional(Some("FOLFOX")),
            serialized: r#"[{"nome":"Oxaliplatina","dose":"85","unidade_medida":"mg/m²","via_adm":"EV","dias_adm":"D1","frequencia":"14/14 dias"}]"#.into(),
        };
        record
    }

    #[test]
    fn composes_structured_prescription() {
        let html = service().compose_document(&record());
        assert!(html.contains("Oxaliplatina"));
        assert!(html.contains("85mg/m²"));
        assert!(html.contains("FOLFOX"));
    }

    #[test]
    fn normalizes_through_facade() {
        let normalized = service().normalize_medications(&record());
        assert_eq!(normalized.entries.len(), 1);
        assert_eq!(normalized.entries[0].route, "EV");
    }

    #[test]
    fn templates_use_clinic_logo_when_given() {
        let at = NaiveDate::from_ymd_opt(2024, 1, 31)
            .and_then(|d| d.and_hms_opt(23, 59, 1))
            .unwrap();
        let jpeg: &[u8] = b"\xFF\xD8\xFF\xE0\0\x10JFIF\0";
        let templates = service().page_templates_at(&record(), Some(jpeg), at);

        assert!(templates.header.contains("data:image/jpeg;base64,"));
        assert!(templates.header.contains("SOL-000042"));
        assert!(templates.footer.contains("31/01/2024 - 23:59:01"));
    }

    #[test]
    fn templates_always_carry_a_logo() {
        let templates = service().page_templates(&record(), None);
        assert!(templates.header.contains(r#"<img src="data:image/"#));
    }
}
