//! Page header and footer templates.
//!
//! The rendering engine stamps these fragments onto every printed page, outside the
//! document body. They are rendered in an isolated context by the engine: styles must be
//! inline, images must be `data:` URIs, and page numbers come from the engine's own
//! `pageNumber`/`totalPages` placeholder classes.

use super::format::{escape_html, format_timestamp, request_code};
use super::sections::status_badge;
use crate::constants::{FOOTER_HEIGHT_PX, HEADER_HEIGHT_PX};
use crate::logo::LogoImage;
use authorization::AuthorizationRecord;
use chrono::NaiveDateTime;

pub const DOCUMENT_TITLE: &str = "Autorização de Tratamento Oncológico";
pub const DOCUMENT_SUBTITLE: &str = "Solicitação de Processamento - Quimioterapia Antineoplásica";
pub const SYSTEM_NAME: &str = "Sistema de Gestão";
pub const PRODUCT_NAME: &str = "Onkhos - Oncologia Clínica";

/// Header and footer fragments for one document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageTemplates {
    pub header: String,
    pub footer: String,
}

impl PageTemplates {
    pub fn build(
        record: &AuthorizationRecord,
        logo: &LogoImage,
        generated_at: NaiveDateTime,
    ) -> Self {
        Self {
            header: header_template(record, logo),
            footer: footer_template(generated_at),
        }
    }
}

/// Header: logo on the left, fixed title centred, request code and status on the right.
///
/// Independent of pagination, so every page gets the same header.
pub fn header_template(record: &AuthorizationRecord, logo: &LogoImage) -> String {
    format!(
        r#"<div style="width: 100%; height: {HEADER_HEIGHT_PX}px; margin: 0; padding: 0 28px; box-sizing: border-box; font-family: 'Segoe UI', 'Helvetica Neue', Arial, sans-serif; -webkit-print-color-adjust: exact; print-color-adjust: exact;">
  <div style="position: relative; width: 100%; height: 100%; border-bottom: 3px solid #2c3e50;">
    <div style="position: absolute; left: 0; top: 50%; transform: translateY(-50%);">
      <img src="{logo}" style="width: 70px; height: 70px; object-fit: contain;" />
    </div>
    <div style="position: absolute; left: 50%; top: 50%; transform: translate(-50%, -50%); text-align: center; width: 60%;">
      <h1 style="margin: 0; font-size: 16px; font-weight: 700; color: #2c3e50; text-transform: uppercase; letter-spacing: 0.5px;">{DOCUMENT_TITLE}</h1>
      <p style="margin: 4px 0 0 0; font-size: 10px; color: #6c757d;">{DOCUMENT_SUBTITLE}</p>
    </div>
    <div style="position: absolute; right: 0; top: 50%; transform: translateY(-50%); text-align: right;">
      <div style="font-size: 11px; font-weight: 700; color: #2c3e50; margin-bottom: 6px;">{code}</div>
      {badge}
    </div>
  </div>
</div>"#,
        logo = escape_html(logo.data_uri()),
        code = escape_html(&request_code(record.id)),
        badge = status_badge(record.status),
    )
}

/// Footer: product identity, engine-resolved page counter and generation time, on an
/// inverted colour scheme spanning the full page width.
pub fn footer_template(generated_at: NaiveDateTime) -> String {
    format!(
        r#"<div style="width: 100%; height: {FOOTER_HEIGHT_PX}px; margin: 0; padding: 0; box-sizing: border-box; font-family: 'Segoe UI', 'Helvetica Neue', Arial, sans-serif; -webkit-print-color-adjust: exact; print-color-adjust: exact;">
  <div style="display: flex; align-items: center; justify-content: space-between; width: 100%; height: 100%; padding: 0 28px; box-sizing: border-box; background: #2c3e50; color: #ffffff;">
    <div style="text-align: left;">
      <h4 style="margin: 0; font-size: 10px; font-weight: 700; color: #c6d651;">{SYSTEM_NAME}</h4>
      <p style="margin: 2px 0 0 0; font-size: 9px;">{PRODUCT_NAME}</p>
    </div>
    <div style="text-align: center;">
      <p style="margin: 0; font-size: 9px;">Página <span class="pageNumber"></span> de <span class="totalPages"></span></p>
    </div>
    <div style="text-align: right;">
      <h4 style="margin: 0; font-size: 10px; font-weight: 700; color: #c6d651;">Documento Gerado</h4>
      <p style="margin: 2px 0 0 0; font-size: 9px;">{timestamp}</p>
      <p style="margin: 2px 0 0 0; font-size: 8px; opacity: 0.8;">Documento Oficial</p>
    </div>
  </div>
</div>"#,
        timestamp = escape_html(&format_timestamp(generated_at)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use authorization::AuthorizationStatus;
    use chrono::NaiveDate;

    fn generated_at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 2)
            .and_then(|d| d.and_hms_opt(14, 30, 0))
            .unwrap()
    }

    fn logo() -> LogoImage {
        LogoImage::from_bytes(b"\x89PNG\r\n\x1a\n0000")
    }

    #[test]
    fn header_carries_logo_code_and_status() {
        let record = AuthorizationRecord {
            id: Some(7),
            status: AuthorizationStatus::Rejected,
            ..AuthorizationRecord::default()
        };
        let header = header_template(&record, &logo());

        assert!(header.contains(r#"<img src="data:image/png;base64,"#));
        assert!(header.contains("SOL-000007"));
        assert!(header.contains("Rejeitada"));
        assert!(header.contains(DOCUMENT_TITLE));
        assert!(header.contains("height: 132px"));
    }

    #[test]
    fn unsaved_record_gets_placeholder_code() {
        let header = header_template(&AuthorizationRecord::default(), &logo());
        assert!(header.contains("SOL-NOVA"));
        assert!(header.contains("Pendente"));
    }

    #[test]
    fn footer_uses_engine_page_placeholders() {
        let footer = footer_template(generated_at());

        assert!(footer.contains(r#"<span class="pageNumber"></span>"#));
        assert!(footer.contains(r#"<span class="totalPages"></span>"#));
        assert!(footer.contains("02/05/2024 - 14:30:00"));
        assert!(footer.contains(PRODUCT_NAME));
        assert!(footer.contains("background: #2c3e50"));
        assert!(footer.contains("height: 80px"));
    }

    #[test]
    fn header_is_independent_of_body_content() {
        let mut record = AuthorizationRecord {
            id: Some(3),
            ..AuthorizationRecord::default()
        };
        let before = header_template(&record, &logo());
        record.clinical_notes = onkhos_types::NonEmptyText::from_optional(Some("nota longa"));
        assert_eq!(before, header_template(&record, &logo()));
    }
}
