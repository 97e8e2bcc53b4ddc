use super::format::escape_html;
use super::sections::{
    clinical_notes_section, coadjuvant_section, diagnosis_section, identity_section,
    prescription_section, prior_treatment_section, protocol_section, signature_section, Section,
};
use crate::medication::NormalizedMedications;
use authorization::AuthorizationRecord;

/// Print stylesheet of the document body.
///
/// No external fonts or stylesheets: the rendering engine blocks those requests.
const DOCUMENT_STYLE: &str = r#"
* { margin: 0; padding: 0; box-sizing: border-box; }
html, body { width: 100%; background: #ffffff; }
body {
    font-family: "Source Sans Pro", "Segoe UI", "Helvetica Neue", Arial, sans-serif;
    font-size: 10px;
    line-height: 1.4;
    color: #2c3e50;
    padding: 12px 28px;
    -webkit-print-color-adjust: exact;
    print-color-adjust: exact;
}
.section { margin-bottom: 12px; border: 1px solid #dee2e6; border-radius: 6px; overflow: hidden; page-break-inside: avoid; break-inside: avoid; }
.section-header { background: #2c3e50; color: #ffffff; padding: 6px 10px; }
.section-title { display: flex; align-items: center; gap: 8px; font-size: 11px; font-weight: 700; text-transform: uppercase; letter-spacing: 0.5px; }
.section-number { width: 18px; height: 18px; border-radius: 50%; background: #c6d651; color: #2c3e50; display: flex; align-items: center; justify-content: center; font-size: 10px; }
.section-content { padding: 10px; }
.info-grid { display: grid; grid-template-columns: 1fr 1fr; gap: 8px; margin-bottom: 8px; }
.info-grid-3 { display: grid; grid-template-columns: repeat(3, 1fr); gap: 8px; margin-bottom: 8px; }
.info-grid-4, .staging-grid { display: grid; grid-template-columns: repeat(4, 1fr); gap: 8px; margin-bottom: 8px; }
.treatment-grid { display: grid; grid-template-columns: 1fr 1fr; gap: 8px; }
.info-item { display: flex; flex-direction: column; margin-bottom: 4px; }
.info-label { font-size: 8px; font-weight: 600; color: #6c757d; text-transform: uppercase; letter-spacing: 0.3px; margin-bottom: 2px; }
.info-value { min-height: 18px; padding: 3px 6px; border-bottom: 1px solid #ced4da; font-weight: 500; word-break: break-word; }
.text-area-value { min-height: 28px; padding: 4px 6px; border: 1px solid #ced4da; border-radius: 4px; background: #fdfdfd; white-space: pre-wrap; word-break: break-word; }
.highlight-clinical { background: #f4f8e1; border-left: 3px solid #c6d651; padding: 6px; border-radius: 4px; }
.medication-section { display: flex; flex-direction: column; gap: 8px; }
.medication-title { font-size: 10px; font-weight: 700; color: #2c3e50; text-transform: uppercase; }
.signature-section { margin-top: 16px; border: 2px solid #2c3e50; border-radius: 6px; padding: 12px; page-break-inside: avoid; break-inside: avoid; }
.signature-title { font-size: 11px; font-weight: 700; text-transform: uppercase; margin-bottom: 10px; text-align: center; }
.signature-grid { display: grid; grid-template-columns: 1fr 1fr; gap: 16px; }
.signature-box { margin-top: 28px; border-top: 1px solid #2c3e50; padding-top: 4px; text-align: center; }
.signature-label { font-size: 8px; color: #6c757d; text-transform: uppercase; }
.authorization-box { padding: 8px; border: 1px dashed #6c757d; border-radius: 4px; font-size: 11px; font-weight: 700; text-align: center; }
.authorization-approved { border: 2px solid #155724; background: #d4edda; color: #155724; }
.clinical-note { margin-top: 8px; padding: 8px; border-radius: 4px; background: #d4edda; color: #155724; font-weight: 700; text-align: center; }
"#;

/// Assembles the complete document body markup.
///
/// Fixed sections are always present; metastasis, coadjuvant and clinical-notes content is
/// only emitted when the record carries it. Sections are numbered in emission order and
/// the signature block closes the document.
pub fn compose_document(
    record: &AuthorizationRecord,
    medications: &NormalizedMedications,
) -> String {
    let sections: Vec<Section> = [
        Some(identity_section(record)),
        Some(diagnosis_section(record)),
        Some(prior_treatment_section(record)),
        Some(protocol_section(record)),
        Some(prescription_section(record, medications)),
        coadjuvant_section(record),
        clinical_notes_section(record),
    ]
    .into_iter()
    .flatten()
    .collect();

    let body = sections
        .iter()
        .enumerate()
        .map(|(index, section)| section.render(index + 1))
        .collect::<String>();

    format!(
        r#"<!DOCTYPE html>
<html lang="pt-BR">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Autorização de Tratamento Oncológico - {patient}</title>
<style>{DOCUMENT_STYLE}</style>
</head>
<body>
{body}{signature}</body>
</html>
"#,
        patient = escape_html(&record.patient.name),
        signature = signature_section(record),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::medication::normalize_medications;
    use authorization::{AuthorizationStatus, MedicationSource, NonEmptyText};

    fn record() -> AuthorizationRecord {
        let mut record = AuthorizationRecord::default();
        record.id = Some(42);
        record.patient.name = "Maria da Silva".into();
        record.medications = MedicationSource::FreeText("Cisplatina 75mg EV 1 21 dias".into());
        record
    }

    fn compose(record: &AuthorizationRecord) -> String {
        compose_document(record, &normalize_medications(record))
    }

    #[test]
    fn emits_all_fixed_sections() {
        let html = compose(&record());
        for title in [
            "Identificação da Instituição e Paciente",
            "Diagnóstico Oncológico e Estadiamento TNM",
            "Histórico de Tratamentos Oncológicos Prévios",
            "Protocolo Quimioterápico Proposto",
            "Prescrição de Agentes Antineoplásicos",
            "Responsabilidade Médica e Autorização",
        ] {
            assert!(html.contains(title), "missing section {title}");
        }
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(r#"<html lang="pt-BR">"#));
    }

    #[test]
    fn empty_clinical_notes_leave_no_header() {
        let html = compose(&record());
        assert!(!html.contains("Observações Clínicas"));
        assert!(!html.contains("Medicações Coadjuvantes"));
        assert_eq!(html.matches(r#"class="section""#).count(), 5);
    }

    #[test]
    fn conditional_sections_are_numbered_consecutively() {
        let mut record = record();
        record.clinical_notes = NonEmptyText::from_optional(Some("Paciente com neuropatia grau 1"));
        let html = compose(&record);

        assert!(html.contains("Observações Clínicas Adicionais"));
        assert!(html.contains(
            r#"<div class="section-number">6</div>Observações Clínicas Adicionais"#
        ));

        record.coadjuvant_medications = NonEmptyText::from_optional(Some("Ondansetrona 8mg EV"));
        let html = compose(&record);
        assert!(html.contains(
            r#"<div class="section-number">6</div>Medicações Coadjuvantes e Suporte"#
        ));
        assert!(html.contains(
            r#"<div class="section-number">7</div>Observações Clínicas Adicionais"#
        ));
    }

    #[test]
    fn approved_record_shows_indicator_and_number() {
        let mut record = record();
        record.status = AuthorizationStatus::Approved;
        record.authorization_number = NonEmptyText::from_optional(Some("AUT-2024/00981"));
        let html = compose(&record);

        assert!(html.contains("AUTORIZAÇÃO MÉDICA APROVADA"));
        assert!(html.contains("authorization-approved"));
        assert!(html.contains(">AUT-2024/00981<"));
        assert!(html.contains("status-aprovada"));
    }

    #[test]
    fn clinical_text_is_escaped_verbatim() {
        let mut record = record();
        let notes = "Dose reduzida 20% <b>após</b> toxicidade & febre";
        record.clinical_notes = NonEmptyText::from_optional(Some(notes));
        record.patient.name = "Ana \"Anita\" O'Neil".into();
        let html = compose(&record);

        assert!(html.contains("Dose reduzida 20% &lt;b&gt;após&lt;/b&gt; toxicidade &amp; febre"));
        assert!(!html.contains("<b>após</b>"));
        assert!(html.contains("Ana &quot;Anita&quot; O&#39;Neil"));
    }

    #[test]
    fn document_references_no_external_resources() {
        let html = compose(&record());
        assert!(!html.contains("http://"));
        assert!(!html.contains("https://"));
        assert!(!html.contains("@import"));
    }

    #[test]
    fn long_free_text_is_not_truncated() {
        let mut record = record();
        let long_text = "Hidratação vigorosa; ".repeat(200);
        record.coadjuvant_medications = NonEmptyText::from_optional(Some(long_text.as_str()));
        let html = compose(&record);
        assert!(html.contains(long_text.trim()));
    }
}
