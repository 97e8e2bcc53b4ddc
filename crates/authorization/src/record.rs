//! Authorization record wire model and translation helpers.
//!
//! Responsibilities:
//! - Define the domain-level record read by the document generator
//! - Define a wire model matching the clinic backend's JSON (column names as keys)
//! - Translate wire into domain, applying the medication precedence rule once
//!
//! Notes:
//! - Unknown keys are ignored; the backend attaches join columns the generator never reads
//! - Display-only numeric columns are accepted as numbers or strings

use crate::flexible;
use crate::medication::MedicationSource;
use crate::{path_and_message, AuthorizationError, AuthorizationResult};
use onkhos_types::{AuthorizationStatus, NonEmptyText, Sex};
use serde::Deserialize;

// ============================================================================
// Public domain-level types
// ============================================================================

/// Requesting institution.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Institution {
    pub name: String,
    pub code: String,
}

/// Patient identification as printed on the request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PatientIdentity {
    pub name: String,
    pub registry_code: String,
    pub sex: Option<Sex>,
    /// Raw date as stored (`YYYY-MM-DD` or RFC 3339).
    pub birth_date: String,
    pub age: String,
}

/// TNM staging fields.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TnmStaging {
    pub tumor: String,
    pub nodes: String,
    pub metastasis: String,
    pub clinical_stage: String,
}

/// Diagnosis coding and staging.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Diagnosis {
    /// CID-10 code.
    pub cid_code: String,
    pub description: String,
    pub metastasis_sites: Option<NonEmptyText>,
    pub staging: TnmStaging,
}

/// Oncological treatments received before this request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PriorTreatment {
    pub surgery_or_radiotherapy: Option<NonEmptyText>,
    pub adjuvant_chemotherapy: Option<NonEmptyText>,
    pub first_line_chemotherapy: Option<NonEmptyText>,
    pub later_line_chemotherapy: Option<NonEmptyText>,
}

/// Proposed protocol and the anthropometrics it was dosed against.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProtocolParameters {
    /// Therapeutic intent (neoadjuvante, adjuvante, curativo, controle, radioterapia, paliativo).
    pub intent: String,
    /// ECOG performance status.
    pub performance_status: String,
    pub acronym: String,
    pub planned_cycles: String,
    pub current_cycle: String,
    /// Body-surface area in m².
    pub body_surface_area: String,
    /// Weight in kg.
    pub weight: String,
    /// Height in cm.
    pub height: String,
}

/// Dosing descriptors shared by the whole prescription.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Dosing {
    pub dose_per_m2: String,
    pub total_dose: String,
    pub route: String,
    /// Day and interval schedule.
    pub schedule: String,
}

/// Domain-level treatment-authorization request.
///
/// Read-only to the document generator; owned by the clinic backend.
///
/// Conditional fields (`Option<NonEmptyText>`) are trimmed of surrounding whitespace on
/// parse; their interior text, line breaks included, is kept exactly as typed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthorizationRecord {
    /// Backend identifier; `None` for a request that has not been saved yet.
    pub id: Option<u64>,
    pub institution: Institution,
    pub patient: PatientIdentity,
    /// Raw request date as stored.
    pub request_date: String,
    pub diagnosis: Diagnosis,
    pub prior_treatment: PriorTreatment,
    pub protocol: ProtocolParameters,
    pub medications: MedicationSource,
    pub dosing: Dosing,
    pub coadjuvant_medications: Option<NonEmptyText>,
    /// Signing physician identifier (name and CRM).
    pub signing_physician: String,
    pub authorization_number: Option<NonEmptyText>,
    pub status: AuthorizationStatus,
    pub clinical_notes: Option<NonEmptyText>,
}

impl AuthorizationRecord {
    /// Parse a record from the backend's JSON representation.
    ///
    /// # Errors
    ///
    /// Returns [`AuthorizationError::RecordSchema`] naming the failing field when the JSON
    /// does not match the wire model, and [`AuthorizationError::InvalidInput`] when `id` is
    /// not a non-negative integer.
    pub fn from_json_str(json: &str) -> AuthorizationResult<Self> {
        let mut deserializer = serde_json::Deserializer::from_str(json);
        let wire: AuthorizationRecordWire = serde_path_to_error::deserialize(&mut deserializer)
            .map_err(|err| {
                let (path, message) = path_and_message(err);
                AuthorizationError::RecordSchema { path, message }
            })?;

        wire_to_domain(wire)
    }

    /// Parse a record from raw JSON bytes.
    pub fn from_json_slice(json: &[u8]) -> AuthorizationResult<Self> {
        let text = std::str::from_utf8(json)
            .map_err(|e| AuthorizationError::InvalidInput(format!("record is not UTF-8: {e}")))?;
        Self::from_json_str(text)
    }
}

// ============================================================================
// Wire model
// ============================================================================

#[derive(Deserialize)]
struct AuthorizationRecordWire {
    #[serde(default, deserialize_with = "flexible::optional_text")]
    id: Option<String>,
    #[serde(default, deserialize_with = "flexible::text")]
    hospital_nome: String,
    #[serde(default, deserialize_with = "flexible::text")]
    hospital_codigo: String,
    #[serde(default, deserialize_with = "flexible::text")]
    cliente_nome: String,
    #[serde(default, deserialize_with = "flexible::text")]
    cliente_codigo: String,
    #[serde(default, deserialize_with = "flexible::optional_text")]
    sexo: Option<String>,
    #[serde(default, deserialize_with = "flexible::text")]
    data_nascimento: String,
    #[serde(default, deserialize_with = "flexible::text")]
    idade: String,
    #[serde(default, deserialize_with = "flexible::text")]
    data_solicitacao: String,

    #[serde(default, deserialize_with = "flexible::text")]
    diagnostico_cid: String,
    #[serde(default, deserialize_with = "flexible::text")]
    diagnostico_descricao: String,
    #[serde(default, deserialize_with = "flexible::optional_text")]
    local_metastases: Option<String>,
    #[serde(default, deserialize_with = "flexible::text")]
    estagio_t: String,
    #[serde(default, deserialize_with = "flexible::text")]
    estagio_n: String,
    #[serde(default, deserialize_with = "flexible::text")]
    estagio_m: String,
    #[serde(default, deserialize_with = "flexible::text")]
    estagio_clinico: String,

    #[serde(default, deserialize_with = "flexible::optional_text")]
    tratamento_cirurgia_radio: Option<String>,
    #[serde(default, deserialize_with = "flexible::optional_text")]
    tratamento_quimio_adjuvante: Option<String>,
    #[serde(default, deserialize_with = "flexible::optional_text")]
    tratamento_quimio_primeira_linha: Option<String>,
    #[serde(default, deserialize_with = "flexible::optional_text")]
    tratamento_quimio_segunda_linha: Option<String>,

    #[serde(default, deserialize_with = "flexible::text")]
    finalidade: String,
    #[serde(default, deserialize_with = "flexible::text")]
    performance_status: String,
    #[serde(default, deserialize_with = "flexible::text")]
    siglas: String,
    #[serde(default, deserialize_with = "flexible::text")]
    ciclos_previstos: String,
    #[serde(default, deserialize_with = "flexible::text")]
    ciclo_atual: String,
    #[serde(default, deserialize_with = "flexible::text")]
    superficie_corporal: String,
    #[serde(default, deserialize_with = "flexible::text")]
    peso: String,
    #[serde(default, deserialize_with = "flexible::text")]
    altura: String,

    #[serde(default, deserialize_with = "flexible::optional_text")]
    protocolo_medicamentos_json: Option<String>,
    #[serde(default, deserialize_with = "flexible::optional_text")]
    protocolo_nome: Option<String>,
    #[serde(default, deserialize_with = "flexible::optional_text")]
    medicamentos_antineoplasticos: Option<String>,

    #[serde(default, deserialize_with = "flexible::text")]
    dose_por_m2: String,
    #[serde(default, deserialize_with = "flexible::text")]
    dose_total: String,
    #[serde(default, deserialize_with = "flexible::text")]
    via_administracao: String,
    #[serde(default, deserialize_with = "flexible::text")]
    dias_aplicacao_intervalo: String,
    #[serde(default, deserialize_with = "flexible::optional_text")]
    medicacoes_associadas: Option<String>,

    #[serde(default, deserialize_with = "flexible::text")]
    medico_assinatura_crm: String,
    #[serde(default, deserialize_with = "flexible::optional_text")]
    numero_autorizacao: Option<String>,
    #[serde(default)]
    status: Option<AuthorizationStatus>,
    #[serde(default, deserialize_with = "flexible::optional_text")]
    observacoes: Option<String>,
}

fn parse_sex(value: Option<String>) -> Option<Sex> {
    match value.as_deref().map(str::trim) {
        Some("M") => Some(Sex::Male),
        Some("F") => Some(Sex::Female),
        _ => None,
    }
}

fn parse_id(value: Option<String>) -> AuthorizationResult<Option<u64>> {
    let Some(raw) = value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    raw.parse::<u64>().map(Some).map_err(|_| {
        AuthorizationError::InvalidInput(format!(
            "id must be a non-negative integer, got {raw:?}"
        ))
    })
}

fn wire_to_domain(wire: AuthorizationRecordWire) -> AuthorizationResult<AuthorizationRecord> {
    Ok(AuthorizationRecord {
        id: parse_id(wire.id)?,
        institution: Institution {
            name: wire.hospital_nome,
            code: wire.hospital_codigo,
        },
        patient: PatientIdentity {
            name: wire.cliente_nome,
            registry_code: wire.cliente_codigo,
            sex: parse_sex(wire.sexo),
            birth_date: wire.data_nascimento,
            age: wire.idade,
        },
        request_date: wire.data_solicitacao,
        diagnosis: Diagnosis {
            cid_code: wire.diagnostico_cid,
            description: wire.diagnostico_descricao,
            metastasis_sites: NonEmptyText::from_optional(wire.local_metastases),
            staging: TnmStaging {
                tumor: wire.estagio_t,
                nodes: wire.estagio_n,
                metastasis: wire.estagio_m,
                clinical_stage: wire.estagio_clinico,
            },
        },
        prior_treatment: PriorTreatment {
            surgery_or_radiotherapy: NonEmptyText::from_optional(wire.tratamento_cirurgia_radio),
            adjuvant_chemotherapy: NonEmptyText::from_optional(wire.tratamento_quimio_adjuvante),
            first_line_chemotherapy: NonEmptyText::from_optional(
                wire.tratamento_quimio_primeira_linha,
            ),
            later_line_chemotherapy: NonEmptyText::from_optional(
                wire.tratamento_quimio_segunda_linha,
            ),
        },
        protocol: ProtocolParameters {
            intent: wire.finalidade,
            performance_status: wire.performance_status,
            acronym: wire.siglas,
            planned_cycles: wire.ciclos_previstos,
            current_cycle: wire.ciclo_atual,
            body_surface_area: wire.superficie_corporal,
            weight: wire.peso,
            height: wire.altura,
        },
        medications: MedicationSource::from_columns(
            wire.protocolo_medicamentos_json,
            wire.protocolo_nome,
            wire.medicamentos_antineoplasticos,
        ),
        dosing: Dosing {
            dose_per_m2: wire.dose_por_m2,
            total_dose: wire.dose_total,
            route: wire.via_administracao,
            schedule: wire.dias_aplicacao_intervalo,
        },
        coadjuvant_medications: NonEmptyText::from_optional(wire.medicacoes_associadas),
        signing_physician: wire.medico_assinatura_crm,
        authorization_number: NonEmptyText::from_optional(wire.numero_autorizacao),
        status: wire.status.unwrap_or_default(),
        clinical_notes: NonEmptyText::from_optional(wire.observacoes),
    })
}
