//! Field vocabulary for the two pipeline variants.
//!
//! The clinical (human patient) and veterinary (animal) pipelines share every
//! algorithm; they only differ in the tables below. A `Domain` is a static
//! descriptor handed to the normalizer, validator and warning generator.

use chrono::Local;
use serde_json::Value;

/// Which pipeline a request belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DomainKind {
    Clinical,
    Veterinary,
}

impl DomainKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Clinical => "clinical",
            Self::Veterinary => "veterinary",
        }
    }
}

/// One canonical field and the raw keys accepted for it, in precedence order.
#[derive(Debug)]
pub struct FieldSpec {
    pub canonical: &'static str,
    pub aliases: &'static [&'static str],
    pub default: Option<fn() -> Value>,
}

impl FieldSpec {
    const fn plain(name: &'static str, aliases: &'static [&'static str]) -> Self {
        Self { canonical: name, aliases, default: None }
    }
}

/// Counts records where every listed field is blank.
#[derive(Debug)]
pub struct MissingRule {
    pub fields: &'static [&'static str],
    pub subject: &'static str,
}

/// Vaccine names containing any of `tokens` may be due for a booster.
#[derive(Debug)]
pub struct BoosterWatch {
    pub field: &'static str,
    pub tokens: &'static [&'static str],
}

#[derive(Debug)]
pub struct Domain {
    pub kind: DomainKind,
    /// Request key carrying the free-form subject description.
    pub subject_key: &'static str,
    /// Singular label for one record, e.g. "Visit".
    pub record_label: &'static str,
    pub fields: &'static [FieldSpec],
    pub date_aliases: &'static [&'static str],
    /// A record is substantive if any key of any group is non-blank.
    pub substance_groups: &'static [&'static [&'static str]],
    pub substance_description: &'static str,
    pub history_required: &'static str,
    pub subject_missing_warning: &'static str,
    pub single_record_warning: &'static str,
    pub missing_rules: &'static [MissingRule],
    pub booster_watch: Option<BoosterWatch>,
    pub subject_suggestion: &'static str,
    /// Per-record suggestions on the validate endpoint, checked on raw keys.
    pub suggestion_rules: &'static [MissingRule],
    pub no_records_error: &'static str,
    /// Prepended to errors reported by the remote backends.
    pub provider_error_prefix: &'static str,
}

pub const DATE_FIELD: &str = "data_consulta";

fn today() -> Value {
    Value::String(Local::now().format("%d/%m/%Y").to_string())
}

const DATE_ALIASES: &[&str] = &["data_consulta", "data_atendimento"];

pub static CLINICAL: Domain = Domain {
    kind: DomainKind::Clinical,
    subject_key: "dados_paciente",
    record_label: "Visit",
    fields: &[
        FieldSpec { canonical: DATE_FIELD, aliases: DATE_ALIASES, default: Some(today) },
        FieldSpec::plain("tipo_atendimento", &["tipo_atendimento", "tipo"]),
        FieldSpec::plain("local_atendimento", &["local_atendimento", "local"]),
        FieldSpec::plain("peso", &["peso"]),
        FieldSpec::plain("altura", &["altura"]),
        FieldSpec::plain("imc", &["imc"]),
        FieldSpec::plain("pamax", &["pamax", "pressao_maxima"]),
        FieldSpec::plain("pamin", &["pamin", "pressao_minima"]),
        FieldSpec::plain("hipotese_diagnostico", &["hipotese_diagnostico", "diagnostico"]),
        FieldSpec::plain("procedimentos", &["procedimentos"]),
        FieldSpec::plain("medicacoes", &["medicacoes", "medicamentos"]),
        FieldSpec::plain("orientacoes", &["orientacoes"]),
        FieldSpec::plain("exames", &["exames"]),
        FieldSpec::plain("observacoes", &["observacoes"]),
    ],
    date_aliases: DATE_ALIASES,
    substance_groups: &[
        &["hipotese_diagnostico", "diagnostico"],
        &["procedimentos"],
        &["medicacoes", "medicamentos"],
        &["peso", "altura", "pamax", "pamin"],
    ],
    substance_description: "diagnosis, procedures, medications or vital signs",
    history_required: "Visit history is required",
    subject_missing_warning: "Basic patient data not provided - consider including name, age and sex for better quality",
    single_record_warning: "Only one visit provided - a longer history produces more accurate summaries",
    missing_rules: &[
        MissingRule { fields: &["peso", "altura"], subject: "anthropometric data (weight/height)" },
        MissingRule { fields: &["pamax", "pamin"], subject: "blood pressure" },
        MissingRule { fields: &["hipotese_diagnostico"], subject: "a diagnostic hypothesis" },
    ],
    booster_watch: None,
    subject_suggestion: "Consider including basic patient data (name, age, sex)",
    suggestion_rules: &[
        MissingRule { fields: &["peso", "altura"], subject: "anthropometric data" },
        MissingRule { fields: &["pamax", "pamin"], subject: "blood pressure" },
        MissingRule { fields: &["hipotese_diagnostico", "diagnostico"], subject: "a diagnostic hypothesis" },
    ],
    no_records_error: "No visit data was provided",
    provider_error_prefix: "",
};

pub static VETERINARY: Domain = Domain {
    kind: DomainKind::Veterinary,
    subject_key: "dados_animal",
    record_label: "Consultation",
    fields: &[
        FieldSpec { canonical: DATE_FIELD, aliases: DATE_ALIASES, default: Some(today) },
        FieldSpec::plain("tipo_consulta", &["tipo_consulta", "tipo"]),
        FieldSpec::plain("local_atendimento", &["local_atendimento", "local"]),
        FieldSpec::plain("peso", &["peso"]),
        FieldSpec::plain("altura", &["altura"]),
        FieldSpec::plain("temperatura", &["temperatura"]),
        FieldSpec::plain("frequencia_cardiaca", &["frequencia_cardiaca"]),
        FieldSpec::plain("frequencia_respiratoria", &["frequencia_respiratoria"]),
        FieldSpec::plain("exames_resultados", &["exames_resultados", "exames"]),
        FieldSpec::plain("vacinas", &["vacinas"]),
        FieldSpec::plain("procedimentos", &["procedimentos"]),
        FieldSpec::plain("medicacoes", &["medicacoes", "medicamentos"]),
        FieldSpec::plain("orientacoes", &["orientacoes"]),
        FieldSpec::plain("diagnosticos", &["diagnosticos", "diagnostico"]),
        FieldSpec::plain("observacoes", &["observacoes"]),
    ],
    date_aliases: DATE_ALIASES,
    substance_groups: &[
        &["exames_resultados", "exames"],
        &["vacinas"],
        &["procedimentos"],
        &["medicacoes", "medicamentos"],
        &["peso", "altura", "temperatura", "frequencia_cardiaca"],
    ],
    substance_description: "exams, vaccines, procedures, medications or vital signs",
    history_required: "Veterinary consultation history is required",
    subject_missing_warning: "Basic animal data not provided - consider including name, species, breed and age for better quality",
    single_record_warning: "Only one consultation provided - a longer history produces more accurate summaries",
    missing_rules: &[
        MissingRule { fields: &["peso"], subject: "the animal's weight" },
        MissingRule { fields: &["vacinas"], subject: "vaccine history" },
        MissingRule { fields: &["exames_resultados"], subject: "exam results" },
        MissingRule { fields: &["diagnosticos"], subject: "a diagnosis" },
    ],
    booster_watch: Some(BoosterWatch {
        field: "vacinas",
        tokens: &["v8", "antirrábica", "anual"],
    }),
    subject_suggestion: "Consider including basic animal data (name, species, breed, age)",
    suggestion_rules: &[
        MissingRule { fields: &["peso"], subject: "the animal's weight" },
        MissingRule { fields: &["vacinas"], subject: "vaccine history" },
        MissingRule { fields: &["exames_resultados", "exames"], subject: "exam results" },
    ],
    no_records_error: "No veterinary consultation data was provided",
    provider_error_prefix: "Error generating veterinary summary: ",
};

impl Domain {
    pub fn record_label_lower(&self) -> String {
        self.record_label.to_lowercase()
    }

    pub fn field(&self, canonical: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.canonical == canonical)
    }
}
