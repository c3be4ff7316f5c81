//! Prompt construction for the remote backends.

use serde_json::{json, Map, Value};

use crate::domain::{Domain, DomainKind};
use crate::models::{OutputFormat, ProviderRequest, Record};
use crate::pipeline::normalizer::is_blank;

const CLINICAL_INSTRUCTIONS: &str = "You are a medical assistant. Write a **short, objective clinical summary** of the patient, listing only important information. \
Do not include a detailed visit history, introductions or explanations.

Include only what is relevant and critical:
- Abnormal or important vital signs and anthropometric measurements
- Diagnostic hypotheses and relevant conditions
- Important procedures performed
- Relevant exams and significant results
- Essential medications or prescriptions
- Critical referrals or guidance
- For anthropometric data, do not just list weight or height. State whether the patient is underweight, normal weight, overweight or obese, using the BMI.";

const VETERINARY_INSTRUCTIONS: &str = "You are a veterinary assistant specialised in animal health summaries. \
Write a **short, objective health summary** of the animal, highlighting only important and critical information. \
Do not include introductions or a detailed history of every consultation.

Focus on:
- Overall health (weight, vital signs, relevant medical conditions)
- Vaccines given and vaccines pending, with recommended dates when available
- Exams performed and relevant results
- Important procedures or surgeries
- Critical recommendations or veterinary guidance";

pub fn instructions(domain: &Domain) -> &'static str {
    match domain.kind {
        DomainKind::Clinical => CLINICAL_INSTRUCTIONS,
        DomainKind::Veterinary => VETERINARY_INSTRUCTIONS,
    }
}

pub fn format_instruction(kind: DomainKind, format: OutputFormat) -> &'static str {
    match (kind, format) {
        (DomainKind::Clinical, OutputFormat::Text) => {
            "Format the answer as plain text, without markdown, bold, italics or special formatting symbols."
        }
        (DomainKind::Clinical, OutputFormat::Html) => {
            "Format the answer using markdown, which will be converted to HTML."
        }
        (DomainKind::Clinical, OutputFormat::Markdown) => {
            "Use markdown formatting with bold (**text**) for titles and important sections."
        }
        (DomainKind::Veterinary, OutputFormat::Text) => "Use plain, clear and objective text formatting.",
        (DomainKind::Veterinary, OutputFormat::Html) => {
            "Format the answer in HTML with appropriate tags for readability."
        }
        (DomainKind::Veterinary, OutputFormat::Markdown) => {
            "Format the answer in Markdown with headers, lists and appropriate formatting."
        }
    }
}

/// Regroups one normalized record into the shape sent to the model.
pub fn condense(domain: &Domain, record: &Record) -> Value {
    match domain.kind {
        DomainKind::Clinical => condense_clinical(record),
        DomainKind::Veterinary => condense_veterinary(record),
    }
}

fn condense_clinical(record: &Record) -> Value {
    let get = |key: &str| record.get(key).cloned().unwrap_or(Value::Null);

    let condensed = json!({
        "data_consulta": get("data_consulta"),
        "tipo_atendimento": get("tipo_atendimento"),
        "local_atendimento": get("local_atendimento"),
        "sinais_vitais": {
            "pressao_arterial": {
                "sistolica": get("pamax"),
                "diastolica": get("pamin"),
            },
        },
        "medidas_antropometricas": {
            "peso": get("peso"),
            "altura": get("altura"),
            "imc": get("imc"),
        },
        "hipotese_diagnostico": get("hipotese_diagnostico"),
        "procedimentos": get("procedimentos"),
        "exames": get("exames"),
        "medicacoes": get("medicacoes"),
        "orientacoes": get("orientacoes"),
        "observacoes": get("observacoes"),
    });

    remove_blank(condensed).unwrap_or_else(|| Value::Object(Map::new()))
}

fn condense_veterinary(record: &Record) -> Value {
    const UNITS: &[(&str, &str)] = &[
        ("peso", "kg"),
        ("altura", "m"),
        ("temperatura", "°C"),
        ("frequencia_cardiaca", " bpm"),
        ("frequencia_respiratoria", " rpm"),
    ];
    const PLAIN: &[(&str, &str)] = &[
        ("data_consulta", "data_consulta"),
        ("tipo_consulta", "tipo_consulta"),
        ("diagnosticos", "diagnosticos"),
        ("exames_resultados", "exames"),
        ("vacinas", "vacinas"),
        ("procedimentos", "procedimentos"),
        ("medicacoes", "medicacoes"),
        ("orientacoes", "orientacoes"),
        ("observacoes", "observacoes"),
    ];

    let mut condensed = Map::new();
    for (key, unit) in UNITS {
        if let Some(value) = record.get(*key).filter(|v| !is_blank(v)) {
            condensed.insert(key.to_string(), Value::String(format!("{}{}", scalar_text(value), unit)));
        }
    }
    for (key, target) in PLAIN {
        if let Some(value) = record.get(*key).filter(|v| !is_blank(v)) {
            condensed.insert(target.to_string(), value.clone());
        }
    }
    Value::Object(condensed)
}

/// Recursively drops blank values and objects left empty by that.
fn remove_blank(value: Value) -> Option<Value> {
    match value {
        Value::Object(map) => {
            let cleaned: Map<String, Value> = map
                .into_iter()
                .filter_map(|(k, v)| remove_blank(v).map(|v| (k, v)))
                .collect();
            (!cleaned.is_empty()).then_some(Value::Object(cleaned))
        }
        other if is_blank(&other) => None,
        other => Some(other),
    }
}

/// Renders a JSON scalar without quotes.
pub fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub fn records_payload(domain: &Domain, request: &ProviderRequest) -> Value {
    let condensed: Vec<Value> = request.records.iter().map(|r| condense(domain, r)).collect();
    match domain.kind {
        DomainKind::Clinical => json!({ "atendimentos": condensed }),
        DomainKind::Veterinary => json!({ "consultas": condensed }),
    }
}

/// One self-contained prompt, for backends without chat roles.
pub fn single_prompt(domain: &Domain, request: &ProviderRequest) -> Result<String, serde_json::Error> {
    let payload = serde_json::to_string_pretty(&records_payload(domain, request))?;
    Ok(format!(
        "{}\n\n{}\n\nRecords:\n{}",
        instructions(domain),
        format_instruction(domain.kind, request.format),
        payload
    ))
}

/// System and user messages, for chat-style backends.
pub fn chat_messages(domain: &Domain, request: &ProviderRequest) -> Result<(String, String), serde_json::Error> {
    let system = format!(
        "{}\n\n{}",
        instructions(domain),
        format_instruction(domain.kind, request.format)
    );
    let user = format!("Records: {}", serde_json::to_string(&records_payload(domain, request))?);
    Ok((system, user))
}
