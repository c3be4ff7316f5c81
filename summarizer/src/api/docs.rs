use serde_json::{json, Value};

use crate::domain::{Domain, DomainKind};

/// Static description of the expected request body for one route family.
pub fn describe(domain: &Domain) -> Value {
    match domain.kind {
        DomainKind::Clinical => clinical(),
        DomainKind::Veterinary => veterinary(),
    }
}

fn optional_fields(subject_key: &str, subject_description: &str) -> Value {
    json!({
        subject_key: subject_description,
        "formato": "Summary format: texto (default), html, markdown",
        "observacoes": "Additional notes (max 1000 characters)",
    })
}

fn clinical() -> Value {
    json!({
        "endpoint": "POST /api/v1/summary",
        "description": "Generates a clinical summary from visit data sent by the client",
        "requiredFields": {
            "historico": "Array with at least one visit",
        },
        "optionalFields": optional_fields("dados_paciente", "Basic patient information"),
        "recordFields": {
            "data_consulta": "Visit date (required)",
            "tipo_atendimento": "Visit type",
            "local_atendimento": "Visit location",
            "peso": "Weight in kg",
            "altura": "Height in meters",
            "pamax": "Systolic blood pressure",
            "pamin": "Diastolic blood pressure",
            "hipotese_diagnostico": "Array of diagnostic hypotheses",
            "procedimentos": "Array of procedures performed",
            "medicacoes": "Array of prescribed medications",
            "orientacoes": "Array of guidance given",
            "exames": "Array of requested exams",
            "observacoes": "Visit notes",
        },
        "example": {
            "dados_paciente": {"nome": "João Silva", "idade": 45, "sexo": "M"},
            "historico": [{
                "data_consulta": "15/01/2025",
                "tipo_atendimento": "CONSULTA AGENDADA",
                "local_atendimento": "UBS",
                "peso": 75.0,
                "altura": 1.75,
                "pamax": 140,
                "pamin": 90,
                "hipotese_diagnostico": ["Hipertensão arterial", "Diabetes tipo 2"],
                "procedimentos": ["Aferição de pressão", "Consulta médica"],
                "medicacoes": ["Losartana 50mg", "Metformina 500mg"],
                "orientacoes": ["Dieta hipossódica", "Exercícios regulares"],
            }],
            "formato": "texto",
            "observacoes": "Paciente em acompanhamento regular",
        },
    })
}

fn veterinary() -> Value {
    json!({
        "endpoint": "POST /api/v1/veterinary/summary",
        "description": "Generates a veterinary summary from animal consultation data",
        "requiredFields": {
            "historico": "Array with at least one veterinary consultation",
        },
        "optionalFields": optional_fields("dados_animal", "Basic animal information"),
        "recordFields": {
            "data_consulta": "Consultation date (required)",
            "tipo_consulta": "Consultation type (routine, emergency, ...)",
            "local_atendimento": "Consultation location",
            "peso": "Weight in kg",
            "altura": "Height in meters",
            "temperatura": "Body temperature",
            "frequencia_cardiaca": "Heart rate",
            "frequencia_respiratoria": "Respiratory rate",
            "exames_resultados": "Array of exam results",
            "vacinas": "Array of vaccines given",
            "procedimentos": "Array of procedures performed",
            "medicacoes": "Array of prescribed medications",
            "diagnosticos": "Array of diagnoses",
            "orientacoes": "Array of guidance given",
            "observacoes": "Consultation notes",
        },
        "example": {
            "dados_animal": {
                "nome": "Rex",
                "especie": "Cão",
                "raca": "Labrador",
                "idade": 3,
                "sexo": "M",
            },
            "historico": [{
                "data_consulta": "10/03/2025",
                "peso": 25.5,
                "altura": 0.6,
                "tipo_consulta": "rotina",
                "exames_resultados": ["Hemograma normal", "Ultrassom abdominal sem alterações"],
                "vacinas": ["V8 completa", "Antirrábica"],
                "medicacoes": ["Antipulgas mensal"],
                "diagnosticos": ["Animal saudável"],
                "observacoes": "Animal ativo, sem sinais de doença",
            }],
            "formato": "texto",
            "observacoes": "Animal em acompanhamento regular",
        },
    })
}
