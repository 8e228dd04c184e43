use serde::{ Serialize, Deserialize };
use serde_json::{ Map, Value };

/// Electronic medical record as entered in the UI. Missing sections are sent as "".
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalRecord {
    pub chief_complaint: Option<String>,
    pub present_illness: Option<String>,
    pub past_history: Option<String>,
    pub physical_exam: Option<String>,
    pub auxiliary_exam: Option<String>,
}

/// Body of `POST /diagnosis`.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct DiagnosisRequest {
    pub chief_complaint: String,
    pub present_illness: String,
    pub past_illness: String,
    pub physical_examination: String,
    pub auxiliary_exam: String,
}

impl From<&MedicalRecord> for DiagnosisRequest {
    fn from(record: &MedicalRecord) -> Self {
        fn field(value: &Option<String>) -> String {
            value.clone().unwrap_or_default()
        }

        Self {
            chief_complaint: field(&record.chief_complaint),
            present_illness: field(&record.present_illness),
            past_illness: field(&record.past_history),
            physical_examination: field(&record.physical_exam),
            auxiliary_exam: field(&record.auxiliary_exam),
        }
    }
}

/// Whatever the diagnosis endpoint returns. Only `results` and `error` are known;
/// anything else is kept verbatim.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct DiagnosisResult {
    #[serde(default)]
    pub results: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DiagnosisResult {
    pub fn fallback(error: impl Into<String>) -> Self {
        Self {
            results: Vec::new(),
            error: Some(error.into()),
            extra: Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults_missing_fields() {
        let record = MedicalRecord {
            chief_complaint: Some("胸痛2小时".into()),
            physical_exam: Some("BP 150/90".into()),
            ..Default::default()
        };
        let json = serde_json::to_value(DiagnosisRequest::from(&record)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "chief_complaint": "胸痛2小时",
                "present_illness": "",
                "past_illness": "",
                "physical_examination": "BP 150/90",
                "auxiliary_exam": ""
            })
        );
    }

    #[test]
    fn test_result_keeps_unknown_fields() {
        let result: DiagnosisResult = serde_json::from_str(
            r#"{"results":[{"disease":"心绞痛","score":0.8}],"model":"v2"}"#
        ).unwrap();
        assert_eq!(result.results.len(), 1);
        assert!(result.error.is_none());
        assert_eq!(result.extra.get("model"), Some(&Value::from("v2")));
    }

    #[test]
    fn test_fallback_serializes_results_and_error() {
        let json = serde_json::to_value(DiagnosisResult::fallback("boom")).unwrap();
        assert_eq!(json, serde_json::json!({ "results": [], "error": "boom" }));
    }
}
