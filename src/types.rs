//! Report schema shared by the orchestrator, synthesis stage and server.
//!
//! The wire format (camelCase keys, optional specialist echo objects) is the
//! contract the dashboard consumes; every required field must be present and
//! correctly typed before a report is handed to a caller.

use serde::{Deserialize, Deserializer, Serialize};

/// Severity of a single identified risk.
///
/// Model replies are accepted case-insensitively ("high", "HIGH", "High").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

impl<'de> Deserialize<'de> for RiskLevel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.to_ascii_lowercase().as_str() {
            "high" => Ok(RiskLevel::High),
            "medium" => Ok(RiskLevel::Medium),
            "low" => Ok(RiskLevel::Low),
            other => Err(serde::de::Error::unknown_variant(
                other,
                &["High", "Medium", "Low"],
            )),
        }
    }
}

/// One identified risk with its severity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Risk {
    pub level: RiskLevel,
    pub description: String,
}

/// Financial impact section of the final report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialData {
    pub requested_amount: String,
    pub treasury_impact: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runway_reduction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_impact: Option<String>,
}

/// Output of the governance runner (reported under the `analyst` agent).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GovernanceBrief {
    pub sentiment: String,
    pub benefits: Vec<String>,
}

/// Output of the security runner, echoed verbatim into the final report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityProfile {
    pub audit_status: String,
    pub wallet_age: String,
    pub vulnerabilities: String,
}

/// Output of the financial runner, echoed verbatim into the final report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialBrief {
    pub treasury_runway: String,
    pub roi_projection: String,
}

/// The final, strictly-shaped analysis report.
///
/// Only `security_profile` and `financial_brief` are optional; everything
/// else is required, and the fallback resolver guarantees the invariant
/// whenever synthesis cannot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub summary: String,
    pub risks: Vec<Risk>,
    pub benefits: Vec<String>,
    pub financial_data: FinancialData,
    pub security_score: u8,
    pub sentiment: String,
    pub recommendation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_profile: Option<SecurityProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub financial_brief: Option<FinancialBrief>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn risk_level_deserializes_case_insensitively() {
        for raw in ["\"High\"", "\"high\"", "\"HIGH\""] {
            let level: RiskLevel = serde_json::from_str(raw).unwrap();
            assert_eq!(level, RiskLevel::High);
        }
        assert!(serde_json::from_str::<RiskLevel>("\"critical\"").is_err());
    }

    #[test]
    fn result_wire_format_uses_camel_case() {
        let report = AnalysisResult {
            summary: "S".to_string(),
            risks: vec![Risk {
                level: RiskLevel::Low,
                description: "d".to_string(),
            }],
            benefits: vec!["b".to_string()],
            financial_data: FinancialData {
                requested_amount: "1".to_string(),
                treasury_impact: "2".to_string(),
                runway_reduction: None,
                market_impact: None,
            },
            security_score: 50,
            sentiment: "x".to_string(),
            recommendation: "y".to_string(),
            security_profile: None,
            financial_brief: None,
        };

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["financialData"]["requestedAmount"], "1");
        assert_eq!(value["securityScore"], 50);
        assert_eq!(value["risks"][0]["level"], "Low");
        // absent optionals are omitted, not serialized as null
        assert!(value.get("securityProfile").is_none());
    }

    #[test]
    fn result_rejects_missing_required_fields() {
        let incomplete = r#"{"summary": "only a summary"}"#;
        assert!(serde_json::from_str::<AnalysisResult>(incomplete).is_err());
    }
}
