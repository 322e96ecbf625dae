//! JSON serialization for validation reports.

use crate::result::ChiSquareReport;

/// Serialize a report to a compact JSON string.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_json(report: &ChiSquareReport) -> Result<String, serde_json::Error> {
    serde_json::to_string(report)
}

/// Serialize a report to a pretty-printed JSON string.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_json_pretty(report: &ChiSquareReport) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inversion::InversionStrategy;
    use crate::result::ChiSquareSummary;

    fn make_report() -> ChiSquareReport {
        ChiSquareReport {
            case: "deep-field".to_string(),
            strategy: Some(InversionStrategy::Eigen),
            summary: ChiSquareSummary {
                trials: 1000,
                degrees_of_freedom: 48,
                mean: 47.5,
                variance: 96.0,
                std_error: 0.31,
                z_score: -1.6,
                seed: 42,
            },
        }
    }

    #[test]
    fn test_to_json() {
        let json = to_json(&make_report()).unwrap();
        assert!(json.contains("\"case\":\"deep-field\""));
        assert!(json.contains("\"strategy\":\"Eigen\""));
        assert!(json.contains("\"degrees_of_freedom\":48"));
    }

    #[test]
    fn test_to_json_pretty_parses_back() {
        let report = make_report();
        let json = to_json_pretty(&report).unwrap();
        assert!(json.contains('\n'));
        let parsed: ChiSquareReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, report);
    }
}
