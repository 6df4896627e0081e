//! Error creation and message formatting

use em_fx_scan::error::AnalysisError;

#[cfg(test)]
mod error_tests {
    use super::*;

    #[test]
    fn test_column_not_found() {
        let err = AnalysisError::ColumnNotFound("USDINR Curncy".to_string());
        assert_eq!(err.to_string(), "Column not found: USDINR Curncy");
    }

    #[test]
    fn test_parse_error_names_row() {
        let err = AnalysisError::ParseError {
            row: 42,
            message: "invalid date '2000-13-01'".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("row 42"));
        assert!(msg.contains("2000-13-01"));
    }

    #[test]
    fn test_insufficient_data() {
        let err = AnalysisError::InsufficientData {
            required: 5,
            available: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("required 5"));
        assert!(msg.contains("available 3"));
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "EM_basket_pairs.csv");
        let err: AnalysisError = io.into();
        assert!(matches!(err, AnalysisError::Io(_)));
        assert!(err.to_string().starts_with("IO error"));
    }

    #[test]
    fn test_serde_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: AnalysisError = json_err.into();
        assert!(matches!(err, AnalysisError::Serde(_)));
    }
}
