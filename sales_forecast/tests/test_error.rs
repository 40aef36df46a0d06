use forecast_math::MathError;
use sales_forecast::config::ProphetConfig;
use sales_forecast::error::ForecastError;
use std::io;
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn test_error_conversion() {
    // IO errors
    let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
    let forecast_error = ForecastError::from(io_error);
    assert!(matches!(forecast_error, ForecastError::IoError(_)));

    // Numerical kernel errors
    let math_error = MathError::InsufficientData("need 2 rows".to_string());
    let forecast_error = ForecastError::from(math_error.clone());
    match forecast_error {
        ForecastError::MathError(inner) => assert_eq!(inner, math_error),
        _ => panic!("Expected MathError variant"),
    }

    // JSON errors
    let json_error = serde_json::from_str::<ProphetConfig>("{not json").unwrap_err();
    let forecast_error = ForecastError::from(json_error);
    assert!(matches!(forecast_error, ForecastError::JsonError(_)));
}

#[test]
fn test_error_display() {
    let error = ForecastError::InvalidParameter("horizon must be at least 1".to_string());
    assert_eq!(error.to_string(), "Invalid parameter: horizon must be at least 1");

    let io_error = io::Error::new(io::ErrorKind::PermissionDenied, "permission denied");
    let error_string = ForecastError::from(io_error).to_string();
    assert!(error_string.contains("IO error"));
    assert!(error_string.contains("permission denied"));

    let error = ForecastError::from(MathError::InvalidInput("NaN in series".to_string()));
    assert!(error.to_string().contains("NaN in series"));
}

#[test]
fn test_error_from_model_config_file() {
    // Unknown toggle value
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, r#"{{"weekly_seasonality": "sometimes"}}"#).unwrap();
    assert!(matches!(
        ProphetConfig::from_json_file(file.path()),
        Err(ForecastError::JsonError(_))
    ));

    // Parses but out of range
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, r#"{{"changepoint_range": 2.0}}"#).unwrap();
    assert!(matches!(
        ProphetConfig::from_json_file(file.path()),
        Err(ForecastError::InvalidParameter(_))
    ));

    // Missing file
    assert!(matches!(
        ProphetConfig::from_json_file("/nonexistent/model.json"),
        Err(ForecastError::ConfigError(_))
    ));
}

#[test]
fn test_result_mapping() {
    let result: Result<(), &str> = Err("bad cell");
    let mapped = result.map_err(|e| ForecastError::DataError(e.to_string()));

    if let Err(ForecastError::DataError(msg)) = mapped {
        assert_eq!(msg, "bad cell");
    } else {
        panic!("Wrong error variant");
    }
}
