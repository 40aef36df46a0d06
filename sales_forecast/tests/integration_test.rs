use chrono::{Duration, NaiveDate, NaiveDateTime};
use clap::Parser;
use pretty_assertions::assert_eq;
use sales_forecast::config::{RunConfig, DEFAULT_INPUT};
use sales_forecast::error::Result;
use sales_forecast::utils::{future_dates, Frequency};
use sales_forecast::{
    Cli, ColumnMapping, FittedModel, ForecastError, ForecastFrame, ForecastModel, ForecastRecord,
    ForecastRunner, InputRecord, RunOutcome,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Repeats the last observed value
#[derive(Debug)]
struct LastValue;

#[derive(Debug)]
struct FittedLastValue {
    dates: Vec<NaiveDateTime>,
    last: f64,
}

impl ForecastModel for LastValue {
    type Fitted = FittedLastValue;

    fn fit(&self, history: &[InputRecord]) -> Result<FittedLastValue> {
        let last = history
            .iter()
            .rev()
            .find_map(|r| r.y)
            .ok_or_else(|| ForecastError::ForecastingError("no values".to_string()))?;

        Ok(FittedLastValue {
            dates: history.iter().map(|r| r.ds).collect(),
            last,
        })
    }

    fn name(&self) -> &str {
        "last value"
    }
}

impl FittedModel for FittedLastValue {
    fn make_future_dates(&self, periods: usize) -> Result<Vec<NaiveDateTime>> {
        let mut dates = self.dates.clone();
        dates.extend(future_dates(*self.dates.last().unwrap(), periods, Frequency::daily())?);
        Ok(dates)
    }

    fn predict(&self, dates: &[NaiveDateTime]) -> Result<ForecastFrame> {
        ForecastFrame::new(
            dates
                .iter()
                .map(|&ds| ForecastRecord {
                    ds,
                    yhat: self.last,
                    yhat_lower: self.last - 1.0,
                    yhat_upper: self.last + 1.0,
                })
                .collect(),
        )
    }

    fn name(&self) -> &str {
        "last value"
    }
}

fn workspace(csv: Option<&str>) -> (TempDir, RunConfig) {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("data")).unwrap();
    if let Some(contents) = csv {
        fs::write(dir.path().join(DEFAULT_INPUT), contents).unwrap();
    }

    let config = RunConfig::in_dir(dir.path());
    (dir, config)
}

fn read_rows(path: &Path) -> Vec<Vec<String>> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|line| line.split(',').map(str::to_string).collect())
        .collect()
}

#[test]
fn test_three_day_history_gives_thirty_three_rows() {
    let (_dir, config) = workspace(Some(
        "date,sales\n2023-01-01,100\n2023-01-02,110\n2023-01-03,105\n",
    ));
    let output = config.output_path.clone();

    let outcome = ForecastRunner::new(config).unwrap().run().unwrap();
    assert_eq!(
        outcome,
        RunOutcome::Completed {
            rows: 33,
            output: output.clone()
        }
    );
    assert_eq!(
        outcome.to_string(),
        format!("Forecast successfully saved to {}", output.display())
    );

    let rows = read_rows(&output);
    assert_eq!(&rows[0][..4], &["ds", "yhat", "yhat_lower", "yhat_upper"]);
    assert!(rows[0].contains(&"trend".to_string()));

    let data = &rows[1..];
    let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
    let expected_dates: Vec<String> = (0..33)
        .map(|d| (start + Duration::days(d)).format("%Y-%m-%d").to_string())
        .collect();
    let dates: Vec<String> = data.iter().map(|row| row[0].clone()).collect();
    assert_eq!(dates, expected_dates);
    assert_eq!(&dates[..3], &["2023-01-01", "2023-01-02", "2023-01-03"]);
    assert_eq!(dates[3], "2023-01-04");
    assert_eq!(dates[32], "2023-02-02");

    for row in data {
        let yhat: f64 = row[1].parse().unwrap();
        let lower: f64 = row[2].parse().unwrap();
        let upper: f64 = row[3].parse().unwrap();
        assert!(yhat.is_finite() && lower.is_finite() && upper.is_finite());
        assert!(lower <= upper);
    }

    assert!(!output.with_file_name("sales_forecast.csv.partial").exists());
}

#[test]
fn test_missing_input_writes_nothing() {
    let (_dir, config) = workspace(None);
    let input = config.input_path.clone();
    let output = config.output_path.clone();

    let outcome = ForecastRunner::new(config).unwrap().run().unwrap();

    assert_eq!(outcome, RunOutcome::MissingInput { path: input.clone() });
    assert_eq!(outcome.to_string(), format!("Error: {} not found.", input.display()));
    assert!(!outcome.is_completed());
    assert!(!output.exists());
}

#[test]
fn test_unreadable_input() {
    let (_dir, config) = workspace(Some(""));
    let output = config.output_path.clone();

    let outcome = ForecastRunner::new(config).unwrap().run().unwrap();

    assert!(matches!(outcome, RunOutcome::LoadFailed { .. }));
    assert!(outcome.to_string().starts_with("Error loading data: "));
    assert!(!output.exists());
}

#[test]
fn test_row_with_extra_field_fails_to_load() {
    let (_dir, config) = workspace(Some(
        "date,sales\n2023-01-01,1,999\n2023-01-02,2\n2023-01-03,3\n",
    ));
    let output = config.output_path.clone();

    let outcome = ForecastRunner::new(config).unwrap().run().unwrap();

    assert!(matches!(outcome, RunOutcome::LoadFailed { .. }));
    assert!(!output.exists());
}

#[test]
fn test_unclosed_quote_fails_to_load() {
    let (_dir, config) = workspace(Some(
        "date,sales\n\"2023-01-01,1\n2023-01-02,2\n2023-01-03,3\n",
    ));
    let output = config.output_path.clone();

    let outcome = ForecastRunner::new(config).unwrap().run().unwrap();

    assert!(matches!(outcome, RunOutcome::LoadFailed { .. }));
    assert!(!output.exists());
}

#[test]
fn test_schema_mismatch() {
    let (_dir, config) = workspace(Some("day,amount\n2023-01-01,1\n2023-01-02,2\n"));
    let output = config.output_path.clone();

    let outcome = ForecastRunner::new(config).unwrap().run().unwrap();

    assert_eq!(
        outcome,
        RunOutcome::SchemaMismatch {
            missing: vec!["ds".to_string(), "y".to_string()],
            duplicated: vec![],
        }
    );
    assert_eq!(
        outcome.to_string(),
        "Error: Required columns 'ds' and 'y' are not present in the data."
    );
    assert!(!output.exists());
}

#[test]
fn test_existing_model_key_column_is_a_schema_mismatch() {
    let (_dir, config) = workspace(Some(
        "date,sales,y\n2023-01-01,1,5\n2023-01-02,2,6\n2023-01-03,3,7\n",
    ));
    let output = config.output_path.clone();

    let outcome = ForecastRunner::new(config).unwrap().run().unwrap();

    assert_eq!(
        outcome,
        RunOutcome::SchemaMismatch {
            missing: vec![],
            duplicated: vec!["y".to_string()],
        }
    );
    assert!(outcome.to_string().contains("'y'"));
    assert!(!output.exists());
}

#[test]
fn test_input_already_using_model_keys() {
    let (_dir, config) = workspace(Some("ds,y\n2023-01-01,1\n2023-01-02,2\n"));

    let outcome = ForecastRunner::with_model(config, LastValue)
        .unwrap()
        .run()
        .unwrap();

    assert!(outcome.is_completed());
}

#[test]
fn test_model_failure_is_an_error() {
    let (_dir, config) = workspace(Some("date,sales\n2023-01-01,100\n"));
    let output = config.output_path.clone();

    let result = ForecastRunner::new(config).unwrap().run();

    assert!(matches!(result, Err(ForecastError::ForecastingError(_))));
    assert!(!output.exists());
}

#[test]
fn test_custom_model_and_columns() {
    let (_dir, mut config) = workspace(Some(
        "day,revenue\n2023-03-01,7\n2023-03-02,9\n",
    ));
    config.columns = ColumnMapping {
        date: "day".to_string(),
        value: "revenue".to_string(),
    };
    config.horizon = 3;
    config.preview_rows = 0;
    let output = config.output_path.clone();

    let runner = ForecastRunner::with_model(config, LastValue).unwrap();
    assert_eq!(runner.config().horizon, 3);
    assert_eq!(
        runner.run().unwrap(),
        RunOutcome::Completed {
            rows: 5,
            output: output.clone()
        }
    );

    let rows = read_rows(&output);
    assert_eq!(rows[0], vec!["ds", "yhat", "yhat_lower", "yhat_upper"]);
    assert_eq!(rows[5][0], "2023-03-05");
    assert_eq!(rows[5][1].parse::<f64>().unwrap(), 9.0);
}

#[test]
fn test_unwritable_output_is_an_error() {
    let (dir, mut config) = workspace(Some("date,sales\n2023-01-01,1\n2023-01-02,2\n"));
    config.output_path = dir.path().join("missing_dir").join("out.csv");

    let result = ForecastRunner::with_model(config, LastValue).unwrap().run();

    assert!(matches!(result, Err(ForecastError::IoError(_))));
    assert!(!dir.path().join("missing_dir").exists());
}

#[test]
fn test_invalid_run_config_is_rejected() {
    let (_dir, mut config) = workspace(None);
    config.horizon = 0;
    assert!(matches!(
        ForecastRunner::new(config),
        Err(ForecastError::InvalidParameter(_))
    ));

    let (_dir, mut config) = workspace(None);
    config.output_path = config.input_path.clone();
    assert!(ForecastRunner::with_model(config, LastValue).is_err());
}

#[test]
fn test_cli_defaults() {
    let cli = Cli::try_parse_from(["sales_forecast"]).unwrap();
    let config = cli.into_config().unwrap();

    assert_eq!(config.horizon, 30);
    assert_eq!(config.preview_rows, 5);
    assert_eq!(config.columns, ColumnMapping::default());
    assert!(config.input_path.ends_with("data/cleaned_sales.csv"));
    assert!(config.output_path.ends_with("data/sales_forecast.csv"));
}

#[test]
fn test_cli_overrides() {
    let cli = Cli::try_parse_from([
        "sales_forecast",
        "--input",
        "in.csv",
        "--output",
        "out.csv",
        "--periods",
        "7",
        "--date-column",
        "day",
        "--value-column",
        "revenue",
        "--preview-rows",
        "0",
    ])
    .unwrap();
    let config = cli.into_config().unwrap();

    assert_eq!(config.input_path, Path::new("in.csv"));
    assert_eq!(config.output_path, Path::new("out.csv"));
    assert_eq!(config.horizon, 7);
    assert_eq!(config.columns.date, "day");
    assert_eq!(config.columns.value, "revenue");
    assert_eq!(config.preview_rows, 0);

    let cli = Cli::try_parse_from(["sales_forecast", "--periods", "0"]).unwrap();
    assert!(cli.into_config().is_err());
}

#[test]
fn test_cli_model_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.json");
    fs::write(
        &path,
        r#"{"n_changepoints": 5, "weekly_seasonality": "off", "yearly_seasonality": {"fourier": 4}, "seed": 7}"#,
    )
    .unwrap();

    let cli = Cli::try_parse_from(["sales_forecast", "--model-config", path.to_str().unwrap()]).unwrap();
    let model = cli.into_config().unwrap().model;

    assert_eq!(model.n_changepoints, 5);
    assert_eq!(model.seed, 7);
    assert_eq!(
        model.yearly_seasonality,
        sales_forecast::config::SeasonalityToggle::Fourier(4)
    );
    assert_eq!(
        model.weekly_seasonality,
        sales_forecast::config::SeasonalityToggle::Off
    );
    assert_eq!(model.interval_width, 0.8);
}
