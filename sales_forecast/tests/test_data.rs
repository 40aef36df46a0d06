use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use sales_forecast::config::ColumnMapping;
use sales_forecast::data::{DataLoader, InputRecord, DATE_KEY, VALUE_KEY};
use sales_forecast::ForecastError;
use std::io::Write;
use tempfile::NamedTempFile;

fn csv_file(lines: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    file
}

fn day(y: i32, m: u32, d: u32) -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

#[test]
fn test_data_loader_from_csv() {
    let file = csv_file(&[
        "date,sales",
        "2023-01-01,100",
        "2023-01-02,120",
        "2023-01-03,90",
    ]);

    let data = DataLoader::from_csv(file.path()).unwrap();

    assert_eq!(data.len(), 3);
    assert!(!data.is_empty());
    assert_eq!(data.column_names(), vec!["date".to_string(), "sales".to_string()]);
}

#[test]
fn test_rename_and_history() {
    let file = csv_file(&[
        "store,sales,date",
        "a,100.5,2023-01-01",
        "a,120,2023-01-02",
        "a,,2023-01-03",
    ]);

    let mut data = DataLoader::from_csv(file.path()).unwrap();
    data.rename_columns(&ColumnMapping::default()).unwrap();

    assert!(data.missing_columns().is_empty());
    let names = data.column_names();
    assert!(names.contains(&DATE_KEY.to_string()));
    assert!(names.contains(&VALUE_KEY.to_string()));

    let history = data.to_history().unwrap();
    assert_eq!(
        history,
        vec![
            InputRecord::new(day(2023, 1, 1), 100.5),
            InputRecord::new(day(2023, 1, 2), 120.0),
            InputRecord {
                ds: day(2023, 1, 3),
                y: None
            },
        ]
    );
}

#[test]
fn test_custom_column_names() {
    let file = csv_file(&["day,revenue", "2023-01-01,1", "2023-01-02,2"]);
    let mut data = DataLoader::from_csv(file.path()).unwrap();

    data.rename_columns(&ColumnMapping::default()).unwrap();
    assert_eq!(data.missing_columns(), vec!["ds".to_string(), "y".to_string()]);

    data.rename_columns(&ColumnMapping {
        date: "day".to_string(),
        value: "revenue".to_string(),
    })
    .unwrap();
    assert!(data.missing_columns().is_empty());
    assert_eq!(data.to_history().unwrap().len(), 2);
}

#[test]
fn test_only_one_column_present() {
    let file = csv_file(&["date,units", "2023-01-01,1"]);
    let mut data = DataLoader::from_csv(file.path()).unwrap();

    data.rename_columns(&ColumnMapping::default()).unwrap();
    assert_eq!(data.missing_columns(), vec!["y".to_string()]);
    assert!(data.to_history().is_err());
}

#[test]
fn test_unparseable_dates_are_rejected() {
    let file = csv_file(&["date,sales", "2023-01-01,1", "not a date,2"]);
    let mut data = DataLoader::from_csv(file.path()).unwrap();
    data.rename_columns(&ColumnMapping::default()).unwrap();

    let err = data.to_history().unwrap_err();
    assert!(matches!(err, ForecastError::DataError(_)));
    assert!(err.to_string().contains("not a date"));
}

#[test]
fn test_non_numeric_values_are_rejected() {
    let file = csv_file(&["date,sales", "2023-01-01,high", "2023-01-02,low"]);
    let mut data = DataLoader::from_csv(file.path()).unwrap();
    data.rename_columns(&ColumnMapping::default()).unwrap();

    assert!(matches!(
        data.to_history(),
        Err(ForecastError::DataError(_))
    ));
}

#[test]
fn test_previews_mention_columns() {
    let file = csv_file(&["date,sales", "2023-01-01,100", "2023-01-02,120"]);
    let data = DataLoader::from_csv(file.path()).unwrap();

    let head = data.head_preview(1);
    assert!(head.contains("sales"));

    let info = data.info();
    assert!(info.contains("2 rows, 2 columns"));
    assert!(info.contains("date"));
    assert!(info.contains("non-null: 2"));
}

#[test]
fn test_ragged_rows_are_rejected() {
    let file = csv_file(&["date,sales", "2023-01-01,1,999", "2023-01-02,2"]);
    assert!(matches!(
        DataLoader::from_csv(file.path()),
        Err(ForecastError::CsvError(_))
    ));

    let file = csv_file(&["date,sales", "2023-01-01", "2023-01-02,2"]);
    assert!(DataLoader::from_csv(file.path()).is_err());
}

#[test]
fn test_quoted_fields() {
    let file = csv_file(&["date,sales", "\"2023-01-01\",\"1,5\"", "2023-01-02,\"2\""]);
    let data = DataLoader::from_csv(file.path()).unwrap();
    assert_eq!(data.len(), 2);

    let file = csv_file(&["date,sales", "\"2023-01-01,1", "2023-01-02,2"]);
    assert!(matches!(
        DataLoader::from_csv(file.path()),
        Err(ForecastError::CsvError(_))
    ));
}

#[test]
fn test_rename_conflicts() {
    let file = csv_file(&["date,sales,ds", "2023-01-01,1,x"]);
    let mut data = DataLoader::from_csv(file.path()).unwrap();
    let mapping = ColumnMapping::default();

    assert_eq!(data.rename_conflicts(&mapping), vec!["ds".to_string()]);
    assert!(matches!(
        data.rename_columns(&mapping),
        Err(ForecastError::DataError(_))
    ));

    let file = csv_file(&["ds,y", "2023-01-01,1"]);
    let data = DataLoader::from_csv(file.path()).unwrap();
    assert!(data.rename_conflicts(&mapping).is_empty());
}

#[test]
fn test_data_loader_error_handling() {
    // Non-existent file
    let result = DataLoader::from_csv("nonexistent_file.csv");
    assert!(matches!(result, Err(ForecastError::IoError(_))));

    // A directory is not a readable table
    let dir = tempfile::tempdir().unwrap();
    assert!(DataLoader::from_csv(dir.path()).is_err());
}
