//! Integration tests for CSV loading

use std::io::Write;
use tally_data::{AnomalyPolicy, CsvOptions, DataError, IssueKind, Table};

const SURVEY: &str = "\
timestamp,job_title,annual_salary,currency
2021-04-27,Research Scientist,\"95,000\",USD
2021-04-27,  Teacher ,55000,CAD
2021-04-27,Nurse,NA,GBP
2021-04-28,,\"$120,500\",usd
";

#[test]
fn test_load_survey_from_reader() {
    let table = Table::from_reader(SURVEY.as_bytes(), &CsvOptions::default()).unwrap();

    assert_eq!(table.len(), 4);
    assert_eq!(
        table.columns(),
        ["timestamp", "job_title", "annual_salary", "currency"]
    );

    let teacher = table.row(1).unwrap();
    assert_eq!(teacher.get("job_title"), Some("Teacher"));
    assert_eq!(teacher.number("annual_salary"), Ok(55000.0));

    assert_eq!(table.row(2).unwrap().get("annual_salary"), None);
    assert_eq!(table.row(3).unwrap().get("job_title"), None);
    assert_eq!(table.row(3).unwrap().number("annual_salary"), Ok(120_500.0));
}

#[test]
fn test_screening_salary_and_title() {
    let table = Table::from_reader(SURVEY.as_bytes(), &CsvOptions::default()).unwrap();

    let (with_salary, salary_issues) = table
        .screen_numeric("annual_salary", true, AnomalyPolicy::Drop)
        .unwrap();
    assert_eq!(with_salary.len(), 3);
    assert_eq!(salary_issues.len(), 1);
    assert_eq!(salary_issues.issues()[0].line, 3);
    assert_eq!(salary_issues.issues()[0].kind, IssueKind::Missing);

    let (flagged, title_issues) = with_salary
        .screen_present("job_title", AnomalyPolicy::Flag)
        .unwrap();
    assert_eq!(flagged.len(), 3);
    assert_eq!(title_issues.issues()[0].line, 4);
}

#[test]
fn test_custom_delimiter_and_markers() {
    let data = "name;n\nMary;7065\nAnna;-\n";
    let options = CsvOptions {
        delimiter: b';',
        missing_markers: vec![String::new(), "-".to_string()],
    };

    let table = Table::from_reader(data.as_bytes(), &options).unwrap();
    assert_eq!(table.row(0).unwrap().count("n"), Ok(7065));
    assert_eq!(table.row(1).unwrap().count("n"), Err(IssueKind::Missing));
}

#[test]
fn test_ragged_csv_is_an_error() {
    let data = "a,b\n1,2\n3\n";
    let err = Table::from_reader(data.as_bytes(), &CsvOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        DataError::RaggedRow {
            line: 2,
            expected: 2,
            actual: 1
        }
    ));
}

#[test]
fn test_from_path() {
    let path = std::env::temp_dir().join("tally_data_from_path_test.csv");
    {
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(SURVEY.as_bytes()).unwrap();
    }

    let table = Table::from_path(&path).unwrap();
    assert_eq!(table.len(), 4);

    std::fs::remove_file(path).ok();
}

#[test]
fn test_missing_file() {
    let err = Table::from_path("/definitely/not/here.csv").unwrap_err();
    assert!(matches!(err, DataError::Io(_)));
}
