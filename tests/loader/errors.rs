use holdings_rs::HoldingsError;
use holdings_rs::loader;
use std::fs;
use std::path::Path;

fn write(dir: &Path, name: &str, body: &str) -> std::path::PathBuf {
    let p = dir.join(name);
    fs::write(&p, body).unwrap();
    p
}

#[test]
fn missing_file_is_data_unavailable() {
    let err = loader::load_positions(Path::new("/definitely/not/here.csv")).unwrap_err();
    assert!(matches!(err, HoldingsError::DataUnavailable { .. }), "{err}");
    assert!(err.is_fatal());
}

#[test]
fn unsupported_extension_is_data_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let p = write(dir.path(), "positions.xlsx", "whatever");
    let err = loader::load_positions(&p).unwrap_err();
    assert!(matches!(err, HoldingsError::DataUnavailable { .. }));
}

#[test]
fn header_only_table_is_data_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let p = write(
        dir.path(),
        "facts.csv",
        "Ticker,Total Shares Outstanding,Total Holdings Value,Institutional Ownership %\n",
    );
    let err = loader::load_facts(&p).unwrap_err();
    match err {
        HoldingsError::DataUnavailable { reason, .. } => assert!(reason.contains("no rows")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn missing_required_column_is_a_schema_error() {
    let dir = tempfile::tempdir().unwrap();
    let p = write(
        dir.path(),
        "positions.csv",
        "Ticker,Owner Name,Shares Held\nABC,X,10\n",
    );
    match loader::load_positions(&p).unwrap_err() {
        HoldingsError::Schema { row, column, .. } => {
            assert_eq!(row, 0);
            assert_eq!(column, "Date");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn misnamed_facts_columns_are_a_schema_error() {
    let dir = tempfile::tempdir().unwrap();
    let p = write(
        dir.path(),
        "facts.csv",
        "Ticker,Shares Outstanding,Holdings Value,Ownership\nABC,100,1000,0.5\n",
    );
    match loader::load_facts(&p).unwrap_err() {
        HoldingsError::Schema { row, column, .. } => {
            assert_eq!(row, 0);
            assert_eq!(column, "Total Shares Outstanding");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn facts_sector_and_industry_stay_optional() {
    let dir = tempfile::tempdir().unwrap();
    let p = write(
        dir.path(),
        "facts.csv",
        "Ticker,Total Shares Outstanding,Total Holdings Value,Institutional Ownership %\n\
         ABC,100,1000,0.5\n",
    );
    let facts = loader::load_facts(&p).unwrap();
    assert_eq!(facts.len(), 1);
    assert_eq!(facts[0].sector, None);
}

#[test]
fn unparseable_cell_names_row_and_column() {
    let dir = tempfile::tempdir().unwrap();
    let p = write(
        dir.path(),
        "positions.csv",
        "Ticker,Owner Name,Date,Shares Held,Shares Change\n\
         ABC,X,2024-06-30,10,1\n\
         ABC,Y,2024-06-30,lots,1\n",
    );
    match loader::load_positions(&p).unwrap_err() {
        HoldingsError::Schema { row, column, .. } => {
            assert_eq!(row, 2);
            assert_eq!(column, "Shares Held");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn bad_date_and_negative_holding_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let bad_date = write(
        dir.path(),
        "a.csv",
        "Ticker,Owner Name,Date,Shares Held\nABC,X,last quarter,10\n",
    );
    assert!(matches!(
        loader::load_positions(&bad_date).unwrap_err(),
        HoldingsError::Schema { ref column, .. } if column == "Date"
    ));

    let negative = write(
        dir.path(),
        "b.csv",
        "Ticker,Owner Name,Date,Shares Held\nABC,X,2024-06-30,-5\n",
    );
    assert!(matches!(
        loader::load_positions(&negative).unwrap_err(),
        HoldingsError::Schema { .. }
    ));
}
