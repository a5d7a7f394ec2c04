use crate::common::fixture_path;
use chrono::NaiveDate;
use holdings_rs::loader::{self, DataSources};
use std::fs;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn loads_fixture_tables() {
    let sources = DataSources::new(
        fixture_path("positions.csv"),
        fixture_path("ticker_facts.csv"),
    );
    let data = loader::load(&sources).unwrap();

    assert_eq!(data.positions.len(), 6);
    assert_eq!(data.facts.len(), 4);
    assert_eq!(data.tickers(), vec!["ABC", "BRK.B", "XYZ", "ZZZ"]);

    let first = &data.positions[0];
    assert_eq!(first.ticker, "ABC");
    assert_eq!(first.owner, "Vanguard Group Inc");
    assert_eq!(first.date, date(2024, 3, 31));
    assert_eq!(first.shares_held, 5_000_000.0);
    assert_eq!(first.shares_change, Some(5_000_000.0));

    // "2.5M" is expanded.
    assert_eq!(data.positions[2].shares_held, 2_500_000.0);
    assert_eq!(data.positions[1].shares_change, Some(-1_000_000.0));

    let abc = data.facts_for("ABC").unwrap();
    assert_eq!(abc.total_shares_outstanding, Some(100.0));
    assert_eq!(abc.total_holdings_value, Some(1000.0));
    assert_eq!(abc.institutional_ownership, Some(0.65));
    assert_eq!(abc.sector.as_deref(), Some("Technology"));

    let xyz = data.facts_for("XYZ").unwrap();
    assert_eq!(xyz.institutional_ownership, Some(0.4));
    assert_eq!(xyz.sector, None);
    assert_eq!(xyz.industry, None);
}

#[test]
fn missing_change_column_is_rebuilt_from_history() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("positions.csv");
    fs::write(
        &path,
        "Ticker,Owner Name,Date,Shares Held\n\
         ABC,X,2024-06-30,4000000\n\
         ABC,X,2024-03-31,5000000\n\
         ABC,Y,2024-06-30,100\n",
    )
    .unwrap();

    let rows = loader::load_positions(&path).unwrap();
    assert_eq!(rows[0].shares_change, Some(-1_000_000.0));
    assert_eq!(rows[1].shares_change, Some(5_000_000.0));
    assert_eq!(rows[2].shares_change, Some(100.0));
}

#[test]
fn extra_columns_bom_and_placeholders_are_tolerated() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("facts.csv");
    fs::write(
        &path,
        "\u{feff}Ticker,Total Shares Outstanding,Total Holdings Value,Institutional Ownership %,Notes\n\
         AAA,N/A,-,,whatever\n",
    )
    .unwrap();

    let facts = loader::load_facts(&path).unwrap();
    assert_eq!(facts.len(), 1);
    assert_eq!(facts[0].ticker, "AAA");
    assert_eq!(facts[0].total_shares_outstanding, None);
    assert_eq!(facts[0].total_holdings_value, None);
    assert_eq!(facts[0].institutional_ownership, None);
}

#[test]
fn sources_come_from_the_environment() {
    // Only this test touches these variables.
    unsafe {
        std::env::set_var("HOLDINGS_POSITIONS", "/data/p.csv");
        std::env::remove_var("HOLDINGS_FACTS");
    }
    let s = DataSources::from_env();
    assert_eq!(s.positions, std::path::PathBuf::from("/data/p.csv"));
    assert_eq!(s.facts, std::path::PathBuf::from(loader::DEFAULT_FACTS_PATH));
}

#[cfg(not(feature = "parquet"))]
#[test]
fn default_file_names_load_without_extra_features() {
    let dir = tempfile::tempdir().unwrap();
    let positions = dir.path().join(loader::DEFAULT_POSITIONS_PATH);
    let facts = dir.path().join(loader::DEFAULT_FACTS_PATH);
    std::fs::copy(fixture_path("positions.csv"), &positions).unwrap();
    std::fs::copy(fixture_path("ticker_facts.csv"), &facts).unwrap();

    let data = loader::load(&DataSources::new(positions, facts)).unwrap();
    assert_eq!(data.positions.len(), 6);
    assert_eq!(data.facts.len(), 4);
}
