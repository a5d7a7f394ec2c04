use crate::common::fixture_path;
use chrono::NaiveDate;
use holdings_rs::loader::{self, DataSources, Dataset};
use holdings_rs::pipeline::display::{NEW_POSITION_LABEL, UNDEFINED_LABEL};
use holdings_rs::{
    HoldingsError, LookupStage, MarketQuote, MarketRef, PositionRecord, PriceSource, Ratio,
    TickerFacts, Warning, process,
};

fn dataset() -> Dataset {
    loader::load(&DataSources::new(
        fixture_path("positions.csv"),
        fixture_path("ticker_facts.csv"),
    ))
    .unwrap()
}

fn quote(price: f64, cap: f64) -> MarketQuote {
    MarketQuote {
        price: Some(price),
        market_cap: Some(cap),
        ..MarketQuote::default()
    }
}

/// ABC and BRK.B priced normally, XYZ with a zero market cap, ZZZ not found.
fn market() -> MarketRef {
    let mut m = MarketRef::new();
    m.insert("ABC", quote(200.0, 2.0e10));
    m.insert("BRK.B", quote(400.0, 8.6e11));
    m.insert("XYZ", quote(10.0, 0.0));
    m.push_failure("ZZZ", LookupStage::Quote, "symbol missing from response");
    m
}

fn date(m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, m, d).unwrap()
}

fn approx(a: f64, b: f64) {
    assert!((a - b).abs() < 1e-9, "{a} != {b}");
}

#[test]
fn first_report_is_a_new_position() {
    let data = dataset();
    let out = process(&data.positions, &data.facts, &market()).unwrap();

    let row = out
        .numeric()
        .find("ABC", "Vanguard Group Inc", date(3, 31))
        .unwrap();
    assert_eq!(row.previous_shares, 0.0);
    assert_eq!(row.shares_change_pct, Ratio::NewPosition);
    approx(row.percentage_owned.value().unwrap(), 5.0);
    approx(row.individual_holdings_value, 1000.0);
    approx(row.change_pct_of_market_cap, 5.0);

    let shown = out
        .display()
        .iter()
        .find(|r| r.ticker == "ABC" && r.date == "2024-03-31")
        .unwrap();
    assert_eq!(shown.shares_change_pct, NEW_POSITION_LABEL);
    assert_eq!(shown.percentage_owned, "5.00%");
    assert_eq!(shown.shares_held, "5,000,000");
    assert_eq!(shown.individual_holdings_value, "$1,000.00M");
    assert_eq!(shown.market_cap, "$20.00B");
}

#[test]
fn next_period_reports_the_decrease() {
    let data = dataset();
    let out = process(&data.positions, &data.facts, &market()).unwrap();

    let row = out
        .numeric()
        .find("ABC", "Vanguard Group Inc", date(6, 30))
        .unwrap();
    approx(row.previous_shares, 5_000_000.0);
    approx(row.shares_change_pct.value().unwrap(), -20.0);
    approx(row.change_in_value, -200.0);

    let shown = out
        .display()
        .iter()
        .find(|r| r.ticker == "ABC" && r.owner == "Vanguard Group Inc" && r.date == "2024-06-30")
        .unwrap();
    assert_eq!(shown.shares_change_pct, "-20.00%");
    assert_eq!(shown.change_in_value, "-$200.00M");
}

#[test]
fn zero_market_cap_gives_zero_impact() {
    let data = dataset();
    let out = process(&data.positions, &data.facts, &market()).unwrap();

    let row = out
        .numeric()
        .iter()
        .find(|r| r.ticker == "XYZ")
        .unwrap();
    assert_eq!(row.change_pct_of_market_cap, 0.0);
    assert_eq!(row.shares_change_pct, Ratio::Value(0.0));

    let missing_cap = out
        .warnings()
        .iter()
        .find(|w| matches!(w, Warning::MissingMarketCap { .. }))
        .unwrap();
    assert!(missing_cap.tickers().iter().any(|t| t == "XYZ"));
}

#[test]
fn failed_lookup_keeps_rows_and_warns() {
    let data = dataset();
    let out = process(&data.positions, &data.facts, &market()).unwrap();

    assert_eq!(out.numeric().len(), data.positions.len());
    assert_eq!(out.display().len(), data.positions.len());

    let row = out.numeric().iter().find(|r| r.ticker == "ZZZ").unwrap();
    assert_eq!(row.price_source, PriceSource::Estimated);
    // 16 / (20 × 0.5)
    approx(row.price_per_share, 1.6);
    assert_eq!(row.change_pct_of_market_cap, 0.0);

    let texts: Vec<String> = out.warnings().iter().map(ToString::to_string).collect();
    assert!(texts.contains(&"market data lookup failed for: ZZZ".to_string()), "{texts:?}");
    assert!(out.warnings().contains(&Warning::EstimatedPrice {
        tickers: vec!["ZZZ".into()]
    }));
}

#[test]
fn warnings_are_aggregated_one_per_kind() {
    let data = dataset();
    let out = process(&data.positions, &data.facts, &market()).unwrap();

    let caps: Vec<&Warning> = out
        .warnings()
        .iter()
        .filter(|w| matches!(w, Warning::MissingMarketCap { .. }))
        .collect();
    assert_eq!(caps.len(), 1);
    assert_eq!(caps[0].tickers(), ["XYZ".to_string(), "ZZZ".to_string()]);
}

#[test]
fn no_facts_and_no_quote_means_price_zero() {
    let positions = vec![PositionRecord::new("QQQ", "X", date(6, 30), 1_000.0, Some(1_000.0))];
    let mut market = MarketRef::new();
    market.push_failure("QQQ", LookupStage::Quote, "timeout");

    let out = process(&positions, &[], &market).unwrap();
    let row = &out.numeric().rows()[0];
    assert_eq!(row.price_source, PriceSource::Missing);
    assert_eq!(row.price_per_share, 0.0);
    assert_eq!(row.individual_holdings_value, 0.0);
    assert_eq!(row.percentage_owned, Ratio::Undefined);
    assert_eq!(out.display().rows()[0].percentage_owned, UNDEFINED_LABEL);

    let kinds: Vec<&str> = out
        .warnings()
        .iter()
        .map(|w| match w {
            Warning::LookupFailed { .. } => "lookup",
            Warning::ProfileLookupFailed { .. } => "profile",
            Warning::MissingFacts { .. } => "facts",
            Warning::EstimatedPrice { .. } => "estimated",
            Warning::MissingPrice { .. } => "price",
            Warning::MissingMarketCap { .. } => "cap",
            Warning::UndefinedMetric { .. } => "undefined",
        })
        .collect();
    for k in ["lookup", "facts", "price", "cap", "undefined"] {
        assert!(kinds.contains(&k), "missing {k} in {kinds:?}");
    }
}

#[test]
fn invalid_rows_fail_atomically() {
    let positions = vec![
        PositionRecord::new("ABC", "X", date(6, 30), 10.0, Some(1.0)),
        PositionRecord::new("ABC", "Y", date(6, 30), -10.0, Some(1.0)),
    ];
    let err = process(&positions, &[TickerFacts::new("ABC")], &MarketRef::new()).unwrap_err();
    assert!(matches!(err, HoldingsError::Pipeline { .. }));

    let positions = vec![PositionRecord::new("ABC", "X", date(6, 30), 10.0, Some(f64::INFINITY))];
    assert!(process(&positions, &[], &MarketRef::new()).is_err());
}

#[test]
fn dates_and_rows_on() {
    let data = dataset();
    let out = process(&data.positions, &data.facts, &market()).unwrap();
    assert_eq!(out.unique_dates(), vec![date(6, 30), date(3, 31)]);
    assert_eq!(out.rows_on(date(3, 31)).len(), 1);
    assert_eq!(out.rows_on(date(6, 30)).len(), 5);
}
