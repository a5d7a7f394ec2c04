//! Invariants of `process` over generated inputs:
//! 1. A zero previous holding is always the NewPosition sentinel, never a number
//! 2. No infinite or NaN value reaches the numeric table
//! 3. Percentage owned follows shares held over shares outstanding when TSO > 0
//! 4. Missing or zero market cap gives exactly zero impact
//! 5. The run is idempotent, and the display table mirrors the numeric one

use chrono::NaiveDate;
use holdings_rs::pipeline::display::format_count;
use holdings_rs::{MarketQuote, MarketRef, PositionRecord, Ratio, TickerFacts, process};
use proptest::prelude::*;

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
}

// ── Strategies ───────────────────────────────────────────────────────

fn arb_shares() -> impl Strategy<Value = f64> {
    prop_oneof![Just(0.0), (1.0..5.0e8_f64).prop_map(f64::round)]
}

/// A (held, change) pair; about a third of them are first reports.
fn arb_position() -> impl Strategy<Value = (f64, f64)> {
    (arb_shares(), 0u8..3, -1.0e8..1.0e8_f64).prop_map(|(held, kind, delta)| match kind {
        0 => (held, held),
        1 => (held, 0.0),
        _ => (held, delta.round()),
    })
}

fn arb_tso() -> impl Strategy<Value = Option<f64>> {
    prop_oneof![Just(None), Just(Some(0.0)), (0.1..20_000.0_f64).prop_map(Some)]
}

fn arb_cap() -> impl Strategy<Value = Option<f64>> {
    prop_oneof![Just(None), Just(Some(0.0)), (1.0e6..3.0e12_f64).prop_map(Some)]
}

fn arb_price() -> impl Strategy<Value = Option<f64>> {
    prop_oneof![Just(None), (0.01..5_000.0_f64).prop_map(Some)]
}

fn inputs(
    rows: &[(f64, f64)],
    tso: Option<f64>,
    cap: Option<f64>,
    price: Option<f64>,
) -> (Vec<PositionRecord>, Vec<TickerFacts>, MarketRef) {
    let positions = rows
        .iter()
        .enumerate()
        .map(|(i, (held, change))| {
            PositionRecord::new("ABC", format!("Owner {i}"), date(), *held, Some(*change))
        })
        .collect();
    let facts = vec![TickerFacts {
        total_shares_outstanding: tso,
        total_holdings_value: Some(1_000.0),
        institutional_ownership: Some(0.5),
        ..TickerFacts::new("ABC")
    }];
    let market: MarketRef = [(
        "ABC".to_string(),
        MarketQuote {
            price,
            market_cap: cap,
            ..MarketQuote::default()
        },
    )]
    .into_iter()
    .collect();
    (positions, facts, market)
}

fn finite(r: Ratio) -> bool {
    r.value().is_none_or(f64::is_finite)
}

proptest! {
    #[test]
    fn new_positions_and_no_infinity(
        rows in prop::collection::vec(arb_position(), 1..20),
        tso in arb_tso(),
        cap in arb_cap(),
        price in arb_price(),
    ) {
        let (positions, facts, market) = inputs(&rows, tso, cap, price);
        let out = process(&positions, &facts, &market).unwrap();

        for r in out.numeric() {
            if r.previous_shares == 0.0 {
                prop_assert_eq!(r.shares_change_pct, Ratio::NewPosition);
            } else {
                prop_assert!(!r.shares_change_pct.is_new_position());
            }
            prop_assert!(finite(r.shares_change_pct));
            prop_assert!(finite(r.percentage_owned));
            prop_assert!(r.individual_holdings_value.is_finite());
            prop_assert!(r.change_in_value.is_finite());
            prop_assert!(r.change_pct_of_market_cap.is_finite());
            prop_assert!(r.price_per_share.is_finite());
        }
    }

    #[test]
    fn percentage_owned_and_market_cap_guards(
        rows in prop::collection::vec(arb_position(), 1..10),
        tso in arb_tso(),
        cap in arb_cap(),
        price in arb_price(),
    ) {
        let (positions, facts, market) = inputs(&rows, tso, cap, price);
        let out = process(&positions, &facts, &market).unwrap();

        for r in out.numeric() {
            match tso {
                Some(t) if t > 0.0 => {
                    let expected = r.shares_held / (t * 1e6) * 100.0;
                    let got = r.percentage_owned.value().unwrap();
                    prop_assert!((got - expected).abs() <= 1e-9 * expected.abs().max(1.0));
                }
                _ => prop_assert_eq!(r.percentage_owned, Ratio::Undefined),
            }
            if !cap.is_some_and(|c| c > 0.0) {
                prop_assert_eq!(r.change_pct_of_market_cap, 0.0);
            }
        }
    }

    #[test]
    fn idempotent_and_display_mirrors_numeric(
        rows in prop::collection::vec(arb_position(), 1..10),
        tso in arb_tso(),
        cap in arb_cap(),
        price in arb_price(),
    ) {
        let (positions, facts, market) = inputs(&rows, tso, cap, price);
        let first = process(&positions, &facts, &market).unwrap();
        let second = process(&positions, &facts, &market).unwrap();
        prop_assert_eq!(&first, &second);

        prop_assert_eq!(first.numeric().len(), first.display().len());
        for (n, d) in first.numeric().iter().zip(first.display().iter()) {
            prop_assert_eq!(&n.ticker, &d.ticker);
            prop_assert_eq!(&n.owner, &d.owner);
            prop_assert_eq!(n.date.format("%Y-%m-%d").to_string(), d.date.clone());
            prop_assert_eq!(format_count(n.shares_held), d.shares_held.clone());
        }
    }
}
