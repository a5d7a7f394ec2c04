use holdings_rs::views::{
    Filter, GroupBy, Metric, Order, concentration, flows, rank, sectors,
};
use holdings_rs::{DataSources, MarketClient, build_snapshot};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // 1. A client with a daily cache and a tighter per-lookup budget.
    let client = MarketClient::builder()
        .daily_cache(true)
        .lookup_timeout(Duration::from_secs(5))
        .build()?;

    // 2. Load the tables named by HOLDINGS_POSITIONS / HOLDINGS_FACTS and run the pipeline.
    let snapshot = build_snapshot(&DataSources::from_env(), &client).await?;
    for w in snapshot.warnings() {
        println!("warning: {w}");
    }

    let Some(latest) = snapshot.latest_date() else {
        return Ok(());
    };
    let rows = Filter::new().on(latest).apply(snapshot.output().numeric());
    println!("--- {} positions reported on {latest} ---", rows.len());

    // 3. Largest positions by value.
    for r in rank::top_n(rows.iter().copied(), Metric::HoldingsValue, Order::Descending, 10) {
        println!("  {:<8} {:<40} ${:.2}M", r.ticker, r.owner, r.individual_holdings_value);
    }
    println!();

    // 4. Where institutions bought and sold.
    println!("--- Buying pressure ---");
    let buying = flows::top(
        flows::buying_pressure(rows.iter().copied()),
        flows::FlowMeasure::Value,
        Order::Descending,
        5,
    );
    for f in buying {
        println!("  {:<8} {} holders, ${:.2}M", f.ticker, f.holders, f.change_in_value);
    }
    println!();

    // 5. Sector totals and the most concentrated holder in each sector.
    println!("--- Sectors ---");
    for s in sectors::group_stats(rows.iter().copied(), GroupBy::Sector) {
        println!("  {:<30} ${:.2}M across {} tickers", s.group, s.total_value, s.tickers);
    }
    let leaders =
        sectors::market_concentration(rows.iter().copied(), GroupBy::Sector, 1, sectors::End::Top);
    for c in leaders {
        println!("  {:<30} led by {} ({:.1}%)", c.group, c.owner, c.pct_of_group);
    }
    println!();

    // 6. Portfolio concentration of the largest holder.
    let largest = rank::top_n(rows.iter().copied(), Metric::HoldingsValue, Order::Descending, 1);
    if let Some(top) = largest.first()
        && let Some(m) = concentration::holder_metrics(rows.iter().copied(), &top.owner)
    {
        println!(
            "--- {}: {} positions, top-5 {:.1}%, HHI {:.0} ---",
            m.owner, m.positions, m.top5_pct, m.hhi
        );
    }

    Ok(())
}
