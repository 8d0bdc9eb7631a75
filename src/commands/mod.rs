use anyhow::{Context, Result, bail};
use log::{debug, info, warn};
use std::future::Future;
use std::path::Path;
use std::time::Duration;

use crate::{
    explain::{Explainer, PLAIN_TEXT, detect_language, validate_code},
    market::{MarketData, Timeframe, filter_by_query},
    portfolio::{
        ALERTS_KEY, Holding, PORTFOLIO_KEY, PriceAlert, Store, check_alerts, distribution,
        portfolio_value, prices_by_id,
    },
    runtime::Runtime,
};

pub mod config;
mod render;
pub mod services;

/// Explain a snippet read from `file`, or from stdin when no file is given.
///
/// Without an explicit language, a detected one is passed along unless
/// detection falls back to plain text.
#[tracing::instrument(skip(runtime, explainer))]
pub async fn explain<R: Runtime>(
    runtime: &R,
    explainer: &Explainer,
    file: Option<&Path>,
    language: Option<&str>,
) -> Result<String> {
    let code = match file {
        Some(path) => runtime.read_to_string(path)?,
        None => runtime.read_stdin().context("Failed to read code from stdin")?,
    };
    let code = validate_code(&code)?;

    let language = match language.map(str::trim).filter(|l| !l.is_empty()) {
        Some(language) => Some(language),
        None => {
            let detected = detect_language(code);
            debug!("Detected language: {}", detected);
            (detected != PLAIN_TEXT).then_some(detected)
        }
    };

    let explanation = explainer.explain(code, language).await?;
    Ok(explanation)
}

/// Market list, optionally narrowed by a name/symbol filter.
#[tracing::instrument(skip(market))]
pub async fn markets<M: MarketData>(
    market: &M,
    limit: u32,
    page: u32,
    filter: Option<&str>,
) -> Result<String> {
    let list = market.list(limit, page).await?;
    let shown = filter_by_query(&list, filter.unwrap_or_default());
    debug!("Showing {} of {} assets", shown.len(), list.len());
    Ok(render::market_table(&shown))
}

#[tracing::instrument(skip(market))]
pub async fn coin<M: MarketData>(market: &M, id: &str) -> Result<String> {
    match market.details(id).await? {
        Some(crypto) => Ok(render::coin_details(&crypto)),
        None => bail!("Unknown cryptocurrency: {}", id),
    }
}

#[tracing::instrument(skip(market))]
pub async fn chart<M: MarketData>(market: &M, id: &str, timeframe: Timeframe) -> Result<String> {
    let points = market.chart(id, timeframe).await?;
    Ok(render::chart(id, &points))
}

#[tracing::instrument(skip(market))]
pub async fn search<M: MarketData>(market: &M, query: &str) -> Result<String> {
    let coins = market.search(query).await?;
    Ok(render::search_results(&coins))
}

/// Valuation of the saved holdings at current prices.
#[tracing::instrument(skip(runtime, market))]
pub async fn portfolio<R: Runtime, M: MarketData>(
    runtime: &R,
    market: &M,
    data_dir: &Path,
) -> Result<String> {
    let store = Store::new(runtime, data_dir.to_path_buf());
    let holdings: Vec<Holding> = store.load(PORTFOLIO_KEY);
    if holdings.is_empty() {
        return Ok("No holdings.\n".to_string());
    }

    let ids = unique_ids(holdings.iter().map(|h| h.crypto_id.as_str()));
    let cryptos = market.by_ids(&ids).await?;
    let prices = prices_by_id(&cryptos);

    let value = portfolio_value(&holdings, &prices);
    let distribution = distribution(&holdings, &prices);
    Ok(render::portfolio(&holdings, &prices, &value, &distribution))
}

/// Lists saved alerts. With `check`, evaluates the active ones against
/// current prices and saves the collection when any fired.
#[tracing::instrument(skip(runtime, market))]
pub async fn alerts<R: Runtime, M: MarketData>(
    runtime: &R,
    market: &M,
    data_dir: &Path,
    check: bool,
    now: &str,
) -> Result<String> {
    let store = Store::new(runtime, data_dir.to_path_buf());
    let mut alerts: Vec<PriceAlert> = store.load(ALERTS_KEY);
    if alerts.is_empty() {
        return Ok("No price alerts.\n".to_string());
    }

    let mut fired = Vec::new();
    if check {
        let ids = unique_ids(
            alerts
                .iter()
                .filter(|a| a.is_active)
                .map(|a| a.crypto_id.as_str()),
        );
        if !ids.is_empty() {
            let cryptos = market.by_ids(&ids).await?;
            fired = check_alerts(&mut alerts, &cryptos, now);
        }

        if fired.is_empty() {
            debug!("No alerts fired");
        } else {
            info!("{} alert(s) fired", fired.len());
            store.save(ALERTS_KEY, &alerts)?;
        }
    }

    Ok(render::alerts(&alerts, &fired))
}

/// Runs `refresh` at once and then every `every`, passing each output to `out`.
///
/// A failed refresh is logged and the next tick tries again. Runs until the
/// process is stopped unless `ticks` limits the number of refreshes.
pub async fn watch<F, Fut, O>(every: Duration, ticks: Option<usize>, mut refresh: F, mut out: O)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<String>>,
    O: FnMut(String),
{
    let mut interval = tokio::time::interval(every.max(Duration::from_millis(1)));
    let mut done = 0;
    while ticks.is_none_or(|max| done < max) {
        interval.tick().await;
        match refresh().await {
            Ok(output) => out(output),
            Err(e) => warn!("Refresh failed: {:#}", e),
        }
        done += 1;
    }
}

/// [`markets`] on a timer.
pub async fn watch_markets<M: MarketData, O: FnMut(String)>(
    market: &M,
    limit: u32,
    page: u32,
    filter: Option<&str>,
    every: Duration,
    ticks: Option<usize>,
    out: O,
) {
    watch(every, ticks, move || markets(market, limit, page, filter), out).await
}

/// `alerts --check` on a timer. `now` stamps the alerts that fire on each tick.
pub async fn watch_alerts<R, M, N, O>(
    runtime: &R,
    market: &M,
    data_dir: &Path,
    every: Duration,
    ticks: Option<usize>,
    now: N,
    out: O,
) where
    R: Runtime,
    M: MarketData,
    N: Fn() -> String,
    O: FnMut(String),
{
    let refresh = move || {
        let stamp = now();
        async move { alerts(runtime, market, data_dir, true, &stamp).await }
    };
    watch(every, ticks, refresh, out).await
}

fn unique_ids<'a>(ids: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut unique: Vec<String> = Vec::new();
    for id in ids {
        if !unique.iter().any(|u| u == id) {
            unique.push(id.to_string());
        }
    }
    unique
}
