use super::ui;
use crate::core::config::CoinGeckoProviderConfig;
use crate::core::{PriceQuote, QuoteSource};
use crate::price_cache::{PriceCache, convert};
use anyhow::Result;
use comfy_table::Cell;

/// Renders the current reference asset prices, e.g. `BTC | $67,000`.
pub fn render_quote(quote: &PriceQuote, assets: &CoinGeckoProviderConfig) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Asset"), ui::header_cell("Price (USD)")]);

    for (symbol, price) in [
        (&assets.primary.symbol, quote.primary_usd),
        (&assets.secondary.symbol, quote.secondary_usd),
    ] {
        table.add_row(vec![
            Cell::new(symbol),
            ui::amount_cell(ui::style_text(
                &ui::format_usd_whole(price),
                ui::StyleType::Price,
            )),
        ]);
    }

    table.to_string()
}

/// Renders a USD amount in units of both reference assets.
pub fn render_conversion(
    usd_amount: f64,
    quote: &PriceQuote,
    assets: &CoinGeckoProviderConfig,
) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Asset"),
        ui::header_cell(&format!("Amount for ${usd_amount:.2}")),
    ]);

    for (symbol, price) in [
        (&assets.primary.symbol, quote.primary_usd),
        (&assets.secondary.symbol, quote.secondary_usd),
    ] {
        table.add_row(vec![
            Cell::new(symbol),
            ui::amount_cell(convert(usd_amount, price)),
        ]);
    }

    table.to_string()
}

pub async fn run<S: QuoteSource + 'static>(
    cache: &PriceCache<S>,
    assets: &CoinGeckoProviderConfig,
) -> Result<()> {
    let pb = ui::new_spinner("Fetching prices...");
    let quote = cache.get_quote().await;
    pb.finish_and_clear();

    println!("{}", render_quote(&quote, assets));
    Ok(())
}

pub async fn run_convert<S: QuoteSource + 'static>(
    cache: &PriceCache<S>,
    assets: &CoinGeckoProviderConfig,
    usd_amount: f64,
) -> Result<()> {
    if !usd_amount.is_finite() || usd_amount < 0.0 {
        anyhow::bail!("Amount must be a non-negative number, got {usd_amount}");
    }

    let pb = ui::new_spinner("Fetching prices...");
    let quote = cache.get_quote().await;
    pb.finish_and_clear();

    println!("{}", render_conversion(usd_amount, &quote, assets));
    Ok(())
}
