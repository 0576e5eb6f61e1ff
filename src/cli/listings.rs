use super::ui;
use crate::core::config::CoinGeckoProviderConfig;
use crate::core::{Listing, NewListing, PriceQuote, QuoteSource};
use crate::marketplace::MarketplaceStorage;
use crate::price_cache::{PriceCache, convert, convert_with_precision};
use anyhow::Result;
use comfy_table::Cell;

// Cards show fewer digits than the detail view
const CARD_DIGITS: usize = 6;

impl Listing {
    /// Renders listings as a single table with USD and crypto-equivalent prices.
    pub fn display_cards(
        listings: &[Listing],
        quote: &PriceQuote,
        assets: &CoinGeckoProviderConfig,
    ) -> String {
        if listings.is_empty() {
            return ui::style_text("No listings yet", ui::StyleType::Subtle);
        }

        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("ID"),
            ui::header_cell("Title"),
            ui::header_cell("Category"),
            ui::header_cell("Price"),
            ui::header_cell(&format!("{} | {}", assets.primary.symbol, assets.secondary.symbol)),
            ui::header_cell("Images"),
            ui::header_cell("Seller"),
        ]);

        for listing in listings {
            let crypto = format!(
                "{} | {}",
                convert_with_precision(listing.price, quote.primary_usd, CARD_DIGITS),
                convert_with_precision(listing.price, quote.secondary_usd, CARD_DIGITS)
            );
            table.add_row(vec![
                Cell::new(&listing.id),
                Cell::new(&listing.title),
                Cell::new(&listing.category),
                ui::amount_cell(format!("${:.2}", listing.price)),
                ui::amount_cell(crypto),
                ui::amount_cell(listing.image_urls.len().to_string()),
                Cell::new(&listing.seller_name),
            ]);
        }

        table.to_string()
    }

    pub fn display_detail(&self, quote: &PriceQuote, assets: &CoinGeckoProviderConfig) -> String {
        let mut output = format!(
            "{}\n{}\n\n{}\n\n",
            ui::style_text(&self.title, ui::StyleType::Title),
            ui::style_text(
                &format!("{} · sold by {}", self.category, self.seller_name),
                ui::StyleType::Subtle
            ),
            self.description
        );

        output.push_str(&format!(
            "Price: {}\n  {} {}\n  {} {}\n",
            ui::style_text(&format!("${:.2}", self.price), ui::StyleType::Price),
            convert(self.price, quote.primary_usd),
            assets.primary.symbol,
            convert(self.price, quote.secondary_usd),
            assets.secondary.symbol,
        ));

        output.push_str("\nImages:\n");
        for url in &self.image_urls {
            output.push_str(&format!("  {url}\n"));
        }
        output
    }
}

pub async fn run<S: QuoteSource + 'static>(
    storage: &MarketplaceStorage,
    cache: &PriceCache<S>,
    assets: &CoinGeckoProviderConfig,
    seller_id: Option<&str>,
    search: Option<&str>,
) -> Result<()> {
    let listings = match (seller_id, search) {
        (Some(id), search) => {
            let mut listings = storage.listings_by_seller(id).await?;
            if let Some(query) = search {
                listings.retain(|listing| listing.matches_query(query));
            }
            listings
        }
        (None, Some(query)) => storage.search_listings(query).await?,
        (None, None) => storage.get_listings().await?,
    };

    let pb = ui::new_spinner("Fetching prices...");
    let quote = cache.get_quote().await;
    pb.finish_and_clear();

    println!("{}", Listing::display_cards(&listings, &quote, assets));
    Ok(())
}

pub async fn run_show<S: QuoteSource + 'static>(
    storage: &MarketplaceStorage,
    cache: &PriceCache<S>,
    assets: &CoinGeckoProviderConfig,
    id: &str,
) -> Result<()> {
    let listing = storage
        .get_listing(id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("No listing with id {id}"))?;

    let quote = cache.get_quote().await;
    println!("{}", listing.display_detail(&quote, assets));
    Ok(())
}

pub async fn run_create(storage: &MarketplaceStorage, new_listing: NewListing) -> Result<()> {
    let listing = storage.create_listing(new_listing).await?;
    println!(
        "Your listing has been created: {} ({})",
        ui::style_text(&listing.title, ui::StyleType::Title),
        listing.id
    );
    Ok(())
}

pub async fn run_delete(storage: &MarketplaceStorage, id: &str) -> Result<()> {
    if !storage.delete_listing(id).await? {
        anyhow::bail!("No listing with id {id}");
    }
    println!("Deleted listing {id}");
    Ok(())
}
