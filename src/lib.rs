pub mod auth;
pub mod cli;
pub mod core;
pub mod marketplace;
pub mod price_cache;
pub mod providers;
pub mod store;

use crate::core::config::AppConfig;
use crate::core::{KeyValueStore, NewListing};
use crate::marketplace::MarketplaceStorage;
use crate::price_cache::PriceCache;
use crate::providers::CoinGeckoSource;
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

pub enum AppCommand {
    Prices,
    Convert { usd: f64 },
    Listings {
        seller: Option<String>,
        search: Option<String>,
    },
    Show { id: String },
    Create(NewListing),
    Delete { id: String },
    Login { email: String, password: String },
    Signup { name: String, email: String, password: String },
    Logout,
    Profile,
}

/// The application wired to its config, store and price cache.
pub struct App {
    config: AppConfig,
    storage: MarketplaceStorage,
    price_cache: Arc<PriceCache<CoinGeckoSource>>,
}

impl App {
    pub fn new(config: AppConfig, store: Arc<dyn KeyValueStore>) -> Result<Self> {
        let source = CoinGeckoSource::from_config(&config.coingecko(), config.price_cache.timeout())?;
        let price_cache = Arc::new(PriceCache::from_config(source, &config.price_cache));
        Ok(Self {
            config,
            storage: MarketplaceStorage::new(store),
            price_cache,
        })
    }

    pub fn storage(&self) -> &MarketplaceStorage {
        &self.storage
    }

    pub fn price_cache(&self) -> Arc<PriceCache<CoinGeckoSource>> {
        Arc::clone(&self.price_cache)
    }

    pub async fn run(&self, command: AppCommand) -> Result<()> {
        let assets = self.config.coingecko();
        let cache = self.price_cache.as_ref();
        let storage = &self.storage;

        match command {
            AppCommand::Prices => cli::prices::run(cache, &assets).await,
            AppCommand::Convert { usd } => cli::prices::run_convert(cache, &assets, usd).await,
            AppCommand::Listings { seller, search } => {
                cli::listings::run(storage, cache, &assets, seller.as_deref(), search.as_deref())
                    .await
            }
            AppCommand::Show { id } => cli::listings::run_show(storage, cache, &assets, &id).await,
            AppCommand::Create(new_listing) => cli::listings::run_create(storage, new_listing).await,
            AppCommand::Delete { id } => cli::listings::run_delete(storage, &id).await,
            AppCommand::Login { email, password } => {
                cli::profile::run_login(storage, &email, &password).await
            }
            AppCommand::Signup {
                name,
                email,
                password,
            } => cli::profile::run_signup(storage, &name, &email, &password).await,
            AppCommand::Logout => cli::profile::run_logout(storage).await,
            AppCommand::Profile => cli::profile::run(storage).await,
        }
    }
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("chainbazaar starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let store = store::open_store(&config)?;
    App::new(config, store)?.run(command).await
}
