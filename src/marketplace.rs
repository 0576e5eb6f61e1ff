//! Listing and current-user records on top of a [`KeyValueStore`].

use crate::core::{KeyValueStore, Listing, NewListing, User};
use anyhow::{Context, Result};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};

pub const PRODUCTS_KEY: &str = "@chainbazaar_products";
pub const USER_KEY: &str = "@chainbazaar_user";

#[derive(Clone)]
pub struct MarketplaceStorage {
    store: Arc<dyn KeyValueStore>,
}

impl MarketplaceStorage {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub async fn save_listings(&self, listings: &[Listing]) -> Result<()> {
        let json = serde_json::to_string(listings).context("Failed to serialize listings")?;
        self.store.set(PRODUCTS_KEY, json).await
    }

    /// All stored listings, newest first. An empty store yields no listings.
    pub async fn get_listings(&self) -> Result<Vec<Listing>> {
        match self.store.get(PRODUCTS_KEY).await? {
            Some(json) => serde_json::from_str(&json)
                .with_context(|| format!("Failed to parse stored listings under {PRODUCTS_KEY}")),
            None => Ok(Vec::new()),
        }
    }

    pub async fn add_listing(&self, listing: Listing) -> Result<()> {
        let mut listings = self.get_listings().await?;
        debug!(id = %listing.id, "Adding listing");
        listings.insert(0, listing);
        self.save_listings(&listings).await
    }

    /// Validates and stores a new listing on behalf of the current user.
    pub async fn create_listing(&self, new_listing: NewListing) -> Result<Listing> {
        let seller = self.get_user().await?;
        let listing = new_listing.into_listing(seller.as_ref(), Utc::now())?;
        self.add_listing(listing.clone()).await?;
        info!(id = %listing.id, title = %listing.title, "Created listing");
        Ok(listing)
    }

    pub async fn get_listing(&self, id: &str) -> Result<Option<Listing>> {
        Ok(self
            .get_listings()
            .await?
            .into_iter()
            .find(|listing| listing.id == id))
    }

    /// Listings by one seller, most recently created first.
    pub async fn listings_by_seller(&self, seller_id: &str) -> Result<Vec<Listing>> {
        let mut listings: Vec<Listing> = self
            .get_listings()
            .await?
            .into_iter()
            .filter(|listing| listing.seller_id == seller_id)
            .collect();
        listings.sort_by(|a, b| b.created_at_utc().cmp(&a.created_at_utc()));
        Ok(listings)
    }

    /// Listings whose title or category contains `query`, ignoring case,
    /// in stored order.
    pub async fn search_listings(&self, query: &str) -> Result<Vec<Listing>> {
        Ok(self
            .get_listings()
            .await?
            .into_iter()
            .filter(|listing| listing.matches_query(query))
            .collect())
    }

    /// Removes a listing, returning whether it existed.
    pub async fn delete_listing(&self, id: &str) -> Result<bool> {
        let mut listings = self.get_listings().await?;
        let before = listings.len();
        listings.retain(|listing| listing.id != id);
        if listings.len() == before {
            debug!(%id, "No listing to delete");
            return Ok(false);
        }
        self.save_listings(&listings).await?;
        info!(%id, "Deleted listing");
        Ok(true)
    }

    pub async fn save_user(&self, user: &User) -> Result<()> {
        let json = serde_json::to_string(user).context("Failed to serialize user")?;
        self.store.set(USER_KEY, json).await
    }

    pub async fn get_user(&self) -> Result<Option<User>> {
        match self.store.get(USER_KEY).await? {
            Some(json) => serde_json::from_str(&json)
                .map(Some)
                .with_context(|| format!("Failed to parse stored user under {USER_KEY}")),
            None => Ok(None),
        }
    }

    pub async fn clear_user(&self) -> Result<()> {
        self.store.remove(USER_KEY).await
    }
}
