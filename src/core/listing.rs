//! Marketplace records

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;

pub const GUEST_SELLER_ID: &str = "guest";
pub const GUEST_SELLER_NAME: &str = "Guest User";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Price in USD
    pub price: f64,
    pub category: String,
    pub image_urls: Vec<String>,
    pub seller_id: String,
    pub seller_name: String,
    /// RFC 3339 timestamp
    pub created_at: String,
}

impl Listing {
    /// Parsed creation time. Records with an unparsable timestamp sort as oldest.
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.created_at)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Case-insensitive substring match on title or category. An empty query
    /// matches every listing.
    pub fn matches_query(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.title.to_lowercase().contains(&query) || self.category.to_lowercase().contains(&query)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Category {
    #[default]
    Electronics,
    Clothing,
    Home,
    Sports,
    Books,
    Other,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Electronics,
        Category::Clothing,
        Category::Home,
        Category::Sports,
        Category::Books,
        Category::Other,
    ];
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Category::Electronics => "Electronics",
                Category::Clothing => "Clothing",
                Category::Home => "Home",
                Category::Sports => "Sports",
                Category::Books => "Books",
                Category::Other => "Other",
            }
        )
    }
}

impl FromStr for Category {
    type Err = ListingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ListingError::UnknownCategory(s.to_string()))
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ListingError {
    #[error("Please enter a title")]
    MissingTitle,

    #[error("Please enter a description")]
    MissingDescription,

    #[error("Please enter a valid price")]
    InvalidPrice,

    #[error("Please add at least one image")]
    MissingImages,

    #[error("Unknown category: {0}")]
    UnknownCategory(String),
}

/// Listing fields as entered by a seller, before validation.
#[derive(Debug, Clone)]
pub struct NewListing {
    pub title: String,
    pub description: String,
    pub price: f64,
    pub category: Category,
    pub image_urls: Vec<String>,
}

impl NewListing {
    /// Validates the input and stamps it with an id, timestamp and seller.
    pub fn into_listing(
        self,
        seller: Option<&User>,
        now: DateTime<Utc>,
    ) -> Result<Listing, ListingError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ListingError::MissingTitle);
        }
        let description = self.description.trim();
        if description.is_empty() {
            return Err(ListingError::MissingDescription);
        }
        if !self.price.is_finite() || self.price <= 0.0 {
            return Err(ListingError::InvalidPrice);
        }
        let image_urls: Vec<String> = self
            .image_urls
            .into_iter()
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .collect();
        if image_urls.is_empty() {
            return Err(ListingError::MissingImages);
        }

        let (seller_id, seller_name) = match seller {
            Some(user) => (user.id.clone(), user.name.clone()),
            None => (GUEST_SELLER_ID.to_string(), GUEST_SELLER_NAME.to_string()),
        };

        Ok(Listing {
            id: now.timestamp_millis().to_string(),
            title: title.to_string(),
            description: description.to_string(),
            price: self.price,
            category: self.category.to_string(),
            image_urls,
            seller_id,
            seller_name,
            created_at: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn new_listing() -> NewListing {
        NewListing {
            title: "  Vintage camera ".to_string(),
            description: "Works great".to_string(),
            price: 120.5,
            category: Category::Electronics,
            image_urls: vec!["file:///tmp/a.jpg".to_string()],
        }
    }

    #[test]
    fn test_into_listing_stamps_seller_and_time() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let user = User {
            id: "42".to_string(),
            name: "alice".to_string(),
            email: "alice@example.com".to_string(),
            avatar: None,
        };

        let listing = new_listing().into_listing(Some(&user), now).unwrap();
        assert_eq!(listing.id, now.timestamp_millis().to_string());
        assert_eq!(listing.title, "Vintage camera");
        assert_eq!(listing.seller_id, "42");
        assert_eq!(listing.seller_name, "alice");
        assert_eq!(listing.category, "Electronics");
        assert_eq!(listing.created_at, "2024-03-01T12:00:00.000Z");
        assert_eq!(listing.created_at_utc(), Some(now));
    }

    #[test]
    fn test_into_listing_defaults_to_guest() {
        let listing = new_listing().into_listing(None, Utc::now()).unwrap();
        assert_eq!(listing.seller_id, GUEST_SELLER_ID);
        assert_eq!(listing.seller_name, GUEST_SELLER_NAME);
    }

    #[test]
    fn test_into_listing_validation() {
        let mut input = new_listing();
        input.title = "   ".to_string();
        assert_eq!(
            input.into_listing(None, Utc::now()).unwrap_err(),
            ListingError::MissingTitle
        );

        let mut input = new_listing();
        input.description = String::new();
        assert_eq!(
            input.into_listing(None, Utc::now()).unwrap_err(),
            ListingError::MissingDescription
        );

        for price in [0.0, -5.0, f64::NAN] {
            let mut input = new_listing();
            input.price = price;
            assert_eq!(
                input.into_listing(None, Utc::now()).unwrap_err(),
                ListingError::InvalidPrice
            );
        }

        let mut input = new_listing();
        input.image_urls = vec![" ".to_string()];
        assert_eq!(
            input.into_listing(None, Utc::now()).unwrap_err(),
            ListingError::MissingImages
        );
    }

    #[test]
    fn test_category_from_str() {
        assert_eq!("books".parse::<Category>().unwrap(), Category::Books);
        assert_eq!(" Home ".parse::<Category>().unwrap(), Category::Home);
        assert_eq!(
            "Cars".parse::<Category>().unwrap_err(),
            ListingError::UnknownCategory("Cars".to_string())
        );
    }

    #[test]
    fn test_matches_query() {
        let listing = new_listing().into_listing(None, Utc::now()).unwrap();

        assert!(listing.matches_query("camera"));
        assert!(listing.matches_query("electro"));
        assert!(listing.matches_query("ViNtAgE CAM"));
        assert!(listing.matches_query("ELECTRONICS"));
        assert!(listing.matches_query(""));
        assert!(!listing.matches_query("bicycle"));
        assert!(!listing.matches_query("works great"));
    }

    #[test]
    fn test_listing_json_shape() {
        let json = r#"{
            "id": "1700000000000",
            "title": "Bike",
            "description": "Road bike",
            "price": 300.0,
            "category": "Sports",
            "imageUrls": ["https://picsum.photos/300"],
            "sellerId": "guest",
            "sellerName": "Guest User",
            "createdAt": "2023-11-14T22:13:20.000Z"
        }"#;
        let listing: Listing = serde_json::from_str(json).unwrap();
        assert_eq!(listing.image_urls.len(), 1);
        assert_eq!(listing.seller_name, "Guest User");
        assert!(listing.created_at_utc().is_some());

        let value = serde_json::to_value(&listing).unwrap();
        assert!(value.get("imageUrls").is_some());
        assert!(value.get("createdAt").is_some());
    }
}
