use chainbazaar::core::config::AppConfig;
use chainbazaar::core::{Category, NewListing, PriceQuote};
use chainbazaar::store::MemoryStore;
use chainbazaar::{App, AppCommand};
use std::fs;
use std::sync::Arc;

mod test_utils {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub async fn create_price_server(response: ResponseTemplate) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/simple/price"))
            .respond_with(response)
            .mount(&mock_server)
            .await;

        mock_server
    }

    pub fn prices_body(btc: f64, eth: f64) -> String {
        format!(r#"{{"bitcoin":{{"usd":{btc}}},"ethereum":{{"usd":{eth}}}}}"#)
    }
}

fn config_for(base_url: &str) -> AppConfig {
    let yaml = format!(
        r#"
        providers:
          coingecko:
            base_url: {base_url}
        price_cache:
          ttl_secs: 300
          timeout_secs: 1
        "#
    );
    serde_yaml::from_str(&yaml).expect("Failed to parse test config")
}

#[test_log::test(tokio::test)]
async fn test_quote_is_cached_across_commands() {
    let mock_server = test_utils::create_price_server(
        wiremock::ResponseTemplate::new(200)
            .set_body_string(test_utils::prices_body(50000.0, 3000.0)),
    )
    .await;

    let app = App::new(config_for(&mock_server.uri()), Arc::new(MemoryStore::new())).unwrap();

    app.run(AppCommand::Prices).await.unwrap();
    app.run(AppCommand::Convert { usd: 100.0 }).await.unwrap();
    app.run(AppCommand::Listings {
        seller: None,
        search: None,
    })
    .await
    .unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        app.price_cache().get_quote().await,
        PriceQuote::new(50000.0, 3000.0)
    );
}

#[test_log::test(tokio::test)]
async fn test_rate_limited_feed_falls_back_to_defaults() {
    let mock_server =
        test_utils::create_price_server(wiremock::ResponseTemplate::new(429)).await;

    let app = App::new(config_for(&mock_server.uri()), Arc::new(MemoryStore::new())).unwrap();

    app.run(AppCommand::Prices).await.unwrap();
    assert_eq!(
        app.price_cache().get_quote().await,
        PriceQuote::new(67000.0, 1950.0)
    );
    // Both calls reached the feed since failures don't refresh the TTL
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 2);
}

#[test_log::test(tokio::test)]
async fn test_unreachable_feed_never_fails_commands() {
    let mock_server = test_utils::create_price_server(
        wiremock::ResponseTemplate::new(200)
            .set_body_string(test_utils::prices_body(1.0, 1.0))
            .set_delay(std::time::Duration::from_secs(3)),
    )
    .await;

    let app = App::new(config_for(&mock_server.uri()), Arc::new(MemoryStore::new())).unwrap();

    let result = app.run(AppCommand::Convert { usd: 25.0 }).await;
    assert!(result.is_ok(), "Convert failed with: {:?}", result.err());
}

#[test_log::test(tokio::test)]
async fn test_listing_lifecycle() {
    let mock_server = test_utils::create_price_server(
        wiremock::ResponseTemplate::new(200)
            .set_body_string(test_utils::prices_body(50000.0, 3000.0)),
    )
    .await;
    let app = App::new(config_for(&mock_server.uri()), Arc::new(MemoryStore::new())).unwrap();

    app.run(AppCommand::Signup {
        name: "Ada".to_string(),
        email: "ada@example.com".to_string(),
        password: "secret1".to_string(),
    })
    .await
    .unwrap();

    app.run(AppCommand::Create(NewListing {
        title: "Mechanical keyboard".to_string(),
        description: "Brown switches".to_string(),
        price: 89.99,
        category: Category::Electronics,
        image_urls: vec!["file:///keyboard.jpg".to_string()],
    }))
    .await
    .unwrap();

    let user = app.storage().get_user().await.unwrap().unwrap();
    let listings = app.storage().listings_by_seller(&user.id).await.unwrap();
    assert_eq!(listings.len(), 1);
    assert_eq!(listings[0].seller_name, "Ada");

    assert_eq!(app.storage().search_listings("KEYBOARD").await.unwrap().len(), 1);
    assert!(app.storage().search_listings("sofa").await.unwrap().is_empty());
    app.run(AppCommand::Listings {
        seller: Some(user.id.clone()),
        search: Some("electronics".to_string()),
    })
    .await
    .unwrap();

    let id = listings[0].id.clone();
    app.run(AppCommand::Show { id: id.clone() }).await.unwrap();
    app.run(AppCommand::Profile).await.unwrap();
    app.run(AppCommand::Delete { id: id.clone() }).await.unwrap();
    assert!(app.storage().get_listings().await.unwrap().is_empty());

    // Deleting again reports the missing listing
    assert!(app.run(AppCommand::Delete { id }).await.is_err());

    app.run(AppCommand::Logout).await.unwrap();
    assert!(app.storage().get_user().await.unwrap().is_none());
}

#[test_log::test(tokio::test)]
async fn test_invalid_listing_is_rejected() {
    let app = App::new(config_for("http://127.0.0.1:9"), Arc::new(MemoryStore::new())).unwrap();

    let result = app
        .run(AppCommand::Create(NewListing {
            title: "Chair".to_string(),
            description: "Oak".to_string(),
            price: 0.0,
            category: Category::Home,
            image_urls: vec!["file:///chair.jpg".to_string()],
        }))
        .await;

    assert_eq!(
        result.unwrap_err().to_string(),
        "Please enter a valid price"
    );
}

#[test_log::test(tokio::test)]
async fn test_full_app_flow_with_config_file() {
    let mock_server = test_utils::create_price_server(
        wiremock::ResponseTemplate::new(200)
            .set_body_string(test_utils::prices_body(50000.0, 3000.0)),
    )
    .await;

    let data_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    let config_path = config_file.path();
    let config_content = format!(
        r#"
        providers:
          coingecko:
            base_url: {}
        data_path: {}
    "#,
        mock_server.uri(),
        data_dir.path().display()
    );

    fs::write(config_path, &config_content).expect("Failed to write config file");

    let result = chainbazaar::run_command(
        AppCommand::Listings {
            seller: None,
            search: Some("keyboard".to_string()),
        },
        Some(config_path.to_str().unwrap()),
    )
    .await;
    assert!(
        result.is_ok(),
        "Main function failed with: {:?}",
        result.err()
    );
    assert!(data_dir.path().join("store").exists());
}
