use super::ui;
use crate::auth;
use crate::core::User;
use crate::marketplace::MarketplaceStorage;
use anyhow::Result;

pub fn display_profile(user: Option<&User>, listing_count: usize) -> String {
    match user {
        Some(user) => format!(
            "{}\n{}\nListings: {}",
            ui::style_text(&user.name, ui::StyleType::Title),
            user.email,
            listing_count
        ),
        None => ui::style_text(
            "Browsing as guest. Log in or sign up to manage your listings.",
            ui::StyleType::Subtle,
        ),
    }
}

pub async fn run(storage: &MarketplaceStorage) -> Result<()> {
    let user = storage.get_user().await?;
    let listing_count = match &user {
        Some(user) => storage.listings_by_seller(&user.id).await?.len(),
        None => 0,
    };
    println!("{}", display_profile(user.as_ref(), listing_count));
    Ok(())
}

pub async fn run_login(storage: &MarketplaceStorage, email: &str, password: &str) -> Result<()> {
    let user = auth::login(storage, email, password).await?;
    println!("Logged in as {}", ui::style_text(&user.name, ui::StyleType::Title));
    Ok(())
}

pub async fn run_signup(
    storage: &MarketplaceStorage,
    name: &str,
    email: &str,
    password: &str,
) -> Result<()> {
    let user = auth::signup(storage, name, email, password).await?;
    println!(
        "Account created for {}",
        ui::style_text(&user.name, ui::StyleType::Title)
    );
    Ok(())
}

pub async fn run_logout(storage: &MarketplaceStorage) -> Result<()> {
    auth::logout(storage).await?;
    println!("Logged out");
    Ok(())
}
