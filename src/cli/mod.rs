pub mod listings;
pub mod prices;
pub mod profile;
pub mod setup;
pub mod ui;
