pub mod auth;
pub mod menu;
pub mod orders;
pub mod payments;
pub mod profile;
pub mod services;
