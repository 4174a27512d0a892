pub mod breathing;
pub mod chat;
pub mod dashboard;
pub mod feelings;
pub mod goals;
pub mod health;
pub mod journal;
pub mod knowledge;
