pub mod breathing;
pub mod chat;
pub mod feeling;
pub mod goal;
pub mod journal;
