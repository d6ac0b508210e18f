pub mod recipe;
pub mod suggestion;
pub mod user;
