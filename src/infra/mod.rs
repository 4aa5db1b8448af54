pub mod balance;
pub mod config;
pub mod router;
pub mod tokens;
