pub mod currency;
pub mod eth;
pub mod swap;
pub mod trade;
