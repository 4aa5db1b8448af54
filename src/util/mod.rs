pub mod conv;
pub mod fmt;
pub mod serialize;
pub mod url;
