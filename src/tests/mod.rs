//! Integration tests against mocked external services.

mod mock;
mod quote;
