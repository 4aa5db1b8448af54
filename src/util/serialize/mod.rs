mod chain_id;
mod hex;
mod u256;

pub use self::{chain_id::ChainId, hex::Hex, u256::U256};
