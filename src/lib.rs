//! Derivation engine for token swaps. Combines a user-editable swap form,
//! token reference data, account balances and quotes from an external routing
//! service into a single derived state snapshot, evaluates trade warnings
//! over it and plans the ordered transaction steps for execution.
//!
//! The engine never touches a chain itself: balances, approvals and
//! submission are the responsibility of the surrounding application.

pub mod domain;
pub mod infra;
pub mod util;

#[cfg(test)]
mod tests;
