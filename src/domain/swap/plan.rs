//! Transaction step planning. Turns a finalized derived swap state into the
//! ordered sequence of on-chain calls and signatures an external executor
//! consumes one at a time. The planner only sequences; it never executes.

use {
    crate::domain::{
        currency::CurrencyAmount,
        eth,
        swap::{DerivedSwapInfo, WrapType},
        trade,
    },
    alloy::primitives::{address, Address, U256},
};

/// The canonical Permit2 contract, deployed at the same address on all
/// supported chains.
pub const PERMIT2: eth::ContractAddress =
    eth::ContractAddress(address!("0x000000000022D473030F116dDEE9F6B43aC78BA3"));

// ERC20 and WETH9 function selectors.
const SELECTOR_APPROVE: [u8; 4] = [0x09, 0x5e, 0xa7, 0xb3];
const SELECTOR_DEPOSIT: [u8; 4] = [0xd0, 0xe3, 0x0d, 0xb0];
const SELECTOR_WITHDRAW: [u8; 4] = [0x2e, 0x1a, 0x7d, 0x4d];

/// The input token's current approval situation towards Permit2, as observed
/// on-chain by the caller.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ApprovalStatus {
    /// The existing allowance covers the input amount, or none is needed
    /// (native input, wraps).
    NotRequired,
    /// An approval for at least the input amount is required.
    Required,
    /// The token forbids raising a non-zero allowance; it must be revoked
    /// before re-approving.
    RevokeRequired,
}

/// A typed-data payload for a Permit2 signature, to be signed off-chain by an
/// external signer.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PermitPayload {
    pub spender: eth::ContractAddress,
    pub token: eth::TokenAddress,
    pub amount: U256,
    pub nonce: U256,
    pub deadline: U256,
}

/// A single step of a swap flow, consumed strictly in order by an external
/// execution engine.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TransactionStep {
    /// Deposit into or withdraw from the chain's wrapped-native contract.
    Wrap(eth::Call),
    /// Reset a non-zero allowance to zero before re-approving.
    Revocation(eth::Call),
    /// Approve Permit2 for the input token.
    Approval(eth::Call),
    /// Off-chain Permit2 typed-data signature.
    Permit2Signature(PermitPayload),
    /// Submit the prepared router call.
    SwapTransaction(eth::Call),
    /// Submit a swap whose calldata is not final yet; the executor refreshes
    /// the quote right before submission. The amounts are the worst
    /// acceptable execution bounds after applying the slippage tolerance.
    SwapTransactionAsync {
        max_input: CurrencyAmount,
        min_output: CurrencyAmount,
    },
}

/// Plans the ordered transaction steps for a derived swap state. A wrap step
/// always precedes everything else; any revocation precedes its approval, and
/// both precede the swap.
pub fn plan(
    info: &DerivedSwapInfo,
    approval: ApprovalStatus,
    permit: Option<PermitPayload>,
) -> Vec<TransactionStep> {
    let mut steps = Vec::new();

    if info.wrap.is_wrap() {
        if let Some(call) = wrap_call(info) {
            steps.push(TransactionStep::Wrap(call));
        }
        // Wraps bypass routing; there is nothing else to execute.
        return steps;
    }

    let Some(trade) = info.trade.trade() else {
        return steps;
    };

    if let Some(token) = trade.input.currency.address {
        match approval {
            ApprovalStatus::NotRequired => {}
            ApprovalStatus::Required => {
                steps.push(TransactionStep::Approval(approve_call(token, U256::MAX)));
            }
            ApprovalStatus::RevokeRequired => {
                steps.push(TransactionStep::Revocation(approve_call(token, U256::ZERO)));
                steps.push(TransactionStep::Approval(approve_call(token, U256::MAX)));
            }
        }
    }

    if let Some(permit) = permit {
        steps.push(TransactionStep::Permit2Signature(permit));
    }

    match &trade.swap_call {
        Some(call) => steps.push(TransactionStep::SwapTransaction(call.clone())),
        None => {
            // The tolerance only widens the derived side; the exact side is
            // the user's amount and stays fixed.
            let slippage = info.slippage();
            let (max_input, min_output) = match trade.trade_type {
                trade::TradeType::ExactInput => (
                    trade.input.clone(),
                    CurrencyAmount::new(
                        trade.output.currency.clone(),
                        slippage.sub(trade.output.amount),
                    ),
                ),
                trade::TradeType::ExactOutput => (
                    CurrencyAmount::new(
                        trade.input.currency.clone(),
                        slippage.add(trade.input.amount),
                    ),
                    trade.output.clone(),
                ),
            };
            steps.push(TransactionStep::SwapTransactionAsync {
                max_input,
                min_output,
            });
        }
    }

    steps
}

fn wrap_call(info: &DerivedSwapInfo) -> Option<eth::Call> {
    let amount = info.currency_amounts.input.as_ref()?;
    let wrapped = eth::ContractAddress(info.chain.wrapped_native().0);
    Some(match info.wrap {
        WrapType::Wrap => eth::Call {
            to: wrapped,
            value: eth::Ether(amount.amount),
            calldata: SELECTOR_DEPOSIT.to_vec(),
        },
        WrapType::Unwrap => eth::Call {
            to: wrapped,
            value: eth::Ether::default(),
            calldata: encode_call(SELECTOR_WITHDRAW, &[word_uint(amount.amount)]),
        },
        WrapType::None => return None,
    })
}

fn approve_call(token: eth::TokenAddress, amount: U256) -> eth::Call {
    eth::Call {
        to: eth::ContractAddress(token.0),
        value: eth::Ether::default(),
        calldata: encode_call(
            SELECTOR_APPROVE,
            &[word_address(PERMIT2.0), word_uint(amount)],
        ),
    }
}

fn encode_call(selector: [u8; 4], words: &[[u8; 32]]) -> Vec<u8> {
    let mut calldata = selector.to_vec();
    for word in words {
        calldata.extend_from_slice(word);
    }
    calldata
}

fn word_uint(value: U256) -> [u8; 32] {
    value.to_be_bytes::<32>()
}

fn word_address(value: Address) -> [u8; 32] {
    let mut word = [0_u8; 32];
    word[12..].copy_from_slice(value.as_slice());
    word
}
