//! Swap state derivation. Combines the user's form input, resolved
//! currencies, balances and the latest quote into a single consistent
//! [`DerivedSwapInfo`] snapshot. Snapshots are always rebuilt wholesale,
//! never patched, so a partially-updated state can never be observed.

pub mod plan;
pub mod session;
pub mod slippage;
pub mod warning;

pub use self::slippage::Slippage;

use crate::domain::{
    currency::{Currency, CurrencyAmount, CurrencyField, CurrencyId, Pair},
    eth,
    trade::{QuoteError, Trade},
};

/// The raw user-controlled swap form. Everything else is derived from it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SwapForm {
    pub chain: eth::ChainId,
    pub input: Option<CurrencyId>,
    pub output: Option<CurrencyId>,
    /// The amount the user is actively typing, in whole token units.
    pub exact_amount_token: String,
    /// The fiat-denominated mirror of the exact amount, display-only.
    pub exact_amount_fiat: Option<String>,
    /// The side of the form the exact amount applies to.
    pub exact_field: CurrencyField,
    pub custom_slippage: Option<Slippage>,
}

impl SwapForm {
    pub fn new(chain: eth::ChainId) -> Self {
        Self {
            chain,
            input: None,
            output: None,
            exact_amount_token: String::new(),
            exact_amount_fiat: None,
            exact_field: CurrencyField::Input,
            custom_slippage: None,
        }
    }
}

/// Whether the selected pair is a native wrap or unwrap. Wraps bypass routing
/// entirely; the two amounts mirror each other at a 1:1 ratio.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WrapType {
    None,
    Wrap,
    Unwrap,
}

impl WrapType {
    pub fn is_wrap(self) -> bool {
        self != Self::None
    }
}

/// Determines the wrap type for a currency pair.
pub fn wrap_type(input: &Currency, output: &Currency) -> WrapType {
    if input.chain != output.chain {
        return WrapType::None;
    }
    if input.is_native() && output.is_wrapped_native() {
        WrapType::Wrap
    } else if input.is_wrapped_native() && output.is_native() {
        WrapType::Unwrap
    } else {
        WrapType::None
    }
}

/// The state of the quote for the current derivation inputs.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TradeState {
    /// No quote applies: the form is incomplete, a wrap, or a self-trade.
    None,
    /// A quote for the current parameters has not arrived yet.
    Pending,
    Ready(Trade),
    Failed(QuoteError),
}

impl TradeState {
    pub fn trade(&self) -> Option<&Trade> {
        match self {
            Self::Ready(trade) => Some(trade),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&QuoteError> {
        match self {
            Self::Failed(error) => Some(error),
            _ => None,
        }
    }
}

/// The complete derived swap state. A pure function of its inputs: deriving
/// twice from identical inputs yields an identical snapshot.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DerivedSwapInfo {
    pub chain: eth::ChainId,
    pub currencies: Pair<Option<Currency>>,
    pub currency_amounts: Pair<Option<CurrencyAmount>>,
    pub currency_balances: Pair<Option<CurrencyAmount>>,
    pub exact_amount_token: String,
    pub exact_amount_fiat: Option<String>,
    pub exact_field: CurrencyField,
    pub wrap: WrapType,
    pub trade: TradeState,
    pub auto_slippage: Slippage,
    pub custom_slippage: Option<Slippage>,
}

impl DerivedSwapInfo {
    /// The slippage tolerance in effect. A custom tolerance wins
    /// unconditionally over the automatic one.
    pub fn slippage(&self) -> &Slippage {
        self.custom_slippage.as_ref().unwrap_or(&self.auto_slippage)
    }

    /// The user-specified amount, when the exact field parses to one.
    pub fn exact_amount(&self) -> Option<&CurrencyAmount> {
        self.currency_amounts.get(self.exact_field).as_ref()
    }
}

/// Derives the full swap state snapshot from the current form, the resolved
/// currencies, the known balances and the latest applicable quote.
///
/// The `trade` argument must already be scoped to the current derivation
/// inputs (see [`session::SwapSession`] for the staleness rules); this
/// function additionally forces it to [`TradeState::None`] whenever the form
/// does not call for a quote at all.
pub fn derive(
    form: &SwapForm,
    currencies: &Pair<Option<Currency>>,
    balances: &Pair<Option<CurrencyAmount>>,
    trade: TradeState,
    auto: &slippage::AutoSlippage,
) -> DerivedSwapInfo {
    let snapshot = |amounts: Pair<Option<CurrencyAmount>>, trade: TradeState| {
        let auto_slippage = match trade.trade() {
            Some(trade) => auto.for_trade(trade),
            None => auto.base(),
        };
        DerivedSwapInfo {
            chain: form.chain,
            currencies: currencies.clone(),
            currency_amounts: amounts,
            currency_balances: balances.clone(),
            exact_amount_token: form.exact_amount_token.clone(),
            exact_amount_fiat: form.exact_amount_fiat.clone(),
            exact_field: form.exact_field,
            wrap: WrapType::None,
            trade,
            auto_slippage,
            custom_slippage: form.custom_slippage.clone(),
        }
    };

    // Unresolved currencies block everything downstream: produce a minimal
    // snapshot with whatever did resolve and no trade.
    let (Some(input), Some(output)) = (&currencies.input, &currencies.output) else {
        let exact = currencies
            .get(form.exact_field)
            .as_ref()
            .and_then(|currency| parse_exact(form, currency));
        let mut amounts = Pair::default();
        *amounts.get_mut(form.exact_field) = exact;
        return snapshot(amounts, TradeState::None);
    };

    // A degenerate self-trade never quotes and derives nothing.
    if input.same_as(output) {
        let mut amounts = Pair::default();
        *amounts.get_mut(form.exact_field) = parse_exact(form, input);
        return snapshot(amounts, TradeState::None);
    }

    let by_field = |field: CurrencyField| match field {
        CurrencyField::Input => input,
        CurrencyField::Output => output,
    };

    let wrap = wrap_type(input, output);
    if wrap.is_wrap() {
        // Wraps mirror the exact amount onto the other side at a 1:1 ratio,
        // adjusted only for decimals; no quote is requested.
        let exact = parse_exact(form, by_field(form.exact_field));
        let other_currency = by_field(form.exact_field.other());
        let mirrored = exact
            .as_ref()
            .and_then(|amount| amount.mirror(other_currency));

        let mut amounts = Pair::default();
        *amounts.get_mut(form.exact_field) = exact;
        *amounts.get_mut(form.exact_field.other()) = mirrored;
        let mut info = snapshot(amounts, TradeState::None);
        info.wrap = wrap;
        return info;
    }

    let exact = parse_exact(form, by_field(form.exact_field));

    // An empty or zero exact amount is the debounce/skip condition: no quote
    // is in flight and the form is considered incomplete.
    let Some(exact) = exact else {
        return snapshot(Pair::default(), TradeState::None);
    };

    // The exact field holds the user's amount verbatim; the other field is
    // populated from the trade and stays empty while the quote is pending or
    // failed.
    let other = trade
        .trade()
        .and_then(|trade| trade.amount_of(by_field(form.exact_field.other())))
        .cloned();

    let mut amounts = Pair::default();
    *amounts.get_mut(form.exact_field) = Some(exact);
    *amounts.get_mut(form.exact_field.other()) = other;
    snapshot(amounts, trade)
}

fn parse_exact(form: &SwapForm, currency: &Currency) -> Option<CurrencyAmount> {
    let amount = CurrencyAmount::parse(&form.exact_amount_token, currency)?;
    (!amount.is_zero()).then_some(amount)
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::domain::{
            currency::Safety,
            eth::ChainId,
            trade::{Leg, TradeType},
        },
        alloy::primitives::{Address, U256},
    };

    fn native() -> Currency {
        Currency::native(ChainId::Mainnet)
    }

    fn wrapped() -> Currency {
        Currency {
            chain: ChainId::Mainnet,
            address: Some(ChainId::Mainnet.wrapped_native()),
            decimals: 18,
            symbol: "WETH".to_string(),
            safety: Safety::Trusted,
        }
    }

    fn usdc() -> Currency {
        Currency {
            chain: ChainId::Mainnet,
            address: Some(eth::TokenAddress(Address::with_last_byte(42))),
            decimals: 6,
            symbol: "USDC".to_string(),
            safety: Safety::Trusted,
        }
    }

    fn form(input: &Currency, output: &Currency, exact: &str) -> SwapForm {
        SwapForm {
            chain: ChainId::Mainnet,
            input: Some(input.id()),
            output: Some(output.id()),
            exact_amount_token: exact.to_string(),
            exact_amount_fiat: None,
            exact_field: CurrencyField::Input,
            custom_slippage: None,
        }
    }

    fn pair(input: &Currency, output: &Currency) -> Pair<Option<Currency>> {
        Pair::new(Some(input.clone()), Some(output.clone()))
    }

    fn trade(input: CurrencyAmount, output: CurrencyAmount) -> Trade {
        Trade {
            trade_type: TradeType::ExactInput,
            input,
            output,
            route: vec![Leg {
                pool: eth::ContractAddress(Address::with_last_byte(9)),
                token_in: eth::TokenAddress(Address::with_last_byte(1)),
                token_out: eth::TokenAddress(Address::with_last_byte(2)),
                spot_price: "2000".parse().unwrap(),
            }],
            price_impact: "0.01".parse().unwrap(),
            gas: Default::default(),
            swap_call: None,
        }
    }

    #[test]
    fn wrap_short_circuits_routing() {
        let form = form(&native(), &wrapped(), "1.5");
        let info = derive(
            &form,
            &pair(&native(), &wrapped()),
            &Pair::default(),
            // Even a ready trade is discarded for wraps.
            TradeState::Pending,
            &slippage::AutoSlippage::default(),
        );

        assert_eq!(info.wrap, WrapType::Wrap);
        assert_eq!(info.trade, TradeState::None);
        let raw = U256::from(1_500_000_000_000_000_000_u128);
        assert_eq!(info.currency_amounts.input.as_ref().unwrap().amount, raw);
        assert_eq!(info.currency_amounts.output.as_ref().unwrap().amount, raw);
    }

    #[test]
    fn unwrap_mirrors_in_reverse_direction() {
        let form = form(&wrapped(), &native(), "2");
        let info = derive(
            &form,
            &pair(&wrapped(), &native()),
            &Pair::default(),
            TradeState::None,
            &slippage::AutoSlippage::default(),
        );

        assert_eq!(info.wrap, WrapType::Unwrap);
        assert_eq!(
            info.currency_amounts.output.as_ref().unwrap().amount,
            U256::from(2_000_000_000_000_000_000_u128),
        );
    }

    #[test]
    fn exact_field_holds_user_amount_verbatim() {
        let input_amount = CurrencyAmount::parse("1", &native()).unwrap();
        let output_amount = CurrencyAmount::parse("1990", &usdc()).unwrap();
        let ready = TradeState::Ready(trade(input_amount.clone(), output_amount.clone()));

        let info = derive(
            &form(&native(), &usdc(), "1"),
            &pair(&native(), &usdc()),
            &Pair::default(),
            ready,
            &slippage::AutoSlippage::default(),
        );

        assert_eq!(info.currency_amounts.input, Some(input_amount));
        assert_eq!(info.currency_amounts.output, Some(output_amount));
        assert_eq!(info.exact_field, CurrencyField::Input);

        // Exactness invariant: exactly the exact field equals the raw user
        // entry.
        let exact = info.exact_amount().unwrap();
        assert_eq!(exact.amount, U256::from(1_000_000_000_000_000_000_u128));
    }

    #[test]
    fn exact_output_uses_output_as_source_of_truth() {
        let mut form = form(&native(), &usdc(), "1990");
        form.exact_field = CurrencyField::Output;

        let info = derive(
            &form,
            &pair(&native(), &usdc()),
            &Pair::default(),
            TradeState::Pending,
            &slippage::AutoSlippage::default(),
        );

        assert_eq!(
            info.currency_amounts.output.as_ref().unwrap().amount,
            U256::from(1_990_000_000_u64),
        );
        // The derived side stays empty while the quote is pending.
        assert_eq!(info.currency_amounts.input, None);
        assert_eq!(info.trade, TradeState::Pending);
    }

    #[test]
    fn self_trade_derives_nothing() {
        let info = derive(
            &form(&usdc(), &usdc(), "10"),
            &pair(&usdc(), &usdc()),
            &Pair::default(),
            TradeState::Pending,
            &slippage::AutoSlippage::default(),
        );

        assert_eq!(info.trade, TradeState::None);
        assert_eq!(info.currency_amounts.output, None);
    }

    #[test]
    fn unresolved_currency_blocks_derivation() {
        let mut form = form(&native(), &usdc(), "1");
        form.output = None;

        let info = derive(
            &form,
            &Pair::new(Some(native()), None),
            &Pair::default(),
            TradeState::Pending,
            &slippage::AutoSlippage::default(),
        );

        assert_eq!(info.trade, TradeState::None);
        assert!(info.currencies.output.is_none());
        assert!(info.currency_amounts.input.is_some());
    }

    #[test]
    fn empty_amount_skips_quote() {
        for value in ["", "0", "0.0"] {
            let info = derive(
                &form(&native(), &usdc(), value),
                &pair(&native(), &usdc()),
                &Pair::default(),
                TradeState::None,
                &slippage::AutoSlippage::default(),
            );
            assert_eq!(info.trade, TradeState::None);
            assert_eq!(info.currency_amounts, Pair::default());
        }
    }

    #[test]
    fn derivation_is_idempotent() {
        let input_amount = CurrencyAmount::parse("1", &native()).unwrap();
        let output_amount = CurrencyAmount::parse("1990", &usdc()).unwrap();
        let ready = TradeState::Ready(trade(input_amount, output_amount));

        let derive_once = || {
            derive(
                &form(&native(), &usdc(), "1"),
                &pair(&native(), &usdc()),
                &Pair::default(),
                ready.clone(),
                &slippage::AutoSlippage::default(),
            )
        };
        assert_eq!(derive_once(), derive_once());
    }

    #[test]
    fn custom_slippage_wins_unconditionally() {
        let mut form = form(&native(), &usdc(), "1");
        form.custom_slippage = Slippage::new("0.2".parse().unwrap());

        let info = derive(
            &form,
            &pair(&native(), &usdc()),
            &Pair::default(),
            TradeState::None,
            &slippage::AutoSlippage::default(),
        );

        assert_eq!(info.slippage(), &Slippage::new("0.2".parse().unwrap()).unwrap());
    }
}
