//! The interactive swap session. Owns the user's form, resolves currencies
//! and balances through the infrastructure seams, and keeps exactly one quote
//! request in flight for the current form parameters.
//!
//! Staleness is keyed on the request parameters themselves: a response is
//! applied only while the session still awaits a request with identical
//! parameters, so late responses for superseded parameters are discarded
//! without any bookkeeping of request ordering.

use {
    crate::{
        domain::{
            currency::{Currency, CurrencyAmount, CurrencyField, CurrencyId, Pair},
            eth,
            swap::{self, slippage::AutoSlippage, DerivedSwapInfo, Slippage, SwapForm, TradeState},
            trade,
        },
        infra::{balance, router, tokens},
    },
    std::{
        sync::Arc,
        time::{Duration, Instant},
    },
};

/// The quote slot of a session. At most one request is awaited at a time; a
/// newer request simply replaces the slot, which is what invalidates any
/// in-flight response for the old parameters.
#[derive(Clone, Debug)]
enum QuoteState {
    /// No quote has been requested for the current parameters.
    Idle,
    AwaitingQuote(router::dto::Request),
    Ready {
        request: router::dto::Request,
        trade: trade::Trade,
    },
    Failed {
        request: router::dto::Request,
        error: trade::QuoteError,
    },
}

pub struct SwapSession {
    tokens: Arc<dyn tokens::TokenInfoSource>,
    balances: Arc<dyn balance::BalanceSource>,
    router: Arc<dyn router::QuoteSource>,
    auto_slippage: AutoSlippage,
    account: Option<eth::Address>,
    form: SwapForm,
    currencies: Pair<Option<Currency>>,
    currency_balances: Pair<Option<CurrencyAmount>>,
    quote: QuoteState,
    debounce: Debouncer,
}

impl SwapSession {
    pub fn new(
        tokens: Arc<dyn tokens::TokenInfoSource>,
        balances: Arc<dyn balance::BalanceSource>,
        router: Arc<dyn router::QuoteSource>,
        auto_slippage: AutoSlippage,
        quote_debounce: Duration,
        chain: eth::ChainId,
    ) -> Self {
        Self {
            tokens,
            balances,
            router,
            auto_slippage,
            account: None,
            form: SwapForm::new(chain),
            currencies: Pair::default(),
            currency_balances: Pair::default(),
            quote: QuoteState::Idle,
            debounce: Debouncer::new(quote_debounce),
        }
    }

    pub fn set_account(&mut self, account: Option<eth::Address>) {
        self.account = account;
        self.currency_balances = Pair::default();
    }

    /// Replaces the exact amount the user is typing.
    pub fn set_exact_amount(&mut self, amount: &str) {
        if self.form.exact_amount_token == amount {
            return;
        }
        self.form.exact_amount_token = amount.to_string();
        self.form.exact_amount_fiat = None;
        self.debounce.arm(Instant::now());
    }

    /// Selects the currency of one side of the form. Selecting the currency
    /// already on the opposite side switches the two sides instead, which is
    /// what a user picking "the other one" means.
    pub fn select_currency(&mut self, field: CurrencyField, id: CurrencyId) {
        let other = match field {
            CurrencyField::Input => &self.form.output,
            CurrencyField::Output => &self.form.input,
        };
        if *other == Some(id) {
            self.switch_fields();
            return;
        }

        match field {
            CurrencyField::Input => self.form.input = Some(id),
            CurrencyField::Output => self.form.output = Some(id),
        }
        *self.currencies.get_mut(field) = None;
        *self.currency_balances.get_mut(field) = None;
        self.debounce.arm(Instant::now());
    }

    /// Swaps the input and output sides wholesale. The exact amount follows
    /// its currency to the other side.
    pub fn switch_fields(&mut self) {
        std::mem::swap(&mut self.form.input, &mut self.form.output);
        self.currencies.flip();
        self.currency_balances.flip();
        self.form.exact_field = self.form.exact_field.other();
        self.debounce.arm(Instant::now());
    }

    pub fn set_exact_field(&mut self, field: CurrencyField) {
        if self.form.exact_field == field {
            return;
        }
        self.form.exact_field = field;
        self.debounce.arm(Instant::now());
    }

    pub fn set_custom_slippage(&mut self, slippage: Option<Slippage>) {
        if self.form.custom_slippage == slippage {
            return;
        }
        self.form.custom_slippage = slippage;
        self.debounce.arm(Instant::now());
    }

    pub fn form(&self) -> &SwapForm {
        &self.form
    }

    /// The quote request the current form parameters call for, if they call
    /// for one at all. Wraps, self-trades and empty amounts never quote.
    fn desired_request(&self) -> Option<router::dto::Request> {
        let (Some(input), Some(output)) = (&self.currencies.input, &self.currencies.output)
        else {
            return None;
        };
        if input.same_as(output) || swap::wrap_type(input, output).is_wrap() {
            return None;
        }

        let exact_currency = self.currencies.get(self.form.exact_field).as_ref()?;
        let exact = CurrencyAmount::parse(&self.form.exact_amount_token, exact_currency)
            .filter(|amount| !amount.is_zero())?;

        let trade_type = match self.form.exact_field {
            CurrencyField::Input => trade::TradeType::ExactInput,
            CurrencyField::Output => trade::TradeType::ExactOutput,
        };
        let slippage = self
            .form
            .custom_slippage
            .clone()
            .unwrap_or_else(|| self.auto_slippage.base());
        Some(router::dto::Request::new(
            &input.id(),
            &output.id(),
            exact.amount,
            trade_type,
            router::slippage_bps(&slippage),
        ))
    }

    /// Arms the pending quote slot and returns the request to issue, if the
    /// debounce window has elapsed and the current parameters are not already
    /// covered by the slot.
    pub fn begin_quote(&mut self, now: Instant) -> Option<router::dto::Request> {
        if !self.debounce.ready(now) {
            return None;
        }
        self.debounce.disarm();

        let Some(request) = self.desired_request() else {
            self.quote = QuoteState::Idle;
            return None;
        };
        let covered = match &self.quote {
            QuoteState::Idle => false,
            QuoteState::AwaitingQuote(key)
            | QuoteState::Ready { request: key, .. }
            | QuoteState::Failed { request: key, .. } => *key == request,
        };
        if covered {
            return None;
        }

        self.quote = QuoteState::AwaitingQuote(request.clone());
        Some(request)
    }

    /// Applies a quote response. The response is discarded unless the session
    /// still awaits a request with exactly these parameters, which makes the
    /// newest issued request win regardless of response arrival order.
    pub fn apply_quote(
        &mut self,
        request: &router::dto::Request,
        result: Result<router::dto::Quote, router::Error>,
    ) {
        match &self.quote {
            QuoteState::AwaitingQuote(key) if key == request => (),
            _ => {
                tracing::debug!(?request, "discarding quote response for stale parameters");
                return;
            }
        }

        self.quote = match result {
            Ok(quote) => match self.transform(&quote, request) {
                Some(trade) => QuoteState::Ready {
                    request: request.clone(),
                    trade,
                },
                // A structurally valid response without a usable route means
                // the pair cannot be traded right now.
                None => QuoteState::Failed {
                    request: request.clone(),
                    error: trade::QuoteError::NoRoute,
                },
            },
            Err(error) => QuoteState::Failed {
                request: request.clone(),
                error: error.categorize(),
            },
        };
    }

    fn transform(
        &self,
        quote: &router::dto::Quote,
        request: &router::dto::Request,
    ) -> Option<trade::Trade> {
        let (Some(input), Some(output)) = (&self.currencies.input, &self.currencies.output)
        else {
            return None;
        };
        let trade_type = match request.swap_type {
            router::dto::Type::ExactIn => trade::TradeType::ExactInput,
            router::dto::Type::ExactOut => trade::TradeType::ExactOutput,
        };
        router::transform(quote, request, trade_type, input, output)
    }

    /// Resolves currencies, refreshes balances and drives the quote state
    /// machine one step, awaiting the quote response if one is due.
    pub async fn refresh(&mut self) {
        self.resolve_currencies().await;
        self.fetch_balances().await;

        if let Some(request) = self.begin_quote(Instant::now()) {
            let result = self.router.quote(&request).await;
            self.apply_quote(&request, result);
        }
    }

    async fn resolve_currencies(&mut self) {
        if self.currencies.input.is_none() {
            self.currencies.input = self.resolve(self.form.input).await;
        }
        if self.currencies.output.is_none() {
            self.currencies.output = self.resolve(self.form.output).await;
        }
    }

    async fn resolve(&self, id: Option<CurrencyId>) -> Option<Currency> {
        let id = id?;
        match self.tokens.resolve(&id).await {
            Ok(currency) => currency,
            Err(err) => {
                tracing::warn!(?id, ?err, "currency resolution failed");
                None
            }
        }
    }

    async fn fetch_balances(&mut self) {
        let Some(account) = self.account else {
            return;
        };
        let fetch = |currency: Option<Currency>| {
            let balances = self.balances.clone();
            async move {
                let currency = currency?;
                match balances.balance(account, &currency).await {
                    Ok(balance) => Some(balance),
                    // A failed lookup leaves the balance unknown; it must not
                    // be mistaken for a zero balance.
                    Err(err) => {
                        tracing::warn!(?err, "balance lookup failed");
                        None
                    }
                }
            }
        };
        let (input, output) = futures::join!(
            fetch(self.currencies.input.clone()),
            fetch(self.currencies.output.clone()),
        );
        self.currency_balances = Pair::new(input, output);
    }

    /// The trade state scoped to the current form parameters. Anything keyed
    /// by superseded parameters reads as pending.
    fn trade_state(&self) -> TradeState {
        let Some(desired) = self.desired_request() else {
            return TradeState::None;
        };
        match &self.quote {
            QuoteState::Ready { request, trade } if *request == desired => {
                TradeState::Ready(trade.clone())
            }
            QuoteState::Failed { request, error } if *request == desired => {
                TradeState::Failed(error.clone())
            }
            _ => TradeState::Pending,
        }
    }

    /// Derives the current complete swap state snapshot.
    pub fn derived(&self) -> DerivedSwapInfo {
        swap::derive(
            &self.form,
            &self.currencies,
            &self.currency_balances,
            self.trade_state(),
            &self.auto_slippage,
        )
    }
}

/// A deadline-based debouncer. Armed by form mutations, checked by the quote
/// state machine against a caller-provided clock so tests need no timers.
struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    fn arm(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    fn ready(&self, now: Instant) -> bool {
        matches!(self.deadline, Some(deadline) if now >= deadline)
    }

    fn disarm(&mut self) {
        self.deadline = None;
    }
}
