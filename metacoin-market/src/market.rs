//! The question market
//!
//! [`QuestionMarket`] serialises every call through one mutex so that each
//! operation validates, mutates and publishes as a single step.

use crate::config::MarketConfig;
use crate::event::{EventBus, MarketEvent, Outcome};
use crate::question::{Question, QuestionView};
use crate::state::MarketState;
use crate::MarketResult;
use metacoin_core::{Address, Amount, QuestionId};
use parking_lot::Mutex;
use std::collections::BTreeSet;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

struct MarketInner {
    state: MarketState,
    bus: EventBus,
}

impl MarketInner {
    fn publish(&mut self, event: &MarketEvent) {
        self.bus.publish(event);
    }
}

/// Token ledger with an escrow-backed question market
pub struct QuestionMarket {
    inner: Mutex<MarketInner>,
}

impl QuestionMarket {
    /// Create a market, crediting `total_supply` to `owner`
    pub fn new(owner: Address, total_supply: Amount) -> Self {
        Self::with_config(owner, &MarketConfig::new(total_supply))
    }

    /// Create a market from configuration
    pub fn with_config(owner: Address, config: &MarketConfig) -> Self {
        info!(
            "Creating market owned by {} with supply {}",
            owner, config.total_supply
        );
        Self::from_state(MarketState::genesis(owner, config))
    }

    /// Restore a market from a saved image
    pub fn restore(state: MarketState) -> MarketResult<Self> {
        state.verify()?;
        debug!(
            "Restored market with {} questions and {} accounts",
            state.question_count(),
            state.balances.len()
        );
        Ok(Self::from_state(state))
    }

    fn from_state(state: MarketState) -> Self {
        Self {
            inner: Mutex::new(MarketInner {
                state,
                bus: EventBus::new(),
            }),
        }
    }

    /// Copy of the full market image
    pub fn snapshot(&self) -> MarketState {
        self.inner.lock().state.clone()
    }

    /// Market owner
    pub fn owner(&self) -> Address {
        self.inner.lock().state.owner
    }

    /// Fixed total supply
    pub fn total_supply(&self) -> Amount {
        self.inner.lock().state.total_supply
    }

    /// Current price of posting a question
    pub fn question_cost(&self) -> Amount {
        self.inner.lock().state.question_cost
    }

    /// Change the question price. Only the owner may do this.
    pub fn set_question_cost(&self, caller: Address, cost: Amount) -> MarketResult<()> {
        let mut inner = self.inner.lock();
        inner.state.set_question_cost(caller, cost)?;
        info!("Question cost set to {} by {}", cost, caller);
        Ok(())
    }

    /// Post a question on behalf of `caller`, escrowing the question cost.
    ///
    /// An unaffordable question is not an error: it yields
    /// `Outcome::Failed` and a `QuestionFailed` notification.
    pub fn ask_question<I>(
        &self,
        caller: Address,
        text: impl Into<String>,
        eligible_answerers: I,
    ) -> MarketResult<Outcome<QuestionId>>
    where
        I: IntoIterator<Item = Address>,
    {
        let answerers: BTreeSet<Address> = eligible_answerers.into_iter().collect();
        let mut inner = self.inner.lock();
        let (outcome, event) = inner.state.apply_ask(caller, text.into(), answerers)?;

        match &outcome {
            Outcome::Success(id) => info!("Question {} asked by {}", id, caller),
            Outcome::Failed(reason) => warn!("Question from {} rejected: {}", caller, reason),
        }
        inner.publish(&event);
        Ok(outcome)
    }

    /// Report what `ask_question` would return for the same arguments,
    /// without applying it or publishing anything.
    ///
    /// The answerer set never affects the outcome.
    pub fn preview_ask_question<I>(
        &self,
        caller: Address,
        text: &str,
        eligible_answerers: I,
    ) -> MarketResult<Outcome<QuestionId>>
    where
        I: IntoIterator<Item = Address>,
    {
        let answerers = eligible_answerers.into_iter().count();
        let outcome = self.inner.lock().state.check_ask(&caller, text)?;
        debug!(
            "Previewed question from {} with {} answerers: {:?}",
            caller, answerers, outcome
        );
        Ok(outcome)
    }

    /// Answer question `id`, paying its escrow to `caller`.
    ///
    /// Every business rejection yields `Outcome::Failed` and an
    /// `AnswerFailed` notification.
    pub fn answer_question(
        &self,
        caller: Address,
        id: QuestionId,
        answer: impl Into<String>,
    ) -> MarketResult<Outcome<Amount>> {
        let mut inner = self.inner.lock();
        let (outcome, event) = inner.state.apply_answer(caller, id, answer.into())?;

        match &outcome {
            Outcome::Success(value) => {
                info!("Question {} answered by {}, paid {}", id, caller, value)
            }
            Outcome::Failed(reason) => {
                warn!("Answer to question {} from {} rejected: {}", id, caller, reason)
            }
        }
        inner.publish(&event);
        Ok(outcome)
    }

    /// Report what `answer_question` would return without applying it or
    /// publishing anything
    pub fn preview_answer_question(
        &self,
        caller: Address,
        id: QuestionId,
        answer: &str,
    ) -> Outcome<Amount> {
        let outcome = self.inner.lock().state.check_answer(&caller, id, answer);
        debug!("Previewed answer to {} from {}: {:?}", id, caller, outcome);
        outcome
    }

    /// (text, answered, answer) for question `id`
    pub fn get_question_by_id(&self, id: QuestionId) -> MarketResult<QuestionView> {
        Ok(self.inner.lock().state.question(id)?.view())
    }

    /// Full record of question `id`
    pub fn question(&self, id: QuestionId) -> MarketResult<Question> {
        self.inner.lock().state.question(id).cloned()
    }

    /// Number of questions posted
    pub fn question_count(&self) -> u64 {
        self.inner.lock().state.question_count()
    }

    /// Balance of `account`, zero if it never held tokens
    pub fn balance_of(&self, account: &Address) -> Amount {
        self.inner.lock().state.balances.balance_of(account)
    }

    /// Escrow held by unanswered questions
    pub fn escrowed_total(&self) -> Amount {
        self.inner.lock().state.escrowed_total()
    }

    /// Audit trail of every notification published
    pub fn events(&self) -> Vec<MarketEvent> {
        self.inner.lock().state.events.clone()
    }

    /// Receive notifications published from now on
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<MarketEvent> {
        self.inner.lock().bus.subscribe()
    }

    /// Hex digest of balances, cost and questions
    pub fn state_digest(&self) -> String {
        self.inner.lock().state.state_root().to_hex().to_string()
    }
}
