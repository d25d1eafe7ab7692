//! Market state and its transitions
//!
//! [`MarketState`] is the complete, serialisable image of a market. Every
//! transition is split into a read-only check and an apply step so that
//! committed calls and previews share one validation path.

use crate::account::Ledger;
use crate::config::MarketConfig;
use crate::event::{FailureReason, MarketEvent, Outcome};
use crate::question::Question;
use crate::{MarketError, MarketResult};
use metacoin_core::{Address, Amount, QuestionId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// Complete market image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketState {
    /// Account that created the market
    pub owner: Address,
    /// Supply minted at creation
    pub total_supply: Amount,
    /// Price of posting a question
    pub question_cost: Amount,
    /// Account balances
    pub balances: Ledger,
    /// Questions in id order
    pub questions: Vec<Question>,
    /// Every notification published, in order
    #[serde(default)]
    pub events: Vec<MarketEvent>,
}

impl MarketState {
    /// Fresh market with the whole supply held by `owner`
    pub fn genesis(owner: Address, config: &MarketConfig) -> Self {
        Self {
            owner,
            total_supply: config.total_supply,
            question_cost: config.initial_question_cost,
            balances: Ledger::with_genesis(owner, config.total_supply),
            questions: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Number of questions posted
    pub fn question_count(&self) -> u64 {
        self.questions.len() as u64
    }

    /// Look up a question
    pub fn question(&self, id: QuestionId) -> MarketResult<&Question> {
        usize::try_from(id)
            .ok()
            .and_then(|index| self.questions.get(index))
            .ok_or(MarketError::OutOfRange {
                id,
                count: self.question_count(),
            })
    }

    fn question_mut(&mut self, id: QuestionId) -> MarketResult<&mut Question> {
        let count = self.question_count();
        usize::try_from(id)
            .ok()
            .and_then(|index| self.questions.get_mut(index))
            .ok_or(MarketError::OutOfRange { id, count })
    }

    /// Escrow held by unanswered questions
    pub fn escrowed_total(&self) -> Amount {
        self.questions.iter().map(Question::pending_escrow).sum()
    }

    /// Owner-only cost update
    pub fn set_question_cost(&mut self, caller: Address, cost: Amount) -> MarketResult<()> {
        if caller != self.owner {
            return Err(MarketError::Unauthorized { caller });
        }
        self.question_cost = cost;
        Ok(())
    }

    /// Validate a question post without applying it.
    ///
    /// Returns the id the question would receive.
    pub fn check_ask(&self, caller: &Address, text: &str) -> MarketResult<Outcome<QuestionId>> {
        if text.is_empty() {
            return Err(MarketError::EmptyQuestion);
        }
        if self.balances.balance_of(caller) < self.question_cost {
            return Ok(Outcome::Failed(FailureReason::CannotAfford));
        }
        Ok(Outcome::Success(self.question_count()))
    }

    /// Post a question, escrowing the current cost from the caller.
    ///
    /// The returned event has already been appended to the audit trail.
    pub fn apply_ask(
        &mut self,
        caller: Address,
        text: String,
        eligible_answerers: BTreeSet<Address>,
    ) -> MarketResult<(Outcome<QuestionId>, MarketEvent)> {
        let outcome = self.check_ask(&caller, &text)?;
        let event = match outcome {
            Outcome::Success(id) => {
                let value = self.question_cost;
                self.balances.debit(caller, value)?;
                let event = MarketEvent::QuestionAsked {
                    question: text.clone(),
                    value,
                    id,
                };
                self.questions
                    .push(Question::new(id, text, value, eligible_answerers, caller));
                event
            }
            Outcome::Failed(reason) => MarketEvent::QuestionFailed {
                asker: caller,
                reason,
            },
        };
        self.events.push(event.clone());
        Ok((outcome, event))
    }

    /// Validate an answer without applying it.
    ///
    /// Returns the escrow the answerer would be paid.
    pub fn check_answer(&self, caller: &Address, id: QuestionId, answer: &str) -> Outcome<Amount> {
        let question = match self.question(id) {
            Ok(question) => question,
            Err(_) => return Outcome::Failed(FailureReason::InvalidId),
        };
        if question.answered {
            return Outcome::Failed(FailureReason::AlreadyAnswered);
        }
        if answer.is_empty() {
            return Outcome::Failed(FailureReason::EmptyAnswer);
        }
        if !question.is_eligible(caller) {
            return Outcome::Failed(FailureReason::NotEligible);
        }
        Outcome::Success(question.escrowed_value)
    }

    /// Resolve a question and release its escrow to the caller.
    ///
    /// The returned event has already been appended to the audit trail.
    pub fn apply_answer(
        &mut self,
        caller: Address,
        id: QuestionId,
        answer: String,
    ) -> MarketResult<(Outcome<Amount>, MarketEvent)> {
        let outcome = self.check_answer(&caller, id, &answer);
        let event = match outcome {
            Outcome::Success(value) => {
                self.balances.credit(caller, value)?;
                let question = self.question_mut(id)?;
                question.resolve(answer.clone());
                MarketEvent::Answered {
                    question: question.text.clone(),
                    answer,
                    value,
                    id,
                }
            }
            Outcome::Failed(reason) => MarketEvent::AnswerFailed {
                answerer: caller,
                reason,
                id,
            },
        };
        self.events.push(event.clone());
        Ok((outcome, event))
    }

    /// Check the ledger invariants of a restored image
    pub fn verify(&self) -> MarketResult<()> {
        let balances = self
            .balances
            .total()
            .ok_or_else(|| MarketError::CorruptState("balance sum overflows".to_string()))?;
        let escrow = self
            .questions
            .iter()
            .try_fold(0u64, |acc, question| acc.checked_add(question.pending_escrow()))
            .ok_or_else(|| MarketError::CorruptState("escrow sum overflows".to_string()))?;
        let held = balances
            .checked_add(escrow)
            .ok_or_else(|| MarketError::CorruptState("escrow sum overflows".to_string()))?;
        if held != self.total_supply {
            return Err(MarketError::CorruptState(format!(
                "balances {} plus escrow {} do not equal total supply {}",
                balances, escrow, self.total_supply
            )));
        }

        for (index, question) in self.questions.iter().enumerate() {
            if question.id != index as u64 {
                return Err(MarketError::CorruptState(format!(
                    "question at position {} has id {}",
                    index, question.id
                )));
            }
            if question.text.is_empty() {
                return Err(MarketError::CorruptState(format!(
                    "question {} has no text",
                    question.id
                )));
            }
            if question.answered == question.answer.is_empty() {
                return Err(MarketError::CorruptState(format!(
                    "question {} answered flag does not match its answer",
                    question.id
                )));
            }
        }
        Ok(())
    }

    /// Deterministic digest of balances, cost and questions.
    ///
    /// The audit trail is not covered.
    pub fn state_root(&self) -> blake3::Hash {
        let mut hasher = blake3::Hasher::new();

        hasher.update(self.owner.as_bytes());
        hasher.update(&self.total_supply.to_le_bytes());
        hasher.update(&self.question_cost.to_le_bytes());

        // Ledger iterates in address order
        for (address, account) in self.balances.iter() {
            hasher.update(address.as_bytes());
            hasher.update(&account.balance.to_le_bytes());
        }

        for question in &self.questions {
            hasher.update(&question.id.to_le_bytes());
            update_str(&mut hasher, &question.text);
            hasher.update(&question.escrowed_value.to_le_bytes());
            hasher.update(&(question.eligible_answerers.len() as u64).to_le_bytes());
            for answerer in &question.eligible_answerers {
                hasher.update(answerer.as_bytes());
            }
            hasher.update(&[question.answered as u8]);
            update_str(&mut hasher, &question.answer);
            hasher.update(question.asker.as_bytes());
        }

        hasher.finalize()
    }

    /// Load a market image from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> MarketResult<Self> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| MarketError::Serialization(format!("Failed to read state file: {}", e)))?;
        let state: MarketState = serde_json::from_str(&content)?;
        state.verify()?;
        Ok(state)
    }

    /// Save the market image to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> MarketResult<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), content)
            .map_err(|e| MarketError::Serialization(format!("Failed to write state file: {}", e)))?;
        Ok(())
    }
}

// Length prefix keeps adjacent strings from running together.
fn update_str(hasher: &mut blake3::Hasher, s: &str) {
    hasher.update(&(s.len() as u64).to_le_bytes());
    hasher.update(s.as_bytes());
}
