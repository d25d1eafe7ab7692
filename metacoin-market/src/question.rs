//! Question records

use metacoin_core::{Address, Amount, QuestionId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A posted, escrow-backed question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Position in the market's question list
    pub id: QuestionId,
    /// Question text
    pub text: String,
    /// Amount held in escrow until the question is answered
    pub escrowed_value: Amount,
    /// Accounts allowed to answer
    pub eligible_answerers: BTreeSet<Address>,
    /// Whether the question has been resolved
    pub answered: bool,
    /// Answer text, empty until answered
    pub answer: String,
    /// Account that posted and paid for the question
    pub asker: Address,
}

impl Question {
    /// Create a new unanswered question
    pub fn new(
        id: QuestionId,
        text: String,
        escrowed_value: Amount,
        eligible_answerers: BTreeSet<Address>,
        asker: Address,
    ) -> Self {
        Self {
            id,
            text,
            escrowed_value,
            eligible_answerers,
            answered: false,
            answer: String::new(),
            asker,
        }
    }

    /// Check whether an account may answer this question
    pub fn is_eligible(&self, answerer: &Address) -> bool {
        self.eligible_answerers.contains(answerer)
    }

    /// Escrow still held by this question
    pub fn pending_escrow(&self) -> Amount {
        if self.answered {
            0
        } else {
            self.escrowed_value
        }
    }

    /// Record the answer. Callers check `answered` first.
    pub(crate) fn resolve(&mut self, answer: String) {
        debug_assert!(!self.answered, "question {} resolved twice", self.id);
        self.answered = true;
        self.answer = answer;
    }

    /// Public read view of this question
    pub fn view(&self) -> QuestionView {
        QuestionView {
            text: self.text.clone(),
            answered: self.answered,
            answer: self.answer.clone(),
        }
    }
}

/// Read view returned by `get_question_by_id`: (text, answered, answer)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionView {
    pub text: String,
    pub answered: bool,
    pub answer: String,
}

impl From<QuestionView> for (String, bool, String) {
    fn from(view: QuestionView) -> Self {
        (view.text, view.answered, view.answer)
    }
}
