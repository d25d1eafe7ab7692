//! Market notifications and operation outcomes

use metacoin_core::{Address, Amount, QuestionId};
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::mpsc;
use tracing::trace;

/// Reason attached to a soft failure. The strings are observed verbatim by
/// existing clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureReason {
    #[serde(rename = "Could not afford question")]
    CannotAfford,
    #[serde(rename = "Invalid id of question")]
    InvalidId,
    #[serde(rename = "Gah, this one has been done")]
    AlreadyAnswered,
    #[serde(rename = "Please answer the question")]
    EmptyAnswer,
    #[serde(rename = "Your opinion does not mean much")]
    NotEligible,
}

impl FailureReason {
    /// Reason string as published in notifications
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureReason::CannotAfford => "Could not afford question",
            FailureReason::InvalidId => "Invalid id of question",
            FailureReason::AlreadyAnswered => "Gah, this one has been done",
            FailureReason::EmptyAnswer => "Please answer the question",
            FailureReason::NotEligible => "Your opinion does not mean much",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a state-changing call that can fail for business reasons.
///
/// `is_success` is the boolean a polling caller sees; the matching
/// [`MarketEvent`] is published separately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Success(T),
    Failed(FailureReason),
}

impl<T> Outcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn success(self) -> Option<T> {
        match self {
            Outcome::Success(value) => Some(value),
            Outcome::Failed(_) => None,
        }
    }

    pub fn failure(&self) -> Option<FailureReason> {
        match self {
            Outcome::Success(_) => None,
            Outcome::Failed(reason) => Some(*reason),
        }
    }
}

impl<T> From<Outcome<T>> for bool {
    fn from(outcome: Outcome<T>) -> Self {
        outcome.is_success()
    }
}

/// Externally observable notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum MarketEvent {
    QuestionAsked {
        question: String,
        value: Amount,
        id: QuestionId,
    },
    QuestionFailed {
        asker: Address,
        reason: FailureReason,
    },
    Answered {
        question: String,
        answer: String,
        value: Amount,
        id: QuestionId,
    },
    AnswerFailed {
        answerer: Address,
        reason: FailureReason,
        id: QuestionId,
    },
}

impl MarketEvent {
    /// Event name
    pub fn name(&self) -> &'static str {
        match self {
            MarketEvent::QuestionAsked { .. } => "QuestionAsked",
            MarketEvent::QuestionFailed { .. } => "QuestionFailed",
            MarketEvent::Answered { .. } => "Answered",
            MarketEvent::AnswerFailed { .. } => "AnswerFailed",
        }
    }

    /// Failure reason, for the failure notifications
    pub fn reason(&self) -> Option<FailureReason> {
        match self {
            MarketEvent::QuestionFailed { reason, .. } | MarketEvent::AnswerFailed { reason, .. } => {
                Some(*reason)
            }
            _ => None,
        }
    }
}

/// Fan-out of notifications to live subscribers
#[derive(Debug, Default)]
pub struct EventBus {
    subscribers: Vec<mpsc::UnboundedSender<MarketEvent>>,
}

impl EventBus {
    /// Create a bus with no subscribers
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new subscriber
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<MarketEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    /// Deliver an event to every subscriber, dropping closed ones
    pub fn publish(&mut self, event: &MarketEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
        trace!(
            "Published {} to {} subscribers",
            event.name(),
            self.subscribers.len()
        );
    }

    /// Number of live subscribers
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}
