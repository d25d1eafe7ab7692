//! End-to-end market behaviour

use metacoin_core::{Address, Amount};
use metacoin_market::{FailureReason, MarketEvent, Outcome, QuestionMarket};
use proptest::prelude::*;

const QUESTION: &str = "What is the meaning of life?";
const ANSWER: &str = "42";
const COST: Amount = 10;
const SUPPLY: Amount = 12000;

fn owner() -> Address {
    Address::new([0xaa; 20])
}

fn account() -> Address {
    Address::new([0xbb; 20])
}

fn friend() -> Address {
    Address::new([0xcc; 20])
}

fn priced_market() -> QuestionMarket {
    let market = QuestionMarket::new(owner(), SUPPLY);
    market.set_question_cost(owner(), COST).unwrap();
    market
}

fn last_event(market: &QuestionMarket) -> MarketEvent {
    market.events().last().cloned().expect("no event published")
}

fn assert_supply_conserved(market: &QuestionMarket, accounts: &[Address]) {
    let held: Amount = accounts.iter().map(|a| market.balance_of(a)).sum();
    assert_eq!(held + market.escrowed_total(), market.total_supply());
}

#[test]
fn test_question_is_answered_and_paid() {
    let market = priced_market();

    let asked = market.ask_question(owner(), QUESTION, [account()]).unwrap();
    assert_eq!(asked, Outcome::Success(0));
    assert_eq!(market.balance_of(&owner()), SUPPLY - COST);
    assert_eq!(market.question_count(), 1);

    let view = market.get_question_by_id(0).unwrap();
    assert_eq!(view.text, QUESTION);
    assert!(!view.answered);

    let answered = market.answer_question(account(), 0, ANSWER).unwrap();
    assert_eq!(answered, Outcome::Success(COST));
    assert_eq!(
        last_event(&market),
        MarketEvent::Answered {
            question: QUESTION.to_string(),
            answer: ANSWER.to_string(),
            value: COST,
            id: 0,
        }
    );

    assert_eq!(market.balance_of(&account()), 10);
    assert_eq!(market.balance_of(&owner()), 11990);
    let (text, answered, answer): (String, bool, String) =
        market.get_question_by_id(0).unwrap().into();
    assert_eq!(
        (text.as_str(), answered, answer.as_str()),
        (QUESTION, true, ANSWER)
    );
    assert_supply_conserved(&market, &[owner(), account(), friend()]);
}

#[test]
fn test_question_over_balance_is_refused() {
    let market = QuestionMarket::new(owner(), SUPPLY);
    market.set_question_cost(owner(), SUPPLY * 10).unwrap();

    let outcome = market.ask_question(owner(), QUESTION, [account()]).unwrap();
    assert!(!outcome.is_success());
    assert_eq!(market.question_count(), 0);
    assert_eq!(market.balance_of(&owner()), SUPPLY);
    assert_eq!(
        last_event(&market),
        MarketEvent::QuestionFailed {
            asker: owner(),
            reason: FailureReason::CannotAfford,
        }
    );
    assert_eq!(
        last_event(&market).reason().map(|r| r.to_string()).as_deref(),
        Some("Could not afford question")
    );
}

#[test]
fn test_question_asked_event() {
    let market = priced_market();
    market.ask_question(owner(), QUESTION, [account()]).unwrap();

    assert_eq!(
        last_event(&market),
        MarketEvent::QuestionAsked {
            question: QUESTION.to_string(),
            value: COST,
            id: 0,
        }
    );
}

#[test]
fn test_answering_twice_is_refused() {
    let market = priced_market();
    market.ask_question(owner(), QUESTION, [account()]).unwrap();
    market.answer_question(account(), 0, ANSWER).unwrap();

    let outcome = market.answer_question(account(), 0, ANSWER).unwrap();
    assert_eq!(outcome, Outcome::Failed(FailureReason::AlreadyAnswered));
    assert_eq!(market.balance_of(&account()), COST);
    assert_eq!(
        last_event(&market),
        MarketEvent::AnswerFailed {
            answerer: account(),
            reason: FailureReason::AlreadyAnswered,
            id: 0,
        }
    );
}

#[test]
fn test_answering_missing_question_is_refused() {
    let market = QuestionMarket::new(owner(), SUPPLY);

    let outcome = market.answer_question(owner(), 0, ANSWER).unwrap();
    assert_eq!(outcome, Outcome::Failed(FailureReason::InvalidId));
    assert_eq!(
        last_event(&market),
        MarketEvent::AnswerFailed {
            answerer: owner(),
            reason: FailureReason::InvalidId,
            id: 0,
        }
    );

    // Invalid id takes precedence over an empty answer
    assert_eq!(
        market.preview_answer_question(owner(), 0, ""),
        Outcome::Failed(FailureReason::InvalidId)
    );
}

#[test]
fn test_empty_answer_is_refused() {
    let market = priced_market();
    market.ask_question(owner(), QUESTION, [account()]).unwrap();

    let outcome = market.answer_question(owner(), 0, "").unwrap();
    assert_eq!(outcome, Outcome::Failed(FailureReason::EmptyAnswer));
    assert_eq!(
        last_event(&market),
        MarketEvent::AnswerFailed {
            answerer: owner(),
            reason: FailureReason::EmptyAnswer,
            id: 0,
        }
    );
    assert!(!market.get_question_by_id(0).unwrap().answered);
}

#[test]
fn test_ineligible_answerer_is_refused() {
    let market = priced_market();
    market.ask_question(owner(), QUESTION, [account()]).unwrap();

    assert!(!market.preview_answer_question(friend(), 0, ANSWER).is_success());

    let outcome = market.answer_question(friend(), 0, ANSWER).unwrap();
    assert_eq!(outcome, Outcome::Failed(FailureReason::NotEligible));
    assert_eq!(market.balance_of(&friend()), 0);
    assert_eq!(market.escrowed_total(), COST);
    assert_eq!(
        last_event(&market),
        MarketEvent::AnswerFailed {
            answerer: friend(),
            reason: FailureReason::NotEligible,
            id: 0,
        }
    );
}

#[test]
fn test_escrow_fixed_at_posting_time() {
    let market = priced_market();
    market.ask_question(owner(), QUESTION, [account()]).unwrap();
    market.set_question_cost(owner(), 500).unwrap();

    assert_eq!(market.question(0).unwrap().escrowed_value, COST);
    assert_eq!(
        market.answer_question(account(), 0, ANSWER).unwrap(),
        Outcome::Success(COST)
    );
}

#[test]
fn test_ids_are_sequential() {
    let market = priced_market();
    for expected in 0..5 {
        let outcome = market
            .ask_question(owner(), format!("question {}", expected), [account()])
            .unwrap();
        assert_eq!(outcome, Outcome::Success(expected));
    }
    assert_eq!(market.question_count(), 5);
    assert_eq!(market.get_question_by_id(3).unwrap().text, "question 3");
}

#[test]
fn test_concurrent_answerers_pay_once() {
    use std::sync::Arc;
    use std::thread;

    let market = Arc::new(priced_market());
    let answerers: Vec<Address> = (1..=8u8).map(|b| Address::new([b; 20])).collect();
    market
        .ask_question(owner(), QUESTION, answerers.clone())
        .unwrap();

    let handles: Vec<_> = answerers
        .iter()
        .copied()
        .map(|answerer| {
            let market = Arc::clone(&market);
            thread::spawn(move || market.answer_question(answerer, 0, ANSWER).unwrap())
        })
        .collect();

    let winners = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(Outcome::is_success)
        .count();
    assert_eq!(winners, 1);

    let paid: Amount = answerers.iter().map(|a| market.balance_of(a)).sum();
    assert_eq!(paid, COST);
    assert_eq!(market.escrowed_total(), 0);
}

#[derive(Debug, Clone)]
enum Op {
    SetCost { caller: usize, cost: Amount },
    Ask { caller: usize, answerers: Vec<usize> },
    Answer { caller: usize, id: u64, empty: bool },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..3usize, 0..6000u64).prop_map(|(caller, cost)| Op::SetCost { caller, cost }),
        (0..3usize, prop::collection::vec(0..3usize, 0..3))
            .prop_map(|(caller, answerers)| Op::Ask { caller, answerers }),
        (0..3usize, 0..6u64, any::<bool>())
            .prop_map(|(caller, id, empty)| Op::Answer { caller, id, empty }),
    ]
}

proptest! {
    #[test]
    fn prop_supply_is_conserved(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let accounts = [owner(), account(), friend()];
        let market = QuestionMarket::new(owner(), SUPPLY);

        for op in ops {
            match op {
                Op::SetCost { caller, cost } => {
                    let result = market.set_question_cost(accounts[caller], cost);
                    prop_assert_eq!(result.is_ok(), caller == 0);
                }
                Op::Ask { caller, answerers } => {
                    let count = market.question_count();
                    let outcome = market
                        .ask_question(
                            accounts[caller],
                            QUESTION,
                            answerers.into_iter().map(|i| accounts[i]),
                        )
                        .unwrap();
                    let grown = market.question_count() == count + 1;
                    prop_assert_eq!(outcome.is_success(), grown);
                }
                Op::Answer { caller, id, empty } => {
                    let before = market.balance_of(&accounts[caller]);
                    let text = if empty { "" } else { ANSWER };
                    let outcome = market.answer_question(accounts[caller], id, text).unwrap();
                    let paid = market.balance_of(&accounts[caller]) - before;
                    prop_assert_eq!(outcome.success().unwrap_or(0), paid);
                }
            }

            let held: Amount = accounts.iter().map(|a| market.balance_of(a)).sum();
            prop_assert_eq!(held + market.escrowed_total(), SUPPLY);
        }
    }
}
