//! Account model and balance ledger

use crate::{MarketError, MarketResult};
use metacoin_core::{Address, Amount};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Account information
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Account balance
    pub balance: Amount,
}

impl Account {
    /// Create an account with initial balance
    pub fn with_balance(balance: Amount) -> Self {
        Self { balance }
    }

    /// Check if account is empty
    pub fn is_empty(&self) -> bool {
        self.balance == 0
    }

    /// Add to balance
    pub fn add_balance(&mut self, address: Address, amount: Amount) -> MarketResult<()> {
        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or(MarketError::BalanceOverflow {
                address,
                balance: self.balance,
                amount,
            })?;
        Ok(())
    }

    /// Subtract from balance
    pub fn sub_balance(&mut self, amount: Amount) -> MarketResult<()> {
        if self.balance < amount {
            return Err(MarketError::InsufficientBalance {
                required: amount,
                available: self.balance,
            });
        }
        self.balance -= amount;
        Ok(())
    }
}

/// Balances keyed by address.
///
/// Empty accounts are not stored, so an unknown address reads as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ledger {
    accounts: BTreeMap<Address, Account>,
}

impl Ledger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a ledger with the whole supply credited to one account
    pub fn with_genesis(owner: Address, supply: Amount) -> Self {
        let mut ledger = Self::new();
        ledger.set_account(owner, Account::with_balance(supply));
        ledger
    }

    /// Get account by address
    pub fn get_account(&self, address: &Address) -> Account {
        self.accounts.get(address).copied().unwrap_or_default()
    }

    /// Set account, dropping it when empty
    pub fn set_account(&mut self, address: Address, account: Account) {
        if account.is_empty() {
            self.accounts.remove(&address);
        } else {
            self.accounts.insert(address, account);
        }
    }

    /// Balance of an address, zero when unknown
    pub fn balance_of(&self, address: &Address) -> Amount {
        self.get_account(address).balance
    }

    /// Credit an address
    pub fn credit(&mut self, address: Address, amount: Amount) -> MarketResult<()> {
        let mut account = self.get_account(&address);
        account.add_balance(address, amount)?;
        self.set_account(address, account);
        Ok(())
    }

    /// Debit an address
    pub fn debit(&mut self, address: Address, amount: Amount) -> MarketResult<()> {
        let mut account = self.get_account(&address);
        account.sub_balance(amount)?;
        self.set_account(address, account);
        Ok(())
    }

    /// Sum of all balances, `None` on overflow
    pub fn total(&self) -> Option<Amount> {
        self.accounts
            .values()
            .try_fold(0u64, |acc, account| acc.checked_add(account.balance))
    }

    /// Iterate over non-empty accounts in address order
    pub fn iter(&self) -> impl Iterator<Item = (&Address, &Account)> {
        self.accounts.iter()
    }

    /// Number of non-empty accounts
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Check if no account holds a balance
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}
