use std::sync::Arc;

use chrono::NaiveDate;
use finch_core::{Money, Transaction, TransactionId};
use finch_rewards::{RewardCalculator, RewardLedger};
use finch_rules::RuleSet;
use tokio::sync::{Mutex, RwLock};

use crate::config::{ConfigError, ServerConfig};

/// In-memory transactions, in intake order.
#[derive(Debug, Default)]
pub struct TransactionStore {
    transactions: Vec<Transaction>,
    next_id: i64,
}

impl TransactionStore {
    pub fn insert(&mut self, date: NaiveDate, description: &str, amount: Money) -> &mut Transaction {
        self.next_id += 1;
        self.transactions
            .push(Transaction::new(TransactionId(self.next_id), date, description, amount));
        let last = self.transactions.len() - 1;
        &mut self.transactions[last]
    }

    pub fn get_mut(&mut self, id: TransactionId) -> Option<&mut Transaction> {
        self.transactions.iter_mut().find(|tx| tx.id() == id)
    }

    pub fn all(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn all_mut(&mut self) -> &mut [Transaction] {
        &mut self.transactions
    }
}

/// Shared by every handler. Lock order when more than one is held:
/// `rules`, then `transactions`.
pub struct AppState {
    pub rules: RwLock<RuleSet>,
    pub transactions: RwLock<TransactionStore>,
    pub calculator: RewardCalculator,
    pub ledger: Mutex<RewardLedger>,
}

impl AppState {
    pub fn new(rules: RuleSet, calculator: RewardCalculator) -> Arc<Self> {
        Arc::new(Self {
            rules: RwLock::new(rules),
            transactions: RwLock::new(TransactionStore::default()),
            calculator,
            ledger: Mutex::new(RewardLedger::new()),
        })
    }

    pub fn from_config(config: &ServerConfig) -> Result<Arc<Self>, ConfigError> {
        let rules = config.read_rules()?;
        tracing::info!(rules = rules.len(), "rule set loaded");
        Ok(Self::new(rules, RewardCalculator::new(config.rewards.clone())))
    }
}
