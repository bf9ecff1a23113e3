//! Access gate
//!
//! A user may read a document only while holding an active loan for it.
//! Loans are owned by an external ledger; the engine only asks questions.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::store::SharedStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    Active,
    Returned,
    Overdue,
}

/// A loan as recorded by the ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanFact {
    pub user_id: String,
    pub document_id: String,
    pub status: LoanStatus,
}

impl LoanFact {
    pub fn new(user_id: &str, document_id: &str, status: LoanStatus) -> Self {
        Self {
            user_id: user_id.to_string(),
            document_id: document_id.to_string(),
            status,
        }
    }

    fn is_for(&self, user_id: &str, document_id: &str) -> bool {
        self.user_id == user_id && self.document_id == document_id
    }
}

/// Loan ledger contract
#[async_trait]
pub trait LoanLedger: Send + Sync {
    async fn has_active_loan(&self, user_id: &str, document_id: &str) -> bool;

    /// Used by review eligibility checks, not by the reading engine
    async fn has_completed_loan_historically(&self, user_id: &str, document_id: &str) -> bool;
}

/// Ledger backed by the loan facts record collection
pub struct RecordLoanLedger {
    store: SharedStore<LoanFact>,
}

impl RecordLoanLedger {
    pub fn new(store: SharedStore<LoanFact>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl LoanLedger for RecordLoanLedger {
    async fn has_active_loan(&self, user_id: &str, document_id: &str) -> bool {
        self.store
            .load_all()
            .await
            .iter()
            .any(|l| l.is_for(user_id, document_id) && l.status == LoanStatus::Active)
    }

    async fn has_completed_loan_historically(&self, user_id: &str, document_id: &str) -> bool {
        self.store
            .load_all()
            .await
            .iter()
            .any(|l| l.is_for(user_id, document_id) && l.status == LoanStatus::Returned)
    }
}

/// Answers whether a user may render a document right now
#[derive(Clone)]
pub struct AccessGate {
    ledger: Arc<dyn LoanLedger>,
}

impl AccessGate {
    pub fn new(ledger: Arc<dyn LoanLedger>) -> Self {
        Self { ledger }
    }

    pub async fn can_read(&self, user_id: &str, document_id: &str) -> bool {
        let allowed = self.ledger.has_active_loan(user_id, document_id).await;
        if !allowed {
            tracing::debug!("No active loan for user {} on document {}", user_id, document_id);
        }
        allowed
    }
}

/// Identity contract
pub trait IdentityProvider: Send + Sync {
    fn current_user_id(&self) -> Option<String>;
}

/// Fixed identity, e.g. taken from configuration
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity {
    user_id: Option<String>,
}

impl StaticIdentity {
    pub fn new(user_id: Option<String>) -> Self {
        Self { user_id }
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_user_id(&self) -> Option<String> {
        self.user_id.clone()
    }
}
