//! Distributed-transaction instructions.
//!
//! Instructions are declared during the request and run by the platform
//! once the overall outcome is known: `commit` only on success, `rollback`
//! only on failure, `complete` in either case.

use std::fmt;

use serde::{Deserialize, Serialize};

use relay_core::{ParamValue, ServiceOrigin};

/// When the platform runs an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// On overall success.
    Commit,
    /// On overall failure.
    Rollback,
    /// Always.
    Complete,
}

impl TransactionKind {
    /// The canonical kind name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Commit => "commit",
            Self::Rollback => "rollback",
            Self::Complete => "complete",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A declared transaction instruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// When to run.
    pub kind: TransactionKind,
    /// Service that declared the instruction; the action runs there.
    pub origin: ServiceOrigin,
    /// Action that declared the instruction.
    pub caller: String,
    /// Action to run.
    pub action: String,
    /// Arguments of the action.
    #[serde(default)]
    pub params: Vec<ParamValue>,
}

/// Ordered list of transaction instructions.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransportTransactions {
    transactions: Vec<Transaction>,
}

impl TransportTransactions {
    /// Append an instruction.
    pub fn push(&mut self, transaction: Transaction) {
        self.transactions.push(transaction);
    }

    /// Instructions, optionally only those declared by `service`.
    pub fn filter(&self, service: Option<&str>) -> Vec<&Transaction> {
        self.transactions
            .iter()
            .filter(|t| service.map_or(true, |s| t.origin.name() == s))
            .collect()
    }

    /// Instructions of one kind, in declaration order.
    pub fn of_kind(&self, kind: TransactionKind) -> Vec<&Transaction> {
        self.transactions.iter().filter(|t| t.kind == kind).collect()
    }

    /// Whether any instruction is declared.
    pub fn has(&self) -> bool {
        !self.transactions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn declare(kind: TransactionKind, action: &str) -> Transaction {
        Transaction {
            kind,
            origin: ServiceOrigin::new("users", "1.0.0"),
            caller: "create".to_string(),
            action: action.to_string(),
            params: Vec::new(),
        }
    }

    #[test]
    fn keeps_declaration_order() {
        let mut txs = TransportTransactions::default();
        txs.push(declare(TransactionKind::Commit, "save"));
        txs.push(declare(TransactionKind::Rollback, "undo"));
        txs.push(declare(TransactionKind::Commit, "notify"));

        let commits: Vec<&str> = txs
            .of_kind(TransactionKind::Commit)
            .iter()
            .map(|t| t.action.as_str())
            .collect();
        assert_eq!(commits, ["save", "notify"]);
        assert_eq!(txs.filter(Some("users")).len(), 3);
        assert!(txs.filter(Some("posts")).is_empty());
    }

    #[test]
    fn kind_names() {
        assert_eq!(TransactionKind::Complete.to_string(), "complete");
        assert_eq!(
            serde_json::to_string(&TransactionKind::Rollback).unwrap(),
            "\"rollback\""
        );
    }
}
