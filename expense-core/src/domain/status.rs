//! Expense approval state machine
//!
//! ```text
//!            approve
//!   pending ─────────▶ approved
//!      │  ▲
//!      │  └─ edit
//!      │     reject
//!      └─────────────▶ rejected
//! ```
//!
//! `approved` and `rejected` are terminal: every action from them fails.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::messages::{transition_message, Locale};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl ExpenseStatus {
    pub const ALL: [ExpenseStatus; 3] = [
        ExpenseStatus::Pending,
        ExpenseStatus::Approved,
        ExpenseStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenseStatus::Pending => "pending",
            ExpenseStatus::Approved => "approved",
            ExpenseStatus::Rejected => "rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, ExpenseStatus::Pending)
    }

    pub fn display_name(&self, locale: Locale) -> &'static str {
        match (locale, self) {
            (Locale::En, ExpenseStatus::Pending) => "Pending",
            (Locale::En, ExpenseStatus::Approved) => "Approved",
            (Locale::En, ExpenseStatus::Rejected) => "Rejected",
            (Locale::Ja, ExpenseStatus::Pending) => "承認待ち",
            (Locale::Ja, ExpenseStatus::Approved) => "承認済み",
            (Locale::Ja, ExpenseStatus::Rejected) => "却下済み",
        }
    }

    /// Apply an action, returning the resulting status
    pub fn apply(self, action: ExpenseAction) -> Result<ExpenseStatus, TransitionError> {
        match (self, action) {
            (ExpenseStatus::Pending, ExpenseAction::Approve) => Ok(ExpenseStatus::Approved),
            (ExpenseStatus::Pending, ExpenseAction::Reject) => Ok(ExpenseStatus::Rejected),
            (ExpenseStatus::Pending, ExpenseAction::Edit) => Ok(ExpenseStatus::Pending),
            (from, action) => Err(TransitionError { from, action }),
        }
    }

    pub fn can(&self, action: ExpenseAction) -> bool {
        self.apply(action).is_ok()
    }
}

impl fmt::Display for ExpenseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExpenseStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(ExpenseStatus::Pending),
            "approved" => Ok(ExpenseStatus::Approved),
            "rejected" => Ok(ExpenseStatus::Rejected),
            other => Err(format!("invalid expense status: {}", other)),
        }
    }
}

/// Something a caller asks to do with an expense
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseAction {
    Approve,
    Reject,
    Edit,
}

impl ExpenseAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenseAction::Approve => "approve",
            ExpenseAction::Reject => "reject",
            ExpenseAction::Edit => "edit",
        }
    }

    pub(crate) fn past_participle(&self) -> &'static str {
        match self {
            ExpenseAction::Approve => "approved",
            ExpenseAction::Reject => "rejected",
            ExpenseAction::Edit => "edited",
        }
    }
}

/// An action was attempted from a state that does not allow it
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[error("cannot {} an expense that is {}", .action.as_str(), .from)]
pub struct TransitionError {
    pub from: ExpenseStatus,
    pub action: ExpenseAction,
}

impl TransitionError {
    pub fn message(&self, locale: Locale) -> String {
        transition_message(self.from, self.action, locale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_transitions() {
        assert_eq!(
            ExpenseStatus::Pending.apply(ExpenseAction::Approve),
            Ok(ExpenseStatus::Approved)
        );
        assert_eq!(
            ExpenseStatus::Pending.apply(ExpenseAction::Reject),
            Ok(ExpenseStatus::Rejected)
        );
        assert_eq!(
            ExpenseStatus::Pending.apply(ExpenseAction::Edit),
            Ok(ExpenseStatus::Pending)
        );
    }

    #[test]
    fn test_terminal_states_reject_every_action() {
        for from in [ExpenseStatus::Approved, ExpenseStatus::Rejected] {
            assert!(from.is_terminal());
            for action in [ExpenseAction::Approve, ExpenseAction::Reject, ExpenseAction::Edit] {
                assert_eq!(from.apply(action), Err(TransitionError { from, action }));
            }
        }
    }

    #[test]
    fn test_status_parsing() {
        for status in ExpenseStatus::ALL {
            assert_eq!(status.as_str().parse::<ExpenseStatus>(), Ok(status));
        }
        assert_eq!("APPROVED".parse::<ExpenseStatus>(), Ok(ExpenseStatus::Approved));
        assert!("draft".parse::<ExpenseStatus>().is_err());
    }

    #[test]
    fn test_transition_error_display() {
        let err = ExpenseStatus::Rejected.apply(ExpenseAction::Approve).unwrap_err();
        assert_eq!(err.to_string(), "cannot approve an expense that is rejected");
        assert_eq!(
            err.message(Locale::Ja),
            "承認待ちの経費のみ承認できます（現在のステータス: 却下済み）"
        );
    }
}
