//! Debt movements paired with a wallet transaction.
//!
//! Repaying a debt takes money out of a wallet; borrowing more puts money in.
//! The debt row and the wallet transaction live in different tables, so a
//! movement runs in two phases:
//!
//! 1. write the debt's new amount and status;
//! 2. create the wallet transaction through the [`Ledger`].
//!
//! If phase 2 fails the debt row is written back exactly as it was read and
//! the phase-2 error is returned.

use crate::{
    core::{
        ledger::{Ledger, LedgerOutcome},
        repository::DebtRepository,
    },
    errors::{Error, Result},
    models::{Debt, DebtPatch, DebtStatus, NewTransaction, TransactionType},
};
use chrono::{DateTime, Utc};
use tracing::{error, info, instrument, warn};

/// What happens to the debt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovementKind {
    /// Pay part or all of the debt from a wallet (expense). Floors at zero.
    Repay,
    /// Increase the debt and receive the money into a wallet (income).
    Borrow,
}

impl MovementKind {
    const fn transaction_type(self) -> TransactionType {
        match self {
            Self::Repay => TransactionType::Expense,
            Self::Borrow => TransactionType::Income,
        }
    }
}

/// One debt movement request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebtMovement {
    /// Debt being changed
    pub debt_id: String,
    /// Repay or borrow
    pub kind: MovementKind,
    /// Magnitude in minor units
    pub amount: i64,
    /// Wallet the money leaves or enters
    pub wallet_id: String,
    /// Category for the wallet transaction
    pub category_id: Option<String>,
    /// Date of the wallet transaction
    pub date_time: DateTime<Utc>,
}

/// Both halves of a completed movement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebtMovementOutcome {
    /// The debt after phase 1
    pub debt: Debt,
    /// The wallet transaction from phase 2
    pub ledger: LedgerOutcome,
}

/// New amount and status after a movement.
fn settle(debt: &Debt, kind: MovementKind, amount: i64) -> Result<(i64, DebtStatus)> {
    match kind {
        MovementKind::Repay => {
            let remaining = debt.amount.saturating_sub(amount).max(0);
            let status = if remaining == 0 {
                DebtStatus::Paid
            } else {
                DebtStatus::Partial
            };
            Ok((remaining, status))
        }
        MovementKind::Borrow => {
            let total = debt
                .amount
                .checked_add(amount)
                .ok_or_else(|| Error::DebtOverflow {
                    debt_id: debt.id.clone(),
                })?;
            let status = match debt.status {
                DebtStatus::Paid if total > 0 => DebtStatus::Open,
                other => other,
            };
            Ok((total, status))
        }
    }
}

/// Runs debt movements against a debt repository and a ledger.
#[derive(Debug, Clone)]
pub struct DebtLedger {
    debts: DebtRepository,
    ledger: Ledger,
}

impl DebtLedger {
    /// Pairs the debt repository with the ledger that owns wallet balances.
    #[must_use]
    pub const fn new(debts: DebtRepository, ledger: Ledger) -> Self {
        Self { debts, ledger }
    }

    /// Applies `movement`. `None` if the debt does not exist.
    ///
    /// # Errors
    /// [`Error::InvalidAmount`] for a negative amount and
    /// [`Error::DebtOverflow`] if borrowing would leave the `i64` range, both
    /// before anything is written; otherwise whatever the failing phase
    /// reported, after the debt row has been restored.
    #[instrument(skip(self), fields(debt = %movement.debt_id))]
    pub async fn record_movement(&self, movement: DebtMovement) -> Result<Option<DebtMovementOutcome>> {
        if movement.amount < 0 {
            return Err(Error::InvalidAmount {
                amount: movement.amount,
            });
        }
        let Some(original) = self.debts.get_by_id(&movement.debt_id).await? else {
            return Ok(None);
        };

        let (amount, status) = settle(&original, movement.kind, movement.amount)?;
        let patch = DebtPatch {
            amount: Some(amount),
            status: Some(status),
            ..Default::default()
        };
        let Some(debt) = self.debts.update(&original.id, patch).await? else {
            return Ok(None);
        };

        let draft = NewTransaction {
            transaction_type: movement.kind.transaction_type(),
            amount: movement.amount,
            currency: original.currency.clone(),
            wallet_id: movement.wallet_id,
            to_wallet_id: None,
            category_id: movement.category_id,
            note: Some(original.counterparty.clone()),
            tags: Vec::new(),
            date_time: movement.date_time,
        };

        match self.ledger.create_transaction(draft).await {
            Ok(ledger) => {
                info!(
                    "Debt {} moved to {} ({}) via transaction {}",
                    debt.id, debt.amount, debt.status, ledger.transaction.id
                );
                Ok(Some(DebtMovementOutcome { debt, ledger }))
            }
            Err(e) => {
                warn!("Wallet transaction failed, restoring debt {}: {}", original.id, e);
                if let Err(restore_err) = self.debts.restore(&original).await {
                    error!("Failed to restore debt {}: {}", original.id, restore_err);
                }
                Err(e)
            }
        }
    }
}
