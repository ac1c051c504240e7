//! Core layer - storage-agnostic ledger logic
//!
//! Repositories own per-collection CRUD, the ledger keeps wallet balances in
//! step with transactions, and the application state mirrors everything for
//! the UI. Nothing here depends on how the host renders or schedules work.

/// Two-phase debt repayments and borrowing
pub mod debt;
/// Transaction writes with their wallet balance effects
pub mod ledger;
/// In-process stand-in for the account backend
pub mod remote;
/// Per-collection CRUD over the entity store
pub mod repository;
/// Demo dataset seeding
pub mod seed;
/// In-memory application state
pub mod state;
/// Full-snapshot pull from a remote source
pub mod sync;

pub use debt::{DebtLedger, DebtMovement, DebtMovementOutcome, MovementKind};
pub use ledger::{BalanceDrift, DanglingReference, Ledger, LedgerOutcome};
pub use remote::MockRemote;
pub use state::{AppState, Collections};
pub use sync::{Connectivity, ConnectivityFlag, RemoteSnapshot, RemoteSource, Snapshot, SyncReconciler};
