//! Application state - in-memory copies of every collection for the UI.
//!
//! Collections are refreshed in bulk from the store (`load_*`) or patched in
//! place after each successful write (`add_*`, `update_*`, `delete_*`). The
//! store stays the source of truth; nothing here writes without going
//! through a repository, the ledger or the sync reconciler.

use super::{
    debt::{DebtLedger, DebtMovement, DebtMovementOutcome},
    ledger::{Ledger, LedgerOutcome},
    repository::Repositories,
    seed,
    sync::SyncReconciler,
};
use crate::{
    errors::{Error, Result},
    models::{
        Category, CategoryPatch, Debt, DebtPatch, NewCategory, NewDebt, NewSavingsGoal,
        NewSubscription, NewTransaction, NewWallet, PreferencesPatch, SavingsGoal,
        SavingsGoalPatch, Subscription, SubscriptionPatch, Transaction, TransactionPatch,
        UserPreferences, Wallet, WalletPatch,
    },
    store::{EntityStore, Record},
};
use chrono::{DateTime, Utc};
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, instrument, trace};

/// Everything the UI renders from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Collections {
    /// Active wallets
    pub wallets: Vec<Wallet>,
    /// All transactions
    pub transactions: Vec<Transaction>,
    /// Non-archived categories
    pub categories: Vec<Category>,
    /// All debts
    pub debts: Vec<Debt>,
    /// Active subscriptions
    pub subscriptions: Vec<Subscription>,
    /// Savings goals
    pub savings_goals: Vec<SavingsGoal>,
    /// Preferences, once written
    pub preferences: Option<UserPreferences>,
}

#[derive(Debug)]
struct Services {
    store: EntityStore,
    repos: Repositories,
    ledger: Ledger,
    debt_ledger: DebtLedger,
    sync: Option<SyncReconciler>,
    seed_demo_data: bool,
}

/// Shared application state. Clones observe the same collections.
#[derive(Debug, Clone)]
pub struct AppState {
    services: Option<Arc<Services>>,
    collections: Arc<RwLock<Collections>>,
    loading: Arc<AtomicBool>,
    initialized: Arc<Mutex<bool>>,
}

/// Holds `is_loading` up until dropped.
struct LoadingFlag<'a>(&'a AtomicBool);

impl<'a> LoadingFlag<'a> {
    fn raise(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for LoadingFlag<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

fn replace_in<R: Record>(items: &mut [R], updated: &R) {
    if let Some(slot) = items.iter_mut().find(|item| item.id() == updated.id()) {
        *slot = updated.clone();
    }
}

fn remove_from<R: Record>(items: &mut Vec<R>, id: &str) {
    items.retain(|item| item.id() != id);
}

impl AppState {
    /// State backed by `store`. `sync` is optional; without it `initialize`
    /// and `sync_now` never pull.
    #[must_use]
    pub fn new(store: EntityStore, sync: Option<SyncReconciler>, seed_demo_data: bool) -> Self {
        let repos = Repositories::new(&store);
        let ledger = Ledger::new(repos.wallets.clone(), repos.transactions.clone());
        let debt_ledger = DebtLedger::new(repos.debts.clone(), ledger.clone());
        Self::with_services(Some(Arc::new(Services {
            store,
            repos,
            ledger,
            debt_ledger,
            sync,
            seed_demo_data,
        })))
    }

    /// State with no store attached, for contexts that cannot persist.
    /// Loads leave collections empty and writes fail with
    /// [`Error::StoreUnavailable`].
    #[must_use]
    pub fn detached() -> Self {
        Self::with_services(None)
    }

    fn with_services(services: Option<Arc<Services>>) -> Self {
        Self {
            services,
            collections: Arc::new(RwLock::new(Collections::default())),
            loading: Arc::new(AtomicBool::new(false)),
            initialized: Arc::new(Mutex::new(false)),
        }
    }

    fn services(&self) -> Result<&Services> {
        self.services
            .as_deref()
            .ok_or_else(|| Error::store_unavailable("no store attached to application state"))
    }

    /// A copy of every collection.
    pub async fn snapshot(&self) -> Collections {
        self.collections.read().await.clone()
    }

    /// True while `initialize` or `load_demo_data` is running.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    /// Ledger used for transaction writes, for balance audits.
    pub fn ledger(&self) -> Result<&Ledger> {
        self.services().map(|s| &s.ledger)
    }

    /// Time of the last successful sync pull.
    pub async fn last_sync_at(&self) -> Result<Option<DateTime<Utc>>> {
        match self.services.as_deref() {
            Some(services) => super::sync::last_sync_at(&services.store).await,
            None => Ok(None),
        }
    }

    // --- Startup ---

    /// Cold start: seed an empty store, load every collection, then pull
    /// from the remote when online and reload what the pull replaced.
    ///
    /// Runs once; later calls return immediately. Does nothing when no store
    /// is attached. An unavailable remote is not an error.
    #[instrument(skip(self))]
    pub async fn initialize(&self) -> Result<()> {
        let Some(services) = self.services.as_deref() else {
            debug!("No store attached, skipping initialize");
            return Ok(());
        };
        let mut initialized = self.initialized.lock().await;
        if *initialized {
            debug!("Application state already initialized");
            return Ok(());
        }
        let _loading = LoadingFlag::raise(&self.loading);

        if services.seed_demo_data && seed::seed_database(&services.store).await?.is_some() {
            info!("Empty store seeded with demo data");
        }
        self.load_all().await?;

        if let Some(sync) = &services.sync {
            if sync.pull().await?.is_some() {
                self.load_core().await?;
            }
        }

        *initialized = true;
        let collections = self.collections.read().await;
        info!(
            "Application state ready: {} wallets, {} transactions, {} categories, {} debts",
            collections.wallets.len(),
            collections.transactions.len(),
            collections.categories.len(),
            collections.debts.len()
        );
        Ok(())
    }

    /// Replaces wallets, categories, transactions and debts with the demo
    /// dataset and reloads every collection.
    #[instrument(skip(self))]
    pub async fn load_demo_data(&self) -> Result<()> {
        let services = self.services()?;
        let _loading = LoadingFlag::raise(&self.loading);
        seed::load_demo_data(&services.store).await?;
        self.load_all().await
    }

    /// Pulls from the remote now (for example on reconnect). Returns whether
    /// local data was replaced; see [`SyncReconciler::pull`] for what that
    /// discards.
    pub async fn sync_now(&self) -> Result<bool> {
        let services = self.services()?;
        let Some(sync) = &services.sync else {
            debug!("No remote configured");
            return Ok(false);
        };
        if sync.pull().await?.is_none() {
            return Ok(false);
        }
        self.load_core().await?;
        Ok(true)
    }

    async fn load_core(&self) -> Result<()> {
        self.load_wallets().await?;
        self.load_transactions().await?;
        self.load_categories().await?;
        self.load_debts().await
    }

    async fn load_all(&self) -> Result<()> {
        self.load_core().await?;
        self.load_subscriptions().await?;
        self.load_savings_goals().await?;
        self.load_preferences().await
    }

    // --- Wallets ---

    /// Reloads active wallets from the store.
    pub async fn load_wallets(&self) -> Result<()> {
        let Some(services) = self.services.as_deref() else {
            return Ok(());
        };
        let wallets = services.repos.wallets.get_all().await?;
        trace!("Loaded {} wallets", wallets.len());
        self.collections.write().await.wallets = wallets;
        Ok(())
    }

    /// Creates a wallet and appends it to the list.
    pub async fn add_wallet(&self, draft: NewWallet) -> Result<Wallet> {
        let wallet = self.services()?.repos.wallets.create(draft).await?;
        self.collections.write().await.wallets.push(wallet.clone());
        Ok(wallet)
    }

    /// Updates a wallet. The list is untouched when the id is unknown.
    pub async fn update_wallet(&self, id: &str, patch: WalletPatch) -> Result<Option<Wallet>> {
        let updated = self.services()?.repos.wallets.update(id, patch).await?;
        if let Some(wallet) = &updated {
            replace_in(&mut self.collections.write().await.wallets, wallet);
        }
        Ok(updated)
    }

    /// Deactivates a wallet and drops it from the list.
    pub async fn delete_wallet(&self, id: &str) -> Result<bool> {
        let deleted = self.services()?.repos.wallets.delete(id).await?;
        remove_from(&mut self.collections.write().await.wallets, id);
        Ok(deleted)
    }

    // --- Transactions ---

    /// Reloads every transaction from the store.
    pub async fn load_transactions(&self) -> Result<()> {
        let Some(services) = self.services.as_deref() else {
            return Ok(());
        };
        let transactions = services.repos.transactions.get_all().await?;
        trace!("Loaded {} transactions", transactions.len());
        self.collections.write().await.transactions = transactions;
        Ok(())
    }

    /// Records a transaction with its balance effect, then refreshes wallets.
    pub async fn add_transaction(&self, draft: NewTransaction) -> Result<LedgerOutcome> {
        let outcome = self.services()?.ledger.create_transaction(draft).await?;
        self.load_wallets().await?;
        self.collections
            .write()
            .await
            .transactions
            .push(outcome.transaction.clone());
        Ok(outcome)
    }

    /// Edits a transaction and moves its balance effect, then refreshes wallets.
    pub async fn update_transaction(
        &self,
        id: &str,
        patch: TransactionPatch,
    ) -> Result<Option<LedgerOutcome>> {
        let outcome = self.services()?.ledger.update_transaction(id, patch).await?;
        if let Some(outcome) = &outcome {
            replace_in(
                &mut self.collections.write().await.transactions,
                &outcome.transaction,
            );
            self.load_wallets().await?;
        }
        Ok(outcome)
    }

    /// Deletes a transaction and reverses its balance effect.
    pub async fn delete_transaction(&self, id: &str) -> Result<Option<LedgerOutcome>> {
        let outcome = self.services()?.ledger.delete_transaction(id).await?;
        if outcome.is_some() {
            self.load_wallets().await?;
        }
        remove_from(&mut self.collections.write().await.transactions, id);
        Ok(outcome)
    }

    // --- Categories ---

    /// Writes the starter categories into an empty table, then reloads.
    pub async fn load_categories(&self) -> Result<()> {
        let Some(services) = self.services.as_deref() else {
            return Ok(());
        };
        services.repos.categories.initialize_defaults().await?;
        let categories = services.repos.categories.get_all().await?;
        trace!("Loaded {} categories", categories.len());
        self.collections.write().await.categories = categories;
        Ok(())
    }

    /// Creates a category and appends it to the list.
    pub async fn add_category(&self, draft: NewCategory) -> Result<Category> {
        let category = self.services()?.repos.categories.create(draft).await?;
        self.collections.write().await.categories.push(category.clone());
        Ok(category)
    }

    /// Updates a category. The list is untouched when the id is unknown.
    pub async fn update_category(&self, id: &str, patch: CategoryPatch) -> Result<Option<Category>> {
        let updated = self.services()?.repos.categories.update(id, patch).await?;
        if let Some(category) = &updated {
            replace_in(&mut self.collections.write().await.categories, category);
        }
        Ok(updated)
    }

    /// Archives a category and drops it from the list.
    pub async fn archive_category(&self, id: &str) -> Result<Option<Category>> {
        let archived = self.services()?.repos.categories.archive(id).await?;
        if archived.is_some() {
            remove_from(&mut self.collections.write().await.categories, id);
        }
        Ok(archived)
    }

    // --- Debts ---

    /// Reloads every debt from the store.
    pub async fn load_debts(&self) -> Result<()> {
        let Some(services) = self.services.as_deref() else {
            return Ok(());
        };
        let debts = services.repos.debts.get_all().await?;
        self.collections.write().await.debts = debts;
        Ok(())
    }

    /// Creates a debt and appends it to the list.
    pub async fn add_debt(&self, draft: NewDebt) -> Result<Debt> {
        let debt = self.services()?.repos.debts.create(draft).await?;
        self.collections.write().await.debts.push(debt.clone());
        Ok(debt)
    }

    /// Updates a debt. The list is untouched when the id is unknown.
    pub async fn update_debt(&self, id: &str, patch: DebtPatch) -> Result<Option<Debt>> {
        let updated = self.services()?.repos.debts.update(id, patch).await?;
        if let Some(debt) = &updated {
            replace_in(&mut self.collections.write().await.debts, debt);
        }
        Ok(updated)
    }

    /// Deletes a debt and drops it from the list.
    pub async fn delete_debt(&self, id: &str) -> Result<bool> {
        let deleted = self.services()?.repos.debts.delete(id).await?;
        remove_from(&mut self.collections.write().await.debts, id);
        Ok(deleted)
    }

    /// Repays or borrows against a debt through a wallet, then refreshes
    /// debts, transactions and wallets.
    pub async fn record_debt_movement(
        &self,
        movement: DebtMovement,
    ) -> Result<Option<DebtMovementOutcome>> {
        let outcome = self.services()?.debt_ledger.record_movement(movement).await?;
        if outcome.is_some() {
            self.load_debts().await?;
            self.load_transactions().await?;
            self.load_wallets().await?;
        }
        Ok(outcome)
    }

    // --- Subscriptions ---

    /// Reloads active subscriptions from the store.
    pub async fn load_subscriptions(&self) -> Result<()> {
        let Some(services) = self.services.as_deref() else {
            return Ok(());
        };
        let subscriptions = services.repos.subscriptions.get_all().await?;
        self.collections.write().await.subscriptions = subscriptions;
        Ok(())
    }

    /// Creates a subscription and appends it to the list.
    pub async fn add_subscription(&self, draft: NewSubscription) -> Result<Subscription> {
        let subscription = self.services()?.repos.subscriptions.create(draft).await?;
        self.collections
            .write()
            .await
            .subscriptions
            .push(subscription.clone());
        Ok(subscription)
    }

    /// Updates a subscription. The list is untouched when the id is unknown.
    pub async fn update_subscription(
        &self,
        id: &str,
        patch: SubscriptionPatch,
    ) -> Result<Option<Subscription>> {
        let updated = self.services()?.repos.subscriptions.update(id, patch).await?;
        if let Some(subscription) = &updated {
            replace_in(&mut self.collections.write().await.subscriptions, subscription);
        }
        Ok(updated)
    }

    // --- Savings goals ---

    /// Reloads savings goals from the store.
    pub async fn load_savings_goals(&self) -> Result<()> {
        let Some(services) = self.services.as_deref() else {
            return Ok(());
        };
        let goals = services.repos.savings_goals.get_all().await?;
        self.collections.write().await.savings_goals = goals;
        Ok(())
    }

    /// Creates a savings goal and appends it to the list.
    pub async fn add_savings_goal(&self, draft: NewSavingsGoal) -> Result<SavingsGoal> {
        let goal = self.services()?.repos.savings_goals.create(draft).await?;
        self.collections.write().await.savings_goals.push(goal.clone());
        Ok(goal)
    }

    /// Updates a savings goal. The list is untouched when the id is unknown.
    pub async fn update_savings_goal(
        &self,
        id: &str,
        patch: SavingsGoalPatch,
    ) -> Result<Option<SavingsGoal>> {
        let updated = self.services()?.repos.savings_goals.update(id, patch).await?;
        if let Some(goal) = &updated {
            replace_in(&mut self.collections.write().await.savings_goals, goal);
        }
        Ok(updated)
    }

    // --- Preferences ---

    /// Reloads the preferences singleton.
    pub async fn load_preferences(&self) -> Result<()> {
        let Some(services) = self.services.as_deref() else {
            return Ok(());
        };
        let prefs = services.repos.preferences.get().await?;
        self.collections.write().await.preferences = prefs;
        Ok(())
    }

    /// Merges `patch` into the stored preferences and mirrors the result.
    /// `None` (and no cached preferences) if they were never written.
    pub async fn update_preferences(&self, patch: PreferencesPatch) -> Result<Option<UserPreferences>> {
        let updated = self.services()?.repos.preferences.update(patch).await?;
        self.collections.write().await.preferences = updated.clone();
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{
        core::{
            debt::MovementKind,
            remote::MockRemote,
            sync::ConnectivityFlag,
        },
        models::{
            DebtDirection, DebtStatus, NewPreferences, RecurrenceFrequency, Theme, TransactionType,
        },
        test_utils::{
            date, init_test_tracing, new_category, new_debt, new_transaction, new_wallet,
            setup_test_store,
        },
    };
    use std::time::Duration;

    fn offline_state(store: &EntityStore) -> AppState {
        AppState::new(store.clone(), None, false)
    }

    fn synced_state(store: &EntityStore, online: bool, seed_demo_data: bool) -> AppState {
        let sync = SyncReconciler::new(
            store.clone(),
            Arc::new(MockRemote::new(Duration::ZERO)),
            Arc::new(ConnectivityFlag::new(online)),
        );
        AppState::new(store.clone(), Some(sync), seed_demo_data)
    }

    #[tokio::test]
    async fn test_initialize_seeds_empty_store_once() -> Result<()> {
        init_test_tracing();
        let store = setup_test_store().await?;
        let state = synced_state(&store, false, true);

        state.initialize().await?;
        let first = state.snapshot().await;
        assert_eq!(first.wallets.len(), 3);
        assert_eq!(first.transactions.len(), 29);
        assert_eq!(first.categories.len(), 6);
        assert_eq!(first.debts.len(), 4);
        assert!(!state.is_loading());

        // A second call, and a fresh state over the same store, both leave data alone.
        state.initialize().await?;
        let again = synced_state(&store, false, true);
        again.initialize().await?;
        assert_eq!(store.count::<Wallet>().await?, 3);
        assert_eq!(again.snapshot().await.wallets, first.wallets);
        Ok(())
    }

    #[tokio::test]
    async fn test_initialize_online_pull_overwrites_seed() -> Result<()> {
        init_test_tracing();
        let store = setup_test_store().await?;
        let state = synced_state(&store, true, true);

        state.initialize().await?;

        let collections = state.snapshot().await;
        assert_eq!(collections.transactions.len(), 5);
        assert_eq!(collections.debts.len(), 2);
        assert_eq!(store.count::<Debt>().await?, 2);
        assert!(state.last_sync_at().await?.is_some());
        Ok(())
    }

    #[tokio::test]
    async fn test_initialize_without_seed_loads_starter_categories() -> Result<()> {
        let store = setup_test_store().await?;
        let state = offline_state(&store);

        state.initialize().await?;

        let collections = state.snapshot().await;
        assert!(collections.wallets.is_empty());
        assert_eq!(collections.categories.len(), 16);
        assert_eq!(collections.preferences, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_detached_state() -> Result<()> {
        let state = AppState::detached();

        state.initialize().await?;
        state.load_wallets().await?;
        assert_eq!(state.snapshot().await, Collections::default());
        assert!(state.last_sync_at().await?.is_none());

        let err = state.add_wallet(new_wallet("Cash", 10)).await.unwrap_err();
        assert!(matches!(err, Error::StoreUnavailable { .. }));
        assert!(matches!(
            state.sync_now().await.unwrap_err(),
            Error::StoreUnavailable { .. }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_transaction_writes_refresh_wallets() -> Result<()> {
        let store = setup_test_store().await?;
        let state = offline_state(&store);
        let wallet = state.add_wallet(new_wallet("Card", 1_000_000)).await?;

        let outcome = state
            .add_transaction(new_transaction(TransactionType::Expense, 200_000, &wallet.id))
            .await?;
        assert_eq!(state.snapshot().await.wallets[0].current_balance, 800_000);

        state
            .update_transaction(
                &outcome.transaction.id,
                TransactionPatch {
                    amount: Some(50_000),
                    ..Default::default()
                },
            )
            .await?;
        let collections = state.snapshot().await;
        assert_eq!(collections.wallets[0].current_balance, 950_000);
        assert_eq!(collections.transactions[0].amount, 50_000);

        state.delete_transaction(&outcome.transaction.id).await?;
        let collections = state.snapshot().await;
        assert_eq!(collections.wallets[0].current_balance, 1_000_000);
        assert!(collections.transactions.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_ids_leave_lists_untouched() -> Result<()> {
        let store = setup_test_store().await?;
        let state = offline_state(&store);
        state.add_wallet(new_wallet("Card", 100)).await?;
        let before = state.snapshot().await;

        let patch = WalletPatch {
            name: Some("Renamed".to_string()),
            ..Default::default()
        };
        assert!(state.update_wallet("missing", patch).await?.is_none());
        assert!(state.archive_category("missing").await?.is_none());
        assert!(
            state
                .update_transaction("missing", TransactionPatch::default())
                .await?
                .is_none()
        );
        assert_eq!(state.snapshot().await, before);
        Ok(())
    }

    #[tokio::test]
    async fn test_category_and_debt_patches() -> Result<()> {
        let store = setup_test_store().await?;
        let state = offline_state(&store);
        let books = state.add_category(new_category("Books")).await?;
        let debt = state
            .add_debt(new_debt("Aziz", 100_000, DebtDirection::IOwe))
            .await?;

        state
            .update_category(
                &books.id,
                CategoryPatch {
                    name: Some("Reading".to_string()),
                    ..Default::default()
                },
            )
            .await?;
        assert_eq!(state.snapshot().await.categories[0].name, "Reading");

        state.archive_category(&books.id).await?;
        assert!(state.snapshot().await.categories.is_empty());
        assert!(store.get::<Category>(&books.id).await?.unwrap().archived);

        assert!(state.delete_debt(&debt.id).await?);
        assert!(state.snapshot().await.debts.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_subscriptions_goals_and_preferences() -> Result<()> {
        let store = setup_test_store().await?;
        let state = offline_state(&store);
        let wallet = state.add_wallet(new_wallet("Card", 0)).await?;

        let sub = state
            .add_subscription(NewSubscription {
                name: "Music".to_string(),
                amount: 50_000,
                currency: "UZS".to_string(),
                wallet_id: wallet.id.clone(),
                category_id: None,
                frequency: RecurrenceFrequency::Monthly,
                next_run_at: date(2026, 2, 1),
                active: true,
            })
            .await?;
        state
            .update_subscription(
                &sub.id,
                SubscriptionPatch {
                    amount: Some(60_000),
                    ..Default::default()
                },
            )
            .await?;
        assert_eq!(state.snapshot().await.subscriptions[0].amount, 60_000);

        let goal = state
            .add_savings_goal(NewSavingsGoal {
                name: "Laptop".to_string(),
                target_amount: 10_000_000,
                currency: "UZS".to_string(),
                current_amount: 0,
                target_date: None,
                linked_savings_wallet_id: None,
            })
            .await?;
        state
            .update_savings_goal(
                &goal.id,
                SavingsGoalPatch {
                    current_amount: Some(2_500_000),
                    ..Default::default()
                },
            )
            .await?;
        assert_eq!(state.snapshot().await.savings_goals[0].current_amount, 2_500_000);

        let theme = PreferencesPatch {
            theme: Some(Theme::Light),
            ..Default::default()
        };
        assert!(state.update_preferences(theme.clone()).await?.is_none());
        Repositories::new(&store)
            .preferences
            .create(NewPreferences::default())
            .await?;
        state.update_preferences(theme).await?;
        assert_eq!(
            state.snapshot().await.preferences.map(|p| p.theme),
            Some(Theme::Light)
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_record_debt_movement_refreshes_collections() -> Result<()> {
        let store = setup_test_store().await?;
        let state = offline_state(&store);
        let wallet = state.add_wallet(new_wallet("Card", 1_000_000)).await?;
        let debt = state
            .add_debt(new_debt("Bank", 400_000, DebtDirection::IOwe))
            .await?;

        state
            .record_debt_movement(DebtMovement {
                debt_id: debt.id.clone(),
                kind: MovementKind::Repay,
                amount: 150_000,
                wallet_id: wallet.id.clone(),
                category_id: None,
                date_time: date(2026, 1, 15),
            })
            .await?
            .unwrap();

        let collections = state.snapshot().await;
        assert_eq!(collections.debts[0].amount, 250_000);
        assert_eq!(collections.debts[0].status, DebtStatus::Partial);
        assert_eq!(collections.transactions.len(), 1);
        assert_eq!(collections.wallets[0].current_balance, 850_000);
        Ok(())
    }

    #[tokio::test]
    async fn test_load_demo_data_and_sync_now() -> Result<()> {
        let store = setup_test_store().await?;
        let state = synced_state(&store, true, false);
        state.add_wallet(new_wallet("Mine", 1)).await?;

        state.load_demo_data().await?;
        let collections = state.snapshot().await;
        assert_eq!(collections.wallets.len(), 3);
        assert_eq!(collections.transactions.len(), 29);
        assert!(state.ledger()?.audit().await?.is_empty());

        assert!(state.sync_now().await?);
        assert_eq!(state.snapshot().await.transactions.len(), 5);
        assert!(state.ledger()?.audit().await?.is_empty());
        Ok(())
    }
}
