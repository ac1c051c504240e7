//! Domain types shared by the repositories, the ledger and the state cache.
//!
//! These carry native `DateTime<Utc>` values. How they are laid out on disk is
//! the store's business (see [`crate::store`]). Amounts are `i64` minor units.

use crate::errors::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Declares a closed set of string-tagged values: serde spelling, `as_str`,
/// `Display` and `FromStr` all agree on the same literal.
macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $field:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $text)] $variant ),+
        }

        impl $name {
            /// Wire and storage spelling of this value.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $( Self::$variant => $text ),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                match s {
                    $( $text => Ok(Self::$variant), )+
                    other => Err(Error::InvalidEnumValue {
                        field: $field,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

text_enum! {
    /// Physical kind of a wallet
    WalletKind, "wallet.kind" {
        /// Banknotes and coins
        Cash => "cash",
        /// Debit or credit card account
        Card => "card",
        /// Savings account
        Savings => "savings",
        /// Anything else
        Other => "other",
    }
}

text_enum! {
    /// Display group a wallet is listed under
    WalletGroup, "wallet.group" {
        /// Everyday accounts
        Accounts => "accounts",
        /// Savings pots
        Savings => "savings",
    }
}

text_enum! {
    /// Direction of a transaction's balance effect
    TransactionType, "transaction.type" {
        /// Money leaving a wallet
        Expense => "expense",
        /// Money entering a wallet
        Income => "income",
        /// Money moving between two wallets
        Transfer => "transfer",
    }
}

text_enum! {
    /// Which transaction types a category applies to
    CategoryType, "category.type" {
        /// Expense categories
        Expense => "expense",
        /// Income categories
        Income => "income",
        /// Usable for both
        Both => "both",
    }
}

text_enum! {
    /// Who owes whom
    DebtDirection, "debt.direction" {
        /// The user owes the counterparty
        IOwe => "I_OWE",
        /// The counterparty owes the user
        ImOwed => "IM_OWED",
    }
}

text_enum! {
    /// Settlement state of a debt
    DebtStatus, "debt.status" {
        /// Nothing repaid yet
        Open => "open",
        /// Fully settled
        Paid => "paid",
        /// Partially repaid
        Partial => "partial",
    }
}

text_enum! {
    /// How often a subscription recurs
    RecurrenceFrequency, "subscription.frequency" {
        /// Every day
        Daily => "daily",
        /// Every week
        Weekly => "weekly",
        /// Every month
        Monthly => "monthly",
        /// Every year
        Yearly => "yearly",
    }
}

text_enum! {
    /// Calendar used for date display
    CalendarType, "preferences.calendar_type" {
        /// Gregorian calendar
        Gregorian => "gregorian",
        /// Islamic lunar calendar
        Hijri => "hijri",
        /// Persian solar calendar
        Jalali => "jalali",
    }
}

text_enum! {
    /// Clock style for time display
    TimeFormat, "preferences.time_format" {
        /// 12-hour clock
        H12 => "12h",
        /// 24-hour clock
        H24 => "24h",
    }
}

text_enum! {
    /// Colour theme
    Theme, "preferences.theme" {
        /// Dark theme
        Dark => "dark",
        /// Light theme
        Light => "light",
    }
}

/// A named money container with a running balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    /// Opaque unique id
    pub id: String,
    /// Display name
    pub name: String,
    /// ISO currency code
    pub currency: String,
    /// Physical kind
    pub kind: WalletKind,
    /// Balance before any transaction
    pub initial_balance: i64,
    /// Initial balance plus the net effect of every transaction touching this wallet
    pub current_balance: i64,
    /// Icon name
    pub icon: Option<String>,
    /// Display colour
    pub color: Option<String>,
    /// Display group
    pub group: Option<WalletGroup>,
    /// Sort position
    pub order: Option<i32>,
    /// False once soft-deleted
    pub active: bool,
    /// Set by the repository on create
    pub created_at: DateTime<Utc>,
    /// Set by the repository on every write
    pub updated_at: DateTime<Utc>,
}

/// A spending or earning category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Opaque unique id
    pub id: String,
    /// Display name
    pub name: String,
    /// Applicable transaction types
    pub category_type: CategoryType,
    /// Icon name
    pub icon: Option<String>,
    /// Display colour
    pub color: Option<String>,
    /// Soft-delete flag
    pub archived: bool,
    /// Sort position
    pub order: Option<i32>,
    /// Set by the repository on create
    pub created_at: DateTime<Utc>,
    /// Set by the repository on every write
    pub updated_at: DateTime<Utc>,
}

/// An income, expense or transfer event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Opaque unique id
    pub id: String,
    /// Balance-effect direction
    pub transaction_type: TransactionType,
    /// Non-negative magnitude in minor units
    pub amount: i64,
    /// ISO currency code
    pub currency: String,
    /// Source wallet
    pub wallet_id: String,
    /// Destination wallet, transfers only
    pub to_wallet_id: Option<String>,
    /// Optional category
    pub category_id: Option<String>,
    /// Free-form note
    pub note: Option<String>,
    /// Free-form labels
    pub tags: Vec<String>,
    /// User-assigned date of the event
    pub date_time: DateTime<Utc>,
    /// Set by the repository on create
    pub created_at: DateTime<Utc>,
    /// Set by the repository on every write
    pub updated_at: DateTime<Utc>,
}

/// An amount owed to or by a third party.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Debt {
    /// Opaque unique id
    pub id: String,
    /// Person or organisation on the other side
    pub counterparty: String,
    /// Outstanding magnitude in minor units, never negative
    pub amount: i64,
    /// ISO currency code
    pub currency: String,
    /// Who owes whom
    pub direction: DebtDirection,
    /// Optional due date
    pub due_date: Option<DateTime<Utc>>,
    /// Free-form note
    pub note: Option<String>,
    /// Settlement state
    pub status: DebtStatus,
    /// Set by the repository on create
    pub created_at: DateTime<Utc>,
    /// Set by the repository on every write
    pub updated_at: DateTime<Utc>,
}

/// A recurring payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    /// Opaque unique id
    pub id: String,
    /// Display name
    pub name: String,
    /// Amount per run in minor units
    pub amount: i64,
    /// ISO currency code
    pub currency: String,
    /// Wallet charged on each run
    pub wallet_id: String,
    /// Optional category
    pub category_id: Option<String>,
    /// Recurrence
    pub frequency: RecurrenceFrequency,
    /// Next scheduled run
    pub next_run_at: DateTime<Utc>,
    /// Soft-delete flag
    pub active: bool,
    /// Set by the repository on create
    pub created_at: DateTime<Utc>,
    /// Set by the repository on every write
    pub updated_at: DateTime<Utc>,
}

/// A savings target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavingsGoal {
    /// Opaque unique id
    pub id: String,
    /// Display name
    pub name: String,
    /// Target in minor units
    pub target_amount: i64,
    /// ISO currency code
    pub currency: String,
    /// Saved so far in minor units
    pub current_amount: i64,
    /// Optional deadline
    pub target_date: Option<DateTime<Utc>>,
    /// Savings wallet backing this goal
    pub linked_savings_wallet_id: Option<String>,
    /// Set by the repository on create
    pub created_at: DateTime<Utc>,
    /// Set by the repository on every write
    pub updated_at: DateTime<Utc>,
}

/// Singleton display preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPreferences {
    /// Always [`UserPreferences::SINGLETON_ID`]
    pub id: String,
    /// Currency used for totals
    pub base_currency: String,
    /// Calendar for date display
    pub calendar_type: CalendarType,
    /// Clock style
    pub time_format: TimeFormat,
    /// Colour theme
    pub theme: Theme,
    /// Set by the repository on create
    pub created_at: DateTime<Utc>,
    /// Set by the repository on every write
    pub updated_at: DateTime<Utc>,
}

impl UserPreferences {
    /// Id of the one preferences row.
    pub const SINGLETON_ID: &'static str = "default";
}

/// Wallet fields supplied by callers on create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWallet {
    pub name: String,
    pub currency: String,
    pub kind: WalletKind,
    pub initial_balance: i64,
    pub current_balance: i64,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub group: Option<WalletGroup>,
    pub order: Option<i32>,
    pub active: bool,
}

/// Category fields supplied by callers on create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCategory {
    pub name: String,
    pub category_type: CategoryType,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub archived: bool,
    pub order: Option<i32>,
}

/// Transaction fields supplied by callers on create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    pub transaction_type: TransactionType,
    pub amount: i64,
    pub currency: String,
    pub wallet_id: String,
    pub to_wallet_id: Option<String>,
    pub category_id: Option<String>,
    pub note: Option<String>,
    pub tags: Vec<String>,
    pub date_time: DateTime<Utc>,
}

/// Debt fields supplied by callers on create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDebt {
    pub counterparty: String,
    pub amount: i64,
    pub currency: String,
    pub direction: DebtDirection,
    pub due_date: Option<DateTime<Utc>>,
    pub note: Option<String>,
    pub status: DebtStatus,
}

/// Subscription fields supplied by callers on create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubscription {
    pub name: String,
    pub amount: i64,
    pub currency: String,
    pub wallet_id: String,
    pub category_id: Option<String>,
    pub frequency: RecurrenceFrequency,
    pub next_run_at: DateTime<Utc>,
    pub active: bool,
}

/// Savings goal fields supplied by callers on create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSavingsGoal {
    pub name: String,
    pub target_amount: i64,
    pub currency: String,
    pub current_amount: i64,
    pub target_date: Option<DateTime<Utc>>,
    pub linked_savings_wallet_id: Option<String>,
}

/// Preference fields supplied by callers on create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPreferences {
    pub base_currency: String,
    pub calendar_type: CalendarType,
    pub time_format: TimeFormat,
    pub theme: Theme,
}

impl Default for NewPreferences {
    fn default() -> Self {
        Self {
            base_currency: "UZS".to_string(),
            calendar_type: CalendarType::Gregorian,
            time_format: TimeFormat::H24,
            theme: Theme::Dark,
        }
    }
}

// Patches: `None` leaves a field untouched. Nullable fields use a nested
// `Option`, where `Some(None)` clears the value.

/// Partial wallet update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalletPatch {
    pub name: Option<String>,
    pub currency: Option<String>,
    pub kind: Option<WalletKind>,
    pub initial_balance: Option<i64>,
    pub current_balance: Option<i64>,
    pub icon: Option<Option<String>>,
    pub color: Option<Option<String>>,
    pub group: Option<Option<WalletGroup>>,
    pub order: Option<Option<i32>>,
    pub active: Option<bool>,
}

impl WalletPatch {
    /// Shallow-merges this patch into `wallet`.
    pub fn apply(self, wallet: &mut Wallet) {
        if let Some(v) = self.name {
            wallet.name = v;
        }
        if let Some(v) = self.currency {
            wallet.currency = v;
        }
        if let Some(v) = self.kind {
            wallet.kind = v;
        }
        if let Some(v) = self.initial_balance {
            wallet.initial_balance = v;
        }
        if let Some(v) = self.current_balance {
            wallet.current_balance = v;
        }
        if let Some(v) = self.icon {
            wallet.icon = v;
        }
        if let Some(v) = self.color {
            wallet.color = v;
        }
        if let Some(v) = self.group {
            wallet.group = v;
        }
        if let Some(v) = self.order {
            wallet.order = v;
        }
        if let Some(v) = self.active {
            wallet.active = v;
        }
    }
}

/// Partial category update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub category_type: Option<CategoryType>,
    pub icon: Option<Option<String>>,
    pub color: Option<Option<String>>,
    pub archived: Option<bool>,
    pub order: Option<Option<i32>>,
}

impl CategoryPatch {
    /// Shallow-merges this patch into `category`.
    pub fn apply(self, category: &mut Category) {
        if let Some(v) = self.name {
            category.name = v;
        }
        if let Some(v) = self.category_type {
            category.category_type = v;
        }
        if let Some(v) = self.icon {
            category.icon = v;
        }
        if let Some(v) = self.color {
            category.color = v;
        }
        if let Some(v) = self.archived {
            category.archived = v;
        }
        if let Some(v) = self.order {
            category.order = v;
        }
    }
}

/// Partial transaction update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionPatch {
    pub transaction_type: Option<TransactionType>,
    pub amount: Option<i64>,
    pub currency: Option<String>,
    pub wallet_id: Option<String>,
    pub to_wallet_id: Option<Option<String>>,
    pub category_id: Option<Option<String>>,
    pub note: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
    pub date_time: Option<DateTime<Utc>>,
}

impl TransactionPatch {
    /// Shallow-merges this patch into `transaction`. Only transfers keep a
    /// destination wallet.
    pub fn apply(self, transaction: &mut Transaction) {
        if let Some(v) = self.transaction_type {
            transaction.transaction_type = v;
        }
        if let Some(v) = self.amount {
            transaction.amount = v;
        }
        if let Some(v) = self.currency {
            transaction.currency = v;
        }
        if let Some(v) = self.wallet_id {
            transaction.wallet_id = v;
        }
        if let Some(v) = self.to_wallet_id {
            transaction.to_wallet_id = v;
        }
        if let Some(v) = self.category_id {
            transaction.category_id = v;
        }
        if let Some(v) = self.note {
            transaction.note = v;
        }
        if let Some(v) = self.tags {
            transaction.tags = v;
        }
        if let Some(v) = self.date_time {
            transaction.date_time = v;
        }
        if transaction.transaction_type != TransactionType::Transfer {
            transaction.to_wallet_id = None;
        }
    }
}

/// Partial debt update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DebtPatch {
    pub counterparty: Option<String>,
    pub amount: Option<i64>,
    pub currency: Option<String>,
    pub direction: Option<DebtDirection>,
    pub due_date: Option<Option<DateTime<Utc>>>,
    pub note: Option<Option<String>>,
    pub status: Option<DebtStatus>,
}

impl DebtPatch {
    /// Shallow-merges this patch into `debt`.
    pub fn apply(self, debt: &mut Debt) {
        if let Some(v) = self.counterparty {
            debt.counterparty = v;
        }
        if let Some(v) = self.amount {
            debt.amount = v;
        }
        if let Some(v) = self.currency {
            debt.currency = v;
        }
        if let Some(v) = self.direction {
            debt.direction = v;
        }
        if let Some(v) = self.due_date {
            debt.due_date = v;
        }
        if let Some(v) = self.note {
            debt.note = v;
        }
        if let Some(v) = self.status {
            debt.status = v;
        }
    }
}

/// Partial subscription update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionPatch {
    pub name: Option<String>,
    pub amount: Option<i64>,
    pub currency: Option<String>,
    pub wallet_id: Option<String>,
    pub category_id: Option<Option<String>>,
    pub frequency: Option<RecurrenceFrequency>,
    pub next_run_at: Option<DateTime<Utc>>,
    pub active: Option<bool>,
}

impl SubscriptionPatch {
    /// Shallow-merges this patch into `subscription`.
    pub fn apply(self, subscription: &mut Subscription) {
        if let Some(v) = self.name {
            subscription.name = v;
        }
        if let Some(v) = self.amount {
            subscription.amount = v;
        }
        if let Some(v) = self.currency {
            subscription.currency = v;
        }
        if let Some(v) = self.wallet_id {
            subscription.wallet_id = v;
        }
        if let Some(v) = self.category_id {
            subscription.category_id = v;
        }
        if let Some(v) = self.frequency {
            subscription.frequency = v;
        }
        if let Some(v) = self.next_run_at {
            subscription.next_run_at = v;
        }
        if let Some(v) = self.active {
            subscription.active = v;
        }
    }
}

/// Partial savings goal update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SavingsGoalPatch {
    pub name: Option<String>,
    pub target_amount: Option<i64>,
    pub currency: Option<String>,
    pub current_amount: Option<i64>,
    pub target_date: Option<Option<DateTime<Utc>>>,
    pub linked_savings_wallet_id: Option<Option<String>>,
}

impl SavingsGoalPatch {
    /// Shallow-merges this patch into `goal`.
    pub fn apply(self, goal: &mut SavingsGoal) {
        if let Some(v) = self.name {
            goal.name = v;
        }
        if let Some(v) = self.target_amount {
            goal.target_amount = v;
        }
        if let Some(v) = self.currency {
            goal.currency = v;
        }
        if let Some(v) = self.current_amount {
            goal.current_amount = v;
        }
        if let Some(v) = self.target_date {
            goal.target_date = v;
        }
        if let Some(v) = self.linked_savings_wallet_id {
            goal.linked_savings_wallet_id = v;
        }
    }
}

/// Partial preferences update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreferencesPatch {
    pub base_currency: Option<String>,
    pub calendar_type: Option<CalendarType>,
    pub time_format: Option<TimeFormat>,
    pub theme: Option<Theme>,
}

impl PreferencesPatch {
    /// Shallow-merges this patch into `prefs`.
    pub fn apply(self, prefs: &mut UserPreferences) {
        if let Some(v) = self.base_currency {
            prefs.base_currency = v;
        }
        if let Some(v) = self.calendar_type {
            prefs.calendar_type = v;
        }
        if let Some(v) = self.time_format {
            prefs.time_format = v;
        }
        if let Some(v) = self.theme {
            prefs.theme = v;
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_text_enum_spellings_match_wire_format() {
        assert_eq!(DebtDirection::IOwe.as_str(), "I_OWE");
        assert_eq!("IM_OWED".parse::<DebtDirection>().unwrap(), DebtDirection::ImOwed);
        assert_eq!(TimeFormat::H12.to_string(), "12h");
        assert_eq!(
            serde_json::to_string(&TransactionType::Transfer).unwrap(),
            "\"transfer\""
        );
    }

    #[test]
    fn test_text_enum_rejects_unknown_value() {
        let err = "refund".parse::<TransactionType>().unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidEnumValue {
                field: "transaction.type",
                ..
            }
        ));
    }

    #[test]
    fn test_patch_clears_nullable_field() {
        let now = Utc::now();
        let mut tx = Transaction {
            id: "t1".to_string(),
            transaction_type: TransactionType::Transfer,
            amount: 10,
            currency: "UZS".to_string(),
            wallet_id: "a".to_string(),
            to_wallet_id: Some("b".to_string()),
            category_id: None,
            note: Some("rent".to_string()),
            tags: Vec::new(),
            date_time: now,
            created_at: now,
            updated_at: now,
        };

        TransactionPatch {
            transaction_type: Some(TransactionType::Expense),
            to_wallet_id: Some(None),
            ..Default::default()
        }
        .apply(&mut tx);

        assert_eq!(tx.transaction_type, TransactionType::Expense);
        assert_eq!(tx.to_wallet_id, None);
        assert_eq!(tx.note.as_deref(), Some("rent"));
    }

    #[test]
    fn test_type_change_away_from_transfer_drops_destination() {
        let now = Utc::now();
        let mut tx = Transaction {
            id: "t1".to_string(),
            transaction_type: TransactionType::Transfer,
            amount: 10,
            currency: "UZS".to_string(),
            wallet_id: "a".to_string(),
            to_wallet_id: Some("b".to_string()),
            category_id: None,
            note: None,
            tags: Vec::new(),
            date_time: now,
            created_at: now,
            updated_at: now,
        };

        TransactionPatch {
            transaction_type: Some(TransactionType::Income),
            ..Default::default()
        }
        .apply(&mut tx);
        assert_eq!(tx.to_wallet_id, None);

        TransactionPatch {
            transaction_type: Some(TransactionType::Transfer),
            to_wallet_id: Some(Some("c".to_string())),
            ..Default::default()
        }
        .apply(&mut tx);
        assert_eq!(tx.to_wallet_id.as_deref(), Some("c"));
    }
}
