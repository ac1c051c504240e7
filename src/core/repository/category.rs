//! Category repository and the starter category set.

use super::{by_position, modify, new_id};
use crate::{
    entities::CategoryColumn,
    errors::Result,
    models::{Category, CategoryPatch, CategoryType, NewCategory},
    store::EntityStore,
};
use chrono::Utc;
use sea_orm::{ColumnTrait, Condition};
use tracing::info;

/// A starter category: name, type, icon, colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultCategory {
    /// Display name
    pub name: &'static str,
    /// Applicable transaction types
    pub category_type: CategoryType,
    /// Icon name
    pub icon: &'static str,
    /// Display colour
    pub color: &'static str,
}

const fn starter(
    name: &'static str,
    category_type: CategoryType,
    icon: &'static str,
    color: &'static str,
) -> DefaultCategory {
    DefaultCategory {
        name,
        category_type,
        icon,
        color,
    }
}

/// Categories written into an empty table by [`CategoryRepository::initialize_defaults`].
pub const DEFAULT_CATEGORIES: [DefaultCategory; 16] = [
    starter("Groceries", CategoryType::Expense, "ShoppingCart", "#60A5FA"),
    starter("Restaurant", CategoryType::Expense, "UtensilsCrossed", "#6366F1"),
    starter("Transport", CategoryType::Expense, "Bus", "#F59E0B"),
    starter("Leisure", CategoryType::Expense, "Gamepad2", "#A855F7"),
    starter("Health", CategoryType::Expense, "Heart", "#10B981"),
    starter("Gifts", CategoryType::Expense, "Gift", "#F43F5E"),
    starter("Shopping", CategoryType::Expense, "ShoppingBag", "#C97D8C"),
    starter("Communication", CategoryType::Expense, "Globe", "#6366F1"),
    starter("Communal", CategoryType::Expense, "Zap", "#10B981"),
    starter("Credit", CategoryType::Expense, "Building2", "#DC2626"),
    starter("Family", CategoryType::Expense, "Smile", "#A855F7"),
    starter("Work", CategoryType::Income, "Briefcase", "#6366F1"),
    starter("Salary", CategoryType::Income, "DollarSign", "#10B981"),
    starter("Freelance", CategoryType::Income, "Code", "#3B82F6"),
    starter("Investment", CategoryType::Income, "TrendingUp", "#F59E0B"),
    starter("Other", CategoryType::Both, "Tag", "#6b7280"),
];

/// CRUD over the `categories` table.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    store: EntityStore,
}

impl CategoryRepository {
    /// Creates a repository over `store`.
    #[must_use]
    pub const fn new(store: EntityStore) -> Self {
        Self { store }
    }

    /// Persists a new category with a fresh id and timestamps.
    pub async fn create(&self, draft: NewCategory) -> Result<Category> {
        self.store.add(&build(draft)).await
    }

    /// Non-archived categories, by sort position then name.
    pub async fn get_all(&self) -> Result<Vec<Category>> {
        let mut categories = self
            .store
            .find_where::<Category>(CategoryColumn::Archived.eq(false))
            .await?;
        sort_categories(&mut categories);
        Ok(categories)
    }

    /// Non-archived categories of exactly this type.
    pub async fn get_by_type(&self, category_type: CategoryType) -> Result<Vec<Category>> {
        let mut categories = self
            .store
            .find_where::<Category>(
                Condition::all()
                    .add(CategoryColumn::Archived.eq(false))
                    .add(CategoryColumn::CategoryType.eq(category_type.as_str())),
            )
            .await?;
        sort_categories(&mut categories);
        Ok(categories)
    }

    /// The category with this id, archived or not.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<Category>> {
        self.store.get(id).await
    }

    /// Shallow-merges `patch` into the stored category. `None` if it does not exist.
    pub async fn update(&self, id: &str, patch: CategoryPatch) -> Result<Option<Category>> {
        modify(&self.store, id, |c: &mut Category| patch.apply(c)).await
    }

    /// Soft-deletes the category. `None` if it does not exist.
    pub async fn archive(&self, id: &str) -> Result<Option<Category>> {
        modify(&self.store, id, |c: &mut Category| c.archived = true).await
    }

    /// Writes [`DEFAULT_CATEGORIES`] when the table is empty. Returns how many
    /// were written; zero on every later call.
    pub async fn initialize_defaults(&self) -> Result<usize> {
        if self.store.count::<Category>().await? > 0 {
            return Ok(0);
        }

        let defaults: Vec<Category> = DEFAULT_CATEGORIES
            .iter()
            .map(|d| {
                build(NewCategory {
                    name: d.name.to_string(),
                    category_type: d.category_type,
                    icon: Some(d.icon.to_string()),
                    color: Some(d.color.to_string()),
                    archived: false,
                    order: None,
                })
            })
            .collect();
        self.store.bulk_add(&defaults).await?;
        info!("Initialized {} default categories", defaults.len());
        Ok(defaults.len())
    }
}

fn build(draft: NewCategory) -> Category {
    let now = Utc::now();
    Category {
        id: new_id(),
        name: draft.name,
        category_type: draft.category_type,
        icon: draft.icon,
        color: draft.color,
        archived: draft.archived,
        order: draft.order,
        created_at: now,
        updated_at: now,
    }
}

fn sort_categories(categories: &mut [Category]) {
    categories.sort_by(|a, b| by_position((a.order, &a.name), (b.order, &b.name)));
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::{new_category, setup_test_store};

    #[tokio::test]
    async fn test_initialize_defaults_only_once() -> Result<()> {
        let store = setup_test_store().await?;
        let repo = CategoryRepository::new(store);

        assert_eq!(repo.initialize_defaults().await?, 16);
        assert_eq!(repo.initialize_defaults().await?, 0);

        let all = repo.get_all().await?;
        assert_eq!(all.len(), 16);
        assert!(all.iter().any(|c| c.name == "Other" && c.category_type == CategoryType::Both));
        assert_eq!(repo.get_by_type(CategoryType::Income).await?.len(), 4);
        Ok(())
    }

    #[tokio::test]
    async fn test_initialize_defaults_skips_non_empty_table() -> Result<()> {
        let store = setup_test_store().await?;
        let repo = CategoryRepository::new(store);
        let mine = repo.create(new_category("Books")).await?;
        repo.archive(&mine.id).await?;

        assert_eq!(repo.initialize_defaults().await?, 0);
        assert!(repo.get_all().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_archive_hides_from_list_only() -> Result<()> {
        let store = setup_test_store().await?;
        let repo = CategoryRepository::new(store);
        let cat = repo.create(new_category("Books")).await?;

        let archived = repo.archive(&cat.id).await?.unwrap();

        assert!(archived.archived);
        assert!(repo.get_all().await?.is_empty());
        assert_eq!(repo.get_by_id(&cat.id).await?, Some(archived));
        assert_eq!(repo.archive("missing").await?, None);
        Ok(())
    }
}
