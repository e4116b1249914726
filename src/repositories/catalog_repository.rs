use async_trait::async_trait;
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::{info, instrument, Instrument};

use crate::models::{
    Category, MenuItem, MenuItemRow, NewMenuItem, RepositoryError, RepositoryResult,
};
use crate::observability::{DatabaseTracingMiddleware, Metrics};

/// Trait defining the interface for menu catalog access
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Find all items in the given categories, ordered by category then name
    async fn find_by_categories(&self, categories: &[Category]) -> RepositoryResult<Vec<MenuItem>>;

    /// Find the `menu_dia` dishes for a rotation week, ordered by name
    async fn find_menu_dia_for_week(&self, week: u32) -> RepositoryResult<Vec<MenuItem>>;

    /// Find a single item by its ID
    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<MenuItem>>;

    /// Insert items in one transaction: either all are stored or none are
    async fn insert_all(&self, items: Vec<NewMenuItem>) -> RepositoryResult<Vec<MenuItem>>;

    /// Count all items in the catalog
    async fn count(&self) -> RepositoryResult<usize>;
}

/// SQLite implementation of the CatalogRepository trait
pub struct SqliteCatalogRepository {
    pool: SqlitePool,
    table_name: String,
    tracer: DatabaseTracingMiddleware,
}

const SELECT_COLUMNS: &str = "id, name, price, category, week";

impl SqliteCatalogRepository {
    pub fn new(pool: SqlitePool, metrics: Arc<Metrics>) -> Self {
        Self {
            pool,
            table_name: "menu_items".to_string(),
            tracer: DatabaseTracingMiddleware::new(metrics),
        }
    }

    fn create_db_span(&self, operation: &str) -> tracing::Span {
        tracing::info_span!(
            "SQLite",
            "otel.kind" = "client",
            "otel.name" = format!("SQLite.{}", operation),
            "db.system" = "sqlite",
            "db.operation" = operation,
            "db.sql.table" = %self.table_name,
        )
    }

    fn rows_to_items(rows: Vec<MenuItemRow>) -> RepositoryResult<Vec<MenuItem>> {
        rows.into_iter().map(MenuItem::try_from).collect()
    }
}

#[async_trait]
impl CatalogRepository for SqliteCatalogRepository {
    #[instrument(skip(self), fields(table = %self.table_name))]
    async fn find_by_categories(&self, categories: &[Category]) -> RepositoryResult<Vec<MenuItem>> {
        if categories.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; categories.len()].join(", ");
        let sql = format!(
            "SELECT {} FROM {} WHERE category IN ({}) ORDER BY category, name",
            SELECT_COLUMNS, self.table_name, placeholders
        );

        let rows = self
            .tracer
            .trace_operation("select", &self.table_name, async {
                let mut query = sqlx::query_as::<_, MenuItemRow>(&sql);
                for category in categories {
                    query = query.bind(category.as_str());
                }
                query
                    .fetch_all(&self.pool)
                    .await
                    .map_err(RepositoryError::from)
            })
            .instrument(self.create_db_span("SELECT"))
            .await?;

        let items = Self::rows_to_items(rows)?;
        info!("Found {} items", items.len());
        Ok(items)
    }

    #[instrument(skip(self), fields(table = %self.table_name))]
    async fn find_menu_dia_for_week(&self, week: u32) -> RepositoryResult<Vec<MenuItem>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE category = ? AND week = ? ORDER BY name",
            SELECT_COLUMNS, self.table_name
        );

        let rows = self
            .tracer
            .trace_operation("select", &self.table_name, async {
                sqlx::query_as::<_, MenuItemRow>(&sql)
                    .bind(Category::MenuDia.as_str())
                    .bind(i64::from(week))
                    .fetch_all(&self.pool)
                    .await
                    .map_err(RepositoryError::from)
            })
            .instrument(self.create_db_span("SELECT"))
            .await?;

        let items = Self::rows_to_items(rows)?;
        info!("Found {} menu_dia dishes", items.len());
        Ok(items)
    }

    #[instrument(skip(self), fields(table = %self.table_name))]
    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<MenuItem>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE id = ?",
            SELECT_COLUMNS, self.table_name
        );

        let row = self
            .tracer
            .trace_operation("select", &self.table_name, async {
                sqlx::query_as::<_, MenuItemRow>(&sql)
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(RepositoryError::from)
            })
            .instrument(self.create_db_span("SELECT"))
            .await?;

        row.map(MenuItem::try_from).transpose()
    }

    #[instrument(skip(self, items), fields(table = %self.table_name, items = items.len()))]
    async fn insert_all(&self, items: Vec<NewMenuItem>) -> RepositoryResult<Vec<MenuItem>> {
        let sql = format!(
            "INSERT INTO {} (name, price, category, week) VALUES (?, ?, ?, ?)",
            self.table_name
        );

        let ids = self
            .tracer
            .trace_operation("insert", &self.table_name, async {
                let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;
                let mut ids = Vec::with_capacity(items.len());

                for item in &items {
                    let result = sqlx::query(&sql)
                        .bind(&item.name)
                        .bind(item.price_as_f64())
                        .bind(item.category.as_str())
                        .bind(item.week.map(i64::from))
                        .execute(&mut *tx)
                        .await
                        .map_err(RepositoryError::from)?;
                    ids.push(result.last_insert_rowid());
                }

                // dropping the transaction on error rolls every insert back
                tx.commit().await.map_err(RepositoryError::from)?;
                Ok::<_, RepositoryError>(ids)
            })
            .instrument(self.create_db_span("INSERT"))
            .await?;

        Ok(ids
            .into_iter()
            .zip(items)
            .map(|(id, item)| MenuItem {
                id,
                name: item.name,
                price: item.price,
                category: item.category,
                week: item.week,
            })
            .collect())
    }

    #[instrument(skip(self), fields(table = %self.table_name))]
    async fn count(&self) -> RepositoryResult<usize> {
        let sql = format!("SELECT COUNT(*) FROM {}", self.table_name);

        let count: i64 = self
            .tracer
            .trace_operation("count", &self.table_name, async {
                sqlx::query_scalar::<_, i64>(&sql)
                    .fetch_one(&self.pool)
                    .await
                    .map_err(RepositoryError::from)
            })
            .instrument(self.create_db_span("SELECT"))
            .await?;

        Ok(usize::try_from(count).unwrap_or_default())
    }
}
