use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sqlx::SqlitePool;
use tracing::{info, instrument};

use super::CatalogRepository;
use crate::models::{Category, NewMenuItem, RepositoryError, RepositoryResult};

/// Manages SQLite schema creation and the initial menu data
pub struct SchemaManager {
    pool: SqlitePool,
}

const CREATE_MENU_ITEMS: &str = "CREATE TABLE IF NOT EXISTS menu_items (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    price REAL NOT NULL,
    category TEXT NOT NULL,
    week INTEGER
)";

const CREATE_MENU_ITEMS_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_menu_items_category_week ON menu_items (category, week)";

const CREATE_USERS: &str = "CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    phone TEXT NOT NULL,
    password TEXT NOT NULL
)";

const PERMANENT_ITEMS: &[(&str, Decimal, Category)] = &[
    ("Café Americano", dec!(25), Category::Bebidas),
    ("Latte", dec!(40), Category::Bebidas),
    ("Jumex", dec!(18), Category::Bebidas),
    ("Pepsi", dec!(20), Category::Bebidas),
    ("Gatorade", dec!(25), Category::Bebidas),
    ("Pan de Chocolate", dec!(20), Category::Snacks),
    ("Galletas", dec!(15), Category::Snacks),
    ("Sabritas", dec!(22), Category::Snacks),
    ("Muffin de Arándanos", dec!(25), Category::Snacks),
    ("Croissant", dec!(18), Category::Snacks),
];

const MENU_DIA_ITEMS: &[(&str, Decimal, u8)] = &[
    ("Huevos al Gusto", dec!(70), 1),
    ("Sándwich de Pollo", dec!(65), 1),
    ("Ensalada César", dec!(55), 1),
    ("Pasta Alfredo", dec!(75), 1),
    ("Sopa del Día", dec!(45), 1),
    ("Pechuga a la Plancha", dec!(80), 2),
    ("Pescado al Limón", dec!(95), 2),
    ("Lasagna", dec!(90), 2),
    ("Hamburguesa Clásica", dec!(70), 2),
    ("Pizza Margherita", dec!(85), 2),
];

impl SchemaManager {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the menu and user tables if they do not exist yet
    #[instrument(skip(self))]
    pub async fn create_tables(&self) -> RepositoryResult<()> {
        info!("Creating tables");

        for statement in [CREATE_MENU_ITEMS, CREATE_MENU_ITEMS_INDEX, CREATE_USERS] {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(RepositoryError::from)?;
        }

        info!("All tables created successfully");
        Ok(())
    }

    /// Insert the default menu when the catalog is empty.
    ///
    /// Returns the number of items inserted, zero if the catalog already had data.
    #[instrument(skip(self, catalog))]
    pub async fn seed_menu(&self, catalog: &dyn CatalogRepository) -> RepositoryResult<usize> {
        let existing = catalog.count().await?;
        if existing > 0 {
            info!("Catalog already has {} items, skipping seed", existing);
            return Ok(0);
        }

        let permanent = PERMANENT_ITEMS
            .iter()
            .map(|(name, price, category)| NewMenuItem::new(name, *price, *category, None));
        let rotating = MENU_DIA_ITEMS
            .iter()
            .map(|(name, price, week)| NewMenuItem::new(name, *price, Category::MenuDia, Some(*week)));

        let inserted = catalog.insert_all(permanent.chain(rotating).collect()).await?.len();

        info!("Seeded {} menu items", inserted);
        Ok(inserted)
    }
}
