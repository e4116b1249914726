use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Category, RepositoryError};

/// A product on the cafeteria menu
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: i64,
    pub name: String,
    pub price: Decimal,
    pub category: Category,
    /// Rotation week (1-6), only set for `menu_dia` items
    pub week: Option<u8>,
}

/// Menu grouped by category, with the rotation week used for `menu_dia`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorizedMenu {
    pub bebidas: Vec<MenuItem>,
    pub snacks: Vec<MenuItem>,
    pub menu_dia: Vec<MenuItem>,
    pub week: u32,
}

/// Item to insert into the catalog (seed data)
#[derive(Debug, Clone, PartialEq)]
pub struct NewMenuItem {
    pub name: String,
    pub price: Decimal,
    pub category: Category,
    pub week: Option<u8>,
}

/// Raw row as stored in the `menu_items` table
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MenuItemRow {
    pub id: i64,
    pub name: String,
    pub price: f64,
    pub category: String,
    pub week: Option<i64>,
}

impl MenuItem {
    pub fn is_menu_dia(&self) -> bool {
        self.category == Category::MenuDia
    }
}

impl CategorizedMenu {
    /// Empty menu for the given rotation week
    pub fn empty(week: u32) -> Self {
        Self {
            bebidas: Vec::new(),
            snacks: Vec::new(),
            menu_dia: Vec::new(),
            week,
        }
    }

    /// Menu served when the catalog cannot be read
    pub fn fallback() -> Self {
        Self::empty(1)
    }

    /// Group permanent items by category and attach the week's dishes
    pub fn assemble(permanent: Vec<MenuItem>, menu_dia: Vec<MenuItem>, week: u32) -> Self {
        let mut menu = Self::empty(week);
        for item in permanent {
            match item.category {
                Category::Bebidas => menu.bebidas.push(item),
                Category::Snacks => menu.snacks.push(item),
                // permanent listings never carry rotating dishes
                Category::MenuDia => {}
            }
        }
        menu.menu_dia = menu_dia;
        menu
    }

    pub fn total_items(&self) -> usize {
        self.bebidas.len() + self.snacks.len() + self.menu_dia.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total_items() == 0
    }
}

impl NewMenuItem {
    pub fn new(name: &str, price: Decimal, category: Category, week: Option<u8>) -> Self {
        Self {
            name: name.to_string(),
            price,
            category,
            week,
        }
    }

    /// Price as stored in the REAL column
    pub fn price_as_f64(&self) -> f64 {
        self.price.to_f64().unwrap_or_default()
    }
}

impl TryFrom<MenuItemRow> for MenuItem {
    type Error = RepositoryError;

    fn try_from(row: MenuItemRow) -> Result<Self, Self::Error> {
        let category: Category =
            row.category
                .parse()
                .map_err(|message| RepositoryError::DataCorruption { message })?;

        let price = Decimal::from_f64(row.price)
            .map(|price| price.round_dp(2))
            .ok_or_else(|| RepositoryError::DataCorruption {
                message: format!("Invalid price for item {}: {}", row.id, row.price),
            })?;

        let week = match row.week {
            Some(week) => Some(u8::try_from(week).map_err(|_| {
                RepositoryError::DataCorruption {
                    message: format!("Invalid week for item {}: {}", row.id, week),
                }
            })?),
            None => None,
        };

        Ok(MenuItem {
            id: row.id,
            name: row.name,
            price,
            category,
            week,
        })
    }
}
