use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Menu categories served by the cafeteria
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Bebidas,
    Snacks,
    MenuDia,
}

impl Category {
    /// Categories that are always on the menu, regardless of the week
    pub const PERMANENT: [Category; 2] = [Category::Bebidas, Category::Snacks];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Bebidas => "bebidas",
            Category::Snacks => "snacks",
            Category::MenuDia => "menu_dia",
        }
    }

    /// Whether items in this category carry a rotation week
    pub fn is_rotating(&self) -> bool {
        matches!(self, Category::MenuDia)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bebidas" => Ok(Category::Bebidas),
            "snacks" => Ok(Category::Snacks),
            "menu_dia" => Ok(Category::MenuDia),
            _ => Err(format!("Invalid category: {}", s)),
        }
    }
}
