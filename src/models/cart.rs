use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use super::{Category, MenuItem};

/// Shopping cart held in the user's session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    pub lines: Vec<CartLine>,
}

/// One product in the cart, with the price captured when it was added
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: i64,
    pub name: String,
    pub price: Decimal,
    pub quantity: u32,
    pub category: Category,
}

/// Body of `POST /agregar_al_carrito`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddToCartRequest {
    #[serde(rename = "producto_id", deserialize_with = "lenient_i64")]
    pub product_id: i64,
    #[serde(
        rename = "cantidad",
        default = "default_quantity",
        deserialize_with = "lenient_i64"
    )]
    pub quantity: i64,
}

/// Body of `POST /quitar_del_carrito`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveFromCartRequest {
    #[serde(rename = "producto_id", deserialize_with = "lenient_i64")]
    pub product_id: i64,
}

/// Body of `POST /actualizar_cantidad`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateQuantityRequest {
    #[serde(rename = "producto_id", deserialize_with = "lenient_i64")]
    pub product_id: i64,
    #[serde(
        rename = "cantidad",
        default = "default_quantity",
        deserialize_with = "lenient_i64"
    )]
    pub quantity: i64,
}

/// JSON reply of every cart mutation endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartMutationResponse {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_items: Option<u32>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a product or, if it is already in the cart, increase its quantity
    pub fn add_item(&mut self, item: &MenuItem, quantity: u32) {
        if let Some(line) = self.get_line_mut(item.id) {
            line.quantity = line.quantity.saturating_add(quantity);
        } else {
            self.lines.push(CartLine::from_menu_item(item, quantity));
        }
    }

    /// Set the quantity of a line. Returns false if the product is not in the cart.
    pub fn set_quantity(&mut self, product_id: i64, quantity: u32) -> bool {
        if quantity == 0 {
            return self.remove_item(product_id);
        }
        match self.get_line_mut(product_id) {
            Some(line) => {
                line.quantity = quantity;
                true
            }
            None => false,
        }
    }

    /// Remove a line. Returns false if the product was not in the cart.
    pub fn remove_item(&mut self, product_id: i64) -> bool {
        let original_len = self.lines.len();
        self.lines.retain(|line| line.product_id != product_id);
        self.lines.len() != original_len
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Sum of quantities over all lines, saturating at `u32::MAX`
    pub fn item_count(&self) -> u32 {
        self.lines
            .iter()
            .fold(0u32, |count, line| count.saturating_add(line.quantity))
    }

    /// Quantity currently held for a product, zero if absent
    pub fn quantity_of(&self, product_id: i64) -> u32 {
        self.get_line(product_id).map_or(0, |line| line.quantity)
    }

    /// Sum of price x quantity over all lines
    pub fn total(&self) -> Decimal {
        self.lines.iter().map(CartLine::subtotal).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn get_line(&self, product_id: i64) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.product_id == product_id)
    }

    pub fn contains(&self, product_id: i64) -> bool {
        self.get_line(product_id).is_some()
    }

    fn get_line_mut(&mut self, product_id: i64) -> Option<&mut CartLine> {
        self.lines
            .iter_mut()
            .find(|line| line.product_id == product_id)
    }
}

impl CartLine {
    pub fn from_menu_item(item: &MenuItem, quantity: u32) -> Self {
        Self {
            product_id: item.id,
            name: item.name.clone(),
            price: item.price,
            quantity,
            category: item.category,
        }
    }

    pub fn subtotal(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

impl CartMutationResponse {
    pub fn success(message: impl Into<String>, total_items: u32) -> Self {
        Self {
            success: true,
            message: message.into(),
            total_items: Some(total_items),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            total_items: None,
        }
    }
}

fn default_quantity() -> i64 {
    1
}

/// Accept integers sent either as JSON numbers or as numeric strings
fn lenient_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(i64),
        String(String),
    }

    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(value) => Ok(value),
        NumberOrString::String(value) => value
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid integer: {}", value))),
    }
}
