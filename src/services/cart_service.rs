use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::models::{
    validate_line_quantity, Cart, ServiceError, ServiceResult, MAX_LINE_QUANTITY,
};
use crate::repositories::CatalogRepository;

/// Cart operations over a session-held `Cart`.
///
/// The service never stores carts itself: callers load the cart from the
/// session, pass it in by `&mut`, and write it back afterwards.
pub struct CartService {
    catalog: Arc<dyn CatalogRepository>,
}

impl CartService {
    pub fn new(catalog: Arc<dyn CatalogRepository>) -> Self {
        Self { catalog }
    }

    /// Add `quantity` units of a product, returning the new item count.
    ///
    /// The cart is left untouched when the product is unknown or when the
    /// line would end up outside `1..=MAX_LINE_QUANTITY`.
    #[instrument(skip(self, cart))]
    pub async fn add(&self, cart: &mut Cart, product_id: i64, quantity: i64) -> ServiceResult<u32> {
        let quantity = line_quantity(quantity)?;
        if cart.quantity_of(product_id).saturating_add(quantity) > MAX_LINE_QUANTITY {
            return Err(ServiceError::InvalidQuantity {
                quantity: i64::from(quantity),
            });
        }

        let item = self
            .catalog
            .find_by_id(product_id)
            .await?
            .ok_or(ServiceError::ProductNotFound { id: product_id })?;

        cart.add_item(&item, quantity);

        info!(product = %item.name, "Item added to cart");
        Ok(cart.item_count())
    }

    /// Drop a product from the cart. Unknown ids are ignored.
    #[instrument(skip(self, cart))]
    pub fn remove(&self, cart: &mut Cart, product_id: i64) -> u32 {
        if cart.remove_item(product_id) {
            info!("Item removed from cart");
        }
        cart.item_count()
    }

    /// Set a line's quantity; zero or less removes the line.
    #[instrument(skip(self, cart))]
    pub fn update_quantity(
        &self,
        cart: &mut Cart,
        product_id: i64,
        quantity: i64,
    ) -> ServiceResult<u32> {
        if quantity <= 0 {
            return Ok(self.remove(cart, product_id));
        }

        let quantity = line_quantity(quantity)?;
        if cart.set_quantity(product_id, quantity) {
            info!("Cart quantity updated");
        }
        Ok(cart.item_count())
    }

    pub fn total(&self, cart: &Cart) -> Decimal {
        cart.total()
    }

    pub fn item_count(&self, cart: &Cart) -> u32 {
        cart.item_count()
    }

    pub fn clear(&self, cart: &mut Cart) {
        cart.clear();
        info!("Cart cleared");
    }
}

fn line_quantity(quantity: i64) -> ServiceResult<u32> {
    validate_line_quantity(quantity).map_err(|_| ServiceError::InvalidQuantity { quantity })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, MenuItem, RepositoryError};
    use crate::repositories::test_support::MockTestCatalogRepository;
    use mockall::predicate::eq;
    use rust_decimal_macros::dec;

    fn latte() -> MenuItem {
        MenuItem {
            id: 2,
            name: "Latte".to_string(),
            price: dec!(40),
            category: Category::Bebidas,
            week: None,
        }
    }

    fn service_with_latte() -> CartService {
        let mut repository = MockTestCatalogRepository::new();
        repository
            .expect_find_by_id()
            .with(eq(2i64))
            .returning(|_| Ok(Some(latte())));
        repository.expect_find_by_id().returning(|_| Ok(None));
        CartService::new(Arc::new(repository))
    }

    #[tokio::test]
    async fn test_add_new_and_existing_product() {
        let service = service_with_latte();
        let mut cart = Cart::new();

        assert_eq!(service.add(&mut cart, 2, 1).await.unwrap(), 1);
        assert_eq!(service.add(&mut cart, 2, 2).await.unwrap(), 3);

        assert_eq!(cart.lines.len(), 1);
        assert_eq!(service.total(&cart), dec!(120));
    }

    #[tokio::test]
    async fn test_add_unknown_product_leaves_cart_untouched() {
        let service = service_with_latte();
        let mut cart = Cart::new();
        service.add(&mut cart, 2, 1).await.unwrap();
        let before = cart.clone();

        let result = service.add(&mut cart, 99, 1).await;

        assert!(matches!(result, Err(ServiceError::ProductNotFound { id: 99 })));
        assert_eq!(cart, before);
    }

    #[tokio::test]
    async fn test_add_rejects_non_positive_quantity_without_lookup() {
        let mut repository = MockTestCatalogRepository::new();
        repository.expect_find_by_id().never();
        let service = CartService::new(Arc::new(repository));
        let mut cart = Cart::new();

        for quantity in [0, -3] {
            let result = service.add(&mut cart, 2, quantity).await;
            assert!(matches!(result, Err(ServiceError::InvalidQuantity { .. })));
        }
        assert!(cart.is_empty());
    }

    #[test]
    fn test_add_rejects_quantity_beyond_line_limit() {
        let service = service_with_latte();
        let mut cart = Cart::new();

        for quantity in [i64::from(MAX_LINE_QUANTITY) + 1, i64::from(u32::MAX), i64::MAX] {
            let result = tokio_test::block_on(service.add(&mut cart, 2, quantity));
            assert!(matches!(result, Err(ServiceError::InvalidQuantity { .. })));
        }
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_add_rejects_accumulating_past_line_limit() {
        let service = service_with_latte();
        let mut cart = Cart::new();

        assert_eq!(
            service.add(&mut cart, 2, i64::from(MAX_LINE_QUANTITY)).await.unwrap(),
            MAX_LINE_QUANTITY
        );

        let result = service.add(&mut cart, 2, 1).await;
        assert!(matches!(result, Err(ServiceError::InvalidQuantity { quantity: 1 })));
        assert_eq!(cart.item_count(), MAX_LINE_QUANTITY);
    }

    #[tokio::test]
    async fn test_update_quantity_rejects_values_beyond_line_limit() {
        let service = service_with_latte();
        let mut cart = Cart::new();
        service.add(&mut cart, 2, 3).await.unwrap();

        let result = service.update_quantity(&mut cart, 2, i64::from(u32::MAX));
        assert!(matches!(result, Err(ServiceError::InvalidQuantity { .. })));
        assert_eq!(cart.item_count(), 3);
    }

    #[tokio::test]
    async fn test_add_propagates_repository_error() {
        let mut repository = MockTestCatalogRepository::new();
        repository.expect_find_by_id().returning(|_| {
            Err(RepositoryError::DataCorruption {
                message: "bad price".to_string(),
            })
        });
        let service = CartService::new(Arc::new(repository));
        let mut cart = Cart::new();

        let result = service.add(&mut cart, 2, 1).await;
        assert!(matches!(result, Err(ServiceError::Repository { .. })));
    }

    #[tokio::test]
    async fn test_remove_and_update_quantity() {
        let service = service_with_latte();
        let mut cart = Cart::new();
        service.add(&mut cart, 2, 2).await.unwrap();

        assert_eq!(service.update_quantity(&mut cart, 2, 5).unwrap(), 5);
        assert_eq!(service.update_quantity(&mut cart, 42, 5).unwrap(), 5);
        assert_eq!(service.remove(&mut cart, 42), 5);

        assert_eq!(service.update_quantity(&mut cart, 2, 0).unwrap(), 0);
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_clear() {
        let service = service_with_latte();
        let mut cart = Cart::new();
        service.add(&mut cart, 2, 1).await.unwrap();

        service.clear(&mut cart);
        assert_eq!(service.item_count(&cart), 0);
        assert_eq!(service.total(&cart), Decimal::ZERO);
    }
}
