use chrono::{Datelike, Local};
use std::sync::Arc;
use tracing::{info, instrument};

use crate::models::{
    validate_rotation_week, CategorizedMenu, Category, ServiceError, ServiceResult,
};
use crate::observability::{BusinessTracingMiddleware, Metrics};
use crate::repositories::CatalogRepository;
use crate::warn_with_trace;

/// Number of distinct `menu_dia` sets the cafeteria cycles through
pub const ROTATION_WEEKS: u32 = 6;

/// ISO week of the year for the current local date
pub fn current_week_number() -> u32 {
    Local::now().iso_week().week()
}

/// Map a calendar week onto the 1..=6 rotation cycle
pub fn rotated_week(week_number: i64) -> u32 {
    // rem_euclid keeps the result in 0..6 for zero and negative weeks
    (week_number - 1).rem_euclid(i64::from(ROTATION_WEEKS)) as u32 + 1
}

/// Builds the categorized menu for the active rotation week
pub struct MenuService {
    catalog: Arc<dyn CatalogRepository>,
    tracer: BusinessTracingMiddleware,
}

impl MenuService {
    pub fn new(catalog: Arc<dyn CatalogRepository>, metrics: Arc<Metrics>) -> Self {
        Self {
            catalog,
            tracer: BusinessTracingMiddleware::new(metrics),
        }
    }

    /// Menu for the current calendar week
    pub async fn get_categorized_menu(&self) -> ServiceResult<CategorizedMenu> {
        self.get_categorized_menu_for_week(current_week_number()).await
    }

    /// Menu for an explicit calendar week
    #[instrument(skip(self))]
    pub async fn get_categorized_menu_for_week(
        &self,
        week_number: u32,
    ) -> ServiceResult<CategorizedMenu> {
        let week = rotated_week(i64::from(week_number));

        self.tracer
            .trace_menu_request(week, async {
                validate_rotation_week(week)?;
                let permanent = self.catalog.find_by_categories(&Category::PERMANENT).await?;
                let menu_dia = self.catalog.find_menu_dia_for_week(week).await?;

                let menu = CategorizedMenu::assemble(permanent, menu_dia, week);
                info!(
                    rotation_week = week,
                    items = menu.total_items(),
                    "Categorized menu assembled"
                );
                Ok::<_, ServiceError>(menu)
            })
            .await
    }

    /// Current menu, or the empty week-1 menu if the catalog cannot be read
    pub async fn get_categorized_menu_or_fallback(&self) -> CategorizedMenu {
        match self.get_categorized_menu().await {
            Ok(menu) => menu,
            Err(error) => {
                warn_with_trace!(error = %error, "Falling back to empty menu");
                CategorizedMenu::fallback()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MenuItem, RepositoryError};
    use crate::repositories::test_support::MockTestCatalogRepository;
    use mockall::predicate::eq;
    use rust_decimal_macros::dec;

    fn item(id: i64, name: &str, category: Category, week: Option<u8>) -> MenuItem {
        MenuItem {
            id,
            name: name.to_string(),
            price: dec!(20),
            category,
            week,
        }
    }

    fn service(repository: MockTestCatalogRepository) -> MenuService {
        MenuService::new(Arc::new(repository), Arc::new(Metrics::new().unwrap()))
    }

    #[test]
    fn test_rotated_week_known_values() {
        assert_eq!(rotated_week(1), 1);
        assert_eq!(rotated_week(6), 6);
        assert_eq!(rotated_week(7), 1);
        assert_eq!(rotated_week(12), 6);
        assert_eq!(rotated_week(13), 1);
        assert_eq!(rotated_week(53), 5);
    }

    #[test]
    fn test_rotated_week_non_positive() {
        assert_eq!(rotated_week(0), 6);
        assert_eq!(rotated_week(-5), 1);
    }

    #[test]
    fn test_current_week_number_in_iso_range() {
        let week = current_week_number();
        assert!((1..=53).contains(&week));
    }

    #[tokio::test]
    async fn test_menu_for_week_uses_rotated_week() {
        let mut repository = MockTestCatalogRepository::new();

        repository
            .expect_find_by_categories()
            .times(1)
            .returning(|_| {
                Ok(vec![
                    item(1, "Latte", Category::Bebidas, None),
                    item(2, "Galletas", Category::Snacks, None),
                ])
            });
        repository
            .expect_find_menu_dia_for_week()
            .with(eq(2u32))
            .times(1)
            .returning(|_| Ok(vec![item(3, "Lasagna", Category::MenuDia, Some(2))]));

        let menu = service(repository)
            .get_categorized_menu_for_week(8)
            .await
            .unwrap();

        assert_eq!(menu.week, 2);
        assert_eq!(menu.bebidas.len(), 1);
        assert_eq!(menu.snacks.len(), 1);
        assert_eq!(menu.menu_dia[0].name, "Lasagna");
    }

    #[tokio::test]
    async fn test_week_without_dishes_returns_empty_menu_dia() {
        let mut repository = MockTestCatalogRepository::new();

        repository
            .expect_find_by_categories()
            .returning(|_| Ok(vec![item(1, "Pepsi", Category::Bebidas, None)]));
        repository
            .expect_find_menu_dia_for_week()
            .with(eq(5u32))
            .returning(|_| Ok(Vec::new()));

        let menu = service(repository)
            .get_categorized_menu_for_week(5)
            .await
            .unwrap();

        assert_eq!(menu.week, 5);
        assert!(menu.menu_dia.is_empty());
        assert_eq!(menu.total_items(), 1);
    }

    #[tokio::test]
    async fn test_fallback_on_repository_error() {
        let mut repository = MockTestCatalogRepository::new();

        repository.expect_find_by_categories().returning(|_| {
            Err(RepositoryError::DataCorruption {
                message: "bad row".to_string(),
            })
        });
        repository.expect_find_menu_dia_for_week().never();

        let menu = service(repository).get_categorized_menu_or_fallback().await;

        assert_eq!(menu, CategorizedMenu::fallback());
        assert_eq!(menu.week, 1);
        assert!(menu.is_empty());
    }
}
