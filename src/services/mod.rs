// Services module - business logic layer

pub mod cart_service;
pub mod menu_service;
pub mod user_service;

pub use cart_service::CartService;
pub use menu_service::{current_week_number, rotated_week, MenuService, ROTATION_WEEKS};
pub use user_service::UserService;
