pub mod auth;
pub mod cart;
pub mod error;
pub mod health;
pub mod menu;
pub mod messages;
pub mod metrics;
pub mod middleware;
pub mod session;

pub use auth::{index, login, login_page, logout, register, register_page};
pub use cart::{add_to_cart, cart_page, remove_from_cart, update_quantity};
pub use error::{AppError, AppResult};
pub use health::health_check;
pub use menu::menu_page;
pub use metrics::metrics_handler;
pub use middleware::{request_validation_middleware, security_headers_middleware};
pub use session::create_session_layer;
