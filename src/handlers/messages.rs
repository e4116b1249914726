//! User-facing messages, in the language the cafeteria serves its customers in.

pub const LOGIN_REQUIRED: &str = "Debe iniciar sesión";
pub const PRODUCT_NOT_FOUND: &str = "Producto no encontrado";
pub const INVALID_QUANTITY: &str = "Cantidad inválida";
pub const INVALID_REQUEST: &str = "Solicitud inválida";
pub const PRODUCT_ADDED: &str = "Producto agregado al carrito";
pub const PRODUCT_REMOVED: &str = "Producto removido del carrito";
pub const QUANTITY_UPDATED: &str = "Cantidad actualizada";

pub const LOGIN_SUCCESS: &str = "Inicio de sesión exitoso";
pub const LOGIN_FAILED: &str = "Correo o contraseña incorrectos";
pub const REGISTER_SUCCESS: &str = "Usuario registrado con éxito";
pub const REGISTER_FAILED: &str = "No se pudo completar el registro";
pub const REGISTER_INVALID: &str = "Datos de registro inválidos";
pub const LOGGED_OUT: &str = "Sesión cerrada";
