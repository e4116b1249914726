use tower_sessions::cookie::SameSite;
use tower_sessions::{Expiry, MemoryStore, Session, SessionManagerLayer};

use crate::config::SessionConfig;
use crate::models::{Cart, SessionUser};

/// Keys under which request state lives in the session
pub mod session_keys {
    pub const USER: &str = "usuario";
    pub const CART: &str = "carrito";
    pub const FLASHES: &str = "flashes";
}

pub type SessionResult<T> = Result<T, tower_sessions::session::Error>;

/// Cookie-backed session layer over an in-process store
pub fn create_session_layer(config: &SessionConfig) -> SessionManagerLayer<MemoryStore> {
    SessionManagerLayer::new(MemoryStore::default())
        .with_name(config.session_cookie_name.clone())
        .with_expiry(Expiry::OnInactivity(config.inactivity_limit()))
        .with_secure(config.session_secure_cookie)
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

/// The logged-in user, if any
pub async fn current_user(session: &Session) -> SessionResult<Option<SessionUser>> {
    session.get::<SessionUser>(session_keys::USER).await
}

/// Start an authenticated session.
///
/// The session id is rotated so a pre-login cookie cannot be reused.
pub async fn begin_user_session(session: &Session, user: SessionUser) -> SessionResult<()> {
    session.cycle_id().await?;
    session.insert(session_keys::USER, user).await
}

/// Drop every value in the session and issue a fresh id
pub async fn end_user_session(session: &Session) -> SessionResult<()> {
    session.clear().await;
    session.cycle_id().await
}

/// Cart for this session, empty if none was stored yet
pub async fn load_cart(session: &Session) -> SessionResult<Cart> {
    Ok(session
        .get::<Cart>(session_keys::CART)
        .await?
        .unwrap_or_default())
}

pub async fn store_cart(session: &Session, cart: &Cart) -> SessionResult<()> {
    session.insert(session_keys::CART, cart).await
}

/// Queue a message for the next page view
pub async fn push_flash(session: &Session, message: impl Into<String>) -> SessionResult<()> {
    let mut flashes = session
        .get::<Vec<String>>(session_keys::FLASHES)
        .await?
        .unwrap_or_default();
    flashes.push(message.into());
    session.insert(session_keys::FLASHES, flashes).await
}

/// Remove and return all queued messages
pub async fn take_flashes(session: &Session) -> SessionResult<Vec<String>> {
    Ok(session
        .remove::<Vec<String>>(session_keys::FLASHES)
        .await?
        .unwrap_or_default())
}
