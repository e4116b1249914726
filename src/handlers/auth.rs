use axum::{
    extract::State,
    response::{IntoResponse, Json, Redirect, Response},
    Form,
};
use serde::Serialize;
use tower_sessions::Session;
use tracing::instrument;

use super::error::AppResult;
use super::messages;
use super::session::{
    begin_user_session, end_user_session, load_cart, push_flash, store_cart, take_flashes,
};
use crate::app::AppState;
use crate::models::{LoginRequest, NewUser, ServiceError, SessionUser};
use crate::{info_with_trace, warn_with_trace};

/// View model for the login and registration forms
#[derive(Debug, Serialize)]
pub struct FormPage {
    pub page: &'static str,
    pub flashes: Vec<String>,
}

async fn form_page(session: &Session, page: &'static str) -> AppResult<Response> {
    let flashes = take_flashes(session).await?;
    Ok(Json(FormPage { page, flashes }).into_response())
}

pub async fn index() -> Redirect {
    Redirect::to("/login")
}

#[instrument(name = "login_page", skip(session))]
pub async fn login_page(session: Session) -> AppResult<Response> {
    form_page(&session, "login").await
}

#[instrument(name = "login", skip_all, fields(email = %request.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(request): Form<LoginRequest>,
) -> AppResult<Response> {
    match state.user_service.authenticate(&request).await? {
        Some(user) => {
            begin_user_session(&session, SessionUser::from(&user)).await?;

            // every login starts from an empty cart
            let mut cart = load_cart(&session).await?;
            state.cart_service.clear(&mut cart);
            store_cart(&session, &cart).await?;

            push_flash(&session, messages::LOGIN_SUCCESS).await?;
            info_with_trace!(user_id = user.id, "User logged in");
            Ok(Redirect::to("/menu").into_response())
        }
        None => {
            push_flash(&session, messages::LOGIN_FAILED).await?;
            form_page(&session, "login").await
        }
    }
}

#[instrument(name = "register_page", skip(session))]
pub async fn register_page(session: Session) -> AppResult<Response> {
    form_page(&session, "register").await
}

#[instrument(name = "register", skip_all, fields(email = %new_user.email))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(new_user): Form<NewUser>,
) -> AppResult<Response> {
    let flash = match state.user_service.register(new_user).await {
        Ok(user) => {
            info_with_trace!(user_id = user.id, "User registered");
            push_flash(&session, messages::REGISTER_SUCCESS).await?;
            return Ok(Redirect::to("/login").into_response());
        }
        // same message either way so the form does not reveal which emails exist
        Err(ServiceError::EmailAlreadyRegistered { .. }) => messages::REGISTER_FAILED,
        Err(ServiceError::ValidationError { message }) => {
            warn_with_trace!(reason = %message, "Registration input rejected");
            messages::REGISTER_INVALID
        }
        Err(other) => return Err(other.into()),
    };

    push_flash(&session, flash).await?;
    form_page(&session, "register").await
}

#[instrument(name = "logout", skip(session))]
pub async fn logout(session: Session) -> AppResult<Redirect> {
    end_user_session(&session).await?;
    push_flash(&session, messages::LOGGED_OUT).await?;
    Ok(Redirect::to("/login"))
}
