use axum::{
    extract::{rejection::JsonRejection, State},
    response::{IntoResponse, Json, Redirect, Response},
};
use rust_decimal::Decimal;
use serde::Serialize;
use tower_sessions::Session;
use tracing::{instrument, warn, Span};

use super::error::AppResult;
use super::messages;
use super::session::{current_user, load_cart, store_cart, take_flashes};
use crate::app::AppState;
use crate::models::{
    AddToCartRequest, CartLine, CartMutationResponse, RemoveFromCartRequest, ServiceError,
    UpdateQuantityRequest,
};

/// View model for the cart page
#[derive(Debug, Serialize)]
pub struct CartPage {
    pub nombre: String,
    pub carrito: Vec<CartLine>,
    pub total: Decimal,
    pub total_items: u32,
    pub flashes: Vec<String>,
}

fn reply(response: CartMutationResponse) -> AppResult<Json<CartMutationResponse>> {
    Ok(Json(response))
}

/// Body of a cart request, read only after the login check
fn parse_body<T>(body: Result<Json<T>, JsonRejection>) -> Option<T> {
    match body {
        Ok(Json(request)) => Some(request),
        Err(rejection) => {
            warn!(error = %rejection.body_text(), "Cart request body rejected");
            None
        }
    }
}

#[instrument(name = "add_to_cart", skip_all, fields(product_id = tracing::field::Empty))]
pub async fn add_to_cart(
    State(state): State<AppState>,
    session: Session,
    body: Result<Json<AddToCartRequest>, JsonRejection>,
) -> AppResult<Json<CartMutationResponse>> {
    let Some(user) = current_user(&session).await? else {
        return reply(CartMutationResponse::failure(messages::LOGIN_REQUIRED));
    };
    let Some(request) = parse_body(body) else {
        return reply(CartMutationResponse::failure(messages::INVALID_REQUEST));
    };
    Span::current().record("product_id", request.product_id);

    let mut cart = load_cart(&session).await?;
    let result = state
        .business_tracer
        .trace_cart_operation(
            "add",
            user.id,
            state
                .cart_service
                .add(&mut cart, request.product_id, request.quantity),
        )
        .await;

    match result {
        Ok(total_items) => {
            store_cart(&session, &cart).await?;
            reply(CartMutationResponse::success(messages::PRODUCT_ADDED, total_items))
        }
        Err(ServiceError::ProductNotFound { .. }) => {
            reply(CartMutationResponse::failure(messages::PRODUCT_NOT_FOUND))
        }
        Err(ServiceError::InvalidQuantity { .. }) => {
            reply(CartMutationResponse::failure(messages::INVALID_QUANTITY))
        }
        Err(other) => Err(other.into()),
    }
}

#[instrument(
    name = "remove_from_cart",
    skip_all,
    fields(product_id = tracing::field::Empty)
)]
pub async fn remove_from_cart(
    State(state): State<AppState>,
    session: Session,
    body: Result<Json<RemoveFromCartRequest>, JsonRejection>,
) -> AppResult<Json<CartMutationResponse>> {
    let Some(user) = current_user(&session).await? else {
        return reply(CartMutationResponse::failure(messages::LOGIN_REQUIRED));
    };
    let Some(request) = parse_body(body) else {
        return reply(CartMutationResponse::failure(messages::INVALID_REQUEST));
    };
    Span::current().record("product_id", request.product_id);

    let mut cart = load_cart(&session).await?;
    let total_items = state
        .business_tracer
        .trace_cart_operation("remove", user.id, async {
            Ok::<_, ServiceError>(state.cart_service.remove(&mut cart, request.product_id))
        })
        .await?;

    store_cart(&session, &cart).await?;
    reply(CartMutationResponse::success(messages::PRODUCT_REMOVED, total_items))
}

#[instrument(name = "update_quantity", skip_all, fields(product_id = tracing::field::Empty))]
pub async fn update_quantity(
    State(state): State<AppState>,
    session: Session,
    body: Result<Json<UpdateQuantityRequest>, JsonRejection>,
) -> AppResult<Json<CartMutationResponse>> {
    let Some(user) = current_user(&session).await? else {
        return reply(CartMutationResponse::failure(messages::LOGIN_REQUIRED));
    };
    let Some(request) = parse_body(body) else {
        return reply(CartMutationResponse::failure(messages::INVALID_REQUEST));
    };
    Span::current().record("product_id", request.product_id);

    let mut cart = load_cart(&session).await?;
    let result = state
        .business_tracer
        .trace_cart_operation("update_quantity", user.id, async {
            state
                .cart_service
                .update_quantity(&mut cart, request.product_id, request.quantity)
        })
        .await;

    let total_items = match result {
        Ok(total_items) => total_items,
        Err(ServiceError::InvalidQuantity { .. }) => {
            return reply(CartMutationResponse::failure(messages::INVALID_QUANTITY));
        }
        Err(other) => return Err(other.into()),
    };

    store_cart(&session, &cart).await?;
    let message = if request.quantity <= 0 {
        messages::PRODUCT_REMOVED
    } else {
        messages::QUANTITY_UPDATED
    };
    reply(CartMutationResponse::success(message, total_items))
}

#[instrument(name = "cart_page", skip_all)]
pub async fn cart_page(State(state): State<AppState>, session: Session) -> AppResult<Response> {
    let Some(user) = current_user(&session).await? else {
        return Ok(Redirect::to("/login").into_response());
    };

    let cart = load_cart(&session).await?;
    let page = CartPage {
        nombre: user.name,
        total: state.cart_service.total(&cart),
        total_items: state.cart_service.item_count(&cart),
        carrito: cart.lines,
        flashes: take_flashes(&session).await?,
    };
    Ok(Json(page).into_response())
}
