use axum::{
    extract::State,
    response::{IntoResponse, Json, Redirect, Response},
};
use serde::Serialize;
use tower_sessions::Session;
use tracing::instrument;

use super::error::AppResult;
use super::session::{current_user, take_flashes};
use crate::app::AppState;
use crate::models::CategorizedMenu;
use crate::services::current_week_number;

/// View model for the menu page
#[derive(Debug, Serialize)]
pub struct MenuPage {
    pub nombre: String,
    pub items: CategorizedMenu,
    pub semana_actual: u32,
    pub semana_rotativa: u32,
    pub flashes: Vec<String>,
}

#[instrument(name = "menu_page", skip_all)]
pub async fn menu_page(State(state): State<AppState>, session: Session) -> AppResult<Response> {
    let Some(user) = current_user(&session).await? else {
        return Ok(Redirect::to("/login").into_response());
    };

    let items = state.menu_service.get_categorized_menu_or_fallback().await;

    let page = MenuPage {
        nombre: user.name,
        semana_actual: current_week_number(),
        semana_rotativa: items.week,
        items,
        flashes: take_flashes(&session).await?,
    };
    Ok(Json(page).into_response())
}
