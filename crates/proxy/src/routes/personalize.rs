//! Personalization endpoint.

use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use crate::error::AppError;
use crate::personalize::{PersonalizeError, parse_user_id};
use crate::state::AppState;

use super::ApiResponse;

/// Query parameters for `GET /proxy/personalize`.
#[derive(Debug, Deserialize)]
pub struct PersonalizeParams {
    pub user_id: Option<String>,
}

/// Return personalization data for `user_id`.
///
/// `200` with the result, `400` for a missing or unparseable id, `404` when
/// the customer does not exist, `500` for anything else.
#[instrument(skip(state, params))]
pub async fn personalize(
    State(state): State<AppState>,
    params: Result<Query<PersonalizeParams>, QueryRejection>,
) -> Response {
    let expose_errors = state.config().expose_errors;
    let user_id = params.ok().and_then(|Query(p)| p.user_id);

    match personalize_inner(&state, user_id.as_deref()).await {
        Ok(result) => Json(ApiResponse::ok(result)).into_response(),
        Err(e) => e.into_response_with(expose_errors),
    }
}

async fn personalize_inner(
    state: &AppState,
    user_id: Option<&str>,
) -> crate::error::Result<crate::models::PersonalizationResult> {
    // Input errors win over configuration errors.
    if user_id.and_then(parse_user_id).is_none() {
        return Err(PersonalizeError::InvalidInput.into());
    }

    let session = state.session().map_err(AppError::Shopify)?;
    Ok(state.personalizer().personalize(&session, user_id).await?)
}
