/// Lookup names for clients building task forms
///
/// Public; both lists are ordered by id.

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Json};
use taskdesk_shared::{models::lookup::LookupKind, tasks::service::lookup_names};

pub async fn statuses(State(state): State<AppState>) -> ApiResult<Json<Vec<String>>> {
    Ok(Json(lookup_names(state.store.as_ref(), LookupKind::Status).await?))
}

pub async fn priorities(State(state): State<AppState>) -> ApiResult<Json<Vec<String>>> {
    Ok(Json(lookup_names(state.store.as_ref(), LookupKind::Priority).await?))
}
