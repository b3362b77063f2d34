//! Request handlers for `/form-config` and `/health`.

use std::collections::BTreeMap;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::form::{
    ConfigDocument, FieldDescriptor, FormKind, FormName, StoredConfiguration,
};
use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::resolver::{group_menu, resolve, MenuNode};

#[derive(Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `GET /form-config/{form_name}`: the stored document, or 204 when absent.
pub async fn get_config(
    State(state): State<AppState>,
    Path(form_name): Path<String>,
) -> Result<Response, ApiError> {
    let form = FormName::new(form_name)?;
    match state.store.get(&form).await? {
        Some(document) => Ok(Json(document).into_response()),
        None => {
            tracing::debug!(form = %form, "No stored configuration");
            Ok(StatusCode::NO_CONTENT.into_response())
        }
    }
}

/// `POST /form-config/{form_name}`: replace the document wholesale.
pub async fn put_config(
    State(state): State<AppState>,
    Path(form_name): Path<String>,
    body: Bytes,
) -> Result<Json<StoredConfiguration>, ApiError> {
    let form = FormName::new(form_name)?;
    let value: serde_json::Value = serde_json::from_slice(&body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid JSON body: {e}")))?;
    let document = ConfigDocument::parse(value)?;

    let stored = state.store.put(&form, document).await?;
    // The next read on this server must see the new document.
    state.cache.invalidate();
    let notified = state.events.updated(&form);
    tracing::info!(form = %form, id = %stored.id, subscribers = notified, "Configuration saved");

    Ok(Json(stored))
}

/// `GET /form-config`: every stored document keyed by form name.
pub async fn list_configs(
    State(state): State<AppState>,
) -> Result<Json<BTreeMap<FormName, ConfigDocument>>, ApiError> {
    Ok(Json(state.store.list().await?))
}

/// Effective field list of a built-in form.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedForm<'a> {
    pub form_name: &'a FormName,
    pub kind: FormKind,
    pub fields: Vec<FieldDescriptor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub menu: Option<Vec<MenuNode<'a>>>,
}

/// `GET /form-config/{form_name}/resolved`, served through the cache.
pub async fn resolved_config(
    State(state): State<AppState>,
    Path(form_name): Path<String>,
) -> Result<Response, ApiError> {
    let form = FormName::new(form_name)?;
    let defaults = state
        .defaults
        .get(&form)
        .ok_or_else(|| ApiError::NotFound(format!("No default fields registered for {form}")))?;

    let config = state.cache.get(&form).await;
    let resolved = resolve(defaults, config.as_ref());
    let menu = match defaults.kind() {
        FormKind::Menu => Some(group_menu(&resolved)),
        FormKind::Form => None,
    };

    let body = ResolvedForm {
        form_name: defaults.form(),
        kind: defaults.kind(),
        fields: resolved.iter().map(|f| f.to_descriptor()).collect(),
        menu,
    };
    Ok(Json(body).into_response())
}
