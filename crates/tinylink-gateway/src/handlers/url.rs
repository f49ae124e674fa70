use crate::error::{AppError, Result};
use crate::model::{CreateUrlRequest, CreateUrlResponse};
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use tinylink_core::Shortener;
use tinylink_redirector::Redirector;
use tracing::info;
use url::Url;

pub async fn create_url_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreateUrlRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateUrlResponse>)> {
    let Json(request) = payload?;
    validate_url(&request.url)?;

    let short_id = state.shortener().shorten(&request.url).await?;
    let short_url = short_id.to_url(state.base_url());
    info!(short_id = %short_id, url = %request.url, "shortened url");

    Ok((
        StatusCode::CREATED,
        Json(CreateUrlResponse {
            short_id: short_id.into_string(),
            short_url,
            original_url: request.url,
        }),
    ))
}

pub async fn redirect_handler(
    Path(short_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Response> {
    let Some(original_url) = state.redirector().resolve(&short_id).await? else {
        return Err(AppError::NotFound);
    };

    let location =
        HeaderValue::from_str(&original_url).map_err(|_| AppError::UnusableTarget(short_id))?;

    Ok((StatusCode::TEMPORARY_REDIRECT, [(header::LOCATION, location)]).into_response())
}

/// Accepts absolute `http`/`https` URLs with a host.
///
/// The URL is stored exactly as sent, so it must also be usable verbatim
/// as a `Location` header.
fn validate_url(raw: &str) -> Result<()> {
    let parsed = Url::parse(raw).map_err(|e| AppError::InvalidUrl(format!("{raw}: {e}")))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(AppError::InvalidUrl(format!(
            "URL scheme must be http or https: {}",
            parsed.scheme()
        )));
    }

    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(AppError::InvalidUrl(format!("URL must have a host: {raw}")));
    }

    if raw.chars().any(|c| !c.is_ascii_graphic()) {
        return Err(AppError::InvalidUrl(
            "URL must not contain whitespace or non-ASCII characters; percent-encode them"
                .to_string(),
        ));
    }

    Ok(())
}
