//! `/api/v0/prices` upload and export endpoints.

use axum::extract::{DefaultBodyLimit, Multipart, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use pl_database::parser::{parse_date, parse_decimal};
use pl_database::{export_archive, ingest_archive};
use pl_types::prices::{NaiveDate, Price};
use pl_types::{ArchiveKind, PriceFilter, Stats};
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use tracing::debug;

use crate::error::ApiError;
use crate::state::AppState;

/// Multipart field carrying the uploaded container.
pub const FILE_FIELD: &str = "file";

pub fn router(state: AppState) -> Router {
    let body_limit = state.max_upload_bytes;
    Router::new()
        .route("/api/v0/prices", post(upload_prices).get(download_prices))
        .route("/healthz", get(healthz))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Debug, Default, Deserialize)]
pub struct UploadParams {
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExportParams {
    pub start: Option<String>,
    pub end: Option<String>,
    pub min: Option<String>,
    pub max: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

fn archive_kind(raw: Option<&str>) -> Result<ArchiveKind, ApiError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(ArchiveKind::default()),
        Some(s) => s
            .parse()
            .map_err(|_| ApiError::bad_request("unsupported archive type")),
    }
}

/// `POST /api/v0/prices?type=zip|tar` with a multipart `file` field.
pub async fn upload_prices(
    State(state): State<AppState>,
    Query(params): Query<UploadParams>,
    mut multipart: Multipart,
) -> Result<Json<Stats>, ApiError> {
    let kind = archive_kind(params.kind.as_deref())?;

    let mut payload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(e.body_text()))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?;
        payload = Some(bytes);
        break;
    }
    let payload = payload.ok_or_else(|| ApiError::bad_request("missing multipart field 'file'"))?;
    debug!(bytes = payload.len(), %kind, "received upload");

    let stats = ingest_archive(state.store.as_ref(), &payload, kind).await?;
    Ok(Json(stats))
}

/// `GET /api/v0/prices?start=&end=&min=&max=` returning a single-entry archive.
pub async fn download_prices(
    State(state): State<AppState>,
    Query(params): Query<ExportParams>,
) -> Result<Response, ApiError> {
    let kind = archive_kind(params.kind.as_deref())?;
    let filter = export_filter(&params)?;

    let bytes = export_archive(state.store.as_ref(), &filter, kind).await?;
    let disposition = format!("attachment; filename=data.{}", kind.extension());
    Ok((
        [
            (header::CONTENT_TYPE, kind.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

/// Build the export filter. Unparseable price bounds are ignored, unparseable dates are rejected.
pub fn export_filter(params: &ExportParams) -> Result<PriceFilter, ApiError> {
    Ok(PriceFilter {
        start: date_param("start", params.start.as_deref())?,
        end: date_param("end", params.end.as_deref())?,
        min: price_param(params.min.as_deref()),
        max: price_param(params.max.as_deref()),
    })
}

fn date_param(name: &str, raw: Option<&str>) -> Result<Option<NaiveDate>, ApiError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => parse_date(s)
            .map(Some)
            .ok_or_else(|| ApiError::bad_request(format!("invalid {name} date: {s}"))),
    }
}

fn price_param(raw: Option<&str>) -> Option<Price> {
    let s = raw?.trim();
    parse_decimal(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pl_types::prices::Decimal;
    use std::str::FromStr;

    #[test]
    fn kind_defaults_to_zip() {
        assert_eq!(archive_kind(None).unwrap(), ArchiveKind::Zip);
        assert_eq!(archive_kind(Some("")).unwrap(), ArchiveKind::Zip);
        assert_eq!(archive_kind(Some("tar")).unwrap(), ArchiveKind::Tar);
        assert!(archive_kind(Some("7z")).is_err());
    }

    #[test]
    fn bad_price_bounds_are_ignored() {
        let params = ExportParams {
            min: Some("cheap".into()),
            max: Some("12.5".into()),
            ..Default::default()
        };
        let filter = export_filter(&params).unwrap();
        assert_eq!(filter.min, None);
        assert_eq!(filter.max, Decimal::from_str("12.5").ok());

        let params = ExportParams {
            min: Some("1_000".into()),
            ..Default::default()
        };
        assert_eq!(export_filter(&params).unwrap().min, None);
    }

    #[test]
    fn bad_dates_are_rejected() {
        let params = ExportParams {
            start: Some("yesterday".into()),
            ..Default::default()
        };
        assert!(matches!(export_filter(&params), Err(ApiError::BadRequest(_))));

        let params = ExportParams {
            start: Some("2024-01-01".into()),
            end: Some(String::new()),
            ..Default::default()
        };
        let filter = export_filter(&params).unwrap();
        assert_eq!(filter.start, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(filter.end, None);
    }
}
