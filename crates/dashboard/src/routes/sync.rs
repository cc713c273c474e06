//! Sync and preview handlers.

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use shop_sync_core::{ResourceKind, SyncDirection};

use crate::error::{SyncError, SyncFailure};
use crate::state::AppState;
use crate::sync::Capabilities;

/// Build the sync router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/kinds", get(list_kinds))
        .route("/api/sync/{kind}", get(preview).post(sync))
}

/// Body of `POST /api/sync/{kind}`.
#[derive(Debug, Deserialize)]
pub struct SyncRequest {
    pub action: String,
    #[serde(default)]
    pub direction: Option<String>,
}

/// Query of `GET /api/sync/{kind}`.
#[derive(Debug, Deserialize)]
pub struct DirectionQuery {
    #[serde(default)]
    pub direction: Option<String>,
}

/// One entry of `GET /api/kinds`.
#[derive(Debug, Serialize)]
pub struct KindInfo {
    pub kind: ResourceKind,
    #[serde(flatten)]
    pub capabilities: Capabilities,
}

/// Parse the optional direction, defaulting to stage-to-prod.
pub(crate) fn parse_direction(raw: Option<&str>) -> Result<SyncDirection, SyncFailure> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(SyncDirection::default()),
        Some(raw) => raw.parse().map_err(|e: String| {
            SyncFailure::new(None, SyncDirection::default(), SyncError::BadRequest(e))
        }),
    }
}

/// Unwrap a JSON body, reporting a malformed one as a 400 failure report.
pub(crate) fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, SyncFailure> {
    body.map(|Json(body)| body).map_err(|rejection| {
        SyncFailure::new(
            None,
            SyncDirection::default(),
            SyncError::BadRequest(rejection.body_text()),
        )
    })
}

fn parse_kind(raw: &str, direction: SyncDirection) -> Result<ResourceKind, SyncFailure> {
    raw.parse()
        .map_err(|e| SyncFailure::new(None, direction, SyncError::UnknownResource(e)))
}

/// List supported kinds.
pub async fn list_kinds(State(state): State<AppState>) -> Json<Vec<KindInfo>> {
    Json(
        state
            .orchestrator()
            .registry()
            .kinds()
            .map(|(kind, capabilities)| KindInfo { kind, capabilities })
            .collect(),
    )
}

/// Run or preview a sync.
///
/// # Errors
///
/// Returns a failure report for unknown kinds or actions, missing
/// credentials, or a failed listing.
pub async fn sync(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    body: Result<Json<SyncRequest>, JsonRejection>,
) -> Result<Response, SyncFailure> {
    let body = json_body(body)?;
    let direction = parse_direction(body.direction.as_deref())?;
    let kind = parse_kind(&kind, direction)?;

    match body.action.trim() {
        "sync" => state
            .orchestrator()
            .run(kind, direction)
            .await
            .map(|report| Json(report).into_response())
            .map_err(|e| SyncFailure::new(Some(kind), direction, e)),
        "preview" => state
            .orchestrator()
            .preview(kind, direction)
            .await
            .map(|preview| Json(preview).into_response())
            .map_err(|e| SyncFailure::new(Some(kind), direction, e)),
        other => Err(SyncFailure::new(
            Some(kind),
            direction,
            SyncError::BadRequest(format!("unknown action: {other}")),
        )),
    }
}

/// Read-only diff preview.
///
/// # Errors
///
/// Same failures as [`sync`].
pub async fn preview(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    query: Result<Query<DirectionQuery>, QueryRejection>,
) -> Result<Response, SyncFailure> {
    let Query(query) = query.map_err(|rejection| {
        SyncFailure::new(
            None,
            SyncDirection::default(),
            SyncError::BadRequest(rejection.body_text()),
        )
    })?;
    let direction = parse_direction(query.direction.as_deref())?;
    let kind = parse_kind(&kind, direction)?;

    state
        .orchestrator()
        .preview(kind, direction)
        .await
        .map(|preview| Json(preview).into_response())
        .map_err(|e| SyncFailure::new(Some(kind), direction, e))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_direction_defaults() {
        assert_eq!(parse_direction(None).unwrap(), SyncDirection::StageToProd);
        assert_eq!(parse_direction(Some("  ")).unwrap(), SyncDirection::StageToProd);
        assert_eq!(
            parse_direction(Some("prod-to-stage")).unwrap(),
            SyncDirection::ProdToStage
        );
    }

    #[test]
    fn test_parse_direction_rejects_garbage() {
        let failure = parse_direction(Some("sideways")).unwrap_err();
        assert!(matches!(failure.error, SyncError::BadRequest(_)));
    }

    #[test]
    fn test_parse_kind_unknown() {
        let failure = parse_kind("widgets", SyncDirection::ProdToStage).unwrap_err();
        assert!(matches!(failure.error, SyncError::UnknownResource(_)));
        assert_eq!(failure.direction, SyncDirection::ProdToStage);
    }

    #[tokio::test]
    async fn test_json_body_rejection_is_bad_request() {
        use axum::body::Body;
        use axum::extract::FromRequest;
        use axum::http::{Request, StatusCode, header};

        let request = Request::post("/api/sync/tags")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{}"))
            .unwrap();
        let rejected = Json::<SyncRequest>::from_request(request, &()).await;

        let failure = json_body(rejected).unwrap_err();
        assert!(matches!(failure.error, SyncError::BadRequest(_)));
        assert_eq!(failure.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
