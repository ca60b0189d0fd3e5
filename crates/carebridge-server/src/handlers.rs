use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use uuid::Uuid;

use carebridge_identity::BearerSession;
use carebridge_orchestrator::SubmissionReport;
use carebridge_store::ResourceQuery;
use carebridge_types::{
    Identity, PersistedResource, Profile, RawSubmission, ResourceType, VerificationOutcome,
};

use crate::error::ApiError;
use crate::state::AppState;

const DISPLAY_NAME_MAX: usize = 100;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/v1/sessions",
            post(create_session).delete(end_session),
        )
        .route(
            "/api/v1/resources",
            post(submit_resource).get(list_resources),
        )
        .route("/api/v1/resources/{id}", get(get_resource))
        .route("/api/v1/verify", post(verify_resource))
        .route("/api/v1/leaderboard", get(leaderboard))
        .route("/api/v1/profile", get(profile))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

#[derive(Deserialize)]
struct CreateSessionRequest {
    display_name: String,
}

#[derive(Serialize)]
struct SessionResponse {
    token: String,
    identity: Identity,
}

async fn create_session(
    State(state): State<AppState>,
    payload: Result<Json<CreateSessionRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SessionResponse>), ApiError> {
    let Json(req) = payload?;
    let display_name = req.display_name.trim();
    if display_name.is_empty() {
        return Err(ApiError::BadRequest("Display name is required".into()));
    }
    if display_name.chars().count() > DISPLAY_NAME_MAX {
        return Err(ApiError::BadRequest("Display name too long".into()));
    }

    let (token, identity) = state.sessions.issue(display_name);
    state.store.upsert_profile(&identity).await?;

    Ok((StatusCode::CREATED, Json(SessionResponse { token, identity })))
}

async fn end_session(State(state): State<AppState>, headers: HeaderMap) -> StatusCode {
    if let Some(token) = bearer_token(&headers) {
        state.sessions.revoke(&token);
    }
    StatusCode::NO_CONTENT
}

#[derive(Serialize)]
struct SubmitResponse {
    message: &'static str,
    #[serde(flatten)]
    report: SubmissionReport,
}

async fn submit_resource(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<RawSubmission>, JsonRejection>,
) -> Result<(StatusCode, Json<SubmitResponse>), ApiError> {
    let Json(raw) = payload?;
    let session = BearerSession::new(state.sessions.clone(), bearer_token(&headers));
    let report = state.orchestrator.submit_raw(&raw, &session).await?;

    Ok((
        StatusCode::CREATED,
        Json(SubmitResponse {
            message: report.message(),
            report,
        }),
    ))
}

async fn verify_resource(
    State(state): State<AppState>,
    payload: Result<Json<RawSubmission>, JsonRejection>,
) -> Result<Json<VerificationOutcome>, ApiError> {
    let Json(raw) = payload?;
    let reply = state.orchestrator.verify_only(&raw).await?;
    Ok(Json(reply.into_outcome()))
}

#[derive(Deserialize)]
struct ListParams {
    /// Comma-separated resource types.
    #[serde(default, rename = "type")]
    types: Option<String>,
    #[serde(default)]
    q: Option<String>,
}

fn parse_types(raw: Option<&str>) -> Result<Vec<ResourceType>, ApiError> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty() && *t != "all")
        .map(|t| {
            t.parse::<ResourceType>()
                .map_err(|e| ApiError::BadRequest(e.to_string()))
        })
        .collect()
}

async fn list_resources(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<PersistedResource>>, ApiError> {
    let query = ResourceQuery {
        types: parse_types(params.types.as_deref())?,
        search: params.q,
    };
    Ok(Json(state.store.list_resources(&query).await?))
}

async fn get_resource(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<PersistedResource>, ApiError> {
    let Path(id) = id?;
    state
        .store
        .get_resource(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Resource not found".into()))
}

#[derive(Deserialize)]
struct LeaderboardParams {
    #[serde(default)]
    limit: Option<usize>,
}

async fn leaderboard(
    State(state): State<AppState>,
    Query(params): Query<LeaderboardParams>,
) -> Result<Json<Vec<Profile>>, ApiError> {
    let limit = params
        .limit
        .unwrap_or(state.leaderboard_limit)
        .min(state.leaderboard_limit);
    Ok(Json(state.store.leaderboard(limit).await?))
}

#[derive(Serialize)]
struct ProfileResponse {
    profile: Profile,
    resources: Vec<PersistedResource>,
}

async fn profile(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ProfileResponse>, ApiError> {
    let identity = bearer_token(&headers)
        .and_then(|token| state.sessions.resolve(&token))
        .ok_or(ApiError::Unauthorized)?;

    let profile = state.store.upsert_profile(&identity).await?;
    let resources = state.store.resources_by_owner(identity.id).await?;
    Ok(Json(ProfileResponse { profile, resources }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        assert!(bearer_token(&headers).is_none());

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc123"));
        assert_eq!(bearer_token(&headers).as_deref(), Some("abc123"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc123"));
        assert!(bearer_token(&headers).is_none());

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert!(bearer_token(&headers).is_none());
    }

    #[test]
    fn test_parse_types() {
        assert!(parse_types(None).unwrap().is_empty());
        assert!(parse_types(Some("all")).unwrap().is_empty());
        assert_eq!(
            parse_types(Some("blood_bank, oxygen")).unwrap(),
            vec![ResourceType::BloodBank, ResourceType::Oxygen]
        );
        assert!(matches!(
            parse_types(Some("blood_bank,ambulance")),
            Err(ApiError::BadRequest(_))
        ));
    }
}
