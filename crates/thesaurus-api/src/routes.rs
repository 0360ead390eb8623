//! HTTP routes.
//!
//! | Method | Path | Handler |
//! |--------|------|---------|
//! | GET | `/health` | liveness |
//! | GET | `/api/find-concepts` | concept search |
//! | GET | `/api/{kind}` | `uri → caption` listing, or detail with `?id=` |
//! | GET | `/api/{kind}/{id}[.json\|.jsonp\|.rdf]` | detail by uuid |
//! | POST | `/api/{kind}` | create |
//! | PUT | `/api/{kind}` | update |
//! | DELETE | `/api/{kind}?id=` | soft delete |
//!
//! `{kind}` is one of `concept`, `conceptscheme`, `set`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};
use uuid::Uuid;

use thesaurus_core::{
    Error, FieldProjection, Resource, ResourceKind, ResourceStore, Result, SearchBackend,
    TenantDirectory,
};
use thesaurus_search::fields_list_to_properties;

use crate::context::{split_context_suffix, ResponseContext};
use crate::error::{ApiError, ApiResult};
use crate::render::{render_resource, render_result_set};
use crate::services::ResourceApi;

type Params = HashMap<String, String>;

/// Generates time-ordered UUIDv7 request correlation IDs.
#[derive(Clone, Default)]
pub struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

/// Shared handler state: one facade per resource kind.
#[derive(Clone)]
pub struct AppState {
    pub concepts: Arc<ResourceApi>,
    pub schemes: Arc<ResourceApi>,
    pub sets: Arc<ResourceApi>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn ResourceStore>,
        search: Arc<dyn SearchBackend>,
        directory: Arc<dyn TenantDirectory>,
    ) -> Self {
        let api = |kind| {
            Arc::new(ResourceApi::new(
                kind,
                store.clone(),
                search.clone(),
                directory.clone(),
            ))
        };
        Self {
            concepts: api(ResourceKind::Concept),
            schemes: api(ResourceKind::ConceptScheme),
            sets: api(ResourceKind::Set),
        }
    }

    pub fn api(&self, kind: ResourceKind) -> &Arc<ResourceApi> {
        match kind {
            ResourceKind::Concept => &self.concepts,
            ResourceKind::ConceptScheme => &self.schemes,
            ResourceKind::Set => &self.sets,
        }
    }

    fn api_for_segment(&self, segment: &str) -> Result<&Arc<ResourceApi>> {
        let kind = segment
            .parse::<ResourceKind>()
            .map_err(|_| Error::NotFound(format!("Unknown resource type: {}", segment)))?;
        Ok(self.api(kind))
    }
}

// =============================================================================
// PARAMETER HELPERS
// =============================================================================

fn param<'a>(params: &'a Params, name: &str) -> Option<&'a str> {
    params.get(name).map(String::as_str)
}

/// Callback errors are wrapped in, for JSON-P requests.
fn error_callback<'a>(params: &'a Params, suffix: Option<&str>) -> Option<&'a str> {
    let format = suffix.or_else(|| param(params, "format"));
    (format == Some("jsonp"))
        .then(|| param(params, "callback"))
        .flatten()
}

fn fail(params: &Params, suffix: Option<&str>) -> impl FnOnce(Error) -> ApiError {
    let callback = error_callback(params, suffix).map(str::to_string);
    move |e| ApiError::from(e).with_callback(callback.as_deref())
}

fn context_from(params: &Params, suffix: Option<&str>) -> Result<ResponseContext> {
    ResponseContext::resolve(
        suffix.or_else(|| param(params, "format")),
        param(params, "callback"),
    )
}

fn projection_from(params: &Params) -> Result<Option<FieldProjection>> {
    let Some(fl) = param(params, "fl") else {
        return Ok(None);
    };
    let projection = fields_list_to_properties(fl)?;
    Ok((projection.include_uri || !projection.properties.is_empty()).then_some(projection))
}

fn required_tenant(params: &Params) -> Result<&str> {
    param(params, "tenant")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| Error::precondition("No tenant specified"))
}

fn parse_body(body: &Bytes) -> Result<Resource> {
    serde_json::from_slice(body)
        .map_err(|e| Error::invalid_argument(format!("Invalid resource document: {}", e)))
}

// =============================================================================
// HANDLERS
// =============================================================================

async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn find_concepts(
    State(state): State<AppState>,
    Query(params): Query<Params>,
) -> ApiResult<Response> {
    let run = async {
        let context = context_from(&params, None)?;
        let options = state.concepts.translate(&params)?;
        debug!(subsystem = "api", op = "find", options = ?options, "Search options translated");
        let results = state.concepts.search(&options).await?;
        Ok::<_, Error>(render_result_set(&context, &results, options.fields.as_ref()))
    };
    run.await.map_err(fail(&params, None))
}

async fn detail(
    api: &ResourceApi,
    id: &str,
    suffix: Option<&str>,
    params: &Params,
) -> Result<Response> {
    let context = context_from(params, suffix)?;
    let projection = projection_from(params)?;
    let resource = api.get_by_id(id).await?;
    Ok(render_resource(
        &context,
        StatusCode::OK,
        &resource,
        projection.as_ref(),
    ))
}

async fn get_collection(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Query(params): Query<Params>,
) -> ApiResult<Response> {
    let run = async {
        let api = state.api_for_segment(&kind)?;
        if let Some(id) = param(&params, "id") {
            return detail(api, id, None, &params).await;
        }
        if param(&params, "format") != Some("json") {
            return Err(Error::NotFound(
                "Resource listing is implemented only in format=json".to_string(),
            ));
        }
        Ok::<_, Error>(Json(api.list().await?).into_response())
    };
    run.await.map_err(fail(&params, None))
}

async fn get_resource(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, String)>,
    Query(params): Query<Params>,
) -> ApiResult<Response> {
    let (id, suffix) = split_context_suffix(&id);
    let run = async {
        let api = state.api_for_segment(&kind)?;
        detail(api, id, suffix, &params).await
    };
    run.await.map_err(fail(&params, suffix))
}

async fn create_resource(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Query(params): Query<Params>,
    body: Bytes,
) -> ApiResult<Response> {
    let run = async {
        let api = state.api_for_segment(&kind)?;
        let context = context_from(&params, None)?;
        let resource = parse_body(&body)?;
        let tenant = required_tenant(&params)?;
        let user = api.resolve_user(param(&params, "key")).await?;
        let created = api.create(resource, tenant, &user).await?;
        Ok::<_, Error>(render_resource(&context, StatusCode::CREATED, &created, None))
    };
    run.await.map_err(fail(&params, None))
}

async fn update_resource(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Query(params): Query<Params>,
    body: Bytes,
) -> ApiResult<Response> {
    let run = async {
        let api = state.api_for_segment(&kind)?;
        let context = context_from(&params, None)?;
        let resource = parse_body(&body)?;
        let tenant = required_tenant(&params)?;
        let user = api.resolve_user(param(&params, "key")).await?;
        let updated = api.update(resource, tenant, &user).await?;
        Ok::<_, Error>(render_resource(&context, StatusCode::OK, &updated, None))
    };
    run.await.map_err(fail(&params, None))
}

async fn delete_resource(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Query(params): Query<Params>,
) -> ApiResult<Response> {
    let run = async {
        let api = state.api_for_segment(&kind)?;
        let context = context_from(&params, None)?;
        let id = param(&params, "id")
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| Error::invalid_argument("Missing id parameter"))?;
        api.fetch_existing(id).await?;
        let user = api.resolve_user(param(&params, "key")).await?;
        let tenant = required_tenant(&params)?;
        let prior = api.delete(id, tenant, &user).await?;
        Ok::<_, Error>(render_resource(&context, StatusCode::ACCEPTED, &prior, None))
    };
    run.await.map_err(fail(&params, None))
}

// =============================================================================
// ROUTER
// =============================================================================

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Invalid CORS origin '{}': {}", origin, e);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .max_age(Duration::from_secs(3600))
}

/// Router with tracing, request ids and CORS applied.
pub fn build_router(state: AppState, allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/find-concepts", get(find_concepts))
        .route(
            "/api/:kind",
            get(get_collection)
                .post(create_resource)
                .put(update_resource)
                .delete(delete_resource),
        )
        .route("/api/:kind/:id", get(get_resource))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(cors_layer(allowed_origins))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> Params {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_error_callback_only_for_jsonp() {
        let p = params(&[("format", "jsonp"), ("callback", "cb")]);
        assert_eq!(error_callback(&p, None), Some("cb"));

        let p = params(&[("callback", "cb")]);
        assert_eq!(error_callback(&p, None), None);
        assert_eq!(error_callback(&p, Some("jsonp")), Some("cb"));
    }

    #[test]
    fn test_fail_outlives_params() {
        let map_err = {
            let p = params(&[("format", "jsonp"), ("callback", "cb")]);
            fail(&p, None)
        };
        let response = map_err(Error::NotFound("gone".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/javascript"
        );
    }

    #[test]
    fn test_required_tenant() {
        assert_eq!(required_tenant(&params(&[("tenant", "beng")])).unwrap(), "beng");
        let err = required_tenant(&params(&[("tenant", " ")])).unwrap_err();
        assert_eq!(err.status_code(), 412);
    }

    #[test]
    fn test_projection_from_fl() {
        assert!(projection_from(&params(&[])).unwrap().is_none());
        assert!(projection_from(&params(&[("fl", "")])).unwrap().is_none());
        let projection = projection_from(&params(&[("fl", "uri")])).unwrap().unwrap();
        assert!(projection.include_uri);
        assert!(projection_from(&params(&[("fl", "nonsense")])).is_err());
    }

    #[test]
    fn test_request_id_is_uuid_v7() {
        let request = axum::http::Request::new(());
        let id = MakeRequestUuidV7.make_request_id(&request).unwrap();
        let parsed = Uuid::parse_str(id.header_value().to_str().unwrap()).unwrap();
        assert_eq!(parsed.get_version_num(), 7);
    }
}
