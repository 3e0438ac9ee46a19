use crate::config::Config;
use async_trait::async_trait;
use axum::{
    Json, Router,
    body::Bytes,
    extract::{DefaultBodyLimit, FromRequestParts, Path, Query, State},
    http::{
        HeaderMap, HeaderValue, StatusCode,
        header::{CACHE_CONTROL, CONTENT_DISPOSITION, CONTENT_ENCODING, CONTENT_TYPE},
        request::Parts,
    },
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use filestore_core::{
    AssetProperties, AssetSummary, CallerId, CapacitySnapshot, ChunkId, ContentEncoding,
    FileStorage, FileStoreError, Result, TimerId,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;

pub const CALLER_HEADER: &str = "x-caller-id";

/// Headroom over `max_chunk_bytes` for request bodies; the chunk store
/// enforces the exact limit.
const BODY_LIMIT_SLACK: usize = 64 * 1024;

pub struct ServerState {
    pub storage: Arc<FileStorage>,
    pub config: Config,
}

#[derive(Debug, Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: Option<T>,
    error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            error: None,
        })
    }
}

pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl From<FileStoreError> for ApiError {
    fn from(err: FileStoreError) -> Self {
        let status = match &err {
            FileStoreError::NotOwner => StatusCode::FORBIDDEN,
            FileStoreError::ChecksumMismatch { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            FileStoreError::CapacityExceeded { .. } => StatusCode::INSUFFICIENT_STORAGE,
            FileStoreError::AssetNotFound(_) => StatusCode::NOT_FOUND,
            FileStoreError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Request failed: {}", err);
        }
        Self::new(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(self.message),
        };
        (self.status, Json(body)).into_response()
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

/// Caller identity taken from the `x-caller-id` header.
pub struct Caller(pub CallerId);

#[async_trait]
impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> ApiResult<Self> {
        let raw = parts
            .headers
            .get(CALLER_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();

        CallerId::new(raw).map(Caller).map_err(|_| {
            ApiError::new(
                StatusCode::UNAUTHORIZED,
                format!("missing {} header", CALLER_HEADER),
            )
        })
    }
}

#[derive(Debug, Deserialize)]
struct CreateChunkQuery {
    #[serde(default)]
    order: u32,
}

#[derive(Debug, Serialize)]
struct CreateChunkResponse {
    chunk_id: ChunkId,
    size: u64,
}

#[derive(Debug, Deserialize)]
struct ChunksAvailableRequest {
    chunk_ids: Vec<ChunkId>,
}

#[derive(Debug, Serialize)]
struct ChunksAvailableResponse {
    available: bool,
}

#[derive(Debug, Deserialize)]
struct CommitBatchRequest {
    chunk_ids: Vec<ChunkId>,
    properties: CommitProperties,
}

#[derive(Debug, Deserialize)]
struct CommitProperties {
    filename: String,
    content_type: String,
    #[serde(default = "default_content_encoding")]
    content_encoding: ContentEncoding,
    checksum: u32,
}

fn default_content_encoding() -> ContentEncoding {
    ContentEncoding::Identity
}

impl From<CommitProperties> for AssetProperties {
    fn from(props: CommitProperties) -> Self {
        Self {
            filename: props.filename,
            content_type: props.content_type,
            content_encoding: props.content_encoding,
            checksum: props.checksum,
        }
    }
}

#[derive(Debug, Serialize)]
struct CommitBatchResponse {
    asset_id: String,
    url: String,
}

#[derive(Debug, Deserialize)]
struct ListAssetsQuery {
    #[serde(default)]
    owner: Option<String>,
}

#[derive(Debug, Serialize)]
struct AssetView {
    #[serde(flatten)]
    summary: AssetSummary,
    url: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: u32,
    capacity: CapacitySnapshot,
}

#[derive(Debug, Serialize)]
struct VersionResponse {
    version: u32,
}

#[derive(Debug, Deserialize)]
struct StartExpiryRequest {
    #[serde(default)]
    interval_secs: Option<u64>,
    #[serde(default)]
    ttl_secs: Option<u64>,
}

#[derive(Debug, Serialize)]
struct ExpiryTimerResponse {
    timer_id: TimerId,
    interval_secs: u64,
    ttl_secs: u64,
}

#[derive(Debug, Serialize)]
struct SweepResponse {
    expired: usize,
    freed_bytes: u64,
}

pub async fn run_server(config: Config) -> Result<()> {
    let storage = Arc::new(FileStorage::open(&config.storage)?);

    if config.expiry.start_on_boot {
        let timer_id = storage.start_chunk_expiry(config.expiry.interval(), config.expiry.ttl());
        tracing::info!(
            "Chunk expiry {} started: every {}s, ttl {}s",
            timer_id,
            config.expiry.interval().as_secs(),
            config.expiry.ttl_secs
        );
    }

    let bind_addr = config.bind_addr.clone();
    let state = Arc::new(ServerState { storage, config });
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Server listening on {}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

pub fn build_router(state: Arc<ServerState>) -> Router {
    let body_limit = usize::try_from(state.config.storage.max_chunk_bytes)
        .unwrap_or(usize::MAX)
        .saturating_add(BODY_LIMIT_SLACK);

    Router::new()
        .route("/health", get(health_handler))
        .route("/version", get(version_handler))
        .route("/capacity", get(capacity_handler))
        .route("/chunks", post(create_chunk))
        .route("/chunks/availability", post(chunks_available))
        .route("/assets", get(list_assets).post(commit_batch))
        .route("/assets/:asset_id", get(get_asset).delete(delete_asset))
        .route("/assets/:asset_id/content", get(get_asset_content))
        .route("/admin/expiry", get(list_expiry).post(start_expiry))
        .route("/admin/expiry/sweep", post(sweep_now))
        .route("/admin/expiry/:timer_id", delete(stop_expiry))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_handler(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    let response = HealthResponse {
        status: "ok",
        version: state.storage.version(),
        capacity: state.storage.capacity(),
    };
    (StatusCode::OK, Json(response))
}

async fn version_handler(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    ApiResponse::ok(VersionResponse {
        version: state.storage.version(),
    })
}

async fn capacity_handler(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    ApiResponse::ok(state.storage.capacity())
}

async fn create_chunk(
    State(state): State<Arc<ServerState>>,
    Caller(caller): Caller,
    Query(query): Query<CreateChunkQuery>,
    body: Bytes,
) -> ApiResult<impl IntoResponse> {
    let size = body.len() as u64;
    let chunk_id = state.storage.create_chunk(&caller, body, query.order).await?;

    tracing::debug!(
        "Staged chunk {} ({} bytes, order {}) for {}",
        chunk_id,
        size,
        query.order,
        caller
    );

    Ok((
        StatusCode::CREATED,
        ApiResponse::ok(CreateChunkResponse { chunk_id, size }),
    ))
}

async fn chunks_available(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<ChunksAvailableRequest>,
) -> impl IntoResponse {
    let available = state.storage.chunks_available(&request.chunk_ids).await;
    ApiResponse::ok(ChunksAvailableResponse { available })
}

async fn commit_batch(
    State(state): State<Arc<ServerState>>,
    Caller(caller): Caller,
    Json(request): Json<CommitBatchRequest>,
) -> ApiResult<impl IntoResponse> {
    let asset_id = state
        .storage
        .commit_batch(&caller, request.chunk_ids, request.properties.into())
        .await?;
    let url = state.config.asset_url(&asset_id);

    Ok((
        StatusCode::CREATED,
        ApiResponse::ok(CommitBatchResponse { asset_id, url }),
    ))
}

async fn list_assets(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<ListAssetsQuery>,
) -> ApiResult<impl IntoResponse> {
    let summaries = match query.owner {
        Some(owner) => state.storage.assets_owned_by(&CallerId::new(owner)?)?,
        None => state.storage.assets_list()?,
    };

    let views: Vec<AssetView> = summaries
        .into_iter()
        .map(|summary| asset_view(&state.config, summary))
        .collect();

    Ok(ApiResponse::ok(views))
}

async fn get_asset(
    State(state): State<Arc<ServerState>>,
    Path(asset_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let asset = state.storage.get(&asset_id)?;
    Ok(ApiResponse::ok(asset_view(
        &state.config,
        AssetSummary::from(&asset),
    )))
}

async fn get_asset_content(
    State(state): State<Arc<ServerState>>,
    Path(asset_id): Path<String>,
) -> ApiResult<Response> {
    let asset = state.storage.get(&asset_id)?;

    let mut headers = HeaderMap::new();
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_str(&asset.content_type)
            .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream")),
    );
    headers.insert(CONTENT_DISPOSITION, content_disposition(&asset.filename));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("private, max-age=0"));
    if asset.content_encoding == ContentEncoding::Gzip {
        headers.insert(CONTENT_ENCODING, HeaderValue::from_static("gzip"));
    }

    Ok((StatusCode::OK, headers, asset.content).into_response())
}

async fn delete_asset(
    State(state): State<Arc<ServerState>>,
    Path(asset_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    state.storage.delete_asset(&asset_id)?;
    tracing::info!("Deleted asset {}", asset_id);
    Ok(ApiResponse::ok("Success"))
}

async fn list_expiry(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    ApiResponse::ok(state.storage.active_chunk_expiries())
}

async fn start_expiry(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<StartExpiryRequest>,
) -> impl IntoResponse {
    let defaults = &state.config.expiry;
    let interval_secs = request.interval_secs.unwrap_or(defaults.interval_secs).max(1);
    let ttl_secs = request.ttl_secs.unwrap_or(defaults.ttl_secs);

    let timer_id = state.storage.start_chunk_expiry(
        Duration::from_secs(interval_secs),
        Duration::from_secs(ttl_secs),
    );

    (
        StatusCode::CREATED,
        ApiResponse::ok(ExpiryTimerResponse {
            timer_id,
            interval_secs,
            ttl_secs,
        }),
    )
}

async fn stop_expiry(
    State(state): State<Arc<ServerState>>,
    Path(timer_id): Path<TimerId>,
) -> ApiResult<impl IntoResponse> {
    if state.storage.stop_chunk_expiry(timer_id) {
        Ok(ApiResponse::ok(timer_id))
    } else {
        Err(ApiError::new(
            StatusCode::NOT_FOUND,
            format!("no expiry timer {}", timer_id),
        ))
    }
}

async fn sweep_now(State(state): State<Arc<ServerState>>) -> ApiResult<impl IntoResponse> {
    let result = state
        .storage
        .expire_chunks_older_than(state.config.expiry.ttl())
        .await?;

    Ok(ApiResponse::ok(SweepResponse {
        expired: result.expired,
        freed_bytes: result.freed_bytes,
    }))
}

fn asset_view(config: &Config, summary: AssetSummary) -> AssetView {
    let url = config.asset_url(&summary.id);
    AssetView { summary, url }
}

fn content_disposition(filename: &str) -> HeaderValue {
    let sanitized: String = filename
        .chars()
        .map(|c| if c == '"' || c.is_control() { '_' } else { c })
        .collect();

    HeaderValue::from_str(&format!("attachment; filename=\"{}\"", sanitized))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use filestore_core::{ExpiryConfig, StorageConfig, compute_checksum};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    struct TestServer {
        router: Router,
        _dir: tempfile::TempDir,
    }

    impl TestServer {
        fn new() -> Self {
            Self::with_storage(|_| {})
        }

        fn with_storage(tweak: impl FnOnce(&mut StorageConfig)) -> Self {
            let dir = tempfile::tempdir().unwrap();
            let mut storage = StorageConfig::new(dir.path());
            tweak(&mut storage);

            let config = Config {
                bind_addr: "127.0.0.1:0".to_string(),
                public_base_url: Some("http://files.test".to_string()),
                storage,
                expiry: ExpiryConfig::default(),
            };
            let state = Arc::new(ServerState {
                storage: Arc::new(FileStorage::open(&config.storage).unwrap()),
                config,
            });

            Self {
                router: build_router(state),
                _dir: dir,
            }
        }

        async fn send(&self, request: Request<Body>) -> Response {
            self.router.clone().oneshot(request).await.unwrap()
        }

        async fn json(
            &self,
            method: &str,
            uri: &str,
            caller: Option<&str>,
            body: Option<Value>,
        ) -> (StatusCode, Value) {
            let mut builder = Request::builder().method(method).uri(uri);
            if let Some(caller) = caller {
                builder = builder.header(CALLER_HEADER, caller);
            }
            let body = match body {
                Some(v) => {
                    builder = builder.header("Content-Type", "application/json");
                    Body::from(serde_json::to_vec(&v).unwrap())
                }
                None => Body::empty(),
            };

            let response = self.send(builder.body(body).unwrap()).await;
            let status = response.status();
            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
            (status, value)
        }

        async fn upload(&self, caller: &str, order: u32, data: &[u8]) -> (StatusCode, Value) {
            let request = Request::builder()
                .method("POST")
                .uri(format!("/chunks?order={}", order))
                .header(CALLER_HEADER, caller)
                .body(Body::from(data.to_vec()))
                .unwrap();

            let response = self.send(request).await;
            let status = response.status();
            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
        }

        async fn upload_ok(&self, caller: &str, order: u32, data: &[u8]) -> String {
            let (status, body) = self.upload(caller, order, data).await;
            assert_eq!(status, StatusCode::CREATED, "{}", body);
            body["data"]["chunk_id"].as_str().unwrap().to_string()
        }
    }

    fn commit_body(chunk_ids: &[String], filename: &str, checksum: u32) -> Value {
        json!({
            "chunk_ids": chunk_ids,
            "properties": {
                "filename": filename,
                "content_type": "text/plain",
                "checksum": checksum,
            }
        })
    }

    #[tokio::test]
    async fn health_and_version() {
        let server = TestServer::new();

        let (status, body) = server.json("GET", "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], 1);
        assert_eq!(body["capacity"]["is_full"], false);

        let (status, body) = server.json("GET", "/version", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["version"], 1);
    }

    #[tokio::test]
    async fn upload_commit_and_download() {
        let server = TestServer::new();

        let first = server.upload_ok("alice", 0, b"hello ").await;
        let second = server.upload_ok("alice", 1, b"world").await;

        let (status, body) = server
            .json("POST", "/chunks/availability", None, Some(json!({ "chunk_ids": [&first, &second] })))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["available"], true);

        let checksum = compute_checksum([b"hello ".as_slice(), b"world".as_slice()]);
        let (status, body) = server
            .json(
                "POST",
                "/assets",
                Some("alice"),
                Some(commit_body(&[first, second], "greeting.txt", checksum)),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        let asset_id = body["data"]["asset_id"].as_str().unwrap().to_string();
        assert_eq!(
            body["data"]["url"],
            format!("http://files.test/assets/{}/content", asset_id)
        );

        let (status, body) = server
            .json("GET", &format!("/assets/{}", asset_id), None, None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["filename"], "greeting.txt");
        assert_eq!(body["data"]["owner"], "alice");
        assert_eq!(body["data"]["size"], 11);
        assert!(body["data"].get("content").is_none());

        let request = Request::builder()
            .uri(format!("/assets/{}/content", asset_id))
            .body(Body::empty())
            .unwrap();
        let response = server.send(request).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "text/plain");
        assert_eq!(
            response.headers()[CONTENT_DISPOSITION],
            "attachment; filename=\"greeting.txt\""
        );
        assert_eq!(response.headers()[CACHE_CONTROL], "private, max-age=0");
        assert!(response.headers().get(CONTENT_ENCODING).is_none());
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"hello world");
    }

    #[tokio::test]
    async fn gzip_assets_carry_content_encoding() {
        let server = TestServer::new();
        let chunk = server.upload_ok("alice", 0, b"\x1f\x8b pretend").await;

        let mut body = commit_body(
            &[chunk],
            "data.json",
            compute_checksum([b"\x1f\x8b pretend".as_slice()]),
        );
        body["properties"]["content_encoding"] = json!("gzip");
        let (status, body) = server.json("POST", "/assets", Some("alice"), Some(body)).await;
        assert_eq!(status, StatusCode::CREATED);
        let asset_id = body["data"]["asset_id"].as_str().unwrap();

        let request = Request::builder()
            .uri(format!("/assets/{}/content", asset_id))
            .body(Body::empty())
            .unwrap();
        let response = server.send(request).await;
        assert_eq!(response.headers()[CONTENT_ENCODING], "gzip");
    }

    #[tokio::test]
    async fn missing_caller_is_unauthorized() {
        let server = TestServer::new();

        let request = Request::builder()
            .method("POST")
            .uri("/chunks")
            .body(Body::from("data"))
            .unwrap();
        let response = server.send(request).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let (status, body) = server.upload("   ", 0, b"data").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn commit_errors_map_to_status_codes() {
        let server = TestServer::new();
        let chunk = server.upload_ok("motoko", 0, b"payload").await;
        let checksum = compute_checksum([b"payload".as_slice()]);

        let (status, body) = server
            .json(
                "POST",
                "/assets",
                Some("dom"),
                Some(commit_body(&[chunk.clone()], "x.txt", checksum)),
            )
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "Caller does not own the chunk.");

        let (status, body) = server
            .json(
                "POST",
                "/assets",
                Some("motoko"),
                Some(commit_body(&[chunk.clone()], "x.txt", checksum ^ 1)),
            )
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "Checksum mismatch.");

        let (status, _) = server
            .json(
                "POST",
                "/assets",
                Some("motoko"),
                Some(commit_body(&[chunk], " ", checksum)),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn full_store_rejects_uploads() {
        let server = TestServer::with_storage(|storage| {
            storage.capacity_threshold_bytes = 10;
        });

        server.upload_ok("alice", 0, b"0123456789").await;

        let (status, body) = server.json("GET", "/capacity", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["is_full"], true);
        assert_eq!(body["data"]["used_bytes"], 10);

        let (status, body) = server.upload("alice", 1, b"x").await;
        assert_eq!(status, StatusCode::INSUFFICIENT_STORAGE);
        assert_eq!(body["error"], "Capacity exceeded.");
    }

    #[tokio::test]
    async fn oversized_chunk_is_a_bad_request() {
        let server = TestServer::with_storage(|storage| {
            storage.max_chunk_bytes = 8;
        });

        let (status, _) = server.upload("alice", 0, b"more than eight bytes").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn list_and_delete_assets() {
        let server = TestServer::new();

        for (caller, name) in [("alice", "a.txt"), ("bob", "b.txt")] {
            let chunk = server.upload_ok(caller, 0, name.as_bytes()).await;
            let checksum = compute_checksum([name.as_bytes()]);
            let (status, _) = server
                .json(
                    "POST",
                    "/assets",
                    Some(caller),
                    Some(commit_body(&[chunk], name, checksum)),
                )
                .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (status, body) = server.json("GET", "/assets", None, None).await;
        assert_eq!(status, StatusCode::OK);
        let items = body["data"].as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["filename"], "a.txt");
        let first_id = items[0]["id"].as_str().unwrap().to_string();
        assert!(items[0]["url"].as_str().unwrap().ends_with("/content"));

        let (_, body) = server.json("GET", "/assets?owner=bob", None, None).await;
        let items = body["data"].as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["filename"], "b.txt");

        let uri = format!("/assets/{}", first_id);
        let (status, body) = server.json("DELETE", &uri, None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], "Success");

        let (status, body) = server.json("GET", &uri, None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Not found");

        let (status, _) = server.json("DELETE", &uri, None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn expiry_timers_and_sweep() {
        let server = TestServer::new();

        let (status, body) = server
            .json("POST", "/admin/expiry", None, Some(json!({ "interval_secs": 3600 })))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["timer_id"], 1);
        assert_eq!(body["data"]["ttl_secs"], 600);

        let (_, body) = server.json("GET", "/admin/expiry", None, None).await;
        assert_eq!(body["data"], json!([1]));

        let (status, _) = server.json("DELETE", "/admin/expiry/1", None, None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = server.json("DELETE", "/admin/expiry/1", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        server.upload_ok("alice", 0, b"fresh").await;
        let (status, body) = server.json("POST", "/admin/expiry/sweep", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["expired"], 0);
    }
}
