//! HTTP management API over the store a running server answers from.
//!
//! | method | path                        | action                        |
//! |--------|-----------------------------|-------------------------------|
//! | GET    | `/api/records[?type=A,MX]`  | owner names per record type   |
//! | POST   | `/api/records`              | create or replace a record    |
//! | GET    | `/api/records/{name}?type=` | one record                    |
//! | DELETE | `/api/records/{name}?type=` | remove a record               |
//!
//! Replies use the envelope `{"status": "success", "data": ...}` or
//! `{"status": "error", "reason": ...}`.

use std::collections::{BTreeMap, BTreeSet};
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use kvdns_core::{normalize_name, RecordType, RecordValue};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::store::Store;
use crate::{Result, SrvError};

/// JSON body of a record value, without the type tag.
pub fn record_body(value: &RecordValue) -> Result<Value> {
    let tagged = serde_json::to_value(value).map_err(|e| SrvError::Body(e.to_string()))?;
    let Value::Object(mut map) = tagged else {
        return Err(SrvError::Body("record did not serialize to an object".into()));
    };
    map.remove(value.record_type().as_str())
        .ok_or_else(|| SrvError::Body(format!("record is missing its {} tag", value.record_type())))
}

/// Read a management JSON body as a value of `rtype`.
pub fn record_from_body(rtype: RecordType, body: Value) -> Result<RecordValue> {
    if !body.is_object() {
        return Err(SrvError::Body("record body must be a JSON object".into()));
    }
    let mut tagged = Map::new();
    tagged.insert(rtype.as_str().to_string(), body);
    serde_json::from_value(Value::Object(tagged))
        .map_err(|e| SrvError::Body(format!("not a {rtype} record: {e}")))
}

/// Error reply carrying an HTTP status.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    reason: String,
}

impl ApiError {
    fn new(status: StatusCode, reason: impl Into<String>) -> Self {
        Self {
            status,
            reason: reason.into(),
        }
    }
}

impl From<SrvError> for ApiError {
    fn from(e: SrvError) -> Self {
        if e.is_input_error() {
            Self::new(StatusCode::BAD_REQUEST, e.to_string())
        } else {
            warn!(error = %e, "management request failed");
            Self::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({ "status": "error", "reason": self.reason });
        (self.status, Json(body)).into_response()
    }
}

type ApiResult = std::result::Result<Json<Value>, ApiError>;

fn success(data: Value) -> Json<Value> {
    Json(json!({ "status": "success", "data": data }))
}

fn parse_type(text: &str) -> std::result::Result<RecordType, ApiError> {
    text.trim()
        .parse()
        .map_err(|e: kvdns_core::CoreError| ApiError::new(StatusCode::BAD_REQUEST, e.to_string()))
}

/// Run a store operation on the blocking pool.
async fn with_store<T, F>(store: &Arc<Store>, op: F) -> std::result::Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&Store) -> Result<T> + Send + 'static,
{
    let store = Arc::clone(store);
    tokio::task::spawn_blocking(move || op(&store))
        .await
        .map_err(|e| ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .map_err(ApiError::from)
}

#[derive(Debug, Deserialize)]
struct TypeFilter {
    #[serde(rename = "type")]
    rtype: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreateRecord {
    #[serde(rename = "type")]
    rtype: String,
    name: String,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

async fn list_records(State(store): State<Arc<Store>>, Query(filter): Query<TypeFilter>) -> ApiResult {
    let listing: BTreeMap<RecordType, BTreeSet<String>> = match filter.rtype {
        None => with_store(&store, Store::list_all).await?,
        Some(types) => {
            let types = types
                .split(',')
                .map(parse_type)
                .collect::<std::result::Result<Vec<_>, _>>()?;
            with_store(&store, move |store| {
                types
                    .into_iter()
                    .map(|rtype| Ok((rtype, store.list_names(rtype)?)))
                    .collect()
            })
            .await?
        }
    };
    Ok(success(json!(listing)))
}

async fn create_record(State(store): State<Arc<Store>>, Json(body): Json<CreateRecord>) -> ApiResult {
    let rtype = parse_type(&body.rtype)?;
    let value = record_from_body(rtype, Value::Object(body.fields))?;
    let name = body.name;
    let owner = normalize_name(&name);
    with_store(&store, move |store| store.set(&name, &value)).await?;

    info!(%rtype, name = %owner, "record stored via api");
    Ok(success(json!({ "name": owner, "type": rtype })))
}

async fn read_record(
    State(store): State<Arc<Store>>,
    Path(name): Path<String>,
    Query(filter): Query<TypeFilter>,
) -> ApiResult {
    let rtype = required_type(filter)?;
    let owner = normalize_name(&name);
    let lookup = owner.clone();
    let Some(value) = with_store(&store, move |store| store.get(rtype, &lookup)).await? else {
        return Err(ApiError::new(
            StatusCode::NOT_FOUND,
            format!("no {rtype} record for {owner}"),
        ));
    };

    Ok(success(json!({
        "name": owner,
        "type": rtype,
        "data": record_body(&value)?,
        "presentation": value.to_string(),
    })))
}

async fn delete_record(
    State(store): State<Arc<Store>>,
    Path(name): Path<String>,
    Query(filter): Query<TypeFilter>,
) -> ApiResult {
    let rtype = required_type(filter)?;
    let owner = normalize_name(&name);
    let target = owner.clone();
    let deleted = with_store(&store, move |store| store.delete(rtype, &target)).await?;

    info!(%rtype, name = %owner, deleted, "record deleted via api");
    Ok(success(json!({ "name": owner, "type": rtype, "deleted": deleted })))
}

fn required_type(filter: TypeFilter) -> std::result::Result<RecordType, ApiError> {
    let text = filter
        .rtype
        .ok_or_else(|| ApiError::new(StatusCode::BAD_REQUEST, "query parameter 'type' is required"))?;
    parse_type(&text)
}

/// Record management routes over `store`.
pub fn router(store: Arc<Store>) -> Router {
    Router::new()
        .route("/api/records", get(list_records).post(create_record))
        .route("/api/records/:name", get(read_record).delete(delete_record))
        .with_state(store)
}

/// Bound management listener.
pub struct ManagementApi {
    listener: TcpListener,
    addr: SocketAddr,
    router: Router,
}

impl ManagementApi {
    /// Bind the API on `addr`, sharing `store` with the DNS listeners.
    pub async fn bind(addr: SocketAddr, store: Arc<Store>) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| SrvError::Server(format!("API bind {addr}: {e}")))?;
        let addr = listener.local_addr()?;
        info!(%addr, "management API bound");
        Ok(Self {
            listener,
            addr,
            router: router(store),
        })
    }

    #[must_use]
    pub const fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Serve requests until the listener fails.
    pub async fn run(self) -> Result<()> {
        axum::serve(self.listener, self.router).await?;
        Ok(())
    }
}
