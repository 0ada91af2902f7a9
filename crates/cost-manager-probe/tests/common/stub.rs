// crates/cost-manager-probe/tests/common/stub.rs
// ============================================================================
// Module: Cost Manager Stub
// Description: In-process users, costs, logs, and admin services.
// Purpose: Give the suite a conformant target, with switches that break it.
// Dependencies: axum, cost-manager-probe, serde_json, time, tokio
// ============================================================================

//! ## Overview
//! Four axum routers share one in-memory store and are served on ephemeral
//! `127.0.0.1` ports from a dedicated thread. Every request is appended to the
//! log store by a middleware, which also injects cold-start delays.
//! [`StubFaults`] flips individual contract rules off.

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::net::TcpListener as StdTcpListener;
use std::sync::Arc;
use std::sync::Mutex;
use std::thread;
use std::time::Duration;
use std::time::Instant;

use axum::Json;
use axum::Router;
use axum::body::Bytes;
use axum::extract::Path;
use axum::extract::Query;
use axum::extract::Request;
use axum::extract::State;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::middleware::from_fn_with_state;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::delete;
use axum::routing::get;
use axum::routing::post;
use cost_manager_probe::ServiceKind;
use cost_manager_probe::SuiteConfig;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;
use time::OffsetDateTime;
use tokio::runtime::Builder;
use tokio::sync::oneshot;
use tokio::time::sleep;
use url::Url;

// ============================================================================
// SECTION: Faults
// ============================================================================

/// Contract rules the stub can break.
#[derive(Debug, Clone, Default)]
pub struct StubFaults {
    /// About entries carry an extra `email` field.
    pub about_extra_field: bool,
    /// Reports omit the `sports` bucket.
    pub drop_report_category: bool,
    /// Error bodies omit `message`.
    pub missing_error_message: bool,
    /// Costs with an unknown category are stored.
    pub accept_invalid_category: bool,
    /// Status for a duplicate user; 400 when unset.
    pub duplicate_user_status: Option<u16>,
    /// The first `n` requests are delayed by the given duration.
    pub cold_start: Option<(u64, Duration)>,
    /// Every logs read returns fewer entries than the previous one.
    pub shrink_logs: bool,
    /// Trailing-slash routes are not registered.
    pub no_trailing_slash: bool,
    /// Cost echoes carry `_id`.
    pub echo_cost_id: bool,
    /// Reports never show costs added after the first report.
    pub report_frozen: bool,
    /// `POST /api/add` on costs answers 500.
    pub costs_broken: bool,
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// Stored cost.
#[derive(Debug, Clone)]
struct StoredCost {
    id: String,
    userid: u64,
    year: i64,
    month: i64,
    day: i64,
    description: String,
    category: String,
    sum: f64,
}

/// State shared by the four services.
#[derive(Debug, Default)]
struct Store {
    users: BTreeMap<u64, Value>,
    costs: Vec<StoredCost>,
    logs: Vec<Value>,
    requests: u64,
    next_cost_id: u64,
    frozen_costs: Option<usize>,
    shrinking_logs: usize,
}

/// Handler state.
#[derive(Clone)]
struct Stub {
    faults: StubFaults,
    store: Arc<Mutex<Store>>,
}

const CATEGORIES: [&str; 5] = ["food", "health", "housing", "sports", "education"];

// ============================================================================
// SECTION: Handle
// ============================================================================

/// Running stub services. Dropping the handle stops them.
pub struct StubServices {
    urls: BTreeMap<ServiceKind, Url>,
    store: Arc<Mutex<Store>>,
    shutdown: Option<oneshot::Sender<()>>,
    join: Option<thread::JoinHandle<()>>,
}

impl StubServices {
    /// Starts four conformant services.
    pub fn spawn() -> Result<Self, String> {
        Self::spawn_with(StubFaults::default())
    }

    /// Starts four services with the given faults.
    pub fn spawn_with(faults: StubFaults) -> Result<Self, String> {
        let store = Arc::new(Mutex::new(Store {
            shrinking_logs: 100,
            ..Store::default()
        }));
        let stub = Stub {
            faults,
            store: Arc::clone(&store),
        };
        let mut urls = BTreeMap::new();
        let mut servers = Vec::new();
        for kind in ServiceKind::ALL {
            let listener = StdTcpListener::bind("127.0.0.1:0")
                .map_err(|err| format!("stub bind failed: {err}"))?;
            listener
                .set_nonblocking(true)
                .map_err(|err| format!("stub listener nonblocking failed: {err}"))?;
            let addr =
                listener.local_addr().map_err(|err| format!("stub local addr failed: {err}"))?;
            let url = Url::parse(&format!("http://{addr}"))
                .map_err(|err| format!("stub url invalid: {err}"))?;
            urls.insert(kind, url);
            servers.push((listener, router(kind, stub.clone())));
        }

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let join = thread::spawn(move || {
            let Ok(runtime) = Builder::new_current_thread().enable_all().build() else {
                return;
            };
            runtime.block_on(async move {
                let mut tasks = Vec::new();
                for (listener, app) in servers {
                    let Ok(listener) = tokio::net::TcpListener::from_std(listener) else {
                        return;
                    };
                    tasks.push(tokio::spawn(async move {
                        let _ = axum::serve(listener, app).await;
                    }));
                }
                let _ = shutdown_rx.await;
                for task in tasks {
                    task.abort();
                }
            });
        });
        Ok(Self {
            urls,
            store,
            shutdown: Some(shutdown_tx),
            join: Some(join),
        })
    }

    /// Returns the base URL of a service.
    pub fn url(&self, kind: ServiceKind) -> Url {
        self.urls[&kind].clone()
    }

    /// Local-profile configuration pointed at the stub.
    pub fn suite_config(&self) -> SuiteConfig {
        let mut config = SuiteConfig::default();
        for (kind, url) in &self.urls {
            config.endpoints.set(*kind, url.clone());
        }
        config.retry.timeout = Duration::from_secs(5);
        config.settle_delay = Duration::from_millis(20);
        config
    }

    /// Number of stored users.
    pub fn user_count(&self) -> usize {
        self.store.lock().map_or(0, |store| store.users.len())
    }

    /// Number of stored costs.
    pub fn cost_count(&self) -> usize {
        self.store.lock().map_or(0, |store| store.costs.len())
    }

    /// Number of requests served.
    pub fn request_count(&self) -> u64 {
        self.store.lock().map_or(0, |store| store.requests)
    }

    /// Inserts a user directly.
    pub fn seed_user(&self, id: u64) {
        if let Ok(mut store) = self.store.lock() {
            store.users.insert(
                id,
                json!({"id": id, "first_name": "seed", "last_name": "seed", "birthday": "2000-01-01"}),
            );
        }
    }
}

impl Drop for StubServices {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

// ============================================================================
// SECTION: Routers
// ============================================================================

fn router(kind: ServiceKind, stub: Stub) -> Router {
    let slash = !stub.faults.no_trailing_slash;
    let mut app = match kind {
        ServiceKind::Users => Router::new()
            .route("/api/add", post(add_user))
            .route("/api/users", get(list_users))
            .route("/api/users/{id}", get(get_user))
            .route("/removeuser", delete(remove_user)),
        ServiceKind::Costs => {
            let mut app = Router::new()
                .route("/api/add", post(add_cost))
                .route("/api/report", get(report))
                .route("/removecost", delete(remove_cost))
                .route("/removereport", delete(remove_report));
            if slash {
                app = app.route("/api/add/", post(add_cost)).route("/api/report/", get(report));
            }
            app
        }
        ServiceKind::Logs => Router::new().route("/api/logs", get(list_logs)),
        ServiceKind::Admin => {
            let mut app = Router::new().route("/api/about", get(about));
            if slash {
                app = app.route("/api/about/", get(about));
            }
            app
        }
    };
    app = app.layer(from_fn_with_state(stub.clone(), record_request));
    app.with_state(stub)
}

/// Counts the request, applies cold-start delay, and appends a log entry.
async fn record_request(State(stub): State<Stub>, request: Request, next: Next) -> Response {
    let number = stub
        .store
        .lock()
        .map(|mut store| {
            store.requests += 1;
            store.requests
        })
        .unwrap_or(0);
    if let Some((count, delay)) = stub.faults.cold_start {
        if number <= count {
            sleep(delay).await;
        }
    }
    let started = Instant::now();
    let response = next.run(request).await;
    let elapsed = started.elapsed().as_secs_f64() * 1000.0;
    if let Ok(mut store) = stub.store.lock() {
        let time = OffsetDateTime::now_utc().unix_timestamp();
        store.logs.push(json!({
            "level": 30,
            "time": time,
            "pid": std::process::id(),
            "hostname": "stub",
            "msg": "request completed",
            "statusCode": response.status().as_u16(),
            "responseTimeMs": elapsed,
        }));
    }
    response
}

// ============================================================================
// SECTION: Users
// ============================================================================

async fn add_user(State(stub): State<Stub>, body: Bytes) -> Response {
    let Some(body) = parse_object(&body) else {
        return stub.error(StatusCode::BAD_REQUEST, "body must be a JSON object");
    };
    let Some(id) = body.get("id").and_then(Value::as_u64) else {
        return stub.error(StatusCode::BAD_REQUEST, "id is required");
    };
    for field in ["first_name", "last_name", "birthday"] {
        if !body.get(field).is_some_and(Value::is_string) {
            return stub.error(StatusCode::BAD_REQUEST, &format!("{field} is required"));
        }
    }
    let Ok(mut store) = stub.store.lock() else {
        return stub.error(StatusCode::INTERNAL_SERVER_ERROR, "store poisoned");
    };
    if store.users.contains_key(&id) {
        drop(store);
        let status = stub
            .faults
            .duplicate_user_status
            .and_then(|status| StatusCode::from_u16(status).ok())
            .unwrap_or(StatusCode::BAD_REQUEST);
        return stub.error(status, "user already exists");
    }
    let user = Value::Object(body);
    store.users.insert(id, user.clone());
    (StatusCode::CREATED, Json(user)).into_response()
}

async fn list_users(State(stub): State<Stub>) -> Response {
    let users: Vec<Value> = stub
        .store
        .lock()
        .map(|store| {
            store
                .users
                .values()
                .map(|user| {
                    json!({
                        "id": user["id"],
                        "first_name": user["first_name"],
                        "last_name": user["last_name"],
                    })
                })
                .collect()
        })
        .unwrap_or_default();
    Json(Value::Array(users)).into_response()
}

async fn get_user(State(stub): State<Stub>, Path(id): Path<String>) -> Response {
    let Ok(id) = id.parse::<u64>() else {
        return stub.error(StatusCode::BAD_REQUEST, "id must be a number");
    };
    let Ok(store) = stub.store.lock() else {
        return stub.error(StatusCode::INTERNAL_SERVER_ERROR, "store poisoned");
    };
    let Some(user) = store.users.get(&id).cloned() else {
        drop(store);
        return stub.error(StatusCode::BAD_REQUEST, "user not found");
    };
    let total: f64 = store.costs.iter().filter(|cost| cost.userid == id).map(|cost| cost.sum).sum();
    Json(json!({
        "id": id,
        "first_name": user["first_name"],
        "last_name": user["last_name"],
        "total": total,
    }))
    .into_response()
}

async fn remove_user(State(stub): State<Stub>, body: Bytes) -> Response {
    let id = parse_object(&body).and_then(|body| body.get("id").and_then(Value::as_u64));
    let removed = match (id, stub.store.lock()) {
        (Some(id), Ok(mut store)) => store.users.remove(&id).is_some(),
        _ => false,
    };
    Json(json!({ "removed": removed })).into_response()
}

// ============================================================================
// SECTION: Costs
// ============================================================================

async fn add_cost(State(stub): State<Stub>, body: Bytes) -> Response {
    if stub.faults.costs_broken {
        return stub.error(StatusCode::INTERNAL_SERVER_ERROR, "database unavailable");
    }
    let Some(body) = parse_object(&body) else {
        return stub.error(StatusCode::BAD_REQUEST, "body must be a JSON object");
    };
    let Some(userid) =
        body.get("userid").or_else(|| body.get("user_id")).and_then(Value::as_u64)
    else {
        return stub.error(StatusCode::BAD_REQUEST, "userid is required");
    };
    let (Some(description), Some(category), Some(sum)) = (
        body.get("description").and_then(Value::as_str),
        body.get("category").and_then(Value::as_str),
        body.get("sum").and_then(Value::as_f64),
    ) else {
        return stub.error(StatusCode::BAD_REQUEST, "description, category, and sum are required");
    };
    if !CATEGORIES.contains(&category) && !stub.faults.accept_invalid_category {
        return stub.error(StatusCode::BAD_REQUEST, "invalid category");
    }
    let Ok(mut store) = stub.store.lock() else {
        return stub.error(StatusCode::INTERNAL_SERVER_ERROR, "store poisoned");
    };
    if !store.users.contains_key(&userid) {
        drop(store);
        return stub.error(StatusCode::BAD_REQUEST, "user does not exist");
    }
    let today = OffsetDateTime::now_utc().date();
    let date_part = |name: &str, fallback: i64| body.get(name).and_then(Value::as_i64).unwrap_or(fallback);
    store.next_cost_id += 1;
    let cost = StoredCost {
        id: format!("cost-{:06}", store.next_cost_id),
        userid,
        year: date_part("year", i64::from(today.year())),
        month: date_part("month", i64::from(u8::from(today.month()))),
        day: date_part("day", i64::from(today.day())),
        description: description.to_string(),
        category: category.to_string(),
        sum,
    };
    store.costs.push(cost.clone());
    let mut echo = json!({
        "userid": cost.userid,
        "year": cost.year,
        "month": cost.month,
        "day": cost.day,
        "description": cost.description,
        "category": cost.category,
        "sum": body.get("sum").cloned().unwrap_or(Value::Null),
    });
    if stub.faults.echo_cost_id {
        echo["_id"] = Value::from(cost.id);
    }
    (StatusCode::CREATED, Json(echo)).into_response()
}

async fn report(State(stub): State<Stub>, Query(query): Query<HashMap<String, String>>) -> Response {
    let id = query.get("id").or_else(|| query.get("user_id")).and_then(|id| id.parse::<u64>().ok());
    let year = query.get("year").and_then(|year| year.parse::<i64>().ok());
    let month = query.get("month").and_then(|month| month.parse::<i64>().ok());
    let (Some(id), Some(year), Some(month)) = (id, year, month) else {
        return stub.error(StatusCode::BAD_REQUEST, "id, year, and month are required");
    };
    let Ok(mut store) = stub.store.lock() else {
        return stub.error(StatusCode::INTERNAL_SERVER_ERROR, "store poisoned");
    };
    let visible = if stub.faults.report_frozen {
        let len = store.costs.len();
        *store.frozen_costs.get_or_insert(len)
    } else {
        store.costs.len()
    };
    let mut costs = Vec::new();
    for category in CATEGORIES {
        if stub.faults.drop_report_category && category == "sports" {
            continue;
        }
        let items: Vec<Value> = store
            .costs
            .iter()
            .take(visible)
            .filter(|cost| {
                cost.userid == id
                    && cost.year == year
                    && cost.month == month
                    && cost.category == category
            })
            .map(|cost| json!({"sum": cost.sum, "description": cost.description, "day": cost.day}))
            .collect();
        let mut bucket = Map::new();
        bucket.insert(category.to_string(), Value::Array(items));
        costs.push(Value::Object(bucket));
    }
    Json(json!({ "userid": id, "year": year, "month": month, "costs": costs })).into_response()
}

async fn remove_cost(State(stub): State<Stub>, body: Bytes) -> Response {
    let id = parse_object(&body)
        .and_then(|body| body.get("_id").and_then(Value::as_str).map(str::to_string));
    let removed = match (id, stub.store.lock()) {
        (Some(id), Ok(mut store)) => {
            let before = store.costs.len();
            store.costs.retain(|cost| cost.id != id);
            before - store.costs.len()
        }
        _ => 0,
    };
    Json(json!({ "removed": removed })).into_response()
}

async fn remove_report(State(stub): State<Stub>, body: Bytes) -> Response {
    let body = parse_object(&body).unwrap_or_default();
    let field = |name: &str| body.get(name).and_then(Value::as_i64);
    let user = field("user_id").or_else(|| field("userid"));
    let removed = match (user, field("year"), field("month"), stub.store.lock()) {
        (Some(user), Some(year), Some(month), Ok(mut store)) => {
            let before = store.costs.len();
            store.costs.retain(|cost| {
                !(i64::try_from(cost.userid).ok() == Some(user)
                    && cost.year == year
                    && cost.month == month)
            });
            before - store.costs.len()
        }
        _ => 0,
    };
    Json(json!({ "removed": removed })).into_response()
}

// ============================================================================
// SECTION: Logs and Admin
// ============================================================================

async fn list_logs(State(stub): State<Stub>) -> Response {
    let Ok(mut store) = stub.store.lock() else {
        return stub.error(StatusCode::INTERNAL_SERVER_ERROR, "store poisoned");
    };
    if stub.faults.shrink_logs {
        store.shrinking_logs = store.shrinking_logs.saturating_sub(10);
        let entries = vec![json!({"level": 30, "msg": "request completed"}); store.shrinking_logs];
        return Json(Value::Array(entries)).into_response();
    }
    Json(Value::Array(store.logs.clone())).into_response()
}

async fn about(State(stub): State<Stub>) -> Response {
    let mut members = vec![
        json!({"first_name": "Dana", "last_name": "Levi"}),
        json!({"first_name": "Omer", "last_name": "Cohen"}),
    ];
    if stub.faults.about_extra_field {
        members[1]["email"] = Value::from("omer@example.com");
    }
    Json(Value::Array(members)).into_response()
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

impl Stub {
    /// Builds an `{id, message}` error response.
    fn error(&self, status: StatusCode, message: &str) -> Response {
        let mut body = json!({ "id": status.as_u16() });
        if !self.faults.missing_error_message {
            body["message"] = Value::from(message);
        }
        (status, Json(body)).into_response()
    }
}

fn parse_object(body: &Bytes) -> Option<Map<String, Value>> {
    match serde_json::from_slice(body) {
        Ok(Value::Object(object)) => Some(object),
        _ => None,
    }
}
