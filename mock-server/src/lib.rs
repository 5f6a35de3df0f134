use std::{
    net::SocketAddr,
    sync::Arc,
    time::{Duration, SystemTime},
};

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, error, info};

pub const DEFAULT_TOKEN: &str = "test-token";

/// Error codes of the remote API, sent with HTTP 200.
pub const ERR_TOKEN: i64 = 40011;
pub const ERR_PARAMS: i64 = 400;
pub const ERR_NOT_FOUND: i64 = 490;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Project {
    #[serde(rename = "_id")]
    pub id: i64,
    pub uid: i64,
    pub group_id: i64,
    pub name: String,
    pub role: bool,
    pub env: Vec<Value>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Category {
    #[serde(rename = "_id")]
    pub id: i64,
    pub uid: i64,
    pub project_id: i64,
    pub name: String,
    pub desc: String,
    pub add_time: i64,
    pub up_time: i64,
}

/// In-memory state of one project.
#[derive(Debug)]
pub struct Store {
    pub token: String,
    pub project: Project,
    pub categories: Vec<Category>,
    /// Interface records kept as the JSON objects clients sent.
    pub interfaces: Vec<Map<String, Value>>,
    next_category_id: i64,
    next_interface_id: i64,
}

impl Store {
    pub fn new(token: &str) -> Self {
        let now = now();
        let project = Project {
            id: 11,
            uid: 2,
            group_id: 0,
            name: "demo".to_string(),
            role: false,
            env: vec![json!({
                "_id": "env-local",
                "name": "local",
                "domain": "http://127.0.0.1",
                "header": [],
                "global": [],
            })],
        };
        let public = Category {
            id: 1,
            uid: project.uid,
            project_id: project.id,
            name: "public".to_string(),
            desc: "default category".to_string(),
            add_time: now,
            up_time: now,
        };
        Self {
            token: token.to_string(),
            project,
            categories: vec![public],
            interfaces: Vec::new(),
            next_category_id: 2,
            next_interface_id: 1,
        }
    }

    fn category_by_name(&mut self, name: &str) -> Option<&mut Category> {
        self.categories.iter_mut().find(|c| c.name == name)
    }

    fn add_category(&mut self, name: &str, desc: &str) -> Category {
        let now = now();
        let category = Category {
            id: self.next_category_id,
            uid: self.project.uid,
            project_id: self.project.id,
            name: name.to_string(),
            desc: desc.to_string(),
            add_time: now,
            up_time: now,
        };
        self.next_category_id += 1;
        self.categories.push(category.clone());
        category
    }

    fn interface_mut(&mut self, id: i64) -> Option<&mut Map<String, Value>> {
        self.interfaces
            .iter_mut()
            .find(|i| i.get("_id").and_then(Value::as_i64) == Some(id))
    }

    fn insert_interface(&mut self, mut record: Map<String, Value>) -> Map<String, Value> {
        let now = now();
        record.insert("_id".to_string(), json!(self.next_interface_id));
        record.insert("project_id".to_string(), json!(self.project.id));
        record.insert("uid".to_string(), json!(self.project.uid));
        record.insert("add_time".to_string(), json!(now));
        record.insert("up_time".to_string(), json!(now));
        self.next_interface_id += 1;
        self.interfaces.push(record.clone());
        record
    }
}

pub type Db = Arc<RwLock<Store>>;

/// Stub of the remote API accepting [`DEFAULT_TOKEN`].
pub fn app() -> Router {
    app_with_token(DEFAULT_TOKEN)
}

pub fn app_with_token(token: &str) -> Router {
    let db: Db = Arc::new(RwLock::new(Store::new(token)));
    Router::new()
        .route("/api/project/get", get(get_project))
        .route("/api/interface/getCatMenu", get(get_cat_menu))
        .route("/api/interface/add_cat", post(add_cat))
        .route("/api/interface/list_cat", get(list_cat))
        .route("/api/interface/get", get(get_interface))
        .route("/api/interface/save", post(save_interface))
        .route("/api/open/import_data", post(import_data))
        .with_state(db)
}

/// Answers every request with `status` and `body`.
pub fn fixed_response_app(status: StatusCode, body: &str) -> Router {
    let body = body.to_string();
    Router::new().fallback(move || {
        let body = body.clone();
        async move { (status, body) }
    })
}

/// Redirects every request back to `/`.
pub fn redirect_loop_app() -> Router {
    Router::new().fallback(|| async { (StatusCode::FOUND, [(header::LOCATION, "/")]) })
}

/// Answers every request with an empty JSON object after `delay`.
pub fn slow_app(delay: Duration) -> Router {
    Router::new().fallback(move || async move {
        tokio::time::sleep(delay).await;
        Json(json!({}))
    })
}

pub async fn run(listener: TcpListener, app: Router) -> Result<(), std::io::Error> {
    axum::serve(listener, app).await
}

/// Serve `app` on a random local port from a background thread with its own
/// runtime. Returns the bound address.
pub fn serve_in_background(app: Router) -> std::io::Result<SocketAddr> {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    let addr = std_listener.local_addr()?;
    std_listener.set_nonblocking(true)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    std::thread::spawn(move || {
        let served = runtime.block_on(async {
            let listener = TcpListener::from_std(std_listener)?;
            run(listener, app).await
        });
        if let Err(err) = served {
            error!(%addr, %err, "background server stopped");
        }
    });
    Ok(addr)
}

fn now() -> i64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

fn ok(data: Value) -> Json<Value> {
    Json(json!({ "errcode": 0, "errmsg": "success", "data": data }))
}

fn fail(errcode: i64, errmsg: &str) -> Json<Value> {
    Json(json!({ "errcode": errcode, "errmsg": errmsg, "data": null }))
}

fn token_ok(store: &Store, token: Option<&str>) -> bool {
    token == Some(store.token.as_str())
}

fn bad_token() -> Json<Value> {
    fail(ERR_TOKEN, "token is invalid")
}

// --- project ---

#[derive(Deserialize)]
pub struct TokenQuery {
    pub token: Option<String>,
}

async fn get_project(State(db): State<Db>, Query(q): Query<TokenQuery>) -> Json<Value> {
    let store = db.read().await;
    if !token_ok(&store, q.token.as_deref()) {
        return bad_token();
    }
    debug!("project/get");
    ok(json!(store.project))
}

// --- categories ---

#[derive(Deserialize)]
pub struct CatMenuQuery {
    pub token: Option<String>,
    pub project_id: Option<i64>,
}

async fn get_cat_menu(State(db): State<Db>, Query(q): Query<CatMenuQuery>) -> Json<Value> {
    let store = db.read().await;
    if !token_ok(&store, q.token.as_deref()) {
        return bad_token();
    }
    if q.project_id != Some(store.project.id) {
        return fail(ERR_PARAMS, "project does not exist");
    }
    debug!(categories = store.categories.len(), "interface/getCatMenu");
    ok(json!(store.categories))
}

#[derive(Deserialize)]
pub struct AddCat {
    pub token: Option<String>,
    #[serde(default)]
    pub project_id: i64,
    #[serde(rename = "_id", default)]
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub desc: String,
}

async fn add_cat(State(db): State<Db>, Json(input): Json<AddCat>) -> Json<Value> {
    let mut store = db.write().await;
    if !token_ok(&store, input.token.as_deref()) {
        return bad_token();
    }
    if input.project_id != store.project.id {
        return fail(ERR_PARAMS, "project does not exist");
    }
    if input.name.is_empty() {
        return fail(ERR_PARAMS, "name is required");
    }

    let existing = if input.id != 0 {
        store.categories.iter_mut().find(|c| c.id == input.id)
    } else {
        store.category_by_name(&input.name)
    };
    if let Some(category) = existing {
        category.name = input.name;
        category.desc = input.desc;
        category.up_time = now();
        info!(id = category.id, "category updated");
        return ok(json!({ "ok": 1, "nModified": 1, "n": 1 }));
    }

    let category = store.add_category(&input.name, &input.desc);
    info!(id = category.id, "category created");
    ok(json!(category))
}

// --- interfaces ---

#[derive(Deserialize)]
pub struct ListQuery {
    pub token: Option<String>,
    pub catid: Option<i64>,
    #[serde(rename = "Page")]
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

async fn list_cat(State(db): State<Db>, Query(q): Query<ListQuery>) -> Json<Value> {
    let store = db.read().await;
    if !token_ok(&store, q.token.as_deref()) {
        return bad_token();
    }
    let matching: Vec<&Map<String, Value>> = store
        .interfaces
        .iter()
        .filter(|i| match q.catid {
            Some(catid) if catid != 0 => i.get("catid").and_then(Value::as_i64) == Some(catid),
            _ => true,
        })
        .collect();

    let page = q.page.unwrap_or(0);
    let limit = q.limit.unwrap_or(0);
    let list: Vec<&Map<String, Value>> = if page == 0 || limit == 0 {
        Vec::new()
    } else {
        let offset = (page - 1).saturating_mul(limit);
        matching.iter().copied().skip(offset).take(limit).collect()
    };
    let pages = if limit == 0 { 0 } else { matching.len().div_ceil(limit) };

    debug!(matching = matching.len(), returned = list.len(), "interface/list_cat");
    ok(json!({ "count": matching.len(), "total": pages, "list": list }))
}

#[derive(Deserialize)]
pub struct IdQuery {
    pub token: Option<String>,
    pub id: Option<i64>,
}

async fn get_interface(State(db): State<Db>, Query(q): Query<IdQuery>) -> Json<Value> {
    let store = db.read().await;
    if !token_ok(&store, q.token.as_deref()) {
        return bad_token();
    }
    let found = q.id.and_then(|id| {
        store
            .interfaces
            .iter()
            .find(|i| i.get("_id").and_then(Value::as_i64) == Some(id))
    });
    match found {
        Some(record) => ok(Value::Object(record.clone())),
        None => fail(ERR_NOT_FOUND, "interface does not exist"),
    }
}

async fn save_interface(State(db): State<Db>, Json(input): Json<Value>) -> Json<Value> {
    let Value::Object(mut record) = input else {
        return fail(ERR_PARAMS, "body must be an object");
    };
    let mut store = db.write().await;
    let token = record.remove("token");
    if !token_ok(&store, token.as_ref().and_then(Value::as_str)) {
        return bad_token();
    }

    let id = record.get("_id").and_then(Value::as_i64).unwrap_or(0);
    if id != 0 {
        let Some(existing) = store.interface_mut(id) else {
            return fail(ERR_NOT_FOUND, "interface does not exist");
        };
        for (key, value) in record {
            if !matches!(key.as_str(), "_id" | "project_id" | "uid" | "add_time") {
                existing.insert(key, value);
            }
        }
        existing.insert("up_time".to_string(), json!(now()));
        info!(id, "interface updated");
        return ok(json!([{ "ok": 1, "nModified": 1, "n": 1 }]));
    }

    let catid = record.get("catid").and_then(Value::as_i64).unwrap_or(0);
    if !store.categories.iter().any(|c| c.id == catid) {
        return fail(ERR_PARAMS, "category does not exist");
    }
    let created = store.insert_interface(record);
    let id = created.get("_id").and_then(Value::as_i64);
    info!(?id, "interface created");
    ok(Value::Object(created))
}

#[derive(Deserialize)]
pub struct ImportData {
    pub token: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub json: String,
    #[serde(default)]
    pub merge: String,
}

const HTTP_METHODS: [&str; 7] = ["get", "post", "put", "delete", "patch", "head", "options"];

async fn import_data(State(db): State<Db>, Json(input): Json<ImportData>) -> Json<Value> {
    let mut store = db.write().await;
    if !token_ok(&store, input.token.as_deref()) {
        return bad_token();
    }
    if input.kind != "swagger" {
        return fail(ERR_PARAMS, "unsupported import type");
    }
    let Ok(document) = serde_json::from_str::<Value>(&input.json) else {
        return fail(ERR_PARAMS, "json format error");
    };
    let Some(paths) = document.get("paths").and_then(Value::as_object) else {
        return fail(ERR_PARAMS, "document has no paths");
    };

    let mut imported = 0usize;
    for (path, operations) in paths {
        let Some(operations) = operations.as_object() else {
            continue;
        };
        for (method, operation) in operations {
            if !HTTP_METHODS.contains(&method.as_str()) {
                continue;
            }
            let method = method.to_uppercase();
            let category_name = operation
                .get("tags")
                .and_then(|t| t.get(0))
                .and_then(Value::as_str)
                .unwrap_or("public")
                .to_string();
            let catid = match store.category_by_name(&category_name) {
                Some(category) => category.id,
                None => store.add_category(&category_name, "").id,
            };
            let title = operation
                .get("summary")
                .and_then(Value::as_str)
                .unwrap_or(path.as_str())
                .to_string();

            let existing = store.interfaces.iter_mut().find(|i| {
                i.get("path").and_then(Value::as_str) == Some(path.as_str())
                    && i.get("method").and_then(Value::as_str) == Some(method.as_str())
            });
            match existing {
                Some(record) if input.merge == "merge" => {
                    record.insert("title".to_string(), json!(title));
                    record.insert("catid".to_string(), json!(catid));
                    record.insert("up_time".to_string(), json!(now()));
                }
                Some(_) => continue,
                None => {
                    let mut record = Map::new();
                    record.insert("title".to_string(), json!(title));
                    record.insert("path".to_string(), json!(path));
                    record.insert("method".to_string(), json!(method));
                    record.insert("catid".to_string(), json!(catid));
                    record.insert("status".to_string(), json!("undone"));
                    store.insert_interface(record);
                }
            }
            imported += 1;
        }
    }

    info!(imported, mode = %input.merge, "swagger imported");
    Json(json!({
        "errcode": 0,
        "errmsg": format!("imported {imported} interfaces"),
        "data": null,
    }))
}
