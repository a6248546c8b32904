//! Integration tests for JiraService + AdoService against a fake tracker.
//!
//! Each test spawns an in-process axum server on 127.0.0.1:0 that serves the
//! handful of Jira and Azure DevOps endpoints the services use.

use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use ticketbox_service::catalog::ALL_WORK_ITEMS_QUERY;
use ticketbox_service::{
    load_work_item_catalog, AdoService, IssueSearch, IssueTracker, JiraService, TrackerError,
    WorkItemTracker,
};

const AUTH: &str = "Basic dXNlcjpzZWNyZXQ=";

#[derive(Default)]
struct FakeState {
    comments: Vec<(String, String)>,
    wiql_queries: Vec<String>,
    search_queries: Vec<(String, String, String)>,
}

type Shared = Arc<Mutex<FakeState>>;

fn authorized(headers: &HeaderMap) -> bool {
    headers.get("authorization").and_then(|v| v.to_str().ok()) == Some(AUTH)
}

async fn get_issue(
    Path(key): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
    headers: HeaderMap,
) -> Result<Json<Value>, StatusCode> {
    if !authorized(&headers) {
        return Err(StatusCode::UNAUTHORIZED);
    }
    let fields = params
        .iter()
        .find(|(k, _)| k == "fields")
        .map(|(_, v)| v.as_str());
    if fields != Some("summary,description,comment") {
        return Err(StatusCode::BAD_REQUEST);
    }
    match key.as_str() {
        "ABC-1" => Ok(Json(json!({
            "key": "ABC-1",
            "fields": {
                "summary": "Login broken",
                "description": "See 0123abcd",
                "comment": { "comments": [ { "body": "first" } ] }
            }
        }))),
        "ABC-500" => Err(StatusCode::INTERNAL_SERVER_ERROR),
        _ => Err(StatusCode::NOT_FOUND),
    }
}

async fn post_comment(
    State(state): State<Shared>,
    Path(key): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Value>), StatusCode> {
    if !authorized(&headers) {
        return Err(StatusCode::UNAUTHORIZED);
    }
    let text = body["body"].as_str().ok_or(StatusCode::BAD_REQUEST)?;
    state.lock().unwrap().comments.push((key, text.to_string()));
    Ok((StatusCode::CREATED, Json(json!({ "id": "1" }))))
}

async fn search(
    State(state): State<Shared>,
    Query(params): Query<Vec<(String, String)>>,
) -> Json<Value> {
    let param = |name: &str| {
        params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.clone())
            .unwrap_or_default()
    };
    let start_at: usize = param("startAt").parse().unwrap_or(0);
    let max: usize = param("maxResults").parse().unwrap_or(50);
    state
        .lock()
        .unwrap()
        .search_queries
        .push((param("jql"), param("fields"), param("startAt")));

    let total = 5;
    let issues: Vec<Value> = (start_at..total.min(start_at + max))
        .map(|n| {
            json!({
                "key": format!("ABC-{}", n + 1),
                "fields": {
                    "issuelinks": [{
                        "type": { "inward": "is blocked by", "outward": "blocks" },
                        "outwardIssue": { "key": format!("ABC-{}", n + 2) }
                    }]
                }
            })
        })
        .collect();
    Json(json!({ "startAt": start_at, "maxResults": max, "total": total, "issues": issues }))
}

async fn wiql(
    State(state): State<Shared>,
    Query(params): Query<Vec<(String, String)>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    if !authorized(&headers) {
        return Err(StatusCode::UNAUTHORIZED);
    }
    if !params.iter().any(|(k, v)| k == "api-version" && v == "7.0") {
        return Err(StatusCode::BAD_REQUEST);
    }
    let query = body["query"].as_str().unwrap_or_default().to_string();
    state.lock().unwrap().wiql_queries.push(query);
    let items: Vec<Value> = (1..=150).map(|id| json!({ "id": id })).collect();
    Ok(Json(json!({ "workItems": items })))
}

async fn work_items(Query(params): Query<Vec<(String, String)>>) -> Result<Json<Value>, StatusCode> {
    let expand = params.iter().any(|(k, v)| k == "$expand" && v == "relations");
    if !expand {
        return Err(StatusCode::BAD_REQUEST);
    }
    let ids = params
        .iter()
        .find(|(k, _)| k == "ids")
        .map(|(_, v)| v.clone())
        .ok_or(StatusCode::BAD_REQUEST)?;
    let value: Vec<Value> = ids
        .split(',')
        .map(|id| {
            json!({
                "id": id.parse::<u64>().unwrap(),
                "url": format!("https://ado.example/_apis/wit/workItems/{id}"),
                "fields": { "System.Title": format!("ABC-{id} work") },
                "relations": [
                    { "rel": "System.LinkTypes.Related", "url": "https://ado.example/_apis/wit/workItems/1" }
                ]
            })
        })
        .collect();
    Ok(Json(json!({ "count": value.len(), "value": value })))
}

async fn spawn_server() -> (String, Shared) {
    let state: Shared = Arc::default();
    let app = Router::new()
        .route("/jira/rest/api/2/issue/{key}", get(get_issue))
        .route("/jira/rest/api/2/issue/{key}/comment", post(post_comment))
        .route("/jira/rest/api/2/search", get(search))
        .route("/ado/_apis/wit/wiql", post(wiql))
        .route("/ado/_apis/wit/workitems", get(work_items))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), state)
}

// ---- Jira ----

#[tokio::test]
async fn get_issue_returns_text_fields() {
    let (url, _) = spawn_server().await;
    let jira = JiraService::new(&format!("{url}/jira"), AUTH.into()).unwrap();

    let issue = jira.get_issue("ABC-1").await.unwrap().unwrap();
    assert_eq!(issue.summary.as_deref(), Some("Login broken"));
    assert_eq!(issue.description.as_deref(), Some("See 0123abcd"));
    assert_eq!(issue.comments, ["first"]);
}

#[tokio::test]
async fn missing_issue_is_none() {
    let (url, _) = spawn_server().await;
    let jira = JiraService::new(&format!("{url}/jira/"), AUTH.into()).unwrap();
    assert!(jira.get_issue("ABC-404").await.unwrap().is_none());
}

#[tokio::test]
async fn server_error_carries_status() {
    let (url, _) = spawn_server().await;
    let jira = JiraService::new(&format!("{url}/jira"), AUTH.into()).unwrap();
    let err = jira.get_issue("ABC-500").await.unwrap_err();
    assert!(matches!(err, TrackerError::Transport { status: 500, .. }));
}

#[tokio::test]
async fn wrong_credentials_are_a_transport_error() {
    let (url, _) = spawn_server().await;
    let jira = JiraService::new(&format!("{url}/jira"), "Basic bm9wZQ==".into()).unwrap();
    let err = jira.post_comment("ABC-1", "hi").await.unwrap_err();
    assert!(matches!(err, TrackerError::Transport { status: 401, .. }));
}

#[tokio::test]
async fn post_comment_sends_body() {
    let (url, state) = spawn_server().await;
    let jira = JiraService::new(&format!("{url}/jira"), AUTH.into()).unwrap();

    jira.post_comment("ABC-1", "Related commits in app:\n\n")
        .await
        .unwrap();

    let comments = state.lock().unwrap().comments.clone();
    assert_eq!(
        comments,
        [("ABC-1".to_string(), "Related commits in app:\n\n".to_string())]
    );
}

#[tokio::test]
async fn search_pages_through_all_issues() {
    let (url, state) = spawn_server().await;
    let jira = JiraService::new(&format!("{url}/jira"), AUTH.into()).unwrap();

    let mut search = IssueSearch::new(&jira, "project = ABC ORDER BY key ASC").with_page_size(2);
    let mut keys = Vec::new();
    while let Some(issue) = search.next().await.unwrap() {
        assert_eq!(issue.outward_links.len(), 1);
        keys.push(issue.key);
    }
    assert_eq!(keys, ["ABC-1", "ABC-2", "ABC-3", "ABC-4", "ABC-5"]);

    let queries = state.lock().unwrap().search_queries.clone();
    let offsets: Vec<&str> = queries.iter().map(|(_, _, s)| s.as_str()).collect();
    assert_eq!(offsets, ["0", "2", "4"]);
    assert!(queries
        .iter()
        .all(|(jql, fields, _)| jql == "project = ABC ORDER BY key ASC" && fields == "issuelinks"));
}

// ---- ADO ----

#[tokio::test]
async fn wiql_query_returns_ids() {
    let (url, state) = spawn_server().await;
    let ado = AdoService::new(&format!("{url}/ado"), AUTH.into()).unwrap();

    let ids = ado.query_ids(ALL_WORK_ITEMS_QUERY).await.unwrap();
    assert_eq!(ids.len(), 150);
    assert_eq!(
        state.lock().unwrap().wiql_queries,
        ["select [Id] from WorkItems"]
    );
}

#[tokio::test]
async fn catalog_loads_every_work_item() {
    let (url, _) = spawn_server().await;
    let ado = AdoService::new(&format!("{url}/ado"), AUTH.into()).unwrap();

    let catalog = load_work_item_catalog(&ado, false).await.unwrap();
    assert_eq!(catalog.len(), 150);

    let item = catalog.find_by_issue_key("ABC-42").unwrap();
    assert_eq!(item.id, 42);
    assert!(item.has_relation(
        "System.LinkTypes.Related",
        "https://ado.example/_apis/wit/workItems/1"
    ));
}
