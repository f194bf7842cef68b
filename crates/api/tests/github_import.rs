//! GitHub client and import actions against a local stand-in for the
//! GitHub REST API.

mod common;

use assert_matches::assert_matches;
use axum::extract::Path;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use common::{body_json, build_test_app_with_github};
use folio_api::github::{GithubClient, GithubError};
use serde_json::{json, Value};
use sqlx::PgPool;

fn repository(id: i64, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "description": format!("{name} description"),
        "language": "Rust",
        "html_url": format!("https://github.com/octocat/{name}"),
        "homepage": "",
        "created_at": "2021-04-02T10:00:00Z",
        "topics": ["cli", "rust"],
        "stargazers_count": 3,
        "fork": false
    })
}

/// Serve a fake API on an ephemeral port and return its base URL.
async fn spawn_github_stub() -> String {
    let app = Router::new()
        .route(
            "/users/{user}/repos",
            get(|Path(user): Path<String>, headers: HeaderMap| async move {
                match user.as_str() {
                    "octocat" => Ok(Json(json!([
                        repository(101, "hello-world"),
                        repository(102, "spoon-knife")
                    ]))),
                    // Echo the Authorization header back as the repo name.
                    "echo" => {
                        let auth = headers
                            .get("authorization")
                            .and_then(|v| v.to_str().ok())
                            .unwrap_or("")
                            .to_string();
                        Ok(Json(json!([{ "id": 1, "name": auth }])))
                    }
                    _ => Err((StatusCode::NOT_FOUND, "{\"message\":\"Not Found\"}")),
                }
            }),
        )
        .route(
            "/repos/{owner}/{name}",
            get(|Path((_owner, name)): Path<(String, String)>| async move {
                Json(repository(103, &name))
            }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

#[tokio::test]
async fn client_lists_repositories() {
    let base = spawn_github_stub().await;
    let client = GithubClient::new(format!("{base}/"));

    let repos = client.list_repositories("octocat", None).await.unwrap();
    let names: Vec<&str> = repos.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["hello-world", "spoon-knife"]);
    assert_eq!(repos[0].topics, vec!["cli", "rust"]);
}

#[tokio::test]
async fn client_surfaces_api_errors() {
    let base = spawn_github_stub().await;
    let client = GithubClient::new(base);

    let err = client.list_repositories("nobody", None).await.unwrap_err();
    assert_matches!(err, GithubError::ApiError { status: 404, ref body } if body.contains("Not Found"));
}

#[tokio::test]
async fn token_is_sent_as_bearer() {
    let base = spawn_github_stub().await;
    let client = GithubClient::new(base);

    let repos = client.list_repositories("echo", Some(" s3cret ")).await.unwrap();
    assert_eq!(repos[0].name, "Bearer s3cret");

    let repos = client.list_repositories("echo", Some("  ")).await.unwrap();
    assert_eq!(repos[0].name, "");
}

// ---------------------------------------------------------------------------
// Admin actions
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn get_github_repos_marks_linked_projects(pool: PgPool) {
    let base = spawn_github_stub().await;
    let app = build_test_app_with_github(pool, &base);

    let response = app
        .action(&[
            ("action", "import_github_project"),
            ("repository", &repository(101, "hello-world").to_string()),
        ])
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let project_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    app.action(&[("action", "save_statistics"), ("github_username", "octocat")])
        .await;
    let response = app.action(&[("action", "get_github_repos")]).await;
    assert_eq!(response.status(), StatusCode::OK);
    let data = body_json(response).await["data"].clone();
    assert_eq!(data[0]["name"], "hello-world");
    assert_eq!(data[0]["project_id"], project_id);
    assert!(data[1]["project_id"].is_null());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn get_github_repos_needs_username(pool: PgPool) {
    let base = spawn_github_stub().await;
    let app = build_test_app_with_github(pool, &base);

    let response = app.action(&[("action", "get_github_repos")]).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn upstream_failure_is_bad_gateway(pool: PgPool) {
    let base = spawn_github_stub().await;
    let app = build_test_app_with_github(pool, &base);

    let response = app
        .action(&[("action", "get_github_repos"), ("username", "nobody")])
        .await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(body_json(response).await["code"], "EXTERNAL_ERROR");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn import_creates_then_updates(pool: PgPool) {
    let base = spawn_github_stub().await;
    let app = build_test_app_with_github(pool, &base);

    let response = app
        .action(&[
            ("action", "import_github_project"),
            ("username", "octocat"),
            ("repo_name", "linguist"),
        ])
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Project imported from GitHub");
    assert_eq!(json["data"]["created"], true);
    let id = json["data"]["id"].as_i64().unwrap();

    let response = app
        .action(&[("action", "get_project"), ("id", &id.to_string())])
        .await;
    let project = body_json(response).await["data"].clone();
    assert_eq!(project["title"], "Linguist");
    assert_eq!(project["github_repo_id"], 103);
    assert_eq!(project["status"], "completed");
    assert_eq!(project["year"], 2021);
    assert_eq!(project["tools"], json!(["Rust", "cli"]));

    let xml = std::fs::read_to_string(&app.config.sitemap_path).unwrap();
    assert!(xml.contains(&format!("/project?id={id}")));

    let response = app
        .action(&[
            ("action", "import_github_project"),
            ("username", "octocat"),
            ("repo_name", "linguist"),
        ])
        .await;
    let json = body_json(response).await;
    assert_eq!(json["message"], "Project updated from GitHub");
    assert_eq!(json["data"]["created"], false);
    assert_eq!(json["data"]["id"], id);

    let response = app.action(&[("action", "get_projects")]).await;
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 1);
}
