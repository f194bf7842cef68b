#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, COOKIE};
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tempfile::TempDir;
use tower::ServiceExt;

use folio_api::auth::jwt::{generate_session_token, JwtConfig, SESSION_COOKIE};
use folio_api::auth::password::hash_password;
use folio_api::config::{AdminConfig, ServerConfig};
use folio_api::github::GithubClient;
use folio_api::router::build_app_router;
use folio_api::state::AppState;
use folio_api::templates;

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "correct horse battery staple";
pub const MULTIPART_BOUNDARY: &str = "folio-test-boundary";

/// One argon2 hash per test binary; hashing is slow by construction.
fn admin_password_hash() -> String {
    static HASH: OnceLock<String> = OnceLock::new();
    HASH.get_or_init(|| hash_password(ADMIN_PASSWORD).expect("hashing should succeed"))
        .clone()
}

/// A router plus the temporary directories it writes into.
pub struct TestApp {
    pub app: Router,
    pub config: ServerConfig,
    _dir: TempDir,
}

impl TestApp {
    /// Session token for the configured admin.
    pub fn admin_token(&self) -> String {
        generate_session_token(ADMIN_USERNAME, &self.config.jwt).unwrap()
    }

    pub fn admin_cookie(&self) -> String {
        format!("{SESSION_COOKIE}={}", self.admin_token())
    }

    /// POST /admin/api as the signed-in admin.
    pub async fn action(&self, fields: &[(&str, &str)]) -> Response {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/admin/api")
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header(COOKIE, self.admin_cookie())
            .body(Body::from(encode_form(fields)))
            .unwrap();
        self.app.clone().oneshot(request).await.unwrap()
    }

    /// Multipart POST /admin/api as the signed-in admin.
    pub async fn action_multipart(&self, body: Vec<u8>) -> Response {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/admin/api")
            .header(
                CONTENT_TYPE,
                format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
            )
            .header(COOKIE, self.admin_cookie())
            .body(Body::from(body))
            .unwrap();
        self.app.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str) -> Response {
        get(self.app.clone(), uri).await
    }
}

/// Build a test `ServerConfig` rooted in `dir`.
pub fn test_config(dir: &TempDir, github_api_url: &str) -> ServerConfig {
    let root = dir.path();
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        db_max_connections: 5,
        site_base_url: "https://folio.test".to_string(),
        static_dir: root.join("static"),
        upload_root: root.join("uploads"),
        gallery_subdir: "gallery".to_string(),
        sitemap_path: root.join("sitemap.xml"),
        default_project_id: 1,
        github_api_url: github_api_url.to_string(),
        admin: AdminConfig {
            username: ADMIN_USERNAME.to_string(),
            password_hash: admin_password_hash(),
        },
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            session_expiry_mins: 30,
        },
    }
}

/// Build the full application router over `pool`, writing files into a
/// fresh temporary directory.
pub fn build_test_app(pool: PgPool) -> TestApp {
    build_test_app_with_github(pool, "http://127.0.0.1:9")
}

pub fn build_test_app_with_github(pool: PgPool, github_api_url: &str) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir, github_api_url);

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        github: Arc::new(GithubClient::new(config.github_api_url.clone())),
        templates: Arc::new(templates::build().unwrap()),
    };

    TestApp {
        app: build_app_router(state, &config),
        config,
        _dir: dir,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_form(app: Router, uri: &str, fields: &[(&str, &str)]) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(encode_form(fields)))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

pub async fn body_text(response: Response) -> String {
    String::from_utf8(body_bytes(response).await).unwrap()
}

/// `application/x-www-form-urlencoded` encoding.
pub fn encode_form(fields: &[(&str, &str)]) -> String {
    fields
        .iter()
        .map(|(k, v)| format!("{}={}", percent_encode(k), percent_encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

fn percent_encode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'*' => {
                out.push(byte as char)
            }
            b' ' => out.push('+'),
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Multipart
// ---------------------------------------------------------------------------

/// Builder for a `multipart/form-data` body using [`MULTIPART_BOUNDARY`].
#[derive(Default)]
pub struct MultipartBody {
    bytes: Vec<u8>,
}

impl MultipartBody {
    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.bytes.extend_from_slice(
            format!(
                "--{MULTIPART_BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, data: &[u8]) -> Self {
        self.bytes.extend_from_slice(
            format!(
                "--{MULTIPART_BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        self.bytes.extend_from_slice(data);
        self.bytes.extend_from_slice(b"\r\n");
        self
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.bytes
            .extend_from_slice(format!("--{MULTIPART_BOUNDARY}--\r\n").as_bytes());
        self.bytes
    }
}

/// Smallest valid PNG: 1x1 transparent pixel.
pub const TINY_PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52,
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F, 0x15, 0xC4,
    0x89, 0x00, 0x00, 0x00, 0x0A, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00, 0x01, 0x00, 0x00,
    0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE,
    0x42, 0x60, 0x82,
];
