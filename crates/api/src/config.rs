use std::path::PathBuf;

use folio_core::types::DbId;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except the admin credentials have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Maximum pooled database connections (default: `10`).
    pub db_max_connections: u32,
    /// Public origin used for absolute links in the sitemap.
    pub site_base_url: String,
    /// Directory served under `/static`.
    pub static_dir: PathBuf,
    /// Directory served under `/uploads`.
    pub upload_root: PathBuf,
    /// Subdirectory of `upload_root` holding gallery images.
    pub gallery_subdir: String,
    /// Where `sitemap.xml` is written and served from.
    pub sitemap_path: PathBuf,
    /// Project shown by `/project` when no usable id is given.
    pub default_project_id: DbId,
    /// Base URL of the GitHub REST API.
    pub github_api_url: String,
    /// Admin login credentials.
    pub admin: AdminConfig,
    /// Session token configuration.
    pub jwt: JwtConfig,
}

/// The single admin account.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    pub username: String,
    /// Argon2id PHC string.
    pub password_hash: String,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:3000`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `DB_MAX_CONNECTIONS`   | `10`                       |
    /// | `SITE_BASE_URL`        | `http://localhost:3000`    |
    /// | `STATIC_DIR`           | `static`                   |
    /// | `UPLOAD_ROOT`          | `uploads`                  |
    /// | `GALLERY_SUBDIR`       | `gallery`                  |
    /// | `SITEMAP_PATH`         | `sitemap.xml`              |
    /// | `DEFAULT_PROJECT_ID`   | `1`                        |
    /// | `GITHUB_API_URL`       | `https://api.github.com`   |
    /// | `ADMIN_USERNAME`       | `admin`                    |
    /// | `ADMIN_PASSWORD_HASH`  | **required**               |
    ///
    /// `DATABASE_URL` is read by the binary; JWT settings by
    /// [`JwtConfig::from_env`].
    pub fn from_env() -> Self {
        let host = env_or("HOST", "0.0.0.0");

        let port: u16 = env_or("PORT", "3000")
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = env_or("CORS_ORIGINS", "http://localhost:3000")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = env_or("REQUEST_TIMEOUT_SECS", "30")
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let db_max_connections: u32 = env_or("DB_MAX_CONNECTIONS", "10")
            .parse()
            .expect("DB_MAX_CONNECTIONS must be a valid u32");

        let default_project_id: DbId = env_or("DEFAULT_PROJECT_ID", "1")
            .parse()
            .expect("DEFAULT_PROJECT_ID must be a valid integer");

        let password_hash =
            std::env::var("ADMIN_PASSWORD_HASH").expect("ADMIN_PASSWORD_HASH must be set");
        assert!(
            !password_hash.is_empty(),
            "ADMIN_PASSWORD_HASH must not be empty"
        );

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            db_max_connections,
            site_base_url: env_or("SITE_BASE_URL", "http://localhost:3000"),
            static_dir: env_or("STATIC_DIR", "static").into(),
            upload_root: env_or("UPLOAD_ROOT", "uploads").into(),
            gallery_subdir: env_or("GALLERY_SUBDIR", "gallery"),
            sitemap_path: env_or("SITEMAP_PATH", "sitemap.xml").into(),
            default_project_id,
            github_api_url: env_or("GITHUB_API_URL", "https://api.github.com"),
            admin: AdminConfig {
                username: env_or("ADMIN_USERNAME", "admin"),
                password_hash,
            },
            jwt: JwtConfig::from_env(),
        }
    }

    /// Directory uploaded gallery images are written into.
    pub fn gallery_dir(&self) -> PathBuf {
        self.upload_root.join(&self.gallery_subdir)
    }

    /// Relative URL prefix stored in `gallery_images` for uploaded files.
    pub fn gallery_url_prefix(&self) -> String {
        format!("uploads/{}", self.gallery_subdir.trim_matches('/'))
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.into())
}
