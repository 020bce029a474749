//! Server configuration, loaded from environment variables at startup.

/// Runtime configuration for video-agent-server.
///
/// Every field has a sensible default so the server works out-of-the-box
/// without any environment variables set.
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP address to bind (default: `"0.0.0.0:8000"`).
    pub bind_address: String,

    /// SQLite database URL (default: `"sqlite://video-agent.db"`).
    pub database_url: String,

    /// Root directory for uploaded videos and generated thumbnails
    /// (default: `"media"`). Served under `/media`.
    pub media_dir: String,

    /// `tracing` filter string, e.g. `"info"` or `"debug,tower_http=warn"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,

    /// Comma-separated list of allowed CORS origins; `None` means wildcard
    /// (development mode).
    pub cors_allowed_origins: Option<String>,

    /// Serve Swagger UI at `/swagger-ui`. Disable in production to avoid
    /// exposing the API structure.
    pub enable_swagger: bool,

    /// Bearer token protecting `/admin` routes. `None` leaves them open.
    pub admin_token: Option<String>,

    /// Maximum accepted upload size in megabytes.
    pub max_upload_size_mb: usize,

    /// Width of generated thumbnails in pixels.
    pub thumbnail_width: u32,

    /// Number of evenly spaced thumbnails generated per uploaded video.
    pub thumbnail_count: usize,
}

impl Config {
    /// Build [`Config`] from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            bind_address: env_or("VIDEO_AGENT_BIND", "0.0.0.0:8000"),
            database_url: env_or("VIDEO_AGENT_DATABASE_URL", "sqlite://video-agent.db"),
            media_dir: env_or("VIDEO_AGENT_MEDIA_DIR", "media"),
            log_level: env_or("VIDEO_AGENT_LOG", "info"),
            log_json: std::env::var("VIDEO_AGENT_LOG_JSON")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            cors_allowed_origins: std::env::var("VIDEO_AGENT_CORS_ORIGINS").ok(),
            enable_swagger: std::env::var("VIDEO_AGENT_ENABLE_SWAGGER")
                .map(|v| v != "0" && !v.eq_ignore_ascii_case("false"))
                .unwrap_or(true),
            admin_token: std::env::var("VIDEO_AGENT_ADMIN_TOKEN").ok(),
            max_upload_size_mb: parse_env("VIDEO_AGENT_MAX_UPLOAD_SIZE_MB", 500),
            thumbnail_width: parse_env("VIDEO_AGENT_THUMBNAIL_WIDTH", 200),
            thumbnail_count: parse_env("VIDEO_AGENT_THUMBNAIL_COUNT", 10),
        }
    }

    /// Directory uploaded video files are written to.
    pub fn videos_dir(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.media_dir).join("videos")
    }

    /// Directory generated thumbnails are written to.
    pub fn thumbnails_dir(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.media_dir).join("thumbnails")
    }
}

// ── private helpers ──────────────────────────────────────────────────────────

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
