use anyhow::Result;
use serde::Deserialize;
use anyhow::anyhow;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub guard: GuardConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub data: DataConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 8080, worker_threads: Some(4) }
    }
}

/// Session issuing and verification settings.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub jwt_secret: String,
    #[serde(default = "default_session_ttl_hours")]
    pub session_ttl_hours: i64,
    #[serde(default = "default_verify_timeout_ms")]
    pub verify_timeout_ms: u64,
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Mark the session cookie `Secure`; enable when served over HTTPS.
    #[serde(default)]
    pub cookie_secure: bool,
    /// Accounts registered with one of these emails get the admin role.
    #[serde(default)]
    pub admin_emails: Vec<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            session_ttl_hours: default_session_ttl_hours(),
            verify_timeout_ms: default_verify_timeout_ms(),
            cookie_name: default_cookie_name(),
            cookie_secure: false,
            admin_emails: Vec::new(),
        }
    }
}

/// Route guard wiring: which paths invoke the guard, which prefixes it protects
/// and where unauthenticated requests are sent.
#[derive(Debug, Clone, Deserialize)]
pub struct GuardConfig {
    #[serde(default = "default_matchers")]
    pub matchers: Vec<String>,
    #[serde(default = "default_protected_prefixes")]
    pub protected_prefixes: Vec<String>,
    #[serde(default = "default_login_path")]
    pub login_path: String,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            matchers: default_matchers(),
            protected_prefixes: default_protected_prefixes(),
            login_path: default_login_path(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_storage_root")]
    pub root: String,
    #[serde(default = "default_bucket")]
    pub bucket: String,
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { root: default_storage_root(), bucket: default_bucket(), public_base_url: default_public_base_url() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub dir: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self { dir: default_data_dir() }
    }
}

fn default_session_ttl_hours() -> i64 { 12 }
fn default_verify_timeout_ms() -> u64 { 2000 }
fn default_cookie_name() -> String { "auth_token".into() }
fn default_matchers() -> Vec<String> { vec!["/profile/*".into(), "/admin/*".into()] }
fn default_protected_prefixes() -> Vec<String> { vec!["/admin".into(), "/profile".into()] }
fn default_login_path() -> String { "/auth/login".into() }
fn default_storage_root() -> String { "data/blobs".into() }
fn default_bucket() -> String { "services".into() }
fn default_public_base_url() -> String { "http://127.0.0.1:8080/blobs".into() }
fn default_data_dir() -> String { "data".into() }

pub fn config_path() -> String {
    std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string())
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    load_from_str(&content)
}

pub fn load_from_str(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Load `CONFIG_PATH` (default `config.toml`) and validate it. A missing
    /// file falls back to defaults plus environment overrides; a file that
    /// exists but does not parse is an error.
    pub fn load_or_env() -> Result<Self> {
        let path = config_path();
        let mut cfg = if std::path::Path::new(&path).exists() {
            load_from_file(&path)?
        } else {
            AppConfig::default()
        };
        cfg.server.apply_env();
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.auth.normalize_from_env();
        self.auth.validate()?;
        self.guard.validate()?;
        self.storage.validate()?;
        if self.data.dir.trim().is_empty() {
            return Err(anyhow!("data.dir must not be empty"));
        }
        Ok(())
    }
}

impl ServerConfig {
    fn apply_env(&mut self) {
        if let Ok(host) = std::env::var("SERVER_HOST") {
            self.host = host;
        }
        if let Some(port) = std::env::var("SERVER_PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
            self.port = port;
        }
    }

    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
        Ok(())
    }
}

impl AuthConfig {
    pub fn normalize_from_env(&mut self) {
        if self.jwt_secret.trim().is_empty() {
            if let Ok(secret) = std::env::var("JWT_SECRET") {
                self.jwt_secret = secret;
            }
        }
        self.admin_emails = self.admin_emails.iter().map(|e| e.trim().to_lowercase()).collect();
    }

    pub fn validate(&self) -> Result<()> {
        if self.jwt_secret.trim().is_empty() {
            return Err(anyhow!("auth.jwt_secret is empty; set it in config.toml or JWT_SECRET"));
        }
        if self.session_ttl_hours <= 0 {
            return Err(anyhow!("auth.session_ttl_hours must be positive"));
        }
        if self.verify_timeout_ms == 0 {
            return Err(anyhow!("auth.verify_timeout_ms must be positive"));
        }
        if self.cookie_name.trim().is_empty() {
            return Err(anyhow!("auth.cookie_name must not be empty"));
        }
        Ok(())
    }
}

impl GuardConfig {
    pub fn validate(&self) -> Result<()> {
        if let Some(m) = self.matchers.iter().find(|m| !m.starts_with('/')) {
            return Err(anyhow!("guard.matchers entry {m:?} must start with '/'"));
        }
        if let Some(p) = self.protected_prefixes.iter().find(|p| !p.starts_with('/')) {
            return Err(anyhow!("guard.protected_prefixes entry {p:?} must start with '/'"));
        }
        if !self.login_path.starts_with('/') {
            return Err(anyhow!("guard.login_path must start with '/'"));
        }
        Ok(())
    }
}

impl StorageConfig {
    pub fn validate(&self) -> Result<()> {
        if self.root.trim().is_empty() {
            return Err(anyhow!("storage.root must not be empty"));
        }
        if self.bucket.is_empty() || !self.bucket.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            return Err(anyhow!("storage.bucket must be non-empty and use [A-Za-z0-9_-]"));
        }
        let lower = self.public_base_url.to_lowercase();
        if !(lower.starts_with("http://") || lower.starts_with("https://")) {
            return Err(anyhow!("storage.public_base_url must start with http:// or https://"));
        }
        Ok(())
    }
}
