use std::{env, fs, net::SocketAddr, path::Path};

use crate::auth::{AdminCredential, DEFAULT_PUBLIC_PATHS, DEFAULT_ROLE, PasswordHash};

/// Salt used when a local run derives the admin hash from a plain password.
const LOCAL_ADMIN_SALT: &str = "portfolio-local";
const LOCAL_ADMIN_USERNAME: &str = "admin";
const LOCAL_ADMIN_PASSWORD: &str = "password";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
/// Docker/Kubernetes style secrets mount, consulted after the environment.
const SECRETS_DIR: &str = "/run/secrets";

/// AppConfig
///
/// The application's entire configuration, loaded once at start-up, injected into
/// `AppState` and never mutated afterwards.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Decides which fallbacks are allowed.
    pub env: Env,
    // Address the HTTP listener binds to.
    pub bind_addr: SocketAddr,
    // Postgres connection string. `None` selects the in-memory store (local only).
    pub db_url: Option<String>,
    // The single principal accepted by the access policy.
    pub admin: AdminCredential,
    // Path prefixes reachable without credentials.
    pub public_paths: Vec<String>,
}

/// Env
///
/// Runtime context. `Local` tolerates missing settings and fills in development defaults;
/// `Production` refuses to start without them.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

/// ConfigError
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set in production")]
    Missing(&'static str),

    #[error("ADMIN_PASSWORD_HASH must look like <salt>$<base64 sha256 digest>")]
    InvalidPasswordHash,

    #[error("BIND_ADDR is not a socket address: {0}")]
    InvalidBindAddr(String),
}

impl Default for AppConfig {
    /// Non-panicking configuration for tests: local env, in-memory store, and the
    /// development principal `admin` / `password`.
    fn default() -> Self {
        Self {
            env: Env::Local,
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            db_url: None,
            admin: local_admin(LOCAL_ADMIN_USERNAME.to_string(), LOCAL_ADMIN_PASSWORD),
            public_paths: default_public_paths(),
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads every setting from the environment, falling back to `/run/secrets/<NAME>`.
    ///
    /// # Errors
    /// Fails fast when a setting required by the current environment is missing or
    /// malformed, so the service never starts half-configured.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with_secrets(Path::new(SECRETS_DIR))
    }

    /// Same as `load`, with the secrets directory made explicit.
    pub fn load_with_secrets(secrets_dir: &Path) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name, secrets_dir);

        let env = match var("APP_ENV").as_deref() {
            Some("production") => Env::Production,
            _ => Env::Local,
        };

        let bind_addr_raw = var("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_addr_raw
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidBindAddr(bind_addr_raw.clone()))?;

        let db_url = var("DATABASE_URL");
        if env == Env::Production && db_url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        let username = match (var("ADMIN_USERNAME"), &env) {
            (Some(name), _) => name,
            (None, Env::Local) => LOCAL_ADMIN_USERNAME.to_string(),
            (None, Env::Production) => return Err(ConfigError::Missing("ADMIN_USERNAME")),
        };

        // A pre-computed salted hash always wins. Locally a plain password is accepted
        // and hashed on the spot; production never takes a plain password.
        let admin = match (var("ADMIN_PASSWORD_HASH"), &env) {
            (Some(encoded), _) => AdminCredential {
                username,
                password_hash: PasswordHash::parse(&encoded)
                    .ok_or(ConfigError::InvalidPasswordHash)?,
                role: DEFAULT_ROLE.to_string(),
            },
            (None, Env::Local) => {
                let password =
                    var("ADMIN_PASSWORD").unwrap_or_else(|| LOCAL_ADMIN_PASSWORD.to_string());
                local_admin(username, &password)
            }
            (None, Env::Production) => return Err(ConfigError::Missing("ADMIN_PASSWORD_HASH")),
        };

        let public_paths = match var("PUBLIC_PATHS") {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect(),
            None => default_public_paths(),
        };

        Ok(Self {
            env,
            bind_addr,
            db_url,
            admin,
            public_paths,
        })
    }
}

fn local_admin(username: String, password: &str) -> AdminCredential {
    AdminCredential {
        username,
        password_hash: PasswordHash::derive(LOCAL_ADMIN_SALT, password),
        role: DEFAULT_ROLE.to_string(),
    }
}

fn default_public_paths() -> Vec<String> {
    DEFAULT_PUBLIC_PATHS.iter().map(|p| p.to_string()).collect()
}

/// Environment first, then a secrets file of the same name. Blank values count as unset.
fn lookup(name: &str, secrets_dir: &Path) -> Option<String> {
    env::var(name)
        .ok()
        .or_else(|| fs::read_to_string(secrets_dir.join(name)).ok())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
