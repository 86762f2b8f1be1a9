use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::{Engine, engine::general_purpose::STANDARD};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use subtle::ConstantTimeEq;

use crate::error::ApiError;

/// Role granted to the configured principal.
pub const DEFAULT_ROLE: &str = "USER";

/// Paths reachable without credentials unless `PUBLIC_PATHS` overrides them:
/// health probe, API documentation, and the database console.
pub const DEFAULT_PUBLIC_PATHS: &[&str] = &[
    "/health",
    "/swagger-ui",
    "/swagger-ui.html",
    "/api-docs",
    "/v3/api-docs",
    "/db-console",
];

/// BasicCredentials
///
/// Username/password pair decoded from an `Authorization: Basic ...` header.
#[derive(Clone, PartialEq, Eq)]
pub struct BasicCredentials {
    pub username: String,
    pub password: String,
}

// Never print the password.
impl std::fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl BasicCredentials {
    /// Parses the `Authorization` header. Returns `None` when the header is absent,
    /// uses another scheme, is not valid base64/UTF-8, or lacks the `:` separator.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
        let (scheme, encoded) = value.trim().split_once(' ')?;
        if !scheme.eq_ignore_ascii_case("basic") {
            return None;
        }

        let decoded = STANDARD.decode(encoded.trim()).ok()?;
        let decoded = String::from_utf8(decoded).ok()?;
        // The password may itself contain ':'; only the first one separates.
        let (username, password) = decoded.split_once(':')?;

        Some(Self {
            username: username.to_string(),
            password: password.to_string(),
        })
    }
}

/// PasswordHash
///
/// A salted SHA-256 digest of the principal's password. Its textual form is
/// `<salt>$<base64(sha256(salt || password))>`, which can be produced with
/// `printf '%s%s' "$SALT" "$PASSWORD" | openssl dgst -sha256 -binary | base64`.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash {
    salt: String,
    digest: [u8; 32],
}

impl std::fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHash")
            .field("salt", &self.salt)
            .finish_non_exhaustive()
    }
}

impl PasswordHash {
    pub fn derive(salt: &str, password: &str) -> Self {
        Self {
            salt: salt.to_string(),
            digest: digest(salt, password),
        }
    }

    /// Parses the `<salt>$<base64 digest>` form. The salt must not contain `$`.
    pub fn parse(encoded: &str) -> Option<Self> {
        let (salt, b64) = encoded.trim().split_once('$')?;
        let raw = STANDARD.decode(b64).ok()?;
        let digest: [u8; 32] = raw.try_into().ok()?;
        Some(Self {
            salt: salt.to_string(),
            digest,
        })
    }

    pub fn encode(&self) -> String {
        format!("{}${}", self.salt, STANDARD.encode(self.digest))
    }

    /// Constant-time comparison of the candidate's digest with the stored one.
    pub fn matches(&self, password: &str) -> bool {
        let candidate = digest(&self.salt, password);
        candidate.as_slice().ct_eq(self.digest.as_slice()).into()
    }
}

fn digest(salt: &str, password: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hasher.finalize().into()
}

/// AdminCredential
///
/// The single principal allowed through the access policy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdminCredential {
    pub username: String,
    pub password_hash: PasswordHash,
    pub role: String,
}

/// CredentialVerifier
///
/// Pluggable credential check used by the access policy.
pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, username: &str, password: &str) -> bool;
}

/// VerifierState
///
/// Shared handle on the verifier, owned by the `AccessPolicy`.
pub type VerifierState = Arc<dyn CredentialVerifier>;

/// SaltedHashVerifier
///
/// Accepts exactly the configured principal, comparing the password through its salted
/// digest. Both comparisons run in constant time.
pub struct SaltedHashVerifier {
    credential: AdminCredential,
}

impl SaltedHashVerifier {
    pub fn new(credential: AdminCredential) -> Self {
        Self { credential }
    }
}

impl CredentialVerifier for SaltedHashVerifier {
    fn verify(&self, username: &str, password: &str) -> bool {
        let user_ok: bool = username
            .as_bytes()
            .ct_eq(self.credential.username.as_bytes())
            .into();
        // Evaluate both so timing does not reveal which half failed.
        let password_ok = self.credential.password_hash.matches(password);
        user_ok & password_ok
    }
}

/// AccessDecision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Allow,
    Unauthorized,
}

/// AccessPolicy
///
/// The request authorization rule set, evaluated per request in order:
/// 1. a path covered by the public allow-list is allowed without looking at credentials;
/// 2. any other path needs Basic credentials the verifier accepts.
#[derive(Clone)]
pub struct AccessPolicy {
    public_paths: Vec<String>,
    verifier: VerifierState,
}

impl AccessPolicy {
    pub fn new(public_paths: Vec<String>, verifier: VerifierState) -> Self {
        Self {
            public_paths,
            verifier,
        }
    }

    /// `prefix` covers `path` when they are equal or `path` continues below `prefix/`.
    /// So `/swagger-ui` covers `/swagger-ui/index.html` but not `/swagger-uix`.
    pub fn is_public(&self, path: &str) -> bool {
        self.public_paths.iter().any(|prefix| {
            let prefix = prefix.trim_end_matches('/');
            path == prefix
                || path
                    .strip_prefix(prefix)
                    .is_some_and(|rest| rest.starts_with('/'))
        })
    }

    pub fn evaluate(&self, path: &str, credentials: Option<&BasicCredentials>) -> AccessDecision {
        if self.is_public(path) {
            return AccessDecision::Allow;
        }

        match credentials {
            Some(c) if self.verifier.verify(&c.username, &c.password) => AccessDecision::Allow,
            _ => AccessDecision::Unauthorized,
        }
    }
}

/// access_policy_middleware
///
/// Runs the `AccessPolicy` before any handler. Rejected requests never reach the router
/// and get a 401 with a Basic challenge.
pub async fn access_policy_middleware(
    State(policy): State<AccessPolicy>,
    request: Request,
    next: Next,
) -> Response {
    let credentials = BasicCredentials::from_headers(request.headers());
    let path = request.uri().path().to_owned();

    match policy.evaluate(&path, credentials.as_ref()) {
        AccessDecision::Allow => {
            if let Some(c) = &credentials {
                tracing::debug!(user = %c.username, "request authenticated");
            }
            next.run(request).await
        }
        AccessDecision::Unauthorized => {
            tracing::warn!(
                path = %path,
                credentials_present = credentials.is_some(),
                "rejected unauthenticated request"
            );
            ApiError::Unauthorized.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn policy() -> AccessPolicy {
        let credential = AdminCredential {
            username: "victor".to_string(),
            password_hash: PasswordHash::derive("salt", "s3cret"),
            role: DEFAULT_ROLE.to_string(),
        };
        AccessPolicy::new(
            DEFAULT_PUBLIC_PATHS.iter().map(|p| p.to_string()).collect(),
            Arc::new(SaltedHashVerifier::new(credential)),
        )
    }

    fn basic(user: &str, pass: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let token = STANDARD.encode(format!("{user}:{pass}"));
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Basic {token}")).unwrap(),
        );
        headers
    }

    #[test]
    fn parses_basic_header_and_keeps_colons_in_password() {
        let creds = BasicCredentials::from_headers(&basic("victor", "a:b:c")).unwrap();
        assert_eq!(creds.username, "victor");
        assert_eq!(creds.password, "a:b:c");
    }

    #[test]
    fn rejects_other_schemes_and_garbage() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        assert!(BasicCredentials::from_headers(&headers).is_none());

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic !!!"));
        assert!(BasicCredentials::from_headers(&headers).is_none());

        assert!(BasicCredentials::from_headers(&HeaderMap::new()).is_none());
    }

    #[test]
    fn public_prefixes_respect_segment_boundaries() {
        let policy = policy();
        assert!(policy.is_public("/health"));
        assert!(policy.is_public("/swagger-ui/index.html"));
        assert!(policy.is_public("/api-docs/openapi.json"));
        assert!(policy.is_public("/swagger-ui.html"));
        assert!(!policy.is_public("/swagger-uix"));
        assert!(!policy.is_public("/api/projects"));
    }

    #[test]
    fn public_paths_skip_the_credential_check() {
        let wrong = BasicCredentials {
            username: "nobody".into(),
            password: "nope".into(),
        };
        assert_eq!(policy().evaluate("/health", Some(&wrong)), AccessDecision::Allow);
        assert_eq!(policy().evaluate("/db-console", None), AccessDecision::Allow);
    }

    #[test]
    fn protected_paths_need_the_configured_principal() {
        let policy = policy();
        let good = BasicCredentials {
            username: "victor".into(),
            password: "s3cret".into(),
        };
        let bad_pass = BasicCredentials {
            password: "guess".into(),
            ..good.clone()
        };
        let bad_user = BasicCredentials {
            username: "victo".into(),
            ..good.clone()
        };

        assert_eq!(policy.evaluate("/api/projects", Some(&good)), AccessDecision::Allow);
        assert_eq!(policy.evaluate("/api/projects", None), AccessDecision::Unauthorized);
        assert_eq!(
            policy.evaluate("/api/projects", Some(&bad_pass)),
            AccessDecision::Unauthorized
        );
        assert_eq!(
            policy.evaluate("/api/projects", Some(&bad_user)),
            AccessDecision::Unauthorized
        );
    }

    #[test]
    fn password_hash_survives_its_text_form() {
        let hash = PasswordHash::derive("pepper", "hunter2");
        let parsed = PasswordHash::parse(&hash.encode()).unwrap();
        assert!(parsed.matches("hunter2"));
        assert!(!parsed.matches("hunter3"));
        assert!(PasswordHash::parse("no-separator").is_none());
        assert!(PasswordHash::parse("salt$dG9vLXNob3J0").is_none());
    }
}
