//! Route guard: redirects unauthenticated requests away from protected prefixes.
//!
//! The guard is consulted only for paths in its matcher set. Inside that set it
//! verifies the session (bounded, fail closed) and then decides between
//! continuing and redirecting to the login page with a `callbackUrl`.

mod matcher;

use std::{sync::Arc, time::Duration};

use axum::http::HeaderMap;
use tracing::{debug, info};

use crate::auth::verifier::{verify_or_absent, SessionVerifier};

pub use matcher::PathMatcher;

/// Outcome of evaluating one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectDecision {
    Continue,
    Redirect { location: String },
}

pub struct RouteGuard {
    matcher: PathMatcher,
    protected_prefixes: Vec<String>,
    login_path: String,
    verifier: Arc<dyn SessionVerifier>,
    verify_timeout: Duration,
}

impl RouteGuard {
    pub fn new(cfg: &configs::GuardConfig, verifier: Arc<dyn SessionVerifier>, verify_timeout: Duration) -> Self {
        Self {
            matcher: PathMatcher::new(&cfg.matchers),
            protected_prefixes: cfg.protected_prefixes.clone(),
            login_path: cfg.login_path.clone(),
            verifier,
            verify_timeout,
        }
    }

    /// Whether the guard runs for `path` at all.
    pub fn applies_to(&self, path: &str) -> bool {
        self.matcher.matches(path)
    }

    /// Pure decision step. Prefixes are checked in configured order and the
    /// first match wins; the callback is the matched prefix, not the full path.
    pub fn decide(&self, path: &str, token_present: bool) -> RedirectDecision {
        if token_present {
            return RedirectDecision::Continue;
        }
        match self.protected_prefixes.iter().find(|prefix| path.starts_with(prefix.as_str())) {
            Some(prefix) => RedirectDecision::Redirect {
                location: format!("{}?callbackUrl={}", self.login_path, prefix),
            },
            None => RedirectDecision::Continue,
        }
    }

    /// Verify the session carried by `headers`, then decide for `path`.
    /// Callers must check [`RouteGuard::applies_to`] first.
    pub async fn evaluate(&self, path: &str, headers: &HeaderMap) -> RedirectDecision {
        let token = verify_or_absent(self.verifier.as_ref(), headers, self.verify_timeout).await;
        let decision = self.decide(path, token.is_some());
        match &decision {
            RedirectDecision::Redirect { location } => info!(%path, %location, "guard_redirect"),
            RedirectDecision::Continue => debug!(%path, "guard_continue"),
        }
        decision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::domain::{AuthToken, Role, SessionClaims};
    use crate::auth::errors::VerifyError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use uuid::Uuid;

    /// Returns a fixed answer and counts calls.
    struct FakeVerifier {
        signed_in: bool,
        fail: bool,
        calls: AtomicUsize,
    }

    impl FakeVerifier {
        fn new(signed_in: bool, fail: bool) -> Arc<Self> {
            Arc::new(Self { signed_in, fail, calls: AtomicUsize::new(0) })
        }
    }

    #[async_trait]
    impl SessionVerifier for FakeVerifier {
        async fn verify(&self, _headers: &HeaderMap) -> Result<Option<AuthToken>, VerifyError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(VerifyError::Unavailable("down".into()));
            }
            Ok(self.signed_in.then(|| {
                AuthToken::new(SessionClaims { sub: "u@e.com".into(), uid: Uuid::new_v4(), role: Role::User, iat: 0, exp: usize::MAX })
            }))
        }
    }

    fn guard(verifier: Arc<FakeVerifier>) -> RouteGuard {
        RouteGuard::new(&configs::GuardConfig::default(), verifier, Duration::from_millis(200))
    }

    fn redirect(to: &str) -> RedirectDecision {
        RedirectDecision::Redirect { location: to.to_string() }
    }

    #[tokio::test]
    async fn anonymous_requests_redirect_with_prefix_callback() {
        let g = guard(FakeVerifier::new(false, false));
        let h = HeaderMap::new();
        assert_eq!(g.evaluate("/admin", &h).await, redirect("/auth/login?callbackUrl=/admin"));
        assert_eq!(g.evaluate("/admin/services/42", &h).await, redirect("/auth/login?callbackUrl=/admin"));
        assert_eq!(g.evaluate("/profile/bookings", &h).await, redirect("/auth/login?callbackUrl=/profile"));
    }

    #[tokio::test]
    async fn signed_in_requests_continue() {
        let g = guard(FakeVerifier::new(true, false));
        let h = HeaderMap::new();
        assert_eq!(g.evaluate("/admin/services", &h).await, RedirectDecision::Continue);
        assert_eq!(g.evaluate("/profile", &h).await, RedirectDecision::Continue);
    }

    #[tokio::test]
    async fn verifier_failure_fails_closed() {
        let g = guard(FakeVerifier::new(true, true));
        assert_eq!(g.evaluate("/profile", &HeaderMap::new()).await, redirect("/auth/login?callbackUrl=/profile"));
    }

    #[tokio::test]
    async fn evaluation_is_idempotent() {
        let verifier = FakeVerifier::new(false, false);
        let g = guard(verifier.clone());
        let h = HeaderMap::new();
        let first = g.evaluate("/admin/x", &h).await;
        let second = g.evaluate("/admin/x", &h).await;
        assert_eq!(first, second);
        assert_eq!(verifier.calls.load(Ordering::SeqCst), 2);
    }

    /// Signed in exactly when the request carries an `x-session` header.
    struct HeaderVerifier;

    #[async_trait]
    impl SessionVerifier for HeaderVerifier {
        async fn verify(&self, headers: &HeaderMap) -> Result<Option<AuthToken>, VerifyError> {
            tokio::task::yield_now().await;
            Ok(headers.contains_key("x-session").then(|| {
                AuthToken::new(SessionClaims { sub: "u@e.com".into(), uid: Uuid::new_v4(), role: Role::User, iat: 0, exp: usize::MAX })
            }))
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_evaluations_decide_independently() {
        let g = Arc::new(RouteGuard::new(&configs::GuardConfig::default(), Arc::new(HeaderVerifier), Duration::from_secs(5)));

        let handles: Vec<_> = (0..200)
            .map(|i| {
                let g = Arc::clone(&g);
                tokio::spawn(async move {
                    let signed_in = i % 2 == 0;
                    let path = if i % 3 == 0 { "/profile/bookings" } else { "/admin/services" };
                    let mut h = HeaderMap::new();
                    if signed_in {
                        h.insert("x-session", axum::http::HeaderValue::from_static("1"));
                    }
                    (signed_in, path, g.evaluate(path, &h).await)
                })
            })
            .collect();

        for handle in handles {
            let (signed_in, path, decision) = handle.await.unwrap();
            let expected = match (signed_in, path) {
                (true, _) => RedirectDecision::Continue,
                (false, "/profile/bookings") => redirect("/auth/login?callbackUrl=/profile"),
                (false, _) => redirect("/auth/login?callbackUrl=/admin"),
            };
            assert_eq!(decision, expected, "request to {path} (signed in: {signed_in})");
        }
    }

    #[test]
    fn first_matching_prefix_wins() {
        let cfg = configs::GuardConfig {
            matchers: vec!["/*".into()],
            protected_prefixes: vec!["/admin".into(), "/admin/reports".into()],
            login_path: "/login".into(),
        };
        let g = RouteGuard::new(&cfg, FakeVerifier::new(false, false), Duration::from_millis(10));
        assert_eq!(g.decide("/admin/reports/q1", false), redirect("/login?callbackUrl=/admin"));
        assert_eq!(g.decide("/public", false), RedirectDecision::Continue);
    }

    #[test]
    fn matcher_set_bounds_the_guard() {
        let g = guard(FakeVerifier::new(false, false));
        assert!(g.applies_to("/admin/services"));
        assert!(g.applies_to("/profile"));
        assert!(!g.applies_to("/api/services"));
        assert!(!g.applies_to("/auth/login"));
    }
}
