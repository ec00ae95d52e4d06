//! Route classification and redirect decisions for dashboard navigation.
//!
//! Every route is protected unless it is bypassed (static assets, proxied API
//! calls) or listed in the public allow-list. Only the presence of a session
//! credential is checked here; the API rejects invalid tokens per request.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::session::{SessionCredential, AUTH_COOKIE_NAME};

pub const ROOT_PATH: &str = "/";
pub const DEFAULT_LOGIN_PATH: &str = "/login";
pub const DEFAULT_LANDING_PATH: &str = "/dashboard";
pub const DEFAULT_BYPASS_PREFIXES: &[&str] = &["/_next/", "/api/"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// Static asset or proxied API call; never evaluated.
    Bypassed,
    Root,
    /// The login page. Always part of the allow-list.
    Login,
    Public,
    Protected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectTarget {
    Login,
    Landing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    PassThrough,
    Redirect(RedirectTarget),
}

impl GuardDecision {
    pub fn location<'a>(&self, policy: &'a GuardPolicy) -> Option<&'a str> {
        match self {
            GuardDecision::PassThrough => None,
            GuardDecision::Redirect(RedirectTarget::Login) => Some(policy.login_path()),
            GuardDecision::Redirect(RedirectTarget::Landing) => Some(policy.landing_path()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardPolicy {
    login_path: String,
    landing_path: String,
    public_paths: BTreeSet<String>,
    bypass_prefixes: Vec<String>,
    cookie_name: String,
}

impl Default for GuardPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_LOGIN_PATH, DEFAULT_LANDING_PATH)
    }
}

impl GuardPolicy {
    pub fn new(login_path: impl Into<String>, landing_path: impl Into<String>) -> Self {
        let login_path = login_path.into();
        let mut public_paths = BTreeSet::new();
        public_paths.insert(login_path.clone());
        Self {
            login_path,
            landing_path: landing_path.into(),
            public_paths,
            bypass_prefixes: DEFAULT_BYPASS_PREFIXES
                .iter()
                .map(|prefix| prefix.to_string())
                .collect(),
            cookie_name: AUTH_COOKIE_NAME.to_string(),
        }
    }

    pub fn with_public_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.public_paths.extend(paths.into_iter().map(Into::into));
        self
    }

    pub fn with_bypass_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.bypass_prefixes = prefixes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = name.into();
        self
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    pub fn landing_path(&self) -> &str {
        &self.landing_path
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    pub fn public_paths(&self) -> impl Iterator<Item = &str> {
        self.public_paths.iter().map(String::as_str)
    }

    pub fn classify(&self, path: &str) -> RouteClass {
        if self.is_bypassed(path) {
            RouteClass::Bypassed
        } else if path == ROOT_PATH {
            RouteClass::Root
        } else if path == self.login_path {
            RouteClass::Login
        } else if self.public_paths.contains(path) {
            RouteClass::Public
        } else {
            RouteClass::Protected
        }
    }

    pub fn decide(&self, path: &str, credential: Option<&SessionCredential>) -> GuardDecision {
        use GuardDecision::{PassThrough, Redirect};
        use RedirectTarget::{Landing, Login};

        match (self.classify(path), credential.is_some()) {
            (RouteClass::Bypassed, _) => PassThrough,
            (RouteClass::Root, true) => Redirect(Landing),
            (RouteClass::Root, false) => Redirect(Login),
            (RouteClass::Login, true) => Redirect(Landing),
            (RouteClass::Login, false) => PassThrough,
            (RouteClass::Public, _) => PassThrough,
            (RouteClass::Protected, true) => PassThrough,
            (RouteClass::Protected, false) => Redirect(Login),
        }
    }

    fn is_bypassed(&self, path: &str) -> bool {
        path.contains('.')
            || self
                .bypass_prefixes
                .iter()
                .any(|prefix| path.starts_with(prefix.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token() -> SessionCredential {
        SessionCredential::new("token").expect("non-empty")
    }

    #[test]
    fn bypassed_paths_pass_through_regardless_of_credential() {
        let policy = GuardPolicy::default();
        let credential = token();
        for path in [
            "/_next/static/chunks/main.js",
            "/api/proxy/products",
            "/favicon.ico",
            "/logo.svg",
            "/login.html",
        ] {
            assert_eq!(policy.classify(path), RouteClass::Bypassed, "{}", path);
            assert_eq!(policy.decide(path, None), GuardDecision::PassThrough);
            assert_eq!(
                policy.decide(path, Some(&credential)),
                GuardDecision::PassThrough
            );
        }
    }

    #[test]
    fn root_always_redirects() {
        let policy = GuardPolicy::default();
        assert_eq!(
            policy.decide("/", Some(&token())),
            GuardDecision::Redirect(RedirectTarget::Landing)
        );
        assert_eq!(
            policy.decide("/", None),
            GuardDecision::Redirect(RedirectTarget::Login)
        );
    }

    #[test]
    fn login_redirects_only_authenticated_users() {
        let policy = GuardPolicy::default();
        assert_eq!(policy.classify("/login"), RouteClass::Login);
        assert_eq!(
            policy.decide("/login", Some(&token())),
            GuardDecision::Redirect(RedirectTarget::Landing)
        );
        assert_eq!(policy.decide("/login", None), GuardDecision::PassThrough);
    }

    #[test]
    fn unlisted_paths_are_protected() {
        let policy = GuardPolicy::default();
        for path in ["/dashboard", "/products", "/products/12/edit", "/celebrities/3"] {
            assert_eq!(policy.classify(path), RouteClass::Protected, "{}", path);
            assert_eq!(
                policy.decide(path, None),
                GuardDecision::Redirect(RedirectTarget::Login)
            );
            assert_eq!(policy.decide(path, Some(&token())), GuardDecision::PassThrough);
        }
    }

    #[test]
    fn extra_public_paths_pass_through_for_everyone() {
        let policy = GuardPolicy::default().with_public_paths(["/forgot-password"]);
        assert_eq!(policy.classify("/forgot-password"), RouteClass::Public);
        assert_eq!(policy.decide("/forgot-password", None), GuardDecision::PassThrough);
        assert_eq!(
            policy.decide("/forgot-password", Some(&token())),
            GuardDecision::PassThrough
        );
    }

    #[test]
    fn login_path_is_always_public() {
        let policy = GuardPolicy::new("/signin", "/home");
        assert!(policy.public_paths().any(|path| path == "/signin"));
        assert_eq!(policy.decide("/signin", None), GuardDecision::PassThrough);
        assert_eq!(
            policy.decide("/signin", Some(&token())).location(&policy),
            Some("/home")
        );
        assert_eq!(policy.decide("/orders", None).location(&policy), Some("/signin"));
    }

    #[test]
    fn bypass_prefixes_are_configurable() {
        let policy = GuardPolicy::default().with_bypass_prefixes(["/assets/"]);
        assert_eq!(policy.classify("/assets/app"), RouteClass::Bypassed);
        assert_eq!(policy.classify("/api/products"), RouteClass::Protected);
    }

    #[test]
    fn prefix_without_trailing_segment_is_not_bypassed() {
        let policy = GuardPolicy::default();
        assert_eq!(policy.classify("/api"), RouteClass::Protected);
        assert_eq!(policy.classify("/apis"), RouteClass::Protected);
    }
}
