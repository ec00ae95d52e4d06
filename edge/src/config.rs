use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::{env, net::SocketAddr, path::PathBuf};

use crate::{
    guard::{GuardPolicy, DEFAULT_BYPASS_PREFIXES, DEFAULT_LANDING_PATH, DEFAULT_LOGIN_PATH},
    session::AUTH_COOKIE_NAME,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeConfig {
    pub bind_addr: SocketAddr,
    pub dist_dir: PathBuf,
    pub cookie_name: String,
    pub login_path: String,
    pub landing_path: String,
    pub public_routes: Vec<String>,
    pub bypass_prefixes: Vec<String>,
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            dist_dir: PathBuf::from("./dist"),
            cookie_name: AUTH_COOKIE_NAME.to_string(),
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            landing_path: DEFAULT_LANDING_PATH.to_string(),
            public_routes: vec![DEFAULT_LOGIN_PATH.to_string()],
            bypass_prefixes: DEFAULT_BYPASS_PREFIXES
                .iter()
                .map(|prefix| prefix.to_string())
                .collect(),
        }
    }
}

impl EdgeConfig {
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let bind_addr = match lookup("EDGE_BIND_ADDR") {
            Some(raw) => raw
                .parse::<SocketAddr>()
                .with_context(|| format!("Invalid EDGE_BIND_ADDR value: {}", raw))?,
            None => defaults.bind_addr,
        };

        let dist_dir = lookup("DASHBOARD_DIST_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.dist_dir);
        let cookie_name = lookup("AUTH_COOKIE_NAME").unwrap_or(defaults.cookie_name);
        let login_path = lookup("LOGIN_PATH").unwrap_or(defaults.login_path);
        let landing_path = lookup("LANDING_PATH").unwrap_or(defaults.landing_path);

        for (key, path) in [("LOGIN_PATH", &login_path), ("LANDING_PATH", &landing_path)] {
            if !path.starts_with('/') {
                anyhow::bail!("{} must start with '/': {}", key, path);
            }
        }

        let public_routes = lookup("PUBLIC_ROUTES")
            .map(|raw| split_list(&raw))
            .unwrap_or(defaults.public_routes);
        let bypass_prefixes = lookup("GUARD_BYPASS_PREFIXES")
            .map(|raw| split_list(&raw))
            .unwrap_or(defaults.bypass_prefixes);

        Ok(Self {
            bind_addr,
            dist_dir,
            cookie_name,
            login_path,
            landing_path,
            public_routes,
            bypass_prefixes,
        })
    }

    pub fn guard_policy(&self) -> GuardPolicy {
        GuardPolicy::new(self.login_path.clone(), self.landing_path.clone())
            .with_public_paths(self.public_routes.iter().cloned())
            .with_bypass_prefixes(self.bypass_prefixes.iter().cloned())
            .with_cookie_name(self.cookie_name.clone())
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
