pub mod config;
pub mod guard;
pub mod middleware;
pub mod session;

use std::sync::Arc;

use axum::{middleware as axum_middleware, Router};
use tower::ServiceBuilder;
use tower_http::{
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use config::EdgeConfig;
use guard::GuardPolicy;

/// Wraps `inner` so every request goes through the route guard first.
pub fn guarded(inner: Router, policy: GuardPolicy) -> Router {
    inner.layer(axum_middleware::from_fn_with_state(
        Arc::new(policy),
        middleware::route_guard,
    ))
}

/// Dashboard bundle served from `dist_dir`, falling back to `index.html` for
/// client-side routes.
pub fn app(config: &EdgeConfig) -> Router {
    let index = config.dist_dir.join("index.html");
    let bundle = ServeDir::new(&config.dist_dir).fallback(ServeFile::new(index));

    guarded(Router::new().fallback_service(bundle), config.guard_policy())
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}
