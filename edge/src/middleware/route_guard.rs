use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::{guard::GuardPolicy, session::SessionCredential};

/// Runs once per navigation before the dashboard is served. Redirects are
/// `307 Temporary Redirect` so the browser repeats the original method.
pub async fn route_guard(
    State(policy): State<Arc<GuardPolicy>>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_owned();
    let credential = SessionCredential::from_headers(request.headers(), policy.cookie_name());
    let decision = policy.decide(&path, credential.as_ref());

    match decision.location(&policy) {
        None => next.run(request).await,
        Some(target) => {
            tracing::debug!(
                path = %path,
                location = target,
                authenticated = credential.is_some(),
                "Redirecting navigation"
            );
            Redirect::temporary(target).into_response()
        }
    }
}
