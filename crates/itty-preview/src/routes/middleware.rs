//! Request gate applied in front of every route.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use super::user_agent;
use crate::crawler;
use crate::error::PreviewError;
use crate::state::AppState;

/// Refuse requests from user agents on the configured block list.
///
/// Block list entries come from `UA_ARRAY`.
pub async fn reject_blocked_agents(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, PreviewError> {
    let agent = user_agent(request.headers());
    if crawler::is_blocked_agent(agent, &state.config.blocked_agents) {
        tracing::debug!(user_agent = %agent, "blocked user agent");
        return Err(PreviewError::Unauthorized);
    }

    Ok(next.run(request).await)
}
