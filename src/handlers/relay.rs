use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::{debug, info};

use crate::{
    app_state::AppState,
    error::{ApiError, Result},
    middleware::metrics::track_relay_outcome,
    models::{ChangeEvent, OutboundMessage, RelayTarget},
};

/// Relay a Directus change notification to Slack
/// POST /{caller_key}/{object_type_name}/{*slack_path}
///
/// Responds 204 as soon as the message is built; delivery happens on a
/// detached task whose outcome is only logged.
pub async fn relay_change(
    State(state): State<AppState>,
    Path((caller_key, route_tail)): Path<(String, String)>,
    body: Bytes,
) -> Result<StatusCode> {
    if !state.key_verifier.verify(&caller_key).await {
        track_relay_outcome("unauthorized");
        return Err(ApiError::Unauthorized);
    }

    let (target, message) = match prepare(&state, &route_tail, &body) {
        Ok(prepared) => prepared,
        Err(e) => {
            track_relay_outcome(if e.status_code().is_client_error() {
                "bad_request"
            } else {
                "server_error"
            });
            return Err(e);
        }
    };

    // Not awaited: the caller gets its answer regardless of Slack's
    state.notifier.dispatch_detached(target, message);

    track_relay_outcome("accepted");
    info!("change notification accepted for relay");
    Ok(StatusCode::NO_CONTENT)
}

/// Parse, validate and render. Nothing here touches the network.
fn prepare(
    state: &AppState,
    route_tail: &str,
    body: &[u8],
) -> Result<(RelayTarget, OutboundMessage)> {
    let (object_type_name, slack_path) = split_route_tail(route_tail);

    let event = ChangeEvent::parse(object_type_name, body)?;
    let target = RelayTarget::parse(slack_path)?;

    debug!(
        object_type = %event.object_type_name,
        record_id = %event.record_id,
        modified_by = event.modified_by,
        modified_on = %event.modified_on,
        changed_fields = event.changed_fields.len(),
        "parsed change event"
    );

    let message = state.renderer.render(&event)?;
    Ok((target, message))
}

/// Splits `widgets/T0/B0/XYZ` into the object type and the Slack path.
fn split_route_tail(route_tail: &str) -> (&str, &str) {
    route_tail.split_once('/').unwrap_or((route_tail, ""))
}
