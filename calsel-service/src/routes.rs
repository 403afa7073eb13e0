//! Message endpoint for the client protocol.

use std::sync::Arc;

use axum::{Json, Router, extract::State, routing::post};
use tokio::sync::Mutex;
use tracing::debug;

use calsel_core::protocol::{Action, Reply, Request};

use crate::service::PresetService;

/// Shared application state. Requests are serviced in arrival order
/// through the one service mutex; overlapping saves resolve as
/// last-applied-wins.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<Mutex<PresetService>>,
}

impl AppState {
    pub fn new(service: PresetService) -> Self {
        AppState {
            service: Arc::new(Mutex::new(service)),
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new().route("/message", post(handle_message))
}

/// POST /message - the single dispatch point for the client protocol
async fn handle_message(State(state): State<AppState>, Json(request): Json<Request>) -> Json<Reply> {
    debug!(action = ?request.action, "received message");

    let mut service = state.service.lock().await;
    service.initialize();

    let reply = match request.action {
        Action::Ping => Reply::ok(),
        Action::GetGroups => Reply::with_groups(service.groups().clone()),
        Action::SaveGroups => match request.groups {
            Some(document) => match service.save_groups(document) {
                Ok(()) => Reply::ok(),
                Err(e) => Reply::failure(e.to_string()),
            },
            None => Reply::failure("saveGroups request carried no document"),
        },
    };

    Json(reply)
}
