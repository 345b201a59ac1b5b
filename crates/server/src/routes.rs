use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use chrono::Utc;
use elogie_core::errors::InterfaceError;
use elogie_slack::{
    client::SlackApi,
    commands::{SlashCommandForm, SlashCommandHandler},
    interactions::{kudos_dispatcher, parse_interaction, EventContext, InteractionDispatcher},
    modal::ModalTemplate,
    signature::{SignatureVerifier, SIGNATURE_HEADER, TIMESTAMP_HEADER},
};
use secrecy::SecretString;
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Clone)]
pub struct AppState {
    verifier: SignatureVerifier,
    commands: SlashCommandHandler,
    interactions: Arc<InteractionDispatcher>,
}

impl AppState {
    pub fn new(
        slack: Arc<dyn SlackApi>,
        template: ModalTemplate,
        signing_secret: SecretString,
        channel_id: &str,
    ) -> Self {
        Self {
            verifier: SignatureVerifier::new(signing_secret),
            commands: SlashCommandHandler::new(slack.clone(), template.clone()),
            interactions: Arc::new(kudos_dispatcher(slack, template, channel_id)),
        }
    }

    fn verify(&self, headers: &HeaderMap, body: &[u8]) -> Result<(), InterfaceError> {
        let header = |name: &str| headers.get(name).and_then(|value| value.to_str().ok());
        self.verifier
            .verify(header(TIMESTAMP_HEADER), header(SIGNATURE_HEADER), body, Utc::now().timestamp())
            .map_err(|error| InterfaceError::unauthorized(error.to_string()))
    }
}

#[derive(Debug, Default, Deserialize)]
struct InteractivityForm {
    #[serde(default)]
    payload: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/slack/commands", post(slash_command))
        .route("/slack/interactivity", post(interactivity))
        .with_state(state)
}

async fn slash_command(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    let ctx = request_context();
    if let Err(error) = state.verify(&headers, &body) {
        return error_response(error, &ctx, "/slack/commands");
    }

    let form = match serde_urlencoded::from_bytes::<SlashCommandForm>(&body) {
        Ok(form) => form,
        Err(error) => {
            return error_response(
                InterfaceError::bad_request(format!("Bad Request: {error}")),
                &ctx,
                "/slack/commands",
            )
        }
    };

    match state.commands.handle(&form, &ctx).await {
        Ok(()) => StatusCode::OK.into_response(),
        Err(error) => error_response(error.into(), &ctx, "/slack/commands"),
    }
}

async fn interactivity(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    let ctx = request_context();
    if let Err(error) = state.verify(&headers, &body) {
        return error_response(error, &ctx, "/slack/interactivity");
    }

    let form = match serde_urlencoded::from_bytes::<InteractivityForm>(&body) {
        Ok(form) => form,
        Err(error) => {
            return error_response(
                InterfaceError::bad_request(format!("Bad Request: {error}")),
                &ctx,
                "/slack/interactivity",
            )
        }
    };

    let outcome = match parse_interaction(&form.payload) {
        Ok(payload) => state.interactions.dispatch(&payload, &ctx).await,
        Err(error) => Err(error),
    };

    match outcome {
        Ok(outcome) => match outcome.response_body() {
            Some(body) => (StatusCode::OK, Json(body)).into_response(),
            None => StatusCode::OK.into_response(),
        },
        Err(error) => error_response(error.into(), &ctx, "/slack/interactivity"),
    }
}

fn request_context() -> EventContext {
    EventContext::new(format!("req-{}", Uuid::new_v4().simple()))
}

fn error_response(error: InterfaceError, ctx: &EventContext, route: &'static str) -> Response {
    let error = error.with_correlation_id(ctx.correlation_id.clone());
    let status =
        StatusCode::from_u16(error.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    if status.is_server_error() {
        warn!(
            event_name = "ingress.http.request_failed",
            correlation_id = %error.correlation_id(),
            route,
            status = status.as_u16(),
            error = %error,
            "request failed"
        );
    } else {
        info!(
            event_name = "ingress.http.request_rejected",
            correlation_id = %error.correlation_id(),
            route,
            status = status.as_u16(),
            error = %error,
            "request rejected"
        );
    }

    (status, error.response_body()).into_response()
}
