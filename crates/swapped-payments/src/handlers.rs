//! axum glue for the webhook and checkout results.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::checkout::CheckoutOutcome;
use crate::webhook::WebhookResponse;

impl IntoResponse for WebhookResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.body)).into_response()
    }
}

impl IntoResponse for CheckoutOutcome {
    fn into_response(self) -> Response {
        // Failures are a normal checkout answer carried in `result`.
        (StatusCode::OK, Json(self)).into_response()
    }
}
