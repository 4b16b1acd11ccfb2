use axum::{
    routing::{get, post, put},
    Json, Router,
};
use utoipa::OpenApi;

use crate::{
    domain::{batch::EmailBatchService, rules::RuleActionService},
    infrastructure::http::{open_api::ApiDocs, state::AppState},
};

pub mod email;
pub mod rules;
pub mod stoplight;
pub mod uptime;

pub fn router<B: EmailBatchService, R: RuleActionService>() -> Router<AppState<B, R>> {
    Router::new()
        .route("/", get(stoplight::handler))
        .route("/openapi.json", get(Json(ApiDocs::openapi())))
        .route("/uptime", get(uptime::handler))
        .route("/email/send", post(email::send::handler))
        .route(
            "/rules/:id",
            put(rules::configure::handler).get(rules::fetch::handler),
        )
        .route("/rules/:id/execute", post(rules::execute::handler))
}
