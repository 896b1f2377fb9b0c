use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{get, post},
    Json, Router,
};
use boxoffice_core::{CreateTicketOption, PurchaseId, PurchaseTicketOption, TicketId, TicketOption, TicketOptionId};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::{error::ApiError, state::AppState};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTicketOptionRequest {
    pub name: String,
    #[serde(rename = "desc", default)]
    pub description: String,
    pub allocation: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketOptionResponse {
    pub id: TicketOptionId,
    pub name: String,
    #[serde(rename = "desc")]
    pub description: String,
    pub allocation: i64,
}

impl From<TicketOption> for TicketOptionResponse {
    fn from(option: TicketOption) -> Self {
        Self { id: option.id, name: option.name, description: option.description, allocation: option.allocation }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseRequest {
    pub quantity: i64,
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseResponse {
    pub purchase_id: PurchaseId,
    pub ticket_ids: Vec<TicketId>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ticket_options", post(create_ticket_option))
        .route("/ticket_options/{id}", get(get_ticket_option))
        .route("/ticket_options/{id}/purchases", post(purchase_ticket_option))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                        .on_request(DefaultOnRequest::new().level(Level::INFO))
                        .on_response(DefaultOnResponse::new().level(Level::INFO)),
                )
                .into_inner(),
        )
}

async fn create_ticket_option(
    State(state): State<AppState>,
    payload: Result<Json<CreateTicketOptionRequest>, JsonRejection>,
) -> Result<Json<TicketOptionResponse>, ApiError> {
    let Json(request) = payload?;
    let input = CreateTicketOption { name: request.name, description: request.description, allocation: request.allocation };
    let option = state.service().create_ticket_option(input).await?;
    Ok(Json(option.into()))
}

async fn get_ticket_option(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<TicketOptionResponse>, ApiError> {
    let option = state.service().get_ticket_option(&TicketOptionId::from(id)).await?;
    Ok(Json(option.into()))
}

async fn purchase_ticket_option(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<PurchaseRequest>, JsonRejection>,
) -> Result<Json<PurchaseResponse>, ApiError> {
    let Json(request) = payload?;
    let input = PurchaseTicketOption { ticket_option_id: TicketOptionId::from(id), user_id: request.user_id, quantity: request.quantity };
    let fulfillment = state.service().purchase_ticket_option(input).await?;
    Ok(Json(PurchaseResponse { purchase_id: fulfillment.purchase_id, ticket_ids: fulfillment.ticket_ids }))
}
