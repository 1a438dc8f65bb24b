use axum::{extract::State, http::StatusCode, response::IntoResponse, response::Response, Json};
use std::sync::Arc;
use tracing::info;

use crate::bidding::engine::process_bid_request;
use crate::openrtb::request::BidRequest;
use crate::AppState;

/// **处理 OpenRTB 竞价请求**
/// 有出价返回 200 + BidResponse，否则 204（无广告可填充）。
pub async fn handle_openrtb_request(
    State(state): State<Arc<AppState>>,
    Json(bid_request): Json<BidRequest>,
) -> Response {
    let bid_response = process_bid_request(&bid_request, &state.config, &state.client).await;

    match bid_response {
        Some(response) => {
            info!(request_id = %response.id, bids = response.bids().count(), "adx_inquiry_success");
            (StatusCode::OK, Json(response)).into_response()
        }
        None => {
            info!(request_id = %bid_request.id, "adx_inquiry_failed");
            StatusCode::NO_CONTENT.into_response()
        }
    }
}
