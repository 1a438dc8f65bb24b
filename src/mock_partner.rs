use axum::{routing::post, Json, Router};
use rand::Rng;
use tokio::net::TcpListener;
use tokio::time::{sleep, Duration};
use tracing::info;

use crate::bidder::macros::AUCTION_PRICE;
use crate::bidder::BidType;
use crate::openrtb::request::BidRequest;
use crate::openrtb::response::{Bid, BidResponse, SeatBid};

/// 按 Alkimi 方言生成模拟响应：每个 imp 出一个价，adm / nurl 中带价格宏
pub fn make_mock_response(request: &BidRequest) -> BidResponse {
    let mut rng = rand::thread_rng();
    let mut bids = Vec::new();

    for imp in &request.imp {
        let Some(bid_type) = imp.declared_types().into_iter().next() else {
            continue;
        };
        let bid_id = uuid::Uuid::new_v4().to_string();
        let bidfloor = imp.bidfloor.unwrap_or(0.1);
        let multiplier = match bid_type {
            BidType::Video => rng.gen_range(1.0..2.5),
            _ => rng.gen_range(1.0..2.0),
        };
        // 保留两位小数
        let price = (bidfloor * multiplier * 100.0).round() / 100.0;

        let adm = match bid_type {
            BidType::Banner => format!(
                "<html><body>Mock Alkimi Banner<img src=\"http://alkimi-mock.local/imp?bid={}&price={}\" style=\"display:none;\" /></body></html>",
                bid_id, AUCTION_PRICE
            ),
            BidType::Video | BidType::Audio => format!(
                "<VAST version=\"3.0\"><Ad id=\"{}\"><InLine><AdSystem>Mock Alkimi</AdSystem><Impression><![CDATA[http://alkimi-mock.local/imp?bid={}&price={}]]></Impression></InLine></Ad></VAST>",
                bid_id, bid_id, AUCTION_PRICE
            ),
            BidType::Native => String::new(),
        };

        bids.push(Bid {
            id: bid_id.clone(),
            impid: imp.id.clone(),
            price,
            adm: Some(adm),
            nurl: Some(format!("http://alkimi-mock.local/win?bid={}&price={}", bid_id, AUCTION_PRICE)),
            adomain: Some(vec!["alkimi-mock.local".to_string()]),
            crid: Some(format!("crid-{}", bid_type.as_str())),
            ..Default::default()
        });
    }

    BidResponse {
        id: request.id.clone(),
        seatbid: Some(vec![SeatBid {
            bid: bids,
            seat: Some("alkimi_mock".to_string()),
            group: Some(0),
        }]),
        bidid: None,
        cur: Some("USD".to_string()),
        nbr: None,
    }
}

async fn handle_partner_bid(Json(request): Json<BidRequest>) -> Json<BidResponse> {
    info!(request_id = %request.id, imp_count = request.imp.len(), "mock partner received request");

    // 模拟处理延迟（20 ~ 80 毫秒）
    let delay_ms = rand::thread_rng().gen_range(20..80);
    sleep(Duration::from_millis(delay_ms)).await;

    Json(make_mock_response(&request))
}

/// 启动模拟合作方，路由为 `/bid`
pub async fn start_mock_partner_server(port: u16) -> std::io::Result<()> {
    let app = Router::new().route("/bid", post(handle_partner_bid));

    let addr = format!("0.0.0.0:{}", port);
    info!("Mock partner running at http://{}", addr);

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await
}
