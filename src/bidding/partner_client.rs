// src/bidding/partner_client.rs

use std::time::Instant;

use reqwest::Client;
use tokio::time::{timeout, Duration};
use tracing::debug;

use crate::bidder::{BidderCall, HttpMethod, HttpRequest};

/// 一次合作方调用的结果
#[derive(Debug, Clone)]
pub struct CallOutcome {
    /// 传输成功时交回给适配器的原始响应
    pub call: Option<BidderCall>,
    /// "success" / "timeout" / "invalid_response" / "encode_error"
    pub status: &'static str,
    pub elapsed_ms: u128,
}

/// 合作方 HTTP 客户端。只负责发送，不重试。
#[derive(Clone, Default)]
pub struct PartnerClient {
    client: Client,
}

impl PartnerClient {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    pub async fn execute(&self, request: &HttpRequest, timeout_duration: Duration) -> CallOutcome {
        let start = Instant::now();
        let body = match request.body() {
            Ok(body) => body,
            Err(e) => {
                debug!(uri = %request.uri, error = %e, "failed to encode partner request");
                return CallOutcome { call: None, status: "encode_error", elapsed_ms: 0 };
            }
        };

        let builder = match request.method {
            HttpMethod::Post => self.client.post(&request.uri),
        };
        let builder = request
            .headers
            .iter()
            .fold(builder, |builder, (name, value)| builder.header(name, value));

        let response = timeout(timeout_duration, async {
            let response = builder.body(body).send().await?;
            let status = response.status().as_u16();
            let text = response.text().await?;
            Ok::<_, reqwest::Error>(BidderCall { status, body: Some(text) })
        })
        .await;
        let elapsed_ms = start.elapsed().as_millis();

        match response {
            Ok(Ok(call)) => CallOutcome { call: Some(call), status: "success", elapsed_ms },
            Ok(Err(e)) => {
                debug!(uri = %request.uri, error = %e, "partner call failed");
                CallOutcome { call: None, status: "invalid_response", elapsed_ms }
            }
            Err(_) => CallOutcome { call: None, status: "timeout", elapsed_ms },
        }
    }
}
