use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

/// **单次竞价的汇总日志**
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AuctionLog {
    pub timestamp: String,                 // 记录时间
    pub log_type: String,                  // 日志类型，固定为 "adx_auction"
    pub request_id: String,                // OpenRTB `BidRequest.id`
    pub partner_calls: usize,              // 合作方调用次数
    pub status: String,                    // 竞价结果 "success" or "failure"
    pub privacy_scrubbed: bool,            // 是否因用户退出而去掉了标识
    pub winning_partner: Option<String>,   // 胜出的合作方
    pub winning_price: f64,                // 胜出价格
    pub partner_log: Vec<PartnerCallLog>,  // 每次调用的明细
}

/// **合作方调用日志**
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct PartnerCallLog {
    pub partner: String,
    pub uri: String,
    pub imp_ids: Vec<String>,
    pub status: String,              // "success", "timeout", "invalid_response", "bad_input"
    pub http_status: Option<u16>,
    pub bids: usize,
    pub errors: Vec<String>,
    pub elapsed_ms: u128,
}

impl AuctionLog {
    pub fn new(request_id: &str) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            log_type: "adx_auction".to_string(),
            request_id: request_id.to_string(),
            partner_calls: 0,
            status: "failure".to_string(), // 默认失败，后续可更新
            privacy_scrubbed: false,
            winning_partner: None,
            winning_price: 0.0,
            partner_log: Vec::new(),
        }
    }

    pub fn add_partner_call(&mut self, entry: PartnerCallLog) {
        if entry.status != "bad_input" {
            self.partner_calls += 1;
        }
        self.partner_log.push(entry);
    }

    pub fn set_winner(&mut self, partner: &str, price: f64) {
        self.status = "success".to_string();
        self.winning_partner = Some(partner.to_string());
        self.winning_price = price;
    }

    /// 以一条结构化事件输出
    pub fn emit(&self) {
        match serde_json::to_string(self) {
            Ok(record) => info!(target: "adx_auction", request_id = %self.request_id, status = %self.status, record = %record),
            Err(e) => info!(target: "adx_auction", request_id = %self.request_id, error = %e, "unable to serialize auction log"),
        }
    }
}
