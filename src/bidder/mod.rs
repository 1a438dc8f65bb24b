// src/bidder/mod.rs

pub mod alkimi;
pub mod error;
pub mod macros;
pub mod registry;

use serde::{Deserialize, Serialize};

use crate::openrtb::request::BidRequest;
use crate::openrtb::response::Bid;

pub use error::{BidderError, ConfigError};

pub const DEFAULT_CURRENCY: &str = "USD";

/// **需求方适配器契约**
///
/// 每个合作方一个实现：
/// - `make_http_requests` 把标准 BidRequest 翻译成合作方方言的 HTTP 请求；
/// - `make_bids` 把合作方的原始响应翻译回标准出价。
///
/// 两个方法都是输入的纯函数，不做 I/O，因此同一个适配器可以被并发调用。
pub trait Bidder: Send + Sync {
    fn make_http_requests(&self, request: &BidRequest) -> BidderResult<Vec<HttpRequest>>;

    /// `request` 应传发出该调用的 `HttpRequest.payload`，多格式广告位才能精确判定出价格式
    fn make_bids(&self, call: &BidderCall, request: &BidRequest) -> BidderResult<Vec<BidderBid>>;
}

/// 带部分成功语义的结果：值与非致命错误可以同时存在
#[derive(Debug, Clone, PartialEq)]
pub struct BidderResult<T> {
    pub value: T,
    pub errors: Vec<BidderError>,
}

impl<T> BidderResult<T> {
    pub fn of(value: T, errors: Vec<BidderError>) -> Self {
        Self { value, errors }
    }
}

impl<T: Default> BidderResult<T> {
    pub fn with_errors(errors: Vec<BidderError>) -> Self {
        Self::of(T::default(), errors)
    }

    pub fn with_error(error: BidderError) -> Self {
        Self::with_errors(vec![error])
    }

    pub fn empty() -> Self {
        Self::with_errors(Vec::new())
    }
}

/// 发往合作方的一次 HTTP 调用（传输由外部组件完成）
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub uri: String,
    pub headers: Vec<(String, String)>,
    /// 本次调用携带的 imp id
    pub imp_ids: Vec<String>,
    pub payload: BidRequest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Post,
}

impl HttpRequest {
    /// 标准 JSON POST
    pub fn post_json(uri: &str, payload: BidRequest) -> Self {
        let imp_ids = payload.imp.iter().map(|imp| imp.id.clone()).collect();
        Self {
            method: HttpMethod::Post,
            uri: uri.to_string(),
            headers: vec![
                ("Content-Type".to_string(), "application/json;charset=utf-8".to_string()),
                ("Accept".to_string(), "application/json".to_string()),
                ("x-openrtb-version".to_string(), "2.5".to_string()),
            ],
            imp_ids,
            payload,
        }
    }

    pub fn body(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(&self.payload)
    }
}

/// 传输层交回的原始响应
#[derive(Debug, Clone, PartialEq)]
pub struct BidderCall {
    pub status: u16,
    pub body: Option<String>,
}

impl BidderCall {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: Some(body.into()) }
    }

    pub fn empty(status: u16) -> Self {
        Self { status, body: None }
    }
}

/// 创意格式
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BidType {
    Banner,
    Video,
    Audio,
    Native,
}

impl BidType {
    /// OpenRTB 2.6 `bid.mtype`
    pub fn from_mtype(mtype: i32) -> Option<Self> {
        match mtype {
            1 => Some(BidType::Banner),
            2 => Some(BidType::Video),
            3 => Some(BidType::Audio),
            4 => Some(BidType::Native),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BidType::Banner => "banner",
            BidType::Video => "video",
            BidType::Audio => "audio",
            BidType::Native => "native",
        }
    }
}

/// 适配器产出的标准出价
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BidderBid {
    pub bid: Bid,
    pub bid_type: BidType,
    pub currency: String,
}

impl BidderBid {
    pub fn of(bid: Bid, bid_type: BidType, currency: &str) -> Self {
        Self {
            bid,
            bid_type,
            currency: currency.to_string(),
        }
    }
}
