// src/bidder/alkimi/bids.rs

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::bidder::macros::resolve_bid_macros;
use crate::bidder::{BidType, BidderBid, BidderCall, BidderError, BidderResult, DEFAULT_CURRENCY};
use crate::openrtb::request::BidRequest;
use crate::openrtb::response::{Bid, BidResponse};

/// 解析合作方原始响应：
/// - 空 body / `null` / 无 seatbid → 无出价、无错误；
/// - 无法解码 → 一条 `Failed to decode: ...` 错误；
/// - 其余每个出价先做价格宏替换，再对照原始请求判定创意格式。
pub fn make_bids(call: &BidderCall, request: &BidRequest) -> BidderResult<Vec<BidderBid>> {
    let body = match call.body.as_deref().map(str::trim) {
        Some(body) if !body.is_empty() => body,
        _ => return BidderResult::empty(),
    };
    if call.status == 204 {
        debug!(status = call.status, "partner returned no content");
        return BidderResult::empty();
    }

    let response = match serde_json::from_str::<Option<BidResponse>>(body) {
        Ok(Some(response)) => response,
        Ok(None) => return BidderResult::empty(),
        Err(e) => return BidderResult::with_error(BidderError::decode(e)),
    };

    let currency = response.cur.as_deref().unwrap_or(DEFAULT_CURRENCY);
    let mut classifier = BidTypeClassifier::new(request);
    let mut bids = Vec::new();
    let mut errors = Vec::new();

    for bid in response.bids() {
        let resolved = resolve_bid_macros(bid);
        match classifier.classify(&resolved) {
            Some(bid_type) => bids.push(BidderBid::of(resolved, bid_type, currency)),
            None => {
                warn!(bid_id = %bid.id, impid = %bid.impid, "bid does not match any requested impression");
                errors.push(BidderError::bad_server_response(format!(
                    "Bid {} references unknown impression {}",
                    bid.id, bid.impid
                )));
            }
        }
    }

    BidderResult::of(bids, errors)
}

/// 根据原始请求判定出价的创意格式，从不直接信任响应里未经校验的字段。
///
/// 传入单个 `HttpRequest` 的拆分 payload 时每个 impid 只有一种格式，判定是精确的，
/// 引擎总是这样调用。
///
/// 传入未拆分的完整请求时，同一 impid 可能声明多个格式（banner / video / audio）：
/// `mtype` 若指向其中一个已声明格式则采用之，否则只能按响应中的出现顺序依次对应，
/// 此时结果依赖合作方的出价顺序。
pub struct BidTypeClassifier<'a> {
    request: &'a BidRequest,
    seen: HashMap<String, usize>,
}

impl<'a> BidTypeClassifier<'a> {
    pub fn new(request: &'a BidRequest) -> Self {
        Self {
            request,
            seen: HashMap::new(),
        }
    }

    pub fn classify(&mut self, bid: &Bid) -> Option<BidType> {
        let declared = self.declared_types(&bid.impid);
        if declared.is_empty() {
            return None;
        }

        if let Some(bid_type) = bid.mtype.and_then(BidType::from_mtype) {
            if declared.contains(&bid_type) {
                return Some(bid_type);
            }
        }

        let ordinal = self.seen.entry(bid.impid.clone()).or_insert(0);
        let bid_type = declared.get(*ordinal).or_else(|| declared.first()).copied();
        *ordinal += 1;
        bid_type
    }

    fn declared_types(&self, impid: &str) -> Vec<BidType> {
        let mut declared = Vec::new();
        for imp in self.request.imp.iter().filter(|imp| imp.id == impid) {
            for bid_type in imp.declared_types() {
                if !declared.contains(&bid_type) {
                    declared.push(bid_type);
                }
            }
        }
        declared
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openrtb::request::{Audio, Banner, Imp, Video};

    fn request() -> BidRequest {
        BidRequest {
            id: "req".to_string(),
            imp: vec![
                Imp { id: "b".to_string(), banner: Some(Banner::default()), ..Default::default() },
                Imp { id: "v".to_string(), video: Some(Video::default()), ..Default::default() },
                Imp { id: "a".to_string(), audio: Some(Audio::default()), ..Default::default() },
                Imp { id: "none".to_string(), ..Default::default() },
            ],
            ..Default::default()
        }
    }

    fn bid(impid: &str, mtype: Option<i32>) -> Bid {
        Bid { id: format!("bid-{}", impid), impid: impid.to_string(), price: 1.0, mtype, ..Default::default() }
    }

    #[test]
    fn empty_body_yields_no_bids_and_no_errors() {
        for call in [BidderCall::empty(200), BidderCall::new(200, ""), BidderCall::new(200, "null")] {
            let result = make_bids(&call, &request());
            assert!(result.value.is_empty());
            assert!(result.errors.is_empty());
        }
    }

    #[test]
    fn missing_or_empty_seatbid_yields_no_bids() {
        for body in [r#"{"id":"r"}"#, r#"{"id":"r","seatbid":[]}"#] {
            let result = make_bids(&BidderCall::new(200, body), &request());
            assert!(result.value.is_empty());
            assert!(result.errors.is_empty());
        }
    }

    #[test]
    fn null_seat_or_null_bid_list_yields_no_bids() {
        for body in [
            r#"{"id":"r","seatbid":[{"bid":null}]}"#,
            r#"{"seatbid":[null]}"#,
            r#"{"id":"r","seatbid":null}"#,
        ] {
            let result = make_bids(&BidderCall::new(200, body), &request());
            assert!(result.value.is_empty(), "{}", body);
            assert!(result.errors.is_empty(), "{}", body);
        }
    }

    #[test]
    fn malformed_body_is_single_decode_error() {
        let result = make_bids(&BidderCall::new(200, "invalid"), &request());
        assert!(result.value.is_empty());
        assert_eq!(result.errors.len(), 1);
        assert!(matches!(result.errors[0], BidderError::BadServerResponse(_)));
        assert!(result.errors[0].to_string().starts_with("Failed to decode: "));
    }

    #[test]
    fn bids_are_classified_by_requested_imp() {
        let body = r#"{"id":"r","cur":"EUR","seatbid":[{"bid":[
            {"id":"1","impid":"b","price":1},
            {"id":"2","impid":"v","price":1},
            {"id":"3","impid":"a","price":1}
        ]}]}"#;
        let result = make_bids(&BidderCall::new(200, body), &request());
        assert!(result.errors.is_empty());
        let types: Vec<BidType> = result.value.iter().map(|b| b.bid_type).collect();
        assert_eq!(types, vec![BidType::Banner, BidType::Video, BidType::Audio]);
        assert!(result.value.iter().all(|b| b.currency == "EUR"));
    }

    #[test]
    fn unmatched_bid_is_dropped_with_soft_error() {
        let body = r#"{"seatbid":[{"bid":[
            {"id":"1","impid":"missing","price":1},
            {"id":"2","impid":"none","price":1},
            {"id":"3","impid":"b","price":1}
        ]}]}"#;
        let result = make_bids(&BidderCall::new(200, body), &request());
        assert_eq!(result.value.len(), 1);
        assert_eq!(result.value[0].bid.id, "3");
        assert_eq!(result.errors.len(), 2);
        assert!(result.errors.iter().all(|e| matches!(e, BidderError::BadServerResponse(_))));
    }

    #[test]
    fn mtype_must_match_a_declared_format() {
        let request = request();
        let mut classifier = BidTypeClassifier::new(&request);
        // 声称是 video，但 imp "b" 只声明了 banner
        assert_eq!(classifier.classify(&bid("b", Some(2))), Some(BidType::Banner));
    }

    #[test]
    fn repeated_impid_walks_declared_formats() {
        let request = BidRequest {
            imp: vec![Imp {
                id: "X".to_string(),
                banner: Some(Banner::default()),
                video: Some(Video::default()),
                audio: Some(Audio::default()),
                ..Default::default()
            }],
            ..Default::default()
        };
        let mut classifier = BidTypeClassifier::new(&request);
        assert_eq!(classifier.classify(&bid("X", None)), Some(BidType::Banner));
        assert_eq!(classifier.classify(&bid("X", None)), Some(BidType::Video));
        assert_eq!(classifier.classify(&bid("X", Some(3))), Some(BidType::Audio));
        assert_eq!(classifier.classify(&bid("X", None)), Some(BidType::Audio));
        assert_eq!(classifier.classify(&bid("X", None)), Some(BidType::Banner));
    }
}
