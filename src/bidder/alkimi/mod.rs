// src/bidder/alkimi/mod.rs

pub mod bids;
pub mod ext;
pub mod split;

use tracing::debug;
use url::Url;

use crate::bidder::{Bidder, BidderBid, BidderCall, BidderResult, ConfigError, HttpRequest};
use crate::openrtb::request::BidRequest;

pub const ADAPTER_NAME: &str = "alkimi";

/// **Alkimi 适配器**
///
/// 每个广告位按声明的创意格式拆分，每个拆分单独发起一次 POST。
pub struct AlkimiBidder {
    endpoint_url: String,
}

impl AlkimiBidder {
    /// endpoint 必须是带主机名的 http(s) 地址，否则直接失败
    pub fn new(endpoint_url: &str) -> Result<Self, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidEndpoint {
            url: endpoint_url.to_string(),
            reason,
        };
        let url = Url::parse(endpoint_url).map_err(|e| invalid(e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme `{}`", url.scheme())));
        }
        if !url.has_host() || url.host_str().is_some_and(str::is_empty) {
            return Err(invalid("missing host".to_string()));
        }
        Ok(Self {
            endpoint_url: endpoint_url.to_string(),
        })
    }
}

impl Bidder for AlkimiBidder {
    fn make_http_requests(&self, request: &BidRequest) -> BidderResult<Vec<HttpRequest>> {
        let mut requests = Vec::new();
        let mut errors = Vec::new();

        for imp in &request.imp {
            let imp_ext = match ext::parse_imp_ext(imp) {
                Ok(imp_ext) => imp_ext,
                Err(e) => {
                    errors.push(e);
                    continue;
                }
            };

            let splits = match split::split_imp(imp, &imp_ext) {
                Ok(splits) => splits,
                Err(e) => {
                    errors.push(e);
                    continue;
                }
            };

            for split in splits {
                let payload = BidRequest {
                    imp: vec![split],
                    ..request.clone()
                };
                requests.push(HttpRequest::post_json(&self.endpoint_url, payload));
            }
        }

        debug!(
            request_id = %request.id,
            imps = request.imp.len(),
            http_requests = requests.len(),
            errors = errors.len(),
            "alkimi requests built"
        );
        BidderResult::of(requests, errors)
    }

    fn make_bids(&self, call: &BidderCall, request: &BidRequest) -> BidderResult<Vec<BidderBid>> {
        bids::make_bids(call, request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bidder::{BidType, BidderError};
    use crate::openrtb::request::{Audio, Banner, Format, Imp, Video};
    use crate::openrtb::response::{Bid, BidResponse, SeatBid};
    use serde_json::json;

    const ENDPOINT_URL: &str = "https://exchange.alkimi-onboarding.com/server/bid";
    const PUB_TOKEN: &str = "testPubToken";

    fn target() -> AlkimiBidder {
        AlkimiBidder::new(ENDPOINT_URL).unwrap()
    }

    fn banner() -> Banner {
        Banner {
            format: Some(vec![Format { w: 300, h: 250 }]),
            ..Default::default()
        }
    }

    fn video() -> Video {
        Video {
            w: Some(1024),
            h: Some(768),
            mimes: Some(vec!["video/mp4".to_string()]),
            protocols: Some(vec![1, 2, 3, 4, 5]),
            ..Default::default()
        }
    }

    fn audio() -> Audio {
        Audio {
            mimes: Some(vec!["audio/mp4".to_string()]),
            ..Default::default()
        }
    }

    fn bidder_ext(floor: f64) -> serde_json::Value {
        json!({"token": PUB_TOKEN, "bidFloor": floor, "instl": 1, "exp": 30})
    }

    fn given_bid_request() -> BidRequest {
        BidRequest {
            id: "auction-1".to_string(),
            imp: vec![
                Imp {
                    id: "div_banner_1".to_string(),
                    banner: Some(banner()),
                    ext: json!({"tid": "12345", "gpid": "300x250", "bidder": bidder_ext(0.2)})
                        .as_object()
                        .cloned(),
                    ..Default::default()
                },
                Imp {
                    id: "div_video_1".to_string(),
                    video: Some(video()),
                    ext: json!({"bidder": bidder_ext(0.3)}).as_object().cloned(),
                    ..Default::default()
                },
                Imp {
                    id: "div_audio_1".to_string(),
                    audio: Some(audio()),
                    ext: json!({"bidder": bidder_ext(0.4)}).as_object().cloned(),
                    ..Default::default()
                },
            ],
            ..Default::default()
        }
    }

    fn multi_format_request() -> BidRequest {
        BidRequest {
            id: "auction-2".to_string(),
            imp: vec![Imp {
                id: "X".to_string(),
                banner: Some(banner()),
                video: Some(video()),
                audio: Some(audio()),
                ext: json!({"tid": "12345", "bidder": bidder_ext(0.2)}).as_object().cloned(),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    fn response_body(impids: &[&str], price: f64, adm: &str, nurl: &str) -> String {
        let response = BidResponse {
            id: "resp".to_string(),
            seatbid: Some(vec![SeatBid {
                bid: impids
                    .iter()
                    .enumerate()
                    .map(|(i, impid)| Bid {
                        id: format!("bid-{}", i),
                        impid: impid.to_string(),
                        price,
                        adm: Some(adm.to_string()),
                        nurl: Some(nurl.to_string()),
                        ..Default::default()
                    })
                    .collect(),
                ..Default::default()
            }]),
            ..Default::default()
        };
        serde_json::to_string(&response).unwrap()
    }

    #[test]
    fn creation_fails_on_invalid_endpoint_url() {
        for endpoint in [
            "invalid_url",
            "localhost:9001/bid",
            "alkimi:bid",
            "exchange.alkimi.com:443/server/bid",
            "ftp://exchange.alkimi.com/bid",
            "file:///tmp/bid",
        ] {
            let error = AlkimiBidder::new(endpoint).err();
            assert!(
                matches!(&error, Some(ConfigError::InvalidEndpoint { url, .. }) if url == endpoint),
                "{} accepted",
                endpoint
            );
        }
    }

    #[test]
    fn creation_accepts_http_and_https_endpoints() {
        assert!(AlkimiBidder::new("http://localhost:9001/bid").is_ok());
        assert!(AlkimiBidder::new(ENDPOINT_URL).is_ok());
    }

    #[test]
    fn requests_use_endpoint_url() {
        let result = target().make_http_requests(&given_bid_request());
        assert!(result.errors.is_empty());
        assert!(result.value.iter().all(|r| r.uri == ENDPOINT_URL));
    }

    #[test]
    fn imps_are_updated_from_bidder_ext() {
        let result = target().make_http_requests(&given_bid_request());
        let imps: Vec<&Imp> = result.value.iter().flat_map(|r| r.payload.imp.iter()).collect();
        assert_eq!(imps.len(), 3);

        let expected_banner = Imp {
            id: "div_banner_1".to_string(),
            bidfloor: Some(0.2),
            banner: Some(banner()),
            instl: Some(1),
            exp: Some(30),
            ext: json!({
                "tid": "12345",
                "gpid": "300x250",
                "bidder": {"token": PUB_TOKEN, "bidFloor": 0.2, "instl": 1, "exp": 30, "adUnitCode": "div_banner_1"}
            })
            .as_object()
            .cloned(),
            ..Default::default()
        };
        assert_eq!(imps[0], &expected_banner);

        let floors: Vec<Option<f64>> = imps.iter().map(|imp| imp.bidfloor).collect();
        assert_eq!(floors, vec![Some(0.2), Some(0.3), Some(0.4)]);
        assert_eq!(imps[1].ext.as_ref().unwrap()["bidder"]["adUnitCode"], "div_video_1");
        assert_eq!(imps[2].ext.as_ref().unwrap()["bidder"]["adUnitCode"], "div_audio_1");
    }

    #[test]
    fn bad_imp_ext_does_not_block_other_imps() {
        let mut request = given_bid_request();
        request.imp[1].ext = json!({"bidder": "not-an-object"}).as_object().cloned();

        let result = target().make_http_requests(&request);
        assert_eq!(result.errors.len(), 1);
        assert!(matches!(result.errors[0], BidderError::BadInput(_)));
        let ids: Vec<&str> = result.value.iter().map(|r| r.imp_ids[0].as_str()).collect();
        assert_eq!(ids, vec!["div_banner_1", "div_audio_1"]);
    }

    #[test]
    fn imp_without_formats_contributes_nothing() {
        let mut request = given_bid_request();
        request.imp[0].banner = None;

        let result = target().make_http_requests(&request);
        assert!(result.errors.is_empty());
        assert_eq!(result.value.len(), 2);
    }

    #[test]
    fn bids_resolve_price_macros() {
        let body = response_body(
            &["div_banner_1", "div_video_1", "div_audio_1"],
            10.0,
            "adm:${AUCTION_PRICE}",
            "nurl:${AUCTION_PRICE}",
        );
        let result = target().make_bids(&BidderCall::new(200, body), &given_bid_request());

        assert!(result.errors.is_empty());
        let resolved: Vec<(Option<&str>, Option<&str>)> = result
            .value
            .iter()
            .map(|b| (b.bid.nurl.as_deref(), b.bid.adm.as_deref()))
            .collect();
        assert_eq!(resolved, vec![(Some("nurl:10"), Some("adm:10")); 3]);
    }

    #[test]
    fn multi_format_round_trip() {
        let request = multi_format_request();
        let built = target().make_http_requests(&request);
        assert!(built.errors.is_empty());
        assert_eq!(built.value.len(), 3);
        assert!(built.value.iter().all(|r| r.payload.imp.len() == 1 && r.payload.imp[0].id == "X"));

        let split_types: Vec<BidType> = built
            .value
            .iter()
            .map(|r| r.payload.imp[0].declared_types()[0])
            .collect();
        assert_eq!(split_types, vec![BidType::Banner, BidType::Video, BidType::Audio]);

        let body = response_body(&["X", "X", "X"], 10.0, "adm:${AUCTION_PRICE}", "nurl");
        let parsed = target().make_bids(&BidderCall::new(200, body), &request);
        assert!(parsed.errors.is_empty());
        assert_eq!(parsed.value.len(), 3);
        assert!(parsed.value.iter().all(|b| b.bid.adm.as_deref() == Some("adm:10")));
        let bid_types: Vec<BidType> = parsed.value.iter().map(|b| b.bid_type).collect();
        assert_eq!(bid_types, split_types);
    }

    #[test]
    fn split_payload_classifies_against_outgoing_imp() {
        let built = target().make_http_requests(&multi_format_request());
        let video_call = &built.value[1];

        let body = response_body(&["X"], 2.5, "<VAST/>", "nurl");
        let parsed = target().make_bids(&BidderCall::new(200, body), &video_call.payload);
        assert_eq!(parsed.value.len(), 1);
        assert_eq!(parsed.value[0].bid_type, BidType::Video);
    }
}
