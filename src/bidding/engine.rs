use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, warn};

use crate::bidding::partner_client::PartnerClient;
use crate::bidder::{Bidder, BidderBid, HttpRequest, DEFAULT_CURRENCY};
use crate::config::config_manager::ConfigManager;
use crate::logging::auction_log::{AuctionLog, PartnerCallLog};
use crate::model::partner::PartnerSettings;
use crate::openrtb::request::BidRequest;
use crate::openrtb::response::{BidResponse, SeatBid};
use crate::privacy::us_california::UsCaliforniaGppReader;
use crate::privacy::{is_opted_out, scrub_user_data, GppModel};

/// 某个合作方产出的一条出价
#[derive(Debug, Clone)]
pub struct PartnerBid {
    pub partner: String,
    pub bid: BidderBid,
}

/// 按用户的隐私选择准备外发请求
pub fn prepare_outbound(request: &BidRequest) -> (BidRequest, bool) {
    let gpp_model = request.regs.as_ref().and_then(GppModel::from_regs);
    let reader = UsCaliforniaGppReader::new(gpp_model.as_ref());

    let mut outbound = request.clone();
    let scrubbed = is_opted_out(&reader);
    if scrubbed {
        scrub_user_data(&mut outbound);
    }
    (outbound, scrubbed)
}

/// 每个 impid 取价格最高的出价（一价）
pub fn select_winners(bids: Vec<PartnerBid>) -> Vec<PartnerBid> {
    let mut winners: Vec<PartnerBid> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for candidate in bids {
        match index.get(&candidate.bid.bid.impid) {
            Some(&pos) => {
                let current = &winners[pos];
                if candidate.bid.bid.price.partial_cmp(&current.bid.bid.price) == Some(Ordering::Greater) {
                    winners[pos] = candidate;
                }
            }
            None => {
                index.insert(candidate.bid.bid.impid.clone(), winners.len());
                winners.push(candidate);
            }
        }
    }
    winners
}

/// 竞价使用的币种：请求 `cur` 的第一个，未声明时为 USD
pub fn auction_currency(request: &BidRequest) -> &str {
    request
        .cur
        .as_ref()
        .and_then(|cur| cur.first())
        .map(String::as_str)
        .unwrap_or(DEFAULT_CURRENCY)
}

/// 不做汇率换算：币种与竞价币种不一致的出价不参与比价
pub fn split_by_currency(bids: Vec<PartnerBid>, currency: &str) -> (Vec<PartnerBid>, Vec<PartnerBid>) {
    bids.into_iter()
        .partition(|candidate| candidate.bid.currency.eq_ignore_ascii_case(currency))
}

/// 把胜出的出价组装成返回给上游的 BidResponse，每个合作方一个 seat。
/// 响应只有一个 `cur`，其它币种的胜者被丢弃。
pub fn build_response(request_id: &str, currency: &str, winners: &[PartnerBid]) -> Option<BidResponse> {
    let mut seats: Vec<SeatBid> = Vec::new();
    for winner in winners {
        if !winner.bid.currency.eq_ignore_ascii_case(currency) {
            warn!(request_id, partner = %winner.partner, currency = %winner.bid.currency, expected = currency, "winner dropped: currency mismatch");
            continue;
        }
        match seats.iter_mut().find(|seat| seat.seat.as_deref() == Some(winner.partner.as_str())) {
            Some(seat) => seat.bid.push(winner.bid.bid.clone()),
            None => seats.push(SeatBid {
                bid: vec![winner.bid.bid.clone()],
                seat: Some(winner.partner.clone()),
                group: Some(0),
            }),
        }
    }

    if seats.is_empty() {
        return None;
    }
    Some(BidResponse {
        id: request_id.to_string(),
        seatbid: Some(seats),
        bidid: None,
        cur: Some(currency.to_string()),
        nbr: None,
    })
}

/// 处理竞价请求：对所有启用的合作方构建请求、并发发送、解析出价并选出胜者。
pub async fn process_bid_request(
    bid_request: &BidRequest,
    config: &ConfigManager,
    client: &PartnerClient,
) -> Option<BidResponse> {
    let (outbound, scrubbed) = prepare_outbound(bid_request);
    let currency = auction_currency(bid_request);
    let mut auction_log = AuctionLog::new(&bid_request.id);
    auction_log.privacy_scrubbed = scrubbed;

    // 构建阶段：适配器为纯函数，失败的广告位只记录，不影响其它广告位
    let mut calls: Vec<(PartnerSettings, Arc<dyn Bidder>, HttpRequest)> = Vec::new();
    for (partner, bidder) in config.active_partners() {
        let built = bidder.make_http_requests(&outbound);
        if !built.errors.is_empty() {
            warn!(request_id = %bid_request.id, partner = %partner.name, errors = built.errors.len(), "partner rejected some impressions");
            auction_log.add_partner_call(PartnerCallLog {
                partner: partner.name.clone(),
                status: "bad_input".to_string(),
                errors: built.errors.iter().map(ToString::to_string).collect(),
                ..Default::default()
            });
        }
        for http_request in built.value {
            calls.push((partner.clone(), bidder.clone(), http_request));
        }
    }
    debug!(request_id = %bid_request.id, calls = calls.len(), "partner calls prepared");

    let outcomes = join_all(calls.iter().map(|(partner, _, http_request)| {
        client.execute(http_request, partner.timeout(bid_request.tmax))
    }))
    .await;

    // 解析阶段
    let mut partner_bids = Vec::new();
    for ((partner, bidder, http_request), outcome) in calls.iter().zip(outcomes) {
        let mut entry = PartnerCallLog {
            partner: partner.name.clone(),
            uri: http_request.uri.clone(),
            imp_ids: http_request.imp_ids.clone(),
            status: outcome.status.to_string(),
            elapsed_ms: outcome.elapsed_ms,
            ..Default::default()
        };

        if let Some(call) = outcome.call {
            entry.http_status = Some(call.status);
            let parsed = bidder.make_bids(&call, &http_request.payload);
            entry.errors = parsed.errors.iter().map(ToString::to_string).collect();
            let candidates = parsed.value.into_iter().map(|bid| PartnerBid {
                partner: partner.name.clone(),
                bid,
            });
            let (accepted, rejected) = split_by_currency(candidates.collect(), currency);
            for dropped in &rejected {
                warn!(request_id = %bid_request.id, partner = %partner.name, currency = %dropped.bid.currency, expected = currency, "bid dropped: currency mismatch");
                entry.errors.push(format!(
                    "bid {} dropped: currency {} does not match {}",
                    dropped.bid.bid.id, dropped.bid.currency, currency
                ));
            }
            entry.bids = accepted.len();
            partner_bids.extend(accepted);
        }
        auction_log.add_partner_call(entry);
    }

    let winners = select_winners(partner_bids);
    if let Some(best) = winners
        .iter()
        .max_by(|a, b| a.bid.bid.price.partial_cmp(&b.bid.bid.price).unwrap_or(Ordering::Equal))
    {
        auction_log.set_winner(&best.partner, best.bid.bid.price);
    }
    auction_log.emit();

    build_response(&bid_request.id, currency, &winners)
}
