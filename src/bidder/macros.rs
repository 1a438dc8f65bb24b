// src/bidder/macros.rs

use crate::openrtb::response::Bid;

pub const AUCTION_PRICE: &str = "${AUCTION_PRICE}";

/// 价格渲染：不带多余的尾随 0、不带千分位、不使用科学计数法（10 → "10"，0.25 → "0.25"）
pub fn format_price(price: f64) -> String {
    if price == 0.0 {
        // 同时吞掉 -0.0
        return "0".to_string();
    }
    // f64 的 Display 输出可往返的最短十进制串，且从不使用指数形式
    price.to_string()
}

/// 将文本中所有 `${AUCTION_PRICE}` 替换为成交价；不含占位符时原样返回
pub fn resolve_price_macros(text: &str, price: f64) -> String {
    if !text.contains(AUCTION_PRICE) {
        return text.to_string();
    }
    text.replace(AUCTION_PRICE, &format_price(price))
}

/// 对出价的 adm 与 nurl 做宏替换
pub fn resolve_bid_macros(bid: &Bid) -> Bid {
    let mut resolved = bid.clone();
    resolved.adm = bid.adm.as_deref().map(|adm| resolve_price_macros(adm, bid.price));
    resolved.nurl = bid.nurl.as_deref().map(|nurl| resolve_price_macros(nurl, bid.price));
    resolved
}
