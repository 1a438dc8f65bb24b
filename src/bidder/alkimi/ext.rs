// src/bidder/alkimi/ext.rs

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::bidder::BidderError;
use crate::openrtb::request::Imp;

/// imp.ext 中存放合作方配置的键
pub const BIDDER_KEY: &str = "bidder";

/// Alkimi 广告位配置（imp.ext.bidder）
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExtImpAlkimi {
    pub token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bid_floor: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instl: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ad_unit_code: Option<String>,
}

/// 读取 imp.ext.bidder
pub fn parse_imp_ext(imp: &Imp) -> Result<ExtImpAlkimi, BidderError> {
    let bidder = imp
        .ext
        .as_ref()
        .and_then(|ext| ext.get(BIDDER_KEY))
        .ok_or_else(|| {
            BidderError::bad_input(format!(
                "Failed to deserialize Alkimi extension: imp {} has no ext.{}",
                imp.id, BIDDER_KEY
            ))
        })?;

    ExtImpAlkimi::deserialize(bidder).map_err(|e| {
        BidderError::bad_input(format!(
            "Failed to deserialize Alkimi extension: imp {}: {}",
            imp.id, e
        ))
    })
}

/// 重建 imp.ext：其余键原样保留（位置不变），`bidder` 换成以 imp id 作为 adUnitCode 的新配置
pub fn make_imp_ext(imp: &Imp, ext: &ExtImpAlkimi) -> Result<Map<String, Value>, BidderError> {
    let rebuilt = ExtImpAlkimi {
        ad_unit_code: Some(imp.id.clone()),
        ..ext.clone()
    };

    let bidder = serde_json::to_value(&rebuilt).map_err(|e| {
        BidderError::bad_input(format!(
            "Failed to serialize Alkimi extension: imp {}: {}",
            imp.id, e
        ))
    })?;
    let mut imp_ext = imp.ext.clone().unwrap_or_default();
    imp_ext.insert(BIDDER_KEY.to_string(), bidder);
    Ok(imp_ext)
}
