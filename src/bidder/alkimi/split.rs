// src/bidder/alkimi/split.rs

use crate::bidder::alkimi::ext::{make_imp_ext, ExtImpAlkimi};
use crate::bidder::{BidType, BidderError};
use crate::openrtb::request::Imp;

/// 按创意格式拆分广告位：每个声明的格式（banner → video → audio）产出一个只带该格式的 imp。
/// 同一广告位拆出的所有 imp 共用同一份底价 / 插屏 / 过期时间覆盖值。
/// 扩展无法重建时整个广告位失败，不产出任何拆分。
pub fn split_imp(imp: &Imp, ext: &ExtImpAlkimi) -> Result<Vec<Imp>, BidderError> {
    let declared = imp.declared_types();
    if declared.is_empty() {
        return Ok(Vec::new());
    }

    let imp_ext = make_imp_ext(imp, ext)?;
    Ok(declared
        .into_iter()
        .map(|bid_type| {
            let mut split = Imp {
                banner: None,
                video: None,
                audio: None,
                native: None,
                bidfloor: ext.bid_floor.or(imp.bidfloor),
                instl: ext.instl.or(imp.instl),
                exp: ext.exp.or(imp.exp),
                ext: Some(imp_ext.clone()),
                ..imp.clone()
            };
            match bid_type {
                BidType::Banner => split.banner = imp.banner.clone(),
                BidType::Video => split.video = imp.video.clone(),
                BidType::Audio => split.audio = imp.audio.clone(),
                BidType::Native => {}
            }
            split
        })
        .collect())
}
