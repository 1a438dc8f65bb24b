// src/privacy/mod.rs

pub mod us_california;

use serde::{Deserialize, Serialize};

use crate::openrtb::request::{BidRequest, Regs};

/// regs.ext 中由上游 GPP 解码器写入的已解码分区
pub const GPP_SECTIONS_KEY: &str = "gpp_sections";

/// 已解码的 GPP 模型（位级解码由上游组件完成）
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct GppModel {
    #[serde(default, rename = "usca", skip_serializing_if = "Option::is_none")]
    pub us_ca: Option<UsCa>,
}

/// 加州（US-CA）分区
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UsCa {
    pub version: Option<i32>,
    pub sale_opt_out_notice: Option<i32>,
    pub sharing_opt_out_notice: Option<i32>,
    pub sensitive_data_limit_use_notice: Option<i32>,
    pub sale_opt_out: Option<i32>,
    pub sharing_opt_out: Option<i32>,
    pub sensitive_data_processing: Option<Vec<i32>>,
    pub known_child_sensitive_data_consents: Option<Vec<i32>>,
    pub personal_data_consents: Option<i32>,
    pub mspa_covered_transaction: Option<i32>,
    pub mspa_opt_out_option_mode: Option<i32>,
    pub mspa_service_provider_mode: Option<i32>,
    pub gpc_segment_included: Option<bool>,
    pub gpc: Option<bool>,
}

impl GppModel {
    /// 无 regs.ext.gpp_sections 或无法解析时返回 None
    pub fn from_regs(regs: &Regs) -> Option<Self> {
        let sections = regs.ext.as_ref()?.get(GPP_SECTIONS_KEY)?;
        GppModel::deserialize(sections).ok()
    }
}

/// 美国各州自定义逻辑的 GPP 读取器。所有字段返回 Option，None 表示未知。
pub trait UsCustomLogicGppReader {
    fn version(&self) -> Option<i32>;
    fn gpc(&self) -> Option<bool>;
    fn gpc_segment_type(&self) -> Option<bool>;
    fn gpc_segment_included(&self) -> Option<bool>;
    fn sale_opt_out(&self) -> Option<i32>;
    fn sale_opt_out_notice(&self) -> Option<i32>;
    fn sharing_notice(&self) -> Option<i32>;
    fn sharing_opt_out(&self) -> Option<i32>;
    fn sharing_opt_out_notice(&self) -> Option<i32>;
    fn targeted_advertising_opt_out(&self) -> Option<i32>;
    fn targeted_advertising_opt_out_notice(&self) -> Option<i32>;
    fn sensitive_data_limit_use_notice(&self) -> Option<i32>;
    fn sensitive_data_processing(&self) -> Option<Vec<i32>>;
    fn sensitive_data_processing_opt_out_notice(&self) -> Option<i32>;
    fn known_child_sensitive_data_consents(&self) -> Option<Vec<i32>>;
    fn personal_data_consents(&self) -> Option<i32>;
    fn mspa_covered_transaction(&self) -> Option<i32>;
    fn mspa_service_provider_mode(&self) -> Option<i32>;
    fn mspa_opt_out_option_mode(&self) -> Option<i32>;
}

const OPTED_OUT: i32 = 1;

/// 用户是否选择退出出售 / 共享
pub fn is_opted_out(reader: &dyn UsCustomLogicGppReader) -> bool {
    reader.sale_opt_out() == Some(OPTED_OUT) || reader.sharing_opt_out() == Some(OPTED_OUT)
}

/// 退出出售 / 共享时，外发前去掉用户与设备标识
pub fn scrub_user_data(request: &mut BidRequest) {
    request.user = None;
    if let Some(device) = request.device.as_mut() {
        device.ifa = None;
        device.ip = None;
    }
}
