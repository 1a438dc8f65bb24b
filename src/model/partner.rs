// src/model/partner.rs

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 默认的合作方超时（毫秒）
pub const DEFAULT_TIMEOUT_MS: u64 = 250;
/// 超时下限（毫秒）
pub const MIN_TIMEOUT_MS: u64 = 100;

/// 合作方基础配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PartnerSettings {
    pub name: String,               // 合作方名称（注册表中的键）
    pub adapter: String,            // 使用的适配器，如 "alkimi"
    pub endpoint: String,           // 合作方竞价 API 地址
    #[serde(default = "default_enabled")]
    pub enabled: bool,              // 是否启用
    #[serde(default)]
    pub timeout_ms: Option<u64>,    // 每个合作方的超时（毫秒），至少 100
}

fn default_enabled() -> bool {
    true
}

impl PartnerSettings {
    /// 单次调用超时：未配置时回落到请求的 tmax，再回落到默认值
    pub fn timeout(&self, tmax: Option<u64>) -> Duration {
        let millis = self.timeout_ms.or(tmax).unwrap_or(DEFAULT_TIMEOUT_MS);
        Duration::from_millis(millis.max(MIN_TIMEOUT_MS))
    }
}
