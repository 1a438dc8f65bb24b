// src/bidder/registry.rs

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use crate::bidder::alkimi::{self, AlkimiBidder};
use crate::bidder::{Bidder, ConfigError};
use crate::model::partner::PartnerSettings;

/// 合作方名称 → 适配器实现
#[derive(Clone, Default)]
pub struct BidderRegistry {
    bidders: HashMap<String, Arc<dyn Bidder>>,
}

impl BidderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 按配置实例化所有启用的合作方，任一配置非法即整体失败
    pub fn from_settings(settings: &[PartnerSettings]) -> Result<Self, ConfigError> {
        let mut registry = Self::new();
        for partner in settings.iter().filter(|p| p.enabled) {
            let bidder = build_bidder(&partner.adapter, &partner.endpoint)?;
            info!(partner = %partner.name, adapter = %partner.adapter, endpoint = %partner.endpoint, "partner registered");
            registry.register(&partner.name, bidder);
        }
        Ok(registry)
    }

    pub fn register(&mut self, name: &str, bidder: Arc<dyn Bidder>) {
        self.bidders.insert(name.to_string(), bidder);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Bidder>> {
        self.bidders.get(name).cloned()
    }

    /// 已注册的合作方名称（排序后返回）
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.bidders.keys().cloned().collect();
        names.sort();
        names
    }
}

fn build_bidder(adapter: &str, endpoint: &str) -> Result<Arc<dyn Bidder>, ConfigError> {
    match adapter {
        alkimi::ADAPTER_NAME => Ok(Arc::new(AlkimiBidder::new(endpoint)?)),
        other => Err(ConfigError::UnknownAdapter(other.to_string())),
    }
}
