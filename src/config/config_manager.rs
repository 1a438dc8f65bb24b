// src/config/config_manager.rs

use std::sync::Arc;

use crate::bidder::registry::BidderRegistry;
use crate::bidder::{Bidder, ConfigError};
use crate::model::partner::PartnerSettings;

/// 运行期配置：合作方列表 + 对应的适配器注册表
#[derive(Clone)]
pub struct ConfigManager {
    partners: Vec<PartnerSettings>,
    registry: BidderRegistry,
}

impl ConfigManager {
    pub fn new(partners: Vec<PartnerSettings>) -> Result<Self, ConfigError> {
        let registry = BidderRegistry::from_settings(&partners)?;
        Ok(ConfigManager { partners, registry })
    }

    pub fn registry(&self) -> &BidderRegistry {
        &self.registry
    }

    /// 启用且已注册的合作方及其适配器
    pub fn active_partners(&self) -> Vec<(PartnerSettings, Arc<dyn Bidder>)> {
        self.partners
            .iter()
            .filter(|partner| partner.enabled)
            .filter_map(|partner| {
                self.registry
                    .get(&partner.name)
                    .map(|bidder| (partner.clone(), bidder))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_partners_skip_disabled_entries() {
        let partners = vec![
            PartnerSettings {
                name: "alkimi".to_string(),
                adapter: "alkimi".to_string(),
                endpoint: "http://localhost:9001/bid".to_string(),
                enabled: true,
                timeout_ms: Some(200),
            },
            PartnerSettings {
                name: "alkimi_eu".to_string(),
                adapter: "alkimi".to_string(),
                endpoint: "not a url".to_string(),
                enabled: false,
                timeout_ms: None,
            },
        ];
        let config = ConfigManager::new(partners).unwrap();
        let active = config.active_partners();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].0.name, "alkimi");
        assert_eq!(config.registry().names(), vec!["alkimi".to_string()]);
    }
}
