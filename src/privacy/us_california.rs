// src/privacy/us_california.rs

use crate::privacy::{GppModel, UsCa, UsCustomLogicGppReader};

/// 加州分区读取器。模型或分区缺失时每个字段都返回 None。
/// 加州分区没有 sharing notice、定向广告相关字段、敏感数据处理退出通知以及 gpc segment type。
pub struct UsCaliforniaGppReader {
    consent: Option<UsCa>,
}

impl UsCaliforniaGppReader {
    pub fn new(gpp_model: Option<&GppModel>) -> Self {
        Self {
            consent: gpp_model.and_then(|model| model.us_ca.clone()),
        }
    }

    fn get<T>(&self, getter: impl FnOnce(&UsCa) -> Option<T>) -> Option<T> {
        self.consent.as_ref().and_then(getter)
    }
}

impl UsCustomLogicGppReader for UsCaliforniaGppReader {
    fn version(&self) -> Option<i32> {
        self.get(|c| c.version)
    }

    fn gpc(&self) -> Option<bool> {
        self.get(|c| c.gpc)
    }

    fn gpc_segment_type(&self) -> Option<bool> {
        None
    }

    fn gpc_segment_included(&self) -> Option<bool> {
        self.get(|c| c.gpc_segment_included)
    }

    fn sale_opt_out(&self) -> Option<i32> {
        self.get(|c| c.sale_opt_out)
    }

    fn sale_opt_out_notice(&self) -> Option<i32> {
        self.get(|c| c.sale_opt_out_notice)
    }

    fn sharing_notice(&self) -> Option<i32> {
        None
    }

    fn sharing_opt_out(&self) -> Option<i32> {
        self.get(|c| c.sharing_opt_out)
    }

    fn sharing_opt_out_notice(&self) -> Option<i32> {
        self.get(|c| c.sharing_opt_out_notice)
    }

    fn targeted_advertising_opt_out(&self) -> Option<i32> {
        None
    }

    fn targeted_advertising_opt_out_notice(&self) -> Option<i32> {
        None
    }

    fn sensitive_data_limit_use_notice(&self) -> Option<i32> {
        self.get(|c| c.sensitive_data_limit_use_notice)
    }

    fn sensitive_data_processing(&self) -> Option<Vec<i32>> {
        self.get(|c| c.sensitive_data_processing.clone())
    }

    fn sensitive_data_processing_opt_out_notice(&self) -> Option<i32> {
        None
    }

    fn known_child_sensitive_data_consents(&self) -> Option<Vec<i32>> {
        self.get(|c| c.known_child_sensitive_data_consents.clone())
    }

    fn personal_data_consents(&self) -> Option<i32> {
        self.get(|c| c.personal_data_consents)
    }

    fn mspa_covered_transaction(&self) -> Option<i32> {
        self.get(|c| c.mspa_covered_transaction)
    }

    fn mspa_service_provider_mode(&self) -> Option<i32> {
        self.get(|c| c.mspa_service_provider_mode)
    }

    fn mspa_opt_out_option_mode(&self) -> Option<i32> {
        self.get(|c| c.mspa_opt_out_option_mode)
    }
}
