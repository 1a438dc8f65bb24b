// src/model/adapters.rs

use crate::model::partner::PartnerSettings;
use std::fs;

#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("unable to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// 合作方配置来源
pub trait ConfigAdapter: Send + Sync {
    fn get_partners(&self) -> Result<Vec<PartnerSettings>, ConfigLoadError>;
}

/// 从 JSON 文件读取合作方配置
pub struct FileConfigAdapter {
    pub partners_file: String,
}

impl FileConfigAdapter {
    pub fn new(partners_file: &str) -> Self {
        Self {
            partners_file: partners_file.to_string(),
        }
    }
}

impl ConfigAdapter for FileConfigAdapter {
    fn get_partners(&self) -> Result<Vec<PartnerSettings>, ConfigLoadError> {
        let content = fs::read_to_string(&self.partners_file).map_err(|source| ConfigLoadError::Io {
            path: self.partners_file.clone(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigLoadError::Parse {
            path: self.partners_file.clone(),
            source,
        })
    }
}
