// src/bidder/error.rs

/// 单次调用内的非致命错误，与部分结果一起返回，适配器自身从不重试
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BidderError {
    /// 请求侧：广告位扩展配置无法解析
    #[error("{0}")]
    BadInput(String),

    /// 响应侧：响应体无法解码，或出价无法对应到请求
    #[error("{0}")]
    BadServerResponse(String),
}

impl BidderError {
    pub fn bad_input(message: impl Into<String>) -> Self {
        BidderError::BadInput(message.into())
    }

    pub fn bad_server_response(message: impl Into<String>) -> Self {
        BidderError::BadServerResponse(message.into())
    }

    /// 解码失败统一使用 `Failed to decode: ` 前缀，后接解析器原始信息
    pub fn decode(source: impl std::fmt::Display) -> Self {
        BidderError::BadServerResponse(format!("Failed to decode: {}", source))
    }
}

/// 构造期的致命配置错误
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 无法解析，或不是带主机名的 http(s) 绝对地址
    #[error("invalid endpoint url `{url}`: {reason}")]
    InvalidEndpoint { url: String, reason: String },

    #[error("unknown adapter `{0}`")]
    UnknownAdapter(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_error_carries_prefix_and_detail() {
        let source = serde_json::from_str::<serde_json::Value>("invalid").unwrap_err();
        let error = BidderError::decode(&source);
        assert!(matches!(error, BidderError::BadServerResponse(_)));
        assert!(error.to_string().starts_with("Failed to decode: "));
        assert!(error.to_string().ends_with(&source.to_string()));
    }
}
