use thiserror::Error;

/// 解析前的致命错误
#[derive(Error, Debug)]
pub enum ScriptError {
    #[error("不支持的文件类型: {0}")]
    UnsupportedFormat(String),

    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON错误: {0}")]
    Json(#[from] serde_json::Error),

    #[error("无效的配置: {0}")]
    Config(String),
}

pub type ScriptResult<T> = Result<T, ScriptError>;

/// 外部服务（识别、情绪、摘要、中心度）调用失败
///
/// 只在单个句子或场景内降级处理，不会中断整次分析
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CollaboratorError {
    #[error("服务不可用: {0}")]
    Unavailable(String),

    #[error("{service} 调用失败: {message}")]
    Failed { service: String, message: String },

    #[error("返回结果数量不匹配: 期望 {expected}, 实际 {actual}")]
    LengthMismatch { expected: usize, actual: usize },
}

pub type CollaboratorResult<T> = Result<T, CollaboratorError>;
