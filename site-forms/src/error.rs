use thiserror::Error;

/// 表单错误
///
/// 校验类错误直接显示在表单上，表单保持可编辑。
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Field is required: {0}")]
    MissingField(String),

    #[error("Invalid email address")]
    InvalidEmail,

    #[error("Please enter the captcha code")]
    MissingCaptcha,

    /// 上一次提交尚未返回
    #[error("Submission already in progress")]
    AlreadySending,

    /// 验证码接口返回的不是 SVG
    #[error("Failed to load captcha")]
    CaptchaUnavailable,

    /// 网络层失败（请求未完成）
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Failed to encode form: {0}")]
    Encode(String),
}
