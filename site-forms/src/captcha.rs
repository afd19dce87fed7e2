use crate::error::FormError;
use crate::models::SubmitOutcome;
use serde_json::Value;

/// 服务器没有给出错误信息时的提示
pub const DEFAULT_FAILURE: &str = "Failed to submit";

/// 网络请求本身失败时的提示
pub const SERVER_ERROR: &str = "Server error";

/// 校验验证码接口返回的内联 SVG
pub fn validate_challenge(markup: &str) -> Result<&str, FormError> {
    let markup = markup.trim();
    if markup.to_ascii_lowercase().contains("<svg") {
        Ok(markup)
    } else {
        Err(FormError::CaptchaUnavailable)
    }
}

/// 服务器错误信息是否与验证码有关
pub fn mentions_captcha(message: &str) -> bool {
    message.to_lowercase().contains("captcha")
}

fn text<'a>(data: &'a Value, key: &str) -> Option<&'a str> {
    data.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// 根据状态码和响应体判断提交结果
///
/// 验证码错误依次从 `errors.captcha[0]`、`error`、`message` 中识别；
/// 响应体不是 JSON 时按空对象处理。
pub fn classify_response(status: u16, body: &str) -> SubmitOutcome {
    if (200..300).contains(&status) {
        return SubmitOutcome::Success;
    }

    let data: Value = serde_json::from_str(body).unwrap_or_else(|_| Value::Object(Default::default()));

    if let Some(message) = data.pointer("/errors/captcha/0").and_then(Value::as_str) {
        return SubmitOutcome::CaptchaRejected(message.to_string());
    }

    if let Some(message) = ["error", "message"].iter().filter_map(|key| text(&data, key)).find(|m| mentions_captcha(m)) {
        return SubmitOutcome::CaptchaRejected(message.to_string());
    }

    let message = text(&data, "error").or_else(|| text(&data, "message")).unwrap_or(DEFAULT_FAILURE);
    SubmitOutcome::Failed(message.to_string())
}
