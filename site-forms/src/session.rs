use crate::captcha::{classify_response, validate_challenge, SERVER_ERROR};
use crate::console;
use crate::error::FormError;
use crate::models::{FollowUp, FormFields, SubmitOutcome};
use serde::Serialize;
use serde_json::Value;

/// 表单与服务器之间的通道
///
/// 浏览器里由 JavaScript 负责请求，原生调用方和测试通过这个 trait 驱动完整流程。
pub trait FormTransport {
    /// 获取新的验证码（内联 SVG）
    fn fetch_captcha(&mut self) -> Result<String, FormError>;

    /// 提交表单，返回 (状态码, 响应体)
    fn submit(&mut self, payload: &str) -> Result<(u16, String), FormError>;
}

/// 表单页面状态
#[derive(Serialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct FormSession<F> {
    fields: F,
    captcha_text: String,
    /// 验证码图片的 SVG 标记
    captcha_image: String,
    sending: bool,
    success: Option<String>,
    error: Option<String>,
    captcha_error: Option<String>,
}

impl<F: FormFields> FormSession<F> {
    pub fn new(fields: F) -> Self {
        Self {
            fields,
            captcha_text: String::new(),
            captcha_image: String::new(),
            sending: false,
            success: None,
            error: None,
            captcha_error: None,
        }
    }

    pub fn fields(&self) -> &F {
        &self.fields
    }

    pub fn captcha_text(&self) -> &str {
        &self.captcha_text
    }

    pub fn captcha_image(&self) -> &str {
        &self.captcha_image
    }

    pub fn is_sending(&self) -> bool {
        self.sending
    }

    pub fn success(&self) -> Option<&str> {
        self.success.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn captcha_error(&self) -> Option<&str> {
        self.captcha_error.as_deref()
    }

    pub fn set_field(&mut self, name: &str, value: &str) -> Result<(), FormError> {
        self.fields.set(name, value)
    }

    /// 修改验证码输入时清除验证码错误提示
    pub fn set_captcha_text(&mut self, value: &str) {
        self.captcha_text = value.to_string();
        self.captcha_error = None;
    }

    pub fn captcha_loaded(&mut self, markup: &str) -> Result<(), FormError> {
        match validate_challenge(markup) {
            Ok(svg) => {
                self.captcha_image = svg.to_string();
                Ok(())
            }
            Err(e) => {
                self.captcha_failed();
                Err(e)
            }
        }
    }

    pub fn captcha_failed(&mut self) {
        console::error("验证码加载失败");
        self.error = Some(FormError::CaptchaUnavailable.to_string());
    }

    /// 成功提示过期
    pub fn dismiss_success(&mut self) {
        self.success = None;
    }

    fn validate(&self) -> Result<(), FormError> {
        if let Some((name, _)) = self.fields.required().into_iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(FormError::MissingField(name.to_string()));
        }
        if !is_plausible_email(self.fields.email()) {
            return Err(FormError::InvalidEmail);
        }
        if self.captcha_text.trim().is_empty() {
            return Err(FormError::MissingCaptcha);
        }
        Ok(())
    }

    /// 开始提交：校验字段并生成请求体 `{...字段, captchaText}`
    ///
    /// 校验失败时错误显示在表单上，字段保持不变。
    pub fn begin_submit(&mut self) -> Result<String, FormError> {
        if self.sending {
            return Err(FormError::AlreadySending);
        }

        if let Err(e) = self.validate() {
            self.error = Some(e.to_string());
            return Err(e);
        }

        let mut payload = serde_json::to_value(&self.fields).map_err(|e| FormError::Encode(e.to_string()))?;
        if let Value::Object(map) = &mut payload {
            map.insert("captchaText".to_string(), Value::String(self.captcha_text.clone()));
        }

        self.sending = true;
        self.error = None;
        self.captcha_error = None;
        self.success = None;

        Ok(payload.to_string())
    }

    /// 处理服务器答复
    pub fn apply_response(&mut self, status: u16, body: &str) -> FollowUp {
        self.sending = false;

        match classify_response(status, body) {
            SubmitOutcome::Success => {
                console::log("表单提交成功");
                self.success = Some(F::SUCCESS_MESSAGE.to_string());
                self.fields.clear();
                self.captcha_text.clear();
                self.captcha_error = None;
                FollowUp { reload_captcha: true, focus_captcha: false }
            }
            // 只清空验证码输入，其余字段和提示保持不变
            SubmitOutcome::CaptchaRejected(message) => {
                console::log(&format!("验证码校验失败: {}", message));
                self.captcha_error = Some(message);
                self.captcha_text.clear();
                FollowUp { reload_captcha: true, focus_captcha: true }
            }
            SubmitOutcome::Failed(message) => {
                console::error(&format!("表单提交失败: {}", message));
                self.error = Some(message);
                FollowUp::default()
            }
        }
    }

    /// 请求没有完成（断网、跨域等）
    pub fn transport_failed(&mut self) -> FollowUp {
        self.sending = false;
        self.error = Some(SERVER_ERROR.to_string());
        FollowUp {
            reload_captcha: F::RELOAD_CAPTCHA_ON_TRANSPORT_ERROR,
            focus_captcha: false,
        }
    }

    pub fn load_captcha_with<T: FormTransport>(&mut self, transport: &mut T) {
        match transport.fetch_captcha() {
            Ok(markup) => {
                // 失败时 captcha_loaded 已记录错误
                let _ = self.captcha_loaded(&markup);
            }
            Err(e) => {
                console::error(&format!("获取验证码失败: {}", e));
                self.captcha_failed();
            }
        }
    }

    /// 完整的一次提交：校验、发送、处理答复，需要时换一张验证码
    pub fn submit_with<T: FormTransport>(&mut self, transport: &mut T) -> Result<FollowUp, FormError> {
        let payload = self.begin_submit()?;

        let follow_up = match transport.submit(&payload) {
            Ok((status, body)) => self.apply_response(status, &body),
            Err(e) => {
                console::error(&format!("请求失败: {}", e));
                self.transport_failed()
            }
        };

        if follow_up.reload_captcha {
            self.load_captcha_with(transport);
        }

        Ok(follow_up)
    }
}

/// 粗略的邮箱格式检查，与浏览器 `type="email"` 的要求相当
pub fn is_plausible_email(email: &str) -> bool {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && !domain.is_empty() && !domain.contains('@') && !email.contains(char::is_whitespace)
        }
        None => false,
    }
}
