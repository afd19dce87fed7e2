use crate::error::FormError;
use serde::{Deserialize, Serialize};

/// 表单字段集合
pub trait FormFields: Default + Serialize {
    /// 成功提示
    const SUCCESS_MESSAGE: &'static str;

    /// 网络失败时是否也换一张验证码
    const RELOAD_CAPTCHA_ON_TRANSPORT_ERROR: bool;

    /// 按页面上的 name 属性写入字段
    fn set(&mut self, name: &str, value: &str) -> Result<(), FormError>;

    /// 必填字段 (name, 当前值)
    fn required(&self) -> Vec<(&'static str, &str)>;

    fn email(&self) -> &str;

    /// 提交成功后清空
    fn clear(&mut self) {
        *self = Self::default();
    }
}

/// 联系表单
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ContactForm {
    pub name: String,
    pub surname: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

impl FormFields for ContactForm {
    const SUCCESS_MESSAGE: &'static str = "Message sent successfully!";
    const RELOAD_CAPTCHA_ON_TRANSPORT_ERROR: bool = false;

    fn set(&mut self, name: &str, value: &str) -> Result<(), FormError> {
        let slot = match name {
            "name" => &mut self.name,
            "surname" => &mut self.surname,
            "email" => &mut self.email,
            "subject" => &mut self.subject,
            "message" => &mut self.message,
            other => return Err(FormError::UnknownField(other.to_string())),
        };
        *slot = value.to_string();
        Ok(())
    }

    fn required(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("name", self.name.as_str()),
            ("surname", self.surname.as_str()),
            ("email", self.email.as_str()),
            ("message", self.message.as_str()),
        ]
    }

    fn email(&self) -> &str {
        &self.email
    }
}

/// 预订表单
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BookingForm {
    pub first_name: String,
    pub last_name: String,
    pub citizenship: String,
    pub email: String,
    pub phone: String,
    pub date: String,
    /// 从线路详情页跳转时带入的线路标题
    pub tour: String,
    pub travelers: String,
    pub message: String,
}

impl BookingForm {
    pub fn for_tour(title: &str) -> Self {
        Self {
            tour: title.to_string(),
            ..Self::default()
        }
    }
}

impl FormFields for BookingForm {
    const SUCCESS_MESSAGE: &'static str = "Your booking request has been sent!";
    const RELOAD_CAPTCHA_ON_TRANSPORT_ERROR: bool = true;

    fn set(&mut self, name: &str, value: &str) -> Result<(), FormError> {
        let slot = match name {
            "firstName" => &mut self.first_name,
            "lastName" => &mut self.last_name,
            "citizenship" => &mut self.citizenship,
            "email" => &mut self.email,
            "phone" => &mut self.phone,
            "date" => &mut self.date,
            "tour" => &mut self.tour,
            "travelers" => &mut self.travelers,
            "message" => &mut self.message,
            other => return Err(FormError::UnknownField(other.to_string())),
        };
        *slot = value.to_string();
        Ok(())
    }

    fn required(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("firstName", self.first_name.as_str()),
            ("lastName", self.last_name.as_str()),
            ("email", self.email.as_str()),
            ("phone", self.phone.as_str()),
            ("date", self.date.as_str()),
            ("travelers", self.travelers.as_str()),
        ]
    }

    fn email(&self) -> &str {
        &self.email
    }
}

/// 服务器对一次提交的答复
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum SubmitOutcome {
    Success,
    /// 验证码错误，需要换一张验证码
    CaptchaRejected(String),
    /// 其他错误，显示在表单上
    Failed(String),
}

/// 页面在处理完答复后需要做的事
#[derive(Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FollowUp {
    pub reload_captcha: bool,
    pub focus_captcha: bool,
}
