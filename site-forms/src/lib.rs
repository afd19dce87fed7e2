use wasm_bindgen::prelude::*;
use serde::Serialize;

pub mod captcha;
pub mod console;
pub mod error;
pub mod models;
pub mod session;

pub use error::FormError;
pub use models::{BookingForm, ContactForm, FollowUp, FormFields, SubmitOutcome};
pub use session::{FormSession, FormTransport};

#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsValue::from_str(&format!("序列化失败: {}", e)))
}

fn js_error(e: FormError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// 联系表单 - JavaScript 负责发请求，把结果交回这里处理
#[wasm_bindgen]
pub struct ContactFormJS {
    session: FormSession<ContactForm>,
}

#[wasm_bindgen]
impl ContactFormJS {
    #[wasm_bindgen(constructor)]
    pub fn new() -> ContactFormJS {
        ContactFormJS {
            session: FormSession::new(ContactForm::default()),
        }
    }

    pub fn set_field(&mut self, name: &str, value: &str) -> Result<(), JsValue> {
        self.session.set_field(name, value).map_err(js_error)
    }

    pub fn set_captcha_text(&mut self, value: &str) {
        self.session.set_captcha_text(value);
    }

    pub fn captcha_loaded(&mut self, markup: &str) -> Result<(), JsValue> {
        self.session.captcha_loaded(markup).map_err(js_error)
    }

    pub fn captcha_failed(&mut self) {
        self.session.captcha_failed();
    }

    /// 校验并返回要 POST 的 JSON
    pub fn begin_submit(&mut self) -> Result<String, JsValue> {
        self.session.begin_submit().map_err(js_error)
    }

    /// 返回 `{reloadCaptcha, focusCaptcha}`
    pub fn apply_response(&mut self, status: u16, body: &str) -> Result<JsValue, JsValue> {
        let follow_up = self.session.apply_response(status, body);
        to_js(&follow_up)
    }

    pub fn transport_failed(&mut self) -> Result<JsValue, JsValue> {
        let follow_up = self.session.transport_failed();
        to_js(&follow_up)
    }

    pub fn dismiss_success(&mut self) {
        self.session.dismiss_success();
    }

    pub fn state(&self) -> Result<JsValue, JsValue> {
        to_js(&self.session)
    }
}

impl Default for ContactFormJS {
    fn default() -> Self {
        Self::new()
    }
}

/// 预订表单
#[wasm_bindgen]
pub struct BookingFormJS {
    session: FormSession<BookingForm>,
}

#[wasm_bindgen]
impl BookingFormJS {
    /// `tour_title` 来自线路详情页的 `tourTitle` 查询参数
    #[wasm_bindgen(constructor)]
    pub fn new(tour_title: Option<String>) -> BookingFormJS {
        let form = tour_title
            .as_deref()
            .map(BookingForm::for_tour)
            .unwrap_or_default();
        BookingFormJS {
            session: FormSession::new(form),
        }
    }

    pub fn set_field(&mut self, name: &str, value: &str) -> Result<(), JsValue> {
        self.session.set_field(name, value).map_err(js_error)
    }

    pub fn set_captcha_text(&mut self, value: &str) {
        self.session.set_captcha_text(value);
    }

    pub fn captcha_loaded(&mut self, markup: &str) -> Result<(), JsValue> {
        self.session.captcha_loaded(markup).map_err(js_error)
    }

    pub fn captcha_failed(&mut self) {
        self.session.captcha_failed();
    }

    pub fn begin_submit(&mut self) -> Result<String, JsValue> {
        self.session.begin_submit().map_err(js_error)
    }

    pub fn apply_response(&mut self, status: u16, body: &str) -> Result<JsValue, JsValue> {
        let follow_up = self.session.apply_response(status, body);
        to_js(&follow_up)
    }

    pub fn transport_failed(&mut self) -> Result<JsValue, JsValue> {
        let follow_up = self.session.transport_failed();
        to_js(&follow_up)
    }

    pub fn state(&self) -> Result<JsValue, JsValue> {
        to_js(&self.session)
    }
}
