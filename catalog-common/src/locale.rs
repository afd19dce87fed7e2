use serde::{Deserialize, Serialize};
use std::fmt;

/// 站点支持的语言
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// 俄语
    Ru,
    /// 英语（默认及回退语言）
    En,
    /// 土库曼语
    Tk,
}

impl Locale {
    /// 所有语言，回退查找时按此顺序遍历
    pub const ALL: [Locale; 3] = [Locale::Ru, Locale::En, Locale::Tk];

    /// 解析语言代码，不区分大小写
    pub fn parse(code: &str) -> Option<Locale> {
        match code.trim().to_ascii_lowercase().as_str() {
            "ru" => Some(Locale::Ru),
            "en" => Some(Locale::En),
            "tk" => Some(Locale::Tk),
            _ => None,
        }
    }

    /// 解析语言代码，未知代码一律按英语处理
    pub fn from_code_or_default(code: &str) -> Locale {
        Self::parse(code).unwrap_or_default()
    }

    /// 语言代码，同时也是接口字段名的后缀
    pub fn code(self) -> &'static str {
        match self {
            Locale::Ru => "ru",
            Locale::En => "en",
            Locale::Tk => "tk",
        }
    }
}

impl Default for Locale {
    fn default() -> Self {
        Locale::En
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
