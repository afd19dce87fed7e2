use crate::locale::Locale;
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// 多语言字段字典 - 以 (字段名, 语言) 为键
///
/// 接口返回的是 `title_ru`、`title_en` 这样的扁平字段，这里统一存为显式的键值对，
/// 查找时不做字符串拼接。序列化时仍然还原为扁平形式，JSON 与二进制快照通用。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalizedFields {
    values: BTreeMap<(String, Locale), String>,
}

impl LocalizedFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// 写入某个字段在某种语言下的取值
    pub fn insert(&mut self, field: impl Into<String>, locale: Locale, value: impl Into<String>) {
        self.values.insert((field.into(), locale), value.into());
    }

    /// 链式构造，便于测试和构建器使用
    pub fn with(mut self, field: &str, locale: Locale, value: &str) -> Self {
        self.insert(field, locale, value);
        self
    }

    /// 精确查找，空白字符串视为缺失
    pub fn get(&self, field: &str, locale: Locale) -> Option<&str> {
        self.values
            .get(&(field.to_string(), locale))
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    /// 带回退的查找：请求语言 -> 英语 -> 第一个非空的语言
    pub fn resolve(&self, field: &str, locale: Locale) -> Option<&str> {
        self.get(field, locale)
            .or_else(|| self.get(field, Locale::En))
            .or_else(|| Locale::ALL.iter().find_map(|&l| self.get(field, l)))
    }

    pub fn resolve_or_empty(&self, field: &str, locale: Locale) -> &str {
        self.resolve(field, locale).unwrap_or("")
    }

    /// 该字段是否至少有一种语言的取值
    pub fn has_field(&self, field: &str) -> bool {
        self.resolve(field, Locale::En).is_some()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// 拆分 `title_en` 形式的键
pub fn split_localized_key(key: &str) -> Option<(&str, Locale)> {
    let (field, code) = key.rsplit_once('_')?;
    if field.is_empty() {
        return None;
    }
    Locale::parse(code).map(|locale| (field, locale))
}

impl Serialize for LocalizedFields {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for ((field, locale), value) in &self.values {
            map.serialize_entry(&format!("{}_{}", field, locale.code()), value)?;
        }
        map.end()
    }
}

struct LocalizedFieldsVisitor;

impl<'de> Visitor<'de> for LocalizedFieldsVisitor {
    type Value = LocalizedFields;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map of `<field>_<locale>` keys to strings")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut fields = LocalizedFields::new();
        while let Some((key, value)) = access.next_entry::<String, String>()? {
            let (field, locale) = split_localized_key(&key)
                .ok_or_else(|| de::Error::custom(format!("无效的多语言字段名: {}", key)))?;
            fields.insert(field, locale, value);
        }
        Ok(fields)
    }
}

impl<'de> Deserialize<'de> for LocalizedFields {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(LocalizedFieldsVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn title_only_tk() -> LocalizedFields {
        LocalizedFields::new().with("title", Locale::Tk, "Çöl Safari")
    }

    #[test]
    fn exact_lookup_ignores_blank_values() {
        let fields = LocalizedFields::new()
            .with("title", Locale::Ru, "   ")
            .with("title", Locale::En, "Desert Safari");
        assert_eq!(fields.get("title", Locale::Ru), None);
        assert_eq!(fields.get("title", Locale::En), Some("Desert Safari"));
    }

    #[test]
    fn resolve_prefers_english_then_any_variant() {
        let fields = LocalizedFields::new()
            .with("title", Locale::En, "Desert Safari")
            .with("title", Locale::Tk, "Çöl Safari");
        assert_eq!(fields.resolve("title", Locale::Ru), Some("Desert Safari"));
        assert_eq!(title_only_tk().resolve("title", Locale::En), Some("Çöl Safari"));
        assert_eq!(title_only_tk().resolve("text", Locale::En), None);
        assert_eq!(title_only_tk().resolve_or_empty("text", Locale::Ru), "");
    }

    #[test]
    fn serializes_to_flat_api_keys() {
        let fields = LocalizedFields::new()
            .with("title", Locale::En, "Merv")
            .with("cat", Locale::Ru, "История");
        let json = serde_json::to_value(&fields).unwrap();
        assert_eq!(json["title_en"], "Merv");
        assert_eq!(json["cat_ru"], "История");

        let back: LocalizedFields = serde_json::from_value(json).unwrap();
        assert_eq!(back, fields);
    }

    #[test]
    fn rejects_keys_without_locale_suffix() {
        let err = serde_json::from_str::<LocalizedFields>(r#"{"title": "x"}"#);
        assert!(err.is_err());
    }

    #[test]
    fn splits_field_names_containing_underscores() {
        assert_eq!(split_localized_key("short_text_ru"), Some(("short_text", Locale::Ru)));
        assert_eq!(split_localized_key("_en"), None);
        assert_eq!(split_localized_key("price"), None);
    }
}
