use crate::error::CatalogError;
use crate::localized::{split_localized_key, LocalizedFields};
use crate::models::{fields, BlogPost, Hotel, HotelAsset, LookupOption, Tour, Visa};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// 接口返回的单条记录
pub struct ApiRecord<'a> {
    map: &'a Map<String, Value>,
}

impl<'a> ApiRecord<'a> {
    pub fn new(map: &'a Map<String, Value>) -> Self {
        Self { map }
    }

    /// 记录ID，允许数字或数字字符串
    pub fn id(&self) -> Result<u64, CatalogError> {
        match self.map.get("id") {
            Some(Value::Number(n)) => n
                .as_u64()
                .ok_or_else(|| CatalogError::Decode(format!("无效的ID: {}", n))),
            Some(Value::String(s)) => s
                .trim()
                .parse()
                .map_err(|_| CatalogError::Decode(format!("无效的ID: {}", s))),
            _ => Err(CatalogError::Decode("记录缺少ID".to_string())),
        }
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        match self.map.get(key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn integer(&self, key: &str) -> Option<i64> {
        match self.map.get(key)? {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
            Value::String(s) => s.trim().parse().ok(),
            Value::Bool(b) => Some(i64::from(*b)),
            _ => None,
        }
    }

    pub fn string(&self, key: &str) -> Option<String> {
        match self.map.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// 收集指定字段的所有语言版本
    pub fn localized(&self, wanted: &[&str]) -> LocalizedFields {
        let mut fields = LocalizedFields::new();
        for (key, value) in self.map {
            let Some((field, locale)) = split_localized_key(key) else {
                continue;
            };
            if !wanted.contains(&field) {
                continue;
            }
            match value {
                Value::String(s) => fields.insert(field, locale, s.clone()),
                Value::Number(n) => fields.insert(field, locale, n.to_string()),
                _ => {}
            }
        }
        fields
    }
}

/// 能从接口记录构造的类型
pub trait FromApiRecord: Sized {
    fn from_record(record: &ApiRecord<'_>) -> Result<Self, CatalogError>;

    fn record_id(&self) -> u64;
}

impl FromApiRecord for Tour {
    fn from_record(record: &ApiRecord<'_>) -> Result<Self, CatalogError> {
        Ok(Tour {
            id: record.id()?,
            fields: record.localized(&Tour::LOCALIZED_FIELDS),
            price: record.number(fields::PRICE),
            popular: record.integer(fields::POPULAR).unwrap_or(0),
            image: record.string("image"),
        })
    }

    fn record_id(&self) -> u64 {
        self.id
    }
}

impl FromApiRecord for BlogPost {
    fn from_record(record: &ApiRecord<'_>) -> Result<Self, CatalogError> {
        Ok(BlogPost {
            id: record.id()?,
            fields: record.localized(&BlogPost::LOCALIZED_FIELDS),
            date: record.string("date").unwrap_or_default(),
            image: record.string("image"),
        })
    }

    fn record_id(&self) -> u64 {
        self.id
    }
}

impl FromApiRecord for Hotel {
    fn from_record(record: &ApiRecord<'_>) -> Result<Self, CatalogError> {
        Ok(Hotel {
            id: record.id()?,
            rating: record.number("rating").unwrap_or(0.0),
            fields: record.localized(&Hotel::LOCALIZED_FIELDS),
        })
    }

    fn record_id(&self) -> u64 {
        self.id
    }
}

impl FromApiRecord for HotelAsset {
    fn from_record(record: &ApiRecord<'_>) -> Result<Self, CatalogError> {
        let hotel_id = record
            .integer("hotel_id")
            .and_then(|id| u64::try_from(id).ok())
            .ok_or_else(|| CatalogError::Decode("酒店设施缺少 hotel_id".to_string()))?;
        Ok(HotelAsset {
            id: record.id()?,
            hotel_id,
            icon: record.string("icon"),
            fields: record.localized(&HotelAsset::LOCALIZED_FIELDS),
        })
    }

    fn record_id(&self) -> u64 {
        self.id
    }
}

impl FromApiRecord for Visa {
    fn from_record(record: &ApiRecord<'_>) -> Result<Self, CatalogError> {
        Ok(Visa {
            id: record.id()?,
            fields: record.localized(&Visa::LOCALIZED_FIELDS),
        })
    }

    fn record_id(&self) -> u64 {
        self.id
    }
}

fn records(json: &str) -> Result<Vec<Map<String, Value>>, CatalogError> {
    let value: Value = serde_json::from_str(json)?;
    let Value::Array(items) = value else {
        return Err(CatalogError::Decode("期望JSON数组".to_string()));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::Object(map) => Ok(map),
            _ => Err(CatalogError::Decode(format!("第 {} 个元素不是对象", i))),
        })
        .collect()
}

/// 解析整个集合（接口总是返回完整数组），拒绝重复ID
pub fn parse_collection<T: FromApiRecord>(json: &str) -> Result<Vec<T>, CatalogError> {
    let mut seen = HashSet::new();
    let mut items = Vec::new();

    for map in records(json)? {
        let item = T::from_record(&ApiRecord::new(&map))?;
        if !seen.insert(item.record_id()) {
            return Err(CatalogError::DuplicateId(item.record_id()));
        }
        items.push(item);
    }

    Ok(items)
}

/// 解析详情接口返回的单条记录
pub fn parse_record<T: FromApiRecord>(json: &str) -> Result<T, CatalogError> {
    let value: Value = serde_json::from_str(json)?;
    match value {
        Value::Object(map) => T::from_record(&ApiRecord::new(&map)),
        _ => Err(CatalogError::Decode("期望JSON对象".to_string())),
    }
}

/// 解析筛选选项列表，`field` 为选项在线路上对应的字段名
pub fn parse_lookup(json: &str, field: &str) -> Result<Vec<LookupOption>, CatalogError> {
    let mut seen = HashSet::new();
    let mut options = Vec::new();

    for map in records(json)? {
        let record = ApiRecord::new(&map);
        let id = record.id()?;
        if !seen.insert(id) {
            return Err(CatalogError::DuplicateId(id));
        }
        options.push(LookupOption {
            id,
            field: field.to_string(),
            names: record.localized(&[field]),
        });
    }

    Ok(options)
}
