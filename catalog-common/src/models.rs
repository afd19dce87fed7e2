use crate::locale::Locale;
use crate::localized::LocalizedFields;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// 接口字段名
pub mod fields {
    pub const TITLE: &str = "title";
    pub const TEXT: &str = "text";
    pub const LOCATION: &str = "location";
    pub const TYPE: &str = "type";
    pub const CATEGORY: &str = "cat";
    pub const DURATION: &str = "duration";
    pub const PRICE: &str = "price";
    pub const POPULAR: &str = "popular";
}

/// 可被列表页筛选的记录
pub trait Listable {
    /// 数据源分配的唯一ID
    fn id(&self) -> u64;

    /// 多语言字段，按语言回退规则取值
    fn localized(&self, field: &str, locale: Locale) -> Option<&str>;

    /// 数值字段（价格等）
    fn numeric(&self, _field: &str) -> Option<f64> {
        None
    }

    /// 标记字段（是否热门等）
    fn flag(&self, _field: &str) -> Option<i64> {
        None
    }

    /// 发布时间，无法解析时为 None
    fn timestamp(&self) -> Option<DateTime<Utc>> {
        None
    }
}

/// 旅游线路
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Tour {
    pub id: u64,
    /// 标题、地点、类型、分类、天数等多语言字段
    pub fields: LocalizedFields,
    pub price: Option<f64>,
    /// 接口中 1 表示热门
    #[serde(default)]
    pub popular: i64,
    #[serde(default)]
    pub image: Option<String>,
}

impl Tour {
    pub const LOCALIZED_FIELDS: [&'static str; 5] = [
        fields::TITLE,
        fields::LOCATION,
        fields::TYPE,
        fields::CATEGORY,
        fields::DURATION,
    ];

    pub fn is_popular(&self) -> bool {
        self.popular != 0
    }
}

impl Listable for Tour {
    fn id(&self) -> u64 {
        self.id
    }

    fn localized(&self, field: &str, locale: Locale) -> Option<&str> {
        self.fields.resolve(field, locale)
    }

    fn numeric(&self, field: &str) -> Option<f64> {
        match field {
            fields::PRICE => self.price.filter(|p| p.is_finite()),
            _ => None,
        }
    }

    fn flag(&self, field: &str) -> Option<i64> {
        match field {
            fields::POPULAR => Some(self.popular),
            _ => None,
        }
    }
}

/// 博客文章
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct BlogPost {
    pub id: u64,
    /// 标题和正文（正文为富文本）
    pub fields: LocalizedFields,
    /// 接口返回的原始日期字符串
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub image: Option<String>,
}

impl BlogPost {
    pub const LOCALIZED_FIELDS: [&'static str; 2] = [fields::TITLE, fields::TEXT];
}

impl Listable for BlogPost {
    fn id(&self) -> u64 {
        self.id
    }

    fn localized(&self, field: &str, locale: Locale) -> Option<&str> {
        self.fields.resolve(field, locale)
    }

    fn timestamp(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.date)
    }
}

/// 解析接口中出现过的几种日期格式
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// 首页博客预览：接口顺序中的最后 n 篇，最新的在前
pub fn latest_posts(posts: &[BlogPost], n: usize) -> Vec<&BlogPost> {
    posts.iter().rev().take(n).collect()
}

/// 筛选选项（线路类型、分类、地点）
///
/// 选项和线路之间没有外键，按当前语言下的文本相等关联。
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct LookupOption {
    pub id: u64,
    /// 对应线路上的字段名：`type`、`cat` 或 `location`
    pub field: String,
    pub names: LocalizedFields,
}

impl LookupOption {
    pub fn value(&self, locale: Locale) -> Option<&str> {
        self.names.resolve(&self.field, locale)
    }
}

/// 酒店
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Hotel {
    pub id: u64,
    #[serde(default)]
    pub rating: f64,
    pub fields: LocalizedFields,
}

impl Hotel {
    pub const LOCALIZED_FIELDS: [&'static str; 2] = [fields::TITLE, fields::TEXT];

    /// 展示的星星数量
    pub fn stars(&self) -> u8 {
        if !self.rating.is_finite() || self.rating < 1.0 {
            return 0;
        }
        self.rating.floor().min(5.0) as u8
    }
}

/// 酒店设施
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct HotelAsset {
    pub id: u64,
    pub hotel_id: u64,
    #[serde(default)]
    pub icon: Option<String>,
    pub fields: LocalizedFields,
}

impl HotelAsset {
    pub const LOCALIZED_FIELDS: [&'static str; 1] = [fields::TEXT];
}

/// 取某家酒店的设施，保持接口顺序
pub fn assets_for(hotel_id: u64, assets: &[HotelAsset]) -> Vec<&HotelAsset> {
    assets.iter().filter(|a| a.hotel_id == hotel_id).collect()
}

/// 签证说明
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Visa {
    pub id: u64,
    pub fields: LocalizedFields,
}

impl Visa {
    pub const LOCALIZED_FIELDS: [&'static str; 2] = [fields::TITLE, fields::TEXT];
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    fn post(id: u64, date: &str) -> BlogPost {
        BlogPost {
            id,
            fields: LocalizedFields::new().with(fields::TITLE, Locale::En, "post"),
            date: date.to_string(),
            image: None,
        }
    }

    #[test]
    fn parses_supported_date_formats() {
        assert_eq!(parse_timestamp("2024-03-05").map(|d| d.day()), Some(5));
        assert!(parse_timestamp("2024-03-05T10:20:30Z").is_some());
        assert!(parse_timestamp("2024-03-05T10:20:30.000Z").is_some());
        assert!(parse_timestamp("2024-03-05 10:20:30").is_some());
        assert!(parse_timestamp("2024-03-05T10:20:30.123").is_some());
        assert!(parse_timestamp("yesterday").is_none());
        assert!(parse_timestamp("").is_none());
    }

    #[test]
    fn latest_posts_takes_tail_newest_first() {
        let posts: Vec<BlogPost> = (1..=6).map(|i| post(i, "2024-01-01")).collect();
        let ids: Vec<u64> = latest_posts(&posts, 4).iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![6, 5, 4, 3]);
        assert_eq!(latest_posts(&posts[..2], 4).len(), 2);
    }

    #[test]
    fn hotel_stars_are_clamped() {
        let mut hotel = Hotel { id: 1, rating: 4.7, fields: LocalizedFields::new() };
        assert_eq!(hotel.stars(), 4);
        hotel.rating = 9.0;
        assert_eq!(hotel.stars(), 5);
        hotel.rating = -1.0;
        assert_eq!(hotel.stars(), 0);
    }

    #[test]
    fn assets_are_joined_by_hotel_id() {
        let asset = |id, hotel_id| HotelAsset { id, hotel_id, icon: None, fields: LocalizedFields::new() };
        let assets = vec![asset(1, 7), asset(2, 8), asset(3, 7)];
        let ids: Vec<u64> = assets_for(7, &assets).iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn unpriced_tour_has_no_numeric_price() {
        let tour = Tour { id: 1, fields: LocalizedFields::new(), price: None, popular: 1, image: None };
        assert_eq!(tour.numeric(fields::PRICE), None);
        assert_eq!(tour.flag(fields::POPULAR), Some(1));
        assert!(tour.is_popular());
    }
}
