use crate::error::ListingError;
use catalog_common::models::fields;
use catalog_common::text::strip_markup;
use catalog_common::{BlogPost, Hotel, HotelAsset, Locale, LookupOption, Tour, Visa};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// 排序方式
///
/// 同时接受页面下拉框的取值（`low`、`high`、`popular`、`new-to-old`、`old-to-new`）。
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// 保持接口原始顺序
    #[default]
    #[serde(alias = "")]
    None,
    #[serde(alias = "low")]
    PriceAscending,
    #[serde(alias = "high")]
    PriceDescending,
    /// 只保留热门线路，不改变顺序
    #[serde(alias = "popular")]
    PopularOnly,
    #[serde(alias = "new-to-old")]
    DateNewest,
    #[serde(alias = "old-to-new")]
    DateOldest,
}

impl SortKey {
    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::None => "none",
            SortKey::PriceAscending => "price_ascending",
            SortKey::PriceDescending => "price_descending",
            SortKey::PopularOnly => "popular_only",
            SortKey::DateNewest => "date_newest",
            SortKey::DateOldest => "date_oldest",
        }
    }
}

impl FromStr for SortKey {
    type Err = ListingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "none" => Ok(SortKey::None),
            "low" | "price_ascending" => Ok(SortKey::PriceAscending),
            "high" | "price_descending" => Ok(SortKey::PriceDescending),
            "popular" | "popular_only" => Ok(SortKey::PopularOnly),
            "new-to-old" | "date_newest" => Ok(SortKey::DateNewest),
            "old-to-new" | "date_oldest" => Ok(SortKey::DateOldest),
            other => Err(ListingError::UnknownSort(other.to_string())),
        }
    }
}

/// 列表页类型，决定允许的排序方式
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ListingKind {
    Tours,
    Blogs,
}

impl ListingKind {
    pub fn allowed_sorts(self) -> &'static [SortKey] {
        match self {
            ListingKind::Tours => &[
                SortKey::None,
                SortKey::PriceAscending,
                SortKey::PriceDescending,
                SortKey::PopularOnly,
            ],
            ListingKind::Blogs => &[SortKey::None, SortKey::DateNewest, SortKey::DateOldest],
        }
    }

    pub fn allows(self, sort: SortKey) -> bool {
        self.allowed_sorts().contains(&sort)
    }
}

impl fmt::Display for ListingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListingKind::Tours => f.write_str("tours"),
            ListingKind::Blogs => f.write_str("blogs"),
        }
    }
}

/// 数值区间筛选，闭区间
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RangeFilter {
    pub field: String,
    pub min: f64,
    pub max: f64,
    /// 区间覆盖全部观察值时，没有数值的记录也保留
    #[serde(default)]
    pub keep_missing: bool,
}

impl RangeFilter {
    pub fn new(field: &str, min: f64, max: f64) -> Self {
        Self { field: field.to_string(), min, max, keep_missing: false }
    }

    /// 完整范围：等同于不限制
    pub fn full(field: &str, min: f64, max: f64) -> Self {
        Self { keep_missing: true, ..Self::new(field, min, max) }
    }

    /// min > max 时为空区间
    pub fn contains(&self, value: Option<f64>) -> bool {
        match value {
            Some(v) => v >= self.min && v <= self.max,
            None => self.keep_missing,
        }
    }
}

/// 列表页的筛选状态
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct FilterState {
    /// 按标题不区分大小写的子串搜索
    pub search_text: String,
    pub sort_key: SortKey,
    /// 分类字段 -> 选中的选项，未出现的字段不做限制
    pub equality: BTreeMap<String, LookupOption>,
    pub range: Option<RangeFilter>,
}

/// 列表配置，由页面传入的 JSON 解析，缺省字段使用默认值
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ListingConfig {
    /// 每页条数
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// 语言代码，未知代码按英语处理
    #[serde(default, deserialize_with = "deserialize_locale")]
    pub locale: Locale,
}

fn default_page_size() -> usize {
    6
}

fn deserialize_locale<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<Locale, D::Error> {
    let code = String::deserialize(deserializer)?;
    Ok(Locale::from_code_or_default(&code))
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            locale: Locale::default(),
        }
    }
}

impl ListingConfig {
    pub fn from_json(json: Option<&str>) -> Result<Self, ListingError> {
        match json.map(str::trim).filter(|s| !s.is_empty()) {
            Some(json) => serde_json::from_str(json)
                .map_err(|e| ListingError::Catalog(catalog_common::CatalogError::from(e))),
            None => Ok(Self::default()),
        }
    }
}

/// 返回给页面的一页数据
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ListingPage<T> {
    pub items: Vec<T>,
    /// 筛选后的总数
    pub total: usize,
    /// 当前页码，从1开始
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
}

impl<T> ListingPage<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> ListingPage<U> {
        ListingPage {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            page_size: self.page_size,
            total_pages: self.total_pages,
        }
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// 线路卡片 - 已按当前语言取好值
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct TourCard {
    pub id: u64,
    /// 原始标题（可能含富文本标记）
    pub title: String,
    /// 去掉标记的标题，用于 alt 等纯文本场景
    pub plain_title: String,
    pub price: Option<f64>,
    pub duration: String,
    pub tour_type: String,
    pub location: String,
    pub category: String,
    pub popular: bool,
    pub image: Option<String>,
}

impl TourCard {
    pub fn from_tour(tour: &Tour, locale: Locale) -> Self {
        let get = |field: &str| tour.fields.resolve_or_empty(field, locale).to_string();
        let title = get(fields::TITLE);
        Self {
            id: tour.id,
            plain_title: strip_markup(&title),
            title,
            price: tour.price,
            duration: get(fields::DURATION),
            tour_type: get(fields::TYPE),
            location: get(fields::LOCATION),
            category: get(fields::CATEGORY),
            popular: tour.is_popular(),
            image: tour.image.clone(),
        }
    }
}

/// 摘要长度（字符数）
pub const EXCERPT_CHARS: usize = 160;

/// 博客卡片
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct BlogCard {
    pub id: u64,
    pub title: String,
    pub plain_title: String,
    /// 正文纯文本摘要
    pub excerpt: String,
    /// 原始日期字符串
    pub date: String,
    pub image: Option<String>,
}

impl BlogCard {
    pub fn from_post(post: &BlogPost, locale: Locale) -> Self {
        let title = post.fields.resolve_or_empty(fields::TITLE, locale).to_string();
        let text = strip_markup(post.fields.resolve_or_empty(fields::TEXT, locale));
        Self {
            id: post.id,
            plain_title: strip_markup(&title),
            title,
            excerpt: excerpt(&text, EXCERPT_CHARS),
            date: post.date.clone(),
            image: post.image.clone(),
        }
    }
}

/// 按字符截断，超出时追加省略号
pub fn excerpt(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}…", text[..cut].trim_end()),
        None => text.to_string(),
    }
}

/// 筛选选项在当前语言下的展示形式
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct OptionLabel {
    pub id: u64,
    pub label: String,
}

/// 目录快照 - 由索引工具生成，供 WASM 模块直接加载
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CatalogSnapshot {
    pub created_at: DateTime<Utc>,
    pub tours: Vec<Tour>,
    pub posts: Vec<BlogPost>,
    /// 字段名 -> 选项列表
    pub lookups: BTreeMap<String, Vec<LookupOption>>,
    pub hotels: Vec<Hotel>,
    pub hotel_assets: Vec<HotelAsset>,
    pub visas: Vec<Visa>,
}

impl CatalogSnapshot {
    pub fn lookup(&self, field: &str) -> &[LookupOption] {
        self.lookups.get(field).map(Vec::as_slice).unwrap_or(&[])
    }
}
