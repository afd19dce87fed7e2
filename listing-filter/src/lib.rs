use wasm_bindgen::prelude::*;
use catalog_common::models::fields;
use catalog_common::{parse_collection, parse_lookup, parse_record, BlogPost, Hotel, HotelAsset, Locale, Tour, Visa};
use serde::Serialize;

// 导出模块
pub mod builder;
pub mod console;
pub mod engine;
pub mod error;
pub mod information;
pub mod models;
pub mod pagination;
pub mod session;

pub use engine::ListQueryEngine;
pub use error::ListingError;
pub use information::{HotelCard, InformationCatalog, VisaCard};
pub use models::{BlogCard, CatalogSnapshot, FilterState, ListingConfig, ListingKind, ListingPage, SortKey, TourCard};
pub use pagination::{paginate, Page, PageCursor};
pub use session::ListingSession;

#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

/// 初始化函数 - 设置错误处理
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
}

/// 版本信息
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn js_error(e: impl std::fmt::Display) -> JsValue {
    let message = e.to_string();
    console::error(&message);
    JsValue::from_str(&message)
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| js_error(format!("序列化结果失败: {}", e)))
}

/// 线路列表页 - 提供给 JavaScript 使用
///
/// 所有修改方法都返回修改后的当前页。
#[wasm_bindgen]
pub struct TourListing {
    session: ListingSession<Tour>,
}

#[wasm_bindgen]
impl TourListing {
    /// 由各接口返回的 JSON 构建：线路、类型、分类、地点
    #[wasm_bindgen(constructor)]
    pub fn new(
        tours_json: &str,
        types_json: &str,
        categories_json: &str,
        locations_json: &str,
        config_json: Option<String>,
    ) -> Result<TourListing, JsValue> {
        let config = ListingConfig::from_json(config_json.as_deref()).map_err(js_error)?;
        let tours: Vec<Tour> = parse_collection(tours_json).map_err(js_error)?;

        let session = ListingSession::new(ListingKind::Tours, tours, &config)
            .map_err(js_error)?
            .with_lookup(fields::TYPE, parse_lookup(types_json, fields::TYPE).map_err(js_error)?)
            .with_lookup(fields::CATEGORY, parse_lookup(categories_json, fields::CATEGORY).map_err(js_error)?)
            .with_lookup(fields::LOCATION, parse_lookup(locations_json, fields::LOCATION).map_err(js_error)?);

        Ok(TourListing { session })
    }

    /// 由索引工具生成的目录快照构建
    pub fn from_snapshot(data: &[u8], config_json: Option<String>) -> Result<TourListing, JsValue> {
        let config = ListingConfig::from_json(config_json.as_deref()).map_err(js_error)?;
        let snapshot = CatalogSnapshot::from_compressed(data).map_err(js_error)?;

        let mut session = ListingSession::new(ListingKind::Tours, snapshot.tours.clone(), &config).map_err(js_error)?;
        for field in [fields::TYPE, fields::CATEGORY, fields::LOCATION] {
            session = session.with_lookup(field, snapshot.lookup(field).to_vec());
        }

        Ok(TourListing { session })
    }

    pub fn page(&self) -> Result<JsValue, JsValue> {
        let locale = self.session.locale();
        let page = self
            .session
            .current_page()
            .map_err(js_error)?
            .map(|tour| TourCard::from_tour(&tour, locale));
        to_js(&page)
    }

    pub fn set_search(&mut self, text: &str) -> Result<JsValue, JsValue> {
        self.session.set_search(text);
        self.page()
    }

    /// 选中分类字段的选项；`option_id` 为空时取消选择
    pub fn select(&mut self, field: &str, option_id: Option<u32>) -> Result<JsValue, JsValue> {
        match option_id {
            Some(id) => self.session.select(field, u64::from(id)).map_err(js_error)?,
            None => self.session.clear_selection(field),
        }
        self.page()
    }

    pub fn set_price_range(&mut self, min: f64, max: f64) -> Result<JsValue, JsValue> {
        self.session.set_price_range(min, max).map_err(js_error)?;
        self.page()
    }

    pub fn set_sort(&mut self, sort: &str) -> Result<JsValue, JsValue> {
        let sort: SortKey = sort.parse().map_err(js_error)?;
        self.session.set_sort(sort).map_err(js_error)?;
        self.page()
    }

    pub fn set_locale(&mut self, code: &str) -> Result<JsValue, JsValue> {
        self.session.set_locale(Locale::from_code_or_default(code));
        self.page()
    }

    pub fn reset(&mut self) -> Result<JsValue, JsValue> {
        self.session.reset();
        self.page()
    }

    pub fn next_page(&mut self) -> Result<JsValue, JsValue> {
        self.session.next_page();
        self.page()
    }

    pub fn prev_page(&mut self) -> Result<JsValue, JsValue> {
        self.session.prev_page();
        self.page()
    }

    pub fn go_to_page(&mut self, page: usize) -> Result<JsValue, JsValue> {
        self.session.go_to_page(page).map_err(js_error)?;
        self.page()
    }

    /// 价格滑块范围 `[min, max]`，没有任何价格时为 null
    pub fn price_bounds(&self) -> Result<JsValue, JsValue> {
        to_js(&self.session.price_bounds())
    }

    /// 分类字段在当前语言下的选项列表
    pub fn filter_options(&self, field: &str) -> Result<JsValue, JsValue> {
        to_js(&self.session.option_labels(field))
    }

    pub fn state(&self) -> Result<JsValue, JsValue> {
        to_js(self.session.state())
    }
}

/// 博客列表页
#[wasm_bindgen]
pub struct BlogListing {
    session: ListingSession<BlogPost>,
}

#[wasm_bindgen]
impl BlogListing {
    #[wasm_bindgen(constructor)]
    pub fn new(blogs_json: &str, config_json: Option<String>) -> Result<BlogListing, JsValue> {
        let config = ListingConfig::from_json(config_json.as_deref()).map_err(js_error)?;
        let posts: Vec<BlogPost> = parse_collection(blogs_json).map_err(js_error)?;
        let session = ListingSession::new(ListingKind::Blogs, posts, &config).map_err(js_error)?;
        Ok(BlogListing { session })
    }

    pub fn page(&self) -> Result<JsValue, JsValue> {
        let locale = self.session.locale();
        let page = self
            .session
            .current_page()
            .map_err(js_error)?
            .map(|post| BlogCard::from_post(&post, locale));
        to_js(&page)
    }

    pub fn set_search(&mut self, text: &str) -> Result<JsValue, JsValue> {
        self.session.set_search(text);
        self.page()
    }

    pub fn set_sort(&mut self, sort: &str) -> Result<JsValue, JsValue> {
        let sort: SortKey = sort.parse().map_err(js_error)?;
        self.session.set_sort(sort).map_err(js_error)?;
        self.page()
    }

    pub fn set_locale(&mut self, code: &str) -> Result<JsValue, JsValue> {
        self.session.set_locale(Locale::from_code_or_default(code));
        self.page()
    }

    pub fn reset(&mut self) -> Result<JsValue, JsValue> {
        self.session.reset();
        self.page()
    }

    pub fn next_page(&mut self) -> Result<JsValue, JsValue> {
        self.session.next_page();
        self.page()
    }

    pub fn prev_page(&mut self) -> Result<JsValue, JsValue> {
        self.session.prev_page();
        self.page()
    }

    pub fn go_to_page(&mut self, page: usize) -> Result<JsValue, JsValue> {
        self.session.go_to_page(page).map_err(js_error)?;
        self.page()
    }

    /// 首页预览用的最新文章
    pub fn latest(&self, count: usize) -> Result<JsValue, JsValue> {
        let locale = self.session.locale();
        let cards: Vec<BlogCard> = catalog_common::models::latest_posts(self.session.canonical(), count)
            .into_iter()
            .map(|post| BlogCard::from_post(post, locale))
            .collect();
        to_js(&cards)
    }
}

/// 信息页：酒店列表、酒店详情和签证说明
#[wasm_bindgen]
pub struct InformationPages {
    catalog: InformationCatalog,
    locale: Locale,
}

#[wasm_bindgen]
impl InformationPages {
    /// 由 `hotels`、`hotel-assets`、`visa` 接口的 JSON 构建
    #[wasm_bindgen(constructor)]
    pub fn new(hotels_json: &str, assets_json: &str, visas_json: &str, locale: &str) -> Result<InformationPages, JsValue> {
        let hotels: Vec<Hotel> = parse_collection(hotels_json).map_err(js_error)?;
        let assets: Vec<HotelAsset> = parse_collection(assets_json).map_err(js_error)?;
        let visas: Vec<Visa> = parse_collection(visas_json).map_err(js_error)?;
        Ok(InformationPages {
            catalog: InformationCatalog::new(hotels, assets, visas),
            locale: Locale::from_code_or_default(locale),
        })
    }

    pub fn from_snapshot(data: &[u8], locale: &str) -> Result<InformationPages, JsValue> {
        let snapshot = CatalogSnapshot::from_compressed(data).map_err(js_error)?;
        Ok(InformationPages {
            catalog: InformationCatalog::from_snapshot(snapshot),
            locale: Locale::from_code_or_default(locale),
        })
    }

    pub fn set_locale(&mut self, code: &str) {
        self.locale = Locale::from_code_or_default(code);
    }

    pub fn hotels(&self) -> Result<JsValue, JsValue> {
        to_js(&self.catalog.hotel_cards(self.locale))
    }

    pub fn hotel(&self, id: u32) -> Result<JsValue, JsValue> {
        let card = self.catalog.hotel(u64::from(id), self.locale).map_err(js_error)?;
        to_js(&card)
    }

    pub fn visas(&self) -> Result<JsValue, JsValue> {
        to_js(&self.catalog.visa_cards(self.locale))
    }
}

/// 酒店详情接口返回单条记录时直接生成卡片
#[wasm_bindgen]
pub fn hotel_detail(hotel_json: &str, assets_json: &str, locale: &str) -> Result<JsValue, JsValue> {
    let hotel: Hotel = parse_record(hotel_json).map_err(js_error)?;
    let assets: Vec<HotelAsset> = parse_collection(assets_json).map_err(js_error)?;
    to_js(&HotelCard::from_hotel(&hotel, &assets, Locale::from_code_or_default(locale)))
}
