use crate::console;
use crate::engine::ListQueryEngine;
use crate::error::ListingError;
use crate::models::{FilterState, ListingConfig, ListingKind, ListingPage, OptionLabel, RangeFilter, SortKey};
use crate::pagination::{paginate, total_pages, PageCursor};
use catalog_common::models::fields;
use catalog_common::{Listable, Locale, LookupOption};
use std::collections::BTreeMap;

/// 一个列表页的完整状态
///
/// 完整集合在页面加载时获取一次，之后不再变化；筛选状态归页面独占。
/// 修改筛选条件会回到第一页，修改排序或语言只把页码截断到有效范围。
pub struct ListingSession<T> {
    kind: ListingKind,
    canonical: Vec<T>,
    lookups: BTreeMap<String, Vec<LookupOption>>,
    state: FilterState,
    locale: Locale,
    page_size: usize,
    /// 加载时观察到的价格范围，不随筛选结果变化
    bounds: Option<(f64, f64)>,
    filtered: Vec<T>,
    cursor: PageCursor,
}

impl<T: Listable + Clone> ListingSession<T> {
    pub fn new(kind: ListingKind, canonical: Vec<T>, config: &ListingConfig) -> Result<Self, ListingError> {
        if config.page_size == 0 {
            return Err(ListingError::InvalidPageSize);
        }

        let bounds = match kind {
            ListingKind::Tours => observed_bounds(&canonical, fields::PRICE),
            ListingKind::Blogs => None,
        };

        let mut session = Self {
            kind,
            canonical,
            lookups: BTreeMap::new(),
            state: FilterState::default(),
            locale: config.locale,
            page_size: config.page_size,
            bounds,
            filtered: Vec::new(),
            cursor: PageCursor::new(1),
        };
        session.state = session.default_state();
        session.refilter();

        console::log(&format!(
            "{} 列表已加载: {} 条记录，每页 {} 条",
            kind,
            session.canonical.len(),
            session.page_size
        ));
        Ok(session)
    }

    /// 注册某个分类字段的可选项
    pub fn with_lookup(mut self, field: &str, options: Vec<LookupOption>) -> Self {
        self.lookups.insert(field.to_string(), options);
        self
    }

    pub fn kind(&self) -> ListingKind {
        self.kind
    }

    pub fn canonical(&self) -> &[T] {
        &self.canonical
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn filtered(&self) -> &[T] {
        &self.filtered
    }

    pub fn current_page_number(&self) -> usize {
        self.cursor.current()
    }

    pub fn total_pages(&self) -> usize {
        self.cursor.total_pages()
    }

    /// 价格滑块的上下限
    pub fn price_bounds(&self) -> Option<(f64, f64)> {
        self.bounds
    }

    pub fn filter_options(&self, field: &str) -> &[LookupOption] {
        self.lookups.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// 选项在当前语言下的名称
    pub fn option_labels(&self, field: &str) -> Vec<OptionLabel> {
        self.filter_options(field)
            .iter()
            .map(|option| OptionLabel {
                id: option.id,
                label: option.value(self.locale).unwrap_or("").to_string(),
            })
            .collect()
    }

    pub fn set_search(&mut self, text: &str) {
        self.state.search_text = text.to_string();
        self.refilter();
    }

    /// 按选项ID选中某个分类值
    pub fn select(&mut self, field: &str, option_id: u64) -> Result<(), ListingError> {
        let option = self
            .filter_options(field)
            .iter()
            .find(|o| o.id == option_id)
            .cloned()
            .ok_or_else(|| ListingError::UnknownOption {
                field: field.to_string(),
                id: option_id,
            })?;

        self.state.equality.insert(field.to_string(), option);
        self.refilter();
        Ok(())
    }

    pub fn clear_selection(&mut self, field: &str) {
        self.state.equality.remove(field);
        self.refilter();
    }

    /// 设置价格区间，超出加载时范围的部分被截断；min > max 时结果为空
    ///
    /// 选回完整范围时无价格的线路重新出现。
    pub fn set_price_range(&mut self, min: f64, max: f64) -> Result<(), ListingError> {
        let (lo, hi) = self.bounds.ok_or(ListingError::RangeUnavailable)?;
        if min.is_nan() || max.is_nan() {
            return Err(ListingError::InvalidRange(format!("{} - {}", min, max)));
        }

        let (min, max) = (min.clamp(lo, hi), max.clamp(lo, hi));
        self.state.range = Some(if (min, max) == (lo, hi) {
            RangeFilter::full(fields::PRICE, lo, hi)
        } else {
            RangeFilter::new(fields::PRICE, min, max)
        });
        self.refilter();
        Ok(())
    }

    pub fn set_sort(&mut self, sort: SortKey) -> Result<(), ListingError> {
        if !self.kind.allows(sort) {
            return Err(ListingError::SortNotAllowed {
                sort: sort.as_str().to_string(),
                kind: self.kind.to_string(),
            });
        }

        self.state.sort_key = sort;
        self.reorder();
        Ok(())
    }

    pub fn set_locale(&mut self, locale: Locale) {
        self.locale = locale;
        self.reorder();
    }

    /// 清空所有条件：空搜索、无选项、默认排序、完整价格区间、第一页
    pub fn reset(&mut self) {
        self.state = self.default_state();
        self.refilter();
    }

    pub fn next_page(&mut self) -> bool {
        self.cursor.next()
    }

    pub fn prev_page(&mut self) -> bool {
        self.cursor.prev()
    }

    pub fn go_to_page(&mut self, page: usize) -> Result<(), ListingError> {
        self.cursor.go_to(page)
    }

    /// 当前页的数据
    pub fn current_page(&self) -> Result<ListingPage<T>, ListingError> {
        let page = paginate(&self.filtered, self.cursor.current(), self.page_size)?;
        Ok(ListingPage {
            items: page.items,
            total: self.filtered.len(),
            page: self.cursor.current(),
            page_size: self.page_size,
            total_pages: page.total_pages,
        })
    }

    fn default_state(&self) -> FilterState {
        FilterState {
            range: self.bounds.map(|(lo, hi)| RangeFilter::full(fields::PRICE, lo, hi)),
            ..FilterState::default()
        }
    }

    fn recompute(&mut self) -> usize {
        let start = console::now_ms();
        self.filtered = ListQueryEngine::recompute(&self.canonical, &self.state, self.locale);
        console::log(&format!(
            "筛选完成: {} / {} 条，耗时 {:.1}ms",
            self.filtered.len(),
            self.canonical.len(),
            console::now_ms() - start
        ));
        total_pages(self.filtered.len(), self.page_size)
    }

    // 筛选条件变化
    fn refilter(&mut self) {
        let pages = self.recompute();
        self.cursor.reset(pages);
    }

    // 排序或语言变化
    fn reorder(&mut self) {
        let pages = self.recompute();
        self.cursor.clamp_to(pages);
    }
}

/// 集合中某个数值字段的最小值和最大值
pub fn observed_bounds<T: Listable>(items: &[T], field: &str) -> Option<(f64, f64)> {
    items
        .iter()
        .filter_map(|item| item.numeric(field))
        .fold(None, |acc, value| match acc {
            None => Some((value, value)),
            Some((lo, hi)) => Some((lo.min(value), hi.max(value))),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_common::{BlogPost, LocalizedFields, Tour};

    fn tour(id: u64, price: f64) -> Tour {
        Tour {
            id,
            fields: LocalizedFields::new().with("title", Locale::En, &format!("Tour {}", id)),
            price: Some(price),
            popular: 0,
            image: None,
        }
    }

    fn session(n: u64) -> ListingSession<Tour> {
        let tours = (1..=n).map(|i| tour(i, i as f64 * 50.0)).collect();
        ListingSession::new(ListingKind::Tours, tours, &ListingConfig::default()).unwrap()
    }

    #[test]
    fn starts_with_full_range_on_first_page() {
        let s = session(7);
        assert_eq!(s.price_bounds(), Some((50.0, 350.0)));
        assert_eq!(s.state().range, Some(RangeFilter::full("price", 50.0, 350.0)));
        assert_eq!(s.filtered().len(), 7);
        assert_eq!((s.current_page_number(), s.total_pages()), (1, 2));
    }

    #[test]
    fn sort_keeps_page_but_filters_reset_it() {
        let mut s = session(13);
        assert!(s.next_page());
        assert!(s.next_page());
        s.set_sort(SortKey::PriceDescending).unwrap();
        assert_eq!(s.current_page_number(), 3);

        s.set_search("tour 1");
        assert_eq!(s.current_page_number(), 1);
    }

    #[test]
    fn popular_sort_clamps_page() {
        let mut s = session(13);
        s.go_to_page(3).unwrap();
        s.set_sort(SortKey::PopularOnly).unwrap();
        assert!(s.filtered().is_empty());
        assert_eq!((s.current_page_number(), s.total_pages()), (1, 1));
    }

    #[test]
    fn price_range_is_clamped_to_loaded_bounds() {
        let mut s = session(7);
        s.set_price_range(0.0, 120.0).unwrap();
        assert_eq!(s.state().range, Some(RangeFilter::new("price", 50.0, 120.0)));
        assert_eq!(s.filtered().len(), 2);
        // 其他条件不影响滑块范围
        s.set_search("tour 7");
        assert_eq!(s.price_bounds(), Some((50.0, 350.0)));
        assert!(s.set_price_range(f64::NAN, 1.0).is_err());
    }

    #[test]
    fn reset_restores_defaults() {
        let mut s = session(7);
        s.set_sort(SortKey::PriceAscending).unwrap();
        assert!(s.next_page());
        s.set_search("zzz");
        assert!(s.filtered().is_empty());
        s.set_search("");
        s.go_to_page(2).unwrap();

        s.reset();
        assert_eq!(s.state().sort_key, SortKey::None);
        assert_eq!(s.filtered().len(), 7);
        assert_eq!(s.state().range, Some(RangeFilter::full("price", 50.0, 350.0)));
        assert_eq!(s.current_page_number(), 1);
    }

    #[test]
    fn unpriced_tours_stay_visible_until_range_narrows() {
        let mut unpriced = tour(2, 0.0);
        unpriced.price = None;
        let tours = vec![tour(1, 100.0), unpriced, tour(3, 300.0)];
        let mut s = ListingSession::new(ListingKind::Tours, tours, &ListingConfig::default()).unwrap();

        let ids = |s: &ListingSession<Tour>| s.filtered().iter().map(|t| t.id).collect::<Vec<_>>();
        assert_eq!(s.price_bounds(), Some((100.0, 300.0)));
        assert_eq!(ids(&s), [1, 2, 3]);

        s.set_price_range(150.0, 300.0).unwrap();
        assert_eq!(ids(&s), [3]);

        s.set_price_range(0.0, 1000.0).unwrap();
        assert_eq!(ids(&s), [1, 2, 3]);

        s.set_price_range(100.0, 200.0).unwrap();
        s.reset();
        assert_eq!(ids(&s), [1, 2, 3]);
    }

    #[test]
    fn blogs_reject_price_features() {
        let posts: Vec<BlogPost> = Vec::new();
        let mut s = ListingSession::new(ListingKind::Blogs, posts, &ListingConfig::default()).unwrap();
        assert!(matches!(s.set_price_range(1.0, 2.0), Err(ListingError::RangeUnavailable)));
        assert!(matches!(s.set_sort(SortKey::PriceAscending), Err(ListingError::SortNotAllowed { .. })));
        let page = s.current_page().unwrap();
        assert_eq!((page.total, page.total_pages), (0, 1));
    }

    #[test]
    fn unknown_option_is_rejected() {
        let mut s = session(3).with_lookup("location", Vec::new());
        assert!(matches!(s.select("location", 9), Err(ListingError::UnknownOption { id: 9, .. })));
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let config = ListingConfig { page_size: 0, locale: Locale::En };
        assert!(ListingSession::<Tour>::new(ListingKind::Tours, Vec::new(), &config).is_err());
    }
}
