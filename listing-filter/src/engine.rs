use crate::models::{FilterState, SortKey};
use catalog_common::models::fields;
use catalog_common::text::search_key;
use catalog_common::{Listable, Locale, LookupOption};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// 列表筛选引擎
///
/// 纯函数：每次都从完整集合重新计算，不保留任何中间状态。
/// 处理顺序固定为 等值筛选 -> 区间筛选 -> 搜索 -> 排序。
pub struct ListQueryEngine;

impl ListQueryEngine {
    /// 根据筛选状态从完整集合计算出当前视图
    pub fn recompute<T: Listable + Clone>(canonical: &[T], state: &FilterState, locale: Locale) -> Vec<T> {
        let mut view: Vec<&T> = canonical.iter().collect();

        Self::apply_equality(&mut view, &state.equality, locale);

        if let Some(range) = &state.range {
            view.retain(|item| range.contains(item.numeric(&range.field)));
        }

        Self::apply_search(&mut view, &state.search_text, locale);
        Self::apply_sorting(&mut view, state.sort_key);

        view.into_iter().cloned().collect()
    }

    // 按分类字段等值筛选，多个条件取交集
    fn apply_equality<T: Listable>(view: &mut Vec<&T>, equality: &BTreeMap<String, LookupOption>, locale: Locale) {
        for (field, option) in equality {
            match option.value(locale) {
                Some(wanted) => view.retain(|item| item.localized(field, locale) == Some(wanted)),
                // 选项在任何语言下都没有名称，无法匹配
                None => view.clear(),
            }
        }
    }

    // 按标题搜索，比较时去掉标记并转小写
    fn apply_search<T: Listable>(view: &mut Vec<&T>, search_text: &str, locale: Locale) {
        if search_text.is_empty() {
            return;
        }

        let needle = search_text.to_lowercase();
        view.retain(|item| {
            item.localized(fields::TITLE, locale)
                .map(|title| search_key(title).contains(&needle))
                .unwrap_or(false)
        });
    }

    // 应用排序（sort_by 为稳定排序，相等元素保持原有顺序）
    fn apply_sorting<T: Listable>(view: &mut Vec<&T>, sort_key: SortKey) {
        match sort_key {
            SortKey::None => {}
            SortKey::PriceAscending => {
                view.sort_by(|a, b| cmp_missing_last(a.numeric(fields::PRICE), b.numeric(fields::PRICE), false));
            }
            SortKey::PriceDescending => {
                view.sort_by(|a, b| cmp_missing_last(a.numeric(fields::PRICE), b.numeric(fields::PRICE), true));
            }
            SortKey::PopularOnly => {
                view.retain(|item| item.flag(fields::POPULAR).is_some_and(|flag| flag != 0));
            }
            SortKey::DateNewest | SortKey::DateOldest => {
                let descending = sort_key == SortKey::DateNewest;
                // 日期只解析一次
                let mut keyed: Vec<_> = view.drain(..).map(|item| (item.timestamp(), item)).collect();
                keyed.sort_by(|a, b| cmp_missing_last(a.0, b.0, descending));
                view.extend(keyed.into_iter().map(|(_, item)| item));
            }
        }
    }
}

/// 比较可缺失的键，缺失值无论升降序都排在最后
fn cmp_missing_last<K: PartialOrd>(a: Option<K>, b: Option<K>, descending: bool) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => {
            let ord = a.partial_cmp(&b).unwrap_or(Ordering::Equal);
            if descending {
                ord.reverse()
            } else {
                ord
            }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RangeFilter;
    use catalog_common::{BlogPost, LocalizedFields, Tour};

    fn tour(id: u64, title: &str, price: Option<f64>, popular: i64) -> Tour {
        Tour {
            id,
            fields: LocalizedFields::new().with("title", Locale::En, title),
            price,
            popular,
            image: None,
        }
    }

    fn post(id: u64, date: &str) -> BlogPost {
        BlogPost {
            id,
            fields: LocalizedFields::new().with("title", Locale::En, "post"),
            date: date.to_string(),
            image: None,
        }
    }

    fn ids<T: Listable>(items: &[T]) -> Vec<u64> {
        items.iter().map(Listable::id).collect()
    }

    #[test]
    fn price_sort_is_stable_and_puts_unpriced_last() {
        let tours = vec![
            tour(1, "a", Some(200.0), 0),
            tour(2, "b", None, 0),
            tour(3, "c", Some(100.0), 0),
            tour(4, "d", Some(200.0), 0),
        ];
        let mut state = FilterState { sort_key: SortKey::PriceAscending, ..Default::default() };
        assert_eq!(ids(&ListQueryEngine::recompute(&tours, &state, Locale::En)), vec![3, 1, 4, 2]);

        state.sort_key = SortKey::PriceDescending;
        assert_eq!(ids(&ListQueryEngine::recompute(&tours, &state, Locale::En)), vec![1, 4, 3, 2]);
    }

    #[test]
    fn popular_option_filters_without_reordering() {
        let tours = vec![tour(1, "a", Some(3.0), 1), tour(2, "b", Some(1.0), 0), tour(3, "c", Some(2.0), 1)];
        let state = FilterState { sort_key: SortKey::PopularOnly, ..Default::default() };
        assert_eq!(ids(&ListQueryEngine::recompute(&tours, &state, Locale::En)), vec![1, 3]);
    }

    #[test]
    fn date_sorts_put_invalid_dates_last() {
        let posts = vec![post(1, "2023-05-01"), post(2, "soon"), post(3, "2024-01-10"), post(4, "2022-12-31")];
        let mut state = FilterState { sort_key: SortKey::DateNewest, ..Default::default() };
        assert_eq!(ids(&ListQueryEngine::recompute(&posts, &state, Locale::En)), vec![3, 1, 4, 2]);

        state.sort_key = SortKey::DateOldest;
        assert_eq!(ids(&ListQueryEngine::recompute(&posts, &state, Locale::En)), vec![4, 1, 3, 2]);
    }

    #[test]
    fn search_ignores_markup_and_case() {
        let tours = vec![tour(1, "<p>Desert <b>Safari</b></p>", Some(1.0), 0), tour(2, "City walk", Some(1.0), 0)];
        let state = FilterState { search_text: "DESERT SAF".to_string(), ..Default::default() };
        assert_eq!(ids(&ListQueryEngine::recompute(&tours, &state, Locale::En)), vec![1]);
    }

    #[test]
    fn range_is_inclusive_and_inverted_range_matches_nothing() {
        let tours: Vec<Tour> = [100.0, 150.0, 200.0]
            .iter()
            .enumerate()
            .map(|(i, &p)| tour(i as u64 + 1, "t", Some(p), 0))
            .collect();
        let mut state = FilterState { range: Some(RangeFilter::new("price", 100.0, 150.0)), ..Default::default() };
        assert_eq!(ids(&ListQueryEngine::recompute(&tours, &state, Locale::En)), vec![1, 2]);

        state.range = Some(RangeFilter::new("price", 180.0, 120.0));
        assert!(ListQueryEngine::recompute(&tours, &state, Locale::En).is_empty());
    }

    #[test]
    fn option_without_any_name_matches_nothing() {
        let tours = vec![tour(1, "a", Some(1.0), 0)];
        let mut state = FilterState::default();
        state.equality.insert(
            "location".to_string(),
            LookupOption { id: 1, field: "location".to_string(), names: LocalizedFields::new() },
        );
        assert!(ListQueryEngine::recompute(&tours, &state, Locale::En).is_empty());
    }

    #[test]
    fn empty_collection_gives_empty_view() {
        let state = FilterState { search_text: "x".to_string(), sort_key: SortKey::PriceAscending, ..Default::default() };
        assert!(ListQueryEngine::recompute::<Tour>(&[], &state, Locale::Ru).is_empty());
    }
}
