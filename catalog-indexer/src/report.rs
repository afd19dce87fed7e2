use catalog_common::models::{fields, parse_timestamp};
use catalog_common::{BlogPost, Hotel, HotelAsset, Locale, Tour};
use listing_filter::session::observed_bounds;
use std::collections::HashSet;
use std::fmt;

/// 目录数据的统计与检查结果
#[derive(Debug, Default, PartialEq)]
pub struct CatalogReport {
    pub tours: usize,
    pub popular_tours: usize,
    pub unpriced_tours: usize,
    pub price_bounds: Option<(f64, f64)>,
    /// 各语言缺少标题的线路数，顺序同 `Locale::ALL`
    pub missing_titles: [usize; 3],
    pub posts: usize,
    pub undated_posts: usize,
    pub lookup_options: usize,
    pub hotels: usize,
    /// 指向不存在酒店的设施
    pub orphan_assets: usize,
    pub visas: usize,
}

impl CatalogReport {
    pub fn add_tours(&mut self, tours: &[Tour]) {
        self.tours += tours.len();
        self.popular_tours += tours.iter().filter(|t| t.is_popular()).count();
        self.unpriced_tours += tours.iter().filter(|t| t.price.is_none()).count();

        self.price_bounds = match (self.price_bounds, observed_bounds(tours, fields::PRICE)) {
            (Some((lo, hi)), Some((l, h))) => Some((lo.min(l), hi.max(h))),
            (current, None) => current,
            (None, new) => new,
        };

        for (slot, locale) in self.missing_titles.iter_mut().zip(Locale::ALL) {
            *slot += tours.iter().filter(|t| t.fields.get(fields::TITLE, locale).is_none()).count();
        }
    }

    pub fn add_posts(&mut self, posts: &[BlogPost]) {
        self.posts += posts.len();
        self.undated_posts += posts.iter().filter(|p| parse_timestamp(&p.date).is_none()).count();
    }

    pub fn add_lookup(&mut self, count: usize) {
        self.lookup_options += count;
    }

    pub fn add_visas(&mut self, count: usize) {
        self.visas += count;
    }

    /// 酒店和设施全部加载后再检查设施的关联
    pub fn check_hotels(&mut self, hotels: &[Hotel], assets: &[HotelAsset]) {
        let ids: HashSet<u64> = hotels.iter().map(|h| h.id).collect();
        self.hotels = hotels.len();
        self.orphan_assets = assets.iter().filter(|a| !ids.contains(&a.hotel_id)).count();
    }
}

impl fmt::Display for CatalogReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "线路: {} 条 (热门 {}, 无价格 {})",
            self.tours, self.popular_tours, self.unpriced_tours
        )?;
        if let Some((lo, hi)) = self.price_bounds {
            writeln!(f, "价格范围: {} - {}", lo, hi)?;
        }
        for (count, locale) in self.missing_titles.iter().zip(Locale::ALL) {
            if *count > 0 {
                writeln!(f, "缺少 {} 标题的线路: {}", locale, count)?;
            }
        }
        writeln!(f, "文章: {} 篇 (日期无法解析 {})", self.posts, self.undated_posts)?;
        writeln!(f, "筛选选项: {} 个", self.lookup_options)?;
        write!(
            f,
            "酒店: {} 家 (无主设施 {}), 签证说明: {} 条",
            self.hotels, self.orphan_assets, self.visas
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_common::LocalizedFields;

    fn tour(id: u64, price: Option<f64>, popular: i64) -> Tour {
        Tour {
            id,
            fields: LocalizedFields::new().with("title", Locale::En, "t"),
            price,
            popular,
            image: None,
        }
    }

    #[test]
    fn accumulates_tour_statistics() {
        let mut report = CatalogReport::default();
        report.add_tours(&[tour(1, Some(300.0), 1), tour(2, None, 0)]);
        report.add_tours(&[tour(3, Some(90.0), 0)]);

        assert_eq!(report.tours, 3);
        assert_eq!(report.popular_tours, 1);
        assert_eq!(report.unpriced_tours, 1);
        assert_eq!(report.price_bounds, Some((90.0, 300.0)));
        assert_eq!(report.missing_titles, [3, 0, 3]);
    }

    #[test]
    fn counts_undated_posts_and_orphan_assets() {
        let mut report = CatalogReport::default();
        let post = |date: &str| BlogPost { id: 1, fields: LocalizedFields::new(), date: date.to_string(), image: None };
        report.add_posts(&[post("2024-01-01"), post("someday")]);
        assert_eq!(report.undated_posts, 1);

        let hotels = [Hotel { id: 1, rating: 5.0, fields: LocalizedFields::new() }];
        let assets = [
            HotelAsset { id: 1, hotel_id: 1, icon: None, fields: LocalizedFields::new() },
            HotelAsset { id: 2, hotel_id: 9, icon: None, fields: LocalizedFields::new() },
        ];
        report.check_hotels(&hotels, &assets);
        assert_eq!((report.hotels, report.orphan_assets), (1, 1));
        assert!(report.to_string().contains("无主设施 1"));
    }
}
