use crate::console;
use crate::error::ListingError;
use crate::models::CatalogSnapshot;
use catalog_common::compression::{from_compressed_with_max_version, to_compressed};
use catalog_common::{BlogPost, Hotel, HotelAsset, LookupOption, Tour, Visa};
use chrono::Utc;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// 快照格式版本
pub const SNAPSHOT_VERSION: [u8; 2] = [1, 0];

/// 目录快照构建器
#[derive(Default)]
pub struct CatalogBuilder {
    tours: Vec<Tour>,
    posts: Vec<BlogPost>,
    lookups: BTreeMap<String, Vec<LookupOption>>,
    hotels: Vec<Hotel>,
    hotel_assets: Vec<HotelAsset>,
    visas: Vec<Visa>,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_tours(&mut self, tours: impl IntoIterator<Item = Tour>) {
        self.tours.extend(tours);
    }

    pub fn add_posts(&mut self, posts: impl IntoIterator<Item = BlogPost>) {
        self.posts.extend(posts);
    }

    /// 设置某个分类字段的选项列表，重复设置时覆盖
    pub fn set_lookup(&mut self, field: &str, options: Vec<LookupOption>) {
        self.lookups.insert(field.to_string(), options);
    }

    pub fn add_hotels(&mut self, hotels: impl IntoIterator<Item = Hotel>) {
        self.hotels.extend(hotels);
    }

    pub fn add_hotel_assets(&mut self, assets: impl IntoIterator<Item = HotelAsset>) {
        self.hotel_assets.extend(assets);
    }

    pub fn add_visas(&mut self, visas: impl IntoIterator<Item = Visa>) {
        self.visas.extend(visas);
    }

    /// 构建快照
    pub fn build(&self) -> Result<CatalogSnapshot, ListingError> {
        if self.tours.is_empty() && self.posts.is_empty() {
            console::error("无法构建目录快照: 没有线路或文章数据");
            return Err(ListingError::EmptyCatalog);
        }

        console::log(&format!(
            "构建目录快照: 线路 {} 条, 文章 {} 篇, 选项字段 {} 个",
            self.tours.len(),
            self.posts.len(),
            self.lookups.len()
        ));

        Ok(CatalogSnapshot {
            created_at: Utc::now(),
            tours: self.tours.clone(),
            posts: self.posts.clone(),
            lookups: self.lookups.clone(),
            hotels: self.hotels.clone(),
            hotel_assets: self.hotel_assets.clone(),
            visas: self.visas.clone(),
        })
    }

    /// 构建并压缩
    pub fn to_bytes(&self) -> Result<Vec<u8>, ListingError> {
        let snapshot = self.build()?;
        Ok(to_compressed(&snapshot, SNAPSHOT_VERSION)?)
    }

    /// 保存快照到文件，返回写入的字节数
    pub fn save(&self, path: impl AsRef<Path>) -> Result<usize, ListingError> {
        let data = self.to_bytes()?;
        fs::write(path.as_ref(), &data).map_err(catalog_common::CatalogError::from)?;
        console::log(&format!(
            "目录快照已写入: {}，大小: {} 字节",
            path.as_ref().display(),
            data.len()
        ));
        Ok(data.len())
    }
}

impl CatalogSnapshot {
    /// 从压缩数据恢复快照
    pub fn from_compressed(data: &[u8]) -> Result<Self, ListingError> {
        Ok(from_compressed_with_max_version(data, SNAPSHOT_VERSION[0])?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_common::{Locale, LocalizedFields};

    fn builder() -> CatalogBuilder {
        let mut builder = CatalogBuilder::new();
        builder.add_tours(vec![Tour {
            id: 1,
            fields: LocalizedFields::new().with("title", Locale::En, "Merv"),
            price: Some(150.0),
            popular: 1,
            image: None,
        }]);
        builder.set_lookup(
            "location",
            vec![LookupOption {
                id: 3,
                field: "location".to_string(),
                names: LocalizedFields::new().with("location", Locale::En, "Mary"),
            }],
        );
        builder
    }

    #[test]
    fn refuses_empty_catalog() {
        assert!(matches!(CatalogBuilder::new().build(), Err(ListingError::EmptyCatalog)));
    }

    #[test]
    fn snapshot_survives_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.bin");
        let written = builder().save(&path).unwrap();

        let data = fs::read(&path).unwrap();
        assert_eq!(data.len(), written);
        let snapshot = CatalogSnapshot::from_compressed(&data).unwrap();
        assert_eq!(snapshot.tours.len(), 1);
        assert_eq!(snapshot.lookup("location")[0].value(Locale::Ru), Some("Mary"));
        assert!(snapshot.lookup("type").is_empty());
    }

    #[test]
    fn rejects_garbage() {
        assert!(CatalogSnapshot::from_compressed(b"not a snapshot").is_err());
    }
}
