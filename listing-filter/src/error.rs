use catalog_common::CatalogError;
use thiserror::Error;

/// 列表筛选相关错误
#[derive(Debug, Error)]
pub enum ListingError {
    /// 请求的页码超出 [1, total_pages]，由调用方负责修正
    #[error("页码超出范围: {page} (共 {total_pages} 页)")]
    PageOutOfRange { page: usize, total_pages: usize },

    #[error("每页条数必须大于0")]
    InvalidPageSize,

    #[error("未知的排序方式: {0}")]
    UnknownSort(String),

    /// 当前列表不支持该排序（如博客列表按价格排序）
    #[error("{kind} 列表不支持排序方式 {sort}")]
    SortNotAllowed { sort: String, kind: String },

    #[error("字段 {field} 没有ID为 {id} 的选项")]
    UnknownOption { field: String, id: u64 },

    /// 列表没有可用的数值区间（博客列表，或所有线路都没有价格）
    #[error("当前列表不支持区间筛选")]
    RangeUnavailable,

    #[error("无效的区间: {0}")]
    InvalidRange(String),

    #[error("找不到ID为 {0} 的酒店")]
    HotelNotFound(u64),

    #[error("无法构建目录: 没有线路或文章数据")]
    EmptyCatalog,

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
