pub mod api;
pub mod compression;
pub mod error;
pub mod locale;
pub mod localized;
pub mod models;
pub mod text;

// 重新导出常用类型和函数，方便直接使用
pub use api::{parse_collection, parse_lookup, parse_record, FromApiRecord};
pub use compression::{from_compressed_with_max_version, to_compressed};
pub use error::CatalogError;
pub use locale::Locale;
pub use localized::LocalizedFields;
pub use models::{BlogPost, Hotel, HotelAsset, Listable, LookupOption, Tour, Visa};
