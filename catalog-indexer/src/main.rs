use std::fs;
use std::path::{Path, PathBuf};

use clap::{Arg, ArgAction, Command};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

use catalog_common::models::fields;
use catalog_common::{parse_collection, parse_lookup, BlogPost, Hotel, HotelAsset, Tour, Visa};
use listing_filter::builder::CatalogBuilder;

mod report;

use report::CatalogReport;

/// 快照文件名
const SNAPSHOT_FILE: &str = "catalog.bin";

/// API 导出文件对应的数据集合，按文件名（不含扩展名）识别
#[derive(Debug, Clone, PartialEq, Eq)]
enum Collection {
    Tours,
    Blogs,
    /// 筛选选项，附带它所筛选的线路字段
    Lookup(&'static str),
    Hotels,
    HotelAssets,
    Visas,
}

impl Collection {
    fn from_stem(stem: &str) -> Option<Self> {
        match stem {
            "tours" => Some(Self::Tours),
            "blogs" => Some(Self::Blogs),
            "tour-types" => Some(Self::Lookup(fields::TYPE)),
            "tour-category" => Some(Self::Lookup(fields::CATEGORY)),
            "tour-location" => Some(Self::Lookup(fields::LOCATION)),
            "hotels" => Some(Self::Hotels),
            "hotel-assets" => Some(Self::HotelAssets),
            "visa" => Some(Self::Visas),
            _ => None,
        }
    }
}

fn main() {
    let matches = Command::new("目录快照生成器")
        .version(env!("CARGO_PKG_VERSION"))
        .about("把 API 导出的 JSON 打包成线路/博客列表使用的目录快照")
        .arg(Arg::new("source")
            .short('s')
            .long("source")
            .value_name("SOURCE_DIR")
            .help("API 导出 JSON 所在目录")
            .required(true))
        .arg(Arg::new("output")
            .short('o')
            .long("output")
            .value_name("OUTPUT_DIR")
            .help("快照输出目录")
            .required(true))
        .arg(Arg::new("verbose")
            .short('v')
            .long("verbose")
            .help("显示详细信息")
            .action(ArgAction::SetTrue))
        .arg(Arg::new("strict")
            .long("strict")
            .help("任何文件解析失败即中止")
            .action(ArgAction::SetTrue))
        .get_matches();

    let verbose = matches.get_flag("verbose");
    let strict = matches.get_flag("strict");
    init_tracing(verbose);

    // 两个参数都是 required
    let (Some(source_dir), Some(output_dir)) = (
        matches.get_one::<String>("source"),
        matches.get_one::<String>("output"),
    ) else {
        std::process::exit(2);
    };

    let source_path = Path::new(source_dir);
    if !source_path.is_dir() {
        eprintln!("错误: 源目录不存在或不是有效目录 '{}'", source_dir);
        std::process::exit(1);
    }

    let output_path = Path::new(output_dir);
    if let Err(e) = fs::create_dir_all(output_path) {
        eprintln!("错误: 无法创建输出目录 '{}': {}", output_dir, e);
        std::process::exit(1);
    }

    info!(source = %source_dir, output = %output_dir, "开始生成目录快照");

    match generate_snapshot(source_path, output_path, strict) {
        Ok(report) => {
            println!("{}", report);
            println!("快照生成成功！");
        }
        Err(e) => {
            eprintln!("错误: 快照生成失败: {}", e);
            std::process::exit(1);
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

/// 扫描源目录、加载所有集合并写出快照
fn generate_snapshot(source: &Path, output: &Path, strict: bool) -> Result<CatalogReport, String> {
    let start_time = std::time::Instant::now();

    let files = scan_json_files(source)?;
    if files.is_empty() {
        return Err(format!("目录 '{}' 中没有可识别的 JSON 文件", source.display()));
    }

    let mut builder = CatalogBuilder::new();
    let mut report = CatalogReport::default();
    let mut hotels = Vec::new();
    let mut assets = Vec::new();

    for (collection, path) in files {
        match load_file(&collection, &path, &mut builder, &mut report, &mut hotels, &mut assets) {
            Ok(count) => debug!(file = %path.display(), count, "已加载"),
            Err(e) if strict => return Err(format!("{}: {}", path.display(), e)),
            Err(e) => warn!(file = %path.display(), error = %e, "跳过无法解析的文件"),
        }
    }

    report.check_hotels(&hotels, &assets);
    if report.orphan_assets > 0 {
        warn!(count = report.orphan_assets, "部分酒店设施找不到所属酒店");
    }
    builder.add_hotels(hotels);
    builder.add_hotel_assets(assets);

    let snapshot_path = output.join(SNAPSHOT_FILE);
    let size = builder.save(&snapshot_path).map_err(|e| e.to_string())?;

    info!(
        path = %snapshot_path.display(),
        bytes = size,
        elapsed_secs = start_time.elapsed().as_secs_f64(),
        "快照已写出"
    );
    Ok(report)
}

/// 返回已识别的 JSON 文件，按路径排序保证结果稳定
fn scan_json_files(dir: &Path) -> Result<Vec<(Collection, PathBuf)>, String> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir) {
        let entry = entry.map_err(|e| format!("遍历目录时出错: {}", e))?;
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }

        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
        match Collection::from_stem(stem) {
            Some(collection) => files.push((collection, path.to_path_buf())),
            None => debug!(file = %path.display(), "未知集合，忽略"),
        }
    }

    files.sort_by(|a, b| a.1.cmp(&b.1));
    Ok(files)
}

/// 加载单个文件，返回记录数
fn load_file(
    collection: &Collection,
    path: &Path,
    builder: &mut CatalogBuilder,
    report: &mut CatalogReport,
    hotels: &mut Vec<Hotel>,
    assets: &mut Vec<HotelAsset>,
) -> Result<usize, String> {
    let json = fs::read_to_string(path).map_err(|e| format!("读取失败: {}", e))?;

    let count = match collection {
        Collection::Tours => {
            let tours: Vec<Tour> = parse_collection(&json).map_err(|e| e.to_string())?;
            report.add_tours(&tours);
            let count = tours.len();
            builder.add_tours(tours);
            count
        }
        Collection::Blogs => {
            let posts: Vec<BlogPost> = parse_collection(&json).map_err(|e| e.to_string())?;
            report.add_posts(&posts);
            let count = posts.len();
            builder.add_posts(posts);
            count
        }
        Collection::Lookup(field) => {
            let options = parse_lookup(&json, field).map_err(|e| e.to_string())?;
            report.add_lookup(options.len());
            let count = options.len();
            builder.set_lookup(field, options);
            count
        }
        Collection::Hotels => {
            let parsed: Vec<Hotel> = parse_collection(&json).map_err(|e| e.to_string())?;
            let count = parsed.len();
            hotels.extend(parsed);
            count
        }
        Collection::HotelAssets => {
            let parsed: Vec<HotelAsset> = parse_collection(&json).map_err(|e| e.to_string())?;
            let count = parsed.len();
            assets.extend(parsed);
            count
        }
        Collection::Visas => {
            let visas: Vec<Visa> = parse_collection(&json).map_err(|e| e.to_string())?;
            report.add_visas(visas.len());
            let count = visas.len();
            builder.add_visas(visas);
            count
        }
    };
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use listing_filter::CatalogSnapshot;

    fn write(dir: &Path, name: &str, content: &str) {
        fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn maps_file_stems_to_collections() {
        assert_eq!(Collection::from_stem("tours"), Some(Collection::Tours));
        assert_eq!(Collection::from_stem("tour-location"), Some(Collection::Lookup("location")));
        assert_eq!(Collection::from_stem("tour-category"), Some(Collection::Lookup("cat")));
        assert_eq!(Collection::from_stem("package"), None);
    }

    #[test]
    fn builds_snapshot_from_api_dump() {
        let source = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        write(
            source.path(),
            "tours.json",
            r#"[{"id": 1, "title_en": "Darvaza", "price": 300, "location_en": "Ahal", "popular": 1},
                {"id": 2, "title_ru": "Мерв", "price": 150}]"#,
        );
        write(source.path(), "tour-location.json", r#"[{"id": 1, "location_en": "Ahal"}]"#);
        write(source.path(), "notes.json", "not json at all");

        let report = generate_snapshot(source.path(), output.path(), false).unwrap();
        assert_eq!(report.tours, 2);
        assert_eq!(report.price_bounds, Some((150.0, 300.0)));
        assert_eq!(report.missing_titles, [1, 1, 2]);
        assert_eq!(report.lookup_options, 1);

        let bytes = fs::read(output.path().join(SNAPSHOT_FILE)).unwrap();
        let snapshot = CatalogSnapshot::from_compressed(&bytes).unwrap();
        assert_eq!(snapshot.tours.len(), 2);
        assert_eq!(snapshot.lookup("location").len(), 1);
    }

    #[test]
    fn strict_mode_stops_on_bad_file() {
        let source = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        write(source.path(), "tours.json", r#"[{"id": 1, "title_en": "A"}]"#);
        write(source.path(), "blogs.json", r#"{"broken": "#);

        assert!(generate_snapshot(source.path(), output.path(), false).is_ok());
        let err = generate_snapshot(source.path(), output.path(), true).unwrap_err();
        assert!(err.contains("blogs.json"));
    }

    #[test]
    fn empty_source_is_an_error() {
        let source = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        assert!(generate_snapshot(source.path(), output.path(), false).is_err());
    }
}
