use crate::error::CatalogError;
use flate2::{read::GzDecoder, write::GzEncoder, Compression};
use std::io::{Read, Write};

/// 魔数常量 - 用于标识快照文件格式
pub const MAGIC_BYTES: &[u8] = b"TMCAT";

// 魔数 + 版本号(2) + 原始长度(4)
const HEADER_LEN: usize = MAGIC_BYTES.len() + 2 + 4;

/// 将对象序列化为二进制格式
pub fn to_binary<T: serde::Serialize>(obj: &T) -> Result<Vec<u8>, CatalogError> {
    bincode::serde::encode_to_vec(obj, bincode::config::standard())
        .map_err(|e| CatalogError::Snapshot(format!("序列化失败: {}", e)))
}

/// 从二进制格式反序列化对象
pub fn from_binary<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T, CatalogError> {
    bincode::serde::decode_from_slice(data, bincode::config::standard())
        .map(|(value, _)| value)
        .map_err(|e| CatalogError::Snapshot(format!("反序列化失败: {}", e)))
}

/// 将对象序列化为压缩的二进制格式
pub fn to_compressed<T: serde::Serialize>(obj: &T, version: [u8; 2]) -> Result<Vec<u8>, CatalogError> {
    let binary = to_binary(obj)?;

    let mut output = Vec::with_capacity(binary.len() / 2 + HEADER_LEN);
    output.extend_from_slice(MAGIC_BYTES);
    output.extend_from_slice(&version);
    output.extend_from_slice(&(binary.len() as u32).to_le_bytes());

    let mut encoder = GzEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(&binary)?;
    output.extend_from_slice(&encoder.finish()?);

    Ok(output)
}

/// 校验文件头，返回版本号
pub fn validate_compressed_data(data: &[u8], max_version: u8) -> Result<[u8; 2], CatalogError> {
    if data.len() < HEADER_LEN {
        return Err(CatalogError::Snapshot(format!("数据太短，无法解析: {} 字节", data.len())));
    }

    if &data[..MAGIC_BYTES.len()] != MAGIC_BYTES {
        return Err(CatalogError::Snapshot("无效的文件格式：魔数不匹配".to_string()));
    }

    let version_offset = MAGIC_BYTES.len();
    let version = [data[version_offset], data[version_offset + 1]];
    if version[0] > max_version {
        return Err(CatalogError::Snapshot(format!(
            "不支持的版本: {}.{}",
            version[0], version[1]
        )));
    }

    Ok(version)
}

/// 从压缩的二进制格式反序列化对象，允许指定支持的最大版本
pub fn from_compressed_with_max_version<T: serde::de::DeserializeOwned>(
    data: &[u8],
    max_version: u8,
) -> Result<T, CatalogError> {
    validate_compressed_data(data, max_version)?;

    let size_offset = MAGIC_BYTES.len() + 2;
    let mut size_bytes = [0u8; 4];
    size_bytes.copy_from_slice(&data[size_offset..HEADER_LEN]);
    let original_size = u32::from_le_bytes(size_bytes) as usize;

    let mut decoder = GzDecoder::new(&data[HEADER_LEN..]);
    let mut decompressed = Vec::with_capacity(original_size);
    decoder.read_to_end(&mut decompressed)?;

    if decompressed.len() != original_size {
        return Err(CatalogError::Snapshot(format!(
            "解压后数据大小不匹配: 期望 {} 字节, 实际 {} 字节",
            original_size,
            decompressed.len()
        )));
    }

    from_binary(&decompressed)
}
