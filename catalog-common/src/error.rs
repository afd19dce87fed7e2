use thiserror::Error;

/// 目录数据相关错误
#[derive(Debug, Error)]
pub enum CatalogError {
    /// 接口返回的数据无法解析
    #[error("数据解析失败: {0}")]
    Decode(String),

    /// 同一集合中出现重复的ID
    #[error("重复的记录ID: {0}")]
    DuplicateId(u64),

    /// 文件读写错误
    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    /// 快照格式或版本不正确
    #[error("快照错误: {0}")]
    Snapshot(String),
}

impl From<serde_json::Error> for CatalogError {
    fn from(e: serde_json::Error) -> Self {
        CatalogError::Decode(e.to_string())
    }
}
