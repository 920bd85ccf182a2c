//! 存储服务 - 业务能力层
//!
//! 只负责"判断存在 / 写文件 / 追加行"能力，路径由调用方决定

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::StorageError;

#[async_trait]
pub trait Storage: Send + Sync {
    /// 目标是否已存在；无法判断时返回错误，不当作"不存在"
    async fn exists(&self, path: &Path) -> Result<bool, StorageError>;

    async fn write(&self, path: &Path, bytes: &[u8]) -> Result<(), StorageError>;

    async fn append_line(&self, path: &Path, text: &str) -> Result<(), StorageError>;
}

/// 本地文件系统存储
///
/// 写入先落到同目录下的 `.part` 临时文件再重命名，
/// 中途失败不会留下被下次运行误认为完整的半个文件。
#[derive(Debug, Clone, Default)]
pub struct FsStorage;

impl FsStorage {
    pub fn new() -> Self {
        Self
    }

    async fn ensure_parent(path: &Path) -> Result<(), StorageError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::new(parent, e))?;
        }
        Ok(())
    }

    fn part_path(path: &Path) -> PathBuf {
        let mut name = path.file_name().unwrap_or_default().to_os_string();
        name.push(".part");
        path.with_file_name(name)
    }
}

#[async_trait]
impl Storage for FsStorage {
    async fn exists(&self, path: &Path) -> Result<bool, StorageError> {
        fs::try_exists(path)
            .await
            .map_err(|e| StorageError::new(path, e))
    }

    async fn write(&self, path: &Path, bytes: &[u8]) -> Result<(), StorageError> {
        Self::ensure_parent(path).await?;

        let part = Self::part_path(path);
        let mut file = fs::File::create(&part)
            .await
            .map_err(|e| StorageError::new(&part, e))?;
        file.write_all(bytes)
            .await
            .map_err(|e| StorageError::new(&part, e))?;
        file.sync_all().await.map_err(|e| StorageError::new(&part, e))?;
        drop(file);

        fs::rename(&part, path)
            .await
            .map_err(|e| StorageError::new(path, e))?;
        debug!("已写入 {} ({} 字节)", path.display(), bytes.len());
        Ok(())
    }

    async fn append_line(&self, path: &Path, text: &str) -> Result<(), StorageError> {
        Self::ensure_parent(path).await?;

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .map_err(|e| StorageError::new(path, e))?;
        file.write_all(format!("{}\n", text).as_bytes())
            .await
            .map_err(|e| StorageError::new(path, e))?;
        Ok(())
    }
}
