//! 内容持久化服务 - 业务能力层
//!
//! 产物位置只由 `(会话键, 页码或标签)` 决定：
//! - 图片：`{base}/{session_key}/flyer_page_{n}.{ext}`，写入前先检查是否存在，重复调用不会覆盖
//! - 标签：`{base}/raw/{store}/{log_stem}_raw.txt`，每条追加一行，重复运行会重复追加；
//!   合成会话键按日期归档，同一天的多次运行写入同一个日志

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info};

use crate::error::PersistError;
use crate::models::{
    sanitize_component, Artifact, ArtifactKind, ContentItem, ContentKind, ImageExt, PersistOutcome,
    Session, SessionKey,
};
use crate::services::{Downloader, Storage};

pub struct Persister {
    storage: Arc<dyn Storage>,
    downloader: Arc<dyn Downloader>,
    base_path: PathBuf,
    store: String,
}

impl Persister {
    pub fn new(
        storage: Arc<dyn Storage>,
        downloader: Arc<dyn Downloader>,
        base_path: impl Into<PathBuf>,
        store: &str,
    ) -> Self {
        Self {
            storage,
            downloader,
            base_path: base_path.into(),
            store: sanitize_component(store),
        }
    }

    /// 图片路径；同一页的第 2 张及以后的图片带 `_{序号}` 后缀
    pub fn image_path(&self, key: &SessionKey, page_index: u32, ordinal: usize, ext: ImageExt) -> PathBuf {
        let file_name = match ordinal {
            0 => format!("flyer_page_{}.{}", page_index, ext),
            n => format!("flyer_page_{}_{}.{}", page_index, n + 1, ext),
        };
        self.base_path.join(key.as_str()).join(file_name)
    }

    pub fn label_log_path(&self, key: &SessionKey) -> PathBuf {
        self.base_path
            .join("raw")
            .join(&self.store)
            .join(format!("{}_raw.txt", key.log_stem()))
    }

    pub async fn persist(&self, item: &ContentItem, session: &Session) -> Result<PersistOutcome, PersistError> {
        match &item.kind {
            ContentKind::Offer { label } => {
                let path = self.label_log_path(&session.key);
                self.storage.append_line(&path, label).await?;
                Ok(PersistOutcome::Appended(Artifact {
                    path,
                    kind: ArtifactKind::LogLine,
                    page_index: item.page_index,
                }))
            }
            ContentKind::Image { url, ext } => {
                let path = self.image_path(&session.key, item.page_index, item.ordinal, *ext);
                if self.storage.exists(&path).await? {
                    debug!("[会话 {}] 已存在，跳过: {}", session.key, path.display());
                    return Ok(PersistOutcome::Skipped(path));
                }

                let bytes = self.downloader.fetch(url).await?;
                self.storage.write(&path, &bytes).await?;
                info!(
                    "[会话 {}] ✓ 第 {} 页图片已保存: {}",
                    session.key,
                    item.page_index,
                    path.display()
                );
                Ok(PersistOutcome::Written(Artifact {
                    path,
                    kind: ArtifactKind::ImageFile,
                    page_index: item.page_index,
                }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{FsStorage, ReqwestDownloader};
    use chrono::NaiveDate;
    use std::time::Duration;

    fn persister() -> Persister {
        Persister::new(
            Arc::new(FsStorage::new()),
            Arc::new(ReqwestDownloader::new(Duration::from_secs(1)).unwrap()),
            "data",
            "REMA 1000",
        )
    }

    fn key() -> SessionKey {
        let now = NaiveDate::from_ymd_opt(2025, 12, 5)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        SessionKey::derive(Some("6. - 12. december"), now)
    }

    #[test]
    fn test_image_path_layout() {
        let p = persister();
        assert_eq!(
            p.image_path(&key(), 4, 0, ImageExt::Webp),
            PathBuf::from("data/6-12_december_2025/flyer_page_4.webp")
        );
        assert_eq!(
            p.image_path(&key(), 4, 1, ImageExt::Jpg),
            PathBuf::from("data/6-12_december_2025/flyer_page_4_2.jpg")
        );
    }

    #[test]
    fn test_label_log_path_layout() {
        assert_eq!(
            persister().label_log_path(&key()),
            PathBuf::from("data/raw/rema_1000/6-12_december_2025_raw.txt")
        );
    }

    #[test]
    fn test_synthetic_keys_share_daily_label_log() {
        let at = |h, m| {
            NaiveDate::from_ymd_opt(2025, 12, 5)
                .unwrap()
                .and_hms_opt(h, m, 0)
                .unwrap()
        };
        let morning = SessionKey::derive(None, at(8, 30));
        let evening = SessionKey::derive(Some("ingen dato"), at(19, 45));

        assert_ne!(morning, evening);
        assert_eq!(
            persister().label_log_path(&morning),
            persister().label_log_path(&evening)
        );
        assert_eq!(
            persister().label_log_path(&morning),
            PathBuf::from("data/raw/rema_1000/session_20251205_raw.txt")
        );
    }
}
