//! 状态日志服务 - 业务能力层
//!
//! 只负责向 `log/rema_log.txt` 追加 `[时间] [状态] 消息` 行，不关心流程

use std::path::PathBuf;

use anyhow::Result;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, error};

use crate::models::{Incident, SessionResult};

pub struct RunLog {
    log_file_path: PathBuf,
}

impl RunLog {
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            log_file_path: path.into(),
        }
    }

    /// 写入一行状态
    pub async fn write(&self, status: &str, message: &str) -> Result<()> {
        if let Some(dir) = self.log_file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(dir).await?;
        }

        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        let line = format!("[{}] [{}] {}\n", timestamp, status, message);
        debug!("写入状态日志: {}", line.trim_end());

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_file_path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        Ok(())
    }

    /// 写入一行状态；失败时只记录到 tracing，不向上传播
    pub async fn record(&self, status: &str, message: &str) {
        if let Err(e) = self.write(status, message).await {
            error!(
                "CRITICAL: 无法写入状态日志 {}: {}",
                self.log_file_path.display(),
                e
            );
        }
    }

    pub async fn record_incident(&self, incident: &Incident) {
        let message = match incident.page_index {
            Some(index) => format!("page {}: {}", index, incident.message),
            None => incident.message.clone(),
        };
        self.record(&incident.kind.to_string(), &message).await;
    }

    /// 写入会话的全部事件和最终摘要
    pub async fn record_session(&self, result: &SessionResult) {
        for incident in &result.incidents {
            self.record_incident(incident).await;
        }

        match &result.error {
            Some(e) => self.record("Error", &e.to_string()).await,
            None => {
                let summary = format!(
                    "session {}: {} pages, {} artifacts, {} skipped, terminated: {}",
                    result.session_key.as_deref().unwrap_or("-"),
                    result.pages_visited,
                    result.artifacts_written(),
                    result.skipped,
                    result.termination
                );
                self.record("Success", &summary).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::IncidentKind;

    #[tokio::test]
    async fn test_lines_are_appended_with_status() {
        let dir = tempfile::tempdir().unwrap();
        let log = RunLog::with_path(dir.path().join("log").join("rema_log.txt"));

        log.write("Error", "Driver could not find initial flyer").await.unwrap();
        log.record_incident(&Incident::new(IncidentKind::Cosmetic, None, "cookie overlay"))
            .await;

        let content = std::fs::read_to_string(dir.path().join("log/rema_log.txt")).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with('['));
        assert!(lines[0].ends_with("[Error] Driver could not find initial flyer"));
        assert!(lines[1].ends_with("[Cosmetic] cookie overlay"));
    }
}
