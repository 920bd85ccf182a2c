//! 应用入口 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：状态日志、启动或连接浏览器、创建 JsExecutor
//! 2. **资源管理**：持有 Browser，确保生命周期覆盖整个会话
//! 3. **执行会话**：构造页面来源和 `Harvester`，运行一次采集
//! 4. **结果记录**：把会话事件和摘要写入状态日志并打印统计

use std::sync::Arc;

use anyhow::{Context, Result};
use chromiumoxide::Browser;
use tracing::info;

use crate::browser;
use crate::config::Config;
use crate::infrastructure::{BrowserPageSource, JsExecutor};
use crate::models::SessionResult;
use crate::orchestrator::Harvester;
use crate::services::{FsStorage, ReqwestDownloader, RunLog};
use crate::utils::logging::{log_startup, print_final_stats};

/// 应用主结构
pub struct App {
    config: Config,
    _browser: Browser,
    executor: Option<JsExecutor>,
    run_log: RunLog,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        log_startup(&config);
        let run_log = RunLog::with_path(&config.run_log_file);

        let (browser, page) = match config.browser_debug_port {
            Some(port) => browser::connect_to_browser_and_page(port, Some(&config.landing_url)).await?,
            None => browser::launch_headless_browser(config.chrome_executable.as_deref()).await?,
        };

        Ok(Self {
            config,
            _browser: browser,
            executor: Some(JsExecutor::new(page)),
            run_log,
        })
    }

    /// 运行一次采集会话
    ///
    /// 页面来源独占 page，同一个 App 只能运行一次。
    pub async fn run(&mut self) -> Result<SessionResult> {
        let executor = self
            .executor
            .take()
            .context("浏览器页面已被上一次会话占用")?;

        let mut source = BrowserPageSource::new(
            executor,
            self.config.landing_url.clone(),
            self.config.selectors.clone(),
            self.config.content,
            self.config.navigation,
        )
        .with_wait(self.config.timeout(), self.config.poll_interval());

        let downloader = ReqwestDownloader::new(self.config.timeout()).context("创建下载客户端失败")?;
        let harvester = Harvester::new(
            self.config.harvest_settings(),
            Arc::new(FsStorage::new()),
            Arc::new(downloader),
        );

        info!("\n📁 开始采集海报: {}", self.config.landing_url);
        let result = harvester.run(&mut source).await;

        self.run_log.record_session(&result).await;
        print_final_stats(&result, &self.config.run_log_file.display().to_string());

        Ok(result)
    }
}
