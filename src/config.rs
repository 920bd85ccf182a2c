//! 程序配置
//!
//! 默认值对应 REMA 1000 的每周海报；可由 TOML 文件（`HARVEST_CONFIG`）和环境变量覆盖。

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::workflow::{NavigationStyle, StepPolicy};

/// 内容形式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentStyle {
    /// 商品标签，按行追加到 `raw/{store}/{date}_raw.txt`
    #[default]
    Labels,
    /// 海报图片，保存为 `{session_key}/flyer_page_{n}.{ext}`
    Images,
}

impl FromStr for ContentStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "labels" | "label" => Ok(ContentStyle::Labels),
            "images" | "image" => Ok(ContentStyle::Images),
            other => Err(format!("未知的内容形式: {}", other)),
        }
    }
}

/// 页面选择器
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSelectors {
    /// 落地页上的海报入口
    pub publication_link: String,
    /// 海报入口内的日期文本
    pub date_text: String,
    /// "下一页"按钮
    pub next_button: String,
    /// 商品按钮（读取 aria-label）
    pub offer: String,
    /// 海报图片
    pub flyer_image: String,
    /// 需要移除的 cookie 遮罩层 id
    pub cookie_overlay_id: String,
    /// 期望出现在海报封面 alt 文本中的周标记
    pub week_marker: String,
}

impl Default for SiteSelectors {
    fn default() -> Self {
        Self {
            publication_link: r"a.group\/publication".to_string(),
            date_text: "h4".to_string(),
            next_button: r#"button[data-direction="next"]"#.to_string(),
            offer: r#"[data-type="offer"]"#.to_string(),
            flyer_image: r#"img[src*="tjek.com"]"#.to_string(),
            cookie_overlay_id: "coiOverlay".to_string(),
            week_marker: "Uge".to_string(),
        }
    }
}

/// 采集核心的配置，构造 `Harvester` 时传入
#[derive(Clone, Debug)]
pub struct HarvestSettings {
    /// 最大页码（安全上限）
    pub max_pages: u32,
    pub step_policy: StepPolicy,
    pub navigation: NavigationStyle,
    pub content: ContentStyle,
    /// 数据根目录
    pub base_path: PathBuf,
    /// 商店名，用于标签日志路径
    pub store: String,
    /// 单次等待页面的超时
    pub timeout: Duration,
    /// 轮询新内容的重试次数
    pub poll_retries: u32,
    /// 两次轮询之间的间隔
    pub poll_interval: Duration,
}

impl Default for HarvestSettings {
    fn default() -> Self {
        Config::default().harvest_settings()
    }
}

/// 程序配置文件
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub max_pages: u32,
    pub step_policy: StepPolicy,
    pub navigation: NavigationStyle,
    pub content: ContentStyle,
    pub base_path: PathBuf,
    pub store: String,
    pub timeout_ms: u64,
    pub poll_retries: u32,
    pub poll_interval_ms: u64,
    /// 海报列表落地页
    pub landing_url: String,
    /// 连接已运行浏览器的调试端口；为空时启动无头浏览器
    pub browser_debug_port: Option<u16>,
    /// 浏览器可执行文件；为空时自动探测
    pub chrome_executable: Option<PathBuf>,
    /// 状态日志文件
    pub run_log_file: PathBuf,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    pub selectors: SiteSelectors,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_pages: 60,
            step_policy: StepPolicy::WarmStart,
            navigation: NavigationStyle::Indexed,
            content: ContentStyle::Labels,
            base_path: PathBuf::from("data"),
            store: "rema".to_string(),
            timeout_ms: 15_000,
            poll_retries: 5,
            poll_interval_ms: 500,
            landing_url: "https://rema1000.dk/avis".to_string(),
            browser_debug_port: None,
            chrome_executable: None,
            run_log_file: PathBuf::from("log/rema_log.txt"),
            verbose_logging: false,
            selectors: SiteSelectors::default(),
        }
    }
}

impl Config {
    /// 加载配置：`HARVEST_CONFIG` 指向的 TOML 文件（若有），再叠加环境变量
    pub fn load() -> Result<Self, ConfigError> {
        let base = match std::env::var("HARVEST_CONFIG") {
            Ok(path) => Self::from_toml_file(Path::new(&path))?,
            Err(_) => Self::default(),
        };
        base.with_env_overrides()
    }

    /// 仅从环境变量加载（未设置的项使用默认值）
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env_overrides()
    }

    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    fn with_env_overrides(self) -> Result<Self, ConfigError> {
        Ok(Self {
            max_pages: env_parse("MAX_PAGES", "u32")?.unwrap_or(self.max_pages),
            step_policy: env_parse("STEP_POLICY", "StepPolicy")?.unwrap_or(self.step_policy),
            navigation: env_parse("NAVIGATION", "NavigationStyle")?.unwrap_or(self.navigation),
            content: env_parse("CONTENT_STYLE", "ContentStyle")?.unwrap_or(self.content),
            base_path: std::env::var("BASE_DATA_FOLDER").map(PathBuf::from).unwrap_or(self.base_path),
            store: std::env::var("STORE").unwrap_or(self.store),
            timeout_ms: env_parse("TIMEOUT_MS", "u64")?.unwrap_or(self.timeout_ms),
            poll_retries: env_parse("POLL_RETRIES", "u32")?.unwrap_or(self.poll_retries),
            poll_interval_ms: env_parse("POLL_INTERVAL_MS", "u64")?.unwrap_or(self.poll_interval_ms),
            landing_url: std::env::var("LANDING_URL").unwrap_or(self.landing_url),
            browser_debug_port: env_parse("BROWSER_DEBUG_PORT", "u16")?.or(self.browser_debug_port),
            chrome_executable: std::env::var("CHROME_EXECUTABLE")
                .map(PathBuf::from)
                .ok()
                .or(self.chrome_executable),
            run_log_file: std::env::var("RUN_LOG_FILE").map(PathBuf::from).unwrap_or(self.run_log_file),
            verbose_logging: env_parse("VERBOSE_LOGGING", "bool")?.unwrap_or(self.verbose_logging),
            selectors: self.selectors,
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn harvest_settings(&self) -> HarvestSettings {
        HarvestSettings {
            max_pages: self.max_pages,
            step_policy: self.step_policy,
            navigation: self.navigation,
            content: self.content,
            base_path: self.base_path.clone(),
            store: self.store.clone(),
            timeout: self.timeout(),
            poll_retries: self.poll_retries,
            poll_interval: self.poll_interval(),
        }
    }
}

fn env_parse<T: FromStr>(var_name: &str, expected_type: &str) -> Result<Option<T>, ConfigError> {
    match std::env::var(var_name) {
        Ok(value) => value
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: expected_type.to_string(),
            }),
        Err(_) => Ok(None),
    }
}
