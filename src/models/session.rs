//! 会话与会话键
//!
//! 会话键由海报首页上的日期文本（如 `"6. - 12. december"`）生成，
//! 经过清洗后可直接作为目录名；无法解析时退化为基于时间的合成键，永不失败。

use std::fmt;
use std::sync::OnceLock;

use chrono::{Datelike, NaiveDateTime};
use phf::phf_map;
use regex::Regex;

use super::PageIdentity;

/// 丹麦语月份名 → 月份编号
static DANISH_MONTHS: phf::Map<&'static str, u32> = phf_map! {
    "januar" => 1,
    "februar" => 2,
    "marts" => 3,
    "april" => 4,
    "maj" => 5,
    "juni" => 6,
    "juli" => 7,
    "august" => 8,
    "september" => 9,
    "oktober" => 10,
    "november" => 11,
    "december" => 12,
};

fn date_range_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(\d{1,2})\.?\s*(\p{L}+)?\.?\s*-\s*(\d{1,2})\.?\s*(\p{L}+)")
            .expect("date range regex is valid")
    })
}

/// 海报首页信息，由页面来源在定位首页时报告
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    /// 首页标识（海报链接）
    pub start: PageIdentity,
    /// 首页上的日期文本
    pub date_label: Option<String>,
}

/// 会话键
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey {
    value: String,
    /// 标签日志文件名；合成键只取日期，同一天的多次运行共用一个日志
    log_stem: String,
    synthetic: bool,
}

impl SessionKey {
    /// 由日期文本生成会话键，解析失败时使用 `session_{时间戳}`
    pub fn derive(date_label: Option<&str>, now: NaiveDateTime) -> Self {
        match date_label.and_then(|label| parse_date_range(label, now)) {
            Some(value) => {
                let value = sanitize_component(&value);
                Self {
                    log_stem: value.clone(),
                    value,
                    synthetic: false,
                }
            }
            None => Self::synthetic(now),
        }
    }

    pub fn synthetic(now: NaiveDateTime) -> Self {
        Self {
            value: format!("session_{}", now.format("%Y%m%d_%H%M%S")),
            log_stem: format!("session_{}", now.format("%Y%m%d")),
            synthetic: true,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn log_stem(&self) -> &str {
        &self.log_stem
    }

    /// 是否为合成键（日期文本无法解析）
    pub fn is_synthetic(&self) -> bool {
        self.synthetic
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

fn parse_date_range(label: &str, now: NaiveDateTime) -> Option<String> {
    let caps = date_range_regex().captures(label)?;

    let first_day: u32 = caps.get(1)?.as_str().parse().ok()?;
    let last_day: u32 = caps.get(3)?.as_str().parse().ok()?;
    if !(1..=31).contains(&first_day) || !(1..=31).contains(&last_day) {
        return None;
    }

    let last_month = caps.get(4)?.as_str().to_lowercase();
    let last_month_no = *DANISH_MONTHS.get(last_month.as_str())?;

    let first_month = match caps.get(2) {
        Some(m) => {
            let name = m.as_str().to_lowercase();
            DANISH_MONTHS.get(name.as_str())?;
            Some(name)
        }
        None => None,
    };

    // 年底抓到下一年一月的海报，或年初抓到上一年十二月的海报
    let year = match (now.month(), last_month_no) {
        (12, 1) => now.year() + 1,
        (1, 12) => now.year() - 1,
        _ => now.year(),
    };

    Some(match first_month {
        Some(first_month) => format!("{first_day}_{first_month}-{last_day}_{last_month}_{year}"),
        None => format!("{first_day}-{last_day}_{last_month}_{year}"),
    })
}

/// 将任意文本清洗为可作为路径片段的字符串
///
/// 小写化；字母、数字、`-`、`_` 以外的字符替换为 `_`；合并连续的 `_` 并去掉首尾的 `_`。
pub fn sanitize_component(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut prev_underscore = false;
    for c in input.chars().flat_map(char::to_lowercase) {
        let c = if c.is_alphanumeric() || c == '-' { c } else { '_' };
        if c == '_' {
            if !prev_underscore {
                out.push(c);
            }
            prev_underscore = true;
        } else {
            out.push(c);
            prev_underscore = false;
        }
    }
    out.trim_matches('_').to_string()
}

/// 一次采集会话
///
/// 创建后不可变；页面去重集合由导航器持有，内容去重集合由编排层持有，都不跨会话共享。
#[derive(Debug, Clone)]
pub struct Session {
    pub key: SessionKey,
    pub start: PageIdentity,
    pub date_label: Option<String>,
    pub max_pages: u32,
}

impl Session {
    pub fn open(anchor: &Anchor, max_pages: u32, now: NaiveDateTime) -> Self {
        Self {
            key: SessionKey::derive(anchor.date_label.as_deref(), now),
            start: anchor.start.clone(),
            date_label: anchor.date_label.clone(),
            max_pages,
        }
    }
}
