//! 任务计时
//!
//! 每个任务记录两段时长：任务创建到被Worker接收（投递时间），
//! 以及接收到操作调用返回（处理时间）。

use std::time::Instant;

use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::warn;

/// 两个时刻之间经过的秒数，时钟回拨时记为0
pub fn elapsed_seconds(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    let millis = (to - from).num_milliseconds();
    (millis.max(0) as f64) / 1000.0
}

/// 解析ISO-8601时间戳；不带时区的时间按UTC处理
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc())
}

/// 秒数的显示形式，保留两位小数
pub fn format_seconds(seconds: f64) -> String {
    format!("{seconds:.2}")
}

/// 单个任务的计时结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JobTimings {
    pub delivery_seconds: f64,
    pub processing_seconds: f64,
}

/// 任务被接收时启动的计时器
#[derive(Debug, Clone, Copy)]
pub struct JobTimer {
    received_at: DateTime<Utc>,
    started: Instant,
}

impl JobTimer {
    pub fn start() -> Self {
        Self {
            received_at: Utc::now(),
            started: Instant::now(),
        }
    }

    pub fn received_at(&self) -> DateTime<Utc> {
        self.received_at
    }

    /// 投递时间；缺少或无法解析创建时间时记为0并告警
    pub fn delivery_seconds(&self, created_at: Option<&str>) -> f64 {
        match created_at {
            Some(raw) => match parse_timestamp(raw) {
                Some(created) => elapsed_seconds(created, self.received_at),
                None => {
                    warn!("Invalid job timestamp '{}', delivery time unknown", raw);
                    0.0
                }
            },
            None => {
                warn!("Job has no timestamp, delivery time unknown");
                0.0
            }
        }
    }

    /// 从接收到现在的处理时间
    pub fn processing_seconds(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }

    /// 在操作调用返回后调用，一次性得到两段时长
    pub fn finish(&self, created_at: Option<&str>) -> JobTimings {
        JobTimings {
            delivery_seconds: self.delivery_seconds(created_at),
            processing_seconds: self.processing_seconds(),
        }
    }
}
