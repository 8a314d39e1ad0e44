use std::path::Path;
use std::time::Duration;

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::errors::{CheckerError, CheckerResult};
use crate::logging::{LogConfig, LogLevel, OutputFormat};

/// 环境变量前缀
pub const ENV_PREFIX: &str = "CHECKER";

/// Message queue type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum MessageQueueType {
    #[default]
    Redis,
    Memory,
}

/// Checker configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CheckerConfig {
    pub queue_type: MessageQueueType,
    /// 队列服务地址
    pub queue_uri: String,
    /// 消费任务的队列
    pub tube_listen: String,
    /// 上报结果的队列
    pub tube_report: String,
    pub log_level: String,
    pub log_format: String,
    /// 为true时每行日志直接写出，否则经缓冲写出
    pub stdout_sync: bool,
    /// 诊断服务地址，配置后即启用诊断上报
    pub diagnostics_endpoint: Option<String>,
    pub diagnostics_timeout_seconds: u64,
    pub poll_interval_ms: u64,
    pub receive_timeout_ms: u64,
    pub shutdown_timeout_seconds: u64,
    /// Prometheus指标监听地址
    pub metrics_listen: Option<String>,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            queue_type: MessageQueueType::default(),
            queue_uri: "redis://127.0.0.1:6379/0".to_string(),
            tube_listen: "checker.jobs".to_string(),
            tube_report: "checker.reports".to_string(),
            log_level: "info".to_string(),
            log_format: "text".to_string(),
            stdout_sync: false,
            diagnostics_endpoint: None,
            diagnostics_timeout_seconds: 5,
            poll_interval_ms: 200,
            receive_timeout_ms: 1000,
            shutdown_timeout_seconds: 30,
            metrics_listen: None,
        }
    }
}

impl CheckerConfig {
    /// Load configuration from config file and environment variables
    ///
    /// Load order:
    /// 1. Default configuration
    /// 2. Config file (TOML format), if given
    /// 3. Environment variable overrides (prefix: CHECKER_)
    pub fn load(config_path: Option<&str>) -> CheckerResult<Self> {
        Self::load_with_env(config_path, Environment::with_prefix(ENV_PREFIX))
    }

    /// 使用指定的环境变量源加载，测试中可以传入固定的变量表
    pub fn load_with_env(config_path: Option<&str>, environment: Environment) -> CheckerResult<Self> {
        let mut builder = ConfigBuilder::builder();

        if let Some(path) = config_path {
            if !Path::new(path).exists() {
                return Err(CheckerError::Configuration(format!("配置文件不存在: {path}")));
            }
            builder = builder.add_source(File::new(path, FileFormat::Toml));
        }

        builder = builder.add_source(
            environment
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: CheckerConfig = builder.build()?.try_deserialize()?;
        config.normalized().validate_into()
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> CheckerResult<Self> {
        let config: CheckerConfig = ConfigBuilder::builder()
            .add_source(File::from_str(toml_str, FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        config.normalized().validate_into()
    }

    /// 空字符串的可选项视为未配置
    fn normalized(mut self) -> Self {
        self.diagnostics_endpoint = self.diagnostics_endpoint.filter(|s| !s.trim().is_empty());
        self.metrics_listen = self.metrics_listen.filter(|s| !s.trim().is_empty());
        self
    }

    fn validate_into(self) -> CheckerResult<Self> {
        self.validate()?;
        Ok(self)
    }

    /// Validate configuration
    pub fn validate(&self) -> CheckerResult<()> {
        if self.tube_listen.is_empty() {
            return Err(CheckerError::Configuration("任务队列名称不能为空".to_string()));
        }

        if self.tube_report.is_empty() {
            return Err(CheckerError::Configuration("结果队列名称不能为空".to_string()));
        }

        if self.tube_listen == self.tube_report {
            return Err(CheckerError::Configuration(
                "任务队列和结果队列不能相同".to_string(),
            ));
        }

        if self.queue_type == MessageQueueType::Redis
            && !self.queue_uri.starts_with("redis://")
            && !self.queue_uri.starts_with("rediss://")
        {
            return Err(CheckerError::Configuration(
                "Redis URI必须是redis://或rediss://格式".to_string(),
            ));
        }

        if let Some(endpoint) = &self.diagnostics_endpoint {
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                return Err(CheckerError::Configuration(
                    "诊断服务地址必须是HTTP(S) URL".to_string(),
                ));
            }
        }

        if self.diagnostics_timeout_seconds == 0 {
            return Err(CheckerError::Configuration("诊断上报超时时间必须大于0".to_string()));
        }

        if self.poll_interval_ms == 0 || self.receive_timeout_ms == 0 {
            return Err(CheckerError::Configuration("队列轮询间隔必须大于0".to_string()));
        }

        Ok(())
    }

    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            level: LogLevel::parse_lenient(&self.log_level),
            format: OutputFormat::parse_lenient(&self.log_format),
            stdout_sync: self.stdout_sync,
            ..LogConfig::default()
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn receive_timeout(&self) -> Duration {
        Duration::from_millis(self.receive_timeout_ms)
    }

    pub fn diagnostics_timeout(&self) -> Duration {
        Duration::from_secs(self.diagnostics_timeout_seconds)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_seconds)
    }

    pub fn diagnostics_enabled(&self) -> bool {
        self.diagnostics_endpoint.is_some()
    }
}
