//! 日志初始化
//!
//! 订阅者由 [`LogConfig`] 显式构建并以 [`LoggingHandle`] 返回，二进制程序将其
//! 安装为全局订阅者，测试可以在线程内临时安装。

pub mod formatter;
pub mod log_config;
pub mod log_level;
pub mod memory_writer;

pub use formatter::CheckerFormatter;
pub use log_config::{LogConfig, LogOutput, OutputFormat, DEFAULT_TIMESTAMP_FORMAT};
pub use log_level::LogLevel;
pub use memory_writer::MemoryWriter;

use tracing::Dispatch;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter};

use crate::errors::{CheckerError, CheckerResult};

/// 构建好的日志订阅者及其缓冲写出器的守卫
///
/// 守卫释放时刷新缓冲区，因此需要在进程存活期间持有。
pub struct LoggingHandle {
    dispatch: Dispatch,
    guard: Option<WorkerGuard>,
}

impl LoggingHandle {
    pub fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }

    pub fn is_buffered(&self) -> bool {
        self.guard.is_some()
    }

    /// 安装为全局订阅者，返回需要持有到退出的守卫
    pub fn install_global(self) -> CheckerResult<Option<WorkerGuard>> {
        tracing::dispatcher::set_global_default(self.dispatch)
            .map_err(|e| CheckerError::Configuration(format!("初始化日志系统失败: {e}")))?;
        Ok(self.guard)
    }
}

/// 按配置构建写到标准输出/标准错误的订阅者
pub fn build_subscriber(config: &LogConfig) -> LoggingHandle {
    match (config.output, config.stdout_sync) {
        (LogOutput::Stdout, true) => LoggingHandle {
            dispatch: build_with_writer(config, std::io::stdout),
            guard: None,
        },
        (LogOutput::Stderr, true) => LoggingHandle {
            dispatch: build_with_writer(config, std::io::stderr),
            guard: None,
        },
        (LogOutput::Stdout, false) => {
            let (writer, guard) = tracing_appender::non_blocking(std::io::stdout());
            LoggingHandle {
                dispatch: build_with_writer(config, writer),
                guard: Some(guard),
            }
        }
        (LogOutput::Stderr, false) => {
            let (writer, guard) = tracing_appender::non_blocking(std::io::stderr());
            LoggingHandle {
                dispatch: build_with_writer(config, writer),
                guard: Some(guard),
            }
        }
    }
}

/// 使用任意写出器构建订阅者；`RUST_LOG` 存在时优先于配置的级别
pub fn build_with_writer<W>(config: &LogConfig, writer: W) -> Dispatch
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.to_level_filter().to_string()));

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.format {
        OutputFormat::Text => Dispatch::new(
            registry.with(
                tracing_subscriber::fmt::layer()
                    .event_format(CheckerFormatter::new(config.timestamp_format.clone()))
                    .with_ansi(false)
                    .with_writer(writer),
            ),
        ),
        OutputFormat::Json => Dispatch::new(
            registry.with(tracing_subscriber::fmt::layer().json().with_writer(writer)),
        ),
    }
}
