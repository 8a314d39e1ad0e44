use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use checker_core::logging::build_subscriber;
use checker_core::{CheckerConfig, Operations};
use clap::{Arg, ArgMatches, Command};
use metrics_exporter_prometheus::PrometheusBuilder;
use tokio::signal;
use tracing::{error, info, warn};

use crate::app::Application;
use crate::shutdown::ShutdownManager;

/// 通用的应用启动配置
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StartupConfig {
    pub config_path: Option<String>,
    pub log_level: Option<String>,
    pub log_format: Option<String>,
}

/// 命令行定义
pub fn build_command() -> Command {
    Command::new("checker")
        .version(env!("CARGO_PKG_VERSION"))
        .about("服务检查Worker")
        .long_about("从任务队列消费push/pull任务，调用检查逻辑并把结果写入结果队列")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("配置文件路径（TOML）"),
        )
        .arg(
            Arg::new("log-level")
                .short('l')
                .long("log-level")
                .value_name("LEVEL")
                .help("日志级别: trace, debug, info, warn, error, fatal"),
        )
        .arg(
            Arg::new("log-format")
                .long("log-format")
                .value_name("FORMAT")
                .help("日志格式")
                .value_parser(["text", "json"]),
        )
}

impl StartupConfig {
    pub fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            config_path: matches.get_one::<String>("config").cloned(),
            log_level: matches.get_one::<String>("log-level").cloned(),
            log_format: matches.get_one::<String>("log-format").cloned(),
        }
    }
}

/// 加载应用配置，命令行参数覆盖文件和环境变量中的值
pub fn load_config(startup_config: &StartupConfig) -> Result<CheckerConfig> {
    let mut config = CheckerConfig::load(startup_config.config_path.as_deref()).with_context(|| {
        format!(
            "加载配置失败: {}",
            startup_config.config_path.as_deref().unwrap_or("<环境变量>")
        )
    })?;

    if let Some(level) = &startup_config.log_level {
        config.log_level = level.clone();
    }
    if let Some(format) = &startup_config.log_format {
        config.log_format = format.clone();
    }

    Ok(config)
}

/// 配置了监听地址时安装Prometheus导出器
pub fn install_metrics_exporter(config: &CheckerConfig) -> Result<()> {
    let Some(listen) = &config.metrics_listen else {
        return Ok(());
    };

    let addr: SocketAddr = listen
        .parse()
        .with_context(|| format!("无效的指标监听地址: {listen}"))?;
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .context("安装Prometheus导出器失败")?;
    checker_worker::metrics::register_metrics();

    info!("Prometheus指标监听于 {}", addr);
    Ok(())
}

/// 进程入口：解析命令行，初始化日志，运行Worker直到收到中断信号
///
/// 集成方在自己的 `main` 中传入检查逻辑即可。
pub async fn run_checker<O: Operations>(operations: O) -> Result<()> {
    let matches = build_command().get_matches();
    let startup_config = StartupConfig::from_matches(&matches);
    let config = load_config(&startup_config)?;

    let logging = build_subscriber(&config.log_config());
    let _log_guard = logging.install_global().context("初始化日志系统失败")?;

    run_with_config(config, Arc::new(operations)).await
}

/// 在已初始化日志的前提下运行Worker
pub async fn run_with_config(config: CheckerConfig, operations: Arc<dyn Operations>) -> Result<()> {
    info!("启动服务检查Worker");
    install_metrics_exporter(&config)?;

    let shutdown_timeout = config.shutdown_timeout();
    let app = Application::new(config, operations).await?;
    let shutdown_manager = ShutdownManager::new();

    let mut app_handle = {
        let signal = shutdown_manager.subscribe();
        tokio::spawn(async move { app.run(signal).await })
    };

    // Worker因传输故障提前退出时不再等待信号
    tokio::select! {
        result = wait_for_shutdown_signal() => result?,
        finished = &mut app_handle => {
            return match finished {
                Ok(Ok(())) => Ok(()),
                Ok(Err(e)) => {
                    error!("应用运行失败: {e:#}");
                    Err(e)
                }
                Err(e) => Err(anyhow::anyhow!("应用任务异常退出: {e}")),
            };
        }
    }

    info!("收到关闭信号，开始优雅关闭...");
    shutdown_manager.shutdown();

    match tokio::time::timeout(shutdown_timeout, app_handle).await {
        Ok(Ok(Ok(()))) => info!("应用已优雅关闭"),
        Ok(Ok(Err(e))) => error!("应用关闭时发生错误: {e:#}"),
        Ok(Err(e)) => error!("应用任务异常退出: {e}"),
        Err(_) => warn!("应用关闭超时（{}秒），强制退出", shutdown_timeout.as_secs()),
    }

    info!("服务检查Worker已退出");
    Ok(())
}

/// 等待Ctrl+C或SIGTERM
pub async fn wait_for_shutdown_signal() -> Result<()> {
    let ctrl_c = signal::ctrl_c();

    #[cfg(unix)]
    let mut terminate = signal::unix::signal(signal::unix::SignalKind::terminate())
        .context("安装SIGTERM信号处理器失败")?;

    #[cfg(unix)]
    let terminate = terminate.recv();

    #[cfg(not(unix))]
    let terminate = std::future::pending::<Option<()>>();

    tokio::select! {
        result = ctrl_c => {
            result.context("安装Ctrl+C信号处理器失败")?;
            info!("收到Ctrl+C信号");
        },
        _ = terminate => {
            info!("收到SIGTERM信号");
        },
    }
    Ok(())
}
