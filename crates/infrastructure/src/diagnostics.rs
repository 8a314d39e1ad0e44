use std::time::Duration;

use async_trait::async_trait;
use checker_core::{CheckerError, CheckerResult, DiagnosticEvent, Diagnostics};
use tracing::debug;
use url::Url;

/// 通过HTTP上报诊断事件
///
/// 每个事件以JSON请求体POST到配置的地址，非2xx响应视为失败。
#[derive(Debug, Clone)]
pub struct HttpDiagnostics {
    endpoint: Url,
    client: reqwest::Client,
}

impl HttpDiagnostics {
    pub fn new(endpoint: &str, timeout: Duration) -> CheckerResult<Self> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| CheckerError::Configuration(format!("无效的诊断服务地址: {e}")))?;

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CheckerError::Diagnostics(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { endpoint, client })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl Diagnostics for HttpDiagnostics {
    async fn capture(&self, event: &DiagnosticEvent) -> CheckerResult<()> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(event)
            .send()
            .await
            .map_err(|e| CheckerError::Diagnostics(format!("diagnostic request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CheckerError::Diagnostics(format!(
                "diagnostic sink rejected event (status={status}): {body}"
            )));
        }

        debug!("Diagnostic event delivered to {}", self.endpoint);
        Ok(())
    }
}
