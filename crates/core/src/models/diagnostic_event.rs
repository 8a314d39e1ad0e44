use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Job, ResultCode};

/// 上报给诊断服务时保留的flag前缀长度
pub const FLAG_PREFIX_LEN: usize = 8;

/// 发往外部错误追踪服务的精简事件
///
/// 只携带flag前缀，完整上下文放在tags中。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticEvent {
    pub message: String,
    pub level: String,
    pub operation: String,
    pub flag_prefix: String,
    pub round: Option<i64>,
    pub team_name: Option<String>,
    pub service_name: Option<String>,
    pub status: String,
    pub server_name: Option<String>,
    pub tags: BTreeMap<String, String>,
    pub timestamp: DateTime<Utc>,
}

impl DiagnosticEvent {
    /// 根据故障任务构建诊断事件
    pub fn from_fault(job: &Job, status: ResultCode, message: impl Into<String>) -> Self {
        let flag_prefix: String = job.flag.chars().take(FLAG_PREFIX_LEN).collect();
        let metadata = &job.metadata;

        let mut tags = BTreeMap::new();
        tags.insert("operation".to_string(), job.kind.as_str().to_string());
        tags.insert("endpoint".to_string(), job.endpoint.clone());
        tags.insert("status".to_string(), status.name().to_string());
        tags.insert("status_code".to_string(), status.code().to_string());
        if let Some(round) = metadata.round {
            tags.insert("round".to_string(), round.to_string());
        }
        if let Some(team) = &metadata.team_name {
            tags.insert("team".to_string(), team.clone());
        }
        if let Some(service) = &metadata.service_name {
            tags.insert("service".to_string(), service.clone());
        }
        if let Some(created) = &metadata.timestamp {
            tags.insert("created_at".to_string(), created.clone());
        }
        if let Some(request_id) = job.request_id() {
            tags.insert("request_id".to_string(), request_id.to_string());
        }

        Self {
            message: message.into(),
            level: "error".to_string(),
            operation: job.kind.as_str().to_string(),
            flag_prefix,
            round: metadata.round,
            team_name: metadata.team_name.clone(),
            service_name: metadata.service_name.clone(),
            status: status.name().to_string(),
            server_name: None,
            tags,
            timestamp: Utc::now(),
        }
    }

    pub fn with_server_name(mut self, server_name: impl Into<String>) -> Self {
        self.server_name = Some(server_name.into());
        self
    }
}
