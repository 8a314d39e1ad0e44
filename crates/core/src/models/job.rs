use serde::{Deserialize, Serialize};

use super::Adjunct;
use crate::errors::{CheckerError, CheckerResult};

/// push操作在线上的名称
pub const OPERATION_PUSH: &str = "push";
/// pull操作在线上的名称
pub const OPERATION_PULL: &str = "pull";

/// 任务元数据
///
/// 各字段独立可选，缺失时只影响日志和计时，不影响结果上报。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobMetadata {
    /// 任务创建时间（ISO-8601）
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub round: Option<i64>,
    #[serde(default)]
    pub service_name: Option<String>,
    #[serde(default)]
    pub team_name: Option<String>,
}

/// 任务的操作类型
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobKind {
    /// 向目标存入flag
    Deposit,
    /// 从目标取回flag，结果需关联原请求
    Retrieve { request_id: String },
    /// 无法识别的操作名
    Unknown(String),
}

impl JobKind {
    pub fn as_str(&self) -> &str {
        match self {
            JobKind::Deposit => OPERATION_PUSH,
            JobKind::Retrieve { .. } => OPERATION_PULL,
            JobKind::Unknown(name) => name,
        }
    }
}

/// 从任务队列解码出的一次工作单元，解码后不再修改
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub kind: JobKind,
    pub endpoint: String,
    pub flag: String,
    pub adjunct: Adjunct,
    pub metadata: JobMetadata,
}

/// 线上格式，除operation外的字段均容许缺失，由 [`Job::decode`] 按操作类型校验
#[derive(Debug, Deserialize)]
struct JobEnvelope {
    operation: String,
    #[serde(default)]
    endpoint: Option<String>,
    #[serde(default)]
    flag: Option<String>,
    #[serde(default)]
    adjunct: Adjunct,
    #[serde(default)]
    request_id: Option<String>,
    #[serde(default)]
    metadata: JobMetadata,
}

impl Job {
    /// 解码队列中的任务负载
    ///
    /// 未知的operation不是错误，而是解码为 [`JobKind::Unknown`]。
    pub fn decode(payload: &[u8]) -> CheckerResult<Self> {
        let envelope: JobEnvelope = serde_json::from_slice(payload)
            .map_err(|e| CheckerError::Serialization(format!("解析任务失败: {e}")))?;

        let kind = match envelope.operation.as_str() {
            OPERATION_PUSH => JobKind::Deposit,
            OPERATION_PULL => JobKind::Retrieve {
                request_id: envelope.request_id.ok_or_else(|| {
                    CheckerError::Serialization("pull任务缺少request_id".to_string())
                })?,
            },
            other => JobKind::Unknown(other.to_string()),
        };

        let (endpoint, flag) = match kind {
            JobKind::Unknown(_) => (
                envelope.endpoint.unwrap_or_default(),
                envelope.flag.unwrap_or_default(),
            ),
            _ => (
                envelope.endpoint.ok_or_else(|| {
                    CheckerError::Serialization(format!("{}任务缺少endpoint", kind.as_str()))
                })?,
                envelope.flag.ok_or_else(|| {
                    CheckerError::Serialization(format!("{}任务缺少flag", kind.as_str()))
                })?,
            ),
        };

        Ok(Self {
            kind,
            endpoint,
            flag,
            adjunct: envelope.adjunct,
            metadata: envelope.metadata,
        })
    }

    /// 编码为线上格式，主要供测试和任务生产方使用
    pub fn encode(&self) -> CheckerResult<Vec<u8>> {
        let mut value = serde_json::json!({
            "operation": self.kind.as_str(),
            "endpoint": self.endpoint,
            "flag": self.flag,
            "adjunct": self.adjunct,
            "metadata": self.metadata,
        });
        if let JobKind::Retrieve { request_id } = &self.kind {
            value["request_id"] = serde_json::Value::String(request_id.clone());
        }
        Ok(serde_json::to_vec(&value)?)
    }

    pub fn request_id(&self) -> Option<&str> {
        match &self.kind {
            JobKind::Retrieve { request_id } => Some(request_id),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn metadata_json() -> serde_json::Value {
        json!({
            "timestamp": "2026-03-01T10:00:00+00:00",
            "round": 3,
            "service_name": "svc",
            "team_name": "teamA"
        })
    }

    #[test]
    fn test_decode_push() {
        let payload = json!({
            "operation": "push",
            "endpoint": "10.0.0.5:7777",
            "flag": "FLAG_abc",
            "adjunct": "",
            "metadata": metadata_json(),
        });
        let job = Job::decode(payload.to_string().as_bytes()).unwrap();

        assert_eq!(job.kind, JobKind::Deposit);
        assert_eq!(job.endpoint, "10.0.0.5:7777");
        assert_eq!(job.flag, "FLAG_abc");
        assert!(job.adjunct.is_empty());
        assert_eq!(job.metadata.round, Some(3));
        assert_eq!(job.metadata.team_name.as_deref(), Some("teamA"));
        assert_eq!(job.request_id(), None);
    }

    #[test]
    fn test_decode_pull() {
        let payload = json!({
            "operation": "pull",
            "endpoint": "10.0.0.5:7777",
            "flag": "FLAG_abc",
            "adjunct": "WFlaMTIz",
            "request_id": "r-42",
            "metadata": metadata_json(),
        });
        let job = Job::decode(payload.to_string().as_bytes()).unwrap();

        assert_eq!(
            job.kind,
            JobKind::Retrieve {
                request_id: "r-42".to_string()
            }
        );
        assert_eq!(job.adjunct.as_bytes(), b"XYZ123");
        assert_eq!(job.request_id(), Some("r-42"));
    }

    #[test]
    fn test_decode_unknown_operation() {
        let job = Job::decode(br#"{"operation":"noop"}"#).unwrap();
        assert_eq!(job.kind, JobKind::Unknown("noop".to_string()));
        assert_eq!(job.kind.as_str(), "noop");
    }

    #[test]
    fn test_decode_malformed() {
        assert!(Job::decode(b"not json").is_err());
        assert!(Job::decode(br#"{"endpoint":"x"}"#).is_err());
        // pull必须携带request_id
        assert!(Job::decode(br#"{"operation":"pull","endpoint":"e","flag":"f"}"#).is_err());
        // push必须携带endpoint和flag
        assert!(Job::decode(br#"{"operation":"push","flag":"f"}"#).is_err());
        assert!(
            Job::decode(br#"{"operation":"push","endpoint":"e","flag":"f","adjunct":"%%"}"#)
                .is_err()
        );
    }

    #[test]
    fn test_decode_tolerates_missing_metadata() {
        let job = Job::decode(br#"{"operation":"push","endpoint":"e","flag":"f"}"#).unwrap();
        assert_eq!(job.metadata, JobMetadata::default());
    }

    #[test]
    fn test_encode_then_decode_pull() {
        let job = Job {
            kind: JobKind::Retrieve {
                request_id: "r-1".to_string(),
            },
            endpoint: "127.0.0.1:80".to_string(),
            flag: "FLAG".to_string(),
            adjunct: Adjunct::new(b"id".to_vec()),
            metadata: JobMetadata::default(),
        };
        let decoded = Job::decode(&job.encode().unwrap()).unwrap();
        assert_eq!(decoded, job);
    }
}
