use serde::{Deserialize, Serialize};

use super::{Adjunct, ResultCode};
use crate::errors::CheckerResult;

/// 每个任务产生的结果记录，构建后不可变，上报一次后丢弃
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation")]
pub enum ResultRecord {
    #[serde(rename = "push")]
    Deposit {
        status: ResultCode,
        flag: String,
        adjunct: Adjunct,
    },
    #[serde(rename = "pull")]
    Retrieve {
        request_id: String,
        status: ResultCode,
    },
}

impl ResultRecord {
    pub fn status(&self) -> ResultCode {
        match self {
            ResultRecord::Deposit { status, .. } | ResultRecord::Retrieve { status, .. } => {
                *status
            }
        }
    }

    pub fn operation(&self) -> &'static str {
        match self {
            ResultRecord::Deposit { .. } => super::OPERATION_PUSH,
            ResultRecord::Retrieve { .. } => super::OPERATION_PULL,
        }
    }

    pub fn encode(&self) -> CheckerResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn decode(payload: &[u8]) -> CheckerResult<Self> {
        Ok(serde_json::from_slice(payload)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn test_deposit_wire_format() {
        let record = ResultRecord::Deposit {
            status: ResultCode::Up,
            flag: "FLAG_abc".to_string(),
            adjunct: Adjunct::new(b"XYZ123".to_vec()),
        };
        let value: Value = serde_json::from_slice(&record.encode().unwrap()).unwrap();
        assert_eq!(
            value,
            json!({
                "operation": "push",
                "status": 101,
                "flag": "FLAG_abc",
                "adjunct": "WFlaMTIz"
            })
        );
    }

    #[test]
    fn test_retrieve_wire_format() {
        let record = ResultRecord::Retrieve {
            request_id: "r-42".to_string(),
            status: ResultCode::InternalError,
        };
        let value: Value = serde_json::from_slice(&record.encode().unwrap()).unwrap();
        assert_eq!(
            value,
            json!({"operation": "pull", "request_id": "r-42", "status": 110})
        );
        assert_eq!(record.operation(), "pull");
    }

    #[test]
    fn test_decode_on_reporting_side() {
        let payload = br#"{"operation":"push","status":103,"flag":"F","adjunct":"AAEC"}"#;
        let record = ResultRecord::decode(payload).unwrap();
        match record {
            ResultRecord::Deposit {
                status, adjunct, ..
            } => {
                assert_eq!(status, ResultCode::Mumble);
                assert_eq!(adjunct.as_bytes(), &[0u8, 1, 2]);
            }
            other => panic!("Expected deposit record, got {other:?}"),
        }
    }
}
