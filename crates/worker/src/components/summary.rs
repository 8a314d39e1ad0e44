use std::fmt::Display;

use checker_core::{Job, ResultRecord};

use super::timing::{format_seconds, JobTimings};

/// pull摘要中adjunct保留的base64字符数
pub const PULL_ADJUNCT_PREVIEW: usize = 16;

const MISSING: &str = "?";

fn or_missing<T: Display>(value: Option<T>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| MISSING.to_string())
}

/// 任务处理完成后的单行摘要
///
/// 只做字符串拼接，元数据缺失时以 `?` 代替，不会失败。
pub fn summary_line(job: &Job, record: &ResultRecord, timings: &JobTimings) -> String {
    let metadata = &job.metadata;
    let round = or_missing(metadata.round);
    let service = or_missing(metadata.service_name.as_deref());
    let team = or_missing(metadata.team_name.as_deref());
    let delivery = format_seconds(timings.delivery_seconds);
    let processing = format_seconds(timings.processing_seconds);

    match record {
        ResultRecord::Deposit {
            status, adjunct, ..
        } => format!(
            "PUSH flag {} (round {}, service {}, team {}) to {}: result {}, adjunct {}, delivery {}s, processing {}s",
            job.flag,
            round,
            service,
            team,
            job.endpoint,
            status.name(),
            adjunct,
            delivery,
            processing
        ),
        ResultRecord::Retrieve { request_id, status } => format!(
            "PULL flag {} (round {}, service {}, team {}) from {} with adjunct {}: result {}, request {}, delivery {}s, processing {}s",
            job.flag,
            round,
            service,
            team,
            job.endpoint,
            job.adjunct.truncated(PULL_ADJUNCT_PREVIEW),
            status.name(),
            request_id,
            delivery,
            processing
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use checker_core::{Adjunct, JobKind, JobMetadata, ResultCode};

    fn timings() -> JobTimings {
        JobTimings {
            delivery_seconds: 2.004,
            processing_seconds: 0.5,
        }
    }

    fn job(kind: JobKind, adjunct: &[u8], metadata: JobMetadata) -> Job {
        Job {
            kind,
            endpoint: "10.0.0.5:7777".to_string(),
            flag: "FLAG_abc".to_string(),
            adjunct: Adjunct::new(adjunct.to_vec()),
            metadata,
        }
    }

    fn metadata() -> JobMetadata {
        JobMetadata {
            timestamp: None,
            round: Some(3),
            service_name: Some("svc".to_string()),
            team_name: Some("teamA".to_string()),
        }
    }

    #[test]
    fn test_push_summary() {
        let job = job(JobKind::Deposit, b"", metadata());
        let record = ResultRecord::Deposit {
            status: ResultCode::Up,
            flag: job.flag.clone(),
            adjunct: Adjunct::new(b"XYZ123".to_vec()),
        };

        assert_eq!(
            summary_line(&job, &record, &timings()),
            "PUSH flag FLAG_abc (round 3, service svc, team teamA) to 10.0.0.5:7777: \
             result UP, adjunct WFlaMTIz, delivery 2.00s, processing 0.50s"
        );
    }

    #[test]
    fn test_pull_summary_truncates_adjunct() {
        let job = job(
            JobKind::Retrieve {
                request_id: "r-42".to_string(),
            },
            &[0u8; 32],
            metadata(),
        );
        let record = ResultRecord::Retrieve {
            request_id: "r-42".to_string(),
            status: ResultCode::InternalError,
        };

        let line = summary_line(&job, &record, &timings());
        assert!(line.starts_with("PULL flag FLAG_abc"));
        assert!(line.contains("with adjunct AAAAAAAAAAAAAAAA...:"));
        assert!(line.contains("result INTERNAL_ERROR, request r-42"));
    }

    #[test]
    fn test_missing_metadata_renders_placeholder() {
        let job = job(JobKind::Deposit, b"", JobMetadata::default());
        let record = ResultRecord::Deposit {
            status: ResultCode::Down,
            flag: job.flag.clone(),
            adjunct: Adjunct::default(),
        };

        let line = summary_line(&job, &record, &timings());
        assert!(line.contains("(round ?, service ?, team ?)"));
        assert!(line.contains("result DOWN"));
    }
}
