//! Worker指标
//!
//! 指标通过 `metrics` 门面记录，未安装recorder时全部为空操作。

use metrics::{counter, describe_counter, describe_histogram, histogram};

/// 已上报的任务数，按操作和状态区分
pub const JOBS_TOTAL: &str = "checker_jobs_total";

/// 未上报即丢弃的任务数
pub const JOBS_DROPPED: &str = "checker_jobs_dropped_total";

/// 操作逻辑故障次数
pub const JOB_FAULTS: &str = "checker_job_faults_total";

pub const JOB_DELIVERY_SECONDS: &str = "checker_job_delivery_seconds";
pub const JOB_PROCESSING_SECONDS: &str = "checker_job_processing_seconds";

/// 丢弃原因：无法解码
pub const DROP_MALFORMED: &str = "malformed";
/// 丢弃原因：未知操作
pub const DROP_UNKNOWN_OPERATION: &str = "unknown_operation";

/// 注册指标说明，安装recorder后调用一次
pub fn register_metrics() {
    describe_counter!(JOBS_TOTAL, "Total jobs reported, by operation and status");
    describe_counter!(JOBS_DROPPED, "Total jobs dropped without a result record");
    describe_counter!(JOB_FAULTS, "Total operation faults isolated by the dispatcher");
    describe_histogram!(JOB_DELIVERY_SECONDS, "Time from job creation to receipt in seconds");
    describe_histogram!(JOB_PROCESSING_SECONDS, "Time spent processing a job in seconds");
}

pub fn record_job_reported(operation: &str, status: &str, delivery_secs: f64, processing_secs: f64) {
    let labels = [
        ("operation", operation.to_string()),
        ("status", status.to_string()),
    ];
    counter!(JOBS_TOTAL, &labels).increment(1);
    histogram!(JOB_DELIVERY_SECONDS, "operation" => operation.to_string()).record(delivery_secs);
    histogram!(JOB_PROCESSING_SECONDS, "operation" => operation.to_string())
        .record(processing_secs);
}

pub fn record_job_dropped(reason: &'static str) {
    counter!(JOBS_DROPPED, "reason" => reason).increment(1);
}

pub fn record_job_fault(operation: &str) {
    counter!(JOB_FAULTS, "operation" => operation.to_string()).increment(1);
}
