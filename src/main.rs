use anyhow::Result;
use checker::run_checker;
use checker_core::UnimplementedOperations;

/// 未接入检查逻辑的默认入口，所有任务都会报告 `INTERNAL_ERROR`
#[tokio::main]
async fn main() -> Result<()> {
    run_checker(UnimplementedOperations).await
}
