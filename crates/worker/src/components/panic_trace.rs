use std::backtrace::Backtrace;
use std::future::Future;
use std::sync::{Arc, Mutex, Once};

tokio::task_local! {
    static PANIC_TRACE: Arc<Mutex<Option<String>>>;
}

static INSTALL_HOOK: Once = Once::new();

/// 操作任务内panic时的调用栈
///
/// panic hook只在 `scope` 包裹的任务内记录调用栈，其余panic交给原有的hook处理。
#[derive(Default)]
pub(crate) struct PanicTrace {
    slot: Arc<Mutex<Option<String>>>,
}

impl PanicTrace {
    pub(crate) fn new() -> Self {
        install_hook();
        Self::default()
    }

    pub(crate) fn scope<F: Future>(&self, future: F) -> impl Future<Output = F::Output> {
        PANIC_TRACE.scope(Arc::clone(&self.slot), future)
    }

    pub(crate) fn take(&self) -> Option<String> {
        self.slot.lock().ok().and_then(|mut trace| trace.take())
    }
}

fn install_hook() {
    INSTALL_HOOK.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let recorded = PANIC_TRACE.try_with(|slot| {
                if let Ok(mut trace) = slot.lock() {
                    *trace = Some(Backtrace::force_capture().to_string());
                }
            });
            if recorded.is_err() {
                previous(info);
            }
        }));
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_trace_of_panicking_task() {
        let trace = PanicTrace::new();
        let result = tokio::spawn(trace.scope(async {
            let empty: Vec<u8> = Vec::new();
            empty[1]
        }))
        .await;

        assert!(result.unwrap_err().is_panic());
        assert!(trace.take().is_some_and(|t| !t.is_empty()));
        assert!(trace.take().is_none());
    }

    #[tokio::test]
    async fn test_nothing_recorded_without_panic() {
        let trace = PanicTrace::new();
        tokio::spawn(trace.scope(async { 1 })).await.unwrap();
        assert!(trace.take().is_none());
    }
}
