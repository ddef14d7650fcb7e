//! 协作式取消信号

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

/// 外部终止信号，可以克隆后在多处使用
#[derive(Debug, Clone)]
pub struct CancelSignal {
    tx: Arc<watch::Sender<bool>>,
    rx: watch::Receiver<bool>,
}

impl CancelSignal {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            tx: Arc::new(tx),
            rx,
        }
    }

    /// 发出终止信号
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// 等待直到收到终止信号
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        if rx.wait_for(|cancelled| *cancelled).await.is_err() {
            // 发送端随 self 存活，不会走到这里
            futures::future::pending::<()>().await;
        }
    }

    /// 等待 `duration`，期间收到终止信号则提前返回 `false`
    pub async fn sleep(&self, duration: Duration) -> bool {
        tokio::select! {
            _ = tokio::time::sleep(duration) => true,
            _ = self.cancelled() => false,
        }
    }
}

impl Default for CancelSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sleep_completes_without_cancel() {
        let signal = CancelSignal::new();
        assert!(signal.sleep(Duration::from_millis(5)).await);
        assert!(!signal.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancel_interrupts_sleep() {
        let signal = CancelSignal::new();
        let remote = signal.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            remote.cancel();
        });

        let completed = signal.sleep(Duration::from_secs(60)).await;
        assert!(!completed);
        assert!(signal.is_cancelled());
    }
}
