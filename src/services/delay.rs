//! 查询间等待时间

use std::time::Duration;

use rand::Rng;

/// 计算下一次等待时间（毫秒）
///
/// 不随机时返回 `base_ms`；随机时在 `[base_ms/2, base_ms]` 内均匀取值。
pub fn next_delay(base_ms: u64, jitter_enabled: bool) -> u64 {
    if !jitter_enabled || base_ms == 0 {
        return base_ms;
    }
    // 向上取整，奇数时也不会低于一半
    let floor = base_ms - base_ms / 2;
    rand::thread_rng().gen_range(floor..=base_ms)
}

/// 查询间等待调度器
#[derive(Debug, Clone, Copy)]
pub struct DelayScheduler {
    base_ms: u64,
    jitter_enabled: bool,
}

impl DelayScheduler {
    pub fn new(base_ms: u64, jitter_enabled: bool) -> Self {
        Self {
            base_ms,
            jitter_enabled,
        }
    }

    pub fn next(&self) -> Duration {
        Duration::from_millis(next_delay(self.base_ms, self.jitter_enabled))
    }
}
