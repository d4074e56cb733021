//! 时间源
//!
//! 采样计时与抖动统计只依赖 [`TimeSource`], 固件使用 DWT 周期计数器,
//! 主机测试使用 [`MockTime`]。

use core::cell::Cell;

/// 时间源
pub trait TimeSource {
    /// 上电以来的微秒数
    fn now_us(&self) -> u64;

    /// 上电以来的毫秒数
    fn now_ms(&self) -> u64 {
        self.now_us() / 1000
    }

    /// 距参考时刻经过的微秒数
    fn elapsed_since(&self, reference_us: u64) -> u64 {
        self.now_us().saturating_sub(reference_us)
    }
}

/// 可手动推进的时间源
#[derive(Clone, Default)]
pub struct MockTime {
    current_us: Cell<u64>,
}

impl MockTime {
    pub fn new() -> Self {
        Self::default()
    }

    /// 前进 `us` 微秒
    pub fn advance(&self, us: u64) {
        self.current_us.set(self.current_us.get() + us);
    }

    /// 前进 `ms` 毫秒
    pub fn advance_ms(&self, ms: u64) {
        self.advance(ms * 1000);
    }

    /// 直接设置当前时刻
    pub fn set(&self, us: u64) {
        self.current_us.set(us);
    }
}

impl TimeSource for MockTime {
    fn now_us(&self) -> u64 {
        self.current_us.get()
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn mock_time_advances() {
        let time = MockTime::new();
        assert_eq!(time.now_us(), 0);

        time.advance(1500);
        assert_eq!(time.now_us(), 1500);
        assert_eq!(time.now_ms(), 1);

        time.advance_ms(2);
        assert_eq!(time.now_ms(), 3);
        assert_eq!(time.elapsed_since(1500), 2000);
        assert_eq!(time.elapsed_since(10_000), 0);
    }
}
