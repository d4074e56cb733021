//! 采样诊断: 计时与抖动统计

use crate::config::{JITTER_RESET_PERIOD_MS, NUM_ANALOGS};

use super::jitter::JitterMeter;

/// 采样耗时统计, 单位微秒
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DebugTimer {
    started_us: Option<u64>,
    last_us: u32,
    max_us: u32,
}

impl DebugTimer {
    pub const fn new() -> Self {
        Self {
            started_us: None,
            last_us: 0,
            max_us: 0,
        }
    }

    pub fn start(&mut self, now_us: u64) {
        self.started_us = Some(now_us);
    }

    /// 结束计时; 未开始时忽略
    pub fn stop(&mut self, now_us: u64) {
        if let Some(started) = self.started_us.take() {
            let elapsed = now_us.saturating_sub(started);
            self.last_us = u32::try_from(elapsed).unwrap_or(u32::MAX);
            self.max_us = self.max_us.max(self.last_us);
        }
    }

    /// 最近一次耗时
    pub fn last(&self) -> u32 {
        self.last_us
    }

    /// 最大耗时
    pub fn max(&self) -> u32 {
        self.max_us
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

/// 各通道抖动统计
///
/// 分别统计滤波前后的抖动, 每 [`JITTER_RESET_PERIOD_MS`] 锁存一次。
#[derive(Debug, Clone, Default)]
pub struct JitterMonitor {
    active: bool,
    next_reset_ms: u64,
    raw: [JitterMeter; NUM_ANALOGS],
    filtered: [JitterMeter; NUM_ANALOGS],
}

impl JitterMonitor {
    pub const fn new() -> Self {
        Self {
            active: false,
            next_reset_ms: 0,
            raw: [JitterMeter::new(); NUM_ANALOGS],
            filtered: [JitterMeter::new(); NUM_ANALOGS],
        }
    }

    /// 开启/关闭统计, 开启时重新开始统计窗口
    pub fn set_active(&mut self, active: bool) {
        if active && !self.active {
            *self = Self::new();
        }
        self.active = active;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// 到达窗口末尾时锁存全部通道
    pub fn poll(&mut self, now_ms: u64) {
        if !self.active || now_ms < self.next_reset_ms {
            return;
        }

        for meter in self.raw.iter_mut().chain(self.filtered.iter_mut()) {
            meter.reset();
        }
        self.next_reset_ms = now_ms + JITTER_RESET_PERIOD_MS;
    }

    /// 记录通道 `index` 的滤波前后的值 (同一量程)
    pub fn measure(&mut self, index: usize, raw: u16, filtered: u16) {
        if !self.active {
            return;
        }
        self.raw[index].measure(raw);
        self.filtered[index].measure(filtered);
    }

    /// 上一窗口的滤波前抖动
    pub fn raw_jitter(&self, index: usize) -> u16 {
        self.raw[index].get()
    }

    /// 上一窗口的滤波后抖动
    pub fn filtered_jitter(&self, index: usize) -> u16 {
        self.filtered[index].get()
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn debug_timer_tracks_last_and_max() {
        let mut timer = DebugTimer::new();

        // 未开始时 stop 无效
        timer.stop(100);
        assert_eq!(timer.last(), 0);

        timer.start(1_000);
        timer.stop(1_250);
        assert_eq!(timer.last(), 250);
        assert_eq!(timer.max(), 250);

        timer.start(2_000);
        timer.stop(2_100);
        assert_eq!(timer.last(), 100);
        assert_eq!(timer.max(), 250);

        timer.reset();
        assert_eq!(timer.max(), 0);
    }

    #[test]
    fn monitor_latches_once_per_window() {
        let mut monitor = JitterMonitor::new();

        // 未开启时不统计
        monitor.measure(0, 10, 10);
        monitor.poll(0);
        assert_eq!(monitor.raw_jitter(0), 0);

        monitor.set_active(true);
        // 首次轮询开启第一个窗口
        monitor.poll(0);
        for (raw, filtered) in [(1000, 1001), (1008, 1002), (996, 1001)] {
            monitor.measure(2, raw, filtered);
        }

        // 窗口未结束
        monitor.poll(999);
        assert_eq!(monitor.raw_jitter(2), 0);

        monitor.poll(1000);
        assert_eq!(monitor.raw_jitter(2), 12);
        assert_eq!(monitor.filtered_jitter(2), 1);
        assert_eq!(monitor.raw_jitter(0), 0);

        monitor.measure(2, 1000, 1000);
        monitor.poll(2000);
        assert_eq!(monitor.raw_jitter(2), 0);
    }
}
