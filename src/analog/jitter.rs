//! # 防抖滤波
//!
//! 大幅变化直接通过, 小幅变化使用修正移动平均 (MMA) 滤波。
//!
//! 常规 MMA 公式为:
//!
//! ```text
//! out = ((ALPHA - 1) * out + in) / ALPHA
//! ```
//!
//! 用整数运算时, 输入的微小变化会在除法中被截断丢失。
//! 因此在两次计算之间保存未除以 ALPHA 的累加值:
//!
//! ```text
//! filtered = filtered - filtered / ALPHA + in
//! out      = filtered / ALPHA
//! ```
//!
//! 输入同时使用过采样 (`MULTIPLIER`) 的量程, 进一步减小残余抖动;
//! 累加器为 16 位, `ALPHA * MULTIPLIER * ANALOG_SPAN` 不得超过 65536。

use crate::config::ANALOG_SPAN;

/// 单通道防抖滤波器
///
/// `ALPHA` 为滤波系数, `MULTIPLIER` 为输入相对输出量程的过采样倍数。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JitterFilter<const ALPHA: u32, const MULTIPLIER: u32> {
    accumulator: u16,
}

impl<const ALPHA: u32, const MULTIPLIER: u32> JitterFilter<ALPHA, MULTIPLIER> {
    const HEADROOM: () = assert!(
        ALPHA > 0 && MULTIPLIER > 0 && ANALOG_SPAN * ALPHA * MULTIPLIER <= 1 << 16,
        "ALPHA * MULTIPLIER 超出 16 位累加器范围"
    );

    /// 最大输入值 (过采样量程)
    pub const MAX_INPUT: u16 = (ANALOG_SPAN * MULTIPLIER - 1) as u16;

    /// 累加器最大值, 多段开关满量程
    pub const MAX_ACCUMULATOR: u16 = (ANALOG_SPAN * ALPHA * MULTIPLIER - 1) as u16;

    /// 小幅变化阈值, 低于该值才进行滤波
    pub const THRESHOLD: u32 = 10 * MULTIPLIER;

    pub const fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let _: () = Self::HEADROOM;
        Self { accumulator: 0 }
    }

    /// 将滤波状态直接置为 `value` (过采样量程)
    pub fn reset(&mut self, value: u16) {
        let value = u32::from(value.min(Self::MAX_INPUT));
        self.accumulator = (value * ALPHA) as u16;
    }

    /// 输入一个新采样值, 返回滤波后的值 (过采样量程)
    ///
    /// `enabled` 为假时不做滤波, 直接采用输入值。
    pub fn update(&mut self, raw: u16, enabled: bool) -> u16 {
        let v = u32::from(raw.min(Self::MAX_INPUT));
        let accumulator = u32::from(self.accumulator);
        let previous = accumulator / ALPHA;
        let diff = v.abs_diff(previous);

        let next = if enabled && diff < Self::THRESHOLD {
            // accumulator >= previous, 结果不超过 MAX_ACCUMULATOR
            accumulator - previous + v
        } else {
            // 丢弃历史, 快速动作不产生延迟
            v * ALPHA
        };
        self.accumulator = next as u16;

        self.value()
    }

    /// 滤波值, 过采样量程
    pub fn value(&self) -> u16 {
        (u32::from(self.accumulator) / ALPHA) as u16
    }

    /// 对外输出值: 0 ~ ANALOG_SPAN - 1
    pub fn ana_in(&self) -> u16 {
        (u32::from(self.accumulator) / (ALPHA * MULTIPLIER)) as u16
    }

    /// 未除以 ALPHA 的累加值
    pub fn accumulator(&self) -> u16 {
        self.accumulator
    }

    /// 覆盖累加值, 超出范围时截断到 [`Self::MAX_ACCUMULATOR`]
    pub fn set_accumulator(&mut self, accumulator: u16) {
        self.accumulator = accumulator.min(Self::MAX_ACCUMULATOR);
    }
}

impl<const ALPHA: u32, const MULTIPLIER: u32> Default for JitterFilter<ALPHA, MULTIPLIER> {
    fn default() -> Self {
        Self::new()
    }
}

/// 抖动测量
///
/// 在一个统计窗口内记录最大、最小值, 复位时锁存两者之差。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct JitterMeter {
    max: u16,
    min: u16,
    measured: u16,
}

impl JitterMeter {
    pub const fn new() -> Self {
        Self {
            max: 0,
            min: u16::MAX,
            measured: 0,
        }
    }

    /// 记录一个值
    pub fn measure(&mut self, value: u16) {
        self.max = self.max.max(value);
        self.min = self.min.min(value);
    }

    /// 锁存本窗口的抖动并开始新窗口
    pub fn reset(&mut self) {
        self.measured = self.max.saturating_sub(self.min);
        self.max = 0;
        self.min = u16::MAX;
    }

    /// 上一个窗口的抖动
    pub fn get(&self) -> u16 {
        self.measured
    }
}

impl Default for JitterMeter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    type Filter = JitterFilter<4, 2>;

    fn converged_at(value: u16) -> Filter {
        let mut filter = Filter::new();
        filter.reset(value);
        filter
    }

    #[test]
    fn limits_follow_parameters() {
        assert_eq!(Filter::THRESHOLD, 20);
        assert_eq!(Filter::MAX_INPUT, 4095);
        assert_eq!(Filter::MAX_ACCUMULATOR, 16383);
        assert_eq!(JitterFilter::<16, 2>::MAX_ACCUMULATOR, u16::MAX);
    }

    #[test]
    fn smooths_small_steps_and_snaps_on_large_step() {
        let mut filter = converged_at(1000);

        let outputs = [1000, 1005, 1002, 1500].map(|raw| filter.update(raw, true));

        assert_eq!(outputs, [1000, 1001, 1001, 1500]);
        assert_eq!(filter.accumulator(), 1500 * 4);
    }

    #[test]
    fn large_step_passes_through_regardless_of_enable() {
        for enabled in [true, false] {
            let mut filter = converged_at(1000);
            assert_eq!(filter.update(1020, enabled), 1020);
            assert_eq!(filter.update(980, enabled), 980);
            assert_eq!(filter.update(4000, enabled), 4000);
        }
    }

    #[test]
    fn disabled_filter_follows_small_steps_exactly() {
        let mut filter = converged_at(1000);
        assert_eq!(filter.update(1005, false), 1005);
        assert_eq!(filter.update(1004, false), 1004);
        assert_eq!(filter.accumulator(), 1004 * 4);
    }

    #[test]
    fn converges_from_offset_start() {
        let mut filter = converged_at(1010);
        let mut last = 0;
        for _ in 0..12 {
            last = filter.update(1000, true);
        }
        assert_eq!(last, 1000);
    }

    #[test]
    fn settles_under_alternating_noise() {
        let mut filter = converged_at(2000);
        for i in 0..200 {
            let raw = if i % 2 == 0 { 2009 } else { 1991 };
            let out = filter.update(raw, true);
            if i >= 50 {
                assert!((1999..=2001).contains(&out), "cycle {}: {}", i, out);
            }
        }

        let mut strong = JitterFilter::<16, 2>::new();
        strong.reset(2000);
        for i in 0..200 {
            let raw = if i % 2 == 0 { 2009 } else { 1991 };
            assert_eq!(strong.update(raw, true), 2000);
        }
    }

    #[test]
    fn idempotent_at_rest() {
        let mut filter = converged_at(1000);
        for _ in 0..50 {
            filter.update(1003, true);
        }
        let settled = filter.value();
        let accumulator = filter.accumulator();
        assert_eq!(settled, 1003);

        for _ in 0..100 {
            assert_eq!(filter.update(1003, true), settled);
        }
        assert_eq!(filter.accumulator(), accumulator);
    }

    #[test]
    fn keeps_single_count_drift() {
        // 直接先除后平均会把 +1 的变化截断掉
        let mut filter = converged_at(1000);
        let outputs = [1001; 4].map(|raw| filter.update(raw, true));
        assert_eq!(outputs, [1000, 1000, 1000, 1001]);
    }

    #[test]
    fn clamps_out_of_range_input() {
        let mut filter = JitterFilter::<16, 2>::new();
        assert_eq!(filter.update(u16::MAX, true), 4095);
        assert_eq!(filter.ana_in(), 2047);
        assert_eq!(filter.accumulator(), 4095 * 16);

        filter.set_accumulator(u16::MAX);
        assert_eq!(filter.update(4095, true), 4095);
        assert_eq!(filter.accumulator(), u16::MAX);
    }

    #[test]
    fn ana_in_is_divided_by_multiplier() {
        let mut filter = Filter::new();
        filter.update(3001, true);
        assert_eq!(filter.value(), 3001);
        assert_eq!(filter.ana_in(), 1500);
    }

    #[test]
    fn jitter_meter_latches_window_span() {
        let mut meter = JitterMeter::new();
        assert_eq!(meter.get(), 0);

        for value in [1000, 1004, 998, 1001] {
            meter.measure(value);
        }
        assert_eq!(meter.get(), 0);

        meter.reset();
        assert_eq!(meter.get(), 6);

        meter.measure(500);
        meter.reset();
        assert_eq!(meter.get(), 0);

        // 空窗口
        meter.reset();
        assert_eq!(meter.get(), 0);
    }
}
