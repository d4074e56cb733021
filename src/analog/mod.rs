//! # 模拟输入
//!
//! 摇杆、旋钮、滑块以及电池电压的采样与信号调理:
//!
//! 采样驱动 -> 原始值 -> 防抖滤波 (逐通道) -> 多段开关映射 -> 对外输出的通道值;
//! 电池电压由滤波值单独换算。
//!
//! 全部状态由 [`AnalogInputs`] 持有, 只在采样任务中写入。
//! 其它任务通过每个周期末尾发布的 [`AnalogSnapshot`] 读取结果。

pub mod backend;
pub mod diagnostics;
pub mod driver;
pub mod jitter;
pub mod multipos;
pub mod settings;
pub mod voltage;

#[cfg(test)]
mod mock;

use core::fmt;

use crate::config::{
    ANALOG_LAYOUT, ANALOG_MULTIPLIER, ANALOG_SCALE, BATTERY_SCALING, JITTER_ALPHA, NUM_ANALOGS,
    TX_RTC_VOLTAGE, TX_VOLTAGE,
};
use crate::time::TimeSource;

pub use backend::{AdcBackend, ChannelReader, OneShotBackend};
pub use diagnostics::{DebugTimer, JitterMonitor};
pub use driver::{AnalogBoard, NoBoard, Sampler};
pub use jitter::{JitterFilter, JitterMeter};
pub use multipos::StepsCalibration;
pub use settings::{AnalogKind, AnalogSettings, JitterFilterMode, PotType};

/// 按全局配置实例化的防抖滤波器
pub type AnalogFilter = JitterFilter<JITTER_ALPHA, ANALOG_MULTIPLIER>;

/// 采样错误
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AdcError {
    /// 未注册后端
    NoBackend,
    /// 后端初始化失败
    InitFailed,
    /// 启动转换失败
    StartFailed,
}

impl fmt::Display for AdcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdcError::NoBackend => f.write_str("no adc backend registered"),
            AdcError::InitFailed => f.write_str("adc backend init failed"),
            AdcError::StartFailed => f.write_str("adc conversion start failed"),
        }
    }
}

/// 一个采样周期的结果快照
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AnalogSnapshot {
    /// 各通道输出值: 0 ~ ANALOG_SPAN - 1
    pub values: [u16; NUM_ANALOGS],
    /// 主电池电压, 单位 10mV
    pub battery: u16,
    /// RTC 电池电压, 单位 10mV
    pub rtc_battery: u16,
    /// 本周期采样是否成功
    pub fresh: bool,
}

/// 模拟输入采集
pub struct AnalogInputs<B, H> {
    sampler: Sampler<B, H>,
    filters: [AnalogFilter; NUM_ANALOGS],
    layout: [AnalogKind; NUM_ANALOGS],
    settings: AnalogSettings,
    jitter: JitterMonitor,
    timer: DebugTimer,
    last_result: Result<(), AdcError>,
}

impl<B: AdcBackend, H: AnalogBoard> AnalogInputs<B, H> {
    /// 使用 [`ANALOG_LAYOUT`] 与默认设置创建
    pub fn new(board: H) -> Self {
        Self::with_layout(board, ANALOG_LAYOUT)
    }

    pub fn with_layout(board: H, layout: [AnalogKind; NUM_ANALOGS]) -> Self {
        Self {
            sampler: Sampler::new(board),
            filters: [AnalogFilter::new(); NUM_ANALOGS],
            layout,
            settings: AnalogSettings::default(),
            jitter: JitterMonitor::new(),
            timer: DebugTimer::new(),
            last_result: Err(AdcError::NoBackend),
        }
    }

    /// 注册采样后端
    pub fn register_backend(&mut self, backend: B) -> Result<(), AdcError> {
        self.sampler.register(backend)
    }

    pub fn sampler(&self) -> &Sampler<B, H> {
        &self.sampler
    }

    pub fn sampler_mut(&mut self) -> &mut Sampler<B, H> {
        &mut self.sampler
    }

    pub fn settings(&self) -> &AnalogSettings {
        &self.settings
    }

    /// 设置只应在两个采样周期之间修改
    pub fn settings_mut(&mut self) -> &mut AnalogSettings {
        &mut self.settings
    }

    pub fn jitter_monitor(&self) -> &JitterMonitor {
        &self.jitter
    }

    pub fn jitter_monitor_mut(&mut self) -> &mut JitterMonitor {
        &mut self.jitter
    }

    /// 采样耗时统计
    pub fn debug_timer(&self) -> &DebugTimer {
        &self.timer
    }

    /// 非旋钮通道总是可用, 旋钮/滑块需已安装
    fn is_available(&self, index: usize) -> bool {
        !self.layout[index].is_pot() || self.settings.radio.pots[index] != PotType::None
    }

    /// 通道是否为多段开关
    fn is_multipos(&self, index: usize) -> bool {
        self.layout[index].is_pot() && self.settings.radio.pots[index] == PotType::Multipos
    }

    /// 通道原始采样值, 12 位
    ///
    /// 未安装的旋钮/滑块固定返回 0: 悬空的输入会跟随相邻通道变化, 产生虚假读数。
    pub fn analog_value(&self, index: usize) -> u16 {
        if !self.is_available(index) {
            return 0;
        }
        self.sampler.samples()[index]
    }

    /// 执行一个采样周期
    ///
    /// 失败时保留上一周期的通道值。
    pub fn run_cycle(&mut self) -> Result<(), AdcError> {
        let result = self.sampler.read();
        self.process(result)
    }

    /// 执行一个采样周期, 同时记录采样耗时并推进抖动统计窗口
    pub fn run_cycle_timed<T: TimeSource>(&mut self, clock: &T) -> Result<(), AdcError> {
        self.jitter.poll(clock.now_ms());

        self.timer.start(clock.now_us());
        let result = self.sampler.read();
        self.timer.stop(clock.now_us());

        self.process(result)
    }

    fn process(&mut self, result: Result<(), AdcError>) -> Result<(), AdcError> {
        self.last_result = result;
        if let Err(err) = result {
            warn!("adc read failed: {}", err);
            return Err(err);
        }

        let use_jitter_filter = self.settings.use_jitter_filter();

        for index in 0..NUM_ANALOGS {
            let v = self.analog_value(index) >> (1 - ANALOG_SCALE);

            let filter = &mut self.filters[index];
            filter.update(v, use_jitter_filter);
            self.jitter
                .measure(index, v / ANALOG_MULTIPLIER as u16, filter.ana_in());

            if !self.is_multipos(index) {
                continue;
            }
            let calib = &self.settings.radio.calib[index];
            if calib.is_calibrated() {
                let filter = &mut self.filters[index];
                let snapped = calib.snap(filter.ana_in(), AnalogFilter::MAX_ACCUMULATOR);
                filter.set_accumulator(snapped);
            }
        }

        Ok(())
    }

    /// 通道输出值: 0 ~ ANALOG_SPAN - 1
    pub fn ana_in(&self, index: usize) -> u16 {
        self.filters[index].ana_in()
    }

    /// 全部通道输出值
    pub fn values(&self) -> [u16; NUM_ANALOGS] {
        core::array::from_fn(|index| self.ana_in(index))
    }

    /// 主电池电压, 单位 10mV
    ///
    /// 使用滤波后的值。
    pub fn battery_voltage(&self) -> u16 {
        voltage::battery_voltage(
            self.ana_in(TX_VOLTAGE),
            self.settings.radio.tx_voltage_calibration,
            BATTERY_SCALING,
        )
    }

    /// RTC 电池电压, 单位 10mV
    pub fn rtc_battery_voltage(&self) -> u16 {
        voltage::rtc_battery_voltage(self.ana_in(TX_RTC_VOLTAGE))
    }

    /// 当前结果快照
    pub fn snapshot(&self) -> AnalogSnapshot {
        AnalogSnapshot {
            values: self.values(),
            battery: self.battery_voltage(),
            rtc_battery: self.rtc_battery_voltage(),
            fresh: self.last_result.is_ok(),
        }
    }
}
