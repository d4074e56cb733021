//! 遥控器/模型设置中与模拟输入相关的部分
//!
//! 这些设置由外部存储加载, 在一次采样周期内保持不变。

use crate::config::NUM_ANALOGS;

use super::multipos::StepsCalibration;

/// 通道硬件类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AnalogKind {
    /// 摇杆
    Stick,
    /// 旋钮
    Pot,
    /// 滑块
    Slider,
    /// 主电池电压
    MainBattery,
    /// RTC 备用电池电压
    RtcBattery,
}

impl AnalogKind {
    /// 旋钮或滑块
    pub fn is_pot(self) -> bool {
        matches!(self, AnalogKind::Pot | AnalogKind::Slider)
    }
}

/// 旋钮安装类型, 由遥控器设置决定
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PotType {
    /// 未安装
    None,
    /// 带中位卡点
    #[default]
    WithDetent,
    /// 多段开关
    Multipos,
    /// 无卡点
    WithoutDetent,
}

/// 模型级防抖滤波设置
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum JitterFilterMode {
    /// 跟随遥控器全局设置
    #[default]
    Global,
    /// 强制开启
    On,
    /// 强制关闭
    Off,
}

impl JitterFilterMode {
    /// 合并模型与遥控器设置, 返回是否启用防抖滤波
    ///
    /// 遥控器设置保存的是"关闭"标志, 因此需要取反。
    pub fn resolve(self, no_jitter_filter: bool) -> bool {
        match self {
            JitterFilterMode::Global => !no_jitter_filter,
            JitterFilterMode::On => true,
            JitterFilterMode::Off => false,
        }
    }
}

/// 遥控器全局设置
#[derive(Debug, Clone, PartialEq)]
pub struct RadioSettings {
    /// 关闭防抖滤波
    pub no_jitter_filter: bool,
    /// 主电池电压校准值
    pub tx_voltage_calibration: i8,
    /// 各通道旋钮类型, 非旋钮通道忽略
    pub pots: [PotType; NUM_ANALOGS],
    /// 各通道多段开关校准
    pub calib: [StepsCalibration; NUM_ANALOGS],
}

impl Default for RadioSettings {
    fn default() -> Self {
        Self {
            no_jitter_filter: false,
            tx_voltage_calibration: 0,
            pots: [PotType::default(); NUM_ANALOGS],
            calib: core::array::from_fn(|_| StepsCalibration::default()),
        }
    }
}

/// 模型设置
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModelSettings {
    pub jitter_filter: JitterFilterMode,
}

/// 采样所需的全部设置
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalogSettings {
    pub radio: RadioSettings,
    pub model: ModelSettings,
}

impl AnalogSettings {
    /// 本周期是否启用防抖滤波
    pub fn use_jitter_filter(&self) -> bool {
        self.model.jitter_filter.resolve(self.radio.no_jitter_filter)
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn jitter_mode_resolution() {
        assert!(JitterFilterMode::Global.resolve(false));
        assert!(!JitterFilterMode::Global.resolve(true));
        assert!(JitterFilterMode::On.resolve(true));
        assert!(JitterFilterMode::On.resolve(false));
        assert!(!JitterFilterMode::Off.resolve(false));
        assert!(!JitterFilterMode::Off.resolve(true));
    }

    #[test]
    fn settings_default_to_global_filter_enabled() {
        let mut settings = AnalogSettings::default();
        assert!(settings.use_jitter_filter());

        settings.radio.no_jitter_filter = true;
        assert!(!settings.use_jitter_filter());

        settings.model.jitter_filter = JitterFilterMode::On;
        assert!(settings.use_jitter_filter());
    }
}
