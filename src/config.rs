//! 全局配置

use crate::analog::settings::AnalogKind;
use crate::analog::voltage::BatteryScaling;

/// 摇杆数量
pub const NUM_STICKS: usize = 4;
/// 旋钮数量（含多段开关）
pub const NUM_POTS: usize = 3;
/// 滑块数量
pub const NUM_SLIDERS: usize = 1;
/// 模拟通道总数: 摇杆 + 旋钮 + 滑块 + 主电池 + RTC 电池
pub const NUM_ANALOGS: usize = NUM_STICKS + NUM_POTS + NUM_SLIDERS + 2;

/// 主电池电压通道
pub const TX_VOLTAGE: usize = NUM_ANALOGS - 2;
/// RTC 备用电池电压通道
pub const TX_RTC_VOLTAGE: usize = NUM_ANALOGS - 1;

/// 通道硬件布局, 下标即 ADC 通道号
pub const ANALOG_LAYOUT: [AnalogKind; NUM_ANALOGS] = [
    // PA0-PA3 摇杆
    AnalogKind::Stick,
    AnalogKind::Stick,
    AnalogKind::Stick,
    AnalogKind::Stick,
    // PA4、PA5 旋钮 S1、S2
    AnalogKind::Pot,
    AnalogKind::Pot,
    // PA6 六段开关
    AnalogKind::Pot,
    // PA7 滑块
    AnalogKind::Slider,
    // PB0 主电池分压
    AnalogKind::MainBattery,
    // PB1 RTC 电池
    AnalogKind::RtcBattery,
];

/// 摇杆行程半幅
pub const RESX: u32 = 1024;
/// 通道输出量程: 0 ~ 2 * RESX - 1
pub const ANALOG_SPAN: u32 = 2 * RESX;

/// 过采样位数, 取值 0 或 1
/// ADC 为 12 位, 即 ANALOG_SPAN << 1
pub const ANALOG_SCALE: u32 = 1;
/// 过采样倍数
pub const ANALOG_MULTIPLIER: u32 = 1 << ANALOG_SCALE;

/// 防抖滤波强度, ALPHA = 2^强度
pub const JITTER_FILTER_STRENGTH: u32 = 4;
/// 防抖滤波系数
pub const JITTER_ALPHA: u32 = 1 << JITTER_FILTER_STRENGTH;

// 累加器为 16 位, 两者之和不能超过 5
const _: () = assert!(
    JITTER_ALPHA * ANALOG_MULTIPLIER <= 32,
    "JITTER_FILTER_STRENGTH 与 ANALOG_SCALE 之和需 <= 5"
);
const _: () = assert!(ANALOG_SCALE <= 1, "ADC 仅 12 位, ANALOG_SCALE 最大为 1");

/// 多段开关校准最大分段数
pub const MULTIPOS_MAX_STEPS: usize = 5;
/// 多段开关阈值的分辨率: 滤波值右移位数
pub const MULTIPOS_SHIFT: u32 = 4;

/// 主电池换算方式, 单位 10mV
/// 分压 30k/10k, 满量程约 13.2V; 防反接二极管压降 0.45V
pub const BATTERY_SCALING: BatteryScaling = BatteryScaling::Scaled {
    scale: 150,
    divider: 29775,
    drop: 45,
};

/// ADC 参考电压, 单位 10mV
pub const ADC_VREF_PREC2: u32 = 330;

/// ADC 采样周期, 单位毫秒
pub const ADC_TICK_MS: u32 = 10;

/// 抖动统计窗口, 单位毫秒
pub const JITTER_RESET_PERIOD_MS: u64 = 1000;
