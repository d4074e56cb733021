//! 电池电压换算
//!
//! 输入为已滤波的通道值 (0 ~ ANALOG_SPAN - 1), 输出单位为 10mV。

use crate::config::{ADC_VREF_PREC2, ANALOG_SCALE};

/// 主电池分压换算方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BatteryScaling {
    /// `ana * scale * (128 + 校准值) / divider + drop`
    ///
    /// `drop` 为防反接二极管的压降补偿。
    Scaled { scale: u32, divider: u32, drop: u32 },
    /// `ana * (1000 + 校准值) / divider`
    Divider { divider: u32 },
}

/// 主电池电压
pub fn battery_voltage(ana: u16, calibration: i8, scaling: BatteryScaling) -> u16 {
    let ana = i32::from(ana);
    let calibration = i32::from(calibration);

    let voltage = match scaling {
        BatteryScaling::Scaled {
            scale,
            divider,
            drop,
        } => ana * scale as i32 * (128 + calibration) / divider as i32 + drop as i32,
        BatteryScaling::Divider { divider } => ana * (1000 + calibration) / divider as i32,
    };

    voltage.clamp(0, i32::from(u16::MAX)) as u16
}

/// RTC 备用电池电压
pub fn rtc_battery_voltage(ana: u16) -> u16 {
    (u32::from(ana) * ADC_VREF_PREC2 / (2048 >> ANALOG_SCALE)) as u16
}
