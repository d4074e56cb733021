//! # 遥控器模拟输入采集
//!
//! 摇杆、旋钮、多段开关、滑块与电池电压的采样、防抖滤波和校准映射。
//! 信号调理部分与硬件无关, 可在主机上测试;
//! `firmware` 特性提供 STM32F103 的板级实现。
#![cfg_attr(not(test), no_std)]

mod fmt;

pub mod analog;
pub mod config;
pub mod time;

#[cfg(feature = "firmware")]
pub mod hardware;

#[cfg(feature = "firmware")]
use defmt_rtt as _;
// global logger
#[cfg(feature = "firmware")]
use panic_probe as _;
// memory layout
#[cfg(feature = "firmware")]
use stm32f1xx_hal as _;

// 引脚分配
// 备注*的引脚为 ADC 输入, 不可替换
#[allow(unused)]
enum _Pin {
    // 摇杆 ADC1_IN0-IN3
    PA0, // *
    PA1, // *
    PA2, // *
    PA3, // *

    // 旋钮 S1、S2 ADC1_IN4、IN5
    PA4, // *
    PA5, // *

    // 六段开关 ADC1_IN6
    PA6, // *

    // 滑块 ADC1_IN7
    PA7, // *

    // 主电池分压 ADC1_IN8
    PB0, // *
    // RTC 电池 ADC1_IN9
    PB1, // *

    // 电池测量桥使能
    PB5,

    // 调试口 SWD
    PA13,
    PA14,
}
