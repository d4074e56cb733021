//! STM32F103 板级实现
pub mod adc;
pub mod board;
pub mod timer;

use crate::analog::{AnalogInputs, OneShotBackend};

/// 本板的模拟输入采集
pub type TxAnalogInputs = AnalogInputs<OneShotBackend<adc::Adc1Reader>, board::TxBoard>;
