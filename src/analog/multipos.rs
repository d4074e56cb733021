//! 多段开关校准
//!
//! 接在旋钮通道上的多段拨档开关, 按校准阈值把连续的滤波值映射为离散档位。

use heapless::Vec;

use crate::config::{MULTIPOS_MAX_STEPS, MULTIPOS_SHIFT};

/// 多段开关校准数据
///
/// 阈值按升序排列, 以滤波值右移 [`MULTIPOS_SHIFT`] 位后的分辨率记录。
/// 阈值是否升序由校准流程保证, 这里不做检查。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StepsCalibration {
    steps: Vec<u8, MULTIPOS_MAX_STEPS>,
}

impl StepsCalibration {
    /// 由阈值创建, 阈值过多时返回 `None`
    pub fn from_steps(steps: &[u8]) -> Option<Self> {
        Vec::from_slice(steps).ok().map(|steps| Self { steps })
    }

    /// 阈值数量
    pub fn count(&self) -> usize {
        self.steps.len()
    }

    /// 阈值
    pub fn steps(&self) -> &[u8] {
        &self.steps
    }

    /// 是否已完成校准
    pub fn is_calibrated(&self) -> bool {
        !self.steps.is_empty()
    }

    /// 档位下标: 第一个大于输入的阈值的下标, 都不大于时为 `count()`
    ///
    /// `value` 为对外输出量程的滤波值。
    pub fn position(&self, value: u16) -> usize {
        let shifted = value >> MULTIPOS_SHIFT;
        self.steps
            .iter()
            .position(|&step| shifted < u16::from(step))
            .unwrap_or(self.steps.len())
    }

    /// 计算档位对应的累加值
    ///
    /// 档位 `i` 映射为 `i * max / count`, 最高档为 `max`。
    pub fn snap(&self, value: u16, max: u16) -> u16 {
        let count = self.steps.len();
        let index = self.position(value);
        if index >= count {
            return max;
        }

        (index as u32 * u32::from(max) / count as u32) as u16
    }
}
