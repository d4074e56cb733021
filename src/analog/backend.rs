//! ADC 采样后端
//!
//! 采样驱动只通过 [`AdcBackend`] 调用硬件, 未实现的操作默认为空操作。

use core::convert::Infallible;

use crate::config::NUM_ANALOGS;

use super::AdcError;

/// ADC 采样后端
pub trait AdcBackend {
    /// 初始化, 注册时调用; 失败则后端不会被启用
    fn init(&mut self) -> Result<(), AdcError> {
        Ok(())
    }

    /// 启动一次转换
    fn start_conversion(&mut self) -> Result<(), AdcError> {
        Ok(())
    }

    /// 等待转换完成, 并把结果写入 `samples`
    ///
    /// 转换未完成时返回 `WouldBlock`, 由驱动轮询。
    fn wait_completion(&mut self, _samples: &mut [u16; NUM_ANALOGS]) -> nb::Result<(), Infallible> {
        Ok(())
    }
}

/// 单通道单次转换
///
/// 与 embedded-hal `OneShot` 对应, 按通道号读取一次转换结果。
pub trait ChannelReader {
    type Error;

    /// 读取通道 `index`
    fn read_channel(&mut self, index: usize) -> nb::Result<u16, Self::Error>;
}

/// 逐通道单次转换的后端
///
/// 启动时复位通道游标, 等待时依次读取全部通道。
/// 某通道转换出错时保留该通道上一次的采样值。
pub struct OneShotBackend<R> {
    reader: R,
    cursor: usize,
}

impl<R: ChannelReader> OneShotBackend<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            cursor: NUM_ANALOGS,
        }
    }

    /// 取回通道读取器
    pub fn release(self) -> R {
        self.reader
    }
}

impl<R: ChannelReader> AdcBackend for OneShotBackend<R> {
    fn start_conversion(&mut self) -> Result<(), AdcError> {
        self.cursor = 0;
        Ok(())
    }

    fn wait_completion(&mut self, samples: &mut [u16; NUM_ANALOGS]) -> nb::Result<(), Infallible> {
        while self.cursor < NUM_ANALOGS {
            match self.reader.read_channel(self.cursor) {
                Ok(value) => samples[self.cursor] = value,
                Err(nb::Error::WouldBlock) => return Err(nb::Error::WouldBlock),
                Err(nb::Error::Other(_)) => {
                    warn!("adc channel {} conversion failed", self.cursor);
                }
            }
            self.cursor += 1;
        }
        Ok(())
    }
}
