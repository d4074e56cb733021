//! 采样驱动
//!
//! 一个采样周期: 启动转换 -> 等待完成 -> 板级后处理。

use nb::block;
use unwrap_infallible::UnwrapInfallible;

use crate::config::{NUM_ANALOGS, NUM_STICKS};

use super::backend::AdcBackend;
use super::AdcError;

/// 板级后处理
///
/// 默认实现表示板上没有对应硬件。
pub trait AnalogBoard {
    /// 电池电压测量桥是否开启
    fn is_vbat_bridge_enabled(&self) -> bool {
        false
    }

    /// 关闭电池电压测量桥
    fn disable_vbat_bridge(&mut self) {}

    /// 外置摇杆数字化器（霍尔摇杆、PWM 摇杆）的读数, 12 位
    ///
    /// 返回 `Some` 时替换 ADC 转换结果。
    fn external_stick(&mut self, _index: usize) -> Option<u16> {
        None
    }
}

/// 无板级后处理
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBoard;

impl AnalogBoard for NoBoard {}

/// 采样驱动, 持有当前后端与原始采样值
pub struct Sampler<B, H> {
    backend: Option<B>,
    board: H,
    samples: [u16; NUM_ANALOGS],
}

impl<B: AdcBackend, H: AnalogBoard> Sampler<B, H> {
    pub fn new(board: H) -> Self {
        Self {
            backend: None,
            board,
            samples: [0; NUM_ANALOGS],
        }
    }

    /// 注册后端, 覆盖之前的后端
    ///
    /// 后端初始化失败时清空当前后端, 之后的采样都将失败。
    pub fn register(&mut self, mut backend: B) -> Result<(), AdcError> {
        self.backend = None;
        match backend.init() {
            Ok(()) => {
                self.backend = Some(backend);
                Ok(())
            }
            Err(err) => {
                error!("adc backend init failed: {}", err);
                Err(AdcError::InitFailed)
            }
        }
    }

    /// 是否已注册后端
    pub fn is_registered(&self) -> bool {
        self.backend.is_some()
    }

    /// 当前后端
    pub fn backend(&self) -> Option<&B> {
        self.backend.as_ref()
    }

    /// 当前后端
    pub fn backend_mut(&mut self) -> Option<&mut B> {
        self.backend.as_mut()
    }

    /// 板级接口
    pub fn board(&self) -> &H {
        &self.board
    }

    /// 板级接口
    pub fn board_mut(&mut self) -> &mut H {
        &mut self.board
    }

    /// 最近一次的原始采样值
    pub fn samples(&self) -> &[u16; NUM_ANALOGS] {
        &self.samples
    }

    /// 单次转换
    fn single_read(&mut self) -> Result<(), AdcError> {
        let backend = self.backend.as_mut().ok_or(AdcError::NoBackend)?;

        backend.start_conversion()?;
        block!(backend.wait_completion(&mut self.samples)).unwrap_infallible();

        Ok(())
    }

    /// 完整的采样周期
    ///
    /// 失败时原始采样值保持不变; 板级后处理总会执行。
    pub fn read(&mut self) -> Result<(), AdcError> {
        let result = self.single_read();

        if self.board.is_vbat_bridge_enabled() {
            self.board.disable_vbat_bridge();
        }

        for index in 0..NUM_STICKS {
            if let Some(value) = self.board.external_stick(index) {
                self.samples[index] = value;
            }
        }

        result
    }
}
