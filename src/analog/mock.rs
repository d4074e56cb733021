//! 主机测试用的后端与板级实现

use core::convert::Infallible;

use crate::config::{NUM_ANALOGS, NUM_STICKS};

use super::{AdcBackend, AdcError, AnalogBoard};

/// 可控的采样后端, 记录各操作的调用次数
pub struct MockBackend {
    pub values: [u16; NUM_ANALOGS],
    pub init_ok: bool,
    pub start_ok: bool,
    /// 每次转换需要轮询的次数
    pub busy_polls: u8,
    pending: u8,
    pub inits: usize,
    pub starts: usize,
    pub waits: usize,
}

impl MockBackend {
    pub fn with_values(values: [u16; NUM_ANALOGS]) -> Self {
        Self {
            values,
            init_ok: true,
            start_ok: true,
            busy_polls: 0,
            pending: 0,
            inits: 0,
            starts: 0,
            waits: 0,
        }
    }
}

impl AdcBackend for MockBackend {
    fn init(&mut self) -> Result<(), AdcError> {
        self.inits += 1;
        if self.init_ok {
            Ok(())
        } else {
            Err(AdcError::InitFailed)
        }
    }

    fn start_conversion(&mut self) -> Result<(), AdcError> {
        self.starts += 1;
        if !self.start_ok {
            return Err(AdcError::StartFailed);
        }
        self.pending = self.busy_polls;
        Ok(())
    }

    fn wait_completion(&mut self, samples: &mut [u16; NUM_ANALOGS]) -> nb::Result<(), Infallible> {
        self.waits += 1;
        if self.pending > 0 {
            self.pending -= 1;
            return Err(nb::Error::WouldBlock);
        }
        *samples = self.values;
        Ok(())
    }
}

/// 只使用默认操作的后端
pub struct PlainBackend;

impl AdcBackend for PlainBackend {}

/// 带测量桥与外置摇杆的板子
#[derive(Default)]
pub struct MockBoard {
    pub bridge_enabled: bool,
    pub bridge_disables: usize,
    pub sticks: Option<[u16; NUM_STICKS]>,
}

impl AnalogBoard for MockBoard {
    fn is_vbat_bridge_enabled(&self) -> bool {
        self.bridge_enabled
    }

    fn disable_vbat_bridge(&mut self) {
        self.bridge_enabled = false;
        self.bridge_disables += 1;
    }

    fn external_stick(&mut self, index: usize) -> Option<u16> {
        self.sticks.map(|sticks| sticks[index])
    }
}
