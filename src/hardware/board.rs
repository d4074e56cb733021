//! 电池电压测量桥
//!
//! RTC 电池经由 PB5 控制的测量桥接入 ADC, 测量完成后需关闭以免漏电。

use stm32f1xx_hal::gpio::{self, Output, PushPull, PB5};

use crate::analog::AnalogBoard;

/// 遥控器主板
pub struct TxBoard {
    vbat_bridge: PB5<Output<PushPull>>,
}

impl TxBoard {
    /// 初始化测量桥引脚, 默认关闭
    pub fn new(pb5: PB5, crl: &mut gpio::Cr<'B', false>) -> Self {
        let mut vbat_bridge = pb5.into_push_pull_output(crl);
        vbat_bridge.set_low();

        TxBoard { vbat_bridge }
    }

    /// 开启测量桥
    /// 下一次采样结束后自动关闭
    pub fn enable_vbat_bridge(&mut self) {
        self.vbat_bridge.set_high();
    }
}

impl AnalogBoard for TxBoard {
    fn is_vbat_bridge_enabled(&self) -> bool {
        self.vbat_bridge.is_set_high()
    }

    fn disable_vbat_bridge(&mut self) {
        self.vbat_bridge.set_low();
    }
}
