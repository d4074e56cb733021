//! ADC1 通道读取
//!
//! 通道号与 ADC1_INx 一一对应, 见 [`crate::config::ANALOG_LAYOUT`]。

use embedded_hal::adc::OneShot;
use stm32f1xx_hal::{
    adc::{Adc, SampleTime},
    gpio::{Analog, PA0, PA1, PA2, PA3, PA4, PA5, PA6, PA7, PB0, PB1},
    pac::ADC1,
};

use crate::analog::ChannelReader;

/// 模拟输入引脚
pub struct AdcPins {
    pub pa0: PA0<Analog>,
    pub pa1: PA1<Analog>,
    pub pa2: PA2<Analog>,
    pub pa3: PA3<Analog>,
    pub pa4: PA4<Analog>,
    pub pa5: PA5<Analog>,
    pub pa6: PA6<Analog>,
    pub pa7: PA7<Analog>,
    pub pb0: PB0<Analog>,
    pub pb1: PB1<Analog>,
}

/// ADC1 单次转换读取器
pub struct Adc1Reader {
    adc: Adc<ADC1>,
    pins: AdcPins,
}

impl Adc1Reader {
    pub fn new(mut adc: Adc<ADC1>, pins: AdcPins) -> Self {
        // 旋钮与分压电阻内阻较大, 加长采样时间
        adc.set_sample_time(SampleTime::T_55);
        Adc1Reader { adc, pins }
    }

    /// 满量程采样值
    pub fn max_sample(&self) -> u16 {
        self.adc.max_sample()
    }
}

impl ChannelReader for Adc1Reader {
    type Error = ();

    fn read_channel(&mut self, index: usize) -> nb::Result<u16, ()> {
        let pins = &mut self.pins;
        match index {
            0 => self.adc.read(&mut pins.pa0),
            1 => self.adc.read(&mut pins.pa1),
            2 => self.adc.read(&mut pins.pa2),
            3 => self.adc.read(&mut pins.pa3),
            4 => self.adc.read(&mut pins.pa4),
            5 => self.adc.read(&mut pins.pa5),
            6 => self.adc.read(&mut pins.pa6),
            7 => self.adc.read(&mut pins.pa7),
            8 => self.adc.read(&mut pins.pb0),
            9 => self.adc.read(&mut pins.pb1),
            _ => Err(nb::Error::Other(())),
        }
    }
}
