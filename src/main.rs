#![no_std]
#![no_main]
#![feature(type_alias_impl_trait)]

use stm32f103_transmitter::{
    analog::{AnalogInputs, AnalogSnapshot, OneShotBackend},
    config::{ADC_TICK_MS, NUM_STICKS, TX_VOLTAGE},
    hardware::{
        adc::{Adc1Reader, AdcPins},
        board::TxBoard,
        timer::DwtClock,
        TxAnalogInputs,
    },
};

use cortex_m::{asm::wfi, prelude::_embedded_hal_blocking_delay_DelayMs};
use defmt::println;
use rtic_sync::{
    channel::{Receiver, Sender},
    make_channel,
};
use stm32f1xx_hal::timer::SysDelay;
use stm32f1xx_hal::{
    adc::Adc,
    flash::FlashExt,
    prelude::{_fugit_RateExtU32, _stm32_hal_gpio_GpioExt, _stm32_hal_rcc_RccExt},
    timer::SysTimerExt,
};

// 采样快照消息通道
const SNAPSHOT_CAPACITY: usize = 1;

// RTC 电池每隔多少个采样周期测量一次
const RTC_MEASURE_CYCLES: u32 = 100;

// 定义应用程序资源和任务
#[rtic::app(device = stm32f1xx_hal::pac, peripherals = true, dispatchers = [USART1])]
mod app {
    use super::*;

    #[shared]
    struct Shared {
        delay: SysDelay,
    }

    #[local]
    struct Local {
        inputs: TxAnalogInputs,
        clock: DwtClock,
    }

    // 初始化函数
    #[init]
    fn init(ctx: init::Context) -> (Shared, Local) {
        // 获取外设实例
        let mut flash = ctx.device.FLASH.constrain();
        let rcc = ctx.device.RCC.constrain();
        let adc1 = ctx.device.ADC1;

        let mut core = ctx.core;

        let mut gpioa = ctx.device.GPIOA.split();
        let mut gpiob = ctx.device.GPIOB.split();

        // 初始化时钟
        // 外部晶振 8MHz, ADC 时钟不能超过 14MHz
        let clocks = rcc
            .cfgr
            .use_hse(8.MHz())
            .sysclk(72.MHz())
            .pclk1(36.MHz())
            .adcclk(12.MHz())
            .freeze(&mut flash.acr);
        // 具有自定义精度的阻塞延迟
        let delay = core.SYST.delay(&clocks);
        // 采样计时
        let clock = DwtClock::new(&mut core.DCB, &mut core.DWT, clocks.sysclk().raw());

        println!("init start ...");

        // 初始化模拟输入引脚
        let pins = AdcPins {
            pa0: gpioa.pa0.into_analog(&mut gpioa.crl),
            pa1: gpioa.pa1.into_analog(&mut gpioa.crl),
            pa2: gpioa.pa2.into_analog(&mut gpioa.crl),
            pa3: gpioa.pa3.into_analog(&mut gpioa.crl),
            pa4: gpioa.pa4.into_analog(&mut gpioa.crl),
            pa5: gpioa.pa5.into_analog(&mut gpioa.crl),
            pa6: gpioa.pa6.into_analog(&mut gpioa.crl),
            pa7: gpioa.pa7.into_analog(&mut gpioa.crl),
            pb0: gpiob.pb0.into_analog(&mut gpiob.crl),
            pb1: gpiob.pb1.into_analog(&mut gpiob.crl),
        };
        let reader = Adc1Reader::new(Adc::adc1(adc1, clocks), pins);
        println!("adc full scale: {}", reader.max_sample());

        // 初始化电池测量桥
        let board = TxBoard::new(gpiob.pb5, &mut gpiob.crl);

        // 注册采样后端
        let mut inputs = AnalogInputs::new(board);
        if let Err(err) = inputs.register_backend(OneShotBackend::new(reader)) {
            println!("adc backend unavailable: {}", err);
        }
        inputs.jitter_monitor_mut().set_active(true);

        // 采样结果传递
        let (snapshot_s, snapshot_r) = make_channel!(AnalogSnapshot, SNAPSHOT_CAPACITY);
        channel_monitor::spawn(snapshot_r).unwrap();
        adc_sampler::spawn(snapshot_s).unwrap();

        println!("init end ...");
        (Shared { delay }, Local { inputs, clock })
    }

    /// 周期采样并发布快照
    #[task(priority = 1, local = [inputs, clock], shared = [delay])]
    async fn adc_sampler(
        mut ctx: adc_sampler::Context,
        mut sender: Sender<'static, AnalogSnapshot, SNAPSHOT_CAPACITY>,
    ) {
        let mut cycles: u32 = 0;
        loop {
            let inputs = &mut *ctx.local.inputs;

            cycles = cycles.wrapping_add(1);
            if cycles % RTC_MEASURE_CYCLES == 0 {
                // 本周期采样结束后自动关闭
                inputs.sampler_mut().board_mut().enable_vbat_bridge();
            }

            // 失败时快照仍然发布, fresh 为 false
            let _ = inputs.run_cycle_timed(&*ctx.local.clock);

            if cycles % RTC_MEASURE_CYCLES == 0 {
                let monitor = inputs.jitter_monitor();
                println!(
                    "Jitter: raw {} filtered {}, sample: {}us (max {}us)",
                    monitor.raw_jitter(0),
                    monitor.filtered_jitter(0),
                    inputs.debug_timer().last(),
                    inputs.debug_timer().max(),
                );
            }

            if sender.send(inputs.snapshot()).await.is_err() {
                break;
            }

            ctx.shared.delay.lock(|delay| {
                delay.delay_ms(ADC_TICK_MS);
            });
        }
    }

    /// 接收采样快照
    #[task(priority = 1)]
    async fn channel_monitor(
        _c: channel_monitor::Context,
        mut receiver: Receiver<'static, AnalogSnapshot, SNAPSHOT_CAPACITY>,
    ) {
        while let Ok(val) = receiver.recv().await {
            if !val.fresh {
                println!("adc sample stale");
                continue;
            }
            println!(
                "Sticks: {} \nPots: {} \nBattery: {}0mV, RTC: {}0mV",
                &val.values[..NUM_STICKS],
                &val.values[NUM_STICKS..TX_VOLTAGE],
                val.battery,
                val.rtc_battery,
            );
        }
    }

    /// 任务处理
    #[idle(local = [], shared = [])]
    fn idle(_ctx: idle::Context) -> ! {
        loop {
            wfi();
        }
    }
}
