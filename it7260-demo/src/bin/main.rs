#![no_std]
#![no_main]
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those     holding buffers for the duration of a data transfer."
)]

use embassy_executor::Spawner;
use embassy_time::{Delay, Duration, Timer};
use esp_hal::i2c::master::I2c;
use esp_hal::Async;
use esp_hal::{
    clock::CpuClock,
    gpio::{Input, InputConfig, Pull},
    time::Rate,
    timer::systimer::SystemTimer,
};
use esp_println::println;
use it7260_touch_async::{
    Capabilities, Config, DeviceModel, EventSink, Key, PmMessage, Session, TouchSample,
};
use log::{info, warn};
use static_cell::StaticCell;

#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    println!("{}", info);
    loop {}
}

extern crate alloc;

// This creates a default app-descriptor required by the esp-idf bootloader.
// For more information see: <https://docs.espressif.com/projects/esp-idf/en/stable/esp32/api-reference/system/app_image_format.html#application-description>
esp_bootloader_esp_idf::esp_app_desc!();

/// Logs every input event the touch screen produces.
struct LogSink;

impl EventSink for LogSink {
    fn declare(&mut self, capabilities: &Capabilities) {
        info!("Input device: {capabilities:?}");
    }

    fn report_key(&mut self, key: Key, pressed: bool) {
        info!("Key {key:?} (code {}) pressed: {pressed}", key.code());
    }

    fn report_touch(&mut self, sample: TouchSample) {
        info!("Touch {sample:?}");
    }

    fn sync(&mut self) {
        log::debug!("-- sync --");
    }
}

type TouchSession = Session<I2c<'static, Async>, LogSink>;

static SESSION: StaticCell<TouchSession> = StaticCell::new();

/// The main entry point of the application.
#[esp_hal_embassy::main]
async fn main(spawner: Spawner) {
    // Init logging
    esp_println::logger::init_logger(log::LevelFilter::Debug);

    info!("Logger initialized");

    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    info!("Peripherals initialized");

    esp_alloc::heap_allocator!(size: 64 * 1024);

    let timer0 = SystemTimer::new(peripherals.SYSTIMER);
    esp_hal_embassy::init(timer0.alarm0);

    let touch_scl = peripherals.GPIO14;
    let touch_sda = peripherals.GPIO13;
    let touch_int = Input::new(
        peripherals.GPIO12,
        InputConfig::default().with_pull(Pull::Up),
    );

    let config = esp_hal::i2c::master::Config::default().with_frequency(Rate::from_khz(100));

    let touch_i2c = I2c::new(peripherals.I2C0, config)
        .unwrap()
        .with_sda(touch_sda)
        .with_scl(touch_scl)
        .into_async();

    let session = match TouchSession::attach(
        touch_i2c,
        LogSink,
        DeviceModel::It7260,
        Config::default(),
        &mut Delay,
    )
    .await
    {
        Ok(session) => session,
        Err(err) => {
            warn!("Error attaching the touch screen: {err:?}");
            loop {
                Timer::after(Duration::from_secs(1)).await;
            }
        }
    };
    let session: &'static TouchSession = SESSION.init(session);

    spawner.spawn(read_touch(session, touch_int)).unwrap();

    info!("Touch screen attached. Entering idle loop.");

    // Walk through one sleep/wake cycle so the power path is exercised.
    Timer::after(Duration::from_secs(30)).await;
    match session.suspend(PmMessage::Suspend).await {
        Ok(()) => info!("Touch screen suspended, wake armed: {}", session.irq().wake_armed()),
        Err(err) => warn!("Error suspending touch screen: {err:?}"),
    }
    Timer::after(Duration::from_secs(5)).await;
    if let Err(err) = session.resume().await {
        warn!("Error resuming touch screen: {err:?}");
    }

    loop {
        Timer::after(Duration::from_secs(1)).await;
    }
}

/// A task that services the touch interrupt and decodes reports.
#[embassy_executor::task]
async fn read_touch(session: &'static TouchSession, mut touch_int: Input<'static>) {
    session.run(&mut touch_int, Delay).await
}
