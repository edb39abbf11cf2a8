//! An asynchronous, `no_std` driver for the ITE IT7260 single-touch controller.
//!
//! The driver identifies the controller, turns its interrupt into deferred
//! decode work, decodes point information reports into key and touch events,
//! forwards them to an [`EventSink`] and sequences suspend/resume with
//! wake-on-touch. The IT7250 speaks the same protocol and is served as well.
//!
//! # Usage
//!
//! To use this driver, you need an I2C peripheral implementation that satisfies the
//! `embedded-hal-async::i2c::I2c` trait and an interrupt pin implementing
//! `embedded-hal-async::digital::Wait`.
//!
//! ```ignore
//! # #![no_std]
//! # #![no_main]
//! # use esp_hal::i2c::master::I2c;
//! # use esp_hal::gpio::{Input, InputConfig};
//! # use esp_hal::Config;
//! # use esp_hal::clock::CpuClock;
//! # use esp_hal::time::Rate;
//! # use embassy_executor::Spawner;
//! # use embassy_time::Delay;
//! use it7260_touch_async::{DeviceModel, EventSink, Key, Session, TouchSample};
//!
//! struct LogSink;
//!
//! impl EventSink for LogSink {
//!     fn report_key(&mut self, key: Key, pressed: bool) {
//!         log::info!("{key:?} pressed: {pressed}");
//!     }
//!     fn report_touch(&mut self, sample: TouchSample) {
//!         log::info!("{sample:?}");
//!     }
//!     fn sync(&mut self) {}
//! }
//!
//! #[esp_hal_embassy::main]
//! async fn main(spawner: Spawner) {
//!     let peripherals = esp_hal::init(Config::default().with_cpu_clock(CpuClock::max()));
//!     let config = esp_hal::i2c::master::Config::default().with_frequency(Rate::from_khz(100));
//!     let i2c = I2c::new(peripherals.I2C0, config)
//!         .unwrap()
//!         .with_sda(peripherals.GPIO13)
//!         .with_scl(peripherals.GPIO14)
//!         .into_async();
//!     let mut touch_int = Input::new(peripherals.GPIO12, InputConfig::default());
//!
//!     let session: Session<_, _> = Session::attach(
//!         i2c,
//!         LogSink,
//!         DeviceModel::It7260,
//!         it7260_touch_async::Config::default(),
//!         &mut Delay,
//!     )
//!     .await
//!     .unwrap();
//!
//!     session.run(&mut touch_int, Delay).await;
//! }
//! ```

#![no_std]

#[cfg(test)]
extern crate std;

pub mod bus;
pub mod config;
pub mod error;
pub mod handshake;
pub mod irq;
pub mod power;
pub mod report;
pub mod session;
pub mod sink;

pub use bus::{QueryByte, Region, Transport};
pub use config::{AxisRanges, Config, ReadyPolicy};
pub use error::Error;
pub use handshake::IdentifyResponse;
pub use irq::{IrqGate, IrqState};
pub use power::PmMessage;
pub use report::{Key, ReportBlock, TouchEvent};
pub use session::{CycleOutcome, DeviceModel, Session, DEVICE_TABLE, DRIVER_NAME};
pub use sink::{Capabilities, EventSink, TouchSample};
