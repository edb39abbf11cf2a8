//! The device session: one attached controller and its decode pipeline.

use core::sync::atomic::{AtomicBool, Ordering};

use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::{CriticalSectionRawMutex, RawMutex};
use embassy_sync::mutex::Mutex;
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::digital::Wait;
use embedded_hal_async::i2c::{I2c, SevenBitAddress};

use crate::bus::{Region, Transport};
use crate::config::Config;
use crate::error::Error;
use crate::irq::{IrqGate, Rearm};
use crate::report::{ReportBlock, TouchEvent, REPORT_LEN};
use crate::sink::{emit, Capabilities, EventSink};

/// Driver name announced to the host.
pub const DRIVER_NAME: &str = "IT7260-ts";

/// Controller models served by this driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceModel {
    /// ITE IT7260.
    It7260,
    /// ITE IT7250.
    It7250,
}

/// Device names this driver binds to.
pub const DEVICE_TABLE: [(&str, DeviceModel); 2] = [
    ("IT7260", DeviceModel::It7260),
    ("IT7250", DeviceModel::It7250),
];

impl DeviceModel {
    /// Looks a device name up in [`DEVICE_TABLE`].
    pub fn from_name(name: &str) -> Option<Self> {
        DEVICE_TABLE
            .iter()
            .find(|(entry, _)| *entry == name)
            .map(|(_, model)| *model)
    }

    /// The name of the model in [`DEVICE_TABLE`].
    pub fn name(self) -> &'static str {
        match self {
            DeviceModel::It7260 => "IT7260",
            DeviceModel::It7250 => "IT7250",
        }
    }
}

/// How a decode cycle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The data-ready bit was clear; nothing was read.
    NoData,
    /// A key report carried an unknown key index.
    UnknownKey,
    /// An event was forwarded to the sink.
    Event(TouchEvent),
    /// A bus transfer failed; nothing was forwarded.
    BusError,
}

pub(crate) struct Guarded<I2C, S> {
    pub(crate) transport: Transport<I2C>,
    pub(crate) sink: S,
}

/// A live binding between one IT7260 and the driver.
///
/// All operations take `&self`, so a session placed in a `static` can be
/// shared between the interrupt handler, the worker task and the power
/// manager.
pub struct Session<I2C, S, M: RawMutex = CriticalSectionRawMutex> {
    pub(crate) guarded: Mutex<M, Guarded<I2C, S>>,
    pub(crate) irq: IrqGate<M>,
    pub(crate) config: Config,
    pub(crate) wake_capable: AtomicBool,
    model: DeviceModel,
}

impl<I2C, S, M> Session<I2C, S, M>
where
    I2C: I2c<SevenBitAddress>,
    S: EventSink,
    M: RawMutex,
{
    pub(crate) fn new(i2c: I2C, sink: S, model: DeviceModel, config: Config) -> Self {
        Self {
            guarded: Mutex::new(Guarded {
                transport: Transport::new(i2c, config.address),
                sink,
            }),
            irq: IrqGate::new(),
            wake_capable: AtomicBool::new(config.wake_capable),
            config,
            model,
        }
    }

    /// Identifies the controller and creates a session for it.
    ///
    /// On success the capabilities have been declared to `sink` and the
    /// interrupt gate is enabled.
    pub async fn attach<D: DelayNs>(
        i2c: I2C,
        mut sink: S,
        model: DeviceModel,
        config: Config,
        delay: &mut D,
    ) -> Result<Self, Error<I2C::Error>> {
        let mut transport = Transport::new(i2c, config.address);
        if let Err(err) = transport.identify(delay, &config.ready).await {
            log::error!("cannot identify the touch screen: {err:?}");
            return Err(err);
        }

        sink.declare(&Capabilities::new(config.axes));

        let session = Self::new(transport.release(), sink, model, config);
        session.irq.enable();
        log::info!("{} attached at {:#04x}", model.name(), config.address);
        Ok(session)
    }

    /// Disables the interrupt and hands back the bus and the sink.
    pub fn detach(self) -> (I2C, S) {
        self.irq.disable();
        self.irq.set_wake(false);
        let Guarded { transport, sink } = self.guarded.into_inner();
        (transport.release(), sink)
    }

    /// The interrupt gate. Hook [`IrqGate::on_interrupt`] to the touch
    /// interrupt if the pin is not driven through [`Session::watch_interrupt`].
    pub fn irq(&self) -> &IrqGate<M> {
        &self.irq
    }

    /// The session configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The matched controller model.
    pub fn model(&self) -> DeviceModel {
        self.model
    }

    /// Whether the session may act as a wake source.
    pub fn is_wake_capable(&self) -> bool {
        self.wake_capable.load(Ordering::Acquire)
    }

    /// Allows or forbids using the touch interrupt as a wake source.
    pub fn set_wake_capable(&self, wake_capable: bool) {
        self.wake_capable.store(wake_capable, Ordering::Release);
    }

    /// Runs one decode cycle.
    ///
    /// The interrupt gate is re-enabled when the cycle returns, whichever
    /// branch it took.
    pub async fn decode_cycle(&self) -> CycleOutcome {
        let rearm = self.irq.claim();
        self.decode_claimed(&rearm).await
    }

    async fn decode_claimed(&self, rearm: &Rearm<'_, M>) -> CycleOutcome {
        rearm.decoding();
        let mut guarded = self.guarded.lock().await;
        let Guarded { transport, sink } = &mut *guarded;

        let Ok(query) = transport.query().await else {
            return CycleOutcome::BusError;
        };
        if !query.data_ready() {
            log::debug!("no finger touch");
            return CycleOutcome::NoData;
        }

        let mut raw = [0u8; REPORT_LEN];
        if transport.read(Region::PointInfo, &mut raw).await.is_err() {
            return CycleOutcome::BusError;
        }

        match ReportBlock::from(raw).decode() {
            Some(event) => {
                emit(sink, event, &self.config.axes);
                CycleOutcome::Event(event)
            }
            None => CycleOutcome::UnknownKey,
        }
    }

    /// Waits for an accepted interrupt, lets the controller settle and runs
    /// one decode cycle.
    ///
    /// Dropping the future after the interrupt was taken, even during the
    /// settle delay, re-enables the gate.
    pub async fn service<D: DelayNs>(&self, delay: &mut D) -> CycleOutcome {
        self.irq.triggered().await;
        let rearm = self.irq.claim();
        let debounce_us = u32::try_from(self.config.debounce.as_micros()).unwrap_or(u32::MAX);
        delay.delay_us(debounce_us).await;
        self.decode_claimed(&rearm).await
    }

    /// The deferred worker: services interrupts forever.
    pub async fn process<D: DelayNs>(&self, mut delay: D) -> ! {
        loop {
            let outcome = self.service(&mut delay).await;
            log::trace!("Decode cycle finished: {outcome:?}");
        }
    }

    /// Feeds an active-low, level-triggered interrupt pin into the gate.
    ///
    /// The pin is only listened to while the gate is enabled.
    pub async fn watch_interrupt<P: Wait>(&self, pin: &mut P) -> ! {
        loop {
            self.irq.enabled().await;
            if let Err(err) = pin.wait_for_low().await {
                log::warn!("Error waiting for the touch interrupt: {err:?}");
                continue;
            }
            self.irq.on_interrupt();
        }
    }

    /// Drives both the interrupt pin and the deferred worker.
    pub async fn run<P: Wait, D: DelayNs>(&self, pin: &mut P, delay: D) -> ! {
        match select(self.watch_interrupt(pin), self.process(delay)).await {
            Either::First(never) | Either::Second(never) => never,
        }
    }
}
