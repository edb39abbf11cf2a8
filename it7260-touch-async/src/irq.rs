//! Interrupt gate between the touch interrupt and the deferred decode work.
//!
//! [`IrqGate::on_interrupt`] is the only piece that runs in interrupt
//! context. It never touches the bus: it disables the gate and wakes the
//! worker through a single-slot [`Signal`]. Interrupts that arrive while the
//! gate is disabled are coalesced, not queued.

use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::signal::Signal;

/// Where the gate is in the interrupt/decode cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum IrqState {
    /// The interrupt is not requested (before attach or after detach).
    Disabled = 0,
    /// Waiting for the interrupt.
    Idle = 1,
    /// The interrupt fired; decode work is scheduled.
    Deferred = 2,
    /// A decode cycle is running.
    Decoding = 3,
}

impl From<u8> for IrqState {
    fn from(val: u8) -> Self {
        match val {
            1 => IrqState::Idle,
            2 => IrqState::Deferred,
            3 => IrqState::Decoding,
            _ => IrqState::Disabled,
        }
    }
}

/// Edge-style enable/disable guard around the touch interrupt.
pub struct IrqGate<M: RawMutex> {
    state: AtomicU8,
    wake_armed: AtomicBool,
    pending: Signal<M, ()>,
    rearmed: Signal<M, ()>,
}

impl<M: RawMutex> Default for IrqGate<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: RawMutex> IrqGate<M> {
    /// Creates a disabled gate.
    pub const fn new() -> Self {
        Self {
            state: AtomicU8::new(IrqState::Disabled as u8),
            wake_armed: AtomicBool::new(false),
            pending: Signal::new(),
            rearmed: Signal::new(),
        }
    }

    /// The current state.
    pub fn state(&self) -> IrqState {
        IrqState::from(self.state.load(Ordering::Acquire))
    }

    /// Whether the next interrupt will be accepted.
    pub fn is_enabled(&self) -> bool {
        self.state() == IrqState::Idle
    }

    /// Interrupt entry point.
    ///
    /// Disables the gate and schedules decode work. Returns `false` if the
    /// gate was not enabled, in which case the interrupt is dropped.
    pub fn on_interrupt(&self) -> bool {
        let accepted = self
            .state
            .compare_exchange(
                IrqState::Idle as u8,
                IrqState::Deferred as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok();
        if accepted {
            self.pending.signal(());
        }
        accepted
    }

    /// Enables the gate.
    pub fn enable(&self) {
        self.state.store(IrqState::Idle as u8, Ordering::Release);
        self.rearmed.signal(());
    }

    /// Disables the gate and drops any scheduled work.
    pub fn disable(&self) {
        self.state.store(IrqState::Disabled as u8, Ordering::Release);
        self.pending.reset();
    }

    /// Whether the interrupt is armed as a system wake source.
    pub fn wake_armed(&self) -> bool {
        self.wake_armed.load(Ordering::Acquire)
    }

    pub(crate) fn set_wake(&self, armed: bool) {
        self.wake_armed.store(armed, Ordering::Release);
    }

    /// Takes ownership of the scheduled work. The gate stays `Deferred`
    /// until [`Rearm::decoding`] is called.
    pub(crate) fn claim(&self) -> Rearm<'_, M> {
        Rearm { gate: self }
    }

    /// Moves a `Deferred` or `Decoding` gate back to `Idle`. A disabled gate
    /// is left alone.
    fn rearm(&self) {
        let mut current = self.state.load(Ordering::Acquire);
        while current == IrqState::Deferred as u8 || current == IrqState::Decoding as u8 {
            match self.state.compare_exchange(
                current,
                IrqState::Idle as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => {
                    self.rearmed.signal(());
                    return;
                }
                Err(actual) => current = actual,
            }
        }
    }

    /// Waits for an accepted interrupt.
    pub async fn triggered(&self) {
        self.pending.wait().await;
    }

    /// Waits until the gate accepts interrupts again.
    pub async fn enabled(&self) {
        while !self.is_enabled() {
            self.rearmed.wait().await;
        }
    }
}

/// Re-enables the gate when dropped, whichever way the cycle ends, unless the
/// gate was disabled in the meantime.
pub(crate) struct Rearm<'a, M: RawMutex> {
    gate: &'a IrqGate<M>,
}

impl<M: RawMutex> Rearm<'_, M> {
    /// Marks the cycle as running. A disabled gate stays disabled.
    pub(crate) fn decoding(&self) {
        let _ = self
            .gate
            .state
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                (current != IrqState::Disabled as u8).then_some(IrqState::Decoding as u8)
            });
    }
}

impl<M: RawMutex> Drop for Rearm<'_, M> {
    fn drop(&mut self) {
        self.gate.rearm();
    }
}
