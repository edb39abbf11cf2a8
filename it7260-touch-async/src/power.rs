//! Suspend and resume sequencing.
//!
//! Neither transition polls the busy bit before talking to the controller,
//! unlike the identify handshake.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embedded_hal_async::i2c::{I2c, SevenBitAddress};

use crate::bus::Region;
use crate::error::Error;
use crate::session::Session;
use crate::sink::EventSink;

/// Command putting the controller into its low-power state.
pub const SUSPEND_COMMAND: [u8; 3] = [0x04, 0x00, 0x02];

/// The system transition that triggered a suspend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PmMessage {
    /// Regular system sleep.
    Suspend,
    /// Freeze before taking a hibernation image.
    Freeze,
    /// Hibernation.
    Hibernate,
}

impl<I2C, S, M> Session<I2C, S, M>
where
    I2C: I2c<SevenBitAddress>,
    S: EventSink,
    M: RawMutex,
{
    /// Arms the touch interrupt as a wake source and sends the controller to
    /// sleep.
    ///
    /// Fails with [`Error::PowerUnavailable`] without touching the bus when
    /// the session is not wake-capable.
    pub async fn suspend(&self, message: PmMessage) -> Result<(), Error<I2C::Error>> {
        log::info!("suspend touch screen ({message:?})");
        if !self.is_wake_capable() {
            return Err(Error::PowerUnavailable);
        }

        self.irq.set_wake(true);

        let mut guarded = self.guarded.lock().await;
        guarded.transport.write(Region::Command, &SUSPEND_COMMAND).await?;
        Ok(())
    }

    /// Acknowledges the controller after wake-up and disarms the wake source.
    ///
    /// Fails with [`Error::PowerUnavailable`] when the session is not
    /// wake-capable.
    pub async fn resume(&self) -> Result<(), Error<I2C::Error>> {
        log::info!("resume touch screen");
        if !self.is_wake_capable() {
            return Err(Error::PowerUnavailable);
        }

        {
            let mut guarded = self.guarded.lock().await;
            if let Err(err) = guarded.transport.query().await {
                log::warn!("Error acknowledging the controller on resume: {err:?}");
            }
        }
        self.irq.set_wake(false);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::vec;

    use embassy_futures::block_on;
    use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};

    use super::*;
    use crate::bus::DEFAULT_I2C_ADDRESS as ADDR;
    use crate::config::Config;
    use crate::session::DeviceModel;
    use crate::test_support::RecordingSink;

    type TestSession = Session<I2cMock, RecordingSink, CriticalSectionRawMutex>;

    fn session(i2c: &I2cMock, wake_capable: bool) -> TestSession {
        let session = TestSession::new(
            i2c.clone(),
            RecordingSink::default(),
            DeviceModel::It7260,
            Config::default().with_wake_capable(wake_capable),
        );
        session.irq.enable();
        session
    }

    #[test]
    fn test_suspend_arms_wake_and_sends_command() {
        let expectations = [I2cTransaction::write(ADDR, vec![0x20, 0x04, 0x00, 0x02])];
        let mut i2c = I2cMock::new(&expectations);
        let session = session(&i2c, true);

        assert_eq!(block_on(session.suspend(PmMessage::Suspend)), Ok(()));

        assert!(session.irq().wake_armed());
        i2c.done();
    }

    #[test]
    fn test_suspend_without_wake_sends_nothing() {
        let expectations: [I2cTransaction; 0] = [];
        let mut i2c = I2cMock::new(&expectations);
        let session = session(&i2c, false);

        let result = block_on(session.suspend(PmMessage::Suspend));

        assert_eq!(result, Err(Error::PowerUnavailable));
        assert!(!session.irq().wake_armed());
        i2c.done();
    }

    #[test]
    fn test_suspend_reports_bus_failure() {
        let expectations =
            [I2cTransaction::write(ADDR, vec![0x20, 0x04, 0x00, 0x02]).with_error(ErrorKind::Other)];
        let mut i2c = I2cMock::new(&expectations);
        let session = session(&i2c, true);

        let result = block_on(session.suspend(PmMessage::Freeze));

        assert_eq!(result, Err(Error::Bus(ErrorKind::Other)));
        i2c.done();
    }

    #[test]
    fn test_resume_reads_query_and_disarms_wake() {
        let expectations = [
            I2cTransaction::write(ADDR, vec![0x20, 0x04, 0x00, 0x02]),
            I2cTransaction::write_read(ADDR, vec![0x80], vec![0x00]),
        ];
        let mut i2c = I2cMock::new(&expectations);
        let session = session(&i2c, true);

        block_on(session.suspend(PmMessage::Suspend)).unwrap();
        block_on(session.resume()).unwrap();

        assert!(!session.irq().wake_armed());
        i2c.done();
    }

    #[test]
    fn test_resume_ignores_acknowledge_failure() {
        let expectations =
            [I2cTransaction::write_read(ADDR, vec![0x80], vec![0x00]).with_error(ErrorKind::Other)];
        let mut i2c = I2cMock::new(&expectations);
        let session = session(&i2c, true);

        assert_eq!(block_on(session.resume()), Ok(()));
        i2c.done();
    }

    #[test]
    fn test_resume_without_wake_fails() {
        let expectations: [I2cTransaction; 0] = [];
        let mut i2c = I2cMock::new(&expectations);
        let session = session(&i2c, true);
        session.set_wake_capable(false);

        assert_eq!(block_on(session.resume()), Err(Error::PowerUnavailable));
        i2c.done();
    }
}
