//! Busy-wait handshake and controller identification.

use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::{I2c, SevenBitAddress};

use crate::bus::{Region, Transport};
use crate::config::ReadyPolicy;
use crate::error::Error;

/// Command byte asking the controller to identify itself.
pub const IDENTIFY_COMMAND: u8 = 0x00;

/// Vendor signature carried at offsets 1..=3 of the identification response.
pub const VENDOR_SIGNATURE: [u8; 3] = *b"ITE";

const IDENTIFY_RESPONSE_LEN: usize = 10;

/// The payload of the command response buffer after [`IDENTIFY_COMMAND`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentifyResponse {
    raw: [u8; IDENTIFY_RESPONSE_LEN],
}

impl From<[u8; IDENTIFY_RESPONSE_LEN]> for IdentifyResponse {
    fn from(raw: [u8; IDENTIFY_RESPONSE_LEN]) -> Self {
        Self { raw }
    }
}

impl IdentifyResponse {
    /// Length byte reported by the controller.
    pub fn length(&self) -> u8 {
        self.raw[0]
    }

    /// The three signature bytes.
    pub fn signature(&self) -> [u8; 3] {
        [self.raw[1], self.raw[2], self.raw[3]]
    }

    /// Whether the signature matches [`VENDOR_SIGNATURE`].
    pub fn is_recognized(&self) -> bool {
        self.signature() == VENDOR_SIGNATURE
    }

    /// The raw response bytes.
    pub fn raw(&self) -> &[u8; IDENTIFY_RESPONSE_LEN] {
        &self.raw
    }
}

impl<I2C> Transport<I2C>
where
    I2C: I2c<SevenBitAddress>,
{
    /// Polls the query byte until the controller clears its busy bit.
    ///
    /// Gives up with [`Error::Timeout`] once `policy.attempts` reads all saw
    /// the controller busy. The query byte is read at least once.
    pub async fn wait_ready<D: DelayNs>(
        &mut self,
        delay: &mut D,
        policy: &ReadyPolicy,
    ) -> Result<(), Error<I2C::Error>> {
        let interval_us = u32::try_from(policy.interval.as_micros()).unwrap_or(u32::MAX);
        let attempts = policy.attempts.max(1);

        for attempt in 0..attempts {
            if !self.query().await?.busy() {
                return Ok(());
            }
            if attempt + 1 < attempts {
                delay.delay_us(interval_us).await;
            }
        }

        log::warn!("Controller still busy after {attempts} polls.");
        Err(Error::Timeout)
    }

    /// Runs the identify handshake and checks the vendor signature.
    ///
    /// Any bus failure is reported as [`Error::NotRecognized`]; an exhausted
    /// poll budget stays [`Error::Timeout`].
    pub async fn identify<D: DelayNs>(
        &mut self,
        delay: &mut D,
        policy: &ReadyPolicy,
    ) -> Result<IdentifyResponse, Error<I2C::Error>> {
        self.wait_ready(delay, policy).await.map_err(not_recognized)?;
        self.write(Region::Command, &[IDENTIFY_COMMAND])
            .await
            .map_err(not_recognized)?;
        self.wait_ready(delay, policy).await.map_err(not_recognized)?;

        let mut raw = [0u8; IDENTIFY_RESPONSE_LEN];
        self.read(Region::CommandResponse, &mut raw)
            .await
            .map_err(not_recognized)?;

        let response = IdentifyResponse::from(raw);
        log::info!(
            "len = {}, {:?}",
            response.length(),
            response.signature().map(char::from)
        );

        if !response.is_recognized() {
            return Err(Error::NotRecognized);
        }
        Ok(response)
    }
}

fn not_recognized<E>(err: Error<E>) -> Error<E> {
    match err {
        Error::Timeout => Error::Timeout,
        _ => Error::NotRecognized,
    }
}

#[cfg(test)]
mod tests {
    use std::vec;

    use embassy_futures::block_on;
    use embassy_time::Duration;
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};

    use super::*;
    use crate::bus::DEFAULT_I2C_ADDRESS as ADDR;
    use crate::test_support::{identify_response, NoDelay};

    fn policy(attempts: u32) -> ReadyPolicy {
        ReadyPolicy {
            attempts,
            interval: Duration::from_micros(10),
        }
    }

    fn query(value: u8) -> I2cTransaction {
        I2cTransaction::write_read(ADDR, vec![0x80], vec![value])
    }

    #[test]
    fn test_wait_ready_polls_until_busy_clears() {
        let expectations = [query(0x01), query(0x01), query(0x80)];
        let mut i2c = I2cMock::new(&expectations);
        let mut transport = Transport::new(i2c.clone(), ADDR);

        block_on(transport.wait_ready(&mut NoDelay, &policy(5))).unwrap();
        i2c.done();
    }

    #[test]
    fn test_wait_ready_times_out() {
        let expectations = [query(0x01), query(0x01), query(0x01)];
        let mut i2c = I2cMock::new(&expectations);
        let mut transport = Transport::new(i2c.clone(), ADDR);

        let result = block_on(transport.wait_ready(&mut NoDelay, &policy(3)));

        assert_eq!(result, Err(Error::Timeout));
        i2c.done();
    }

    #[test]
    fn test_wait_ready_with_empty_budget_still_polls_once() {
        let expectations = [query(0x00), query(0x01)];
        let mut i2c = I2cMock::new(&expectations);
        let mut transport = Transport::new(i2c.clone(), ADDR);

        assert_eq!(block_on(transport.wait_ready(&mut NoDelay, &policy(0))), Ok(()));
        assert_eq!(
            block_on(transport.wait_ready(&mut NoDelay, &policy(0))),
            Err(Error::Timeout)
        );
        i2c.done();
    }

    #[test]
    fn test_identify_accepts_ite_signature() {
        let expectations = [
            query(0x00),
            I2cTransaction::write(ADDR, vec![0x20, 0x00]),
            query(0x01),
            query(0x00),
            I2cTransaction::write_read(ADDR, vec![0xA0], identify_response(*b"ITE")),
        ];
        let mut i2c = I2cMock::new(&expectations);
        let mut transport = Transport::new(i2c.clone(), ADDR);

        let response = block_on(transport.identify(&mut NoDelay, &policy(5))).unwrap();

        assert!(response.is_recognized());
        assert_eq!(response.signature(), *b"ITE");
        i2c.done();
    }

    #[test]
    fn test_identify_rejects_other_signatures() {
        for signature in [*b"ITX", *b"iTE", *b"ETI", [0, 0, 0]] {
            let expectations = [
                query(0x00),
                I2cTransaction::write(ADDR, vec![0x20, 0x00]),
                query(0x00),
                I2cTransaction::write_read(ADDR, vec![0xA0], identify_response(signature)),
            ];
            let mut i2c = I2cMock::new(&expectations);
            let mut transport = Transport::new(i2c.clone(), ADDR);

            let result = block_on(transport.identify(&mut NoDelay, &policy(5)));

            assert_eq!(result, Err(Error::NotRecognized));
            i2c.done();
        }
    }

    #[test]
    fn test_identify_maps_bus_errors_to_not_recognized() {
        let expectations = [
            query(0x00),
            I2cTransaction::write(ADDR, vec![0x20, 0x00]).with_error(ErrorKind::Other),
        ];
        let mut i2c = I2cMock::new(&expectations);
        let mut transport = Transport::new(i2c.clone(), ADDR);

        let result = block_on(transport.identify(&mut NoDelay, &policy(5)));

        assert_eq!(result, Err(Error::NotRecognized));
        i2c.done();
    }

    #[test]
    fn test_identify_keeps_timeout_distinguishable() {
        let expectations = [query(0x01), query(0x01)];
        let mut i2c = I2cMock::new(&expectations);
        let mut transport = Transport::new(i2c.clone(), ADDR);

        let result = block_on(transport.identify(&mut NoDelay, &policy(2)));

        assert_eq!(result, Err(Error::Timeout));
        i2c.done();
    }
}
