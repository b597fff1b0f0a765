use defmt::{Debug2Format, debug, info};
use embassy_time::Timer;
use mfrc522::{Error, Initialized, Mfrc522, comm::Interface};
use podium_pure::{io::TagReader, tag::Uid};

use crate::config::READER_POLL_INTERVAL;

/// A chip that answers with one of these isn't there or isn't wired up.
const NO_CHIP_VERSIONS: [u8; 2] = [0x00, 0xFF];

pub struct Mfrc522Reader<C: Interface> {
    device: Mfrc522<C, Initialized>,
}

impl<C: Interface> Mfrc522Reader<C> {
    /// Initializes the chip and checks that it's actually connected.
    pub fn new(comm: C) -> Result<Self, ReaderError<C::Error>> {
        let mut device = Mfrc522::new(comm).init().map_err(ReaderError::Device)?;
        let version = device.version().map_err(ReaderError::Device)?;
        if NO_CHIP_VERSIONS.contains(&version) {
            return Err(ReaderError::NotFound { version });
        }
        info!("MFRC522 version: {:#04X}", version);
        Ok(Self { device })
    }
}

impl<C: Interface> TagReader for Mfrc522Reader<C>
where
    C::Error: core::fmt::Debug,
{
    /// WUPA also wakes halted cards, so a card resting on the reader answers every poll.
    async fn sample(&mut self) -> Option<Uid> {
        let uid = match self.device.wupa() {
            Ok(atq_a) => match self.device.select(&atq_a) {
                Ok(uid) => Uid::from_slice(uid.as_bytes()).ok(),
                Err(e) => {
                    debug!("SELECT error: {}", Debug2Format(&e));
                    None
                }
            },
            // Nothing answered
            Err(_) => None,
        };
        if uid.is_some() {
            if let Err(e) = self.device.hlta() {
                debug!("HLTA error: {}", Debug2Format(&e));
            }
        }
        Timer::after(READER_POLL_INTERVAL).await;
        uid
    }
}

#[derive(Debug)]
pub enum ReaderError<E> {
    Device(Error<E>),
    NotFound { version: u8 },
}
