#![no_std]
pub mod config;
mod flash_eeprom;
mod led_indicator;
mod mfrc522_reader;
mod serial_channel;
mod udp_notifier;

pub use flash_eeprom::*;
pub use led_indicator::*;
pub use mfrc522_reader::*;
pub use serial_channel::*;
pub use udp_notifier::*;
