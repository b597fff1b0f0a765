use core::net::Ipv4Addr;

use embassy_time::Duration;

/// Number of LEDs in the strip. All of them show the same color.
pub const TOTAL_LEDS: usize = 10;
/// Passed to `smart_leds::brightness`, out of 255.
pub const LED_BRIGHTNESS: u8 = 200;

/// Time between two reader polls.
pub const READER_POLL_INTERVAL: Duration = Duration::from_millis(50);

pub const SERIAL_BAUDRATE: u32 = 115_200;

/// Build with `PODIUM_WIFI_SSID=... PODIUM_WIFI_PASSWORD=... cargo build` to set these.
pub const WIFI_SSID: &str = match option_env!("PODIUM_WIFI_SSID") {
    Some(ssid) => ssid,
    None => "podium",
};
pub const WIFI_PASSWORD: &str = match option_env!("PODIUM_WIFI_PASSWORD") {
    Some(password) => password,
    None => "",
};
/// How long to wait before trying again after the access point was lost or refused us.
pub const WIFI_RECONNECT_DELAY: Duration = Duration::from_secs(5);

pub const LOCAL_ADDRESS: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 98);
pub const NETWORK_PREFIX_LEN: u8 = 24;
pub const GATEWAY: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 1);
pub const LOCAL_PORT: u16 = 7001;
/// The show control computer that receives the OSC triggers.
pub const DESTINATION_ADDRESS: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 100);
pub const DESTINATION_PORT: u16 = 7000;
