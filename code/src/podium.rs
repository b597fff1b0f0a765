#![no_std]
#![no_main]

use defmt::{Debug2Format, error, info, warn};
use embassy_embedded_hal::adapter::BlockingAsync;
use embassy_executor::Spawner;
use embassy_net::{
    IpEndpoint, Ipv4Cidr, Runner, StackResources, StaticConfigV4,
    udp::{PacketMetadata, UdpSocket},
};
use embassy_time::{Delay, Timer};
use embedded_hal_bus::spi::ExclusiveDevice;
use esp_backtrace as _;
use esp_bootloader_esp_idf::partitions::{
    DataPartitionSubType, PARTITION_TABLE_MAX_LEN, PartitionType, read_partition_table,
};
use esp_hal::{
    gpio::{Level, Output, OutputConfig},
    interrupt::software::SoftwareInterruptControl,
    rmt::Rmt,
    rng::Rng,
    spi::{Mode, master::Spi},
    time::Rate,
    timer::timg::TimerGroup,
    uart::{self, Uart},
};
use esp_hal_smartled::{SmartLedsAdapterAsync, buffer_size_async, smart_led_buffer};
use esp_println as _;
use esp_radio::wifi::{ClientConfig, ModeConfig, WifiController, WifiDevice, WifiEvent};
use esp_storage::FlashStorage;
use mfrc522::comm::blocking::spi::SpiInterface;
use podium_pure::{ConfigStore, Dispatcher, io::Indicator, router::INDICATOR_OFF};
use static_cell::StaticCell;

use lib::{
    FlashEeprom, LedIndicator, Mfrc522Reader, SerialChannel, UdpNotifier,
    config::{
        DESTINATION_ADDRESS, DESTINATION_PORT, GATEWAY, LOCAL_ADDRESS, LOCAL_PORT,
        NETWORK_PREFIX_LEN, SERIAL_BAUDRATE, TOTAL_LEDS, WIFI_PASSWORD, WIFI_RECONNECT_DELAY,
        WIFI_SSID,
    },
    serial_rx_task,
};

esp_bootloader_esp_idf::esp_app_desc!();

#[esp_rtos::main]
async fn main(spawner: Spawner) {
    let p = esp_hal::init(Default::default());
    esp_alloc::heap_allocator!(size: 72 * 1024);
    // Needed for esp_rtos
    let timg0 = TimerGroup::new(p.TIMG0);
    let software_interrupt = SoftwareInterruptControl::new(p.SW_INTERRUPT);
    esp_rtos::start(timg0.timer0, software_interrupt.software_interrupt0);

    info!("RFID podium starting");

    let ws2812_gpio = p.GPIO7;
    let spi_sck_gpio = p.GPIO4;
    let spi_mosi_gpio = p.GPIO3;
    let spi_miso_gpio = p.GPIO2;
    let reader_cs_gpio = p.GPIO10;
    let uart_tx_gpio = p.GPIO21;
    let uart_rx_gpio = p.GPIO20;

    // LEDs first so they are dark as early as possible
    let mut buffer = smart_led_buffer!(buffer_size_async(TOTAL_LEDS));
    let mut indicator = LedIndicator(SmartLedsAdapterAsync::new(
        Rmt::new(p.RMT, Rate::from_mhz(80))
            .unwrap()
            .into_async()
            .channel0,
        ws2812_gpio,
        &mut buffer,
    ));
    indicator.set_all(INDICATOR_OFF).await;

    let mut flash = FlashStorage::new(p.FLASH);
    let mut pt_mem = [0; PARTITION_TABLE_MAX_LEN];
    let pt = read_partition_table(&mut flash, &mut pt_mem).unwrap();
    let nvs = pt
        .find_partition(PartitionType::Data(DataPartitionSubType::Nvs))
        .unwrap()
        .unwrap();
    let nvs_partition = nvs.as_embedded_storage(&mut flash);
    let store = match ConfigStore::load(FlashEeprom::new(BlockingAsync::new(nvs_partition))).await
    {
        Ok(store) => store,
        Err(e) => defmt::panic!("Error loading configuration: {}", Debug2Format(&e)),
    };
    let config = store.config();
    info!(
        "Loaded {} tags. Mode: {}. Remove command: {}",
        config.active_count(),
        config.mode(),
        config.removal_command()
    );
    for (index, slot) in config.active_slots() {
        info!(
            "Slot {}: tag {}, command {}",
            index.get() + 1,
            slot.tag,
            slot.command
        );
    }

    let spi = Spi::new(
        p.SPI2,
        esp_hal::spi::master::Config::default()
            .with_frequency(Rate::from_mhz(10))
            .with_mode(Mode::_0),
    )
    .unwrap()
    .with_sck(spi_sck_gpio)
    .with_mosi(spi_mosi_gpio)
    .with_miso(spi_miso_gpio);
    let reader_cs = Output::new(reader_cs_gpio, Level::High, OutputConfig::default());
    let spi_device = ExclusiveDevice::new(spi, reader_cs, Delay).unwrap();
    let reader = match Mfrc522Reader::new(SpiInterface::new(spi_device)) {
        Ok(reader) => reader,
        Err(e) => {
            error!("MFRC522 not found: {}", Debug2Format(&e));
            // Nothing works without a reader
            core::future::pending().await
        }
    };

    static RADIO: StaticCell<esp_radio::Controller<'static>> = StaticCell::new();
    let radio = RADIO.init(esp_radio::init().unwrap());
    let (wifi_controller, interfaces) =
        esp_radio::wifi::new(radio, p.WIFI, Default::default()).unwrap();
    let net_config = embassy_net::Config::ipv4_static(StaticConfigV4 {
        address: Ipv4Cidr::new(LOCAL_ADDRESS, NETWORK_PREFIX_LEN),
        gateway: Some(GATEWAY),
        dns_servers: Default::default(),
    });
    let rng = Rng::new();
    let seed = (rng.random() as u64) << 32 | rng.random() as u64;
    static NET_RESOURCES: StaticCell<StackResources<2>> = StaticCell::new();
    let (stack, runner) = embassy_net::new(
        interfaces.sta,
        net_config,
        NET_RESOURCES.init(StackResources::new()),
        seed,
    );
    spawner.spawn(wifi_task(wifi_controller)).unwrap();
    spawner.spawn(net_task(runner)).unwrap();

    let (uart_rx, uart_tx) = Uart::new(
        p.UART0,
        uart::Config::default().with_baudrate(SERIAL_BAUDRATE),
    )
    .unwrap()
    .with_tx(uart_tx_gpio)
    .with_rx(uart_rx_gpio)
    .into_async()
    .split();
    spawner.spawn(serial_rx_task(uart_rx)).unwrap();

    info!("Waiting for the network");
    stack.wait_config_up().await;
    info!("Network is up");

    let mut rx_meta = [PacketMetadata::EMPTY; 4];
    let mut rx_buffer = [0; 256];
    let mut tx_meta = [PacketMetadata::EMPTY; 4];
    let mut tx_buffer = [0; 512];
    let mut socket = UdpSocket::new(
        stack,
        &mut rx_meta,
        &mut rx_buffer,
        &mut tx_meta,
        &mut tx_buffer,
    );
    socket.bind(LOCAL_PORT).unwrap();
    let notifier = UdpNotifier::new(
        socket,
        IpEndpoint::new(DESTINATION_ADDRESS.into(), DESTINATION_PORT),
    );

    let mut dispatcher = Dispatcher::new(
        store,
        reader,
        notifier,
        indicator,
        SerialChannel::new(uart_tx),
    );
    info!("Ready");
    let Err(e) = dispatcher.run().await;
    defmt::panic!("Error saving configuration: {}", Debug2Format(&e));
}

#[embassy_executor::task]
async fn net_task(mut runner: Runner<'static, WifiDevice<'static>>) {
    runner.run().await
}

/// Keeps the station connected.
#[embassy_executor::task]
async fn wifi_task(mut controller: WifiController<'static>) {
    let client_config = ModeConfig::Client(
        ClientConfig::default()
            .with_ssid(WIFI_SSID.into())
            .with_password(WIFI_PASSWORD.into()),
    );
    loop {
        if controller.is_connected().unwrap_or(false) {
            controller.wait_for_event(WifiEvent::StaDisconnected).await;
            warn!("Wi-Fi disconnected");
            Timer::after(WIFI_RECONNECT_DELAY).await;
        }
        if !matches!(controller.is_started(), Ok(true)) {
            if let Err(e) = controller.set_config(&client_config) {
                error!("Invalid Wi-Fi config: {}", e);
            }
            if let Err(e) = controller.start_async().await {
                error!("Error starting Wi-Fi: {}", e);
            }
        }
        info!("Connecting to {}", WIFI_SSID);
        match controller.connect_async().await {
            Ok(()) => info!("Wi-Fi connected"),
            Err(e) => {
                warn!("Error connecting to Wi-Fi: {}", e);
                Timer::after(WIFI_RECONNECT_DELAY).await;
            }
        }
    }
}
