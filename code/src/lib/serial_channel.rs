use defmt::{error, warn};
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, channel::Channel};
use embedded_io_async::Write;
use esp_hal::{
    Async,
    uart::{UartRx, UartTx},
};
use podium_pure::{
    io::TextChannel,
    line::{Line, LineBuffer},
};

/// Lines received but not yet handled. Lines that don't fit are dropped.
pub static RECEIVED_LINES: Channel<CriticalSectionRawMutex, Line, 4> = Channel::new();

#[embassy_executor::task]
pub async fn serial_rx_task(mut uart_rx: UartRx<'static, Async>) {
    let mut line_buffer = LineBuffer::new();
    let mut buffer = [0; 64];
    loop {
        match uart_rx.read_async(&mut buffer).await {
            Ok(bytes_read) => {
                for line in buffer[..bytes_read]
                    .iter()
                    .filter_map(|byte| line_buffer.push(*byte))
                {
                    if RECEIVED_LINES.try_send(line).is_err() {
                        warn!("Dropping received line, too many are waiting");
                    }
                }
            }
            Err(e) => {
                error!("Error receiving UART data: {}", e);
            }
        }
    }
}

/// Writes to the UART directly, reads what [`serial_rx_task`] received.
pub struct SerialChannel {
    uart_tx: UartTx<'static, Async>,
}

impl SerialChannel {
    pub fn new(uart_tx: UartTx<'static, Async>) -> Self {
        Self { uart_tx }
    }
}

impl TextChannel for SerialChannel {
    async fn read_line(&mut self) -> Option<Line> {
        RECEIVED_LINES.try_receive().ok()
    }

    async fn write_line(&mut self, line: &str) {
        for bytes in [line.as_bytes(), b"\r\n"] {
            if let Err(e) = self.uart_tx.write_all(bytes).await {
                warn!("Error writing to UART: {}", e);
                return;
            }
        }
    }
}
