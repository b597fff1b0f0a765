use defmt::{debug, warn};
use embassy_net::{IpEndpoint, udp::UdpSocket};
use podium_pure::{io::Notifier, osc};

/// Sends OSC triggers as UDP datagrams. Nothing is retried.
pub struct UdpNotifier<'a> {
    socket: UdpSocket<'a>,
    destination: IpEndpoint,
    buffer: [u8; 128],
}

impl<'a> UdpNotifier<'a> {
    /// `socket` must already be bound.
    pub fn new(socket: UdpSocket<'a>, destination: IpEndpoint) -> Self {
        Self {
            socket,
            destination,
            buffer: [0; 128],
        }
    }
}

impl Notifier for UdpNotifier<'_> {
    async fn notify(&mut self, base_topic: &str, index: usize) {
        let packet = match osc::encode_trigger(base_topic, index, &mut self.buffer) {
            Ok(packet) => packet,
            Err(e) => {
                warn!("Can't encode trigger {}: {}", index, e);
                return;
            }
        };
        debug!("Sending trigger {} to {}", index, self.destination);
        if let Err(e) = self.socket.send_to(packet, self.destination).await {
            warn!("Error sending trigger: {}", e);
        }
    }
}
