//! Outbound send primitive

use lsr_wire::{Packet, Port};

/// Fire-and-forget packet sink provided by whoever hosts the router.
///
/// Delivery, ordering and loss are the host's business; the router only
/// names the local port.
pub trait Transport {
    /// Send a packet out of a local port
    fn send(&mut self, port: Port, packet: Packet);
}

/// Collects outgoing packets in send order
impl Transport for Vec<(Port, Packet)> {
    fn send(&mut self, port: Port, packet: Packet) {
        self.push((port, packet));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use lsr_wire::Address;

    fn forward_through(transport: &mut dyn Transport) {
        transport.send(
            2,
            Packet::data(Address::from("A"), Address::from("B"), Bytes::new()),
        );
    }

    #[test]
    fn test_vec_transport_keeps_order() {
        let mut outbox: Vec<(Port, Packet)> = Vec::new();
        outbox.send(1, Packet::data(Address::from("A"), Address::from("C"), Bytes::new()));
        forward_through(&mut outbox);

        let ports: Vec<Port> = outbox.iter().map(|(port, _)| *port).collect();
        assert_eq!(ports, vec![1, 2]);
    }
}
