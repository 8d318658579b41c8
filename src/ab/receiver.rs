//! 交替位接收方状态机。
//! The alternating-bit receiver state machine.

use crate::env::Environment;
use crate::packet::Packet;
use tracing::{debug, trace};

/// A stop-and-wait receiver expecting one sequence bit at a time.
///
/// 每次期待一个序号位的停等接收方。
#[derive(Debug, Default)]
pub struct Receiver {
    expected_bit: u32,
}

impl Receiver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handles a data packet arriving from the link.
    ///
    /// A clean packet carrying the expected bit is acknowledged, delivered
    /// upward, and the expected bit toggles. Anything else (corrupt or
    /// duplicate) re-acknowledges the *other* bit, the last one received in
    /// order; that duplicate-ack is what unblocks a sender stuck
    /// retransmitting, and nothing is re-delivered.
    ///
    /// 处理从链路到达的数据包。
    ///
    /// 携带期望序号位的完好数据包会被确认并向上交付，期望位随之翻转。
    /// 其他情况（损坏或重复）则重新确认*另一个*位，即最后按序收到的位；
    /// 正是这个重复确认解救了困在重传中的发送方，且不会重复交付。
    pub fn on_packet_arrival<E: Environment>(&mut self, env: &mut E, packet: Packet) {
        if !packet.is_corrupt() && packet.seq == self.expected_bit {
            env.transmit(Packet::ack(self.expected_bit));
            env.deliver(packet.payload);
            self.expected_bit ^= 1;
            debug!(seq = packet.seq, "delivered, expecting other bit");
        } else {
            let last_bit = self.expected_bit ^ 1;
            env.transmit(Packet::ack(last_bit));
            trace!(%packet, ack = last_bit, "corrupt or duplicate, re-acked last bit");
        }
    }
}
