//! 交替位发送方状态机。
//! The alternating-bit sender state machine.

use crate::config::Config;
use crate::env::{Environment, SimTime};
use crate::error::{Error, Result};
use crate::packet::{Message, Packet};
use crate::rtt::RttEstimator;
use tracing::{debug, trace, warn};

/// The packet currently awaiting acknowledgment.
/// 当前等待确认的数据包。
#[derive(Debug, Clone, Copy)]
struct InFlight {
    packet: Packet,
    sent_at: SimTime,
    /// Set on the first retransmission; suppresses RTT sampling (Karn's rule).
    /// 首次重传时置位；抑制 RTT 采样（Karn 规则）。
    retransmitted: bool,
}

/// A stop-and-wait sender alternating its sequence bit between 0 and 1.
///
/// The sender is idle while nothing is in flight; [`Sender::send`] rejects
/// a new message until the outstanding one is acknowledged.
///
/// 在 0 与 1 之间交替序号位的停等发送方。
///
/// 无在途数据包时发送方处于空闲状态；在途数据包被确认前，
/// [`Sender::send`] 会拒绝新消息。
#[derive(Debug)]
pub struct Sender {
    /// The sequence bit the next fresh packet will carry.
    seq_bit: u32,
    in_flight: Option<InFlight>,
    rtt: RttEstimator,
}

impl Sender {
    /// Creates a sender from a validated configuration.
    /// 从已验证的配置创建发送方。
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            seq_bit: 0,
            in_flight: None,
            rtt: RttEstimator::new(config.initial_rtt),
        })
    }

    /// Whether no packet is in flight.
    /// 是否没有在途数据包。
    pub fn is_idle(&self) -> bool {
        self.in_flight.is_none()
    }

    /// The current adaptive timeout interval, exposed for observation.
    pub fn timeout_interval(&self) -> SimTime {
        self.rtt.timeout_interval()
    }

    /// Accepts an outbound application message.
    ///
    /// Transmits it under the current sequence bit, arms the retransmission
    /// alarm and records the send time. Fails with [`Error::SenderBusy`]
    /// while a packet is still awaiting acknowledgment.
    ///
    /// 接受一条出向应用消息。
    ///
    /// 以当前序号位发送，设置重传定时器并记录发送时间。
    /// 若仍有数据包等待确认，则以 [`Error::SenderBusy`] 失败。
    pub fn send<E: Environment>(&mut self, env: &mut E, message: Message) -> Result<()> {
        if self.in_flight.is_some() {
            return Err(Error::SenderBusy);
        }
        let packet = Packet::data(self.seq_bit, 0, &message);
        env.transmit(packet);
        self.in_flight = Some(InFlight {
            packet,
            sent_at: env.now(),
            retransmitted: false,
        });
        env.arm_timer(self.rtt.timeout_interval());
        debug!(seq = self.seq_bit, "sent, awaiting ack");
        Ok(())
    }

    /// Handles a packet arriving from the link (an acknowledgment).
    ///
    /// Corrupt packets and acknowledgments for the wrong bit are ignored.
    /// A matching acknowledgment cancels the alarm, feeds the estimator when
    /// the flight was never retransmitted, and toggles the sequence bit.
    ///
    /// 处理从链路到达的数据包（确认）。
    ///
    /// 损坏的数据包和错误序号位的确认被忽略。匹配的确认会取消定时器、
    /// 在该数据包从未重传时喂给估算器一个样本，并翻转序号位。
    pub fn on_packet_arrival<E: Environment>(&mut self, env: &mut E, packet: Packet) {
        if packet.is_corrupt() || packet.ack != self.seq_bit {
            trace!(%packet, expected = self.seq_bit, "ignoring ack");
            return;
        }
        let Some(flight) = self.in_flight.take() else {
            trace!(%packet, "ack with nothing in flight, ignoring");
            return;
        };
        env.cancel_timer();
        if !flight.retransmitted {
            self.rtt.update(env.now() - flight.sent_at);
        }
        self.seq_bit ^= 1;
        debug!(next_seq = self.seq_bit, "ack accepted, sender idle");
    }

    /// Handles the retransmission alarm firing.
    ///
    /// Retransmits the in-flight packet and re-arms the alarm at double the
    /// estimated interval, backing off under repeated loss.
    ///
    /// 处理重传定时器触发。
    ///
    /// 重传在途数据包，并以两倍估算间隔重新设置定时器，在持续丢包下退避。
    pub fn on_timer_fired<E: Environment>(&mut self, env: &mut E) {
        let Some(flight) = self.in_flight.as_mut() else {
            trace!("alarm fired while idle, ignoring");
            return;
        };
        env.transmit(flight.packet);
        flight.retransmitted = true;
        env.arm_timer(self.rtt.timeout_interval() * 2.0);
        warn!(seq = flight.packet.seq, "timeout, retransmitted");
    }
}
