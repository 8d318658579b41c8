//! 测试辅助工具模块
//! Test utilities module

#![cfg(test)]

use crate::env::{Environment, SimTime};
use crate::packet::{Message, PAYLOAD_SIZE, Packet, Payload};

/// A recording environment for driving protocol handlers by hand.
///
/// Every outbound call the protocol makes is captured for inspection:
/// transmitted packets, delivered payloads and the state of the single
/// alarm. The clock only moves when a test advances it.
///
/// 用于手动驱动协议处理函数的记录型环境。
///
/// 协议发出的每个出向调用都被捕获以供检查：已发送的数据包、已交付的载荷
/// 以及单一定时器的状态。时钟只在测试推进它时才移动。
#[derive(Debug, Default)]
pub struct MockEnv {
    pub now: SimTime,
    pub transmitted: Vec<Packet>,
    pub delivered: Vec<Payload>,
    /// Absolute deadline of the armed alarm, if any.
    pub alarm: Option<SimTime>,
}

impl MockEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the clock forward by `dt` time units.
    pub fn advance(&mut self, dt: SimTime) {
        self.now += dt;
    }

    /// Takes and clears everything transmitted so far.
    pub fn take_transmitted(&mut self) -> Vec<Packet> {
        std::mem::take(&mut self.transmitted)
    }

    /// Whether the armed alarm (if any) is due at the current clock.
    pub fn alarm_due(&self) -> bool {
        self.alarm.is_some_and(|deadline| deadline <= self.now)
    }
}

impl Environment for MockEnv {
    fn transmit(&mut self, packet: Packet) {
        self.transmitted.push(packet);
    }

    fn deliver(&mut self, payload: Payload) {
        self.delivered.push(payload);
    }

    fn arm_timer(&mut self, delay: SimTime) {
        self.alarm = Some(self.now + delay);
    }

    fn cancel_timer(&mut self) {
        self.alarm = None;
    }

    fn now(&self) -> SimTime {
        self.now
    }
}

/// A message whose payload is `tag` repeated, handy for tracing deliveries.
pub fn msg(tag: u8) -> Message {
    Message::new([tag; PAYLOAD_SIZE])
}

/// The payload `msg(tag)` carries.
pub fn payload(tag: u8) -> Payload {
    [tag; PAYLOAD_SIZE]
}

/// Corrupts a packet by flipping one payload byte, leaving the stored
/// checksum untouched.
pub fn corrupted(mut packet: Packet) -> Packet {
    packet.payload[0] ^= 0xff;
    packet
}

/// Initializes test logging once; later calls are no-ops.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
