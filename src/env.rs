//! 协议核心与外部模拟器之间的接缝。
//! The seam between the protocol cores and the external emulator.
//!
//! The discrete-event emulator owns the clock, the lossy link and the
//! application layer. It calls *into* the protocol entry points as events
//! occur, and the protocols call back *out* through [`Environment`] to
//! transmit packets, deliver payloads and (re)arm the per-side alarm.
//! Every handler runs to completion on a single thread; no call blocks.
//!
//! 离散事件模拟器拥有时钟、有损链路和应用层。事件发生时它调用协议入口点，
//! 协议则通过 [`Environment`] 回调以发送数据包、向上交付载荷并（重新）设置
//! 本侧的定时器。所有处理函数都在单线程上运行到完成；没有调用会阻塞。

use crate::packet::{Packet, Payload};

/// Monotonic simulation time, in the emulator's abstract time units.
/// 单调的模拟时间，以模拟器的抽象时间单位计。
pub type SimTime = f64;

/// The fixed interface a protocol side uses to act on the outside world.
///
/// Each side (sender or receiver) holds its own handle, so the link toward
/// the peer is implicit in which handle a call goes through.
///
/// 协议一侧用于作用于外部世界的固定接口。
///
/// 每一侧（发送方或接收方）持有自己的句柄，因此指向对端的链路隐含在
/// 调用经由哪个句柄之中。
pub trait Environment {
    /// Places a packet on the outgoing link toward the peer.
    /// 将数据包放到指向对端的出链路上。
    fn transmit(&mut self, packet: Packet);

    /// Hands a fully in-order payload up to the local application layer.
    /// 将完全有序的载荷上交给本地应用层。
    fn deliver(&mut self, payload: Payload);

    /// Schedules this side's single alarm to fire `delay` time units from now.
    /// Re-arming replaces any previously armed alarm.
    ///
    /// 将本侧的单一定时器调度为从现在起 `delay` 个时间单位后触发。
    /// 重新设置会替换先前已设置的定时器。
    fn arm_timer(&mut self, delay: SimTime);

    /// Clears this side's alarm if one is armed.
    /// 如本侧已设置定时器则将其清除。
    fn cancel_timer(&mut self);

    /// Reads the monotonic simulation clock.
    /// 读取单调模拟时钟。
    fn now(&self) -> SimTime;
}
