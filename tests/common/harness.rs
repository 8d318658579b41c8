//! 集成测试的离散事件链路模拟器。
//! A discrete-event link simulator for the integration tests.
//!
//! Plays the role of the out-of-scope network emulator: it owns the clock,
//! delays packets by a fixed per-hop latency, drops or corrupts them with
//! seeded randomness, and dispatches application, packet and alarm events
//! in chronological order. The wire preserves send order per direction.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use shrike_arq::env::{Environment, SimTime};
use shrike_arq::packet::{Message, PAYLOAD_SIZE, Packet, Payload};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};

/// One-way link latency in simulation time units.
pub const LINK_DELAY: SimTime = 5.0;

/// Loss/corruption knobs for the simulated link.
pub struct LinkProfile {
    pub loss: f64,
    pub corrupt: f64,
    pub seed: u64,
}

impl LinkProfile {
    pub fn perfect() -> Self {
        Self {
            loss: 0.0,
            corrupt: 0.0,
            seed: 1,
        }
    }

    pub fn noisy(seed: u64) -> Self {
        Self {
            loss: 0.2,
            corrupt: 0.15,
            seed,
        }
    }
}

/// The sender-side protocol surface the simulator drives.
pub trait SenderProtocol {
    fn init(&mut self, _env: &mut SideEnv) {}
    /// Offers an application message; `false` means "busy, offer it again
    /// later" (stop-and-wait rejects while a packet is in flight).
    fn offer(&mut self, env: &mut SideEnv, message: Message) -> bool;
    fn on_packet(&mut self, env: &mut SideEnv, packet: Packet);
    fn on_alarm(&mut self, env: &mut SideEnv);
}

/// The receiver-side protocol surface the simulator drives.
pub trait ReceiverProtocol {
    fn on_packet(&mut self, env: &mut SideEnv, packet: Packet);
}

impl SenderProtocol for shrike_arq::ab::Sender {
    fn offer(&mut self, env: &mut SideEnv, message: Message) -> bool {
        self.send(env, message).is_ok()
    }
    fn on_packet(&mut self, env: &mut SideEnv, packet: Packet) {
        self.on_packet_arrival(env, packet);
    }
    fn on_alarm(&mut self, env: &mut SideEnv) {
        self.on_timer_fired(env);
    }
}

impl ReceiverProtocol for shrike_arq::ab::Receiver {
    fn on_packet(&mut self, env: &mut SideEnv, packet: Packet) {
        self.on_packet_arrival(env, packet);
    }
}

impl SenderProtocol for shrike_arq::gbn::Sender {
    fn offer(&mut self, env: &mut SideEnv, message: Message) -> bool {
        self.on_outbound_message(env, message).is_ok()
    }
    fn on_packet(&mut self, env: &mut SideEnv, packet: Packet) {
        self.on_packet_arrival(env, packet);
    }
    fn on_alarm(&mut self, env: &mut SideEnv) {
        self.on_timer_fired(env);
    }
}

impl ReceiverProtocol for shrike_arq::gbn::Receiver {
    fn on_packet(&mut self, env: &mut SideEnv, packet: Packet) {
        self.on_packet_arrival(env, packet);
    }
}

impl SenderProtocol for shrike_arq::sr::Sender {
    fn init(&mut self, env: &mut SideEnv) {
        shrike_arq::sr::Sender::init(self, env);
    }
    fn offer(&mut self, env: &mut SideEnv, message: Message) -> bool {
        self.on_outbound_message(env, message).is_ok()
    }
    fn on_packet(&mut self, env: &mut SideEnv, packet: Packet) {
        self.on_packet_arrival(env, packet);
    }
    fn on_alarm(&mut self, env: &mut SideEnv) {
        self.on_timer_fired(env);
    }
}

impl ReceiverProtocol for shrike_arq::sr::Receiver {
    fn on_packet(&mut self, env: &mut SideEnv, packet: Packet) {
        self.on_packet_arrival(env, packet);
    }
}

/// One side's view of the environment: captured side effects plus the
/// shared clock.
#[derive(Debug, Default)]
pub struct SideEnv {
    now: SimTime,
    outbox: Vec<Packet>,
    pub delivered: Vec<Payload>,
    alarm_deadline: Option<SimTime>,
    /// Bumped on every arm/cancel so a scheduled fire event can detect it
    /// went stale.
    alarm_generation: u64,
}

impl Environment for SideEnv {
    fn transmit(&mut self, packet: Packet) {
        self.outbox.push(packet);
    }

    fn deliver(&mut self, payload: Payload) {
        self.delivered.push(payload);
    }

    fn arm_timer(&mut self, delay: SimTime) {
        self.alarm_generation += 1;
        self.alarm_deadline = Some(self.now + delay);
    }

    fn cancel_timer(&mut self) {
        self.alarm_generation += 1;
        self.alarm_deadline = None;
    }

    fn now(&self) -> SimTime {
        self.now
    }
}

enum EventKind {
    AppMessage(Message),
    PacketToReceiver(Packet),
    PacketToSender(Packet),
    SenderAlarm { generation: u64 },
}

struct Event {
    at: SimTime,
    /// Monotonic tie-breaker; keeps same-instant events in schedule order,
    /// which is what preserves per-direction wire order.
    id: u64,
    kind: EventKind,
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .at
            .total_cmp(&self.at)
            .then_with(|| other.id.cmp(&self.id))
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Event {}

/// A sender, a receiver and the unreliable link between them.
pub struct Sim<S, R> {
    pub sender: S,
    pub receiver: R,
    pub a_env: SideEnv,
    pub b_env: SideEnv,
    events: BinaryHeap<Event>,
    next_id: u64,
    clock: SimTime,
    rng: SmallRng,
    profile: LinkProfile,
    /// Messages the sender has not accepted yet (stop-and-wait back-pressure).
    backlog: VecDeque<Message>,
    scheduled_alarm_generation: u64,
}

impl<S: SenderProtocol, R: ReceiverProtocol> Sim<S, R> {
    pub fn new(mut sender: S, receiver: R, profile: LinkProfile) -> Self {
        let mut a_env = SideEnv::default();
        sender.init(&mut a_env);
        let mut sim = Self {
            sender,
            receiver,
            a_env,
            b_env: SideEnv::default(),
            events: BinaryHeap::new(),
            next_id: 0,
            clock: 0.0,
            rng: SmallRng::seed_from_u64(profile.seed),
            profile,
            backlog: VecDeque::new(),
            scheduled_alarm_generation: 0,
        };
        sim.flush_side_effects();
        sim
    }

    /// Schedules `count` tagged application messages, `spacing` apart,
    /// starting at the current clock.
    pub fn offer_tagged_messages(&mut self, count: u8, spacing: SimTime) {
        for i in 0..count {
            let at = self.clock + f64::from(i) * spacing;
            self.schedule(at, EventKind::AppMessage(tagged_message(i + 1)));
        }
    }

    /// Runs the event loop until `expected` payloads were delivered or the
    /// clock passes `max_time`. Returns whether the goal was reached.
    pub fn run_until_delivered(&mut self, expected: usize, max_time: SimTime) -> bool {
        while let Some(event) = self.events.pop() {
            if event.at > max_time {
                break;
            }
            self.clock = event.at;
            self.a_env.now = self.clock;
            self.b_env.now = self.clock;

            match event.kind {
                EventKind::AppMessage(message) => {
                    self.backlog.push_back(message);
                    self.try_feed_sender();
                }
                EventKind::PacketToReceiver(packet) => {
                    self.receiver.on_packet(&mut self.b_env, packet);
                }
                EventKind::PacketToSender(packet) => {
                    self.sender.on_packet(&mut self.a_env, packet);
                    self.try_feed_sender();
                }
                EventKind::SenderAlarm { generation } => {
                    if self.a_env.alarm_generation == generation
                        && self.a_env.alarm_deadline == Some(event.at)
                    {
                        // Consumed, not cancelled: the handler may re-arm.
                        self.a_env.alarm_deadline = None;
                        self.sender.on_alarm(&mut self.a_env);
                    }
                }
            }
            self.flush_side_effects();

            if self.b_env.delivered.len() >= expected {
                return true;
            }
        }
        self.b_env.delivered.len() >= expected
    }

    fn try_feed_sender(&mut self) {
        while let Some(&message) = self.backlog.front() {
            if self.sender.offer(&mut self.a_env, message) {
                self.backlog.pop_front();
            } else {
                break;
            }
        }
    }

    fn schedule(&mut self, at: SimTime, kind: EventKind) {
        let id = self.next_id;
        self.next_id += 1;
        self.events.push(Event { at, id, kind });
    }

    /// Routes freshly transmitted packets through the unreliable link and
    /// schedules a fire event for a newly armed alarm.
    fn flush_side_effects(&mut self) {
        let now = self.clock;

        let outbound: Vec<Packet> = self.a_env.outbox.drain(..).collect();
        for packet in outbound {
            if let Some(packet) = self.through_link(packet) {
                self.schedule(now + LINK_DELAY, EventKind::PacketToReceiver(packet));
            }
        }
        let returning: Vec<Packet> = self.b_env.outbox.drain(..).collect();
        for packet in returning {
            if let Some(packet) = self.through_link(packet) {
                self.schedule(now + LINK_DELAY, EventKind::PacketToSender(packet));
            }
        }

        if let Some(deadline) = self.a_env.alarm_deadline {
            if self.a_env.alarm_generation > self.scheduled_alarm_generation {
                self.scheduled_alarm_generation = self.a_env.alarm_generation;
                let generation = self.a_env.alarm_generation;
                self.schedule(deadline, EventKind::SenderAlarm { generation });
            }
        }
    }

    /// Applies loss and corruption. `None` means the packet was dropped.
    fn through_link(&mut self, mut packet: Packet) -> Option<Packet> {
        if self.rng.random::<f64>() < self.profile.loss {
            return None;
        }
        if self.rng.random::<f64>() < self.profile.corrupt {
            packet.checksum = packet.checksum.wrapping_add(1);
        }
        Some(packet)
    }
}

/// A message whose payload repeats `tag`.
pub fn tagged_message(tag: u8) -> Message {
    Message::new([tag; PAYLOAD_SIZE])
}

/// The payloads `offer_tagged_messages(count, _)` should produce in order.
pub fn expected_payloads(count: u8) -> Vec<Payload> {
    (1..=count).map(|tag| [tag; PAYLOAD_SIZE]).collect()
}
