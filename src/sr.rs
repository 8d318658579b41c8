//! 选择重传协议：逐包确认、逐包定时器、接收方乱序缓冲。
//! The selective-repeat protocol: per-packet acknowledgments, per-packet
//! timers, and receiver-side out-of-order buffering.

pub mod receiver;
pub mod sender;


pub use receiver::Receiver;
pub use sender::Sender;
