//! 交替位协议：窗口为一的停等发送方与接收方。
//! The alternating-bit protocol: stop-and-wait sender and receiver with a
//! window of one.

pub mod receiver;
pub mod sender;


pub use receiver::Receiver;
pub use sender::Sender;
