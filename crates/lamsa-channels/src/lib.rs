//! Delivery channel senders.
//!
//! Every channel implements the single [`sender::ChannelSender`]
//! capability; the dispatcher and retry scheduler never see a concrete
//! channel type. Vendor request/response shapes stay inside each sender.

pub mod email;
pub mod mock;
pub mod push;
pub mod sender;
pub mod sms;
pub mod websocket;

pub use sender::{ChannelSender, SendContext, SendOutcome};
