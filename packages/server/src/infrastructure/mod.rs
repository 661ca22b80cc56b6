//! Infrastructure layer: storage, connection bookkeeping and wire formats.

pub mod dto;
pub mod message_pusher;
pub mod repository;
