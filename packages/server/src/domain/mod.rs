//! Domain layer for the chat hub.
//!
//! This module contains business logic that is independent of
//! data transfer objects (DTOs) and infrastructure concerns.

pub mod entity;
pub mod error;
pub mod message_pusher;
pub mod repository;
pub mod value_object;

pub use entity::{ChatMessage, NameChange, Participant, RegistrySnapshot};
pub use error::{MessagePushError, RegistryError, RepositoryError, ValueObjectError};
pub use message_pusher::{BroadcastReport, MessagePusher, PusherChannel};
pub use repository::{MessageRepository, ParticipantRegistry};
#[cfg(test)]
pub use repository::MockMessageRepository;
pub use value_object::{
    ConnectionId, ConnectionIdFactory, DisplayName, MessageBody, MessageId, Timestamp,
};
