//! UseCase layer
//!
//! 1 操作につき 1 ユースケース。ドメイン層の trait（Repository, MessagePusher）
//! だけに依存し、DTO の組み立ては UI 層が行う。

mod acknowledge_ping;
mod connect_participant;
mod disconnect_participant;
mod error;
mod get_hub_state;
mod rename_participant;
mod send_message;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use acknowledge_ping::AcknowledgePingUseCase;
pub use connect_participant::{BACKLOG_LIMIT, ConnectParticipantUseCase};
pub use disconnect_participant::DisconnectParticipantUseCase;
pub use error::{ConnectError, RenameError, SendMessageError};
pub use get_hub_state::GetHubStateUseCase;
pub use rename_participant::RenameParticipantUseCase;
pub use send_message::SendMessageUseCase;
