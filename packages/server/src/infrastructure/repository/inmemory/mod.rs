pub mod participant;

pub use participant::{ConnectionTable, InMemoryParticipantRegistry, SharedConnectionTable};
