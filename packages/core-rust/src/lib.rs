//! `Roster` core -- domain model, wire envelopes, and the error taxonomy
//! shared by the HTTP transport and the broker bridge.

pub mod domain;
pub mod error;
pub mod messages;

pub use domain::{NewUser, TokenPayload, User, UserRole, UserUpdate};
pub use error::DomainError;
pub use messages::{status_code, OperationKind, RequestMessage, ResponseMessage};
