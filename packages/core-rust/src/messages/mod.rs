//! Wire envelopes exchanged over the broker.
//!
//! A request envelope is pulled from the input queue, dispatched, and
//! answered with a response envelope on the output exchange. Both sides are
//! plain JSON; the request's `type` field selects the operation.

pub mod request;
pub mod response;

pub use request::{OperationKind, RequestMessage};
pub use response::{status_code, ResponseMessage, STATUS_OK};
