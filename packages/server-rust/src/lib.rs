//! `Roster` server -- the user-management domain behind two transports: a
//! synchronous HTTP API and an asynchronous AMQP request/response bridge.
//!
//! The broker bridge is the core of the crate:
//!
//! 1. **Consumer** (`rmq::consumer`): owns the connection/channel, pulls
//!    deliveries with manual acknowledgement, and honors cancellation.
//! 2. **Dispatcher** (`rmq::dispatch`): routes a decoded request envelope
//!    to a domain operation and returns its outcome.
//! 3. **Classifier** (`roster-core::messages::response`): turns the outcome
//!    into the wire envelope the consumer publishes back.
//!
//! The token service (`token`) authorizes callers on both transports with
//! sealed, self-contained tokens.

pub mod config;
pub mod http;
pub mod logging;
pub mod password;
pub mod rmq;
pub mod service;
pub mod shutdown;
pub mod storage;
pub mod token;
pub mod traits;

pub use shutdown::{LifecycleState, ShutdownController};
pub use token::TokenService;
pub use traits::{AuthApi, Cache, UserApi, UserStore};
