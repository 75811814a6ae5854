//! `relay-hub` — connection lifecycle and fan-out engine.
//!
//! # Overview
//!
//! A single [`hub::Hub`] task owns the set of admitted clients. Everything
//! else talks to it through a cloneable [`hub::HubHandle`]:
//!
//! | Command     | Effect                                                        |
//! |-------------|---------------------------------------------------------------|
//! | `Admit`     | add client, notify every *other* member                       |
//! | `Dismiss`   | remove client, close its queue, notify the remaining members  |
//! | `Broadcast` | try-send to every member; full or closed queues are evicted   |
//! | `Members`   | report the current member count                               |
//!
//! Each socket gets a reader task ([`pump::read_loop`]) and a writer task
//! ([`pump::write_loop`]); [`session::attach`] wires both up.

pub mod client;
pub mod error;
pub mod hub;
pub mod pump;
pub mod session;
pub mod transport;

pub use client::{Client, ClientId, OutboundQueue};
pub use error::{HubError, TransportError};
pub use hub::{Hub, HubCommand, HubHandle};
pub use session::{attach, SessionOptions};
pub use transport::{Connection, MessageSink, MessageSource};
