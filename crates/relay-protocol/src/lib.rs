pub mod envelope;

pub use envelope::{Content, Envelope, Role};
