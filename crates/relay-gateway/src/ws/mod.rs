pub mod connection;
pub mod socket;
