//! A thread-per-connection TCP echo service.
//!
//! One library crate shared by two binaries:
//! - `echo-server`: accepts connections and echoes one message per
//!   connection (a single read of up to 1024 bytes, a single write of the
//!   same bytes, then close)
//! - `echo-client`: sends one message and prints the echoed reply
//!
//! The protocol is deliberately minimal: plaintext, no framing, no enforced
//! terminator, no request-response loop. Each connection carries exactly one
//! message.

pub mod client;
pub mod config;
pub mod server;
