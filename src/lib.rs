//! A [sans-I/O](https://sans-io.readthedocs.io/how-to-sans-io.html) decoder
//! for the second-stage, frame-processing stage of the FLEX paging
//! protocol. Frames already demodulated and block-checksummed by stage one
//! are handed in one at a time; this crate decodes their block information
//! words, vectors and addresses, assembles alphanumeric messages across
//! fragments, and reports completed messages through a [`sink::MessageSink`].
//!
//! Common abbreviations:
//!
//! - BIW: block information word;
//! - FIW: frame information word;
//! - RIC: radio identity code (a short address, displayed address-minus-base);
//! - TTL: time to live, here measured in frames rather than seconds.

pub mod address;
pub mod alpha;
pub mod bits;
pub mod biw;
pub mod clock;
pub mod config;
pub mod decoder;
pub mod error;
pub mod frame;
pub mod mapping;
pub mod message;
pub mod parked;
pub mod sink;
pub mod validate;
pub mod vector;

pub use config::Config;
pub use decoder::Decoder;
pub use error::{ProcessOutcome, RejectReason};
pub use frame::{Block, Fiw, Frame};
pub use message::Message;
