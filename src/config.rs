//! Configuration knobs (§6). Defaults match the original firmware's
//! `#define`s.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Tunables for [`crate::Decoder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Config {
    /// Maximum number of live temp-address mappings.
    pub max_mappings: usize,

    /// Maximum number of parked (fragmented, incomplete) messages.
    pub max_messages: usize,

    /// Frames a parked message survives without a new fragment before
    /// being force-emitted with a truncation marker.
    pub long_msg_ttl: u8,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_mappings: 8,
            max_messages: 5,
            long_msg_ttl: 10,
        }
    }
}
