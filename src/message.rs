//! The `Message` entity (§3): an alphanumeric message assembled across one
//! or more frames.

/// Sentinel for "not parked in any [`crate::parked::ParkedTable`] slot".
pub const NO_SLOT: Option<usize> = None;

/// A message under assembly or ready for emission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// The first recipient address seen for this message.
    pub primary_address: u32,

    /// Recipient addresses, in broadcast order. Duplicates are permitted
    /// if the broadcast repeats them.
    pub recipients: Vec<u32>,

    /// Growing payload buffer of printable 7-bit characters, with inline
    /// ANSI escapes wrapping runs of words that were marked invalid.
    pub payload: Vec<u8>,

    /// FLEX message number, `0..64`.
    pub message_no: u8,

    /// Set from the initial fragment (`fragmentnumber == 3`).
    pub signature: u8,

    /// Decremented once per frame after creation while parked; reaching 0
    /// forces emission with a truncation marker.
    pub ttl: u8,

    /// Set when a fragment with `continued == 0` has been appended.
    pub complete: bool,

    /// Index into the parked table, if currently parked.
    pub slot: Option<usize>,
}

impl Message {
    /// Creates a new, empty message seeded with `primary_address` as its
    /// first recipient, and `ttl` frames to live if parked.
    pub fn new(primary_address: u32, ttl: u8) -> Self {
        Message {
            primary_address,
            recipients: vec![primary_address],
            payload: Vec::new(),
            message_no: 0,
            signature: 0,
            ttl,
            complete: false,
            slot: None,
        }
    }

    /// Appends a recipient address to the message, preserving broadcast
    /// order and permitting duplicates.
    pub fn add_recipient(&mut self, address: u32) {
        self.recipients.push(address);
    }
}
