//! Parked-message table (C8).
//!
//! Holds alpha messages that arrived as a non-final fragment, waiting for
//! their continuation to show up in a later frame. Fixed capacity
//! (`max_messages`, default 5); entries that never complete are evicted by
//! [`ParkedTable::tick_and_expire`] once their TTL runs out (§4.8).

use crate::message::Message;

/// Fixed-capacity pool of messages parked between fragments.
#[derive(Debug, Clone)]
pub struct ParkedTable {
    slots: Vec<Option<Message>>,
}

impl ParkedTable {
    /// Creates an empty table with room for `max_messages` parked entries.
    pub fn new(max_messages: usize) -> Self {
        ParkedTable {
            slots: vec![None; max_messages],
        }
    }

    /// Looks up a parked message by its primary address and message number.
    ///
    /// If found, the message is removed from the table and returned to the
    /// caller: a continuation fragment always consumes the parked slot, so
    /// a message split into more than two fragments doesn't collide with
    /// itself on the next lookup.
    pub fn find(&mut self, address: u32, message_no: u8) -> Option<Message> {
        for slot in &mut self.slots {
            let matches = slot
                .as_ref()
                .is_some_and(|m| m.primary_address == address && m.message_no == message_no);
            if matches {
                return slot.take();
            }
        }
        None
    }

    /// Parks `message` in the first free slot. Returns `false` (dropping
    /// the message) if the table is already full.
    pub fn park(&mut self, message: Message) -> bool {
        for slot in &mut self.slots {
            if slot.is_none() {
                *slot = Some(message);
                return true;
            }
        }
        false
    }

    /// Decrements every parked entry's TTL by one frame, evicting and
    /// returning any entry that reaches zero. Evicted messages are left
    /// incomplete; the caller is expected to NUL-terminate and emit them
    /// with a truncation marker.
    pub fn tick_and_expire(&mut self) -> Vec<Message> {
        let mut expired = Vec::new();
        for slot in &mut self.slots {
            if let Some(msg) = slot {
                msg.ttl = msg.ttl.saturating_sub(1);
                if msg.ttl == 0 {
                    expired.push(slot.take().unwrap());
                }
            }
        }
        expired
    }

    /// Number of currently parked messages (for tests and diagnostics).
    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn park_then_find_round_trips_and_consumes_the_slot() {
        let mut t = ParkedTable::new(5);
        let mut m = Message::new(100, 10);
        m.message_no = 3;
        assert!(t.park(m));
        assert_eq!(t.len(), 1);

        let found = t.find(100, 3).expect("message should be parked");
        assert_eq!(found.primary_address, 100);
        assert_eq!(t.len(), 0);
        assert!(t.find(100, 3).is_none());
    }

    #[test]
    fn find_ignores_mismatched_message_number() {
        let mut t = ParkedTable::new(5);
        let mut m = Message::new(100, 10);
        m.message_no = 3;
        t.park(m);
        assert!(t.find(100, 4).is_none());
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn park_fails_once_table_is_full() {
        let mut t = ParkedTable::new(1);
        assert!(t.park(Message::new(1, 10)));
        assert!(!t.park(Message::new(2, 10)));
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn tick_and_expire_evicts_only_zero_ttl_entries() {
        let mut t = ParkedTable::new(5);
        let mut fresh = Message::new(1, 2);
        fresh.message_no = 1;
        let mut stale = Message::new(2, 1);
        stale.message_no = 2;
        t.park(fresh);
        t.park(stale);

        let expired = t.tick_and_expire();
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].primary_address, 2);
        assert_eq!(t.len(), 1);

        let expired = t.tick_and_expire();
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].primary_address, 1);
        assert!(t.is_empty());
    }
}
