//! Mapping table (C6).
//!
//! Binds a `(frame, tempaddress)` pair to one or more recipient addresses,
//! so that a broadcast can re-use a single short instruction vector across
//! many alpha vectors instead of repeating full addresses. Mappings for a
//! given frame live for exactly one cycle: cleared just before the frame
//! recurs, then rebuilt from that frame's own instruction vectors (§4.6).

/// One `(frame, tempaddress) -> addresses` binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mapping {
    pub frame: u8,
    pub tempaddress: u8,
    pub addresses: Vec<u32>,
}

/// Fixed-capacity pool of live [`Mapping`]s (§4.6).
///
/// Capacity is bounded (`max_mappings`, default 8) so memory use stays flat
/// regardless of how many distinct temp-address bindings a broadcast
/// exercises; once full, [`MappingTable::add_mapping`] drops new bindings
/// rather than growing.
#[derive(Debug, Clone)]
pub struct MappingTable {
    slots: Vec<Option<Mapping>>,
}

impl MappingTable {
    /// Creates an empty table with room for `max_mappings` live entries.
    pub fn new(max_mappings: usize) -> Self {
        MappingTable {
            slots: vec![None; max_mappings],
        }
    }

    /// Adds `address` to the `(frame, tempaddr)` mapping, creating it if
    /// absent. Returns `false` (leaving existing state untouched) if the
    /// table is full and no matching entry already exists.
    pub fn add_mapping(&mut self, frame: u8, tempaddr: u8, address: u32) -> bool {
        for slot in self.slots.iter_mut().flatten() {
            if slot.frame == frame && slot.tempaddress == tempaddr {
                slot.addresses.push(address);
                return true;
            }
        }

        for slot in &mut self.slots {
            if slot.is_none() {
                *slot = Some(Mapping {
                    frame,
                    tempaddress: tempaddr,
                    addresses: vec![address],
                });
                return true;
            }
        }

        false
    }

    /// Iterates the recipient addresses bound to `(frame, tempaddr)`, in
    /// insertion order. Empty if no such mapping exists.
    pub fn addresses_for(&self, frame: u8, tempaddr: u8) -> impl Iterator<Item = u32> + '_ {
        self.slots
            .iter()
            .flatten()
            .filter(move |m| m.frame == frame && m.tempaddress == tempaddr)
            .flat_map(|m| m.addresses.iter().copied())
    }

    /// Drops every mapping entry for `frame`.
    pub fn clear_mappings(&mut self, frame: u8) {
        for slot in &mut self.slots {
            if slot.as_ref().is_some_and(|m| m.frame == frame) {
                *slot = None;
            }
        }
    }

    /// Number of live mapping entries (for tests and diagnostics).
    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
