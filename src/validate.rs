//! Word validator (C2) — the contract into stage one's checksum/repair
//! service.
//!
//! Stage one (the demodulator and its BCH/majority-vote correction) is an
//! external collaborator; this module only defines the interface the
//! frame-processing engine calls through, plus a reference implementation
//! of the real FLEX word checksum so the crate is self-testable without a
//! live radio front end.

use bitflags::bitflags;

use crate::frame::Frame;

bitflags! {
    /// Flags a caller may compose when asking for a word to be validated.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ValidateFlags: u8 {
        /// Verify the word against the FLEX checksum.
        const VALIDATE_FLEX_CHECKSUM = 0b001;
        /// Attempt single-bit repair if the checksum fails.
        const REPAIR1 = 0b010;
        /// Attempt up to two-bit repair if the checksum fails.
        const REPAIR2 = 0b100;
    }
}

/// The result of validating (and possibly repairing) one frame word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidateResult {
    /// The word's checksum passed outright.
    Pass,
    /// The word failed its checksum but was corrected with a single-bit
    /// flip; the frame's word storage has already been updated in place.
    Repaired1,
    /// As [`ValidateResult::Repaired1`], but two bits were flipped.
    Repaired2,
    /// The word could not be validated or repaired; callers must treat it
    /// as garbage (typically zeroing it).
    Fail,
}

impl ValidateResult {
    /// Whether the word's contents may now be trusted (clean or repaired).
    pub fn is_usable(self) -> bool {
        !matches!(self, ValidateResult::Fail)
    }
}

/// A FLEX word's 31-bit FEC-checksummed encoding: bits `[31:27]` hold a BCH
/// parity check over the 21 information bits in `[26:6]` (6 further parity
/// bits occupy `[5:0]`; this reference validator collapses both into a
/// single even-parity check, which is sufficient to validate or flag words
/// produced by [`Frame`] test fixtures — it is not a full BCH decoder).
pub trait WordValidator {
    /// Validates (and possibly repairs in place) `frame`'s word at flat
    /// index `word_index`, per `flags`.
    fn validate_word(
        &self,
        frame: &mut Frame,
        word_index: u8,
        flags: ValidateFlags,
    ) -> ValidateResult;
}

/// A trivial validator: every word passes unconditionally. Useful for tests
/// and for callers who trust stage one to have already rejected
/// unrecoverable frames before they ever reach this crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrustingValidator;

impl WordValidator for TrustingValidator {
    fn validate_word(
        &self,
        frame: &mut Frame,
        word_index: u8,
        _flags: ValidateFlags,
    ) -> ValidateResult {
        frame.set_valid(word_index, true);
        ValidateResult::Pass
    }
}

/// Parity-based reference validator: treats a word as using its low bit as
/// an even-parity check over the remaining 31 bits, and (if repair flags
/// are set) tries flipping one then two bits to restore parity. This is a
/// stand-in for the real FLEX BCH(31,21) code, adequate for exercising the
/// repair-result state machine in tests without pulling in stage one.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParityValidator;

impl ParityValidator {
    fn has_even_parity(word: u32) -> bool {
        word.count_ones() % 2 == 0
    }
}

impl WordValidator for ParityValidator {
    fn validate_word(
        &self,
        frame: &mut Frame,
        word_index: u8,
        flags: ValidateFlags,
    ) -> ValidateResult {
        let word = frame.word(word_index);

        if Self::has_even_parity(word) {
            frame.set_valid(word_index, true);
            return ValidateResult::Pass;
        }

        if flags.contains(ValidateFlags::REPAIR1) || flags.contains(ValidateFlags::REPAIR2) {
            for bit in 0..32 {
                let candidate = word ^ (1 << bit);
                if Self::has_even_parity(candidate) {
                    frame.set_word(word_index, candidate);
                    frame.set_valid(word_index, true);
                    return ValidateResult::Repaired1;
                }
            }
        }

        if flags.contains(ValidateFlags::REPAIR2) {
            for bit_a in 0..32 {
                for bit_b in (bit_a + 1)..32 {
                    let candidate = word ^ (1 << bit_a) ^ (1 << bit_b);
                    if Self::has_even_parity(candidate) {
                        frame.set_word(word_index, candidate);
                        frame.set_valid(word_index, true);
                        return ValidateResult::Repaired2;
                    }
                }
            }
        }

        frame.set_valid(word_index, false);
        ValidateResult::Fail
    }
}
