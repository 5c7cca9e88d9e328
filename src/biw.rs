//! BIW decoder (C3).
//!
//! Parses the primary Block Information Word (block 0, word 0), which
//! describes the layout of the rest of the frame, and the auxiliary BIWs
//! (block 0, words 1..3), which carry local-id/date/time/spare fields and
//! feed [`crate::clock::ClockState`].

use crate::bits::bitswitch;
use crate::clock::ClockState;

/// Decoded primary Block Information Word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Biw {
    pub collapse: u8,
    pub carryon: u8,
    pub vectorstart: u8,
    pub endofblockinfo: u8,
    pub addressstart: u8,
    pub priority: u8,
}

/// Decoded auxiliary BIW, carried in block 0, words 1..3.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuxiliaryBiw {
    LocalId { tz: u8 },
    Date { year: u16, month: u8, day: u8 },
    Time { hour: u8, minutes: u8, seconds: u8 },
    SpareOffset,
}

/// Decodes the primary BIW from block 0, word 0.
///
/// Field layout, reading reversed bytes from MSB downward after a 6-bit
/// skip: `collapse(3)`, `carryon(2)`, `vectorstart(6)`, `endofblockinfo(2)`,
/// `priority(4)`.
pub fn process_primary_biw(word0: u32) -> Biw {
    let mut w = word0;
    w >>= 6;
    let collapse = bitswitch(w as u8) & 0x07;
    w >>= 2;
    let carryon = bitswitch(w as u8) & 0x03;
    w >>= 6;
    let vectorstart = bitswitch(w as u8) & 0x3F;
    w >>= 2;
    let endofblockinfo = bitswitch(w as u8) & 0x03;
    w >>= 4;
    let priority = bitswitch(w as u8) & 0x0F;

    Biw {
        collapse,
        carryon,
        vectorstart,
        endofblockinfo,
        addressstart: endofblockinfo + 1,
        priority,
    }
}

/// Decodes one auxiliary BIW word and, if it carries a recognized subtype,
/// applies it to `clock`. Returns the decoded variant if recognized; an
/// unrecognized subtype is unreachable (the subtype field is only 2 bits
/// wide after the top 3 discriminator bits are masked off, covering all
/// four cases), so this always succeeds.
///
/// The seconds field is a 3-bit count reconstructed as `s*7 + s/2`
/// (increments of ~7.5s); this is exactly as imprecise as the broadcast
/// format itself, not a bug in this decoder.
pub fn process_auxiliary_biw(word: u32, clock: &mut ClockState) -> AuxiliaryBiw {
    let mut w = word;
    w >>= 20;
    let subtype = bitswitch(w as u8) & 0x07;

    match subtype {
        0x00 => {
            let mut w = word;
            w >>= 17;
            let tz = bitswitch(w as u8) & 0x1F;
            clock.tz = tz;
            AuxiliaryBiw::LocalId { tz }
        }
        0x01 => {
            let mut w = word;
            w >>= 7;
            let month = bitswitch(w as u8) & 0x0F;
            w >>= 5;
            let day = bitswitch(w as u8) & 0x1F;
            w >>= 5;
            let year = 1994 + (bitswitch(w as u8) & 0x1F) as u16;
            clock.month = month;
            clock.day = day;
            clock.year = year;
            AuxiliaryBiw::Date { year, month, day }
        }
        0x02 => {
            let mut w = word;
            w >>= 6;
            let s3 = bitswitch(w as u8) & 0x07;
            let seconds = (s3 * 7) + (s3 >> 1);
            w >>= 6;
            let minutes = bitswitch(w as u8) & 0x3F;
            w >>= 5;
            let hour = bitswitch(w as u8) & 0x1F;
            clock.seconds = seconds;
            clock.minutes = minutes;
            clock.hour = hour;
            AuxiliaryBiw::Time {
                hour,
                minutes,
                seconds,
            }
        }
        _ => AuxiliaryBiw::SpareOffset,
    }
}
