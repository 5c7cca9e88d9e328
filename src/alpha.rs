//! Alpha header and payload assembler (C7).
//!
//! An alpha vector's payload words carry a small header in the first word
//! (plus a signature byte in the second, for the initial fragment) followed
//! by 3 printable characters per remaining word. Fragments arrive in
//! separate frames and are stitched together in [`Message::payload`] by
//! repeated calls to [`append_alpha`].

use crate::bits::bitswitch;
use crate::frame::Frame;
use crate::message::Message;

/// Decoded alpha vector header (first two payload words).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlphaHeader {
    pub fragmentcheck: u16,
    pub maildrop: bool,
    pub retrieval: bool,
    pub messagenumber: u8,
    pub fragmentnumber: u8,
    pub continued: bool,
    /// Only meaningful when `fragmentnumber == 3` (the initial fragment);
    /// zero otherwise.
    pub signature: u8,
}

/// Decodes the header carried in an alpha vector's first payload word,
/// pulling the signature byte from the second word when this is the
/// initial fragment (`fragmentnumber == 3`).
pub fn decode_alpha_header(firstword: u32, secondword: u32) -> AlphaHeader {
    let mut fragmentcheck = bitswitch((firstword >> 24) as u8) as u16;
    fragmentcheck |= ((bitswitch((firstword >> 16) as u8) & 0x03) as u16) << 8;

    let mut w = firstword;
    w >>= 4;
    let maildrop = bitswitch(w as u8) & 0x01 != 0;
    w >>= 1;
    let retrieval = bitswitch(w as u8) & 0x01 != 0;
    w >>= 6;
    let messagenumber = bitswitch(w as u8) & 0x3F;
    w >>= 2;
    let fragmentnumber = bitswitch(w as u8) & 0x03;
    w >>= 1;
    let continued = bitswitch(w as u8) & 0x01 != 0;

    let signature = if fragmentnumber == 3 {
        bitswitch((secondword >> 24) as u8) & 0x7F
    } else {
        0
    };

    AlphaHeader {
        fragmentcheck,
        maildrop,
        retrieval,
        messagenumber,
        fragmentnumber,
        continued,
        signature,
    }
}

/// The payload buffer could not be grown to hold an incoming fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocError;

fn try_grow(buf: &mut Vec<u8>, additional: usize) -> Result<(), AllocError> {
    buf.try_reserve(additional).map_err(|_| AllocError)
}

/// Appends the alpha vector at `start..start+length` in `frame` to
/// `message`'s payload.
///
/// Each payload word beyond the header contributes up to 3 printable
/// characters; a word the frame-level validation marked invalid has its
/// characters wrapped in an ANSI reverse-video escape (`ESC [ 7 m` ...
/// `ESC [ 0 m`) and any non-printable byte within it replaced with `0xDB`.
/// A final fragment (`continued == false`) is NUL-terminated and marks the
/// message complete.
///
/// Returns [`AllocError`] if the payload buffer cannot be grown, leaving
/// `message` untouched.
pub fn append_alpha(
    frame: &Frame,
    start: u8,
    length: u8,
    message: &mut Message,
) -> Result<(), AllocError> {
    let header = decode_alpha_header(frame.word(start), frame.word(start + 1));
    let is_initial_fragment = header.fragmentnumber == 3 || message.payload.is_empty();

    if is_initial_fragment {
        let total = ((length as usize).saturating_sub(1) * 3).saturating_sub(header.continued as usize);
        try_grow(&mut message.payload, total)?;
        message.payload.clear();
        message.message_no = header.messagenumber;
        message.signature = header.signature;
    } else {
        let extra = (length as usize).saturating_sub(1) * 3 + 1 - header.continued as usize;
        try_grow(&mut message.payload, extra)?;
    }

    let mut bytecount_start: u8 = if header.fragmentnumber == 3 { 1 } else { 0 };

    for wordcount in (start + 1)..(start + length) {
        let word = frame.word(wordcount);
        let valid = frame.is_valid(wordcount);

        if !valid {
            try_grow(&mut message.payload, 4)?;
            message.payload.extend_from_slice(&[0x1B, 0x5B, 0x37, 0x6D]);
        }

        for bytecount in bytecount_start..3 {
            let ch = bitswitch((word >> (24 - 7 * bytecount)) as u8) & 0x7F;
            if ch > 0x1F {
                message.payload.push(ch);
            } else if !valid {
                message.payload.push(0xDB);
            }
        }
        bytecount_start = 0;

        if !valid {
            message.payload.extend_from_slice(&[0x1B, 0x5B, 0x30, 0x6D]);
        }
    }

    if !header.continued {
        message.payload.push(0);
        message.complete = true;
        message.ttl = 0;
    }

    Ok(())
}
