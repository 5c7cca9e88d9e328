//! Message output sinks (§6).
//!
//! [`crate::Decoder::process_frame`] hands completed or expired messages to
//! a [`MessageSink`] rather than returning them, mirroring the original
//! firmware's choice to stream output over UART as soon as a message is
//! ready instead of buffering it for the caller.

use std::io::{self, Write};

use crate::address::as_ric;
use crate::frame::Fiw;
use crate::message::Message;

/// Destination for frame markers and completed/expired messages.
pub trait MessageSink {
    fn begin_frame(&mut self, fiw: Fiw) -> io::Result<()>;
    fn end_frame(&mut self) -> io::Result<()>;

    /// `truncated` is set when the message is being force-emitted by a TTL
    /// expiry rather than having arrived as a complete, final fragment.
    fn message(&mut self, msg: &Message, truncated: bool) -> io::Result<()>;
}

/// Strips a single trailing NUL terminator, if present, for display.
fn payload_text(msg: &Message) -> &[u8] {
    match msg.payload.split_last() {
        Some((0, rest)) => rest,
        _ => &msg.payload,
    }
}

/// Free-form, human-oriented output, modeled on the original firmware's
/// `SERDEBUG` trail.
pub struct HumanReadableSink<W> {
    writer: W,
}

impl<W: Write> HumanReadableSink<W> {
    pub fn new(writer: W) -> Self {
        HumanReadableSink { writer }
    }
}

impl<W: Write> MessageSink for HumanReadableSink<W> {
    fn begin_frame(&mut self, fiw: Fiw) -> io::Result<()> {
        writeln!(self.writer, "+FRAME C:{} F:{}", fiw.cycle, fiw.frame)
    }

    fn end_frame(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn message(&mut self, msg: &Message, truncated: bool) -> io::Result<()> {
        for addr in &msg.recipients {
            writeln!(self.writer, "|\tADDR:{}", as_ric(*addr))?;
        }
        write!(self.writer, "|   ")?;
        self.writer.write_all(payload_text(msg))?;
        writeln!(self.writer)?;
        if truncated {
            writeln!(self.writer, "[MSG TRUNCATED]")?;
        }
        Ok(())
    }
}

/// Delimited, machine-parseable output: `[[frame]]`/`[[msg]]`/`[[addr]]`/
/// `[[data]]` tags, one frame per `[[frame]]...[[/frame]]` block.
pub struct MachineParseableSink<W> {
    writer: W,
}

impl<W: Write> MachineParseableSink<W> {
    pub fn new(writer: W) -> Self {
        MachineParseableSink { writer }
    }
}

impl<W: Write> MessageSink for MachineParseableSink<W> {
    fn begin_frame(&mut self, fiw: Fiw) -> io::Result<()> {
        writeln!(self.writer, "[[frame]]{}|{}", fiw.cycle, fiw.frame)
    }

    fn end_frame(&mut self) -> io::Result<()> {
        writeln!(self.writer, "[[/frame]]")
    }

    fn message(&mut self, msg: &Message, truncated: bool) -> io::Result<()> {
        writeln!(self.writer, "[[msg]]")?;
        for addr in &msg.recipients {
            writeln!(self.writer, "[[addr]]{}", as_ric(*addr))?;
        }
        write!(self.writer, "[[data]]")?;
        self.writer.write_all(payload_text(msg))?;
        writeln!(self.writer, "[[/data]]")?;
        writeln!(self.writer, "[[/msg]]")?;
        if truncated {
            writeln!(self.writer, "[MSG TRUNCATED]")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_message() -> Message {
        let mut m = Message::new(32768 + 42, 10);
        m.payload = b"hello\0".to_vec();
        m
    }

    #[test]
    fn machine_sink_wraps_messages_in_delimiters() {
        let mut buf = Vec::new();
        {
            let mut sink = MachineParseableSink::new(&mut buf);
            sink.begin_frame(Fiw { cycle: 1, frame: 2 }).unwrap();
            sink.message(&sample_message(), false).unwrap();
            sink.end_frame().unwrap();
        }
        let out = String::from_utf8(buf).unwrap();
        assert!(out.starts_with("[[frame]]1|2\n"));
        assert!(out.contains("[[addr]]42\n"));
        assert!(out.contains("[[data]]hello[[/data]]\n"));
        assert!(out.ends_with("[[/frame]]\n"));
    }

    #[test]
    fn truncated_message_carries_the_marker() {
        let mut buf = Vec::new();
        let mut sink = HumanReadableSink::new(&mut buf);
        sink.message(&sample_message(), true).unwrap();
        let out = String::from_utf8(buf).unwrap();
        assert!(out.contains("[MSG TRUNCATED]"));
    }

    #[test]
    fn payload_text_strips_trailing_nul_only() {
        let mut m = Message::new(1, 1);
        m.payload = vec![b'h', b'i', 0];
        assert_eq!(payload_text(&m), b"hi");
    }
}
