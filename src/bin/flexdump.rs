//! `flexdump`: drives [`flexcore::Decoder`] over a newline-delimited JSON
//! frame log (one serialized [`flexcore::Frame`] per line), or over a small
//! synthetic sequence of idle frames when no input is given.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use flexcore::bits::bitswitch;
use flexcore::frame::{Fiw, Frame};
use flexcore::sink::{HumanReadableSink, MachineParseableSink, MessageSink};
use flexcore::validate::{ParityValidator, WordValidator};
use flexcore::{Config, Decoder};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Human,
    Machine,
}

/// Decode a log of FLEX frames into their carried messages.
#[derive(Debug, Parser)]
#[command(name = "flexdump", version, about)]
struct Opt {
    /// NDJSON frame log to read; omit to emit a short synthetic sequence.
    #[arg(long)]
    input: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = Format::Human)]
    format: Format,

    /// Maximum live temp-address mappings.
    #[arg(long, default_value_t = Config::default().max_mappings)]
    max_mappings: usize,

    /// Maximum parked (fragmented) messages.
    #[arg(long, default_value_t = Config::default().max_messages)]
    max_messages: usize,

    /// Frames a parked message survives before being force-emitted.
    #[arg(long, default_value_t = Config::default().long_msg_ttl)]
    long_msg_ttl: u8,

    /// Number of idle frames to generate when `--input` is omitted.
    #[arg(long, default_value_t = 3)]
    synthetic_frames: usize,
}

fn main() -> Result<()> {
    env_logger::init();
    let opt = Opt::parse();

    let config = Config {
        max_mappings: opt.max_mappings,
        max_messages: opt.max_messages,
        long_msg_ttl: opt.long_msg_ttl,
    };
    let mut decoder = Decoder::new(config, ParityValidator);
    let stdout = io::stdout();

    match opt.format {
        Format::Human => run(&mut decoder, &opt, &mut HumanReadableSink::new(stdout.lock())),
        Format::Machine => run(&mut decoder, &opt, &mut MachineParseableSink::new(stdout.lock())),
    }
}

fn run<V: WordValidator>(
    decoder: &mut Decoder<V>,
    opt: &Opt,
    sink: &mut impl MessageSink,
) -> Result<()> {
    match &opt.input {
        Some(path) => {
            let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
            for line in BufReader::new(file).lines() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                let mut frame: Frame =
                    serde_json::from_str(&line).with_context(|| "parsing frame log line")?;
                decoder.process_frame(&mut frame, sink);
            }
        }
        None => {
            for mut frame in synthetic_frames(opt.synthetic_frames) {
                decoder.process_frame(&mut frame, sink);
            }
        }
    }
    io::stdout().flush()?;
    Ok(())
}

/// A handful of idle frames (`vectorstart == 1`, `endofblockinfo == 0`),
/// useful for exercising the pipeline without a real frame log.
fn synthetic_frames(count: usize) -> Vec<Frame> {
    let word0 = (bitswitch(1) as u32) << 14;
    (0..count)
        .map(|frame_no| {
            let mut frame = Frame::new(
                Fiw {
                    cycle: 0,
                    frame: frame_no as u8,
                },
                1,
            );
            frame.set_word(0, word0);
            frame
        })
        .collect()
}
