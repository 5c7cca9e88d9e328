//! Frame processor (C9): the entry point that ties C1-C8 together.
//!
//! [`Decoder::process_frame`] mirrors the original firmware's single
//! `processFrame` entrypoint: validate the primary BIW, process auxiliary
//! BIWs, validate and decode every vector, assemble or expire alpha
//! messages, and refresh the temp-address mapping table for the next time
//! this frame number comes around.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::address::{is_temporary, temp_address_index};
use crate::alpha::{append_alpha, decode_alpha_header};
use crate::biw::{process_auxiliary_biw, process_primary_biw};
use crate::clock::ClockState;
use crate::config::Config;
use crate::error::{ProcessOutcome, RejectReason};
use crate::frame::Frame;
use crate::mapping::MappingTable;
use crate::message::Message;
use crate::parked::ParkedTable;
use crate::sink::MessageSink;
use crate::validate::{ValidateFlags, ValidateResult, WordValidator};
use crate::vector::{decode_vector, Vector};

/// The sans-I/O decoder: owns the mapping table, the parked-message table
/// and the broadcast clock, and is driven one frame at a time by the
/// caller.
pub struct Decoder<V> {
    validator: V,
    config: Config,
    clock: ClockState,
    mappings: MappingTable,
    parked: ParkedTable,
    previous_frame: Option<u8>,
    busy: AtomicBool,
}

impl<V: WordValidator> Decoder<V> {
    pub fn new(config: Config, validator: V) -> Self {
        Decoder {
            mappings: MappingTable::new(config.max_mappings),
            parked: ParkedTable::new(config.max_messages),
            validator,
            config,
            clock: ClockState::default(),
            previous_frame: None,
            busy: AtomicBool::new(false),
        }
    }

    /// The broadcast-derived clock, kept current by auxiliary BIWs.
    pub fn clock(&self) -> &ClockState {
        &self.clock
    }

    /// Advances the broadcast clock by one subsecond tick. Callers own the
    /// real-time source; this crate only tracks it.
    pub fn tick_clock(&mut self) {
        self.clock.tick();
    }

    /// Processes one frame, emitting any completed or expired messages to
    /// `sink`.
    ///
    /// Never fails in the `Result` sense: an unrepairable primary BIW or a
    /// reentrant call are expected outcomes, reported through
    /// [`ProcessOutcome`] rather than propagated.
    pub fn process_frame(
        &mut self,
        frame: &mut Frame,
        sink: &mut impl MessageSink,
    ) -> ProcessOutcome {
        if self
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            log::warn!("process_frame called while another call was still active");
            return ProcessOutcome::Rejected(RejectReason::ReentrantCall);
        }

        let outcome = self.process_frame_inner(frame, sink);
        self.busy.store(false, Ordering::SeqCst);
        outcome
    }

    fn process_frame_inner(
        &mut self,
        frame: &mut Frame,
        sink: &mut impl MessageSink,
    ) -> ProcessOutcome {
        let biw_result = self.validator.validate_word(
            frame,
            0,
            ValidateFlags::VALIDATE_FLEX_CHECKSUM | ValidateFlags::REPAIR2,
        );
        if !biw_result.is_usable() {
            log::debug!("frame {} discarded: primary BIW unrepairable", frame.fiw.frame);
            return ProcessOutcome::Rejected(RejectReason::BiwUnrepairable);
        }
        let biw = process_primary_biw(frame.word(0));

        self.evict_skipped_mappings(frame.fiw.frame);

        if let Err(e) = sink.begin_frame(frame.fiw) {
            log::warn!("sink begin_frame failed: {e}");
        }

        self.process_auxiliary_biws(frame, &biw);

        let avcount = biw.vectorstart.wrapping_sub(biw.endofblockinfo).wrapping_sub(1);

        for counter in 0..avcount {
            let idx = counter.wrapping_add(biw.vectorstart);
            if let ValidateResult::Fail = self.validator.validate_word(
                frame,
                idx,
                ValidateFlags::REPAIR2 | ValidateFlags::VALIDATE_FLEX_CHECKSUM,
            ) {
                frame.set_word(idx, 0);
            }
        }

        for counter in 0..avcount {
            let addr_idx = counter.wrapping_add(biw.addressstart);
            self.validator
                .validate_word(frame, addr_idx, ValidateFlags::REPAIR2);

            let vword = frame.word(counter.wrapping_add(biw.vectorstart));
            let aword = frame.word(addr_idx);
            let vect = decode_vector(vword, aword);

            if let Vector::Alpha { start, length, address } = vect {
                frame.set_word(counter.wrapping_add(biw.vectorstart), 0);
                self.handle_alpha_vector(frame, &biw, avcount, counter, start, length, address, sink);
            }
        }

        self.mappings.clear_mappings(frame.fiw.frame);
        for counter in 0..avcount {
            let vword = frame.word(counter.wrapping_add(biw.vectorstart));
            let aword = frame.word(counter.wrapping_add(biw.addressstart));
            if let Vector::Instruction { tempframe, tempaddr, address } = decode_vector(vword, aword) {
                self.mappings.add_mapping(tempframe, tempaddr, address);
            }
        }

        for mut msg in self.parked.tick_and_expire() {
            if msg.payload.last() != Some(&0) {
                msg.payload.push(0);
            }
            if let Err(e) = sink.message(&msg, true) {
                log::warn!("sink message (expired) failed: {e}");
            }
        }

        if let Err(e) = sink.end_frame() {
            log::warn!("sink end_frame failed: {e}");
        }

        ProcessOutcome::Processed
    }

    /// Clears mappings for every frame number that was skipped between the
    /// last frame processed and this one, then records this frame as the
    /// new high-water mark.
    fn evict_skipped_mappings(&mut self, current_frame: u8) {
        let previous = *self.previous_frame.get_or_insert(current_frame);
        let mut counter = (previous + 1) % 128;
        while counter != current_frame {
            self.mappings.clear_mappings(counter);
            counter = (counter + 1) % 128;
        }
        self.previous_frame = Some(current_frame);
    }

    /// Processes auxiliary BIWs in words 1..=3, per `biw.endofblockinfo`.
    /// The original firmware's switch statement falls through from the
    /// highest word down to word 1, so `endofblockinfo == 3` processes
    /// words 3, 2 and 1 in that order.
    fn process_auxiliary_biws(&mut self, frame: &mut Frame, biw: &crate::biw::Biw) {
        let indices: &[u8] = match biw.endofblockinfo {
            3 => &[3, 2, 1],
            2 => &[2, 1],
            1 => &[1],
            _ => &[],
        };
        for &idx in indices {
            let result = self.validator.validate_word(
                frame,
                idx,
                ValidateFlags::REPAIR2 | ValidateFlags::VALIDATE_FLEX_CHECKSUM,
            );
            if result.is_usable() {
                process_auxiliary_biw(frame.word(idx), &mut self.clock);
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn handle_alpha_vector(
        &mut self,
        frame: &mut Frame,
        biw: &crate::biw::Biw,
        avcount: u8,
        counter: u8,
        start: u8,
        length: u8,
        address: u32,
        sink: &mut impl MessageSink,
    ) {
        let header = decode_alpha_header(frame.word(start), frame.word(start + 1));

        let parked = if header.fragmentnumber != 3 {
            self.parked.find(address, header.messagenumber)
        } else {
            None
        };

        let mut msg = match parked {
            Some(m) => m,
            None => {
                let mut m = Message::new(address, self.config.long_msg_ttl);
                self.seed_recipients(&mut m, address, frame.fiw.frame);

                // Scan the remaining vectors for other recipients of this
                // same alpha payload, consuming and clearing each one found.
                let mut scan = counter + 1;
                while scan < avcount {
                    let vword = frame.word(scan.wrapping_add(biw.vectorstart));
                    let aword = frame.word(scan.wrapping_add(biw.addressstart));
                    if let Vector::Alpha { start: dup_start, address: dup_addr, .. } =
                        decode_vector(vword, aword)
                    {
                        if dup_start == start {
                            frame.set_word(scan.wrapping_add(biw.vectorstart), 0);
                            self.add_recipient(&mut m, dup_addr, frame.fiw.frame);
                        }
                    }
                    scan += 1;
                }
                m
            }
        };

        self.validator
            .validate_word(frame, start, ValidateFlags::REPAIR2);

        if append_alpha(frame, start, length, &mut msg).is_err() {
            log::warn!("failed to grow message payload; dropping fragment");
            return;
        }

        if msg.complete {
            if let Err(e) = sink.message(&msg, false) {
                log::warn!("sink message failed: {e}");
            }
        } else if !self.parked.park(msg) {
            log::warn!("parked-message table full; dropping incomplete message");
        }
    }

    /// Seeds a freshly created message's recipient list: a direct address
    /// becomes the sole recipient, a temporary address is expanded through
    /// the mapping table.
    fn seed_recipients(&self, msg: &mut Message, address: u32, frame_no: u8) {
        if is_temporary(address) {
            msg.recipients.clear();
            for addr in self.mappings.addresses_for(frame_no, temp_address_index(address)) {
                msg.recipients.push(addr);
            }
        }
    }

    fn add_recipient(&self, msg: &mut Message, address: u32, frame_no: u8) {
        if is_temporary(address) {
            for addr in self.mappings.addresses_for(frame_no, temp_address_index(address)) {
                msg.add_recipient(addr);
            }
        } else {
            msg.add_recipient(address);
        }
    }
}
