//! The external wall-clock container (`sys` in the original firmware).
//!
//! FLEX broadcasts date/time only to a ~7.5s resolution and this crate does
//! not attempt real-time-clock correction (see Non-goals); [`ClockState`] is
//! purely a landing spot for the auxiliary BIW fields plus a caller-driven
//! subsecond tick, mirroring the AVR `TIMER0_COMPA_vect` ISR that used to
//! advance it 125 times a second.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Ticks per second used by [`ClockState::tick`], matching the original
/// firmware's 125 Hz timer.
pub const TICKS_PER_SECOND: u16 = 125;

/// Broadcast-derived date/time, kept current by auxiliary BIWs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ClockState {
    /// Local timezone offset, `0..32`.
    pub tz: u8,
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minutes: u8,
    pub seconds: u8,
    /// Free-running sub-second counter, `0..TICKS_PER_SECOND`.
    pub subsecond: u16,
}

impl ClockState {
    /// Advances the sub-second counter by one tick, rolling seconds,
    /// minutes and hours over as needed. Does not touch `day`/`month`/`year`
    /// on an hour rollover; this crate stores broadcast date/time, it does
    /// not run a calendar.
    pub fn tick(&mut self) {
        self.subsecond = (self.subsecond + 1) % TICKS_PER_SECOND;
        if self.subsecond == 0 {
            self.seconds = (self.seconds + 1) % 60;
            if self.seconds == 0 {
                self.minutes = (self.minutes + 1) % 60;
                if self.minutes == 0 {
                    self.hour = (self.hour + 1) % 24;
                }
            }
        }
    }
}
