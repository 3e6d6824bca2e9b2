/// Interrupt identities delivered to the CPU.
///
/// The display hardware fires two interrupts per frame: one when the CRT
/// beam is near the middle of the screen and one at the start of the
/// vertical blank. Game code uses them to redraw only the half of the
/// frame buffer the beam has already passed. `Quit` is the terminal
/// identity reported once shutdown has been requested.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interrupt {
    /// Beam near mid-screen (RST 1 on the original board).
    MidScreen,
    /// Beam at end of frame, vertical blank start (RST 2).
    VBlank,
    /// Shutdown requested; no further beam interrupts are generated.
    Quit,
}

/// Alternates the two beam interrupts, once per distinct observed
/// timestamp.
///
/// The sequencer has no clock of its own: it fires whenever the caller's
/// run-time stamp differs from the one it last saw, making it idempotent
/// under polling: callers may invoke it far more often than the
/// underlying timing resolution without double-firing. Supplying a fresh
/// stamp for each beam event (two per 60 Hz frame) is the caller's
/// pacing contract, not enforced here.
pub struct InterruptSequencer {
    /// The next identity to deliver. Never `Quit`.
    next: Interrupt,
    /// Timestamp at which the last interrupt was delivered.
    last_time: u64,
}

impl InterruptSequencer {
    pub fn new() -> Self {
        Self {
            next: Interrupt::MidScreen,
            last_time: 0,
        }
    }

    /// Deliver the next beam interrupt if `now` differs from the last
    /// observed timestamp, or `None` when the timestamp is unchanged.
    pub fn advance(&mut self, now: u64) -> Option<Interrupt> {
        if now == self.last_time {
            return None;
        }
        let fired = self.next;
        self.next = match fired {
            Interrupt::MidScreen => Interrupt::VBlank,
            _ => Interrupt::MidScreen,
        };
        self.last_time = now;
        Some(fired)
    }
}

impl Default for InterruptSequencer {
    fn default() -> Self {
        Self::new()
    }
}
