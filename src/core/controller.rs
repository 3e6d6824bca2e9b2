use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{trace, warn};

use crate::core::interrupt::{Interrupt, InterruptSequencer};
use crate::core::video::FrameBuffer;
use crate::device::{ShiftRegister, SoundLatch};
use crate::memory::VideoMemory;

// ---------------------------------------------------------------------------
// Audio trigger bits
// ---------------------------------------------------------------------------
// Bit positions in the mask returned by `IoController::write`: port 3
// channels occupy the low byte, port 5 channels the high byte. The order
// matches the discrete sound board wiring (SX0-SX10); backends map each
// position to an opaque sample resource.

pub const TRIGGER_UFO: u16 = 1 << 0; // free-running, not edge-triggered
pub const TRIGGER_SHOT: u16 = 1 << 1;
pub const TRIGGER_PLAYER_DIE: u16 = 1 << 2;
pub const TRIGGER_INVADER_DIE: u16 = 1 << 3;
pub const TRIGGER_EXTENDED_PLAY: u16 = 1 << 4;
pub const TRIGGER_AMP_ENABLE: u16 = 1 << 5;
pub const TRIGGER_FLEET_1: u16 = 1 << 8;
pub const TRIGGER_FLEET_2: u16 = 1 << 9;
pub const TRIGGER_FLEET_3: u16 = 1 << 10;
pub const TRIGGER_FLEET_4: u16 = 1 << 11;
pub const TRIGGER_UFO_HIT: u16 = 1 << 12;

/// Port 3 channels reported level-OR instead of edge-triggered.
const PORT3_LEVEL_BITS: u8 = 0x01;

// ---------------------------------------------------------------------------
// Quit token
// ---------------------------------------------------------------------------

/// One-shot cancellation token shared between the CPU/timing context and
/// whichever context decides to shut down.
///
/// Cancelling is final; there is no reset path. Observation is a relaxed
/// atomic load, eventual visibility is the only requirement.
#[derive(Clone)]
pub struct QuitToken {
    flag: Arc<AtomicBool>,
}

impl QuitToken {
    fn new() -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Request shutdown. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

// ---------------------------------------------------------------------------
// I/O controller
// ---------------------------------------------------------------------------

/// The Space Invaders I/O hardware: dedicated shift register, discrete
/// sound latches, beam interrupt generation, and the frame decompressor.
///
/// The controller is driven by two external execution contexts. A
/// CPU/timing context calls [`IoController::read`] and
/// [`IoController::write`] for port-mapped instructions and
/// [`IoController::service_interrupts`] with its current run time. A
/// render context calls [`IoController::blit`] (or holds a
/// [`FrameBuffer`] clone from [`IoController::frame_buffer`]) whenever
/// it decides to draw. The only state shared between the contexts is the
/// 1bpp frame snapshot behind its mutex, refreshed once per frame at
/// vertical blank.
///
/// # Port map
///
/// | Port | Direction | Function                                            |
/// |------|-----------|-----------------------------------------------------|
/// | 0-2  | read      | input bit fields, populated by the backend          |
/// | 3    | read      | shift register output                               |
/// | 2    | write     | bits 0-2: shift amount                              |
/// | 3    | write     | discrete sounds: UFO, shot, player die, invader die |
/// | 4    | write     | shift register data byte                            |
/// | 5    | write     | discrete sounds: fleet movement 1-4, UFO hit        |
/// | 6    | write     | watchdog reset (no-op here)                         |
pub struct IoController {
    /// Dedicated shift hardware (ports 2/4 write, port 3 read).
    shifter: ShiftRegister,
    /// Port 3 discrete sounds; bit 0 (UFO) free-runs.
    port3: SoundLatch,
    /// Port 5 discrete sounds, all edge-triggered.
    port5: SoundLatch,
    /// Beam interrupt alternation.
    sequencer: InterruptSequencer,
    /// Shared 1bpp frame snapshot, refreshed at vertical blank.
    frame: FrameBuffer,
    /// One-shot shutdown signal, set from outside.
    quit: QuitToken,
}

impl IoController {
    /// Create a controller sized for `memory`'s constant video geometry.
    ///
    /// The snapshot buffer is allocated here, once; every later refresh
    /// overwrites it in place.
    pub fn new(memory: &impl VideoMemory) -> Self {
        Self {
            shifter: ShiftRegister::new(),
            port3: SoundLatch::with_level_bits(PORT3_LEVEL_BITS),
            port5: SoundLatch::new(),
            sequencer: InterruptSequencer::new(),
            frame: FrameBuffer::new(
                memory.vram_len(),
                memory.screen_width(),
                memory.screen_height(),
            ),
            quit: QuitToken::new(),
        }
    }

    /// Read from an input port.
    ///
    /// Only port 3 (shift register output) carries data from this
    /// hardware. Ports 0-2 are input bit fields the backend populates
    /// from its own device sampling; this core contributes zero to them.
    /// Unrecognized ports also read as zero.
    pub fn read(&self, port: u8) -> u8 {
        match port {
            3 => self.shifter.read(),
            0..=2 => 0,
            _ => {
                trace!("read from unmapped port {port}");
                0
            }
        }
    }

    /// Write to an output port, returning the audio trigger mask.
    ///
    /// Port 3 triggers occupy the low byte of the mask and port 5
    /// triggers the high byte, matching the `TRIGGER_*` constants. The
    /// other recognized ports return an empty mask. A write to a port
    /// outside the recognized set is a protocol violation: the data is
    /// dropped, no state changes, and the mask is empty.
    pub fn write(&mut self, port: u8, data: u8) -> u16 {
        match port {
            2 => {
                self.shifter.set_amount(data);
                0
            }
            3 => u16::from(self.port3.write(data)),
            4 => {
                self.shifter.push(data);
                0
            }
            5 => u16::from(self.port5.write(data)) << 8,
            6 => {
                // Watchdog kick. The emulated machine cannot wedge the
                // way the real board could, so resetting it is a no-op.
                trace!("watchdog reset");
                0
            }
            _ => {
                warn!("write of {data:#04x} to unmapped port {port} dropped");
                0
            }
        }
    }

    /// Generate the beam interrupts and latch the frame at vertical
    /// blank.
    ///
    /// `now` is the caller's monotonic run-time stamp; only changes are
    /// observed, so polling with an unchanged stamp is free (`None`).
    /// When the vertical-blank identity fires, the snapshot buffer is
    /// refreshed from `memory` under the frame lock; from that point the
    /// frame a renderer sees is stable until the next vertical blank. The
    /// mid-screen identity is purely a timing tick. Once the quit token
    /// is cancelled the result is [`Interrupt::Quit`] forever and the
    /// snapshot is never touched again; `read` and `write` stay safe to
    /// call.
    ///
    /// `cycles` is the CPU cycle count of the caller's machine loop. It
    /// is part of the service interface but unused by this hardware.
    pub fn service_interrupts(
        &mut self,
        memory: &impl VideoMemory,
        now: u64,
        _cycles: u64,
    ) -> Option<Interrupt> {
        if self.quit.is_cancelled() {
            return Some(Interrupt::Quit);
        }
        let fired = self.sequencer.advance(now)?;
        if fired == Interrupt::VBlank {
            trace!("vertical blank at t={now}, refreshing frame snapshot");
            self.frame.refresh_from(memory);
        }
        Some(fired)
    }

    /// Decompress the current frame snapshot into `texture` at one byte
    /// per pixel. See [`FrameBuffer::blit`].
    pub fn blit(&self, texture: &mut [u8], row_bytes: usize) {
        self.frame.blit(texture, row_bytes);
    }

    /// A cloneable handle to the shared frame snapshot, for a render
    /// context living on another thread.
    pub fn frame_buffer(&self) -> FrameBuffer {
        self.frame.clone()
    }

    /// The shutdown token observed by
    /// [`service_interrupts`](IoController::service_interrupts).
    pub fn quit_token(&self) -> QuitToken {
        self.quit.clone()
    }
}
