//! Loop point tracking and seek-back control
//!
//! ADX and Sega-CD PCM files carry loop points that make a section of the
//! stream repeat seamlessly. `LoopController` tracks the decode position in
//! format-specific units (samples for ADX, bytes for PCM), detects when the
//! loop boundary falls inside the frame just decoded, and tells the decoder
//! how much of that frame to keep and where to seek the source back to.
//!
//! Policy note: seek-back moves only the bitstream cursor. Predictor history
//! is owned by the decoder and deliberately carries over the seam.

/// Loop points for one file, in format-specific units.
///
/// For ADX the positions are absolute sample counts within the content
/// stream; for Sega-CD PCM they are absolute byte offsets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopSpec {
    /// Whether the file declares a loop at all
    pub has_loop: bool,
    /// Position playback resumes from after the seam
    pub loop_start: u64,
    /// Position at which playback seeks back
    pub loop_end: u64,
}

/// How many times the loop seam is taken
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopMode {
    /// Repeat until externally stopped (or the sink fails)
    Infinite,
    /// Take the seam at most this many times, then play to natural EOF
    Count(u32),
}

/// Controller phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Decoding normally
    Playing,
    /// A seek-back was just issued; the next frame resumes at loop_start
    LoopPending,
    /// Loop budget exhausted; playing through to natural EOF
    Finished,
}

/// Decision for the frame that was just decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopAction {
    /// Emit the whole frame and keep going
    Continue,
    /// The loop boundary falls inside this frame
    SeekBack {
        /// Units of this frame to emit before the seam
        keep: u64,
        /// Absolute position to seek the source back to
        resume_at: u64,
    },
}

/// Tracks decode position against a [`LoopSpec`] and issues seek-backs
#[derive(Debug, Clone)]
pub struct LoopController {
    spec: LoopSpec,
    mode: LoopMode,
    position: u64,
    loops_taken: u32,
    state: LoopState,
}

impl LoopController {
    /// Create a controller starting at position 0.
    pub fn new(spec: LoopSpec, mode: LoopMode) -> Self {
        Self::with_start(spec, mode, 0)
    }

    /// Create a controller with an explicit starting position.
    ///
    /// Sega-CD PCM loop points are absolute file offsets, so its decoder
    /// starts the position after the header sector.
    pub fn with_start(spec: LoopSpec, mode: LoopMode, position: u64) -> Self {
        LoopController {
            spec,
            mode,
            position,
            loops_taken: 0,
            state: LoopState::Playing,
        }
    }

    /// Advance past one decoded frame of `frame_units`.
    ///
    /// Returns what to do with that frame's output. When the loop boundary
    /// falls within the frame and loop budget remains, the returned
    /// `SeekBack` carries the number of units to keep and the resume
    /// position; the controller's own position resets to `loop_start`.
    pub fn advance(&mut self, frame_units: u64) -> LoopAction {
        if self.state == LoopState::LoopPending {
            self.state = LoopState::Playing;
        }

        if !self.spec.has_loop || self.state == LoopState::Finished {
            self.position += frame_units;
            return LoopAction::Continue;
        }

        let delta = self.spec.loop_end.saturating_sub(self.position);
        if delta < frame_units {
            if self.budget_remaining() {
                self.loops_taken += 1;
                self.position = self.spec.loop_start;
                self.state = LoopState::LoopPending;
                return LoopAction::SeekBack {
                    keep: delta,
                    resume_at: self.spec.loop_start,
                };
            }
            // Budget spent: run through the boundary to natural EOF.
            self.state = LoopState::Finished;
        }

        self.position += frame_units;
        LoopAction::Continue
    }

    /// Take the seam immediately if the position already sits on the loop
    /// boundary, without consuming a frame.
    ///
    /// Decoders call this before reading the next frame so a loop whose end
    /// coincides with a frame edge (or with EOF) still seeks back instead
    /// of running off the end of the stream. Returns the resume position
    /// when the seam was taken.
    pub fn seek_if_at_boundary(&mut self) -> Option<u64> {
        if self.spec.has_loop
            && self.state != LoopState::Finished
            && self.position >= self.spec.loop_end
            && self.budget_remaining()
        {
            self.loops_taken += 1;
            self.position = self.spec.loop_start;
            self.state = LoopState::LoopPending;
            return Some(self.spec.loop_start);
        }
        None
    }

    /// Current position, in the same units as the [`LoopSpec`].
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Number of times the loop seam has been taken.
    pub fn loops_taken(&self) -> u32 {
        self.loops_taken
    }

    /// Current controller phase.
    pub fn state(&self) -> LoopState {
        self.state
    }

    /// The loop spec this controller was built with.
    pub fn spec(&self) -> &LoopSpec {
        &self.spec
    }

    fn budget_remaining(&self) -> bool {
        match self.mode {
            LoopMode::Infinite => true,
            LoopMode::Count(n) => self.loops_taken < n,
        }
    }
}
