//! Reveal State Machine
//!
//! `Idle -> Dragging -> (Idle | Open) -> Closing -> Idle`
//!
//! On release the gesture opens when it travelled at least a quarter of the extent
//! or moved faster than 0.5 px/ms on average. Dragging an open surface back uses the
//! same rule in the opposite direction. Closing always lasts 300 ms.

/// Fraction of the extent a drag must cover to open
pub const OPEN_DISTANCE_RATIO: f64 = 0.25;
/// Average speed (px/ms) that opens regardless of distance
pub const OPEN_VELOCITY_PX_PER_MS: f64 = 0.5;
/// Length of the closing animation
pub const CLOSE_DURATION_MS: f64 = 300.0;

/// Which way along the axis reveals the surface
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RevealDirection {
    /// Increasing coordinate (drag right / down)
    Forward,
    /// Decreasing coordinate (drag left / up)
    Backward,
}

impl RevealDirection {
    fn sign(&self) -> f64 {
        match self {
            RevealDirection::Forward => 1.0,
            RevealDirection::Backward => -1.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RevealState {
    Idle,
    Dragging {
        start: f64,
        current: f64,
        started_ms: f64,
        /// Dragging an open surface back
        from_open: bool,
    },
    Open,
    Closing {
        started_ms: f64,
    },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RevealMachine {
    state: RevealState,
    direction: RevealDirection,
    /// Viewport (or element) size along the axis, in px
    extent: f64,
}

impl RevealMachine {
    pub fn new(direction: RevealDirection, extent: f64) -> Self {
        Self {
            state: RevealState::Idle,
            direction,
            extent: extent.max(1.0),
        }
    }

    pub fn state(&self) -> RevealState {
        self.state
    }

    pub fn extent(&self) -> f64 {
        self.extent
    }

    pub fn set_extent(&mut self, extent: f64) {
        self.extent = extent.max(1.0);
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, RevealState::Open)
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, RevealState::Dragging { .. })
    }

    /// Pointer down; ignored while closing
    pub fn begin(&mut self, position: f64, now_ms: f64) {
        let from_open = match self.state {
            RevealState::Idle => false,
            RevealState::Open => true,
            RevealState::Dragging { .. } | RevealState::Closing { .. } => return,
        };
        self.state = RevealState::Dragging {
            start: position,
            current: position,
            started_ms: now_ms,
            from_open,
        };
    }

    pub fn update(&mut self, position: f64) {
        if let RevealState::Dragging { current, .. } = &mut self.state {
            *current = position;
        }
    }

    /// Pointer up: decide between open and closed
    pub fn end(&mut self, position: f64, now_ms: f64) -> RevealState {
        let RevealState::Dragging { start, started_ms, from_open, .. } = self.state else {
            return self.state;
        };
        let displacement = (position - start) * self.direction.sign();
        let elapsed = (now_ms - started_ms).max(1.0);

        self.state = if from_open {
            if passes_threshold(-displacement, elapsed, self.extent) {
                RevealState::Closing { started_ms: now_ms }
            } else {
                RevealState::Open
            }
        } else if passes_threshold(displacement, elapsed, self.extent) {
            RevealState::Open
        } else {
            RevealState::Idle
        };
        self.state
    }

    /// Open without a gesture (tap on a row, button)
    pub fn open(&mut self) {
        if matches!(self.state, RevealState::Idle) {
            self.state = RevealState::Open;
        }
    }

    /// Start closing an open surface
    pub fn close(&mut self, now_ms: f64) {
        if matches!(self.state, RevealState::Open) {
            self.state = RevealState::Closing { started_ms: now_ms };
        }
    }

    /// Finish closing once the animation time has passed; returns true when it settled
    pub fn tick(&mut self, now_ms: f64) -> bool {
        if let RevealState::Closing { started_ms } = self.state {
            if now_ms - started_ms >= CLOSE_DURATION_MS {
                self.state = RevealState::Idle;
                return true;
            }
        }
        false
    }

    /// How far revealed, 0.0 (closed) to 1.0 (open)
    pub fn progress(&self, now_ms: f64) -> f64 {
        match self.state {
            RevealState::Idle => 0.0,
            RevealState::Open => 1.0,
            RevealState::Dragging { start, current, from_open, .. } => {
                let moved = (current - start) * self.direction.sign() / self.extent;
                let base = if from_open { 1.0 } else { 0.0 };
                (base + moved).clamp(0.0, 1.0)
            }
            RevealState::Closing { started_ms } => {
                (1.0 - (now_ms - started_ms) / CLOSE_DURATION_MS).clamp(0.0, 1.0)
            }
        }
    }
}

/// Distance OR velocity rule shared by every reveal surface
pub fn passes_threshold(displacement: f64, elapsed_ms: f64, extent: f64) -> bool {
    if displacement <= 0.0 {
        return false;
    }
    let velocity = displacement / elapsed_ms.max(1.0);
    displacement >= extent * OPEN_DISTANCE_RATIO || velocity >= OPEN_VELOCITY_PX_PER_MS
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet() -> RevealMachine {
        // Bottom sheet on an 800px tall viewport, revealed by dragging up
        RevealMachine::new(RevealDirection::Backward, 800.0)
    }

    #[test]
    fn test_slow_long_drag_opens() {
        let mut m = sheet();
        m.begin(700.0, 0.0);
        m.update(600.0);
        assert!(m.is_dragging());
        assert_eq!(m.end(500.0, 2_000.0), RevealState::Open);
    }

    #[test]
    fn test_slow_short_drag_snaps_back() {
        let mut m = sheet();
        m.begin(700.0, 0.0);
        // 100px in 1s: below 25% (200px) and 0.1 px/ms
        assert_eq!(m.end(600.0, 1_000.0), RevealState::Idle);
    }

    #[test]
    fn test_fast_flick_opens() {
        let mut m = sheet();
        m.begin(700.0, 0.0);
        // 60px in 100ms = 0.6 px/ms
        assert_eq!(m.end(640.0, 100.0), RevealState::Open);
    }

    #[test]
    fn test_wrong_direction_never_opens() {
        let mut m = sheet();
        m.begin(100.0, 0.0);
        assert_eq!(m.end(700.0, 50.0), RevealState::Idle);
    }

    #[test]
    fn test_drag_back_closes_then_settles() {
        let mut m = sheet();
        m.open();
        m.begin(200.0, 1_000.0);
        assert_eq!(m.end(450.0, 2_500.0), RevealState::Closing { started_ms: 2_500.0 });
        assert!(!m.tick(2_799.0));
        assert!(m.tick(2_800.0));
        assert_eq!(m.state(), RevealState::Idle);
    }

    #[test]
    fn test_small_drag_back_stays_open() {
        let mut m = sheet();
        m.open();
        m.begin(200.0, 0.0);
        assert_eq!(m.end(230.0, 1_000.0), RevealState::Open);
    }

    #[test]
    fn test_begin_ignored_while_closing() {
        let mut m = sheet();
        m.open();
        m.close(0.0);
        m.begin(100.0, 10.0);
        assert_eq!(m.state(), RevealState::Closing { started_ms: 0.0 });
    }

    #[test]
    fn test_progress() {
        let mut m = RevealMachine::new(RevealDirection::Forward, 400.0);
        assert_eq!(m.progress(0.0), 0.0);
        m.begin(0.0, 0.0);
        m.update(100.0);
        assert_eq!(m.progress(0.0), 0.25);
        m.update(900.0);
        assert_eq!(m.progress(0.0), 1.0);
        m.end(900.0, 1_000.0);
        m.close(1_000.0);
        assert_eq!(m.progress(1_150.0), 0.5);
    }

    #[test]
    fn test_threshold_rule() {
        assert!(passes_threshold(100.0, 1_000.0, 400.0));
        assert!(!passes_threshold(99.0, 1_000.0, 400.0));
        assert!(passes_threshold(50.0, 100.0, 400.0));
        assert!(!passes_threshold(0.0, 0.0, 400.0));
    }
}
