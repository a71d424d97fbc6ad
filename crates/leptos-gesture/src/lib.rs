//! Leptos Gesture Utilities
//!
//! Drag-to-reveal surfaces (bottom sheets, before/after slider) driven by pointer events.
//! The open/close decision lives in a plain state machine so it can be tested natively.

mod bindings;
mod machine;

pub use bindings::{
    bind_global_pointer, close_reveal, create_reveal, make_on_pointerdown, now_ms, open_reveal,
    Axis, Extent, RevealSignals,
};
pub use machine::{
    passes_threshold, RevealDirection, RevealMachine, RevealState, CLOSE_DURATION_MS,
    OPEN_DISTANCE_RATIO, OPEN_VELOCITY_PX_PER_MS,
};
