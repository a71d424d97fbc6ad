//! Leptos bindings for [`RevealMachine`]
//!
//! Pointer-down is bound on the handle element; move/up are bound once on the document
//! so a drag keeps tracking when the pointer leaves the handle.

use leptos::prelude::*;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;

use crate::machine::{RevealDirection, RevealMachine, RevealState, CLOSE_DURATION_MS};

/// Axis the gesture is measured on
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// What the 25% distance threshold is measured against
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Extent {
    /// Window size along the axis (sheets)
    Viewport,
    /// Size of the element the gesture started on (comparison slider)
    Element,
}

#[derive(Clone, Copy)]
pub struct RevealSignals {
    pub machine: RwSignal<RevealMachine>,
    pub axis: Axis,
    pub extent: Extent,
}

impl RevealSignals {
    pub fn state(&self) -> RevealState {
        self.machine.with(|m| m.state())
    }

    pub fn is_open(&self) -> bool {
        self.machine.with(|m| m.is_open())
    }

    /// 0.0 closed .. 1.0 open, for transforms
    pub fn progress(&self) -> f64 {
        self.machine.with(|m| m.progress(now_ms()))
    }
}

/// Milliseconds from `performance.now()`
pub fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

fn viewport_extent(axis: Axis) -> f64 {
    let Some(win) = web_sys::window() else {
        return 1.0;
    };
    let size = match axis {
        Axis::Horizontal => win.inner_width(),
        Axis::Vertical => win.inner_height(),
    };
    size.ok().and_then(|v| v.as_f64()).unwrap_or(1.0)
}

fn coordinate(axis: Axis, ev: &web_sys::PointerEvent) -> f64 {
    match axis {
        Axis::Horizontal => ev.client_x() as f64,
        Axis::Vertical => ev.client_y() as f64,
    }
}

pub fn create_reveal(axis: Axis, direction: RevealDirection, extent: Extent) -> RevealSignals {
    RevealSignals {
        machine: RwSignal::new(RevealMachine::new(direction, viewport_extent(axis))),
        axis,
        extent,
    }
}

/// Settle a closing surface after the animation
fn schedule_settle(reveal: RevealSignals) {
    if let Some(win) = web_sys::window() {
        let cb = Closure::<dyn FnMut()>::new(move || {
            reveal.machine.try_update(|m| m.tick(now_ms()));
        });
        let _ = win.set_timeout_with_callback_and_timeout_and_arguments_0(
            cb.as_ref().unchecked_ref(),
            CLOSE_DURATION_MS as i32,
        );
        cb.forget();
    }
}

pub fn open_reveal(reveal: RevealSignals) {
    reveal.machine.update(|m| m.open());
}

pub fn close_reveal(reveal: RevealSignals) {
    reveal.machine.update(|m| m.close(now_ms()));
    schedule_settle(reveal);
}

/// Pointer-down handler for the drag handle
pub fn make_on_pointerdown(reveal: RevealSignals) -> impl Fn(web_sys::PointerEvent) + Copy + 'static {
    move |ev: web_sys::PointerEvent| {
        if ev.button() != 0 {
            return;
        }
        let extent = match reveal.extent {
            Extent::Viewport => viewport_extent(reveal.axis),
            Extent::Element => ev
                .current_target()
                .and_then(|t| t.dyn_into::<web_sys::Element>().ok())
                .map(|el| {
                    let rect = el.get_bounding_client_rect();
                    match reveal.axis {
                        Axis::Horizontal => rect.width(),
                        Axis::Vertical => rect.height(),
                    }
                })
                .unwrap_or_else(|| viewport_extent(reveal.axis)),
        };
        let position = coordinate(reveal.axis, &ev);
        reveal.machine.update(|m| {
            m.set_extent(extent);
            m.begin(position, now_ms());
        });
    }
}

type PointerHandler = Closure<dyn FnMut(web_sys::PointerEvent)>;

/// Which document handler each pointer event goes to
#[derive(Clone, Copy, Debug, PartialEq)]
enum Handler {
    Move,
    End,
}

const DOCUMENT_EVENTS: [(&str, Handler); 3] = [
    ("pointermove", Handler::Move),
    ("pointerup", Handler::End),
    ("pointercancel", Handler::End),
];

/// Document listeners of one mounted surface; dropping removes them
struct GlobalPointerBinding {
    document: Option<web_sys::Document>,
    on_move: PointerHandler,
    on_end: PointerHandler,
}

impl GlobalPointerBinding {
    fn handler(&self, handler: Handler) -> &js_sys::Function {
        match handler {
            Handler::Move => self.on_move.as_ref().unchecked_ref(),
            Handler::End => self.on_end.as_ref().unchecked_ref(),
        }
    }

    fn attach(&self) {
        if let Some(doc) = &self.document {
            for (event, handler) in DOCUMENT_EVENTS {
                let _ = doc.add_event_listener_with_callback(event, self.handler(handler));
            }
        }
    }
}

impl Drop for GlobalPointerBinding {
    fn drop(&mut self) {
        if let Some(doc) = &self.document {
            for (event, handler) in DOCUMENT_EVENTS {
                let _ = doc.remove_event_listener_with_callback(event, self.handler(handler));
            }
        }
    }
}

/// Bind document-level move/up/cancel handlers for as long as the calling component is
/// mounted; `on_settled` sees the state after release
pub fn bind_global_pointer<F>(reveal: RevealSignals, on_settled: F)
where
    F: Fn(RevealState) + Clone + 'static,
{
    let on_move = PointerHandler::new(move |ev: web_sys::PointerEvent| {
        let dragging = reveal.machine.try_with_untracked(|m| m.is_dragging()).unwrap_or(false);
        if dragging {
            let position = coordinate(reveal.axis, &ev);
            reveal.machine.try_update(|m| m.update(position));
        }
    });

    let on_end = PointerHandler::new(move |ev: web_sys::PointerEvent| {
        let dragging = reveal.machine.try_with_untracked(|m| m.is_dragging()).unwrap_or(false);
        if !dragging {
            return;
        }
        let position = coordinate(reveal.axis, &ev);
        let settled = reveal.machine.try_update(|m| m.end(position, now_ms()));
        if let Some(state) = settled {
            if matches!(state, RevealState::Closing { .. }) {
                schedule_settle(reveal);
            }
            on_settled(state);
        }
    });

    let binding = GlobalPointerBinding {
        document: web_sys::window().and_then(|win| win.document()),
        on_move,
        on_end,
    };
    binding.attach();

    let binding = StoredValue::new_local(Some(binding));
    on_cleanup(move || {
        binding.try_update_value(|b| b.take());
    });
}
