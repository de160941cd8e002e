//! Selection, hover and click disambiguation.
//!
//! `ClickTracker` turns raw button presses into single and double clicks:
//!
//! ```text
//! Idle --primary press--> Pending(t0) --second press within window--> Idle (double)
//!                              |
//!                              +--poll after window--> Idle (single)
//! ```
//!
//! Timestamps are passed in by the caller, so the tracker works with any
//! event loop and is fully deterministic under test.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::graph::DependencyGraph;
use crate::types::NodeId;

/// Tunables for pointer interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct InteractionSettings {
    /// Maximum gap between two presses of a double click.
    pub double_click_ms: u64,
    /// Maximum pointer travel on either axis between the two presses.
    pub click_slop_px: f64,
    /// Hit-test tolerance around a node center.
    pub hit_radius_px: f64,
}

impl Default for InteractionSettings {
    fn default() -> Self {
        Self {
            double_click_ms: 300,
            click_slop_px: 5.0,
            hit_radius_px: 30.0,
        }
    }
}

impl InteractionSettings {
    /// The double-click window as a duration.
    #[must_use]
    pub fn double_click_window(&self) -> Duration {
        Duration::from_millis(self.double_click_ms)
    }
}

// ============================================================================
// Selection
// ============================================================================

/// At most one selected and one hovered node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    selected: Option<NodeId>,
    hovered: Option<NodeId>,
}

impl SelectionState {
    /// Create an empty selection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The selected node.
    #[must_use]
    pub fn selected(&self) -> Option<&NodeId> {
        self.selected.as_ref()
    }

    /// The hovered node.
    #[must_use]
    pub fn hovered(&self) -> Option<&NodeId> {
        self.hovered.as_ref()
    }

    /// Select `id`, or deselect when it is already selected. `None` clears.
    pub fn select(&mut self, id: Option<NodeId>) {
        self.selected = match id {
            Some(id) if self.selected.as_ref() == Some(&id) => None,
            other => other,
        };
    }

    /// Set or clear the hovered node.
    pub fn hover(&mut self, id: Option<NodeId>) {
        self.hovered = id;
    }

    /// Clear the selection and hover.
    pub fn clear(&mut self) {
        self.selected = None;
        self.hovered = None;
    }

    /// Drop references to `id`, leaving other state alone.
    pub fn forget(&mut self, id: &str) {
        if self.selected.as_ref().is_some_and(|s| s.as_str() == id) {
            self.selected = None;
        }
        if self.hovered.as_ref().is_some_and(|h| h.as_str() == id) {
            self.hovered = None;
        }
    }

    /// Drop references to nodes no longer in `graph`.
    pub fn validate(&mut self, graph: &DependencyGraph) {
        if self.selected.as_ref().is_some_and(|s| !graph.contains(s.as_str())) {
            self.selected = None;
        }
        if self.hovered.as_ref().is_some_and(|h| !graph.contains(h.as_str())) {
            self.hovered = None;
        }
    }
}

// ============================================================================
// Clicks
// ============================================================================

/// Pointer buttons the shell forwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Left button: select, or explode on double click.
    Primary,
    /// Right button: delete.
    Secondary,
    /// Middle button: ignored.
    Middle,
}

/// A resolved click.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClickEvent {
    /// A click that was not followed by a second one in time.
    Single {
        /// Button pressed.
        button: MouseButton,
        /// Screen x of the press.
        x: f64,
        /// Screen y of the press.
        y: f64,
    },
    /// Two presses of one button within the window and slop.
    Double {
        /// Button pressed.
        button: MouseButton,
        /// Screen x of the second press.
        x: f64,
        /// Screen y of the second press.
        y: f64,
    },
}

#[derive(Debug, Clone, Copy)]
struct Press {
    x: f64,
    y: f64,
    at: Instant,
}

/// Single/double click state machine.
///
/// Only primary presses wait for a possible second press; other buttons
/// resolve immediately.
#[derive(Debug, Clone)]
pub struct ClickTracker {
    window: Duration,
    slop: f64,
    pending: Option<Press>,
}

impl ClickTracker {
    /// Create a tracker with the given window and slop.
    #[must_use]
    pub fn new(settings: &InteractionSettings) -> Self {
        Self {
            window: settings.double_click_window(),
            slop: settings.click_slop_px,
            pending: None,
        }
    }

    /// Returns `true` while a primary single click awaits the window.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Feed a button press and return the clicks it resolves, in order.
    ///
    /// A pending single click that cannot pair with this press is flushed
    /// first.
    pub fn press(&mut self, button: MouseButton, x: f64, y: f64, now: Instant) -> Vec<ClickEvent> {
        let mut events = Vec::new();

        if button != MouseButton::Primary {
            events.extend(self.flush());
            events.push(ClickEvent::Single { button, x, y });
            return events;
        }

        match self.pending.take() {
            Some(first) if self.pairs_with(first, x, y, now) => {
                events.push(ClickEvent::Double { button, x, y });
            }
            Some(first) => {
                events.push(single(first));
                self.pending = Some(Press { x, y, at: now });
            }
            None => {
                self.pending = Some(Press { x, y, at: now });
            }
        }
        events
    }

    /// Resolve the pending single click once its window has passed.
    pub fn poll(&mut self, now: Instant) -> Option<ClickEvent> {
        let due = self
            .pending
            .is_some_and(|p| now.saturating_duration_since(p.at) > self.window);
        if due { self.flush() } else { None }
    }

    /// Resolve the pending single click immediately.
    pub fn flush(&mut self) -> Option<ClickEvent> {
        self.pending.take().map(single)
    }

    fn pairs_with(&self, first: Press, x: f64, y: f64, now: Instant) -> bool {
        now.saturating_duration_since(first.at) <= self.window
            && (x - first.x).abs() <= self.slop
            && (y - first.y).abs() <= self.slop
    }
}

impl Default for ClickTracker {
    fn default() -> Self {
        Self::new(&InteractionSettings::default())
    }
}

fn single(press: Press) -> ClickEvent {
    ClickEvent::Single {
        button: MouseButton::Primary,
        x: press.x,
        y: press.y,
    }
}
