//! Event dispatch for a [`Widget`].
//!
//! Front ends translate their native events into [`WidgetEvent`]s and hand
//! them to [`Widget::dispatch`]. Routing goes through a fixed handler table:
//! each entry names the event kind it serves and a predicate that must hold
//! before it runs. The first matching entry wins; an event no entry accepts
//! yields [`Outcome::Skipped`].

use tracing::trace;

use crate::error::EngineError;
use crate::evaluator::{DayFilter, DurationUnit, RangeResult};
use crate::preset::Preset;
use crate::state::{Slot, Validity};
use crate::store::KeyValueStore;
use crate::widget::Widget;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetEvent {
    /// A key is about to be inserted into a date input.
    KeyPress {
        slot: Slot,
        key: String,
        value_len: usize,
        selection_len: usize,
    },
    /// A date input's text changed while typing.
    KeyUp { slot: Slot, value: String },
    /// A date input committed its text (change / blur).
    Change { slot: Slot, value: String },
    PresetClick(Preset),
    CalculateClick { filter: DayFilter, unit: DurationUnit },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    KeyPress,
    KeyUp,
    Change,
    PresetClick,
    CalculateClick,
}

impl WidgetEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            WidgetEvent::KeyPress { .. } => EventKind::KeyPress,
            WidgetEvent::KeyUp { .. } => EventKind::KeyUp,
            WidgetEvent::Change { .. } => EventKind::Change,
            WidgetEvent::PresetClick(_) => EventKind::PresetClick,
            WidgetEvent::CalculateClick { .. } => EventKind::CalculateClick,
        }
    }
}

/// What handling an event did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The keystroke may be inserted.
    Admitted,
    /// The keystroke must be suppressed.
    Suppressed,
    /// No handler accepted the event.
    Skipped,
    Validated(Validity),
    /// The preset wrote this text into the second input.
    PresetApplied(String),
    Calculated(RangeResult),
    Rejected(EngineError),
}

/// One row of the dispatch table.
pub struct Handler<S> {
    pub kind: EventKind,
    pub accepts: fn(&Widget<S>, &WidgetEvent) -> bool,
    pub run: fn(&mut Widget<S>, &WidgetEvent) -> Outcome,
}

impl<S> Clone for Handler<S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for Handler<S> {}

/// The widget's routing table.
pub fn handlers<S: KeyValueStore>() -> [Handler<S>; 5] {
    [
        Handler {
            kind: EventKind::KeyPress,
            accepts: |_, _| true,
            run: |w, event| match event {
                WidgetEvent::KeyPress {
                    slot,
                    key,
                    value_len,
                    selection_len,
                } if w.keypress(*slot, key, *value_len, *selection_len) => Outcome::Admitted,
                _ => Outcome::Suppressed,
            },
        },
        Handler {
            kind: EventKind::KeyUp,
            accepts: |w, event| {
                matches!(event, WidgetEvent::KeyUp { value, .. }
                    if w.input_ready(value))
            },
            run: |w, event| match event {
                WidgetEvent::KeyUp { slot, value } => {
                    Outcome::Validated(w.validate_input(*slot, value))
                }
                _ => Outcome::Skipped,
            },
        },
        Handler {
            kind: EventKind::Change,
            accepts: |_, _| true,
            run: |w, event| match event {
                WidgetEvent::Change { slot, value } => {
                    Outcome::Validated(w.validate_input(*slot, value))
                }
                _ => Outcome::Skipped,
            },
        },
        Handler {
            kind: EventKind::PresetClick,
            accepts: |w, _| w.validity(Slot::First).is_valid(),
            run: |w, event| match event {
                WidgetEvent::PresetClick(preset) => match w.apply_preset(*preset) {
                    Ok(Some(text)) => Outcome::PresetApplied(text),
                    Ok(None) => Outcome::Skipped,
                    Err(err) => Outcome::Rejected(err),
                },
                _ => Outcome::Skipped,
            },
        },
        Handler {
            kind: EventKind::CalculateClick,
            accepts: |_, _| true,
            run: |w, event| match event {
                WidgetEvent::CalculateClick { filter, unit } => match w.calculate(*filter, *unit) {
                    Ok(result) => Outcome::Calculated(result),
                    Err(err) => Outcome::Rejected(err),
                },
                _ => Outcome::Skipped,
            },
        },
    ]
}

impl<S: KeyValueStore> Widget<S> {
    /// Route `event` through the handler table.
    pub fn dispatch(&mut self, event: &WidgetEvent) -> Outcome {
        let kind = event.kind();
        let handler = handlers::<S>()
            .into_iter()
            .find(|h| h.kind == kind && (h.accepts)(&*self, event));

        match handler {
            Some(handler) => {
                let outcome = (handler.run)(self, event);
                trace!(?kind, ?outcome, "event handled");
                outcome
            }
            None => {
                trace!(?kind, "event skipped");
                Outcome::Skipped
            }
        }
    }

    fn input_ready(&self, value: &str) -> bool {
        self.gatekeeper().should_validate(value.chars().count())
    }
}
