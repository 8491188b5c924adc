//! One date-range widget session.
//!
//! [`Widget`] owns every piece of mutable state a session has: the two
//! candidate dates, the result log, and the error banner. It is created
//! when the widget starts and lives until the session ends. Front ends
//! call its operations from their event handlers, either directly or via
//! [`Widget::dispatch`](crate::events).

use chrono_tz::Tz;
use tracing::{debug, info, warn};

use crate::error::{EngineError, Result};
use crate::evaluator::{evaluate, DayFilter, DurationUnit, RangeResult};
use crate::gatekeeper::Gatekeeper;
use crate::preset::{resolve_preset, Preset};
use crate::results::ResultLog;
use crate::state::{DateState, Slot, Validity};
use crate::store::KeyValueStore;

/// Options fixed for the lifetime of a widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WidgetOptions {
    /// Zone in which typed dates are anchored at local midnight.
    pub timezone: Tz,
    /// Separator typed between date components and used by presets.
    pub separator: char,
}

impl Default for WidgetOptions {
    fn default() -> Self {
        Self {
            timezone: Tz::UTC,
            separator: '.',
        }
    }
}

#[derive(Debug)]
pub struct Widget<S> {
    options: WidgetOptions,
    gate: Gatekeeper,
    state: DateState,
    log: ResultLog<S>,
    error: Option<EngineError>,
}

impl<S: KeyValueStore> Widget<S> {
    pub fn new(store: S, options: WidgetOptions) -> Self {
        Self {
            options,
            gate: Gatekeeper::new(options.separator),
            state: DateState::new(options.timezone),
            log: ResultLog::new(store),
            error: None,
        }
    }

    /// Replay persisted results into the view. Call once at startup.
    pub fn restore(&mut self) -> Result<usize> {
        let count = self.log.restore()?;
        info!(count, "restored result history");
        Ok(count)
    }

    /// Whether a keystroke may land in `slot`.
    ///
    /// The second input rejects everything while it is disabled.
    pub fn keypress(&self, slot: Slot, key: &str, value_len: usize, selection_len: usize) -> bool {
        if slot == Slot::Second && !self.second_input_enabled() {
            return false;
        }
        self.gate.admits(key, value_len, selection_len)
    }

    /// Validate `text` once it is long enough; `None` while still typing.
    pub fn input(&mut self, slot: Slot, text: &str) -> Option<Validity> {
        if !self.gate.should_validate(text.chars().count()) {
            return None;
        }
        Some(self.validate_input(slot, text))
    }

    /// Parse `text` into `slot` unconditionally (change / blur).
    ///
    /// A successful parse clears the error banner.
    pub fn validate_input(&mut self, slot: Slot, text: &str) -> Validity {
        let validity = self.state.set_candidate(slot, text);
        if validity.is_valid() {
            self.error = None;
        }
        debug!(%slot, ?validity, dates_valid = self.state.is_valid(), "input validated");
        validity
    }

    /// Fill the second date from the first using `preset`.
    ///
    /// Does nothing and returns `Ok(None)` unless the first date is valid.
    /// Otherwise returns the text written into the second input, which
    /// has already been validated.
    pub fn apply_preset(&mut self, preset: Preset) -> Result<Option<String>> {
        let Some(base) = self.state.date(Slot::First) else {
            debug!(%preset, "preset ignored without a valid first date");
            return Ok(None);
        };
        let resolved = resolve_preset(&base, preset)?;
        let text = resolved.format_display(self.options.separator);
        self.validate_input(Slot::Second, &text);
        Ok(Some(text))
    }

    /// Evaluate the current dates and record the result.
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidDates`] when either date is missing or invalid,
    /// [`EngineError::SecondDateBeforeFirst`] when the range is reversed.
    /// Either sets the error banner and nothing is recorded. A failure to
    /// persist is logged and does not fail the calculation.
    pub fn calculate(&mut self, filter: DayFilter, unit: DurationUnit) -> Result<RangeResult> {
        let outcome = self
            .state
            .dates()
            .ok_or(EngineError::InvalidDates)
            .and_then(|(first, second)| evaluate(&first, &second, filter, unit));

        let result = match outcome {
            Ok(result) => result,
            Err(err) => {
                warn!(error = %err, "calculation rejected");
                self.error = Some(err.clone());
                return Err(err);
            }
        };

        if let Err(err) = self.log.record(&result.message) {
            warn!(error = %err, "result shown but not persisted");
        }
        info!(count = result.count, value = result.value, %filter, %unit, "calculated");
        Ok(result)
    }

    pub fn options(&self) -> &WidgetOptions {
        &self.options
    }

    pub fn gatekeeper(&self) -> &Gatekeeper {
        &self.gate
    }

    pub fn state(&self) -> &DateState {
        &self.state
    }

    pub fn log(&self) -> &ResultLog<S> {
        &self.log
    }

    pub fn validity(&self, slot: Slot) -> Validity {
        self.state.validity(slot)
    }

    pub fn second_input_enabled(&self) -> bool {
        self.state.second_input_enabled()
    }

    /// Banner text for the last rejected calculation, if still shown.
    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(ToString::to_string)
    }

    /// Result entries in view, newest first.
    pub fn results(&self) -> Vec<String> {
        self.log.entries().map(String::from).collect()
    }

    pub fn has_results(&self) -> bool {
        self.log.has_results()
    }

    pub fn into_store(self) -> S {
        self.log.into_store()
    }
}
