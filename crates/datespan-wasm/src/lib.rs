//! WebAssembly bindings for the datespan widget.
//!
//! The page forwards raw DOM events to a [`DateSpanWidget`]; history is kept
//! in the browser's `localStorage` under the same `results` key the CLI uses.

use datespan_engine::error::Result as EngineResult;
use datespan_engine::{
    date::SEPARATORS, parse_timezone, DayFilter, DurationUnit, EngineError, KeyValueStore,
    Preset, Slot, Widget, WidgetOptions,
};
use tracing::warn;
use wasm_bindgen::prelude::*;

/// [`KeyValueStore`] over `window.localStorage`.
#[derive(Debug, Default)]
pub struct LocalStorageStore;

fn local_storage() -> EngineResult<web_sys::Storage> {
    web_sys::window()
        .ok_or_else(|| EngineError::Storage("no window".to_string()))?
        .local_storage()
        .map_err(|e| EngineError::Storage(format!("{e:?}")))?
        .ok_or_else(|| EngineError::Storage("localStorage unavailable".to_string()))
}

impl KeyValueStore for LocalStorageStore {
    fn get(&self, key: &str) -> EngineResult<Option<String>> {
        local_storage()?
            .get_item(key)
            .map_err(|e| EngineError::Storage(format!("{e:?}")))
    }

    fn set(&mut self, key: &str, value: &str) -> EngineResult<()> {
        local_storage()?
            .set_item(key, value)
            .map_err(|e| EngineError::Storage(format!("{e:?}")))
    }
}

fn widget_options(timezone: Option<String>, separator: Option<String>) -> EngineResult<WidgetOptions> {
    let mut options = WidgetOptions::default();
    if let Some(name) = timezone.as_deref().filter(|s| !s.is_empty()) {
        options.timezone = parse_timezone(name)?;
    }
    if let Some(sep) = separator.as_deref().filter(|s| !s.is_empty()) {
        let mut chars = sep.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if SEPARATORS.contains(&c) => options.separator = c,
            _ => return Err(EngineError::InvalidDate(format!("unsupported separator '{sep}'"))),
        }
    }
    Ok(options)
}

fn to_js(err: EngineError) -> JsError {
    JsError::new(&err.to_string())
}

/// One date-range widget bound to the page's two inputs.
#[wasm_bindgen]
pub struct DateSpanWidget {
    inner: Widget<LocalStorageStore>,
}

#[wasm_bindgen]
impl DateSpanWidget {
    /// Build a widget and replay the stored history.
    ///
    /// `timezone` defaults to UTC and `separator` to `.`.
    #[wasm_bindgen(constructor)]
    pub fn new(timezone: Option<String>, separator: Option<String>) -> Result<DateSpanWidget, JsError> {
        let options = widget_options(timezone, separator).map_err(to_js)?;
        let mut inner = Widget::new(LocalStorageStore, options);
        if let Err(err) = inner.restore() {
            warn!(error = %err, "starting with an empty history");
        }
        Ok(Self { inner })
    }

    /// Whether a keystroke may reach the input. `false` means the page
    /// should call `preventDefault`.
    pub fn keypress(
        &self,
        slot: &str,
        key: &str,
        value_len: usize,
        selection_len: usize,
    ) -> Result<bool, JsError> {
        let slot: Slot = slot.parse().map_err(to_js)?;
        Ok(self.inner.keypress(slot, key, value_len, selection_len))
    }

    /// Key-up handler. Returns the new validity once the text is long
    /// enough to be checked, `undefined` otherwise.
    pub fn input(&mut self, slot: &str, text: &str) -> Result<Option<String>, JsError> {
        let slot: Slot = slot.parse().map_err(to_js)?;
        Ok(self
            .inner
            .input(slot, text)
            .map(|validity| validity.as_str().to_string()))
    }

    /// Change handler; always validates.
    pub fn change(&mut self, slot: &str, text: &str) -> Result<String, JsError> {
        let slot: Slot = slot.parse().map_err(to_js)?;
        Ok(self.inner.validate_input(slot, text).as_str().to_string())
    }

    /// Text for the second input, or `undefined` while the first date is
    /// not valid.
    pub fn preset(&mut self, name: &str) -> Result<Option<String>, JsError> {
        let preset: Preset = name.parse().map_err(to_js)?;
        self.inner.apply_preset(preset).map_err(to_js)
    }

    /// Evaluate the range and record the message. On failure the error
    /// banner is also available through `error_message`.
    pub fn calculate(&mut self, days: &str, unit: &str) -> Result<String, JsError> {
        let filter: DayFilter = days.parse().map_err(to_js)?;
        let unit: DurationUnit = unit.parse().map_err(to_js)?;
        self.inner
            .calculate(filter, unit)
            .map(|result| result.message)
            .map_err(to_js)
    }

    /// Visible result list, newest first.
    pub fn results(&self) -> Vec<JsValue> {
        self.inner
            .results()
            .iter()
            .map(|entry| JsValue::from_str(entry))
            .collect()
    }

    pub fn has_results(&self) -> bool {
        self.inner.has_results()
    }

    pub fn second_input_enabled(&self) -> bool {
        self.inner.second_input_enabled()
    }

    pub fn error_message(&self) -> Option<String> {
        self.inner.error_message()
    }

    pub fn validity(&self, slot: &str) -> Result<String, JsError> {
        let slot: Slot = slot.parse().map_err(to_js)?;
        Ok(self.inner.validity(slot).as_str().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = widget_options(None, None).unwrap();
        assert_eq!(options.timezone, chrono_tz::Tz::UTC);
        assert_eq!(options.separator, '.');
    }

    #[test]
    fn test_empty_strings_keep_defaults() {
        let options = widget_options(Some(String::new()), Some(String::new())).unwrap();
        assert_eq!(options.timezone, chrono_tz::Tz::UTC);
        assert_eq!(options.separator, '.');
    }

    #[test]
    fn test_custom_options() {
        let options =
            widget_options(Some("Europe/Berlin".to_string()), Some("/".to_string())).unwrap();
        assert_eq!(options.timezone, chrono_tz::Europe::Berlin);
        assert_eq!(options.separator, '/');
    }

    #[test]
    fn test_rejects_bad_options() {
        assert!(matches!(
            widget_options(Some("Mars/Olympus".to_string()), None),
            Err(EngineError::InvalidTimezone(_))
        ));
        assert!(widget_options(None, Some("|".to_string())).is_err());
        assert!(widget_options(None, Some("--".to_string())).is_err());
    }
}
