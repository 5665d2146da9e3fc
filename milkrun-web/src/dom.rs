use chrono::NaiveDate;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Document, Response, Storage, Window};

/// Retrieve the global `window` object.
///
/// # Panics
/// Panics if executed outside of a browser context where `window` is unavailable.
#[must_use]
pub fn window() -> Window {
    web_sys::window().expect("`window` should be available in web context")
}

/// Retrieve the document object for DOM interactions.
///
/// # Panics
/// Panics when the document cannot be accessed from the current browser window.
#[must_use]
pub fn document() -> Document {
    window()
        .document()
        .expect("`document` should exist in browser context")
}

/// Convert a JavaScript value into a readable string for error reporting.
#[must_use]
pub fn js_error_message(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            value
                .dyn_ref::<js_sys::Error>()
                .map(|err| err.message().into())
        })
        .unwrap_or_else(|| format!("{value:?}"))
}

/// Log an error message to the browser console.
pub fn console_error(message: &str) {
    web_sys::console::error_1(&JsValue::from(message));
}

/// Perform a fetch request and return the browser `Response`.
///
/// # Errors
/// Returns an error if the fetch request fails or the response cannot be converted to `Response`.
#[allow(clippy::future_not_send)] // Wasm futures rely on `JsFuture`, which is not `Send`.
pub async fn fetch_response(url: &str) -> Result<Response, JsValue> {
    let resp_value = JsFuture::from(window().fetch_with_str(url)).await?;
    resp_value.dyn_into::<Response>()
}

/// Access the browser `localStorage` handle.
///
/// # Errors
/// Returns an error if the browser window cannot be accessed or `localStorage` is unavailable.
pub fn local_storage() -> Result<Storage, JsValue> {
    window()
        .local_storage()?
        .ok_or_else(|| JsValue::from_str("localStorage unavailable"))
}

/// Milliseconds since the Unix epoch, from the JS clock.
#[must_use]
pub fn now_ms() -> i64 {
    let ms = js_sys::Date::now();
    if ms.is_finite() { ms as i64 } else { 0 }
}

/// Today's local calendar date, from the JS clock.
#[must_use]
pub fn today() -> Option<NaiveDate> {
    let now = js_sys::Date::new_0();
    let year = now.get_full_year();
    let year = i32::try_from(year).ok()?;
    NaiveDate::from_ymd_opt(year, now.get_month() + 1, now.get_date())
}

/// Whether the primary pointer is coarse (touch) rather than precise.
#[must_use]
pub fn coarse_pointer() -> bool {
    window()
        .match_media("(pointer: coarse)")
        .ok()
        .flatten()
        .is_some_and(|query| query.matches())
}

/// A scheduled one-shot callback, cancelled when the guard drops.
pub struct TimeoutGuard {
    id: i32,
    _closure: Closure<dyn FnMut()>,
}

impl Drop for TimeoutGuard {
    fn drop(&mut self) {
        window().clear_timeout_with_handle(self.id);
    }
}

/// Schedule `callback` after `delay_ms`. Dropping the guard cancels a
/// pending fire.
///
/// # Errors
/// Returns an error if the browser refuses to schedule the timer.
pub fn set_timeout(delay_ms: i32, callback: impl FnOnce() + 'static) -> Result<TimeoutGuard, JsValue> {
    let mut callback = Some(callback);
    let closure = Closure::wrap(Box::new(move || {
        if let Some(f) = callback.take() {
            f();
        }
    }) as Box<dyn FnMut()>);
    let id = window().set_timeout_with_callback_and_timeout_and_arguments_0(
        closure.as_ref().unchecked_ref(),
        delay_ms,
    )?;
    Ok(TimeoutGuard {
        id,
        _closure: closure,
    })
}

/// A repeating callback, cancelled when the guard drops.
pub struct IntervalGuard {
    id: i32,
    _closure: Closure<dyn FnMut()>,
}

impl Drop for IntervalGuard {
    fn drop(&mut self) {
        window().clear_interval_with_handle(self.id);
    }
}

/// Schedule `callback` every `period_ms`. Dropping the guard stops the
/// interval.
///
/// # Errors
/// Returns an error if the browser refuses to schedule the timer.
pub fn set_interval(
    period_ms: i32,
    callback: impl FnMut() + 'static,
) -> Result<IntervalGuard, JsValue> {
    let closure = Closure::wrap(Box::new(callback) as Box<dyn FnMut()>);
    let id = window().set_interval_with_callback_and_timeout_and_arguments_0(
        closure.as_ref().unchecked_ref(),
        period_ms,
    )?;
    Ok(IntervalGuard {
        id,
        _closure: closure,
    })
}
