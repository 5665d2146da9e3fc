//! Callback builders wiring browser events to the game session.
//!
//! Every intent is processed to completion before the next is accepted;
//! pointer handlers read and write the session synchronously through the
//! shared cell rather than through deferred hook state.

use chrono::{Datelike, NaiveDate};
use milkrun_game::{
    BOARD_SIZE, Difficulty, GameEngine, GameSession, Intent, POINTER_HIT_RADIUS, Point,
    PuzzleProvider, ScoreStore, SessionEvent, TOUCH_HIT_RADIUS,
};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlCanvasElement;
use yew::prelude::*;

use crate::app::state::AppState;
use crate::canvas::draw_board;
use crate::dom;
use crate::provider::HttpPuzzleProvider;
use crate::storage::LocalStorageScoreStore;

/// Delay before the "return to depot" nudge fires.
const REMINDER_DELAY_MS: i32 = 2_000;
/// Solution playback edge cadence.
const PLAYBACK_STEP_MS: i32 = 600;

fn engine() -> GameEngine<HttpPuzzleProvider, LocalStorageScoreStore> {
    GameEngine::new(HttpPuzzleProvider::default(), LocalStorageScoreStore)
}

/// Bump the render revision; effects repaint the canvas afterwards.
fn bump(state: &AppState) {
    state.revision.set((*state.revision).wrapping_add(1));
}

/// Paint the current frame directly, outside the render cycle. Used from
/// pointer handlers so drag feedback does not wait on a re-render.
pub fn redraw(state: &AppState) {
    let Some(canvas) = state.canvas_ref.cast::<HtmlCanvasElement>() else {
        return;
    };
    let Ok(Some(ctx)) = canvas.get_context("2d") else {
        return;
    };
    let Ok(ctx) = ctx.dyn_into::<web_sys::CanvasRenderingContext2d>() else {
        return;
    };
    let session = state.session.borrow();
    let Some(session) = session.as_ref() else {
        return;
    };
    let preview = state.decoder.borrow().preview();
    draw_board(
        &ctx,
        &session.snapshot(),
        preview,
        f64::from(canvas.width()),
    );
}

/// Run one intent through the session and do the follow-up bookkeeping:
/// score persistence on completion, reminder re-arming, render bump.
pub fn apply_intent(state: &AppState, intent: &Intent) {
    let event = {
        let mut session = state.session.borrow_mut();
        let Some(session) = session.as_mut() else {
            return;
        };
        session.apply(intent)
    };
    match event {
        SessionEvent::Rejected => {}
        SessionEvent::Mutated => after_mutation(state),
        SessionEvent::Completed(completion) => {
            let session = state.session.borrow();
            if let Some(session) = session.as_ref() {
                match engine().record_completion(session, &completion, dom::now_ms()) {
                    Ok(record) => {
                        let improved = state
                            .best
                            .as_ref()
                            .is_none_or(|b| record.efficiency > b.efficiency);
                        if improved {
                            state.best.set(Some(record.clone()));
                        }
                        state.last_record.set(Some(record));
                    }
                    Err(err) => {
                        log::error!("failed to persist score: {err}");
                        dom::console_error(&format!("failed to persist score: {err}"));
                    }
                }
            }
            drop(session);
            after_mutation(state);
        }
    }
}

fn after_mutation(state: &AppState) {
    // Any effective mutation invalidates a pending reminder outright; the
    // revision check below is the backstop for timers already in flight.
    *state.reminder_timer.borrow_mut() = None;
    let armed_revision = {
        let session = state.session.borrow();
        session
            .as_ref()
            .filter(|s| s.reminder_eligible())
            .map(GameSession::revision)
    };
    if let Some(armed) = armed_revision {
        let st = state.clone();
        let timer = dom::set_timeout(REMINDER_DELAY_MS, move || {
            let fired = st
                .session
                .borrow_mut()
                .as_mut()
                .is_some_and(|s| s.fire_reminder(armed));
            if fired {
                bump(&st);
            }
        });
        match timer {
            Ok(guard) => *state.reminder_timer.borrow_mut() = Some(guard),
            Err(err) => dom::console_error(&dom::js_error_message(&err)),
        }
    }
    bump(state);
}

/// Load a puzzle and swap the session atomically: timers, gesture state,
/// and the cached solution all reset together with the route.
pub fn load_puzzle(state: &AppState, date: Option<NaiveDate>, difficulty: Difficulty) {
    *state.reminder_timer.borrow_mut() = None;
    *state.playback_timer.borrow_mut() = None;
    *state.solution_cache.borrow_mut() = None;
    state.decoder.borrow_mut().cancel();
    state.loading.set(true);
    state.load_error.set(None);

    let st = state.clone();
    spawn_local(async move {
        let engine = engine();
        match engine.start_session_with_best(date, difficulty).await {
            Ok((start, best)) => {
                let radius = if dom::coarse_pointer() {
                    TOUCH_HIT_RADIUS
                } else {
                    POINTER_HIT_RADIUS
                };
                st.decoder.borrow_mut().set_radius(radius);
                *st.session.borrow_mut() = Some(start.session);
                st.best.set(best);
                st.last_record.set(None);
                st.active_date.set(Some(start.actual_date));
                st.date_substituted.set(start.substituted);
                st.difficulty.set(difficulty);
                st.loading.set(false);
                bump(&st);
            }
            Err(err) => {
                st.loading.set(false);
                st.load_error.set(Some(err.to_string()));
                dom::console_error(&format!("puzzle load failed: {err}"));
            }
        }
    });
}

fn board_point(event: &PointerEvent, canvas: &HtmlCanvasElement) -> Point {
    let rect = canvas.get_bounding_client_rect();
    let width = if rect.width() > 0.0 { rect.width() } else { 1.0 };
    let height = if rect.height() > 0.0 { rect.height() } else { 1.0 };
    Point::new(
        (f64::from(event.client_x()) - rect.left()) / width * BOARD_SIZE,
        (f64::from(event.client_y()) - rect.top()) / height * BOARD_SIZE,
    )
}

pub fn build_pointer_down(state: &AppState) -> Callback<PointerEvent> {
    let st = state.clone();
    Callback::from(move |event: PointerEvent| {
        event.prevent_default();
        let Some(canvas) = st.canvas_ref.cast::<HtmlCanvasElement>() else {
            return;
        };
        let point = board_point(&event, &canvas);
        {
            let session = st.session.borrow();
            let Some(session) = session.as_ref() else {
                return;
            };
            st.decoder.borrow_mut().press(point, session);
        }
        redraw(&st);
    })
}

pub fn build_pointer_move(state: &AppState) -> Callback<PointerEvent> {
    let st = state.clone();
    Callback::from(move |event: PointerEvent| {
        let Some(canvas) = st.canvas_ref.cast::<HtmlCanvasElement>() else {
            return;
        };
        let point = board_point(&event, &canvas);
        let intent = {
            let session = st.session.borrow();
            let Some(session) = session.as_ref() else {
                return;
            };
            st.decoder.borrow_mut().drag(point, session)
        };
        if let Some(intent) = intent {
            apply_intent(&st, &intent);
        }
        redraw(&st);
    })
}

pub fn build_pointer_up(state: &AppState) -> Callback<PointerEvent> {
    let st = state.clone();
    Callback::from(move |event: PointerEvent| {
        let Some(canvas) = st.canvas_ref.cast::<HtmlCanvasElement>() else {
            return;
        };
        let point = board_point(&event, &canvas);
        let intent = {
            let session = st.session.borrow();
            let Some(session) = session.as_ref() else {
                return;
            };
            st.decoder.borrow_mut().release(point, session)
        };
        if let Some(intent) = intent {
            apply_intent(&st, &intent);
        }
        redraw(&st);
    })
}

pub fn build_pointer_cancel(state: &AppState) -> Callback<PointerEvent> {
    let st = state.clone();
    Callback::from(move |_event: PointerEvent| {
        st.decoder.borrow_mut().cancel();
        redraw(&st);
    })
}

pub fn build_undo(state: &AppState) -> Callback<MouseEvent> {
    let st = state.clone();
    Callback::from(move |_| apply_intent(&st, &Intent::Undo))
}

pub fn build_reset(state: &AppState) -> Callback<MouseEvent> {
    let st = state.clone();
    Callback::from(move |_| apply_intent(&st, &Intent::Reset))
}

pub fn build_toggle_solution(state: &AppState) -> Callback<MouseEvent> {
    let st = state.clone();
    Callback::from(move |_| {
        let (showing, available, target) = {
            let session = st.session.borrow();
            let Some(session) = session.as_ref() else {
                return;
            };
            (
                session.showing_solution(),
                session.solution_available(),
                (session.puzzle().date, session.difficulty()),
            )
        };
        if showing {
            if let Some(session) = st.session.borrow_mut().as_mut() {
                session.stop_solution();
            }
            *st.playback_timer.borrow_mut() = None;
            bump(&st);
            return;
        }
        // The hardest tier has no published solution; the request is
        // refused without touching the network.
        if !available {
            return;
        }
        let cached = st.solution_cache.borrow().clone();
        if let Some(route) = cached {
            start_playback(&st, route);
            return;
        }
        let st2 = st.clone();
        spawn_local(async move {
            let (date, difficulty) = target;
            match engine().provider().load_solution(date, difficulty).await {
                Ok(route) => {
                    *st2.solution_cache.borrow_mut() = Some(route.clone());
                    start_playback(&st2, route);
                }
                Err(err) => {
                    log::error!("failed to load solution: {err}");
                    dom::console_error(&format!("failed to load solution: {err}"));
                }
            }
        });
    })
}

fn start_playback(state: &AppState, route: Vec<milkrun_game::Node>) {
    {
        let mut session = state.session.borrow_mut();
        let Some(session) = session.as_mut() else {
            return;
        };
        if !session.start_solution(route) {
            return;
        }
    }
    let st = state.clone();
    let timer = dom::set_interval(PLAYBACK_STEP_MS, move || {
        let running = st
            .session
            .borrow_mut()
            .as_mut()
            .is_some_and(GameSession::step_solution);
        bump(&st);
        if !running {
            // Final edge reached: the interval cancels itself.
            *st.playback_timer.borrow_mut() = None;
        }
    });
    match timer {
        Ok(guard) => *state.playback_timer.borrow_mut() = Some(guard),
        Err(err) => dom::console_error(&dom::js_error_message(&err)),
    }
    bump(state);
}

pub fn build_select_difficulty(state: &AppState) -> Callback<Event> {
    let st = state.clone();
    Callback::from(move |event: Event| {
        let Some(select) = event.target_dyn_into::<web_sys::HtmlSelectElement>() else {
            return;
        };
        let Ok(difficulty) = select.value().parse::<Difficulty>() else {
            return;
        };
        load_puzzle(&st, *st.active_date, difficulty);
    })
}

pub fn build_toggle_stats(state: &AppState) -> Callback<MouseEvent> {
    let st = state.clone();
    Callback::from(move |_| {
        if *st.show_stats {
            st.show_stats.set(false);
            return;
        }
        let store = LocalStorageScoreStore;
        let stats = store.statistics().unwrap_or_else(|err| {
            log::error!("failed to read statistics: {err}");
            milkrun_game::Statistics::default()
        });
        let recent = store.recent_scores(10).unwrap_or_default();
        st.stats.set(Some((stats, recent)));
        st.show_stats.set(true);
    })
}

pub fn build_close_stats(state: &AppState) -> Callback<()> {
    let st = state.clone();
    Callback::from(move |()| st.show_stats.set(false))
}

pub fn build_open_picker(state: &AppState) -> Callback<MouseEvent> {
    let st = state.clone();
    Callback::from(move |_| {
        let month = (*st.active_date)
            .or_else(dom::today)
            .map(|d| (d.year(), d.month()));
        let Some(month) = month else {
            return;
        };
        st.picker_month.set(Some(month));
        st.show_picker.set(true);
        refresh_picker_days(&st, month);
    })
}

pub fn build_close_picker(state: &AppState) -> Callback<()> {
    let st = state.clone();
    Callback::from(move |()| st.show_picker.set(false))
}

pub fn build_shift_picker_month(state: &AppState) -> Callback<i32> {
    let st = state.clone();
    Callback::from(move |delta: i32| {
        let Some((year, month)) = *st.picker_month else {
            return;
        };
        let shifted = shift_month(year, month, delta);
        st.picker_month.set(Some(shifted));
        refresh_picker_days(&st, shifted);
    })
}

pub fn build_pick_day(state: &AppState) -> Callback<u32> {
    let st = state.clone();
    Callback::from(move |day: u32| {
        let Some((year, month)) = *st.picker_month else {
            return;
        };
        let Some(date) = NaiveDate::from_ymd_opt(year, month, day) else {
            return;
        };
        st.show_picker.set(false);
        load_puzzle(&st, Some(date), *st.difficulty);
    })
}

fn refresh_picker_days(state: &AppState, (year, month): (i32, u32)) {
    state.picker_days.set(None);
    let st = state.clone();
    let difficulty = *state.difficulty;
    spawn_local(async move {
        match engine()
            .provider()
            .available_days(year, month, difficulty)
            .await
        {
            Ok(days) => st.picker_days.set(Some(days)),
            Err(err) => {
                log::error!("date discovery failed: {err}");
                st.picker_days.set(Some(Vec::new()));
            }
        }
    });
}

pub(crate) fn shift_month(year: i32, month: u32, delta: i32) -> (i32, u32) {
    let zero_based = i64::from(year) * 12 + i64::from(month) - 1 + i64::from(delta);
    let shifted_year = zero_based.div_euclid(12);
    let shifted_month = zero_based.rem_euclid(12) + 1;
    (
        i32::try_from(shifted_year).unwrap_or(year),
        u32::try_from(shifted_month).unwrap_or(month),
    )
}
