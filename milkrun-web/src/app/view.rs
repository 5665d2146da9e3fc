//! Single-screen layout: board canvas, status line, controls, modals.

use milkrun_game::Difficulty;
use yew::prelude::*;

use crate::app::handlers;
use crate::app::state::AppState;
use crate::components::button::Button;
use crate::components::modal::Modal;

/// All callbacks the view needs, built once per render.
pub struct Handlers {
    pub pointer_down: Callback<PointerEvent>,
    pub pointer_move: Callback<PointerEvent>,
    pub pointer_up: Callback<PointerEvent>,
    pub pointer_cancel: Callback<PointerEvent>,
    pub undo: Callback<MouseEvent>,
    pub reset: Callback<MouseEvent>,
    pub toggle_solution: Callback<MouseEvent>,
    pub select_difficulty: Callback<Event>,
    pub toggle_stats: Callback<MouseEvent>,
    pub close_stats: Callback<()>,
    pub open_picker: Callback<MouseEvent>,
    pub close_picker: Callback<()>,
    pub shift_picker_month: Callback<i32>,
    pub pick_day: Callback<u32>,
}

impl Handlers {
    #[must_use]
    pub fn new(state: &AppState) -> Self {
        Self {
            pointer_down: handlers::build_pointer_down(state),
            pointer_move: handlers::build_pointer_move(state),
            pointer_up: handlers::build_pointer_up(state),
            pointer_cancel: handlers::build_pointer_cancel(state),
            undo: handlers::build_undo(state),
            reset: handlers::build_reset(state),
            toggle_solution: handlers::build_toggle_solution(state),
            select_difficulty: handlers::build_select_difficulty(state),
            toggle_stats: handlers::build_toggle_stats(state),
            close_stats: handlers::build_close_stats(state),
            open_picker: handlers::build_open_picker(state),
            close_picker: handlers::build_close_picker(state),
            shift_picker_month: handlers::build_shift_picker_month(state),
            pick_day: handlers::build_pick_day(state),
        }
    }
}

pub fn view(state: &AppState, handlers: &Handlers) -> Html {
    html! {
        <div class="app">
            { header(state, handlers) }
            <main>
                { board(state, handlers) }
                { status(state) }
                { controls(state, handlers) }
            </main>
            { stats_modal(state, handlers) }
            { picker_modal(state, handlers) }
        </div>
    }
}

fn header(state: &AppState, handlers: &Handlers) -> Html {
    let date_label = (*state.active_date).map_or_else(
        || "–".to_string(),
        |date| {
            if *state.date_substituted {
                format!("{date} (latest available)")
            } else {
                date.to_string()
            }
        },
    );
    let current = *state.difficulty;
    html! {
        <header class="app__header">
            <h1>{ "Milkrun" }</h1>
            <p class="app__tagline">{ "Visit every stop, close the loop, beat the optimal round." }</p>
            <div class="app__controls">
                <button class="date-button" onclick={handlers.open_picker.clone()}>
                    { date_label }
                </button>
                <select class="difficulty-select" onchange={handlers.select_difficulty.clone()}>
                    { for Difficulty::ALL.iter().map(|difficulty| html! {
                        <option
                            value={difficulty.as_str()}
                            selected={*difficulty == current}
                        >
                            { difficulty.as_str() }
                        </option>
                    }) }
                </select>
                <Button label="Statistics" onclick={handlers.toggle_stats.clone()} />
            </div>
        </header>
    }
}

fn board(state: &AppState, handlers: &Handlers) -> Html {
    if *state.loading {
        return html! { <p class="board__loading">{ "Loading puzzle…" }</p> };
    }
    if let Some(error) = state.load_error.as_ref() {
        return html! { <p class="board__error">{ format!("No puzzle to play: {error}") }</p> };
    }
    html! {
        <canvas
            ref={state.canvas_ref.clone()}
            class="board"
            width="640"
            height="640"
            style="touch-action: none;"
            onpointerdown={handlers.pointer_down.clone()}
            onpointermove={handlers.pointer_move.clone()}
            onpointerup={handlers.pointer_up.clone()}
            onpointercancel={handlers.pointer_cancel.clone()}
        />
    }
}

fn status(state: &AppState) -> Html {
    let session = state.session.borrow();
    let Some(session) = session.as_ref() else {
        return Html::default();
    };
    let snapshot = session.snapshot();
    let distance = session.route().current_distance();
    let best = state
        .best
        .as_ref()
        .map(|record| format!("best {}", record.efficiency_label()));
    html! {
        <section class="status">
            <span>{ format!("distance {distance:.0}") }</span>
            <span>{ format!("target {:.0}", snapshot.puzzle.optimal_distance) }</span>
            <span>{ format!("stops {}/{}", snapshot.visited.len(), snapshot.puzzle.stop_count()) }</span>
            if let Some(best) = best {
                <span>{ best }</span>
            }
            if snapshot.return_reminder {
                <span class="status__reminder">{ "All stops delivered — return to the depot!" }</span>
            }
            if snapshot.game_complete {
                { completion_banner(state, snapshot.attempts, snapshot.puzzle.optimal_distance) }
            }
        </section>
    }
}

fn completion_banner(state: &AppState, attempts: u32, puzzle_optimal: f64) -> Html {
    let Some(record) = state.last_record.as_ref() else {
        return Html::default();
    };
    // The evaluator rewrites the record's optimum when the player beats the
    // stored one; the gap against the puzzle's value is the tell.
    let beat_optimum = record.optimal_distance < puzzle_optimal;
    html! {
        <div class="status__complete">
            <strong>{ format!("Round complete: {}", record.efficiency_label()) }</strong>
            <span>{ format!(" in {attempts} {}", if attempts == 1 { "try" } else { "tries" }) }</span>
            if beat_optimum {
                <span class="status__record">{ " — shorter than the stored optimum!" }</span>
            }
        </div>
    }
}

fn controls(state: &AppState, handlers: &Handlers) -> Html {
    let session = state.session.borrow();
    let Some(session) = session.as_ref() else {
        return Html::default();
    };
    let solution_label = if session.showing_solution() {
        "Hide optimal route"
    } else {
        "Show optimal route"
    };
    html! {
        <div class="controls">
            <Button label="Undo" onclick={handlers.undo.clone()} />
            <Button label="Reset" onclick={handlers.reset.clone()} />
            <Button
                label={solution_label}
                onclick={handlers.toggle_solution.clone()}
                disabled={!session.solution_available()}
            />
            if !session.solution_available() {
                <span class="controls__note">{ "No solution reveal on hard" }</span>
            }
        </div>
    }
}

fn stats_modal(state: &AppState, handlers: &Handlers) -> Html {
    let body = state.stats.as_ref().map_or_else(Html::default, |(stats, recent)| {
        html! {
            <>
                <ul class="stats">
                    <li>{ format!("Rounds completed: {}", stats.games_played) }</li>
                    <li>{ format!("Puzzles solved: {}", stats.puzzles_solved) }</li>
                    <li>{ format!("Total tries: {}", stats.total_attempts) }</li>
                    <li>{ format!("Best efficiency: {:.2}%", stats.best_efficiency) }</li>
                    <li>{ format!("Average efficiency: {:.2}%", stats.average_efficiency) }</li>
                </ul>
                <h3>{ "Recent rounds" }</h3>
                <ul class="stats__recent">
                    { for recent.iter().map(|record| html! {
                        <li>
                            { format!(
                                "{} · {} · {}",
                                record.date,
                                record.difficulty,
                                record.efficiency_label()
                            ) }
                        </li>
                    }) }
                </ul>
            </>
        }
    });
    html! {
        <Modal open={*state.show_stats} title="Statistics" on_close={handlers.close_stats.clone()}>
            { body }
        </Modal>
    }
}

fn picker_modal(state: &AppState, handlers: &Handlers) -> Html {
    let month_label = (*state.picker_month)
        .map_or_else(String::new, |(year, month)| format!("{year:04}-{month:02}"));
    let back = {
        let shift = handlers.shift_picker_month.clone();
        Callback::from(move |_: MouseEvent| shift.emit(-1))
    };
    let forward = {
        let shift = handlers.shift_picker_month.clone();
        Callback::from(move |_: MouseEvent| shift.emit(1))
    };
    let days = state.picker_days.as_ref();
    html! {
        <Modal open={*state.show_picker} title="Pick a day" on_close={handlers.close_picker.clone()}>
            <div class="picker__nav">
                <button onclick={back}>{ "\u{2039}" }</button>
                <span>{ month_label }</span>
                <button onclick={forward}>{ "\u{203a}" }</button>
            </div>
            if let Some(days) = days {
                if days.is_empty() {
                    <p>{ "No puzzles published this month." }</p>
                } else {
                    <div class="picker__days">
                        { for days.iter().map(|&day| {
                            let pick = handlers.pick_day.clone();
                            let onclick = Callback::from(move |_: MouseEvent| pick.emit(day));
                            html! { <button {onclick}>{ day }</button> }
                        }) }
                    </div>
                }
            } else {
                <p>{ "Checking the calendar…" }</p>
            }
        </Modal>
    }
}
