use std::cell::RefCell;
use std::rc::Rc;

use chrono::NaiveDate;
use milkrun_game::score::ScoreRecord;
use milkrun_game::store::Statistics;
use milkrun_game::{Difficulty, GameSession, GestureDecoder, Node};
use yew::prelude::*;

use crate::dom::{IntervalGuard, TimeoutGuard};

/// Bundle of app-level handles.
///
/// The live session and gesture decoder sit behind `Rc<RefCell<…>>` rather
/// than `use_state`: a continuous drag issues several intents within one
/// event tick, and each must observe the previous one's effect immediately.
/// The `revision` counter is the render trigger.
#[derive(Clone)]
pub struct AppState {
    pub session: Rc<RefCell<Option<GameSession>>>,
    pub decoder: Rc<RefCell<GestureDecoder>>,
    pub reminder_timer: Rc<RefCell<Option<TimeoutGuard>>>,
    pub playback_timer: Rc<RefCell<Option<IntervalGuard>>>,
    pub solution_cache: Rc<RefCell<Option<Vec<Node>>>>,
    pub canvas_ref: NodeRef,
    pub revision: UseStateHandle<u64>,
    pub difficulty: UseStateHandle<Difficulty>,
    pub active_date: UseStateHandle<Option<NaiveDate>>,
    pub date_substituted: UseStateHandle<bool>,
    pub loading: UseStateHandle<bool>,
    pub load_error: UseStateHandle<Option<String>>,
    pub best: UseStateHandle<Option<ScoreRecord>>,
    pub last_record: UseStateHandle<Option<ScoreRecord>>,
    pub show_stats: UseStateHandle<bool>,
    pub stats: UseStateHandle<Option<(Statistics, Vec<ScoreRecord>)>>,
    pub show_picker: UseStateHandle<bool>,
    pub picker_month: UseStateHandle<Option<(i32, u32)>>,
    pub picker_days: UseStateHandle<Option<Vec<u32>>>,
}

#[hook]
pub fn use_app_state() -> AppState {
    AppState {
        session: use_mut_ref(|| None::<GameSession>),
        decoder: use_mut_ref(GestureDecoder::default),
        reminder_timer: use_mut_ref(|| None::<TimeoutGuard>),
        playback_timer: use_mut_ref(|| None::<IntervalGuard>),
        solution_cache: use_mut_ref(|| None::<Vec<Node>>),
        canvas_ref: use_node_ref(),
        revision: use_state(|| 0_u64),
        difficulty: use_state(Difficulty::default),
        active_date: use_state(|| None::<NaiveDate>),
        date_substituted: use_state(|| false),
        loading: use_state(|| true),
        load_error: use_state(|| None::<String>),
        best: use_state(|| None::<ScoreRecord>),
        last_record: use_state(|| None::<ScoreRecord>),
        show_stats: use_state(|| false),
        stats: use_state(|| None),
        show_picker: use_state(|| false),
        picker_month: use_state(|| None::<(i32, u32)>),
        picker_days: use_state(|| None::<Vec<u32>>),
    }
}
