pub mod handlers;
pub mod state;
pub mod view;

use yew::prelude::*;

use self::state::use_app_state;
use self::view::Handlers;

#[function_component(App)]
pub fn app() -> Html {
    let app_state = use_app_state();

    // Initial load: today's puzzle at the default tier.
    {
        let st = app_state.clone();
        use_effect_with((), move |()| {
            handlers::load_puzzle(&st, None, *st.difficulty);
            || {}
        });
    }

    // Repaint after every committed render; pointer handlers also paint
    // directly for per-move drag feedback.
    {
        let st = app_state.clone();
        use_effect(move || {
            handlers::redraw(&st);
            || {}
        });
    }

    let handlers = Handlers::new(&app_state);
    view::view(&app_state, &handlers)
}
