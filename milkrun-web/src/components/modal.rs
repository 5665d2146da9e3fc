use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct Props {
    pub open: bool,
    pub title: AttrValue,
    pub on_close: Callback<()>,
    #[prop_or_default]
    pub children: Children,
}

#[function_component(Modal)]
pub fn modal(props: &Props) -> Html {
    if !props.open {
        return Html::default();
    }
    let on_backdrop = {
        let on_close = props.on_close.clone();
        Callback::from(move |_: MouseEvent| on_close.emit(()))
    };
    let on_close_btn = {
        let on_close = props.on_close.clone();
        Callback::from(move |_: MouseEvent| on_close.emit(()))
    };
    let stop_bubble = Callback::from(|event: MouseEvent| event.stop_propagation());
    html! {
        <div class="modal-backdrop" onclick={on_backdrop}>
            <div class="modal" role="dialog" aria-modal="true" onclick={stop_bubble}>
                <div class="modal__header">
                    <h2>{ props.title.clone() }</h2>
                    <button class="modal__close" aria-label="Close" onclick={on_close_btn}>
                        { "\u{00d7}" }
                    </button>
                </div>
                <div class="modal__body">
                    { for props.children.iter() }
                </div>
            </div>
        </div>
    }
}
