mod loader;
mod render;
mod state;

use std::cell::RefCell;
use std::rc::Rc;

use gloo::events::{EventListener, EventListenerOptions};
use gloo::timers::callback::Timeout;
use wasm_bindgen::JsCast;
use web_sys::{HtmlCanvasElement, HtmlElement, HtmlInputElement, HtmlSelectElement, KeyboardEvent};
use yew::prelude::*;

use piece_layout::geometry::Point;
use piece_layout::puzzle::{puzzle_href, puzzle_options};
use piece_layout::selection::Modifiers;
use piece_layout::stage::ArrowKey;

use state::EditorState;

fn main() {
    wasm_logger::init(wasm_logger::Config::default());
    yew::Renderer::<App>::new().render();
}

fn pointer_pos(e: &MouseEvent) -> Point {
    Point::new(e.offset_x() as f64, e.offset_y() as f64)
}

fn modifiers(e: &MouseEvent) -> Modifiers {
    Modifiers {
        shift: e.shift_key(),
        ctrl: e.ctrl_key(),
        meta: e.meta_key(),
    }
}

// ─── App Component ──────────────────────────────────────────────────

#[function_component(App)]
fn app() -> Html {
    let editor: UseStateHandle<Rc<RefCell<EditorState>>> =
        use_state(|| Rc::new(RefCell::new(EditorState::new())));
    let canvas_ref = use_node_ref();
    let force = use_force_update();

    // Fetch the manifest and grid on mount
    {
        let editor = (*editor).clone();
        let force = force.clone();
        use_effect_with((), move |_| {
            let on_change: Rc<dyn Fn()> = Rc::new(move || force.force_update());
            wasm_bindgen_futures::spawn_local(loader::load_grid(editor.clone(), on_change.clone()));
            wasm_bindgen_futures::spawn_local(loader::load_puzzle(editor, on_change));
            || ()
        });
    }

    // Repaint after every render
    {
        let editor = (*editor).clone();
        let canvas_ref = canvas_ref.clone();
        use_effect(move || {
            if let Some(canvas) = canvas_ref.cast::<HtmlCanvasElement>() {
                render::redraw(&canvas, &editor.borrow());
            }
            || ()
        });
    }

    // Arrow keys nudge the selection
    {
        let editor = (*editor).clone();
        let force = force.clone();
        use_effect_with((), move |_| {
            let listener = web_sys::window().map(|window| {
                EventListener::new_with_options(
                    &window,
                    "keydown",
                    EventListenerOptions::enable_prevent_default(),
                    move |e| {
                        let Some(e) = e.dyn_ref::<KeyboardEvent>() else {
                            return;
                        };
                        let Some(key) = ArrowKey::from_code(&e.code()) else {
                            return;
                        };
                        if editor.borrow_mut().stage.nudge(key, e.shift_key()) {
                            e.prevent_default();
                            force.force_update();
                        }
                    },
                )
            });
            move || drop(listener)
        });
    }

    // ─── Canvas events ──────────────────────────────────────────────

    let on_pointerdown = {
        let editor = (*editor).clone();
        let force = force.clone();
        Callback::from(move |e: PointerEvent| {
            if e.button() != 0 {
                return;
            }
            e.prevent_default();
            if let Some(canvas) = e.target().and_then(|t| t.dyn_into::<HtmlElement>().ok()) {
                let _ = canvas.set_pointer_capture(e.pointer_id());
            }
            editor.borrow_mut().stage.pointer_down(pointer_pos(&e));
            force.force_update();
        })
    };

    let on_pointermove = {
        let editor = (*editor).clone();
        let force = force.clone();
        Callback::from(move |e: PointerEvent| {
            if editor.borrow_mut().stage.pointer_move(pointer_pos(&e)) {
                force.force_update();
            }
        })
    };

    let on_pointerup = {
        let editor = (*editor).clone();
        let force = force.clone();
        Callback::from(move |e: PointerEvent| {
            let needs_tick = editor.borrow_mut().stage.pointer_up(modifiers(&e));
            if needs_tick {
                let editor = editor.clone();
                let force = force.clone();
                Timeout::new(0, move || {
                    if editor.borrow_mut().stage.tick() {
                        force.force_update();
                    }
                })
                .forget();
            }
            force.force_update();
        })
    };

    let on_pointercancel = {
        let editor = (*editor).clone();
        let force = force.clone();
        Callback::from(move |_: PointerEvent| {
            editor.borrow_mut().stage.pointer_cancel();
            force.force_update();
        })
    };

    let on_pointerleave = {
        let editor = (*editor).clone();
        let force = force.clone();
        Callback::from(move |_: PointerEvent| {
            if editor.borrow_mut().stage.pointer_leave() {
                force.force_update();
            }
        })
    };

    let on_dblclick = {
        let editor = (*editor).clone();
        let force = force.clone();
        Callback::from(move |e: MouseEvent| {
            if editor.borrow_mut().stage.double_click(pointer_pos(&e)) {
                force.force_update();
            }
        })
    };

    // ─── Control callbacks ──────────────────────────────────────────

    let toggle = |apply: fn(&mut piece_layout::overlay::Overlays, bool)| {
        let editor = (*editor).clone();
        let force = force.clone();
        Callback::from(move |on: bool| {
            apply(editor.borrow_mut().stage.overlays_mut(), on);
            force.force_update();
        })
    };
    let on_letters = toggle(|o, on| o.set_show_letters(on));
    let on_tooltips = toggle(|o, on| o.set_show_tooltips(on));
    let on_grid = toggle(|o, on| o.set_show_grid(on));
    let on_snap = toggle(|o, on| o.set_rotation_snap(on));

    let on_opacity = {
        let editor = (*editor).clone();
        let force = force.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            editor
                .borrow_mut()
                .stage
                .overlays_mut()
                .set_grid_opacity(input.value_as_number());
            force.force_update();
        })
    };

    let on_puzzle = Callback::from(move |e: Event| {
        let select: HtmlSelectElement = e.target_unchecked_into();
        let Some(location) = web_sys::window().map(|w| w.location()) else {
            return;
        };
        let href = location.href().unwrap_or_default();
        if let Err(e) = location.set_href(&puzzle_href(&href, &select.value())) {
            log::error!("navigation failed: {:?}", e);
        }
    });

    let on_flip = {
        let editor = (*editor).clone();
        let force = force.clone();
        Callback::from(move |_: MouseEvent| {
            editor.borrow_mut().stage.flip();
            force.force_update();
        })
    };

    let on_export = {
        let editor = (*editor).clone();
        Callback::from(move |_: MouseEvent| {
            let st = editor.borrow();
            match st.stage.export_json() {
                Ok(json) => {
                    if let Err(e) = loader::download_json(&st.stage.export_filename(), &json) {
                        log::error!("download failed: {:?}", e);
                    }
                }
                Err(e) => log::warn!("export failed: {e}"),
            }
        })
    };

    let on_help_close = {
        let editor = (*editor).clone();
        let force = force.clone();
        Callback::from(move |_: MouseEvent| {
            editor.borrow_mut().stage.hide_help();
            force.force_update();
        })
    };

    // ─── Render ─────────────────────────────────────────────────────

    let st = editor.borrow();
    let stage = &st.stage;
    let overlays = stage.overlays();
    let config = stage.config();
    let (width, height) = stage.size();
    let puzzle = stage.puzzle().to_string();
    let tooltip = stage.tooltip();
    let help_at = stage.help_visible().then(|| stage.help_button().panel_position());
    let cursor = stage.cursor();
    let bar_style = format!(
        "display: flex; align-items: center; gap: 16px; height: {}px; padding: 0 12px; \
         box-sizing: border-box; font-family: sans-serif; font-size: 14px; background: #f4f4f4;",
        config.chrome_height
    );

    html! {
        <div>
            // ─── Control bar ───────────────────────────────────
            <div style={bar_style}>
                <select onchange={on_puzzle}>
                    { for puzzle_options(config, &puzzle).into_iter().map(|p| html! {
                        <option value={p.clone()} selected={p == puzzle}>{p.clone()}</option>
                    }) }
                </select>
                <SettingCheckbox label="Show letters" checked={overlays.show_letters} on_change={on_letters} />
                <SettingCheckbox label="Show tooltips" checked={overlays.show_tooltips} on_change={on_tooltips} />
                <SettingCheckbox label="Show grid" checked={overlays.show_grid} on_change={on_grid} />
                <label>
                    {"Grid opacity "}
                    <input type="range" min="0" max="1" step="0.05"
                        value={overlays.grid_opacity.to_string()}
                        oninput={on_opacity} />
                </label>
                <SettingCheckbox label="Snap rotation" checked={overlays.rotation_snap()} on_change={on_snap} />
                <button onclick={on_flip}>{"Flip"}</button>
                <button onclick={on_export}>{"Export"}</button>
            </div>

            // ─── Stage ─────────────────────────────────────────
            <div style={format!("position: relative; width: {}px; height: {}px;", width, height)}>
                <canvas ref={canvas_ref}
                    style={format!("display: block; cursor: {}; touch-action: none;", cursor)}
                    onpointerdown={on_pointerdown}
                    onpointermove={on_pointermove}
                    onpointerup={on_pointerup}
                    onpointercancel={on_pointercancel}
                    onpointerleave={on_pointerleave}
                    ondblclick={on_dblclick}>
                </canvas>

                if let Some(tip) = tooltip {
                    <div style={format!(
                        "position: absolute; left: {}px; top: {}px; pointer-events: none; \
                         background: rgba(0, 0, 0, 0.75); color: #fff; padding: 6px 8px; \
                         border-radius: 4px; font-family: sans-serif; font-size: 13px;",
                        tip.anchor.x, tip.anchor.y
                    )}>
                        <div>{format!("Submitted by: {}", tip.username)}</div>
                        <div>{format!("Letter: {}", tip.letter)}</div>
                        if let Some(location) = tip.location.clone() {
                            <div>{format!("Location: {}", location)}</div>
                        }
                        <div>{format!("Coords: {}", tip.coords_text())}</div>
                        <div>{format!("Scale: {}", tip.scale_text())}</div>
                        <div>{format!("Rotation: {}", tip.rotation_text())}</div>
                    </div>
                }

                if let Some(at) = help_at {
                    <div style={format!(
                        "position: absolute; left: {}px; top: {}px; width: 400px; \
                         background: #fff; border: 1px solid #b3b3b3; border-radius: 6px; \
                         padding: 12px; box-sizing: border-box; font-family: sans-serif; font-size: 14px;",
                        at.x, at.y
                    )}>
                        <button style="float: right;" onclick={on_help_close}>{"×"}</button>
                        <b>{"How to use"}</b>
                        <ul>
                            <li>{"Click a piece to select it; shift, ctrl or cmd click adds or removes it."}</li>
                            <li>{"Drag on empty space to select every piece the box touches."}</li>
                            <li>{"Drag pieces to move them; drag the corner handles to scale and the top handle to rotate."}</li>
                            <li>{"Arrow keys nudge the selection by one pixel, ten with shift."}</li>
                            <li>{"Double click a piece to reset its scale and rotation."}</li>
                            <li>{"Export downloads every piece below the tray as a new manifest."}</li>
                        </ul>
                    </div>
                }
            </div>
        </div>
    }
}

// ─── Widgets ────────────────────────────────────────────────────────

#[derive(Properties, PartialEq)]
struct SettingCheckboxProps {
    label: AttrValue,
    checked: bool,
    on_change: Callback<bool>,
}

#[function_component(SettingCheckbox)]
fn setting_checkbox(props: &SettingCheckboxProps) -> Html {
    let onchange = {
        let cb = props.on_change.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            cb.emit(input.checked());
        })
    };
    html! {
        <label>
            <input type="checkbox" checked={props.checked} onchange={onchange} />
            {&props.label}
        </label>
    }
}
