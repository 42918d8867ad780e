use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{HtmlAnchorElement, HtmlImageElement};

use piece_layout::manifest::PieceRecord;
use piece_layout::puzzle::{manifest_url, piece_url, GRID_URL};

use crate::state::EditorState;

/// Load an image and resolve once it has decoded.
pub async fn load_image(url: &str) -> Result<HtmlImageElement, JsValue> {
    let img = HtmlImageElement::new()?;
    let promise = js_sys::Promise::new(&mut |resolve, reject| {
        let onload = Closure::once(move || {
            let _ = resolve.call0(&JsValue::NULL);
        });
        let onerror = Closure::once(move || {
            let _ = reject.call1(&JsValue::NULL, &JsValue::from_str("image_load_failed"));
        });
        img.set_onload(Some(onload.as_ref().unchecked_ref()));
        img.set_onerror(Some(onerror.as_ref().unchecked_ref()));
        onload.forget();
        onerror.forget();
    });
    img.set_src(url);
    wasm_bindgen_futures::JsFuture::from(promise).await?;
    Ok(img)
}

async fn fetch_manifest(url: &str) -> Result<serde_json::Value, String> {
    let resp = gloo::net::http::Request::get(url)
        .send()
        .await
        .map_err(|e| format!("network error: {e}"))?;
    if !resp.ok() {
        return Err(format!("manifest not found ({})", resp.status()));
    }
    let text = resp
        .text()
        .await
        .map_err(|e| format!("failed to read response: {e}"))?;
    serde_json::from_str(&text).map_err(|e| format!("failed to parse manifest: {e}"))
}

/// Fetch the puzzle's manifest and start one load per piece. Pieces appear
/// in the order their images finish loading; `on_change` runs after each.
pub async fn load_puzzle(state: Rc<RefCell<EditorState>>, on_change: Rc<dyn Fn()>) {
    let puzzle = state.borrow().stage.puzzle().to_string();
    let raw = match fetch_manifest(&manifest_url(&puzzle)).await {
        Ok(v) => v,
        Err(e) => {
            log::warn!("{puzzle}: {e}");
            return;
        }
    };
    let manifest = match state.borrow_mut().stage.set_manifest(raw) {
        Ok(m) => m,
        Err(e) => {
            log::warn!("{puzzle}: {e}");
            return;
        }
    };
    log::info!("{puzzle}: loading {} pieces", manifest.pieces.len());
    for record in manifest.pieces {
        let state = state.clone();
        let on_change = on_change.clone();
        let url = piece_url(&puzzle, &record.filename);
        wasm_bindgen_futures::spawn_local(async move {
            match load_image(&url).await {
                Ok(img) => {
                    add_piece(&state, &record, img);
                    on_change();
                }
                Err(e) => log::warn!("failed to load {}: {:?}", record.filename, e),
            }
        });
    }
}

fn add_piece(state: &Rc<RefCell<EditorState>>, record: &PieceRecord, img: HtmlImageElement) {
    let mut st = state.borrow_mut();
    let natural = (img.natural_width() as f64, img.natural_height() as f64);
    st.stage.insert_loaded_piece(record, natural);
    st.images.push(img);
}

pub async fn load_grid(state: Rc<RefCell<EditorState>>, on_change: Rc<dyn Fn()>) {
    match load_image(GRID_URL).await {
        Ok(img) => {
            let mut st = state.borrow_mut();
            st.stage
                .set_grid_size(img.natural_width() as f64, img.natural_height() as f64);
            st.grid = Some(img);
            drop(st);
            on_change();
        }
        Err(e) => log::warn!("failed to load grid overlay: {:?}", e),
    }
}

/// Hand `json` to the browser as a file download.
pub fn download_json(filename: &str, json: &str) -> Result<(), JsValue> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let body = document
        .body()
        .ok_or_else(|| JsValue::from_str("no body"))?;
    let href = format!(
        "data:text/json;charset=utf-8,{}",
        String::from(js_sys::encode_uri_component(json))
    );
    let a: HtmlAnchorElement = document.create_element("a")?.dyn_into()?;
    a.set_href(&href);
    a.set_download(filename);
    body.append_child(&a)?;
    a.click();
    a.remove();
    Ok(())
}
