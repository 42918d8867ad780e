use web_sys::HtmlImageElement;

use piece_layout::puzzle::puzzle_or_default;
use piece_layout::scene::PieceId;
use piece_layout::{EditorConfig, Stage};

/// Everything the callbacks share: the layout stage plus the browser images
/// backing its pieces. `images[id.0]` belongs to `PieceId(id.0)`.
pub struct EditorState {
    pub stage: Stage,
    pub images: Vec<HtmlImageElement>,
    pub grid: Option<HtmlImageElement>,
}

impl EditorState {
    pub fn new() -> Self {
        let config = EditorConfig::default();
        let puzzle = puzzle_or_default(query_param("puzzle").as_deref(), &config);
        let (width, height) = viewport_size();
        Self {
            stage: Stage::new(width, height, &puzzle, config),
            images: Vec::new(),
            grid: None,
        }
    }

    pub fn image(&self, id: PieceId) -> Option<&HtmlImageElement> {
        self.images.get(id.0)
    }
}

pub fn viewport_size() -> (f64, f64) {
    let window = match web_sys::window() {
        Some(w) => w,
        None => return (0.0, 0.0),
    };
    let dim = |v: Result<wasm_bindgen::JsValue, wasm_bindgen::JsValue>| {
        v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0)
    };
    (dim(window.inner_width()), dim(window.inner_height()))
}

pub fn query_param(key: &str) -> Option<String> {
    let search = web_sys::window()?.location().search().ok()?;
    web_sys::UrlSearchParams::new_with_str(&search).ok()?.get(key)
}
