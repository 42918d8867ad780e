use std::f64::consts::PI;

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

use piece_layout::geometry::{deg2rad, Rect};
use piece_layout::handle::{Anchor, ANCHOR_SIZE};
use piece_layout::scene::PieceView;
use piece_layout::selection::Marquee;

use crate::state::EditorState;

const LABEL_FONT: &str = "Dutch811, serif";
const HOVER_FILTER: &str = "brightness(65%)";
const HANDLE_COLOR: &str = "#4287f5";
const HELP_COLOR: &str = "#4287f5";
const HELP_HOVER_FILTER: &str = "brightness(90%)";

fn get_ctx(canvas: &HtmlCanvasElement) -> Option<CanvasRenderingContext2d> {
    canvas
        .get_context("2d")
        .ok()
        .flatten()
        .and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
}

/// Size the backing store to the stage and repaint everything.
pub fn redraw(canvas: &HtmlCanvasElement, state: &EditorState) {
    let (width, height) = state.stage.size();
    if canvas.width() != width as u32 || canvas.height() != height as u32 {
        canvas.set_width(width as u32);
        canvas.set_height(height as u32);
    }
    let Some(ctx) = get_ctx(canvas) else {
        log::error!("canvas has no 2d context");
        return;
    };
    ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0).ok();
    ctx.clear_rect(0.0, 0.0, width, height);

    let stage = &state.stage;
    for piece in stage.scene().iter() {
        if let Some(img) = state.image(piece.id) {
            draw_piece(&ctx, piece, img, stage.hovered() == Some(piece.id));
        }
    }
    if stage.overlays().show_letters {
        let font_size = stage.label_font_size();
        for piece in stage.scene().iter() {
            draw_label(&ctx, piece, font_size);
        }
    }
    if stage.overlays().show_grid {
        if let Some(grid) = &state.grid {
            draw_grid(&ctx, grid, &stage.grid_rect(), stage.overlays().grid_opacity);
        }
    }
    if let Some(marquee) = stage.selection().marquee() {
        draw_marquee(&ctx, marquee);
    }
    if let Some(bounds) = stage.handle_bounds() {
        draw_handle(&ctx, &bounds);
    }
    let help = stage.help_button();
    draw_help_button(&ctx, help.center.x, help.center.y, help.radius, stage.help_hovered());
}

fn draw_piece(ctx: &CanvasRenderingContext2d, piece: &PieceView, img: &HtmlImageElement, hovered: bool) {
    let t = &piece.transform;
    ctx.save();
    ctx.translate(t.x, t.y).ok();
    ctx.rotate(deg2rad(t.rotation)).ok();
    ctx.scale(t.scale_x, t.scale_y).ok();
    if hovered {
        ctx.set_filter(HOVER_FILTER);
    }
    ctx.draw_image_with_html_image_element_and_dw_and_dh(img, 0.0, 0.0, piece.width, piece.height)
        .ok();
    ctx.restore();
}

/// Letters are drawn in stage space at the group's centre so they stay
/// upright and unmirrored whatever the piece transform.
fn draw_label(ctx: &CanvasRenderingContext2d, piece: &PieceView, font_size: f64) {
    if piece.letter.is_empty() {
        return;
    }
    let label = piece.label(font_size);
    ctx.save();
    ctx.set_font(&format!("{}px {}", font_size, LABEL_FONT));
    ctx.set_text_align("center");
    ctx.set_text_baseline("middle");
    ctx.set_line_width(3.0);
    ctx.set_line_join("round");
    ctx.set_stroke_style_str("#000000");
    ctx.stroke_text(&piece.letter, label.center.x, label.center.y).ok();
    ctx.set_shadow_color("#000000");
    ctx.set_shadow_blur(2.0);
    ctx.set_shadow_offset_x(2.0);
    ctx.set_shadow_offset_y(2.0);
    ctx.set_fill_style_str("#FFFFFF");
    ctx.fill_text(&piece.letter, label.center.x, label.center.y).ok();
    ctx.restore();
}

fn draw_grid(ctx: &CanvasRenderingContext2d, grid: &HtmlImageElement, rect: &Rect, opacity: f64) {
    ctx.save();
    ctx.set_global_alpha(opacity);
    ctx.draw_image_with_html_image_element_and_dw_and_dh(grid, rect.x, rect.y, rect.width, rect.height)
        .ok();
    ctx.restore();
}

fn draw_marquee(ctx: &CanvasRenderingContext2d, marquee: &Marquee) {
    let r = marquee.rect();
    ctx.save();
    ctx.set_fill_style_str("#e6e6e6");
    ctx.set_global_alpha(0.5);
    ctx.fill_rect(r.x, r.y, r.width, r.height);
    ctx.set_global_alpha(1.0);
    ctx.set_stroke_style_str("#b3b3b3");
    ctx.set_line_width(2.0);
    let dash = js_sys::Array::of2(&JsValue::from(10.0), &JsValue::from(10.0));
    ctx.set_line_dash(&dash).ok();
    ctx.stroke_rect(r.x, r.y, r.width, r.height);
    ctx.restore();
}

fn draw_handle(ctx: &CanvasRenderingContext2d, bounds: &Rect) {
    ctx.save();
    ctx.set_stroke_style_str(HANDLE_COLOR);
    ctx.set_line_width(1.0);
    ctx.stroke_rect(bounds.x, bounds.y, bounds.width, bounds.height);

    let rotate = Anchor::Rotate.position(bounds);
    ctx.begin_path();
    ctx.move_to(rotate.x, bounds.y);
    ctx.line_to(rotate.x, rotate.y);
    ctx.stroke();

    let half = ANCHOR_SIZE / 2.0;
    ctx.set_fill_style_str("#FFFFFF");
    for anchor in Anchor::ALL {
        let p = anchor.position(bounds);
        ctx.fill_rect(p.x - half, p.y - half, ANCHOR_SIZE, ANCHOR_SIZE);
        ctx.stroke_rect(p.x - half, p.y - half, ANCHOR_SIZE, ANCHOR_SIZE);
    }
    ctx.restore();
}

fn draw_help_button(ctx: &CanvasRenderingContext2d, cx: f64, cy: f64, radius: f64, hovered: bool) {
    ctx.save();
    if hovered {
        ctx.set_filter(HELP_HOVER_FILTER);
    }
    ctx.set_shadow_color("#666666");
    ctx.set_shadow_blur(6.0);
    ctx.set_shadow_offset_x(2.0);
    ctx.set_shadow_offset_y(2.0);
    ctx.set_fill_style_str(HELP_COLOR);
    ctx.begin_path();
    ctx.arc(cx, cy, radius, 0.0, 2.0 * PI).ok();
    ctx.fill();
    ctx.set_shadow_color("transparent");
    ctx.set_fill_style_str("#FFFFFF");
    ctx.set_font("bold 36px Lato, sans-serif");
    ctx.set_text_align("center");
    ctx.set_text_baseline("middle");
    ctx.fill_text("?", cx, cy).ok();
    ctx.restore();
}
