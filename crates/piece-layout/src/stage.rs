//! Application state of the editor. One `Stage` is built at startup and
//! every event handler works through it.

use serde_json::Value;

use crate::config::EditorConfig;
use crate::error::LayoutError;
use crate::export;
use crate::flip;
use crate::geometry::{Point, Rect};
use crate::handle::{self, Anchor, TransformSession};
use crate::layout::{self, FlowLayout};
use crate::manifest::{Manifest, PieceRecord};
use crate::overlay::{HelpButton, Overlays, TooltipInfo};
use crate::scale::StageScale;
use crate::scene::{PieceId, PiecePart, Scene};
use crate::selection::{Modifiers, SelectionController};

/// What sits under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    Stage,
    Help,
    Anchor(Anchor),
    Piece(PieceId, PiecePart),
}

impl HitTarget {
    /// The piece group a hit acts on; labels resolve to their group.
    pub fn piece(&self) -> Option<PieceId> {
        match self {
            HitTarget::Piece(id, _) => Some(*id),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrowKey {
    Left,
    Right,
    Up,
    Down,
}

impl ArrowKey {
    /// Parse a `KeyboardEvent.code`.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "ArrowLeft" => Some(ArrowKey::Left),
            "ArrowRight" => Some(ArrowKey::Right),
            "ArrowUp" => Some(ArrowKey::Up),
            "ArrowDown" => Some(ArrowKey::Down),
            _ => None,
        }
    }

    fn direction(&self) -> (f64, f64) {
        match self {
            ArrowKey::Left => (-1.0, 0.0),
            ArrowKey::Right => (1.0, 0.0),
            ArrowKey::Up => (0.0, -1.0),
            ArrowKey::Down => (0.0, 1.0),
        }
    }
}

#[derive(Debug, Clone)]
enum Gesture {
    None,
    /// Pressed on a piece; becomes a drag once the pointer travels.
    Pressed {
        piece: PieceId,
        start: Point,
    },
    Dragging {
        pieces: Vec<PieceId>,
        last: Point,
    },
    Marquee,
    Transforming(TransformSession),
    HelpPressed,
}

pub struct Stage {
    config: EditorConfig,
    width: f64,
    height: f64,
    scale: StageScale,
    puzzle: String,
    scene: Scene,
    original: Option<Value>,
    manifest: Option<Manifest>,
    flow: FlowLayout,
    overlays: Overlays,
    selection: SelectionController,
    gesture: Gesture,
    hovered: Option<PieceId>,
    help_hovered: bool,
    help: HelpButton,
    help_visible: bool,
    grid_size: Option<(f64, f64)>,
}

impl Stage {
    /// Build the stage for a browser viewport of the given size.
    pub fn new(viewport_width: f64, viewport_height: f64, puzzle: &str, config: EditorConfig) -> Self {
        let (width, height) = StageScale::stage_size(viewport_width, viewport_height, &config);
        let scale = StageScale::new(width, height, &config);
        log::debug!(
            "stage {}x{} scale {} piece scale {}",
            width,
            height,
            scale.scale,
            scale.piece_scale
        );
        Self {
            flow: FlowLayout::new(width, &scale, &config),
            overlays: Overlays::new(&config),
            help: HelpButton::new(width),
            config,
            width,
            height,
            scale,
            puzzle: puzzle.to_string(),
            scene: Scene::new(),
            original: None,
            manifest: None,
            selection: SelectionController::new(),
            gesture: Gesture::None,
            hovered: None,
            help_hovered: false,
            help_visible: false,
            grid_size: None,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    pub fn scale(&self) -> &StageScale {
        &self.scale
    }

    pub fn puzzle(&self) -> &str {
        &self.puzzle
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn selection(&self) -> &SelectionController {
        &self.selection
    }

    pub fn overlays(&self) -> &Overlays {
        &self.overlays
    }

    pub fn overlays_mut(&mut self) -> &mut Overlays {
        &mut self.overlays
    }

    pub fn help_button(&self) -> &HelpButton {
        &self.help
    }

    pub fn help_visible(&self) -> bool {
        self.help_visible
    }

    pub fn hide_help(&mut self) -> bool {
        std::mem::replace(&mut self.help_visible, false)
    }

    pub fn hovered(&self) -> Option<PieceId> {
        self.hovered
    }

    /// Pointer is over the help circle.
    pub fn help_hovered(&self) -> bool {
        self.help_hovered
    }

    pub fn label_font_size(&self) -> f64 {
        self.config.label_font_size * self.scale.scale
    }

    // ─── Loading ────────────────────────────────────────────────────

    /// Keep the fetched manifest as the original snapshot and return its
    /// typed form for the loader.
    pub fn set_manifest(&mut self, raw: Value) -> Result<Manifest, LayoutError> {
        let manifest = Manifest::from_value(&raw)?;
        for issue in manifest.validate() {
            log::warn!("manifest: {issue}");
        }
        self.original = Some(raw);
        self.manifest = Some(manifest.clone());
        Ok(manifest)
    }

    /// Place a piece whose image just finished loading.
    pub fn insert_loaded_piece(&mut self, record: &PieceRecord, natural_size: (f64, f64)) -> PieceId {
        let width = natural_size.0 * self.scale.piece_scale;
        let pos = layout::initial_position(record, width, &self.scale, &mut self.flow);
        let id = self
            .scene
            .insert(record, natural_size, self.scale.piece_scale, pos);
        log::debug!("placed {} at ({}, {})", record.filename, pos.x, pos.y);
        id
    }

    pub fn set_grid_size(&mut self, natural_width: f64, natural_height: f64) {
        self.grid_size = Some((natural_width, natural_height));
    }

    /// Stage area covered by the grid overlay image.
    pub fn grid_rect(&self) -> Rect {
        let (w, h) = self
            .grid_size
            .unwrap_or((self.config.design_width, self.config.design_height));
        Rect::new(0.0, 0.0, w * self.scale.scale, h * self.scale.scale)
    }

    // ─── Hit testing ────────────────────────────────────────────────

    pub fn handle_bounds(&self) -> Option<Rect> {
        handle::selection_bounds(&self.scene, self.selection.nodes())
    }

    pub fn hit(&self, p: Point) -> HitTarget {
        if let Some(anchor) = self.handle_bounds().and_then(|b| handle::anchor_at(&b, p)) {
            return HitTarget::Anchor(anchor);
        }
        if self.help.contains(p) {
            return HitTarget::Help;
        }
        let label_font = self
            .overlays
            .show_letters
            .then(|| self.label_font_size());
        match self.scene.hit_test(p, label_font) {
            Some((id, part)) => HitTarget::Piece(id, part),
            None => HitTarget::Stage,
        }
    }

    pub fn cursor(&self) -> &'static str {
        match self.gesture {
            Gesture::Dragging { .. } => "move",
            _ if self.hovered.is_some() || self.help_hovered => "pointer",
            _ => "default",
        }
    }

    // ─── Pointer events ─────────────────────────────────────────────

    pub fn pointer_down(&mut self, p: Point) {
        self.gesture = match self.hit(p) {
            HitTarget::Anchor(anchor) => match self.handle_bounds() {
                Some(bounds) => Gesture::Transforming(TransformSession::begin(
                    anchor,
                    &bounds,
                    p,
                    &self.scene,
                    self.selection.nodes(),
                )),
                None => Gesture::None,
            },
            HitTarget::Help => Gesture::HelpPressed,
            HitTarget::Piece(piece, _) => Gesture::Pressed { piece, start: p },
            HitTarget::Stage => {
                self.selection.begin_marquee(p);
                Gesture::Marquee
            }
        };
    }

    /// Returns whether anything visible changed.
    pub fn pointer_move(&mut self, p: Point) -> bool {
        match self.gesture {
            Gesture::None | Gesture::HelpPressed => {
                let target = self.hit(p);
                let hovered = target.piece();
                let help_hovered = target == HitTarget::Help;
                let changed = hovered != self.hovered || help_hovered != self.help_hovered;
                self.hovered = hovered;
                self.help_hovered = help_hovered;
                changed
            }
            Gesture::Pressed { piece, start } => {
                if start.distance(p) < self.config.click_slop {
                    return false;
                }
                let pieces = if self.selection.is_selected(piece) {
                    self.selection.nodes().to_vec()
                } else {
                    vec![piece]
                };
                self.gesture = Gesture::Dragging {
                    pieces,
                    last: start,
                };
                self.pointer_move(p)
            }
            Gesture::Dragging {
                ref pieces,
                ref mut last,
            } => {
                let (dx, dy) = (p.x - last.x, p.y - last.y);
                *last = p;
                for id in pieces.iter() {
                    if let Some(piece) = self.scene.get_mut(*id) {
                        piece.transform.x += dx;
                        piece.transform.y += dy;
                    }
                }
                true
            }
            Gesture::Marquee => self.selection.update_marquee(p),
            Gesture::Transforming(ref session) => {
                session.update(
                    &mut self.scene,
                    p,
                    &self.overlays.rotation_snaps,
                    self.config.rotation_snap_tolerance,
                );
                true
            }
        }
    }

    /// Ends the current gesture and dispatches the click it produced, if
    /// any. Returns `true` when the caller must schedule [`Stage::tick`].
    pub fn pointer_up(&mut self, modifiers: Modifiers) -> bool {
        let gesture = std::mem::replace(&mut self.gesture, Gesture::None);
        match gesture {
            Gesture::None => false,
            Gesture::Pressed { piece, .. } => {
                self.help_visible = false;
                self.selection.click(Some(piece), modifiers);
                false
            }
            Gesture::Dragging { .. } => false,
            Gesture::Marquee => {
                self.help_visible = false;
                self.selection.finish_marquee(&self.scene);
                // the click that ends the gesture lands while the marquee is
                // still up and is ignored
                self.selection.click(None, modifiers);
                true
            }
            Gesture::Transforming(_) => {
                self.help_visible = false;
                false
            }
            Gesture::HelpPressed => {
                self.help_visible = true;
                false
            }
        }
    }

    pub fn pointer_cancel(&mut self) {
        if let Gesture::Marquee = self.gesture {
            self.selection.cancel_marquee();
        }
        self.gesture = Gesture::None;
    }

    pub fn pointer_leave(&mut self) -> bool {
        let was_help = std::mem::replace(&mut self.help_hovered, false);
        self.hovered.take().is_some() || was_help
    }

    /// Deferred work after a marquee selection: hide the rectangle.
    pub fn tick(&mut self) -> bool {
        self.selection.hide_marquee()
    }

    /// Double click resets the piece under the pointer.
    pub fn double_click(&mut self, p: Point) -> bool {
        match self.hit(p).piece() {
            Some(id) => {
                self.reset_piece(id);
                true
            }
            None => false,
        }
    }

    /// Restore a piece's recorded transform, or the identity transform when
    /// the manifest has no record for it.
    pub fn reset_piece(&mut self, id: PieceId) {
        let Some(piece) = self.scene.get_mut(id) else {
            return;
        };
        let record = self
            .manifest
            .as_ref()
            .and_then(|m| m.find(&piece.filename));
        let t = &mut piece.transform;
        match record {
            Some(r) => {
                t.scale_x = r.scale_x();
                t.scale_y = r.scale_y();
                t.rotation = r.rotation();
                if !r.is_unplaced() {
                    t.x = self.scale.to_screen(r.x);
                    t.y = self.scale.to_screen(r.y);
                }
            }
            None => {
                log::warn!("reset: no original record for {}", piece.filename);
                t.scale_x = 1.0;
                t.scale_y = 1.0;
                t.rotation = 0.0;
            }
        }
    }

    /// Arrow key nudge of the selection. Returns `true` for every arrow key
    /// so the page doesn't scroll.
    pub fn nudge(&mut self, key: ArrowKey, shift: bool) -> bool {
        let mut delta = self.config.arrow_delta * self.scale.scale;
        if shift {
            delta *= self.config.shift_multiplier;
        }
        let (dx, dy) = key.direction();
        for id in self.selection.nodes() {
            if let Some(piece) = self.scene.get_mut(*id) {
                piece.transform.x += dx * delta;
                piece.transform.y += dy * delta;
            }
        }
        true
    }

    pub fn tooltip(&self) -> Option<TooltipInfo> {
        if !self.overlays.show_tooltips {
            return None;
        }
        let piece = self.scene.get(self.hovered?)?;
        Some(TooltipInfo::for_piece(piece, &self.scale))
    }

    // ─── Flip / export ──────────────────────────────────────────────

    pub fn flip(&mut self) -> usize {
        let pivot = flip::flip_pivot(self.grid_rect().width, self.config.margin);
        flip::flip_placed(&mut self.scene, self.config.export_below_y, pivot).len()
    }

    pub fn export_filename(&self) -> String {
        export::export_filename(&self.puzzle)
    }

    pub fn export_json(&self) -> Result<String, LayoutError> {
        let original = self
            .original
            .as_ref()
            .ok_or_else(|| LayoutError::InvalidManifest("no manifest loaded".to_string()))?;
        export::export_json(original, &self.scene, &self.scale, self.config.export_below_y)
    }
}
