use crate::geometry::{Point, Rect};
use crate::scene::{PieceId, Scene};

/// Modifier keys held during a click. Any of them toggles membership.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub meta: bool,
}

impl Modifiers {
    pub fn any(&self) -> bool {
        self.shift || self.ctrl || self.meta
    }
}

/// Rubber-band rectangle of a drag selection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marquee {
    pub anchor: Point,
    pub current: Point,
    /// Pointer released; the marquee stays visible until the next tick so
    /// the click that ends the gesture can still see it.
    pub released: bool,
}

impl Marquee {
    pub fn rect(&self) -> Rect {
        Rect::spanning(self.anchor, self.current)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectionState<'a> {
    Idle,
    RectSelecting(&'a Marquee),
    Selected(&'a [PieceId]),
}

/// Owns the set of pieces attached to the transform handle.
#[derive(Debug, Clone, Default)]
pub struct SelectionController {
    nodes: Vec<PieceId>,
    marquee: Option<Marquee>,
}

impl SelectionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SelectionState<'_> {
        match &self.marquee {
            Some(m) if !m.released => SelectionState::RectSelecting(m),
            _ if self.nodes.is_empty() => SelectionState::Idle,
            _ => SelectionState::Selected(&self.nodes),
        }
    }

    pub fn nodes(&self) -> &[PieceId] {
        &self.nodes
    }

    pub fn is_selected(&self, id: PieceId) -> bool {
        self.nodes.contains(&id)
    }

    pub fn marquee(&self) -> Option<&Marquee> {
        self.marquee.as_ref()
    }

    pub fn set_nodes(&mut self, nodes: Vec<PieceId>) {
        let mut deduped = Vec::with_capacity(nodes.len());
        for id in nodes {
            if !deduped.contains(&id) {
                deduped.push(id);
            }
        }
        log::debug!("selection: {:?}", deduped);
        self.nodes = deduped;
    }

    pub fn clear(&mut self) {
        self.set_nodes(Vec::new());
    }

    /// Pointer pressed on empty stage.
    pub fn begin_marquee(&mut self, at: Point) {
        self.marquee = Some(Marquee {
            anchor: at,
            current: at,
            released: false,
        });
    }

    /// Returns whether a marquee is being dragged.
    pub fn update_marquee(&mut self, to: Point) -> bool {
        match &mut self.marquee {
            Some(m) if !m.released => {
                m.current = to;
                true
            }
            _ => false,
        }
    }

    /// Pointer released: select everything the marquee touches. Returns
    /// `false` when no marquee was active.
    pub fn finish_marquee(&mut self, scene: &Scene) -> bool {
        let rect = match &mut self.marquee {
            Some(m) if !m.released => {
                m.released = true;
                m.rect()
            }
            _ => return false,
        };
        self.set_nodes(scene.intersecting(&rect));
        true
    }

    /// Deferred half of `finish_marquee`. A marquee still being dragged is
    /// left alone.
    pub fn hide_marquee(&mut self) -> bool {
        if matches!(self.marquee, Some(m) if m.released) {
            self.marquee = None;
            true
        } else {
            false
        }
    }

    /// Drop the marquee without selecting anything.
    pub fn cancel_marquee(&mut self) -> bool {
        self.marquee.take().is_some()
    }

    pub fn marquee_visible(&self) -> bool {
        self.marquee.is_some()
    }

    /// Click on the stage background or on a piece.
    pub fn click(&mut self, target: Option<PieceId>, modifiers: Modifiers) {
        if self.marquee_visible() {
            return;
        }
        let Some(id) = target else {
            self.clear();
            return;
        };
        let toggle = modifiers.any();
        let selected = self.is_selected(id);
        if !toggle && !selected {
            self.set_nodes(vec![id]);
        } else if toggle && selected {
            let nodes = self.nodes.iter().copied().filter(|n| *n != id).collect();
            self.set_nodes(nodes);
        } else if toggle && !selected {
            let mut nodes = self.nodes.clone();
            nodes.push(id);
            self.set_nodes(nodes);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::Manifest;

    const SHIFT: Modifiers = Modifiers {
        shift: true,
        ctrl: false,
        meta: false,
    };

    fn three_pieces() -> Scene {
        let m = Manifest::from_json(
            r#"{"pieces":[
                {"filename":"a.png","x":0,"y":0},
                {"filename":"b.png","x":0,"y":0},
                {"filename":"c.png","x":0,"y":0}
            ]}"#,
        )
        .unwrap();
        let mut s = Scene::new();
        s.insert(&m.pieces[0], (20.0, 20.0), 1.0, Point::new(0.0, 0.0));
        s.insert(&m.pieces[1], (20.0, 20.0), 1.0, Point::new(40.0, 0.0));
        s.insert(&m.pieces[2], (20.0, 20.0), 1.0, Point::new(200.0, 200.0));
        s
    }

    #[test]
    fn test_click_select_toggle() {
        let mut sel = SelectionController::new();
        sel.click(Some(PieceId(0)), Modifiers::default());
        assert_eq!(sel.nodes(), &[PieceId(0)]);
        // plain click on an already selected piece keeps the set
        sel.click(Some(PieceId(1)), SHIFT);
        sel.click(Some(PieceId(0)), Modifiers::default());
        assert_eq!(sel.nodes(), &[PieceId(0), PieceId(1)]);
        sel.click(Some(PieceId(0)), Modifiers { ctrl: true, ..Modifiers::default() });
        assert_eq!(sel.nodes(), &[PieceId(1)]);
        sel.click(Some(PieceId(2)), Modifiers::default());
        assert_eq!(sel.nodes(), &[PieceId(2)]);
        sel.click(None, SHIFT);
        assert_eq!(sel.state(), SelectionState::Idle);
    }

    #[test]
    fn test_marquee_selects_enclosed() {
        let scene = three_pieces();
        let mut sel = SelectionController::new();
        sel.begin_marquee(Point::new(-5.0, -5.0));
        assert!(matches!(sel.state(), SelectionState::RectSelecting(_)));
        assert!(sel.update_marquee(Point::new(100.0, 50.0)));
        assert!(sel.finish_marquee(&scene));
        assert_eq!(sel.nodes(), &[PieceId(0), PieceId(1)]);

        // the click ending the gesture is swallowed until the next tick
        sel.click(None, Modifiers::default());
        assert_eq!(sel.nodes().len(), 2);
        assert!(sel.hide_marquee());
        assert!(matches!(sel.state(), SelectionState::Selected(_)));
        sel.click(None, Modifiers::default());
        assert!(sel.nodes().is_empty());
    }

    #[test]
    fn test_marquee_drag_upward_left() {
        let scene = three_pieces();
        let mut sel = SelectionController::new();
        sel.begin_marquee(Point::new(230.0, 230.0));
        sel.update_marquee(Point::new(210.0, 190.0));
        sel.finish_marquee(&scene);
        assert_eq!(sel.nodes(), &[PieceId(2)]);
        assert!(!sel.update_marquee(Point::new(0.0, 0.0)));
    }

    #[test]
    fn test_hide_keeps_active_marquee() {
        let mut sel = SelectionController::new();
        sel.begin_marquee(Point::new(10.0, 10.0));
        assert!(!sel.hide_marquee());
        assert!(matches!(sel.state(), SelectionState::RectSelecting(_)));
        assert!(sel.cancel_marquee());
        assert!(!sel.marquee_visible());
    }

    #[test]
    fn test_set_nodes_dedups() {
        let mut sel = SelectionController::new();
        sel.set_nodes(vec![PieceId(3), PieceId(1), PieceId(3)]);
        assert_eq!(sel.nodes(), &[PieceId(3), PieceId(1)]);
        assert!(!sel.finish_marquee(&Scene::new()));
    }
}
