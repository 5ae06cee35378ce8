//! Field placement: turns a pointer-drag gesture into a field rectangle
//! anchored, sized, and clamped within a page's visible area, and manages
//! the select/edit/apply lifecycle of an existing field.

use chrono::{DateTime, Utc};
use shared_geometry::Rect;
use uuid::Uuid;

use crate::model::{Field, FieldKind, Session};

/// Default field box sizes in device-independent units. Fixed, not derived
/// from content.
pub const SIGNATURE_BOX: (f64, f64) = (150.0, 50.0);
pub const INITIAL_BOX: (f64, f64) = (60.0, 50.0);

impl FieldKind {
    /// Default (width, height) for a freshly dropped field of this kind.
    pub fn default_box(self) -> (f64, f64) {
        match self {
            FieldKind::Signature => SIGNATURE_BOX,
            FieldKind::Initial => INITIAL_BOX,
        }
    }

    /// Resolve a drag payload string. Unknown payloads resolve to `None`.
    pub fn from_payload(payload: &str) -> Option<Self> {
        match payload {
            "signature" => Some(FieldKind::Signature),
            "initial" => Some(FieldKind::Initial),
            _ => None,
        }
    }
}

/// Live drag gesture state, captured at drag-start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragState {
    pub kind: FieldKind,
    pub box_w: f64,
    pub box_h: f64,
    /// Pointer offset within the dragged control. Preserved so the grab
    /// point stays under the cursor for the whole drag.
    pub anchor_x: f64,
    pub anchor_y: f64,
}

/// Owns the transient drag state between drag-start and drop. The state is
/// discarded on every outcome, rejection and cancellation included.
#[derive(Debug, Default)]
pub struct PlacementEngine {
    drag: Option<DragState>,
}

impl PlacementEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture a new drag. Rejected while the layout is locked.
    pub fn begin_drag(
        &mut self,
        session: &Session,
        kind: FieldKind,
        anchor_x: f64,
        anchor_y: f64,
    ) -> bool {
        if session.layout_locked {
            return false;
        }
        let (box_w, box_h) = kind.default_box();
        self.drag = Some(DragState {
            kind,
            box_w,
            box_h,
            anchor_x,
            anchor_y,
        });
        true
    }

    pub fn drag_state(&self) -> Option<&DragState> {
        self.drag.as_ref()
    }

    /// Drop the dragged field onto a page.
    ///
    /// `drop_x`/`drop_y` are the pointer position in wrapper space;
    /// `canvas_box` is the rendered page's bounding box in the same space.
    /// The placed rect is clamped into the canvas box shrunk by `padding`
    /// on all sides. Returns the new field's id, or `None` when the drop is
    /// rejected (layout locked, no page at `page_index`, or the payload
    /// does not resolve to a field kind). Drag state is cleared regardless.
    #[allow(clippy::too_many_arguments)]
    pub fn drop_on_page(
        &mut self,
        session: &mut Session,
        page_index: usize,
        payload: Option<&str>,
        drop_x: f64,
        drop_y: f64,
        canvas_box: Rect,
        padding: f64,
    ) -> Option<Uuid> {
        let drag = self.drag.take();

        if session.layout_locked {
            return None;
        }
        let kind = payload
            .and_then(FieldKind::from_payload)
            .or(drag.map(|d| d.kind))?;
        let page = session.page_mut(page_index)?;

        let (box_w, box_h, anchor_x, anchor_y) = match drag {
            Some(d) => (d.box_w, d.box_h, d.anchor_x, d.anchor_y),
            None => {
                let (w, h) = kind.default_box();
                (w, h, 0.0, 0.0)
            }
        };

        let placed = Rect::new(drop_x - anchor_x, drop_y - anchor_y, box_w, box_h);
        let inner = canvas_box.inset(padding);
        let rect = placed.clamp_into(&inner);

        let field = Field::new(kind, rect);
        let id = field.id;
        page.fields.push(field);
        Some(id)
    }

    /// Abandon an in-flight drag (pointer released outside any page).
    pub fn cancel_drag(&mut self) {
        self.drag = None;
    }
}

/// Remove a field from a page immediately. Refused while the layout is
/// locked.
pub fn remove_field(session: &mut Session, page_index: usize, field_id: Uuid) -> bool {
    if session.layout_locked {
        return false;
    }
    match session.page_mut(page_index) {
        Some(page) => page.remove_field(field_id),
        None => false,
    }
}

/// Two-state field edit flow: `Idle`, or `Editing` a staged copy of a live
/// field. Mutations touch only the staged copy until `apply` writes it back
/// over the original.
#[derive(Debug, Default)]
pub enum FieldEditor {
    #[default]
    Idle,
    Editing(Field),
}

impl FieldEditor {
    /// Stage a copy of a live field for editing.
    pub fn select(&mut self, session: &Session, page_index: usize, field_id: Uuid) -> bool {
        let staged = session
            .page(page_index)
            .and_then(|p| p.fields.iter().find(|f| f.id == field_id))
            .cloned();
        match staged {
            Some(field) => {
                *self = FieldEditor::Editing(field);
                true
            }
            None => false,
        }
    }

    /// The staged copy, for mutation while editing.
    pub fn staged_mut(&mut self) -> Option<&mut Field> {
        match self {
            FieldEditor::Editing(field) => Some(field),
            FieldEditor::Idle => None,
        }
    }

    /// Commit the staged copy back into its page at the original field's
    /// position, stamping `applied_at` when requested, then return to
    /// `Idle`. If the live field has been removed in the meantime the
    /// editor stays in `Editing` and nothing is written.
    pub fn apply(&mut self, session: &mut Session) -> bool {
        self.apply_at(session, Utc::now())
    }

    pub fn apply_at(&mut self, session: &mut Session, now: DateTime<Utc>) -> bool {
        let staged = match self {
            FieldEditor::Editing(field) => field,
            FieldEditor::Idle => return false,
        };
        if staged.include_timestamp {
            staged.applied_at = Some(now);
        }
        let Some((page_idx, field_idx)) = session.find_field(staged.id) else {
            return false;
        };
        session.pages[page_idx].fields[field_idx] = staged.clone();
        *self = FieldEditor::Idle;
        true
    }

    /// Discard the staged copy without touching the page.
    pub fn cancel(&mut self) {
        *self = FieldEditor::Idle;
    }
}
