//! The owned in-memory representation of a signing session: loaded pages
//! and the fields placed on them.
//!
//! Pages and fields are created by user action (file append, drag-drop) and
//! mutated in place by the placement engine and field edits. Only the
//! persistence codec may reconstruct them from stored data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared_geometry::Rect;
use uuid::Uuid;

/// What a placed field represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Signature,
    Initial,
}

/// Stored encoding of a signature/initial image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Jpg,
}

/// An owned raster image payload with its encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct SignatureImage {
    pub bytes: Vec<u8>,
    pub format: ImageFormat,
}

/// A user-placed signature or initials annotation.
///
/// At most one of `image` / `initials_text` is semantically active. Both may
/// be absent while the user is still editing; export of a `Signature` field
/// requires `image`.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub id: Uuid,
    pub kind: FieldKind,
    /// Position and size in wrapper space, the space the user manipulates.
    pub rect: Rect,
    pub image: Option<SignatureImage>,
    /// Text alternative, used only for `Initial` fields.
    pub initials_text: Option<String>,
    pub include_timestamp: bool,
    /// Stamped when edits are committed with `include_timestamp` set.
    pub applied_at: Option<DateTime<Utc>>,
}

impl Field {
    pub fn new(kind: FieldKind, rect: Rect) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            rect,
            image: None,
            initials_text: None,
            include_timestamp: false,
            applied_at: None,
        }
    }
}

/// Page dimensions at the last-used render scale, in wrapper-space units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderedSize {
    pub width: f64,
    pub height: f64,
}

/// One page of one source document.
///
/// `raw_bytes` holds the *entire* source document, not just this page: the
/// render and export libraries both operate on whole documents. Every page
/// owns its own copy so two pages of the same file never alias.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub uid: Uuid,
    pub file_name: String,
    /// 1-based index into the source document.
    pub page_number: u32,
    pub raw_bytes: Vec<u8>,
    /// `None` until first rendered. Never persisted.
    pub rendered_size: Option<RenderedSize>,
    /// Insertion order matters only for UI listing.
    pub fields: Vec<Field>,
}

impl Page {
    pub fn new(file_name: impl Into<String>, page_number: u32, raw_bytes: Vec<u8>) -> Self {
        Self {
            uid: Uuid::new_v4(),
            file_name: file_name.into(),
            page_number,
            raw_bytes,
            rendered_size: None,
            fields: Vec::new(),
        }
    }

    /// Remove a field immediately, no staging. Returns whether it existed.
    pub fn remove_field(&mut self, field_id: Uuid) -> bool {
        if let Some(pos) = self.fields.iter().position(|f| f.id == field_id) {
            self.fields.remove(pos);
            true
        } else {
            false
        }
    }
}

/// The working set: a named, ordered sequence of pages. Pages from several
/// uploaded files may interleave.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub name: String,
    pub pages: Vec<Page>,
    /// While set, placement and field removal are rejected.
    pub layout_locked: bool,
}

impl Session {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pages: Vec::new(),
            layout_locked: false,
        }
    }

    pub fn page(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    pub fn page_mut(&mut self, index: usize) -> Option<&mut Page> {
        self.pages.get_mut(index)
    }

    /// Locate a field by id across all pages.
    pub fn find_field(&self, field_id: Uuid) -> Option<(usize, usize)> {
        for (page_idx, page) in self.pages.iter().enumerate() {
            if let Some(field_idx) = page.fields.iter().position(|f| f.id == field_id) {
                return Some((page_idx, field_idx));
            }
        }
        None
    }

    pub fn clear(&mut self) {
        self.pages.clear();
    }
}
