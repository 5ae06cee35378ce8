//! Probing helpers over a loaded source document: page geometry and
//! content presence. Shared by ingest, render scheduling, and export.

use lopdf::{Document, Object, ObjectId};

/// Intrinsic page size in PDF points, found by walking the page's Parent
/// chain for an inherited MediaBox. Falls back to A4 when the document
/// carries no usable box.
pub fn page_dimensions(doc: &Document, page_id: ObjectId) -> (f64, f64) {
    let mut current = Some(page_id);
    while let Some(id) = current {
        let Ok(dict) = doc.get_object(id).and_then(|o| o.as_dict()) else {
            break;
        };
        if let Some(size) = media_box_size(doc, dict) {
            return size;
        }
        current = dict.get(b"Parent").and_then(|p| p.as_reference()).ok();
    }
    (595.0, 842.0)
}

fn media_box_size(doc: &Document, dict: &lopdf::Dictionary) -> Option<(f64, f64)> {
    let raw = dict.get(b"MediaBox").ok()?;
    let resolved = match raw {
        Object::Reference(id) => doc.get_object(*id).ok()?,
        other => other,
    };
    let arr = resolved.as_array().ok()?;
    if arr.len() != 4 {
        return None;
    }
    let llx = obj_to_f64(&arr[0])?;
    let lly = obj_to_f64(&arr[1])?;
    let urx = obj_to_f64(&arr[2])?;
    let ury = obj_to_f64(&arr[3])?;
    Some((urx - llx, ury - lly))
}

fn obj_to_f64(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(f) => Some((*f).into()),
        _ => None,
    }
}

/// Whether the page draws anything: its content stream contains at least
/// one operator. Blank pages are dropped at ingest.
pub fn page_has_content(doc: &Document, page_id: ObjectId) -> bool {
    match doc.get_page_content(page_id) {
        Ok(content) => content.iter().any(|b| !b.is_ascii_whitespace()),
        Err(_) => false,
    }
}
