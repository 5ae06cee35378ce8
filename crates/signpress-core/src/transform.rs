//! Wrapper-space → PDF user-space conversion.
//!
//! Wrapper and canvas space have their origin at the top-left; PDF user
//! space has its origin at the bottom-left, in points. The rendered canvas
//! may be a different size from the PDF page (rendering uses a fixed zoom
//! scale), so the conversion goes through normalized page fractions.
//!
//! Invoked once per field at export time, never during dragging.

use shared_geometry::{flip_y_frac, Rect};

/// Convert a field's wrapper-space rect into PDF user-space coordinates for
/// a target page of `pdf_page_width` × `pdf_page_height` points.
///
/// `canvas_rect` and `wrapper_rect` are the rendered canvas's and its
/// containing wrapper's bounding boxes in the same (viewport) space;
/// `padding` is the fixed border between the canvas edge and the visible
/// page surface.
///
/// Fractions outside `[0, 1]` mean upstream clamping was bypassed; the
/// transform maps them faithfully rather than masking the data problem.
pub fn to_pdf_space(
    field_rect: &Rect,
    canvas_rect: &Rect,
    wrapper_rect: &Rect,
    padding: f64,
    pdf_page_width: f64,
    pdf_page_height: f64,
) -> Rect {
    let canvas_left_in_wrapper = canvas_rect.x - wrapper_rect.x;
    let canvas_top_in_wrapper = canvas_rect.y - wrapper_rect.y;

    // Position within the inner, unpadded canvas area, in on-screen units.
    let x_in_canvas = field_rect.x - canvas_left_in_wrapper - padding;
    let y_in_canvas = field_rect.y - canvas_top_in_wrapper - padding;

    let inner_w = canvas_rect.width - padding * 2.0;
    let inner_h = canvas_rect.height - padding * 2.0;

    let x_frac = x_in_canvas / inner_w;
    let y_frac = y_in_canvas / inner_h;
    let w_frac = field_rect.width / inner_w;
    let h_frac = field_rect.height / inner_h;

    // The flip is computed from the rect's bottom edge; using the top edge
    // would offset embedded images by one rect height.
    Rect {
        x: x_frac * pdf_page_width,
        y: flip_y_frac(y_frac, h_frac) * pdf_page_height,
        width: w_frac * pdf_page_width,
        height: h_frac * pdf_page_height,
    }
}
