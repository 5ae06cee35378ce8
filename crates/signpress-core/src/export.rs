//! Signing/export pipeline: burn a page's fields into its source PDF as
//! images and hand back the finished bytes.
//!
//! Each field image is decoded (PNG or JPEG, per its stored format), split
//! into an RGB image XObject plus a DeviceGray soft mask so transparency
//! survives, registered in the page resources, and drawn by an appended
//! content stream at its transformed PDF-space rectangle.

use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use shared_geometry::Rect;

use crate::error::ExportError;
use crate::model::{ImageFormat, Page, SignatureImage};
use crate::pdf;
use crate::transform::to_pdf_space;

/// On-screen geometry of the rendered page, captured at export time and
/// fed to the coordinate transform.
#[derive(Debug, Clone, Copy)]
pub struct ViewGeometry {
    /// Rendered canvas bounding box, viewport space.
    pub canvas_rect: Rect,
    /// Containing wrapper bounding box, same space.
    pub wrapper_rect: Rect,
    /// Fixed border between canvas edge and visible page surface.
    pub padding: f64,
}

/// A finished export: output bytes plus the deterministic download name.
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// The artifact name for a source file: `signed-<original>`.
pub fn signed_file_name(source: &str) -> String {
    format!("signed-{source}")
}

/// Produce a signed PDF for one page. Fields without an image are skipped;
/// a field whose image bytes fail to decode is an error. The output always
/// contains the full source document, signed page included.
pub fn export_signed_page(page: &Page, view: &ViewGeometry) -> Result<ExportArtifact, ExportError> {
    let mut doc =
        Document::load_mem(&page.raw_bytes).map_err(|e| ExportError::ParseError(e.to_string()))?;
    let page_id = *doc
        .get_pages()
        .get(&page.page_number)
        .ok_or(ExportError::PageNotFound(page.page_number))?;
    let (pdf_width, pdf_height) = pdf::page_dimensions(&doc, page_id);

    let mut content = Vec::new();
    for (index, field) in page.fields.iter().enumerate() {
        let Some(image) = field.image.as_ref() else {
            tracing::debug!(field = %field.id, "field has no image yet, skipping");
            continue;
        };
        let name = format!("ImSig{index}");
        let image_id = embed_image(&mut doc, image)?;
        register_image(&mut doc, page_id, &name, image_id)?;

        let rect = to_pdf_space(
            &field.rect,
            &view.canvas_rect,
            &view.wrapper_rect,
            view.padding,
            pdf_width,
            pdf_height,
        );
        content.extend_from_slice(
            format!(
                "q {} 0 0 {} {} {} cm /{} Do Q\n",
                rect.width, rect.height, rect.x, rect.y, name
            )
            .as_bytes(),
        );
    }

    if !content.is_empty() {
        doc.add_page_contents(page_id, content)
            .map_err(|e| ExportError::OperationError(e.to_string()))?;
    }

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| ExportError::OperationError(e.to_string()))?;

    Ok(ExportArtifact {
        file_name: signed_file_name(&page.file_name),
        bytes,
    })
}

/// Decode the stored image and add it as an RGB image XObject with a
/// DeviceGray soft mask carrying the alpha channel.
fn embed_image(doc: &mut Document, image: &SignatureImage) -> Result<ObjectId, ExportError> {
    let format = match image.format {
        ImageFormat::Png => image::ImageFormat::Png,
        ImageFormat::Jpg => image::ImageFormat::Jpeg,
    };
    let decoded = image::load_from_memory_with_format(&image.bytes, format)
        .map_err(|e| ExportError::ImageDecode(e.to_string()))?
        .to_rgba8();
    let (width, height) = decoded.dimensions();

    let mut rgb = Vec::with_capacity((width * height * 3) as usize);
    let mut alpha = Vec::with_capacity((width * height) as usize);
    for pixel in decoded.pixels() {
        rgb.push(pixel[0]);
        rgb.push(pixel[1]);
        rgb.push(pixel[2]);
        alpha.push(pixel[3]);
    }

    let smask_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width as i64,
            "Height" => height as i64,
            "ColorSpace" => "DeviceGray",
            "BitsPerComponent" => 8,
        },
        alpha,
    ));

    Ok(doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width as i64,
            "Height" => height as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
            "SMask" => smask_id,
        },
        rgb,
    )))
}

/// Make the XObject reachable from the page's resources, whether those are
/// inline, referenced, or missing entirely.
fn register_image(
    doc: &mut Document,
    page_id: ObjectId,
    name: &str,
    image_id: ObjectId,
) -> Result<(), ExportError> {
    let mut resources_obj = {
        let page_dict = doc
            .get_object_mut(page_id)
            .and_then(|o| o.as_dict_mut())
            .map_err(|e| ExportError::OperationError(e.to_string()))?;
        page_dict
            .remove(b"Resources")
            .unwrap_or_else(|| Object::Dictionary(dictionary! {}))
    };

    match &mut resources_obj {
        Object::Reference(id) => {
            let res_dict = doc
                .get_object_mut(*id)
                .and_then(|o| o.as_dict_mut())
                .map_err(|e| ExportError::OperationError(e.to_string()))?;
            xobject_dict(res_dict)?.set(name, image_id);
        }
        Object::Dictionary(ref mut dict) => {
            xobject_dict(dict)?.set(name, image_id);
        }
        _ => {
            return Err(ExportError::OperationError(
                "page resources are not a dictionary".to_string(),
            ))
        }
    }

    let page_dict = doc
        .get_object_mut(page_id)
        .and_then(|o| o.as_dict_mut())
        .map_err(|e| ExportError::OperationError(e.to_string()))?;
    page_dict.set("Resources", resources_obj);
    Ok(())
}

fn xobject_dict(
    res_dict: &mut lopdf::Dictionary,
) -> Result<&mut lopdf::Dictionary, ExportError> {
    let owned = res_dict
        .remove(b"XObject")
        .unwrap_or_else(|| Object::Dictionary(dictionary! {}));
    let sanitized = match owned {
        Object::Dictionary(dict) => Object::Dictionary(dict),
        _ => Object::Dictionary(dictionary! {}),
    };
    res_dict.set("XObject", sanitized);
    match res_dict.get_mut(b"XObject") {
        Ok(Object::Dictionary(ref mut dict)) => Ok(dict),
        _ => Err(ExportError::OperationError(
            "page XObject resources are not a dictionary".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Field, FieldKind};
    use crate::pdf::fixtures::pdf_with_pages;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn png_bytes() -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(2, 2, image::Rgba([20, 30, 40, 200]));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    fn jpg_bytes() -> Vec<u8> {
        let img = image::RgbImage::from_pixel(2, 2, image::Rgb([200, 10, 10]));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Jpeg)
            .unwrap();
        buf
    }

    fn view() -> ViewGeometry {
        ViewGeometry {
            canvas_rect: Rect::new(0.0, 0.0, 412.0, 612.0),
            wrapper_rect: Rect::new(0.0, 0.0, 412.0, 612.0),
            padding: 6.0,
        }
    }

    fn signed_field(bytes: Vec<u8>, format: ImageFormat) -> Field {
        let mut field = Field::new(FieldKind::Signature, Rect::new(56.0, 106.0, 150.0, 50.0));
        field.image = Some(SignatureImage { bytes, format });
        field
    }

    #[test]
    fn artifact_is_named_after_the_source_file() {
        assert_eq!(signed_file_name("lease.pdf"), "signed-lease.pdf");
    }

    #[test]
    fn exports_a_page_with_a_png_signature() {
        let mut page = Page::new("lease.pdf", 1, pdf_with_pages(&[b"q Q"]));
        page.fields.push(signed_field(png_bytes(), ImageFormat::Png));

        let artifact = export_signed_page(&page, &view()).unwrap();

        assert_eq!(artifact.file_name, "signed-lease.pdf");
        assert!(artifact.bytes.starts_with(b"%PDF-"));

        let doc = Document::load_mem(&artifact.bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
        let (_, page_id) = doc.get_pages().into_iter().next().unwrap();
        let content = doc.get_page_content(page_id).unwrap();
        let content = String::from_utf8_lossy(&content);
        assert!(content.contains("/ImSig0 Do"));
    }

    #[test]
    fn jpeg_signatures_embed_too() {
        let mut page = Page::new("nda.pdf", 1, pdf_with_pages(&[b"q Q"]));
        page.fields.push(signed_field(jpg_bytes(), ImageFormat::Jpg));

        let artifact = export_signed_page(&page, &view()).unwrap();
        assert!(Document::load_mem(&artifact.bytes).is_ok());
    }

    #[test]
    fn multiple_fields_get_distinct_resource_names() {
        let mut page = Page::new("doc.pdf", 1, pdf_with_pages(&[b"q Q"]));
        page.fields.push(signed_field(png_bytes(), ImageFormat::Png));
        let mut second = signed_field(png_bytes(), ImageFormat::Png);
        second.rect = Rect::new(200.0, 300.0, 60.0, 50.0);
        page.fields.push(second);

        let artifact = export_signed_page(&page, &view()).unwrap();
        let doc = Document::load_mem(&artifact.bytes).unwrap();
        let (_, page_id) = doc.get_pages().into_iter().next().unwrap();
        let content = doc.get_page_content(page_id).unwrap();
        let content = String::from_utf8_lossy(&content);
        assert!(content.contains("/ImSig0 Do"));
        assert!(content.contains("/ImSig1 Do"));
    }

    #[test]
    fn field_without_an_image_is_skipped_not_fatal() {
        let mut page = Page::new("doc.pdf", 1, pdf_with_pages(&[b"q Q"]));
        page.fields
            .push(Field::new(FieldKind::Signature, Rect::new(10.0, 10.0, 150.0, 50.0)));
        page.fields.push(signed_field(png_bytes(), ImageFormat::Png));

        let artifact = export_signed_page(&page, &view()).unwrap();
        let doc = Document::load_mem(&artifact.bytes).unwrap();
        let (_, page_id) = doc.get_pages().into_iter().next().unwrap();
        let content = doc.get_page_content(page_id).unwrap();
        let content = String::from_utf8_lossy(&content);
        // Index 0 had no image; only the second field drew.
        assert!(!content.contains("/ImSig0 Do"));
        assert!(content.contains("/ImSig1 Do"));
    }

    #[test]
    fn page_with_no_drawable_fields_still_exports() {
        let mut page = Page::new("doc.pdf", 1, pdf_with_pages(&[b"q Q"]));
        page.fields
            .push(Field::new(FieldKind::Initial, Rect::new(10.0, 10.0, 60.0, 50.0)));

        let artifact = export_signed_page(&page, &view()).unwrap();
        assert!(Document::load_mem(&artifact.bytes).is_ok());
    }

    #[test]
    fn missing_target_page_is_an_error() {
        let mut page = Page::new("doc.pdf", 4, pdf_with_pages(&[b"q Q"]));
        page.fields.push(signed_field(png_bytes(), ImageFormat::Png));

        assert!(matches!(
            export_signed_page(&page, &view()),
            Err(ExportError::PageNotFound(4))
        ));
    }

    #[test]
    fn corrupt_image_bytes_are_a_decode_error() {
        let mut page = Page::new("doc.pdf", 1, pdf_with_pages(&[b"q Q"]));
        page.fields
            .push(signed_field(b"not an image".to_vec(), ImageFormat::Png));

        assert!(matches!(
            export_signed_page(&page, &view()),
            Err(ExportError::ImageDecode(_))
        ));
    }

    #[test]
    fn corrupt_source_bytes_are_a_parse_error() {
        let page = Page::new("doc.pdf", 1, b"definitely not a pdf".to_vec());
        assert!(matches!(
            export_signed_page(&page, &view()),
            Err(ExportError::ParseError(_))
        ));
    }
}
