//! Signature field placement and signing core.
//!
//! This crate owns the geometry-heavy part of a PDF signing tool: turning
//! drag gestures into clamped field rectangles, converting those rectangles
//! between on-screen wrapper space and PDF user space (origin bottom-left),
//! persisting the working session losslessly, and burning placed fields
//! into the final PDF as images.
//!
//! The visual layer, routing, and the rasterizer that actually paints page
//! pixels are collaborators behind the seams in [`store`] and [`render`];
//! nothing here touches a screen.

pub mod codec;
pub mod error;
pub mod export;
pub mod ingest;
pub mod model;
mod pdf;
pub mod placement;
pub mod render;
pub mod store;
pub mod transform;

pub use codec::{decode_session, encode_session, load_session, save_session};
pub use error::{CodecError, ExportError, IngestError, StoreError};
pub use export::{export_signed_page, signed_file_name, ExportArtifact, ViewGeometry};
pub use ingest::{append_document, append_documents, page_count, SourceFile};
pub use model::{
    Field, FieldKind, ImageFormat, Page, RenderedSize, Session, SignatureImage,
};
pub use placement::{remove_field, DragState, FieldEditor, PlacementEngine};
pub use render::{
    init_decoder, rendered_size_at, DecoderConfig, RenderQueue, RenderTicket, PADDING, SCALE,
};
pub use store::{KeyValueStore, MemoryStore};
pub use transform::to_pdf_space;
