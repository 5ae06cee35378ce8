//! Render scheduling and the one-time decoder engine setup.
//!
//! Rasterization itself belongs to the decoder collaborator; this module
//! owns the ordering guarantee around it: the last-requested render for a
//! given page index always wins. Each `begin` hands out a generation
//! ticket and invalidates the previous one for that index, so a stale
//! completion arriving late is discarded instead of overwriting newer
//! pixels.

use std::collections::HashMap;
use std::sync::OnceLock;

use lopdf::Document;

use crate::model::{RenderedSize, Session};
use crate::pdf;

/// Fixed border between the canvas edge and the visible page surface, in
/// wrapper-space units.
pub const PADDING: f64 = 6.0;

/// Fixed zoom scale pages are rasterized at.
pub const SCALE: f64 = 1.25;

/// Decoder engine configuration, applied exactly once per process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Upper bound on rasterized page surface edge length, in pixels.
    pub max_surface_edge: u32,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_surface_edge: 8192,
        }
    }
}

static DECODER: OnceLock<DecoderConfig> = OnceLock::new();

/// Install the decoder engine configuration. The first call wins; repeated
/// and concurrent calls are no-ops that return the active configuration.
pub fn init_decoder(config: DecoderConfig) -> &'static DecoderConfig {
    DECODER.get_or_init(|| config)
}

/// The active decoder configuration, if the engine has been initialized.
pub fn decoder_config() -> Option<&'static DecoderConfig> {
    DECODER.get()
}

/// Page size at a render scale, in wrapper-space units, straight from the
/// source document's geometry.
pub fn rendered_size_at(bytes: &[u8], page_number: u32, scale: f64) -> Option<RenderedSize> {
    let doc = Document::load_mem(bytes).ok()?;
    let page_id = *doc.get_pages().get(&page_number)?;
    let (w, h) = pdf::page_dimensions(&doc, page_id);
    Some(RenderedSize {
        width: w * scale,
        height: h * scale,
    })
}

/// Proof that a render was the most recently requested one for its page
/// index at the time it started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderTicket {
    page_index: usize,
    generation: u64,
}

/// Tracks the current render generation per page index.
#[derive(Debug, Default)]
pub struct RenderQueue {
    generations: HashMap<usize, u64>,
}

impl RenderQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a render for `page_index`, cancelling whatever render was in
    /// flight for that index.
    pub fn begin(&mut self, page_index: usize) -> RenderTicket {
        let generation = self.generations.entry(page_index).or_insert(0);
        *generation += 1;
        RenderTicket {
            page_index,
            generation: *generation,
        }
    }

    pub fn is_current(&self, ticket: RenderTicket) -> bool {
        self.generations.get(&ticket.page_index) == Some(&ticket.generation)
    }

    /// Record a finished render. A ticket superseded by a newer `begin`
    /// for the same index is stale: it is discarded and the session is
    /// left untouched.
    pub fn complete(
        &mut self,
        session: &mut Session,
        ticket: RenderTicket,
        size: RenderedSize,
    ) -> bool {
        if !self.is_current(ticket) {
            tracing::debug!(
                page_index = ticket.page_index,
                "discarding superseded render"
            );
            return false;
        }
        match session.page_mut(ticket.page_index) {
            Some(page) => {
                page.rendered_size = Some(size);
                true
            }
            None => false,
        }
    }
}
