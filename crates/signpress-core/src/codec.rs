//! Lossless serialization of a session to a storage-friendly JSON
//! representation, and back.
//!
//! The stored form uses only text-safe scalars: binary buffers travel as
//! standard base64, timestamps as RFC 3339, absent options as absent keys.
//! Transient state (`rendered_size`, cached raster data) is not stored and
//! comes back `None`.
//!
//! Every storage or decoding failure is caught here: `save_session`
//! surfaces `false`, `load_session` surfaces `None`, and the cause goes to
//! the log. Callers never see a raw backend error.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared_geometry::Rect;
use uuid::Uuid;

use crate::error::CodecError;
use crate::model::{Field, FieldKind, ImageFormat, Page, Session, SignatureImage};
use crate::store::KeyValueStore;

/// Canonical on-disk schema, version-stable. One JSON document per storage
/// key holds the whole session, its name included.
#[derive(Debug, Serialize, Deserialize)]
struct SavedSession {
    document_name: String,
    #[serde(default)]
    layout_locked: bool,
    pages: Vec<SavedPage>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SavedPage {
    uid: String,
    page_number: u32,
    #[serde(default)]
    file_name: String,
    pdf_base64: String,
    fields: Vec<SavedField>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SavedField {
    id: String,
    kind: FieldKind,
    rect: Rect,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sig_base64: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    format: Option<ImageFormat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    initials_text: Option<String>,
    #[serde(default)]
    include_timestamp: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    applied_at: Option<DateTime<Utc>>,
}

/// Serialize a full session snapshot to its stored JSON form.
pub fn encode_session(session: &Session) -> Result<String, CodecError> {
    let saved = SavedSession {
        document_name: session.name.clone(),
        layout_locked: session.layout_locked,
        pages: session.pages.iter().map(encode_page).collect(),
    };
    serde_json::to_string(&saved).map_err(|e| CodecError::Serialize(e.to_string()))
}

/// Reconstruct a session from its stored JSON form, byte-for-byte and
/// instant-for-instant identical to what was encoded.
pub fn decode_session(raw: &str) -> Result<Session, CodecError> {
    let saved: SavedSession =
        serde_json::from_str(raw).map_err(|e| CodecError::Malformed(e.to_string()))?;

    let mut pages = Vec::with_capacity(saved.pages.len());
    for page in saved.pages {
        pages.push(decode_page(page)?);
    }
    Ok(Session {
        name: saved.document_name,
        layout_locked: saved.layout_locked,
        pages,
    })
}

/// Encode and write a session under `key`. Returns whether the save
/// succeeded; the failure cause is logged, not propagated.
pub fn save_session(store: &mut dyn KeyValueStore, key: &str, session: &Session) -> bool {
    match try_save(store, key, session) {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(key, error = %e, "failed to save session");
            false
        }
    }
}

/// Read and decode the session stored under `key`. A missing key loads as
/// `None`; so does every failure path, after logging. The caller falls
/// back to a fresh session.
pub fn load_session(store: &dyn KeyValueStore, key: &str) -> Option<Session> {
    match try_load(store, key) {
        Ok(session) => session,
        Err(e) => {
            tracing::error!(key, error = %e, "failed to load session");
            None
        }
    }
}

fn try_save(store: &mut dyn KeyValueStore, key: &str, session: &Session) -> Result<(), CodecError> {
    let encoded = encode_session(session)?;
    store.put(key, encoded)?;
    Ok(())
}

fn try_load(store: &dyn KeyValueStore, key: &str) -> Result<Option<Session>, CodecError> {
    match store.get(key)? {
        Some(raw) => decode_session(&raw).map(Some),
        None => Ok(None),
    }
}

fn encode_page(page: &Page) -> SavedPage {
    SavedPage {
        uid: page.uid.to_string(),
        page_number: page.page_number,
        file_name: page.file_name.clone(),
        pdf_base64: BASE64.encode(&page.raw_bytes),
        fields: page.fields.iter().map(encode_field).collect(),
    }
}

fn encode_field(field: &Field) -> SavedField {
    SavedField {
        id: field.id.to_string(),
        kind: field.kind,
        rect: field.rect,
        sig_base64: field.image.as_ref().map(|img| BASE64.encode(&img.bytes)),
        format: field.image.as_ref().map(|img| img.format),
        initials_text: field.initials_text.clone(),
        include_timestamp: field.include_timestamp,
        applied_at: field.applied_at,
    }
}

fn decode_page(saved: SavedPage) -> Result<Page, CodecError> {
    let raw_bytes = BASE64
        .decode(&saved.pdf_base64)
        .map_err(|e| CodecError::Malformed(format!("page bytes: {e}")))?;
    let mut fields = Vec::with_capacity(saved.fields.len());
    for field in saved.fields {
        fields.push(decode_field(field)?);
    }
    Ok(Page {
        uid: parse_uuid(&saved.uid)?,
        file_name: saved.file_name,
        page_number: saved.page_number,
        raw_bytes,
        rendered_size: None,
        fields,
    })
}

fn decode_field(saved: SavedField) -> Result<Field, CodecError> {
    if !(saved.rect.width > 0.0 && saved.rect.height > 0.0) {
        return Err(CodecError::Malformed(format!(
            "field {} has degenerate rect {}x{}",
            saved.id, saved.rect.width, saved.rect.height
        )));
    }
    let image = match (saved.sig_base64, saved.format) {
        (Some(b64), Some(format)) => Some(SignatureImage {
            bytes: BASE64
                .decode(&b64)
                .map_err(|e| CodecError::Malformed(format!("field image bytes: {e}")))?,
            format,
        }),
        (Some(_), None) => {
            return Err(CodecError::Malformed(format!(
                "field {} stores image bytes without a format",
                saved.id
            )))
        }
        _ => None,
    };
    Ok(Field {
        id: parse_uuid(&saved.id)?,
        kind: saved.kind,
        rect: saved.rect,
        image,
        initials_text: saved.initials_text,
        include_timestamp: saved.include_timestamp,
        applied_at: saved.applied_at,
    })
}

fn parse_uuid(raw: &str) -> Result<Uuid, CodecError> {
    Uuid::parse_str(raw).map_err(|e| CodecError::Malformed(format!("bad id {raw:?}: {e}")))
}
