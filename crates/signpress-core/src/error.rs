use thiserror::Error;

/// Failure from the key-value storage backend.
#[derive(Error, Debug)]
#[error("storage backend error: {0}")]
pub struct StoreError(pub String);

/// Failures crossing the persistence codec boundary. Callers of
/// `save_session`/`load_session` never see these; they are logged there and
/// collapsed to `bool`/`Option`.
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("failed to serialize session: {0}")]
    Serialize(String),

    #[error("malformed stored session: {0}")]
    Malformed(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Failures while appending source documents to a session.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("empty file")]
    EmptyFile,

    #[error("failed to parse PDF: {0}")]
    ParseError(String),
}

/// Failures from the signing/export pipeline.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("failed to parse PDF: {0}")]
    ParseError(String),

    #[error("page {0} not found in source document")]
    PageNotFound(u32),

    #[error("failed to decode signature image: {0}")]
    ImageDecode(String),

    #[error("PDF operation failed: {0}")]
    OperationError(String),
}
