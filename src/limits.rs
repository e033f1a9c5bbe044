use serde::Serialize;

use crate::error::{ApiError, ApiResult};

/// The store's physical per-document ceiling (MongoDB BSON limit).
/// Anything above this is guaranteed to be rejected by the server, so we
/// refuse it up front with a clear message instead of a raw driver error.
pub const STORE_DOCUMENT_LIMIT: usize = 16 * 1024 * 1024;

/// Practical ceiling. Writes above this still go through, but they leave no
/// headroom for field growth on update, so they are logged as warnings.
pub const PRACTICAL_DOCUMENT_LIMIT: usize = 12 * 1024 * 1024;

/// Serialized size of a document as it would be sent to the store.
pub fn serialized_size<T: Serialize>(value: &T) -> ApiResult<usize> {
    Ok(serde_json::to_vec(value)?.len())
}

/// check_document_size
///
/// Best-effort guard run before every property write. Listings embed base64
/// images and sometimes video directly in the document, so user uploads can
/// genuinely approach the store limit. Over the hard ceiling the write is
/// rejected with PayloadTooLarge; over the practical ceiling it proceeds
/// with a warning. The rejection message is user-facing Turkish, matching
/// what the admin panel displays.
pub fn check_document_size<T: Serialize>(value: &T) -> ApiResult<()> {
    let size = serialized_size(value)?;
    let size_mb = size as f64 / 1024.0 / 1024.0;

    tracing::debug!(size_bytes = size, size_mb, "document size check");

    if size > STORE_DOCUMENT_LIMIT {
        return Err(ApiError::PayloadTooLarge(format!(
            "İlan verisi çok büyük ({:.1}MB). MongoDB limit: 16MB. \
             Lütfen video boyutunu küçültün (max 8-10MB önerili) veya daha az resim kullanın.",
            size_mb
        )));
    }

    if size > PRACTICAL_DOCUMENT_LIMIT {
        tracing::warn!(size_mb, "document size is close to the store limit");
    }

    Ok(())
}
