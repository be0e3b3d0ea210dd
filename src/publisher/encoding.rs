//! Request body encoding

use std::io::Write;

use flate2::write::GzEncoder;
use serde::Serialize;

use crate::config::Compression;

/// Errors while producing a request body
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("gzip compression failed: {0}")]
    Gzip(#[from] std::io::Error),
}

/// Serialize `payload` to JSON and compress it as configured
pub fn encode_body<T>(payload: &T, compression: Compression) -> Result<Vec<u8>, EncodeError>
where
    T: Serialize + ?Sized,
{
    let json = serde_json::to_vec(payload)?;
    match compression {
        Compression::None => Ok(json),
        Compression::Gzip => gzip(&json),
    }
}

fn gzip(data: &[u8]) -> Result<Vec<u8>, EncodeError> {
    let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}
