//! Wire encoding of `multipart/form-data` bodies.
//!
//! `ApiRequest::call_options` only produces the ordered field list; this
//! module turns that list into bytes for transports that do not encode
//! multipart themselves. File contents are read from disk at encode time.

use std::fs;

use crate::error::ApiError;
use crate::http::{MultipartField, MultipartValue};

/// An encoded multipart body together with its boundary.
#[derive(Debug, Clone)]
pub struct MultipartBody {
    pub boundary: String,
    pub bytes: Vec<u8>,
}

impl MultipartBody {
    /// Encode `fields` with a freshly generated boundary.
    ///
    /// Fails with `ApiError::Transport` if an attached file cannot be read.
    pub fn encode(fields: &[MultipartField]) -> Result<Self, ApiError> {
        Self::encode_with_boundary(fields, generate_boundary())
    }

    pub fn encode_with_boundary(
        fields: &[MultipartField],
        boundary: String,
    ) -> Result<Self, ApiError> {
        let mut bytes = Vec::new();
        for field in fields {
            bytes.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
            match &field.value {
                MultipartValue::Text(text) => {
                    bytes.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                            escape_quoted(&field.name)
                        )
                        .as_bytes(),
                    );
                    bytes.extend_from_slice(text.as_bytes());
                }
                MultipartValue::File(file) => {
                    let contents = fs::read(&file.path).map_err(|e| {
                        ApiError::Transport(format!(
                            "failed to read {}: {e}",
                            file.path.display()
                        ))
                    })?;
                    bytes.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                             Content-Type: {}\r\n\r\n",
                            escape_quoted(&field.name),
                            escape_quoted(&file.file_name),
                            file.mime_type
                        )
                        .as_bytes(),
                    );
                    bytes.extend_from_slice(&contents);
                }
            }
            bytes.extend_from_slice(b"\r\n");
        }
        bytes.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
        Ok(Self { boundary, bytes })
    }

    /// Value for the `Content-Type` header.
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }
}

fn generate_boundary() -> String {
    format!("------------------------{}", uuid::Uuid::new_v4().simple())
}

fn escape_quoted(value: &str) -> String {
    value
        .replace('"', "%22")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}
