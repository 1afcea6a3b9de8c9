//! Update payload assembly and multipart encoding.

use serde::{Deserialize, Serialize};

use crate::draft::DraftState;
use crate::error::{AppError, AppResult, ErrorKind};
use crate::model::{FormFields, ImageRef};

pub const UPDATE_SUCCESS_MESSAGE: &str = "Hayvan başarıyla güncellendi.";
pub const UPDATE_FAILURE_MESSAGE: &str = "Hayvan güncellenirken bir hata oluştu.";

const BOUNDARY_PREFIX: &str = "----AnimalFormBoundary";

/// A successful update discards the edit page, so success has no state here.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum SubmissionState {
    #[default]
    Idle,
    Pending,
    Failed(AppError),
}

impl SubmissionState {
    pub fn is_pending(&self) -> bool {
        matches!(self, SubmissionState::Pending)
    }

    pub fn error(&self) -> Option<&AppError> {
        match self {
            SubmissionState::Failed(e) => Some(e),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PayloadPart {
    Text {
        name: &'static str,
        value: String,
    },
    File {
        name: &'static str,
        file_name: String,
        content_type: String,
        bytes: Vec<u8>,
    },
}

impl PayloadPart {
    pub fn name(&self) -> &'static str {
        match self {
            PayloadPart::Text { name, .. } | PayloadPart::File { name, .. } => name,
        }
    }
}

/// Ordered multipart fields for one update request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmissionPayload {
    parts: Vec<PayloadPart>,
}

impl SubmissionPayload {
    /// Five form fields always; `location` only when the draft has one;
    /// `image` only when the draft holds a non-empty image.
    pub fn build(form: &FormFields, draft: &DraftState) -> AppResult<Self> {
        let mut parts: Vec<PayloadPart> = form
            .wire_values()
            .into_iter()
            .map(|(name, value)| PayloadPart::Text { name, value })
            .collect();

        if let Some(location) = draft.pending_location() {
            let value = serde_json::to_string(&location).map_err(|e| {
                AppError::new(ErrorKind::Serialization, e.to_string())
                    .with_context("field", "location")
            })?;
            parts.push(PayloadPart::Text {
                name: "location",
                value,
            });
        }

        match draft.pending_image() {
            Some(image) if !image.is_empty() => parts.push(Self::image_part(image)?),
            _ => {}
        }

        Ok(Self { parts })
    }

    fn image_part(image: &ImageRef) -> AppResult<PayloadPart> {
        Ok(match image {
            ImageRef::Stored { path } => PayloadPart::Text {
                name: "image",
                value: path.clone(),
            },
            ImageRef::Local(local) => {
                local.validate()?;
                PayloadPart::File {
                    name: "image",
                    file_name: local.file_name.clone(),
                    content_type: local.content_type.clone(),
                    bytes: local.bytes.clone(),
                }
            }
        })
    }

    pub fn parts(&self) -> &[PayloadPart] {
        &self.parts
    }

    pub fn contains(&self, name: &str) -> bool {
        self.parts.iter().any(|p| p.name() == name)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.parts.iter().find_map(|p| match p {
            PayloadPart::Text { name: n, value } if *n == name => Some(value.as_str()),
            _ => None,
        })
    }

    pub fn new_boundary() -> String {
        format!("{BOUNDARY_PREFIX}{}", uuid::Uuid::new_v4().simple())
    }

    /// `multipart/form-data` body delimited by `boundary`.
    pub fn encode(&self, boundary: &str) -> Vec<u8> {
        let mut body = Vec::new();

        for part in &self.parts {
            body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
            match part {
                PayloadPart::Text { name, value } => {
                    body.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n")
                            .as_bytes(),
                    );
                    body.extend_from_slice(value.as_bytes());
                }
                PayloadPart::File {
                    name,
                    file_name,
                    content_type,
                    bytes,
                } => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{name}\"; filename=\"{}\"\r\n\
                             Content-Type: {content_type}\r\n\r\n",
                            sanitize_file_name(file_name)
                        )
                        .as_bytes(),
                    );
                    body.extend_from_slice(bytes);
                }
            }
            body.extend_from_slice(b"\r\n");
        }

        body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
        body
    }
}

fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| !matches!(c, '\r' | '\n' | '\0'))
        .map(|c| if c == '"' { '\'' } else { c })
        .collect();

    if cleaned.trim().is_empty() {
        "image".to_string()
    } else {
        cleaned
    }
}
