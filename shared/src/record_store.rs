//! Requests against the animal records endpoint and interpretation of their
//! responses.

use tracing::{debug, instrument, warn};

use crate::capabilities::{
    AppHttp, HttpError, HttpResponse, HttpResult, ValidatedUrl, MAX_REQUEST_BODY_SIZE,
};
use crate::config::EditorConfig;
use crate::error::{AppError, AppResult, ErrorKind};
use crate::event::Event;
use crate::model::{Record, RecordId};
use crate::submission::SubmissionPayload;

pub const RECORDS_PATH: &str = "animals";

/// `{api}/animals/{id}`
pub fn record_url(config: &EditorConfig, id: &RecordId) -> Result<ValidatedUrl, HttpError> {
    config
        .api_base()?
        .join_segments(&[RECORDS_PATH, id.as_str()])
}

/// `GET {api}/animals/{id}`
pub fn send_fetch<F>(
    http: &AppHttp,
    config: &EditorConfig,
    id: &RecordId,
    callback: F,
) -> Result<(), HttpError>
where
    F: FnOnce(HttpResult) -> Event + Send + 'static,
{
    let url = record_url(config, id)?;

    http.get(url.as_str())
        .header("Accept", "application/json")
        .send(callback);
    Ok(())
}

/// `PUT {api}/animals/{id}` with a multipart body.
#[instrument(skip(http, config, payload, callback), fields(record_id = %id))]
pub fn send_update<F>(
    http: &AppHttp,
    config: &EditorConfig,
    id: &RecordId,
    payload: &SubmissionPayload,
    callback: F,
) -> Result<(), HttpError>
where
    F: FnOnce(HttpResult) -> Event + Send + 'static,
{
    let url = record_url(config, id)?;
    let boundary = SubmissionPayload::new_boundary();
    let body = payload.encode(&boundary);
    if body.len() > MAX_REQUEST_BODY_SIZE {
        return Err(HttpError::BodyTooLarge {
            size: body.len(),
            max: MAX_REQUEST_BODY_SIZE,
        });
    }
    debug!(body_bytes = body.len(), parts = payload.parts().len(), "encoded update payload");

    let content_type = format!("multipart/form-data; boundary={boundary}");
    http.put(url.as_str())
        .header("Accept", "application/json")
        .header("Content-Type", content_type.as_str())
        .body_bytes(body)
        .send(callback);
    Ok(())
}

fn transport_error(e: &impl std::fmt::Display) -> AppError {
    AppError::new(ErrorKind::Network, e.to_string())
}

/// Splits a response into its body, or the error its status carries.
fn success_body(mut response: HttpResponse) -> AppResult<Vec<u8>> {
    let status = response.status();
    let body = response.take_body().unwrap_or_default();
    if status.is_success() {
        Ok(body)
    } else {
        Err(AppError::from_http_status(u16::from(status), &body))
    }
}

/// Decodes a fetch response into a [`Record`].
#[instrument(skip(result), fields(record_id = %id))]
pub fn parse_record(id: &RecordId, result: HttpResult) -> AppResult<Record> {
    let response = result.map_err(|e| {
        warn!(error = %e, "record fetch failed in transport");
        transport_error(&e)
    })?;

    let body = success_body(response)
        .inspect_err(|e| warn!(error = %e, "record fetch returned an error status"))?;

    let record: Record = serde_json::from_slice(&body)
        .map_err(|e| AppError::new(ErrorKind::Deserialization, e.to_string()))?;

    if &record.id != id {
        warn!(returned = %record.id, "record store answered with a different id");
    }

    Ok(record)
}

/// Maps an update response to success or the error it carries.
pub fn check_update(result: HttpResult) -> AppResult<()> {
    let response = result.map_err(|e| transport_error(&e))?;
    success_body(response).map(|_| ())
}
