//! Admin form extractor.
//!
//! The admin endpoint accepts both `application/x-www-form-urlencoded` and
//! `multipart/form-data` bodies. [`AdminForm`] reads either into a flat list
//! of text fields plus any uploaded files, and [`AdminForm::to_value`] turns
//! the fields into a JSON object the typed forms deserialize from.

use axum::extract::multipart::MultipartError;
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::Form;
use folio_core::upload::{TransportError, UploadedFile};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::AppError;

/// Fields whose text value is a JSON document rather than plain text.
const JSON_FIELDS: &[&str] = &["timeline_phases", "repository"];

/// A decoded admin request body.
#[derive(Debug, Default)]
pub struct AdminForm {
    /// Text fields in submission order. Repeated names are kept.
    pub fields: Vec<(String, String)>,
    /// File parts in submission order.
    pub files: Vec<UploadedFile>,
}

impl AdminForm {
    /// First value submitted under `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// The `action` selector, trimmed.
    pub fn action(&self) -> Option<&str> {
        self.get("action").map(str::trim).filter(|a| !a.is_empty())
    }

    /// Fields as `(name, value)` string slices.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Fold the fields into a JSON object.
    ///
    /// `name[]` fields collect into an array under `name`. Known JSON fields
    /// are parsed and dropped when malformed. For other repeated names the
    /// last value wins.
    pub fn to_value(&self) -> Value {
        let mut object = Map::new();
        for (name, value) in &self.fields {
            if let Some(base) = name.strip_suffix("[]") {
                let entry = object
                    .entry(base.to_string())
                    .or_insert_with(|| Value::Array(Vec::new()));
                if let Value::Array(items) = entry {
                    items.push(Value::String(value.clone()));
                }
                continue;
            }

            if JSON_FIELDS.contains(&name.as_str()) {
                match serde_json::from_str(value) {
                    Ok(parsed) => {
                        object.insert(name.clone(), parsed);
                    }
                    Err(e) => tracing::warn!(field = %name, error = %e, "Ignoring malformed JSON field"),
                }
                continue;
            }
            object.insert(name.clone(), Value::String(value.clone()));
        }
        Value::Object(object)
    }

    /// Deserialize the fields into a typed form.
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T, AppError> {
        serde_json::from_value(self.to_value())
            .map_err(|e| AppError::BadRequest(format!("Invalid form data: {e}")))
    }
}

impl<S> FromRequest<S> for AdminForm
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_ascii_lowercase();

        if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            return read_multipart(multipart).await;
        }

        let Form(fields) = Form::<Vec<(String, String)>>::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        Ok(AdminForm {
            fields,
            files: Vec::new(),
        })
    }
}

/// Field names whose file parts are gallery uploads.
const GALLERY_FILE_FIELDS: &[&str] = &["gallery_files[]", "gallery_files"];

async fn read_multipart(mut multipart: Multipart) -> Result<AdminForm, AppError> {
    let mut form = AdminForm::default();

    // Any stream error fails the whole request.
    while let Some(field) = multipart.next_field().await.map_err(stream_error)? {
        let name = field.name().unwrap_or("").to_string();

        let Some(file_name) = field.file_name().map(str::to_string) else {
            let text = field.text().await.map_err(stream_error)?;
            form.fields.push((name, text));
            continue;
        };

        if !GALLERY_FILE_FIELDS.contains(&name.as_str()) {
            // Drain the part so the stream stays in sync.
            field.bytes().await.map_err(stream_error)?;
            tracing::warn!(field = %name, file = %file_name, "Ignoring file for unknown field");
            continue;
        }

        if file_name.is_empty() {
            field.bytes().await.map_err(stream_error)?;
            form.files
                .push(UploadedFile::failed(file_name, TransportError::NoFile));
            continue;
        }

        let content_type = field.content_type().unwrap_or("").to_string();
        let data = field.bytes().await.map_err(stream_error)?;
        form.files
            .push(UploadedFile::new(file_name, content_type, data.to_vec()));
    }

    Ok(form)
}

fn stream_error(e: MultipartError) -> AppError {
    tracing::warn!(error = %e, "Multipart body could not be read");
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::BadRequest(TransportError::ExceedsRequestLimit.to_string())
    } else {
        AppError::BadRequest(format!("Incomplete form submission: {}", e.body_text()))
    }
}
