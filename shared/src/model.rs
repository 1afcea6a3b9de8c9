use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::config::EditorConfig;
use crate::draft::DraftState;
use crate::error::{AppError, AppResult, CoordinateError, ErrorKind, ImageError};
use crate::submission::SubmissionState;
use crate::MAX_IMAGE_BYTES;

// --- Record identifier ---

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Identifiers are opaque; only blank ones are rejected.
    pub fn parse(id: impl Into<String>) -> AppResult<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(AppError::new(ErrorKind::Validation, "record id cannot be empty"));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// --- Enum codes with a pass-through fallback ---

macro_rules! code_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => ($code:literal, $label:literal)),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant,)+
            /// A code this build does not know about; kept verbatim so it round-trips.
            Other(String),
        }

        impl $name {
            pub const OPTIONS: &'static [(&'static str, &'static str)] = &[$(($code, $label)),+];

            pub fn from_code(code: &str) -> Self {
                match code {
                    $($code => Self::$variant,)+
                    other => Self::Other(other.to_string()),
                }
            }

            pub fn as_str(&self) -> &str {
                match self {
                    $(Self::$variant => $code,)+
                    Self::Other(code) => code,
                }
            }

            pub fn label(&self) -> &str {
                match self {
                    $(Self::$variant => $label,)+
                    Self::Other(code) => code,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let code = String::deserialize(deserializer)?;
                Ok(Self::from_code(&code))
            }
        }
    };
}

code_enum!(Gender {
    Male => ("male", "Erkek"),
    Female => ("female", "Dişi"),
});

code_enum!(Color {
    Black => ("black", "Siyah"),
    White => ("white", "Beyaz"),
    Brown => ("brown", "Kahverengi"),
    Gray => ("gray", "Gri"),
    Yellow => ("yellow", "Sarı"),
    Orange => ("orange", "Turuncu"),
    Mixed => ("mixed", "Karışık"),
});

code_enum!(HealthStatus {
    Healthy => ("healthy", "Sağlıklı"),
    Sick => ("sick", "Hasta"),
    Injured => ("injured", "Yaralı"),
    UnderTreatment => ("under_treatment", "Tedavide"),
});

// --- Coordinates: both-or-neither by construction ---

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(CoordinateError::NonFinite);
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(CoordinateError::LatitudeOutOfRange(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(CoordinateError::LongitudeOutOfRange(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Ordered pair as produced by the location editor: `[latitude, longitude]`.
    pub fn from_pair([latitude, longitude]: [f64; 2]) -> Result<Self, CoordinateError> {
        Self::new(latitude, longitude)
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl PartialEq for Coordinates {
    fn eq(&self, other: &Self) -> bool {
        self.latitude.to_bits() == other.latitude.to_bits()
            && self.longitude.to_bits() == other.longitude.to_bits()
    }
}

#[derive(Deserialize)]
struct PartialLocation {
    latitude: Option<f64>,
    longitude: Option<f64>,
}

// A stored location with a missing half is treated as no location at all.
fn deserialize_location<'de, D>(deserializer: D) -> Result<Option<Coordinates>, D::Error>
where
    D: Deserializer<'de>,
{
    let partial = Option::<PartialLocation>::deserialize(deserializer)?;
    Ok(partial.and_then(|p| match (p.latitude, p.longitude) {
        (Some(latitude), Some(longitude)) => Some(Coordinates {
            latitude,
            longitude,
        }),
        _ => None,
    }))
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

// --- Image references ---

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalImage {
    pub file_name: String,
    pub content_type: String,
    #[serde(with = "serde_bytes")]
    pub bytes: Vec<u8>,
}

impl LocalImage {
    /// Wraps a freshly selected file, sniffing its MIME type from the content.
    pub fn from_bytes(file_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, ImageError> {
        let content_type = image::guess_format(&bytes)
            .map(|format| format.to_mime_type().to_string())
            .unwrap_or_else(|_| "application/octet-stream".to_string());

        let local = Self {
            file_name: file_name.into(),
            content_type,
            bytes,
        };
        local.validate()?;
        Ok(local)
    }

    pub fn validate(&self) -> Result<(), ImageError> {
        if self.bytes.is_empty() {
            return Err(ImageError::Empty);
        }
        if self.bytes.len() > MAX_IMAGE_BYTES {
            return Err(ImageError::TooLarge {
                size: self.bytes.len(),
                max: MAX_IMAGE_BYTES,
            });
        }
        Ok(())
    }
}

// Image bytes stay out of logs.
impl fmt::Debug for LocalImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalImage")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("size_bytes", &self.bytes.len())
            .finish()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImageRef {
    /// Asset already held by the record store, addressed by its stored path.
    Stored { path: String },
    /// File picked in the image editor, not uploaded yet.
    Local(LocalImage),
}

impl ImageRef {
    pub fn stored(path: impl Into<String>) -> Self {
        Self::Stored { path: path.into() }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            ImageRef::Stored { path } => path.trim().is_empty(),
            ImageRef::Local(local) => local.bytes.is_empty(),
        }
    }
}

// --- Record (baseline snapshot) ---

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    #[serde(alias = "_id")]
    pub id: RecordId,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub species: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub color: Option<Color>,
    #[serde(default)]
    pub health_status: Option<HealthStatus>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub image: String,
    #[serde(default, deserialize_with = "deserialize_location")]
    pub location: Option<Coordinates>,
}

// --- Form fields ---

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FormFields {
    pub species: String,
    pub description: String,
    pub gender: Option<Gender>,
    pub color: Option<Color>,
    pub health_status: Option<HealthStatus>,
}

impl FormFields {
    pub fn from_record(record: &Record) -> Self {
        Self {
            species: record.species.clone(),
            description: record.description.clone(),
            gender: record.gender.clone(),
            color: record.color.clone(),
            health_status: record.health_status.clone(),
        }
    }

    pub fn apply(&mut self, edit: FieldEdit) {
        match edit {
            FieldEdit::Species(value) => self.species = value,
            FieldEdit::Description(value) => self.description = value,
            FieldEdit::Gender(value) => self.gender = value,
            FieldEdit::Color(value) => self.color = value,
            FieldEdit::HealthStatus(value) => self.health_status = value,
        }
    }

    /// Raw field values in wire order; unselected dropdowns are sent as `""`.
    pub fn wire_values(&self) -> [(&'static str, String); 5] {
        fn code<T: fmt::Display>(value: Option<&T>) -> String {
            value.map(ToString::to_string).unwrap_or_default()
        }

        [
            ("species", self.species.clone()),
            ("description", self.description.clone()),
            ("gender", code(self.gender.as_ref())),
            ("color", code(self.color.as_ref())),
            ("healthStatus", code(self.health_status.as_ref())),
        ]
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldEdit {
    Species(String),
    Description(String),
    Gender(Option<Gender>),
    Color(Option<Color>),
    HealthStatus(Option<HealthStatus>),
}

// --- Toasts ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ToastKind {
    #[default]
    Info,
    Success,
    Error,
}

impl ToastKind {
    #[must_use]
    pub const fn default_duration_ms(self) -> u64 {
        match self {
            Self::Info => 3000,
            Self::Success => 2000,
            Self::Error => 5000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToastMessage {
    pub message: String,
    pub kind: ToastKind,
    pub duration_ms: u64,
}

impl ToastMessage {
    #[must_use]
    pub fn new(message: impl Into<String>, kind: ToastKind) -> Self {
        Self {
            message: message.into(),
            kind,
            duration_ms: kind.default_duration_ms(),
        }
    }
}

// --- Page state ---

/// Baseline fetch status. Exactly one of the three holds at any time.
#[derive(Clone, Debug, PartialEq)]
pub enum LoadState {
    Loading,
    Failed(AppError),
    Loaded(Record),
}

impl LoadState {
    pub fn record(&self) -> Option<&Record> {
        match self {
            LoadState::Loaded(record) => Some(record),
            _ => None,
        }
    }
}

/// One mounted edit page. Every async callback is tagged with `generation`
/// so results addressed to an earlier page are dropped.
#[derive(Clone, Debug, PartialEq)]
pub struct EditPage {
    pub record_id: RecordId,
    pub generation: u64,
    pub load: LoadState,
    pub fetch_in_flight: bool,
    pub form: Option<FormFields>,
    pub draft: DraftState,
    pub submission: SubmissionState,
}

impl EditPage {
    pub fn new(record_id: RecordId, generation: u64) -> Self {
        Self {
            record_id,
            generation,
            load: LoadState::Loading,
            fetch_in_flight: false,
            form: None,
            draft: DraftState::default(),
            submission: SubmissionState::Idle,
        }
    }

    pub fn is_editable(&self) -> bool {
        self.form.is_some() && self.draft.is_seeded()
    }

    /// Records the baseline and seeds the draft and form the first time only.
    pub fn accept_baseline(&mut self, record: Record, config: &EditorConfig) -> bool {
        let seeded = self.draft.initialize(&record, config);
        if seeded {
            self.form = Some(FormFields::from_record(&record));
        }
        self.load = LoadState::Loaded(record);
        seeded
    }
}

#[derive(Debug, Default)]
pub struct Model {
    pub config: EditorConfig,
    pub page: Option<EditPage>,
    pub toast: Option<ToastMessage>,
    pub(crate) next_generation: u64,
}

impl Model {
    pub fn show_toast(&mut self, message: impl Into<String>, kind: ToastKind) {
        self.toast = Some(ToastMessage::new(message, kind));
    }

    pub fn clear_toast(&mut self) {
        self.toast = None;
    }

    pub(crate) fn allocate_generation(&mut self) -> u64 {
        self.next_generation += 1;
        self.next_generation
    }

    /// The mounted page, if `generation` still addresses it.
    pub(crate) fn page_for(&mut self, generation: u64) -> Option<&mut EditPage> {
        self.page.as_mut().filter(|page| page.generation == generation)
    }
}
