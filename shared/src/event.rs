use serde::{Deserialize, Serialize};

use crate::capabilities::{CacheOutput, HttpResult, ImageEditOutcome, LocationEditOutcome, QueryKey};
use crate::config::EditorConfig;
use crate::model::FieldEdit;

// --- Event enum: large variants boxed, capability responses never cross the bridge ---

#[derive(Serialize, Deserialize, Clone, Debug)]
pub enum Event {
    Noop,

    // Lifecycle
    Configure(Box<EditorConfig>),
    PageOpened {
        id: String,
    },
    PageClosed,
    /// The shell saw `key` invalidated in its query cache.
    CacheInvalidated {
        key: QueryKey,
    },

    // Form
    FieldEdited(FieldEdit),
    ImageEditorRequested,
    LocationEditorRequested,
    SubmitRequested,
    DismissToast,

    // Capability responses
    #[serde(skip)]
    CacheLookedUp {
        generation: u64,
        output: Box<CacheOutput>,
    },
    #[serde(skip)]
    RecordFetched {
        generation: u64,
        result: Box<HttpResult>,
    },
    #[serde(skip)]
    ImageEditorClosed {
        generation: u64,
        outcome: Box<ImageEditOutcome>,
    },
    #[serde(skip)]
    LocationEditorClosed {
        generation: u64,
        outcome: LocationEditOutcome,
    },
    #[serde(skip)]
    SubmitCompleted {
        generation: u64,
        result: Box<HttpResult>,
    },
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::Noop => "noop",
            Event::Configure(_) => "configure",
            Event::PageOpened { .. } => "page_opened",
            Event::PageClosed => "page_closed",
            Event::CacheInvalidated { .. } => "cache_invalidated",
            Event::FieldEdited(_) => "field_edited",
            Event::ImageEditorRequested => "image_editor_requested",
            Event::LocationEditorRequested => "location_editor_requested",
            Event::SubmitRequested => "submit_requested",
            Event::DismissToast => "dismiss_toast",
            Event::CacheLookedUp { .. } => "cache_looked_up",
            Event::RecordFetched { .. } => "record_fetched",
            Event::ImageEditorClosed { .. } => "image_editor_closed",
            Event::LocationEditorClosed { .. } => "location_editor_closed",
            Event::SubmitCompleted { .. } => "submit_completed",
        }
    }

    pub fn is_user_initiated(&self) -> bool {
        matches!(
            self,
            Event::FieldEdited(_)
                | Event::ImageEditorRequested
                | Event::LocationEditorRequested
                | Event::SubmitRequested
                | Event::DismissToast
        )
    }
}
