//! Local edit overlay on top of the fetched baseline.
//!
//! The draft is seeded exactly once from the first baseline that loads and is
//! afterwards changed only by composing sub-editor results into it.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::config::EditorConfig;
use crate::error::{AppError, CoordinateError, ErrorKind, ImageError};
use crate::model::{Coordinates, ImageRef, Record};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubEditor {
    Image,
    Location,
}

impl fmt::Display for SubEditor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubEditor::Image => f.write_str("image"),
            SubEditor::Location => f.write_str("location"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DraftError {
    #[error("draft has not been seeded from a baseline yet")]
    NotSeeded,
    #[error("the {0} editor is already open")]
    EditorAlreadyOpen(SubEditor),
    #[error("the {0} editor is not open")]
    EditorNotOpen(SubEditor),
    #[error("rejected image: {0}")]
    InvalidImage(#[from] ImageError),
    #[error("rejected location: {0}")]
    InvalidLocation(#[from] CoordinateError),
}

impl From<DraftError> for AppError {
    fn from(e: DraftError) -> Self {
        match e {
            DraftError::InvalidImage(inner) => inner.into(),
            DraftError::InvalidLocation(inner) => inner.into(),
            other => AppError::new(ErrorKind::InvalidState, other.to_string()),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DraftState {
    seeded: bool,
    pending_image: Option<ImageRef>,
    preview_image: Option<String>,
    pending_location: Option<Coordinates>,
    image_editor_open: bool,
    location_editor_open: bool,
}

impl DraftState {
    /// Seeds the overlay from `baseline`. Returns `false` and changes nothing
    /// if the draft was already seeded.
    pub fn initialize(&mut self, baseline: &Record, config: &EditorConfig) -> bool {
        if self.seeded {
            return false;
        }

        if !baseline.image.trim().is_empty() {
            self.pending_image = Some(ImageRef::stored(baseline.image.clone()));
            self.preview_image = config.asset_url(&baseline.image);
        }
        self.pending_location = baseline.location;
        self.seeded = true;
        true
    }

    pub fn open_image_editor(&mut self) -> Result<(), DraftError> {
        self.ensure_can_open()?;
        self.image_editor_open = true;
        Ok(())
    }

    pub fn open_location_editor(&mut self) -> Result<(), DraftError> {
        self.ensure_can_open()?;
        self.location_editor_open = true;
        Ok(())
    }

    /// Composes a saved image-editor result into the draft. The editor is
    /// closed even when the result is rejected.
    pub fn apply_image_edit(
        &mut self,
        image: ImageRef,
        preview: Option<String>,
    ) -> Result<(), DraftError> {
        if !self.image_editor_open {
            return Err(DraftError::EditorNotOpen(SubEditor::Image));
        }
        self.image_editor_open = false;

        if let ImageRef::Local(local) = &image {
            local.validate()?;
        }

        self.pending_image = Some(image);
        self.preview_image = preview.filter(|p| !p.trim().is_empty());
        Ok(())
    }

    /// Composes a saved location-editor result, an ordered
    /// `[latitude, longitude]` pair, into the draft.
    pub fn apply_location_edit(&mut self, position: [f64; 2]) -> Result<(), DraftError> {
        if !self.location_editor_open {
            return Err(DraftError::EditorNotOpen(SubEditor::Location));
        }
        self.location_editor_open = false;

        self.pending_location = Some(Coordinates::from_pair(position)?);
        Ok(())
    }

    pub fn cancel_image_edit(&mut self) {
        self.image_editor_open = false;
    }

    pub fn cancel_location_edit(&mut self) {
        self.location_editor_open = false;
    }

    pub fn is_seeded(&self) -> bool {
        self.seeded
    }

    pub fn pending_image(&self) -> Option<&ImageRef> {
        self.pending_image.as_ref()
    }

    pub fn preview_image(&self) -> Option<&str> {
        self.preview_image.as_deref()
    }

    pub fn pending_location(&self) -> Option<Coordinates> {
        self.pending_location
    }

    pub fn is_image_editor_open(&self) -> bool {
        self.image_editor_open
    }

    pub fn is_location_editor_open(&self) -> bool {
        self.location_editor_open
    }

    pub fn any_editor_open(&self) -> bool {
        self.image_editor_open || self.location_editor_open
    }

    fn ensure_can_open(&self) -> Result<(), DraftError> {
        if !self.seeded {
            return Err(DraftError::NotSeeded);
        }
        if self.image_editor_open {
            return Err(DraftError::EditorAlreadyOpen(SubEditor::Image));
        }
        if self.location_editor_open {
            return Err(DraftError::EditorAlreadyOpen(SubEditor::Location));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LocalImage, RecordId};
    use proptest::prelude::*;

    fn baseline(image: &str, location: Option<Coordinates>) -> Record {
        Record {
            id: RecordId::parse("42").unwrap(),
            species: "Kedi".into(),
            description: "Parkta bulundu".into(),
            gender: None,
            color: None,
            health_status: None,
            image: image.into(),
            location,
        }
    }

    fn seeded(image: &str, location: Option<Coordinates>) -> DraftState {
        let mut draft = DraftState::default();
        assert!(draft.initialize(&baseline(image, location), &EditorConfig::default()));
        draft
    }

    fn local_image() -> ImageRef {
        ImageRef::Local(LocalImage::from_bytes("new.jpg", vec![0xFF, 0xD8, 0xFF, 0xE0]).unwrap())
    }

    proptest! {
        #[test]
        fn seeding_copies_baseline_location_exactly(
            lat in -90.0f64..=90.0,
            lon in -180.0f64..=180.0,
        ) {
            let location = Coordinates::new(lat, lon).unwrap();
            let draft = seeded("uploads/a.jpg", Some(location));
            prop_assert_eq!(draft.pending_location(), Some(location));
        }

        #[test]
        fn seeding_copies_baseline_image(path in "[a-z]{1,12}/[a-z0-9]{1,12}\\.jpg") {
            let draft = seeded(&path, None);
            prop_assert_eq!(draft.pending_image(), Some(&ImageRef::stored(path.clone())));
            let expected = format!("http://localhost:3000/{path}");
            prop_assert_eq!(draft.preview_image(), Some(expected.as_str()));
        }
    }

    #[test]
    fn baseline_without_location_or_image_leaves_draft_empty() {
        let draft = seeded("", None);
        assert!(draft.is_seeded());
        assert_eq!(draft.pending_location(), None);
        assert_eq!(draft.pending_image(), None);
        assert_eq!(draft.preview_image(), None);
    }

    #[test]
    fn second_baseline_does_not_reseed() {
        let mut draft = seeded("uploads/old.jpg", None);
        draft.open_image_editor().unwrap();
        draft
            .apply_image_edit(local_image(), Some("blob:preview".into()))
            .unwrap();
        let before = draft.clone();

        let refetched = baseline(
            "uploads/server-side.jpg",
            Some(Coordinates::new(1.0, 2.0).unwrap()),
        );
        assert!(!draft.initialize(&refetched, &EditorConfig::default()));
        assert_eq!(draft, before);
    }

    #[test]
    fn editors_cannot_open_before_seeding() {
        let mut draft = DraftState::default();
        assert_eq!(draft.open_image_editor(), Err(DraftError::NotSeeded));
        assert_eq!(draft.open_location_editor(), Err(DraftError::NotSeeded));
    }

    #[test]
    fn at_most_one_editor_is_open() {
        let mut draft = seeded("", None);
        draft.open_location_editor().unwrap();

        assert_eq!(
            draft.open_image_editor(),
            Err(DraftError::EditorAlreadyOpen(SubEditor::Location))
        );
        assert_eq!(
            draft.open_location_editor(),
            Err(DraftError::EditorAlreadyOpen(SubEditor::Location))
        );
        assert!(draft.is_location_editor_open());
        assert!(!draft.is_image_editor_open());
    }

    #[test]
    fn cancelling_image_editor_keeps_pending_image() {
        let mut draft = seeded("uploads/cat.jpg", None);
        let before = draft.pending_image().cloned();

        draft.open_image_editor().unwrap();
        draft.cancel_image_edit();

        assert_eq!(draft.pending_image().cloned(), before);
        assert!(!draft.is_image_editor_open());
    }

    #[test]
    fn applying_image_closes_editor() {
        let mut draft = seeded("", None);
        draft.open_image_editor().unwrap();
        draft
            .apply_image_edit(local_image(), Some("blob:abc".into()))
            .unwrap();

        assert!(!draft.is_image_editor_open());
        assert_eq!(draft.pending_image(), Some(&local_image()));
        assert_eq!(draft.preview_image(), Some("blob:abc"));
    }

    #[test]
    fn rejected_image_closes_editor_without_changes() {
        let mut draft = seeded("uploads/cat.jpg", None);
        draft.open_image_editor().unwrap();

        let empty = ImageRef::Local(LocalImage {
            file_name: "x.jpg".into(),
            content_type: "image/jpeg".into(),
            bytes: Vec::new(),
        });
        assert_eq!(
            draft.apply_image_edit(empty, None),
            Err(DraftError::InvalidImage(ImageError::Empty))
        );
        assert_eq!(draft.pending_image(), Some(&ImageRef::stored("uploads/cat.jpg")));
        assert!(!draft.is_image_editor_open());
    }

    #[test]
    fn applying_location_destructures_pair() {
        let mut draft = seeded("", None);
        draft.open_location_editor().unwrap();
        draft.apply_location_edit([41.0, 29.0]).unwrap();

        let location = draft.pending_location().unwrap();
        assert_eq!(location.latitude(), 41.0);
        assert_eq!(location.longitude(), 29.0);
        assert!(!draft.is_location_editor_open());
    }

    #[test]
    fn zero_coordinates_are_a_real_location() {
        let mut draft = seeded("", None);
        draft.open_location_editor().unwrap();
        draft.apply_location_edit([0.0, 0.0]).unwrap();
        assert_eq!(draft.pending_location(), Some(Coordinates::new(0.0, 0.0).unwrap()));
    }

    #[test]
    fn invalid_location_is_rejected() {
        let previous = Coordinates::new(10.0, 10.0).unwrap();
        let mut draft = seeded("", Some(previous));
        draft.open_location_editor().unwrap();

        assert_eq!(
            draft.apply_location_edit([120.0, 0.0]),
            Err(DraftError::InvalidLocation(CoordinateError::LatitudeOutOfRange(120.0)))
        );
        assert_eq!(draft.pending_location(), Some(previous));
        assert!(!draft.is_location_editor_open());
    }

    #[test]
    fn results_without_an_open_editor_are_refused() {
        let mut draft = seeded("", None);
        assert_eq!(
            draft.apply_location_edit([1.0, 1.0]),
            Err(DraftError::EditorNotOpen(SubEditor::Location))
        );
        assert_eq!(draft.pending_location(), None);
    }
}
