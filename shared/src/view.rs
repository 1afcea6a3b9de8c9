use serde::{Deserialize, Serialize};

use crate::config::EditorConfig;
use crate::model::{
    Color, Coordinates, EditPage, FormFields, Gender, HealthStatus, ImageRef, LoadState, Model,
    ToastMessage,
};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct ViewModel {
    pub page: PageView,
    pub toast: Option<ToastMessage>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub enum PageView {
    /// No record is open.
    #[default]
    Idle,
    Loading,
    Error {
        message: String,
    },
    Editing(Box<EditView>),
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct EditView {
    pub record_id: String,
    pub species: String,
    pub description: String,
    pub gender: SelectView,
    pub color: SelectView,
    pub health_status: SelectView,
    /// What the image slot shows: the editor preview, else the stored asset.
    pub image_url: Option<String>,
    pub location: Option<LocationView>,
    pub image_editor_open: bool,
    pub location_editor_open: bool,
    pub can_open_image_editor: bool,
    pub can_open_location_editor: bool,
    pub is_submitting: bool,
    pub can_submit: bool,
    pub is_refreshing: bool,
    pub submit_error: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SelectView {
    pub value: String,
    pub options: Vec<SelectOption>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct LocationView {
    pub latitude: f64,
    pub longitude: f64,
    pub label: String,
}

impl From<Coordinates> for LocationView {
    fn from(c: Coordinates) -> Self {
        Self {
            latitude: c.latitude(),
            longitude: c.longitude(),
            label: format!("{:.6}, {:.6}", c.latitude(), c.longitude()),
        }
    }
}

impl SelectView {
    /// Known options in declaration order; a current value outside them is
    /// appended so the selection stays visible.
    fn new(options: &[(&str, &str)], current: Option<(&str, &str)>) -> Self {
        let value = current.map(|(code, _)| code.to_string()).unwrap_or_default();

        let mut rendered: Vec<SelectOption> = options
            .iter()
            .map(|(code, label)| SelectOption {
                value: (*code).to_string(),
                label: (*label).to_string(),
                selected: *code == value,
            })
            .collect();

        if let Some((code, label)) = current {
            if !options.iter().any(|(known, _)| *known == code) {
                rendered.push(SelectOption {
                    value: code.to_string(),
                    label: label.to_string(),
                    selected: true,
                });
            }
        }

        Self {
            value,
            options: rendered,
        }
    }
}

impl ViewModel {
    pub fn from_model(model: &Model) -> Self {
        Self {
            page: model
                .page
                .as_ref()
                .map_or(PageView::Idle, |page| PageView::from_page(page, &model.config)),
            toast: model.toast.clone(),
        }
    }
}

impl PageView {
    fn from_page(page: &EditPage, config: &EditorConfig) -> Self {
        match (&page.form, &page.load) {
            (Some(form), _) if page.draft.is_seeded() => {
                PageView::Editing(Box::new(EditView::build(page, form, config)))
            }
            (_, LoadState::Failed(error)) => PageView::Error {
                message: error.user_facing_message(),
            },
            _ => PageView::Loading,
        }
    }
}

impl EditView {
    fn build(page: &EditPage, form: &FormFields, config: &EditorConfig) -> Self {
        let draft = &page.draft;
        let submitting = page.submission.is_pending();
        let can_open = !submitting && !draft.any_editor_open();

        let image_url = draft.preview_image().map(str::to_string).or_else(|| {
            match draft.pending_image() {
                Some(ImageRef::Stored { path }) => config.asset_url(path),
                _ => None,
            }
        });

        Self {
            record_id: page.record_id.to_string(),
            species: form.species.clone(),
            description: form.description.clone(),
            gender: SelectView::new(
                Gender::OPTIONS,
                form.gender.as_ref().map(|g| (g.as_str(), g.label())),
            ),
            color: SelectView::new(
                Color::OPTIONS,
                form.color.as_ref().map(|c| (c.as_str(), c.label())),
            ),
            health_status: SelectView::new(
                HealthStatus::OPTIONS,
                form.health_status.as_ref().map(|h| (h.as_str(), h.label())),
            ),
            image_url,
            location: draft.pending_location().map(LocationView::from),
            image_editor_open: draft.is_image_editor_open(),
            location_editor_open: draft.is_location_editor_open(),
            can_open_image_editor: can_open,
            can_open_location_editor: can_open,
            is_submitting: submitting,
            can_submit: !submitting,
            is_refreshing: page.fetch_in_flight,
            submit_error: page.submission.error().map(|e| e.user_facing_message()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, ErrorKind};
    use crate::model::{Record, RecordId};
    use crate::submission::SubmissionState;

    fn loaded_page(record: Record) -> EditPage {
        let mut page = EditPage::new(record.id.clone(), 1);
        page.accept_baseline(record, &EditorConfig::default());
        page
    }

    fn record() -> Record {
        Record {
            id: RecordId::parse("9").unwrap(),
            species: "Köpek".into(),
            description: "Sakin".into(),
            gender: Some(Gender::Male),
            color: Some(Color::Other("tabby".into())),
            health_status: None,
            image: "uploads/9.jpg".into(),
            location: Some(Coordinates::new(0.0, 0.0).unwrap()),
        }
    }

    fn editing(view: ViewModel) -> EditView {
        match view.page {
            PageView::Editing(edit) => *edit,
            other => panic!("expected editing view, got {other:?}"),
        }
    }

    #[test]
    fn no_page_is_idle() {
        assert_eq!(ViewModel::from_model(&Model::default()).page, PageView::Idle);
    }

    #[test]
    fn loading_then_error() {
        let mut model = Model::default();
        let mut page = EditPage::new(RecordId::parse("1").unwrap(), 1);
        model.page = Some(page.clone());
        assert_eq!(ViewModel::from_model(&model).page, PageView::Loading);

        page.load = LoadState::Failed(AppError::new(ErrorKind::NotFound, "gone"));
        model.page = Some(page);
        assert_eq!(
            ViewModel::from_model(&model).page,
            PageView::Error {
                message: "The requested animal could not be found.".into()
            }
        );
    }

    #[test]
    fn editing_view_reflects_draft() {
        let model = Model {
            page: Some(loaded_page(record())),
            ..Model::default()
        };
        let view = editing(ViewModel::from_model(&model));

        assert_eq!(view.species, "Köpek");
        assert_eq!(view.gender.value, "male");
        assert!(view.gender.options.iter().any(|o| o.label == "Erkek" && o.selected));
        assert_eq!(
            view.image_url.as_deref(),
            Some("http://localhost:3000/uploads/9.jpg")
        );
        let location = view.location.unwrap();
        assert_eq!(location.label, "0.000000, 0.000000");
        assert!(view.can_submit);
        assert!(view.can_open_image_editor);
    }

    #[test]
    fn unknown_code_stays_selected() {
        let model = Model {
            page: Some(loaded_page(record())),
            ..Model::default()
        };
        let view = editing(ViewModel::from_model(&model));

        assert_eq!(view.color.options.len(), Color::OPTIONS.len() + 1);
        let last = view.color.options.last().unwrap();
        assert_eq!(last.value, "tabby");
        assert!(last.selected);
        assert_eq!(view.health_status.value, "");
        assert!(view.health_status.options.iter().all(|o| !o.selected));
    }

    #[test]
    fn pending_submission_disables_actions() {
        let mut page = loaded_page(record());
        page.submission = SubmissionState::Pending;
        let model = Model {
            page: Some(page),
            ..Model::default()
        };
        let view = editing(ViewModel::from_model(&model));

        assert!(view.is_submitting);
        assert!(!view.can_submit);
        assert!(!view.can_open_location_editor);
    }

    #[test]
    fn open_editor_blocks_the_other() {
        let mut page = loaded_page(record());
        page.draft.open_location_editor().unwrap();
        let model = Model {
            page: Some(page),
            ..Model::default()
        };
        let view = editing(ViewModel::from_model(&model));

        assert!(view.location_editor_open);
        assert!(!view.can_open_image_editor);
    }
}
