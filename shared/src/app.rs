use tracing::{debug, info, warn};

use crate::capabilities::{
    CacheOutput, Capabilities, HttpResult, ImageEditOutcome, LocationEditOutcome, QueryKey,
};
use crate::config::EditorConfig;
use crate::draft::DraftError;
use crate::error::AppError;
use crate::event::Event;
use crate::model::{EditPage, LoadState, Model, Record, RecordId, ToastKind};
use crate::record_store;
use crate::submission::{
    SubmissionPayload, SubmissionState, UPDATE_FAILURE_MESSAGE, UPDATE_SUCCESS_MESSAGE,
};
use crate::view::ViewModel;

#[derive(Default)]
pub struct App;

impl App {
    fn open_page(id: String, model: &mut Model, caps: &Capabilities) {
        let record_id = match RecordId::parse(id) {
            Ok(record_id) => record_id,
            Err(e) => {
                warn!(error = %e, "edit page opened without a usable record id");
                model.page = None;
                model.show_toast(e.user_facing_message(), ToastKind::Error);
                return;
            }
        };

        let generation = model.allocate_generation();
        info!(record_id = %record_id, generation, "opening edit page");

        caps.cache.get(QueryKey::animal(&record_id), move |output| {
            Event::CacheLookedUp {
                generation,
                output: Box::new(output),
            }
        });
        model.page = Some(EditPage::new(record_id, generation));
    }

    /// Issues `GET /animals/{id}` for the page unless one is already in flight.
    fn fetch_record(page: &mut EditPage, config: &EditorConfig, caps: &Capabilities) {
        if page.fetch_in_flight {
            debug!(record_id = %page.record_id, "fetch already in flight");
            return;
        }

        let generation = page.generation;
        let sent = record_store::send_fetch(&caps.http, config, &page.record_id, move |result| {
            Event::RecordFetched {
                generation,
                result: Box::new(result),
            }
        });

        match sent {
            Ok(()) => page.fetch_in_flight = true,
            Err(e) => {
                warn!(record_id = %page.record_id, error = %e, "could not build fetch request");
                if page.load.record().is_none() {
                    page.load = LoadState::Failed(e.into());
                }
            }
        }
    }

    fn accept_record(page: &mut EditPage, record: Record, config: &EditorConfig) {
        if page.accept_baseline(record, config) {
            info!(record_id = %page.record_id, "baseline loaded, draft seeded");
        } else {
            debug!(record_id = %page.record_id, "baseline refreshed, draft kept");
        }
    }

    fn cache_looked_up(generation: u64, output: CacheOutput, model: &mut Model, caps: &Capabilities) {
        let config = model.config.clone();
        let Some(page) = model.page_for(generation) else {
            debug!(generation, "dropping cache lookup for a closed page");
            return;
        };

        match output {
            CacheOutput::Hit(value) => match serde_json::from_value::<Record>(value) {
                Ok(record) => {
                    debug!(record_id = %page.record_id, "baseline served from cache");
                    Self::accept_record(page, record, &config);
                }
                Err(e) => {
                    warn!(record_id = %page.record_id, error = %e, "cached record unreadable, fetching");
                    Self::fetch_record(page, &config, caps);
                }
            },
            CacheOutput::Miss | CacheOutput::Ack => Self::fetch_record(page, &config, caps),
        }
        caps.render.render();
    }

    fn record_fetched(
        generation: u64,
        result: HttpResult,
        model: &mut Model,
        caps: &Capabilities,
    ) {
        let config = model.config.clone();
        let Some(page) = model.page_for(generation) else {
            debug!(generation, "dropping fetch response for a closed page");
            return;
        };
        page.fetch_in_flight = false;

        match record_store::parse_record(&page.record_id, result) {
            Ok(record) => {
                if let Err(e) = caps.cache.set(QueryKey::animal(&page.record_id), &record) {
                    warn!(error = %e, "could not write record to cache");
                }
                Self::accept_record(page, record, &config);
            }
            Err(e) if page.load.record().is_some() => {
                warn!(record_id = %page.record_id, error = %e, "refetch failed, keeping baseline");
            }
            Err(e) => {
                warn!(record_id = %page.record_id, error = %e, "baseline load failed");
                page.load = LoadState::Failed(e);
            }
        }
        caps.render.render();
    }

    fn cache_invalidated(key: &QueryKey, model: &mut Model, caps: &Capabilities) {
        let config = model.config.clone();
        let Some(page) = model.page.as_mut() else {
            return;
        };
        if *key != QueryKey::animal(&page.record_id) {
            return;
        }
        if matches!(page.load, LoadState::Loading) {
            debug!(record_id = %page.record_id, "initial load still running, ignoring invalidation");
            return;
        }

        debug!(record_id = %page.record_id, "record invalidated, refetching");
        Self::fetch_record(page, &config, caps);
        caps.render.render();
    }

    fn open_image_editor(model: &mut Model, caps: &Capabilities) {
        let Some(page) = model.page.as_mut() else {
            return;
        };
        if page.submission.is_pending() {
            debug!("submission pending, image editor not opened");
            return;
        }

        match page.draft.open_image_editor() {
            Ok(()) => {
                let generation = page.generation;
                caps.image_editor.edit(
                    page.draft.pending_image().cloned(),
                    page.draft.preview_image().map(str::to_string),
                    move |outcome| Event::ImageEditorClosed {
                        generation,
                        outcome: Box::new(outcome),
                    },
                );
                caps.render.render();
            }
            Err(e) => debug!(error = %e, "image editor not opened"),
        }
    }

    fn open_location_editor(model: &mut Model, caps: &Capabilities) {
        let Some(page) = model.page.as_mut() else {
            return;
        };
        if page.submission.is_pending() {
            debug!("submission pending, location editor not opened");
            return;
        }

        match page.draft.open_location_editor() {
            Ok(()) => {
                let generation = page.generation;
                caps.location_editor.edit(page.draft.pending_location(), move |outcome| {
                    Event::LocationEditorClosed {
                        generation,
                        outcome,
                    }
                });
                caps.render.render();
            }
            Err(e) => debug!(error = %e, "location editor not opened"),
        }
    }

    fn image_editor_closed(
        generation: u64,
        outcome: ImageEditOutcome,
        model: &mut Model,
        caps: &Capabilities,
    ) {
        let Some(page) = model.page_for(generation) else {
            debug!(generation, "dropping image editor result for a closed page");
            return;
        };

        let result = match outcome {
            ImageEditOutcome::Saved { image, preview } => {
                page.draft.apply_image_edit(image, Some(preview))
            }
            ImageEditOutcome::Cancelled => {
                page.draft.cancel_image_edit();
                Ok(())
            }
        };

        Self::report_draft_result(result, model);
        caps.render.render();
    }

    fn location_editor_closed(
        generation: u64,
        outcome: LocationEditOutcome,
        model: &mut Model,
        caps: &Capabilities,
    ) {
        let Some(page) = model.page_for(generation) else {
            debug!(generation, "dropping location editor result for a closed page");
            return;
        };

        let result = match outcome {
            LocationEditOutcome::Saved { position } => page.draft.apply_location_edit(position),
            LocationEditOutcome::Cancelled => {
                page.draft.cancel_location_edit();
                Ok(())
            }
        };

        Self::report_draft_result(result, model);
        caps.render.render();
    }

    fn report_draft_result(result: Result<(), DraftError>, model: &mut Model) {
        match result {
            Ok(()) => {}
            Err(e @ (DraftError::InvalidImage(_) | DraftError::InvalidLocation(_))) => {
                warn!(error = %e, "sub-editor result rejected");
                model.show_toast(AppError::from(e).user_facing_message(), ToastKind::Error);
            }
            Err(e) => debug!(error = %e, "sub-editor result ignored"),
        }
    }

    fn submit(model: &mut Model, caps: &Capabilities) {
        let Some(page) = model.page.as_mut() else {
            return;
        };
        if page.submission.is_pending() {
            debug!(record_id = %page.record_id, "submission already pending");
            return;
        }
        let Some(form) = page.form.as_ref().filter(|_| page.draft.is_seeded()) else {
            debug!(record_id = %page.record_id, "nothing to submit before the baseline loads");
            return;
        };

        let generation = page.generation;
        let sent = SubmissionPayload::build(form, &page.draft).and_then(|payload| {
            record_store::send_update(
                &caps.http,
                &model.config,
                &page.record_id,
                &payload,
                move |result| Event::SubmitCompleted {
                    generation,
                    result: Box::new(result),
                },
            )
            .map_err(AppError::from)
        });

        match sent {
            Ok(()) => {
                info!(record_id = %page.record_id, "submitting update");
                page.submission = SubmissionState::Pending;
            }
            Err(e) => {
                warn!(record_id = %page.record_id, error = %e, "could not build update request");
                page.submission = SubmissionState::Failed(e);
                model.show_toast(UPDATE_FAILURE_MESSAGE, ToastKind::Error);
            }
        }
        caps.render.render();
    }

    fn submit_completed(
        generation: u64,
        result: HttpResult,
        model: &mut Model,
        caps: &Capabilities,
    ) {
        let Some(page) = model.page_for(generation) else {
            debug!(generation, "dropping update response for a closed page");
            return;
        };

        match record_store::check_update(result) {
            Ok(()) => {
                let record_id = page.record_id.clone();
                info!(record_id = %record_id, "update accepted");

                caps.cache.invalidate(QueryKey::animals());
                caps.cache.invalidate(QueryKey::animal(&record_id));
                model.page = None;
                model.show_toast(UPDATE_SUCCESS_MESSAGE, ToastKind::Success);
                caps.navigator.navigate_to(model.config.list_route.clone());
            }
            Err(e) => {
                warn!(record_id = %page.record_id, error = %e, retryable = e.is_retryable(), "update rejected");
                page.submission = SubmissionState::Failed(e);
                model.show_toast(UPDATE_FAILURE_MESSAGE, ToastKind::Error);
            }
        }
        caps.render.render();
    }
}

impl crux_core::App for App {
    type Event = Event;
    type Model = Model;
    type ViewModel = ViewModel;
    type Capabilities = Capabilities;

    fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
        let event_name = event.name();
        if event.is_user_initiated() {
            info!(event = event_name, "user action");
        } else {
            debug!(event = event_name, "handling event");
        }

        match event {
            Event::Noop => {}

            Event::Configure(config) => {
                match config.validate() {
                    Ok(()) => model.config = *config,
                    Err(e) => warn!(error = %e, "rejected configuration, keeping previous"),
                }
                caps.render.render();
            }

            Event::PageOpened { id } => {
                Self::open_page(id, model, caps);
                caps.render.render();
            }

            Event::PageClosed => {
                if let Some(page) = model.page.take() {
                    info!(record_id = %page.record_id, "edit page closed");
                }
                caps.render.render();
            }

            Event::CacheInvalidated { key } => Self::cache_invalidated(&key, model, caps),

            Event::FieldEdited(edit) => {
                let Some(form) = model.page.as_mut().and_then(|p| p.form.as_mut()) else {
                    debug!("field edit before the form exists");
                    return;
                };
                form.apply(edit);
                caps.render.render();
            }

            Event::ImageEditorRequested => Self::open_image_editor(model, caps),
            Event::LocationEditorRequested => Self::open_location_editor(model, caps),
            Event::SubmitRequested => Self::submit(model, caps),

            Event::DismissToast => {
                model.clear_toast();
                caps.render.render();
            }

            Event::CacheLookedUp { generation, output } => {
                Self::cache_looked_up(generation, *output, model, caps);
            }
            Event::RecordFetched { generation, result } => {
                Self::record_fetched(generation, *result, model, caps);
            }
            Event::ImageEditorClosed {
                generation,
                outcome,
            } => Self::image_editor_closed(generation, *outcome, model, caps),
            Event::LocationEditorClosed {
                generation,
                outcome,
            } => Self::location_editor_closed(generation, outcome, model, caps),
            Event::SubmitCompleted { generation, result } => {
                Self::submit_completed(generation, *result, model, caps);
            }
        }
    }

    fn view(&self, model: &Model) -> ViewModel {
        ViewModel::from_model(model)
    }
}
