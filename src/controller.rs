/*!
 # Load/save orchestration

 [`ScheduleController`] ties the editor to its collaborators: the schema
 store, the view, the status notifier and the message catalog. None of its
 operations fail towards the caller; storage problems end up as notices and
 the editor stays usable with demo data.
*/

use tracing::{error, info, instrument, warn};

use crate::editor::{ColorModal, Editor};
use crate::grid::ScheduleView;
use crate::notify::{Catalog, NoticeKind, Notify, Translate};
use crate::schedule::{Schedule, SchemaKey};
use crate::slot::{Field, Rgb};
use crate::storage::SchemaStore;
use crate::Result;

/// Id of the status element the editor reports to
pub const STATUS_ELEMENT: &str = "schema-status";

/// Where the schedule shown after a load came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded,
    /// The store was unavailable and demo data is shown
    Demo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    Failed,
}

/// Editor session bound to a store, a view and the status collaborators
pub struct ScheduleController<S, V, N, T = Catalog> {
    editor: Editor,
    store: S,
    view: V,
    notifier: N,
    translator: T,
}

impl<S, V, N, T> ScheduleController<S, V, N, T>
where
    S: SchemaStore,
    V: ScheduleView,
    N: Notify,
    T: Translate,
{
    pub fn new(store: S, view: V, notifier: N, translator: T) -> Self {
        Self {
            editor: Editor::default(),
            store,
            view,
            notifier,
            translator,
        }
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    pub fn schedule(&self) -> &Schedule {
        self.editor.schedule()
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Loads a schema from the store and renders it
    ///
    /// Falls back to [`Schedule::demo`] when the store cannot deliver.
    #[instrument(skip(self), fields(key = %key))]
    pub async fn load(&mut self, key: &SchemaKey) -> LoadOutcome {
        let loading = self.translator.translate("schema.loading", &[]);
        self.view.set_loading(Some(&loading));

        let outcome = match self.store.fetch(key).await {
            Ok(text) => {
                self.editor.replace(Schedule::parse(&text));
                info!("Loaded schema {}", key);
                let message = self.translator.translate("schema.loaded", &[("file", key.as_str())]);
                self.notifier.notify(STATUS_ELEMENT, &message, NoticeKind::Success);
                LoadOutcome::Loaded
            }
            Err(e) => {
                warn!("Loading schema {} failed, using demo data: {}", key, e);
                self.editor.replace(Schedule::demo());
                let message = self.translator.translate("schema.demo", &[]);
                self.notifier.notify(STATUS_ELEMENT, &message, NoticeKind::Error);
                LoadOutcome::Demo
            }
        };

        self.view.set_loading(None);
        self.view.modal_closed();
        self.view.render(self.editor.schedule());
        outcome
    }

    /// Serializes the schedule and writes it to the store
    ///
    /// On failure the in-memory schedule is left as it is.
    #[instrument(skip(self), fields(key = %key))]
    pub async fn save(&mut self, key: &SchemaKey) -> SaveOutcome {
        let csv = self.editor.schedule().to_csv();

        match self.store.store(key, &csv).await {
            Ok(()) => {
                info!("Saved schema {} ({} bytes)", key, csv.len());
                let message = self.translator.translate("schema.saved", &[("file", key.as_str())]);
                self.notifier.notify(STATUS_ELEMENT, &message, NoticeKind::Success);
                SaveOutcome::Saved
            }
            Err(e) => {
                error!("Saving schema {} failed: {}", key, e);
                let message = format!("{}: {}", self.translator.translate("error", &[]), e);
                self.notifier.notify(STATUS_ELEMENT, &message, NoticeKind::Error);
                SaveOutcome::Failed
            }
        }
    }

    /// Grid edit followed by a refresh of the edited row
    pub fn update_value(&mut self, index: usize, field: Field, raw: &str) -> Result<u8> {
        let value = self.editor.update_value(index, field, raw)?;
        self.refresh(index);
        Ok(value)
    }

    /// Swatch click
    pub fn open_color_modal(&mut self, index: usize) -> Result<Rgb> {
        let preview = self.editor.open_color_modal(index)?;
        self.view.modal_opened(index, preview);
        Ok(preview)
    }

    /// Slider movement in the open modal
    pub fn set_preview(&mut self, field: Field, value: u8) -> Option<Rgb> {
        let preview = self.editor.set_preview(field, value)?;
        self.view.modal_preview(preview);
        Some(preview)
    }

    /// Escape key, overlay click or cancel button
    pub fn cancel_color_modal(&mut self) {
        if self.editor.modal() != ColorModal::Closed {
            self.editor.cancel_color_modal();
            self.view.modal_closed();
        }
    }

    /// Confirm button: commit the preview and refresh the edited row
    pub fn apply_color_modal(&mut self) -> Option<usize> {
        let index = self.editor.apply_color_modal()?;
        self.view.modal_closed();
        self.refresh(index);
        Some(index)
    }

    fn refresh(&mut self, index: usize) {
        if let Some(slot) = self.editor.slot(index) {
            self.view.refresh_row(index, slot);
        }
    }
}
