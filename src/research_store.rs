//! The research data store: listening sessions, their summary and export.

use chrono::NaiveDate;
use log::info;

use crate::app_response::AppResponse;
use crate::clock;
use crate::collaborator::{Confirm, LogNotifier, Notifier, Severity};
use crate::config::StoreConfig;
use crate::csv_export::{self, CsvExport};
use crate::id_source::RecordId;
use crate::projection::{self, ResearchRow};
use crate::record_store::{self, Placement, RecordStore};
use crate::research_model::{ResearchEntry, ResearchEntryFields, SchemaVariant};
use crate::slot_storage::SlotStorage;
use crate::stats::{self, Summary};

const CLEAR_PROMPT: &str = "Are you sure you want to clear ALL research data? This action cannot be undone.";

pub struct ResearchStore<S, N = LogNotifier> {
    inner: RecordStore<ResearchEntry, S>,
    schema: SchemaVariant,
    export_prefix: String,
    notifier: N,
}

impl<S: SlotStorage, N: Notifier> ResearchStore<S, N> {
    /// Opens the store and hydrates it from its slot. New entries are appended.
    pub fn init(slots: S, config: &StoreConfig, notifier: N) -> Self {
        let inner = RecordStore::hydrate(slots, config.research_slot.as_str(), Placement::Back);
        info!(
            "Research store ready: {} entries in slot '{}' ({:?})",
            inner.records().len(),
            inner.slot_key(),
            config.schema
        );
        Self { inner, schema: config.schema, export_prefix: config.export_prefix.clone(), notifier }
    }

    pub fn reload(&mut self) {
        self.inner.reload();
    }

    /// Entries in storage (insertion) order.
    pub fn records(&self) -> &[ResearchEntry] {
        self.inner.records()
    }

    pub fn schema(&self) -> SchemaVariant {
        self.schema
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn notifier_mut(&mut self) -> &mut N {
        &mut self.notifier
    }

    pub fn create(&mut self, fields: ResearchEntryFields) -> Result<ResearchEntry, AppResponse> {
        let id = self.inner.next_id();
        let entry = ResearchEntry::from_fields(id, clock::display_timestamp(), fields, self.schema);
        let entry = self.inner.insert(entry)?;

        self.notifier.notify("Data recorded successfully!", Severity::Success);
        Ok(entry)
    }

    fn removal_blocked(&mut self) -> bool {
        if self.schema.allows_entry_removal() {
            return false;
        }
        self.notifier
            .notify("Individual entries cannot be removed; use clear all instead", Severity::Warning);
        true
    }

    /// First half of an edit: removes the entry so its values can be resubmitted
    /// through [`create`](Self::create), which assigns a new id.
    pub fn begin_edit(&mut self, id: RecordId) -> Result<Option<ResearchEntry>, AppResponse> {
        if self.removal_blocked() {
            return Ok(None);
        }

        match self.inner.remove(id)? {
            Some(entry) => {
                self.notifier.notify("Entry loaded for editing", Severity::Success);
                Ok(Some(entry))
            }
            None => {
                self.notifier.notify("Entry not found", Severity::Warning);
                Ok(None)
            }
        }
    }

    /// Delete-then-recreate. The returned entry has a fresh id.
    pub fn update(&mut self, id: RecordId, fields: ResearchEntryFields) -> Result<Option<ResearchEntry>, AppResponse> {
        if self.begin_edit(id)?.is_none() {
            return Ok(None);
        }
        self.create(fields).map(Some)
    }

    pub fn delete(&mut self, id: RecordId, mut confirm: impl Confirm) -> Result<bool, AppResponse> {
        if self.removal_blocked() {
            return Ok(false);
        }

        let Some(entry) = self.inner.find(id) else {
            self.notifier.notify("Entry not found", Severity::Warning);
            return Ok(false);
        };

        let prompt = format!(
            "Are you sure you want to delete \"{}\"? This action cannot be undone.",
            entry.song_title
        );
        if !confirm.confirm(&prompt) {
            return Ok(false);
        }

        let removed = self.inner.remove(id)?.is_some();
        if removed {
            self.notifier.notify("Entry deleted successfully", Severity::Success);
        }
        Ok(removed)
    }

    /// Empties the store and deletes its slot. Returns whether anything was cleared.
    pub fn clear_all(&mut self, mut confirm: impl Confirm) -> Result<bool, AppResponse> {
        if self.inner.records().is_empty() {
            self.notifier.notify("No data to clear", Severity::Warning);
            return Ok(false);
        }

        if !confirm.confirm(CLEAR_PROMPT) {
            return Ok(false);
        }

        let cleared = self.inner.clear()?;
        info!("Cleared {} research entries", cleared);
        self.notifier.notify("All data cleared successfully!", Severity::Success);
        Ok(true)
    }

    pub fn filter(&self, category: Option<&str>) -> Vec<&ResearchEntry> {
        record_store::filter(self.inner.records(), category)
    }

    /// Filtered entries, newest first. Storage order is left untouched.
    pub fn display_order(&self, category: Option<&str>) -> Vec<&ResearchEntry> {
        let mut view = self.filter(category);
        view.reverse();
        view
    }

    pub fn rows(&self, category: Option<&str>) -> Vec<ResearchRow> {
        self.display_order(category)
            .into_iter()
            .map(|entry| projection::research_row(entry, self.schema))
            .collect()
    }

    pub fn categories(&self) -> Vec<&str> {
        record_store::categories(self.inner.records())
    }

    pub fn summarize(&self) -> Summary {
        stats::summarize(self.inner.records(), self.schema.reading_kind())
    }

    pub fn export_csv(&mut self) -> Option<CsvExport> {
        self.export_csv_on(clock::today_utc())
    }

    pub fn export_csv_on(&mut self, date: NaiveDate) -> Option<CsvExport> {
        if self.inner.records().is_empty() {
            self.notifier.notify("No data to export", Severity::Warning);
            return None;
        }

        let export = CsvExport {
            file_name: csv_export::export_file_name(&self.export_prefix, date),
            content: csv_export::to_csv(self.inner.records(), self.schema),
        };
        self.notifier.notify("Data exported successfully!", Severity::Success);
        Some(export)
    }
}
