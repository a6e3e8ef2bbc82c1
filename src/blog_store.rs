//! The blog store: weekly reflections, newest first.

use log::info;

use crate::app_response::AppResponse;
use crate::blog_model::{BlogPost, BlogPostFields};
use crate::clock;
use crate::collaborator::{Confirm, LogNotifier, Notifier, Severity};
use crate::config::StoreConfig;
use crate::id_source::RecordId;
use crate::projection::{self, BlogCard};
use crate::record_store::{Placement, RecordStore};
use crate::slot_storage::SlotStorage;

const CLEAR_PROMPT: &str = "Are you sure you want to delete ALL reflections? This action cannot be undone.";

pub struct BlogStore<S, N = LogNotifier> {
    inner: RecordStore<BlogPost, S>,
    notifier: N,
}

impl<S: SlotStorage, N: Notifier> BlogStore<S, N> {
    /// Opens the store and hydrates it from its slot. New posts go to the front.
    pub fn init(slots: S, config: &StoreConfig, notifier: N) -> Self {
        let inner = RecordStore::hydrate(slots, config.blog_slot.as_str(), Placement::Front);
        info!("Blog store ready: {} posts in slot '{}'", inner.records().len(), inner.slot_key());
        Self { inner, notifier }
    }

    pub fn reload(&mut self) {
        self.inner.reload();
    }

    /// Posts newest first; this is both storage and display order.
    pub fn posts(&self) -> &[BlogPost] {
        self.inner.records()
    }

    pub fn find(&self, id: RecordId) -> Option<&BlogPost> {
        self.inner.find(id)
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn notifier_mut(&mut self) -> &mut N {
        &mut self.notifier
    }

    pub fn create(&mut self, fields: BlogPostFields) -> Result<BlogPost, AppResponse> {
        let id = self.inner.next_id();
        let post = self.inner.insert(BlogPost::from_fields(id, clock::display_timestamp(), fields))?;

        self.notifier.notify("Reflection published successfully!", Severity::Success);
        Ok(post)
    }

    /// Pulls a post out so the form can be refilled. Resubmitting goes through
    /// [`create`](Self::create) and the post comes back with a new id.
    pub fn begin_edit(&mut self, id: RecordId) -> Result<Option<BlogPost>, AppResponse> {
        match self.inner.remove(id)? {
            Some(post) => {
                self.notifier.notify("Post loaded for editing", Severity::Success);
                Ok(Some(post))
            }
            None => {
                self.notifier.notify("Post not found", Severity::Warning);
                Ok(None)
            }
        }
    }

    pub fn update(&mut self, id: RecordId, fields: BlogPostFields) -> Result<Option<BlogPost>, AppResponse> {
        if self.begin_edit(id)?.is_none() {
            return Ok(None);
        }
        self.create(fields).map(Some)
    }

    pub fn delete(&mut self, id: RecordId, mut confirm: impl Confirm) -> Result<bool, AppResponse> {
        let Some(post) = self.inner.find(id) else {
            self.notifier.notify("Post not found", Severity::Warning);
            return Ok(false);
        };

        let prompt = format!("Are you sure you want to delete \"{}\"? This action cannot be undone.", post.title);
        if !confirm.confirm(&prompt) {
            return Ok(false);
        }

        let removed = self.inner.remove(id)?.is_some();
        if removed {
            self.notifier.notify("Post deleted successfully", Severity::Success);
        }
        Ok(removed)
    }

    pub fn clear_all(&mut self, mut confirm: impl Confirm) -> Result<bool, AppResponse> {
        if self.inner.records().is_empty() {
            self.notifier.notify("No posts to clear", Severity::Warning);
            return Ok(false);
        }

        if !confirm.confirm(CLEAR_PROMPT) {
            return Ok(false);
        }

        let cleared = self.inner.clear()?;
        info!("Cleared {} blog posts", cleared);
        self.notifier.notify("All posts cleared successfully!", Severity::Success);
        Ok(true)
    }

    pub fn cards(&self) -> Vec<BlogCard> {
        self.inner.records().iter().map(projection::blog_card).collect()
    }
}
