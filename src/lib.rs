//! # Melodies Core
//!
//! Record management for the Melodies research site: weekly blog reflections
//! and music-listening session data, each kept as one JSON collection in a
//! durable key-value slot (LMDB by default).
//!
//! ## Layers
//!
//! - [`persistent_collection`] - load/save/erase a whole collection under one slot key
//! - [`record_store`] - in-memory mirror, id minting, write-after-every-mutation
//! - [`blog_store`] / [`research_store`] - create, edit, delete, clear-all, views
//! - [`stats`] / [`csv_export`] - summary panel values and CSV export
//!
//! ## Quick Start
//!
//! ```no_run
//! use melodies_core::{AppDbState, LogNotifier, ResearchEntryFields, ResearchStore, StoreConfig};
//!
//! let config = StoreConfig::default();
//! let db = AppDbState::init(&config)?;
//! let mut research = ResearchStore::init(&db, &config, LogNotifier);
//!
//! research.create(ResearchEntryFields {
//!     music_category: "1970s".to_string(),
//!     song_title: "Heart of Glass".to_string(),
//!     ..Default::default()
//! })?;
//! println!("{:?}", research.summarize().display());
//! # Ok::<(), melodies_core::AppResponse>(())
//! ```
//!
//! ## FFI Functions
//!
//! Every function returns a JSON reply `{"response": AppResponse, "notifications": [...]}`
//! that the caller frees with [`free_response`].
//!
//! - [`melodies_open`] / [`melodies_close`]
//! - [`research_create`], [`research_update`], [`research_begin_edit`], [`research_delete`],
//!   [`research_clear_all`], [`research_list`], [`research_summary`], [`research_export_csv`]
//! - [`blog_create`], [`blog_update`], [`blog_begin_edit`], [`blog_delete`],
//!   [`blog_clear_all`], [`blog_list`]

pub mod app_response;
pub mod blog_model;
pub mod blog_store;
pub mod clock;
pub mod coerce;
pub mod collaborator;
pub mod config;
pub mod csv_export;
pub mod id_source;
pub mod local_db_state;
pub mod persistent_collection;
pub mod projection;
pub mod record_store;
pub mod research_model;
pub mod research_store;
pub mod slot_storage;
pub mod stats;
mod test;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::rc::Rc;

use log::{info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;

pub use crate::app_response::AppResponse;
pub use crate::blog_model::{BlogPost, BlogPostFields};
pub use crate::blog_store::BlogStore;
pub use crate::collaborator::{Confirm, LogNotifier, Notification, NotificationLog, Notifier, Severity};
pub use crate::config::StoreConfig;
pub use crate::id_source::RecordId;
pub use crate::local_db_state::AppDbState;
pub use crate::research_model::{Readings, ResearchEntry, ResearchEntryFields, SchemaVariant};
pub use crate::research_store::ResearchStore;
pub use crate::slot_storage::{MemorySlots, SlotStorage};
pub use crate::stats::Summary;

/// Both stores over one shared LMDB environment, as handed across the FFI boundary.
pub struct MelodiesState {
    blog: BlogStore<Rc<AppDbState>, NotificationLog>,
    research: ResearchStore<Rc<AppDbState>, NotificationLog>,
    db: Rc<AppDbState>,
}

impl MelodiesState {
    pub fn open(config: &StoreConfig) -> Result<Self, AppResponse> {
        let db = Rc::new(AppDbState::init(config)?);
        let blog = BlogStore::init(Rc::clone(&db), config, NotificationLog::new());
        let research = ResearchStore::init(Rc::clone(&db), config, NotificationLog::new());
        Ok(Self { blog, research, db })
    }

    pub fn blog(&mut self) -> &mut BlogStore<Rc<AppDbState>, NotificationLog> {
        &mut self.blog
    }

    pub fn research(&mut self) -> &mut ResearchStore<Rc<AppDbState>, NotificationLog> {
        &mut self.research
    }

    /// Drops both stores and closes the environment once nothing else holds it.
    pub fn close(self) -> Result<(), AppResponse> {
        let MelodiesState { blog, research, db } = self;
        drop(blog);
        drop(research);

        match Rc::try_unwrap(db) {
            Ok(mut db) => db.close_database(),
            Err(_) => {
                warn!("Slot environment still shared, leaving it open");
                Ok(())
            }
        }
    }
}

#[derive(Serialize)]
struct Reply<'a> {
    response: &'a AppResponse,
    notifications: Vec<Notification>,
}

/// Opens (or creates) the stores described by a JSON [`StoreConfig`].
///
/// A null or empty config uses the defaults. Returns null on failure; the
/// reason is logged.
///
/// # Safety
///
/// `config_json` must be null or a valid null-terminated string.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn melodies_open(config_json: *const c_char) -> *mut MelodiesState {
    let config = if config_json.is_null() {
        StoreConfig::default()
    } else {
        let raw = match unsafe { CStr::from_ptr(config_json).to_str() } {
            Ok(s) => s,
            Err(e) => {
                warn!("Invalid UTF-8 in config parameter: {e}");
                return std::ptr::null_mut();
            }
        };
        match StoreConfig::from_json(raw) {
            Ok(config) => config,
            Err(e) => {
                warn!("Rejected store config: {e}");
                return std::ptr::null_mut();
            }
        }
    };

    match MelodiesState::open(&config) {
        Ok(state) => {
            info!("✅ Melodies stores opened at {}", config.lmdb_dir().display());
            Box::into_raw(Box::new(state))
        }
        Err(e) => {
            warn!("❌ Failed to open stores at {}: {}", config.lmdb_dir().display(), e);
            std::ptr::null_mut()
        }
    }
}

/// Closes the environment and frees the state. The pointer is invalid afterwards.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn melodies_close(state: *mut MelodiesState) -> *const c_char {
    if state.is_null() {
        return reply(&AppResponse::BadRequest("Null state pointer passed to melodies_close".to_string()), Vec::new());
    }

    let state = unsafe { Box::from_raw(state) };
    match state.close() {
        Ok(()) => reply(&AppResponse::success("Database connection closed successfully"), Vec::new()),
        Err(e) => reply(&e, Vec::new()),
    }
}

/// Frees a reply returned by any function in this module.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn free_response(ptr: *const c_char) {
    if !ptr.is_null() {
        unsafe { drop(CString::from_raw(ptr as *mut c_char)) };
    }
}

#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn research_create(state: *mut MelodiesState, json_ptr: *const c_char) -> *const c_char {
    with_state(state, "research_create", |state| {
        let fields: ResearchEntryFields = parse_json(json_ptr)?;
        let entry = state.research.create(fields)?;
        to_ok_json(&entry)
    })
}

/// Removes the entry and creates a new one from `json_ptr`; the reply carries the new id.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn research_update(state: *mut MelodiesState, id: u64, json_ptr: *const c_char) -> *const c_char {
    with_state(state, "research_update", |state| {
        let fields: ResearchEntryFields = parse_json(json_ptr)?;
        match state.research.update(id, fields)? {
            Some(entry) => to_ok_json(&entry),
            None => Err(AppResponse::NotFound(format!("No entry updated for id: {id}"))),
        }
    })
}

/// Removes the entry and returns its form values for editing.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn research_begin_edit(state: *mut MelodiesState, id: u64) -> *const c_char {
    with_state(state, "research_begin_edit", |state| match state.research.begin_edit(id)? {
        Some(entry) => to_ok_json(&entry.to_fields()),
        None => Err(AppResponse::NotFound(format!("No entry loaded for id: {id}"))),
    })
}

/// `confirmed` is the answer the caller already got from its own prompt.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn research_delete(state: *mut MelodiesState, id: u64, confirmed: bool) -> *const c_char {
    with_state(state, "research_delete", |state| {
        let removed = state.research.delete(id, |_: &str| confirmed)?;
        to_ok_json(&removed)
    })
}

#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn research_clear_all(state: *mut MelodiesState, confirmed: bool) -> *const c_char {
    with_state(state, "research_clear_all", |state| {
        let cleared = state.research.clear_all(|_: &str| confirmed)?;
        to_ok_json(&cleared)
    })
}

/// Display rows, newest first, optionally limited to one category (null = all).
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn research_list(state: *mut MelodiesState, category: *const c_char) -> *const c_char {
    with_state(state, "research_list", |state| {
        let category = if category.is_null() { None } else { Some(c_ptr_to_string(category, "category")?) };
        to_ok_json(&state.research.rows(category.as_deref()))
    })
}

#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn research_summary(state: *mut MelodiesState) -> *const c_char {
    with_state(state, "research_summary", |state| to_ok_json(&state.research.summarize().display()))
}

/// The CSV artifact as `{"fileName", "content"}`; the caller offers it for download.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn research_export_csv(state: *mut MelodiesState) -> *const c_char {
    with_state(state, "research_export_csv", |state| match state.research.export_csv() {
        Some(export) => to_ok_json(&export),
        None => Err(AppResponse::ValidationError("No data to export".to_string())),
    })
}

#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn blog_create(state: *mut MelodiesState, json_ptr: *const c_char) -> *const c_char {
    with_state(state, "blog_create", |state| {
        let fields: BlogPostFields = parse_json(json_ptr)?;
        let post = state.blog.create(fields)?;
        to_ok_json(&post)
    })
}

#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn blog_update(state: *mut MelodiesState, id: u64, json_ptr: *const c_char) -> *const c_char {
    with_state(state, "blog_update", |state| {
        let fields: BlogPostFields = parse_json(json_ptr)?;
        match state.blog.update(id, fields)? {
            Some(post) => to_ok_json(&post),
            None => Err(AppResponse::NotFound(format!("No post updated for id: {id}"))),
        }
    })
}

#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn blog_begin_edit(state: *mut MelodiesState, id: u64) -> *const c_char {
    with_state(state, "blog_begin_edit", |state| match state.blog.begin_edit(id)? {
        Some(post) => to_ok_json(&post.to_fields()),
        None => Err(AppResponse::NotFound(format!("No post loaded for id: {id}"))),
    })
}

#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn blog_delete(state: *mut MelodiesState, id: u64, confirmed: bool) -> *const c_char {
    with_state(state, "blog_delete", |state| {
        let removed = state.blog.delete(id, |_: &str| confirmed)?;
        to_ok_json(&removed)
    })
}

#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn blog_clear_all(state: *mut MelodiesState, confirmed: bool) -> *const c_char {
    with_state(state, "blog_clear_all", |state| {
        let cleared = state.blog.clear_all(|_: &str| confirmed)?;
        to_ok_json(&cleared)
    })
}

/// Blog cards, newest first.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn blog_list(state: *mut MelodiesState) -> *const c_char {
    with_state(state, "blog_list", |state| to_ok_json(&state.blog.cards()))
}

/// Runs `op` against the state and packs its result plus any notifications
/// the stores raised into one reply.
fn with_state<F>(state: *mut MelodiesState, fn_name: &str, op: F) -> *const c_char
where
    F: FnOnce(&mut MelodiesState) -> Result<AppResponse, AppResponse>,
{
    let state = match unsafe { state.as_mut() } {
        Some(s) => s,
        None => {
            let error = AppResponse::BadRequest(format!("Null state pointer passed to {fn_name}"));
            return reply(&error, Vec::new());
        }
    };

    let response = op(&mut *state).unwrap_or_else(|e| e);
    let mut notifications = state.research.notifier_mut().drain();
    notifications.extend(state.blog.notifier_mut().drain());
    reply(&response, notifications)
}

fn to_ok_json<T: Serialize>(value: &T) -> Result<AppResponse, AppResponse> {
    Ok(AppResponse::Ok(serde_json::to_string(value)?))
}

fn parse_json<T: DeserializeOwned>(json_ptr: *const c_char) -> Result<T, AppResponse> {
    let json = c_ptr_to_string(json_ptr, "JSON")?;
    serde_json::from_str(&json).map_err(|e| AppResponse::SerializationError(format!("Invalid JSON: {e}")))
}

/// Serializes a reply into a caller-owned C string; null if that fails.
fn reply(response: &AppResponse, notifications: Vec<Notification>) -> *const c_char {
    let json = match serde_json::to_string(&Reply { response, notifications }) {
        Ok(j) => j,
        Err(e) => {
            warn!("Error serializing response: {e}");
            return std::ptr::null();
        }
    };

    match CString::new(json) {
        Ok(c_str) => c_str.into_raw(),
        Err(e) => {
            warn!("Error creating CString: {e}");
            std::ptr::null()
        }
    }
}

fn c_ptr_to_string(ptr: *const c_char, field_name: &str) -> Result<String, AppResponse> {
    if ptr.is_null() {
        return Err(AppResponse::BadRequest(format!("Null {field_name} pointer")));
    }

    match unsafe { CStr::from_ptr(ptr).to_str() } {
        Ok(s) => Ok(s.to_string()),
        Err(e) => Err(AppResponse::BadRequest(format!("Invalid UTF-8 in {field_name}: {e}"))),
    }
}
