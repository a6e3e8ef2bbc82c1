//! # End-to-end tests over a real LMDB environment
//!
//! Unit tests live next to each module. The tests here open actual `.lmdb`
//! directories under a temp dir and drive the stores the way the pages do:
//!
//! - **Persistence**: round-trip, reopen, clear-all, malformed slots
//! - **Record operations**: unique ids, delete idempotence, delete-then-recreate edits
//! - **Views and aggregation**: filter identity, the Rock/Jazz/Rock summary, CSV export
//! - **FFI**: JSON replies, notifications, null pointers
//!
//! ```bash
//! cargo test
//! cargo test test_ffi_
//! ```

#[cfg(test)]
pub mod tests {
    use std::collections::HashSet;
    use std::ffi::{CStr, CString};
    use std::os::raw::c_char;
    use std::rc::Rc;

    use serde_json::Value;
    use tempfile::TempDir;

    use crate::blog_model::BlogPostFields;
    use crate::collaborator::{LogNotifier, NotificationLog, Severity};
    use crate::config::StoreConfig;
    use crate::local_db_state::AppDbState;
    use crate::persistent_collection::PersistentCollection;
    use crate::research_model::{ResearchEntry, ResearchEntryFields, SchemaVariant};
    use crate::slot_storage::SlotStorage;
    use crate::{BlogStore, ResearchStore};

    fn temp_config(dir: &TempDir, schema: SchemaVariant) -> StoreConfig {
        StoreConfig::default().with_db_path(dir.path().join("melodies_test")).with_schema(schema)
    }

    fn research(db: &Rc<AppDbState>, config: &StoreConfig) -> ResearchStore<Rc<AppDbState>, NotificationLog> {
        ResearchStore::init(Rc::clone(db), config, NotificationLog::new())
    }

    fn session(category: &str, song: &str, emotional: u32) -> ResearchEntryFields {
        ResearchEntryFields {
            subject_id: Some("P-01".to_string()),
            music_category: category.to_string(),
            song_title: song.to_string(),
            duration_minutes: 6,
            heart_rate: 68,
            blood_pressure: "118/76".to_string(),
            heart_rate_before: 82,
            heart_rate_after: 74,
            blood_pressure_before: "128/84".to_string(),
            blood_pressure_after: "119/78".to_string(),
            emotional_state: emotional,
            energy_level: 6,
            focus_level: 7,
            notes: Some("eyes closed, headphones".to_string()),
        }
    }

    fn accept(_: &str) -> bool {
        true
    }

    // ===============================
    // PERSISTENCE
    // ===============================

    #[test]
    fn test_round_trip_through_lmdb() {
        let dir = tempfile::tempdir().unwrap();
        let config = temp_config(&dir, SchemaVariant::ParticipantEra);
        let db = Rc::new(AppDbState::init(&config).unwrap());

        let mut store = research(&db, &config);
        for (i, category) in ["1950s", "1980s", "1950s"].iter().enumerate() {
            store.create(session(category, &format!("Track {i}"), 5)).unwrap();
        }

        let collection = PersistentCollection::<ResearchEntry>::new(config.research_slot.as_str());
        assert_eq!(collection.load(&*db), store.records());
    }

    #[test]
    fn test_reopen_after_close_keeps_both_stores() {
        let dir = tempfile::tempdir().unwrap();
        let config = temp_config(&dir, SchemaVariant::EraBeforeAfter);

        let (entries, posts) = {
            let db = Rc::new(AppDbState::init(&config).unwrap());
            let mut data = research(&db, &config);
            let mut blog = BlogStore::init(Rc::clone(&db), &config, LogNotifier);
            data.create(session("1960s", "Across the Universe", 7)).unwrap();
            blog.create(BlogPostFields {
                title: "Week 1".to_string(),
                date: "2026-10-12".to_string(),
                week: 1,
                content: "Baseline readings.".to_string(),
                tags: "baseline".to_string(),
            })
            .unwrap();
            (data.records().to_vec(), blog.posts().to_vec())
        };

        let db = Rc::new(AppDbState::init(&config).unwrap());
        assert_eq!(research(&db, &config).records(), entries.as_slice());
        assert_eq!(BlogStore::init(Rc::clone(&db), &config, LogNotifier).posts(), posts.as_slice());
    }

    #[test]
    fn test_malformed_slot_hydrates_empty_without_notice() {
        let dir = tempfile::tempdir().unwrap();
        let config = temp_config(&dir, SchemaVariant::PatientGenre);
        let db = Rc::new(AppDbState::init(&config).unwrap());
        db.write_slot(&config.research_slot, "[{\"id\": 1, broken").unwrap();

        let store = research(&db, &config);
        assert!(store.records().is_empty());
        assert!(store.notifier().entries().is_empty());
        assert_eq!(store.summarize().display().total_records, "0");
    }

    #[test]
    fn test_clear_all_zeroes_state_for_a_fresh_instance() {
        let dir = tempfile::tempdir().unwrap();
        let config = temp_config(&dir, SchemaVariant::EraBeforeAfter);
        let db = Rc::new(AppDbState::init(&config).unwrap());

        let mut store = research(&db, &config);
        store.create(session("1960s", "A", 5)).unwrap();
        store.create(session("1990s", "B", 9)).unwrap();
        assert!(store.clear_all(accept).unwrap());
        assert_eq!(db.read_slot(&config.research_slot).unwrap(), None);

        let fresh = research(&db, &config);
        let display = fresh.summarize().display();
        assert!(fresh.records().is_empty());
        assert_eq!(display.total_records, "0");
        assert_eq!(display.mean_heart_rate, "--");
        assert_eq!(display.dominant_category, "--");
        assert_eq!(display.mean_emotional_state, "--");
    }

    // ===============================
    // RECORD OPERATIONS
    // ===============================

    #[test]
    fn test_ids_pairwise_distinct() {
        let dir = tempfile::tempdir().unwrap();
        let config = temp_config(&dir, SchemaVariant::PatientGenre);
        let db = Rc::new(AppDbState::init(&config).unwrap());
        let mut store = research(&db, &config);

        for n in 0..50 {
            store.create(session("Jazz", &format!("take {n}"), 5)).unwrap();
        }

        // a second instance keeps minting past the stored ids
        let mut reopened = research(&db, &config);
        reopened.create(session("Jazz", "late take", 5)).unwrap();

        let ids: HashSet<_> = reopened.records().iter().map(|e| e.id).collect();
        assert_eq!(ids.len(), 51);
    }

    #[test]
    fn test_delete_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let config = temp_config(&dir, SchemaVariant::PatientGenre);
        let db = Rc::new(AppDbState::init(&config).unwrap());
        let mut store = research(&db, &config);

        let entry = store.create(session("Blues", "Red House", 6)).unwrap();
        store.create(session("Blues", "Hoochie Coochie Man", 6)).unwrap();
        assert!(store.delete(entry.id, accept).unwrap());
        let after_first = store.records().to_vec();

        assert!(!store.delete(entry.id, accept).unwrap());
        assert_eq!(store.records(), after_first.as_slice());
        assert_eq!(research(&db, &config).records(), after_first.as_slice());

        let last = store.notifier().last().unwrap();
        assert_eq!(last.message, "Entry not found");
        assert_eq!(last.severity, Severity::Warning);
    }

    #[test]
    fn test_update_changes_identity() {
        let dir = tempfile::tempdir().unwrap();
        let config = temp_config(&dir, SchemaVariant::ParticipantEra);
        let db = Rc::new(AppDbState::init(&config).unwrap());
        let mut store = research(&db, &config);

        let original = store.create(session("1980s", "Take On Me", 6)).unwrap();
        let loaded = store.begin_edit(original.id).unwrap().unwrap();
        assert!(research(&db, &config).records().is_empty());

        let mut fields = loaded.to_fields();
        fields.emotional_state = 9;
        let resubmitted = store.create(fields).unwrap();

        assert_ne!(resubmitted.id, original.id);
        assert_eq!(resubmitted.emotional_state, 9);
        assert_eq!(resubmitted.song_title, original.song_title);
        assert_eq!(resubmitted.readings, original.readings);
    }

    // ===============================
    // VIEWS, AGGREGATION, EXPORT
    // ===============================

    #[test]
    fn test_filter_none_is_identity() {
        let dir = tempfile::tempdir().unwrap();
        let config = temp_config(&dir, SchemaVariant::PatientGenre);
        let db = Rc::new(AppDbState::init(&config).unwrap());
        let mut store = research(&db, &config);
        for (category, song) in [("Rock", "a"), ("Jazz", "b"), ("Rock", "c")] {
            store.create(session(category, song, 5)).unwrap();
        }

        let identity: Vec<ResearchEntry> = store.filter(None).into_iter().cloned().collect();
        assert_eq!(identity, store.records());

        let rock: Vec<_> = store.filter(Some("Rock")).into_iter().map(|e| e.song_title.as_str()).collect();
        assert_eq!(rock, vec!["a", "c"]);
    }

    #[test]
    fn test_summary_rock_jazz_rock() {
        let dir = tempfile::tempdir().unwrap();
        let config = temp_config(&dir, SchemaVariant::PatientGenre);
        let db = Rc::new(AppDbState::init(&config).unwrap());
        let mut store = research(&db, &config);
        for (category, emotional) in [("Rock", 4), ("Jazz", 8), ("Rock", 6)] {
            store.create(session(category, "x", emotional)).unwrap();
        }

        let summary = store.summarize();
        assert_eq!(summary.count, 3);
        assert_eq!(summary.dominant_category.as_deref(), Some("Rock"));
        assert_eq!(summary.mean_emotional_state, Some(6.0));

        let display = summary.display();
        assert_eq!(display.total_records, "3");
        assert_eq!(display.mean_heart_rate, "68 BPM");
    }

    #[test]
    fn test_csv_single_reading_example() {
        let dir = tempfile::tempdir().unwrap();
        let config = temp_config(&dir, SchemaVariant::PatientGenre);
        let db = Rc::new(AppDbState::init(&config).unwrap());
        let mut store = research(&db, &config);

        store
            .create(ResearchEntryFields {
                song_title: "Clair de Lune".to_string(),
                duration_minutes: 5,
                heart_rate: 72,
                emotional_state: 7,
                energy_level: 3,
                focus_level: 8,
                notes: Some(String::new()),
                ..ResearchEntryFields::default()
            })
            .unwrap();

        let export = store.export_csv().unwrap();
        let lines: Vec<&str> = export.content.split('\n').collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains("\"Clair de Lune\""));
        assert!(lines[1].contains(",5,72,"));
        assert!(lines[1].ends_with(",7,3,8,\"\""));
        assert!(export.file_name.starts_with("melodies-research-data-"));
        assert!(export.file_name.ends_with(".csv"));

        let path = export.write_into(dir.path()).unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), export.content);
    }

    // ===============================
    // FFI
    // ===============================

    fn take_reply(ptr: *const c_char) -> Value {
        assert!(!ptr.is_null());
        let json = unsafe { CStr::from_ptr(ptr) }.to_str().unwrap().to_string();
        crate::free_response(ptr);
        serde_json::from_str(&json).unwrap()
    }

    fn ok_payload(reply: &Value) -> Value {
        let raw = reply["response"]["Ok"].as_str().expect("Ok response");
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn test_ffi_research_flow() {
        use crate::{
            melodies_close, melodies_open, research_clear_all, research_create, research_export_csv,
            research_list, research_summary,
        };

        let dir = tempfile::tempdir().unwrap();
        let config_json = serde_json::json!({ "dbPath": dir.path().join("ffi_test") }).to_string();
        let config = CString::new(config_json).unwrap();
        let state = melodies_open(config.as_ptr());
        assert!(!state.is_null());

        let entry = CString::new(
            r#"{"musicEra": "1970s", "songTitle": "Dreams", "duration": "4", "heartRateBefore": "84",
                "heartRateAfter": "76", "emotionalState": "7", "energyLevel": "6", "focusLevel": "5"}"#,
        )
        .unwrap();
        let created = take_reply(research_create(state, entry.as_ptr()));
        assert_eq!(created["notifications"][0]["severity"], "success");
        assert_eq!(ok_payload(&created)["heartRateBefore"], 84);

        let rows = take_reply(research_list(state, std::ptr::null()));
        assert_eq!(ok_payload(&rows).as_array().unwrap().len(), 1);

        let other = CString::new("1980s").unwrap();
        let filtered = take_reply(research_list(state, other.as_ptr()));
        assert!(ok_payload(&filtered).as_array().unwrap().is_empty());

        let summary = take_reply(research_summary(state));
        assert_eq!(ok_payload(&summary)["meanHeartRate"], "84 → 76 BPM");

        let export = take_reply(research_export_csv(state));
        assert!(ok_payload(&export)["content"].as_str().unwrap().contains("\"Dreams\""));

        let declined = take_reply(research_clear_all(state, false));
        assert_eq!(ok_payload(&declined), Value::Bool(false));

        let cleared = take_reply(research_clear_all(state, true));
        assert_eq!(ok_payload(&cleared), Value::Bool(true));

        let empty_export = take_reply(research_export_csv(state));
        assert!(empty_export["response"]["ValidationError"].is_string());
        assert_eq!(empty_export["notifications"][0]["severity"], "warning");

        let closed = take_reply(melodies_close(state));
        assert!(closed["response"]["Ok"].is_string());
    }

    #[test]
    fn test_ffi_blog_edit_and_delete() {
        use crate::{blog_begin_edit, blog_create, blog_delete, blog_list, blog_update, melodies_close, melodies_open};

        let dir = tempfile::tempdir().unwrap();
        let config_json = serde_json::json!({ "dbPath": dir.path().join("ffi_blog") }).to_string();
        let config = CString::new(config_json).unwrap();
        let state = melodies_open(config.as_ptr());
        assert!(!state.is_null());

        let post = CString::new(
            r#"{"postTitle": "Week 2", "postDate": "2026-10-19", "postWeek": "2", "postContent": "Notes", "postTags": "calm, focus"}"#,
        )
        .unwrap();
        let created = ok_payload(&take_reply(blog_create(state, post.as_ptr())));
        let id = created["id"].as_u64().unwrap();

        let loaded = take_reply(blog_begin_edit(state, id));
        assert_eq!(ok_payload(&loaded)["tags"], "calm, focus");
        assert_eq!(loaded["notifications"][0]["message"], "Post loaded for editing");

        let missing = take_reply(blog_update(state, id, post.as_ptr()));
        assert!(missing["response"]["NotFound"].is_string());

        let recreated = ok_payload(&take_reply(blog_create(state, post.as_ptr())));
        let new_id = recreated["id"].as_u64().unwrap();
        assert_ne!(new_id, id);

        let cards = ok_payload(&take_reply(blog_list(state)));
        assert_eq!(cards[0]["dateLabel"], "October 19, 2026");

        let kept = take_reply(blog_delete(state, new_id, false));
        assert_eq!(ok_payload(&kept), Value::Bool(false));
        let deleted = take_reply(blog_delete(state, new_id, true));
        assert_eq!(ok_payload(&deleted), Value::Bool(true));

        take_reply(melodies_close(state));
    }

    #[test]
    fn test_ffi_null_pointers() {
        use crate::{blog_list, melodies_close, research_create, research_summary};

        let summary = take_reply(research_summary(std::ptr::null_mut()));
        assert!(summary["response"]["BadRequest"].as_str().unwrap().contains("research_summary"));

        assert!(take_reply(blog_list(std::ptr::null_mut()))["response"]["BadRequest"].is_string());
        assert!(take_reply(melodies_close(std::ptr::null_mut()))["response"]["BadRequest"].is_string());

        let dir = tempfile::tempdir().unwrap();
        let config = CString::new(serde_json::json!({ "dbPath": dir.path().join("ffi_null") }).to_string()).unwrap();
        let state = crate::melodies_open(config.as_ptr());
        let no_json = take_reply(research_create(state, std::ptr::null()));
        assert!(no_json["response"]["BadRequest"].is_string());

        let bad_json = CString::new("{ not json").unwrap();
        let rejected = take_reply(research_create(state, bad_json.as_ptr()));
        assert!(rejected["response"]["SerializationError"].is_string());

        take_reply(melodies_close(state));
    }

    #[test]
    fn test_ffi_open_rejects_bad_config() {
        let bad = CString::new(r#"{"mapSize": "huge"}"#).unwrap();
        assert!(crate::melodies_open(bad.as_ptr()).is_null());
    }
}
