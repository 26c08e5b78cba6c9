use std::collections::HashMap;

use chrono::Utc;

use crate::store::cohort::CohortDefinition;
use crate::store::RatingStore;

impl RatingStore {
    pub fn definition(&self, key: &str) -> Option<&CohortDefinition> {
        self.store().cohort_defs.get(key)
    }

    pub fn cohort_defs(&self) -> &HashMap<String, CohortDefinition> {
        &self.store().cohort_defs
    }

    pub fn last_used_cohort_key(&self) -> Option<&str> {
        self.store().last_used_cohort_key.as_deref()
    }

    pub fn set_last_used_cohort_key(&mut self, key: Option<&str>) {
        self.store_mut().last_used_cohort_key = key.map(str::to_string);
    }

    /// Insert or refresh a definition. The stored timestamp bumps only when
    /// the definition actually changed.
    pub fn upsert_cohort_def(&mut self, mut def: CohortDefinition) {
        let key = def.key.clone();
        if let Some(existing) = self.store().cohort_defs.get(&key) {
            if !existing.differs_from(&def) {
                return;
            }
        }
        def.updated_at = Utc::now();
        self.store_mut().cohort_defs.insert(key, def);
    }

    /// Delete a cohort's data and definition. Explicit user action only.
    pub fn remove_cohort(&mut self, key: &str) -> bool {
        let store = self.store_mut();
        let had_data = store.cohorts.remove(key).is_some();
        let had_def = store.cohort_defs.remove(key).is_some();
        if store.last_used_cohort_key.as_deref() == Some(key) {
            store.last_used_cohort_key = None;
        }
        had_data || had_def
    }

    /// Re-key a cohort whose membership definition changed while its rating
    /// history should persist (e.g. a folder moved).
    ///
    /// When data exists under both keys the merge is conservative: players
    /// already present under the new key are kept untouched and only the old
    /// key's players missing there are copied across.
    pub fn rename_cohort_key(&mut self, old_key: &str, new_def: CohortDefinition) {
        let new_key = new_def.key.clone();
        if new_key == old_key {
            self.upsert_cohort_def(new_def);
            return;
        }

        let store = self.store_mut();
        if let Some(old_data) = store.cohorts.remove(old_key) {
            match store.cohorts.get_mut(&new_key) {
                Some(new_data) => {
                    for (id, record) in old_data {
                        new_data.entry(id).or_insert(record);
                    }
                }
                None => {
                    store.cohorts.insert(new_key.clone(), old_data);
                }
            }
        }
        store.cohort_defs.remove(old_key);
        if store.last_used_cohort_key.as_deref() == Some(old_key) {
            store.last_used_cohort_key = Some(new_key.clone());
        }

        self.upsert_cohort_def(new_def);
        tracing::info!(old = old_key, new = %new_key, "Cohort re-keyed");
    }
}

#[cfg(test)]
mod tests {
    use crate::engine::config::EngineSettings;
    use crate::store::cohort::{CohortDefinition, CohortKind};
    use crate::store::RatingStore;

    fn folder_def(path: &str) -> CohortDefinition {
        CohortDefinition::new(CohortKind::Folder { path: path.into() })
    }

    #[test]
    fn upsert_skips_timestamp_bump_when_unchanged() {
        let mut store = RatingStore::new(EngineSettings::default());
        let def = folder_def("notes");
        store.upsert_cohort_def(def.clone());
        let first = store.definition(&def.key).unwrap().updated_at;

        store.upsert_cohort_def(def.clone());
        assert_eq!(store.definition(&def.key).unwrap().updated_at, first);

        store.upsert_cohort_def(def.clone().with_label("Notes"));
        let bumped = store.definition(&def.key).unwrap();
        assert_eq!(bumped.label.as_deref(), Some("Notes"));
        assert!(bumped.updated_at >= first);
    }

    #[test]
    fn rename_moves_data_wholesale() {
        let mut store = RatingStore::new(EngineSettings::default());
        let old = folder_def("drafts");
        store.upsert_cohort_def(old.clone());
        store.ensure_player(&old.key, "doc-1").rating = 1650.0;
        store.set_last_used_cohort_key(Some(&old.key));

        let new = folder_def("archive/drafts");
        store.rename_cohort_key(&old.key, new.clone());

        assert!(store.cohort(&old.key).is_none());
        assert!(store.definition(&old.key).is_none());
        assert_eq!(store.player(&new.key, "doc-1").unwrap().rating, 1650.0);
        assert_eq!(store.last_used_cohort_key(), Some(new.key.as_str()));
    }

    #[test]
    fn rename_merge_never_overwrites_new_key_players() {
        let mut store = RatingStore::new(EngineSettings::default());
        let old = folder_def("a");
        let new = folder_def("b");
        store.ensure_player(&old.key, "shared").rating = 1100.0;
        store.ensure_player(&old.key, "only-old").rating = 1200.0;
        store.ensure_player(&new.key, "shared").rating = 1900.0;

        store.rename_cohort_key(&old.key, new.clone());

        let merged = store.cohort(&new.key).unwrap();
        assert_eq!(merged["shared"].rating, 1900.0);
        assert_eq!(merged["only-old"].rating, 1200.0);
        assert!(store.cohort(&old.key).is_none());
    }

    #[test]
    fn rename_onto_same_key_only_upserts() {
        let mut store = RatingStore::new(EngineSettings::default());
        let def = folder_def("stable");
        store.upsert_cohort_def(def.clone());
        store.ensure_player(&def.key, "doc-1");

        store.rename_cohort_key(&def.key, def.clone().with_label("Stable"));

        assert!(store.player(&def.key, "doc-1").is_some());
        assert_eq!(
            store.definition(&def.key).unwrap().label.as_deref(),
            Some("Stable")
        );
    }

    #[test]
    fn remove_cohort_clears_data_def_and_pointer() {
        let mut store = RatingStore::new(EngineSettings::default());
        let def = folder_def("gone");
        store.upsert_cohort_def(def.clone());
        store.ensure_player(&def.key, "doc-1");
        store.set_last_used_cohort_key(Some(&def.key));

        assert!(store.remove_cohort(&def.key));
        assert!(store.cohort(&def.key).is_none());
        assert!(store.definition(&def.key).is_none());
        assert!(store.last_used_cohort_key().is_none());
        assert!(!store.remove_cohort(&def.key));
    }
}
