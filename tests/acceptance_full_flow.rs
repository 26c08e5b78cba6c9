//! End-to-end session flow against real sled storage: resolve members, pick
//! pairs, record judgments, rank, undo, persist, reopen.

use std::sync::Arc;

use tempfile::tempdir;

use ranking_engine::config::Config;
use ranking_engine::engine::types::MatchOutcome;
use ranking_engine::persist::storage::{SledStorage, SnapshotStorage};
use ranking_engine::session::Session;
use ranking_engine::store::cohort::{CohortDefinition, CohortKind};

fn test_config() -> Config {
    Config {
        save_debounce_ms: 10,
        rng_seed: Some(2024),
        ..Config::default()
    }
}

fn open_storage(dir: &std::path::Path) -> Arc<SledStorage> {
    Arc::new(SledStorage::open(dir.join("rankings.sled").to_str().unwrap()).unwrap())
}

#[tokio::test]
async fn full_session_flow_survives_reopen() {
    let dir = tempdir().unwrap();
    let members: Vec<String> = (0..6).map(|i| format!("doc-{i}")).collect();
    let def = CohortDefinition::new(CohortKind::Folder {
        path: "notes/reviews".into(),
    });
    let key = def.key.clone();

    {
        let storage = open_storage(dir.path());
        let mut session = Session::open(&test_config(), storage);
        session.upsert_cohort_def(def.clone());

        for _ in 0..20 {
            let pair = session.next_pair(&key, &members).expect("pair available");
            assert_ne!(pair.first, pair.second);
            session.record_judgment(&key, &pair.first, &pair.second, MatchOutcome::FirstWins);
        }

        let ranks = session.rank(&key);
        assert!(!ranks.is_empty());
        assert!(ranks.values().any(|&r| r == 1));

        // Undo the last judgment and make sure totals shrink accordingly
        let total_before: u32 = session
            .store()
            .cohort(&key)
            .unwrap()
            .values()
            .map(|r| r.matches)
            .sum();
        assert!(session.undo_last());
        let total_after: u32 = session
            .store()
            .cohort(&key)
            .unwrap()
            .values()
            .map(|r| r.matches)
            .sum();
        assert_eq!(total_before - 2, total_after);

        session.close().await;
    }

    {
        let storage = open_storage(dir.path());
        let session = Session::open(&test_config(), storage);

        assert_eq!(session.store().last_used_cohort_key(), Some(key.as_str()));
        assert!(session.store().definition(&key).is_some());
        let total: u32 = session
            .store()
            .cohort(&key)
            .unwrap()
            .values()
            .map(|r| r.matches)
            .sum();
        // 20 judgments minus the undone one, two participants each
        assert_eq!(total, 38);

        // Undo frames are session-scoped and do not survive a reopen
        let mut session = session;
        assert!(!session.undo_last());
        session.close().await;
    }
}

#[tokio::test]
async fn two_item_cohort_always_pairs_deterministically() {
    let dir = tempdir().unwrap();
    let storage = open_storage(dir.path());
    let mut session = Session::open(&test_config(), storage);

    let members = vec!["a".to_string(), "b".to_string()];
    for _ in 0..10 {
        let pair = session.next_pair("all", &members).unwrap();
        assert_eq!(pair.first, "a");
        assert_eq!(pair.second, "b");
    }
    assert!(session.next_pair("all", &members[..1].to_vec()).is_none());
    assert!(session.next_pair("all", &[]).is_none());
    session.close().await;
}

#[tokio::test]
async fn scenario_single_match_and_revert() {
    let dir = tempdir().unwrap();
    let storage = open_storage(dir.path());

    let mut session = Session::open(&test_config(), storage.clone());
    let mut settings = session.settings().clone();
    settings.heuristics = ranking_engine::engine::config::HeuristicsConfig::disabled();
    settings.elo.base_k = 24.0;
    session.update_settings(settings).unwrap();

    session.record_judgment("all", "a", "b", MatchOutcome::FirstWins);
    {
        let a = session.store().player("all", "a").unwrap();
        let b = session.store().player("all", "b").unwrap();
        assert_eq!(a.rating, 1512.0);
        assert_eq!(b.rating, 1488.0);
        assert_eq!((a.matches, a.wins), (1, 1));
        assert_eq!((b.matches, b.wins), (1, 0));
    }

    assert!(session.undo_last());
    {
        let a = session.store().player("all", "a").unwrap();
        let b = session.store().player("all", "b").unwrap();
        assert_eq!(a.rating, 1500.0);
        assert_eq!(b.rating, 1500.0);
        assert_eq!((a.matches, a.wins), (0, 0));
        assert_eq!((b.matches, b.wins), (0, 0));
    }

    session.close().await;
    assert!(storage.load_snapshot().unwrap().is_some());
}

#[tokio::test]
async fn cohort_rename_preserves_history_across_reopen() {
    let dir = tempdir().unwrap();
    let old_def = CohortDefinition::new(CohortKind::Folder {
        path: "projects/alpha".into(),
    });
    let new_def = CohortDefinition::new(CohortKind::Folder {
        path: "archive/alpha".into(),
    });

    {
        let storage = open_storage(dir.path());
        let mut session = Session::open(&test_config(), storage);
        session.upsert_cohort_def(old_def.clone());
        session.record_judgment(&old_def.key, "x", "y", MatchOutcome::SecondWins);
        session.rename_cohort_key(&old_def.key, new_def.clone());
        session.close().await;
    }

    let storage = open_storage(dir.path());
    let session = Session::open(&test_config(), storage);
    assert!(session.store().cohort(&old_def.key).is_none());
    let migrated = session.store().player(&new_def.key, "y").unwrap();
    assert_eq!(migrated.wins, 1);
    session.close().await;
}
