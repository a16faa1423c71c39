//! Store round-trips: reindex, reload, and the sharded lexicon layout.

use std::collections::HashMap;
use std::fs;

use telusuri::{BarrelStore, Engine, Hit, Lexicon, Mode, PageRepo};

use crate::common::{config, seed_corpus};

fn corpus_rows() -> Vec<(i64, String)> {
    let mut rows = Vec::new();
    for id in 1..=20i64 {
        rows.push((id, format!("document {id} talks about topic{id:02} and shared matters")));
        rows.push((id, format!("second paragraph for {id} with extra{id:02} words")));
    }
    rows
}

fn build_once(dir: &std::path::Path, use_gst: bool) -> Engine {
    let db = dir.join("corpus.db");
    if !db.exists() {
        let rows = corpus_rows();
        let refs: Vec<(i64, &str)> = rows.iter().map(|(id, t)| (*id, t.as_str())).collect();
        let pages: Vec<(i64, Option<&str>, Option<&str>)> =
            (1..=20i64).map(|id| (id, Some("title shared topic"), None)).collect();
        seed_corpus(&db, &refs, &pages);
    }

    let repo = PageRepo::open(&db).unwrap();
    let mut engine =
        Engine::new(config(Mode::Reindex, use_gst, db, dir.to_path_buf()), Some(repo)).unwrap();
    engine.reindex().unwrap();
    engine
}

#[test]
fn reload_reproduces_the_built_index() {
    let dir = tempfile::tempdir().unwrap();
    let built = build_once(dir.path(), true);

    let db = dir.path().join("corpus.db");
    let repo = PageRepo::open(&db).unwrap();
    let mut loaded =
        Engine::new(config(Mode::Search, true, db, dir.path().to_path_buf()), Some(repo)).unwrap();
    loaded.prepare_search().unwrap();

    assert_eq!(loaded.index().lexicon, built.index().lexicon);
    assert_eq!(loaded.index().doc_word_count, built.index().doc_word_count);
    assert_eq!(loaded.index().doc_pairs, built.index().doc_pairs);
    assert_eq!(loaded.index().common_words, built.index().common_words);
    assert_eq!(loaded.index().doc_blacklist, built.index().doc_blacklist);
}

#[test]
fn rebuilding_twice_is_byte_identical() {
    let dir = tempfile::tempdir().unwrap();

    let _first = build_once(dir.path(), true);
    let store = BarrelStore::new(dir.path());
    let snapshot: HashMap<&str, Vec<u8>> = [
        ("wordpairs", fs::read(store.wordpairs_path()).unwrap()),
        ("docpairs", fs::read(store.docpairs_path()).unwrap()),
        ("gst", fs::read(store.gst_path()).unwrap()),
        ("wordcount", fs::read(store.word_count_path()).unwrap()),
    ]
    .into_iter()
    .collect();

    let _second = build_once(dir.path(), true);
    assert_eq!(fs::read(store.wordpairs_path()).unwrap(), snapshot["wordpairs"]);
    assert_eq!(fs::read(store.docpairs_path()).unwrap(), snapshot["docpairs"]);
    assert_eq!(fs::read(store.gst_path()).unwrap(), snapshot["gst"]);
    assert_eq!(fs::read(store.word_count_path()).unwrap(), snapshot["wordcount"]);
}

#[test]
fn search_mode_without_stores_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("corpus.db");
    seed_corpus(&db, &[(1, "present")], &[]);

    let repo = PageRepo::open(&db).unwrap();
    let mut engine =
        Engine::new(config(Mode::Search, false, db, dir.path().to_path_buf()), Some(repo)).unwrap();
    assert!(engine.prepare_search().is_err());
}

#[test]
fn sixty_four_full_barrels_reassemble_the_lexicon() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = BarrelStore::new(dir.path());

    let mut lexicon = Lexicon::new();
    for i in 0..640u32 {
        lexicon.insert(format!("term{i:05}"), vec![Hit::pack(i, 1, false)]);
    }
    store.store_lexicon(&lexicon).unwrap();

    let barrels = store.load_barrels().unwrap();
    assert_eq!(barrels.len(), 64);
    assert!(barrels.windows(2).all(|w| w[0].key < w[1].key));
    assert!(barrels.iter().all(|b| b.pairs.len() == 10));

    // Concatenating barrels in key order reproduces the sorted lexicon.
    let mut expected: Vec<&String> = lexicon.keys().collect();
    expected.sort_unstable();
    let flattened: Vec<&String> =
        barrels.iter().flat_map(|b| b.pairs.iter().map(|(term, _)| term)).collect();
    assert_eq!(flattened, expected);

    assert_eq!(store.load_lexicon().unwrap(), lexicon);
}

#[test]
fn reindex_replaces_previous_stores() {
    let dir = tempfile::tempdir().unwrap();

    // First build includes the suffix-tree stores.
    let _with_gst = build_once(dir.path(), true);
    let store = BarrelStore::new(dir.path());
    assert!(store.gst_path().exists());

    // A plain rebuild removes them.
    let db = dir.path().join("corpus.db");
    let repo = PageRepo::open(&db).unwrap();
    let mut engine =
        Engine::new(config(Mode::Reindex, false, db, dir.path().to_path_buf()), Some(repo))
            .unwrap();
    engine.reindex().unwrap();
    assert!(!store.gst_path().exists());
    assert!(store.wordpairs_path().exists());
}
