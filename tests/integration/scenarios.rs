//! Query scenarios over freshly built indexes.

use telusuri::{Engine, Error, Mode, PageRepo};

use crate::common::{config, seed_corpus};

fn engine_over(
    paragraphs: &[(i64, &str)],
    pages: &[(i64, Option<&str>, Option<&str>)],
    use_gst: bool,
) -> (tempfile::TempDir, Engine) {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("corpus.db");
    seed_corpus(&db, paragraphs, pages);

    let repo = PageRepo::open(&db).unwrap();
    let mut engine =
        Engine::new(config(Mode::Reindex, use_gst, db, dir.path().to_path_buf()), Some(repo))
            .unwrap();
    engine.reindex().unwrap();
    (dir, engine)
}

#[test]
fn two_documents_both_match_exactly() {
    let (_dir, mut engine) = engine_over(
        &[(1, "the quick brown fox"), (2, "a quick brown cat")],
        &[
            (1, Some("Fox Page"), Some("https://example.test/fox")),
            (2, Some("Cat Page"), Some("https://example.test/cat")),
        ],
        false,
    );

    let results = engine.search("quick brown");
    assert_eq!(results.len(), 2);
    for result in &results {
        assert!((result.score - 1.0).abs() < 1e-9);
    }

    let fox = results.iter().find(|r| r.doc_id == 1).unwrap();
    assert_eq!(fox.title, "Fox Page");
    assert_eq!(fox.url, "https://example.test/fox");
}

#[test]
fn partial_match_scores_two_thirds_with_bonus() {
    let (_dir, mut engine) =
        engine_over(&[(1, "quick red fox")], &[(1, Some("Red"), None)], false);

    let results = engine.search("quick brown fox");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].doc_id, 1);
    // Two of three query terms land: 2/3 + (2/3)/15.
    let expected = 2.0 / 3.0 + (2.0 / 3.0) / 15.0;
    assert!((results[0].score - expected).abs() < 1e-9);
}

#[test]
fn lowercase_query_reaches_capitalized_term() {
    let (_dir, mut engine) = engine_over(
        &[(1, "NASA launched a rocket")],
        &[(1, Some("Launch Report"), Some("https://example.test/nasa"))],
        false,
    );

    let results = engine.search("nasa");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].doc_id, 1);
    assert!((results[0].score - 1.0).abs() < 1e-9);
}

#[test]
fn wordiest_documents_never_surface() {
    let mut paragraphs: Vec<(i64, String)> = Vec::new();
    for id in 1..=95i64 {
        paragraphs.push((id, format!("shared alpha{id:03} beta{id:03}")));
    }
    // Five documents with the largest word counts, all distinct.
    for (offset, id) in (96..=100i64).enumerate() {
        let mut text = "shared".to_string();
        for _ in 0..(10 + offset) {
            text.push_str(" padding");
        }
        paragraphs.push((id, text));
    }

    let rows: Vec<(i64, &str)> = paragraphs.iter().map(|(id, t)| (*id, t.as_str())).collect();
    let (_dir, mut engine) = engine_over(&rows, &[], false);

    assert_eq!(engine.index().doc_blacklist.len(), 5);

    let results = engine.search("shared");
    assert_eq!(results.len(), 95);
    assert!(results.iter().all(|r| r.doc_id <= 95));
}

#[test]
fn suffix_tree_ranks_exact_above_partial() {
    let (_dir, mut engine) = engine_over(
        &[(1, "machine learning"), (2, "machine vision")],
        &[
            (1, Some("machine learning"), Some("https://example.test/ml")),
            (2, Some("machine vision"), Some("https://example.test/mv")),
        ],
        true,
    );

    let results = engine.search("machine learning");
    assert_eq!(results.len(), 2);

    assert_eq!(results[0].doc_id, 1);
    assert!((results[0].score - 1.0).abs() < 1e-9);

    assert_eq!(results[1].doc_id, 2);
    let partial = 0.5 + 0.5 / 15.0;
    assert!((results[1].score - partial).abs() < 1e-9);
}

#[test]
fn doc_id_past_the_limit_fails_the_build() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("corpus.db");
    seed_corpus(&db, &[(524_288, "one word too many")], &[]);

    let repo = PageRepo::open(&db).unwrap();
    let mut engine =
        Engine::new(config(Mode::Reindex, false, db, dir.path().to_path_buf()), Some(repo))
            .unwrap();
    assert!(matches!(engine.reindex(), Err(Error::DocIdOverflow(524_288))));
}

#[test]
fn doc_id_at_the_limit_builds() {
    let (_dir, mut engine) =
        engine_over(&[(524_287, "fits exactly here")], &[], false);
    let results = engine.search("fits exactly");
    assert_eq!(results[0].doc_id, 524_287);
}

#[test]
fn empty_query_is_empty_result() {
    let (_dir, mut engine) = engine_over(&[(1, "some words")], &[], false);
    assert!(engine.search("").is_empty());
    assert!(engine.search("   ").is_empty());
}

#[test]
fn unknown_terms_only_is_empty_result() {
    let (_dir, mut engine) = engine_over(&[(1, "alpha beta gamma")], &[], false);
    // Nothing similar above the floor either.
    assert!(engine.search("zzz qqq").is_empty());
}

#[test]
fn results_survive_missing_page_metadata() {
    // Page 2 has no page_information row: score still reported, title empty.
    let (_dir, mut engine) = engine_over(
        &[(1, "quick brown"), (2, "quick brown")],
        &[(1, Some("Known"), Some("https://example.test/1"))],
        false,
    );

    let results = engine.search("quick brown");
    assert_eq!(results.len(), 2);
    let unknown = results.iter().find(|r| r.doc_id == 2).unwrap();
    assert!(unknown.title.is_empty());
    assert!(unknown.url.is_empty());
}
