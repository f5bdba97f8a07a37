use std::collections::HashSet;
use std::sync::Arc;

use calluna::{
    Document, PrecomputedVectors, QueryRecord, Ranker, RankerConfig, SearchEngine,
    SearchEngineConfig,
};

fn docs_from(entries: &[(u64, &str)]) -> Vec<Document> {
    entries
        .iter()
        .map(|(id, text)| Document::new(*id, text.split_whitespace()))
        .collect()
}

fn candidate_set(engine: &SearchEngine, query: &str) -> HashSet<u64> {
    engine.process_query(query).unwrap().into_iter().collect()
}

#[test]
fn test_de_morgan_equivalences() -> calluna::Result<()> {
    let docs = docs_from(&[
        (1, "apple banana"),
        (2, "banana cherry"),
        (3, "cherry apple"),
        (4, "date elderberry"),
    ]);
    let engine = SearchEngine::build(&docs, SearchEngineConfig::default())?;

    let lhs = candidate_set(&engine, "NOT ( apple AND banana )");
    let rhs = candidate_set(&engine, "( NOT apple ) OR ( NOT banana )");
    assert_eq!(lhs, rhs);

    let lhs = candidate_set(&engine, "NOT ( apple OR banana )");
    let rhs = candidate_set(&engine, "( NOT apple ) AND ( NOT banana )");
    assert_eq!(lhs, rhs);
    assert_eq!(lhs, HashSet::from([4]));
    Ok(())
}

#[test]
fn test_wildcard_sound_and_complete() -> calluna::Result<()> {
    // Every vocabulary term matching the literal regex c.*t must be found,
    // and nothing else.
    let docs = docs_from(&[
        (1, "cat cart coat"),
        (2, "chart cost city"),
        (3, "dog catalog crate"),
    ]);
    let engine = SearchEngine::build(&docs, SearchEngineConfig::default())?;

    let matches = engine.package().find_wildcard_matches("c*t")?;
    assert_eq!(matches, ["cart", "cat", "chart", "coat", "cost"]);

    // "catalog" and "crate" do not end in t; "city" does not either, but
    // c*t* accepts it.
    let matches = engine.package().find_wildcard_matches("c*t*")?;
    assert_eq!(
        matches,
        ["cart", "cat", "catalog", "chart", "city", "coat", "cost", "crate"]
    );
    Ok(())
}

#[test]
fn test_proximity_distance_conventions() -> calluna::Result<()> {
    let docs = docs_from(&[
        (1, "a b"),
        (2, "a x b"),
        (3, "a x x b"),
        (4, "b a"),
    ]);
    let engine = SearchEngine::build(&docs, SearchEngineConfig::default())?;

    // NEAR/0 means zero intervening tokens, in either order.
    assert_eq!(candidate_set(&engine, "a NEAR/0 b"), HashSet::from([1, 4]));
    assert_eq!(candidate_set(&engine, "a NEAR/1 b"), HashSet::from([1, 2, 4]));
    assert_eq!(
        candidate_set(&engine, "a NEAR/2 b"),
        HashSet::from([1, 2, 3, 4])
    );
    Ok(())
}

#[test]
fn test_phrase_span_proximity() -> calluna::Result<()> {
    let docs = docs_from(&[
        (1, "machine learning beats manual tuning"),
        (2, "manual machine learning tuning"),
    ]);
    let engine = SearchEngine::build(&docs, SearchEngineConfig::default())?;

    // Doc 1: phrase span 0..1, "tuning" at 4 -> two tokens between.
    // Doc 2: phrase span 1..2, "tuning" at 3 -> adjacent.
    assert_eq!(
        candidate_set(&engine, "\"machine learning\" NEAR/0 tuning"),
        HashSet::from([2])
    );
    assert_eq!(
        candidate_set(&engine, "\"machine learning\" NEAR/2 tuning"),
        HashSet::from([1, 2])
    );
    Ok(())
}

#[test]
fn test_ranked_output_is_byte_identical_across_runs() -> calluna::Result<()> {
    let docs = docs_from(&[
        (7, "ranking signals and lexical weights"),
        (3, "lexical ranking of candidate documents"),
        (11, "unrelated content entirely"),
        (5, "ranking ranking ranking"),
    ]);
    let engine = SearchEngine::build(&docs, SearchEngineConfig::default())?;

    let record = QueryRecord {
        qid: "Q".into(),
        query: "lexical ranking".into(),
    };
    let first = serde_json::to_string(&engine.search(&record)).unwrap();
    let second = serde_json::to_string(&engine.search(&record)).unwrap();
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn test_tied_scores_order_by_ascending_doc_id() -> calluna::Result<()> {
    let docs = docs_from(&[(42, "same text"), (17, "same text"), (99, "same text")]);
    let engine = SearchEngine::build(&docs, SearchEngineConfig::default())?;

    let out = engine.search(&QueryRecord {
        qid: "Q".into(),
        query: "same".into(),
    });
    assert_eq!(out.doc_ids, [17, 42, 99]);
    Ok(())
}

#[test]
fn test_semantic_budget_top20_by_lexical_score() -> calluna::Result<()> {
    // 50 candidates; exactly the 20 lexically strongest get refined.
    let mut entries = Vec::new();
    for id in 1..=50u64 {
        // Descending term frequency with the id so the lexical order is
        // 1, 2, ..., 50 and the budget boundary is unambiguous.
        let mut text = "topic ".repeat(51 - id as usize);
        text.push_str(&"pad ".repeat(id as usize));
        entries.push((id, text));
    }
    let docs: Vec<Document> = entries
        .iter()
        .map(|(id, text)| Document::new(*id, text.split_whitespace()))
        .collect();

    let mut provider = PrecomputedVectors::new();
    provider.insert_word_vector("topic", vec![1.0, 0.0])?;
    for id in 1..=50u64 {
        provider.insert_document_vector(id, vec![1.0, 0.0])?;
    }

    let config = SearchEngineConfig::default();
    let plain_engine = SearchEngine::build(&docs, config.clone())?;
    let engine = SearchEngine::build(&docs, config)?.with_semantic_provider(Arc::new(provider));

    let candidates: Vec<u64> = (1..=50).collect();
    let query = vec!["topic".to_string()];
    let plain = plain_engine.rank_documents(&candidates, &query);
    let refined = engine.rank_documents(&candidates, &query);

    let score_of = |result: &calluna::RankedResult, id: u64| {
        result.scores[result.doc_ids.iter().position(|&d| d == id).unwrap()]
    };
    let refined_ids: Vec<u64> = (1..=50u64)
        .filter(|&id| (score_of(&refined, id) - score_of(&plain, id)).abs() > 1e-12)
        .collect();
    assert_eq!(refined_ids, (1..=20u64).collect::<Vec<_>>());
    Ok(())
}

#[test]
fn test_ranker_default_budget_is_twenty() {
    let config = RankerConfig::default();
    assert_eq!(config.semantic_budget, 20);
    let _ranker = Ranker::new(config);
}
