//! End-to-end build scenarios against the in-process store.

use std::sync::Arc;

use futures::StreamExt;

use names_search::config::QueryConfig;
use names_search::error::SourceError;
use names_search::source::{parse_line, DocumentSource, ParsedLine};
use names_search::{
    expand, BatchedIndexWriter, IndexStatus, MemoryStore, PrefixQueryService, RefreshPipeline,
    StaticCatalog,
};

async fn build(source: StaticCatalog) -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    RefreshPipeline::new(Arc::new(source), store.clone(), 1000, IndexStatus::new())
        .build()
        .await
        .expect("build failed");
    store
}

#[tokio::test]
async fn test_redis_scenario() {
    let store = build(StaticCatalog::from_names(["redis"])).await;

    assert_eq!(store.members("red").await, vec!["redis"]);
    assert_eq!(store.members("redi").await, vec!["redis"]);
    assert!(!store.contains_key("re").await);

    let service = PrefixQueryService::new(store, &QueryConfig::default());
    assert_eq!(service.query("red").await.unwrap().names, vec!["redis"]);
}

#[tokio::test]
async fn test_three_char_name_is_not_indexed() {
    let store = build(StaticCatalog::from_names(["abc"])).await;
    assert_eq!(store.key_count().await, 0);
}

#[tokio::test]
async fn test_every_prefix_holds_its_name() {
    let names = [
        "express",
        "expression",
        "lodash",
        "lodash.merge",
        "@types/node",
        "ñandú-utils",
    ];
    let store = build(StaticCatalog::from_names(names)).await;

    for name in names {
        for pair in expand(name) {
            let members = store.members(&pair.prefix).await;
            assert!(
                members.iter().any(|m| m == name),
                "{name} missing under {}",
                pair.prefix
            );
        }
    }

    // Shared prefixes collect both names in order
    assert_eq!(store.members("expres").await, vec!["express", "expression"]);
}

const MIXED_BODY: &str = concat!(
    "{\"total_rows\":3,\"offset\":0,\"rows\":[\n",
    "{\"id\":\"webpack\",\"key\":\"webpack\",\"value\":{\"rev\":\"1-a\"}},\n",
    "not-json\n",
    "{\"id\":\"vite\",\"key\":\"vite\",\"value\":{\"rev\":\"2-b\"}}\n",
    "]}\n",
);

#[tokio::test]
async fn test_terminal_line_is_not_an_error() {
    assert!(matches!(parse_line(b"]}"), ParsedLine::Skip));
    assert!(matches!(parse_line(b"]}\n"), ParsedLine::Skip));

    let items: Vec<_> = StaticCatalog::new(MIXED_BODY)
        .fetch()
        .await
        .unwrap()
        .collect()
        .await;
    let malformed: Vec<String> = items
        .iter()
        .filter_map(|item| match item {
            Err(SourceError::Malformed(e)) => Some(e.line.clone()),
            _ => None,
        })
        .collect();

    // Only the garbage row is reported; the closing line is not
    assert_eq!(malformed, vec!["not-json"]);
    assert_eq!(items.len(), 3);
}

#[tokio::test]
async fn test_malformed_and_terminal_lines() {
    let body = MIXED_BODY;
    let store = Arc::new(MemoryStore::new());
    let status = IndexStatus::new();
    let report = RefreshPipeline::new(
        Arc::new(StaticCatalog::new(body)),
        store.clone(),
        1000,
        status.clone(),
    )
    .build()
    .await
    .unwrap();

    assert_eq!(report.documents, 2);
    assert_eq!(report.malformed_records, 1);
    assert_eq!(store.members("web").await, vec!["webpack"]);
    assert_eq!(store.members("vit").await, vec!["vite"]);
    assert_eq!(status.last_build().await, Some(report));
}

#[tokio::test]
async fn test_rebuild_is_idempotent() {
    let store = Arc::new(MemoryStore::new());
    let pipeline = RefreshPipeline::new(
        Arc::new(StaticCatalog::from_names(["redis", "redux"])),
        store.clone(),
        1000,
        IndexStatus::new(),
    );
    pipeline.build().await.unwrap();
    pipeline.build().await.unwrap();

    assert_eq!(store.members("red").await, vec!["redis", "redux"]);
}

#[tokio::test]
async fn test_writer_batch_boundary() {
    let store = Arc::new(MemoryStore::new());
    let mut writer = BatchedIndexWriter::new(store.clone(), 1000);

    for i in 0..1000 {
        writer.add(format!("k{:03}", i % 100), format!("name-{i}"));
    }
    assert!(writer.flush_if_needed().await.unwrap());
    assert_eq!(writer.pending(), 0);
    assert_eq!(store.batches_applied(), 1);
    assert_eq!(store.key_count().await, 100);
}
