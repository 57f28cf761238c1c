//! End-to-end tests over a filesystem vault
//!
//! Each test lays out a small vault in a temp directory and drives the
//! public API from extraction through publication.

use note_graph::extract::{LinkKind, NoteExtractor};
use note_graph::graph::{
    CompileOptions, EntityKind, GraphCompiler, IdentityStrategy, LocalOpsFactory,
};
use note_graph::publish::mock::{MockAnchorService, MockContentStore, MockWalletSigner};
use note_graph::publish::{
    FsContentStore, FsTransactionOutbox, Network, NotePublisher, PublicationCoordinator,
    PublishDebouncer, PublishSettings, Secret,
};
use note_graph::relations::{infer_relationships, RelationshipGraph, RelationshipKind};
use note_graph::tags::TagIndex;
use note_graph::vault::{FsVaultStore, MockVaultStore, VaultStore};
use std::path::Path;
use std::sync::Arc;

const DEMO: &str = "---\ntitle: \"Demo\"\ntags: [x]\n---\n# Demo\nSome **bold** text. #y\n[[Other]]\n";

fn write(root: &Path, rel: &str, text: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, text).unwrap();
}

fn demo_vault() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "Demo.md", DEMO);
    write(dir.path(), "Other.md", "# Other\nA plain note.");
    write(dir.path(), "Templates/daily.md", "# Daily\n#template");
    write(dir.path(), ".obsidian/workspace.md", "#hidden");
    dir
}

fn settings() -> PublishSettings {
    PublishSettings {
        network: Network::Testnet,
        space_id: "space-e2e".into(),
        author_address: "0x00000000000000000000000000000000000000aa".into(),
        private_key: Some(Secret::new("0xe2e-key")),
        api_url: None,
    }
}

#[tokio::test]
async fn test_demo_note_extraction() {
    let dir = demo_vault();
    let extractor = NoteExtractor::new(Arc::new(FsVaultStore::new(dir.path())));

    let note = extractor.extract_path("Demo.md").await.unwrap();
    assert_eq!(note.title, "Demo");
    assert_eq!(note.tags.iter().collect::<Vec<_>>(), vec!["x", "y"]);
    assert_eq!(note.links.len(), 1);
    assert_eq!(note.links[0].target, "Other");
    assert_eq!(note.links[0].kind, LinkKind::Internal);
    assert!(note.content.contains("Some bold text."));
    assert!(!note.content.contains("**"));
    assert!(!note.content.contains("#y"));
}

#[tokio::test]
async fn test_vault_listing_skips_hidden_and_excluded() {
    let dir = demo_vault();
    let vault = Arc::new(FsVaultStore::new(dir.path()));
    assert_eq!(
        vault.list_note_paths().await.unwrap(),
        vec!["Demo.md", "Other.md", "Templates/daily.md"]
    );

    let outcome = NoteExtractor::new(vault)
        .extract_vault(&["Templates".to_string()])
        .await;
    let titles: Vec<_> = outcome.items.iter().map(|n| n.title.as_str()).collect();
    assert_eq!(titles, vec!["Demo", "Other"]);
    assert!(outcome.is_clean());
}

#[tokio::test]
async fn test_relationships_across_vault() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "Alpha.md", "# Alpha\nSee [[Beta]] #x #y");
    write(dir.path(), "Beta.md", "# Beta\nUnrelated words here #y #z");
    write(dir.path(), "Gamma.md", "# Gamma\nAlone.");

    let notes = NoteExtractor::new(Arc::new(FsVaultStore::new(dir.path())))
        .extract_vault(&[])
        .await
        .items;
    let edges = infer_relationships(&notes);

    let kinds: Vec<_> = edges.iter().map(|e| (e.kind, e.strength)).collect();
    assert_eq!(
        kinds,
        vec![
            (RelationshipKind::DirectLink, 1.0),
            (RelationshipKind::SharedTags, 0.5),
        ]
    );

    let graph = RelationshipGraph::build(&notes, &edges);
    assert_eq!(graph.isolated_notes(), vec!["Gamma.md"]);
    let clusters = graph.connected_components();
    assert_eq!(clusters[0].members, vec!["Alpha.md", "Beta.md"]);
}

#[tokio::test]
async fn test_compile_demo_note() {
    let dir = demo_vault();
    let note = NoteExtractor::new(Arc::new(FsVaultStore::new(dir.path())))
        .extract_path("Demo.md")
        .await
        .unwrap();
    let compiler = GraphCompiler::new(Arc::new(LocalOpsFactory::new()));

    let compiled = compiler.compile(&note, &CompileOptions::default());
    assert_eq!(compiled.entities.len(), 1 + 2 + 1);
    assert_eq!(compiled.relations.len(), 2 + 1);
    assert_eq!(compiled.entities[0].kind, EntityKind::Note);
    assert_eq!(compiled.entities[0].name, "Demo");
    assert_eq!(compiled.flatten_ops().len(), 22);

    let without_tags = compiler.compile(
        &note,
        &CompileOptions {
            include_tags: false,
            ..CompileOptions::default()
        },
    );
    assert!(without_tags
        .entities
        .iter()
        .all(|e| e.kind != EntityKind::Tag));
    assert_eq!(without_tags.relations.len(), 1);
}

#[tokio::test]
async fn test_path_keyed_ids_survive_recompilation() {
    let dir = demo_vault();
    let note = NoteExtractor::new(Arc::new(FsVaultStore::new(dir.path())))
        .extract_path("Demo.md")
        .await
        .unwrap();
    let compiler = GraphCompiler::new(Arc::new(LocalOpsFactory::new()));
    let options = CompileOptions {
        identity: IdentityStrategy::PathKeyed,
        ..CompileOptions::default()
    };

    let first = compiler.compile(&note, &options);
    let second = compiler.compile(&note, &options);
    let ids = |c: &note_graph::graph::CompiledNote| {
        c.entities.iter().map(|e| e.id.clone()).collect::<Vec<_>>()
    };
    assert_eq!(ids(&first), ids(&second));
    assert_eq!(first.flatten_ops().len(), second.flatten_ops().len());
}

#[tokio::test]
async fn test_tag_rename_rewrites_files() {
    let dir = demo_vault();
    let index = TagIndex::new(Arc::new(FsVaultStore::new(dir.path())));

    let tags: Vec<_> = index.all_tags().await.into_iter().map(|t| t.name).collect();
    assert!(tags.contains(&"y".to_string()));

    let outcome = index.rename_tag("y", "why").await.unwrap();
    assert_eq!(outcome.items, vec!["Demo.md"]);

    let text = std::fs::read_to_string(dir.path().join("Demo.md")).unwrap();
    assert!(text.contains("text. #why"));
    assert!(index.tag("y").await.is_none());
    assert_eq!(index.tag("why").await.unwrap().count, 1);
}

#[tokio::test]
async fn test_tag_cache_scans_once_until_mutation() {
    let vault = Arc::new(MockVaultStore::new());
    vault.insert("a.md", "#alpha #beta").await;
    let index = TagIndex::new(vault.clone());

    index.all_tags().await;
    index.all_tags().await;
    assert_eq!(vault.list_calls(), 1);

    index.rename_tag("alpha", "gamma").await.unwrap();
    let after = vault.list_calls();
    let tags: Vec<_> = index.all_tags().await.into_iter().map(|t| t.name).collect();
    assert_eq!(vault.list_calls(), after + 1);
    assert_eq!(tags, vec!["beta", "gamma"]);
}

#[tokio::test]
async fn test_publish_vault_through_mocks() {
    let dir = demo_vault();
    let content = Arc::new(MockContentStore::new());
    let anchor = Arc::new(MockAnchorService::new());
    let signer = Arc::new(MockWalletSigner::new());
    let coordinator = PublicationCoordinator::new(
        settings(),
        Arc::new(FsVaultStore::new(dir.path())),
        Arc::new(LocalOpsFactory::new()),
        content.clone(),
        anchor.clone(),
        signer.clone(),
    )
    .with_excluded_folders(vec!["Templates".into()]);

    let outcome = coordinator.publish_vault().await.unwrap();
    assert_eq!(outcome.items.len(), 2);
    assert!(outcome.is_clean());

    let names: Vec<_> = content.requests().await.into_iter().map(|r| r.name).collect();
    assert_eq!(names, vec!["Demo", "Other"]);
    assert_eq!(anchor.calls().await.len(), 2);
    assert_eq!(signer.sent().await.len(), 2);

    let receipt = coordinator.publish_note("Other.md").await.unwrap();
    assert_eq!(receipt.content_id, "ipfs://mock-cid-3");
}

#[tokio::test]
async fn test_local_content_store_with_coordinator() {
    let dir = demo_vault();
    let out = tempfile::tempdir().unwrap();
    let store = Arc::new(FsContentStore::new(out.path()));
    let coordinator = PublicationCoordinator::new(
        settings(),
        Arc::new(FsVaultStore::new(dir.path())),
        Arc::new(LocalOpsFactory::new()),
        store.clone(),
        Arc::new(MockAnchorService::new()),
        Arc::new(MockWalletSigner::new()),
    );

    let receipt = coordinator.publish_note("Demo.md").await.unwrap();
    let stored = store.load(&receipt.content_id).await.unwrap();
    assert_eq!(stored.name, "Demo");
    assert_eq!(stored.ops.len(), 22);
    assert_eq!(stored.network, Network::Testnet);
}

#[tokio::test]
async fn test_debounced_publish_queues_one_transaction_per_note() {
    let dir = demo_vault();
    let out = tempfile::tempdir().unwrap();
    let store = Arc::new(FsContentStore::new(out.path().join("ops")));
    let outbox = Arc::new(FsTransactionOutbox::new(
        out.path().join("transactions"),
        settings().author_address,
    ));
    let coordinator = Arc::new(PublicationCoordinator::new(
        settings(),
        Arc::new(FsVaultStore::new(dir.path())),
        Arc::new(LocalOpsFactory::new()),
        store,
        Arc::new(MockAnchorService::new()),
        outbox.clone(),
    ));

    let debouncer = PublishDebouncer::new(coordinator, 50);
    for _ in 0..5 {
        debouncer.trigger("Demo.md");
    }
    debouncer.trigger("Other.md");
    debouncer.shutdown().await;

    let queued = std::fs::read_dir(outbox.dir()).unwrap().count();
    assert_eq!(queued, 2);
}
