//! Content tree integration tests.
//!
//! Exercise the full stack (services, request client, session) against
//! the in-memory backend, covering tree/flat consistency and the
//! soft-delete cascade contracts.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use linktoss_api::{MockBackend, Transport};
use linktoss_client::{
    ApiError, CommentCreate, DeckCreate, DropCreate, LinkToss, Provider,
};

fn init_tracing() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

async fn connect() -> (Arc<MockBackend>, LinkToss) {
    init_tracing();
    let backend = Arc::new(MockBackend::new());
    let linktoss = LinkToss::with_transport(Arc::clone(&backend) as Arc<dyn Transport>);
    linktoss
        .users
        .login(Provider::Google, "tester")
        .await
        .unwrap();
    (backend, linktoss)
}

fn named(name: &str) -> DeckCreate {
    DeckCreate {
        name: name.to_string(),
        ..DeckCreate::default()
    }
}

fn child_of(name: &str, parent: &str) -> DeckCreate {
    DeckCreate {
        name: name.to_string(),
        parent: Some(parent.to_string()),
        ..DeckCreate::default()
    }
}

#[tokio::test]
async fn test_tree_and_flat_list_agree_on_sibling_order() {
    let (_backend, linktoss) = connect().await;

    let root = linktoss.decks.create(named("Reading")).await.unwrap();
    for name in ["Papers", "Blogs", "Talks"] {
        linktoss
            .decks
            .create(child_of(name, &root.id))
            .await
            .unwrap();
    }

    let forest = linktoss.decks.load_tree(None).await.unwrap();
    let tree_order: Vec<String> = forest
        .children_of(&root.id)
        .unwrap()
        .iter()
        .map(|c| c.name.clone())
        .collect();

    let flat = linktoss.decks.load_children(Some(&root.id)).await.unwrap();
    let flat_order: Vec<String> = flat.into_iter().map(|d| d.name).collect();

    assert_eq!(tree_order, flat_order);
    assert_eq!(tree_order, vec!["Papers", "Blogs", "Talks"]);
}

#[tokio::test]
async fn test_deck_depths_follow_parent_chain() {
    let (_backend, linktoss) = connect().await;

    let root = linktoss.decks.create(named("Reading")).await.unwrap();
    let child = linktoss
        .decks
        .create(child_of("Papers", &root.id))
        .await
        .unwrap();
    let grandchild = linktoss
        .decks
        .create(child_of("NLP", &child.id))
        .await
        .unwrap();

    assert_eq!(root.depth, 0);
    assert_eq!(child.depth, 1);
    assert_eq!(grandchild.depth, 2);

    let forest = linktoss.decks.load_tree(None).await.unwrap();
    assert_eq!(forest.find(&grandchild.id).unwrap().depth, 2);
}

#[tokio::test]
async fn test_create_drop_appears_exactly_once_on_repeated_fetch() {
    let (_backend, linktoss) = connect().await;

    let deck = linktoss.decks.create(named("Papers")).await.unwrap();
    let drop = linktoss
        .drops
        .create(DropCreate {
            title: "Attention Is All You Need".to_string(),
            url: "https://arxiv.org/abs/1706.03762".to_string(),
            deck: deck.id.clone(),
            tags: vec!["nlp".to_string(), "transformer".to_string()],
            ..DropCreate::default()
        })
        .await
        .unwrap();

    for _ in 0..2 {
        let drops = linktoss.drops.list(&deck.id).await.unwrap();
        assert_eq!(drops.len(), 1);
        assert_eq!(drops[0].id, drop.id);
        assert_eq!(drops[0].tags, vec!["nlp", "transformer"]);
    }
}

// Reading → Papers → the arXiv drop, end to end.
#[tokio::test]
async fn test_example_scenario_tree_and_drop_visibility() {
    let (_backend, linktoss) = connect().await;

    let reading = linktoss.decks.create(named("Reading")).await.unwrap();
    let papers = linktoss
        .decks
        .create(child_of("Papers", &reading.id))
        .await
        .unwrap();
    linktoss
        .drops
        .create(DropCreate {
            title: "Attention Is All You Need".to_string(),
            url: "https://arxiv.org/abs/1706.03762".to_string(),
            deck: papers.id.clone(),
            tags: vec!["nlp".to_string(), "transformer".to_string()],
            ..DropCreate::default()
        })
        .await
        .unwrap();

    // The tree shows the deck chain; drops are visible via the flat list.
    let forest = linktoss.decks.load_tree(None).await.unwrap();
    let root = &forest.roots()[0];
    assert_eq!(root.name, "Reading");
    assert_eq!(root.children[0].name, "Papers");

    let drops = linktoss.drops.list(&papers.id).await.unwrap();
    assert_eq!(drops.len(), 1);
    assert_eq!(drops[0].tags, vec!["nlp", "transformer"]);
}

#[tokio::test]
async fn test_deck_delete_cascades_to_descendants_and_search() {
    let (_backend, linktoss) = connect().await;

    let reading = linktoss.decks.create(named("Reading")).await.unwrap();
    let papers = linktoss
        .decks
        .create(child_of("Papers", &reading.id))
        .await
        .unwrap();
    let keep = linktoss.decks.create(named("Keep")).await.unwrap();
    linktoss
        .drops
        .create(DropCreate {
            title: "Attention Is All You Need".to_string(),
            url: "https://arxiv.org/abs/1706.03762".to_string(),
            deck: papers.id.clone(),
            ..DropCreate::default()
        })
        .await
        .unwrap();

    let mut forest = linktoss.decks.load_tree(None).await.unwrap();
    linktoss
        .decks
        .delete_from(&mut forest, &reading.id)
        .await
        .unwrap();

    // The held view dropped the whole subtree without a reload.
    assert!(!forest.contains(&reading.id));
    assert!(!forest.contains(&papers.id));
    assert!(forest.contains(&keep.id));

    // And every subsequent read agrees: tree, flat list, search.
    let reloaded = linktoss.decks.load_tree(None).await.unwrap();
    assert!(!reloaded.contains(&reading.id));
    assert!(!reloaded.contains(&papers.id));

    let roots = linktoss.decks.load_children(None).await.unwrap();
    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0].id, keep.id);

    let hits = linktoss.drops.search(Some("Attention"), &[]).await.unwrap();
    assert!(hits.is_empty());

    // Deleting again reports the deck as already gone.
    let again = linktoss.decks.delete(&reading.id).await;
    assert!(matches!(again, Err(ApiError::NotFound(_))));
}

#[tokio::test]
async fn test_search_by_query_and_tags() {
    let (_backend, linktoss) = connect().await;

    let deck = linktoss.decks.create(named("Papers")).await.unwrap();
    for (title, tags) in [
        ("Attention Is All You Need", vec!["nlp", "transformer"]),
        ("ResNet", vec!["vision"]),
        ("BERT", vec!["nlp"]),
    ] {
        linktoss
            .drops
            .create(DropCreate {
                title: title.to_string(),
                url: "https://arxiv.org/".to_string(),
                deck: deck.id.clone(),
                tags: tags.into_iter().map(ToOwned::to_owned).collect(),
                ..DropCreate::default()
            })
            .await
            .unwrap();
    }

    let nlp = linktoss
        .drops
        .search(None, &["nlp".to_string()])
        .await
        .unwrap();
    assert_eq!(nlp.len(), 2);

    let attention = linktoss
        .drops
        .search(Some("attention"), &["transformer".to_string()])
        .await
        .unwrap();
    assert_eq!(attention.len(), 1);
    assert_eq!(attention[0].title, "Attention Is All You Need");
}

#[tokio::test]
async fn test_comment_reply_lands_under_parent_not_top_level() {
    let (_backend, linktoss) = connect().await;

    let deck = linktoss.decks.create(named("Papers")).await.unwrap();
    let drop = linktoss
        .drops
        .create(DropCreate {
            title: "Attention Is All You Need".to_string(),
            url: "https://arxiv.org/abs/1706.03762".to_string(),
            deck: deck.id.clone(),
            ..DropCreate::default()
        })
        .await
        .unwrap();

    let top = linktoss
        .comments
        .create(CommentCreate {
            drop: drop.id.clone(),
            content: "seminal".to_string(),
            parent: None,
        })
        .await
        .unwrap();
    let reply = linktoss
        .comments
        .create(CommentCreate {
            drop: drop.id.clone(),
            content: "and readable".to_string(),
            parent: Some(top.id.clone()),
        })
        .await
        .unwrap();

    let forest = linktoss.comments.load_tree(&drop.id).await.unwrap();
    assert_eq!(forest.roots().len(), 1);
    assert_eq!(forest.roots()[0].id, top.id);
    assert_eq!(forest.roots()[0].replies[0].id, reply.id);

    // The flat top-level list shows only the parent, with a reply count.
    let top_level = linktoss.comments.list(&drop.id).await.unwrap();
    assert_eq!(top_level.len(), 1);
    assert_eq!(top_level[0].replies_count, 1);

    let replies = linktoss.comments.replies(&top.id).await.unwrap();
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].id, reply.id);
}

#[tokio::test]
async fn test_comment_delete_cascades_to_reply_subtree() {
    let (_backend, linktoss) = connect().await;

    let deck = linktoss.decks.create(named("Papers")).await.unwrap();
    let drop = linktoss
        .drops
        .create(DropCreate {
            title: "BERT".to_string(),
            url: "https://arxiv.org/abs/1810.04805".to_string(),
            deck: deck.id.clone(),
            ..DropCreate::default()
        })
        .await
        .unwrap();

    let mut forest = linktoss.comments.load_tree(&drop.id).await.unwrap();
    let doomed = linktoss
        .comments
        .create_in(
            &mut forest,
            CommentCreate {
                drop: drop.id.clone(),
                content: "thread root".to_string(),
                parent: None,
            },
        )
        .await
        .unwrap();
    let reply = linktoss
        .comments
        .create_in(
            &mut forest,
            CommentCreate {
                drop: drop.id.clone(),
                content: "first reply".to_string(),
                parent: Some(doomed.id.clone()),
            },
        )
        .await
        .unwrap();
    linktoss
        .comments
        .create_in(
            &mut forest,
            CommentCreate {
                drop: drop.id.clone(),
                content: "nested reply".to_string(),
                parent: Some(reply.id.clone()),
            },
        )
        .await
        .unwrap();
    let survivor = linktoss
        .comments
        .create_in(
            &mut forest,
            CommentCreate {
                drop: drop.id.clone(),
                content: "unrelated".to_string(),
                parent: None,
            },
        )
        .await
        .unwrap();

    linktoss
        .comments
        .delete_from(&mut forest, &doomed.id)
        .await
        .unwrap();

    // Local view and a fresh fetch agree: the whole thread is gone.
    assert!(!forest.contains(&doomed.id));
    assert!(!forest.contains(&reply.id));
    assert!(forest.contains(&survivor.id));

    let reloaded = linktoss.comments.load_tree(&drop.id).await.unwrap();
    assert_eq!(reloaded.flatten().len(), 1);
    assert_eq!(reloaded.roots()[0].id, survivor.id);
}

#[tokio::test]
async fn test_drop_delete_is_terminal_without_cascade() {
    let (_backend, linktoss) = connect().await;

    let deck = linktoss.decks.create(named("Papers")).await.unwrap();
    let doomed = linktoss
        .drops
        .create(DropCreate {
            title: "ResNet".to_string(),
            url: "https://arxiv.org/abs/1512.03385".to_string(),
            deck: deck.id.clone(),
            ..DropCreate::default()
        })
        .await
        .unwrap();
    let survivor = linktoss
        .drops
        .create(DropCreate {
            title: "BERT".to_string(),
            url: "https://arxiv.org/abs/1810.04805".to_string(),
            deck: deck.id.clone(),
            ..DropCreate::default()
        })
        .await
        .unwrap();

    linktoss.drops.delete(&doomed.id).await.unwrap();

    let remaining = linktoss.drops.list(&deck.id).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, survivor.id);

    // The deck itself is untouched.
    assert!(linktoss.decks.get(&deck.id).await.is_ok());

    let gone = linktoss.drops.get(&doomed.id).await;
    assert!(matches!(gone, Err(ApiError::NotFound(_))));
}

#[tokio::test]
async fn test_reparenting_deck_is_rejected_when_cyclic() {
    let (_backend, linktoss) = connect().await;

    let root = linktoss.decks.create(named("Reading")).await.unwrap();
    let child = linktoss
        .decks
        .create(child_of("Papers", &root.id))
        .await
        .unwrap();

    // Making a deck its own descendant's child must fail server-side.
    let result = linktoss
        .decks
        .update(
            &root.id,
            linktoss_client::DeckUpdate {
                parent: Some(Some(child.id.clone())),
                ..linktoss_client::DeckUpdate::default()
            },
        )
        .await;
    assert!(matches!(result, Err(ApiError::BadRequest(_))));
}
