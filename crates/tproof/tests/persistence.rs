//! Persisting and restoring a chain through both store backends.

use std::sync::Arc;

use tproof::registry::VerificationStatus;
use tproof::store::{InsertResult, JournalEntry, MemoryStore, SqliteStore, Store, StoreExt};
use tproof::{
    Chain, Clock, Component, ContentHash, Deployment, Principal, TProofConfig, TProofError,
    ARWEAVE_V1,
};

const T0: i64 = 1_700_000_000;

fn p(b: u8) -> Principal {
    Principal::from_bytes([b; 32])
}

fn config() -> TProofConfig {
    let mut config = TProofConfig::with_admin(p(1));
    config.ledger.chain_scope = 7;
    config.pricing.mint_price = 5;
    config.pricing.verification_price = 2;
    config.withdraw_wallet = Some(p(9));
    config.collection_alias = Some("Seven".into());
    config.genesis_time = T0;
    config
}

fn deploy<S: Store>(store: &Arc<S>) -> Chain<S> {
    Deployment::deploy(&config())
        .unwrap()
        .into_chain(Arc::clone(store), Clock::manual(T0))
}

/// Drive a chain through a representative mix of transactions.
fn populate<S: Store>(chain: &mut Chain<S>) {
    chain.fund(p(2), 100).unwrap();
    let created = chain
        .create_proofs(
            p(2),
            12,
            &[ContentHash::digest(b"a"), ContentHash::digest(b"b")],
            &["a".into(), "b".into()],
            &[true, false],
            &[ARWEAVE_V1.into(), ARWEAVE_V1.into()],
            p(2),
            p(2),
        )
        .unwrap();
    chain
        .set_description(p(2), &[created.token_ids[1].into()], &["second".into()])
        .unwrap();
    chain.transfer(p(2), p(3), created.token_ids[1]).unwrap();
    chain.set_verification_price(p(1), 3).unwrap();
    chain.pause(p(1), Component::Registry).unwrap();
    chain.withdraw(p(9)).unwrap();
}

async fn assert_restores<S: Store>(store: Arc<S>) {
    let mut original = deploy(&store);
    populate(&mut original);

    let height = original.persist().await.unwrap();
    assert_eq!(height, original.height());
    assert_eq!(height, 7);
    assert!(original.unpersisted().is_empty());

    let restored = Chain::restore(Arc::clone(&store), &config(), Clock::manual(T0))
        .await
        .unwrap();
    assert_eq!(restored.state(), original.state());
    assert_eq!(restored.height(), height);
    assert_eq!(restored.balance_of(&p(2)), 88);
    assert_eq!(restored.balance_of(&p(9)), 12);
    assert!(restored.registry().is_paused());
    assert_eq!(restored.router().pricing().verification_price, 3);
    assert_eq!(
        restored.aliases().alias_of(&restored.ledger().principal()),
        Some("Seven")
    );

    let ids = restored.ledger().tokens_of(&p(3));
    assert_eq!(ids.len(), 1);
    assert_eq!(restored.ledger().description(ids[0]).unwrap(), "second");
    assert_eq!(
        restored.token_uri(ids[0]).unwrap(),
        original.token_uri(ids[0]).unwrap()
    );
    assert_eq!(
        restored.verification_status(&ContentHash::digest(b"a")),
        Some(VerificationStatus::Pending)
    );

    let journal = store.journal().await.unwrap();
    assert_eq!(journal.len() as u64, height);
    assert_eq!(journal[0].entry_point, "fund");
    assert_eq!(journal[1].entry_point, "create_proofs");
    assert_eq!(journal[1].caller, p(2));
    assert_eq!(journal[1].value, 12);
}

#[tokio::test]
async fn test_restore_from_memory_store() {
    assert_restores(Arc::new(MemoryStore::new())).await;
}

#[tokio::test]
async fn test_restore_from_sqlite_store() {
    assert_restores(Arc::new(SqliteStore::open_memory().unwrap())).await;
}

#[tokio::test]
async fn test_restore_after_reopening_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tproof.db");

    let expected = {
        let store = Arc::new(SqliteStore::open(&path).unwrap());
        let mut chain = deploy(&store);
        populate(&mut chain);
        chain.persist().await.unwrap();
        chain.state().clone()
    };

    let store = Arc::new(SqliteStore::open(&path).unwrap());
    let mut restored = Chain::restore(store, &config(), Clock::manual(T0 + 60))
        .await
        .unwrap();
    assert_eq!(restored.state(), &expected);

    // The restored chain keeps going from where the journal stopped.
    restored.unpause(p(1), Component::Registry).unwrap();
    assert_eq!(restored.persist().await.unwrap(), expected.height + 1);
    let head = restored.store().journal_head().await.unwrap();
    assert_eq!(head, Some(expected.height + 1));
}

#[tokio::test]
async fn test_persist_is_incremental() {
    let store = Arc::new(MemoryStore::new());
    let mut chain = deploy(&store);

    chain.fund(p(2), 1).unwrap();
    assert_eq!(chain.persist().await.unwrap(), 1);
    chain.fund(p(2), 1).unwrap();
    chain.fund(p(2), 1).unwrap();
    assert_eq!(chain.unpersisted().len(), 2);
    assert_eq!(chain.persist().await.unwrap(), 3);

    assert_eq!(store.journal().await.unwrap().len(), 3);
    assert_eq!(store.get_snapshot("accounts").await.unwrap().unwrap().height, 3);
}

#[tokio::test]
async fn test_foreign_journal_conflicts() {
    let store = Arc::new(MemoryStore::new());
    let foreign = JournalEntry {
        height: 1,
        entry_point: "withdraw".into(),
        caller: p(5),
        value: 0,
        at: T0,
    };
    assert_eq!(store.append_journal(&foreign).await.unwrap(), InsertResult::Inserted);

    let mut chain = deploy(&store);
    chain.fund(p(2), 1).unwrap();
    let err = chain.persist().await.unwrap_err();
    assert!(matches!(err, TProofError::JournalConflict { height: 1 }));
    assert_eq!(chain.unpersisted().len(), 1);
    assert!(store.get_snapshot("ledger").await.unwrap().is_none());
}

#[tokio::test]
async fn test_restore_needs_every_snapshot() {
    let store = Arc::new(MemoryStore::new());
    store.put_snapshot("ledger", 1, b"\xa0", T0).await.unwrap();

    let err = Chain::restore(store, &config(), Clock::manual(T0))
        .await
        .err()
        .unwrap();
    assert!(matches!(err, TProofError::Store(_)));
}

#[test]
fn test_snapshot_is_deterministic() {
    let store = Arc::new(MemoryStore::new());
    let mut a = deploy(&store);
    let mut b = deploy(&store);
    populate(&mut a);
    populate(&mut b);
    assert_eq!(a.snapshot().unwrap(), b.snapshot().unwrap());
}
