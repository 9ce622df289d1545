use super::*;
use pretty_assertions::assert_eq;
use rayon::prelude::*;

#[test]
fn test_handle_keeps_entry_alive() {
    let pool = Arc::new(IdentifierPool::new());
    let handle = Handle::insert(&pool, 42_i32);
    assert_eq!(*handle.get().unwrap(), 42);
    assert_eq!(pool.reference_count(handle.id()), Some(1));
    assert_eq!(pool.len(), 1);
}

#[test]
fn test_clone_adds_reference_and_drop_removes() {
    let pool = Arc::new(IdentifierPool::new());
    let handle = Handle::insert(&pool, "t");
    let copy = handle.clone();
    assert_eq!(pool.reference_count(handle.id()), Some(2));
    assert_eq!(copy, handle);

    drop(copy);
    assert_eq!(pool.reference_count(handle.id()), Some(1));
    assert_eq!(pool.len(), 1);
}

#[test]
fn test_last_drop_evicts() {
    let pool = Arc::new(IdentifierPool::new());
    let handle = Handle::insert(&pool, 1_u8);
    let id = handle.id();
    drop(handle);

    assert!(pool.is_empty());
    assert_eq!(pool.get(id), None);
    assert_eq!(pool.reference_count(id), None);
}

#[test]
fn test_reused_slot_bumps_generation() {
    let pool = Arc::new(IdentifierPool::new());
    let first = Handle::insert(&pool, 1_u32);
    let stale = first.id();
    drop(first);

    let second = Handle::insert(&pool, 2_u32);
    assert_eq!(second.id().index(), stale.index());
    assert_ne!(second.id(), stale);
    assert_eq!(second.id().generation(), stale.generation() + 1);

    // Stale id must not observe the new entry.
    assert_eq!(pool.get(stale), None);
    assert!(Handle::new(&pool, stale).is_none());
    assert!(!pool.add_reference(stale));
    assert_eq!(*second.get().unwrap(), 2);
}

#[test]
fn test_remove_reference_on_unreferenced_entry_is_rejected() {
    let pool: IdentifierPool<i32> = IdentifierPool::new();
    let id = pool.add(5);
    assert!(!pool.remove_reference(id));
    assert_eq!(pool.get(id).map(|v| *v), Some(5));
}

#[test]
fn test_handles_from_different_pools_differ() {
    let a = Arc::new(IdentifierPool::new());
    let b = Arc::new(IdentifierPool::new());
    let ha = Handle::insert(&a, 0_i32);
    let hb = Handle::insert(&b, 0_i32);
    assert_eq!(ha.id(), hb.id());
    assert_ne!(ha, hb);
}

#[test]
fn test_concurrent_clone_and_drop_balance() {
    let pool = Arc::new(IdentifierPool::new());
    let handle = Handle::insert(&pool, String::from("shared"));

    (0..64).into_par_iter().for_each(|_| {
        let copies: Vec<_> = (0..32).map(|_| handle.clone()).collect();
        drop(copies);
    });

    assert_eq!(pool.reference_count(handle.id()), Some(1));
    let id = handle.id();
    drop(handle);
    assert_eq!(pool.get(id), None);
}

#[test]
fn test_evicting_entry_that_holds_handles_into_same_pool() {
    // An entry whose drop releases another handle from the same pool must
    // not deadlock.
    struct Node(Option<Handle<Node>>);

    let pool = Arc::new(IdentifierPool::new());
    let leaf = Handle::insert(&pool, Node(None));
    let parent = Handle::insert(&pool, Node(Some(leaf.clone())));
    drop(leaf);
    assert_eq!(pool.len(), 2);
    assert!(parent.get().unwrap().0.is_some());

    drop(parent);
    assert!(pool.is_empty());
}
