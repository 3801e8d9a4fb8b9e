//! Identity cache behaviour seen through the manager.

use minorm_core::{Config, Record};
use minorm_testkit::prelude::*;

fn saved_books(test: &mut TestManager, titles: &[&str]) -> Vec<Record<Book>> {
    titles
        .iter()
        .map(|title| {
            let book = Record::new(Book::new(title, None));
            test.save(&book).unwrap();
            book
        })
        .collect()
}

#[test]
fn cached_lookup_issues_no_query() {
    let mut test = TestManager::library();
    let book = saved_books(&mut test, &["Cached"]).remove(0);
    let id = book.read().id.unwrap();
    test.log.clear();

    let before = test.stats().snapshot();
    let found = test.find_by_id::<Book>(id).unwrap().unwrap();
    let after = test.stats().snapshot();

    assert!(found.ptr_eq(&book));
    assert_eq!(after.queries, before.queries);
    assert_eq!(after.cache_hits, before.cache_hits + 1);
    assert_eq!(test.log.count_prefixed("SELECT"), 0);
}

#[test]
fn iteration_and_lookup_share_instances() {
    let mut test = TestManager::library();
    saved_books(&mut test, &["One", "Two", "Three"]);
    test.clear_cache();

    let iterated: Vec<Record<Book>> = test
        .find_all_as_iterable::<Book>()
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(iterated.len(), 3);

    let before = test.stats().snapshot();
    for book in &iterated {
        let id = book.read().id.unwrap();
        let found = test.find_by_id::<Book>(id).unwrap().unwrap();
        assert!(found.ptr_eq(book));
    }
    assert_eq!(test.stats().snapshot().queries, before.queries);

    let again = test.find_all::<Book>().unwrap();
    assert!(again.iter().all(|a| iterated.iter().any(|b| a.ptr_eq(b))));
}

#[test]
fn stream_and_early_close() {
    let mut test = TestManager::library();
    saved_books(&mut test, &["A", "B", "C", "D"]);
    test.clear_cache();

    assert_eq!(test.find_all_as_stream::<Book>().unwrap().count(), 4);

    let mut results = test.find_all_as_iterable::<Book>().unwrap();
    assert!(results.advance().unwrap().is_some());
    results.close();
    assert!(results.is_closed());
    assert!(results.advance().unwrap().is_none());
}

#[test]
fn disabled_cache_loads_fresh_instances() {
    let mut test = TestManager::memory_with_config(Config::new().cache_enabled(false));
    test.register(&library_classes()).unwrap();
    let book = saved_books(&mut test, &["Uncached"]).remove(0);
    let id = book.read().id.unwrap();

    let first = test.get_by_id::<Book>(id).unwrap();
    let second = test.get_by_id::<Book>(id).unwrap();
    assert!(!first.ptr_eq(&second));
    assert!(test.cache().is_empty());
}

#[test]
fn missing_rows() {
    let mut test = TestManager::library();
    assert!(test.find_by_id::<Book>(99).unwrap().is_none());
    let err = test.get_by_id::<Book>(99).unwrap_err();
    assert!(err.is_not_found());
    assert!(!test.exists_by_id::<Book>(99).unwrap());
}
