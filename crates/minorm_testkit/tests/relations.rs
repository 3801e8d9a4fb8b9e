//! Parent and child records.

use chrono::Local;
use minorm_core::{Key, ManyToOne, Record};
use minorm_testkit::prelude::*;

fn publisher_with_books(titles: &[&str]) -> (Record<Publisher>, Vec<Record<Book>>) {
    let publisher = Record::new(Publisher::new("P"));
    let today = Some(Local::now().date_naive());
    let books = titles
        .iter()
        .map(|title| {
            let book = Record::new(Book::new(title, today));
            Publisher::publish(&publisher, &book).unwrap();
            book
        })
        .collect();
    (publisher, books)
}

#[test]
fn saving_a_parent_saves_and_links_children() {
    let mut test = TestManager::library();
    let (publisher, books) = publisher_with_books(&["a", "b", "c"]);
    test.save(&publisher).unwrap();

    let publisher_id = publisher.read().id.unwrap();
    for book in &books {
        let book = book.read();
        assert!(book.id.is_some());
        assert_eq!(book.publisher.key().unwrap(), Some(Key::Integer(publisher_id)));
    }
    assert_eq!(test.log.count_prefixed("INSERT INTO book("), 3);
    assert_eq!(test.log.count_prefixed("INSERT INTO publisher("), 1);
}

#[test]
fn saving_a_child_saves_its_parent_once() {
    let mut test = TestManager::library();
    let (publisher, books) = publisher_with_books(&["only"]);
    test.save(&books[0]).unwrap();

    assert!(publisher.read().id.is_some());
    assert!(books[0].read().id.is_some());
    assert_eq!(test.log.count_prefixed("INSERT INTO book("), 1);
    assert_eq!(test.log.count_prefixed("INSERT INTO publisher("), 1);
}

#[test]
fn resolve_loads_an_unlinked_parent() {
    let mut test = TestManager::library();
    let (publisher, books) = publisher_with_books(&["x"]);
    test.save(&publisher).unwrap();
    let publisher_id = publisher.read().id.unwrap();
    let book_id = books[0].read().id.unwrap();
    test.clear_cache();

    let loaded = test.get_by_id::<Book>(book_id).unwrap();
    let link = loaded.read().publisher.clone();
    assert!(link.target().is_none());
    let parent = test.resolve(&link).unwrap().unwrap();
    assert_eq!(parent.read().id, Some(publisher_id));
    assert_eq!(parent.read().name, "P");

    let unset = ManyToOne::<Publisher>::new();
    assert!(test.resolve(&unset).unwrap().is_none());
}

#[test]
fn book_scenario() {
    let mut test = TestManager::library();
    let book = Record::new(Book::new("testBook", Some(Local::now().date_naive())));
    test.save(&book).unwrap();
    let id = book.read().id;
    assert!(id.is_some());

    assert!(test.delete(&book).unwrap());
    assert!(!test.is_record_in_cache::<Book>(id.unwrap()).unwrap());
    assert!(book.read().id.is_none());
    assert_eq!(test.log.count_exact("DELETE FROM book WHERE id = ?"), 1);
}

#[test]
fn publisher_scenario() {
    init_tracing();
    let mut test = TestManager::library();
    let (publisher, books) = publisher_with_books(&["one", "two", "three"]);
    test.save(&publisher).unwrap();

    let publisher_id = publisher.read().id.unwrap();
    let book_ids: Vec<i64> = books.iter().map(|b| b.read().id.unwrap()).collect();

    assert!(test.delete(&publisher).unwrap());

    assert!(publisher.read().id.is_none());
    assert!(publisher.read().books.is_empty());
    assert!(!test.is_record_in_cache::<Publisher>(publisher_id).unwrap());
    assert!(!test.exists_by_id::<Publisher>(publisher_id).unwrap());
    for (book, id) in books.iter().zip(&book_ids) {
        let b = book.read();
        assert!(b.id.is_none());
        assert!(!b.publisher.is_set());
        assert!(!b.title.is_empty());
        assert!(b.published_at.is_some());
        drop(b);
        assert!(!test.is_record_in_cache::<Book>(*id).unwrap());
        assert!(!test.exists_by_id::<Book>(*id).unwrap());
    }
}

#[test]
fn cascade_sweeps_rows_missing_from_the_collection() {
    let mut test = TestManager::library();
    let publisher = Record::new(Publisher::new("Sweep"));
    test.save(&publisher).unwrap();
    let publisher_id = publisher.read().id.unwrap();

    let stray = Record::new(Book {
        title: "stray".into(),
        publisher: ManyToOne::with_key(publisher_id),
        ..Book::default()
    });
    test.save(&stray).unwrap();
    let stray_id = stray.read().id.unwrap();

    assert!(test.delete(&publisher).unwrap());
    assert!(!test.exists_by_id::<Book>(stray_id).unwrap());
    assert!(stray.read().id.is_none());
}

#[test]
fn foreign_key_is_enforced() {
    let mut test = TestManager::library();
    let orphan = Record::new(Book {
        title: "orphan".into(),
        publisher: ManyToOne::with_key(12_345_i64),
        ..Book::default()
    });
    assert!(matches!(test.save(&orphan), Err(OrmError::Driver(_))));
}
