//! Saving then loading reproduces every mapped field.

use minorm_core::Record;
use minorm_testkit::prelude::*;
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn author_round_trip(author in author_strategy()) {
        let mut test = TestManager::library();
        let record = Record::new(author.clone());
        test.save(&record).unwrap();
        let id = record.read().id;
        prop_assert!(id.is_some());

        test.clear_cache();
        let loaded = test.get_by_id::<Author>(id.unwrap()).unwrap();
        prop_assert!(!loaded.ptr_eq(&record));
        prop_assert_eq!(loaded.snapshot(), Author { id, ..author });
    }

    #[test]
    fn book_round_trip(book in book_strategy()) {
        let mut test = TestManager::library();
        let record = Record::new(book.clone());
        test.save(&record).unwrap();
        let id = record.read().id.unwrap();

        test.clear_cache();
        let loaded = test.get_by_id::<Book>(id).unwrap();
        let loaded = loaded.read();
        prop_assert_eq!(&loaded.title, &book.title);
        prop_assert_eq!(loaded.published_at, book.published_at);
        prop_assert!(!loaded.publisher.is_set());
    }
}

#[test]
fn wide_decimals_keep_every_digit() {
    let mut test = TestManager::library();
    for royalties in ["123456789012345.6789", "-999999999999999.9999", "0.1234"] {
        let author = Record::new(Author {
            royalties: royalties.parse().unwrap(),
            ..Author::default()
        });
        test.save(&author).unwrap();
        let id = author.read().id.unwrap();

        test.clear_cache();
        let loaded = test.get_by_id::<Author>(id).unwrap();
        assert_eq!(loaded.read().royalties.to_string(), royalties);
    }
}

#[test]
fn file_database_outlives_the_manager() {
    let mut test = TestManager::file();
    test.register(&library_classes()).unwrap();
    let book = Record::new(Book::new("Persistent", None));
    test.save(&book).unwrap();
    let id = book.read().id.unwrap();

    let mut other = test.reopen();
    let loaded = other.get_by_id::<Book>(id).unwrap();
    assert_eq!(loaded.read().title, "Persistent");
    assert!(test.path().is_some_and(|p| p.exists()));
}
