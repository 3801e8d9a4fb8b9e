//! Property-based test generators using proptest.

use crate::model::{Author, Book};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use proptest::prelude::*;
use rust_decimal::Decimal;

/// Strategy for calendar dates between 1900 and 2099.
pub fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (1900..2100i32, 1..=12u32, 1..=28u32)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).expect("Invalid date"))
}

/// Strategy for date-times with whole seconds.
pub fn datetime_strategy() -> impl Strategy<Value = NaiveDateTime> {
    (date_strategy(), 0..24u32, 0..60u32, 0..60u32).prop_map(|(date, h, m, s)| {
        date.and_time(NaiveTime::from_hms_opt(h, m, s).expect("Invalid time"))
    })
}

/// Strategy for amounts spanning a `DECIMAL(19,4)` column.
pub fn money_strategy() -> impl Strategy<Value = Decimal> {
    const MAX: i128 = 9_999_999_999_999_999_999;
    (-MAX..=MAX).prop_map(|units| Decimal::from_i128_with_scale(units, 4))
}

/// Strategy for short printable names.
pub fn name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[A-Za-z][A-Za-z0-9 '.-]{0,40}").expect("Invalid regex")
}

/// Strategy for unsaved authors.
pub fn author_strategy() -> impl Strategy<Value = Author> {
    (
        name_strategy(),
        0..120i32,
        any::<i64>(),
        any::<bool>(),
        prop::option::of(date_strategy()),
        prop::option::of(datetime_strategy()),
        money_strategy(),
    )
        .prop_map(
            |(name, age, followers, active, born, last_seen, royalties)| Author {
                id: None,
                name,
                age,
                followers,
                active,
                born,
                last_seen,
                royalties,
            },
        )
}

/// Strategy for unsaved books without a publisher.
pub fn book_strategy() -> impl Strategy<Value = Book> {
    (name_strategy(), prop::option::of(date_strategy()))
        .prop_map(|(title, published_at)| Book::new(&title, published_at))
}
