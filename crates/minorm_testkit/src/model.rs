//! A small library model used across the integration tests.
//!
//! A `Publisher` owns many `Book`s; an `Author` has a client-generated
//! UUID key and a column of every supported scalar type.

use chrono::{NaiveDate, NaiveDateTime};
use minorm_core::{
    ClassDescriptor, Entity, LinkedRecord, ManyToOne, OneToMany, OrmError, OrmResult, Record,
    Value,
};
use rust_decimal::Decimal;
use uuid::Uuid;

/// A publisher with its books.
#[derive(Debug, Default, Clone)]
pub struct Publisher {
    /// Generated key.
    pub id: Option<i64>,
    /// Display name.
    pub name: String,
    /// Published books.
    pub books: OneToMany<Book>,
}

impl Publisher {
    /// Creates an unsaved publisher.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    /// Adds `book` to this publisher's books.
    pub fn publish(publisher: &Record<Self>, book: &Record<Book>) -> OrmResult<()> {
        let link = ManyToOne::to(publisher)?;
        book.write().publisher = link;
        publisher.write().books.push(book.clone());
        Ok(())
    }
}

impl Entity for Publisher {
    fn class() -> ClassDescriptor {
        ClassDescriptor::new("Publisher")
            .id::<Option<i64>>("id")
            .column::<String>("name")
            .one_to_many::<Book>("books", "publisher")
    }

    fn get_value(&self, field: &str) -> OrmResult<Value> {
        match field {
            "id" => Ok(self.id.into()),
            "name" => Ok(self.name.clone().into()),
            _ => Err(OrmError::unknown_field("Publisher", field)),
        }
    }

    fn set_value(&mut self, field: &str, value: Value) -> OrmResult<()> {
        match field {
            "id" => self.id = value.decode()?,
            "name" => self.name = value.decode()?,
            _ => return Err(OrmError::unknown_field("Publisher", field)),
        }
        Ok(())
    }

    fn children(&self, field: &str) -> OrmResult<Vec<Box<dyn LinkedRecord>>> {
        match field {
            "books" => Ok(self.books.linked()),
            _ => Err(OrmError::unknown_field("Publisher", field)),
        }
    }

    fn clear_children(&mut self, field: &str) -> OrmResult<()> {
        match field {
            "books" => self.books.clear(),
            _ => return Err(OrmError::unknown_field("Publisher", field)),
        }
        Ok(())
    }
}

/// A book, optionally linked to its publisher.
#[derive(Debug, Default, Clone)]
pub struct Book {
    /// Generated key.
    pub id: Option<i64>,
    /// Title.
    pub title: String,
    /// Publication date, stored as `publishedAt`.
    pub published_at: Option<NaiveDate>,
    /// The publisher, stored as `publisher_id`.
    pub publisher: ManyToOne<Publisher>,
}

impl Book {
    /// Creates an unsaved book.
    pub fn new(title: &str, published_at: Option<NaiveDate>) -> Self {
        Self {
            title: title.to_string(),
            published_at,
            ..Self::default()
        }
    }
}

impl Entity for Book {
    fn class() -> ClassDescriptor {
        ClassDescriptor::new("Book")
            .id::<Option<i64>>("id")
            .column::<String>("title")
            .column_named::<Option<NaiveDate>>("published_at", "publishedAt")
            .many_to_one::<Publisher>("publisher", "publisher_id")
    }

    fn get_value(&self, field: &str) -> OrmResult<Value> {
        match field {
            "id" => Ok(self.id.into()),
            "title" => Ok(self.title.clone().into()),
            "published_at" => Ok(self.published_at.into()),
            "publisher" => self.publisher.to_value(),
            _ => Err(OrmError::unknown_field("Book", field)),
        }
    }

    fn set_value(&mut self, field: &str, value: Value) -> OrmResult<()> {
        match field {
            "id" => self.id = value.decode()?,
            "title" => self.title = value.decode()?,
            "published_at" => self.published_at = value.decode()?,
            "publisher" => self.publisher.set_value(value)?,
            _ => return Err(OrmError::unknown_field("Book", field)),
        }
        Ok(())
    }

    fn parent(&self, field: &str) -> OrmResult<Option<Box<dyn LinkedRecord>>> {
        match field {
            "publisher" => Ok(self.publisher.linked()),
            _ => Err(OrmError::unknown_field("Book", field)),
        }
    }
}

/// An author with a UUID key and one field of each scalar type.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Author {
    /// Client-generated key.
    pub id: Option<Uuid>,
    /// Full name.
    pub name: String,
    /// Age in years.
    pub age: i32,
    /// Follower count.
    pub followers: i64,
    /// Whether the author is still writing.
    pub active: bool,
    /// Date of birth.
    pub born: Option<NaiveDate>,
    /// Last sign-in.
    pub last_seen: Option<NaiveDateTime>,
    /// Royalty balance.
    pub royalties: Decimal,
}

impl Entity for Author {
    fn class() -> ClassDescriptor {
        ClassDescriptor::new("Author")
            .table("authors")
            .id::<Option<Uuid>>("id")
            .column::<String>("name")
            .column::<i32>("age")
            .column::<i64>("followers")
            .column::<bool>("active")
            .column::<Option<NaiveDate>>("born")
            .column_named::<Option<NaiveDateTime>>("last_seen", "last_seen_at")
            .column::<Decimal>("royalties")
    }

    fn get_value(&self, field: &str) -> OrmResult<Value> {
        match field {
            "id" => Ok(self.id.into()),
            "name" => Ok(self.name.clone().into()),
            "age" => Ok(self.age.into()),
            "followers" => Ok(self.followers.into()),
            "active" => Ok(self.active.into()),
            "born" => Ok(self.born.into()),
            "last_seen" => Ok(self.last_seen.into()),
            "royalties" => Ok(self.royalties.into()),
            _ => Err(OrmError::unknown_field("Author", field)),
        }
    }

    fn set_value(&mut self, field: &str, value: Value) -> OrmResult<()> {
        match field {
            "id" => self.id = value.decode()?,
            "name" => self.name = value.decode()?,
            "age" => self.age = value.decode()?,
            "followers" => self.followers = value.decode()?,
            "active" => self.active = value.decode()?,
            "born" => self.born = value.decode()?,
            "last_seen" => self.last_seen = value.decode()?,
            "royalties" => self.royalties = value.decode()?,
            _ => return Err(OrmError::unknown_field("Author", field)),
        }
        Ok(())
    }
}
