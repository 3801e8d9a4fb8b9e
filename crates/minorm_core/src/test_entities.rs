//! Small entities shared by the unit tests.

use crate::entity::Entity;
use crate::error::{OrmError, OrmResult};
use crate::metadata::ClassDescriptor;
use crate::relation::{LinkedRecord, ManyToOne, OneToMany};
use chrono::NaiveDate;
use minorm_driver::Value;
use uuid::Uuid;

#[derive(Debug, Default, Clone)]
pub(crate) struct Owner {
    pub id: Option<i64>,
    pub name: String,
    pub pets: OneToMany<Pet>,
}

impl Entity for Owner {
    fn class() -> ClassDescriptor {
        ClassDescriptor::new("Owner")
            .id::<Option<i64>>("id")
            .column::<String>("name")
            .one_to_many::<Pet>("pets", "owner")
    }

    fn get_value(&self, field: &str) -> OrmResult<Value> {
        match field {
            "id" => Ok(self.id.into()),
            "name" => Ok(self.name.clone().into()),
            _ => Err(OrmError::unknown_field("Owner", field)),
        }
    }

    fn set_value(&mut self, field: &str, value: Value) -> OrmResult<()> {
        match field {
            "id" => self.id = value.decode()?,
            "name" => self.name = value.decode()?,
            _ => return Err(OrmError::unknown_field("Owner", field)),
        }
        Ok(())
    }

    fn children(&self, field: &str) -> OrmResult<Vec<Box<dyn LinkedRecord>>> {
        match field {
            "pets" => Ok(self.pets.linked()),
            _ => Err(OrmError::unknown_field("Owner", field)),
        }
    }

    fn clear_children(&mut self, field: &str) -> OrmResult<()> {
        match field {
            "pets" => self.pets.clear(),
            _ => return Err(OrmError::unknown_field("Owner", field)),
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub(crate) struct Pet {
    pub id: Option<i64>,
    pub name: String,
    pub born: Option<NaiveDate>,
    pub owner: ManyToOne<Owner>,
}

impl Entity for Pet {
    fn class() -> ClassDescriptor {
        ClassDescriptor::new("Pet")
            .table("pets")
            .id::<Option<i64>>("id")
            .column::<String>("name")
            .column_named::<Option<NaiveDate>>("born", "birth_date")
            .many_to_one::<Owner>("owner", "owner_id")
    }

    fn get_value(&self, field: &str) -> OrmResult<Value> {
        match field {
            "id" => Ok(self.id.into()),
            "name" => Ok(self.name.clone().into()),
            "born" => Ok(self.born.into()),
            "owner" => self.owner.to_value(),
            _ => Err(OrmError::unknown_field("Pet", field)),
        }
    }

    fn set_value(&mut self, field: &str, value: Value) -> OrmResult<()> {
        match field {
            "id" => self.id = value.decode()?,
            "name" => self.name = value.decode()?,
            "born" => self.born = value.decode()?,
            "owner" => self.owner.set_value(value)?,
            _ => return Err(OrmError::unknown_field("Pet", field)),
        }
        Ok(())
    }

    fn parent(&self, field: &str) -> OrmResult<Option<Box<dyn LinkedRecord>>> {
        match field {
            "owner" => Ok(self.owner.linked()),
            _ => Err(OrmError::unknown_field("Pet", field)),
        }
    }
}

#[derive(Debug, Default, Clone)]
pub(crate) struct Badge {
    pub id: Option<Uuid>,
    pub label: String,
    pub level: i32,
}

impl Entity for Badge {
    fn class() -> ClassDescriptor {
        ClassDescriptor::new("Badge")
            .id::<Option<Uuid>>("id")
            .column::<String>("label")
            .column::<i32>("level")
    }

    fn get_value(&self, field: &str) -> OrmResult<Value> {
        match field {
            "id" => Ok(self.id.into()),
            "label" => Ok(self.label.clone().into()),
            "level" => Ok(self.level.into()),
            _ => Err(OrmError::unknown_field("Badge", field)),
        }
    }

    fn set_value(&mut self, field: &str, value: Value) -> OrmResult<()> {
        match field {
            "id" => self.id = value.decode()?,
            "label" => self.label = value.decode()?,
            "level" => self.level = value.decode()?,
            _ => return Err(OrmError::unknown_field("Badge", field)),
        }
        Ok(())
    }
}

/// Only the key is stored; the children live in their own table.
#[derive(Debug, Default, Clone)]
pub(crate) struct Ticket {
    pub id: Option<i64>,
    pub stubs: OneToMany<Stub>,
}

impl Entity for Ticket {
    fn class() -> ClassDescriptor {
        ClassDescriptor::new("Ticket")
            .id::<Option<i64>>("id")
            .one_to_many::<Stub>("stubs", "ticket")
    }

    fn get_value(&self, field: &str) -> OrmResult<Value> {
        match field {
            "id" => Ok(self.id.into()),
            _ => Err(OrmError::unknown_field("Ticket", field)),
        }
    }

    fn set_value(&mut self, field: &str, value: Value) -> OrmResult<()> {
        match field {
            "id" => self.id = value.decode()?,
            _ => return Err(OrmError::unknown_field("Ticket", field)),
        }
        Ok(())
    }

    fn children(&self, field: &str) -> OrmResult<Vec<Box<dyn LinkedRecord>>> {
        match field {
            "stubs" => Ok(self.stubs.linked()),
            _ => Err(OrmError::unknown_field("Ticket", field)),
        }
    }

    fn clear_children(&mut self, field: &str) -> OrmResult<()> {
        match field {
            "stubs" => self.stubs.clear(),
            _ => return Err(OrmError::unknown_field("Ticket", field)),
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub(crate) struct Stub {
    pub id: Option<i64>,
    pub ticket: ManyToOne<Ticket>,
}

impl Entity for Stub {
    fn class() -> ClassDescriptor {
        ClassDescriptor::new("Stub")
            .id::<Option<i64>>("id")
            .many_to_one::<Ticket>("ticket", "ticket_id")
    }

    fn get_value(&self, field: &str) -> OrmResult<Value> {
        match field {
            "id" => Ok(self.id.into()),
            "ticket" => self.ticket.to_value(),
            _ => Err(OrmError::unknown_field("Stub", field)),
        }
    }

    fn set_value(&mut self, field: &str, value: Value) -> OrmResult<()> {
        match field {
            "id" => self.id = value.decode()?,
            "ticket" => self.ticket.set_value(value)?,
            _ => return Err(OrmError::unknown_field("Stub", field)),
        }
        Ok(())
    }

    fn parent(&self, field: &str) -> OrmResult<Option<Box<dyn LinkedRecord>>> {
        match field {
            "ticket" => Ok(self.ticket.linked()),
            _ => Err(OrmError::unknown_field("Stub", field)),
        }
    }
}
