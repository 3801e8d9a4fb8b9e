//! SQL statement generation.

use crate::error::OrmResult;
use crate::metadata::{EntityDescriptor, KeyStrategy, ManyToOneSpec};
use crate::sql::types::{column_type, primary_key_type};
use minorm_driver::{Dialect, Value};

/// A statement with the fields bound to its placeholders, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    /// The SQL text.
    pub sql: String,
    /// Field names bound to the `?` placeholders.
    pub binds: Vec<&'static str>,
}

/// A schema introspection query with its parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Probe {
    /// The SQL text.
    pub sql: &'static str,
    /// Parameters bound to the placeholders.
    pub params: Vec<Value>,
}

/// A foreign-key constraint on a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    /// The referencing column.
    pub column: String,
    /// The referenced table.
    pub parent_table: String,
    /// The referenced column.
    pub parent_column: String,
}

impl ForeignKey {
    fn clause(&self) -> String {
        format!(
            "FOREIGN KEY ({}) REFERENCES {}({})",
            self.column, self.parent_table, self.parent_column
        )
    }
}

/// Builds the statements for one SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct StatementBuilder {
    dialect: Dialect,
}

impl StatementBuilder {
    /// Creates a builder for `dialect`.
    #[must_use]
    pub const fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    /// Returns the dialect.
    #[must_use]
    pub const fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn column_definitions(&self, d: &EntityDescriptor) -> OrmResult<Vec<String>> {
        let pk = &d.primary_key;
        let mut defs = vec![format!(
            "{} {}",
            pk.column,
            primary_key_type(self.dialect, d.name, pk)?
        )];
        for c in &d.columns {
            defs.push(format!(
                "{} {}",
                c.column,
                column_type(self.dialect, d.name, c.field, &c.field_type)?
            ));
        }
        for m in &d.many_to_one {
            let parent = m.target.descriptor()?;
            let ppk = &parent.primary_key;
            defs.push(format!(
                "{} {}",
                m.join_column,
                column_type(self.dialect, parent.name, ppk.field, &ppk.field_type)?
            ));
        }
        Ok(defs)
    }

    fn create_table_named(&self, table: &str, defs: &[String]) -> String {
        format!("CREATE TABLE {table} (\n    {}\n)", defs.join(",\n    "))
    }

    /// `CREATE TABLE` with the key first, then plain columns, then join columns.
    ///
    /// # Errors
    ///
    /// Fails if a column type is unsupported or a parent cannot be read.
    pub fn create_table(&self, d: &EntityDescriptor) -> OrmResult<String> {
        let defs = self.column_definitions(d)?;
        Ok(self.create_table_named(&d.table, &defs))
    }

    /// The foreign-key constraint a many-to-one relation requires.
    #[must_use]
    pub fn foreign_key(&self, relation: &ManyToOneSpec, parent: &EntityDescriptor) -> ForeignKey {
        ForeignKey {
            column: relation.join_column.to_string(),
            parent_table: parent.table.clone(),
            parent_column: parent.primary_key.column.to_string(),
        }
    }

    /// The statements that add `fk` to the child's table.
    ///
    /// MySQL alters the table in place. SQLite cannot add a constraint to an
    /// existing table, so the table is rebuilt with `existing` constraints
    /// plus the new one; callers must disable foreign-key enforcement while
    /// the rebuild runs.
    pub fn add_foreign_key(
        &self,
        child: &EntityDescriptor,
        fk: &ForeignKey,
        existing: &[ForeignKey],
    ) -> OrmResult<Vec<String>> {
        match self.dialect {
            Dialect::MySql => Ok(vec![format!(
                "ALTER TABLE {} ADD {}",
                child.table,
                fk.clause()
            )]),
            Dialect::Sqlite => self.rebuild_with(child, fk, existing),
        }
    }

    fn rebuild_with(
        &self,
        child: &EntityDescriptor,
        fk: &ForeignKey,
        existing: &[ForeignKey],
    ) -> OrmResult<Vec<String>> {
        let table = &child.table;
        let scratch = format!("{table}__rebuild");
        let mut defs = self.column_definitions(child)?;
        defs.extend(
            existing
                .iter()
                .filter(|e| *e != fk)
                .chain(std::iter::once(fk))
                .map(ForeignKey::clause),
        );
        let columns = child
            .stored_fields()
            .map(|(_, column)| column)
            .collect::<Vec<_>>()
            .join(", ");
        Ok(vec![
            self.create_table_named(&scratch, &defs),
            format!("INSERT INTO {scratch}({columns}) SELECT {columns} FROM {table}"),
            format!("DROP TABLE {table}"),
            format!("ALTER TABLE {scratch} RENAME TO {table}"),
        ])
    }

    /// Counts tables named `table` (0 or 1).
    #[must_use]
    pub fn table_exists(&self, table: &str) -> Probe {
        let sql = match self.dialect {
            Dialect::MySql => {
                "SELECT COUNT(*) FROM information_schema.tables \
                 WHERE table_schema = DATABASE() AND table_name = ?"
            }
            Dialect::Sqlite => "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?",
        };
        Probe {
            sql,
            params: vec![Value::from(table)],
        }
    }

    /// Counts foreign keys from `table.column` to `parent_table`.
    #[must_use]
    pub fn foreign_key_exists(&self, table: &str, column: &str, parent_table: &str) -> Probe {
        let sql = match self.dialect {
            Dialect::MySql => {
                "SELECT COUNT(*) FROM information_schema.key_column_usage \
                 WHERE table_schema = DATABASE() AND table_name = ? \
                 AND column_name = ? AND referenced_table_name = ?"
            }
            Dialect::Sqlite => {
                "SELECT COUNT(*) FROM pragma_foreign_key_list(?) WHERE \"from\" = ? AND \"table\" = ?"
            }
        };
        Probe {
            sql,
            params: vec![
                Value::from(table),
                Value::from(column),
                Value::from(parent_table),
            ],
        }
    }

    /// Lists the foreign keys of `table` as `(column, parent table, parent
    /// column)` rows. Only needed where constraints are added by rebuilding.
    #[must_use]
    pub fn foreign_keys_of(&self, table: &str) -> Option<Probe> {
        match self.dialect {
            Dialect::MySql => None,
            Dialect::Sqlite => Some(Probe {
                sql: "SELECT \"from\", \"table\", \"to\" FROM pragma_foreign_key_list(?)",
                params: vec![Value::from(table)],
            }),
        }
    }

    /// `INSERT`; the key column is only written for assigned keys.
    ///
    /// With no column to write, SQLite gets `DEFAULT VALUES`.
    #[must_use]
    pub fn insert(&self, d: &EntityDescriptor) -> Statement {
        let pk = &d.primary_key;
        let mut columns = Vec::new();
        let mut binds = Vec::new();
        if pk.strategy == KeyStrategy::Assigned {
            columns.push(pk.column);
            binds.push(pk.field);
        }
        for (field, column) in d.stored_fields().skip(1) {
            columns.push(column);
            binds.push(field);
        }
        if columns.is_empty() && self.dialect == Dialect::Sqlite {
            return Statement {
                sql: format!("INSERT INTO {} DEFAULT VALUES", d.table),
                binds,
            };
        }
        let placeholders = vec!["?"; columns.len()].join(", ");
        Statement {
            sql: format!(
                "INSERT INTO {}({}) VALUES({placeholders})",
                d.table,
                columns.join(", ")
            ),
            binds,
        }
    }

    /// `UPDATE` of every plain and join column by key, or `None` if the
    /// key is the only stored column.
    #[must_use]
    pub fn update(&self, d: &EntityDescriptor) -> Option<Statement> {
        let pk = &d.primary_key;
        let mut sets = Vec::new();
        let mut binds = Vec::new();
        for (field, column) in d.stored_fields().skip(1) {
            sets.push(format!("{column}=?"));
            binds.push(field);
        }
        if sets.is_empty() {
            return None;
        }
        binds.push(pk.field);
        Some(Statement {
            sql: format!(
                "UPDATE {} SET {} WHERE {} = ?",
                d.table,
                sets.join(", "),
                pk.column
            ),
            binds,
        })
    }

    /// `DELETE` by key.
    #[must_use]
    pub fn delete(&self, d: &EntityDescriptor) -> Statement {
        let pk = &d.primary_key;
        Statement {
            sql: format!("DELETE FROM {} WHERE {} = ?", d.table, pk.column),
            binds: vec![pk.field],
        }
    }

    /// `SELECT` by key.
    #[must_use]
    pub fn select_by_id(&self, d: &EntityDescriptor) -> String {
        format!("SELECT * FROM {} WHERE {} = ?", d.table, d.primary_key.column)
    }

    /// `SELECT` of every row.
    #[must_use]
    pub fn select_all(&self, d: &EntityDescriptor) -> String {
        format!("SELECT * FROM {}", d.table)
    }

    /// `SELECT` of the rows referencing one parent through `relation`.
    #[must_use]
    pub fn select_by_parent(&self, d: &EntityDescriptor, relation: &ManyToOneSpec) -> String {
        format!("SELECT * FROM {} WHERE {} = ?", d.table, relation.join_column)
    }

    /// Counts rows with a key.
    #[must_use]
    pub fn exists(&self, d: &EntityDescriptor) -> String {
        format!(
            "SELECT COUNT(*) FROM {} WHERE {} = ?",
            d.table, d.primary_key.column
        )
    }

    /// `DROP TABLE`.
    #[must_use]
    pub fn drop_table(&self, d: &EntityDescriptor) -> String {
        format!("DROP TABLE {}", d.table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::descriptor_of;
    use crate::test_entities::{Badge, Owner, Pet, Ticket};

    const MYSQL: StatementBuilder = StatementBuilder::new(Dialect::MySql);
    const SQLITE: StatementBuilder = StatementBuilder::new(Dialect::Sqlite);

    #[test]
    fn create_table_mysql() {
        let pet = descriptor_of::<Pet>().unwrap();
        assert_eq!(
            MYSQL.create_table(&pet).unwrap(),
            "CREATE TABLE pets (\n    id BIGINT AUTO_INCREMENT PRIMARY KEY,\n    name VARCHAR(255),\n    birth_date DATE,\n    owner_id BIGINT\n)"
        );
        let badge = descriptor_of::<Badge>().unwrap();
        assert_eq!(
            MYSQL.create_table(&badge).unwrap(),
            "CREATE TABLE badge (\n    id VARCHAR(36) PRIMARY KEY,\n    label VARCHAR(255),\n    level INT\n)"
        );
    }

    #[test]
    fn create_table_sqlite() {
        let owner = descriptor_of::<Owner>().unwrap();
        assert_eq!(
            SQLITE.create_table(&owner).unwrap(),
            "CREATE TABLE owner (\n    id INTEGER PRIMARY KEY AUTOINCREMENT,\n    name VARCHAR(255)\n)"
        );
    }

    #[test]
    fn dml_statements() {
        let pet = descriptor_of::<Pet>().unwrap();

        let insert = MYSQL.insert(&pet);
        assert_eq!(
            insert.sql,
            "INSERT INTO pets(name, birth_date, owner_id) VALUES(?, ?, ?)"
        );
        assert_eq!(insert.binds, ["name", "born", "owner"]);

        let update = MYSQL.update(&pet).unwrap();
        assert_eq!(
            update.sql,
            "UPDATE pets SET name=?, birth_date=?, owner_id=? WHERE id = ?"
        );
        assert_eq!(update.binds, ["name", "born", "owner", "id"]);

        let delete = MYSQL.delete(&pet);
        assert_eq!(delete.sql, "DELETE FROM pets WHERE id = ?");
        assert_eq!(delete.binds, ["id"]);

        assert_eq!(MYSQL.select_by_id(&pet), "SELECT * FROM pets WHERE id = ?");
        assert_eq!(MYSQL.select_all(&pet), "SELECT * FROM pets");
        assert_eq!(MYSQL.exists(&pet), "SELECT COUNT(*) FROM pets WHERE id = ?");
        assert_eq!(MYSQL.drop_table(&pet), "DROP TABLE pets");
        assert_eq!(
            MYSQL.select_by_parent(&pet, &pet.many_to_one[0]),
            "SELECT * FROM pets WHERE owner_id = ?"
        );
    }

    #[test]
    fn assigned_keys_are_inserted() {
        let badge = descriptor_of::<Badge>().unwrap();
        let insert = SQLITE.insert(&badge);
        assert_eq!(insert.sql, "INSERT INTO badge(id, label, level) VALUES(?, ?, ?)");
        assert_eq!(insert.binds, ["id", "label", "level"]);
    }

    #[test]
    fn key_only_entities() {
        let ticket = descriptor_of::<Ticket>().unwrap();

        let insert = SQLITE.insert(&ticket);
        assert_eq!(insert.sql, "INSERT INTO ticket DEFAULT VALUES");
        assert!(insert.binds.is_empty());
        assert_eq!(MYSQL.insert(&ticket).sql, "INSERT INTO ticket() VALUES()");

        assert!(SQLITE.update(&ticket).is_none());
        assert!(MYSQL.update(&ticket).is_none());
    }

    #[test]
    fn mysql_adds_foreign_keys_in_place() {
        let pet = descriptor_of::<Pet>().unwrap();
        let owner = descriptor_of::<Owner>().unwrap();
        let fk = MYSQL.foreign_key(&pet.many_to_one[0], &owner);
        assert_eq!(
            MYSQL.add_foreign_key(&pet, &fk, &[]).unwrap(),
            ["ALTER TABLE pets ADD FOREIGN KEY (owner_id) REFERENCES owner(id)"]
        );
        assert!(MYSQL.foreign_keys_of("pets").is_none());
    }

    #[test]
    fn sqlite_rebuilds_to_add_foreign_keys() {
        let pet = descriptor_of::<Pet>().unwrap();
        let owner = descriptor_of::<Owner>().unwrap();
        let fk = SQLITE.foreign_key(&pet.many_to_one[0], &owner);
        let statements = SQLITE.add_foreign_key(&pet, &fk, &[fk.clone()]).unwrap();
        assert_eq!(
            statements,
            [
                "CREATE TABLE pets__rebuild (\n    id INTEGER PRIMARY KEY AUTOINCREMENT,\n    name VARCHAR(255),\n    birth_date DATE,\n    owner_id BIGINT,\n    FOREIGN KEY (owner_id) REFERENCES owner(id)\n)",
                "INSERT INTO pets__rebuild(id, name, birth_date, owner_id) SELECT id, name, birth_date, owner_id FROM pets",
                "DROP TABLE pets",
                "ALTER TABLE pets__rebuild RENAME TO pets",
            ]
        );
    }

    #[test]
    fn introspection_probes() {
        let probe = SQLITE.foreign_key_exists("pets", "owner_id", "owner");
        assert_eq!(
            probe.sql,
            "SELECT COUNT(*) FROM pragma_foreign_key_list(?) WHERE \"from\" = ? AND \"table\" = ?"
        );
        assert_eq!(probe.params.len(), 3);
        assert_eq!(
            MYSQL.table_exists("pets").sql,
            "SELECT COUNT(*) FROM information_schema.tables WHERE table_schema = DATABASE() AND table_name = ?"
        );
    }
}
