//! Declarative table descriptors
//!
//! One `EntityDescriptor` per table. DDL and every CRUD statement are
//! derived from it, so adding an entity means adding a descriptor and
//! nothing else.

use crate::db::ColumnKind;

/// One column of a table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
    pub not_null: bool,
    /// SQL default expression, e.g. `CURRENT_DATE`
    pub default: Option<&'static str>,
    /// Foreign key target as `(table, column)`
    pub references: Option<(&'static str, &'static str)>,
}

impl Column {
    const fn new(name: &'static str, kind: ColumnKind) -> Self {
        Self {
            name,
            kind,
            not_null: false,
            default: None,
            references: None,
        }
    }

    pub const fn int(name: &'static str) -> Self {
        Self::new(name, ColumnKind::Int)
    }

    pub const fn text(name: &'static str) -> Self {
        Self::new(name, ColumnKind::Text)
    }

    pub const fn date(name: &'static str) -> Self {
        Self::new(name, ColumnKind::Date)
    }

    pub const fn not_null(self) -> Self {
        Self {
            not_null: true,
            ..self
        }
    }

    pub const fn default_sql(self, expr: &'static str) -> Self {
        Self {
            default: Some(expr),
            ..self
        }
    }

    pub const fn references(self, table: &'static str, column: &'static str) -> Self {
        Self {
            references: Some((table, column)),
            ..self
        }
    }
}

/// Static description of one table and how it is exposed over HTTP
#[derive(Debug)]
pub struct EntityDescriptor {
    /// Route segment and cache namespace (`/patient`)
    pub name: &'static str,
    pub table: &'static str,
    /// Primary key columns, in order
    pub key: &'static [&'static str],
    /// Single-column SERIAL key assigned by the database
    pub generated_key: bool,
    /// Name of the path parameter on item routes (`/room/{room_no}`)
    pub path_param: &'static str,
    /// Whether GET/PUT/DELETE by key are exposed
    pub item_routes: bool,
    /// All columns including key columns
    pub columns: &'static [Column],
}

impl EntityDescriptor {
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn is_key(&self, name: &str) -> bool {
        self.key.contains(&name)
    }

    /// Key columns, in key order
    pub fn key_columns(&self) -> impl Iterator<Item = &Column> + '_ {
        self.key.iter().filter_map(|name| self.column(name))
    }

    /// Non-key columns
    pub fn mutable_columns(&self) -> impl Iterator<Item = &Column> + '_ {
        self.columns.iter().filter(|c| !self.is_key(c.name))
    }

    fn column_list(&self) -> String {
        self.columns
            .iter()
            .map(|c| c.name)
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn key_predicate(&self) -> String {
        self.key
            .iter()
            .map(|k| format!("{} = ?", k))
            .collect::<Vec<_>>()
            .join(" AND ")
    }

    /// `CREATE TABLE IF NOT EXISTS` statement.
    pub fn create_table_sql(&self) -> String {
        let single_key = self.key.len() == 1;
        let mut lines: Vec<String> = self
            .columns
            .iter()
            .map(|c| {
                if single_key && self.is_key(c.name) {
                    let ty = if self.generated_key { "SERIAL" } else { c.kind.sql_type() };
                    return format!("{} {} PRIMARY KEY", c.name, ty);
                }
                let mut line = format!("{} {}", c.name, c.kind.sql_type());
                if c.not_null {
                    line.push_str(" NOT NULL");
                }
                if let Some(expr) = c.default {
                    line.push_str(" DEFAULT ");
                    line.push_str(expr);
                }
                line
            })
            .collect();

        if !single_key {
            lines.push(format!("PRIMARY KEY({})", self.key.join(", ")));
        }

        lines.extend(self.columns.iter().filter_map(|c| {
            c.references
                .map(|(table, column)| format!("FOREIGN KEY({}) REFERENCES {}({})", c.name, table, column))
        }));

        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n    {}\n)",
            self.table,
            lines.join(",\n    ")
        )
    }

    /// All rows, ordered by key.
    pub fn select_all_sql(&self) -> String {
        format!(
            "SELECT {} FROM {} ORDER BY {}",
            self.column_list(),
            self.table,
            self.key.join(", ")
        )
    }

    /// One row by key.
    pub fn select_one_sql(&self) -> String {
        format!(
            "SELECT {} FROM {} WHERE {}",
            self.column_list(),
            self.table,
            self.key_predicate()
        )
    }

    /// INSERT of the given columns. With no columns, every default applies.
    pub fn insert_sql(&self, columns: &[&str]) -> String {
        if columns.is_empty() {
            return format!("INSERT INTO {} DEFAULT VALUES", self.table);
        }
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.table,
            columns.join(", "),
            vec!["?"; columns.len()].join(", ")
        )
    }

    /// UPDATE of the given columns by key, returning the full row.
    /// Parameters: the column values, then the key values.
    pub fn update_sql(&self, columns: &[&str]) -> String {
        let assignments = columns
            .iter()
            .map(|c| format!("{} = ?", c))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "UPDATE {} SET {} WHERE {} RETURNING {}",
            self.table,
            assignments,
            self.key_predicate(),
            self.column_list()
        )
    }

    /// DELETE by key.
    pub fn delete_sql(&self) -> String {
        format!("DELETE FROM {} WHERE {}", self.table, self.key_predicate())
    }
}
