//! The hospital schema
//!
//! `ALL` is in dependency order: referenced tables come before the tables
//! that reference them, so foreign keys are satisfiable at creation time.

use super::descriptor::{Column, EntityDescriptor};

pub static PATIENT: EntityDescriptor = EntityDescriptor {
    name: "patient",
    table: "patient",
    key: &["pat_id"],
    generated_key: true,
    path_param: "id",
    item_routes: true,
    columns: &[
        Column::int("pat_id"),
        Column::text("pat_first_name").not_null(),
        Column::text("pat_last_name").not_null(),
        Column::text("pat_insurance_no").not_null(),
        Column::text("pat_ph_no").not_null(),
        Column::date("pat_date").default_sql("CURRENT_DATE"),
        Column::text("pat_address").not_null(),
    ],
};

pub static DOCTOR: EntityDescriptor = EntityDescriptor {
    name: "doctor",
    table: "doctor",
    key: &["doc_id"],
    generated_key: true,
    path_param: "id",
    item_routes: true,
    columns: &[
        Column::int("doc_id"),
        Column::text("doc_first_name").not_null(),
        Column::text("doc_last_name").not_null(),
        Column::text("doc_ph_no").not_null(),
        Column::date("doc_date").default_sql("CURRENT_DATE"),
        Column::text("doc_address").not_null(),
    ],
};

pub static NURSE: EntityDescriptor = EntityDescriptor {
    name: "nurse",
    table: "nurse",
    key: &["nur_id"],
    generated_key: true,
    path_param: "id",
    item_routes: true,
    columns: &[
        Column::int("nur_id"),
        Column::text("nur_first_name").not_null(),
        Column::text("nur_last_name").not_null(),
        Column::text("nur_ph_no").not_null(),
        Column::date("nur_date").default_sql("CURRENT_DATE"),
        Column::text("nur_address").not_null(),
    ],
};

pub static APPOINTMENT: EntityDescriptor = EntityDescriptor {
    name: "appointment",
    table: "appointment",
    key: &["app_id"],
    generated_key: true,
    path_param: "id",
    item_routes: true,
    columns: &[
        Column::int("app_id"),
        Column::int("pat_id").not_null().references("patient", "pat_id"),
        Column::int("doc_id").not_null().references("doctor", "doc_id"),
        Column::date("appointment_date").not_null(),
    ],
};

pub static ROOM: EntityDescriptor = EntityDescriptor {
    name: "room",
    table: "room",
    key: &["room_no"],
    generated_key: false,
    path_param: "room_no",
    item_routes: true,
    columns: &[
        Column::int("room_no"),
        Column::text("room_type").not_null(),
        Column::int("available").not_null(),
    ],
};

pub static MEDICATION: EntityDescriptor = EntityDescriptor {
    name: "medication",
    table: "medication",
    key: &["code"],
    generated_key: false,
    path_param: "code",
    item_routes: true,
    columns: &[
        Column::int("code"),
        Column::text("name").not_null(),
        Column::text("brand").not_null(),
        Column::text("description"),
    ],
};

pub static DEPARTMENT: EntityDescriptor = EntityDescriptor {
    name: "department",
    table: "department",
    key: &["department_id"],
    generated_key: false,
    path_param: "id",
    item_routes: true,
    columns: &[
        Column::int("department_id"),
        Column::text("name").not_null(),
        Column::int("head_id").not_null().references("doctor", "doc_id"),
    ],
};

pub static PROCEDURE: EntityDescriptor = EntityDescriptor {
    name: "procedure",
    table: "procedure",
    key: &["code"],
    generated_key: false,
    path_param: "code",
    item_routes: true,
    columns: &[
        Column::int("code"),
        Column::text("name").not_null(),
        Column::int("cost").not_null(),
    ],
};

pub static UNDERGOES: EntityDescriptor = EntityDescriptor {
    name: "undergoes",
    table: "undergoes",
    key: &["pat_id", "proc_code", "u_date"],
    generated_key: false,
    path_param: "",
    item_routes: false,
    columns: &[
        Column::int("pat_id").not_null().references("patient", "pat_id"),
        Column::int("proc_code").not_null().references("procedure", "code"),
        Column::date("u_date").not_null(),
        Column::int("doc_id").references("doctor", "doc_id"),
        Column::int("nur_id").references("nurse", "nur_id"),
        Column::int("room_no").references("room", "room_no"),
    ],
};

pub static PRESCRIBES: EntityDescriptor = EntityDescriptor {
    name: "prescribes",
    table: "prescribes",
    key: &["doc_id", "pat_id", "med_code", "p_date"],
    generated_key: false,
    path_param: "",
    item_routes: false,
    columns: &[
        Column::int("doc_id").references("doctor", "doc_id"),
        Column::int("pat_id").references("patient", "pat_id"),
        Column::int("med_code").references("medication", "code"),
        Column::date("p_date").not_null(),
        Column::int("app_id").not_null().references("appointment", "app_id"),
        Column::int("dose").not_null(),
    ],
};

/// Every table, referenced before referencing
pub static ALL: [&EntityDescriptor; 10] = [
    &PATIENT,
    &DOCTOR,
    &NURSE,
    &APPOINTMENT,
    &ROOM,
    &MEDICATION,
    &DEPARTMENT,
    &PROCEDURE,
    &UNDERGOES,
    &PRESCRIBES,
];

/// Look up a descriptor by route name.
pub fn find(name: &str) -> Option<&'static EntityDescriptor> {
    ALL.iter().copied().find(|e| e.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn referenced_tables_come_first() {
        for (position, entity) in ALL.iter().enumerate() {
            for column in entity.columns {
                if let Some((target, _)) = column.references {
                    let target_position = ALL
                        .iter()
                        .position(|e| e.table == target)
                        .unwrap_or_else(|| panic!("{} references unknown table {}", entity.table, target));
                    assert!(
                        target_position < position,
                        "{} must be created after {}",
                        entity.table,
                        target
                    );
                }
            }
        }
    }

    #[test]
    fn references_point_at_real_columns() {
        for entity in ALL {
            for column in entity.columns {
                if let Some((table, target_column)) = column.references {
                    let target = find(table).expect("referenced table");
                    assert!(target.column(target_column).is_some());
                }
            }
        }
    }

    #[test]
    fn keys_are_declared_columns() {
        for entity in ALL {
            assert_eq!(entity.key_columns().count(), entity.key.len(), "{}", entity.name);
            if entity.generated_key {
                assert_eq!(entity.key.len(), 1);
            }
            if entity.item_routes {
                assert_eq!(entity.key.len(), 1, "{} item routes need a single key", entity.name);
                assert!(!entity.path_param.is_empty());
            }
        }
    }

    #[test]
    fn names_are_unique() {
        for entity in ALL {
            assert_eq!(ALL.iter().filter(|e| e.name == entity.name).count(), 1);
        }
    }

    #[test]
    fn patient_ddl_matches_schema() {
        let ddl = PATIENT.create_table_sql();
        assert!(ddl.starts_with("CREATE TABLE IF NOT EXISTS patient ("));
        assert!(ddl.contains("pat_id SERIAL PRIMARY KEY"));
        assert!(ddl.contains("pat_date DATE DEFAULT CURRENT_DATE"));
        assert!(ddl.contains("pat_address TEXT NOT NULL"));
    }

    #[test]
    fn prescribes_ddl_has_composite_key() {
        let ddl = PRESCRIBES.create_table_sql();
        assert!(ddl.contains("PRIMARY KEY(doc_id, pat_id, med_code, p_date)"));
        assert!(ddl.contains("FOREIGN KEY(app_id) REFERENCES appointment(app_id)"));
    }

    #[test]
    fn find_by_route_name() {
        assert_eq!(find("room").map(|e| e.table), Some("room"));
        assert!(find("ward").is_none());
    }
}
