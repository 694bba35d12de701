//! The system-object guard (spec.md §4.3 "System objects").

use crate::error::RefusedChange;

pub fn is_system_database(name: &str) -> bool {
    name.eq_ignore_ascii_case("system") || name.eq_ignore_ascii_case("information_schema")
}

pub fn guard_database(name: &str) -> Result<(), RefusedChange> {
    if is_system_database(name) {
        Err(RefusedChange::SystemObject { object: name.to_string() })
    } else {
        Ok(())
    }
}

pub fn guard_object(database: Option<&str>, name: &str) -> Result<(), RefusedChange> {
    if let Some(db) = database {
        if is_system_database(db) {
            return Err(RefusedChange::SystemObject {
                object: format!("{db}.{name}"),
            });
        }
    }
    Ok(())
}
