//! User-defined function differ (spec.md §4.3 "Named collection / Role /
//! Function"). ClickHouse's `CREATE FUNCTION` has no `OR REPLACE`; a body
//! change is DROP FUNCTION + CREATE FUNCTION.

use crate::ast::*;
use crate::error::RefusedChange;
use crate::model::Schema;

fn create_stmt(f: &Function) -> Statement {
    Statement::CreateFunction(f.clone())
}

fn drop_stmt(f: &Function) -> Statement {
    Statement::DropFunction(DropDatabaseRef {
        name: f.name.clone(),
        cluster: f.cluster.clone(),
        if_exists: true,
        sync: false,
    })
}

pub fn diff_functions(
    current: &Schema,
    target: &Schema,
    up: &mut Vec<Statement>,
    down: &mut Vec<Statement>,
) -> Result<(), RefusedChange> {
    let cur = current.functions_sorted();
    let tgt = target.functions_sorted();

    let mut creates = Vec::new();
    let mut drops = Vec::new();

    for new in &tgt {
        match current.function(&new.name) {
            None => creates.push((create_stmt(new), drop_stmt(new))),
            Some(old) if old != *new => {
                creates.push((drop_stmt(old), create_stmt(old)));
                creates.push((create_stmt(new), drop_stmt(new)));
            }
            Some(_) => {}
        }
    }

    for old in &cur {
        if target.function(&old.name).is_none() {
            drops.push((drop_stmt(old), create_stmt(old)));
        }
    }

    for (u, d) in creates.into_iter().chain(drops) {
        up.push(u);
        down.push(d);
    }
    Ok(())
}
