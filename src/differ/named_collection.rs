//! Named collection differ (spec.md §4.3 "Named collection / Role / Function").
//!
//! Any content change is `CREATE OR REPLACE NAMED COLLECTION`; a name
//! change with everything else equal has no rename form in the grammar
//! (unlike tables/dictionaries/databases, §6.1 lists no `RENAME NAMED
//! COLLECTION`), so it is DROP+CREATE.

use crate::ast::*;
use crate::error::RefusedChange;
use crate::model::Schema;

fn create_stmt(nc: &NamedCollection) -> Statement {
    let mut nc = nc.clone();
    nc.or_replace = true;
    Statement::CreateNamedCollection(nc)
}

fn drop_stmt(nc: &NamedCollection) -> Statement {
    Statement::DropNamedCollection(DropObjectRef {
        object: ObjectRef::new(None, nc.name.clone()),
        cluster: nc.cluster.clone(),
        if_exists: true,
        sync: false,
    })
}

pub fn diff_named_collections(
    current: &Schema,
    target: &Schema,
    up: &mut Vec<Statement>,
    down: &mut Vec<Statement>,
) -> Result<(), RefusedChange> {
    let cur = current.named_collections_sorted();
    let tgt = target.named_collections_sorted();

    let mut creates = Vec::new();
    let mut drops = Vec::new();

    for new in &tgt {
        match current.named_collection(&new.name) {
            None => creates.push((create_stmt(new), drop_stmt(new))),
            Some(old) if old != *new => creates.push((create_stmt(new), create_stmt(old))),
            Some(_) => {}
        }
    }

    for old in &cur {
        if target.named_collection(&old.name).is_none() {
            drops.push((drop_stmt(old), create_stmt(old)));
        }
    }

    for (u, d) in creates.into_iter().chain(drops) {
        up.push(u);
        down.push(d);
    }
    Ok(())
}
