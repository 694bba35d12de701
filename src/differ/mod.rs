//! Schema differ (spec.md §4.3).
//!
//! [`diff_schemas`] compares a current and target [`Schema`] and returns
//! an ordered migration ([`DiffOutcome::Diff`]), [`DiffOutcome::NoDiff`]
//! when nothing changed, or a [`RefusedChange`] when the difference can't
//! be expressed safely (engine/cluster changes, system objects).
//!
//! Per-kind differs are pure functions over two schemas appending to a
//! shared `(up, down)` pair of statement vectors; this module is only
//! responsible for the cross-kind ordering invariant: roles → named
//! collections → databases → tables → dictionaries → views, with
//! functions and grants diffed at the edges (functions alongside roles,
//! since nothing else depends on them; grants last, since a grant can
//! name a table or database this same migration just created).
//!
//! `DOWN reverses both axes` (spec.md §4.3): each kind already emits its
//! own up/down pair in lockstep, so the global down sequence is simply
//! the paired-down statements in the *reverse* of the up order.

mod database;
mod dictionary;
mod function;
mod grant;
mod named_collection;
mod rename;
mod role;
mod system;
mod table;
mod view;

use crate::ast::Statement;
use crate::error::RefusedChange;
use crate::model::Schema;

pub use system::{guard_database, guard_object, is_system_database};

#[derive(Debug, Clone, PartialEq)]
pub enum DiffOutcome {
    NoDiff,
    Diff { up: Vec<Statement>, down: Vec<Statement> },
}

#[tracing::instrument(level = "debug", skip_all, fields(current_statements = current.len(), target_statements = target.len()))]
pub fn diff_schemas(current: &Schema, target: &Schema) -> Result<DiffOutcome, RefusedChange> {
    let mut up: Vec<Statement> = Vec::new();
    let mut down: Vec<Statement> = Vec::new();

    role::diff_roles(current, target, &mut up, &mut down)?;
    function::diff_functions(current, target, &mut up, &mut down)?;
    named_collection::diff_named_collections(current, target, &mut up, &mut down)?;
    database::diff_databases(current, target, &mut up, &mut down)?;
    table::diff_tables(current, target, &mut up, &mut down)?;
    dictionary::diff_dictionaries(current, target, &mut up, &mut down)?;
    view::diff_views(current, target, &mut up, &mut down)?;
    grant::diff_grants(current, target, &mut up, &mut down)?;

    if up.is_empty() {
        debug_assert!(down.is_empty());
        tracing::debug!("no schema differences");
        return Ok(DiffOutcome::NoDiff);
    }

    down.reverse();
    tracing::info!(statements = up.len(), "diff produced migration statements");
    Ok(DiffOutcome::Diff { up, down })
}
