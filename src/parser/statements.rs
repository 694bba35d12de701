use super::Parser;
use crate::ast::*;
use crate::error::ParseError;
use crate::lexer::TokenKind;

pub(super) fn parse_statement(p: &mut Parser) -> Result<Statement, ParseError> {
    if let TokenKind::Directive(rest) = p.peek().kind.clone() {
        p.advance();
        let mut parts = rest.splitn(2, ' ');
        let name = parts.next().unwrap_or_default().to_string();
        let rest = parts.next().unwrap_or_default().trim().to_string();
        return Ok(Statement::Comment(Directive { name, rest }));
    }

    if p.at_keyword("CREATE") {
        return parse_create(p);
    }
    if p.at_keyword("ALTER") {
        return parse_alter(p);
    }
    if p.at_keyword("ATTACH") {
        return parse_attach(p);
    }
    if p.at_keyword("DETACH") {
        return parse_detach(p);
    }
    if p.at_keyword("DROP") {
        return parse_drop(p);
    }
    if p.at_keyword("RENAME") {
        return parse_rename(p);
    }
    if p.at_keyword("GRANT") {
        return parse_grant(p);
    }
    if p.at_keyword("REVOKE") {
        return parse_revoke(p);
    }
    if p.at_keyword("SELECT") || p.at_keyword("WITH") {
        return Ok(Statement::Select(p.parse_select()?));
    }

    Err(p.unexpected("a statement"))
}

fn parse_create(p: &mut Parser) -> Result<Statement, ParseError> {
    p.expect_keyword("CREATE")?;
    let or_replace = p.eat_keyword_seq(&["OR", "REPLACE"]);

    if p.eat_keyword("DATABASE") {
        return parse_create_database(p);
    }
    if p.at_keyword_seq(&["MATERIALIZED", "VIEW"]) {
        p.advance();
        p.advance();
        return parse_create_materialized_view(p, or_replace);
    }
    if p.eat_keyword("VIEW") {
        return parse_create_view(p, or_replace);
    }
    if p.eat_keyword("TABLE") {
        return parse_create_table(p, or_replace);
    }
    if p.eat_keyword("DICTIONARY") {
        return parse_create_dictionary(p, or_replace);
    }
    if p.at_keyword_seq(&["NAMED", "COLLECTION"]) {
        p.advance();
        p.advance();
        return parse_create_named_collection(p, or_replace);
    }
    if p.eat_keyword("ROLE") {
        return parse_create_role(p);
    }
    if p.eat_keyword("FUNCTION") {
        return parse_create_function(p);
    }
    Err(p.unexpected("DATABASE, TABLE, DICTIONARY, VIEW, MATERIALIZED VIEW, NAMED COLLECTION, ROLE or FUNCTION"))
}

fn parse_create_database(p: &mut Parser) -> Result<Statement, ParseError> {
    let if_not_exists = p.eat_if_not_exists();
    let name = p.parse_ident()?;
    let cluster = p.eat_on_cluster()?;
    let engine = parse_optional_engine(p)?;
    let comment = parse_optional_comment(p)?;
    Ok(Statement::CreateDatabase(CreateDatabase {
        database: Database {
            name,
            cluster,
            engine,
            comment,
            if_not_exists,
        },
    }))
}

fn parse_optional_engine(p: &mut Parser) -> Result<Option<EngineSpec>, ParseError> {
    if p.eat_keyword("ENGINE") {
        let _ = p.eat_kind(&TokenKind::Eq);
        let name = p.parse_ident()?;
        let params = parse_optional_call_args(p)?;
        Ok(Some(EngineSpec { name, params }))
    } else {
        Ok(None)
    }
}

fn parse_optional_call_args(p: &mut Parser) -> Result<Vec<Expr>, ParseError> {
    let mut args = Vec::new();
    if p.eat_kind(&TokenKind::LParen) {
        if p.peek().kind != TokenKind::RParen {
            loop {
                args.push(p.parse_expr()?);
                if !p.eat_kind(&TokenKind::Comma) {
                    break;
                }
            }
        }
        p.expect_kind(TokenKind::RParen, ")")?;
    }
    Ok(args)
}

fn parse_optional_comment(p: &mut Parser) -> Result<Option<String>, ParseError> {
    if p.eat_keyword("COMMENT") {
        Ok(Some(p.parse_string_literal()?))
    } else {
        Ok(None)
    }
}

fn parse_object_ref(p: &mut Parser) -> Result<ObjectRef, ParseError> {
    let (database, name) = p.parse_qualified_name()?;
    Ok(ObjectRef { database, name })
}

// ---------------------------------------------------------------------
// TABLE
// ---------------------------------------------------------------------

fn parse_create_table(p: &mut Parser, or_replace: bool) -> Result<Statement, ParseError> {
    let if_not_exists = p.eat_if_not_exists();
    let object = parse_object_ref(p)?;
    let cluster = p.eat_on_cluster()?;

    let mut columns = Vec::new();
    let mut indexes = Vec::new();
    let mut constraints = Vec::new();
    if p.eat_kind(&TokenKind::LParen) {
        if p.peek().kind != TokenKind::RParen {
            loop {
                if p.eat_keyword("INDEX") {
                    indexes.push(parse_index_def(p)?);
                } else if p.eat_keyword("CONSTRAINT") {
                    constraints.push(parse_constraint_def(p)?);
                } else {
                    columns.push(parse_column_def(p)?);
                }
                if !p.eat_kind(&TokenKind::Comma) {
                    break;
                }
            }
        }
        p.expect_kind(TokenKind::RParen, ")")?;
    }

    let mut as_source = None;
    if p.eat_keyword("AS") {
        let path = p.parse_dotted_path()?;
        if p.peek().kind == TokenKind::LParen {
            let args = parse_optional_call_args(p)?;
            as_source = Some(TableSource::TableFunction {
                name: path.join("."),
                args,
            });
        } else {
            as_source = Some(TableSource::Table(Identifier(path)));
        }
    }

    let clauses = parse_table_engine_clauses(p)?;
    let comment = parse_optional_comment(p)?;

    Ok(Statement::CreateTable(Table {
        object,
        cluster,
        if_not_exists,
        or_replace,
        columns,
        indexes,
        constraints,
        clauses,
        comment,
        as_source,
    }))
}

/// Parses the free-order bag of ENGINE/ORDER BY/PARTITION BY/PRIMARY
/// KEY/SAMPLE BY/TTL/SETTINGS clauses shared by tables and materialized
/// views (spec.md §4.1: "Engine and column clauses may appear in any
/// order").
fn parse_table_engine_clauses(p: &mut Parser) -> Result<TableEngineClauses, ParseError> {
    let mut clauses = TableEngineClauses::default();
    loop {
        if clauses.engine.is_none() && p.at_keyword("ENGINE") {
            clauses.engine = parse_optional_engine(p)?;
        } else if clauses.order_by.is_none() && p.eat_keyword_seq(&["ORDER", "BY"]) {
            clauses.order_by = Some(p.parse_expr()?);
        } else if clauses.partition_by.is_none() && p.eat_keyword_seq(&["PARTITION", "BY"]) {
            clauses.partition_by = Some(p.parse_expr()?);
        } else if clauses.primary_key.is_none() && p.eat_keyword_seq(&["PRIMARY", "KEY"]) {
            clauses.primary_key = Some(p.parse_expr()?);
        } else if clauses.sample_by.is_none() && p.eat_keyword_seq(&["SAMPLE", "BY"]) {
            clauses.sample_by = Some(p.parse_expr()?);
        } else if clauses.ttl.is_empty() && p.eat_keyword("TTL") {
            clauses.ttl = parse_ttl_list(p)?;
        } else if clauses.settings.is_empty() && p.eat_keyword("SETTINGS") {
            clauses.settings = p.parse_settings_list()?;
        } else {
            break;
        }
    }
    Ok(clauses)
}

fn parse_ttl_list(p: &mut Parser) -> Result<Vec<TtlClause>, ParseError> {
    let mut out = Vec::new();
    loop {
        let expr = p.parse_expr()?;
        let mut trailing_parts = Vec::new();
        while p.at_any_keyword(&["DELETE", "TO", "GROUP", "RECOMPRESS", "DISK", "VOLUME"]) {
            trailing_parts.push(p.advance().text);
            if matches!(p.peek().kind, TokenKind::StringLiteral(_)) {
                trailing_parts.push(format!("'{}'", p.parse_string_literal()?));
            }
        }
        let trailing = if trailing_parts.is_empty() {
            None
        } else {
            Some(trailing_parts.join(" "))
        };
        out.push(TtlClause { expr, trailing });
        if !p.eat_kind(&TokenKind::Comma) {
            break;
        }
    }
    Ok(out)
}

fn parse_index_def(p: &mut Parser) -> Result<IndexDef, ParseError> {
    let name = p.parse_ident()?;
    let expression = p.parse_expr()?;
    p.expect_keyword("TYPE")?;
    let index_type = p.parse_ident()?;
    let type_args = parse_optional_call_args(p)?;
    p.expect_keyword("GRANULARITY")?;
    let granularity = match p.advance().kind {
        TokenKind::Number(n) => n.parse().unwrap_or(1),
        _ => 1,
    };
    Ok(IndexDef {
        name,
        expression,
        index_type,
        type_args,
        granularity,
    })
}

fn parse_constraint_def(p: &mut Parser) -> Result<ConstraintDef, ParseError> {
    let name = p.parse_ident()?;
    p.expect_keyword("CHECK")?;
    let expression = p.parse_expr()?;
    Ok(ConstraintDef { name, expression })
}

fn parse_column_def(p: &mut Parser) -> Result<Column, ParseError> {
    let name = p.parse_ident()?;
    let data_type = p.parse_column_type()?;

    let default_kind = if p.eat_keyword("DEFAULT") {
        Some(DefaultKind::Default)
    } else if p.eat_keyword("MATERIALIZED") {
        Some(DefaultKind::Materialized)
    } else if p.eat_keyword("EPHEMERAL") {
        Some(DefaultKind::Ephemeral)
    } else if p.eat_keyword("ALIAS") {
        Some(DefaultKind::Alias)
    } else {
        None
    };
    let default_expr = if default_kind.is_some() && !at_column_clause_boundary(p) {
        Some(p.parse_expr()?)
    } else {
        None
    };

    let mut codecs = Vec::new();
    if p.eat_keyword("CODEC") {
        p.expect_kind(TokenKind::LParen, "(")?;
        loop {
            let codec_name = p.parse_ident()?;
            let args = parse_optional_call_args(p)?;
            codecs.push(CodecSpec {
                name: codec_name,
                args,
            });
            if !p.eat_kind(&TokenKind::Comma) {
                break;
            }
        }
        p.expect_kind(TokenKind::RParen, ")")?;
    }

    let ttl = if p.eat_keyword("TTL") {
        Some(p.parse_expr()?)
    } else {
        None
    };

    let comment = parse_optional_comment(p)?;

    Ok(Column {
        name,
        data_type,
        default_kind,
        default_expr,
        codecs,
        ttl,
        comment,
    })
}

fn at_column_clause_boundary(p: &Parser) -> bool {
    p.at_any_keyword(&["CODEC", "TTL", "COMMENT"]) || p.peek().kind == TokenKind::Comma
        || p.peek().kind == TokenKind::RParen
}

fn parse_alter_table(p: &mut Parser) -> Result<Statement, ParseError> {
    let object = parse_object_ref(p)?;
    let cluster = p.eat_on_cluster()?;
    let mut ops = Vec::new();
    loop {
        if p.eat_keyword("ADD") {
            p.expect_keyword("COLUMN")?;
            let if_not_exists = p.eat_if_not_exists();
            let column = parse_column_def(p)?;
            let (first, after) = if p.eat_keyword("FIRST") {
                (true, None)
            } else if p.eat_keyword("AFTER") {
                (false, Some(p.parse_ident()?))
            } else {
                (false, None)
            };
            ops.push(AlterTableOp::AddColumn {
                column,
                if_not_exists,
                after,
                first,
            });
        } else if p.eat_keyword("DROP") {
            p.expect_keyword("COLUMN")?;
            let if_exists = p.eat_if_exists();
            let name = p.parse_ident()?;
            ops.push(AlterTableOp::DropColumn { name, if_exists });
        } else if p.eat_keyword("MODIFY") {
            if p.eat_keyword("COLUMN") {
                let if_exists = p.eat_if_exists();
                let column = parse_column_def(p)?;
                ops.push(AlterTableOp::ModifyColumn { column, if_exists });
            } else if p.eat_keyword("COMMENT") {
                ops.push(AlterTableOp::ModifyComment(p.parse_string_literal()?));
            } else if p.eat_keyword("SETTING") {
                ops.push(AlterTableOp::ModifySetting(p.parse_settings_list()?));
            } else if p.eat_keyword("TTL") {
                ops.push(AlterTableOp::ModifyTtl(parse_ttl_list(p)?));
            } else {
                return Err(p.unexpected("COLUMN, COMMENT, SETTING or TTL"));
            }
        } else if p.eat_keyword("RENAME") {
            p.expect_keyword("COLUMN")?;
            let if_exists = p.eat_if_exists();
            let from = p.parse_ident()?;
            p.expect_keyword("TO")?;
            let to = p.parse_ident()?;
            ops.push(AlterTableOp::RenameColumn { from, to, if_exists });
        } else if p.eat_keyword("RESET") {
            p.expect_keyword("SETTING")?;
            let mut names = vec![p.parse_ident()?];
            while p.eat_kind(&TokenKind::Comma) {
                names.push(p.parse_ident()?);
            }
            ops.push(AlterTableOp::ResetSetting(names));
        } else {
            break;
        }
        if !p.eat_kind(&TokenKind::Comma) {
            break;
        }
    }
    Ok(Statement::AlterTable(AlterTable {
        object,
        cluster,
        ops,
    }))
}

// ---------------------------------------------------------------------
// DICTIONARY
// ---------------------------------------------------------------------

fn parse_create_dictionary(p: &mut Parser, or_replace: bool) -> Result<Statement, ParseError> {
    let if_not_exists = p.eat_if_not_exists();
    let object = parse_object_ref(p)?;
    let cluster = p.eat_on_cluster()?;

    p.expect_kind(TokenKind::LParen, "(")?;
    let mut columns = Vec::new();
    if p.peek().kind != TokenKind::RParen {
        loop {
            columns.push(parse_dictionary_column(p)?);
            if !p.eat_kind(&TokenKind::Comma) {
                break;
            }
        }
    }
    p.expect_kind(TokenKind::RParen, ")")?;

    p.expect_keyword_or_seq(&["PRIMARY", "KEY"])?;
    let mut primary_key = vec![p.parse_ident()?];
    while p.eat_kind(&TokenKind::Comma) {
        primary_key.push(p.parse_ident()?);
    }

    let mut source = None;
    let mut layout = None;
    let mut lifetime = None;
    let mut settings = Vec::new();
    let mut comment = None;
    loop {
        if source.is_none() && p.eat_keyword("SOURCE") {
            source = Some(parse_dictionary_source(p)?);
        } else if layout.is_none() && p.eat_keyword("LAYOUT") {
            layout = Some(parse_dictionary_layout(p)?);
        } else if lifetime.is_none() && p.eat_keyword("LIFETIME") {
            lifetime = Some(parse_dictionary_lifetime(p)?);
        } else if settings.is_empty() && p.eat_keyword("SETTINGS") {
            p.expect_kind(TokenKind::LParen, "(")?;
            settings = p.parse_settings_list()?;
            p.expect_kind(TokenKind::RParen, ")")?;
        } else if comment.is_none() && p.at_keyword("COMMENT") {
            comment = parse_optional_comment(p)?;
        } else {
            break;
        }
    }

    Ok(Statement::CreateDictionary(Dictionary {
        object,
        cluster,
        if_not_exists,
        or_replace,
        columns,
        primary_key,
        source: source.ok_or_else(|| p.unexpected("SOURCE(...)"))?,
        layout: layout.ok_or_else(|| p.unexpected("LAYOUT(...)"))?,
        lifetime,
        settings,
        comment,
    }))
}

fn parse_dictionary_column(p: &mut Parser) -> Result<DictionaryColumn, ParseError> {
    let name = p.parse_ident()?;
    let data_type = p.parse_column_type()?;
    let mut is_object_id = false;
    let mut hierarchical = false;
    let mut injective = false;
    let mut default_expr = None;
    let mut expression_expr = None;
    loop {
        if p.eat_keyword("IS_OBJECT_ID") {
            is_object_id = true;
        } else if p.eat_keyword("HIERARCHICAL") {
            hierarchical = true;
        } else if p.eat_keyword("INJECTIVE") {
            injective = true;
        } else if p.eat_keyword("DEFAULT") {
            default_expr = Some(p.parse_expr()?);
        } else if p.eat_keyword("EXPRESSION") {
            expression_expr = Some(p.parse_expr()?);
        } else {
            break;
        }
    }
    let comment = parse_optional_comment(p)?;
    Ok(DictionaryColumn {
        name,
        data_type,
        is_object_id,
        hierarchical,
        injective,
        default_expr,
        expression_expr,
        comment,
    })
}

fn parse_dictionary_source(p: &mut Parser) -> Result<DictionarySource, ParseError> {
    let name = p.parse_ident()?;
    p.expect_kind(TokenKind::LParen, "(")?;
    let mut args = Vec::new();
    while p.peek().kind != TokenKind::RParen {
        args.push(parse_named_arg(p)?);
    }
    p.expect_kind(TokenKind::RParen, ")")?;
    Ok(DictionarySource { name, args })
}

/// Named source args are whitespace-separated (`url 'x' format 'y'`), and
/// a value position may itself be a nested function call
/// (`headers(header(name 'x' value 'y'))`).
fn parse_named_arg(p: &mut Parser) -> Result<NamedArg, ParseError> {
    let name = p.parse_ident()?;
    if p.peek().kind == TokenKind::LParen {
        let nested = parse_nested_source_call(p, name.clone())?;
        return Ok(NamedArg {
            name,
            value: SourceArgValue::Nested(Box::new(nested)),
        });
    }
    let value = p.parse_primary_expr_for_arg()?;
    Ok(NamedArg {
        name,
        value: SourceArgValue::Expr(value),
    })
}

fn parse_nested_source_call(p: &mut Parser, name: String) -> Result<DictionarySource, ParseError> {
    p.expect_kind(TokenKind::LParen, "(")?;
    let mut args = Vec::new();
    while p.peek().kind != TokenKind::RParen {
        args.push(parse_named_arg(p)?);
    }
    p.expect_kind(TokenKind::RParen, ")")?;
    Ok(DictionarySource { name, args })
}

fn parse_dictionary_layout(p: &mut Parser) -> Result<DictionaryLayout, ParseError> {
    p.expect_kind(TokenKind::LParen, "(")?;
    let name = p.parse_ident()?;
    let mut params = Vec::new();
    if p.eat_kind(&TokenKind::LParen) {
        while p.peek().kind != TokenKind::RParen {
            let key = p.parse_ident()?;
            let value = p.parse_primary_expr_for_arg()?;
            params.push((key, value));
        }
        p.expect_kind(TokenKind::RParen, ")")?;
    }
    p.expect_kind(TokenKind::RParen, ")")?;
    Ok(DictionaryLayout { name, params })
}

fn parse_dictionary_lifetime(p: &mut Parser) -> Result<DictionaryLifetime, ParseError> {
    p.expect_kind(TokenKind::LParen, "(")?;
    if p.eat_keyword("MIN") {
        let min = p.parse_expr()?;
        p.expect_keyword("MAX")?;
        let max = p.parse_expr()?;
        p.expect_kind(TokenKind::RParen, ")")?;
        return Ok(DictionaryLifetime::Range { min, max });
    }
    let value = p.parse_expr()?;
    p.expect_kind(TokenKind::RParen, ")")?;
    Ok(DictionaryLifetime::Single(value))
}

// ---------------------------------------------------------------------
// VIEWS
// ---------------------------------------------------------------------

fn parse_create_view(p: &mut Parser, or_replace: bool) -> Result<Statement, ParseError> {
    let if_not_exists = p.eat_if_not_exists();
    let object = parse_object_ref(p)?;
    let cluster = p.eat_on_cluster()?;
    let comment = parse_optional_comment(p)?;
    p.expect_keyword("AS")?;
    let query = p.parse_select()?;
    let comment = comment.or(parse_optional_comment(p)?);
    Ok(Statement::CreateView(RegularView {
        object,
        cluster,
        if_not_exists,
        or_replace,
        query,
        comment,
    }))
}

fn parse_create_materialized_view(
    p: &mut Parser,
    or_replace: bool,
) -> Result<Statement, ParseError> {
    let if_not_exists = p.eat_if_not_exists();
    let object = parse_object_ref(p)?;
    let cluster = p.eat_on_cluster()?;

    let target = if p.eat_keyword("TO") {
        Some(parse_object_ref(p)?)
    } else {
        None
    };

    let clauses = parse_table_engine_clauses(p)?;

    let populate = p.eat_keyword("POPULATE");

    let refresh = if p.eat_keyword("REFRESH") {
        Some(parse_refresh_policy(p)?)
    } else {
        None
    };

    let comment = parse_optional_comment(p)?;
    p.expect_keyword("AS")?;
    let query = p.parse_select()?;
    let comment = comment.or(parse_optional_comment(p)?);

    Ok(Statement::CreateMaterializedView(MaterializedView {
        object,
        cluster,
        if_not_exists,
        or_replace,
        target,
        clauses,
        populate,
        refresh,
        query,
        comment,
    }))
}

fn parse_refresh_policy(p: &mut Parser) -> Result<RefreshPolicy, ParseError> {
    p.expect_keyword("EVERY")?;
    let every = parse_refresh_interval(p)?;
    let offset = if p.eat_keyword("OFFSET") {
        Some(parse_refresh_interval(p)?)
    } else {
        None
    };
    let append_to = if p.eat_keyword_seq(&["APPEND", "TO"]) {
        Some(Identifier(p.parse_dotted_path()?))
    } else {
        None
    };
    Ok(RefreshPolicy {
        every,
        offset,
        append_to,
    })
}

fn parse_refresh_interval(p: &mut Parser) -> Result<(u64, RefreshUnit), ParseError> {
    let n = match p.advance().kind {
        TokenKind::Number(s) => s.parse().unwrap_or(1),
        _ => return Err(p.unexpected("a number")),
    };
    let unit_word = p.parse_ident()?;
    let unit = match unit_word.to_ascii_uppercase().trim_end_matches('S') {
        "SECOND" => RefreshUnit::Second,
        "MINUTE" => RefreshUnit::Minute,
        "HOUR" => RefreshUnit::Hour,
        "DAY" => RefreshUnit::Day,
        "WEEK" => RefreshUnit::Week,
        "MONTH" => RefreshUnit::Month,
        "YEAR" => RefreshUnit::Year,
        _ => return Err(p.unexpected("a time unit")),
    };
    Ok((n, unit))
}

// ---------------------------------------------------------------------
// NAMED COLLECTION
// ---------------------------------------------------------------------

fn parse_create_named_collection(
    p: &mut Parser,
    or_replace: bool,
) -> Result<Statement, ParseError> {
    let name = p.parse_ident()?;
    let cluster = p.eat_on_cluster()?;
    let mut entries = Vec::new();
    let mut comment = None;
    if p.eat_keyword("AS") {
        loop {
            if p.at_keyword("COMMENT") {
                break;
            }
            let key = p.parse_ident()?;
            p.expect_kind(TokenKind::Eq, "=")?;
            let value = p.parse_expr()?;
            let overridable = if p.eat_keyword("OVERRIDABLE") {
                Some(true)
            } else if p.eat_keyword_seq(&["NOT", "OVERRIDABLE"]) {
                Some(false)
            } else {
                None
            };
            entries.push(NamedCollectionEntry {
                key,
                value,
                overridable,
            });
            if !p.eat_kind(&TokenKind::Comma) {
                break;
            }
        }
    }
    comment = comment.or(parse_optional_comment(p)?);
    Ok(Statement::CreateNamedCollection(NamedCollection {
        name,
        cluster,
        or_replace,
        entries,
        comment,
    }))
}

fn parse_alter_named_collection(p: &mut Parser) -> Result<Statement, ParseError> {
    let name = p.parse_ident()?;
    let cluster = p.eat_on_cluster()?;
    let mut set_entries = Vec::new();
    let mut delete_keys = Vec::new();
    if p.eat_keyword("SET") {
        loop {
            let key = p.parse_ident()?;
            p.expect_kind(TokenKind::Eq, "=")?;
            let value = p.parse_expr()?;
            let overridable = if p.eat_keyword("OVERRIDABLE") {
                Some(true)
            } else if p.eat_keyword_seq(&["NOT", "OVERRIDABLE"]) {
                Some(false)
            } else {
                None
            };
            set_entries.push(NamedCollectionEntry {
                key,
                value,
                overridable,
            });
            if !p.eat_kind(&TokenKind::Comma) {
                break;
            }
        }
    }
    if p.eat_keyword("DELETE") {
        loop {
            delete_keys.push(p.parse_ident()?);
            if !p.eat_kind(&TokenKind::Comma) {
                break;
            }
        }
    }
    Ok(Statement::AlterNamedCollection(AlterNamedCollection {
        name,
        cluster,
        set_entries,
        delete_keys,
    }))
}

// ---------------------------------------------------------------------
// ROLE / GRANT / REVOKE / FUNCTION
// ---------------------------------------------------------------------

fn parse_create_role(p: &mut Parser) -> Result<Statement, ParseError> {
    let name = p.parse_ident()?;
    let cluster = p.eat_on_cluster()?;
    let settings = if p.eat_keyword("SETTINGS") {
        p.parse_settings_list()?
    } else {
        Vec::new()
    };
    Ok(Statement::CreateRole(Role {
        name,
        cluster,
        settings,
    }))
}

fn parse_alter_role(p: &mut Parser) -> Result<Statement, ParseError> {
    let name = p.parse_ident()?;
    let cluster = p.eat_on_cluster()?;
    let settings = if p.eat_keyword("SETTINGS") {
        p.parse_settings_list()?
    } else {
        Vec::new()
    };
    Ok(Statement::AlterRole(AlterRole {
        name,
        cluster,
        settings,
    }))
}

fn parse_grant_target(p: &mut Parser) -> Result<GrantTarget, ParseError> {
    let first = p.parse_ident()?;
    if p.eat_kind(&TokenKind::Dot) {
        if p.eat_kind(&TokenKind::Star) {
            return Ok(GrantTarget {
                database: first,
                table: None,
            });
        }
        let table = p.parse_ident()?;
        return Ok(GrantTarget {
            database: first,
            table: Some(table),
        });
    }
    Ok(GrantTarget {
        database: first,
        table: None,
    })
}

fn parse_grant(p: &mut Parser) -> Result<Statement, ParseError> {
    p.expect_keyword("GRANT")?;
    let cluster = p.eat_on_cluster()?;
    let mut privileges = vec![parse_privilege(p)?];
    while p.eat_kind(&TokenKind::Comma) {
        privileges.push(parse_privilege(p)?);
    }
    p.expect_keyword("ON")?;
    let target = parse_grant_target(p)?;
    p.expect_keyword("TO")?;
    let to = p.parse_ident()?;
    let with_grant_option = p.eat_keyword_seq(&["WITH", "GRANT", "OPTION"]);
    Ok(Statement::Grant(Grant {
        privileges,
        target,
        to,
        with_grant_option,
        cluster,
    }))
}

fn parse_revoke(p: &mut Parser) -> Result<Statement, ParseError> {
    p.expect_keyword("REVOKE")?;
    let cluster = p.eat_on_cluster()?;
    let mut privileges = vec![parse_privilege(p)?];
    while p.eat_kind(&TokenKind::Comma) {
        privileges.push(parse_privilege(p)?);
    }
    p.expect_keyword("ON")?;
    let target = parse_grant_target(p)?;
    p.expect_keyword("FROM")?;
    let from = p.parse_ident()?;
    Ok(Statement::Revoke(Revoke {
        privileges,
        target,
        from,
        cluster,
    }))
}

fn parse_privilege(p: &mut Parser) -> Result<String, ParseError> {
    let mut words = vec![p.parse_ident()?];
    // multi-word privileges, e.g. "SHOW TABLES", "ALTER TABLE"
    while let TokenKind::Ident(w) = p.peek().kind.clone() {
        if w.eq_ignore_ascii_case("ON") {
            break;
        }
        words.push(p.parse_ident()?);
    }
    Ok(words.join(" ").to_ascii_uppercase())
}

fn parse_create_function(p: &mut Parser) -> Result<Statement, ParseError> {
    let name = p.parse_ident()?;
    let cluster = p.eat_on_cluster()?;
    p.expect_keyword("AS")?;
    p.expect_kind(TokenKind::LParen, "(")?;
    let mut args = Vec::new();
    if p.peek().kind != TokenKind::RParen {
        loop {
            args.push(p.parse_ident()?);
            if !p.eat_kind(&TokenKind::Comma) {
                break;
            }
        }
    }
    p.expect_kind(TokenKind::RParen, ")")?;
    p.expect_kind(TokenKind::Minus, "->")?;
    p.expect_kind(TokenKind::Gt, "->")?;
    let body = p.parse_expr()?;
    Ok(Statement::CreateFunction(Function {
        name,
        cluster,
        args,
        body,
    }))
}

// ---------------------------------------------------------------------
// ALTER dispatch
// ---------------------------------------------------------------------

fn parse_alter(p: &mut Parser) -> Result<Statement, ParseError> {
    p.expect_keyword("ALTER")?;
    if p.eat_keyword("DATABASE") {
        let name = p.parse_ident()?;
        let cluster = p.eat_on_cluster()?;
        p.expect_keyword("MODIFY")?;
        p.expect_keyword("COMMENT")?;
        let comment = p.parse_string_literal()?;
        return Ok(Statement::AlterDatabase(AlterDatabase {
            name,
            cluster,
            comment,
        }));
    }
    if p.eat_keyword("TABLE") {
        return parse_alter_table(p);
    }
    if p.at_keyword_seq(&["NAMED", "COLLECTION"]) {
        p.advance();
        p.advance();
        return parse_alter_named_collection(p);
    }
    if p.eat_keyword("ROLE") {
        return parse_alter_role(p);
    }
    Err(p.unexpected("DATABASE, TABLE, NAMED COLLECTION or ROLE"))
}

// ---------------------------------------------------------------------
// ATTACH / DETACH / DROP / RENAME dispatch
// ---------------------------------------------------------------------

fn parse_attach(p: &mut Parser) -> Result<Statement, ParseError> {
    p.expect_keyword("ATTACH")?;
    if p.eat_keyword("DATABASE") {
        let if_not_exists = p.eat_if_not_exists();
        let name = p.parse_ident()?;
        let cluster = p.eat_on_cluster()?;
        let _ = if_not_exists;
        return Ok(Statement::AttachDatabase(SimpleDatabaseRef { name, cluster }));
    }
    if p.eat_keyword("TABLE") {
        let if_not_exists = p.eat_if_not_exists();
        let object = parse_object_ref(p)?;
        let cluster = p.eat_on_cluster()?;
        return Ok(Statement::AttachTable(SimpleObjectRef {
            object,
            cluster,
            if_not_exists,
        }));
    }
    if p.eat_keyword("DICTIONARY") {
        let if_not_exists = p.eat_if_not_exists();
        let object = parse_object_ref(p)?;
        let cluster = p.eat_on_cluster()?;
        return Ok(Statement::AttachDictionary(SimpleObjectRef {
            object,
            cluster,
            if_not_exists,
        }));
    }
    if p.eat_keyword("VIEW") {
        let if_not_exists = p.eat_if_not_exists();
        let object = parse_object_ref(p)?;
        let cluster = p.eat_on_cluster()?;
        return Ok(Statement::AttachView(SimpleObjectRef {
            object,
            cluster,
            if_not_exists,
        }));
    }
    Err(p.unexpected("DATABASE, TABLE, DICTIONARY or VIEW"))
}

fn parse_detach(p: &mut Parser) -> Result<Statement, ParseError> {
    p.expect_keyword("DETACH")?;
    if p.eat_keyword("DATABASE") {
        let if_exists = p.eat_if_exists();
        let name = p.parse_ident()?;
        let cluster = p.eat_on_cluster()?;
        let (permanently, sync) = parse_detach_trailer(p);
        let _ = if_exists;
        return Ok(Statement::DetachDatabase(DetachDatabaseRef {
            name,
            cluster,
            permanently,
            sync,
        }));
    }
    let (kind, if_exists, object, cluster, permanently, sync) = parse_object_detach_body(p)?;
    let r = DetachObjectRef {
        object,
        cluster,
        if_exists,
        permanently,
        sync,
    };
    match kind {
        ObjectKeyword::Table => Ok(Statement::DetachTable(r)),
        ObjectKeyword::Dictionary => Ok(Statement::DetachDictionary(r)),
        ObjectKeyword::View => Ok(Statement::DetachView(r)),
    }
}

enum ObjectKeyword {
    Table,
    Dictionary,
    View,
}

fn parse_object_detach_body(
    p: &mut Parser,
) -> Result<(ObjectKeyword, bool, ObjectRef, Option<String>, bool, bool), ParseError> {
    let kind = if p.eat_keyword("TABLE") {
        ObjectKeyword::Table
    } else if p.eat_keyword("DICTIONARY") {
        ObjectKeyword::Dictionary
    } else if p.eat_keyword("VIEW") {
        ObjectKeyword::View
    } else {
        return Err(p.unexpected("TABLE, DICTIONARY or VIEW"));
    };
    let if_exists = p.eat_if_exists();
    let object = parse_object_ref(p)?;
    let cluster = p.eat_on_cluster()?;
    let (permanently, sync) = parse_detach_trailer(p);
    Ok((kind, if_exists, object, cluster, permanently, sync))
}

fn parse_detach_trailer(p: &mut Parser) -> (bool, bool) {
    let permanently = p.eat_keyword("PERMANENTLY");
    let sync = p.eat_keyword("SYNC");
    (permanently, sync)
}

fn parse_drop(p: &mut Parser) -> Result<Statement, ParseError> {
    p.expect_keyword("DROP")?;
    if p.eat_keyword("DATABASE") {
        let if_exists = p.eat_if_exists();
        let name = p.parse_ident()?;
        let cluster = p.eat_on_cluster()?;
        let sync = p.eat_keyword("SYNC");
        return Ok(Statement::DropDatabase(DropDatabaseRef {
            name,
            cluster,
            if_exists,
            sync,
        }));
    }
    if p.eat_keyword("TABLE") {
        return Ok(Statement::DropTable(parse_drop_object_ref(p)?));
    }
    if p.eat_keyword("DICTIONARY") {
        return Ok(Statement::DropDictionary(parse_drop_object_ref(p)?));
    }
    if p.eat_keyword("VIEW") {
        return Ok(Statement::DropView(parse_drop_object_ref(p)?));
    }
    if p.at_keyword_seq(&["NAMED", "COLLECTION"]) {
        p.advance();
        p.advance();
        return Ok(Statement::DropNamedCollection(parse_drop_object_ref(p)?));
    }
    if p.eat_keyword("ROLE") {
        let if_exists = p.eat_if_exists();
        let name = p.parse_ident()?;
        let cluster = p.eat_on_cluster()?;
        return Ok(Statement::DropRole(DropDatabaseRef {
            name,
            cluster,
            if_exists,
            sync: false,
        }));
    }
    if p.eat_keyword("FUNCTION") {
        let if_exists = p.eat_if_exists();
        let name = p.parse_ident()?;
        let cluster = p.eat_on_cluster()?;
        return Ok(Statement::DropFunction(DropDatabaseRef {
            name,
            cluster,
            if_exists,
            sync: false,
        }));
    }
    Err(p.unexpected(
        "DATABASE, TABLE, DICTIONARY, VIEW, NAMED COLLECTION, ROLE or FUNCTION",
    ))
}

fn parse_drop_object_ref(p: &mut Parser) -> Result<DropObjectRef, ParseError> {
    let if_exists = p.eat_if_exists();
    let object = parse_object_ref(p)?;
    let cluster = p.eat_on_cluster()?;
    let sync = p.eat_keyword("SYNC");
    Ok(DropObjectRef {
        object,
        cluster,
        if_exists,
        sync,
    })
}

fn parse_rename(p: &mut Parser) -> Result<Statement, ParseError> {
    p.expect_keyword("RENAME")?;
    if p.eat_keyword("DATABASE") {
        let from = p.parse_ident()?;
        p.expect_keyword("TO")?;
        let to = p.parse_ident()?;
        let cluster = p.eat_on_cluster()?;
        return Ok(Statement::RenameDatabase(RenameDatabaseRef {
            from,
            to,
            cluster,
        }));
    }
    if p.eat_keyword("TABLE") {
        let from = parse_object_ref(p)?;
        p.expect_keyword("TO")?;
        let to = parse_object_ref(p)?;
        let cluster = p.eat_on_cluster()?;
        return Ok(Statement::RenameTable(RenameObjectRef { from, to, cluster }));
    }
    if p.eat_keyword("DICTIONARY") {
        let from = parse_object_ref(p)?;
        p.expect_keyword("TO")?;
        let to = parse_object_ref(p)?;
        let cluster = p.eat_on_cluster()?;
        return Ok(Statement::RenameDictionary(RenameObjectRef { from, to, cluster }));
    }
    if p.eat_keyword("ROLE") {
        let from = p.parse_ident()?;
        p.expect_keyword("TO")?;
        let to = p.parse_ident()?;
        let cluster = p.eat_on_cluster()?;
        return Ok(Statement::RenameRole(RenameDatabaseRef { from, to, cluster }));
    }
    Err(p.unexpected("DATABASE, TABLE, DICTIONARY or ROLE"))
}

impl Parser {
    fn expect_keyword_or_seq(&mut self, words: &[&str]) -> Result<(), ParseError> {
        if words.len() == 1 {
            self.expect_keyword(words[0])
        } else if self.eat_keyword_seq(words) {
            Ok(())
        } else {
            Err(self.unexpected(words.join(" ")))
        }
    }

    /// A restricted expression parse used for dictionary SOURCE/LAYOUT
    /// argument values, which are whitespace-separated rather than
    /// comma-separated and so cannot use the general comma-aware
    /// expression grammar directly at the call site.
    fn parse_primary_expr_for_arg(&mut self) -> Result<Expr, ParseError> {
        self.parse_expr()
    }
}
