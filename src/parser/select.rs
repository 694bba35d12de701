use super::Parser;
use crate::ast::{
    Cte, GroupBy, GroupByModifier, Join, JoinConstraint, JoinKind, SelectItem, SelectStatement,
    TableFactor, TableWithJoins,
};
use crate::error::ParseError;
use crate::lexer::TokenKind;

impl Parser {
    pub(super) fn parse_select(&mut self) -> Result<SelectStatement, ParseError> {
        let mut stmt = SelectStatement::default();

        if self.eat_keyword("WITH") {
            stmt.recursive = self.eat_keyword("RECURSIVE");
            loop {
                let name = self.parse_ident()?;
                self.expect_keyword("AS")?;
                self.expect_kind(TokenKind::LParen, "(")?;
                let query = self.parse_select()?;
                self.expect_kind(TokenKind::RParen, ")")?;
                stmt.ctes.push(Cte {
                    name,
                    query: Box::new(query),
                });
                if !self.eat_kind(&TokenKind::Comma) {
                    break;
                }
            }
        }

        self.expect_keyword("SELECT")?;
        stmt.distinct = self.eat_keyword("DISTINCT");

        loop {
            stmt.projection.push(self.parse_select_item()?);
            if !self.eat_kind(&TokenKind::Comma) {
                break;
            }
        }

        if self.eat_keyword("FROM") {
            loop {
                stmt.from.push(self.parse_table_with_joins()?);
                if !self.eat_kind(&TokenKind::Comma) {
                    break;
                }
            }
        }

        if self.eat_keyword("WHERE") {
            stmt.where_clause = Some(self.parse_expr()?);
        }

        if self.eat_keyword_seq(&["GROUP", "BY"]) {
            stmt.group_by = Some(self.parse_group_by()?);
        }

        if self.eat_keyword("HAVING") {
            stmt.having = Some(self.parse_expr()?);
        }

        if self.eat_keyword_seq(&["ORDER", "BY"]) {
            stmt.order_by = self.parse_order_by_items()?;
        }

        if self.eat_keyword("LIMIT") {
            stmt.limit = Some(self.parse_expr()?);
            if self.eat_keyword("OFFSET") {
                stmt.offset = Some(self.parse_expr()?);
            } else if self.eat_kind(&TokenKind::Comma) {
                // LIMIT offset, count
                let count = stmt.limit.take().unwrap();
                stmt.offset = Some(count);
                stmt.limit = Some(self.parse_expr()?);
            }
        }

        if self.eat_keyword("SETTINGS") {
            stmt.settings = self.parse_settings_list()?;
        }

        Ok(stmt)
    }

    pub(super) fn parse_settings_list(&mut self) -> Result<Vec<(String, String)>, ParseError> {
        let mut out = Vec::new();
        loop {
            let key = self.parse_ident()?;
            self.expect_kind(TokenKind::Eq, "=")?;
            let value = self.parse_setting_value()?;
            out.push((key, value));
            if !self.eat_kind(&TokenKind::Comma) {
                break;
            }
        }
        Ok(out)
    }

    fn parse_setting_value(&mut self) -> Result<String, ParseError> {
        match self.peek().kind.clone() {
            TokenKind::StringLiteral(s) => {
                self.advance();
                Ok(s)
            }
            TokenKind::Number(n) => {
                self.advance();
                Ok(n)
            }
            TokenKind::Ident(word) => {
                self.advance();
                Ok(word)
            }
            _ => Err(self.unexpected("a setting value")),
        }
    }

    fn parse_group_by(&mut self) -> Result<GroupBy, ParseError> {
        if self.eat_keyword("ALL") {
            return Ok(GroupBy::All);
        }
        let with = if self.eat_keyword("WITH") {
            if self.eat_keyword("CUBE") {
                Some(GroupByModifier::Cube)
            } else if self.eat_keyword("ROLLUP") {
                Some(GroupByModifier::Rollup)
            } else if self.eat_keyword("TOTALS") {
                Some(GroupByModifier::Totals)
            } else {
                return Err(self.unexpected("CUBE, ROLLUP or TOTALS"));
            }
        } else {
            None
        };
        let mut exprs = Vec::new();
        if with.is_none() {
            loop {
                exprs.push(self.parse_expr()?);
                if !self.eat_kind(&TokenKind::Comma) {
                    break;
                }
            }
        }
        Ok(GroupBy::Exprs { exprs, with })
    }

    fn parse_select_item(&mut self) -> Result<SelectItem, ParseError> {
        if self.peek().kind == TokenKind::Star {
            self.advance();
            return Ok(SelectItem::Wildcard);
        }
        let expr = self.parse_expr()?;
        if self.eat_keyword("AS") {
            let alias = self.parse_ident()?;
            return Ok(SelectItem::ExprWithAlias(expr, alias));
        }
        // bare alias: `expr alias` without AS, as long as the next token
        // isn't a clause keyword.
        if let TokenKind::Ident(word) = self.peek().kind.clone() {
            if !is_clause_keyword(&word) {
                let alias = self.parse_ident()?;
                return Ok(SelectItem::ExprWithAlias(expr, alias));
            }
        }
        Ok(SelectItem::Expr(expr))
    }

    fn parse_table_with_joins(&mut self) -> Result<TableWithJoins, ParseError> {
        let relation = self.parse_table_factor()?;
        let mut joins = Vec::new();
        loop {
            let global = self.eat_keyword("GLOBAL");
            let kind = if self.eat_keyword("INNER") {
                self.expect_keyword("JOIN")?;
                JoinKind::Inner
            } else if self.eat_keyword("LEFT") {
                let _ = self.eat_keyword("OUTER");
                self.expect_keyword("JOIN")?;
                JoinKind::Left
            } else if self.eat_keyword("RIGHT") {
                let _ = self.eat_keyword("OUTER");
                self.expect_keyword("JOIN")?;
                JoinKind::Right
            } else if self.eat_keyword("FULL") {
                let _ = self.eat_keyword("OUTER");
                self.expect_keyword("JOIN")?;
                JoinKind::Full
            } else if self.eat_keyword("CROSS") {
                self.expect_keyword("JOIN")?;
                JoinKind::Cross
            } else if self.eat_keyword("ARRAY") {
                self.expect_keyword("JOIN")?;
                JoinKind::Array
            } else if self.eat_keyword_seq(&["ASOF"]) {
                self.expect_keyword("JOIN")?;
                JoinKind::Asof
            } else if self.eat_keyword("JOIN") {
                JoinKind::Inner
            } else {
                break;
            };
            let relation = self.parse_table_factor()?;
            let constraint = if self.eat_keyword("ON") {
                JoinConstraint::On(self.parse_expr()?)
            } else if self.eat_keyword("USING") {
                self.expect_kind(TokenKind::LParen, "(")?;
                let mut cols = Vec::new();
                loop {
                    cols.push(self.parse_ident()?);
                    if !self.eat_kind(&TokenKind::Comma) {
                        break;
                    }
                }
                self.expect_kind(TokenKind::RParen, ")")?;
                JoinConstraint::Using(cols)
            } else {
                JoinConstraint::None
            };
            joins.push(Join {
                kind,
                global,
                relation,
                constraint,
            });
        }
        Ok(TableWithJoins { relation, joins })
    }

    fn parse_table_factor(&mut self) -> Result<TableFactor, ParseError> {
        if self.peek().kind == TokenKind::LParen {
            self.advance();
            let query = self.parse_select()?;
            self.expect_kind(TokenKind::RParen, ")")?;
            let alias = self.parse_optional_alias()?;
            return Ok(TableFactor::Subquery {
                query: Box::new(query),
                alias,
            });
        }

        let path = self.parse_dotted_path()?;
        if self.peek().kind == TokenKind::LParen {
            self.advance();
            let mut args = Vec::new();
            if self.peek().kind != TokenKind::RParen {
                loop {
                    args.push(self.parse_expr()?);
                    if !self.eat_kind(&TokenKind::Comma) {
                        break;
                    }
                }
            }
            self.expect_kind(TokenKind::RParen, ")")?;
            let alias = self.parse_optional_alias()?;
            return Ok(TableFactor::TableFunction {
                name: path.join("."),
                args,
                alias,
            });
        }

        let final_ = self.eat_keyword("FINAL");
        let alias = self.parse_optional_alias()?;
        Ok(TableFactor::Table {
            name: path,
            alias,
            final_,
        })
    }

    fn parse_optional_alias(&mut self) -> Result<Option<String>, ParseError> {
        if self.eat_keyword("AS") {
            return Ok(Some(self.parse_ident()?));
        }
        if let TokenKind::Ident(word) = self.peek().kind.clone() {
            if !is_clause_keyword(&word) {
                return Ok(Some(self.parse_ident()?));
            }
        }
        Ok(None)
    }
}

fn is_clause_keyword(word: &str) -> bool {
    const KEYWORDS: &[&str] = &[
        "FROM", "WHERE", "GROUP", "HAVING", "ORDER", "LIMIT", "SETTINGS", "JOIN", "INNER", "LEFT",
        "RIGHT", "FULL", "CROSS", "ARRAY", "ASOF", "GLOBAL", "ON", "USING", "UNION", "FINAL",
    ];
    KEYWORDS.iter().any(|k| word.eq_ignore_ascii_case(k))
}
