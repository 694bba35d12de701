use super::Parser;
use crate::ast::{
    BinaryOp, Expr, FrameBound, FrameUnits, Identifier, Literal, NullsOrder, OrderByItem, UnaryOp,
    WindowSpec,
};
use crate::error::ParseError;
use crate::lexer::TokenKind;

impl Parser {
    /// Entry point: weakest-binding level is logical OR.
    pub(super) fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_and()?;
        while self.eat_keyword("OR") {
            let right = self.parse_and()?;
            left = Expr::BinaryOp {
                left: Box::new(left),
                op: BinaryOp::Or,
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_not()?;
        while self.eat_keyword("AND") {
            let right = self.parse_not()?;
            left = Expr::BinaryOp {
                left: Box::new(left),
                op: BinaryOp::And,
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> Result<Expr, ParseError> {
        if self.eat_keyword("NOT") {
            let inner = self.parse_not()?;
            Ok(Expr::UnaryOp {
                op: UnaryOp::Not,
                expr: Box::new(inner),
            })
        } else {
            self.parse_comparison()
        }
    }

    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        let expr = self.parse_additive()?;
        self.parse_comparison_tail(expr)
    }

    fn parse_comparison_tail(&mut self, expr: Expr) -> Result<Expr, ParseError> {
        // BETWEEN
        if self.eat_keyword("BETWEEN") {
            let low = self.parse_additive()?;
            self.expect_keyword("AND")?;
            let high = self.parse_additive()?;
            return Ok(Expr::Between {
                expr: Box::new(expr),
                low: Box::new(low),
                high: Box::new(high),
                negated: false,
            });
        }
        if self.at_keyword_seq(&["NOT", "BETWEEN"]) {
            self.advance();
            self.advance();
            let low = self.parse_additive()?;
            self.expect_keyword("AND")?;
            let high = self.parse_additive()?;
            return Ok(Expr::Between {
                expr: Box::new(expr),
                low: Box::new(low),
                high: Box::new(high),
                negated: true,
            });
        }
        // IS [NOT] NULL
        if self.eat_keyword("IS") {
            let negated = self.eat_keyword("NOT");
            self.expect_keyword("NULL")?;
            return Ok(Expr::IsNull {
                expr: Box::new(expr),
                negated,
            });
        }
        // IN / NOT IN
        if self.eat_keyword("IN") {
            return self.parse_in_tail(expr, false);
        }
        if self.at_keyword_seq(&["NOT", "IN"]) {
            self.advance();
            self.advance();
            return self.parse_in_tail(expr, true);
        }
        // LIKE / NOT LIKE
        if self.eat_keyword("LIKE") {
            let pattern = self.parse_additive()?;
            return Ok(Expr::Like {
                expr: Box::new(expr),
                pattern: Box::new(pattern),
                negated: false,
            });
        }
        if self.at_keyword_seq(&["NOT", "LIKE"]) {
            self.advance();
            self.advance();
            let pattern = self.parse_additive()?;
            return Ok(Expr::Like {
                expr: Box::new(expr),
                pattern: Box::new(pattern),
                negated: true,
            });
        }

        let op = match self.peek().kind {
            TokenKind::Eq => Some(BinaryOp::Eq),
            TokenKind::NotEq => Some(BinaryOp::NotEq),
            TokenKind::Lt => Some(BinaryOp::Lt),
            TokenKind::LtEq => Some(BinaryOp::LtEq),
            TokenKind::Gt => Some(BinaryOp::Gt),
            TokenKind::GtEq => Some(BinaryOp::GtEq),
            _ => None,
        };
        if let Some(op) = op {
            self.advance();
            let right = self.parse_additive()?;
            return Ok(Expr::BinaryOp {
                left: Box::new(expr),
                op,
                right: Box::new(right),
            });
        }

        Ok(expr)
    }

    fn parse_in_tail(&mut self, expr: Expr, negated: bool) -> Result<Expr, ParseError> {
        self.expect_kind(TokenKind::LParen, "(")?;
        if self.at_keyword("SELECT") || self.at_keyword("WITH") {
            let query = self.parse_select()?;
            self.expect_kind(TokenKind::RParen, ")")?;
            return Ok(Expr::InSubquery {
                expr: Box::new(expr),
                subquery: Box::new(query),
                negated,
            });
        }
        let mut list = Vec::new();
        if self.peek().kind != TokenKind::RParen {
            loop {
                list.push(self.parse_expr()?);
                if !self.eat_kind(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect_kind(TokenKind::RParen, ")")?;
        Ok(Expr::InList {
            expr: Box::new(expr),
            list,
            negated,
        })
    }

    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Plus => BinaryOp::Plus,
                TokenKind::Minus => BinaryOp::Minus,
                TokenKind::Concat => BinaryOp::Concat,
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            left = Expr::BinaryOp {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::Percent => BinaryOp::Mod,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            left = Expr::BinaryOp {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        if self.eat_kind(&TokenKind::Minus) {
            let expr = self.parse_unary()?;
            return Ok(Expr::UnaryOp {
                op: UnaryOp::Neg,
                expr: Box::new(expr),
            });
        }
        if self.eat_kind(&TokenKind::Plus) {
            let expr = self.parse_unary()?;
            return Ok(Expr::UnaryOp {
                op: UnaryOp::Plus,
                expr: Box::new(expr),
            });
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        match self.peek().kind.clone() {
            TokenKind::Number(n) => {
                self.advance();
                Ok(Expr::Literal(Literal::Number(n)))
            }
            TokenKind::StringLiteral(s) => {
                self.advance();
                Ok(Expr::Literal(Literal::String(s)))
            }
            TokenKind::Star => {
                self.advance();
                Ok(Expr::Wildcard)
            }
            TokenKind::LParen => {
                self.advance();
                if self.at_keyword("SELECT") || self.at_keyword("WITH") {
                    let query = self.parse_select()?;
                    self.expect_kind(TokenKind::RParen, ")")?;
                    return Ok(Expr::Subquery(Box::new(query)));
                }
                let mut items = vec![self.parse_expr()?];
                let mut is_tuple = false;
                while self.eat_kind(&TokenKind::Comma) {
                    is_tuple = true;
                    items.push(self.parse_expr()?);
                }
                self.expect_kind(TokenKind::RParen, ")")?;
                if is_tuple {
                    Ok(Expr::Tuple(items))
                } else {
                    Ok(Expr::Nested(Box::new(items.remove(0))))
                }
            }
            TokenKind::LBracket => {
                self.advance();
                let mut items = Vec::new();
                if self.peek().kind != TokenKind::RBracket {
                    loop {
                        items.push(self.parse_expr()?);
                        if !self.eat_kind(&TokenKind::Comma) {
                            break;
                        }
                    }
                }
                self.expect_kind(TokenKind::RBracket, "]")?;
                Ok(Expr::Array(items))
            }
            TokenKind::LBrace => {
                self.advance();
                let mut pairs = Vec::new();
                if self.peek().kind != TokenKind::RBrace {
                    loop {
                        let k = self.parse_expr()?;
                        self.expect_kind(TokenKind::Colon, ":")?;
                        let v = self.parse_expr()?;
                        pairs.push((k, v));
                        if !self.eat_kind(&TokenKind::Comma) {
                            break;
                        }
                    }
                }
                self.expect_kind(TokenKind::RBrace, "}")?;
                Ok(Expr::MapLiteral(pairs))
            }
            TokenKind::Ident(ref word) if word.eq_ignore_ascii_case("NULL") => {
                self.advance();
                Ok(Expr::Literal(Literal::Null))
            }
            TokenKind::Ident(ref word) if word.eq_ignore_ascii_case("TRUE") => {
                self.advance();
                Ok(Expr::Literal(Literal::Bool(true)))
            }
            TokenKind::Ident(ref word) if word.eq_ignore_ascii_case("FALSE") => {
                self.advance();
                Ok(Expr::Literal(Literal::Bool(false)))
            }
            TokenKind::Ident(ref word) if word.eq_ignore_ascii_case("CASE") => self.parse_case(),
            TokenKind::Ident(ref word) if word.eq_ignore_ascii_case("CAST") => self.parse_cast(),
            TokenKind::Ident(ref word) if word.eq_ignore_ascii_case("EXTRACT") => {
                self.parse_extract()
            }
            TokenKind::Ident(ref word) if word.eq_ignore_ascii_case("INTERVAL") => {
                self.parse_interval()
            }
            TokenKind::Ident(_) | TokenKind::QuotedIdent(_) => self.parse_ident_or_call(),
            _ => Err(self.unexpected("an expression")),
        }
    }

    fn parse_ident_or_call(&mut self) -> Result<Expr, ParseError> {
        let mut parts = vec![self.parse_ident()?];
        while self.peek().kind == TokenKind::Dot {
            if self.peek_at(1).kind == TokenKind::Star {
                self.advance();
                self.advance();
                return Ok(Expr::QualifiedWildcard(Identifier(parts)));
            }
            self.advance();
            parts.push(self.parse_ident()?);
        }
        if self.peek().kind == TokenKind::LParen {
            self.advance();
            let distinct = self.eat_keyword("DISTINCT");
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
            let name = parts.join(".");
            let over = if self.eat_keyword("OVER") {
                Some(Box::new(self.parse_window_spec()?))
            } else {
                None
            };
            return Ok(Expr::FunctionCall {
                name,
                distinct,
                args,
                over,
            });
        }
        Ok(Expr::Identifier(Identifier(parts)))
    }

    fn parse_window_spec(&mut self) -> Result<WindowSpec, ParseError> {
        self.expect_kind(TokenKind::LParen, "(")?;
        let mut spec = WindowSpec::default();
        if self.eat_keyword_seq(&["PARTITION", "BY"]) {
            loop {
                spec.partition_by.push(self.parse_expr()?);
                if !self.eat_kind(&TokenKind::Comma) {
                    break;
                }
            }
        }
        if self.eat_keyword_seq(&["ORDER", "BY"]) {
            spec.order_by = self.parse_order_by_items()?;
        }
        if self.at_any_keyword(&["ROWS", "RANGE"]) {
            let units = if self.eat_keyword("ROWS") {
                FrameUnits::Rows
            } else {
                self.expect_keyword("RANGE")?;
                FrameUnits::Range
            };
            self.expect_keyword("BETWEEN")?;
            let start = self.parse_frame_bound()?;
            self.expect_keyword("AND")?;
            let end = self.parse_frame_bound()?;
            spec.frame = Some(crate::ast::WindowFrame {
                units,
                start,
                end: Some(end),
            });
        }
        self.expect_kind(TokenKind::RParen, ")")?;
        Ok(spec)
    }

    fn parse_frame_bound(&mut self) -> Result<FrameBound, ParseError> {
        if self.eat_keyword_seq(&["UNBOUNDED", "PRECEDING"]) {
            return Ok(FrameBound::UnboundedPreceding);
        }
        if self.eat_keyword_seq(&["UNBOUNDED", "FOLLOWING"]) {
            return Ok(FrameBound::UnboundedFollowing);
        }
        if self.eat_keyword_seq(&["CURRENT", "ROW"]) {
            return Ok(FrameBound::CurrentRow);
        }
        let value = self.parse_additive()?;
        if self.eat_keyword("PRECEDING") {
            Ok(FrameBound::Preceding(Box::new(value)))
        } else if self.eat_keyword("FOLLOWING") {
            Ok(FrameBound::Following(Box::new(value)))
        } else {
            Err(self.unexpected("PRECEDING or FOLLOWING"))
        }
    }

    pub(super) fn parse_order_by_items(&mut self) -> Result<Vec<OrderByItem>, ParseError> {
        let mut items = Vec::new();
        loop {
            let expr = self.parse_expr()?;
            let asc = if self.eat_keyword("DESC") {
                false
            } else {
                self.eat_keyword("ASC");
                true
            };
            let nulls = if self.eat_keyword_seq(&["NULLS", "FIRST"]) {
                Some(NullsOrder::First)
            } else if self.eat_keyword_seq(&["NULLS", "LAST"]) {
                Some(NullsOrder::Last)
            } else {
                None
            };
            items.push(OrderByItem { expr, asc, nulls });
            if !self.eat_kind(&TokenKind::Comma) {
                break;
            }
        }
        Ok(items)
    }

    fn parse_case(&mut self) -> Result<Expr, ParseError> {
        self.expect_keyword("CASE")?;
        let operand = if !self.at_keyword("WHEN") {
            Some(Box::new(self.parse_expr()?))
        } else {
            None
        };
        let mut whens = Vec::new();
        while self.eat_keyword("WHEN") {
            let cond = self.parse_expr()?;
            self.expect_keyword("THEN")?;
            let result = self.parse_expr()?;
            whens.push((cond, result));
        }
        let else_ = if self.eat_keyword("ELSE") {
            Some(Box::new(self.parse_expr()?))
        } else {
            None
        };
        self.expect_keyword("END")?;
        Ok(Expr::Case {
            operand,
            whens,
            else_,
        })
    }

    fn parse_cast(&mut self) -> Result<Expr, ParseError> {
        self.expect_keyword("CAST")?;
        self.expect_kind(TokenKind::LParen, "(")?;
        let expr = self.parse_expr()?;
        self.expect_keyword("AS")?;
        let ty = self.parse_column_type()?;
        self.expect_kind(TokenKind::RParen, ")")?;
        Ok(Expr::Cast {
            expr: Box::new(expr),
            ty,
        })
    }

    fn parse_extract(&mut self) -> Result<Expr, ParseError> {
        self.expect_keyword("EXTRACT")?;
        self.expect_kind(TokenKind::LParen, "(")?;
        let unit = self.parse_ident()?;
        self.expect_keyword("FROM")?;
        let expr = self.parse_expr()?;
        self.expect_kind(TokenKind::RParen, ")")?;
        Ok(Expr::Extract {
            unit,
            expr: Box::new(expr),
        })
    }

    fn parse_interval(&mut self) -> Result<Expr, ParseError> {
        self.expect_keyword("INTERVAL")?;
        let value = self.parse_additive()?;
        let unit = self.parse_ident()?;
        Ok(Expr::Interval {
            value: Box::new(value),
            unit,
        })
    }
}
