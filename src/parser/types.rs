use super::Parser;
use crate::ast::{ColumnType, EnumMember, EnumWidth, NestedField, PrimitiveType, TupleField};
use crate::error::ParseError;
use crate::lexer::TokenKind;

impl Parser {
    pub(super) fn parse_column_type(&mut self) -> Result<ColumnType, ParseError> {
        let name = self.parse_ident()?;
        self.parse_column_type_from_name(&name)
    }

    fn parse_column_type_from_name(&mut self, name: &str) -> Result<ColumnType, ParseError> {
        let upper = name.to_ascii_uppercase();
        match upper.as_str() {
            "NULLABLE" => {
                self.expect_kind(TokenKind::LParen, "(")?;
                let inner = self.parse_column_type()?;
                self.expect_kind(TokenKind::RParen, ")")?;
                Ok(ColumnType::Nullable(Box::new(inner)))
            }
            "LOWCARDINALITY" => {
                self.expect_kind(TokenKind::LParen, "(")?;
                let inner = self.parse_column_type()?;
                self.expect_kind(TokenKind::RParen, ")")?;
                Ok(ColumnType::LowCardinality(Box::new(inner)))
            }
            "ARRAY" => {
                self.expect_kind(TokenKind::LParen, "(")?;
                let inner = self.parse_column_type()?;
                self.expect_kind(TokenKind::RParen, ")")?;
                Ok(ColumnType::Array(Box::new(inner)))
            }
            "MAP" => {
                self.expect_kind(TokenKind::LParen, "(")?;
                let key = self.parse_column_type()?;
                self.expect_kind(TokenKind::Comma, ",")?;
                let value = self.parse_column_type()?;
                self.expect_kind(TokenKind::RParen, ")")?;
                Ok(ColumnType::Map(Box::new(key), Box::new(value)))
            }
            "TUPLE" => {
                self.expect_kind(TokenKind::LParen, "(")?;
                let mut fields = Vec::new();
                loop {
                    fields.push(self.parse_tuple_field()?);
                    if !self.eat_kind(&TokenKind::Comma) {
                        break;
                    }
                }
                self.expect_kind(TokenKind::RParen, ")")?;
                Ok(ColumnType::Tuple(fields))
            }
            "NESTED" => {
                self.expect_kind(TokenKind::LParen, "(")?;
                let mut fields = Vec::new();
                loop {
                    let field_name = self.parse_ident()?;
                    let ty = self.parse_column_type()?;
                    fields.push(NestedField { name: field_name, ty });
                    if !self.eat_kind(&TokenKind::Comma) {
                        break;
                    }
                }
                self.expect_kind(TokenKind::RParen, ")")?;
                Ok(ColumnType::Nested(fields))
            }
            "FIXEDSTRING" => {
                self.expect_kind(TokenKind::LParen, "(")?;
                let n = self.parse_u32_literal()?;
                self.expect_kind(TokenKind::RParen, ")")?;
                Ok(ColumnType::FixedString(n))
            }
            "DECIMAL" => {
                self.expect_kind(TokenKind::LParen, "(")?;
                let precision = self.parse_u32_literal()? as u8;
                self.expect_kind(TokenKind::Comma, ",")?;
                let scale = self.parse_u32_literal()? as u8;
                self.expect_kind(TokenKind::RParen, ")")?;
                Ok(ColumnType::Decimal { precision, scale })
            }
            "DATETIME64" => {
                self.expect_kind(TokenKind::LParen, "(")?;
                let precision = self.parse_u32_literal()? as u8;
                let timezone = if self.eat_kind(&TokenKind::Comma) {
                    Some(self.parse_string_literal()?)
                } else {
                    None
                };
                self.expect_kind(TokenKind::RParen, ")")?;
                Ok(ColumnType::DateTime64 { precision, timezone })
            }
            "DATETIME" => {
                if self.eat_kind(&TokenKind::LParen) {
                    if self.peek().kind == TokenKind::RParen {
                        self.advance();
                        return Ok(ColumnType::Primitive(PrimitiveType::DateTime {
                            timezone: None,
                        }));
                    }
                    let tz = self.parse_string_literal()?;
                    self.expect_kind(TokenKind::RParen, ")")?;
                    Ok(ColumnType::Primitive(PrimitiveType::DateTime {
                        timezone: Some(tz),
                    }))
                } else {
                    Ok(ColumnType::Primitive(PrimitiveType::DateTime { timezone: None }))
                }
            }
            "ENUM8" | "ENUM16" => {
                let width = if upper == "ENUM8" {
                    EnumWidth::Enum8
                } else {
                    EnumWidth::Enum16
                };
                self.expect_kind(TokenKind::LParen, "(")?;
                let mut members = Vec::new();
                let mut next_default: i32 = 1;
                loop {
                    let member_name = self.parse_string_literal()?;
                    let value = if self.eat_kind(&TokenKind::Eq) {
                        self.parse_i32_literal()?
                    } else {
                        next_default
                    };
                    next_default = value + 1;
                    members.push(EnumMember {
                        name: member_name,
                        value,
                    });
                    if !self.eat_kind(&TokenKind::Comma) {
                        break;
                    }
                }
                self.expect_kind(TokenKind::RParen, ")")?;
                Ok(ColumnType::Enum { width, members })
            }
            "STRING" => Ok(ColumnType::Primitive(PrimitiveType::String)),
            "BOOL" | "BOOLEAN" => Ok(ColumnType::Primitive(PrimitiveType::Bool)),
            "INT8" => Ok(ColumnType::Primitive(PrimitiveType::Int8)),
            "INT16" => Ok(ColumnType::Primitive(PrimitiveType::Int16)),
            "INT32" => Ok(ColumnType::Primitive(PrimitiveType::Int32)),
            "INT64" => Ok(ColumnType::Primitive(PrimitiveType::Int64)),
            "INT128" => Ok(ColumnType::Primitive(PrimitiveType::Int128)),
            "INT256" => Ok(ColumnType::Primitive(PrimitiveType::Int256)),
            "UINT8" => Ok(ColumnType::Primitive(PrimitiveType::UInt8)),
            "UINT16" => Ok(ColumnType::Primitive(PrimitiveType::UInt16)),
            "UINT32" => Ok(ColumnType::Primitive(PrimitiveType::UInt32)),
            "UINT64" => Ok(ColumnType::Primitive(PrimitiveType::UInt64)),
            "UINT128" => Ok(ColumnType::Primitive(PrimitiveType::UInt128)),
            "UINT256" => Ok(ColumnType::Primitive(PrimitiveType::UInt256)),
            "FLOAT32" => Ok(ColumnType::Primitive(PrimitiveType::Float32)),
            "FLOAT64" => Ok(ColumnType::Primitive(PrimitiveType::Float64)),
            "DATE" => Ok(ColumnType::Primitive(PrimitiveType::Date)),
            "DATE32" => Ok(ColumnType::Primitive(PrimitiveType::Date32)),
            "UUID" => Ok(ColumnType::Primitive(PrimitiveType::Uuid)),
            "IPV4" => Ok(ColumnType::Primitive(PrimitiveType::IPv4)),
            "IPV6" => Ok(ColumnType::Primitive(PrimitiveType::IPv6)),
            "POINT" => Ok(ColumnType::Primitive(PrimitiveType::Point)),
            "RING" => Ok(ColumnType::Primitive(PrimitiveType::Ring)),
            "LINESTRING" => Ok(ColumnType::Primitive(PrimitiveType::LineString)),
            "MULTILINESTRING" => Ok(ColumnType::Primitive(PrimitiveType::MultiLineString)),
            "POLYGON" => Ok(ColumnType::Primitive(PrimitiveType::Polygon)),
            "MULTIPOLYGON" => Ok(ColumnType::Primitive(PrimitiveType::MultiPolygon)),
            _ => {
                // Unrecognised parametric type, e.g. AggregateFunction(...).
                if self.eat_kind(&TokenKind::LParen) {
                    let raw_start = self.position();
                    let mut depth = 1usize;
                    let mut raw = String::new();
                    loop {
                        if self.is_eof() {
                            return Err(ParseError::new(raw_start, ")", "end of input"));
                        }
                        match &self.peek().kind {
                            TokenKind::LParen => depth += 1,
                            TokenKind::RParen => {
                                depth -= 1;
                                if depth == 0 {
                                    self.advance();
                                    break;
                                }
                            }
                            _ => {}
                        }
                        if !raw.is_empty() {
                            raw.push(' ');
                        }
                        raw.push_str(&self.advance().text);
                    }
                    Ok(ColumnType::Parametric {
                        name: name.to_string(),
                        raw_params: raw,
                    })
                } else {
                    Ok(ColumnType::Parametric {
                        name: name.to_string(),
                        raw_params: String::new(),
                    })
                }
            }
        }
    }

    fn parse_tuple_field(&mut self) -> Result<TupleField, ParseError> {
        // A named field is `ident type`; an anonymous one is just `type`.
        // We disambiguate by trying to parse `ident type` and backtracking
        // if the second token doesn't look like the start of a type.
        let checkpoint = self.pos;
        if let TokenKind::Ident(_) = self.peek().kind.clone() {
            let name = self.parse_ident()?;
            if matches!(self.peek().kind, TokenKind::Ident(_)) {
                let ty = self.parse_column_type()?;
                return Ok(TupleField { name: Some(name), ty });
            }
            self.pos = checkpoint;
        }
        let ty = self.parse_column_type()?;
        Ok(TupleField { name: None, ty })
    }

    fn parse_u32_literal(&mut self) -> Result<u32, ParseError> {
        match &self.peek().kind {
            TokenKind::Number(n) => {
                let v: u32 = n
                    .parse()
                    .map_err(|_| self.unexpected("an unsigned integer"))?;
                self.advance();
                Ok(v)
            }
            _ => Err(self.unexpected("an unsigned integer")),
        }
    }

    fn parse_i32_literal(&mut self) -> Result<i32, ParseError> {
        let negative = self.eat_kind(&TokenKind::Minus);
        match &self.peek().kind {
            TokenKind::Number(n) => {
                let v: i32 = n.parse().map_err(|_| self.unexpected("an integer"))?;
                self.advance();
                Ok(if negative { -v } else { v })
            }
            _ => Err(self.unexpected("an integer")),
        }
    }
}
