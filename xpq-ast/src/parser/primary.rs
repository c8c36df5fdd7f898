use ordered_float::OrderedFloat;

use xpq_lexer::{TemplateSegment as LexTemplateSegment, Token, Version};

use crate::ast::*;
use crate::error::ParserError;
use crate::parser::{is_reserved_function_name, DefaultNs, Parser};

impl<'a, 'c> Parser<'a, 'c> {
    /// A primary expression followed by its postfixes: predicates,
    /// argument lists and lookups.
    pub(crate) fn parse_postfix_expr(&mut self) -> Result<ExprS, ParserError> {
        let mut expr = self.parse_primary_expr()?;
        loop {
            match self.peek() {
                Some(Token::LeftBracket) => {
                    let predicates = self.parse_predicates()?;
                    let span = expr.span.merge(self.previous_span());
                    expr = Expr::Filter(Box::new(FilterExpr {
                        primary: expr,
                        predicates,
                    }))
                    .with_span(span);
                }
                Some(Token::LeftParen) => {
                    let args = self.parse_argument_list()?;
                    let span = expr.span.merge(self.previous_span());
                    expr = Expr::DynamicCall(Box::new(DynamicCallExpr { base: expr, args }))
                        .with_span(span);
                }
                Some(Token::QuestionMark) => {
                    if !self.features.allow_lookup {
                        return Err(self.unsupported("lookup operator", Version::V3_1));
                    }
                    self.advance();
                    let key = self.parse_key_specifier()?;
                    let span = expr.span.merge(self.previous_span());
                    expr = Expr::Lookup(Box::new(LookupExpr { base: expr, key })).with_span(span);
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    pub(crate) fn parse_argument_list(&mut self) -> Result<Vec<ExprS>, ParserError> {
        self.expect(&Token::LeftParen)?;
        let mut args = Vec::new();
        if self.eat(&Token::RightParen) {
            return Ok(args);
        }
        loop {
            args.push(self.parse_expr_single()?);
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        self.expect(&Token::RightParen)?;
        Ok(args)
    }

    fn parse_primary_expr(&mut self) -> Result<ExprS, ParserError> {
        let start = self.peek_span();
        match self.peek() {
            Some(Token::IntegerLiteral(_)) => {
                if let Some((Token::IntegerLiteral(i), span)) = self.advance() {
                    Ok(Expr::Literal(Literal::Integer(i)).with_span(span))
                } else {
                    Err(self.error_here())
                }
            }
            Some(Token::DecimalLiteral(_)) => {
                if let Some((Token::DecimalLiteral(d), span)) = self.advance() {
                    Ok(Expr::Literal(Literal::Decimal(d)).with_span(span))
                } else {
                    Err(self.error_here())
                }
            }
            Some(Token::DoubleLiteral(_)) => {
                if let Some((Token::DoubleLiteral(d), span)) = self.advance() {
                    Ok(Expr::Literal(Literal::Double(OrderedFloat(d))).with_span(span))
                } else {
                    Err(self.error_here())
                }
            }
            Some(Token::StringLiteral(_)) => {
                if let Some((Token::StringLiteral(s), span)) = self.advance() {
                    Ok(Expr::Literal(Literal::String(s.into_owned())).with_span(span))
                } else {
                    Err(self.error_here())
                }
            }
            Some(Token::Dollar) => {
                self.advance();
                let name = self.parse_eqname(DefaultNs::None)?;
                let span = start.merge(name.span);
                Ok(Expr::VarRef(name.value).with_span(span))
            }
            Some(Token::LeftParen) => {
                self.advance();
                if self.eat(&Token::RightParen) {
                    let span = start.merge(self.previous_span());
                    return Ok(Expr::Sequence(Vec::new()).with_span(span));
                }
                let inner = self.parse_expr()?;
                self.expect(&Token::RightParen)?;
                Ok(inner)
            }
            Some(Token::Dot) => {
                self.advance();
                Ok(Expr::ContextItem.with_span(start))
            }
            Some(Token::Function) => self.parse_inline_function(),
            Some(Token::Map) => self.parse_map_constructor(),
            Some(Token::Array) => self.parse_curly_array(),
            Some(Token::LeftBracket) => self.parse_square_array(),
            Some(Token::QuestionMark) => {
                if !self.features.allow_lookup {
                    return Err(self.unsupported("lookup operator", Version::V3_1));
                }
                self.advance();
                let key = self.parse_key_specifier()?;
                let span = start.merge(self.previous_span());
                Ok(Expr::UnaryLookup(key).with_span(span))
            }
            Some(Token::StringTemplate(_)) => {
                if !self.features.allow_string_template {
                    return Err(self.unsupported("string template", Version::V3_0));
                }
                if let Some((Token::StringTemplate(segments), span)) = self.advance() {
                    let segments = self.parse_template_segments(segments)?;
                    Ok(Expr::StringTemplate(segments).with_span(span))
                } else {
                    Err(self.error_here())
                }
            }
            Some(token) if token.ncname().is_some() => {
                let name = self.parse_eqname(DefaultNs::Function)?;
                match self.peek() {
                    Some(Token::Hash) => {
                        if !self.features.allow_named_function_ref {
                            return Err(self.unsupported("named function reference", Version::V3_0));
                        }
                        self.advance();
                        let arity = match self.advance() {
                            Some((Token::IntegerLiteral(i), span)) => {
                                u8::try_from(i).map_err(|_| ParserError::ArityOverflow { span })?
                            }
                            _ => return Err(self.error_here()),
                        };
                        let span = start.merge(self.previous_span());
                        Ok(Expr::NamedFunctionRef(NamedFunctionRef { name, arity })
                            .with_span(span))
                    }
                    Some(Token::LeftParen) => {
                        if name.value.prefix().is_none()
                            && is_reserved_function_name(name.value.local_name())
                        {
                            return Err(ParserError::Reserved {
                                span: name.span,
                                name: name.value.local_name().to_string(),
                            });
                        }
                        let args = self.parse_argument_list()?;
                        let span = start.merge(self.previous_span());
                        Ok(Expr::FunctionCall(FunctionCall { name, args }).with_span(span))
                    }
                    _ => Err(self.error_here()),
                }
            }
            _ => Err(self.error_here()),
        }
    }

    fn parse_inline_function(&mut self) -> Result<ExprS, ParserError> {
        if !self.features.allow_inline_function {
            return Err(self.unsupported("inline function", Version::V3_0));
        }
        let start = self.peek_span();
        self.expect(&Token::Function)?;
        self.expect(&Token::LeftParen)?;
        let mut params: Vec<Param> = Vec::new();
        if self.peek() != Some(&Token::RightParen) {
            loop {
                self.expect(&Token::Dollar)?;
                let name = self.parse_eqname(DefaultNs::None)?;
                if params.iter().any(|p| p.name == name.value) {
                    return Err(ParserError::Syntax { span: name.span });
                }
                let declared_type = if self.eat(&Token::As) {
                    Some(self.parse_sequence_type()?)
                } else {
                    None
                };
                params.push(Param {
                    name: name.value,
                    declared_type,
                });
                if !self.eat(&Token::Comma) {
                    break;
                }
            }
        }
        self.expect(&Token::RightParen)?;
        let return_type = if self.eat(&Token::As) {
            Some(self.parse_sequence_type()?)
        } else {
            None
        };
        let brace = self.expect(&Token::LeftBrace)?;
        let body = if self.peek() == Some(&Token::RightBrace) {
            Expr::Sequence(Vec::new()).with_span(brace)
        } else {
            self.parse_expr()?
        };
        self.expect(&Token::RightBrace)?;
        let span = start.merge(self.previous_span());
        Ok(Expr::InlineFunction(Box::new(InlineFunction {
            params,
            return_type,
            body,
        }))
        .with_span(span))
    }

    fn parse_map_constructor(&mut self) -> Result<ExprS, ParserError> {
        if !self.features.allow_map_constructor {
            return Err(self.unsupported("map constructor", Version::V3_1));
        }
        let start = self.peek_span();
        self.expect(&Token::Map)?;
        self.expect(&Token::LeftBrace)?;
        let mut entries = Vec::new();
        if self.peek() != Some(&Token::RightBrace) {
            loop {
                let key = self.parse_expr_single()?;
                self.expect(&Token::Colon)?;
                let value = self.parse_expr_single()?;
                entries.push(MapEntry { key, value });
                if !self.eat(&Token::Comma) {
                    break;
                }
            }
        }
        self.expect(&Token::RightBrace)?;
        let span = start.merge(self.previous_span());
        Ok(Expr::MapConstructor(MapConstructor { entries }).with_span(span))
    }

    fn parse_curly_array(&mut self) -> Result<ExprS, ParserError> {
        if !self.features.allow_array_constructor {
            return Err(self.unsupported("array constructor", Version::V3_1));
        }
        let start = self.peek_span();
        self.expect(&Token::Array)?;
        self.expect(&Token::LeftBrace)?;
        let body = if self.peek() == Some(&Token::RightBrace) {
            None
        } else {
            Some(Box::new(self.parse_expr()?))
        };
        self.expect(&Token::RightBrace)?;
        let span = start.merge(self.previous_span());
        Ok(Expr::ArrayConstructor(ArrayConstructor::Curly(body)).with_span(span))
    }

    fn parse_square_array(&mut self) -> Result<ExprS, ParserError> {
        if !self.features.allow_array_constructor {
            return Err(self.unsupported("array constructor", Version::V3_1));
        }
        let start = self.peek_span();
        self.expect(&Token::LeftBracket)?;
        let mut members = Vec::new();
        if self.peek() != Some(&Token::RightBracket) {
            loop {
                members.push(self.parse_expr_single()?);
                if !self.eat(&Token::Comma) {
                    break;
                }
            }
        }
        self.expect(&Token::RightBracket)?;
        let span = start.merge(self.previous_span());
        Ok(Expr::ArrayConstructor(ArrayConstructor::Square(members)).with_span(span))
    }

    pub(crate) fn parse_key_specifier(&mut self) -> Result<KeySpecifier, ParserError> {
        match self.peek() {
            Some(Token::IntegerLiteral(_)) => {
                if let Some((Token::IntegerLiteral(i), _)) = self.advance() {
                    Ok(KeySpecifier::Integer(i))
                } else {
                    Err(self.error_here())
                }
            }
            Some(Token::Asterisk) => {
                self.advance();
                Ok(KeySpecifier::Star)
            }
            Some(Token::LeftParen) => {
                self.advance();
                let expr = self.parse_expr()?;
                self.expect(&Token::RightParen)?;
                Ok(KeySpecifier::Expr(Box::new(expr)))
            }
            Some(token) if token.ncname().is_some() => {
                let (name, _) = self.parse_ncname()?;
                Ok(KeySpecifier::NcName(name.to_string()))
            }
            _ => Err(self.error_here()),
        }
    }

    fn parse_template_segments(
        &mut self,
        segments: Vec<LexTemplateSegment<'a>>,
    ) -> Result<Vec<TemplateSegment>, ParserError> {
        let mut result = Vec::with_capacity(segments.len());
        for segment in segments {
            match segment {
                LexTemplateSegment::Text(text) => result.push(TemplateSegment::Text(text)),
                LexTemplateSegment::Expr(tokens) => {
                    let mut sub = self.subparser(tokens);
                    let expr = sub.parse_expr()?;
                    if sub.pos < sub.tokens.len() {
                        return Err(sub.error_here());
                    }
                    result.push(TemplateSegment::Expr(expr));
                }
            }
        }
        Ok(result)
    }
}
