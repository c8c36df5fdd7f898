use xpq_lexer::{Token, Version};

use crate::ast::*;
use crate::error::ParserError;
use crate::parser::{DefaultNs, Parser};
use crate::span::Span;

impl<'a, 'c> Parser<'a, 'c> {
    /// The comma operator, lowest precedence.
    pub(crate) fn parse_expr(&mut self) -> Result<ExprS, ParserError> {
        let first = self.parse_expr_single()?;
        if self.peek() != Some(&Token::Comma) {
            return Ok(first);
        }
        let start = first.span;
        let mut items = vec![first];
        while self.eat(&Token::Comma) {
            items.push(self.parse_expr_single()?);
        }
        let span = start.merge(items.last().map(|e| e.span).unwrap_or(start));
        Ok(Expr::Sequence(items).with_span(span))
    }

    pub(crate) fn parse_expr_single(&mut self) -> Result<ExprS, ParserError> {
        match self.peek() {
            Some(Token::Let) => self.parse_let(),
            Some(Token::For) => self.parse_for(),
            Some(Token::Some) | Some(Token::Every) => self.parse_quantified(),
            Some(Token::If) => self.parse_if(),
            Some(Token::Switch) => self.parse_switch(),
            _ => self.parse_or_expr(),
        }
    }

    fn parse_let(&mut self) -> Result<ExprS, ParserError> {
        if !self.features.allow_let {
            return Err(self.unsupported("let expression", Version::V2_0));
        }
        let start = self.peek_span();
        self.expect(&Token::Let)?;
        let mut bindings = Vec::new();
        loop {
            self.expect(&Token::Dollar)?;
            let name = self.parse_eqname(DefaultNs::None)?;
            let declared_type = if self.eat(&Token::As) {
                Some(self.parse_sequence_type()?)
            } else {
                None
            };
            self.expect(&Token::ColonEqual)?;
            let expr = self.parse_expr_single()?;
            bindings.push(Binding {
                name,
                declared_type,
                expr,
            });
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        self.expect(&Token::Return)?;
        let return_expr = self.parse_expr_single()?;
        let span = start.merge(return_expr.span);
        Ok(Expr::Let(Box::new(LetExpr {
            bindings,
            return_expr,
        }))
        .with_span(span))
    }

    fn parse_in_bindings(&mut self) -> Result<Vec<Binding>, ParserError> {
        let mut bindings = Vec::new();
        loop {
            self.expect(&Token::Dollar)?;
            let name = self.parse_eqname(DefaultNs::None)?;
            self.expect(&Token::In)?;
            let expr = self.parse_expr_single()?;
            bindings.push(Binding {
                name,
                declared_type: None,
                expr,
            });
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        Ok(bindings)
    }

    fn parse_for(&mut self) -> Result<ExprS, ParserError> {
        if !self.features.allow_for {
            return Err(self.unsupported("for expression", Version::V2_0));
        }
        let start = self.peek_span();
        self.expect(&Token::For)?;
        let bindings = self.parse_in_bindings()?;
        self.expect(&Token::Return)?;
        let return_expr = self.parse_expr_single()?;
        let span = start.merge(return_expr.span);
        Ok(Expr::For(Box::new(ForExpr {
            bindings,
            return_expr,
        }))
        .with_span(span))
    }

    fn parse_quantified(&mut self) -> Result<ExprS, ParserError> {
        if !self.features.allow_quantified {
            return Err(self.unsupported("quantified expression", Version::V2_0));
        }
        let start = self.peek_span();
        let quantifier = match self.advance() {
            Some((Token::Some, _)) => Quantifier::Some,
            Some((Token::Every, _)) => Quantifier::Every,
            _ => return Err(self.error_here()),
        };
        let bindings = self.parse_in_bindings()?;
        self.expect(&Token::Satisfies)?;
        let satisfies = self.parse_expr_single()?;
        let span = start.merge(satisfies.span);
        Ok(Expr::Quantified(Box::new(QuantifiedExpr {
            quantifier,
            bindings,
            satisfies,
        }))
        .with_span(span))
    }

    fn parse_if(&mut self) -> Result<ExprS, ParserError> {
        if !self.features.allow_if {
            return Err(self.unsupported("if expression", Version::V2_0));
        }
        let start = self.peek_span();
        self.expect(&Token::If)?;
        self.expect(&Token::LeftParen)?;
        let condition = self.parse_expr()?;
        self.expect(&Token::RightParen)?;
        self.expect(&Token::Then)?;
        let then = self.parse_expr_single()?;
        self.expect(&Token::Else)?;
        let else_ = self.parse_expr_single()?;
        let span = start.merge(else_.span);
        Ok(Expr::If(Box::new(IfExpr {
            condition,
            then,
            else_,
        }))
        .with_span(span))
    }

    fn parse_switch(&mut self) -> Result<ExprS, ParserError> {
        if !self.features.allow_switch {
            return Err(self.unsupported("switch expression", Version::V3_0));
        }
        let start = self.peek_span();
        self.expect(&Token::Switch)?;
        self.expect(&Token::LeftParen)?;
        let operand = self.parse_expr()?;
        self.expect(&Token::RightParen)?;
        let mut cases = Vec::new();
        while self.peek() == Some(&Token::Case) {
            let mut operands = Vec::new();
            while self.eat(&Token::Case) {
                operands.push(self.parse_expr_single()?);
            }
            self.expect(&Token::Return)?;
            let return_expr = self.parse_expr_single()?;
            cases.push(SwitchCase {
                operands,
                return_expr,
            });
        }
        if cases.is_empty() {
            return Err(self.error_here());
        }
        self.expect(&Token::Default)?;
        self.expect(&Token::Return)?;
        let default = self.parse_expr_single()?;
        let span = start.merge(default.span);
        Ok(Expr::Switch(Box::new(SwitchExpr {
            operand,
            cases,
            default,
        }))
        .with_span(span))
    }

    fn binary(&self, op: BinaryOp, left: ExprS, right: ExprS) -> ExprS {
        let span = left.span.merge(right.span);
        Expr::Binary(BinaryExpr {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
        .with_span(span)
    }

    fn parse_or_expr(&mut self) -> Result<ExprS, ParserError> {
        let mut left = self.parse_and_expr()?;
        while self.eat(&Token::Or) {
            let right = self.parse_and_expr()?;
            left = self.binary(BinaryOp::Or, left, right);
        }
        Ok(left)
    }

    fn parse_and_expr(&mut self) -> Result<ExprS, ParserError> {
        let mut left = self.parse_comparison_expr()?;
        while self.eat(&Token::And) {
            let right = self.parse_comparison_expr()?;
            left = self.binary(BinaryOp::And, left, right);
        }
        Ok(left)
    }

    fn comparison_op(token: &Token) -> Option<BinaryOp> {
        let op = match token {
            Token::Equal => BinaryOp::GenEq,
            Token::NotEqual => BinaryOp::GenNe,
            Token::LessThan => BinaryOp::GenLt,
            Token::LessThanEqual => BinaryOp::GenLe,
            Token::GreaterThan => BinaryOp::GenGt,
            Token::GreaterThanEqual => BinaryOp::GenGe,
            Token::Eq => BinaryOp::ValueEq,
            Token::Ne => BinaryOp::ValueNe,
            Token::Lt => BinaryOp::ValueLt,
            Token::Le => BinaryOp::ValueLe,
            Token::Gt => BinaryOp::ValueGt,
            Token::Ge => BinaryOp::ValueGe,
            Token::Is => BinaryOp::Is,
            Token::Precedes => BinaryOp::Precedes,
            Token::Follows => BinaryOp::Follows,
            _ => return None,
        };
        Some(op)
    }

    /// Comparisons do not chain.
    fn parse_comparison_expr(&mut self) -> Result<ExprS, ParserError> {
        let left = self.parse_range_expr()?;
        let op = match self.peek().and_then(Self::comparison_op) {
            Some(op) => op,
            None => return Ok(left),
        };
        if matches!(op, BinaryOp::Is | BinaryOp::Precedes | BinaryOp::Follows)
            && self.version < Version::V2_0
        {
            return Err(self.unsupported("node comparison", Version::V2_0));
        }
        self.advance();
        let right = self.parse_range_expr()?;
        Ok(self.binary(op, left, right))
    }

    fn parse_range_expr(&mut self) -> Result<ExprS, ParserError> {
        let left = self.parse_concat_expr()?;
        if self.peek() != Some(&Token::To) {
            return Ok(left);
        }
        if !self.features.allow_range {
            return Err(self.unsupported("range expression", Version::V2_0));
        }
        self.advance();
        let right = self.parse_concat_expr()?;
        Ok(self.binary(BinaryOp::Range, left, right))
    }

    fn parse_concat_expr(&mut self) -> Result<ExprS, ParserError> {
        let mut left = self.parse_additive_expr()?;
        while self.peek() == Some(&Token::DoublePipe) {
            if !self.features.allow_string_concat {
                return Err(self.unsupported("string concatenation", Version::V3_0));
            }
            self.advance();
            let right = self.parse_additive_expr()?;
            left = self.binary(BinaryOp::Concat, left, right);
        }
        Ok(left)
    }

    fn parse_additive_expr(&mut self) -> Result<ExprS, ParserError> {
        let mut left = self.parse_multiplicative_expr()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplicative_expr()?;
            left = self.binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_multiplicative_expr(&mut self) -> Result<ExprS, ParserError> {
        let mut left = self.parse_union_expr()?;
        loop {
            let op = match self.peek() {
                Some(Token::Asterisk) => BinaryOp::Mul,
                Some(Token::Div) => BinaryOp::Div,
                Some(Token::Idiv) => BinaryOp::IntDiv,
                Some(Token::Mod) => BinaryOp::Mod,
                _ => break,
            };
            self.advance();
            let right = self.parse_union_expr()?;
            left = self.binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_union_expr(&mut self) -> Result<ExprS, ParserError> {
        let mut left = self.parse_intersect_except_expr()?;
        loop {
            match self.peek() {
                Some(Token::Pipe) | Some(Token::Union) => {
                    self.advance();
                    let right = self.parse_intersect_except_expr()?;
                    left = self.binary(BinaryOp::Union, left, right);
                }
                _ => break,
            }
        }
        Ok(left)
    }

    fn parse_intersect_except_expr(&mut self) -> Result<ExprS, ParserError> {
        let mut left = self.parse_cast_family_expr()?;
        loop {
            let op = match self.peek() {
                Some(Token::Intersect) => BinaryOp::Intersect,
                Some(Token::Except) => BinaryOp::Except,
                _ => break,
            };
            self.advance();
            let right = self.parse_cast_family_expr()?;
            left = self.binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_cast_family_expr(&mut self) -> Result<ExprS, ParserError> {
        let mut left = self.parse_arrow_expr()?;
        loop {
            match self.peek() {
                Some(Token::Instance) => {
                    if !self.features.allow_type_expressions {
                        return Err(self.unsupported("instance of expression", Version::V2_0));
                    }
                    self.advance();
                    self.expect(&Token::Of)?;
                    let target = self.parse_sequence_type()?;
                    let span = left.span.merge(self.previous_span());
                    left = Expr::InstanceOf(Box::new(TreatExpr { expr: left, target }))
                        .with_span(span);
                }
                Some(Token::Treat) => {
                    if !self.features.allow_type_expressions {
                        return Err(self.unsupported("treat as expression", Version::V2_0));
                    }
                    self.advance();
                    self.expect(&Token::As)?;
                    let target = self.parse_sequence_type()?;
                    let span = left.span.merge(self.previous_span());
                    left = Expr::Treat(Box::new(TreatExpr { expr: left, target })).with_span(span);
                }
                Some(Token::Castable) => {
                    if !self.features.allow_type_expressions {
                        return Err(self.unsupported("castable as expression", Version::V2_0));
                    }
                    self.advance();
                    self.expect(&Token::As)?;
                    let target = self.parse_single_type()?;
                    let span = left.span.merge(self.previous_span());
                    left =
                        Expr::Castable(Box::new(CastExpr { expr: left, target })).with_span(span);
                }
                Some(Token::Cast) => {
                    if !self.features.allow_type_expressions {
                        return Err(self.unsupported("cast as expression", Version::V2_0));
                    }
                    self.advance();
                    self.expect(&Token::As)?;
                    let target = self.parse_single_type()?;
                    let span = left.span.merge(self.previous_span());
                    left = Expr::Cast(Box::new(CastExpr { expr: left, target })).with_span(span);
                }
                _ => break,
            }
        }
        Ok(left)
    }

    /// The span of the most recently consumed token.
    pub(crate) fn previous_span(&self) -> Span {
        if self.pos == 0 {
            return Span::new(0, 0);
        }
        match self.tokens.get(self.pos - 1) {
            Some((_, span)) => span.clone().into(),
            None => self.peek_span(),
        }
    }

    fn parse_arrow_expr(&mut self) -> Result<ExprS, ParserError> {
        let mut left = self.parse_unary_expr()?;
        while self.peek() == Some(&Token::Arrow) {
            if !self.features.allow_arrow {
                return Err(self.unsupported("arrow expression", Version::V3_0));
            }
            self.advance();
            let name = self.parse_eqname(DefaultNs::Function)?;
            let args = self.parse_argument_list()?;
            let span = left.span.merge(self.previous_span());
            left = Expr::Arrow(Box::new(ArrowExpr {
                target: left,
                call: FunctionCall { name, args },
            }))
            .with_span(span);
        }
        Ok(left)
    }

    fn parse_unary_expr(&mut self) -> Result<ExprS, ParserError> {
        let mut signs = Vec::new();
        loop {
            match self.peek() {
                Some(Token::Minus) => {
                    signs.push((UnaryOp::Minus, self.peek_span()));
                    self.advance();
                }
                Some(Token::Plus) => {
                    signs.push((UnaryOp::Plus, self.peek_span()));
                    self.advance();
                }
                _ => break,
            }
        }
        let mut expr = self.parse_simple_map_expr()?;
        for (op, span) in signs.into_iter().rev() {
            let span = span.merge(expr.span);
            expr = Expr::Unary(op, Box::new(expr)).with_span(span);
        }
        Ok(expr)
    }

    fn parse_simple_map_expr(&mut self) -> Result<ExprS, ParserError> {
        let mut left = self.parse_path_expr()?;
        while self.peek() == Some(&Token::ExclamationMark) {
            if !self.features.allow_simple_map {
                return Err(self.unsupported("simple map operator", Version::V3_0));
            }
            self.advance();
            let right = self.parse_path_expr()?;
            let span = left.span.merge(right.span);
            left = Expr::SimpleMap(Box::new(left), Box::new(right)).with_span(span);
        }
        Ok(left)
    }
}
