use xpq_lexer::{Token, Version};
use xpq_name::NamespaceLookup;

use crate::ast::*;
use crate::error::ParserError;
use crate::parser::{DefaultNs, Parser};
use crate::span::Span;

fn axis_from_token(token: &Token) -> Option<Axis> {
    let axis = match token {
        Token::Ancestor => Axis::Ancestor,
        Token::AncestorOrSelf => Axis::AncestorOrSelf,
        Token::Attribute => Axis::Attribute,
        Token::Child => Axis::Child,
        Token::Descendant => Axis::Descendant,
        Token::DescendantOrSelf => Axis::DescendantOrSelf,
        Token::Following => Axis::Following,
        Token::FollowingSibling => Axis::FollowingSibling,
        Token::Namespace => Axis::Namespace,
        Token::Parent => Axis::Parent,
        Token::Preceding => Axis::Preceding,
        Token::PrecedingSibling => Axis::PrecedingSibling,
        Token::Self_ => Axis::Self_,
        _ => return None,
    };
    Some(axis)
}

impl<'a, 'c> Parser<'a, 'c> {
    pub(crate) fn parse_path_expr(&mut self) -> Result<ExprS, ParserError> {
        let start = self.peek_span();
        match self.peek() {
            Some(Token::Slash) => {
                self.advance();
                if self.starts_step() {
                    let steps = self.parse_relative_steps()?;
                    let span = start.merge(self.previous_span());
                    Ok(Expr::Path(PathExpr {
                        absolute: true,
                        steps,
                    })
                    .with_span(span))
                } else {
                    Ok(Expr::Path(PathExpr {
                        absolute: true,
                        steps: Vec::new(),
                    })
                    .with_span(start))
                }
            }
            Some(Token::DoubleSlash) => {
                self.advance();
                let mut steps = vec![self.descendant_or_self_step(start)];
                steps.extend(self.parse_relative_steps()?);
                let span = start.merge(self.previous_span());
                Ok(Expr::Path(PathExpr {
                    absolute: true,
                    steps,
                })
                .with_span(span))
            }
            _ => {
                let first = self.parse_step()?;
                if matches!(self.peek(), Some(Token::Slash) | Some(Token::DoubleSlash)) {
                    let mut steps = vec![first];
                    loop {
                        match self.peek() {
                            Some(Token::Slash) => {
                                self.advance();
                                steps.push(self.parse_step()?);
                            }
                            Some(Token::DoubleSlash) => {
                                let span = self.peek_span();
                                self.advance();
                                steps.push(self.descendant_or_self_step(span));
                                steps.push(self.parse_step()?);
                            }
                            _ => break,
                        }
                    }
                    let span = start.merge(self.previous_span());
                    Ok(Expr::Path(PathExpr {
                        absolute: false,
                        steps,
                    })
                    .with_span(span))
                } else {
                    // a lone primary is not a path
                    match first.value {
                        Step::Expr(expr) => Ok(*expr),
                        step @ Step::Axis(_) => Ok(Expr::Path(PathExpr {
                            absolute: false,
                            steps: vec![Spanned::new(step, first.span)],
                        })
                        .with_span(first.span)),
                    }
                }
            }
        }
    }

    fn descendant_or_self_step(&self, span: Span) -> StepS {
        Step::Axis(AxisStep {
            axis: Axis::DescendantOrSelf,
            node_test: NodeTest::Kind(KindTest::Any),
            predicates: Vec::new(),
        })
        .with_span(span)
    }

    fn parse_relative_steps(&mut self) -> Result<Vec<StepS>, ParserError> {
        let mut steps = vec![self.parse_step()?];
        loop {
            match self.peek() {
                Some(Token::Slash) => {
                    self.advance();
                    steps.push(self.parse_step()?);
                }
                Some(Token::DoubleSlash) => {
                    let span = self.peek_span();
                    self.advance();
                    steps.push(self.descendant_or_self_step(span));
                    steps.push(self.parse_step()?);
                }
                _ => break,
            }
        }
        Ok(steps)
    }

    /// Whether the current token can begin a path step.
    fn starts_step(&self) -> bool {
        match self.peek() {
            Some(token) => {
                token.ncname().is_some()
                    || matches!(
                        token,
                        Token::Asterisk
                            | Token::AsteriskColon
                            | Token::At
                            | Token::Dot
                            | Token::DotDot
                            | Token::Dollar
                            | Token::LeftParen
                            | Token::LeftBracket
                            | Token::QuestionMark
                            | Token::IntegerLiteral(_)
                            | Token::DecimalLiteral(_)
                            | Token::DoubleLiteral(_)
                            | Token::StringLiteral(_)
                            | Token::StringTemplate(_)
                    )
            }
            None => false,
        }
    }

    fn parse_step(&mut self) -> Result<StepS, ParserError> {
        let start = self.peek_span();
        // explicit axis
        if let Some(axis) = self.peek().and_then(axis_from_token) {
            if self.peek_at(1) == Some(&Token::DoubleColon) {
                self.advance();
                self.advance();
                if axis == Axis::Namespace {
                    if !self.enable_namespace_axis {
                        return Err(ParserError::NamespaceAxisDisabled { span: start });
                    }
                    self.warnings.emit("XPWD0001", Some("namespace axis"));
                }
                let no_default_namespace =
                    matches!(axis, Axis::Attribute | Axis::Namespace);
                let node_test = self.parse_node_test(no_default_namespace)?;
                let predicates = self.parse_predicates()?;
                let span = start.merge(self.previous_span());
                return Ok(Step::Axis(AxisStep {
                    axis,
                    node_test,
                    predicates,
                })
                .with_span(span));
            }
        }
        match self.peek() {
            Some(Token::At) => {
                self.advance();
                let node_test = self.parse_node_test(true)?;
                let predicates = self.parse_predicates()?;
                let span = start.merge(self.previous_span());
                return Ok(Step::Axis(AxisStep {
                    axis: Axis::Attribute,
                    node_test,
                    predicates,
                })
                .with_span(span));
            }
            Some(Token::DotDot) => {
                self.advance();
                let predicates = self.parse_predicates()?;
                let span = start.merge(self.previous_span());
                return Ok(Step::Axis(AxisStep {
                    axis: Axis::Parent,
                    node_test: NodeTest::Kind(KindTest::Any),
                    predicates,
                })
                .with_span(span));
            }
            _ => {}
        }
        if self.peek_kind_test() {
            let kind_test = self.parse_kind_test()?;
            let axis = if matches!(kind_test, KindTest::Attribute(..)) {
                Axis::Attribute
            } else {
                Axis::Child
            };
            let predicates = self.parse_predicates()?;
            let span = start.merge(self.previous_span());
            return Ok(Step::Axis(AxisStep {
                axis,
                node_test: NodeTest::Kind(kind_test),
                predicates,
            })
            .with_span(span));
        }
        if self.is_name_test_start() {
            let node_test = NodeTest::Name(self.parse_name_test(false)?);
            let predicates = self.parse_predicates()?;
            let span = start.merge(self.previous_span());
            return Ok(Step::Axis(AxisStep {
                axis: Axis::Child,
                node_test,
                predicates,
            })
            .with_span(span));
        }
        let expr = self.parse_postfix_expr()?;
        let span = expr.span;
        Ok(Step::Expr(Box::new(expr)).with_span(span))
    }

    pub(crate) fn parse_predicates(&mut self) -> Result<Vec<ExprS>, ParserError> {
        let mut predicates = Vec::new();
        while self.eat(&Token::LeftBracket) {
            predicates.push(self.parse_expr()?);
            self.expect(&Token::RightBracket)?;
        }
        Ok(predicates)
    }

    fn parse_node_test(&mut self, no_default_namespace: bool) -> Result<NodeTest, ParserError> {
        if self.peek_kind_test() {
            Ok(NodeTest::Kind(self.parse_kind_test()?))
        } else {
            Ok(NodeTest::Name(self.parse_name_test(no_default_namespace)?))
        }
    }

    /// A name test: `name`, `*`, `*:local` or `prefix:*`. The default
    /// element namespace applies to element name tests only.
    fn parse_name_test(&mut self, no_default_namespace: bool) -> Result<NameTest, ParserError> {
        match self.peek() {
            Some(Token::Asterisk) => {
                self.advance();
                Ok(NameTest::Star)
            }
            Some(Token::AsteriskColon) => {
                if !self.adjacent(0) {
                    return Err(self.error_here());
                }
                self.advance();
                let (local, _) = self.parse_ncname()?;
                Ok(NameTest::LocalName(local.to_string()))
            }
            Some(token) if token.ncname().is_some() => {
                // prefix:* wildcard
                if matches!(self.peek_at(1), Some(Token::ColonAsterisk)) && self.adjacent(0) {
                    let (prefix, span) = self.parse_ncname()?;
                    self.advance();
                    let uri = match self.namespaces.by_prefix(prefix) {
                        Some(uri) => uri.to_string(),
                        None => {
                            return Err(ParserError::UnknownPrefix {
                                span,
                                prefix: prefix.to_string(),
                            })
                        }
                    };
                    return Ok(NameTest::Namespace {
                        prefix: prefix.to_string(),
                        uri,
                    });
                }
                let default_ns = if no_default_namespace {
                    DefaultNs::None
                } else {
                    DefaultNs::Element
                };
                let name = self.parse_eqname(default_ns)?;
                Ok(NameTest::Name(name))
            }
            _ => Err(self.error_here()),
        }
    }

    fn peek_kind_test(&self) -> bool {
        matches!(
            self.peek(),
            Some(Token::Node)
                | Some(Token::Text)
                | Some(Token::Comment)
                | Some(Token::ProcessingInstruction)
                | Some(Token::DocumentNode)
                | Some(Token::Element)
                | Some(Token::Attribute)
                | Some(Token::NamespaceNode)
        ) && self.peek_at(1) == Some(&Token::LeftParen)
    }

    pub(crate) fn parse_kind_test(&mut self) -> Result<KindTest, ParserError> {
        let (token, span) = match self.advance() {
            Some(spanned) => spanned,
            None => return Err(self.error_here()),
        };
        let extended = matches!(
            token,
            Token::DocumentNode | Token::Element | Token::Attribute | Token::NamespaceNode
        );
        if extended && !self.features.allow_extended_kind_tests {
            return Err(ParserError::UnsupportedConstruct {
                span,
                construct: "kind test",
                required: Version::V2_0,
                version: self.version,
            });
        }
        self.expect(&Token::LeftParen)?;
        let kind_test = match token {
            Token::Node => KindTest::Any,
            Token::Text => KindTest::Text,
            Token::Comment => KindTest::Comment,
            Token::NamespaceNode => KindTest::NamespaceNode,
            Token::ProcessingInstruction => {
                let target = match self.peek() {
                    Some(Token::StringLiteral(s)) => {
                        let target = s.to_string();
                        self.advance();
                        Some(target)
                    }
                    Some(token) if token.ncname().is_some() => {
                        let (target, _) = self.parse_ncname()?;
                        Some(target.to_string())
                    }
                    _ => None,
                };
                KindTest::PI(target)
            }
            Token::DocumentNode => {
                if self.peek() == Some(&Token::RightParen) {
                    KindTest::Document(None)
                } else {
                    let inner = self.parse_kind_test()?;
                    if !matches!(inner, KindTest::Element(..)) {
                        return Err(self.error_here());
                    }
                    KindTest::Document(Some(Box::new(inner)))
                }
            }
            Token::Element => self.parse_element_or_attribute_test(false)?,
            Token::Attribute => self.parse_element_or_attribute_test(true)?,
            _ => return Err(ParserError::Syntax { span }),
        };
        self.expect(&Token::RightParen)?;
        Ok(kind_test)
    }

    fn parse_element_or_attribute_test(
        &mut self,
        attribute: bool,
    ) -> Result<KindTest, ParserError> {
        let name = match self.peek() {
            Some(Token::RightParen) => None,
            Some(Token::Asterisk) => {
                self.advance();
                Some(NameOrWildcard::Wildcard)
            }
            _ => Some(NameOrWildcard::Name(self.parse_eqname(DefaultNs::Element)?)),
        };
        let type_name = if name.is_some() && self.eat(&Token::Comma) {
            Some(self.parse_eqname(DefaultNs::Type)?)
        } else {
            None
        };
        Ok(if attribute {
            KindTest::Attribute(name, type_name)
        } else {
            KindTest::Element(name, type_name)
        })
    }

    /// A name test begins here only if this is not a function call or a
    /// named function reference.
    fn is_name_test_start(&self) -> bool {
        match self.peek() {
            Some(Token::Asterisk) | Some(Token::AsteriskColon) => true,
            Some(token) if token.ncname().is_some() => {
                // prefix:* wildcard
                if matches!(self.peek_at(1), Some(Token::ColonAsterisk)) && self.adjacent(0) {
                    return true;
                }
                // step over a possible prefix to the deciding token
                let after = if matches!(self.peek_at(1), Some(Token::Colon))
                    && self.peek_at(2).map(|t| t.ncname().is_some()).unwrap_or(false)
                    && self.adjacent(0)
                    && self.adjacent(1)
                {
                    self.peek_at(3)
                } else {
                    self.peek_at(1)
                };
                !matches!(after, Some(Token::LeftParen) | Some(Token::Hash))
            }
            _ => false,
        }
    }
}
