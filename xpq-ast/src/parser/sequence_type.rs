use xpq_lexer::{Token, Version};
use xpq_schema_type::Xs;

use crate::ast::{NameS, SingleType};
use crate::error::ParserError;
use crate::parser::{DefaultNs, Parser};
use crate::types::{ArrayTest, FunctionTest, ItemType, MapTest, Occurrence, SequenceType};

impl<'a, 'c> Parser<'a, 'c> {
    /// The target of `cast as` / `castable as`: an atomic type name with an
    /// optional `?`.
    pub(crate) fn parse_single_type(&mut self) -> Result<SingleType, ParserError> {
        let name = self.parse_atomic_type_name()?;
        let xs = self.resolve_atomic_type(&name)?;
        let optional = self.eat(&Token::QuestionMark);
        Ok(SingleType { name, xs, optional })
    }

    pub(crate) fn parse_sequence_type(&mut self) -> Result<SequenceType, ParserError> {
        if self.peek() == Some(&Token::EmptySequence)
            && self.peek_at(1) == Some(&Token::LeftParen)
        {
            self.advance();
            self.expect(&Token::LeftParen)?;
            self.expect(&Token::RightParen)?;
            return Ok(SequenceType::Empty);
        }
        let item_type = self.parse_item_type()?;
        let occurrence = self.parse_occurrence();
        Ok(SequenceType::Item {
            item_type,
            occurrence,
        })
    }

    fn parse_occurrence(&mut self) -> Occurrence {
        // greedy, as the XPath grammar requires
        match self.peek() {
            Some(Token::QuestionMark) => {
                self.advance();
                Occurrence::Optional
            }
            Some(Token::Asterisk) => {
                self.advance();
                Occurrence::Many
            }
            Some(Token::Plus) => {
                self.advance();
                Occurrence::NonEmpty
            }
            _ => Occurrence::One,
        }
    }

    pub(crate) fn parse_item_type(&mut self) -> Result<ItemType, ParserError> {
        // item()
        if self.peek() == Some(&Token::Item) && self.peek_at(1) == Some(&Token::LeftParen) {
            self.advance();
            self.expect(&Token::LeftParen)?;
            self.expect(&Token::RightParen)?;
            return Ok(ItemType::AnyItem);
        }
        // node kind tests
        if matches!(
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
        {
            return Ok(ItemType::Kind(self.parse_kind_test()?));
        }
        // function test
        if self.peek() == Some(&Token::Function) {
            return self.parse_function_test();
        }
        // map and array tests; `map` and `array` are names here, they are
        // reserved only before `{`
        if self.peek_ncname() == Some("map") && self.peek_at(1) == Some(&Token::LeftParen) {
            return self.parse_map_test();
        }
        if self.peek_ncname() == Some("array") && self.peek_at(1) == Some(&Token::LeftParen) {
            return self.parse_array_test();
        }
        // parenthesized union of item types
        if self.peek() == Some(&Token::LeftParen) {
            self.advance();
            let mut members = vec![self.parse_item_type()?];
            while self.eat(&Token::Pipe) {
                members.push(self.parse_item_type()?);
            }
            self.expect(&Token::RightParen)?;
            return Ok(ItemType::union(members));
        }
        // named atomic type
        let name = self.parse_atomic_type_name()?;
        let xs = self.resolve_atomic_type(&name)?;
        Ok(ItemType::Atomic(xs))
    }

    fn parse_atomic_type_name(&mut self) -> Result<NameS, ParserError> {
        self.parse_eqname(DefaultNs::Type)
    }

    fn resolve_atomic_type(&self, name: &NameS) -> Result<Xs, ParserError> {
        Xs::by_name(name.value.namespace(), name.value.local_name()).ok_or_else(|| {
            ParserError::UnknownType {
                span: name.span,
                name: name.value.local_name().to_string(),
            }
        })
    }

    fn parse_function_test(&mut self) -> Result<ItemType, ParserError> {
        if !self.features.allow_inline_function {
            return Err(self.unsupported("function test", Version::V3_0));
        }
        self.expect(&Token::Function)?;
        self.expect(&Token::LeftParen)?;
        if self.eat(&Token::Asterisk) {
            self.expect(&Token::RightParen)?;
            return Ok(ItemType::Function(FunctionTest::Any));
        }
        let mut params = Vec::new();
        if self.peek() != Some(&Token::RightParen) {
            loop {
                params.push(self.parse_sequence_type()?);
                if !self.eat(&Token::Comma) {
                    break;
                }
            }
        }
        self.expect(&Token::RightParen)?;
        self.expect(&Token::As)?;
        let return_type = self.parse_sequence_type()?;
        Ok(ItemType::Function(FunctionTest::Typed {
            params,
            return_type: Box::new(return_type),
        }))
    }

    fn parse_map_test(&mut self) -> Result<ItemType, ParserError> {
        if !self.features.allow_map_constructor {
            return Err(self.unsupported("map test", Version::V3_1));
        }
        self.advance();
        self.expect(&Token::LeftParen)?;
        if self.eat(&Token::Asterisk) {
            self.expect(&Token::RightParen)?;
            return Ok(ItemType::Map(MapTest::Any));
        }
        let key_name = self.parse_atomic_type_name()?;
        let key = self.resolve_atomic_type(&key_name)?;
        self.expect(&Token::Comma)?;
        let value = self.parse_sequence_type()?;
        self.expect(&Token::RightParen)?;
        Ok(ItemType::Map(MapTest::Typed {
            key,
            value: Box::new(value),
        }))
    }

    fn parse_array_test(&mut self) -> Result<ItemType, ParserError> {
        if !self.features.allow_array_constructor {
            return Err(self.unsupported("array test", Version::V3_1));
        }
        self.advance();
        self.expect(&Token::LeftParen)?;
        if self.eat(&Token::Asterisk) {
            self.expect(&Token::RightParen)?;
            return Ok(ItemType::Array(ArrayTest::Any));
        }
        let member = self.parse_sequence_type()?;
        self.expect(&Token::RightParen)?;
        Ok(ItemType::Array(ArrayTest::Typed(Box::new(member))))
    }
}
