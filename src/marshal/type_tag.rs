//! Type-tag parsing and binary encoding.
//!
//! Type arguments arrive as strings in the chain's type grammar
//! (`u64`, `address`, `vector<u8>`, `0x1::coin::Coin<0x1::supra_coin::SupraCoin>`).
//! They are parsed into a structured representation here, then encoded
//! with the chain's variant indices for inclusion in the raw transaction.

use std::fmt;

use thiserror::Error;

use crate::accounts::AccountAddress;
use crate::marshal::args::uleb128;

/// Parse failure for a type-tag string; carries the byte position of
/// the offending token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid type tag '{input}' at byte {position}: {message}")]
pub struct TypeTagParseError {
    pub input: String,
    pub position: usize,
    pub message: String,
}

/// A structured on-chain type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeTag {
    Bool,
    U8,
    U16,
    U32,
    U64,
    U128,
    U256,
    Address,
    Signer,
    Vector(Box<TypeTag>),
    Struct(Box<StructTag>),
}

/// A (possibly generic) struct type: `address::module::Name<T...>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructTag {
    pub address: AccountAddress,
    pub module: String,
    pub name: String,
    pub type_params: Vec<TypeTag>,
}

impl TypeTag {
    /// Parse a type-tag string. The whole input must be consumed.
    pub fn parse(input: &str) -> Result<TypeTag, TypeTagParseError> {
        let mut parser = Parser::new(input);
        let tag = parser.parse_type_tag()?;
        parser.skip_ws();
        if parser.pos < parser.input.len() {
            return Err(parser.error("trailing characters after type tag"));
        }
        Ok(tag)
    }

    /// Binary encoding: a ULEB128 variant index followed by the
    /// variant's contents, matching the chain's canonical serialization.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.encode_into(&mut out);
        out
    }

    fn encode_into(&self, out: &mut Vec<u8>) {
        match self {
            TypeTag::Bool => out.extend(uleb128(0)),
            TypeTag::U8 => out.extend(uleb128(1)),
            TypeTag::U64 => out.extend(uleb128(2)),
            TypeTag::U128 => out.extend(uleb128(3)),
            TypeTag::Address => out.extend(uleb128(4)),
            TypeTag::Signer => out.extend(uleb128(5)),
            TypeTag::Vector(inner) => {
                out.extend(uleb128(6));
                inner.encode_into(out);
            }
            TypeTag::Struct(s) => {
                out.extend(uleb128(7));
                out.extend_from_slice(s.address.as_bytes());
                encode_identifier(&s.module, out);
                encode_identifier(&s.name, out);
                out.extend(uleb128(s.type_params.len() as u32));
                for param in &s.type_params {
                    param.encode_into(out);
                }
            }
            TypeTag::U16 => out.extend(uleb128(8)),
            TypeTag::U32 => out.extend(uleb128(9)),
            TypeTag::U256 => out.extend(uleb128(10)),
        }
    }
}

fn encode_identifier(ident: &str, out: &mut Vec<u8>) {
    out.extend(uleb128(ident.len() as u32));
    out.extend_from_slice(ident.as_bytes());
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeTag::Bool => write!(f, "bool"),
            TypeTag::U8 => write!(f, "u8"),
            TypeTag::U16 => write!(f, "u16"),
            TypeTag::U32 => write!(f, "u32"),
            TypeTag::U64 => write!(f, "u64"),
            TypeTag::U128 => write!(f, "u128"),
            TypeTag::U256 => write!(f, "u256"),
            TypeTag::Address => write!(f, "address"),
            TypeTag::Signer => write!(f, "signer"),
            TypeTag::Vector(inner) => write!(f, "vector<{inner}>"),
            TypeTag::Struct(s) => {
                write!(f, "{}::{}::{}", s.address.to_hex_literal(), s.module, s.name)?;
                if !s.type_params.is_empty() {
                    write!(f, "<")?;
                    for (i, param) in s.type_params.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{param}")?;
                    }
                    write!(f, ">")?;
                }
                Ok(())
            }
        }
    }
}

/// Recursive-descent scanner over the type grammar.
struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn error(&self, message: &str) -> TypeTagParseError {
        TypeTagParseError {
            input: self.input.to_string(),
            position: self.pos,
            message: message.to_string(),
        }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn skip_ws(&mut self) {
        while self.rest().starts_with(|c: char| c.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn eat(&mut self, token: &str) -> bool {
        if self.rest().starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &str) -> Result<(), TypeTagParseError> {
        self.skip_ws();
        if self.eat(token) {
            Ok(())
        } else {
            Err(self.error(&format!("expected '{token}'")))
        }
    }

    fn parse_type_tag(&mut self) -> Result<TypeTag, TypeTagParseError> {
        self.skip_ws();
        if self.rest().is_empty() {
            return Err(self.error("empty type tag"));
        }

        if self.rest().starts_with("0x") {
            return self.parse_struct_tag();
        }

        let word = self.parse_identifier()?;
        let tag = match word.as_str() {
            "bool" => TypeTag::Bool,
            "u8" => TypeTag::U8,
            "u16" => TypeTag::U16,
            "u32" => TypeTag::U32,
            "u64" => TypeTag::U64,
            "u128" => TypeTag::U128,
            "u256" => TypeTag::U256,
            "address" => TypeTag::Address,
            "signer" => TypeTag::Signer,
            "vector" => {
                self.expect("<")?;
                let inner = self.parse_type_tag()?;
                self.expect(">")?;
                TypeTag::Vector(Box::new(inner))
            }
            other => {
                // Report at the start of the unknown word.
                self.pos -= other.len();
                return Err(self.error(&format!("unknown type '{other}'")));
            }
        };
        Ok(tag)
    }

    fn parse_struct_tag(&mut self) -> Result<TypeTag, TypeTagParseError> {
        let address = self.parse_address()?;
        self.expect("::")?;
        let module = self.parse_identifier()?;
        self.expect("::")?;
        let name = self.parse_identifier()?;

        let mut type_params = Vec::new();
        self.skip_ws();
        if self.eat("<") {
            loop {
                type_params.push(self.parse_type_tag()?);
                self.skip_ws();
                if self.eat(",") {
                    continue;
                }
                if self.eat(">") {
                    break;
                }
                return Err(self.error("expected ',' or '>' in type parameter list"));
            }
        }

        Ok(TypeTag::Struct(Box::new(StructTag {
            address,
            module,
            name,
            type_params,
        })))
    }

    fn parse_address(&mut self) -> Result<AccountAddress, TypeTagParseError> {
        let start = self.pos;
        if !self.eat("0x") {
            return Err(self.error("expected '0x' address literal"));
        }
        let digits: usize = self
            .rest()
            .bytes()
            .take_while(u8::is_ascii_hexdigit)
            .count();
        if digits == 0 {
            return Err(self.error("expected hex digits after '0x'"));
        }
        self.pos += digits;
        let literal = &self.input[start..self.pos];
        AccountAddress::from_hex_literal(literal).map_err(|e| TypeTagParseError {
            input: self.input.to_string(),
            position: start,
            message: e.reason,
        })
    }

    fn parse_identifier(&mut self) -> Result<String, TypeTagParseError> {
        self.skip_ws();
        let taken: usize = self
            .rest()
            .bytes()
            .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_')
            .count();
        if taken == 0 {
            return Err(self.error("expected identifier"));
        }
        let first = self.rest().as_bytes()[0];
        if first.is_ascii_digit() {
            return Err(self.error("identifier cannot start with a digit"));
        }
        let ident = self.rest()[..taken].to_string();
        self.pos += taken;
        Ok(ident)
    }
}
