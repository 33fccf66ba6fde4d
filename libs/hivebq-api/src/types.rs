use std::fmt;
use std::str::FromStr;

use crate::decimal::MAX_PRECISION;
use crate::error::ConvertError;

const DEFAULT_DECIMAL_PRECISION: u8 = 10;
const MAX_VARCHAR_LENGTH: u32 = 65_535;
const MAX_CHAR_LENGTH: u32 = 255;

/// Hive type descriptor: the expected shape of a converted value.
///
/// Parses from and prints as a Hive type string, e.g.
/// `struct<id:bigint,tags:array<string>>` or `decimal(38,9)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HiveType {
    Void,
    Boolean,
    TinyInt,
    SmallInt,
    Int,
    BigInt,
    Float,
    Double,
    String,
    Varchar(u32),
    Char(u32),
    Date,
    Timestamp,
    TimestampLocalTz,
    Decimal { precision: u8, scale: u8 },
    Binary,
    IntervalYearMonth,
    IntervalDayTime,
    List(Box<HiveType>),
    Map { key: Box<HiveType>, value: Box<HiveType> },
    Struct(Vec<StructField>),
    Union(Vec<HiveType>),
}

/// A single named field of a Hive struct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructField {
    pub name: String,
    pub field_type: HiveType,
}

impl StructField {
    pub fn new(name: impl Into<String>, field_type: HiveType) -> Self {
        Self {
            name: name.into(),
            field_type,
        }
    }
}

impl HiveType {
    pub fn list(element: HiveType) -> Self {
        Self::List(Box::new(element))
    }

    pub fn map(key: HiveType, value: HiveType) -> Self {
        Self::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    /// `struct<key:K,value:V>`: the element type of a Hive map read as an
    /// array of key/value records.
    pub fn key_value_struct(key: HiveType, value: HiveType) -> Self {
        Self::Struct(vec![StructField::new("key", key), StructField::new("value", value)])
    }

    /// Struct field by name. Hive identifiers are case-insensitive.
    pub fn field(&self, name: &str) -> Option<&StructField> {
        match self {
            Self::Struct(fields) => fields.iter().find(|f| f.name.eq_ignore_ascii_case(name)),
            _ => None,
        }
    }

    /// `string`, `varchar(n)` and `char(n)`.
    pub fn is_string_like(&self) -> bool {
        matches!(self, Self::String | Self::Varchar(_) | Self::Char(_))
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }

    pub fn is_map(&self) -> bool {
        matches!(self, Self::Map { .. })
    }

    pub fn is_struct(&self) -> bool {
        matches!(self, Self::Struct(_))
    }

    pub fn is_primitive(&self) -> bool {
        !matches!(self, Self::List(_) | Self::Map { .. } | Self::Struct(_) | Self::Union(_))
    }
}

impl fmt::Display for HiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Void => f.write_str("void"),
            Self::Boolean => f.write_str("boolean"),
            Self::TinyInt => f.write_str("tinyint"),
            Self::SmallInt => f.write_str("smallint"),
            Self::Int => f.write_str("int"),
            Self::BigInt => f.write_str("bigint"),
            Self::Float => f.write_str("float"),
            Self::Double => f.write_str("double"),
            Self::String => f.write_str("string"),
            Self::Varchar(len) => write!(f, "varchar({len})"),
            Self::Char(len) => write!(f, "char({len})"),
            Self::Date => f.write_str("date"),
            Self::Timestamp => f.write_str("timestamp"),
            Self::TimestampLocalTz => f.write_str("timestamp with local time zone"),
            Self::Decimal { precision, scale } => write!(f, "decimal({precision},{scale})"),
            Self::Binary => f.write_str("binary"),
            Self::IntervalYearMonth => f.write_str("interval_year_month"),
            Self::IntervalDayTime => f.write_str("interval_day_time"),
            Self::List(element) => write!(f, "array<{element}>"),
            Self::Map { key, value } => write!(f, "map<{key},{value}>"),
            Self::Struct(fields) => {
                f.write_str("struct<")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}:{}", field.name, field.field_type)?;
                }
                f.write_str(">")
            }
            Self::Union(branches) => {
                f.write_str("uniontype<")?;
                for (i, branch) in branches.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{branch}")?;
                }
                f.write_str(">")
            }
        }
    }
}

impl FromStr for HiveType {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parser = TypeParser { input: s, pos: 0 };
        let parsed = parser.parse_type()?;
        parser.skip_ws();
        if parser.pos != s.len() {
            return Err(parser.error("unexpected trailing characters"));
        }
        Ok(parsed)
    }
}

// ═══════════════════════════════════════════════════════════════
//  Type string parser
// ═══════════════════════════════════════════════════════════════

struct TypeParser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> TypeParser<'a> {
    fn error(&self, detail: impl fmt::Display) -> ConvertError {
        ConvertError::InvalidTypeString {
            input: self.input.to_string(),
            detail: format!("{detail} at offset {}", self.pos),
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn skip_ws(&mut self) {
        while let Some(c) = self.peek().filter(|c| c.is_whitespace()) {
            self.pos += c.len_utf8();
        }
    }

    fn eat(&mut self, expected: char) -> bool {
        self.skip_ws();
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), ConvertError> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(self.error(format_args!("expected '{expected}'")))
        }
    }

    fn ident(&mut self) -> Result<&'a str, ConvertError> {
        self.skip_ws();
        let start = self.pos;
        while let Some(c) = self.peek().filter(|c| c.is_ascii_alphanumeric() || *c == '_') {
            self.pos += c.len_utf8();
        }
        if start == self.pos {
            return Err(self.error("expected identifier"));
        }
        Ok(&self.input[start..self.pos])
    }

    /// Consumes `keyword` if it comes next, otherwise leaves the cursor alone.
    fn keyword(&mut self, keyword: &str) -> bool {
        let saved = self.pos;
        match self.ident() {
            Ok(word) if word.eq_ignore_ascii_case(keyword) => true,
            _ => {
                self.pos = saved;
                false
            }
        }
    }

    fn number(&mut self) -> Result<u32, ConvertError> {
        let digits = self.ident()?;
        digits
            .parse()
            .map_err(|_| self.error(format_args!("expected a number, found '{digits}'")))
    }

    /// Struct field name: identifier or `` `quoted name` ``.
    fn field_name(&mut self) -> Result<String, ConvertError> {
        if !self.eat('`') {
            return Ok(self.ident()?.to_ascii_lowercase());
        }
        let start = self.pos;
        let end = self.input[start..]
            .find('`')
            .map(|i| start + i)
            .ok_or_else(|| self.error("unterminated quoted field name"))?;
        self.pos = end + 1;
        Ok(self.input[start..end].to_ascii_lowercase())
    }

    fn length(&mut self, max: u32) -> Result<u32, ConvertError> {
        self.expect('(')?;
        let len = self.number()?;
        self.expect(')')?;
        if len == 0 || len > max {
            return Err(self.error(format_args!("length {len} outside 1..={max}")));
        }
        Ok(len)
    }

    fn decimal(&mut self) -> Result<HiveType, ConvertError> {
        let (precision, scale) = if self.eat('(') {
            let precision = self.number()?;
            let scale = if self.eat(',') { self.number()? } else { 0 };
            self.expect(')')?;
            (precision, scale)
        } else {
            (u32::from(DEFAULT_DECIMAL_PRECISION), 0)
        };
        if precision == 0 || precision > u32::from(MAX_PRECISION) || scale > precision {
            return Err(self.error(format_args!("invalid decimal({precision},{scale})")));
        }
        Ok(HiveType::Decimal {
            precision: precision as u8,
            scale: scale as u8,
        })
    }

    fn parse_type(&mut self) -> Result<HiveType, ConvertError> {
        let name = self.ident()?.to_ascii_lowercase();
        let parsed = match name.as_str() {
            "void" => HiveType::Void,
            "boolean" => HiveType::Boolean,
            "tinyint" => HiveType::TinyInt,
            "smallint" => HiveType::SmallInt,
            "int" | "integer" => HiveType::Int,
            "bigint" => HiveType::BigInt,
            "float" => HiveType::Float,
            "double" => {
                self.keyword("precision");
                HiveType::Double
            }
            "string" => HiveType::String,
            "varchar" => HiveType::Varchar(self.length(MAX_VARCHAR_LENGTH)?),
            "char" => HiveType::Char(self.length(MAX_CHAR_LENGTH)?),
            "date" => HiveType::Date,
            "timestamp" => {
                if self.keyword("with") {
                    for word in ["local", "time", "zone"] {
                        if !self.keyword(word) {
                            return Err(self.error(format_args!("expected '{word}'")));
                        }
                    }
                    HiveType::TimestampLocalTz
                } else {
                    HiveType::Timestamp
                }
            }
            "decimal" | "numeric" => self.decimal()?,
            "binary" => HiveType::Binary,
            "interval_year_month" => HiveType::IntervalYearMonth,
            "interval_day_time" => HiveType::IntervalDayTime,
            "array" => {
                self.expect('<')?;
                let element = self.parse_type()?;
                self.expect('>')?;
                HiveType::list(element)
            }
            "map" => {
                self.expect('<')?;
                let key = self.parse_type()?;
                self.expect(',')?;
                let value = self.parse_type()?;
                self.expect('>')?;
                HiveType::map(key, value)
            }
            "struct" => {
                self.expect('<')?;
                let mut fields = Vec::new();
                loop {
                    let name = self.field_name()?;
                    self.expect(':')?;
                    fields.push(StructField::new(name, self.parse_type()?));
                    if !self.eat(',') {
                        break;
                    }
                }
                self.expect('>')?;
                HiveType::Struct(fields)
            }
            "uniontype" => {
                self.expect('<')?;
                let mut branches = vec![self.parse_type()?];
                while self.eat(',') {
                    branches.push(self.parse_type()?);
                }
                self.expect('>')?;
                HiveType::Union(branches)
            }
            other => return Err(self.error(format_args!("unknown type '{other}'"))),
        };
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> HiveType {
        s.parse().unwrap_or_else(|e| panic!("{s}: {e}"))
    }

    #[test]
    fn parses_primitives() {
        assert_eq!(parse("tinyint"), HiveType::TinyInt);
        assert_eq!(parse("INT"), HiveType::Int);
        assert_eq!(parse("integer"), HiveType::Int);
        assert_eq!(parse("double precision"), HiveType::Double);
        assert_eq!(parse("varchar(20)"), HiveType::Varchar(20));
        assert_eq!(parse("char(10)"), HiveType::Char(10));
        assert_eq!(parse("decimal"), HiveType::Decimal { precision: 10, scale: 0 });
        assert_eq!(parse("decimal(38)"), HiveType::Decimal { precision: 38, scale: 0 });
        assert_eq!(parse("decimal(38, 9)"), HiveType::Decimal { precision: 38, scale: 9 });
        assert_eq!(parse("timestamp"), HiveType::Timestamp);
        assert_eq!(parse("timestamp with local time zone"), HiveType::TimestampLocalTz);
    }

    #[test]
    fn parses_nested_types() {
        let parsed = parse("struct<Number:bigint, tags:array<string>, attrs:map<string,struct<i:int>>>");
        assert_eq!(
            parsed,
            HiveType::Struct(vec![
                StructField::new("number", HiveType::BigInt),
                StructField::new("tags", HiveType::list(HiveType::String)),
                StructField::new(
                    "attrs",
                    HiveType::map(
                        HiveType::String,
                        HiveType::Struct(vec![StructField::new("i", HiveType::Int)])
                    )
                ),
            ])
        );
        assert_eq!(parsed.field("NUMBER").map(|f| &f.field_type), Some(&HiveType::BigInt));
        assert!(parsed.field("missing").is_none());
    }

    #[test]
    fn quoted_field_names() {
        let parsed = parse("struct<`Order Id`:bigint>");
        assert_eq!(parsed.field("order id").unwrap().field_type, HiveType::BigInt);
    }

    #[test]
    fn display_round_trips() {
        for s in [
            "struct<a:int,b:array<string>>",
            "map<string,decimal(38,9)>",
            "uniontype<int,varchar(3)>",
            "array<timestamp with local time zone>",
            "struct<ts:timestamp,d:date,raw:binary,flag:boolean>",
        ] {
            assert_eq!(parse(s).to_string(), s);
        }
    }

    #[test]
    fn rejects_malformed_types() {
        for s in [
            "",
            "strin",
            "array<int",
            "map<int>",
            "struct<>",
            "struct<a int>",
            "decimal(39,0)",
            "decimal(5,6)",
            "varchar(0)",
            "char(256)",
            "timestamp with time zone",
            "int int",
        ] {
            assert!(
                matches!(s.parse::<HiveType>(), Err(ConvertError::InvalidTypeString { .. })),
                "{s:?} should not parse"
            );
        }
    }

    #[test]
    fn key_value_struct() {
        let kv = HiveType::key_value_struct(HiveType::String, HiveType::BigInt);
        assert_eq!(kv.to_string(), "struct<key:string,value:bigint>");
    }

    #[test]
    fn capabilities() {
        assert!(HiveType::Varchar(3).is_string_like());
        assert!(HiveType::Char(3).is_string_like());
        assert!(!HiveType::Binary.is_string_like());
        assert!(HiveType::Date.is_primitive());
        assert!(!HiveType::list(HiveType::Int).is_primitive());
        assert!(HiveType::list(HiveType::Int).is_list());
        assert!(HiveType::map(HiveType::String, HiveType::Int).is_map());
        assert!(HiveType::key_value_struct(HiveType::String, HiveType::Int).is_struct());
        assert!(!HiveType::String.is_struct());
    }
}
