use std::fmt;
use std::io::Read;

use serde::Serialize;
use tracing::debug;

use crate::consts::{FITS_BLOCK_SIZE, FITS_CARD_SIZE, FITS_KEYWORD_WIDTH, MAX_HEADER_BLOCKS};
use crate::error::{Result, StarscopeError};

use super::source::read_full;

/// Typed value of a header card.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum HeaderValue {
    Number(f64),
    Logical(bool),
    Text(String),
}

impl HeaderValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            HeaderValue::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            HeaderValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for HeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderValue::Number(v) => write!(f, "{v}"),
            HeaderValue::Logical(true) => write!(f, "T"),
            HeaderValue::Logical(false) => write!(f, "F"),
            HeaderValue::Text(s) => write!(f, "'{s}'"),
        }
    }
}

/// Primary HDU header: ordered cards plus the offset where pixel data starts.
#[derive(Clone, Debug)]
pub struct FitsHeader {
    cards: Vec<(String, HeaderValue)>,
    data_offset: u64,
}

impl FitsHeader {
    /// Byte offset of the first pixel, always a multiple of the block size.
    pub fn data_offset(&self) -> u64 {
        self.data_offset
    }

    /// Look up a keyword. The first card with that keyword wins.
    pub fn get(&self, key: &str) -> Option<&HeaderValue> {
        self.cards
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(HeaderValue::as_number)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(HeaderValue::as_text)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &HeaderValue)> {
        self.cards.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Read header blocks from the start of a FITS stream until the END card.
///
/// At most [`MAX_HEADER_BLOCKS`] blocks are consumed. A missing END card
/// within that window (or EOF before it) is a header parse error.
pub fn read_header<R: Read>(reader: &mut R) -> Result<FitsHeader> {
    let mut raw = Vec::with_capacity(FITS_BLOCK_SIZE * MAX_HEADER_BLOCKS);
    let mut block = [0u8; FITS_BLOCK_SIZE];

    for _ in 0..MAX_HEADER_BLOCKS {
        let n = read_full(reader, &mut block)?;
        if n == 0 {
            break;
        }
        let first_new_card = raw.len() / FITS_CARD_SIZE;
        raw.extend_from_slice(&block[..n]);

        let end_card = raw
            .chunks_exact(FITS_CARD_SIZE)
            .enumerate()
            .skip(first_new_card)
            .find(|(_, card)| is_end_card(card))
            .map(|(i, _)| i);

        if let Some(end_index) = end_card {
            let cards: Vec<(String, HeaderValue)> = raw[..end_index * FITS_CARD_SIZE]
                .chunks_exact(FITS_CARD_SIZE)
                .filter_map(parse_card)
                .collect();
            let header_bytes = (end_index + 1) * FITS_CARD_SIZE;
            let data_offset = header_bytes.div_ceil(FITS_BLOCK_SIZE) * FITS_BLOCK_SIZE;
            debug!(cards = cards.len(), data_offset, "FITS header decoded");
            return Ok(FitsHeader {
                cards,
                data_offset: data_offset as u64,
            });
        }

        if n < FITS_BLOCK_SIZE {
            break;
        }
    }

    Err(StarscopeError::HeaderParse(format!(
        "no END card within the first {} bytes",
        raw.len()
    )))
}

fn is_end_card(card: &[u8]) -> bool {
    let keyword = &card[..FITS_KEYWORD_WIDTH.min(card.len())];
    keyword.trim_ascii() == b"END"
}

/// Parse a `KEY = VALUE [/ COMMENT]` card. Commentary cards yield `None`.
fn parse_card(card: &[u8]) -> Option<(String, HeaderValue)> {
    let text = String::from_utf8_lossy(card);
    let eq = text.find('=')?;
    let key = text[..eq].trim();
    let valid_key = !key.is_empty()
        && key.len() <= FITS_KEYWORD_WIDTH
        && key
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-');
    if !valid_key {
        return None;
    }
    Some((key.to_ascii_uppercase(), parse_value(&text[eq + 1..])))
}

fn parse_value(field: &str) -> HeaderValue {
    let field = field.trim_start();

    if let Some(quoted) = field.strip_prefix('\'') {
        let mut value = String::new();
        let mut chars = quoted.chars().peekable();
        while let Some(c) = chars.next() {
            if c == '\'' {
                // '' is an escaped quote inside a string value
                if chars.peek() == Some(&'\'') {
                    chars.next();
                    value.push('\'');
                } else {
                    break;
                }
            } else {
                value.push(c);
            }
        }
        return HeaderValue::Text(value.trim_end().to_string());
    }

    let raw = match field.find('/') {
        Some(i) => &field[..i],
        None => field,
    }
    .trim();

    match raw {
        "T" => HeaderValue::Logical(true),
        "F" => HeaderValue::Logical(false),
        _ if is_numeric(raw) => raw
            .replace(['D', 'd'], "E")
            .parse::<f64>()
            .map(HeaderValue::Number)
            .unwrap_or_else(|_| HeaderValue::Text(raw.to_string())),
        _ => HeaderValue::Text(raw.to_string()),
    }
}

/// `[+-]digits[.digits][(E|D)[+-]digits]`, at least one mantissa digit.
fn is_numeric(s: &str) -> bool {
    let bytes = s.as_bytes();
    let mut i = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        i += 1;
    }

    let mut mantissa_digits = 0;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
        mantissa_digits += 1;
    }
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
            mantissa_digits += 1;
        }
    }
    if mantissa_digits == 0 {
        return false;
    }

    if i < bytes.len() && matches!(bytes[i], b'E' | b'e' | b'D' | b'd') {
        i += 1;
        if i < bytes.len() && matches!(bytes[i], b'+' | b'-') {
            i += 1;
        }
        let exp_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == exp_start {
            return false;
        }
    }

    i == bytes.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(text: &str) -> Vec<u8> {
        let mut c = text.as_bytes().to_vec();
        c.resize(FITS_CARD_SIZE, b' ');
        c
    }

    #[test]
    fn test_is_numeric() {
        assert!(is_numeric("16"));
        assert!(is_numeric("-32"));
        assert!(is_numeric("+1.5"));
        assert!(is_numeric("32768."));
        assert!(is_numeric(".5"));
        assert!(is_numeric("1.0E-3"));
        assert!(is_numeric("2.5D+02"));
        assert!(!is_numeric(""));
        assert!(!is_numeric("."));
        assert!(!is_numeric("1E"));
        assert!(!is_numeric("NaN"));
        assert!(!is_numeric("inf"));
        assert!(!is_numeric("12 34"));
    }

    #[test]
    fn test_parse_numeric_card() {
        let (k, v) = parse_card(&card("BITPIX  =                   16 / bits per pixel")).unwrap();
        assert_eq!(k, "BITPIX");
        assert_eq!(v, HeaderValue::Number(16.0));
    }

    #[test]
    fn test_parse_fortran_exponent() {
        let (_, v) = parse_card(&card("EXPTIME =            3.0D+02")).unwrap();
        assert_eq!(v, HeaderValue::Number(300.0));
    }

    #[test]
    fn test_parse_quoted_string_with_slash_and_escape() {
        let (k, v) = parse_card(&card("OBJECT  = 'M31 / Andromeda''s core' / target")).unwrap();
        assert_eq!(k, "OBJECT");
        assert_eq!(v, HeaderValue::Text("M31 / Andromeda's core".into()));
    }

    #[test]
    fn test_parse_logical() {
        let (_, v) = parse_card(&card("SIMPLE  =                    T")).unwrap();
        assert_eq!(v, HeaderValue::Logical(true));
    }

    #[test]
    fn test_commentary_cards_are_skipped() {
        assert!(parse_card(&card("COMMENT   written by a = b")).is_none());
        assert!(parse_card(&card("HISTORY   calibrated")).is_none());
        assert!(parse_card(&card("")).is_none());
    }

    #[test]
    fn test_end_card_detection() {
        assert!(is_end_card(&card("END")));
        assert!(!is_end_card(&card("ENDTIME = 'x'")));
    }
}
