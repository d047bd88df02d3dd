//! ToUnicode CMap parsing.
//!
//! Handles the `bfchar` and `bfrange` sections that map character codes to
//! UTF-16BE strings. Code space ranges and CID mappings are not needed to
//! read the watermark text and are ignored.

use std::collections::HashMap;

/// Character code to Unicode mapping read from a `/ToUnicode` stream.
#[derive(Debug, Clone, Default)]
pub struct ToUnicode {
    mappings: HashMap<u32, String>,
}

impl ToUnicode {
    /// Parse CMap program text. Malformed entries are skipped.
    pub fn parse(data: &[u8]) -> Self {
        let text = String::from_utf8_lossy(data);
        let mut mappings = HashMap::new();

        for section in sections(&text, "beginbfchar", "endbfchar") {
            let tokens = tokens(section);
            for pair in tokens.chunks_exact(2) {
                if let (Token::Hex(src), Token::Hex(dst)) = (&pair[0], &pair[1]) {
                    if let (Some(code), Some(value)) = (hex_code(src), utf16_hex(dst)) {
                        mappings.insert(code, value);
                    }
                }
            }
        }

        for section in sections(&text, "beginbfrange", "endbfrange") {
            let tokens = tokens(section);
            let mut i = 0;
            while i + 2 < tokens.len() {
                let (Token::Hex(lo), Token::Hex(hi)) = (&tokens[i], &tokens[i + 1]) else {
                    i += 1;
                    continue;
                };
                let (Some(lo), Some(hi)) = (hex_code(lo), hex_code(hi)) else {
                    i += 3;
                    continue;
                };
                match &tokens[i + 2] {
                    Token::Hex(dst) => {
                        if let Some(units) = utf16_units(dst) {
                            for (offset, code) in (lo..=hi).enumerate() {
                                let mut units = units.clone();
                                if let Some(last) = units.last_mut() {
                                    *last = last.wrapping_add(offset as u16);
                                }
                                mappings.insert(code, String::from_utf16_lossy(&units));
                            }
                        }
                    }
                    Token::Array(items) => {
                        for (code, dst) in (lo..=hi).zip(items) {
                            if let Some(value) = utf16_hex(dst) {
                                mappings.insert(code, value);
                            }
                        }
                    }
                }
                i += 3;
            }
        }

        Self { mappings }
    }

    pub fn lookup(&self, code: u32) -> Option<&str> {
        self.mappings.get(&code).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

enum Token<'a> {
    Hex(&'a str),
    Array(Vec<&'a str>),
}

fn sections<'a>(text: &'a str, begin: &'a str, end: &'a str) -> impl Iterator<Item = &'a str> + 'a {
    text.split(begin).skip(1).filter_map(move |s| s.split(end).next())
}

fn tokens(section: &str) -> Vec<Token<'_>> {
    let mut out = Vec::new();
    let mut rest = section;
    while let Some(pos) = rest.find(['<', '[']) {
        let after = &rest[pos + 1..];
        if rest[pos..].starts_with('<') {
            let Some(close) = after.find('>') else { break };
            out.push(Token::Hex(&after[..close]));
            rest = &after[close + 1..];
        } else {
            let Some(close) = after.find(']') else { break };
            let items = after[..close]
                .split(['<', '>'])
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect();
            out.push(Token::Array(items));
            rest = &after[close + 1..];
        }
    }
    out
}

fn hex_code(hex: &str) -> Option<u32> {
    let cleaned: String = hex.chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.is_empty() || cleaned.len() > 8 {
        return None;
    }
    u32::from_str_radix(&cleaned, 16).ok()
}

fn utf16_units(hex: &str) -> Option<Vec<u16>> {
    let cleaned: Vec<u8> = hex.bytes().filter(|b| !b.is_ascii_whitespace()).collect();
    if cleaned.is_empty() || cleaned.len() % 4 != 0 {
        return None;
    }
    cleaned
        .chunks(4)
        .map(|chunk| {
            std::str::from_utf8(chunk)
                .ok()
                .and_then(|s| u16::from_str_radix(s, 16).ok())
        })
        .collect()
}

fn utf16_hex(hex: &str) -> Option<String> {
    utf16_units(hex).map(|units| String::from_utf16_lossy(&units))
}
