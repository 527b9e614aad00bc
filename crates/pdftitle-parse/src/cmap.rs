//! ToUnicode CMap parsing.
//!
//! A ToUnicode stream is PostScript-flavoured but uses the same lexical
//! syntax as content streams, so it is run through [`tokenize`]: every
//! `endbfchar` / `endbfrange` keyword then carries the entries of its
//! section as operands.

use std::collections::HashMap;

use crate::error::BackendError;
use crate::tokenizer::{Operand, tokenize};

/// Character code to unicode mapping from a `/ToUnicode` stream.
#[derive(Debug, Clone, Default)]
pub struct ToUnicodeCMap {
    mappings: HashMap<u32, String>,
}

fn code_of(bytes: &[u8]) -> u32 {
    bytes.iter().fold(0u32, |acc, &b| (acc << 8) | u32::from(b))
}

fn utf16_units(bytes: &[u8]) -> Vec<u16> {
    if bytes.len() == 1 {
        return vec![u16::from(bytes[0])];
    }
    bytes
        .chunks(2)
        .map(|c| c.iter().fold(0u16, |acc, &b| (acc << 8) | u16::from(b)))
        .collect()
}

fn decode_utf16(units: &[u16]) -> Option<String> {
    String::from_utf16(units).ok().filter(|s| !s.is_empty())
}

impl ToUnicodeCMap {
    pub fn parse(data: &[u8]) -> Result<Self, BackendError> {
        let ops = tokenize(data)
            .map_err(|e| BackendError::Font(format!("malformed ToUnicode CMap: {e}")))?;
        let mut cmap = ToUnicodeCMap::default();
        for op in ops {
            match op.name.as_str() {
                "endbfchar" => cmap.add_bfchar(&op.operands),
                "endbfrange" => cmap.add_bfrange(&op.operands),
                _ => {}
            }
        }
        Ok(cmap)
    }

    /// `<src> <dst>` pairs.
    fn add_bfchar(&mut self, operands: &[Operand]) {
        for pair in operands.chunks_exact(2) {
            let (Some(src), Some(dst)) = (pair[0].as_bytes(), pair[1].as_bytes()) else {
                continue;
            };
            if let Some(text) = decode_utf16(&utf16_units(dst)) {
                self.mappings.insert(code_of(src), text);
            }
        }
    }

    /// `<lo> <hi> <dst>` or `<lo> <hi> [<dst0> <dst1> ...]` triples.
    fn add_bfrange(&mut self, operands: &[Operand]) {
        for triple in operands.chunks_exact(3) {
            let (Some(lo), Some(hi)) = (triple[0].as_bytes(), triple[1].as_bytes()) else {
                continue;
            };
            let (lo, hi) = (code_of(lo), code_of(hi));
            if hi < lo || hi - lo > 0xFFFF {
                continue;
            }
            match &triple[2] {
                Operand::Array(items) => {
                    for (code, item) in (lo..=hi).zip(items) {
                        let text = item.as_bytes().and_then(|b| decode_utf16(&utf16_units(b)));
                        if let Some(text) = text {
                            self.mappings.insert(code, text);
                        }
                    }
                }
                dst => {
                    let Some(dst) = dst.as_bytes() else {
                        continue;
                    };
                    let base = utf16_units(dst);
                    let Some((&last, _)) = base.split_last() else {
                        continue;
                    };
                    for code in lo..=hi {
                        let mut units = base.clone();
                        let bumped = u32::from(last) + (code - lo);
                        let Ok(bumped) = u16::try_from(bumped) else {
                            break;
                        };
                        if let Some(slot) = units.last_mut() {
                            *slot = bumped;
                        }
                        if let Some(text) = decode_utf16(&units) {
                            self.mappings.insert(code, text);
                        }
                    }
                }
            }
        }
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
