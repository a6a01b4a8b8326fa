// ============================================================
// Layer 4 — Script Converter
// ============================================================
// Simplified ↔ traditional Chinese normalisation for inference
// inputs, applied before tokenisation so that prompts written in
// simplified characters hit a vocabulary built from traditional
// poetry.
//
// No conversion dictionary ships with the crate, so there is no
// out-of-the-box s2t: without a user-supplied table only the
// identity converter is available. The table is read from an
// OpenCC character file (e.g. STCharacters.txt):
//
//   电	電
//   发	發 髮
//   ^ simplified, then one or more traditional forms
//
// s2t maps each simplified character to its first traditional form;
// t2s maps every traditional form back to its simplified character.
// Characters absent from the table pass through unchanged.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::data::loader::read_corpus_file;
use crate::domain::error::CorpusError;
use crate::domain::traits::ScriptConverter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Conversion {
    /// Simplified → traditional
    S2t,
    /// Traditional → simplified
    T2s,
}

impl FromStr for Conversion {
    type Err = CorpusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "s2t" => Ok(Conversion::S2t),
            "t2s" => Ok(Conversion::T2s),
            other => Err(CorpusError::InvalidConversion(format!(
                "conversion must be 's2t' or 't2s', got '{other}'"
            ))),
        }
    }
}

impl fmt::Display for Conversion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Conversion::S2t => write!(f, "s2t"),
            Conversion::T2s => write!(f, "t2s"),
        }
    }
}

/// Leaves text untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityConverter;

impl ScriptConverter for IdentityConverter {
    fn convert(&self, text: &str) -> String {
        text.to_string()
    }
}

/// Character-for-character replacement table.
#[derive(Debug, Clone)]
pub struct CharTableConverter {
    direction: Conversion,
    table:     HashMap<char, char>,
}

impl CharTableConverter {
    /// Parse an OpenCC character table for the given direction.
    pub fn from_table(table: &str, direction: Conversion) -> Result<Self, CorpusError> {
        let mut map = HashMap::new();

        for (i, line) in table.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut fields = line.split_whitespace();
            let simplified = single_char(fields.next(), i + 1)?;
            let variants: Vec<char> = fields
                .map(|f| single_char(Some(f), i + 1))
                .collect::<Result<_, _>>()?;
            if variants.is_empty() {
                return Err(CorpusError::InvalidConversion(format!(
                    "table line {} has no target character",
                    i + 1
                )));
            }

            match direction {
                Conversion::S2t => {
                    map.entry(simplified).or_insert(variants[0]);
                }
                Conversion::T2s => {
                    for traditional in variants {
                        map.entry(traditional).or_insert(simplified);
                    }
                }
            }
        }

        tracing::debug!("Loaded {} {} conversion entries", map.len(), direction);
        Ok(Self { direction, table: map })
    }

    pub fn from_file(path: &Path, direction: Conversion) -> Result<Self, CorpusError> {
        tracing::info!("Loading {} table from '{}'", direction, path.display());
        let content = read_corpus_file(path)?;
        Self::from_table(&content, direction)
    }

    pub fn direction(&self) -> Conversion {
        self.direction
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl ScriptConverter for CharTableConverter {
    fn convert(&self, text: &str) -> String {
        text.chars()
            .map(|c| self.table.get(&c).copied().unwrap_or(c))
            .collect()
    }
}

fn single_char(field: Option<&str>, line: usize) -> Result<char, CorpusError> {
    let field = field.unwrap_or_default();
    let mut chars = field.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(CorpusError::InvalidConversion(format!(
            "table line {line}: expected a single character, got {field:?}"
        ))),
    }
}
