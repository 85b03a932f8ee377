//! Schema inference and row reading over a SoR text file.

use std::path::Path;

use strata_core::ColumnKind;

use crate::error::SorError;
use crate::infer::{default_value, infer_token_kind, produce_value};
use crate::tokenizer::parse_tokens;
use crate::value::SorValue;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SorSchema(Vec<ColumnKind>);

impl SorSchema {
    pub fn kinds(&self) -> &[ColumnKind] {
        &self.0
    }

    pub fn width(&self) -> usize {
        self.0.len()
    }
}

const SCAN_LIMIT: usize = 500;

/// Scans up to the first 500 lines (or the whole input, whichever is
/// smaller), widening each column's inferred kind across lines via
/// `Ord::max`. A line that fails to tokenize (per `parse_tokens`)
/// contributes no columns.
pub fn infer_schema_from_lines<'a>(lines: impl Iterator<Item = &'a str>) -> Result<SorSchema, SorError> {
    let mut kinds: Vec<ColumnKind> = Vec::new();

    for line in lines.take(SCAN_LIMIT) {
        let tokens = parse_tokens(line, kinds.len());
        for (i, token) in tokens.iter().enumerate() {
            let kind = infer_token_kind(token);
            if i < kinds.len() {
                kinds[i] = kinds[i].max(kind);
            } else {
                kinds.push(kind);
            }
        }
    }

    if kinds.is_empty() {
        return Err(SorError::MalformedSchema);
    }
    Ok(SorSchema(kinds))
}

/// Reads every line against an already-inferred schema. A line with no
/// tokens (malformed, or blank) is skipped entirely; a token that doesn't
/// actually fit its column's widened kind leaves that cell at its default.
pub fn read_rows_from_lines<'a>(
    lines: impl Iterator<Item = &'a str>,
    schema: &SorSchema,
) -> Vec<Vec<SorValue>> {
    let mut rows = Vec::new();

    for line in lines {
        let tokens = parse_tokens(line, schema.width());
        if tokens.is_empty() {
            continue;
        }

        let mut row = Vec::with_capacity(schema.width());
        for (i, kind) in schema.kinds().iter().enumerate() {
            let value = if i < tokens.len() { produce_value(*kind, &tokens[i]) } else { None };
            row.push(value.unwrap_or_else(|| default_value(*kind)));
        }
        rows.push(row);
    }

    rows
}

pub fn infer_schema(path: &Path) -> Result<SorSchema, SorError> {
    let text =
        std::fs::read_to_string(path).map_err(|e| SorError::Read { path: path.to_path_buf(), source: e })?;
    infer_schema_from_lines(text.lines())
}

pub fn read_rows(path: &Path, schema: &SorSchema) -> Result<Vec<Vec<SorValue>>, SorError> {
    let text =
        std::fs::read_to_string(path).map_err(|e| SorError::Read { path: path.to_path_buf(), source: e })?;
    Ok(read_rows_from_lines(text.lines(), schema))
}
