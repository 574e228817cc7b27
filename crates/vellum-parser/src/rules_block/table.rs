//! Pipe tables (header row, delimiter row, body rows)

use crate::block::{BlockRule, BlockState};
use crate::token::Token;
use once_cell::sync::Lazy;
use regex::Regex;

static DELIMITER_ROW: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\|?\s*:?-+:?\s*(\|\s*:?-+:?\s*)*\|?$").unwrap());

pub struct TableRule;

/// Split a table row into trimmed cell strings, dropping the outer empty
/// fields produced by leading/trailing pipes.
fn split_row(line: &str) -> Vec<String> {
    let mut inner = line.trim();
    inner = inner.strip_prefix('|').unwrap_or(inner);
    inner = inner.strip_suffix('|').unwrap_or(inner);
    inner.split('|').map(|c| c.trim().to_string()).collect()
}

impl BlockRule for TableRule {
    fn run(&self, state: &mut BlockState, silent: bool) -> bool {
        let first = state.line;
        if state.indent(first) >= 4 || first + 1 >= state.line_count() {
            return false;
        }
        let header = state.line_trim(first);
        if !header.contains('|') {
            return false;
        }
        let delim = state.line_trim(first + 1);
        if !delim.contains('-') || !DELIMITER_ROW.is_match(delim) {
            return false;
        }
        let header_cells = split_row(header);
        let delim_cells = split_row(delim);
        if header_cells.len() != delim_cells.len() {
            return false;
        }
        if silent {
            return true;
        }

        let columns = header_cells.len();
        let mut last = first + 1;
        let mut body: Vec<Vec<String>> = Vec::new();
        let mut line = first + 2;
        while line < state.line_count() && !state.is_blank(line) && state.line_trim(line).contains('|')
        {
            let mut cells = split_row(state.line_trim(line));
            cells.resize(columns, String::new());
            cells.truncate(columns);
            body.push(cells);
            last = line;
            line += 1;
        }

        let span = state.span_lines(first, last);
        state.push(Token::open("table", span));
        emit_row(state, &header_cells, true);
        for row in &body {
            emit_row(state, row, false);
        }
        state.push(Token::close("table", span));
        state.line = last + 1;
        true
    }
}

fn emit_row(state: &mut BlockState, cells: &[String], header: bool) {
    let span = state.line_span(state.line.min(state.line_count() - 1));
    state.push(Token::open("table_row", span));
    for cell in cells {
        state.push(Token::open("table_cell", span).with_attr("header", header.to_string()));
        state.push(Token::standalone("inline", span).with_content(cell.clone()));
        state.push(Token::close("table_cell", span));
    }
    state.push(Token::close("table_row", span));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockRules;
    use crate::ruler::RuleChain;
    use std::sync::Arc;

    fn rules() -> BlockRules {
        Arc::new(RuleChain::build(Vec::new()).unwrap())
    }

    #[test]
    fn test_simple_table() {
        let src = "| a | b |\n| --- | --- |\n| 1 | 2 |";
        let mut state = BlockState::new(src, rules());
        assert!(TableRule.run(&mut state, false));
        let cells = state
            .tokens
            .iter()
            .filter(|t| t.kind == "inline")
            .map(|t| t.content.as_str())
            .collect::<Vec<_>>();
        assert_eq!(cells, vec!["a", "b", "1", "2"]);
        let header_cells = state
            .tokens
            .iter()
            .filter(|t| t.kind == "table_cell" && t.attr("header") == Some("true"))
            .count();
        assert_eq!(header_cells, 2);
    }

    #[test]
    fn test_missing_delimiter_declines() {
        let mut state = BlockState::new("| a | b |\n| 1 | 2 |", rules());
        assert!(!TableRule.run(&mut state, false));
    }

    #[test]
    fn test_column_count_mismatch_declines() {
        let mut state = BlockState::new("| a | b |\n| --- |", rules());
        assert!(!TableRule.run(&mut state, false));
    }
}
