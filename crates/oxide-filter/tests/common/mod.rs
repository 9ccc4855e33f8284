#![allow(dead_code)]

use oxide_filter::{Compiler, Filter, FilterError, SqlValue};

pub fn compile(filter: &Filter) -> String {
    Compiler::generic()
        .execute(filter)
        .unwrap_or_else(|e| panic!("Failed to compile {filter:?}\nError: {e}"))
}

pub fn compile_err(filter: &Filter) -> FilterError {
    Compiler::generic()
        .execute(filter)
        .expect_err(&format!("Expected compile error for: {filter:?}"))
}

/// Returns the clause starting at `keyword`, e.g. `WHERE ...`.
pub fn clause<'a>(sql: &'a str, keyword: &str) -> &'a str {
    let start = sql
        .find(keyword)
        .unwrap_or_else(|| panic!("Expected {keyword} in: {sql}"));
    &sql[start..]
}

pub fn int(n: i64) -> SqlValue {
    SqlValue::Int(n)
}

pub fn text(s: &str) -> SqlValue {
    SqlValue::Text(String::from(s))
}

/// Compiles twice and checks the output is byte-identical.
pub fn deterministic(filter: &Filter) -> String {
    let first = compile(filter);
    let second = compile(filter);
    assert_eq!(first, second, "Compilation is not deterministic");
    first
}
