#![allow(dead_code)]

use oxide_filter::{Compiler, DialectRegistry, Filter, FilterError};

pub fn compiler() -> Compiler {
    let mut registry = DialectRegistry::with_defaults();
    oxide_filter_mysql::register(&mut registry);
    Compiler::for_driver("MySQL", &registry)
        .unwrap_or_else(|e| panic!("MySQL dialect not registered: {e}"))
}

pub fn compile(filter: &Filter) -> String {
    compiler()
        .execute(filter)
        .unwrap_or_else(|e| panic!("Failed to compile {filter:?}\nError: {e}"))
}

pub fn compile_err(filter: &Filter) -> FilterError {
    compiler()
        .execute(filter)
        .expect_err(&format!("Expected compile error for: {filter:?}"))
}
