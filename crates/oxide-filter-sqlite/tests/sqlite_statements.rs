//! Statements compiled through the SQLite dialect.

use std::sync::Arc;

use oxide_filter::prelude::*;
use oxide_filter_sqlite::SqliteDialect;

fn compiler() -> Compiler {
    Compiler::new(Arc::new(SqliteDialect::new()))
}

#[test]
fn select_with_pagination() {
    let filter = Filter::select("users")
        .where_clause("a", 1)
        .where_clause("b", 2)
        .limit_offset(10, 20);
    assert_eq!(
        compiler().execute(&filter).unwrap(),
        r#"SELECT * FROM "users" WHERE "a" = ? AND "b" = ? LIMIT 10 OFFSET 20"#
    );
}

#[test]
fn full_text_match_override() {
    let filter = Filter::select("docs").match_against(
        &["docs"],
        WhereValue::list(["sqlite", "fts5"]),
        Some("IN BOOLEAN MODE"),
        Connector::And,
    );
    assert_eq!(
        compiler().execute(&filter).unwrap(),
        r#"SELECT * FROM "docs" WHERE "docs" MATCH ?"#
    );
    assert_eq!(
        filter.values(),
        &[SqlValue::Text(String::from("sqlite fts5"))]
    );
}

#[test]
fn missing_functions_fail() {
    for operator in [Operator::Strcmp, Operator::FindInSet] {
        let filter = Filter::select("t").where_op("a", operator, "x");
        assert_eq!(
            compiler().execute(&filter).unwrap_err(),
            FilterError::UnsupportedWhereOperator {
                operator,
                dialect: String::from("sqlite"),
            }
        );
    }
}

#[test]
fn straight_join_fails() {
    let filter = Filter::select("a")
        .join("b", "a.id", Operator::Equal, Some("b.a_id"), JoinKind::Straight)
        .unwrap();
    assert_eq!(
        compiler().execute(&filter).unwrap_err(),
        FilterError::UnsupportedJoin {
            kind: String::from("STRAIGHT_JOIN"),
            dialect: String::from("sqlite"),
        }
    );
}

#[test]
fn insert_update_delete() {
    let insert = Filter::insert("users").set("name", "bob").set("age", 30);
    assert_eq!(
        compiler().execute(&insert).unwrap(),
        r#"INSERT INTO "users" ("name", "age") VALUES (:name, :age)"#
    );

    let update = Filter::update("users").set("age", 31).key("id", 7).unwrap();
    assert_eq!(
        compiler().execute(&update).unwrap(),
        r#"UPDATE "users" SET "age" = :age WHERE "id" = :id"#
    );

    let delete = Filter::delete("users").key_in("id", [7, 8]).unwrap();
    assert_eq!(
        compiler().execute(&delete).unwrap(),
        r#"DELETE FROM "users" WHERE "id" IN(:id0, :id1)"#
    );
}

#[test]
fn table_helpers() {
    let compiler = compiler();
    assert_eq!(compiler.truncate("logs"), r#"DELETE FROM "logs""#);
    assert_eq!(
        compiler.show("logs"),
        "SELECT * FROM sqlite_master WHERE type = 'table' AND name = 'logs'"
    );
    assert_eq!(compiler.size("logs"), r#"SELECT COUNT(*) AS count FROM "logs""#);
}

#[test]
fn registered_by_name() {
    let mut registry = DialectRegistry::with_defaults();
    oxide_filter_sqlite::register(&mut registry);
    assert!(registry.contains("SQLite"));
    assert_eq!(registry.get("sqlite").unwrap().name(), "sqlite");
}
