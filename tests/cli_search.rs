use assert_cmd::cargo::cargo_bin_cmd;
use rusqlite::Connection;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn write_fixture_db(path: &Path) {
    let conn = Connection::open(path).expect("open sqlite");
    conn.execute_batch(
        "CREATE TABLE book (id INTEGER, title TEXT, categoryId INTEGER);
         CREATE TABLE category (id INTEGER, title TEXT, parentId INTEGER);
         CREATE TABLE line (id INTEGER, bookId INTEGER, lineIndex INTEGER, content TEXT, heRef TEXT);",
    )
    .expect("create schema");

    conn.execute(
        "INSERT INTO category (id, title, parentId) VALUES (1, 'תנ״ך', NULL), (2, 'תורה', 1)",
        [],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO book (id, title, categoryId) VALUES (1, 'בראשית', 2)",
        [],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO line (id, bookId, lineIndex, content, heRef) VALUES \
         (1, 1, 0, 'בְּרֵאשִׁית בָּרָא אֱלֹהִים אֵת הַשָּׁמַיִם', 'בראשית א א'), \
         (2, 1, 1, 'ברכות', 'ברכות א א'), \
         (3, 1, 2, 'ברית', 'ברכות א ב')",
        [],
    )
    .unwrap();
}

fn build_fixture_index() -> (tempfile::TempDir, PathBuf) {
    let tmp = tempdir().expect("tempdir");
    let db_path = tmp.path().join("source.sqlite");
    write_fixture_db(&db_path);
    let index_path = tmp.path().join("index");

    let mut cmd = cargo_bin_cmd!("otzar-search");
    cmd.args([
        "index",
        "--db-path",
        db_path.to_str().unwrap(),
        "--output-path",
        index_path.to_str().unwrap(),
    ]);
    cmd.assert().success();

    (tmp, index_path)
}

#[test]
fn cli_search_finds_an_exact_hebrew_hit() {
    let (_tmp, index_path) = build_fixture_index();

    let mut cmd = cargo_bin_cmd!("otzar-search");
    cmd.args([
        "search",
        "--index-path",
        index_path.to_str().unwrap(),
        "--query",
        "ברא",
    ]);

    let assert = cmd.assert().success();
    let response: Value =
        serde_json::from_slice(&assert.get_output().stdout).expect("valid json output");

    assert_eq!(response["status"], "success");
    assert!(response["total_hits"].as_u64().unwrap() >= 1);
    assert_eq!(response["results"][0]["book_title"], "בראשית");
}

#[test]
fn cli_search_wildcard_prefix_matches_only_prefixed_term() {
    let (_tmp, index_path) = build_fixture_index();

    let mut cmd = cargo_bin_cmd!("otzar-search");
    cmd.args([
        "search",
        "--index-path",
        index_path.to_str().unwrap(),
        "--query",
        "ברכ*",
        "--wildcard-mode",
    ]);

    let assert = cmd.assert().success();
    let response: Value =
        serde_json::from_slice(&assert.get_output().stdout).expect("valid json output");

    assert_eq!(response["total_hits"], 1);
    assert_eq!(response["results"][0]["line_id"], 2);
}

#[test]
fn cli_search_bare_wildcard_is_an_error_response_and_nonzero_exit() {
    let (_tmp, index_path) = build_fixture_index();

    let mut cmd = cargo_bin_cmd!("otzar-search");
    cmd.args([
        "search",
        "--index-path",
        index_path.to_str().unwrap(),
        "--query",
        "*",
        "--wildcard-mode",
    ]);

    let assert = cmd.assert().failure();
    let response: Value =
        serde_json::from_slice(&assert.get_output().stdout).expect("valid json output");

    assert_eq!(response["status"], "error");
    assert!(response["message"].as_str().unwrap().contains('*'));
}

#[test]
fn cli_search_against_a_missing_index_is_an_error_response() {
    let mut cmd = cargo_bin_cmd!("otzar-search");
    cmd.args([
        "search",
        "--index-path",
        "/nonexistent/path/for/test",
        "--query",
        "ברא",
    ]);

    let assert = cmd.assert().failure();
    let response: Value =
        serde_json::from_slice(&assert.get_output().stdout).expect("valid json output");

    assert_eq!(response["status"], "error");
}
