use assert_cmd::cargo::cargo_bin_cmd;
use rusqlite::Connection;
use serde_json::Value;
use tempfile::tempdir;

fn write_fixture_db(path: &std::path::Path) {
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
         (1, 1, 0, 'בְּרֵאשִׁית בָּרָא אֱלֹהִים', 'בראשית א א'), \
         (2, 1, 1, '   ', 'בראשית א ב'), \
         (3, 1, 2, NULL, 'בראשית א ג')",
        [],
    )
    .unwrap();
}

#[test]
fn cli_index_builds_a_readable_index_and_prints_a_summary() {
    let tmp = tempdir().expect("tempdir");
    let db_path = tmp.path().join("source.sqlite");
    write_fixture_db(&db_path);
    let output_path = tmp.path().join("index");

    let mut cmd = cargo_bin_cmd!("otzar-search");
    cmd.args([
        "index",
        "--db-path",
        db_path.to_str().unwrap(),
        "--output-path",
        output_path.to_str().unwrap(),
    ]);

    let assert = cmd.assert().success();
    let summary: Value =
        serde_json::from_slice(&assert.get_output().stdout).expect("valid json output");

    assert_eq!(summary["documents_indexed"], 1);
    assert!(output_path.join("meta.json").exists());
}

#[test]
fn cli_index_reports_an_error_for_a_missing_database() {
    let tmp = tempdir().expect("tempdir");
    let db_path = tmp.path().join("missing.sqlite");
    let output_path = tmp.path().join("index");

    let mut cmd = cargo_bin_cmd!("otzar-search");
    cmd.args([
        "index",
        "--db-path",
        db_path.to_str().unwrap(),
        "--output-path",
        output_path.to_str().unwrap(),
    ]);

    cmd.assert().failure();
}
