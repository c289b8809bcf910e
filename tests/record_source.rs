//! Integration tests for the mode-locked record session.

use anyhow::{Context, Result, ensure};
use rowlock::{AccessMode, Cursor, RecordSource, SourceConfig, TextEncoding};
use serde::Deserialize;
use std::io::Write;
use tempfile::NamedTempFile;

const HEADERED: &str = "id,name\n1,a\n2,b\n3,c\n";

#[derive(Debug, Deserialize, PartialEq)]
struct Row {
    id: String,
    name: String,
}

fn fixture(contents: &str) -> Result<NamedTempFile> {
    fixture_bytes(contents.as_bytes())
}

fn fixture_bytes(contents: &[u8]) -> Result<NamedTempFile> {
    let _ = tracing_subscriber::fmt::try_init();
    let mut file = NamedTempFile::new().context("creating fixture")?;
    file.write_all(contents).context("writing fixture")?;
    file.flush().context("flushing fixture")?;
    Ok(file)
}

#[test]
fn open_then_close_leaves_disabled_cursor() -> Result<()> {
    let file = fixture(HEADERED)?;
    let mut source = RecordSource::with_path(file.path());

    ensure!(source.open(), "open should succeed");
    ensure!(source.advance_raw(), "first advance should succeed");
    ensure!(source.cursor() == Cursor::Available(1));

    source.close(false);
    ensure!(source.cursor() == Cursor::Disabled);
    ensure!(!source.has_read(), "close must clear the consumed flags");
    ensure!(!source.is_open());
    Ok(())
}

#[test]
fn header_never_appears_in_either_drain() -> Result<()> {
    let file = fixture(HEADERED)?;

    let mut source = RecordSource::with_path(file.path());
    let raw: Vec<Vec<String>> = source.all_raw().collect();
    ensure!(
        raw == vec![vec!["1", "a"], vec!["2", "b"], vec!["3", "c"]],
        "raw drain must exclude the header, got {raw:?}"
    );
    ensure!(source.cursor() == Cursor::Available(3), "cursor counts only data rows");

    let mut source = RecordSource::with_path(file.path());
    let typed: Vec<Row> = source.all_typed().collect();
    ensure!(typed.len() == 3);
    ensure!(typed.iter().all(|row| row.id != "id"), "header must not bind as data");
    Ok(())
}

#[test]
fn empty_file_is_immediate_eof_in_both_modes() -> Result<()> {
    let file = fixture("")?;

    for has_header in [true, false] {
        let mut source = RecordSource::with_path(file.path());
        source.config_mut().context("closed session")?.has_header = has_header;

        ensure!(source.open(), "empty files still open");
        ensure!(!source.advance_raw(), "raw advance on empty file");
        ensure!(source.cursor() == Cursor::Disabled, "cursor stays disabled");

        ensure!(source.open(), "reopen for the typed probe");
        ensure!(!source.advance_typed(), "typed advance on empty file");
        ensure!(source.cursor() == Cursor::Disabled);
    }
    Ok(())
}

#[test]
fn raw_lock_blocks_typed_until_reopen() -> Result<()> {
    let file = fixture(HEADERED)?;
    let mut source = RecordSource::with_path(file.path());

    ensure!(source.open());
    ensure!(source.advance_raw());
    ensure!(source.mode() == AccessMode::RawFields);

    ensure!(!source.advance_typed(), "typed advance must fail while raw-locked");
    ensure!(source.current_typed::<Row>().is_none());
    ensure!(source.cursor() == Cursor::Available(1), "failed advance leaves the cursor");

    source.close(false);
    ensure!(source.open(), "reopen");
    ensure!(source.advance_typed(), "reopen renegotiates the mode");
    ensure!(source.mode() == AccessMode::TypedRecord);
    Ok(())
}

#[test]
fn typed_lock_blocks_raw_until_reopen() -> Result<()> {
    let file = fixture(HEADERED)?;
    let mut source = RecordSource::with_path(file.path());

    ensure!(source.open());
    let first: Row = source.current_typed().context("first typed record")?;
    ensure!(first == Row { id: "1".into(), name: "a".into() });

    ensure!(!source.advance_raw(), "raw advance must fail while typed-locked");
    ensure!(source.current_raw().is_empty(), "raw accessor degrades to empty");

    source.close(false);
    ensure!(source.open());
    ensure!(source.advance_raw(), "reopen renegotiates the mode");
    Ok(())
}

#[test]
fn current_raw_reads_ahead_once_and_is_stable() -> Result<()> {
    let file = fixture(HEADERED)?;
    let mut source = RecordSource::with_path(file.path());

    ensure!(source.open());
    let first = source.current_raw();
    ensure!(first == vec!["1", "a"], "implicit advance yields the first data record");
    ensure!(source.cursor() == Cursor::Available(1));

    let again = source.current_raw();
    ensure!(again == first, "repeated access without advance returns the same record");
    ensure!(source.cursor() == Cursor::Available(1), "no hidden extra advance");

    ensure!(source.advance_raw());
    ensure!(source.current_raw() == vec!["2", "b"]);
    Ok(())
}

#[test]
fn current_typed_reads_ahead_once() -> Result<()> {
    let file = fixture(HEADERED)?;
    let mut source = RecordSource::with_path(file.path());

    ensure!(source.open());
    let row: Row = source.current_typed().context("implicit typed advance")?;
    ensure!(row == Row { id: "1".into(), name: "a".into() });
    ensure!(source.cursor() == Cursor::Available(1));

    let same: Row = source.current_typed().context("stable repeated access")?;
    ensure!(same == row);
    Ok(())
}

#[test]
fn round_trip_all_raw_and_count() -> Result<()> {
    let file = fixture(HEADERED)?;

    let mut source = RecordSource::with_path(file.path());
    let rows: Vec<Vec<String>> = source.all_raw().collect();
    ensure!(rows == vec![vec!["1", "a"], vec!["2", "b"], vec!["3", "c"]]);

    let mut fresh = RecordSource::with_path(file.path());
    ensure!(fresh.total_record_count() == 3);
    Ok(())
}

#[test]
fn all_typed_binds_in_file_order() -> Result<()> {
    let file = fixture(HEADERED)?;
    let mut source = RecordSource::with_path(file.path());

    let rows: Vec<Row> = source.all_typed().collect();
    ensure!(
        rows == vec![
            Row { id: "1".into(), name: "a".into() },
            Row { id: "2".into(), name: "b".into() },
            Row { id: "3".into(), name: "c".into() },
        ]
    );
    Ok(())
}

#[test]
fn named_binding_survives_reordered_columns() -> Result<()> {
    let file = fixture("name,id\na,1\nb,2\n")?;
    let mut source = RecordSource::with_path(file.path());

    let rows: Vec<Row> = source.all_typed().collect();
    ensure!(
        rows == vec![
            Row { id: "1".into(), name: "a".into() },
            Row { id: "2".into(), name: "b".into() },
        ],
        "header-bound typed reads map by column name"
    );
    Ok(())
}

#[test]
fn headerless_typed_binding_is_positional() -> Result<()> {
    let file = fixture("1,a\n2,b\n")?;
    let mut source = RecordSource::with_path(file.path());
    source.config_mut().context("closed session")?.has_header = false;

    let rows: Vec<Row> = source.all_typed().collect();
    ensure!(
        rows == vec![
            Row { id: "1".into(), name: "a".into() },
            Row { id: "2".into(), name: "b".into() },
        ]
    );
    Ok(())
}

#[test]
fn total_record_count_missing_target_is_disabled() {
    let _ = tracing_subscriber::fmt::try_init();
    let mut source = RecordSource::with_path("/definitely/not/here.csv");
    assert_eq!(source.total_record_count(), -1);
    assert_eq!(source.cursor().as_i64(), -1);
}

#[test]
fn total_record_count_leaves_config_usable() -> Result<()> {
    let file = fixture(HEADERED)?;
    let mut source = RecordSource::with_path(file.path());

    ensure!(source.total_record_count() == 3);
    ensure!(!source.is_open(), "count closes its private session");

    // The same session object still works afterwards
    ensure!(source.open());
    ensure!(source.current_raw() == vec!["1", "a"]);
    Ok(())
}

#[test]
fn all_raw_restarts_from_the_top() -> Result<()> {
    let file = fixture(HEADERED)?;
    let mut source = RecordSource::with_path(file.path());

    ensure!(source.open());
    ensure!(source.advance_raw());
    ensure!(source.advance_raw());

    // Private open inside the drain rewinds past the partial consumption
    let rows: Vec<Vec<String>> = source.all_raw().collect();
    ensure!(rows.len() == 3);
    ensure!(rows[0] == vec!["1", "a"]);
    Ok(())
}

#[test]
fn all_raw_on_missing_target_yields_nothing() {
    let _ = tracing_subscriber::fmt::try_init();
    let mut source = RecordSource::with_path("/definitely/not/here.csv");
    assert_eq!(source.all_raw().count(), 0);
}

#[test]
fn exists_is_a_pure_predicate() -> Result<()> {
    let file = fixture(HEADERED)?;
    let source = RecordSource::with_path(file.path());
    ensure!(source.exists(), "fixture on disk");
    ensure!(!source.is_open(), "exists never opens");

    ensure!(!RecordSource::with_path("/definitely/not/here.csv").exists());
    ensure!(!RecordSource::new(SourceConfig::default()).exists(), "empty path never exists");
    Ok(())
}

#[test]
fn open_path_constructor() -> Result<()> {
    let file = fixture(HEADERED)?;
    let mut source = RecordSource::open_path(file.path()).context("eager open")?;
    ensure!(source.is_open());
    ensure!(source.current_raw() == vec!["1", "a"]);

    ensure!(RecordSource::open_path("/definitely/not/here.csv").is_none());
    Ok(())
}

#[test]
fn windows_1252_source_decodes_fields() -> Result<()> {
    // "caf\xE9" is "café" in windows-1252
    let file = fixture_bytes(b"id,name\n1,caf\xE9\n")?;
    let mut source = RecordSource::with_path(file.path());
    source.config_mut().context("closed session")?.encoding =
        TextEncoding::for_label("windows-1252").context("known label")?;

    let rows: Vec<Vec<String>> = source.all_raw().collect();
    ensure!(rows == vec![vec!["1", "café"]]);
    Ok(())
}

#[test]
fn semicolon_delimiter_round_trip() -> Result<()> {
    let file = fixture("id;name\n1;a\n2;b\n")?;
    let mut source = RecordSource::with_path(file.path());
    source.config_mut().context("closed session")?.delimiter = ";".to_string();

    ensure!(source.total_record_count() == 2);
    let rows: Vec<Vec<String>> = source.all_raw().collect();
    ensure!(rows == vec![vec!["1", "a"], vec!["2", "b"]]);
    Ok(())
}

#[test]
fn full_release_clears_the_mode_field() -> Result<()> {
    let file = fixture(HEADERED)?;
    let mut source = RecordSource::with_path(file.path());

    ensure!(source.open());
    ensure!(source.advance_raw());
    ensure!(source.mode() == AccessMode::RawFields);

    source.close(false);
    ensure!(source.mode() == AccessMode::RawFields, "plain close keeps the lock field");

    source.close(true);
    ensure!(source.mode() == AccessMode::Unset, "full release resets the lock field");
    Ok(())
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    fn simple_field() -> impl Strategy<Value = String> {
        "[a-z0-9]{1,8}"
    }

    fn table() -> impl Strategy<Value = Vec<Vec<String>>> {
        (1usize..4).prop_flat_map(|width| {
            prop::collection::vec(prop::collection::vec(simple_field(), width), 0..12)
        })
    }

    fn render(rows: &[Vec<String>]) -> String {
        let mut text = String::new();
        for row in rows {
            text.push_str(&row.join(","));
            text.push('\n');
        }
        text
    }

    proptest! {
        #[test]
        fn all_raw_reproduces_every_row(rows in table()) {
            let file = fixture(&render(&rows)).expect("fixture");
            let mut source = RecordSource::with_path(file.path());
            source.config_mut().expect("closed session").has_header = false;

            let drained: Vec<Vec<String>> = source.all_raw().collect();
            prop_assert_eq!(&drained, &rows);
        }

        #[test]
        fn count_matches_row_total(rows in table()) {
            let file = fixture(&render(&rows)).expect("fixture");
            let mut source = RecordSource::with_path(file.path());
            source.config_mut().expect("closed session").has_header = false;

            prop_assert_eq!(source.total_record_count(), rows.len() as i64);
        }

        #[test]
        fn headered_count_excludes_the_header(rows in table()) {
            // Synthesize a header as wide as the data rows
            let width = rows.first().map_or(1, Vec::len);
            let header: Vec<String> = (0..width).map(|i| format!("c{i}")).collect();
            let mut all = vec![header];
            all.extend(rows.iter().cloned());

            let file = fixture(&render(&all)).expect("fixture");
            let mut source = RecordSource::with_path(file.path());
            prop_assert_eq!(source.total_record_count(), rows.len() as i64);
        }
    }
}
