//! # Chunk Resolution
//!
//! Picks the `(config, schema)` pair to validate next out of a parent
//! configuration and a parent schema.
//!
//! A missing schema entry is a schema defect and always fatal. A missing
//! configuration entry is never a failure: the chunk is vacuously valid,
//! optionally with a warning. JSON `null` under a key counts as missing on
//! both sides. The empty key selects the parent itself, which is always
//! checked when given, `null` included.

use serde_json::Value;

use crate::error::ViolationReport;

/// The outcome of resolving one key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Chunk<'a> {
    /// Both sides present; validate `config` against `schema`.
    Present {
        /// Configuration sub-value.
        config: &'a Value,
        /// Schema sub-value.
        schema: &'a Value,
    },
    /// The configuration has nothing under this key.
    Absent,
}

/// `"{prefix} {key}"`, trimmed.
pub fn descriptive_title(prefix: &str, key: &str) -> String {
    format!("{prefix} {key}").trim().to_string()
}

/// Resolve `key` in `config` and `schema`.
///
/// An empty `key` selects the parents themselves. `config` may be `None`
/// when the parent itself was absent.
///
/// # Errors
///
/// Returns a schema-defect [`ViolationReport`] when the schema has no
/// entry for `key`, whatever `warn` says.
pub fn resolve<'a>(
    config: Option<&'a Value>,
    schema: &'a Value,
    key: &str,
    title: &str,
    warn: bool,
) -> Result<Chunk<'a>, ViolationReport> {
    let (config_chunk, schema_chunk) = if key.is_empty() {
        (config, Some(schema))
    } else {
        (config.and_then(|c| c.get(key)), schema.get(key))
    };

    let Some(schema_chunk) = schema_chunk.filter(|s| !s.is_null()) else {
        return Err(ViolationReport::schema_defect(title, key, config, schema));
    };

    let config_chunk = if key.is_empty() {
        config_chunk
    } else {
        config_chunk.filter(|c| !c.is_null())
    };

    match config_chunk {
        Some(config_chunk) => Ok(Chunk::Present {
            config: config_chunk,
            schema: schema_chunk,
        }),
        None => {
            if warn {
                tracing::warn!("could not identify {title} ({key})");
            }
            Ok(Chunk::Absent)
        }
    }
}

/// Look up a schema fragment the driver needs unconditionally.
///
/// # Errors
///
/// Schema defect when `key` is missing from `schema`.
pub fn schema_fragment<'a>(
    schema: &'a Value,
    key: &str,
    title: &str,
) -> Result<&'a Value, ViolationReport> {
    schema
        .get(key)
        .filter(|s| !s.is_null())
        .ok_or_else(|| ViolationReport::schema_defect(title, key, None, schema))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReportKind;
    use serde_json::json;
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_empty_key_is_identity() {
        let config = json!({"a": 1});
        let schema = json!({"type": "object"});
        let chunk = resolve(Some(&config), &schema, "", "whole", false).unwrap();
        assert_eq!(
            chunk,
            Chunk::Present {
                config: &config,
                schema: &schema
            }
        );
    }

    #[test]
    fn test_key_selects_both_sides() {
        let config = json!({"points": 4, "title": "x"});
        let schema = json!({"points": {"type": "integer"}});
        let chunk = resolve(Some(&config), &schema, "points", "testcase_1 points", false).unwrap();
        match chunk {
            Chunk::Present { config, schema } => {
                assert_eq!(config, &json!(4));
                assert_eq!(schema, &json!({"type": "integer"}));
            }
            Chunk::Absent => panic!("Expected a present chunk"),
        }
    }

    #[test]
    fn test_missing_schema_entry_is_defect() {
        let config = json!({"points": 4});
        let schema = json!({});
        let err = resolve(Some(&config), &schema, "points", "testcase_1 points", false).unwrap_err();
        assert_eq!(err.kind, ReportKind::SchemaDefect);
        assert_eq!(err.title, "testcase_1 points");
    }

    #[test]
    fn test_schema_defect_wins_over_absent_config() {
        // The schema side is checked first, so a missing config chunk does
        // not hide a missing schema entry.
        let schema = json!({});
        for warn in [false, true] {
            let err = resolve(None, &schema, "hidden", "testcase_1 hidden", warn).unwrap_err();
            assert!(err.is_schema_defect());
        }
    }

    #[test]
    fn test_absent_config_is_vacuously_valid() {
        let config = json!({});
        let schema = json!({"hidden": {"type": "boolean"}});
        for warn in [false, true] {
            let chunk = resolve(Some(&config), &schema, "hidden", "testcase_1 hidden", warn).unwrap();
            assert_eq!(chunk, Chunk::Absent);
        }
    }

    #[test]
    fn test_null_config_counts_as_absent() {
        let config = json!({"hidden": null});
        let schema = json!({"hidden": {"type": "boolean"}});
        let chunk = resolve(Some(&config), &schema, "hidden", "t hidden", false).unwrap();
        assert_eq!(chunk, Chunk::Absent);
    }

    #[test]
    fn test_null_whole_value_is_still_checked() {
        let config = Value::Null;
        let schema = json!({"type": "object"});
        let chunk = resolve(Some(&config), &schema, "", "Your config json", false).unwrap();
        assert_eq!(
            chunk,
            Chunk::Present {
                config: &config,
                schema: &schema
            }
        );
    }

    #[test]
    fn test_warning_names_title_and_key() {
        let config = json!({});
        let schema = json!({"hidden": {"type": "boolean"}});

        let logs = capture_warnings(|| {
            resolve(Some(&config), &schema, "hidden", "testcase_1 hidden", true).unwrap();
        });
        assert!(
            logs.contains("could not identify testcase_1 hidden (hidden)"),
            "got: {logs}"
        );
        assert!(!logs.contains("WARNING"), "got: {logs}");

        let logs = capture_warnings(|| {
            resolve(Some(&config), &schema, "hidden", "testcase_1 hidden", false).unwrap();
        });
        assert!(logs.is_empty(), "got: {logs}");
    }

    #[test]
    fn test_present_chunk_never_warns() {
        let config = json!({"hidden": true});
        let schema = json!({"hidden": {"type": "boolean"}});
        let logs = capture_warnings(|| {
            resolve(Some(&config), &schema, "hidden", "testcase_1 hidden", true).unwrap();
        });
        assert!(logs.is_empty(), "got: {logs}");
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn capture_warnings(f: impl FnOnce()) -> String {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::WARN)
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        let bytes = captured.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_absent_parent_yields_absent_chunk() {
        let schema = json!({"hidden": {"type": "boolean"}});
        let chunk = resolve(None, &schema, "hidden", "t hidden", false).unwrap();
        assert_eq!(chunk, Chunk::Absent);
    }

    #[test]
    fn test_non_object_parent_yields_absent_chunk() {
        let config = json!([1, 2, 3]);
        let schema = json!({"hidden": {"type": "boolean"}});
        let chunk = resolve(Some(&config), &schema, "hidden", "t hidden", false).unwrap();
        assert_eq!(chunk, Chunk::Absent);
    }

    #[test]
    fn test_descriptive_title_trims() {
        assert_eq!(descriptive_title("global", "autograding"), "global autograding");
        assert_eq!(descriptive_title("testcase_3", ""), "testcase_3");
        assert_eq!(descriptive_title("", "points"), "points");
    }

    #[test]
    fn test_schema_fragment_lookup() {
        let schema = json!({"definitions": {"container": {"type": "object"}}});
        let defs = schema_fragment(&schema, "definitions", "definitions").unwrap();
        assert!(schema_fragment(defs, "container", "container").is_ok());
        let err = schema_fragment(defs, "filecheck", "filecheck").unwrap_err();
        assert!(err.is_schema_defect());
        assert!(err.summary.contains("filecheck"));
    }
}
