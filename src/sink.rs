//! Terminal outputs of a run: JSON file dumps and the console report.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::Context;
use serde::Serialize;

use crate::api::density::DensityScoreMap;
use crate::api::grids::AreaIdentifier;
use crate::HeatmapsError;

const INDENT: &[u8] = b"    ";

fn to_writer_indented<W: Write, T: Serialize + ?Sized>(
    writer: W,
    value: &T,
) -> Result<(), serde_json::Error> {
    let formatter = serde_json::ser::PrettyFormatter::with_indent(INDENT);
    let mut ser = serde_json::Serializer::with_formatter(writer, formatter);
    value.serialize(&mut ser)
}

/// Writes `value` as UTF-8 JSON indented by 4 spaces, replacing any file at
/// `path`. Non-ASCII characters are written as-is. The parent directory
/// must already exist.
pub fn dump_json<T: Serialize + ?Sized>(value: &T, path: &Path) -> anyhow::Result<()> {
    let file = File::create(path)
        .map_err(HeatmapsError::Io)
        .with_context(|| format!("creating {}", path.display()))?;

    let mut writer = BufWriter::new(file);
    to_writer_indented(&mut writer, value).map_err(HeatmapsError::Json)?;
    writer
        .flush()
        .map_err(HeatmapsError::Io)
        .with_context(|| format!("writing {}", path.display()))?;

    Ok(())
}

/// Prints the hourly totals under a one-line label naming the area.
pub fn report<W: Write>(
    mut out: W,
    area: &AreaIdentifier,
    scores: &DensityScoreMap,
) -> anyhow::Result<()> {
    writeln!(
        out,
        "The average hourly density for {} {}",
        area.kind.label(),
        area.id
    )?;
    to_writer_indented(&mut out, scores)?;
    writeln!(out)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::{json, Number, Value};

    use crate::api::density::TileScore;

    #[test]
    fn dump_keeps_non_ascii_and_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chansy_grid.json");
        let value = json!({"name": "Chêne-Bourg", "tiles": [{"tileId": 1}]});

        dump_json(&value, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("Chêne-Bourg"));
        assert!(text.contains("\n    \"name\""));
        let back: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn dump_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grid.json");
        std::fs::write(&path, "x".repeat(4096)).unwrap();

        dump_json(&json!([1, 2]), &path).unwrap();
        let back: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back, json!([1, 2]));
    }

    #[test]
    fn dump_into_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("swisscom").join("grid.json");

        let err = dump_json(&json!({}), &path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<HeatmapsError>(),
            Some(HeatmapsError::Io(_))
        ));
        assert!(!path.exists());
    }

    #[test]
    fn report_layout() {
        let mut scores = DensityScoreMap::new();
        let hour = NaiveDate::from_ymd_opt(2020, 1, 27)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        scores
            .record(
                &hour,
                &[TileScore {
                    tile_id: Some(1),
                    score: Number::from(2i64),
                }],
            )
            .unwrap();

        let mut out = Vec::new();
        report(&mut out, &AreaIdentifier::municipality(351), &scores).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(
            text,
            "The average hourly density for municipality 351\n{\n    \"2020-01-27T00:00:00\": 2\n}\n"
        );
    }
}
