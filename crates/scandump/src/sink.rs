//! CSV file sinks for room rows and hotel counters.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Serializes `rows` into a CSV file at `path`, one header row first.
/// Returns the path actually written.
pub fn save_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<PathBuf> {
    let bytes = csv_bytes(rows)?;
    let mut file = File::create(path)
        .with_context(|| format!("create CSV file '{}' failed", path.display()))?;
    file.write_all(&bytes)
        .with_context(|| format!("write CSV file '{}' failed", path.display()))?;
    Ok(path.to_path_buf())
}

/// Like [`save_csv`], but wraps the CSV in a single-entry deflated zip
/// archive. The archive path gains a `.zip` suffix unless `path` already has
/// one; the entry inside keeps the plain CSV file name.
pub fn save_csv_zipped<T: Serialize>(path: &Path, rows: &[T]) -> Result<PathBuf> {
    let (csv_path, zip_path) = if path.extension().is_some_and(|ext| ext == "zip") {
        (path.with_extension(""), path.to_path_buf())
    } else {
        let mut zipped = path.as_os_str().to_owned();
        zipped.push(".zip");
        (path.to_path_buf(), PathBuf::from(zipped))
    };
    let entry_name = csv_path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| anyhow!("CSV path '{}' has no file name", csv_path.display()))?;

    let bytes = csv_bytes(rows)?;
    let file = File::create(&zip_path)
        .with_context(|| format!("create CSV zip file '{}' failed", zip_path.display()))?;

    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
    zip.start_file(entry_name, options)
        .with_context(|| format!("start zip entry '{entry_name}' failed"))?;
    zip.write_all(&bytes)
        .with_context(|| format!("write zip entry '{entry_name}' failed"))?;
    zip.finish()
        .with_context(|| format!("finish CSV zip file '{}' failed", zip_path.display()))?;

    Ok(zip_path)
}

fn csv_bytes<T: Serialize>(rows: &[T]) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let mut writer = csv::Writer::from_writer(&mut buffer);
    for row in rows {
        writer.serialize(row).context("serialize CSV row failed")?;
    }
    writer.flush().context("flush CSV buffer failed")?;
    drop(writer);
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use chrono::NaiveDate;
    use scandump_core::{HotelCounters, RoomRow};

    use super::*;

    fn sample_rooms() -> Vec<RoomRow> {
        let base = RoomRow {
            hotel_name: "FPBS Kolasin".to_string(),
            hotel_code: "TGDFP".to_string(),
            ci_date: NaiveDate::from_ymd_opt(2019, 1, 18).unwrap(),
            los: 2,
            channel: "Marriott".to_string(),
            room_name: "Standard Room".to_string(),
            product_num: Some(1),
            rate: "100".to_string(),
            currency: "EUR".to_string(),
            description: "No breakfast".to_string(),
            tab_name: "Standard Rates".to_string(),
            snapshot: "https://example.net/snap.png".to_string(),
        };
        let placeholder = RoomRow {
            room_name: String::new(),
            product_num: None,
            rate: String::new(),
            ..base.clone()
        };
        vec![base, placeholder]
    }

    #[test]
    fn writes_rooms_csv_with_headers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rooms.csv");

        let written = save_csv(&path, &sample_rooms()).expect("save failed");
        assert_eq!(written, path);

        let contents = std::fs::read_to_string(&path).unwrap();
        let mut lines = contents.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Hotel name,Hotel Code,CI date,LOS,Channel,Room name,Product #,\
             Rate,Currency,Description,Tab name,Snapshot"
        );
        let first = lines.next().unwrap();
        assert!(first.contains("18/01/2019"));
        assert!(first.contains(",1,100,"));
        // absent product number serializes as an empty field
        let second = lines.next().unwrap();
        assert!(second.contains(",,,EUR,"));
    }

    #[test]
    fn writes_counters_csv_with_headers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hotels_counts.csv");

        let counters = vec![HotelCounters {
            hotel_name: "FPBS Kolasin".to_string(),
            hotel_code: "TGDFP".to_string(),
            ci_date: NaiveDate::from_ymd_opt(2019, 1, 18).unwrap(),
            marriott: 3,
            booking: 0,
            expedia: 1,
            ctrip: 0,
            priceline: 0,
        }];
        save_csv(&path, &counters).expect("save failed");

        let contents = std::fs::read_to_string(&path).unwrap();
        let mut lines = contents.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Hotel name,Hotel Code,CI date,Marriott,Booking,Expedia,Ctrip,Priceline"
        );
        assert_eq!(
            lines.next().unwrap(),
            "FPBS Kolasin,TGDFP,18/01/2019,3,0,1,0,0"
        );
    }

    #[test]
    fn zipped_csv_contains_the_plain_entry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rooms.csv");

        let written = save_csv_zipped(&path, &sample_rooms()).expect("save failed");
        assert_eq!(written, dir.path().join("rooms.csv.zip"));

        let file = File::open(&written).unwrap();
        let mut archive = zip::ZipArchive::new(file).expect("open zip failed");
        let mut entry = archive.by_name("rooms.csv").expect("missing csv entry");
        let mut contents = String::new();
        entry.read_to_string(&mut contents).unwrap();
        assert!(contents.starts_with("Hotel name,"));
    }

    #[test]
    fn zip_suffix_on_input_path_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rooms.csv.zip");

        let written = save_csv_zipped(&path, &sample_rooms()).expect("save failed");
        assert_eq!(written, path);

        let file = File::open(&written).unwrap();
        let mut archive = zip::ZipArchive::new(file).expect("open zip failed");
        assert!(archive.by_name("rooms.csv").is_ok());
    }
}
