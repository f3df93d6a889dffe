use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use scandump_core::{normalize, sort_rooms, ChannelAggregator, RoomRow};

mod config;
mod ftp;
mod sink;
mod source;

use config::Config;
use source::ScanDataReader;

/// Dumps hotel scan results from the scan-data store: one CSV of flat room
/// rows per scan, plus one CSV of per-hotel channel counters, optionally
/// uploaded to an FTP drop.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Project TOML configuration file
    #[arg(short, long)]
    config: PathBuf,

    /// Scan id to process (repeatable)
    #[arg(short = 's', long = "sid", required = true)]
    scan_ids: Vec<u32>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;
    run(&config, &cli.scan_ids).await
}

async fn run(config: &Config, scan_ids: &[u32]) -> Result<()> {
    let started = Local::now().format("%Y_%m_%d-%H_%M_%S").to_string();
    let tmp_folder = PathBuf::from(&config.tmp_folder);

    let reader = ScanDataReader::connect(&config.database_url()?, config.database.page_size).await?;
    let mut aggregator = ChannelAggregator::new();
    let mut result_files = Vec::new();

    info!(
        "Start scan-data processing for scan ids [{}]",
        ids_str(scan_ids, ", ")
    );

    for &scan_id in scan_ids {
        let mut rooms = process_scan(scan_id, &reader, &mut aggregator, config.skip_bad_records)
            .await
            .with_context(|| format!("process scan data [{scan_id}] failed"))?;
        if rooms.is_empty() {
            continue;
        }

        sort_rooms(&mut rooms);

        let channel = rooms[0].channel.clone();
        let rooms_path = tmp_folder.join(format!("rooms-{started}-{channel}-{scan_id}.csv"));
        let saved = save_rows(config, &rooms_path, &rooms)
            .with_context(|| format!("save rooms for scan [{scan_id}] failed"))?;
        info!(
            "Rooms with channel {channel}({scan_id}) saved to '{}'",
            saved.display()
        );
        result_files.push(saved);
    }

    let counts_path = tmp_folder.join(format!(
        "hotels_counts-{started}-{}.csv",
        ids_str(scan_ids, "_")
    ));
    let saved = save_rows(config, &counts_path, &aggregator.snapshot())
        .context("save hotels counters failed")?;
    info!("Hotels counts saved to '{}'", saved.display());
    result_files.push(saved);

    if let Some(ftp_config) = &config.ftp {
        for file in &result_files {
            ftp::upload_file(file, ftp_config)?;
        }
    }

    if config.remove_tmp_files {
        for file in &result_files {
            info!("Removing file '{}'", file.display());
            if let Err(err) = std::fs::remove_file(file) {
                warn!("Remove file '{}' failed: {err}", file.display());
            }
        }
    }

    Ok(())
}

/// Streams one scan through the normalizer, feeding every purchasable room
/// into the aggregator and returning the collected rows.
async fn process_scan(
    scan_id: u32,
    reader: &ScanDataReader,
    aggregator: &mut ChannelAggregator,
    skip_bad_records: bool,
) -> Result<Vec<RoomRow>> {
    let mut records = reader.scan_rows(scan_id);
    let mut all_rooms = Vec::new();
    let mut processed: u64 = 0;

    while let Some(record) = records.next_record().await? {
        let rooms = match normalize(&record) {
            Ok(rooms) => rooms,
            Err(err) if skip_bad_records => {
                warn!("Skipping bad record: {err}");
                continue;
            }
            Err(err) => return Err(err.into()),
        };

        processed += 1;
        if processed % 100 == 0 {
            info!("[{scan_id}] => processed {processed} rows");
        }

        // a lone placeholder row marks an unavailable hotel; it contributes
        // to neither output
        if rooms.is_empty() || (rooms.len() == 1 && rooms[0].product_num.is_none()) {
            continue;
        }

        for warning in aggregator.add_rows(&rooms) {
            warn!("{warning}");
        }
        all_rooms.extend(rooms);
    }

    info!(
        "[scan id: {scan_id}] Processed {processed} rows, extracted {} rooms",
        all_rooms.len()
    );
    Ok(all_rooms)
}

fn save_rows<T: Serialize>(
    config: &Config,
    path: &std::path::Path,
    rows: &[T],
) -> Result<PathBuf> {
    if config.compress_csv {
        sink::save_csv_zipped(path, rows)
    } else {
        sink::save_csv(path, rows)
    }
}

fn ids_str(scan_ids: &[u32], sep: &str) -> String {
    scan_ids
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(sep)
}
