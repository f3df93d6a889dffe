//! Scan-data source: paginated reads from the Postgres `scan_data` table.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use scandump_core::WideScanRecord;

const CONN_ATTEMPTS: u32 = 5;
const CONN_TIMEOUT: Duration = Duration::from_secs(300);

const SELECT_SCAN_DATA: &str = "\
SELECT aux_data_fuid, aux_data_name, aux_data_provider, availability, \
       ci_date, co_date, shown_price, currency, snapshot_url, ext_data \
FROM scan_data \
WHERE aux_data_scan_id = $1 \
ORDER BY aux_data_fuid \
LIMIT $2 OFFSET $3";

#[derive(Debug, sqlx::FromRow)]
struct ScanDataRow {
    aux_data_fuid: Uuid,
    aux_data_name: String,
    aux_data_provider: String,
    availability: String,
    ci_date: NaiveDateTime,
    co_date: NaiveDateTime,
    shown_price: Json<HashMap<String, String>>,
    currency: String,
    snapshot_url: Vec<String>,
    ext_data: Json<HashMap<String, String>>,
}

impl From<ScanDataRow> for WideScanRecord {
    fn from(row: ScanDataRow) -> Self {
        WideScanRecord {
            fuid: row.aux_data_fuid,
            hotel_name: row.aux_data_name,
            provider: row.aux_data_provider,
            availability: row.availability,
            ci_date: row.ci_date,
            co_date: row.co_date,
            shown_price: row.shown_price.0,
            currency: row.currency,
            snapshot_urls: row.snapshot_url,
            ext_data: row.ext_data.0,
        }
    }
}

/// Connection to the scan-data store.
pub struct ScanDataReader {
    pool: PgPool,
    page_size: u32,
}

impl ScanDataReader {
    /// Connects with retries: up to 5 attempts with a doubling backoff
    /// starting at one second.
    pub async fn connect(url: &str, page_size: u32) -> Result<ScanDataReader> {
        let mut backoff = Duration::from_secs(1);

        for attempt in 1..=CONN_ATTEMPTS {
            info!("Connecting to scan-data store (attempt {attempt} of {CONN_ATTEMPTS})...");
            match PgPoolOptions::new()
                .max_connections(5)
                .acquire_timeout(CONN_TIMEOUT)
                .connect(url)
                .await
            {
                Ok(pool) => {
                    info!("Got scan-data store connection");
                    return Ok(ScanDataReader { pool, page_size });
                }
                Err(err) if attempt < CONN_ATTEMPTS => {
                    warn!("Scan-data store connection failed: {err} (attempt {attempt} of {CONN_ATTEMPTS})");
                    tokio::time::sleep(backoff).await;
                    backoff *= 2;
                }
                Err(err) => {
                    return Err(err).context("can't connect to the scan-data store");
                }
            }
        }
        unreachable!("connect loop either returns a pool or the last error")
    }

    /// Pull-style iterator over the wide records of one scan.
    pub fn scan_rows(&self, scan_id: u32) -> ScanRows<'_> {
        ScanRows {
            reader: self,
            scan_id: i64::from(scan_id),
            offset: 0,
            buffer: VecDeque::new(),
            exhausted: false,
        }
    }
}

/// Pages through `scan_data` rows for a single scan id.
pub struct ScanRows<'a> {
    reader: &'a ScanDataReader,
    scan_id: i64,
    offset: i64,
    buffer: VecDeque<ScanDataRow>,
    exhausted: bool,
}

impl ScanRows<'_> {
    /// Next wide record, or `None` once the scan is exhausted.
    pub async fn next_record(&mut self) -> Result<Option<WideScanRecord>> {
        if self.buffer.is_empty() && !self.exhausted {
            self.fetch_page().await?;
        }
        Ok(self.buffer.pop_front().map(WideScanRecord::from))
    }

    async fn fetch_page(&mut self) -> Result<()> {
        let page_size = i64::from(self.reader.page_size);
        let rows: Vec<ScanDataRow> = sqlx::query_as(SELECT_SCAN_DATA)
            .bind(self.scan_id)
            .bind(page_size)
            .bind(self.offset)
            .fetch_all(&self.reader.pool)
            .await
            .with_context(|| format!("select scan_data failed (scan id: {})", self.scan_id))?;

        self.offset += rows.len() as i64;
        if (rows.len() as i64) < page_size {
            self.exhausted = true;
        }
        self.buffer.extend(rows);
        Ok(())
    }
}
