//! One-off normalization of the raw call-center export into the cleaned
//! dataset the dashboard reads.

use std::path::Path;

use anyhow::Context;
use chrono::Duration;
use tracing::{debug, info};

use crate::error::CleanError;
use crate::models::{RawRecord, Record, HEADERS};

pub const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Fev", "Mar", "Abr", "Mai", "Jun", "Jul", "Ago", "Set", "Out", "Nov", "Dez",
];

const AMOUNT_PREFIX: &str = "R$";
const PAID: &str = "Pago";
const NOT_PAID: &str = "Não pago";
const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

pub fn parse_month(token: &str) -> Option<u32> {
    MONTH_ABBREVIATIONS
        .iter()
        .position(|abbr| *abbr == token)
        .map(|index| index as u32 + 1)
}

/// Fractional amounts are truncated to whole currency units.
pub fn parse_amount(value: &str) -> Option<u64> {
    let digits = value.strip_prefix(AMOUNT_PREFIX)?.trim();
    let (whole, fraction) = match digits.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (digits, None),
    };

    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(whole) || fraction.is_some_and(|f| !all_digits(f)) {
        return None;
    }

    whole.parse().ok()
}

/// Turns `"M:S"` into `H:MM:SS`, dropping whole days.
pub fn normalize_duration(value: &str) -> Option<String> {
    let (minutes, seconds) = value.trim().split_once(':')?;
    let minutes: u32 = minutes.parse().ok()?;
    let seconds: u32 = seconds.parse().ok()?;

    let total = Duration::minutes(i64::from(minutes)) + Duration::seconds(i64::from(seconds));
    let within_day = total.num_seconds() % SECONDS_PER_DAY;

    Some(format!(
        "{}:{:02}:{:02}",
        within_day / 3600,
        (within_day % 3600) / 60,
        within_day % 60
    ))
}

pub fn parse_payment_status(value: &str) -> Option<bool> {
    match value {
        PAID => Some(true),
        NOT_PAID => Some(false),
        _ => None,
    }
}

fn clean_row(row: usize, raw: &RawRecord) -> Result<Record, CleanError> {
    let month = parse_month(&raw.month).ok_or_else(|| CleanError::UnknownMonth {
        row,
        token: raw.month.clone(),
    })?;
    let amount_paid =
        parse_amount(&raw.amount_paid).ok_or_else(|| CleanError::MalformedAmount {
            row,
            value: raw.amount_paid.clone(),
        })?;
    let call_duration = normalize_duration(&raw.call_duration).ok_or_else(|| {
        CleanError::MalformedDuration {
            row,
            value: raw.call_duration.clone(),
        }
    })?;
    let payment_status = parse_payment_status(&raw.payment_status).ok_or_else(|| {
        CleanError::UnknownPaymentStatus {
            row,
            value: raw.payment_status.clone(),
        }
    })?;

    Ok(Record {
        day: raw.day,
        month,
        ad_channel: raw.ad_channel.clone(),
        team: raw.team.clone(),
        consultant: raw.consultant.clone(),
        calls_made: raw.calls_made,
        call_duration,
        payment_status,
        amount_paid,
    })
}

/// Cleans every row or none: the first bad row aborts the pass.
pub fn clean(raw_rows: &[RawRecord]) -> Result<Vec<Record>, CleanError> {
    raw_rows
        .iter()
        .enumerate()
        .map(|(index, raw)| clean_row(index + 1, raw))
        .collect()
}

/// Re-expresses a cleaned row the way the raw export writes it.
pub fn to_raw(record: &Record) -> RawRecord {
    let month = record
        .month
        .checked_sub(1)
        .and_then(|index| MONTH_ABBREVIATIONS.get(index as usize))
        .map(|abbr| abbr.to_string())
        .unwrap_or_else(|| record.month.to_string());

    let call_duration = record
        .call_duration
        .split(':')
        .map(|part| part.parse::<u64>())
        .collect::<Result<Vec<_>, _>>()
        .ok()
        .and_then(|parts| match parts.as_slice() {
            [h, m, s] => Some(format!("{}:{:02}", h * 60 + m, s)),
            _ => None,
        })
        .unwrap_or_else(|| record.call_duration.clone());

    RawRecord {
        day: record.day,
        month,
        ad_channel: record.ad_channel.clone(),
        team: record.team.clone(),
        consultant: record.consultant.clone(),
        calls_made: record.calls_made,
        call_duration,
        payment_status: if record.payment_status { PAID } else { NOT_PAID }.to_string(),
        amount_paid: format!("{AMOUNT_PREFIX} {}", record.amount_paid),
    }
}

pub fn read_raw(path: &Path) -> anyhow::Result<Vec<RawRecord>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open raw dataset {}", path.display()))?;
    let mut rows = Vec::new();

    for result in reader.deserialize::<RawRecord>() {
        rows.push(result.with_context(|| format!("malformed row in {}", path.display()))?);
    }

    Ok(rows)
}

fn write_rows<T: serde::Serialize>(staging: &Path, rows: &[T]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(staging)
        .with_context(|| format!("failed to create {}", staging.display()))?;
    // The writer only emits headers alongside the first row.
    if rows.is_empty() {
        writer.write_record(HEADERS)?;
    }
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes next to `path` first and renames, so readers never see a partial file.
/// `T` must serialize with the dataset's [`HEADERS`].
pub fn write_csv<T: serde::Serialize>(path: &Path, rows: &[T]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    let staging = path.with_extension("csv.tmp");
    if let Err(err) = write_rows(&staging, rows) {
        let _ = std::fs::remove_file(&staging);
        return Err(err);
    }

    std::fs::rename(&staging, path)
        .with_context(|| format!("failed to move cleaned dataset into {}", path.display()))?;
    Ok(())
}

pub fn clean_file(raw_path: &Path, out_path: &Path) -> anyhow::Result<usize> {
    let raw_rows = read_raw(raw_path)?;
    debug!(rows = raw_rows.len(), path = %raw_path.display(), "raw dataset read");

    let cleaned = clean(&raw_rows)
        .with_context(|| format!("failed to clean {}", raw_path.display()))?;
    write_csv(out_path, &cleaned)?;

    info!(rows = cleaned.len(), path = %out_path.display(), "cleaned dataset written");
    Ok(cleaned.len())
}
