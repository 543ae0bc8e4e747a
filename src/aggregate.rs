//! Aggregations behind the dashboard panels.
//!
//! Every function takes an already filtered view and returns fresh values.
//! An empty view gives empty series, zero totals and no highlight.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use crate::models::{
    CallSeries, ChannelTotal, ConsultantTotal, Highlight, Point, Record, Series, TeamMonthlySales,
    TeamTotal,
};

/// Sums `value` per key, keeping groups in the order they first appear.
fn sum_in_encounter_order<'a, K, F>(
    rows: &[&'a Record],
    key: F,
    value: fn(&Record) -> u64,
) -> Vec<(K, u64)>
where
    K: Eq + Hash + Clone,
    F: Fn(&'a Record) -> K,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, u64)> = Vec::new();

    for &row in rows {
        let k = key(row);
        match index.get(&k) {
            Some(&position) => groups[position].1 += value(row),
            None => {
                index.insert(k.clone(), groups.len());
                groups.push((k, value(row)));
            }
        }
    }

    groups
}

fn sum_by_key<'a, K, F>(rows: &[&'a Record], key: F, value: fn(&Record) -> u64) -> BTreeMap<K, u64>
where
    K: Ord,
    F: Fn(&'a Record) -> K,
{
    let mut sums = BTreeMap::new();
    for &row in rows {
        *sums.entry(key(row)).or_insert(0) += value(row);
    }
    sums
}

/// Stable: equal sums keep their encounter order.
fn sort_descending<K>(groups: &mut [(K, u64)]) {
    groups.sort_by(|a, b| b.1.cmp(&a.1));
}

fn amount(record: &Record) -> u64 {
    record.amount_paid
}

fn calls(record: &Record) -> u64 {
    record.calls_made
}

fn mean(values: impl ExactSizeIterator<Item = u64>) -> f64 {
    let count = values.len();
    if count == 0 {
        return 0.0;
    }
    values.map(|v| v as f64).sum::<f64>() / count as f64
}

fn consultant_sales<'a>(rows: &[&'a Record]) -> Vec<((&'a str, &'a str), u64)> {
    let mut groups = sum_in_encounter_order(
        rows,
        |r| (r.consultant.as_str(), r.team.as_str()),
        amount,
    );
    sort_descending(&mut groups);
    groups
}

fn team_sales<'a>(rows: &[&'a Record]) -> Vec<(&'a str, u64)> {
    let mut groups = sum_in_encounter_order(rows, |r| r.team.as_str(), amount);
    sort_descending(&mut groups);
    groups
}

/// Best-selling consultant of each team, highest first.
pub fn top_consultant_per_team(rows: &[&Record]) -> Vec<ConsultantTotal> {
    let mut seen_teams: Vec<&str> = Vec::new();
    let mut top = Vec::new();

    for ((consultant, team), total) in consultant_sales(rows) {
        if seen_teams.contains(&team) {
            continue;
        }
        seen_teams.push(team);
        top.push(ConsultantTotal {
            consultant: consultant.to_string(),
            team: team.to_string(),
            total,
        });
    }

    top
}

fn call_series<'a>(rows: &[&'a Record], key: fn(&'a Record) -> u32) -> CallSeries {
    let sums = sum_by_key(rows, key, calls);
    CallSeries {
        mean: mean(sums.values().copied()),
        points: sums.into_iter().map(|(x, y)| Point { x, y }).collect(),
    }
}

pub fn calls_by_day(rows: &[&Record]) -> CallSeries {
    call_series(rows, |r| r.day)
}

pub fn calls_by_month(rows: &[&Record]) -> CallSeries {
    call_series(rows, |r| r.month)
}

/// The delta is measured against the mean of every group, the top one included.
fn highlight(name: &str, team: Option<&str>, groups: &[u64]) -> Option<Highlight> {
    let value = *groups.first()?;
    let mean = mean(groups.iter().copied());
    let relative_delta = (mean != 0.0).then(|| (value as f64 - mean) / mean);

    Some(Highlight {
        name: name.to_string(),
        team: team.map(str::to_string),
        value,
        mean,
        relative_delta,
    })
}

pub fn best_consultant(rows: &[&Record]) -> Option<Highlight> {
    let groups = consultant_sales(rows);
    let ((consultant, team), _) = groups.first()?;
    let totals: Vec<u64> = groups.iter().map(|(_, total)| *total).collect();
    highlight(consultant, Some(*team), &totals)
}

pub fn best_team(rows: &[&Record]) -> Option<Highlight> {
    let groups = team_sales(rows);
    let (team, _) = groups.first()?;
    let totals: Vec<u64> = groups.iter().map(|(_, total)| *total).collect();
    highlight(team, None, &totals)
}

fn to_series(name: String, points: BTreeMap<u32, u64>) -> Series {
    Series {
        name,
        points: points.into_iter().map(|(x, y)| Point { x, y }).collect(),
    }
}

/// Group sums of `(series key, month)` pivoted into one series per key.
fn monthly_series<'a>(rows: &[&'a Record], key: fn(&'a Record) -> &'a str) -> Vec<Series> {
    let mut pivot: BTreeMap<&str, BTreeMap<u32, u64>> = BTreeMap::new();
    for ((name, month), total) in sum_by_key(rows, |r| (key(r), r.month), amount) {
        pivot.entry(name).or_default().insert(month, total);
    }

    pivot
        .into_iter()
        .map(|(name, points)| to_series(name.to_string(), points))
        .collect()
}

pub fn sales_by_month_by_team(rows: &[&Record]) -> TeamMonthlySales {
    TeamMonthlySales {
        by_team: monthly_series(rows, |r| r.team.as_str()),
        total: to_series(
            "Total de Vendas".to_string(),
            sum_by_key(rows, |r| r.month, amount),
        ),
    }
}

pub fn sales_by_team(rows: &[&Record]) -> Vec<TeamTotal> {
    team_sales(rows)
        .into_iter()
        .map(|(team, total)| TeamTotal {
            team: team.to_string(),
            total,
        })
        .collect()
}

pub fn payments_by_channel(rows: &[&Record]) -> Vec<ChannelTotal> {
    sum_by_key(rows, |r| r.ad_channel.as_str(), amount)
        .into_iter()
        .map(|(channel, total)| ChannelTotal {
            channel: channel.to_string(),
            total,
        })
        .collect()
}

pub fn payments_by_channel_over_months(rows: &[&Record]) -> Vec<Series> {
    monthly_series(rows, |r| r.ad_channel.as_str())
}

pub fn total_sales(rows: &[&Record]) -> u64 {
    rows.iter().map(|r| r.amount_paid).sum()
}
