use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use anyhow::Context;
use tracing::{info, warn};

use crate::clean::MONTH_ABBREVIATIONS;
use crate::error::DatasetError;
use crate::filter::TeamSelector;
use crate::models::{Record, SelectOption};

pub const WHOLE_YEAR_LABEL: &str = "Ano inteiro";
pub const ALL_TEAMS_LABEL: &str = "Todas as equipes";

/// The cleaned dataset plus the selector options derived from it.
///
/// Built once at startup and only borrowed afterwards.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<Record>,
    month_options: Vec<SelectOption<u32>>,
    team_options: Vec<SelectOption<TeamSelector>>,
}

impl Dataset {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let mut reader = csv::Reader::from_path(path)
            .with_context(|| format!("failed to open cleaned dataset {}", path.display()))?;
        let mut records = Vec::new();

        for result in reader.deserialize::<Record>() {
            records.push(result.with_context(|| format!("malformed row in {}", path.display()))?);
        }

        let dataset = Self::from_records(records)?;
        info!(
            rows = dataset.records.len(),
            teams = dataset.team_options.len() - 1,
            path = %path.display(),
            "dataset loaded"
        );
        Ok(dataset)
    }

    pub fn from_records(records: Vec<Record>) -> Result<Self, DatasetError> {
        if let Some((index, record)) = records
            .iter()
            .enumerate()
            .find(|(_, r)| !(1..=12).contains(&r.month))
        {
            return Err(DatasetError::MonthOutOfRange {
                row: index + 1,
                month: record.month,
            });
        }

        warn_on_team_changes(&records);

        let month_options = month_options(&records);
        let team_options = team_options(&records);

        Ok(Self {
            records,
            month_options,
            team_options,
        })
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn month_options(&self) -> &[SelectOption<u32>] {
        &self.month_options
    }

    pub fn team_options(&self) -> &[SelectOption<TeamSelector>] {
        &self.team_options
    }
}

fn month_options(records: &[Record]) -> Vec<SelectOption<u32>> {
    let months: BTreeSet<u32> = records.iter().map(|r| r.month).collect();

    std::iter::once(SelectOption {
        label: WHOLE_YEAR_LABEL.to_string(),
        value: 0,
    })
    .chain(months.into_iter().map(|month| SelectOption {
        label: MONTH_ABBREVIATIONS[month as usize - 1].to_string(),
        value: month,
    }))
    .collect()
}

fn team_options(records: &[Record]) -> Vec<SelectOption<TeamSelector>> {
    let mut options = vec![SelectOption {
        label: ALL_TEAMS_LABEL.to_string(),
        value: TeamSelector::All,
    }];

    for record in records {
        if !options.iter().skip(1).any(|o| o.label == record.team) {
            options.push(SelectOption {
                label: record.team.clone(),
                value: TeamSelector::Team(record.team.clone()),
            });
        }
    }

    options
}

/// Consultants are expected to stay in one team; nothing breaks if they don't.
fn warn_on_team_changes(records: &[Record]) {
    let mut teams: HashMap<&str, &str> = HashMap::new();

    for record in records {
        let team = teams
            .entry(record.consultant.as_str())
            .or_insert(record.team.as_str());
        if *team != record.team {
            warn!(
                consultant = %record.consultant,
                first_team = %team,
                other_team = %record.team,
                "consultant appears in more than one team"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(consultant: &str, team: &str, month: u32) -> Record {
        Record {
            day: 1,
            month,
            ad_channel: "Google".to_string(),
            team: team.to_string(),
            consultant: consultant.to_string(),
            calls_made: 1,
            call_duration: "0:01:00".to_string(),
            payment_status: true,
            amount_paid: 10,
        }
    }

    #[test]
    fn month_options_are_sorted_behind_sentinel() {
        let dataset = Dataset::from_records(vec![
            record("Ana", "Equipe 1", 3),
            record("Bruno", "Equipe 2", 1),
            record("Ana", "Equipe 1", 3),
        ])
        .unwrap();

        let options: Vec<(&str, u32)> = dataset
            .month_options()
            .iter()
            .map(|o| (o.label.as_str(), o.value))
            .collect();
        assert_eq!(options, vec![("Ano inteiro", 0), ("Jan", 1), ("Mar", 3)]);
    }

    #[test]
    fn team_options_keep_encounter_order() {
        let dataset = Dataset::from_records(vec![
            record("Ana", "Equipe 2", 1),
            record("Bruno", "Equipe 1", 1),
            record("Carla", "Equipe 2", 1),
        ])
        .unwrap();

        let values: Vec<TeamSelector> = dataset
            .team_options()
            .iter()
            .map(|o| o.value.clone())
            .collect();
        assert_eq!(
            values,
            vec![
                TeamSelector::All,
                TeamSelector::Team("Equipe 2".to_string()),
                TeamSelector::Team("Equipe 1".to_string()),
            ]
        );
        assert_eq!(dataset.team_options()[0].label, ALL_TEAMS_LABEL);
    }

    #[test]
    fn rejects_month_outside_calendar() {
        let err = Dataset::from_records(vec![
            record("Ana", "Equipe 1", 1),
            record("Ana", "Equipe 1", 13),
        ])
        .unwrap_err();
        assert_eq!(err, DatasetError::MonthOutOfRange { row: 2, month: 13 });
    }

    #[test]
    fn empty_dataset_only_has_sentinels() {
        let dataset = Dataset::from_records(Vec::new()).unwrap();
        assert_eq!(dataset.month_options().len(), 1);
        assert_eq!(dataset.team_options().len(), 1);
        assert!(dataset.records().is_empty());
    }
}
