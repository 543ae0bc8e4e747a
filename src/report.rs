use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::models::{CallSeries, Series};
use crate::view::{format_currency, Dashboard, PanelBody, PanelId};

const NO_SALES: &str = "No sales recorded for this selection.";

fn heading(id: PanelId) -> &'static str {
    match id {
        PanelId::TopConsultantsBar => "Top Consultants by Team",
        PanelId::TopConsultantsPie => "Top Consultants by Team (share)",
        PanelId::CallsByDay => "Calls by Day of Month",
        PanelId::CallsByMonth => "Calls by Month",
        PanelId::BestConsultant => "Best Consultant",
        PanelId::BestTeam => "Best Team",
        PanelId::SalesByMonthByTeam => "Sales by Month and Team",
        PanelId::SalesByTeam => "Sales by Team",
        PanelId::PaymentsByChannel => "Payments by Ad Channel",
        PanelId::PaymentsByChannelOverMonths => "Payments by Ad Channel over Months",
        PanelId::TotalSales => "Total Sales",
    }
}

fn write_series(output: &mut String, series: &Series) {
    let points: Vec<String> = series
        .points
        .iter()
        .map(|p| format!("{}: {}", p.x, p.y))
        .collect();
    let _ = writeln!(output, "- {}: {}", series.name, points.join(", "));
}

fn write_calls(output: &mut String, series: &CallSeries, annotations: &[String]) {
    if series.points.is_empty() {
        let _ = writeln!(output, "{NO_SALES}");
        return;
    }
    for note in annotations {
        let _ = writeln!(output, "_{note}_");
    }
    let _ = writeln!(output);
    for point in &series.points {
        let _ = writeln!(output, "- {}: {} calls", point.x, point.y);
    }
}

fn write_body(output: &mut String, body: &PanelBody) {
    match body {
        PanelBody::Pie { slices, .. } => {
            if slices.is_empty() {
                let _ = writeln!(output, "{NO_SALES}");
            }
            let total: u64 = slices.iter().map(|s| s.value).sum();
            for slice in slices {
                let share = if total == 0 {
                    0.0
                } else {
                    slice.value as f64 / total as f64 * 100.0
                };
                let _ = writeln!(
                    output,
                    "- {}: {} ({:.1}%)",
                    slice.label,
                    format_currency(slice.value),
                    share
                );
            }
        }
        PanelBody::Bar { bars, .. } => {
            if bars.is_empty() {
                let _ = writeln!(output, "{NO_SALES}");
            }
            for bar in bars {
                let _ = writeln!(output, "- {}: {}", bar.label, format_currency(bar.value));
            }
        }
        PanelBody::Area {
            series,
            annotations,
        } => write_calls(output, series, annotations),
        PanelBody::Lines { series, overlay } => {
            if series.is_empty() {
                let _ = writeln!(output, "{NO_SALES}");
            }
            for line in series.iter().chain(overlay.iter()) {
                if !line.points.is_empty() {
                    write_series(output, line);
                }
            }
        }
        PanelBody::Indicator {
            title,
            subtitle,
            formatted,
            formatted_delta,
            ..
        } => {
            let _ = writeln!(output, "**{title}** ({subtitle})");
            let _ = writeln!(output);
            match formatted_delta {
                Some(delta) => {
                    let _ = writeln!(output, "{formatted} ({delta} vs average)");
                }
                None => {
                    let _ = writeln!(output, "{formatted}");
                }
            }
        }
    }
}

/// Markdown snapshot of a composed dashboard.
pub fn build_report(dashboard: &Dashboard, generated_at: DateTime<Utc>) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Sales Analytics Report");
    let _ = writeln!(
        output,
        "Generated for {} / {} ({} theme) at {}",
        dashboard.month_label,
        dashboard.team_label,
        dashboard.theme.template(),
        generated_at.format("%Y-%m-%d %H:%M UTC")
    );

    for panel in &dashboard.panels {
        let _ = writeln!(output);
        let _ = writeln!(output, "## {}", heading(panel.id));
        write_body(&mut output, &panel.body);
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    use crate::dataset::Dataset;
    use crate::filter::{FilterSelection, MonthSelector, TeamSelector};
    use crate::models::Record;
    use crate::view::{compose, Theme};

    fn record(consultant: &str, team: &str, channel: &str, paid: u64) -> Record {
        Record {
            day: 10,
            month: 2,
            ad_channel: channel.to_string(),
            team: team.to_string(),
            consultant: consultant.to_string(),
            calls_made: 4,
            call_duration: "0:10:00".to_string(),
            payment_status: true,
            amount_paid: paid,
        }
    }

    fn generated_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap()
    }

    fn dataset() -> Dataset {
        Dataset::from_records(vec![
            record("Ana", "Equipe 1", "Instagram", 1500),
            record("Bruno", "Equipe 2", "Google", 500),
        ])
        .unwrap()
    }

    #[test]
    fn report_lists_every_panel() {
        let dashboard = compose(&dataset(), &FilterSelection::default(), Theme::Dark);
        let report = build_report(&dashboard, generated_at());

        assert!(report.starts_with("# Sales Analytics Report"));
        assert!(report.contains(
            "Generated for Ano inteiro / Todas as equipes (darkly theme) at 2026-03-01 09:30 UTC"
        ));
        assert_eq!(report.matches("\n## ").count(), 11);
        assert!(report.contains("- Ana (Equipe 1): R$ 1.500 (75.0%)"));
        assert!(report.contains("**Valor Total** (Em Reais)"));
        assert!(report.contains("R$ 2.000"));
        assert!(report.contains("_Média: 8.0_"));
    }

    #[test]
    fn best_consultant_shows_delta() {
        let dashboard = compose(&dataset(), &FilterSelection::default(), Theme::Light);
        let report = build_report(&dashboard, generated_at());

        assert!(report.contains("**Ana - Top Consultant (Equipe 1)**"));
        assert!(report.contains("R$ 1.500 (+50.00% vs average)"));
    }

    #[test]
    fn empty_selection_is_reported_not_failed() {
        let selection = FilterSelection::new(
            MonthSelector::Month(7),
            TeamSelector::Team("Equipe 9".to_string()),
        );
        let dashboard = compose(&dataset(), &selection, Theme::Light);
        let report = build_report(&dashboard, generated_at());

        assert!(report.contains("Generated for Julho / Equipe 9"));
        assert!(report.contains(NO_SALES));
        assert!(report.contains("R$ 0"));
    }
}
