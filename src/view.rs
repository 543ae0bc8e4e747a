//! Turns a selection and a theme into the payloads of the eleven panels.

use serde::Serialize;
use tracing::debug;

use crate::aggregate;
use crate::dataset::{Dataset, ALL_TEAMS_LABEL, WHOLE_YEAR_LABEL};
use crate::filter::{month_filter, team_filter, FilterSelection, Mask, MonthSelector, TeamSelector};
use crate::models::{
    CallSeries, ChannelTotal, ConsultantTotal, Highlight, Record, Series, TeamMonthlySales,
    TeamTotal,
};

const MONTH_NAMES: [&str; 12] = [
    "Janeiro",
    "Fevereiro",
    "Março",
    "Abril",
    "Maio",
    "Junho",
    "Julho",
    "Agosto",
    "Setembro",
    "Outubro",
    "Novembro",
    "Dezembro",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    /// The theme switch is "on" for the light theme.
    pub fn from_toggle(toggle: bool) -> Self {
        if toggle {
            Self::Light
        } else {
            Self::Dark
        }
    }

    pub fn template(self) -> &'static str {
        match self {
            Self::Light => "flatly",
            Self::Dark => "darkly",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Margin {
    pub l: u32,
    pub r: u32,
    pub t: u32,
    pub b: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Legend {
    pub visible: bool,
    pub x: f64,
    pub y: f64,
    pub x_anchor: &'static str,
    pub y_anchor: &'static str,
    pub background: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub template: &'static str,
    pub height: u32,
    pub hover_mode: &'static str,
    pub margin: Margin,
    pub legend: Legend,
}

impl Layout {
    fn new(theme: Theme, height: u32) -> Self {
        Self {
            template: theme.template(),
            height,
            hover_mode: "x unified",
            margin: Margin {
                l: 10,
                r: 10,
                t: 10,
                b: 10,
            },
            legend: Legend {
                visible: true,
                x: 0.1,
                y: 0.9,
                x_anchor: "left",
                y_anchor: "top",
                background: "rgba(0,0,0,0.5)",
            },
        }
    }

    fn without_legend(mut self) -> Self {
        self.legend.visible = false;
        self
    }

    fn legend_at_top(mut self) -> Self {
        self.legend.y = 0.99;
        self
    }

    fn top_margin(mut self, t: u32) -> Self {
        self.margin = Margin { l: 0, r: 0, t, b: 0 };
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelId {
    TopConsultantsBar,
    TopConsultantsPie,
    CallsByDay,
    CallsByMonth,
    BestConsultant,
    BestTeam,
    SalesByMonthByTeam,
    SalesByTeam,
    PaymentsByChannel,
    PaymentsByChannelOverMonths,
    TotalSales,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slice {
    pub label: String,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub label: String,
    pub value: u64,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Vertical,
    Horizontal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PanelBody {
    Pie {
        slices: Vec<Slice>,
        hole: f64,
    },
    Bar {
        bars: Vec<Bar>,
        orientation: Orientation,
    },
    Area {
        series: CallSeries,
        annotations: Vec<String>,
    },
    Lines {
        series: Vec<Series>,
        overlay: Option<Series>,
    },
    Indicator {
        title: String,
        subtitle: String,
        value: u64,
        formatted: String,
        delta: Option<f64>,
        formatted_delta: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Panel {
    pub id: PanelId,
    pub layout: Layout,
    pub body: PanelBody,
}

/// Everything the rendering side needs for one interaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub selection: FilterSelection,
    pub theme: Theme,
    pub month_label: String,
    pub team_label: String,
    pub panels: Vec<Panel>,
}

pub fn month_label(month: MonthSelector) -> &'static str {
    match month {
        MonthSelector::All => WHOLE_YEAR_LABEL,
        MonthSelector::Month(m) => (m as usize)
            .checked_sub(1)
            .and_then(|index| MONTH_NAMES.get(index))
            .copied()
            .unwrap_or(WHOLE_YEAR_LABEL),
    }
}

pub fn team_label(team: &TeamSelector) -> &str {
    match team {
        TeamSelector::All => ALL_TEAMS_LABEL,
        TeamSelector::Team(name) => name,
    }
}

/// `R$ 1.234.567`, dots between thousands.
pub fn format_currency(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    format!("R$ {grouped}")
}

pub fn format_delta(delta: Option<f64>) -> String {
    match delta {
        Some(delta) => format!("{:+.2}%", delta * 100.0),
        None => "n/a".to_string(),
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Filtered views, one per combination of selectors a panel listens to.
struct Views<'a> {
    month: Vec<&'a Record>,
    team: Vec<&'a Record>,
    both: Vec<&'a Record>,
    all: Vec<&'a Record>,
}

impl<'a> Views<'a> {
    fn new(records: &'a [Record], selection: &FilterSelection) -> Self {
        let by_month = month_filter(records, selection.month);
        let by_team = team_filter(records, &selection.team);

        Self {
            both: by_month.and(&by_team).apply(records),
            month: by_month.apply(records),
            team: by_team.apply(records),
            all: Mask::all(records.len()).apply(records),
        }
    }
}

pub fn compose(dataset: &Dataset, selection: &FilterSelection, theme: Theme) -> Dashboard {
    let views = Views::new(dataset.records(), selection);
    debug!(
        month = selection.month.value(),
        team = %selection.team,
        month_rows = views.month.len(),
        team_rows = views.team.len(),
        rows = views.both.len(),
        "composing dashboard"
    );

    let top = aggregate::top_consultant_per_team(&views.month);

    let panels = vec![
        Panel {
            id: PanelId::TopConsultantsBar,
            layout: Layout::new(theme, 200),
            body: top_consultants_bar(&top),
        },
        Panel {
            id: PanelId::TopConsultantsPie,
            layout: Layout::new(theme, 200).without_legend(),
            body: top_consultants_pie(&top),
        },
        Panel {
            id: PanelId::CallsByDay,
            layout: Layout::new(theme, 180),
            body: calls_area(
                aggregate::calls_by_day(&views.both),
                "Total de chamadas por dia do mês",
            ),
        },
        Panel {
            id: PanelId::CallsByMonth,
            layout: Layout::new(theme, 180),
            body: calls_area(
                aggregate::calls_by_month(&views.team),
                "Total de chamadas por mês",
            ),
        },
        Panel {
            id: PanelId::BestConsultant,
            layout: Layout::new(theme, 180).top_margin(50),
            body: highlight_indicator(aggregate::best_consultant(&views.month), "Top Consultant"),
        },
        Panel {
            id: PanelId::BestTeam,
            layout: Layout::new(theme, 180).top_margin(50),
            body: highlight_indicator(aggregate::best_team(&views.month), "Top Team"),
        },
        Panel {
            id: PanelId::SalesByMonthByTeam,
            layout: Layout::new(theme, 210).legend_at_top(),
            body: monthly_lines(aggregate::sales_by_month_by_team(&views.all)),
        },
        Panel {
            id: PanelId::SalesByTeam,
            layout: Layout::new(theme, 360),
            body: team_bars(aggregate::sales_by_team(&views.month)),
        },
        Panel {
            id: PanelId::PaymentsByChannel,
            layout: Layout::new(theme, 200).without_legend(),
            body: channel_pie(aggregate::payments_by_channel(&views.both)),
        },
        Panel {
            id: PanelId::PaymentsByChannelOverMonths,
            layout: Layout::new(theme, 360).without_legend().legend_at_top(),
            body: PanelBody::Lines {
                series: aggregate::payments_by_channel_over_months(&views.team),
                overlay: None,
            },
        },
        Panel {
            id: PanelId::TotalSales,
            layout: Layout::new(theme, 300),
            body: total_indicator(aggregate::total_sales(&views.both)),
        },
    ];

    Dashboard {
        selection: selection.clone(),
        theme,
        month_label: month_label(selection.month).to_string(),
        team_label: team_label(&selection.team).to_string(),
        panels,
    }
}

fn top_consultants_bar(top: &[ConsultantTotal]) -> PanelBody {
    PanelBody::Bar {
        bars: top
            .iter()
            .map(|t| Bar {
                label: t.consultant.clone(),
                value: t.total,
                text: t.total.to_string(),
            })
            .collect(),
        orientation: Orientation::Vertical,
    }
}

fn top_consultants_pie(top: &[ConsultantTotal]) -> PanelBody {
    PanelBody::Pie {
        slices: top
            .iter()
            .map(|t| Slice {
                label: format!("{} ({})", t.consultant, t.team),
                value: t.total,
            })
            .collect(),
        hole: 0.5,
    }
}

fn calls_area(series: CallSeries, title: &str) -> PanelBody {
    let annotations = vec![
        title.to_string(),
        format!("Média: {:?}", round2(series.mean)),
    ];
    PanelBody::Area {
        series,
        annotations,
    }
}

fn highlight_indicator(best: Option<Highlight>, rank_title: &str) -> PanelBody {
    let subtitle = "Vendas - Em relação a média".to_string();

    match best {
        Some(best) => {
            let title = match &best.team {
                Some(team) => format!("{} - {rank_title} ({team})", best.name),
                None => format!("{} - {rank_title}", best.name),
            };
            PanelBody::Indicator {
                title,
                subtitle,
                value: best.value,
                formatted: format_currency(best.value),
                delta: best.relative_delta,
                formatted_delta: Some(format_delta(best.relative_delta)),
            }
        }
        None => PanelBody::Indicator {
            title: rank_title.to_string(),
            subtitle,
            value: 0,
            formatted: format_currency(0),
            delta: None,
            formatted_delta: None,
        },
    }
}

fn monthly_lines(sales: TeamMonthlySales) -> PanelBody {
    PanelBody::Lines {
        series: sales.by_team,
        overlay: Some(sales.total),
    }
}

fn team_bars(teams: Vec<TeamTotal>) -> PanelBody {
    PanelBody::Bar {
        bars: teams
            .into_iter()
            .map(|t| Bar {
                text: t.total.to_string(),
                label: t.team,
                value: t.total,
            })
            .collect(),
        orientation: Orientation::Horizontal,
    }
}

fn channel_pie(channels: Vec<ChannelTotal>) -> PanelBody {
    PanelBody::Pie {
        slices: channels
            .into_iter()
            .map(|c| Slice {
                label: c.channel,
                value: c.total,
            })
            .collect(),
        hole: 0.5,
    }
}

fn total_indicator(total: u64) -> PanelBody {
    PanelBody::Indicator {
        title: "Valor Total".to_string(),
        subtitle: "Em Reais".to_string(),
        value: total,
        formatted: format_currency(total),
        delta: None,
        formatted_delta: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(consultant: &str, team: &str, month: u32, paid: u64) -> Record {
        Record {
            day: month,
            month,
            ad_channel: "Google".to_string(),
            team: team.to_string(),
            consultant: consultant.to_string(),
            calls_made: 3,
            call_duration: "0:04:00".to_string(),
            payment_status: true,
            amount_paid: paid,
        }
    }

    fn dataset() -> Dataset {
        Dataset::from_records(vec![
            record("Ana", "TeamX", 1, 100),
            record("Bruno", "TeamX", 1, 300),
            record("Ana", "TeamY", 1, 50),
            record("Carla", "TeamY", 2, 500),
        ])
        .unwrap()
    }

    fn body(dashboard: &Dashboard, id: PanelId) -> &PanelBody {
        &dashboard
            .panels
            .iter()
            .find(|panel| panel.id == id)
            .unwrap()
            .body
    }

    fn indicator_value(dashboard: &Dashboard, id: PanelId) -> u64 {
        match body(dashboard, id) {
            PanelBody::Indicator { value, .. } => *value,
            other => panic!("{id:?} is not an indicator: {other:?}"),
        }
    }

    #[test]
    fn composes_all_eleven_panels_in_order() {
        let dashboard = compose(&dataset(), &FilterSelection::default(), Theme::Dark);
        let ids: Vec<PanelId> = dashboard.panels.iter().map(|p| p.id).collect();

        assert_eq!(ids.len(), 11);
        assert_eq!(ids[0], PanelId::TopConsultantsBar);
        assert_eq!(ids[10], PanelId::TotalSales);
        assert!(dashboard
            .panels
            .iter()
            .all(|p| p.layout.template == "darkly"));
    }

    #[test]
    fn labels_follow_selection() {
        let whole = compose(&dataset(), &FilterSelection::default(), Theme::Light);
        assert_eq!(whole.month_label, "Ano inteiro");
        assert_eq!(whole.team_label, "Todas as equipes");

        let selection = FilterSelection::new(
            MonthSelector::Month(3),
            TeamSelector::Team("TeamY".to_string()),
        );
        let narrowed = compose(&dataset(), &selection, Theme::Light);
        assert_eq!(narrowed.month_label, "Março");
        assert_eq!(narrowed.team_label, "TeamY");
    }

    #[test]
    fn panels_listen_only_to_their_filters() {
        let selection = FilterSelection::new(
            MonthSelector::Month(1),
            TeamSelector::Team("TeamY".to_string()),
        );
        let dashboard = compose(&dataset(), &selection, Theme::Light);

        // Month and team.
        assert_eq!(indicator_value(&dashboard, PanelId::TotalSales), 50);
        // Month only: every team in January.
        assert_eq!(indicator_value(&dashboard, PanelId::BestConsultant), 300);
        // Neither: the team line chart covers the whole dataset.
        match body(&dashboard, PanelId::SalesByMonthByTeam) {
            PanelBody::Lines { overlay, .. } => {
                let total: u64 = overlay.as_ref().unwrap().points.iter().map(|p| p.y).sum();
                assert_eq!(total, 950);
            }
            other => panic!("unexpected body {other:?}"),
        }
        // Team only: TeamY across both months.
        match body(&dashboard, PanelId::CallsByMonth) {
            PanelBody::Area { series, .. } => assert_eq!(series.points.len(), 2),
            other => panic!("unexpected body {other:?}"),
        }
    }

    #[test]
    fn empty_selection_renders_empty_panels() {
        let selection = FilterSelection::new(MonthSelector::Month(5), TeamSelector::All);
        let dashboard = compose(&dataset(), &selection, Theme::Dark);

        assert_eq!(indicator_value(&dashboard, PanelId::TotalSales), 0);
        assert_eq!(indicator_value(&dashboard, PanelId::BestTeam), 0);
        match body(&dashboard, PanelId::TopConsultantsPie) {
            PanelBody::Pie { slices, .. } => assert!(slices.is_empty()),
            other => panic!("unexpected body {other:?}"),
        }
        match body(&dashboard, PanelId::CallsByDay) {
            PanelBody::Area { series, annotations } => {
                assert!(series.points.is_empty());
                assert_eq!(annotations[1], "Média: 0.0");
            }
            other => panic!("unexpected body {other:?}"),
        }
    }

    #[test]
    fn call_mean_keeps_decimal_point() {
        let dashboard = compose(&dataset(), &FilterSelection::default(), Theme::Light);
        match body(&dashboard, PanelId::CallsByMonth) {
            PanelBody::Area { annotations, .. } => assert_eq!(annotations[1], "Média: 6.0"),
            other => panic!("unexpected body {other:?}"),
        }
    }

    #[test]
    fn calls_by_day_follows_both_selectors() {
        let selection = FilterSelection::new(
            MonthSelector::Month(1),
            TeamSelector::Team("TeamY".to_string()),
        );
        let dashboard = compose(&dataset(), &selection, Theme::Light);
        match body(&dashboard, PanelId::CallsByDay) {
            PanelBody::Area {
                series,
                annotations,
            } => {
                assert_eq!(series.points.len(), 1);
                assert_eq!(series.points[0].y, 3);
                assert_eq!(annotations[1], "Média: 3.0");
            }
            other => panic!("unexpected body {other:?}"),
        }
    }

    #[test]
    fn pie_labels_name_consultant_and_team() {
        let selection = FilterSelection::new(MonthSelector::Month(1), TeamSelector::All);
        let dashboard = compose(&dataset(), &selection, Theme::Light);

        match body(&dashboard, PanelId::TopConsultantsPie) {
            PanelBody::Pie { slices, .. } => {
                let labels: Vec<&str> = slices.iter().map(|s| s.label.as_str()).collect();
                assert_eq!(labels, vec!["Bruno (TeamX)", "Ana (TeamY)"]);
            }
            other => panic!("unexpected body {other:?}"),
        }
    }

    #[test]
    fn theme_toggle_picks_template() {
        assert_eq!(Theme::from_toggle(true).template(), "flatly");
        assert_eq!(Theme::from_toggle(false).template(), "darkly");
    }

    #[test]
    fn currency_and_delta_formatting() {
        assert_eq!(format_currency(0), "R$ 0");
        assert_eq!(format_currency(950), "R$ 950");
        assert_eq!(format_currency(1234567), "R$ 1.234.567");
        assert_eq!(format_delta(Some(0.1234)), "+12.34%");
        assert_eq!(format_delta(Some(-0.05)), "-5.00%");
        assert_eq!(format_delta(Some(0.0)), "+0.00%");
        assert_eq!(format_delta(None), "n/a");
    }

    #[test]
    fn payload_serializes_with_panel_kinds() {
        let dashboard = compose(&dataset(), &FilterSelection::default(), Theme::Light);
        let json = serde_json::to_value(&dashboard).unwrap();

        assert_eq!(json["theme"], "light");
        assert_eq!(json["selection"]["team"], 0);
        assert_eq!(json["panels"][0]["id"], "top_consultants_bar");
        assert_eq!(json["panels"][0]["body"]["kind"], "bar");
        assert_eq!(json["panels"][10]["body"]["formatted"], "R$ 950");
    }
}
