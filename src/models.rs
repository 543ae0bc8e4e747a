use serde::{Deserialize, Serialize};

/// Column order shared by the raw export and the cleaned dataset.
pub const HEADERS: [&str; 9] = [
    "Dia",
    "Mês",
    "Meio de Propaganda",
    "Equipe",
    "Consultor",
    "Chamadas Realizadas",
    "Duração da chamada",
    "Status de Pagamento",
    "Valor Pago",
];

/// One row of the cleaned sales dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "Dia", alias = "day")]
    pub day: u32,
    #[serde(rename = "Mês", alias = "month")]
    pub month: u32,
    #[serde(rename = "Meio de Propaganda", alias = "ad_channel")]
    pub ad_channel: String,
    #[serde(rename = "Equipe", alias = "team")]
    pub team: String,
    #[serde(rename = "Consultor", alias = "consultant")]
    pub consultant: String,
    #[serde(rename = "Chamadas Realizadas", alias = "calls_made")]
    pub calls_made: u64,
    #[serde(rename = "Duração da chamada", alias = "call_duration")]
    pub call_duration: String,
    #[serde(
        rename = "Status de Pagamento",
        alias = "payment_status",
        with = "bool_as_int"
    )]
    pub payment_status: bool,
    #[serde(rename = "Valor Pago", alias = "amount_paid")]
    pub amount_paid: u64,
}

/// A row as exported by the call-center system, before cleaning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(rename = "Dia")]
    pub day: u32,
    #[serde(rename = "Mês")]
    pub month: String,
    #[serde(rename = "Meio de Propaganda")]
    pub ad_channel: String,
    #[serde(rename = "Equipe")]
    pub team: String,
    #[serde(rename = "Consultor")]
    pub consultant: String,
    #[serde(rename = "Chamadas Realizadas")]
    pub calls_made: u64,
    #[serde(rename = "Duração da chamada")]
    pub call_duration: String,
    #[serde(rename = "Status de Pagamento")]
    pub payment_status: String,
    #[serde(rename = "Valor Pago")]
    pub amount_paid: String,
}

/// Payment status is stored as `1`/`0` in the cleaned file.
mod bool_as_int {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        match u8::deserialize(deserializer)? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(de::Error::custom(format!(
                "payment status must be 0 or 1, got {other}"
            ))),
        }
    }
}

/// An entry of a selector control. `value` 0 is the "no filter" sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption<V> {
    pub label: String,
    pub value: V,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsultantTotal {
    pub consultant: String,
    pub team: String,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamTotal {
    pub team: String,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelTotal {
    pub channel: String,
    pub total: u64,
}

/// A `(x, y)` point of a line or area series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Point {
    pub x: u32,
    pub y: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    pub points: Vec<Point>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallSeries {
    pub points: Vec<Point>,
    pub mean: f64,
}

/// Rank-1 group of a sales ranking, compared against the mean of all groups.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Highlight {
    pub name: String,
    pub team: Option<String>,
    pub value: u64,
    pub mean: f64,
    /// `None` when the mean is zero.
    pub relative_delta: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamMonthlySales {
    pub by_team: Vec<Series>,
    pub total: Series,
}
