use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Number, Value};

/// Identifier of a participant as it arrives from the roster source.
///
/// Spreadsheets hand out ids either as JSON numbers or as strings, so both
/// are accepted. Comparisons always go through [`ParticipantId::normalized`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParticipantId {
    Number(Number),
    Text(String),
}

impl ParticipantId {
    /// Canonical string form used for dedup and display.
    pub fn normalized(&self) -> String {
        match self {
            ParticipantId::Number(n) => normalize_number(n),
            ParticipantId::Text(s) => s.clone(),
        }
    }
}

impl PartialEq for ParticipantId {
    fn eq(&self, other: &Self) -> bool {
        self.normalized() == other.normalized()
    }
}

impl Eq for ParticipantId {}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.normalized())
    }
}

impl From<u64> for ParticipantId {
    fn from(v: u64) -> Self {
        ParticipantId::Number(Number::from(v))
    }
}

impl From<&str> for ParticipantId {
    fn from(v: &str) -> Self {
        ParticipantId::Text(v.to_string())
    }
}

impl From<String> for ParticipantId {
    fn from(v: String) -> Self {
        ParticipantId::Text(v)
    }
}

// Integral floats (`7.0`) render without the fractional part.
fn normalize_number(n: &Number) -> String {
    if let Some(v) = n.as_u64() {
        return v.to_string();
    }
    if let Some(v) = n.as_i64() {
        return v.to_string();
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
        _ => n.to_string(),
    }
}

/// The raw `eligible` column.
///
/// Only `true` or a case-insensitive `"true"` string count as eligible;
/// anything else (numbers, null, `"yes"`) does not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EligibleFlag {
    Flag(bool),
    Text(String),
    Other(Value),
}

impl EligibleFlag {
    pub fn is_truthy(&self) -> bool {
        match self {
            EligibleFlag::Flag(b) => *b,
            EligibleFlag::Text(s) => s.trim().eq_ignore_ascii_case("true"),
            EligibleFlag::Other(_) => false,
        }
    }
}

impl Default for EligibleFlag {
    fn default() -> Self {
        EligibleFlag::Flag(false)
    }
}

impl From<bool> for EligibleFlag {
    fn from(v: bool) -> Self {
        EligibleFlag::Flag(v)
    }
}

/// One row of the roster. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub team: String,
    #[serde(default)]
    pub eligible: EligibleFlag,
}

impl Participant {
    pub fn new(
        id: impl Into<ParticipantId>,
        name: impl Into<String>,
        team: impl Into<String>,
        eligible: impl Into<EligibleFlag>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            team: team.into(),
            eligible: eligible.into(),
        }
    }
}

/// Prize being drawn for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prize {
    pub id: String,
    pub name: String,
}

impl Prize {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Append-only record of a completed draw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawResult {
    #[serde(default, deserialize_with = "lenient_string")]
    pub time: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub prize_id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub prize_name: String,
    pub participant_id: ParticipantId,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub team: String,
}

impl DrawResult {
    /// Build the record for `winner`. The participant id is stored in its
    /// normalized string form.
    pub fn for_winner(winner: &Participant, prize: &Prize, at: DateTime<Utc>) -> Self {
        Self {
            time: at.to_rfc3339_opts(SecondsFormat::Millis, true),
            prize_id: prize.id.clone(),
            prize_name: prize.name.clone(),
            participant_id: ParticipantId::Text(winner.id.normalized()),
            name: winner.name.clone(),
            team: winner.team.clone(),
        }
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        Value::Number(n) => normalize_number(&n),
        other => other.to_string(),
    })
}
