use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::models::ids::{de_id, de_opt_id};
use crate::models::{AttendanceRecord, AttendanceStatus, PersonRef};

/// List endpoints answer either with a bare array or with `{ "data": [...] }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ListEnvelope<T> {
    Bare(Vec<T>),
    Wrapped { data: Vec<T> },
}

impl<T> ListEnvelope<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            ListEnvelope::Bare(items) => items,
            ListEnvelope::Wrapped { data } => data,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ItemEnvelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> ItemEnvelope<T> {
    pub fn into_inner(self) -> T {
        match self {
            ItemEnvelope::Wrapped { data } => data,
            ItemEnvelope::Bare(item) => item,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

/// An attendance record as exchanged with `/presences`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceDto {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    pub date: String,
    #[serde(default, deserialize_with = "de_status")]
    pub statut: Option<AttendanceStatus>,
    #[serde(default, deserialize_with = "de_opt_id", skip_serializing_if = "Option::is_none")]
    pub enfant_id: Option<String>,
    #[serde(default, deserialize_with = "de_opt_id", skip_serializing_if = "Option::is_none")]
    pub personnel_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarques: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl TryFrom<PresenceDto> for AttendanceRecord {
    type Error = String;

    fn try_from(dto: PresenceDto) -> Result<Self, Self::Error> {
        let date = parse_wire_date(&dto.date)
            .ok_or_else(|| format!("invalid date {:?} on presence {}", dto.date, dto.id))?;
        let person = match (dto.enfant_id, dto.personnel_id) {
            (Some(child), None) => PersonRef::Child(child),
            (None, Some(staff)) => PersonRef::Staff(staff),
            (Some(_), Some(_)) => {
                return Err(format!("presence {} references both a child and a staff member", dto.id));
            }
            (None, None) => return Err(format!("presence {} references nobody", dto.id)),
        };

        Ok(AttendanceRecord {
            id: dto.id,
            person,
            date,
            status: dto.statut,
            remarks: dto.remarques,
            created_at: dto.created_at,
            updated_at: dto.updated_at,
        })
    }
}

/// Body of `POST /presences`. Exactly one of the two references is set.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePresenceRequest {
    pub date: String,
    pub statut: AttendanceStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enfant_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub personnel_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remarques: Option<String>,
}

impl CreatePresenceRequest {
    pub fn new(date: NaiveDate, statut: AttendanceStatus, person: &PersonRef) -> Self {
        let (enfant_id, personnel_id) = match person {
            PersonRef::Child(id) => (Some(id.clone()), None),
            PersonRef::Staff(id) => (None, Some(id.clone())),
        };
        Self {
            date: date.format("%Y-%m-%d").to_string(),
            statut,
            enfant_id,
            personnel_id,
            remarques: None,
        }
    }
}

/// Body of `PUT /presences/:id`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePresenceRequest {
    pub statut: AttendanceStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remarques: Option<String>,
}

impl UpdatePresenceRequest {
    pub fn new(statut: AttendanceStatus) -> Self {
        Self {
            statut,
            remarques: None,
        }
    }
}

/// Filters of `GET /presences`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PresenceQuery {
    pub date: Option<NaiveDate>,
    pub enfant_id: Option<String>,
    pub personnel_id: Option<String>,
}

impl PresenceQuery {
    pub fn for_date(date: NaiveDate) -> Self {
        Self {
            date: Some(date),
            ..Self::default()
        }
    }

    pub fn with_child(mut self, enfant_id: impl Into<String>) -> Self {
        self.enfant_id = Some(enfant_id.into());
        self
    }

    pub fn with_staff(mut self, personnel_id: impl Into<String>) -> Self {
        self.personnel_id = Some(personnel_id.into());
        self
    }

    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(date) = self.date {
            pairs.push(("date", date.format("%Y-%m-%d").to_string()));
        }
        if let Some(id) = &self.enfant_id {
            pairs.push(("enfantId", id.clone()));
        }
        if let Some(id) = &self.personnel_id {
            pairs.push(("personnelId", id.clone()));
        }
        pairs
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub mot_de_passe: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(default)]
    pub nom: String,
    #[serde(default)]
    pub prenom: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// Accepts `YYYY-MM-DD` as well as full timestamps starting with the day.
pub fn parse_wire_date(value: &str) -> Option<NaiveDate> {
    let day = value.get(..10)?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

fn de_status<'de, D>(deserializer: D) -> Result<Option<AttendanceStatus>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?
        .as_deref()
        .and_then(AttendanceStatus::from_wire))
}
