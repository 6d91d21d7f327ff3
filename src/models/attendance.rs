use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttendanceStatus {
    Present,
    Absent,
}

impl AttendanceStatus {
    pub fn as_wire(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "PRESENT",
            AttendanceStatus::Absent => "ABSENT",
        }
    }

    /// Anything other than `PRESENT` or `ABSENT` means "not marked".
    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            "PRESENT" => Some(AttendanceStatus::Present),
            "ABSENT" => Some(AttendanceStatus::Absent),
            _ => None,
        }
    }

    pub fn opposite(&self) -> Self {
        match self {
            AttendanceStatus::Present => AttendanceStatus::Absent,
            AttendanceStatus::Absent => AttendanceStatus::Present,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "présent",
            AttendanceStatus::Absent => "absent",
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

/// Which roster the attendance board is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceView {
    #[default]
    Children,
    Staff,
}

impl AttendanceView {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceView::Children => "children",
            AttendanceView::Staff => "staff",
        }
    }
}

impl fmt::Display for AttendanceView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttendanceView {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "children" => Ok(AttendanceView::Children),
            "staff" => Ok(AttendanceView::Staff),
            other => Err(format!("unknown attendance view: {}", other)),
        }
    }
}

/// The person an attendance record belongs to. A record never references both.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PersonRef {
    Child(String),
    Staff(String),
}

impl PersonRef {
    pub fn for_view(view: AttendanceView, person_id: impl Into<String>) -> Self {
        match view {
            AttendanceView::Children => PersonRef::Child(person_id.into()),
            AttendanceView::Staff => PersonRef::Staff(person_id.into()),
        }
    }

    pub fn id(&self) -> &str {
        match self {
            PersonRef::Child(id) | PersonRef::Staff(id) => id,
        }
    }

    pub fn view(&self) -> AttendanceView {
        match self {
            PersonRef::Child(_) => AttendanceView::Children,
            PersonRef::Staff(_) => AttendanceView::Staff,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttendanceRecord {
    pub id: String,
    pub person: PersonRef,
    pub date: NaiveDate,
    pub status: Option<AttendanceStatus>,
    pub remarks: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl AttendanceRecord {
    pub fn person_id(&self) -> &str {
        self.person.id()
    }

    pub fn is_marked(&self) -> bool {
        self.status.is_some()
    }
}
