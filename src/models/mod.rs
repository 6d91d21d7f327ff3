pub mod attendance;
pub mod person;

pub use attendance::{AttendanceRecord, AttendanceStatus, AttendanceView, PersonRef};
pub use person::{ClassGroup, ClassRef, Child, StaffMember, UNASSIGNED_CLASS_LABEL};

pub(crate) mod ids {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    impl From<RawId> for String {
        fn from(raw: RawId) -> Self {
            match raw {
                RawId::Text(s) => s,
                RawId::Number(n) => n.to_string(),
            }
        }
    }

    /// Accepts ids sent either as JSON strings or numbers.
    pub fn de_id<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        RawId::deserialize(deserializer).map(String::from)
    }

    pub fn de_opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<RawId>::deserialize(deserializer)?
            .map(String::from)
            .filter(|id| !id.is_empty()))
    }
}
