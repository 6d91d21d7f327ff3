use serde::{Deserialize, Serialize};

use super::ids::{de_id, de_opt_id};

pub const ACTIVE_STATUS: &str = "ACTIF";
pub const UNASSIGNED_CLASS_LABEL: &str = "Sans classe";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassRef {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(default)]
    pub nom: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Child {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(default)]
    pub nom: String,
    #[serde(default)]
    pub prenom: String,
    #[serde(default)]
    pub statut: String,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub classe_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classe: Option<ClassRef>,
}

impl Child {
    pub fn is_active(&self) -> bool {
        self.statut == ACTIVE_STATUS
    }

    /// The flat `classeId` wins over the embedded class reference.
    pub fn class_id(&self) -> Option<&str> {
        self.classe_id
            .as_deref()
            .or_else(|| self.classe.as_ref().map(|c| c.id.as_str()))
            .filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffMember {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(default)]
    pub nom: String,
    #[serde(default)]
    pub prenom: String,
    #[serde(default)]
    pub statut: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poste: Option<String>,
}

impl StaffMember {
    pub fn is_active(&self) -> bool {
        self.statut == ACTIVE_STATUS
    }
}

/// Children sharing a class, derived from the flat roster on every load.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassGroup {
    pub id: Option<String>,
    pub label: String,
    pub children: Vec<Child>,
}

impl ClassGroup {
    /// Stable key for accordion state; the unassigned group has no class id.
    pub fn key(&self) -> &str {
        self.id.as_deref().unwrap_or("unassigned")
    }
}
