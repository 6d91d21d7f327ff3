use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use axum::http::StatusCode;
use tokio::sync::RwLock;

use crate::api::dto::PresenceDto;
use crate::models::{ClassRef, Child, StaffMember};

#[derive(Default)]
pub(crate) struct StubData {
    pub(crate) tokens: HashSet<String>,
    pub(crate) children: Vec<Child>,
    pub(crate) staff: Vec<StaffMember>,
    pub(crate) presences: Vec<PresenceDto>,
    pub(crate) failures: VecDeque<(StatusCode, String)>,
    pub(crate) writes: usize,
}

#[derive(Clone, Default)]
pub struct StubState {
    pub(crate) data: Arc<RwLock<StubData>>,
}

impl StubState {
    pub fn new(children: Vec<Child>, staff: Vec<StaffMember>) -> Self {
        Self {
            data: Arc::new(RwLock::new(StubData {
                children,
                staff,
                ..StubData::default()
            })),
        }
    }

    /// A small roster with two classes, one unassigned child and one inactive child.
    pub fn demo() -> Self {
        let petits = ClassRef {
            id: "cl-petits".to_string(),
            nom: "Petits".to_string(),
        };
        let grands = ClassRef {
            id: "cl-grands".to_string(),
            nom: "Grands".to_string(),
        };
        let child = |id: &str, prenom: &str, nom: &str, statut: &str, classe: Option<&ClassRef>| {
            Child {
                id: id.to_string(),
                nom: nom.to_string(),
                prenom: prenom.to_string(),
                statut: statut.to_string(),
                classe_id: classe.map(|c| c.id.clone()),
                classe: classe.cloned(),
            }
        };
        let member = |id: &str, prenom: &str, nom: &str, poste: &str| StaffMember {
            id: id.to_string(),
            nom: nom.to_string(),
            prenom: prenom.to_string(),
            statut: "ACTIF".to_string(),
            poste: Some(poste.to_string()),
        };

        Self::new(
            vec![
                child("enf-1", "Léa", "Martin", "ACTIF", Some(&petits)),
                child("enf-2", "Hugo", "Bernard", "ACTIF", Some(&petits)),
                child("enf-3", "Chloé", "Dubois", "ACTIF", Some(&grands)),
                child("enf-4", "Nina", "Thomas", "ACTIF", None),
                child("enf-5", "Louis", "Robert", "INACTIF", Some(&grands)),
            ],
            vec![
                member("pers-1", "Claire", "Petit", "Éducatrice"),
                member("pers-2", "Marc", "Durand", "Auxiliaire"),
            ],
        )
    }

    /// Issues a bearer token without going through `/auth/login`.
    pub async fn issue_token(&self) -> String {
        let token = uuid::Uuid::new_v4().to_string();
        self.data.write().await.tokens.insert(token.clone());
        token
    }

    pub async fn revoke_tokens(&self) {
        self.data.write().await.tokens.clear();
    }

    /// The next create or update answers `status` with `message` instead.
    pub async fn fail_next_write(&self, status: u16, message: &str) {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        self.data
            .write()
            .await
            .failures
            .push_back((status, message.to_string()));
    }

    pub async fn presences(&self) -> Vec<PresenceDto> {
        self.data.read().await.presences.clone()
    }

    /// Number of create and update calls received, failed ones included.
    pub async fn write_count(&self) -> usize {
        self.data.read().await.writes
    }
}
