use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header::AUTHORIZATION};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;
use uuid::Uuid;

use super::StubError;
use super::state::{StubData, StubState};
use crate::api::dto::{LoginResponse, PresenceDto, User, parse_wire_date};
use crate::models::{AttendanceStatus, Child};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginPayload {
    #[serde(default)]
    email: String,
    #[serde(default)]
    mot_de_passe: String,
}

#[derive(Deserialize)]
struct StaffQueryParams {
    limit: Option<usize>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PresenceQueryParams {
    date: Option<String>,
    enfant_id: Option<String>,
    personnel_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PresencePayload {
    date: Option<String>,
    statut: Option<String>,
    enfant_id: Option<String>,
    personnel_id: Option<String>,
    remarques: Option<String>,
}

#[derive(Deserialize)]
struct PresenceUpdatePayload {
    statut: Option<String>,
    remarques: Option<String>,
}

pub fn router(state: StubState) -> Router {
    let api = Router::new()
        .route("/health", get(health))
        .route("/auth/login", post(login))
        .route("/enfants", get(list_children))
        .route("/personnel", get(list_staff))
        .route("/presences", get(list_presences).post(create_presence))
        .route("/presences/{id}", put(update_presence));

    Router::new().nest("/api", api).with_state(state)
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn authorize(state: &StubState, headers: &HeaderMap) -> Result<(), StubError> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(StubError::Unauthorized)?;

    if state.data.read().await.tokens.contains(token) {
        Ok(())
    } else {
        Err(StubError::Unauthorized)
    }
}

fn take_injected_failure(data: &mut StubData) -> Result<(), StubError> {
    data.writes += 1;
    match data.failures.pop_front() {
        Some((status, message)) => Err(StubError::Injected { status, message }),
        None => Ok(()),
    }
}

fn parse_status(raw: Option<&str>) -> Result<AttendanceStatus, StubError> {
    let raw = raw
        .filter(|s| !s.is_empty())
        .ok_or_else(|| StubError::BadRequest("Le statut est requis".to_string()))?;
    AttendanceStatus::from_wire(raw)
        .ok_or_else(|| StubError::Unprocessable(format!("Statut invalide : {}", raw)))
}

async fn login(
    State(state): State<StubState>,
    Json(payload): Json<LoginPayload>,
) -> Result<Json<LoginResponse>, StubError> {
    let email = payload.email.trim().to_string();
    if email.is_empty() || payload.mot_de_passe.is_empty() {
        return Err(StubError::BadRequest(
            "Email et mot de passe requis".to_string(),
        ));
    }

    let token = state.issue_token().await;
    let nom = email.split('@').next().unwrap_or_default().to_string();
    info!("stub login for {}", email);

    Ok(Json(LoginResponse {
        token,
        user: User {
            id: Uuid::new_v4().to_string(),
            nom,
            prenom: String::new(),
            email,
            role: Some("ADMIN".to_string()),
        },
    }))
}

async fn list_children(
    State(state): State<StubState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Child>>, StubError> {
    authorize(&state, &headers).await?;
    let children = state.data.read().await.children.clone();
    Ok(Json(children))
}

async fn list_staff(
    State(state): State<StubState>,
    headers: HeaderMap,
    Query(params): Query<StaffQueryParams>,
) -> Result<Json<Value>, StubError> {
    authorize(&state, &headers).await?;
    let data = state.data.read().await;
    let limit = params.limit.unwrap_or(data.staff.len());
    let staff: Vec<_> = data.staff.iter().take(limit).cloned().collect();
    Ok(Json(json!({ "data": staff, "total": data.staff.len() })))
}

async fn list_presences(
    State(state): State<StubState>,
    headers: HeaderMap,
    Query(params): Query<PresenceQueryParams>,
) -> Result<Json<Vec<PresenceDto>>, StubError> {
    authorize(&state, &headers).await?;
    let date = match params.date.as_deref() {
        Some(raw) => Some(
            parse_wire_date(raw)
                .ok_or_else(|| StubError::Unprocessable("Format de date invalide".to_string()))?,
        ),
        None => None,
    };

    let data = state.data.read().await;
    let presences: Vec<PresenceDto> = data
        .presences
        .iter()
        .filter(|p| date.is_none() || parse_wire_date(&p.date) == date)
        .filter(|p| params.enfant_id.is_none() || p.enfant_id == params.enfant_id)
        .filter(|p| params.personnel_id.is_none() || p.personnel_id == params.personnel_id)
        .cloned()
        .collect();
    Ok(Json(presences))
}

async fn create_presence(
    State(state): State<StubState>,
    headers: HeaderMap,
    Json(payload): Json<PresencePayload>,
) -> Result<(StatusCode, Json<PresenceDto>), StubError> {
    authorize(&state, &headers).await?;
    let mut data = state.data.write().await;
    take_injected_failure(&mut data)?;

    let raw_date = payload
        .date
        .filter(|d| !d.is_empty())
        .ok_or_else(|| StubError::BadRequest("La date est requise".to_string()))?;
    let date = parse_wire_date(&raw_date)
        .ok_or_else(|| StubError::Unprocessable("Format de date invalide".to_string()))?;
    let status = parse_status(payload.statut.as_deref())?;

    let (enfant_id, personnel_id) = match (payload.enfant_id, payload.personnel_id) {
        (Some(child), None) => (Some(child), None),
        (None, Some(staff)) => (None, Some(staff)),
        _ => {
            return Err(StubError::BadRequest(
                "Une présence doit concerner un enfant ou un membre du personnel".to_string(),
            ));
        }
    };

    let duplicate = data.presences.iter().any(|p| {
        parse_wire_date(&p.date) == Some(date)
            && p.enfant_id == enfant_id
            && p.personnel_id == personnel_id
    });
    if duplicate {
        return Err(StubError::Conflict(
            "Une présence existe déjà pour cette personne à cette date".to_string(),
        ));
    }

    let now = Utc::now().to_rfc3339();
    let presence = PresenceDto {
        id: Uuid::new_v4().to_string(),
        date: date.format("%Y-%m-%d").to_string(),
        statut: Some(status),
        enfant_id,
        personnel_id,
        remarques: payload.remarques,
        created_at: Some(now.clone()),
        updated_at: Some(now),
    };
    data.presences.push(presence.clone());
    info!("stub presence {} created ({})", presence.id, status);

    Ok((StatusCode::CREATED, Json(presence)))
}

async fn update_presence(
    State(state): State<StubState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(payload): Json<PresenceUpdatePayload>,
) -> Result<Json<PresenceDto>, StubError> {
    authorize(&state, &headers).await?;
    let mut data = state.data.write().await;
    take_injected_failure(&mut data)?;

    let status = parse_status(payload.statut.as_deref())?;
    let presence = data
        .presences
        .iter_mut()
        .find(|p| p.id == id)
        .ok_or_else(|| StubError::NotFound("Présence introuvable".to_string()))?;

    presence.statut = Some(status);
    if payload.remarques.is_some() {
        presence.remarques = payload.remarques;
    }
    presence.updated_at = Some(Utc::now().to_rfc3339());
    info!("stub presence {} updated ({})", id, status);

    Ok(Json(presence.clone()))
}
