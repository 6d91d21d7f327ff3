use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use creche_attendance::stub::{StubState, router};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

async fn send(state: &StubState, request: Request<Body>) -> (StatusCode, Value) {
    let response = router(state.clone())
        .oneshot(request)
        .await
        .expect("router should answer");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("body should be json")
    };
    (status, body)
}

fn post_presence(token: &str, body: Value) -> Request<Body> {
    Request::post("/api/presences")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_requests_without_token_are_rejected() {
    let state = StubState::demo();
    let (status, body) = send(
        &state,
        Request::get("/api/enfants").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Authentification requise");
}

#[tokio::test]
async fn test_login_validates_credentials() {
    let state = StubState::demo();
    let request = Request::post("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "email": "a@b.fr", "motDePasse": "" }).to_string()))
        .unwrap();

    let (status, body) = send(&state, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Email et mot de passe requis");
}

#[tokio::test]
async fn test_presence_payload_validation() {
    let state = StubState::demo();
    let token = state.issue_token().await;

    let (status, _) = send(
        &state,
        post_presence(
            &token,
            json!({ "date": "2024-05-01", "statut": "PRESENT", "enfantId": "enf-1", "personnelId": "pers-1" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &state,
        post_presence(&token, json!({ "date": "2024-05-01", "statut": "MALADE", "enfantId": "enf-1" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["message"], "Statut invalide : MALADE");

    let (status, body) = send(
        &state,
        post_presence(&token, json!({ "date": "2024-05-01", "statut": "ABSENT", "enfantId": "enf-1" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["statut"], "ABSENT");
    assert_eq!(body["enfantId"], "enf-1");
    assert!(body.get("personnelId").is_none());

    assert_eq!(state.presences().await.len(), 1);
}

#[tokio::test]
async fn test_staff_list_honours_limit() {
    let state = StubState::demo();
    let token = state.issue_token().await;
    let request = Request::get("/api/personnel?limit=1")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(&state, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["total"], 2);
}
