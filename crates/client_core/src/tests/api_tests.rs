use super::*;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use shared::domain::CharacterId;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

#[derive(Clone, Default)]
struct Captured {
    bodies: Arc<Mutex<Vec<Value>>>,
}

fn character_json(id: i64, hope: i32, fear: i32) -> Value {
    json!({
        "id": id,
        "user_id": 42,
        "name": "Aria",
        "class": "ranger",
        "ancestry": "elf",
        "hope": hope,
        "fear": fear,
        "hit_points": 22,
        "current_hit_points": 22,
        "abilities": ["Tracking"],
        "created_at": "2024-05-01T12:00:00.000001",
        "is_active": true
    })
}

async fn spawn_server(app: Router) -> anyhow::Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(format!("http://{addr}/api"))
}

fn client(base_url: &str) -> HttpGameApi {
    HttpGameApi::new(base_url, Duration::from_secs(5)).expect("client")
}

fn create_request() -> CreateCharacterRequest {
    CreateCharacterRequest {
        name: "Aria".to_string(),
        character_class: "ranger".to_string(),
        ancestry: "elf".to_string(),
        user_id: Some(UserId(42)),
    }
}

#[tokio::test]
async fn create_character_posts_form_and_returns_record() -> anyhow::Result<()> {
    let captured = Captured::default();
    let app = Router::new()
        .route(
            "/api/character",
            post(
                |State(captured): State<Captured>, Json(body): Json<Value>| async move {
                    captured.bodies.lock().expect("lock").push(body);
                    Json(json!({
                        "success": true,
                        "message": "created",
                        "character": character_json(9, 5, 3)
                    }))
                },
            ),
        )
        .with_state(captured.clone());
    let base_url = spawn_server(app).await?;

    let character = client(&base_url).create_character(create_request()).await?;

    assert_eq!(character.id, CharacterId(9));
    assert_eq!(character.abilities, vec!["Tracking".to_string()]);
    let bodies = captured.bodies.lock().expect("lock");
    assert_eq!(bodies.len(), 1);
    assert_eq!(bodies[0]["class"], "ranger");
    assert_eq!(bodies[0]["userId"], 42);
    Ok(())
}

#[tokio::test]
async fn unsuccessful_reply_surfaces_server_message_verbatim() -> anyhow::Result<()> {
    let app = Router::new().route(
        "/api/character",
        post(|| async { Json(json!({ "success": false, "message": "Name already taken" })) }),
    );
    let base_url = spawn_server(app).await?;

    let err = client(&base_url)
        .create_character(create_request())
        .await
        .expect_err("rejected");

    assert!(matches!(err, ApiFailure::Rejected { .. }));
    assert_eq!(err.to_string(), "Name already taken");
    assert_eq!(err.code(), ErrorCode::Rejected);
    Ok(())
}

#[tokio::test]
async fn non_success_status_maps_to_http_failure_with_detail() -> anyhow::Result<()> {
    let app = Router::new().route(
        "/api/game/roll-dice",
        post(|| async {
            (
                StatusCode::NOT_FOUND,
                Json(json!({ "detail": "Character not found" })),
            )
        }),
    );
    let base_url = spawn_server(app).await?;

    let err = client(&base_url)
        .roll_dice(RollDiceRequest::general(CharacterId(1), Some(UserId(42)), 12))
        .await
        .expect_err("404");

    match &err {
        ApiFailure::Http { status, detail } => {
            assert_eq!(*status, 404);
            assert_eq!(detail.as_deref(), Some("Character not found"));
        }
        other => panic!("unexpected failure: {other:?}"),
    }
    assert_eq!(err.to_api_error().code, ErrorCode::NotFound);
    assert!(err.to_string().contains("HTTP 404"));
    Ok(())
}

#[tokio::test]
async fn start_session_and_roll_dice_return_turn_outcomes() -> anyhow::Result<()> {
    let captured = Captured::default();
    let app = Router::new()
        .route(
            "/api/game/start",
            post(|| async {
                Json(json!({
                    "success": true,
                    "narrative": "Your journey begins.",
                    "character": character_json(9, 5, 3),
                    "game_state": { "id": 1, "user_id": 42, "character_id": 9, "is_active": true }
                }))
            }),
        )
        .route(
            "/api/game/roll-dice",
            post(
                |State(captured): State<Captured>, Json(body): Json<Value>| async move {
                    captured.bodies.lock().expect("lock").push(body);
                    Json(json!({
                        "success": true,
                        "narrative": "A fine roll!",
                        "character": character_json(9, 6, 3)
                    }))
                },
            ),
        )
        .with_state(captured.clone());
    let base_url = spawn_server(app).await?;
    let api = client(&base_url);

    let started = api
        .start_session(GameSessionRequest {
            character_id: CharacterId(9),
            user_id: Some(UserId(42)),
        })
        .await?;
    assert_eq!(started.narrative.as_deref(), Some("Your journey begins."));

    let rolled = api
        .roll_dice(RollDiceRequest::general(CharacterId(9), Some(UserId(42)), 14))
        .await?;
    assert_eq!(rolled.character.map(|character| character.hope), Some(6));

    let bodies = captured.bodies.lock().expect("lock");
    assert_eq!(bodies[0]["characterId"], 9);
    assert_eq!(bodies[0]["actionType"], "general");
    assert_eq!(bodies[0]["difficulty"], 14);
    Ok(())
}

#[tokio::test]
async fn fetch_character_treats_unsuccessful_reply_as_absent() -> anyhow::Result<()> {
    let app = Router::new().route(
        "/api/character/:user_id",
        get(|Path(user_id): Path<i64>| async move {
            if user_id == 42 {
                Json(json!({ "success": true, "character": character_json(3, 4, 4) }))
            } else {
                Json(json!({ "success": false, "message": "not found" }))
            }
        }),
    );
    let base_url = spawn_server(app).await?;
    let api = client(&base_url);

    let found = api.fetch_character(UserId(42)).await?;
    assert_eq!(found.map(|character| character.id), Some(CharacterId(3)));
    assert!(api.fetch_character(UserId(7)).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn unreachable_server_is_a_transport_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let err = client(&format!("http://{addr}/api"))
        .create_character(create_request())
        .await
        .expect_err("connection refused");

    assert!(matches!(err, ApiFailure::Transport(_)));
    assert_eq!(err.code(), ErrorCode::Transport);
}

#[tokio::test]
async fn slow_server_hits_the_configured_timeout() -> anyhow::Result<()> {
    let app = Router::new().route(
        "/api/game/roll-dice",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(2)).await;
            Json(json!({ "success": true }))
        }),
    );
    let base_url = spawn_server(app).await?;
    let api = HttpGameApi::new(&base_url, Duration::from_millis(50))?;

    let err = api
        .roll_dice(RollDiceRequest::general(CharacterId(9), None, 12))
        .await
        .expect_err("request should time out");

    assert!(matches!(err, ApiFailure::Transport(_)));
    assert_eq!(err.code(), ErrorCode::Transport);
    Ok(())
}

#[test]
fn rejects_non_http_base_url() {
    assert!(HttpGameApi::new("ftp://example.com/api", Duration::from_secs(1)).is_err());
    assert!(HttpGameApi::new("not a url", Duration::from_secs(1)).is_err());

    let api = client("http://localhost:8000/api/");
    assert_eq!(api.base_url(), "http://localhost:8000/api");
    assert_eq!(
        api.endpoint("/game/start"),
        "http://localhost:8000/api/game/start"
    );
}
