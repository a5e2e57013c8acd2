use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, TokenResponse},
        services::authenticate,
    },
    error::AppError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new().route("/login", post(login))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, AppError> {
    let Json(payload) = payload?;

    let Some(user) = authenticate(state.users.as_ref(), &payload.username, &payload.password).await?
    else {
        warn!(username = %payload.username, "login rejected");
        return Err(AppError::unauthorized("Invalid credentials"));
    };

    let token = state.jwt.issue(&user)?;
    info!(user_id = %user.id, "user logged in");
    Ok(Json(TokenResponse { token }))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::state::AppState;
    use crate::testing::{body_json, empty_request, json_request, seed, send};

    #[tokio::test]
    async fn valid_credentials_yield_a_usable_token() {
        let state = AppState::fake();
        let user = seed(&state, "shubham@gmail.com", "shubham@123", true, 27).await;

        let res = send(
            &state,
            json_request(
                Method::POST,
                "/login",
                None,
                json!({"username": "shubham@gmail.com", "password": "shubham@123"}),
            ),
        )
        .await;
        assert_eq!(res.status, StatusCode::OK);
        let token = body_json(&res)["token"].as_str().unwrap().to_string();

        let claims = state.jwt.verify(&token).unwrap();
        assert_eq!(claims.sub, "shubham@gmail.com");
        assert_eq!(claims.uid, user.id);

        let res = send(&state, empty_request(Method::GET, "/users", Some(&token))).await;
        assert_eq!(res.status, StatusCode::OK);
    }

    #[tokio::test]
    async fn wrong_password_or_unknown_user_is_unauthorized() {
        let state = AppState::fake();
        seed(&state, "rahul@gmail.com", "rahul@123", false, 30).await;

        for body in [
            json!({"username": "rahul@gmail.com", "password": "wrong"}),
            json!({"username": "RAHUL@gmail.com", "password": "rahul@123"}),
            json!({"username": "nobody@gmail.com", "password": "rahul@123"}),
        ] {
            let res = send(&state, json_request(Method::POST, "/login", None, body)).await;
            assert_eq!(res.status, StatusCode::UNAUTHORIZED);
            assert_eq!(body_json(&res)["error"], "Invalid credentials");
        }
    }

    #[tokio::test]
    async fn malformed_body_is_bad_request() {
        let state = AppState::fake();
        let res = send(
            &state,
            json_request(Method::POST, "/login", None, json!({"username": "rahul@gmail.com"})),
        )
        .await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST);
    }
}
