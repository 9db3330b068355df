//! Authentication HTTP Handlers
//!
//! 사용자 인증과 관련된 HTTP 엔드포인트를 처리하는 핸들러 함수들입니다.
//! 로컬 인증(회원가입/로그인)과 OAuth 2.0 인증, 토큰 갱신/폐기,
//! 세션 로그아웃, 프로필 조회/수정을 담당합니다.
//!
//! # Endpoints
//!
//! - `POST /api/v1/auth/register` - 로컬 계정 생성 + 토큰 쌍 발급
//! - `POST /api/v1/auth/login` - 이메일/비밀번호 로그인
//! - `POST /api/v1/auth/refresh` - 리프레시 토큰으로 액세스 토큰 갱신
//! - `POST /api/v1/auth/logout` - 세션 파기 + 제시된 리프레시 토큰 폐기
//! - `POST /api/v1/auth/logout-all` - 모든 리프레시 자격증명 폐기
//! - `GET /api/v1/auth/profile` / `PUT` - 내 프로필 조회/수정
//! - `GET /api/v1/auth/status` - 인증 상태/방식 확인
//! - `GET /api/v1/auth/{provider}` - OAuth 인증 페이지로 리다이렉트
//! - `GET /api/v1/auth/{provider}/callback` - OAuth 콜백 처리

use actix_web::{get, http::header, post, put, web, HttpRequest, HttpResponse};
use serde_json::json;
use validator::Validate;

use crate::config::{AuthProvider, SessionConfig};
use crate::core::state::AppState;
use crate::domain::dto::users::request::{
    LoginRequest, LogoutRequest, RefreshTokenRequest, RegisterRequest, UpdateProfileRequest,
};
use crate::domain::dto::users::response::{
    AccessTokenResponse, AuthResponse, AuthStatusResponse, UserResponse,
};
use crate::domain::entities::users::user::RefreshCredential;
use crate::domain::models::auth::{AuthenticatedUser, OptionalUser};
use crate::domain::models::oauth::OAuthCallbackQuery;
use crate::errors::AppError;
use crate::repositories::users::user_repo::UserStore;

/// 토큰 쌍을 발급하고 리프레시 자격증명을 레지스트리에 기록합니다.
///
/// 토큰 생성이 완전히 끝난 뒤에만 레지스트리에 기록하므로, 생성이
/// 중간에 실패하면 고아 자격증명이 남지 않고 에러만 반환됩니다.
async fn issue_and_record_tokens(
    state: &AppState,
    user_id: &str,
) -> Result<crate::domain::models::token::TokenPair, AppError> {
    let (pair, refresh_expires_at) = state.tokens.issue_token_pair(user_id)?;

    state
        .refresh_tokens
        .append(
            user_id,
            RefreshCredential::new(pair.refresh_token.clone(), refresh_expires_at),
        )
        .await?;

    Ok(pair)
}

/// 회원가입 핸들러
///
/// 로컬 계정을 생성하고 즉시 토큰 쌍을 발급합니다.
///
/// # Endpoint
/// `POST /auth/register`
#[post("/register")]
pub async fn register(
    state: web::Data<AppState>,
    payload: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let user = state.user_service.register(payload.into_inner()).await?;

    let user_id = user
        .id_string()
        .ok_or_else(|| AppError::InternalError("생성된 사용자의 ID가 없습니다".to_string()))?;

    let pair = issue_and_record_tokens(&state, &user_id).await?;

    Ok(HttpResponse::Created().json(AuthResponse::new(user, pair)))
}

/// 로컬 로그인 핸들러
///
/// 이메일과 비밀번호를 검증하고 새 토큰 쌍을 발급합니다.
/// 존재하지 않는 이메일과 잘못된 비밀번호는 동일한 응답을 받습니다.
///
/// # Endpoint
/// `POST /auth/login`
#[post("/login")]
pub async fn login(
    state: web::Data<AppState>,
    payload: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let user = state
        .user_service
        .verify_password(&payload.email, &payload.password)
        .await?;

    let user_id = user
        .id_string()
        .ok_or_else(|| AppError::InternalError("사용자 ID가 없습니다".to_string()))?;

    let pair = issue_and_record_tokens(&state, &user_id).await?;

    // 활동 시각 갱신 실패는 로그인을 실패시키지 않는다
    if let Err(e) = state.user_service.touch_last_active(&user_id).await {
        log::warn!("활동 시각 갱신 실패 (무시됨) - {}: {}", user_id, e);
    }

    log::info!("로컬 로그인 성공: {}", user.email);

    Ok(HttpResponse::Ok().json(AuthResponse::new(user, pair)))
}

/// 토큰 갱신 핸들러
///
/// 리프레시 토큰의 서명/만료/종류를 검증한 뒤 레지스트리 멤버십을
/// 확인합니다. 서명이 유효해도 로그아웃으로 폐기된 토큰은 거부됩니다.
/// 성공 시 새 액세스 토큰만 발급하며 리프레시 토큰은 회전하지 않습니다.
///
/// # Endpoint
/// `POST /auth/refresh`
#[post("/refresh")]
pub async fn refresh_token(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: Option<web::Json<RefreshTokenRequest>>,
) -> Result<HttpResponse, AppError> {
    let rt = extract_refresh_token(&req, body.as_deref())?;

    let claims = state.tokens.verify_refresh_token(&rt)?;

    // 폐기 여부는 레지스트리 멤버십으로 판별된다
    if !state.refresh_tokens.contains(&claims.sub, &rt).await? {
        log::warn!("폐기되었거나 알 수 없는 리프레시 토큰 - 사용자 ID: {}", claims.sub);
        return Err(AppError::TokenInvalid(
            "유효하지 않은 리프레시 토큰입니다".to_string(),
        ));
    }

    // 신원이 여전히 존재하는지 확인
    state
        .users
        .find_by_id(&claims.sub)
        .await?
        .ok_or_else(|| AppError::TokenInvalid("사용자를 찾을 수 없습니다".to_string()))?;

    let access_token = state.tokens.issue_access_token(&claims.sub)?;

    log::info!("토큰 갱신 성공: 사용자 ID {}", claims.sub);

    Ok(HttpResponse::Ok().json(AccessTokenResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: state.tokens.access_ttl_secs(),
    }))
}

/// 로그아웃 핸들러
///
/// 세션 쿠키가 있으면 세션을 파기하고 쿠키를 제거하며, 본문에 리프레시
/// 토큰이 제시되면 해당 자격증명 하나를 레지스트리에서 제거합니다.
/// 멱등 연산이므로 이미 로그아웃된 상태여도 성공으로 응답합니다.
///
/// # Endpoint
/// `POST /auth/logout`
#[post("")]
pub async fn logout(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: Option<web::Json<LogoutRequest>>,
) -> Result<HttpResponse, AppError> {
    let mut session_destroyed = false;

    if let Some(cookie) = req.cookie(SessionConfig::COOKIE_NAME) {
        state.sessions.destroy(cookie.value()).await?;
        session_destroyed = true;
        log::info!("세션 로그아웃 처리됨");
    }

    if let Some(rt) = body.and_then(|b| b.into_inner().refresh_token) {
        // 위조된 토큰으로 다른 사용자의 자격증명을 제거할 수 없도록
        // 서명 검증을 통과한 경우에만 주체를 신뢰한다
        if let Ok(claims) = state.tokens.verify_refresh_token(&rt) {
            state.refresh_tokens.remove_one(&claims.sub, &rt).await?;
        }
    }

    let mut builder = HttpResponse::Ok();
    if session_destroyed {
        builder.cookie(state.sessions.expired_cookie());
    }

    Ok(builder.json(json!({ "message": "로그아웃되었습니다" })))
}

/// 전체 기기 로그아웃 핸들러
///
/// 호출자의 모든 리프레시 자격증명을 폐기합니다. 활성 브라우저 세션은
/// 이 연산으로 종료되지 않으며 별도의 `/logout` 호출이 필요합니다.
///
/// # Endpoint
/// `POST /auth/logout-all`
#[post("")]
pub async fn logout_all(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    state.refresh_tokens.remove_all(&user.user_id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "모든 기기에서 로그아웃되었습니다"
    })))
}

/// 내 프로필 조회 핸들러
///
/// # Endpoint
/// `GET /auth/profile`
#[get("")]
pub async fn get_profile(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let entity = state.user_service.get_by_id(&user.user_id).await?;

    Ok(HttpResponse::Ok().json(UserResponse::from(entity)))
}

/// 내 프로필 수정 핸들러
///
/// # Endpoint
/// `PUT /auth/profile`
#[put("")]
pub async fn update_profile(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    payload: web::Json<UpdateProfileRequest>,
) -> Result<HttpResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let updated = state
        .user_service
        .update_profile(&user.user_id, payload.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(UserResponse::from(updated)))
}

/// 인증 상태 확인 핸들러
///
/// 현재 요청이 어떤 방식으로 인증되었는지 보고합니다.
/// 비인증 요청도 200으로 응답합니다.
///
/// # Endpoint
/// `GET /auth/status`
#[get("")]
pub async fn auth_status(
    state: web::Data<AppState>,
    user: OptionalUser,
) -> Result<HttpResponse, AppError> {
    let response = match user.0 {
        Some(authenticated) => {
            let entity = state.user_service.get_by_id(&authenticated.user_id).await.ok();

            AuthStatusResponse {
                authenticated: true,
                method: authenticated.method.as_str().to_string(),
                user: entity.map(UserResponse::from),
            }
        }
        None => AuthStatusResponse {
            authenticated: false,
            method: "none".to_string(),
            user: None,
        },
    };

    Ok(HttpResponse::Ok().json(response))
}

/// OAuth 인증 시작 핸들러
///
/// 사용자를 프로바이더의 인증 페이지로 리다이렉트합니다.
/// 프로바이더가 설정되지 않았으면 501을 반환합니다.
///
/// # Endpoint
/// `GET /auth/{provider}`
#[get("/{provider}")]
pub async fn oauth_redirect(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let provider = parse_oauth_provider(&path)?;

    let oauth_login = state.oauth.authorize_url(&provider)?;

    log::info!("{} OAuth 인증 시작", provider.as_str());

    Ok(HttpResponse::Found()
        .append_header((header::LOCATION, oauth_login.login_url))
        .finish())
}

/// OAuth 콜백 처리 핸들러
///
/// state 검증, 코드 교환, 프로필 조회, 신원 해석을 수행한 뒤
/// 브라우저 플로우용 세션 쿠키와 API 플로우용 토큰 쌍을 모두 발급합니다.
/// 같은 로그인 이벤트에 두 방식이 공존하는 것이 의도된 동작입니다.
///
/// # Endpoint
/// `GET /auth/{provider}/callback?code={code}&state={state}`
#[get("/{provider}/callback")]
pub async fn oauth_callback(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<OAuthCallbackQuery>,
) -> Result<HttpResponse, AppError> {
    let provider = parse_oauth_provider(&path)?;

    // 사용자가 거부했거나 프로바이더 측 에러
    if let Some(error) = &query.error {
        let error_msg = query
            .error_description
            .as_deref()
            .unwrap_or("OAuth 인증이 취소되었거나 실패했습니다");
        log::warn!("{} OAuth 에러: {} - {}", provider.as_str(), error, error_msg);
        return Err(AppError::AuthenticationFailed(error_msg.to_string()));
    }

    query
        .validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let user = state
        .oauth
        .authenticate_with_code(&provider, &query.code, &query.state)
        .await?;

    let user_id = user
        .id_string()
        .ok_or_else(|| AppError::InternalError("사용자 ID가 없습니다".to_string()))?;

    // 브라우저용 세션과 API용 토큰 쌍을 함께 발급
    let session_cookie_value = state.sessions.establish(&user_id).await?;
    let pair = issue_and_record_tokens(&state, &user_id).await?;

    if let Err(e) = state.user_service.touch_last_active(&user_id).await {
        log::warn!("활동 시각 갱신 실패 (무시됨) - {}: {}", user_id, e);
    }

    log::info!("{} OAuth 로그인 성공: {}", provider.as_str(), user.email);

    let cookie = state.sessions.session_cookie(&session_cookie_value);

    Ok(HttpResponse::Ok()
        .cookie(cookie)
        .json(AuthResponse::new(user, pair)))
}

/// 경로 매개변수를 OAuth 프로바이더 열거형으로 해석합니다.
///
/// `local`은 OAuth 라우트가 아니므로 알 수 없는 이름과 동일하게
/// 404로 처리됩니다.
fn parse_oauth_provider(name: &str) -> Result<AuthProvider, AppError> {
    match AuthProvider::from_str(name) {
        Ok(AuthProvider::Local) | Err(_) => Err(AppError::NotFound(format!(
            "지원하지 않는 인증 프로바이더입니다: {}",
            name
        ))),
        Ok(provider) => Ok(provider),
    }
}

/// HTTP 요청에서 리프레시 토큰 추출
///
/// 쿠키(`refresh_token`)를 먼저 확인하고, 없으면 요청 본문을 확인합니다.
fn extract_refresh_token(
    req: &HttpRequest,
    body: Option<&RefreshTokenRequest>,
) -> Result<String, AppError> {
    if let Some(cookie) = req.cookie("refresh_token") {
        let token = cookie.value().trim();
        if !token.is_empty() {
            return Ok(token.to_string());
        }
    }

    if let Some(body) = body {
        if !body.refresh_token.is_empty() {
            return Ok(body.refresh_token.clone());
        }
    }

    Err(AppError::AuthenticationFailed(
        "리프레시 토큰이 제공되지 않았습니다".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::cookie::Cookie;
    use actix_web::{test, App};
    use serde_json::Value;

    use crate::config::{OAuthStateConfig, SessionConfig, TokenConfig};
    use crate::core::state::AppState;
    use crate::repositories::users::memory_repo::MemoryUserRepository;
    use crate::repositories::users::user_repo::UserStore;
    use crate::routes::configure_all_routes;
    use crate::services::auth::password_service::PasswordService;
    use crate::services::auth::session_service::{MemorySessionStore, SessionStore};

    fn test_state() -> AppState {
        AppState::assemble(
            Arc::new(MemoryUserRepository::new()) as Arc<dyn UserStore>,
            Arc::new(MemorySessionStore::new()) as Arc<dyn SessionStore>,
            TokenConfig {
                access_secret: "access-test-secret".to_string(),
                refresh_secret: "refresh-test-secret".to_string(),
                access_ttl_secs: 3600,
                refresh_ttl_secs: 86_400,
            },
            SessionConfig {
                secret: "session-test-secret".to_string(),
                ttl_secs: 3600,
                secure_cookie: false,
            },
            OAuthStateConfig {
                secret: "state-test-secret".to_string(),
                ttl_secs: 600,
            },
            PasswordService::new(4),
        )
    }

    macro_rules! init_app {
        ($state:expr) => {
            test::init_service(
                App::new()
                    .app_data(actix_web::web::Data::new($state.clone()))
                    .configure(configure_all_routes),
            )
            .await
        };
    }

    fn register_body() -> Value {
        serde_json::json!({
            "username": "alice",
            "email": "a@x.com",
            "password": "longenough",
            "display_name": "Alice"
        })
    }

    #[actix_web::test]
    async fn test_register_login_refresh_logout_scenario() {
        let state = test_state();
        let app = init_app!(state);

        // 회원가입 → 201 + 토큰 쌍
        let req = test::TestRequest::post()
            .uri("/api/v1/auth/register")
            .set_json(register_body())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 201);

        let registered: Value = test::read_body_json(resp).await;
        assert!(registered["access_token"].as_str().is_some());
        let register_refresh = registered["refresh_token"].as_str().unwrap().to_string();

        // 동일 자격으로 로그인 → 200 + 다른 토큰 쌍
        let req = test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(serde_json::json!({ "email": "a@x.com", "password": "longenough" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);

        let logged_in: Value = test::read_body_json(resp).await;
        let login_refresh = logged_in["refresh_token"].as_str().unwrap().to_string();
        assert_ne!(register_refresh, login_refresh);

        // 로그인 리프레시 토큰으로 갱신 → 200 + 새 액세스 토큰, 동일 신원
        let req = test::TestRequest::post()
            .uri("/api/v1/auth/refresh")
            .set_json(serde_json::json!({ "refresh_token": login_refresh }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);

        let refreshed: Value = test::read_body_json(resp).await;
        let new_access = refreshed["access_token"].as_str().unwrap();
        let claims = state.tokens.verify_access_token(new_access).unwrap();
        assert_eq!(claims.sub, registered["user"]["id"].as_str().unwrap());

        // 해당 리프레시 토큰으로 로그아웃
        let req = test::TestRequest::post()
            .uri("/api/v1/auth/logout")
            .set_json(serde_json::json!({ "refresh_token": login_refresh }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);

        // 폐기된 토큰으로 갱신 시도 → 403 token_invalid
        let req = test::TestRequest::post()
            .uri("/api/v1/auth/refresh")
            .set_json(serde_json::json!({ "refresh_token": login_refresh }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 403);

        let error: Value = test::read_body_json(resp).await;
        assert_eq!(error["error"], "token_invalid");

        // 회원가입 때 받은 토큰은 여전히 유효하다 (개별 폐기)
        let req = test::TestRequest::post()
            .uri("/api/v1/auth/refresh")
            .set_json(serde_json::json!({ "refresh_token": register_refresh }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);
    }

    #[actix_web::test]
    async fn test_access_token_cannot_refresh() {
        let state = test_state();
        let app = init_app!(state);

        let req = test::TestRequest::post()
            .uri("/api/v1/auth/register")
            .set_json(register_body())
            .to_request();
        let registered: Value = test::call_and_read_body_json(&app, req).await;
        let access = registered["access_token"].as_str().unwrap();

        // 액세스 토큰을 리프레시 토큰 자리에 제시 → 403
        let req = test::TestRequest::post()
            .uri("/api/v1/auth/refresh")
            .set_json(serde_json::json!({ "refresh_token": access }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 403);
    }

    #[actix_web::test]
    async fn test_logout_all_revokes_every_refresh_token() {
        let state = test_state();
        let app = init_app!(state);

        let req = test::TestRequest::post()
            .uri("/api/v1/auth/register")
            .set_json(register_body())
            .to_request();
        let registered: Value = test::call_and_read_body_json(&app, req).await;
        let first_refresh = registered["refresh_token"].as_str().unwrap().to_string();

        let req = test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(serde_json::json!({ "email": "a@x.com", "password": "longenough" }))
            .to_request();
        let logged_in: Value = test::call_and_read_body_json(&app, req).await;
        let second_refresh = logged_in["refresh_token"].as_str().unwrap().to_string();
        let access = logged_in["access_token"].as_str().unwrap().to_string();

        // 다른 사용자의 자격증명은 유지되어야 한다
        let req = test::TestRequest::post()
            .uri("/api/v1/auth/register")
            .set_json(serde_json::json!({
                "username": "bob",
                "email": "b@x.com",
                "password": "longenough",
                "display_name": "Bob"
            }))
            .to_request();
        let other: Value = test::call_and_read_body_json(&app, req).await;
        let other_refresh = other["refresh_token"].as_str().unwrap().to_string();

        // 전체 로그아웃
        let req = test::TestRequest::post()
            .uri("/api/v1/auth/logout-all")
            .insert_header(("Authorization", format!("Bearer {}", access)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);

        // 해당 사용자의 모든 리프레시 토큰이 거부된다
        for rt in [first_refresh, second_refresh] {
            let req = test::TestRequest::post()
                .uri("/api/v1/auth/refresh")
                .set_json(serde_json::json!({ "refresh_token": rt }))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), 403);
        }

        // 다른 사용자는 영향받지 않는다
        let req = test::TestRequest::post()
            .uri("/api/v1/auth/refresh")
            .set_json(serde_json::json!({ "refresh_token": other_refresh }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);
    }

    #[actix_web::test]
    async fn test_session_takes_priority_over_invalid_bearer() {
        let state = test_state();
        let app = init_app!(state);

        let req = test::TestRequest::post()
            .uri("/api/v1/auth/register")
            .set_json(register_body())
            .to_request();
        let registered: Value = test::call_and_read_body_json(&app, req).await;
        let user_id = registered["user"]["id"].as_str().unwrap();

        let session_cookie = state.sessions.establish(user_id).await.unwrap();

        // 유효한 세션 쿠키 + 쓰레기 베어러 헤더 → 세션이 우선하므로 성공
        let req = test::TestRequest::get()
            .uri("/api/v1/auth/profile")
            .cookie(Cookie::new(SessionConfig::COOKIE_NAME, session_cookie))
            .insert_header(("Authorization", "Bearer not-a-valid-token"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);

        let profile: Value = test::read_body_json(resp).await;
        assert_eq!(profile["username"], "alice");
        // 자격증명 필드는 응답에 존재하지 않는다
        assert!(profile.get("password_hash").is_none());
        assert!(profile.get("refresh_tokens").is_none());
    }

    #[actix_web::test]
    async fn test_profile_requires_authentication() {
        let state = test_state();
        let app = init_app!(state);

        let req = test::TestRequest::get()
            .uri("/api/v1/auth/profile")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401);

        // 유효하지 않은 베어러 토큰은 403 (token_invalid)
        let req = test::TestRequest::get()
            .uri("/api/v1/auth/profile")
            .insert_header(("Authorization", "Bearer garbage"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 403);
    }

    #[actix_web::test]
    async fn test_auth_status_reports_method() {
        let state = test_state();
        let app = init_app!(state);

        // 비인증
        let req = test::TestRequest::get().uri("/api/v1/auth/status").to_request();
        let status: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(status["authenticated"], false);
        assert_eq!(status["method"], "none");

        let req = test::TestRequest::post()
            .uri("/api/v1/auth/register")
            .set_json(register_body())
            .to_request();
        let registered: Value = test::call_and_read_body_json(&app, req).await;
        let access = registered["access_token"].as_str().unwrap();
        let user_id = registered["user"]["id"].as_str().unwrap();

        // 베어러 토큰 인증
        let req = test::TestRequest::get()
            .uri("/api/v1/auth/status")
            .insert_header(("Authorization", format!("Bearer {}", access)))
            .to_request();
        let status: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(status["authenticated"], true);
        assert_eq!(status["method"], "token");

        // 세션 인증이 우선
        let session_cookie = state.sessions.establish(user_id).await.unwrap();
        let req = test::TestRequest::get()
            .uri("/api/v1/auth/status")
            .cookie(Cookie::new(SessionConfig::COOKIE_NAME, session_cookie))
            .insert_header(("Authorization", format!("Bearer {}", access)))
            .to_request();
        let status: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(status["method"], "session");
    }

    #[actix_web::test]
    async fn test_session_logout_clears_cookie() {
        let state = test_state();
        let app = init_app!(state);

        let req = test::TestRequest::post()
            .uri("/api/v1/auth/register")
            .set_json(register_body())
            .to_request();
        let registered: Value = test::call_and_read_body_json(&app, req).await;
        let user_id = registered["user"]["id"].as_str().unwrap();

        let session_cookie = state.sessions.establish(user_id).await.unwrap();

        let req = test::TestRequest::post()
            .uri("/api/v1/auth/logout")
            .cookie(Cookie::new(SessionConfig::COOKIE_NAME, session_cookie.clone()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);

        // 세션이 파기되어 이후 요청은 인증되지 않는다
        let req = test::TestRequest::get()
            .uri("/api/v1/auth/profile")
            .cookie(Cookie::new(SessionConfig::COOKIE_NAME, session_cookie))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401);
    }

    #[actix_web::test]
    async fn test_duplicate_registration_conflict() {
        let state = test_state();
        let app = init_app!(state);

        let req = test::TestRequest::post()
            .uri("/api/v1/auth/register")
            .set_json(register_body())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 201);

        let req = test::TestRequest::post()
            .uri("/api/v1/auth/register")
            .set_json(register_body())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 409);

        let error: Value = test::read_body_json(resp).await;
        assert_eq!(error["error"], "duplicate_account");
    }

    #[actix_web::test]
    async fn test_login_enumeration_resistance() {
        let state = test_state();
        let app = init_app!(state);

        let req = test::TestRequest::post()
            .uri("/api/v1/auth/register")
            .set_json(register_body())
            .to_request();
        test::call_service(&app, req).await;

        // 존재하지 않는 이메일
        let req = test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(serde_json::json!({ "email": "nobody@x.com", "password": "longenough" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401);
        let missing: Value = test::read_body_json(resp).await;

        // 잘못된 비밀번호
        let req = test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(serde_json::json!({ "email": "a@x.com", "password": "wrong-password" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401);
        let wrong: Value = test::read_body_json(resp).await;

        // 두 실패 응답이 완전히 동일해야 계정 열거가 불가능하다
        assert_eq!(missing, wrong);
    }

    #[actix_web::test]
    async fn test_update_profile() {
        let state = test_state();
        let app = init_app!(state);

        let req = test::TestRequest::post()
            .uri("/api/v1/auth/register")
            .set_json(register_body())
            .to_request();
        let registered: Value = test::call_and_read_body_json(&app, req).await;
        let access = registered["access_token"].as_str().unwrap();

        let req = test::TestRequest::put()
            .uri("/api/v1/auth/profile")
            .insert_header(("Authorization", format!("Bearer {}", access)))
            .set_json(serde_json::json!({ "bio": "백엔드 개발자" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);

        let updated: Value = test::read_body_json(resp).await;
        assert_eq!(updated["bio"], "백엔드 개발자");
    }

    #[actix_web::test]
    async fn test_unknown_oauth_provider_is_not_found() {
        let state = test_state();
        let app = init_app!(state);

        let req = test::TestRequest::get()
            .uri("/api/v1/auth/twitter")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 404);

        // local은 OAuth 라우트가 아니다
        let req = test::TestRequest::get().uri("/api/v1/auth/local").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 404);
    }

    #[actix_web::test]
    async fn test_validation_errors_are_bad_request() {
        let state = test_state();
        let app = init_app!(state);

        // 짧은 비밀번호
        let req = test::TestRequest::post()
            .uri("/api/v1/auth/register")
            .set_json(serde_json::json!({
                "username": "alice",
                "email": "a@x.com",
                "password": "short",
                "display_name": "Alice"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
    }
}
