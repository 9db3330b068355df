//! API 라우트 설정 모듈
//!
//! RESTful API 엔드포인트들을 인증 요구 수준별로 그룹화하여 등록합니다.
//!
//! # Auth Middleware Usage
//!
//! 라우트 그룹에 따라 다른 인증 레벨이 적용됩니다:
//!
//! - **필수 인증**: `/profile`, `/logout-all` - 신원 해석 실패 시 요청 거부
//! - **선택 인증**: `/status`, `/logout` - 비인증 상태로도 진행
//! - **공개**: `/register`, `/login`, `/refresh`, OAuth 라우트
//!
//! 동적 `{provider}` 라우트는 구체 경로 라우트들보다 뒤에 등록되어
//! `/status` 같은 고정 경로를 가로채지 않습니다.

use actix_web::web;
use serde_json::json;

use crate::handlers;
use crate::middlewares::AuthMiddleware;

/// 모든 라우트를 설정합니다
///
/// # Examples
///
/// ```rust,ignore
/// use actix_web::{web, App};
///
/// let app = App::new().configure(configure_all_routes);
/// ```
pub fn configure_all_routes(cfg: &mut web::ServiceConfig) {
    // Health check endpoint
    cfg.service(health_check);

    configure_auth_routes(cfg);
}

/// 인증 관련 라우트를 설정합니다
///
/// # Available Routes
///
/// ## 로컬 인증 (공개)
/// - `POST /api/v1/auth/register` - 회원가입
/// - `POST /api/v1/auth/login` - 이메일/비밀번호 로그인
/// - `POST /api/v1/auth/refresh` - 액세스 토큰 갱신
///
/// ## 보호 라우트
/// - `GET /api/v1/auth/profile` - 내 프로필 조회 (필수 인증)
/// - `PUT /api/v1/auth/profile` - 내 프로필 수정 (필수 인증)
/// - `POST /api/v1/auth/logout-all` - 전체 기기 로그아웃 (필수 인증)
///
/// ## 선택 인증 라우트
/// - `GET /api/v1/auth/status` - 인증 상태 확인
/// - `POST /api/v1/auth/logout` - 세션/토큰 로그아웃
///
/// ## OAuth
/// - `GET /api/v1/auth/{provider}` - 프로바이더 인증 페이지로 리다이렉트
/// - `GET /api/v1/auth/{provider}/callback` - 콜백 처리
fn configure_auth_routes(cfg: &mut web::ServiceConfig) {
    // 필수 인증 라우트
    cfg.service(
        web::scope("/api/v1/auth/profile")
            .wrap(AuthMiddleware::required())
            .service(handlers::auth::get_profile)
            .service(handlers::auth::update_profile),
    );

    cfg.service(
        web::scope("/api/v1/auth/logout-all")
            .wrap(AuthMiddleware::required())
            .service(handlers::auth::logout_all),
    );

    // 선택 인증 라우트
    cfg.service(
        web::scope("/api/v1/auth/status")
            .wrap(AuthMiddleware::optional())
            .service(handlers::auth::auth_status),
    );

    cfg.service(
        web::scope("/api/v1/auth/logout")
            .wrap(AuthMiddleware::optional())
            .service(handlers::auth::logout),
    );

    // 공개 라우트 - 동적 {provider} 라우트가 있으므로 마지막에 등록
    cfg.service(
        web::scope("/api/v1/auth")
            .service(handlers::auth::register)
            .service(handlers::auth::login)
            .service(handlers::auth::refresh_token)
            .service(handlers::auth::oauth_redirect)
            .service(handlers::auth::oauth_callback),
    );
}

/// 서비스 상태를 확인하는 헬스체크 엔드포인트
///
/// 로드밸런서나 모니터링 시스템에서 서비스 상태를 확인하는 데 사용됩니다.
///
/// # Examples
///
/// ```bash
/// curl http://localhost:8080/health
/// ```
#[actix_web::get("/health")]
async fn health_check() -> actix_web::HttpResponse {
    actix_web::HttpResponse::Ok().json(json!({
        "status": "healthy",
        "service": "messenger_backend",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
