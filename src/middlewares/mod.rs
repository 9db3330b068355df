//! 미들웨어 모듈
//!
//! ActixWeb 요청 파이프라인에서 사용되는 미들웨어를 제공합니다.
//!
//! # 제공 미들웨어
//!
//! ### 인증 미들웨어 (AuthMiddleware)
//! - 세션 쿠키 → 베어러 토큰 순서의 고정 우선순위로 신원 해석
//! - 해석된 사용자 정보를 request extension에 저장
//! - 선택적/필수 인증 모드 지원
//! - 인증 성공 시 활동 시각 best-effort 갱신
//!
//! # 사용 방법
//!
//! ```rust,ignore
//! use actix_web::web;
//! use crate::middlewares::AuthMiddleware;
//!
//! cfg.service(
//!     web::scope("/api/v1/auth/profile")
//!         .wrap(AuthMiddleware::required())
//!         .service(handlers::auth::get_profile)
//! );
//! ```

pub mod auth_middleware;
mod auth_inner;

pub use auth_middleware::AuthMiddleware;
