//! 인증 서비스 모듈
//!
//! 비밀번호 해싱, JWT 토큰 발급/검증, 서버 사이드 세션, OAuth 플로우를
//! 담당하는 서비스들을 제공합니다.

pub mod oauth_service;
pub mod password_service;
pub mod session_service;
pub mod token_service;

pub use oauth_service::OAuthService;
pub use password_service::PasswordService;
pub use session_service::{MemorySessionStore, RedisSessionStore, SessionService, SessionStore};
pub use token_service::TokenService;
