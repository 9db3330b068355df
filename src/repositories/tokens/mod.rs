//! 리프레시 토큰 레지스트리 모듈

pub mod refresh_token_registry;
