//! # Services Module
//!
//! 비즈니스 로직 계층입니다. 각 서비스는 프로세스 시작 시 명시적으로
//! 생성되어 `AppState`를 통해 핸들러와 미들웨어에 주입됩니다.

pub mod auth;
pub mod users;
