//! # DTO Module
//!
//! HTTP 계층의 요청/응답 전송 객체를 정의하는 모듈입니다.
//! 요청 DTO는 `validator` 기반 검증 규칙을 포함하고,
//! 응답 DTO는 엔티티에서 민감 정보를 제거한 안전한 표현만 노출합니다.

pub mod users;

pub use users::request::*;
pub use users::response::*;
