//! 캐싱/세션 저장소 계층 모듈
//!
//! Redis를 백엔드로 하는 세션 저장과 TTL 기반 키 관리를 제공합니다.

pub mod redis;
