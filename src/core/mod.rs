//! # Core Module
//!
//! 애플리케이션 구성의 핵심을 담당합니다. 전역 싱글톤 레지스트리 대신
//! 프로세스 시작 시점에 모든 컴포넌트를 명시적으로 생성하여
//! [`state::AppState`]로 묶고, actix-web의 `web::Data`를 통해 핸들러와
//! 미들웨어에 주입합니다. 숨겨진 공유 가변 상태가 없으므로 테스트에서
//! 인메모리 구현으로 손쉽게 대체할 수 있습니다.

pub mod state;

pub use state::AppState;
