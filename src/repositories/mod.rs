//! # Repositories Module
//!
//! 데이터 액세스 계층입니다. 자격증명 저장소(`UserStore`)는 trait으로
//! 추상화되어 프로세스 시작 시 MongoDB 구현 또는 개발용 인메모리 구현이
//! 명시적으로 선택·주입됩니다.

pub mod tokens;
pub mod users;

pub use tokens::refresh_token_registry::RefreshTokenRegistry;
pub use users::memory_repo::MemoryUserRepository;
pub use users::user_repo::{MongoUserRepository, ProfileChanges, UserStore};
