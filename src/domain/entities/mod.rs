//! 영속성 엔티티 모듈

pub mod users;

pub use users::user::{RefreshCredential, User};
