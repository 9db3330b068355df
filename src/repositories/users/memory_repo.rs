//! 인메모리 사용자 저장소
//!
//! `STORE_BACKEND=memory`로 명시적으로 선택되는 개발/테스트 전용
//! 저장소입니다. 프로세스 종료 시 모든 데이터가 소실되며 프로덕션
//! 환경에서는 기동이 거부됩니다. 각 연산은 단일 잠금 구간에서
//! 수행되어 MongoDB 구현의 원자적 배열 연산과 동일한 동시성 계약을
//! 만족합니다.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use mongodb::bson::{oid::ObjectId, DateTime};

use crate::config::AuthProvider;
use crate::domain::entities::users::user::{RefreshCredential, User};
use crate::errors::{AppError, AppResult};

use super::user_repo::{ProfileChanges, UserStore};

/// 인메모리 사용자 저장소
///
/// ID(hex 문자열) → 사용자 엔티티 매핑을 보관합니다.
#[derive(Default)]
pub struct MemoryUserRepository {
    users: RwLock<HashMap<String, User>>,
}

impl MemoryUserRepository {
    /// 빈 저장소를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    fn read_lock(&self) -> AppResult<std::sync::RwLockReadGuard<'_, HashMap<String, User>>> {
        self.users
            .read()
            .map_err(|_| AppError::InternalError("메모리 저장소 잠금 오염".to_string()))
    }

    fn write_lock(&self) -> AppResult<std::sync::RwLockWriteGuard<'_, HashMap<String, User>>> {
        self.users
            .write()
            .map_err(|_| AppError::InternalError("메모리 저장소 잠금 오염".to_string()))
    }
}

#[async_trait]
impl UserStore for MemoryUserRepository {
    async fn insert(&self, mut user: User) -> AppResult<User> {
        let mut users = self.write_lock()?;

        if users.values().any(|u| u.email == user.email) {
            return Err(AppError::DuplicateAccount(
                "이미 사용 중인 이메일입니다".to_string(),
            ));
        }

        if users.values().any(|u| u.username == user.username) {
            return Err(AppError::DuplicateAccount(
                "이미 사용 중인 사용자명입니다".to_string(),
            ));
        }

        let id = ObjectId::new();
        user.id = Some(id);
        users.insert(id.to_hex(), user.clone());

        Ok(user)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<User>> {
        Ok(self.read_lock()?.get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self
            .read_lock()?
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        Ok(self
            .read_lock()?
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_by_provider_id(
        &self,
        provider: &AuthProvider,
        provider_user_id: &str,
    ) -> AppResult<Option<User>> {
        Ok(self
            .read_lock()?
            .values()
            .find(|u| u.provider_id(provider) == Some(provider_user_id))
            .cloned())
    }

    async fn link_provider(
        &self,
        id: &str,
        provider: &AuthProvider,
        provider_user_id: &str,
        fill_profile_image: Option<String>,
    ) -> AppResult<Option<User>> {
        if matches!(provider, AuthProvider::Local) {
            return Err(AppError::ValidationError(
                "로컬 프로바이더는 연동할 수 없습니다".to_string(),
            ));
        }

        let mut users = self.write_lock()?;

        Ok(users.get_mut(id).map(|user| {
            user.set_provider_id(provider, provider_user_id.to_string());
            if let Some(image_url) = fill_profile_image {
                user.profile_image_url = Some(image_url);
            }
            user.updated_at = DateTime::now();
            user.clone()
        }))
    }

    async fn update_profile(&self, id: &str, changes: ProfileChanges) -> AppResult<Option<User>> {
        let mut users = self.write_lock()?;

        Ok(users.get_mut(id).map(|user| {
            if let Some(display_name) = changes.display_name {
                user.display_name = display_name;
            }
            if let Some(bio) = changes.bio {
                user.bio = bio;
            }
            if let Some(image_url) = changes.profile_image_url {
                user.profile_image_url = Some(image_url);
            }
            user.updated_at = DateTime::now();
            user.clone()
        }))
    }

    async fn touch_last_active(&self, id: &str) -> AppResult<()> {
        let mut users = self.write_lock()?;

        if let Some(user) = users.get_mut(id) {
            user.last_active_at = DateTime::now();
        }

        Ok(())
    }

    async fn push_refresh_token(&self, id: &str, credential: RefreshCredential) -> AppResult<()> {
        let mut users = self.write_lock()?;

        if let Some(user) = users.get_mut(id) {
            user.refresh_tokens.push(credential);
        }

        Ok(())
    }

    async fn pull_refresh_token(&self, id: &str, token: &str) -> AppResult<bool> {
        let mut users = self.write_lock()?;

        if let Some(user) = users.get_mut(id) {
            let before = user.refresh_tokens.len();
            user.refresh_tokens.retain(|c| c.token != token);
            return Ok(user.refresh_tokens.len() < before);
        }

        Ok(false)
    }

    async fn clear_refresh_tokens(&self, id: &str) -> AppResult<()> {
        let mut users = self.write_lock()?;

        if let Some(user) = users.get_mut(id) {
            user.refresh_tokens.clear();
        }

        Ok(())
    }

    async fn has_live_refresh_token(&self, id: &str, token: &str) -> AppResult<bool> {
        let users = self.read_lock()?;

        Ok(users
            .get(id)
            .map(|user| {
                user.refresh_tokens
                    .iter()
                    .any(|c| c.token == token && !c.is_expired())
            })
            .unwrap_or(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user(email: &str, username: &str) -> User {
        User::new_local(
            email.to_string(),
            username.to_string(),
            "테스트 사용자".to_string(),
            "hash".to_string(),
        )
    }

    #[actix_web::test]
    async fn test_insert_assigns_id_and_rejects_duplicates() {
        let repo = MemoryUserRepository::new();

        let created = repo
            .insert(sample_user("a@example.com", "alice"))
            .await
            .unwrap();
        assert!(created.id.is_some());

        // 동일 이메일은 거부
        let dup_email = repo.insert(sample_user("a@example.com", "alice2")).await;
        assert!(matches!(dup_email, Err(AppError::DuplicateAccount(_))));

        // 동일 사용자명도 거부
        let dup_username = repo.insert(sample_user("b@example.com", "alice")).await;
        assert!(matches!(dup_username, Err(AppError::DuplicateAccount(_))));
    }

    #[actix_web::test]
    async fn test_find_by_provider_id() {
        let repo = MemoryUserRepository::new();

        let user = User::new_oauth(
            AuthProvider::GitHub,
            "gh-1".to_string(),
            "c@example.com".to_string(),
            "carol".to_string(),
            "Carol".to_string(),
            None,
            "placeholder".to_string(),
            true,
        );
        repo.insert(user).await.unwrap();

        let found = repo
            .find_by_provider_id(&AuthProvider::GitHub, "gh-1")
            .await
            .unwrap();
        assert!(found.is_some());

        let missing = repo
            .find_by_provider_id(&AuthProvider::Google, "gh-1")
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[actix_web::test]
    async fn test_refresh_token_array_operations() {
        let repo = MemoryUserRepository::new();
        let created = repo
            .insert(sample_user("d@example.com", "dave"))
            .await
            .unwrap();
        let id = created.id_string().unwrap();

        let live = RefreshCredential::new(
            "live-token".to_string(),
            DateTime::from_millis(DateTime::now().timestamp_millis() + 60_000),
        );
        let stale = RefreshCredential::new(
            "stale-token".to_string(),
            DateTime::from_millis(DateTime::now().timestamp_millis() - 60_000),
        );

        repo.push_refresh_token(&id, live).await.unwrap();
        repo.push_refresh_token(&id, stale).await.unwrap();

        // 만료되지 않은 토큰만 live 멤버십을 통과한다
        assert!(repo.has_live_refresh_token(&id, "live-token").await.unwrap());
        assert!(!repo.has_live_refresh_token(&id, "stale-token").await.unwrap());

        // 개별 제거
        assert!(repo.pull_refresh_token(&id, "live-token").await.unwrap());
        assert!(!repo.pull_refresh_token(&id, "live-token").await.unwrap());

        // 전체 제거
        repo.clear_refresh_tokens(&id).await.unwrap();
        let user = repo.find_by_id(&id).await.unwrap().unwrap();
        assert!(user.refresh_tokens.is_empty());
    }
}
