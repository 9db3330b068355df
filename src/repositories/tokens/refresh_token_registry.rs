//! 리프레시 토큰 레지스트리
//!
//! 사용자별 미결(outstanding) 리프레시 자격증명 집합을 관리합니다.
//! 자가 수용적(self-contained) JWT는 서명과 만료만으로는 폐기 여부를
//! 알 수 없으므로, 리프레시 토큰은 서명/만료 검증에 더해 반드시 이
//! 레지스트리의 멤버십 검사를 통과해야 합니다. 로그아웃으로 제거된
//! 토큰은 서명이 유효해도 거부됩니다.

use std::sync::Arc;

use crate::domain::entities::users::user::RefreshCredential;
use crate::errors::AppResult;
use crate::repositories::users::user_repo::UserStore;

/// 사용자별 리프레시 자격증명 레지스트리
///
/// 모든 변경은 저장소 수준의 원자적 배열 연산으로 위임되므로,
/// 동시 로그아웃/갱신 요청이 교차해도 갱신 유실이나 중복 항목이
/// 발생하지 않습니다.
pub struct RefreshTokenRegistry {
    store: Arc<dyn UserStore>,
}

impl RefreshTokenRegistry {
    /// 새 레지스트리를 생성합니다.
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    /// 자격증명을 추가합니다.
    ///
    /// 토큰 발급이 완료된 뒤에만 호출되어야 합니다. 토큰 생성 실패 시
    /// 레지스트리에 고아 자격증명이 남지 않도록 호출 순서가 보장됩니다.
    pub async fn append(&self, user_id: &str, credential: RefreshCredential) -> AppResult<()> {
        self.store.push_refresh_token(user_id, credential).await?;
        log::debug!("리프레시 자격증명 추가됨 - 사용자 ID: {}", user_id);
        Ok(())
    }

    /// 지정된 토큰 값의 자격증명 하나를 제거합니다. (개별 로그아웃)
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - 자격증명이 제거됨
    /// * `Ok(false)` - 해당 토큰이 레지스트리에 없었음
    pub async fn remove_one(&self, user_id: &str, token: &str) -> AppResult<bool> {
        let removed = self.store.pull_refresh_token(user_id, token).await?;

        if removed {
            log::info!("리프레시 자격증명 제거됨 - 사용자 ID: {}", user_id);
        }

        Ok(removed)
    }

    /// 사용자의 모든 자격증명을 제거합니다. (전체 기기 로그아웃)
    ///
    /// 활성 브라우저 세션은 이 연산으로 종료되지 않으며 별도의 세션
    /// 로그아웃이 필요합니다.
    pub async fn remove_all(&self, user_id: &str) -> AppResult<()> {
        self.store.clear_refresh_tokens(user_id).await?;
        log::info!("모든 리프레시 자격증명 제거됨 - 사용자 ID: {}", user_id);
        Ok(())
    }

    /// 만료되지 않은 자격증명이 레지스트리에 존재하는지 확인합니다.
    ///
    /// 만료된 항목이 정리 전까지 배열에 남아 있을 수 있으므로
    /// 멤버십 검사는 만료 시각을 명시적으로 함께 확인합니다.
    pub async fn contains(&self, user_id: &str, token: &str) -> AppResult<bool> {
        self.store.has_live_refresh_token(user_id, token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::DateTime;

    use crate::domain::entities::users::user::User;
    use crate::repositories::users::memory_repo::MemoryUserRepository;

    async fn registry_with_user() -> (RefreshTokenRegistry, Arc<MemoryUserRepository>, String) {
        let store = Arc::new(MemoryUserRepository::new());
        let user = store
            .insert(User::new_local(
                "user@example.com".to_string(),
                "user".to_string(),
                "User".to_string(),
                "hash".to_string(),
            ))
            .await
            .unwrap();

        let registry = RefreshTokenRegistry::new(store.clone() as Arc<dyn UserStore>);
        (registry, store, user.id_string().unwrap())
    }

    fn live_credential(token: &str) -> RefreshCredential {
        RefreshCredential::new(
            token.to_string(),
            DateTime::from_millis(DateTime::now().timestamp_millis() + 600_000),
        )
    }

    #[actix_web::test]
    async fn test_append_then_contains() {
        let (registry, _, user_id) = registry_with_user().await;

        registry
            .append(&user_id, live_credential("token-1"))
            .await
            .unwrap();

        assert!(registry.contains(&user_id, "token-1").await.unwrap());
        assert!(!registry.contains(&user_id, "token-2").await.unwrap());
    }

    #[actix_web::test]
    async fn test_remove_one_revokes_membership() {
        let (registry, _, user_id) = registry_with_user().await;

        registry
            .append(&user_id, live_credential("token-1"))
            .await
            .unwrap();
        registry
            .append(&user_id, live_credential("token-2"))
            .await
            .unwrap();

        assert!(registry.remove_one(&user_id, "token-1").await.unwrap());

        // 제거된 토큰만 멤버십을 잃는다
        assert!(!registry.contains(&user_id, "token-1").await.unwrap());
        assert!(registry.contains(&user_id, "token-2").await.unwrap());
    }

    #[actix_web::test]
    async fn test_remove_all_clears_only_that_user() {
        let (registry, store, user_id) = registry_with_user().await;

        let other = store
            .insert(User::new_local(
                "other@example.com".to_string(),
                "other".to_string(),
                "Other".to_string(),
                "hash".to_string(),
            ))
            .await
            .unwrap();
        let other_id = other.id_string().unwrap();

        registry
            .append(&user_id, live_credential("mine"))
            .await
            .unwrap();
        registry
            .append(&other_id, live_credential("theirs"))
            .await
            .unwrap();

        registry.remove_all(&user_id).await.unwrap();

        assert!(!registry.contains(&user_id, "mine").await.unwrap());
        // 다른 사용자의 자격증명은 영향받지 않는다
        assert!(registry.contains(&other_id, "theirs").await.unwrap());
    }

    #[actix_web::test]
    async fn test_expired_credential_is_not_contained() {
        let (registry, _, user_id) = registry_with_user().await;

        let expired = RefreshCredential::new(
            "expired-token".to_string(),
            DateTime::from_millis(DateTime::now().timestamp_millis() - 1_000),
        );
        registry.append(&user_id, expired).await.unwrap();

        // 배열에 남아 있어도 만료된 자격증명은 멤버십 검사를 통과하지 못한다
        assert!(!registry.contains(&user_id, "expired-token").await.unwrap());
    }
}
