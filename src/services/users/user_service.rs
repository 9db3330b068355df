//! # 사용자 서비스 구현
//!
//! 회원가입, 비밀번호 인증, 프로필 조회/수정 비즈니스 로직을 담당합니다.
//! 비밀번호 해싱은 저장 직전에 이 계층에서 명시적으로 호출되며,
//! 저장소 저장 훅 같은 암묵적 부수효과는 없습니다.

use std::sync::Arc;

use crate::domain::dto::users::request::{RegisterRequest, UpdateProfileRequest};
use crate::domain::entities::users::user::User;
use crate::errors::{AppError, AppResult};
use crate::repositories::users::user_repo::{ProfileChanges, UserStore};
use crate::services::auth::password_service::PasswordService;
use crate::utils::string_utils;

/// 계정 열거 방지를 위한 공통 인증 실패 메시지
///
/// 존재하지 않는 이메일과 잘못된 비밀번호가 동일한 응답을 받아야
/// 공격자가 가입 여부를 구분할 수 없습니다.
const GENERIC_LOGIN_FAILURE: &str = "잘못된 이메일 또는 비밀번호입니다";

/// 사용자 비즈니스 로직 서비스
pub struct UserService {
    store: Arc<dyn UserStore>,
    passwords: Arc<PasswordService>,
}

impl UserService {
    /// 새 사용자 서비스를 생성합니다.
    pub fn new(store: Arc<dyn UserStore>, passwords: Arc<PasswordService>) -> Self {
        Self { store, passwords }
    }

    /// 새 로컬 계정을 생성합니다.
    ///
    /// # 처리 과정
    ///
    /// 1. 이메일 정규화 (소문자 저장)
    /// 2. 비밀번호 해싱 (블로킹 풀에서 bcrypt)
    /// 3. 영구 저장 (유니크 제약은 저장소가 검증)
    ///
    /// # Errors
    ///
    /// * `AppError::DuplicateAccount` - 이메일 또는 사용자명 중복
    /// * `AppError::InternalError` - 비밀번호 해싱 실패
    pub async fn register(&self, request: RegisterRequest) -> AppResult<User> {
        let email = request.email.trim().to_lowercase();
        let username = request.username.trim().to_string();

        let password_hash = self.passwords.hash(&request.password).await?;

        let mut user = User::new_local(email, username, request.display_name, password_hash);
        if let Some(bio) = string_utils::clean_optional_string(request.bio) {
            user.bio = bio;
        }
        user.profile_image_url = string_utils::clean_optional_string(request.profile_image_url);

        let created = self.store.insert(user).await?;

        log::info!("새 사용자 가입: {}", created.email);
        Ok(created)
    }

    /// 이메일/비밀번호로 사용자를 인증합니다.
    ///
    /// 존재하지 않는 이메일, 비밀번호 없는 계정(OAuth 자리표시자 행 포함),
    /// 잘못된 비밀번호 모두 동일한 일반 메시지로 실패하여 계정 열거를
    /// 차단합니다. bcrypt 내부 오류만 내부 에러로 분리됩니다.
    ///
    /// # Errors
    ///
    /// * `AppError::AuthenticationFailed` - 자격 불일치 (메시지 동일)
    /// * `AppError::InternalError` - 해시 검증 자체의 실패
    pub async fn verify_password(&self, email: &str, password: &str) -> AppResult<User> {
        let email = email.trim().to_lowercase();

        let user = self
            .store
            .find_by_email(&email)
            .await?
            .ok_or_else(|| AppError::AuthenticationFailed(GENERIC_LOGIN_FAILURE.to_string()))?;

        let password_hash = user
            .password_hash
            .as_ref()
            .ok_or_else(|| AppError::AuthenticationFailed(GENERIC_LOGIN_FAILURE.to_string()))?;

        let is_valid = self.passwords.verify(password, password_hash).await?;

        if !is_valid {
            return Err(AppError::AuthenticationFailed(
                GENERIC_LOGIN_FAILURE.to_string(),
            ));
        }

        Ok(user)
    }

    /// ID로 사용자를 조회합니다.
    ///
    /// # Errors
    ///
    /// * `AppError::NotFound` - 해당 ID의 사용자가 없음
    pub async fn get_by_id(&self, id: &str) -> AppResult<User> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("사용자를 찾을 수 없습니다".to_string()))
    }

    /// 프로필 표시 필드를 수정합니다.
    ///
    /// # Errors
    ///
    /// * `AppError::ValidationError` - 수정할 필드가 하나도 없음
    /// * `AppError::NotFound` - 해당 ID의 사용자가 없음
    pub async fn update_profile(
        &self,
        id: &str,
        request: UpdateProfileRequest,
    ) -> AppResult<User> {
        let changes = ProfileChanges {
            display_name: string_utils::clean_optional_string(request.display_name),
            bio: request.bio,
            profile_image_url: string_utils::clean_optional_string(request.profile_image_url),
        };

        if changes.is_empty() {
            return Err(AppError::ValidationError(
                "수정할 필드가 없습니다".to_string(),
            ));
        }

        self.store
            .update_profile(id, changes)
            .await?
            .ok_or_else(|| AppError::NotFound("사용자를 찾을 수 없습니다".to_string()))
    }

    /// 마지막 활동 시각을 갱신합니다.
    ///
    /// 인증 성공의 부수효과로 호출되며, 실패해도 요청을 실패시키지
    /// 않도록 호출자가 에러를 로깅만 해야 합니다.
    pub async fn touch_last_active(&self, id: &str) -> AppResult<()> {
        self.store.touch_last_active(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::users::memory_repo::MemoryUserRepository;

    fn service() -> UserService {
        UserService::new(
            Arc::new(MemoryUserRepository::new()),
            Arc::new(PasswordService::new(4)),
        )
    }

    fn register_request(email: &str, username: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: "longenough".to_string(),
            display_name: "테스트 사용자".to_string(),
            bio: None,
            profile_image_url: None,
        }
    }

    #[actix_web::test]
    async fn test_register_hashes_password_and_lowercases_email() {
        let svc = service();

        let user = svc
            .register(register_request("Alice@Example.COM", "alice"))
            .await
            .unwrap();

        assert_eq!(user.email, "alice@example.com");
        assert!(user.id.is_some());

        // 평문이 그대로 저장되지 않는다
        assert_ne!(user.password_hash.as_deref(), Some("longenough"));
    }

    #[actix_web::test]
    async fn test_register_rejects_duplicate_email() {
        let svc = service();

        svc.register(register_request("dup@example.com", "first"))
            .await
            .unwrap();

        let result = svc
            .register(register_request("dup@example.com", "second"))
            .await;

        assert!(matches!(result, Err(AppError::DuplicateAccount(_))));
    }

    #[actix_web::test]
    async fn test_login_succeeds_with_correct_credentials() {
        let svc = service();

        svc.register(register_request("bob@example.com", "bob"))
            .await
            .unwrap();

        let user = svc
            .verify_password("bob@example.com", "longenough")
            .await
            .unwrap();
        assert_eq!(user.username, "bob");

        // 이메일 대소문자는 무시된다
        assert!(svc
            .verify_password("BOB@example.com", "longenough")
            .await
            .is_ok());
    }

    #[actix_web::test]
    async fn test_login_failure_messages_are_identical() {
        let svc = service();

        svc.register(register_request("carol@example.com", "carol"))
            .await
            .unwrap();

        let missing_email = svc
            .verify_password("nobody@example.com", "longenough")
            .await
            .unwrap_err();
        let wrong_password = svc
            .verify_password("carol@example.com", "wrong-password")
            .await
            .unwrap_err();

        // 존재하지 않는 이메일과 잘못된 비밀번호의 에러가 구분 불가능해야 한다
        match (&missing_email, &wrong_password) {
            (AppError::AuthenticationFailed(a), AppError::AuthenticationFailed(b)) => {
                assert_eq!(a, b);
            }
            other => panic!("Expected identical AuthenticationFailed errors, got {:?}", other),
        }
    }

    #[actix_web::test]
    async fn test_update_profile() {
        let svc = service();

        let user = svc
            .register(register_request("dave@example.com", "dave"))
            .await
            .unwrap();
        let id = user.id_string().unwrap();

        let updated = svc
            .update_profile(
                &id,
                UpdateProfileRequest {
                    display_name: Some("Dave K".to_string()),
                    bio: Some("안녕하세요".to_string()),
                    profile_image_url: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.display_name, "Dave K");
        assert_eq!(updated.bio, "안녕하세요");

        // 빈 수정 요청은 거부된다
        let empty = svc
            .update_profile(
                &id,
                UpdateProfileRequest {
                    display_name: None,
                    bio: None,
                    profile_image_url: None,
                },
            )
            .await;
        assert!(matches!(empty, Err(AppError::ValidationError(_))));
    }
}
