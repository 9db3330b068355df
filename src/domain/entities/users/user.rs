//! User Entity Implementation
//!
//! 사용자 엔티티의 핵심 구현체입니다.
//! 로컬 인증과 OAuth 인증을 모두 지원하는 통합된 사용자 모델을 제공하며,
//! 발급된 리프레시 자격증명 목록을 사용자 문서 안에 내장합니다.

use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

use crate::config::AuthProvider;

/// 리프레시 자격증명
///
/// 성공적인 로그인(로컬/OAuth)마다 사용자 문서의 배열에 추가되며,
/// 로그아웃 시 개별 제거, 전체 로그아웃 시 일괄 제거됩니다.
/// 만료된 항목은 정리 전까지 배열에 남아 있을 수 있으므로
/// 멤버십 검사는 반드시 만료 시각도 함께 확인해야 합니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshCredential {
    /// 리프레시 토큰 값 (JWT)
    pub token: String,
    /// 발급 시각
    pub created_at: DateTime,
    /// 절대 만료 시각
    pub expires_at: DateTime,
}

impl RefreshCredential {
    /// 새 리프레시 자격증명을 생성합니다.
    pub fn new(token: String, expires_at: DateTime) -> Self {
        Self {
            token,
            created_at: DateTime::now(),
            expires_at,
        }
    }

    /// 만료 시각이 지났는지 확인합니다.
    pub fn is_expired(&self) -> bool {
        self.expires_at.timestamp_millis() <= DateTime::now().timestamp_millis()
    }
}

/// 사용자 엔티티
///
/// 시스템의 모든 사용자를 표현하는 핵심 도메인 엔티티입니다.
/// 로컬 인증(이메일/패스워드)과 OAuth 인증을 모두 지원하며,
/// 계정 연동 후에는 두 방식 모두로 로그인할 수 있습니다.
///
/// ## 불변 조건
///
/// - 이메일(소문자 저장)과 사용자명은 전역적으로 유일합니다.
/// - Local 사용자는 외부 프로바이더 식별자를 가지지 않습니다.
/// - 연동된 사용자는 비밀번호 해시와 외부 식별자를 동시에 가질 수 있습니다.
/// - OAuth로 생성된 사용자의 비밀번호 해시는 임의 생성된 자리표시자의
///   해시이므로 비밀번호 로그인이 성공할 수 없습니다.
/// - `password_hash`와 `refresh_tokens`는 어떤 응답 DTO에도 포함되지 않습니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// 사용자 이메일 (unique, 소문자)
    pub email: String,
    /// 사용자명 (unique, 3-30자)
    pub username: String,
    /// 표시 이름
    pub display_name: String,
    /// 자기소개 (최대 200자)
    #[serde(default)]
    pub bio: String,
    /// 프로필 이미지 URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_image_url: Option<String>,
    /// 해시된 비밀번호
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
    /// 인증 프로바이더 태그
    pub auth_provider: AuthProvider,
    /// GitHub 사용자 식별자 (연동된 경우)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github_id: Option<String>,
    /// Google 사용자 식별자 (연동된 경우)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_id: Option<String>,
    /// 이메일 인증 여부 (프로바이더 검증 이메일의 OAuth 사용자는 true)
    pub is_email_verified: bool,
    /// 발급된 리프레시 자격증명 목록
    #[serde(default)]
    pub refresh_tokens: Vec<RefreshCredential>,
    /// 생성 시각
    pub created_at: DateTime,
    /// 수정 시각
    pub updated_at: DateTime,
    /// 마지막 활동 시각 (인증된 요청마다 갱신)
    pub last_active_at: DateTime,
}

impl User {
    /// 새 로컬 사용자 생성 (이메일/패스워드)
    pub fn new_local(
        email: String,
        username: String,
        display_name: String,
        password_hash: String,
    ) -> Self {
        let now = DateTime::now();

        Self {
            id: None,
            email,
            username,
            display_name,
            bio: String::new(),
            profile_image_url: None,
            password_hash: Some(password_hash),
            auth_provider: AuthProvider::Local,
            github_id: None,
            google_id: None,
            is_email_verified: false,
            refresh_tokens: Vec::new(),
            created_at: now,
            updated_at: now,
            last_active_at: now,
        }
    }

    /// 새 OAuth 사용자 생성
    ///
    /// `placeholder_hash`는 임의 생성된 자리표시자 비밀번호의 해시입니다.
    /// 어떤 클라이언트도 평문을 알 수 없으므로 비밀번호 로그인은
    /// 항상 실패합니다.
    pub fn new_oauth(
        provider: AuthProvider,
        provider_user_id: String,
        email: String,
        username: String,
        display_name: String,
        profile_image_url: Option<String>,
        placeholder_hash: String,
        is_email_verified: bool,
    ) -> Self {
        let now = DateTime::now();

        let mut user = Self {
            id: None,
            email,
            username,
            display_name,
            bio: String::new(),
            profile_image_url,
            password_hash: Some(placeholder_hash),
            auth_provider: provider.clone(),
            github_id: None,
            google_id: None,
            is_email_verified,
            refresh_tokens: Vec::new(),
            created_at: now,
            updated_at: now,
            last_active_at: now,
        };

        user.set_provider_id(&provider, provider_user_id);
        user
    }

    /// ID 문자열로 변환
    pub fn id_string(&self) -> Option<String> {
        self.id.as_ref().map(|id| id.to_hex())
    }

    /// 로컬 인증 사용자인지 확인
    pub fn is_local_auth(&self) -> bool {
        matches!(self.auth_provider, AuthProvider::Local)
    }

    /// 특정 프로바이더의 외부 식별자를 반환합니다.
    pub fn provider_id(&self, provider: &AuthProvider) -> Option<&str> {
        match provider {
            AuthProvider::GitHub => self.github_id.as_deref(),
            AuthProvider::Google => self.google_id.as_deref(),
            AuthProvider::Local => None,
        }
    }

    /// 특정 프로바이더의 외부 식별자를 설정합니다.
    ///
    /// Local 프로바이더에는 외부 식별자가 존재하지 않으므로 무시됩니다.
    pub fn set_provider_id(&mut self, provider: &AuthProvider, provider_user_id: String) {
        match provider {
            AuthProvider::GitHub => self.github_id = Some(provider_user_id),
            AuthProvider::Google => self.google_id = Some(provider_user_id),
            AuthProvider::Local => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_local_user_has_no_provider_id() {
        let user = User::new_local(
            "alice@example.com".to_string(),
            "alice".to_string(),
            "Alice".to_string(),
            "hashed".to_string(),
        );

        assert!(user.is_local_auth());
        assert!(user.github_id.is_none());
        assert!(user.google_id.is_none());
        assert!(!user.is_email_verified);
        assert!(user.refresh_tokens.is_empty());
    }

    #[test]
    fn test_new_oauth_user_sets_matching_provider_field() {
        let user = User::new_oauth(
            AuthProvider::GitHub,
            "12345".to_string(),
            "bob@example.com".to_string(),
            "bob".to_string(),
            "Bob".to_string(),
            None,
            "placeholder-hash".to_string(),
            true,
        );

        assert_eq!(user.auth_provider, AuthProvider::GitHub);
        assert_eq!(user.github_id.as_deref(), Some("12345"));
        assert!(user.google_id.is_none());
        assert!(user.is_email_verified);
        assert!(user.password_hash.is_some());
    }

    #[test]
    fn test_provider_id_lookup() {
        let mut user = User::new_local(
            "carol@example.com".to_string(),
            "carol".to_string(),
            "Carol".to_string(),
            "hashed".to_string(),
        );

        assert!(user.provider_id(&AuthProvider::GitHub).is_none());

        // 연동 후에는 해당 프로바이더 식별자가 조회된다
        user.set_provider_id(&AuthProvider::Google, "g-999".to_string());
        assert_eq!(user.provider_id(&AuthProvider::Google), Some("g-999"));
        assert!(user.provider_id(&AuthProvider::GitHub).is_none());
    }

    #[test]
    fn test_refresh_credential_expiry() {
        let live = RefreshCredential::new(
            "token-a".to_string(),
            DateTime::from_millis(DateTime::now().timestamp_millis() + 60_000),
        );
        let stale = RefreshCredential::new(
            "token-b".to_string(),
            DateTime::from_millis(DateTime::now().timestamp_millis() - 60_000),
        );

        assert!(!live.is_expired());
        assert!(stale.is_expired());
    }
}
