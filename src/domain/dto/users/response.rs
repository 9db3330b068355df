//! 인증 응답 관련 DTO
//!
//! 엔티티를 클라이언트에 노출 가능한 형태로 변환합니다.
//! 비밀번호 해시와 리프레시 자격증명 목록은 이 계층에 존재하지 않으므로
//! 어떤 응답에도 직렬화될 수 없습니다.

use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};

use crate::config::AuthProvider;
use crate::domain::entities::users::user::User;
use crate::domain::models::token::TokenPair;

/// 사용자 응답 DTO
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub username: String,
    pub display_name: String,
    pub bio: String,
    pub profile_image_url: Option<String>,

    /// 인증 프로바이더 (local, github, google)
    pub auth_provider: AuthProvider,

    /// OAuth 사용자인지 여부 (편의 필드)
    pub is_oauth_user: bool,

    pub is_email_verified: bool,
    pub created_at: DateTime,
    pub updated_at: DateTime,
    pub last_active_at: DateTime,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        let User {
            id,
            email,
            username,
            display_name,
            bio,
            profile_image_url,
            auth_provider,
            is_email_verified,
            created_at,
            updated_at,
            last_active_at,
            ..
        } = user;

        let is_oauth_user = !matches!(auth_provider, AuthProvider::Local);

        Self {
            id: id.map(|id| id.to_hex()).unwrap_or_default(),
            email,
            username,
            display_name,
            bio,
            profile_image_url,
            auth_provider,
            is_oauth_user,
            is_email_verified,
            created_at,
            updated_at,
            last_active_at,
        }
    }
}

/// 인증 성공 응답 DTO (회원가입, 로그인, OAuth 콜백 공통)
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// 액세스 토큰 만료까지 남은 시간 (초)
    pub expires_in: i64,
}

impl AuthResponse {
    /// 사용자와 토큰 쌍으로 응답을 생성합니다.
    pub fn new(user: User, pair: TokenPair) -> Self {
        Self {
            user: UserResponse::from(user),
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: pair.expires_in,
        }
    }
}

/// 토큰 갱신 응답 DTO
///
/// 갱신은 새 액세스 토큰만 발급하며 제시된 리프레시 토큰은
/// 회전하지 않습니다.
#[derive(Debug, Serialize)]
pub struct AccessTokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// 인증 상태 응답 DTO
#[derive(Debug, Serialize)]
pub struct AuthStatusResponse {
    pub authenticated: bool,
    /// 적용된 인증 방식: "session" | "token" | "none"
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_response_strips_credentials() {
        let mut user = User::new_local(
            "alice@example.com".to_string(),
            "alice".to_string(),
            "Alice".to_string(),
            "secret-hash".to_string(),
        );
        user.refresh_tokens.push(crate::domain::RefreshCredential::new(
            "refresh-token".to_string(),
            DateTime::now(),
        ));

        let response = UserResponse::from(user);
        let json = serde_json::to_string(&response).unwrap();

        // 비밀번호 해시와 리프레시 토큰은 직렬화 결과에 나타나지 않는다
        assert!(!json.contains("secret-hash"));
        assert!(!json.contains("refresh-token"));
        assert!(!json.contains("password"));
        assert!(json.contains("alice@example.com"));
    }

    #[test]
    fn test_auth_response_token_type() {
        let user = User::new_local(
            "bob@example.com".to_string(),
            "bob".to_string(),
            "Bob".to_string(),
            "hash".to_string(),
        );
        let pair = TokenPair {
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
            expires_in: 3600,
        };

        let response = AuthResponse::new(user, pair);
        assert_eq!(response.token_type, "Bearer");
        assert_eq!(response.expires_in, 3600);
    }
}
