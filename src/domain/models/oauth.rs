//! OAuth 관련 값 모델
//!
//! 프로바이더별 와이어 페이로드와, 프로바이더 차이를 흡수한 정규화
//! 프로필을 정의합니다. 신원 해석 로직은 정규화 프로필만 다루므로
//! 프로바이더 추가 시에도 해석 알고리즘은 변하지 않습니다.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::config::AuthProvider;

/// 정규화된 OAuth 사용자 프로필
///
/// 프로바이더 콜백에서 받은 프로필 페이로드를 공통 형태로 변환한
/// 것입니다. 이메일이 없는 프로필도 신원 해석을 중단시키지 않습니다.
#[derive(Debug, Clone)]
pub struct OAuthUserProfile {
    /// 프로바이더 태그
    pub provider: AuthProvider,
    /// 프로바이더가 발급한 사용자 고유 식별자
    pub provider_user_id: String,
    /// 프로바이더 검증 이메일 (없을 수 있음)
    pub email: Option<String>,
    /// 표시 이름 (없을 수 있음)
    pub display_name: Option<String>,
    /// 프로필 이미지 URL (없을 수 있음)
    pub profile_image_url: Option<String>,
}

/// OAuth 콜백 쿼리 파라미터 구조체
#[derive(Debug, Deserialize, Validate)]
pub struct OAuthCallbackQuery {
    #[validate(length(min = 1, message = "Authorization code가 필요합니다"))]
    pub code: String,

    #[validate(length(min = 1, message = "State가 필요합니다"))]
    pub state: String,

    /// 에러가 있을 경우 (사용자가 거부했거나 에러 발생)
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// OAuth 로그인 리다이렉트 정보
#[derive(Debug, Serialize)]
pub struct OAuthLoginUrl {
    pub login_url: String,
    pub state: String,
}

/// 프로바이더 토큰 교환 응답 (GitHub/Google 공통 필드)
#[derive(Debug, Deserialize)]
pub struct OAuthTokenResponse {
    pub access_token: String,
    pub token_type: Option<String>,
    pub scope: Option<String>,
}

/// GitHub 사용자 정보 API 응답
///
/// `GET https://api.github.com/user` 응답 중 사용하는 필드만 매핑합니다.
/// 이메일 비공개 설정 사용자의 `email`은 null 입니다.
#[derive(Debug, Deserialize)]
pub struct GitHubUserInfo {
    pub id: u64,
    pub login: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
}

impl From<GitHubUserInfo> for OAuthUserProfile {
    fn from(info: GitHubUserInfo) -> Self {
        Self {
            provider: AuthProvider::GitHub,
            provider_user_id: info.id.to_string(),
            email: info.email,
            display_name: info.name.or(Some(info.login)),
            profile_image_url: info.avatar_url,
        }
    }
}

/// Google UserInfo API 응답
///
/// `GET https://www.googleapis.com/oauth2/v2/userinfo` 응답 매핑입니다.
#[derive(Debug, Deserialize)]
pub struct GoogleUserInfo {
    pub id: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub picture: Option<String>,
    #[serde(default)]
    pub verified_email: bool,
}

impl From<GoogleUserInfo> for OAuthUserProfile {
    fn from(info: GoogleUserInfo) -> Self {
        Self {
            provider: AuthProvider::Google,
            provider_user_id: info.id,
            email: info.email,
            display_name: info.name,
            profile_image_url: info.picture,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_github_profile_normalization() {
        let info = GitHubUserInfo {
            id: 583231,
            login: "octocat".to_string(),
            name: None,
            email: Some("octocat@github.com".to_string()),
            avatar_url: Some("https://avatars.githubusercontent.com/u/583231".to_string()),
        };

        let profile = OAuthUserProfile::from(info);

        assert_eq!(profile.provider, AuthProvider::GitHub);
        assert_eq!(profile.provider_user_id, "583231");
        // name이 없으면 login이 표시 이름으로 사용된다
        assert_eq!(profile.display_name.as_deref(), Some("octocat"));
    }

    #[test]
    fn test_google_profile_without_email() {
        let json = r#"{"id": "g-123", "name": "Lee"}"#;
        let info: GoogleUserInfo = serde_json::from_str(json).unwrap();
        let profile = OAuthUserProfile::from(info);

        assert_eq!(profile.provider, AuthProvider::Google);
        assert!(profile.email.is_none());
        assert_eq!(profile.display_name.as_deref(), Some("Lee"));
    }

    #[test]
    fn test_callback_query_validation() {
        let empty_code = OAuthCallbackQuery {
            code: String::new(),
            state: "abc".to_string(),
            error: None,
            error_description: None,
        };
        assert!(empty_code.validate().is_err());
    }
}
