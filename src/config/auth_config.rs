//! # Authentication Configuration Module
//!
//! JWT 토큰, 세션 쿠키, OAuth 프로바이더 등 인증 관련 설정을 관리하는
//! 모듈입니다. 서명 시크릿 같은 필수 설정은 `from_env()` 생성자에서
//! 검증되어 누락 시 `ConfigMissing` 에러를 반환합니다. 프로세스 시작
//! 시점에 한 번 구성되어 `AppState`를 통해 각 컴포넌트에 주입됩니다.
//!
//! ## 환경 변수
//!
//! ### JWT 토큰
//! ```bash
//! export ACCESS_TOKEN_SECRET="your-access-token-secret"     # 필수
//! export REFRESH_TOKEN_SECRET="your-refresh-token-secret"   # 필수, 독립 키
//! export ACCESS_TOKEN_TTL="86400"    # 초 단위, 기본 24시간
//! export REFRESH_TOKEN_TTL="604800"  # 초 단위, 기본 7일
//! ```
//!
//! ### 세션
//! ```bash
//! export SESSION_SECRET="your-session-secret"  # 필수
//! export SESSION_TTL_HOURS="24"
//! ```
//!
//! ### OAuth (프로바이더별, 미설정 시 해당 라우트 비활성화)
//! ```bash
//! export GITHUB_CLIENT_ID="..."
//! export GITHUB_CLIENT_SECRET="..."
//! export GITHUB_CALLBACK_URL="http://localhost:8080/api/v1/auth/github/callback"
//!
//! export GOOGLE_CLIENT_ID="..."
//! export GOOGLE_CLIENT_SECRET="..."
//! export GOOGLE_CALLBACK_URL="http://localhost:8080/api/v1/auth/google/callback"
//!
//! export OAUTH_STATE_SECRET="oauth-state-secret"  # 필수
//! export OAUTH_STATE_TTL_MINUTES="10"
//! ```

use std::env;

use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult};

/// 필수 환경 변수를 읽고 비어 있으면 `ConfigMissing`을 반환합니다.
fn required_secret(name: &str) -> AppResult<String> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(AppError::ConfigMissing(format!(
            "{} 환경 변수가 설정되지 않았습니다",
            name
        ))),
    }
}

/// JWT 토큰 발급/검증 설정
///
/// 액세스 토큰과 리프레시 토큰은 서로 독립된 서명 키를 사용하므로
/// 한쪽 키가 유출되어도 다른 쪽 토큰은 위조할 수 없습니다.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// 액세스 토큰 서명 시크릿
    pub access_secret: String,
    /// 리프레시 토큰 서명 시크릿 (액세스와 독립)
    pub refresh_secret: String,
    /// 액세스 토큰 수명 (초)
    pub access_ttl_secs: i64,
    /// 리프레시 토큰 수명 (초)
    pub refresh_ttl_secs: i64,
}

impl TokenConfig {
    /// 환경 변수에서 토큰 설정을 구성합니다.
    ///
    /// # Errors
    ///
    /// * `AppError::ConfigMissing` - `ACCESS_TOKEN_SECRET` 또는
    ///   `REFRESH_TOKEN_SECRET`이 없거나 비어 있는 경우.
    ///   토큰을 발급하는 배포에서 이 조건은 기동 실패로 이어져야 합니다.
    pub fn from_env() -> AppResult<Self> {
        let access_secret = required_secret("ACCESS_TOKEN_SECRET")?;
        let refresh_secret = required_secret("REFRESH_TOKEN_SECRET")?;

        let access_ttl_secs = env::var("ACCESS_TOKEN_TTL")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(86_400); // 24시간

        let refresh_ttl_secs = env::var("REFRESH_TOKEN_TTL")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(604_800); // 7일

        Ok(Self {
            access_secret,
            refresh_secret,
            access_ttl_secs,
            refresh_ttl_secs,
        })
    }
}

/// 세션 쿠키 설정
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// 세션 식별자 서명 시크릿
    pub secret: String,
    /// 세션 수명 (초)
    pub ttl_secs: u64,
    /// 쿠키 Secure 플래그 (로컬 개발 환경에서만 해제)
    pub secure_cookie: bool,
}

impl SessionConfig {
    /// 세션 쿠키 이름
    pub const COOKIE_NAME: &'static str = "sid";

    /// 환경 변수에서 세션 설정을 구성합니다.
    ///
    /// # Errors
    ///
    /// * `AppError::ConfigMissing` - `SESSION_SECRET`이 없거나 비어 있는 경우
    pub fn from_env() -> AppResult<Self> {
        let secret = required_secret("SESSION_SECRET")?;

        let ttl_hours: u64 = env::var("SESSION_TTL_HOURS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(24);

        Ok(Self {
            secret,
            ttl_secs: ttl_hours * 3600,
            secure_cookie: !super::Environment::current().is_local(),
        })
    }
}

/// OAuth state 매개변수(CSRF 방지) 설정
#[derive(Debug, Clone)]
pub struct OAuthStateConfig {
    /// state 서명 시크릿
    pub secret: String,
    /// state 유효 시간 (초)
    pub ttl_secs: i64,
}

impl OAuthStateConfig {
    /// 환경 변수에서 OAuth state 설정을 구성합니다.
    ///
    /// # Errors
    ///
    /// * `AppError::ConfigMissing` - `OAUTH_STATE_SECRET`이 없거나 비어 있는 경우
    pub fn from_env() -> AppResult<Self> {
        let secret = required_secret("OAUTH_STATE_SECRET")?;

        let ttl_minutes: i64 = env::var("OAUTH_STATE_TTL_MINUTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(10);

        Ok(Self {
            secret,
            ttl_secs: ttl_minutes * 60,
        })
    }
}

/// OAuth 프로바이더 공통 설정
///
/// 프로바이더별 client id / client secret / 콜백 URL을 담습니다.
/// 환경 변수가 설정되지 않은 프로바이더는 `None`으로 비활성화됩니다.
#[derive(Debug, Clone)]
pub struct OAuthProviderSettings {
    pub client_id: String,
    pub client_secret: String,
    pub callback_url: String,
}

impl OAuthProviderSettings {
    /// 프로바이더별 환경 변수 접두사로 설정을 읽습니다.
    ///
    /// client id 와 client secret 이 모두 있어야 활성화됩니다.
    /// 콜백 URL은 로컬 개발 기본값을 제공합니다.
    fn load(prefix: &str, default_callback: &str) -> Option<Self> {
        let client_id = env::var(format!("{}_CLIENT_ID", prefix)).ok()?;
        let client_secret = env::var(format!("{}_CLIENT_SECRET", prefix)).ok()?;

        if client_id.trim().is_empty() || client_secret.trim().is_empty() {
            return None;
        }

        let callback_url = env::var(format!("{}_CALLBACK_URL", prefix))
            .unwrap_or_else(|_| default_callback.to_string());

        Some(Self {
            client_id,
            client_secret,
            callback_url,
        })
    }
}

/// GitHub OAuth 2.0 설정
pub struct GitHubOAuthConfig;

impl GitHubOAuthConfig {
    /// GitHub 프로바이더 설정을 반환합니다. 미설정 시 `None`.
    pub fn settings() -> Option<OAuthProviderSettings> {
        OAuthProviderSettings::load(
            "GITHUB",
            "http://localhost:8080/api/v1/auth/github/callback",
        )
    }

    /// GitHub 인증(Authorization) 엔드포인트
    pub fn auth_uri() -> String {
        env::var("GITHUB_AUTH_URI")
            .unwrap_or_else(|_| "https://github.com/login/oauth/authorize".to_string())
    }

    /// GitHub 토큰 교환 엔드포인트
    pub fn token_uri() -> String {
        env::var("GITHUB_TOKEN_URI")
            .unwrap_or_else(|_| "https://github.com/login/oauth/access_token".to_string())
    }

    /// GitHub 사용자 정보 API 엔드포인트
    pub fn user_api_uri() -> String {
        env::var("GITHUB_USER_API_URI")
            .unwrap_or_else(|_| "https://api.github.com/user".to_string())
    }
}

/// Google OAuth 2.0 설정
pub struct GoogleOAuthConfig;

impl GoogleOAuthConfig {
    /// Google 프로바이더 설정을 반환합니다. 미설정 시 `None`.
    pub fn settings() -> Option<OAuthProviderSettings> {
        OAuthProviderSettings::load(
            "GOOGLE",
            "http://localhost:8080/api/v1/auth/google/callback",
        )
    }

    /// Google 인증(Authorization) 엔드포인트
    pub fn auth_uri() -> String {
        env::var("GOOGLE_AUTH_URI")
            .unwrap_or_else(|_| "https://accounts.google.com/o/oauth2/auth".to_string())
    }

    /// Google 토큰 교환 엔드포인트
    pub fn token_uri() -> String {
        env::var("GOOGLE_TOKEN_URI")
            .unwrap_or_else(|_| "https://oauth2.googleapis.com/token".to_string())
    }

    /// Google 사용자 정보 API 엔드포인트
    pub fn user_api_uri() -> String {
        env::var("GOOGLE_USER_API_URI")
            .unwrap_or_else(|_| "https://www.googleapis.com/oauth2/v2/userinfo".to_string())
    }
}

/// 인증 프로바이더 태그
///
/// 사용자 신원이 어떤 방식으로 생성/인증되었는지 나타내는 닫힌 집합입니다.
/// 런타임 문자열 조회 대신 명시적 열거형 매칭으로 프로바이더를 선택합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthProvider {
    /// 로컬 이메일/패스워드 인증
    Local,
    /// GitHub OAuth 인증
    GitHub,
    /// Google OAuth 2.0 인증
    Google,
}

impl AuthProvider {
    /// 문자열에서 AuthProvider를 생성합니다.
    ///
    /// # Arguments
    ///
    /// * `s` - 인증 프로바이더 이름 (대소문자 무관)
    ///
    /// # Returns
    ///
    /// * `Ok(AuthProvider)` - 유효한 프로바이더인 경우
    /// * `Err(String)` - 지원하지 않는 프로바이더인 경우
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "local" => Ok(AuthProvider::Local),
            "github" => Ok(AuthProvider::GitHub),
            "google" => Ok(AuthProvider::Google),
            _ => Err(format!("Unsupported auth provider: {}", s)),
        }
    }

    /// AuthProvider를 문자열로 변환합니다.
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthProvider::Local => "local",
            AuthProvider::GitHub => "github",
            AuthProvider::Google => "google",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_provider_from_string() {
        assert_eq!(AuthProvider::from_str("local").unwrap(), AuthProvider::Local);
        assert_eq!(AuthProvider::from_str("github").unwrap(), AuthProvider::GitHub);
        assert_eq!(AuthProvider::from_str("google").unwrap(), AuthProvider::Google);

        // 대소문자 무관 테스트
        assert_eq!(AuthProvider::from_str("GOOGLE").unwrap(), AuthProvider::Google);
        assert_eq!(AuthProvider::from_str("GitHub").unwrap(), AuthProvider::GitHub);

        // 지원하지 않는 프로바이더 테스트
        assert!(AuthProvider::from_str("twitter").is_err());
        assert!(AuthProvider::from_str("unknown").is_err());
    }

    #[test]
    fn test_auth_provider_roundtrip() {
        let providers = ["local", "github", "google"];

        for &provider_str in &providers {
            let provider = AuthProvider::from_str(provider_str).unwrap();
            assert_eq!(provider.as_str(), provider_str);
        }
    }

    #[test]
    fn test_auth_provider_serialization() {
        // DB/응답에는 소문자 태그로 저장된다
        let provider = AuthProvider::GitHub;
        let json = serde_json::to_string(&provider).unwrap();
        assert_eq!(json, "\"github\"");

        let deserialized: AuthProvider = serde_json::from_str(&json).unwrap();
        assert_eq!(provider, deserialized);
    }

    #[test]
    fn test_default_oauth_endpoints() {
        assert!(GitHubOAuthConfig::auth_uri().contains("github.com"));
        assert!(GoogleOAuthConfig::token_uri().contains("googleapis.com"));
    }
}
