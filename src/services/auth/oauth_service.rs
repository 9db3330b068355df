//! OAuth 인증 서비스
//!
//! OAuth 2.0 Authorization Code Grant 플로우와 신원 해석을 담당합니다.
//! 프로바이더는 닫힌 `AuthProvider` 열거형으로 선택되며, 각 프로바이더의
//! 엔드포인트와 자격은 환경 변수에서 읽습니다. 설정되지 않은
//! 프로바이더는 501 응답으로 비활성화되고 서버 기동은 막지 않습니다.
//!
//! ## 신원 해석 알고리즘
//!
//! ```text
//! 프로바이더 프로필 수신
//!          │
//!          ▼
//!   외부 식별자로 기존 사용자 조회
//!          │
//!          ├─ 있음 ──────────────► 그대로 반환 (다른 필드 변경 없음)
//!          │
//!          ▼ (없음, 이메일 제공됨)
//!   이메일로 기존 사용자 조회
//!          │
//!          ├─ 있음 ──────────────► 프로바이더 식별자 연동 후 반환
//!          │                        (프로필 이미지는 비어 있을 때만 채움)
//!          ▼ (없음)
//!   새 사용자 생성
//!     - 이메일 local part 기반 고유 핸들 (충돌 시 숫자 접미사)
//!     - 임의 자리표시자 비밀번호 해시 (로그인 불가)
//!     - 프로바이더 검증 이메일이면 is_email_verified = true
//! ```
//!
//! 연동(linking) 이후에는 한 사람이 비밀번호와 OAuth 양쪽으로 로그인할
//! 수 있습니다.

use std::sync::Arc;

use sha2::{Digest, Sha256};

use crate::config::{
    AuthProvider, GitHubOAuthConfig, GoogleOAuthConfig, OAuthProviderSettings, OAuthStateConfig,
};
use crate::domain::entities::users::user::User;
use crate::domain::models::oauth::{
    GitHubUserInfo, GoogleUserInfo, OAuthLoginUrl, OAuthTokenResponse, OAuthUserProfile,
};
use crate::errors::{AppError, AppResult};
use crate::repositories::users::user_repo::UserStore;
use crate::services::auth::password_service::PasswordService;
use crate::utils::string_utils;

/// 핸들 접미사 재시도 한도
const HANDLE_RETRY_LIMIT: u32 = 50;

/// OAuth 인증/신원 해석 서비스
pub struct OAuthService {
    store: Arc<dyn UserStore>,
    passwords: Arc<PasswordService>,
    state_config: OAuthStateConfig,
    http: reqwest::Client,
}

impl OAuthService {
    /// 새 OAuth 서비스를 생성합니다.
    pub fn new(
        store: Arc<dyn UserStore>,
        passwords: Arc<PasswordService>,
        state_config: OAuthStateConfig,
    ) -> Self {
        Self {
            store,
            passwords,
            state_config,
            http: reqwest::Client::new(),
        }
    }

    /// 프로바이더의 환경 설정을 반환합니다.
    ///
    /// # Errors
    ///
    /// * `AppError::ProviderNotConfigured` - client id/secret 미설정
    /// * `AppError::ValidationError` - Local 프로바이더 지정
    pub fn provider_settings(provider: &AuthProvider) -> AppResult<OAuthProviderSettings> {
        let settings = match provider {
            AuthProvider::GitHub => GitHubOAuthConfig::settings(),
            AuthProvider::Google => GoogleOAuthConfig::settings(),
            AuthProvider::Local => {
                return Err(AppError::ValidationError(
                    "local은 OAuth 프로바이더가 아닙니다".to_string(),
                ));
            }
        };

        settings.ok_or_else(|| {
            AppError::ProviderNotConfigured(format!(
                "{} OAuth가 설정되지 않았습니다. {}_CLIENT_ID / {}_CLIENT_SECRET 환경 변수를 설정하세요",
                provider.as_str(),
                provider.as_str().to_uppercase(),
                provider.as_str().to_uppercase(),
            ))
        })
    }

    /// 프로바이더 인증 페이지로의 리다이렉트 URL을 생성합니다.
    pub fn authorize_url(&self, provider: &AuthProvider) -> AppResult<OAuthLoginUrl> {
        let settings = Self::provider_settings(provider)?;
        let state = self.generate_state()?;

        let (auth_uri, scope) = match provider {
            AuthProvider::GitHub => (GitHubOAuthConfig::auth_uri(), "read:user user:email"),
            AuthProvider::Google => (GoogleOAuthConfig::auth_uri(), "openid email profile"),
            AuthProvider::Local => unreachable!("provider_settings에서 걸러짐"),
        };

        let params = [
            ("client_id", settings.client_id.as_str()),
            ("redirect_uri", settings.callback_url.as_str()),
            ("scope", scope),
            ("response_type", "code"),
            ("state", state.as_str()),
        ];

        let query_string = params
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        Ok(OAuthLoginUrl {
            login_url: format!("{}?{}", auth_uri, query_string),
            state,
        })
    }

    /// Authorization Code를 처리하여 사용자 신원을 해석합니다.
    ///
    /// # 처리 단계
    ///
    /// 1. state 매개변수 검증 (CSRF 방지)
    /// 2. 코드를 프로바이더 액세스 토큰으로 교환
    /// 3. 프로필 조회 및 정규화
    /// 4. 신원 해석 (기존 로그인 / 계정 연동 / 신규 생성)
    pub async fn authenticate_with_code(
        &self,
        provider: &AuthProvider,
        code: &str,
        state: &str,
    ) -> AppResult<User> {
        self.verify_state(state)?;

        let settings = Self::provider_settings(provider)?;
        let token_response = self.exchange_code_for_token(provider, &settings, code).await?;
        let profile = self.fetch_profile(provider, &token_response.access_token).await?;

        self.resolve_identity(profile).await
    }

    /// Authorization Code를 프로바이더 액세스 토큰으로 교환합니다.
    async fn exchange_code_for_token(
        &self,
        provider: &AuthProvider,
        settings: &OAuthProviderSettings,
        code: &str,
    ) -> AppResult<OAuthTokenResponse> {
        let token_uri = match provider {
            AuthProvider::GitHub => GitHubOAuthConfig::token_uri(),
            AuthProvider::Google => GoogleOAuthConfig::token_uri(),
            AuthProvider::Local => unreachable!("provider_settings에서 걸러짐"),
        };

        let params = [
            ("code", code),
            ("client_id", settings.client_id.as_str()),
            ("client_secret", settings.client_secret.as_str()),
            ("redirect_uri", settings.callback_url.as_str()),
            ("grant_type", "authorization_code"),
        ];

        let response = self
            .http
            .post(&token_uri)
            // GitHub는 Accept 헤더가 없으면 urlencoded로 응답한다
            .header("Accept", "application/json")
            .form(&params)
            .send()
            .await
            .map_err(|e| {
                AppError::ExternalServiceError(format!(
                    "{} 토큰 요청 실패: {}",
                    provider.as_str(),
                    e
                ))
            })?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalServiceError(format!(
                "{} 토큰 교환 실패: {}",
                provider.as_str(),
                error_text
            )));
        }

        response.json::<OAuthTokenResponse>().await.map_err(|e| {
            AppError::ExternalServiceError(format!(
                "{} 토큰 응답 파싱 실패: {}",
                provider.as_str(),
                e
            ))
        })
    }

    /// 프로바이더 사용자 정보 API를 호출하여 정규화된 프로필을 만듭니다.
    async fn fetch_profile(
        &self,
        provider: &AuthProvider,
        access_token: &str,
    ) -> AppResult<OAuthUserProfile> {
        let user_api_uri = match provider {
            AuthProvider::GitHub => GitHubOAuthConfig::user_api_uri(),
            AuthProvider::Google => GoogleOAuthConfig::user_api_uri(),
            AuthProvider::Local => unreachable!("provider_settings에서 걸러짐"),
        };

        let response = self
            .http
            .get(&user_api_uri)
            .bearer_auth(access_token)
            // GitHub API는 User-Agent 헤더를 요구한다
            .header("User-Agent", "messenger-backend")
            .send()
            .await
            .map_err(|e| {
                AppError::ExternalServiceError(format!(
                    "{} 사용자 정보 요청 실패: {}",
                    provider.as_str(),
                    e
                ))
            })?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalServiceError(format!(
                "{} 사용자 정보 조회 실패: {}",
                provider.as_str(),
                error_text
            )));
        }

        let profile = match provider {
            AuthProvider::GitHub => {
                let info = response.json::<GitHubUserInfo>().await.map_err(|e| {
                    AppError::ExternalServiceError(format!("GitHub 사용자 정보 파싱 실패: {}", e))
                })?;
                OAuthUserProfile::from(info)
            }
            AuthProvider::Google => {
                let info = response.json::<GoogleUserInfo>().await.map_err(|e| {
                    AppError::ExternalServiceError(format!("Google 사용자 정보 파싱 실패: {}", e))
                })?;
                OAuthUserProfile::from(info)
            }
            AuthProvider::Local => unreachable!("provider_settings에서 걸러짐"),
        };

        Ok(profile)
    }

    /// 정규화된 프로필을 로컬 사용자 신원으로 해석합니다.
    ///
    /// 동일한 외부 식별자로 다시 호출하면 같은 사용자가 반환되며
    /// (멱등), 같은 이메일의 기존 계정이 있으면 중복 생성 대신
    /// 연동됩니다.
    pub async fn resolve_identity(&self, profile: OAuthUserProfile) -> AppResult<User> {
        // 1. 외부 식별자 fast path - 가장 흔한 재로그인 경로이며
        //    다른 필드를 변경하지 않는다
        if let Some(existing) = self
            .store
            .find_by_provider_id(&profile.provider, &profile.provider_user_id)
            .await?
        {
            log::info!(
                "{} 사용자 로그인: {}",
                profile.provider.as_str(),
                existing.email
            );
            return Ok(existing);
        }

        let email = string_utils::clean_optional_string(profile.email.clone())
            .map(|e| e.to_lowercase());

        // 2. 이메일이 일치하는 기존 계정에 연동
        if let Some(email) = &email {
            if let Some(existing) = self.store.find_by_email(email).await? {
                let user_id = existing.id_string().ok_or_else(|| {
                    AppError::InternalError("연동 대상 사용자의 ID가 없습니다".to_string())
                })?;

                let fill_profile_image = if existing.profile_image_url.is_none() {
                    profile.profile_image_url.clone()
                } else {
                    None
                };

                let linked = self
                    .store
                    .link_provider(
                        &user_id,
                        &profile.provider,
                        &profile.provider_user_id,
                        fill_profile_image,
                    )
                    .await?
                    .ok_or_else(|| {
                        AppError::InternalError("연동 대상 사용자를 찾을 수 없습니다".to_string())
                    })?;

                log::info!(
                    "기존 계정에 {} 연동됨: {}",
                    profile.provider.as_str(),
                    linked.email
                );
                return Ok(linked);
            }
        }

        // 3. 신규 생성
        log::info!("새 {} 사용자 등록", profile.provider.as_str());
        self.create_oauth_user(profile, email).await
    }

    /// OAuth 프로필로 새 사용자를 생성합니다.
    async fn create_oauth_user(
        &self,
        profile: OAuthUserProfile,
        email: Option<String>,
    ) -> AppResult<User> {
        // 핸들 기본값: 이메일 local part, 없으면 프로바이더 접두 폴백
        let handle_base = email
            .as_deref()
            .and_then(string_utils::email_local_part)
            .map(|local| local.to_string())
            .unwrap_or_else(|| {
                format!("{}_{}", profile.provider.as_str(), profile.provider_user_id)
            });

        let username = self.generate_unique_handle(&handle_base).await?;

        // 프로바이더가 이메일을 주지 않은 경우: 유일성 불변 조건을 지키는
        // 결정적 자리표시자 주소를 저장하고 미인증으로 표시
        let is_email_verified = email.is_some();
        let email = email.unwrap_or_else(|| {
            format!(
                "{}_{}@oauth.invalid",
                profile.provider.as_str(),
                profile.provider_user_id
            )
        });

        let display_name = string_utils::clean_optional_string(profile.display_name.clone())
            .unwrap_or_else(|| username.clone());

        // 자리표시자 비밀번호 - 평문은 버려지므로 로그인에 사용될 수 없다
        let placeholder_hash = self
            .passwords
            .hash(&PasswordService::generate_placeholder())
            .await?;

        let user = User::new_oauth(
            profile.provider,
            profile.provider_user_id,
            email,
            username,
            display_name,
            profile.profile_image_url,
            placeholder_hash,
            is_email_verified,
        );

        self.store.insert(user).await
    }

    /// 중복되지 않는 고유 핸들을 생성합니다.
    ///
    /// 기본 핸들이 사용 중이면 숫자 접미사를 붙여 재시도하며,
    /// 한도를 초과하면 `DuplicateAccount` 에러를 반환합니다.
    async fn generate_unique_handle(&self, base: &str) -> AppResult<String> {
        let base = string_utils::sanitize_handle(base);
        let mut candidate = base.clone();
        let mut counter: u32 = 1;

        loop {
            if self.store.find_by_username(&candidate).await?.is_none() {
                return Ok(candidate);
            }

            if counter > HANDLE_RETRY_LIMIT {
                return Err(AppError::DuplicateAccount(
                    "사용 가능한 사용자명을 생성하지 못했습니다".to_string(),
                ));
            }

            let suffix = format!("_{}", counter);
            candidate = format!(
                "{}{}",
                string_utils::truncate_handle_for_suffix(&base, suffix.len()),
                suffix
            );
            counter += 1;
        }
    }

    /// CSRF 방지용 state 매개변수를 생성합니다.
    ///
    /// 형식: `{타임스탬프}.{sha256(타임스탬프:시크릿)}`
    fn generate_state(&self) -> AppResult<String> {
        let timestamp = chrono::Utc::now().timestamp();
        Ok(format!("{}.{}", timestamp, self.state_signature(timestamp)))
    }

    /// 콜백에서 받은 state 매개변수를 검증합니다.
    ///
    /// # Errors
    ///
    /// * `AppError::AuthenticationFailed` - 형식/서명 불일치 또는 만료
    fn verify_state(&self, state: &str) -> AppResult<()> {
        let invalid =
            || AppError::AuthenticationFailed("유효하지 않은 OAuth state입니다".to_string());

        let (timestamp_str, signature) = state.split_once('.').ok_or_else(invalid)?;
        let timestamp: i64 = timestamp_str.parse().map_err(|_| invalid())?;

        if self.state_signature(timestamp) != signature {
            return Err(invalid());
        }

        let age = chrono::Utc::now().timestamp() - timestamp;
        if !(0..=self.state_config.ttl_secs).contains(&age) {
            return Err(AppError::AuthenticationFailed(
                "만료된 OAuth state입니다".to_string(),
            ));
        }

        Ok(())
    }

    fn state_signature(&self, timestamp: i64) -> String {
        let mut hasher = Sha256::new();
        hasher.update(format!("{}:{}", timestamp, self.state_config.secret).as_bytes());

        hasher
            .finalize()
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect()
    }
}
