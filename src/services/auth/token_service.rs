//! JWT 토큰 관리 서비스 구현
//!
//! JSON Web Token 기반의 인증 시스템을 제공합니다.
//! 액세스 토큰과 리프레시 토큰의 생성과 검증을 담당하며, 두 토큰은
//! 서로 독립된 서명 키와 `token_type` 판별자 클레임으로 분리되어
//! 상호 재사용이 불가능합니다.
//!
//! 토큰 검증은 순수 함수이며 저장소 접근 없이 동시 호출이 안전합니다.
//! 단, 리프레시 토큰은 서명/만료 검증만으로는 충분하지 않고 호출자가
//! `RefreshTokenRegistry` 멤버십을 추가로 확인해야 합니다. 서명이
//! 유효해도 로그아웃으로 폐기된 토큰일 수 있기 때문입니다.

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use mongodb::bson::DateTime;

use crate::config::TokenConfig;
use crate::domain::models::token::{TokenClaims, TokenKind, TokenPair};
use crate::errors::{AppError, AppResult};

/// JWT 토큰 관리 서비스
///
/// HMAC-SHA256 서명을 사용하여 액세스 토큰(기본 24시간)과
/// 리프레시 토큰(기본 7일)을 생성하고 검증합니다.
pub struct TokenService {
    config: TokenConfig,
}

impl TokenService {
    /// 주어진 설정으로 서비스를 생성합니다.
    ///
    /// 설정은 `TokenConfig::from_env()`에서 이미 검증되므로
    /// 이후의 토큰 발급/검증에서 시크릿 누락이 발생하지 않습니다.
    pub fn new(config: TokenConfig) -> Self {
        Self { config }
    }

    /// 환경 변수에서 설정을 읽어 서비스를 생성합니다.
    ///
    /// # Errors
    ///
    /// * `AppError::ConfigMissing` - 서명 시크릿 미설정. 토큰을 발급하는
    ///   배포에서는 기동 실패로 이어져야 합니다.
    pub fn from_env() -> AppResult<Self> {
        Ok(Self::new(TokenConfig::from_env()?))
    }

    fn secret_for(&self, kind: TokenKind) -> &str {
        match kind {
            TokenKind::Access => &self.config.access_secret,
            TokenKind::Refresh => &self.config.refresh_secret,
        }
    }

    fn ttl_for(&self, kind: TokenKind) -> i64 {
        match kind {
            TokenKind::Access => self.config.access_ttl_secs,
            TokenKind::Refresh => self.config.refresh_ttl_secs,
        }
    }

    /// 지정된 종류의 토큰을 발급하고 (토큰, 만료 Unix 초)를 반환합니다.
    fn issue(&self, user_id: &str, kind: TokenKind) -> AppResult<(String, i64)> {
        let now = Utc::now().timestamp();
        let exp = now + self.ttl_for(kind);

        let claims = TokenClaims {
            sub: user_id.to_string(),
            // 같은 초에 발급된 토큰끼리도 값이 달라지도록 고유 식별자를 부여
            jti: uuid::Uuid::new_v4().to_string(),
            token_type: kind,
            iat: now,
            exp,
        };

        let encoding_key = EncodingKey::from_secret(self.secret_for(kind).as_bytes());

        let token = encode(&Header::default(), &claims, &encoding_key)
            .map_err(|e| AppError::InternalError(format!("JWT 토큰 생성 실패: {}", e)))?;

        Ok((token, exp))
    }

    /// 지정된 종류로 토큰을 검증하고 클레임을 반환합니다.
    fn verify(&self, token: &str, kind: TokenKind) -> AppResult<TokenClaims> {
        let decoding_key = DecodingKey::from_secret(self.secret_for(kind).as_bytes());
        let validation = Validation::default();

        let claims = decode::<TokenClaims>(token, &decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    AppError::TokenExpired("토큰이 만료되었습니다".to_string())
                }
                _ => AppError::TokenInvalid("유효하지 않은 토큰입니다".to_string()),
            })?;

        // 액세스 토큰을 리프레시로 (또는 반대로) 재사용하는 것을 차단
        if claims.token_type != kind {
            return Err(AppError::TokenInvalid(
                "토큰 종류가 올바르지 않습니다".to_string(),
            ));
        }

        Ok(claims)
    }

    /// 액세스 토큰을 발급합니다.
    ///
    /// # Arguments
    ///
    /// * `user_id` - 토큰 주체가 될 사용자 ID
    pub fn issue_access_token(&self, user_id: &str) -> AppResult<String> {
        let (token, _) = self.issue(user_id, TokenKind::Access)?;
        Ok(token)
    }

    /// 리프레시 토큰을 발급합니다.
    ///
    /// # Returns
    ///
    /// * `Ok((String, DateTime))` - 토큰과 절대 만료 시각.
    ///   만료 시각은 레지스트리에 기록될 자격증명 레코드에 사용됩니다.
    pub fn issue_refresh_token(&self, user_id: &str) -> AppResult<(String, DateTime)> {
        let (token, exp) = self.issue(user_id, TokenKind::Refresh)?;
        Ok((token, DateTime::from_millis(exp * 1000)))
    }

    /// 토큰 쌍(액세스 + 리프레시)을 발급합니다.
    ///
    /// # Returns
    ///
    /// * `Ok((TokenPair, DateTime))` - 토큰 쌍과 리프레시 토큰의 만료 시각
    ///
    /// # Errors
    ///
    /// * `AppError::InternalError` - 토큰 생성 실패. 이 경우 호출자는
    ///   레지스트리에 아무것도 기록하지 않아야 합니다.
    pub fn issue_token_pair(&self, user_id: &str) -> AppResult<(TokenPair, DateTime)> {
        let access_token = self.issue_access_token(user_id)?;
        let (refresh_token, refresh_expires_at) = self.issue_refresh_token(user_id)?;

        let pair = TokenPair {
            access_token,
            refresh_token,
            expires_in: self.config.access_ttl_secs,
        };

        Ok((pair, refresh_expires_at))
    }

    /// 액세스 토큰을 검증하고 클레임을 반환합니다.
    ///
    /// # Errors
    ///
    /// * `AppError::TokenExpired` - 서명은 유효하나 만료됨
    /// * `AppError::TokenInvalid` - 형식/서명 오류 또는 리프레시 토큰 제시
    pub fn verify_access_token(&self, token: &str) -> AppResult<TokenClaims> {
        self.verify(token, TokenKind::Access)
    }

    /// 리프레시 토큰을 검증하고 클레임을 반환합니다.
    ///
    /// 서명/만료/종류 검증만 수행합니다. 폐기 여부는 호출자가
    /// `RefreshTokenRegistry::contains`로 별도 확인해야 합니다.
    pub fn verify_refresh_token(&self, token: &str) -> AppResult<TokenClaims> {
        self.verify(token, TokenKind::Refresh)
    }

    /// 액세스 토큰 수명(초)을 반환합니다.
    pub fn access_ttl_secs(&self) -> i64 {
        self.config.access_ttl_secs
    }

    /// Bearer 토큰에서 실제 토큰 부분 추출
    ///
    /// HTTP Authorization 헤더의 "Bearer {token}" 형식에서 토큰 부분만을
    /// 추출합니다.
    ///
    /// # Errors
    ///
    /// * `AppError::TokenInvalid` - 잘못된 헤더 형식
    pub fn extract_bearer_token(auth_header: &str) -> AppResult<&str> {
        auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::TokenInvalid("유효하지 않은 인증 헤더 형식입니다".to_string())
        })
    }
}
