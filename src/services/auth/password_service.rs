//! 비밀번호 해싱 서비스
//!
//! bcrypt 기반 단방향 솔트 해싱과 검증을 제공합니다.
//! bcrypt 연산은 CPU 집약적이므로 `web::block`으로 블로킹 스레드 풀에
//! 위임하여 다른 동시 요청을 지연시키지 않습니다.

use actix_web::web;
use uuid::Uuid;

use crate::config::PasswordConfig;
use crate::errors::{AppError, AppResult};

/// 비밀번호 해싱/검증 서비스
///
/// 해싱 실패는 호출한 연산의 내부 오류로 처리되며, 사용자에게
/// 인증 실패로 표시되지 않습니다.
pub struct PasswordService {
    /// bcrypt cost (환경별 기본값: dev/test 4, staging 10, prod 12)
    cost: u32,
}

impl PasswordService {
    /// 지정된 bcrypt cost로 서비스를 생성합니다.
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// 현재 환경에 맞는 cost로 서비스를 생성합니다.
    pub fn from_env() -> Self {
        Self::new(PasswordConfig::bcrypt_cost())
    }

    /// 평문 비밀번호를 해싱합니다.
    ///
    /// # Errors
    ///
    /// * `AppError::InternalError` - bcrypt 해싱 실패 또는 블로킹 풀 오류
    pub async fn hash(&self, plaintext: &str) -> AppResult<String> {
        let plaintext = plaintext.to_string();
        let cost = self.cost;

        web::block(move || bcrypt::hash(plaintext, cost))
            .await
            .map_err(|e| AppError::InternalError(format!("해싱 작업 실행 실패: {}", e)))?
            .map_err(|e| AppError::InternalError(format!("비밀번호 해싱 실패: {}", e)))
    }

    /// 평문 비밀번호를 해시와 대조합니다.
    ///
    /// bcrypt 내부 비교는 조기 불일치에 대해 상수 시간으로 동작하여
    /// 타이밍 부채널을 방지합니다.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - 비밀번호 일치
    /// * `Ok(false)` - 비밀번호 불일치
    ///
    /// # Errors
    ///
    /// * `AppError::InternalError` - 해시 형식 오류 또는 블로킹 풀 오류
    pub async fn verify(&self, plaintext: &str, digest: &str) -> AppResult<bool> {
        let plaintext = plaintext.to_string();
        let digest = digest.to_string();

        web::block(move || bcrypt::verify(plaintext, &digest))
            .await
            .map_err(|e| AppError::InternalError(format!("검증 작업 실행 실패: {}", e)))?
            .map_err(|e| AppError::InternalError(format!("비밀번호 검증 실패: {}", e)))
    }

    /// OAuth 계정용 자리표시자 비밀번호를 생성합니다.
    ///
    /// 어떤 클라이언트에게도 전달되지 않으므로 이 값으로는
    /// 비밀번호 로그인이 성공할 수 없습니다.
    pub fn generate_placeholder() -> String {
        format!("oauth_user_{}", Uuid::new_v4().simple())
    }
}
