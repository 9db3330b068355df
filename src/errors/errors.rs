//! 애플리케이션 전역에서 사용하는 에러 시스템
//!
//! 백엔드 서비스를 위한 통합 에러 처리 시스템입니다.
//! `thiserror`와 `actix_web::ResponseError`를 사용하여 타입 안전하고
//! 일관된 에러 처리를 제공합니다.
//!
//! 모든 에러는 요청 경계에서 `{"error": <코드>, "message": <설명>}` 형태의
//! JSON 응답으로 변환됩니다. 토큰 만료(`TokenExpired`)와 토큰 무효
//! (`TokenInvalid`)는 동일한 403 상태를 사용하지만 에러 코드로 구분되어,
//! 클라이언트가 토큰 갱신과 재로그인 중 어느 쪽이 필요한지 판단할 수
//! 있습니다.
//!
//! ## 사용 예제
//!
//! ```rust,ignore
//! use crate::errors::AppError;
//!
//! async fn register(data: RegisterRequest) -> Result<User, AppError> {
//!     if user_store.find_by_email(&data.email).await?.is_some() {
//!         return Err(AppError::DuplicateAccount("이미 사용 중인 이메일입니다".to_string()));
//!     }
//!
//!     // ...
//! }
//! ```

use thiserror::Error;

use crate::config::Environment;

/// 애플리케이션 전역 에러 타입
///
/// 백엔드 서비스에서 발생할 수 있는 모든 종류의 에러를 포괄하는 열거형입니다.
/// 자동으로 HTTP 응답으로 변환되어 클라이언트에게 전달됩니다.
#[derive(Error, Debug)]
pub enum AppError {
    /// 데이터베이스 관련 에러 (500 Internal Server Error)
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// 세션 저장소(Redis) 관련 에러 (500 Internal Server Error)
    #[error("Session store error: {0}")]
    SessionStoreError(String),

    /// 입력값 검증 에러 (400 Bad Request)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 리소스 찾을 수 없음 에러 (404 Not Found)
    #[error("Not found: {0}")]
    NotFound(String),

    /// 계정 중복 에러 (409 Conflict)
    #[error("Duplicate account: {0}")]
    DuplicateAccount(String),

    /// 인증 실패 에러 (401 Unauthorized)
    ///
    /// 잘못된 로그인 정보 또는 인증 자격이 전혀 없는 요청.
    /// 계정 존재 여부가 노출되지 않도록 메시지를 일반화해야 합니다.
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// 토큰 만료 에러 (403 Forbidden)
    ///
    /// 서명은 유효하나 만료 시각이 지난 토큰. 클라이언트는 리프레시
    /// 토큰으로 갱신을 시도해야 합니다.
    #[error("Token expired: {0}")]
    TokenExpired(String),

    /// 토큰 무효 에러 (403 Forbidden)
    ///
    /// 형식 오류, 서명 불일치, 토큰 종류 불일치, 또는 폐기된 리프레시
    /// 토큰. 클라이언트는 재로그인해야 합니다.
    #[error("Invalid token: {0}")]
    TokenInvalid(String),

    /// 권한 부족 에러 (403 Forbidden)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// 필수 설정 누락 에러 (500 Internal Server Error)
    ///
    /// 서명 시크릿 등 필수 환경 변수가 없는 경우. 올바른 배포에서는
    /// 프로세스 시작 시점에 치명적으로 처리되어야 하며, 안전하지 않은
    /// 기본값으로 조용히 대체되지 않습니다.
    #[error("Missing configuration: {0}")]
    ConfigMissing(String),

    /// OAuth 프로바이더 미설정 에러 (501 Not Implemented)
    #[error("Provider not configured: {0}")]
    ProviderNotConfigured(String),

    /// 외부 서비스 에러 (500 Internal Server Error)
    #[error("External service error: {0}")]
    ExternalServiceError(String),

    /// 내부 서버 에러 (500 Internal Server Error)
    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl AppError {
    /// 클라이언트 응답에 포함되는 안정적인 에러 코드
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::DatabaseError(_) => "database_error",
            AppError::SessionStoreError(_) => "session_store_error",
            AppError::ValidationError(_) => "validation_error",
            AppError::NotFound(_) => "not_found",
            AppError::DuplicateAccount(_) => "duplicate_account",
            AppError::AuthenticationFailed(_) => "authentication_failed",
            AppError::TokenExpired(_) => "token_expired",
            AppError::TokenInvalid(_) => "token_invalid",
            AppError::Forbidden(_) => "forbidden",
            AppError::ConfigMissing(_) => "config_missing",
            AppError::ProviderNotConfigured(_) => "provider_not_configured",
            AppError::ExternalServiceError(_) => "external_service_error",
            AppError::InternalError(_) => "internal_error",
        }
    }

    /// 해당 에러의 HTTP 상태 코드
    pub fn status_code(&self) -> actix_web::http::StatusCode {
        use actix_web::http::StatusCode;

        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::DuplicateAccount(_) => StatusCode::CONFLICT,
            AppError::AuthenticationFailed(_) => StatusCode::UNAUTHORIZED,
            AppError::TokenExpired(_) => StatusCode::FORBIDDEN,
            AppError::TokenInvalid(_) => StatusCode::FORBIDDEN,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::ProviderNotConfigured(_) => StatusCode::NOT_IMPLEMENTED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl actix_web::ResponseError for AppError {
    /// HTTP 에러 응답을 생성합니다.
    ///
    /// 각 에러 타입을 적절한 HTTP 상태 코드와 JSON 응답으로 변환합니다.
    /// 프로덕션 환경에서 5xx 에러의 상세 내용은 서버 로그에만 남기고
    /// 클라이언트에는 일반화된 메시지만 전달합니다.
    fn error_response(&self) -> actix_web::HttpResponse {
        let status = self.status_code();

        let message = if status.is_server_error() && Environment::current() == Environment::Production {
            log::error!("서버 에러 발생: {}", self);
            "내부 서버 오류가 발생했습니다".to_string()
        } else {
            self.to_string()
        };

        actix_web::HttpResponse::build(status).json(serde_json::json!({
            "error": self.error_code(),
            "message": message
        }))
    }
}

/// 편의성을 위한 Result 타입 별칭
pub type AppResult<T> = Result<T, AppError>;

/// 외부 라이브러리 에러를 AppError로 변환하는 확장 trait
pub trait ErrorContext<T> {
    /// 컨텍스트 정보와 함께 에러를 변환합니다.
    fn context(self, msg: &str) -> AppResult<T>;

    /// 클로저를 사용하여 지연 평가된 컨텍스트를 제공합니다.
    fn with_context<F>(self, f: F) -> AppResult<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ErrorContext<T> for Result<T, E>
where
    E: std::fmt::Display,
{
    fn context(self, msg: &str) -> AppResult<T> {
        self.map_err(|e| AppError::InternalError(format!("{}: {}", msg, e)))
    }

    fn with_context<F>(self, f: F) -> AppResult<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| AppError::InternalError(format!("{}: {}", f(), e)))
    }
}
