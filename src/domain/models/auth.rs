//! 요청별 인증 컨텍스트 모델
//!
//! 미들웨어가 신원 해석을 마친 뒤 request extension에 저장하는 값들과
//! 핸들러에서 이를 꺼내 쓰는 추출자(extractor)를 정의합니다.

use std::future::{ready, Ready};

use actix_web::{Error, FromRequest, HttpMessage, HttpRequest};
use serde::{Deserialize, Serialize};

/// 인증 모드를 정의하는 열거형
#[derive(Debug, Clone, PartialEq)]
pub enum AuthMode {
    /// 인증이 반드시 필요함
    Required,
    /// 인증이 선택사항임 (있으면 검증, 없어도 허용)
    Optional,
}

/// 요청에 적용된 인증 방식
///
/// 세션 쿠키가 유효하면 `Session`이 선택되며 베어러 헤더는 평가되지
/// 않습니다. 요청 단위의 최종 상태이며 요청 간 상태 전이는 없습니다.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMethod {
    /// 서버 사이드 세션 (브라우저 쿠키)
    Session,
    /// JWT 베어러 토큰
    Token,
}

impl AuthMethod {
    /// 상태 응답에 사용하는 문자열 표현
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthMethod::Session => "session",
            AuthMethod::Token => "token",
        }
    }
}

/// 인증 미들웨어가 해석한 사용자 정보
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    /// 사용자 고유 ID
    pub user_id: String,

    /// 적용된 인증 방식
    pub method: AuthMethod,
}

/// ActixWeb FromRequest trait 구현
///
/// 필수 인증 라우트에서 사용합니다. 미들웨어가 사용자 정보를 넣어두지
/// 않았다면 401을 반환합니다.
impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<actix_web::Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        match req.extensions().get::<AuthenticatedUser>() {
            Some(user) => ready(Ok(user.clone())),
            None => ready(Err(actix_web::error::ErrorUnauthorized(
                "인증되지 않은 요청입니다",
            ))),
        }
    }
}

/// 선택적 인증 사용자 추출자
#[derive(Debug, Clone)]
pub struct OptionalUser(pub Option<AuthenticatedUser>);

impl FromRequest for OptionalUser {
    type Error = Error;
    type Future = Ready<actix_web::Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        let user = req.extensions().get::<AuthenticatedUser>().cloned();
        ready(Ok(OptionalUser(user)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_method_as_str() {
        assert_eq!(AuthMethod::Session.as_str(), "session");
        assert_eq!(AuthMethod::Token.as_str(), "token");
    }

    #[test]
    fn test_auth_method_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&AuthMethod::Session).unwrap(),
            "\"session\""
        );
    }
}
