//! JWT 토큰 클레임 및 토큰 쌍 구조체
//!
//! RFC 7519 표준 클레임과 토큰 종류 판별자를 포함합니다.
//! 개인정보 보호를 위해 사용자 ID 외의 정보는 담지 않습니다.

use serde::{Deserialize, Serialize};

/// 토큰 종류 판별자
///
/// 액세스 토큰이 리프레시 토큰으로 재사용되는 것(또는 그 반대)을
/// 막기 위해 클레임에 포함됩니다. 검증 시 기대하는 종류와 일치하지
/// 않으면 토큰 무효로 처리됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// API 접근용 단기 토큰
    Access,
    /// 액세스 토큰 갱신용 장기 토큰
    Refresh,
}

/// JWT 토큰의 클레임(Payload) 구조체
///
/// ## 클레임 구성
///
/// - `sub`: 토큰의 주체 (사용자 ID)
/// - `jti`: 토큰 고유 식별자. 같은 초에 발급된 토큰도 서로 다른 값을
///   가지므로 리프레시 자격증명의 개별 폐기가 정확히 동작합니다.
/// - `token_type`: 토큰 종류 판별자 (access / refresh)
/// - `iat`: 토큰 발급 시간 (Unix timestamp)
/// - `exp`: 토큰 만료 시간 (Unix timestamp)
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenClaims {
    /// 토큰의 주체 (사용자 ID)
    pub sub: String,
    /// 토큰 고유 식별자
    pub jti: String,
    /// 토큰 종류 판별자
    pub token_type: TokenKind,
    /// 토큰 발급 시간 (Unix timestamp)
    pub iat: i64,
    /// 토큰 만료 시간 (Unix timestamp)
    pub exp: i64,
}

/// JWT 토큰 쌍 구조체
///
/// 로그인 성공 시 클라이언트에게 전달되는 토큰 집합입니다.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenPair {
    /// 액세스 토큰 (API 접근용 단기 토큰)
    pub access_token: String,
    /// 리프레시 토큰 (토큰 갱신용 장기 토큰)
    pub refresh_token: String,
    /// 액세스 토큰 만료 시간 (초)
    pub expires_in: i64,
}
