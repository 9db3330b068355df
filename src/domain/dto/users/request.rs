//! 인증 요청 관련 DTO
//!
//! 인증 플로우로 들어오는 클라이언트 요청 본문을 매핑합니다.
//! 필드 형식 검증은 이 계층에서, 중복/자격 검증은 서비스 계층에서
//! 수행됩니다.

use serde::Deserialize;
use validator::Validate;

/// 회원가입 요청 구조체
///
/// # JSON 예제
///
/// ```json
/// {
///   "username": "alice",
///   "email": "alice@example.com",
///   "password": "longenough",
///   "display_name": "Alice Kim"
/// }
/// ```
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// 사용자명 (3-30자, 전역 유일)
    #[validate(length(min = 3, max = 30, message = "사용자명은 3자 이상 30자 이하여야 합니다"))]
    pub username: String,

    #[validate(email(message = "유효한 이메일 주소를 입력해주세요"))]
    pub email: String,

    /// 비밀번호 (최소 7자)
    #[validate(length(min = 7, message = "비밀번호는 7자 이상이어야 합니다"))]
    pub password: String,

    #[validate(length(min = 1, max = 50, message = "표시 이름은 1자 이상 50자 이하여야 합니다"))]
    pub display_name: String,

    /// 자기소개 (선택, 최대 200자)
    #[validate(length(max = 200, message = "자기소개는 200자 이하여야 합니다"))]
    pub bio: Option<String>,

    /// 프로필 이미지 URL (선택)
    pub profile_image_url: Option<String>,
}

/// 로컬 로그인 요청 구조체
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "유효한 이메일 주소를 입력해주세요"))]
    pub email: String,

    #[validate(length(min = 1, message = "비밀번호를 입력해주세요"))]
    pub password: String,
}

/// 리프레시 토큰 요청 구조체
#[derive(Debug, Deserialize, Validate)]
pub struct RefreshTokenRequest {
    #[validate(length(min = 1, message = "리프레시 토큰이 필요합니다"))]
    pub refresh_token: String,
}

/// 로그아웃 요청 구조체
///
/// 리프레시 토큰이 제공되면 해당 자격증명만 레지스트리에서 제거됩니다.
/// 세션 로그아웃은 쿠키로 판별되므로 본문이 비어 있을 수 있습니다.
#[derive(Debug, Default, Deserialize)]
pub struct LogoutRequest {
    pub refresh_token: Option<String>,
}

/// 프로필 수정 요청 구조체
///
/// 제공된 필드만 갱신됩니다.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 50, message = "표시 이름은 1자 이상 50자 이하여야 합니다"))]
    pub display_name: Option<String>,

    #[validate(length(max = 200, message = "자기소개는 200자 이하여야 합니다"))]
    pub bio: Option<String>,

    pub profile_image_url: Option<String>,
}

impl UpdateProfileRequest {
    /// 갱신할 필드가 하나라도 있는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.display_name.is_none() && self.bio.is_none() && self.profile_image_url.is_none()
    }
}
