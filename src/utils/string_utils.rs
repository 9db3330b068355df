//! 문자열 처리 유틸리티
//!
//! 사용자명(핸들) 파생과 선택 문자열 정리 함수를 제공합니다.
//! OAuth 가입 시 이메일 local part에서 핸들을 만들어내는 데 사용됩니다.

/// 사용자명 최소 길이
pub const HANDLE_MIN_LEN: usize = 3;
/// 사용자명 최대 길이
pub const HANDLE_MAX_LEN: usize = 30;

/// 이메일 주소의 local part를 반환합니다.
///
/// # Examples
///
/// ```rust,ignore
/// assert_eq!(email_local_part("alice@example.com"), Some("alice"));
/// ```
pub fn email_local_part(email: &str) -> Option<&str> {
    email.split_once('@').map(|(local, _)| local).filter(|l| !l.is_empty())
}

/// 임의 문자열을 유효한 핸들 형태로 정규화합니다.
///
/// 소문자 변환 후 영숫자와 언더스코어만 남기고 나머지는 언더스코어로
/// 치환하며, 길이를 3-30자 범위로 맞춥니다.
///
/// # Examples
///
/// ```rust,ignore
/// assert_eq!(sanitize_handle("John Doe"), "john_doe");
/// assert_eq!(sanitize_handle("a.b+c"), "a_b_c");
/// ```
pub fn sanitize_handle(input: &str) -> String {
    let mut cleaned: String = input
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();

    cleaned = cleaned.trim_matches('_').to_string();

    if cleaned.len() < HANDLE_MIN_LEN {
        cleaned = format!("user_{}", cleaned);
        cleaned = cleaned.trim_matches('_').to_string();
    }

    cleaned.chars().take(HANDLE_MAX_LEN).collect()
}

/// 접미사를 붙여도 최대 길이를 넘지 않도록 기본 핸들을 자릅니다.
///
/// # Arguments
///
/// * `base` - 정규화된 기본 핸들
/// * `suffix_len` - 붙일 접미사의 길이 (예: "_12"는 3)
pub fn truncate_handle_for_suffix(base: &str, suffix_len: usize) -> String {
    let keep = HANDLE_MAX_LEN.saturating_sub(suffix_len).max(1);
    base.chars().take(keep).collect()
}

/// 선택적 문자열을 정리합니다.
///
/// 앞뒤 공백을 제거하고, 비어 있으면 `None`을 반환합니다.
pub fn clean_optional_string(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_local_part() {
        assert_eq!(email_local_part("alice@example.com"), Some("alice"));
        assert_eq!(email_local_part("a.b+tag@x.io"), Some("a.b+tag"));
        assert_eq!(email_local_part("@example.com"), None);
        assert_eq!(email_local_part("no-at-sign"), None);
    }

    #[test]
    fn test_sanitize_handle_basic() {
        assert_eq!(sanitize_handle("John Doe"), "john_doe");
        assert_eq!(sanitize_handle("alice"), "alice");
        assert_eq!(sanitize_handle("a.b+c"), "a_b_c");
    }

    #[test]
    fn test_sanitize_handle_enforces_length() {
        // 너무 짧은 입력은 user_ 접두사로 보강된다
        let short = sanitize_handle("ab");
        assert!(short.len() >= HANDLE_MIN_LEN);
        assert_eq!(short, "user_ab");

        // 너무 긴 입력은 30자로 잘린다
        let long_input = "x".repeat(64);
        assert_eq!(sanitize_handle(&long_input).len(), HANDLE_MAX_LEN);
    }

    #[test]
    fn test_sanitize_handle_trims_underscores() {
        assert_eq!(sanitize_handle("__alice__"), "alice");
    }

    #[test]
    fn test_truncate_handle_for_suffix() {
        let base = "x".repeat(30);
        let truncated = truncate_handle_for_suffix(&base, 3);
        assert_eq!(truncated.len(), 27);

        // 접미사를 붙여도 30자를 넘지 않는다
        assert!(format!("{}_12", truncated).len() <= HANDLE_MAX_LEN);
    }

    #[test]
    fn test_clean_optional_string() {
        assert_eq!(
            clean_optional_string(Some("  hello  ".to_string())),
            Some("hello".to_string())
        );
        assert_eq!(clean_optional_string(Some("   ".to_string())), None);
        assert_eq!(clean_optional_string(None), None);
    }
}
