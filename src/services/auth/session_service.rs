//! 서버 사이드 세션 서비스
//!
//! 브라우저(OAuth) 플로우용 세션 인증을 제공합니다.
//! 불투명한 세션 식별자를 사용자 ID에 매핑하는 서버 사이드 레코드를
//! 유지하며, 식별자는 `SESSION_SECRET`으로 서명되어 쿠키 위조 시
//! 저장소 조회 없이 거부됩니다.
//!
//! 쿠키 속성: HttpOnly, SameSite=Lax, 로컬 개발 환경 외에는 Secure.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use actix_web::cookie::{time::Duration as CookieDuration, Cookie, SameSite};
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::caching::redis::RedisClient;
use crate::config::SessionConfig;
use crate::errors::{AppError, AppResult};

/// 세션 레코드 저장소 계약
///
/// 세션 생성/조회/삭제는 각각 단일 레코드에 대한 원자적 연산입니다.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// 세션 레코드를 TTL과 함께 저장합니다.
    async fn put(&self, session_id: &str, user_id: &str, ttl_secs: u64) -> AppResult<()>;

    /// 세션 ID에 매핑된 사용자 ID를 조회합니다.
    ///
    /// 만료되었거나 존재하지 않으면 `None`을 반환합니다.
    async fn get(&self, session_id: &str) -> AppResult<Option<String>>;

    /// 세션 레코드를 삭제합니다. 없는 세션 삭제는 오류가 아닙니다.
    async fn delete(&self, session_id: &str) -> AppResult<()>;
}

/// Redis 기반 세션 저장소 (운영 환경)
///
/// `session:{id}` 키에 사용자 ID를 저장하며, 만료는 Redis TTL이
/// 처리합니다.
pub struct RedisSessionStore {
    redis: Arc<RedisClient>,
}

impl RedisSessionStore {
    pub fn new(redis: Arc<RedisClient>) -> Self {
        Self { redis }
    }

    fn key(session_id: &str) -> String {
        format!("session:{}", session_id)
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn put(&self, session_id: &str, user_id: &str, ttl_secs: u64) -> AppResult<()> {
        self.redis
            .setex(&Self::key(session_id), ttl_secs, user_id)
            .await
            .map_err(|e| AppError::SessionStoreError(e.to_string()))
    }

    async fn get(&self, session_id: &str) -> AppResult<Option<String>> {
        self.redis
            .get_string(&Self::key(session_id))
            .await
            .map_err(|e| AppError::SessionStoreError(e.to_string()))
    }

    async fn delete(&self, session_id: &str) -> AppResult<()> {
        self.redis
            .del(&Self::key(session_id))
            .await
            .map_err(|e| AppError::SessionStoreError(e.to_string()))
    }
}

/// 인메모리 세션 저장소 (개발/테스트 전용)
///
/// 만료는 조회 시점에 검사합니다.
#[derive(Default)]
pub struct MemorySessionStore {
    /// 세션 ID → (사용자 ID, 만료 Unix 밀리초)
    sessions: RwLock<HashMap<String, (String, i64)>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn now_millis() -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn put(&self, session_id: &str, user_id: &str, ttl_secs: u64) -> AppResult<()> {
        let expires_at = Self::now_millis() + (ttl_secs as i64) * 1000;

        self.sessions
            .write()
            .map_err(|_| AppError::SessionStoreError("세션 저장소 잠금 오염".to_string()))?
            .insert(session_id.to_string(), (user_id.to_string(), expires_at));

        Ok(())
    }

    async fn get(&self, session_id: &str) -> AppResult<Option<String>> {
        let sessions = self
            .sessions
            .read()
            .map_err(|_| AppError::SessionStoreError("세션 저장소 잠금 오염".to_string()))?;

        Ok(sessions.get(session_id).and_then(|(user_id, expires_at)| {
            if *expires_at > Self::now_millis() {
                Some(user_id.clone())
            } else {
                None
            }
        }))
    }

    async fn delete(&self, session_id: &str) -> AppResult<()> {
        self.sessions
            .write()
            .map_err(|_| AppError::SessionStoreError("세션 저장소 잠금 오염".to_string()))?
            .remove(session_id);

        Ok(())
    }
}

/// 세션 권한 서비스
///
/// 세션 수립/해석/파기와 세션 쿠키 생성을 담당합니다.
/// 쿠키 값 형식은 `{세션ID}.{서명}`이며, 서명이 일치하지 않는 값은
/// 저장소 조회 전에 거부됩니다.
pub struct SessionService {
    store: Arc<dyn SessionStore>,
    config: SessionConfig,
}

impl SessionService {
    /// 새 세션 서비스를 생성합니다.
    pub fn new(store: Arc<dyn SessionStore>, config: SessionConfig) -> Self {
        Self { store, config }
    }

    /// 세션 ID에 대한 서명을 계산합니다.
    fn sign(&self, session_id: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(format!("{}:{}", session_id, self.config.secret).as_bytes());

        hasher
            .finalize()
            .iter()
            .take(16)
            .map(|b| format!("{:02x}", b))
            .collect()
    }

    /// 쿠키 값에서 서명을 검증하고 세션 ID를 추출합니다.
    fn verify_cookie_value<'a>(&self, cookie_value: &'a str) -> Option<&'a str> {
        let (session_id, signature) = cookie_value.split_once('.')?;

        if session_id.is_empty() || self.sign(session_id) != signature {
            return None;
        }

        Some(session_id)
    }

    /// 새 세션을 수립하고 쿠키 값을 반환합니다.
    ///
    /// 세션 ID는 추측 불가능한 256비트 난수입니다.
    pub async fn establish(&self, user_id: &str) -> AppResult<String> {
        let session_id = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());

        self.store
            .put(&session_id, user_id, self.config.ttl_secs)
            .await?;

        log::debug!("세션 수립됨 - 사용자 ID: {}", user_id);

        Ok(format!("{}.{}", session_id, self.sign(&session_id)))
    }

    /// 쿠키 값을 해석하여 사용자 ID를 반환합니다.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(user_id))` - 유효한 세션
    /// * `Ok(None)` - 서명 불일치, 만료, 또는 존재하지 않는 세션
    pub async fn resolve(&self, cookie_value: &str) -> AppResult<Option<String>> {
        let Some(session_id) = self.verify_cookie_value(cookie_value) else {
            return Ok(None);
        };

        self.store.get(session_id).await
    }

    /// 세션을 파기합니다.
    ///
    /// 서명이 유효하지 않은 쿠키 값은 조용히 무시됩니다.
    pub async fn destroy(&self, cookie_value: &str) -> AppResult<()> {
        if let Some(session_id) = self.verify_cookie_value(cookie_value) {
            self.store.delete(session_id).await?;
        }

        Ok(())
    }

    /// 세션 쿠키를 생성합니다.
    pub fn session_cookie(&self, cookie_value: &str) -> Cookie<'static> {
        Cookie::build(SessionConfig::COOKIE_NAME, cookie_value.to_string())
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.config.secure_cookie)
            .max_age(CookieDuration::seconds(self.config.ttl_secs as i64))
            .finish()
    }

    /// 세션 쿠키를 제거하는 만료 쿠키를 생성합니다.
    pub fn expired_cookie(&self) -> Cookie<'static> {
        Cookie::build(SessionConfig::COOKIE_NAME, "")
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.config.secure_cookie)
            .max_age(CookieDuration::ZERO)
            .finish()
    }
}
