//! 애플리케이션 상태 (명시적 의존성 주입 컨테이너)
//!
//! 모든 서비스와 저장소는 `main`에서 한 번 생성되어 이 구조체로 묶인 뒤
//! `web::Data<AppState>`로 요청 파이프라인에 전달됩니다. 지연 초기화나
//! 전역 조회는 없으며, 의존성 그래프가 생성자 시그니처에 그대로
//! 드러납니다.

use std::sync::Arc;

use log::{info, warn};

use crate::caching::redis::RedisClient;
use crate::config::{
    OAuthStateConfig, SessionConfig, StoreBackend, TokenConfig,
};
use crate::db::Database;
use crate::errors::{AppError, AppResult};
use crate::repositories::tokens::refresh_token_registry::RefreshTokenRegistry;
use crate::repositories::users::memory_repo::MemoryUserRepository;
use crate::repositories::users::user_repo::{MongoUserRepository, UserStore};
use crate::services::auth::password_service::PasswordService;
use crate::services::auth::session_service::{
    MemorySessionStore, RedisSessionStore, SessionService, SessionStore,
};
use crate::services::auth::oauth_service::OAuthService;
use crate::services::auth::token_service::TokenService;
use crate::services::users::user_service::UserService;

/// 애플리케이션 전역 상태
///
/// 핸들러와 미들웨어가 사용하는 모든 컴포넌트의 공유 핸들입니다.
#[derive(Clone)]
pub struct AppState {
    /// 자격증명 저장소
    pub users: Arc<dyn UserStore>,
    /// 사용자별 리프레시 자격증명 레지스트리
    pub refresh_tokens: Arc<RefreshTokenRegistry>,
    /// 서버 사이드 세션 서비스
    pub sessions: Arc<SessionService>,
    /// JWT 토큰 발급/검증 서비스
    pub tokens: Arc<TokenService>,
    /// 사용자 비즈니스 로직 서비스
    pub user_service: Arc<UserService>,
    /// OAuth 플로우/신원 해석 서비스
    pub oauth: Arc<OAuthService>,
}

impl AppState {
    /// 저장소와 설정으로 상태를 조립합니다.
    ///
    /// 테스트에서는 인메모리 저장소와 테스트용 설정으로 호출합니다.
    pub fn assemble(
        users: Arc<dyn UserStore>,
        session_store: Arc<dyn SessionStore>,
        token_config: TokenConfig,
        session_config: SessionConfig,
        oauth_state_config: OAuthStateConfig,
        passwords: PasswordService,
    ) -> Self {
        let passwords = Arc::new(passwords);

        let refresh_tokens = Arc::new(RefreshTokenRegistry::new(users.clone()));
        let sessions = Arc::new(SessionService::new(session_store, session_config));
        let tokens = Arc::new(TokenService::new(token_config));
        let user_service = Arc::new(UserService::new(users.clone(), passwords.clone()));
        let oauth = Arc::new(OAuthService::new(
            users.clone(),
            passwords,
            oauth_state_config,
        ));

        Self {
            users,
            refresh_tokens,
            sessions,
            tokens,
            user_service,
            oauth,
        }
    }

    /// 환경 변수에서 전체 상태를 구성합니다.
    ///
    /// 필수 시크릿 누락(`ConfigMissing`)과 저장소 연결 실패는 그대로
    /// 반환되어 프로세스 기동을 중단시킵니다.
    pub async fn from_env() -> AppResult<Self> {
        // 설정 검증을 저장소 연결보다 먼저 수행하여 빠르게 실패한다
        let token_config = TokenConfig::from_env()?;
        let session_config = SessionConfig::from_env()?;
        let oauth_state_config = OAuthStateConfig::from_env()?;

        let (users, session_store): (Arc<dyn UserStore>, Arc<dyn SessionStore>) =
            match StoreBackend::from_env()? {
                StoreBackend::MongoDb => {
                    let database = Arc::new(Database::new().await?);

                    let user_repo = MongoUserRepository::new(database);
                    user_repo.create_indexes().await?;
                    info!("✅ 사용자 저장소 준비 완료 (MongoDB)");

                    let redis = Arc::new(
                        RedisClient::new()
                            .await
                            .map_err(|e| AppError::SessionStoreError(e.to_string()))?,
                    );

                    (
                        Arc::new(user_repo),
                        Arc::new(RedisSessionStore::new(redis)),
                    )
                }
                StoreBackend::Memory => {
                    warn!("⚠️ 인메모리 저장소 모드로 기동합니다 - 모든 계정/세션이 프로세스 종료 시 소실됩니다");
                    warn!("⚠️ 이 모드는 개발/테스트 전용이며 프로덕션 환경에서는 기동이 거부됩니다");

                    (
                        Arc::new(MemoryUserRepository::new()),
                        Arc::new(MemorySessionStore::new()),
                    )
                }
            };

        Ok(Self::assemble(
            users,
            session_store,
            token_config,
            session_config,
            oauth_state_config,
            PasswordService::from_env(),
        ))
    }
}
