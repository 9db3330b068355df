//! AuthMiddleware 인증 로직의 핵심적인 기능
use std::rc::Rc;

use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse};
use actix_web::{web, Error, HttpMessage, ResponseError};
use futures_util::future::LocalBoxFuture;

use crate::config::SessionConfig;
use crate::core::state::AppState;
use crate::domain::models::auth::{AuthMethod, AuthMode, AuthenticatedUser};
use crate::errors::AppError;
use crate::repositories::users::user_repo::UserStore;
use crate::services::auth::token_service::TokenService;

/// 실제 인증 로직을 수행하는 서비스
pub struct AuthMiddlewareService<S> {
    pub service: Rc<S>,
    pub mode: AuthMode,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, actix_web::Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let mode = self.mode.clone();

        Box::pin(async move {
            let Some(state) = req.app_data::<web::Data<AppState>>().cloned() else {
                log::error!("AppState가 주입되지 않았습니다 - 라우트 구성 오류");
                let response = AppError::InternalError("서버 구성 오류".to_string()).error_response();
                let (req, _) = req.into_parts();
                let res = ServiceResponse::new(req, response).map_into_right_body();
                return Ok(res);
            };

            let auth_result = resolve_request_identity(&req, &state).await;

            match (&mode, auth_result) {
                // Required 모드에서 인증 실패
                (AuthMode::Required, Err(err)) => {
                    log::warn!("인증 실패: {}", err);
                    let response = err.error_response();
                    let (req, _) = req.into_parts();
                    let res = ServiceResponse::new(req, response).map_into_right_body();
                    return Ok(res);
                }
                // 인증 성공 (모드 무관)
                (_, Ok(user)) => {
                    // 활동 시각 갱신은 best-effort: 실패해도 요청은 계속된다
                    if let Err(e) = state.users.touch_last_active(&user.user_id).await {
                        log::warn!("활동 시각 갱신 실패 (무시됨) - 사용자 ID {}: {}", user.user_id, e);
                    }

                    log::debug!(
                        "인증 성공: 사용자 ID {} ({})",
                        user.user_id,
                        user.method.as_str()
                    );
                    req.extensions_mut().insert(user);
                }
                // Optional 모드에서 인증 실패 (진행 허용)
                (AuthMode::Optional, Err(_)) => {
                    log::debug!("선택적 인증: 자격 없음, 비인증 상태로 진행");
                }
            }

            // 다음 서비스로 요청 전달
            let res = service.call(req).await?;
            Ok(res.map_into_left_body())
        })
    }
}

/// 요청의 신원을 고정된 우선순위 규칙으로 해석합니다.
///
/// 1. 세션 쿠키가 유효하면 세션 인증. 브라우저는 리다이렉트 간에
///    베어러 헤더를 유지할 수 없으므로 이 경로가 우선하며,
///    이때 베어러 헤더는 평가조차 되지 않습니다.
/// 2. 세션이 없으면 `Authorization: Bearer` 액세스 토큰을 검증하고
///    사용자 레코드를 다시 조회합니다.
/// 3. 둘 다 없으면 인증 실패.
async fn resolve_request_identity(
    req: &ServiceRequest,
    state: &web::Data<AppState>,
) -> Result<AuthenticatedUser, AppError> {
    // 1. 세션 쿠키 우선
    if let Some(cookie) = req.cookie(SessionConfig::COOKIE_NAME) {
        if let Some(user_id) = state.sessions.resolve(cookie.value()).await? {
            // 세션이 가리키는 신원이 여전히 존재하는지 확인
            if state.users.find_by_id(&user_id).await?.is_some() {
                return Ok(AuthenticatedUser {
                    user_id,
                    method: AuthMethod::Session,
                });
            }
        }
    }

    // 2. 베어러 액세스 토큰
    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            AppError::AuthenticationFailed("유효한 인증 자격이 필요합니다".to_string())
        })?;

    let token = TokenService::extract_bearer_token(auth_header)?;
    let claims = state.tokens.verify_access_token(token)?;

    // 토큰이 유효해도 삭제된 사용자는 거부
    state
        .users
        .find_by_id(&claims.sub)
        .await?
        .ok_or_else(|| AppError::TokenInvalid("사용자를 찾을 수 없습니다".to_string()))?;

    Ok(AuthenticatedUser {
        user_id: claims.sub,
        method: AuthMethod::Token,
    })
}
