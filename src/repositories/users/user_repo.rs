//! # 사용자 저장소 구현
//!
//! 사용자 엔티티의 데이터 액세스 계층을 담당합니다.
//! `UserStore` trait이 저장소 계약을 정의하고, MongoDB 구현이 운영
//! 환경을 담당합니다. 리프레시 자격증명 배열에 대한 모든 변경은
//! 읽기-수정-쓰기가 아닌 저장소 수준의 원자적 배열 연산
//! (`$push` / `$pull` / `$set`)으로 수행되어, 동시 로그아웃/갱신
//! 요청이 갱신 유실 없이 안전하게 교차됩니다.
//!
//! ## 특징
//!
//! - **명시적 주입**: 프로세스 시작 시 구성되어 `AppState`로 전달
//! - **데이터 무결성**: 이메일/사용자명 유니크 인덱스 관리
//! - **원자적 배열 연산**: 리프레시 자격증명의 동시성 안전 보장

use std::sync::Arc;

use async_trait::async_trait;
use mongodb::{
    bson::{self, doc, oid::ObjectId, DateTime},
    options::IndexOptions,
    IndexModel,
};

use crate::config::AuthProvider;
use crate::db::Database;
use crate::domain::entities::users::user::{RefreshCredential, User};
use crate::errors::{AppError, AppResult};

/// 프로필 부분 수정 요청
///
/// `None` 필드는 변경하지 않습니다.
#[derive(Debug, Default, Clone)]
pub struct ProfileChanges {
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub profile_image_url: Option<String>,
}

impl ProfileChanges {
    /// 변경할 필드가 없는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.display_name.is_none() && self.bio.is_none() && self.profile_image_url.is_none()
    }
}

/// 자격증명 저장소 계약
///
/// 사용자 신원 레코드의 조회/생성/갱신과 리프레시 자격증명 배열에 대한
/// 원자적 연산을 제공합니다. 운영 환경은 [`MongoUserRepository`],
/// 개발/테스트 환경은 [`super::memory_repo::MemoryUserRepository`]가
/// 구현합니다.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// 새 사용자를 저장하고 ID가 할당된 엔티티를 반환합니다.
    ///
    /// # Errors
    ///
    /// * `AppError::DuplicateAccount` - 이메일 또는 사용자명 중복
    async fn insert(&self, user: User) -> AppResult<User>;

    /// ID로 사용자 조회
    async fn find_by_id(&self, id: &str) -> AppResult<Option<User>>;

    /// 이메일로 사용자 조회 (이메일은 소문자로 저장됨)
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// 사용자명으로 사용자 조회
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;

    /// 프로바이더 외부 식별자로 사용자 조회
    async fn find_by_provider_id(
        &self,
        provider: &AuthProvider,
        provider_user_id: &str,
    ) -> AppResult<Option<User>>;

    /// 기존 사용자에 OAuth 프로바이더 식별자를 연동합니다.
    ///
    /// `fill_profile_image`는 호출자가 현재 프로필 이미지가 비어 있음을
    /// 확인한 경우에만 전달합니다. 그 외 필드는 변경되지 않습니다.
    async fn link_provider(
        &self,
        id: &str,
        provider: &AuthProvider,
        provider_user_id: &str,
        fill_profile_image: Option<String>,
    ) -> AppResult<Option<User>>;

    /// 프로필 표시 필드를 부분 수정합니다.
    async fn update_profile(&self, id: &str, changes: ProfileChanges) -> AppResult<Option<User>>;

    /// 마지막 활동 시각을 현재로 갱신합니다.
    async fn touch_last_active(&self, id: &str) -> AppResult<()>;

    /// 리프레시 자격증명을 배열에 추가합니다. (원자적 `$push`)
    async fn push_refresh_token(&self, id: &str, credential: RefreshCredential) -> AppResult<()>;

    /// 지정된 토큰 값을 가진 자격증명을 제거합니다. (원자적 `$pull`)
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - 자격증명이 제거됨
    /// * `Ok(false)` - 해당 토큰이 배열에 없었음
    async fn pull_refresh_token(&self, id: &str, token: &str) -> AppResult<bool>;

    /// 모든 리프레시 자격증명을 제거합니다. (원자적 `$set: []`)
    async fn clear_refresh_tokens(&self, id: &str) -> AppResult<()>;

    /// 만료되지 않은 자격증명이 배열에 존재하는지 확인합니다.
    ///
    /// 만료된 항목이 배열에 남아 있을 수 있으므로 멤버십과 만료를
    /// 함께 검사합니다.
    async fn has_live_refresh_token(&self, id: &str, token: &str) -> AppResult<bool>;
}

/// MongoDB 사용자 저장소
///
/// `users` 컬렉션에 대한 모든 저장소 연산을 담당합니다.
pub struct MongoUserRepository {
    /// MongoDB 데이터베이스 연결
    db: Arc<Database>,
}

impl MongoUserRepository {
    const COLLECTION: &'static str = "users";

    /// 새 리포지토리 인스턴스를 생성합니다.
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    fn collection(&self) -> mongodb::Collection<User> {
        self.db.get_database().collection(Self::COLLECTION)
    }

    fn parse_object_id(id: &str) -> AppResult<ObjectId> {
        ObjectId::parse_str(id)
            .map_err(|_| AppError::ValidationError("유효하지 않은 ID 형식입니다".to_string()))
    }

    fn provider_field(provider: &AuthProvider) -> Option<&'static str> {
        match provider {
            AuthProvider::GitHub => Some("github_id"),
            AuthProvider::Google => Some("google_id"),
            AuthProvider::Local => None,
        }
    }

    /// 데이터베이스 인덱스 생성
    ///
    /// 애플리케이션 초기화 시점에 한 번 실행하여 유니크 제약과
    /// 조회 성능을 보장합니다.
    ///
    /// # 생성되는 인덱스
    ///
    /// 1. `email` (유니크) - 중복 이메일 방지 및 로그인 조회 최적화
    /// 2. `username` (유니크) - 중복 사용자명 방지
    /// 3. `github_id` / `google_id` - OAuth 신원 해석 fast path 조회
    pub async fn create_indexes(&self) -> AppResult<()> {
        let collection = self.collection();

        let email_index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("email_unique".to_string())
                    .build(),
            )
            .build();

        let username_index = IndexModel::builder()
            .keys(doc! { "username": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("username_unique".to_string())
                    .build(),
            )
            .build();

        let github_index = IndexModel::builder()
            .keys(doc! { "github_id": 1 })
            .options(
                IndexOptions::builder()
                    .sparse(true)
                    .name("github_id_sparse".to_string())
                    .build(),
            )
            .build();

        let google_index = IndexModel::builder()
            .keys(doc! { "google_id": 1 })
            .options(
                IndexOptions::builder()
                    .sparse(true)
                    .name("google_id_sparse".to_string())
                    .build(),
            )
            .build();

        collection
            .create_indexes([email_index, username_index, github_index, google_index])
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl UserStore for MongoUserRepository {
    async fn insert(&self, mut user: User) -> AppResult<User> {
        // 사전 중복 확인 (친절한 에러 메시지용)
        if self.find_by_email(&user.email).await?.is_some() {
            return Err(AppError::DuplicateAccount(
                "이미 사용 중인 이메일입니다".to_string(),
            ));
        }

        if self.find_by_username(&user.username).await?.is_some() {
            return Err(AppError::DuplicateAccount(
                "이미 사용 중인 사용자명입니다".to_string(),
            ));
        }

        // 유니크 인덱스가 최종 방어선: 동시 가입 경합은 E11000으로 잡힌다
        let result = self.collection().insert_one(&user).await.map_err(|e| {
            if e.to_string().contains("E11000") {
                AppError::DuplicateAccount("이미 사용 중인 이메일 또는 사용자명입니다".to_string())
            } else {
                AppError::DatabaseError(e.to_string())
            }
        })?;

        user.id = result.inserted_id.as_object_id();

        Ok(user)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<User>> {
        let object_id = Self::parse_object_id(id)?;

        self.collection()
            .find_one(doc! { "_id": object_id })
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        self.collection()
            .find_one(doc! { "email": email })
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        self.collection()
            .find_one(doc! { "username": username })
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))
    }

    async fn find_by_provider_id(
        &self,
        provider: &AuthProvider,
        provider_user_id: &str,
    ) -> AppResult<Option<User>> {
        let Some(field) = Self::provider_field(provider) else {
            return Ok(None);
        };

        let mut filter = bson::Document::new();
        filter.insert(field, provider_user_id);

        self.collection()
            .find_one(filter)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))
    }

    async fn link_provider(
        &self,
        id: &str,
        provider: &AuthProvider,
        provider_user_id: &str,
        fill_profile_image: Option<String>,
    ) -> AppResult<Option<User>> {
        let object_id = Self::parse_object_id(id)?;

        let Some(field) = Self::provider_field(provider) else {
            return Err(AppError::ValidationError(
                "로컬 프로바이더는 연동할 수 없습니다".to_string(),
            ));
        };

        let mut set_doc = bson::Document::new();
        set_doc.insert(field, provider_user_id);
        set_doc.insert("updated_at", DateTime::now());
        if let Some(image_url) = fill_profile_image {
            set_doc.insert("profile_image_url", image_url);
        }

        let options = mongodb::options::FindOneAndUpdateOptions::builder()
            .return_document(mongodb::options::ReturnDocument::After)
            .build();

        self.collection()
            .find_one_and_update(doc! { "_id": object_id }, doc! { "$set": set_doc })
            .with_options(options)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))
    }

    async fn update_profile(&self, id: &str, changes: ProfileChanges) -> AppResult<Option<User>> {
        let object_id = Self::parse_object_id(id)?;

        let mut set_doc = doc! { "updated_at": DateTime::now() };
        if let Some(display_name) = changes.display_name {
            set_doc.insert("display_name", display_name);
        }
        if let Some(bio) = changes.bio {
            set_doc.insert("bio", bio);
        }
        if let Some(image_url) = changes.profile_image_url {
            set_doc.insert("profile_image_url", image_url);
        }

        let options = mongodb::options::FindOneAndUpdateOptions::builder()
            .return_document(mongodb::options::ReturnDocument::After)
            .build();

        self.collection()
            .find_one_and_update(doc! { "_id": object_id }, doc! { "$set": set_doc })
            .with_options(options)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))
    }

    async fn touch_last_active(&self, id: &str) -> AppResult<()> {
        let object_id = Self::parse_object_id(id)?;

        self.collection()
            .update_one(
                doc! { "_id": object_id },
                doc! { "$set": { "last_active_at": DateTime::now() } },
            )
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(())
    }

    async fn push_refresh_token(&self, id: &str, credential: RefreshCredential) -> AppResult<()> {
        let object_id = Self::parse_object_id(id)?;

        let credential_bson = bson::to_bson(&credential)
            .map_err(|e| AppError::InternalError(format!("자격증명 직렬화 실패: {}", e)))?;

        self.collection()
            .update_one(
                doc! { "_id": object_id },
                doc! { "$push": { "refresh_tokens": credential_bson } },
            )
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(())
    }

    async fn pull_refresh_token(&self, id: &str, token: &str) -> AppResult<bool> {
        let object_id = Self::parse_object_id(id)?;

        let result = self
            .collection()
            .update_one(
                doc! { "_id": object_id },
                doc! { "$pull": { "refresh_tokens": { "token": token } } },
            )
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(result.modified_count > 0)
    }

    async fn clear_refresh_tokens(&self, id: &str) -> AppResult<()> {
        let object_id = Self::parse_object_id(id)?;

        self.collection()
            .update_one(
                doc! { "_id": object_id },
                doc! { "$set": { "refresh_tokens": [] } },
            )
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(())
    }

    async fn has_live_refresh_token(&self, id: &str, token: &str) -> AppResult<bool> {
        let object_id = Self::parse_object_id(id)?;

        let matched = self
            .collection()
            .find_one(doc! {
                "_id": object_id,
                "refresh_tokens": {
                    "$elemMatch": {
                        "token": token,
                        "expires_at": { "$gt": DateTime::now() }
                    }
                }
            })
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(matched.is_some())
    }
}
