//! Account registration, authentication and administration.

use std::sync::Arc;

use mockable::Clock;
use tokio::task;
use tracing::info;

use crate::domain::ports::{
    KeyValueCache, LEADERBOARD_PREFIX, STATS_PREFIX, UserInsertOutcome, UserRepository,
    invalidate,
};
use crate::domain::{
    Error, LoginCredentials, NewUser, NotificationKind, NotificationService, Registration,
    RequestContext, Role, RuleViolation, User, UserId, ValidationErrors, hash_password,
    verify_password,
};

/// Maximum stored length of a profile image reference.
pub const PROFILE_IMAGE_MAX: usize = 500;

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
    notifications: NotificationService,
    cache: Arc<dyn KeyValueCache>,
    clock: Arc<dyn Clock>,
}

async fn blocking<T, F>(work: F) -> Result<T, Error>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    task::spawn_blocking(work)
        .await
        .map_err(|err| Error::internal(format!("password worker failed: {err}")))
}

impl UserService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        notifications: NotificationService,
        cache: Arc<dyn KeyValueCache>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            notifications,
            cache,
            clock,
        }
    }

    async fn existing(&self, user_id: UserId) -> Result<User, Error> {
        self.users
            .find_by_id(&user_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("user {user_id} not found")))
    }

    /// Create an account with the `user` role and zero points.
    pub async fn register(&self, registration: Registration) -> Result<User, Error> {
        let password = registration.password().to_owned();
        let password_hash = blocking(move || hash_password(&password)).await??;
        let new_user = NewUser {
            id: UserId::random(),
            nickname: registration.nickname().clone(),
            email: registration.email().clone(),
            password_hash,
            role: Role::User,
            created_at: self.clock.utc(),
        };
        match self.users.insert(&new_user).await? {
            UserInsertOutcome::Inserted(user) => {
                info!(user_id = %user.id, nickname = %user.nickname, "user registered");
                invalidate(self.cache.as_ref(), &[STATS_PREFIX]).await;
                Ok(user)
            }
            UserInsertOutcome::NicknameTaken => Err(RuleViolation::NicknameTaken.into()),
            UserInsertOutcome::EmailTaken => Err(RuleViolation::EmailTaken.into()),
        }
    }

    /// Make sure an admin account exists for `registration`: the account is
    /// created when absent and promoted when it holds a lower role. Used to
    /// bootstrap a deployment; no caller context applies.
    pub async fn ensure_admin(&self, registration: Registration) -> Result<User, Error> {
        let existing = self
            .users
            .find_by_login(registration.nickname().as_str())
            .await?;
        let user = match existing {
            Some(user) => user,
            None => self.register(registration).await?,
        };
        if user.role == Role::Admin {
            return Ok(user);
        }
        let promoted = self
            .users
            .update_role(&user.id, Role::Admin)
            .await?
            .ok_or_else(|| Error::not_found(format!("user {} not found", user.id)))?;
        info!(user_id = %promoted.id, nickname = %promoted.nickname, "bootstrap admin ready");
        invalidate(self.cache.as_ref(), &[STATS_PREFIX]).await;
        Ok(promoted)
    }

    /// Resolve credentials to an account. Unknown logins and wrong passwords
    /// produce the same error.
    pub async fn authenticate(&self, credentials: &LoginCredentials) -> Result<User, Error> {
        let login = if credentials.login().contains('@') {
            credentials.login().to_lowercase()
        } else {
            credentials.login().to_owned()
        };
        let invalid = || Error::unauthorized("invalid credentials");
        let user = self.users.find_by_login(&login).await?.ok_or_else(invalid)?;
        let password = credentials.password().to_owned();
        let stored = user.password_hash.clone();
        if blocking(move || verify_password(&password, &stored)).await? {
            Ok(user)
        } else {
            Err(invalid())
        }
    }

    /// A profile; the caller's own or, for assistants and above, anyone's.
    pub async fn profile(&self, ctx: &RequestContext, user_id: UserId) -> Result<User, Error> {
        ctx.require_self_or(user_id, Role::Assistant)?;
        self.existing(user_id).await
    }

    /// Look up the account behind a session.
    pub async fn find(&self, user_id: UserId) -> Result<Option<User>, Error> {
        Ok(self.users.find_by_id(&user_id).await?)
    }

    /// Every account. Assistant or higher.
    pub async fn list(&self, ctx: &RequestContext) -> Result<Vec<User>, Error> {
        ctx.require(Role::Assistant)?;
        Ok(self.users.list().await?)
    }

    /// Change a user's role and notify them. Admin only; admins cannot
    /// change their own role.
    pub async fn change_role(
        &self,
        ctx: &RequestContext,
        user_id: UserId,
        role: Role,
    ) -> Result<User, Error> {
        ctx.require(Role::Admin)?;
        if user_id == ctx.user_id() {
            return Err(Error::forbidden("admins cannot change their own role"));
        }
        let previous = self.existing(user_id).await?;
        let user = self
            .users
            .update_role(&user_id, role)
            .await?
            .ok_or_else(|| Error::not_found(format!("user {user_id} not found")))?;
        info!(%user_id, from = %previous.role, to = %role, changed_by = %ctx.user_id(), "role changed");
        invalidate(self.cache.as_ref(), &[STATS_PREFIX]).await;
        self.notifications
            .notify_after_commit(
                user_id,
                NotificationKind::RoleChanged,
                "Role changed",
                &format!("Your role is now {role}."),
            )
            .await;
        Ok(user)
    }

    /// Set or clear the profile image reference. Self or admin.
    pub async fn update_profile_image(
        &self,
        ctx: &RequestContext,
        user_id: UserId,
        profile_image: Option<String>,
    ) -> Result<User, Error> {
        ctx.require_self_or(user_id, Role::Admin)?;
        let profile_image = profile_image
            .map(|image| image.trim().to_owned())
            .filter(|image| !image.is_empty());
        let mut errors = ValidationErrors::new();
        errors.check(
            profile_image
                .as_ref()
                .is_none_or(|image| image.chars().count() <= PROFILE_IMAGE_MAX),
            "profileImage",
            format!("profile image must be at most {PROFILE_IMAGE_MAX} characters"),
        );
        errors.into_result(())?;
        let user = self
            .users
            .update_profile_image(&user_id, profile_image)
            .await?
            .ok_or_else(|| Error::not_found(format!("user {user_id} not found")))?;
        invalidate(self.cache.as_ref(), &[LEADERBOARD_PREFIX]).await;
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::{MockNotificationRepository, MockUserRepository};
    use crate::outbound::cache::MemoryCache;
    use crate::test_support::{MutableClock, sample_now, sample_user};
    use rstest::rstest;

    fn service(users: MockUserRepository) -> UserService {
        let clock: Arc<dyn Clock> = Arc::new(MutableClock::new(sample_now()));
        let users: Arc<dyn UserRepository> = Arc::new(users);
        let mut notifications = MockNotificationRepository::new();
        notifications.expect_insert_many().returning(|_| Ok(()));
        let notifications =
            NotificationService::new(Arc::new(notifications), users.clone(), clock.clone());
        UserService::new(
            users,
            notifications,
            Arc::new(MemoryCache::new(clock.clone())),
            clock,
        )
    }

    fn registration() -> Registration {
        Registration::try_new("ada", "Ada@Example.com", "correct horse").expect("valid")
    }

    #[rstest]
    #[tokio::test]
    async fn register_hashes_password() {
        let mut users = MockUserRepository::new();
        users
            .expect_insert()
            .withf(|new_user| {
                new_user.role == Role::User
                    && new_user.email.as_str() == "ada@example.com"
                    && verify_password("correct horse", &new_user.password_hash)
            })
            .times(1)
            .returning(|new_user| {
                let mut user = sample_user("ada", Role::User, 0);
                user.id = new_user.id;
                Ok(UserInsertOutcome::Inserted(user))
            });
        let user = service(users)
            .register(registration())
            .await
            .expect("registered");
        assert_eq!(user.total_points, 0);
    }

    #[rstest]
    #[case(UserInsertOutcome::NicknameTaken, "nickname_taken")]
    #[case(UserInsertOutcome::EmailTaken, "email_taken")]
    #[tokio::test]
    async fn register_reports_uniqueness_conflicts(
        #[case] outcome: UserInsertOutcome,
        #[case] rule: &str,
    ) {
        let mut users = MockUserRepository::new();
        users.expect_insert().return_once(move |_| Ok(outcome));
        let err = service(users)
            .register(registration())
            .await
            .expect_err("conflict");
        assert_eq!(err.details().expect("details")["rule"], rule);
    }

    #[rstest]
    #[tokio::test]
    async fn authenticate_rejects_wrong_password() {
        let mut stored = sample_user("ada", Role::User, 0);
        stored.password_hash = hash_password("correct horse").expect("hash");
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_login()
            .returning(move |_| Ok(Some(stored.clone())));
        let service = service(users);
        let good = LoginCredentials::try_from_parts("ada", "correct horse").expect("creds");
        assert!(service.authenticate(&good).await.is_ok());
        let bad = LoginCredentials::try_from_parts("ada", "wrong horse").expect("creds");
        let err = service.authenticate(&bad).await.expect_err("rejected");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }

    #[rstest]
    #[tokio::test]
    async fn authenticate_lowercases_email_logins() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_login()
            .withf(|login| login == "ada@example.com")
            .times(1)
            .returning(|_| Ok(None));
        let creds = LoginCredentials::try_from_parts("ADA@Example.com", "pw").expect("creds");
        let err = service(users)
            .authenticate(&creds)
            .await
            .expect_err("unknown");
        assert_eq!(err.message(), "invalid credentials");
    }

    #[rstest]
    #[tokio::test]
    async fn admins_cannot_change_own_role() {
        let admin = RequestContext::new(UserId::random(), Role::Admin);
        let err = service(MockUserRepository::new())
            .change_role(&admin, admin.user_id(), Role::User)
            .await
            .expect_err("self demotion");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    #[tokio::test]
    async fn change_role_updates_and_returns_user() {
        let target = sample_user("bob", Role::User, 0);
        let target_id = target.id;
        let mut users = MockUserRepository::new();
        let found = target.clone();
        users
            .expect_find_by_id()
            .returning(move |_| Ok(Some(found.clone())));
        users
            .expect_update_role()
            .withf(move |id, role| *id == target_id && *role == Role::Assistant)
            .times(1)
            .returning(move |_, role| {
                let mut updated = target.clone();
                updated.role = role;
                Ok(Some(updated))
            });
        let admin = RequestContext::new(UserId::random(), Role::Admin);
        let user = service(users)
            .change_role(&admin, target_id, Role::Assistant)
            .await
            .expect("changed");
        assert_eq!(user.role, Role::Assistant);
    }

    #[rstest]
    #[tokio::test]
    async fn ensure_admin_promotes_existing_account() {
        let existing = sample_user("ada", Role::User, 0);
        let id = existing.id;
        let mut users = MockUserRepository::new();
        users.expect_insert().times(0);
        users
            .expect_find_by_login()
            .withf(|login| login == "ada")
            .returning(move |_| Ok(Some(existing.clone())));
        users
            .expect_update_role()
            .withf(move |user_id, role| *user_id == id && *role == Role::Admin)
            .times(1)
            .returning(|_, role| Ok(Some(sample_user("ada", role, 0))));
        let admin = service(users)
            .ensure_admin(registration())
            .await
            .expect("promoted");
        assert_eq!(admin.role, Role::Admin);
    }
}
