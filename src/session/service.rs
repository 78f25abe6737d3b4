//! Session manager: registration, login, logout, refresh rotation and the
//! authenticated profile operations.
//!
//! The account row holds exactly one refresh token. Every login or refresh
//! overwrites it, logout clears it, and a presented refresh token is only
//! accepted while it still equals the stored value.

use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use super::{
    credentials::{hash_password, verify_password},
    models::{Account, AccountView, NewAccount, TokenPair},
    tokens::{TokenError, TokenIssuer, TokenKind},
    utils::{is_blank, non_blank, normalize_email, normalize_username, valid_email},
};
use crate::{
    error::{Error, Result},
    media::{MediaFile, MediaHost},
    store::AccountStore,
};

const MSG_USER_MISSING: &str = "User does not exist";
const MSG_INVALID_REFRESH: &str = "Invalid refresh token";
const MSG_REFRESH_USED: &str = "Refresh token is expired or used";
const MSG_INVALID_ACCESS: &str = "Invalid access token";

#[derive(Debug)]
pub struct RegisterInput {
    pub full_name: String,
    pub email: String,
    pub username: String,
    pub password: String,
    pub avatar: Option<MediaFile>,
    pub cover_image: Option<MediaFile>,
}

#[derive(Debug, Default)]
pub struct LoginInput {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: String,
}

#[derive(Debug, Default)]
pub struct ChangePasswordInput {
    pub old_password: String,
    pub new_password: String,
    pub confirm_password: Option<String>,
}

#[derive(Debug, Default)]
pub struct DetailsInput {
    pub full_name: String,
    pub email: String,
}

pub struct SessionService {
    accounts: Arc<dyn AccountStore>,
    tokens: TokenIssuer,
    media: Arc<dyn MediaHost>,
}

impl SessionService {
    #[must_use]
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        tokens: TokenIssuer,
        media: Arc<dyn MediaHost>,
    ) -> Self {
        Self {
            accounts,
            tokens,
            media,
        }
    }

    #[must_use]
    pub fn token_ttl_seconds(&self, kind: TokenKind) -> i64 {
        self.tokens.ttl_seconds(kind)
    }

    /// # Errors
    /// `Validation` for blank fields, a malformed email or a missing avatar,
    /// `Conflict` for a taken username or email, `Dependency` when the avatar
    /// upload fails.
    pub async fn register(&self, input: RegisterInput) -> Result<AccountView> {
        if [
            &input.full_name,
            &input.email,
            &input.username,
            &input.password,
        ]
        .iter()
        .any(|field| is_blank(field))
        {
            return Err(Error::validation("All fields are required"));
        }

        let username = normalize_username(&input.username);
        let email = normalize_email(&input.email);
        if !valid_email(&email) {
            return Err(Error::validation("Invalid email address"));
        }

        let Some(avatar) = input.avatar else {
            return Err(Error::validation("Avatar file is required"));
        };

        if self
            .accounts
            .find_account_by_identity(Some(&username), Some(&email))
            .await?
            .is_some()
        {
            return Err(Error::conflict("User with email or username already exists"));
        }

        let avatar = self.media.upload(avatar).await.map_err(|err| {
            warn!("Avatar upload failed: {err}");
            Error::dependency("Failed to upload avatar")
        })?;

        // A missing or failed cover image is stored as empty.
        let cover_image = match input.cover_image {
            Some(file) => match self.media.upload(file).await {
                Ok(uploaded) => uploaded.url,
                Err(err) => {
                    warn!("Cover image upload failed, continuing without it: {err}");
                    String::new()
                }
            },
            None => String::new(),
        };

        let password_hash = hash_password(&input.password)
            .await
            .map_err(|err| Error::fatal(format!("{err:#}")))?;

        let account = self
            .accounts
            .insert_account(NewAccount {
                username,
                email,
                full_name: input.full_name.trim().to_string(),
                avatar: avatar.url,
                cover_image,
                password_hash,
            })
            .await?;

        debug!(account_id = %account.id, "Registered account");
        Ok(account.into())
    }

    /// Verify the password, then issue and persist a fresh token pair.
    ///
    /// # Errors
    /// `Validation` without an identifier, `NotFound` for an unknown account,
    /// `Unauthorized` for a wrong password.
    pub async fn login(&self, input: LoginInput) -> Result<(AccountView, TokenPair)> {
        let username = non_blank(input.username.as_deref()).map(normalize_username);
        let email = non_blank(input.email.as_deref()).map(normalize_email);
        if username.is_none() && email.is_none() {
            return Err(Error::validation("username or email is required"));
        }

        let account = self
            .accounts
            .find_account_by_identity(username.as_deref(), email.as_deref())
            .await?
            .ok_or_else(|| Error::not_found(MSG_USER_MISSING))?;

        if !verify_password(&input.password, &account.password_hash).await {
            warn!(account_id = %account.id, "Login rejected: invalid password");
            return Err(Error::unauthorized("Invalid user credentials"));
        }

        let pair = self.issue_pair(&account).await?;
        debug!(account_id = %account.id, "Logged in");
        Ok((account.into(), pair))
    }

    /// Clear the stored refresh token. Calling it again is a no-op.
    ///
    /// # Errors
    /// `NotFound` if the account no longer exists.
    pub async fn logout(&self, account_id: Uuid) -> Result<()> {
        if !self.accounts.set_refresh_token(account_id, None).await? {
            return Err(Error::not_found(MSG_USER_MISSING));
        }
        debug!(%account_id, "Logged out");
        Ok(())
    }

    /// Rotate the token pair for a still-current refresh token.
    ///
    /// # Errors
    /// `Unauthorized` when the token is missing, fails verification, names an
    /// unknown account, or is no longer the stored value.
    pub async fn refresh(&self, presented: Option<&str>) -> Result<TokenPair> {
        let Some(presented) = non_blank(presented) else {
            return Err(Error::unauthorized("Unauthorized request"));
        };

        let account_id = self
            .tokens
            .verify(presented, TokenKind::Refresh)
            .map_err(|err| {
                debug!("Refresh token rejected: {err}");
                match err {
                    TokenError::Expired => Error::unauthorized("Refresh token is expired"),
                    TokenError::Invalid | TokenError::Signing(_) => {
                        Error::unauthorized(MSG_INVALID_REFRESH)
                    }
                }
            })?;

        let account = self
            .accounts
            .find_account(account_id)
            .await?
            .ok_or_else(|| Error::unauthorized(MSG_INVALID_REFRESH))?;

        if account.refresh_token.as_deref() != Some(presented) {
            warn!(%account_id, "Refresh token reuse or stale token presented");
            return Err(Error::unauthorized(MSG_REFRESH_USED));
        }

        let pair = self.sign_pair(&account)?;
        // A concurrent refresh that rotated first makes this write a no-op.
        if !self
            .accounts
            .rotate_refresh_token(account_id, presented, &pair.refresh_token)
            .await?
        {
            warn!(%account_id, "Refresh token rotated concurrently");
            return Err(Error::unauthorized(MSG_REFRESH_USED));
        }

        debug!(%account_id, "Rotated refresh token");
        Ok(pair)
    }

    /// Resolve an access token to the current account view.
    ///
    /// # Errors
    /// `Unauthorized` for an invalid or expired token or a deleted account.
    pub async fn authenticate(&self, access_token: &str) -> Result<AccountView> {
        let account_id = self
            .tokens
            .verify(access_token, TokenKind::Access)
            .map_err(|err| {
                debug!("Access token rejected: {err}");
                Error::unauthorized(MSG_INVALID_ACCESS)
            })?;

        let account = self
            .accounts
            .find_account(account_id)
            .await?
            .ok_or_else(|| Error::unauthorized(MSG_INVALID_ACCESS))?;
        Ok(account.into())
    }

    /// # Errors
    /// `Validation` for blank input, a confirmation mismatch or a wrong old password.
    pub async fn change_password(
        &self,
        account_id: Uuid,
        input: ChangePasswordInput,
    ) -> Result<AccountView> {
        if is_blank(&input.old_password) || is_blank(&input.new_password) {
            return Err(Error::validation("Old and new password are required"));
        }
        if input
            .confirm_password
            .as_deref()
            .is_some_and(|confirm| confirm != input.new_password)
        {
            return Err(Error::validation(
                "New password and confirm password do not match",
            ));
        }

        let account = self.account(account_id).await?;
        if !verify_password(&input.old_password, &account.password_hash).await {
            return Err(Error::validation("Invalid old password"));
        }

        let password_hash = hash_password(&input.new_password)
            .await
            .map_err(|err| Error::fatal(format!("{err:#}")))?;
        let updated = self
            .accounts
            .update_password(account_id, &password_hash)
            .await?
            .ok_or_else(|| Error::not_found(MSG_USER_MISSING))?;

        debug!(%account_id, "Password changed");
        Ok(updated.into())
    }

    /// # Errors
    /// `Validation` for blank input or a malformed email, `Conflict` when the
    /// email belongs to another account.
    pub async fn update_details(
        &self,
        account_id: Uuid,
        input: DetailsInput,
    ) -> Result<AccountView> {
        if is_blank(&input.full_name) || is_blank(&input.email) {
            return Err(Error::validation("All fields are required"));
        }
        let email = normalize_email(&input.email);
        if !valid_email(&email) {
            return Err(Error::validation("Invalid email address"));
        }

        let account = self
            .accounts
            .update_details(account_id, input.full_name.trim(), &email)
            .await?
            .ok_or_else(|| Error::not_found(MSG_USER_MISSING))?;
        Ok(account.into())
    }

    /// # Errors
    /// `Validation` without a file, `Dependency` when the upload fails.
    pub async fn update_avatar(
        &self,
        account_id: Uuid,
        file: Option<MediaFile>,
    ) -> Result<AccountView> {
        let file = file.ok_or_else(|| Error::validation("Avatar file is missing"))?;
        let uploaded = self.media.upload(file).await.map_err(|err| {
            warn!(%account_id, "Avatar upload failed: {err}");
            Error::dependency("Error while uploading avatar")
        })?;

        let account = self
            .accounts
            .update_avatar(account_id, &uploaded.url)
            .await?
            .ok_or_else(|| Error::not_found(MSG_USER_MISSING))?;
        Ok(account.into())
    }

    /// # Errors
    /// `Validation` without a file, `Dependency` when the upload fails.
    pub async fn update_cover_image(
        &self,
        account_id: Uuid,
        file: Option<MediaFile>,
    ) -> Result<AccountView> {
        let file = file.ok_or_else(|| Error::validation("Cover image file is missing"))?;
        let uploaded = self.media.upload(file).await.map_err(|err| {
            warn!(%account_id, "Cover image upload failed: {err}");
            Error::dependency("Error while uploading cover image")
        })?;

        let account = self
            .accounts
            .update_cover_image(account_id, &uploaded.url)
            .await?
            .ok_or_else(|| Error::not_found(MSG_USER_MISSING))?;
        Ok(account.into())
    }

    /// # Errors
    /// Returns an error if the store is unreachable.
    pub async fn ping(&self) -> Result<()> {
        self.accounts.ping().await.map_err(Error::from)
    }

    async fn account(&self, account_id: Uuid) -> Result<Account> {
        self.accounts
            .find_account(account_id)
            .await?
            .ok_or_else(|| Error::not_found(MSG_USER_MISSING))
    }

    /// Sign both tokens, then overwrite the stored refresh token in one write.
    async fn issue_pair(&self, account: &Account) -> Result<TokenPair> {
        let pair = self.sign_pair(account)?;

        if !self
            .accounts
            .set_refresh_token(account.id, Some(&pair.refresh_token))
            .await?
        {
            return Err(Error::not_found(MSG_USER_MISSING));
        }

        Ok(pair)
    }

    fn sign_pair(&self, account: &Account) -> Result<TokenPair> {
        let signing_failed = |err: TokenError| {
            warn!(account_id = %account.id, "Token signing failed: {err}");
            Error::dependency("Something went wrong while generating tokens")
        };
        let access_token = self.tokens.issue_access(account).map_err(signing_failed)?;
        let refresh_token = self
            .tokens
            .issue_refresh(account.id)
            .map_err(signing_failed)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        media::fake::{file, FakeMediaHost},
        session::tokens::TokenConfig,
        store::memory::MemoryStore,
    };
    use secrecy::SecretString;

    struct Harness {
        store: Arc<MemoryStore>,
        media: Arc<FakeMediaHost>,
        service: SessionService,
    }

    fn harness_with(media: FakeMediaHost, config: TokenConfig) -> Harness {
        let store = Arc::new(MemoryStore::new());
        let media = Arc::new(media);
        let service = SessionService::new(store.clone(), TokenIssuer::new(&config), media.clone());
        Harness {
            store,
            media,
            service,
        }
    }

    fn token_config() -> TokenConfig {
        TokenConfig::new(
            SecretString::from("access-secret".to_string()),
            SecretString::from("refresh-secret".to_string()),
        )
    }

    fn harness() -> Harness {
        harness_with(FakeMediaHost::new(), token_config())
    }

    fn alice() -> RegisterInput {
        RegisterInput {
            full_name: "Alice".to_string(),
            email: "a@x.com".to_string(),
            username: "alice".to_string(),
            password: "s3cret".to_string(),
            avatar: Some(file("avatar.png")),
            cover_image: None,
        }
    }

    fn login_alice() -> LoginInput {
        LoginInput {
            username: Some("alice".to_string()),
            email: None,
            password: "s3cret".to_string(),
        }
    }

    #[tokio::test]
    async fn register_creates_exactly_one_account() -> anyhow::Result<()> {
        let h = harness();
        let view = h.service.register(alice()).await?;

        assert_eq!(view.username, "alice");
        assert_eq!(view.avatar, "https://media.test/avatar.png");
        assert_eq!(view.cover_image, "");
        assert_eq!(h.store.account_count().await, 1);

        let json = serde_json::to_value(&view)?;
        assert!(json.get("password").is_none());
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("refreshToken").is_none());
        Ok(())
    }

    #[tokio::test]
    async fn register_requires_fields_and_avatar() {
        let h = harness();

        let mut input = alice();
        input.full_name = "  ".to_string();
        assert!(matches!(
            h.service.register(input).await,
            Err(Error::Validation(_))
        ));

        let mut input = alice();
        input.avatar = None;
        assert!(matches!(
            h.service.register(input).await,
            Err(Error::Validation(_))
        ));

        let mut input = alice();
        input.email = "not-an-email".to_string();
        assert!(matches!(
            h.service.register(input).await,
            Err(Error::Validation(_))
        ));

        assert_eq!(h.store.account_count().await, 0);
        assert_eq!(h.media.uploads(), 0);
    }

    #[tokio::test]
    async fn register_rejects_duplicate_username_case_insensitively() -> anyhow::Result<()> {
        let h = harness();
        h.service.register(alice()).await?;

        let mut input = alice();
        input.username = "ALICE".to_string();
        input.email = "other@x.com".to_string();
        assert!(matches!(
            h.service.register(input).await,
            Err(Error::Conflict(_))
        ));
        Ok(())
    }

    #[tokio::test]
    async fn register_email_uniqueness_is_case_sensitive() -> anyhow::Result<()> {
        let h = harness();
        h.service.register(alice()).await?;

        let mut duplicate = alice();
        duplicate.username = "bob".to_string();
        assert!(matches!(
            h.service.register(duplicate).await,
            Err(Error::Conflict(_))
        ));

        let mut different_case = alice();
        different_case.username = "carol".to_string();
        different_case.email = "A@x.com".to_string();
        h.service.register(different_case).await?;
        assert_eq!(h.store.account_count().await, 2);
        Ok(())
    }

    #[tokio::test]
    async fn register_fails_when_avatar_upload_fails() {
        let h = harness_with(FakeMediaHost::failing(), token_config());
        assert!(matches!(
            h.service.register(alice()).await,
            Err(Error::Dependency(_))
        ));
        assert_eq!(h.store.account_count().await, 0);
    }

    #[tokio::test]
    async fn register_tolerates_cover_upload_failure() -> anyhow::Result<()> {
        let h = harness_with(FakeMediaHost::failing_on("cover.png"), token_config());
        let mut input = alice();
        input.cover_image = Some(file("cover.png"));

        let view = h.service.register(input).await?;
        assert_eq!(view.cover_image, "");
        Ok(())
    }

    #[tokio::test]
    async fn login_verifies_password_before_issuing() -> anyhow::Result<()> {
        let h = harness();
        let view = h.service.register(alice()).await?;

        let mut wrong = login_alice();
        wrong.password = "nope".to_string();
        assert!(matches!(
            h.service.login(wrong).await,
            Err(Error::Unauthorized(_))
        ));
        assert_eq!(h.store.stored_refresh_token(view.id).await, None);

        let (user, pair) = h.service.login(login_alice()).await?;
        assert_eq!(user.username, "alice");
        assert_eq!(
            h.store.stored_refresh_token(view.id).await.as_deref(),
            Some(pair.refresh_token.as_str())
        );
        Ok(())
    }

    #[tokio::test]
    async fn login_by_email_and_missing_identifier() -> anyhow::Result<()> {
        let h = harness();
        h.service.register(alice()).await?;

        let by_email = LoginInput {
            username: None,
            email: Some("a@x.com".to_string()),
            password: "s3cret".to_string(),
        };
        h.service.login(by_email).await?;

        let neither = LoginInput {
            username: Some("  ".to_string()),
            email: None,
            password: "s3cret".to_string(),
        };
        assert!(matches!(
            h.service.login(neither).await,
            Err(Error::Validation(_))
        ));

        let unknown = LoginInput {
            username: Some("mallory".to_string()),
            email: None,
            password: "s3cret".to_string(),
        };
        assert!(matches!(
            h.service.login(unknown).await,
            Err(Error::NotFound(_))
        ));
        Ok(())
    }

    #[tokio::test]
    async fn refresh_token_is_single_use() -> anyhow::Result<()> {
        let h = harness();
        h.service.register(alice()).await?;
        let (_, original) = h.service.login(login_alice()).await?;

        let rotated = h.service.refresh(Some(&original.refresh_token)).await?;
        assert_ne!(rotated.refresh_token, original.refresh_token);
        assert_ne!(rotated.access_token, original.access_token);

        assert!(matches!(
            h.service.refresh(Some(&original.refresh_token)).await,
            Err(Error::Unauthorized(_))
        ));

        h.service.refresh(Some(&rotated.refresh_token)).await?;
        Ok(())
    }

    #[tokio::test]
    async fn refresh_after_logout_is_rejected() -> anyhow::Result<()> {
        let h = harness();
        let view = h.service.register(alice()).await?;
        let (_, pair) = h.service.login(login_alice()).await?;

        h.service.logout(view.id).await?;
        h.service.logout(view.id).await?;

        assert!(matches!(
            h.service.refresh(Some(&pair.refresh_token)).await,
            Err(Error::Unauthorized(_))
        ));
        Ok(())
    }

    #[tokio::test]
    async fn logout_unknown_account_is_not_found() {
        let h = harness();
        assert!(matches!(
            h.service.logout(Uuid::new_v4()).await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn refresh_rejects_missing_garbage_and_access_tokens() -> anyhow::Result<()> {
        let h = harness();
        h.service.register(alice()).await?;
        let (_, pair) = h.service.login(login_alice()).await?;

        for presented in [None, Some(""), Some("garbage"), Some(pair.access_token.as_str())] {
            assert!(matches!(
                h.service.refresh(presented).await,
                Err(Error::Unauthorized(_))
            ));
        }
        Ok(())
    }

    #[tokio::test]
    async fn expired_refresh_token_is_rejected() -> anyhow::Result<()> {
        let h = harness_with(
            FakeMediaHost::new(),
            token_config().with_refresh_ttl_seconds(-60),
        );
        h.service.register(alice()).await?;
        let (_, pair) = h.service.login(login_alice()).await?;

        assert!(matches!(
            h.service.refresh(Some(&pair.refresh_token)).await,
            Err(Error::Unauthorized(_))
        ));
        Ok(())
    }

    #[tokio::test]
    async fn authenticate_resolves_access_token() -> anyhow::Result<()> {
        let h = harness();
        let view = h.service.register(alice()).await?;
        let (_, pair) = h.service.login(login_alice()).await?;

        let current = h.service.authenticate(&pair.access_token).await?;
        assert_eq!(current.id, view.id);

        assert!(matches!(
            h.service.authenticate(&pair.refresh_token).await,
            Err(Error::Unauthorized(_))
        ));
        Ok(())
    }

    #[tokio::test]
    async fn concurrent_refreshes_with_one_token_rotate_once() -> anyhow::Result<()> {
        let h = harness();
        h.service.register(alice()).await?;
        let (_, original) = h.service.login(login_alice()).await?;

        let (first, second) = tokio::join!(
            h.service.refresh(Some(&original.refresh_token)),
            h.service.refresh(Some(&original.refresh_token)),
        );
        let winners: Vec<TokenPair> = [first, second].into_iter().filter_map(Result::ok).collect();
        assert_eq!(winners.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn rotation_only_replaces_the_presented_token() -> anyhow::Result<()> {
        let h = harness();
        let view = h.service.register(alice()).await?;
        h.store.set_refresh_token(view.id, Some("first")).await?;

        assert!(h.store.rotate_refresh_token(view.id, "first", "second").await?);
        assert!(!h.store.rotate_refresh_token(view.id, "first", "third").await?);
        assert_eq!(
            h.store.stored_refresh_token(view.id).await.as_deref(),
            Some("second")
        );
        Ok(())
    }

    #[tokio::test]
    async fn change_password_checks_old_password_and_confirmation() -> anyhow::Result<()> {
        let h = harness();
        let view = h.service.register(alice()).await?;

        let wrong_old = ChangePasswordInput {
            old_password: "nope".to_string(),
            new_password: "n3w".to_string(),
            confirm_password: None,
        };
        match h.service.change_password(view.id, wrong_old).await {
            Err(Error::Validation(message)) => assert_eq!(message, "Invalid old password"),
            other => panic!("expected validation error, got {other:?}"),
        }

        let mismatch = ChangePasswordInput {
            old_password: "s3cret".to_string(),
            new_password: "n3w".to_string(),
            confirm_password: Some("different".to_string()),
        };
        assert!(matches!(
            h.service.change_password(view.id, mismatch).await,
            Err(Error::Validation(_))
        ));

        let matching = ChangePasswordInput {
            old_password: "s3cret".to_string(),
            new_password: "n3w".to_string(),
            confirm_password: Some("n3w".to_string()),
        };
        let changed = h.service.change_password(view.id, matching).await?;
        assert!(changed.updated_at > view.updated_at);
        assert_eq!(changed.username, view.username);

        assert!(matches!(
            h.service.login(login_alice()).await,
            Err(Error::Unauthorized(_))
        ));
        let mut with_new = login_alice();
        with_new.password = "n3w".to_string();
        h.service.login(with_new).await?;
        Ok(())
    }

    #[tokio::test]
    async fn update_details_rejects_taken_email() -> anyhow::Result<()> {
        let h = harness();
        let alice = h.service.register(alice()).await?;
        let mut bob = self::alice();
        bob.username = "bob".to_string();
        bob.email = "b@x.com".to_string();
        h.service.register(bob).await?;

        let taken = DetailsInput {
            full_name: "Alice A.".to_string(),
            email: "b@x.com".to_string(),
        };
        assert!(matches!(
            h.service.update_details(alice.id, taken).await,
            Err(Error::Conflict(_))
        ));

        let updated = h
            .service
            .update_details(
                alice.id,
                DetailsInput {
                    full_name: " Alice A. ".to_string(),
                    email: "alice@x.com".to_string(),
                },
            )
            .await?;
        assert_eq!(updated.full_name, "Alice A.");
        assert_eq!(updated.email, "alice@x.com");
        Ok(())
    }

    #[tokio::test]
    async fn avatar_and_cover_updates() -> anyhow::Result<()> {
        let h = harness();
        let view = h.service.register(alice()).await?;

        let updated = h
            .service
            .update_avatar(view.id, Some(file("new-avatar.png")))
            .await?;
        assert_eq!(updated.avatar, "https://media.test/new-avatar.png");

        let updated = h
            .service
            .update_cover_image(view.id, Some(file("cover.png")))
            .await?;
        assert_eq!(updated.cover_image, "https://media.test/cover.png");

        assert!(matches!(
            h.service.update_avatar(view.id, None).await,
            Err(Error::Validation(_))
        ));
        Ok(())
    }

    #[tokio::test]
    async fn avatar_upload_failure_is_a_dependency_error() -> anyhow::Result<()> {
        let h = harness_with(FakeMediaHost::failing_on("broken.png"), token_config());
        let view = h.service.register(alice()).await?;

        assert!(matches!(
            h.service
                .update_avatar(view.id, Some(file("broken.png")))
                .await,
            Err(Error::Dependency(_))
        ));
        Ok(())
    }
}
