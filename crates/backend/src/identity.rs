//! Identity and session service.
//!
//! Two independent account realms share one credential scheme: sellers live
//! in the `users` collection, buyers in `buyers`. Which realm an identity
//! belongs to is decided by which profile collection holds a document for
//! it, not by a claim on the identity itself, so authentication re-checks
//! collection membership on every request.
//!
//! Sessions are bearer tokens stored in the `sessions` collection; signing
//! out deletes the session document.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shoplane_core::{AccountRealm, Buyer, BuyerId, Email, EmailError, Seller, SellerId, SessionToken};

use crate::datastore::{Datastore, DatastoreError, Filter, collections};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Errors from identity operations.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// The email address is malformed.
    #[error("invalid email address: {0}")]
    InvalidEmail(#[from] EmailError),

    /// The password does not meet requirements.
    #[error("{0}")]
    WeakPassword(String),

    /// An account with this email already exists in the realm.
    #[error("an account with this email already exists")]
    AccountExists,

    /// Wrong email or password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// No valid session for the presented token.
    #[error("not signed in")]
    NotSignedIn,

    /// Password hashing or verification machinery failed.
    #[error("password hashing failed: {0}")]
    Hash(String),

    /// Underlying datastore failure.
    #[error(transparent)]
    Datastore(#[from] DatastoreError),
}

/// An authenticated session, resolved from a bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub token: SessionToken,
    pub realm: AccountRealm,
    /// Buyer or seller ID depending on `realm`.
    pub account_id: Uuid,
    pub email: Email,
    pub created_at: DateTime<Utc>,
}

/// Identity/session service over the datastore.
#[derive(Clone)]
pub struct IdentityService {
    store: Datastore,
}

impl IdentityService {
    /// Create the service.
    #[must_use]
    pub const fn new(store: Datastore) -> Self {
        Self { store }
    }

    // =========================================================================
    // Sign-up
    // =========================================================================

    /// Register a buyer account.
    ///
    /// # Errors
    ///
    /// Returns `InvalidEmail`, `WeakPassword`, or `AccountExists` on
    /// validation failure.
    pub async fn sign_up_buyer(
        &self,
        email: &str,
        password: &str,
        display_name: Option<String>,
    ) -> Result<Buyer, IdentityError> {
        let email = Email::parse(email)?;
        validate_password(password)?;
        self.ensure_email_free(collections::BUYERS, &email).await?;

        let buyer = Buyer {
            id: BuyerId::generate(),
            email,
            display_name,
            password_hash: hash_password(password)?,
            created_at: Utc::now(),
        };
        self.store
            .insert(collections::BUYERS, buyer.id.as_uuid(), &buyer)
            .await?;
        Ok(buyer)
    }

    /// Register a seller ("user") account.
    ///
    /// # Errors
    ///
    /// Returns `InvalidEmail`, `WeakPassword`, or `AccountExists` on
    /// validation failure.
    pub async fn sign_up_seller(
        &self,
        email: &str,
        password: &str,
        display_name: Option<String>,
    ) -> Result<Seller, IdentityError> {
        let email = Email::parse(email)?;
        validate_password(password)?;
        self.ensure_email_free(collections::USERS, &email).await?;

        let seller = Seller {
            id: SellerId::generate(),
            email,
            display_name,
            password_hash: hash_password(password)?,
            created_at: Utc::now(),
        };
        self.store
            .insert(collections::USERS, seller.id.as_uuid(), &seller)
            .await?;
        Ok(seller)
    }

    // =========================================================================
    // Sign-in / sign-out
    // =========================================================================

    /// Sign a buyer in, creating a session.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCredentials` when the email or password is wrong.
    pub async fn sign_in_buyer(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(Buyer, AuthSession), IdentityError> {
        let email = Email::parse(email).map_err(|_| IdentityError::InvalidCredentials)?;
        let buyer: Buyer = self
            .find_by_email(collections::BUYERS, &email)
            .await?
            .ok_or(IdentityError::InvalidCredentials)?;
        verify_password(password, &buyer.password_hash)?;

        let session = self
            .create_session(AccountRealm::Buyer, buyer.id.as_uuid(), buyer.email.clone())
            .await?;
        Ok((buyer, session))
    }

    /// Sign a seller in, creating a session.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCredentials` when the email or password is wrong.
    pub async fn sign_in_seller(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(Seller, AuthSession), IdentityError> {
        let email = Email::parse(email).map_err(|_| IdentityError::InvalidCredentials)?;
        let seller: Seller = self
            .find_by_email(collections::USERS, &email)
            .await?
            .ok_or(IdentityError::InvalidCredentials)?;
        verify_password(password, &seller.password_hash)?;

        let session = self
            .create_session(
                AccountRealm::Seller,
                seller.id.as_uuid(),
                seller.email.clone(),
            )
            .await?;
        Ok((seller, session))
    }

    /// Delete the session for a token. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns `Datastore` on storage failure.
    pub async fn sign_out(&self, token: SessionToken) -> Result<(), IdentityError> {
        self.store
            .delete(collections::SESSIONS, token.as_uuid())
            .await?;
        Ok(())
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Resolve a bearer token to its session.
    ///
    /// # Errors
    ///
    /// Returns `NotSignedIn` when the token has no session.
    pub async fn authenticate(&self, token: SessionToken) -> Result<AuthSession, IdentityError> {
        self.store
            .get(collections::SESSIONS, token.as_uuid())
            .await?
            .ok_or(IdentityError::NotSignedIn)
    }

    /// Resolve a token to a buyer, enforcing realm membership.
    ///
    /// # Errors
    ///
    /// Returns `NotSignedIn` if the token is invalid, the session belongs to
    /// the seller realm, or the buyer profile no longer exists.
    pub async fn authenticated_buyer(&self, token: SessionToken) -> Result<Buyer, IdentityError> {
        let session = self.authenticate(token).await?;
        if session.realm != AccountRealm::Buyer {
            return Err(IdentityError::NotSignedIn);
        }
        self.store
            .get(collections::BUYERS, session.account_id)
            .await?
            .ok_or(IdentityError::NotSignedIn)
    }

    /// Resolve a token to a seller, enforcing realm membership.
    ///
    /// # Errors
    ///
    /// Returns `NotSignedIn` if the token is invalid, the session belongs to
    /// the buyer realm, or the seller profile no longer exists.
    pub async fn authenticated_seller(
        &self,
        token: SessionToken,
    ) -> Result<Seller, IdentityError> {
        let session = self.authenticate(token).await?;
        if session.realm != AccountRealm::Seller {
            return Err(IdentityError::NotSignedIn);
        }
        self.store
            .get(collections::USERS, session.account_id)
            .await?
            .ok_or(IdentityError::NotSignedIn)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    async fn create_session(
        &self,
        realm: AccountRealm,
        account_id: Uuid,
        email: Email,
    ) -> Result<AuthSession, IdentityError> {
        let session = AuthSession {
            token: SessionToken::generate(),
            realm,
            account_id,
            email,
            created_at: Utc::now(),
        };
        self.store
            .insert(collections::SESSIONS, session.token.as_uuid(), &session)
            .await?;
        Ok(session)
    }

    async fn ensure_email_free(
        &self,
        collection: &'static str,
        email: &Email,
    ) -> Result<(), IdentityError> {
        let existing: Vec<serde_json::Value> = self
            .store
            .query(
                collection,
                &Filter::new().field("email", email.as_str()),
            )
            .await?;
        if existing.is_empty() {
            Ok(())
        } else {
            Err(IdentityError::AccountExists)
        }
    }

    async fn find_by_email<T: serde::de::DeserializeOwned>(
        &self,
        collection: &'static str,
        email: &Email,
    ) -> Result<Option<T>, IdentityError> {
        let mut matches: Vec<T> = self
            .store
            .query(
                collection,
                &Filter::new().field("email", email.as_str()),
            )
            .await?;
        Ok(if matches.is_empty() {
            None
        } else {
            Some(matches.swap_remove(0))
        })
    }
}

fn validate_password(password: &str) -> Result<(), IdentityError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(IdentityError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

fn hash_password(password: &str) -> Result<String, IdentityError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| IdentityError::Hash(e.to_string()))
}

fn verify_password(password: &str, hash: &str) -> Result<(), IdentityError> {
    let parsed = PasswordHash::new(hash).map_err(|e| IdentityError::Hash(e.to_string()))?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| IdentityError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn service() -> IdentityService {
        IdentityService::new(Datastore::new())
    }

    #[tokio::test]
    async fn test_sign_up_and_sign_in_buyer() {
        let identity = service();
        identity
            .sign_up_buyer("buyer@example.com", "correct horse", None)
            .await
            .unwrap();

        let (buyer, session) = identity
            .sign_in_buyer("buyer@example.com", "correct horse")
            .await
            .unwrap();
        assert_eq!(session.realm, AccountRealm::Buyer);

        let resolved = identity.authenticated_buyer(session.token).await.unwrap();
        assert_eq!(resolved.id, buyer.id);
    }

    #[tokio::test]
    async fn test_wrong_password_rejected() {
        let identity = service();
        identity
            .sign_up_buyer("buyer@example.com", "correct horse", None)
            .await
            .unwrap();

        let err = identity
            .sign_in_buyer("buyer@example.com", "wrong horse")
            .await
            .unwrap_err();
        assert!(matches!(err, IdentityError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected_per_realm() {
        let identity = service();
        identity
            .sign_up_buyer("same@example.com", "password-1", None)
            .await
            .unwrap();

        let err = identity
            .sign_up_buyer("same@example.com", "password-2", None)
            .await
            .unwrap_err();
        assert!(matches!(err, IdentityError::AccountExists));

        // The realms are independent: the same email can hold a seller account.
        assert!(
            identity
                .sign_up_seller("same@example.com", "password-3", None)
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_realm_membership_enforced() {
        let identity = service();
        identity
            .sign_up_seller("seller@example.com", "long enough", None)
            .await
            .unwrap();
        let (_, session) = identity
            .sign_in_seller("seller@example.com", "long enough")
            .await
            .unwrap();

        let err = identity.authenticated_buyer(session.token).await.unwrap_err();
        assert!(matches!(err, IdentityError::NotSignedIn));
    }

    #[tokio::test]
    async fn test_sign_out_invalidates_token() {
        let identity = service();
        identity
            .sign_up_buyer("buyer@example.com", "correct horse", None)
            .await
            .unwrap();
        let (_, session) = identity
            .sign_in_buyer("buyer@example.com", "correct horse")
            .await
            .unwrap();

        identity.sign_out(session.token).await.unwrap();
        let err = identity.authenticate(session.token).await.unwrap_err();
        assert!(matches!(err, IdentityError::NotSignedIn));
    }

    #[tokio::test]
    async fn test_short_password_rejected() {
        let identity = service();
        let err = identity
            .sign_up_buyer("other@example.com", "short", None)
            .await
            .unwrap_err();
        assert!(matches!(err, IdentityError::WeakPassword(_)));
    }
}
