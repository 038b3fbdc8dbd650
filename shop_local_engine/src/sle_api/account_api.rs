use log::*;

use crate::{
    db_types::{CustomerProfile, NewUser, ProfileUpdate, Role, User},
    sle_api::errors::AccountApiError,
    traits::{StorageError, UserManagement},
};

/// API for user accounts and customer profiles. Password hashing and token issuance live in the server crate; this
/// API only stores and retrieves the records.
pub struct AccountApi<B> {
    db: B,
}

impl<B> AccountApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> AccountApi<B>
where B: UserManagement
{
    pub async fn register(&self, user: NewUser) -> Result<User, AccountApiError> {
        match self.db.create_user(user).await {
            Ok(user) => {
                info!("👤️ Registered {} account #{} ({})", user.role, user.id, user.name);
                Ok(user)
            },
            Err(StorageError::DuplicateRecord(_)) => Err(AccountApiError::DuplicateAccount),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn user_by_id(&self, id: i64) -> Result<User, AccountApiError> {
        self.db.fetch_user(id).await?.ok_or(AccountApiError::UserNotFound(id))
    }

    pub async fn user_by_email(&self, email: &str) -> Result<Option<User>, AccountApiError> {
        Ok(self.db.fetch_user_by_email(email).await?)
    }

    pub async fn user_by_phone(&self, phone: &str) -> Result<Option<User>, AccountApiError> {
        Ok(self.db.fetch_user_by_phone(phone).await?)
    }

    pub async fn users_with_role(&self, role: Role) -> Result<Vec<User>, AccountApiError> {
        Ok(self.db.fetch_users_by_role(role).await?)
    }

    pub async fn profile(&self, user_id: i64) -> Result<Option<CustomerProfile>, AccountApiError> {
        Ok(self.db.fetch_customer_profile(user_id).await?)
    }

    pub async fn update_profile(
        &self,
        user_id: i64,
        update: ProfileUpdate,
    ) -> Result<CustomerProfile, AccountApiError> {
        Ok(self.db.upsert_customer_profile(user_id, update).await?)
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}
