use crate::{
    db_types::{CustomerProfile, NewUser, ProfileUpdate, Role, User},
    traits::StorageError,
};

#[allow(async_fn_in_trait)]
pub trait UserManagement {
    /// Creates a new user. Email and phone, where supplied, must be unique; a clash returns
    /// [`StorageError::DuplicateRecord`].
    async fn create_user(&self, user: NewUser) -> Result<User, StorageError>;

    async fn fetch_user(&self, id: i64) -> Result<Option<User>, StorageError>;

    async fn fetch_user_by_email(&self, email: &str) -> Result<Option<User>, StorageError>;

    async fn fetch_user_by_phone(&self, phone: &str) -> Result<Option<User>, StorageError>;

    async fn fetch_users_by_role(&self, role: Role) -> Result<Vec<User>, StorageError>;

    async fn fetch_customer_profile(&self, user_id: i64) -> Result<Option<CustomerProfile>, StorageError>;

    /// Creates the profile row if the user has none, otherwise applies the update to the existing row.
    async fn upsert_customer_profile(
        &self,
        user_id: i64,
        update: ProfileUpdate,
    ) -> Result<CustomerProfile, StorageError>;
}
