use sqlx::{QueryBuilder, SqliteConnection};

use crate::{
    db_types::{CustomerProfile, NewUser, ProfileUpdate, Role, User},
    sqlite::map_insert_error,
    traits::StorageError,
};

pub async fn insert_user(user: NewUser, conn: &mut SqliteConnection) -> Result<User, StorageError> {
    let language = user.language.unwrap_or_else(|| "en".to_string());
    sqlx::query_as::<_, User>(
        r#"
            INSERT INTO users (name, phone, email, password_hash, role, language)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *;
        "#,
    )
    .bind(user.name)
    .bind(user.phone)
    .bind(user.email)
    .bind(user.password_hash)
    .bind(user.role)
    .bind(language)
    .fetch_one(conn)
    .await
    .map_err(|e| map_insert_error(e, "a user with that email or phone already exists"))
}

pub async fn fetch_user(id: i64, conn: &mut SqliteConnection) -> Result<Option<User>, StorageError> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(user)
}

pub async fn fetch_user_by_email(email: &str, conn: &mut SqliteConnection) -> Result<Option<User>, StorageError> {
    let user =
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1").bind(email).fetch_optional(conn).await?;
    Ok(user)
}

pub async fn fetch_user_by_phone(phone: &str, conn: &mut SqliteConnection) -> Result<Option<User>, StorageError> {
    let user =
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE phone = $1").bind(phone).fetch_optional(conn).await?;
    Ok(user)
}

pub async fn fetch_users_by_role(role: Role, conn: &mut SqliteConnection) -> Result<Vec<User>, StorageError> {
    let users = sqlx::query_as::<_, User>("SELECT * FROM users WHERE role = $1 ORDER BY id ASC")
        .bind(role)
        .fetch_all(conn)
        .await?;
    Ok(users)
}

pub async fn fetch_profile(user_id: i64, conn: &mut SqliteConnection) -> Result<Option<CustomerProfile>, StorageError> {
    let profile = sqlx::query_as::<_, CustomerProfile>("SELECT * FROM customer_profiles WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(conn)
        .await?;
    Ok(profile)
}

pub async fn upsert_profile(
    user_id: i64,
    update: ProfileUpdate,
    conn: &mut SqliteConnection,
) -> Result<CustomerProfile, StorageError> {
    match fetch_profile(user_id, conn).await? {
        None => insert_profile(user_id, update, conn).await,
        Some(_) => update_profile(user_id, update, conn).await,
    }
}

async fn insert_profile(
    user_id: i64,
    update: ProfileUpdate,
    conn: &mut SqliteConnection,
) -> Result<CustomerProfile, StorageError> {
    let profile = sqlx::query_as::<_, CustomerProfile>(
        r#"
            INSERT INTO customer_profiles (user_id, address, city, state, postal_code, latitude, longitude)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *;
        "#,
    )
    .bind(user_id)
    .bind(update.address)
    .bind(update.city)
    .bind(update.state)
    .bind(update.postal_code)
    .bind(update.latitude)
    .bind(update.longitude)
    .fetch_one(conn)
    .await?;
    Ok(profile)
}

async fn update_profile(
    user_id: i64,
    update: ProfileUpdate,
    conn: &mut SqliteConnection,
) -> Result<CustomerProfile, StorageError> {
    let mut builder = QueryBuilder::new("UPDATE customer_profiles SET ");
    let mut set_clause = builder.separated(", ");
    if let Some(address) = update.address {
        set_clause.push("address = ");
        set_clause.push_bind_unseparated(address);
    }
    if let Some(city) = update.city {
        set_clause.push("city = ");
        set_clause.push_bind_unseparated(city);
    }
    if let Some(state) = update.state {
        set_clause.push("state = ");
        set_clause.push_bind_unseparated(state);
    }
    if let Some(postal_code) = update.postal_code {
        set_clause.push("postal_code = ");
        set_clause.push_bind_unseparated(postal_code);
    }
    if let Some(latitude) = update.latitude {
        set_clause.push("latitude = ");
        set_clause.push_bind_unseparated(latitude);
    }
    if let Some(longitude) = update.longitude {
        set_clause.push("longitude = ");
        set_clause.push_bind_unseparated(longitude);
    }
    // An all-empty update is a valid no-op; the terminal user_id assignment keeps the SQL well-formed.
    set_clause.push("user_id = user_id");
    builder.push(" WHERE user_id = ");
    builder.push_bind(user_id);
    builder.build().execute(&mut *conn).await?;
    let profile = fetch_profile(user_id, conn)
        .await?
        .ok_or_else(|| StorageError::QueryError(format!("customer profile for user {user_id} vanished mid-update")))?;
    Ok(profile)
}
