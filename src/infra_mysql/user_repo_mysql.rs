use super::util::store_error;
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{DateTime, Utc};
use sqlx::mysql::{MySqlQueryResult, MySqlRow};
use sqlx::{MySqlPool, Row};

const SELECT_USER: &str = r#"
SELECT u.id AS id,
       u.userName AS user_name,
       u.email AS email,
       u.password AS password,
       u.isActive AS is_active,
       u.roleId AS role_id,
       r.role AS role,
       u.activationHash AS activation_hash,
       u.activationHashGenTs AS activation_hash_gen_ts,
       u.pwResetHash AS pw_reset_hash,
       u.pwResetHashGenTs AS pw_reset_hash_gen_ts,
       u.created AS created
FROM users u
INNER JOIN users_roles r ON r.id = u.roleId
"#;

/// Result column names of `SELECT_USER`.
mod col {
    pub const ID: &str = "id";
    pub const USER_NAME: &str = "user_name";
    pub const EMAIL: &str = "email";
    pub const PASSWORD: &str = "password";
    pub const IS_ACTIVE: &str = "is_active";
    pub const ROLE_ID: &str = "role_id";
    pub const ROLE: &str = "role";
    pub const ACTIVATION_HASH: &str = "activation_hash";
    pub const ACTIVATION_HASH_GEN_TS: &str = "activation_hash_gen_ts";
    pub const PW_RESET_HASH: &str = "pw_reset_hash";
    pub const PW_RESET_HASH_GEN_TS: &str = "pw_reset_hash_gen_ts";
    pub const CREATED: &str = "created";

    #[cfg(test)]
    pub const ALL: [&str; 12] = [
        ID,
        USER_NAME,
        EMAIL,
        PASSWORD,
        IS_ACTIVE,
        ROLE_ID,
        ROLE,
        ACTIVATION_HASH,
        ACTIVATION_HASH_GEN_TS,
        PW_RESET_HASH,
        PW_RESET_HASH_GEN_TS,
        CREATED,
    ];
}

pub struct MySqlUserRepo {
    pool: MySqlPool,
}

impl MySqlUserRepo {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlUserRepo { pool }
    }

    #[inline]
    fn token_columns(purpose: TokenPurpose) -> (&'static str, &'static str) {
        match purpose {
            TokenPurpose::Activation => ("activationHash", "activationHashGenTs"),
            TokenPurpose::PasswordReset => ("pwResetHash", "pwResetHashGenTs"),
        }
    }

    fn row_to_record(row: MySqlRow) -> Result<UserRecord, StoreError> {
        let id: u64 = row.try_get(col::ID).map_err(store_error)?;
        let role_id: u64 = row.try_get(col::ROLE_ID).map_err(store_error)?;
        let role: String = row.try_get(col::ROLE).map_err(store_error)?;

        let user_name: String = row.try_get(col::USER_NAME).map_err(store_error)?;
        let email: String = row.try_get(col::EMAIL).map_err(store_error)?;
        let password_hash: String = row.try_get(col::PASSWORD).map_err(store_error)?;
        let is_active: bool = row.try_get(col::IS_ACTIVE).map_err(store_error)?;

        let activation_hash: Option<String> =
            row.try_get(col::ACTIVATION_HASH).map_err(store_error)?;
        let activation_hash_gen_ts: Option<DateTime<Utc>> =
            row.try_get(col::ACTIVATION_HASH_GEN_TS).map_err(store_error)?;
        let pw_reset_hash: Option<String> = row.try_get(col::PW_RESET_HASH).map_err(store_error)?;
        let pw_reset_hash_gen_ts: Option<DateTime<Utc>> =
            row.try_get(col::PW_RESET_HASH_GEN_TS).map_err(store_error)?;
        let created: DateTime<Utc> = row.try_get(col::CREATED).map_err(store_error)?;

        Ok(UserRecord {
            id: UserId(id),
            user_name,
            email,
            password_hash,
            is_active,
            role: Role {
                id: RoleId(role_id),
                name: role,
            },
            activation_hash,
            activation_hash_gen_ts,
            pw_reset_hash,
            pw_reset_hash_gen_ts,
            created,
        })
    }

    fn expect_row(result: MySqlQueryResult) -> Result<(), StoreError> {
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl UserRepo for MySqlUserRepo {
    async fn find_by(
        &self,
        column: LookupColumn,
        value: &str,
    ) -> Result<Option<UserRecord>, StoreError> {
        let sql = format!("{SELECT_USER} WHERE u.{} = ? LIMIT 1", column.as_str());

        let row_opt: Option<MySqlRow> = sqlx::query(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error)?;

        row_opt.map(Self::row_to_record).transpose()
    }

    async fn find_by_token_hash(
        &self,
        purpose: TokenPurpose,
        hash: &str,
    ) -> Result<Option<UserRecord>, StoreError> {
        let (hash_column, _) = Self::token_columns(purpose);
        let sql = format!("{SELECT_USER} WHERE u.{hash_column} = ? LIMIT 1");

        let row_opt: Option<MySqlRow> = sqlx::query(&sql)
            .bind(hash)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error)?;

        row_opt.map(Self::row_to_record).transpose()
    }

    async fn exists(&self, column: LookupColumn, value: &str) -> Result<bool, StoreError> {
        let sql = format!("SELECT COUNT(*) FROM users WHERE {} = ?", column.as_str());

        let count: i64 = sqlx::query_scalar(&sql)
            .bind(value)
            .fetch_one(&self.pool)
            .await
            .map_err(store_error)?;

        Ok(count > 0)
    }

    async fn create(&self, user: NewUser) -> Result<UserId, StoreError> {
        let (activation_hash, activation_hash_gen_ts) = match user.activation {
            Some(token) => (Some(token.hash), Some(token.generated_at)),
            None => (None, None),
        };

        let result = sqlx::query(
            r#"
INSERT INTO users (userName, email, password, isActive, roleId, activationHash, activationHashGenTs, created)
VALUES (?, ?, ?, ?, ?, ?, ?, ?)
"#,
        )
        .bind(&user.user_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.is_active)
        .bind(user.role_id.0)
        .bind(activation_hash)
        .bind(activation_hash_gen_ts)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(UserId(result.last_insert_id()))
    }

    async fn set_token(
        &self,
        user_id: UserId,
        purpose: TokenPurpose,
        token: Option<IssuedToken>,
    ) -> Result<(), StoreError> {
        let (hash_column, ts_column) = Self::token_columns(purpose);
        let (hash, generated_at) = match token {
            Some(t) => (Some(t.hash), Some(t.generated_at)),
            None => (None, None),
        };
        let sql = format!("UPDATE users SET {hash_column} = ?, {ts_column} = ? WHERE id = ?");

        let result = sqlx::query(&sql)
            .bind(hash)
            .bind(generated_at)
            .bind(user_id.0)
            .execute(&self.pool)
            .await
            .map_err(store_error)?;

        Self::expect_row(result)
    }

    async fn activate(&self, user_id: UserId) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
UPDATE users
SET isActive = 1, activationHash = NULL, activationHashGenTs = NULL
WHERE id = ?
"#,
        )
        .bind(user_id.0)
        .execute(&self.pool)
        .await
        .map_err(store_error)?;

        Self::expect_row(result)
    }

    async fn update_password(
        &self,
        user_id: UserId,
        password_hash: &str,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
UPDATE users
SET password = ?, pwResetHash = NULL, pwResetHashGenTs = NULL
WHERE id = ?
"#,
        )
        .bind(password_hash)
        .bind(user_id.0)
        .execute(&self.pool)
        .await
        .map_err(store_error)?;

        Self::expect_row(result)
    }
}
