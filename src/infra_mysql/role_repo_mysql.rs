use super::util::store_error;
use crate::domain_model::*;
use crate::domain_port::*;
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};

pub struct MySqlRoleRepo {
    pool: MySqlPool,
}

impl MySqlRoleRepo {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlRoleRepo { pool }
    }

    fn row_to_role(row: MySqlRow) -> Result<Role, StoreError> {
        let id: u64 = row.try_get("id").map_err(store_error)?;
        let name: String = row.try_get("role").map_err(store_error)?;
        Ok(Role {
            id: RoleId(id),
            name,
        })
    }
}

#[async_trait::async_trait]
impl RoleRepo for MySqlRoleRepo {
    async fn find_by_name(&self, name: &str) -> Result<Option<Role>, StoreError> {
        let row_opt: Option<MySqlRow> =
            sqlx::query("SELECT id, role FROM users_roles WHERE role = ? LIMIT 1")
                .bind(name)
                .fetch_optional(&self.pool)
                .await
                .map_err(store_error)?;

        row_opt.map(Self::row_to_role).transpose()
    }
}
