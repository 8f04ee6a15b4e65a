// src/db/user_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::auth::{Role, User},
};

// O repositório de usuários, responsável por todas as interações com a
// tabela 'users'. Leituras simples usam a pool; escritas aceitam um
// executor genérico para rodarem dentro da transação do chamador.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Busca um usuário pelo seu e-mail
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    // Busca um usuário pelo seu ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn find_by_invitation_code(&self, code: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE invitation_code = $1 AND activated = FALSE",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn list_by_role<'e, E>(&self, executor: E, role: Role) -> Result<Vec<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let users = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE role = $1 ORDER BY name ASC",
        )
        .bind(role)
        .fetch_all(executor)
        .await?;
        Ok(users)
    }

    // Cria um cliente por auto-serviço (papel definido aqui, uma única vez).
    pub async fn create_customer<'e, E>(
        &self,
        executor: E,
        name: &str,
        email: &str,
        phone: Option<&str>,
        password_hash: &str,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, phone, password_hash, role)
            VALUES ($1, $2, $3, $4, 'CUSTOMER')
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(phone)
        .bind(password_hash)
        .fetch_one(executor)
        .await
        .map_err(unique_email_to_conflict)
    }

    // Cadastro presencial: o atendente cria a conta desativada para login,
    // com código de convite; o cliente ativa depois definindo a senha.
    pub async fn create_walk_in_customer<'e, E>(
        &self,
        executor: E,
        name: &str,
        email: &str,
        phone: Option<&str>,
        placeholder_hash: &str,
        invitation_code: &str,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, phone, password_hash, role, invitation_code, activated)
            VALUES ($1, $2, $3, $4, 'CUSTOMER', $5, FALSE)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(phone)
        .bind(placeholder_hash)
        .bind(invitation_code)
        .fetch_one(executor)
        .await
        .map_err(unique_email_to_conflict)
    }

    // Criação de staff/admin: só acontece por ação de um admin.
    pub async fn create_member<'e, E>(
        &self,
        executor: E,
        name: &str,
        email: &str,
        phone: Option<&str>,
        password_hash: &str,
        role: Role,
        department: Option<&str>,
        permissions: &[String],
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, phone, password_hash, role, department, permissions)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(phone)
        .bind(password_hash)
        .bind(role)
        .bind(department)
        .bind(permissions)
        .fetch_one(executor)
        .await
        .map_err(unique_email_to_conflict)
    }

    // Ativa uma conta de balcão: grava a senha escolhida e queima o convite.
    pub async fn activate_invited<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        password_hash: &str,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET password_hash = $2, activated = TRUE, invitation_code = NULL, updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(password_hash)
        .fetch_optional(executor)
        .await?;
        user.ok_or(AppError::UserNotFound)
    }

    // Desativação branda (soft): a conta nunca é apagada.
    pub async fn set_active<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        is_active: bool,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = sqlx::query_as::<_, User>(
            "UPDATE users SET is_active = $2, updated_at = now() WHERE id = $1 RETURNING *",
        )
        .bind(user_id)
        .bind(is_active)
        .fetch_optional(executor)
        .await?;
        user.ok_or(AppError::UserNotFound)
    }

    // Mudança de papel: exclusividade de admin.
    pub async fn update_role<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        role: Role,
        department: Option<&str>,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = sqlx::query_as::<_, User>(
            "UPDATE users SET role = $2, department = $3, updated_at = now() WHERE id = $1 RETURNING *",
        )
        .bind(user_id)
        .bind(role)
        .bind(department)
        .fetch_optional(executor)
        .await?;
        user.ok_or(AppError::UserNotFound)
    }
}

// Violations de unicidade no e-mail viram o erro de negócio certo.
fn unique_email_to_conflict(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            let constraint = db_err.constraint().unwrap_or_default();
            if constraint.contains("email") {
                return AppError::EmailAlreadyExists;
            }
        }
    }
    AppError::DatabaseError(e)
}
