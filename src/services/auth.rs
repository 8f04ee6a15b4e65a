// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{NotificationRepository, UserRepository},
    models::{
        auth::{Claims, Role, User},
        notifications::{NotificationPriority, NotificationType},
    },
};

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    notification_repo: NotificationRepository,
    jwt_secret: String,
    pool: PgPool,
}

impl AuthService {
    pub fn new(
        user_repo: UserRepository,
        notification_repo: NotificationRepository,
        jwt_secret: String,
        pool: PgPool,
    ) -> Self {
        Self {
            user_repo,
            notification_repo,
            jwt_secret,
            pool,
        }
    }

    // Registro por auto-serviço: cria sempre um CUSTOMER. O papel nasce
    // aqui e só muda por ação de admin.
    pub async fn register_customer(
        &self,
        name: &str,
        email: &str,
        phone: Option<&str>,
        password: &str,
    ) -> Result<String, AppError> {
        // Hashing fora da transação (não toca no banco e é pesado).
        let password_clone = password.to_owned();
        let hashed_password =
            tokio::task::spawn_blocking(move || hash(&password_clone, bcrypt::DEFAULT_COST))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;

        let mut tx = self.pool.begin().await?;

        let new_user = self
            .user_repo
            .create_customer(&mut *tx, name, email, phone, &hashed_password)
            .await?;

        // Avisa a equipe que entrou cliente novo. Broadcast: user_id nulo.
        self.notification_repo
            .create(
                &mut *tx,
                NotificationType::ClientRegistration,
                "Novo cliente cadastrado",
                &format!("{} acabou de criar uma conta.", new_user.name),
                None,
                NotificationPriority::Normal,
                None,
            )
            .await?;

        tx.commit().await?;

        tracing::info!("✅ Cliente registrado: {}", new_user.email);
        self.create_token(new_user.id)
    }

    // Cadastro presencial feito pelo atendente: a conta nasce desativada
    // para login e carrega um código de convite de uso único.
    pub async fn register_walk_in_customer(
        &self,
        name: &str,
        email: &str,
        phone: Option<&str>,
    ) -> Result<(User, String), AppError> {
        let invitation_code = generate_invitation_code();

        // Senha-placeholder aleatória: a conta só vira utilizável depois
        // que o cliente aceitar o convite e definir a própria senha.
        let placeholder = Uuid::new_v4().to_string();
        let placeholder_hash =
            tokio::task::spawn_blocking(move || hash(&placeholder, bcrypt::DEFAULT_COST))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;

        let mut tx = self.pool.begin().await?;
        let user = self
            .user_repo
            .create_walk_in_customer(
                &mut *tx,
                name,
                email,
                phone,
                &placeholder_hash,
                &invitation_code,
            )
            .await?;
        tx.commit().await?;

        tracing::info!("🧾 Cadastro de balcão criado para {}", user.email);
        Ok((user, invitation_code))
    }

    // O cliente ativa a conta de balcão com o código entregue no recibo.
    pub async fn accept_invitation(&self, code: &str, password: &str) -> Result<String, AppError> {
        let user = self
            .user_repo
            .find_by_invitation_code(code)
            .await?
            .ok_or(AppError::InvitationInvalid)?;

        let password_clone = password.to_owned();
        let hashed_password =
            tokio::task::spawn_blocking(move || hash(&password_clone, bcrypt::DEFAULT_COST))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;

        let mut tx = self.pool.begin().await?;
        let user = self
            .user_repo
            .activate_invited(&mut *tx, user.id, &hashed_password)
            .await?;
        tx.commit().await?;

        self.create_token(user.id)
    }

    // Criação de staff/admin — rota exclusiva de admin.
    pub async fn create_member(
        &self,
        name: &str,
        email: &str,
        phone: Option<&str>,
        password: &str,
        role: Role,
        department: Option<&str>,
        permissions: &[String],
    ) -> Result<User, AppError> {
        let password_clone = password.to_owned();
        let hashed_password =
            tokio::task::spawn_blocking(move || hash(&password_clone, bcrypt::DEFAULT_COST))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;

        let mut tx = self.pool.begin().await?;
        let user = self
            .user_repo
            .create_member(
                &mut *tx,
                name,
                email,
                phone,
                &hashed_password,
                role,
                department,
                permissions,
            )
            .await?;
        tx.commit().await?;

        tracing::info!("✅ Novo membro da equipe: {} ({:?})", user.email, user.role);
        Ok(user)
    }

    // Cria o primeiro admin na subida do servidor (ADMIN_EMAIL +
    // ADMIN_PASSWORD no ambiente). Se o e-mail já existe, não faz nada.
    pub async fn bootstrap_admin(&self, email: &str, password: &str) -> Result<(), AppError> {
        if self.user_repo.find_by_email(email).await?.is_some() {
            return Ok(());
        }

        self.create_member(
            "Administrador",
            email,
            None,
            password,
            Role::Admin,
            None,
            &["reports:read".to_string(), "settings:write".to_string()],
        )
        .await?;

        tracing::info!("🔑 Admin inicial criado: {}", email);
        Ok(())
    }

    // ---
    // Gestão de contas (telas de admin/staff)
    // ---

    pub async fn list_users(&self, role: Role) -> Result<Vec<User>, AppError> {
        self.user_repo.list_by_role(&self.pool, role).await
    }

    // `only_customers` é a variante do staff: atendente só mexe em conta
    // de cliente, nunca de colega ou de admin.
    pub async fn set_user_active(
        &self,
        target_id: Uuid,
        is_active: bool,
        only_customers: bool,
    ) -> Result<User, AppError> {
        let target = self
            .user_repo
            .find_by_id(target_id)
            .await?
            .ok_or(AppError::UserNotFound)?;

        if only_customers && target.role != Role::Customer {
            // Não revela que a conta existe.
            return Err(AppError::UserNotFound);
        }

        let user = self
            .user_repo
            .set_active(&self.pool, target_id, is_active)
            .await?;
        tracing::info!(
            "👤 Conta {} {}",
            user.email,
            if is_active { "reativada" } else { "desativada" }
        );
        Ok(user)
    }

    pub async fn update_user_role(
        &self,
        target_id: Uuid,
        role: Role,
        department: Option<&str>,
    ) -> Result<User, AppError> {
        let user = self
            .user_repo
            .update_role(&self.pool, target_id, role, department)
            .await?;
        tracing::info!("👤 Papel de {} agora é {:?}", user.email, user.role);
        Ok(user)
    }

    pub async fn login_user(&self, email: &str, password: &str) -> Result<String, AppError> {
        let user = self
            .user_repo
            .find_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password_clone = password.to_owned();
        let password_hash_clone = user.password_hash.clone();

        // Executa a verificação em uma thread separada
        let is_password_valid =
            tokio::task::spawn_blocking(move || verify(&password_clone, &password_hash_clone))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        // Conta desativada não entra, mesmo com a senha certa.
        if !user.is_active {
            return Err(AppError::AccountDeactivated);
        }

        self.create_token(user.id)
    }

    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let validation = Validation::default();
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &validation,
        )
        .map_err(|_| AppError::InvalidToken)?;

        self.user_repo
            .find_by_id(token_data.claims.sub)
            .await?
            .ok_or(AppError::UserNotFound)
    }

    fn create_token(&self, user_id: Uuid) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(7);

        let claims = Claims {
            sub: user_id,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}

// Código curto e legível para o recibo impresso (sem 0/O, 1/I).
fn generate_invitation_code() -> String {
    const ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
    let uuid = Uuid::new_v4();
    uuid.as_bytes()
        .iter()
        .take(8)
        .map(|b| ALPHABET[(*b as usize) % ALPHABET.len()] as char)
        .collect()
}
