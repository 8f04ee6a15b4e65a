// src/handlers/users.rs
//
// Gestão de contas: admin administra equipe e clientes; o atendente só
// cadastra e ativa/desativa clientes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::rbac::{RequireRole, RoleAdmin, RoleStaff},
    models::auth::{Role, User},
};

// ---
// Payload: criação de membro da equipe (staff/admin)
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateMemberPayload {
    #[validate(length(min = 2, message = "O nome é obrigatório."))]
    pub name: String,
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
    pub phone: Option<String>,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,
    pub role: Role,
    pub department: Option<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
}

impl CreateMemberPayload {
    // Cliente não entra por aqui: nasce no registro ou no balcão.
    fn validate_role(&self) -> Result<(), ValidationError> {
        if self.role == Role::Customer {
            return Err(ValidationError::new("MemberRoleOnly"));
        }
        Ok(())
    }
}

#[utoipa::path(
    post,
    path = "/api/admin/staff",
    request_body = CreateMemberPayload,
    responses((status = 201, body = User)),
    security(("api_jwt" = [])),
    tag = "Admin"
)]
pub async fn create_member(
    State(app_state): State<AppState>,
    _guard: RequireRole<RoleAdmin>,
    Json(payload): Json<CreateMemberPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;
    payload.validate_role().map_err(|e| {
        let mut errors = validator::ValidationErrors::new();
        errors.add("role", e);
        AppError::ValidationError(errors)
    })?;

    let user = app_state
        .auth_service
        .create_member(
            &payload.name,
            &payload.email,
            payload.phone.as_deref(),
            &payload.password,
            payload.role,
            payload.department.as_deref(),
            &payload.permissions,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(user)))
}

#[utoipa::path(
    get,
    path = "/api/admin/staff",
    responses((status = 200, body = [User])),
    security(("api_jwt" = [])),
    tag = "Admin"
)]
pub async fn list_staff(
    State(app_state): State<AppState>,
    _guard: RequireRole<RoleAdmin>,
) -> Result<impl IntoResponse, AppError> {
    let staff = app_state.auth_service.list_users(Role::Staff).await?;
    Ok((StatusCode::OK, Json(staff)))
}

#[utoipa::path(
    get,
    path = "/api/admin/customers",
    responses((status = 200, body = [User])),
    security(("api_jwt" = [])),
    tag = "Admin"
)]
pub async fn list_customers(
    State(app_state): State<AppState>,
    _guard: RequireRole<RoleAdmin>,
) -> Result<impl IntoResponse, AppError> {
    let customers = app_state.auth_service.list_users(Role::Customer).await?;
    Ok((StatusCode::OK, Json(customers)))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetActivePayload {
    pub is_active: bool,
}

#[utoipa::path(
    post,
    path = "/api/admin/users/{id}/active",
    params(("id" = Uuid, Path, description = "ID do usuário")),
    request_body = SetActivePayload,
    responses((status = 200, body = User)),
    security(("api_jwt" = [])),
    tag = "Admin"
)]
pub async fn admin_set_active(
    State(app_state): State<AppState>,
    _guard: RequireRole<RoleAdmin>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<SetActivePayload>,
) -> Result<impl IntoResponse, AppError> {
    let user = app_state
        .auth_service
        .set_user_active(user_id, payload.is_active, false)
        .await?;
    Ok((StatusCode::OK, Json(user)))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRolePayload {
    pub role: Role,
    pub department: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/admin/users/{id}/role",
    params(("id" = Uuid, Path, description = "ID do usuário")),
    request_body = UpdateRolePayload,
    responses((status = 200, body = User)),
    security(("api_jwt" = [])),
    tag = "Admin"
)]
pub async fn update_role(
    State(app_state): State<AppState>,
    _guard: RequireRole<RoleAdmin>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<UpdateRolePayload>,
) -> Result<impl IntoResponse, AppError> {
    let user = app_state
        .auth_service
        .update_user_role(user_id, payload.role, payload.department.as_deref())
        .await?;
    Ok((StatusCode::OK, Json(user)))
}

// ---
// Rotas do atendente (balcão)
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterCustomerPayload {
    #[validate(length(min = 2, message = "O nome é obrigatório."))]
    pub name: String,
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
    pub phone: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredCustomerResponse {
    pub user: User,
    pub invitation_code: String,
}

#[utoipa::path(
    post,
    path = "/api/staff/customers",
    request_body = RegisterCustomerPayload,
    responses((status = 201, body = RegisteredCustomerResponse)),
    security(("api_jwt" = [])),
    tag = "Staff"
)]
pub async fn register_customer(
    State(app_state): State<AppState>,
    _guard: RequireRole<RoleStaff>,
    Json(payload): Json<RegisterCustomerPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let (user, invitation_code) = app_state
        .auth_service
        .register_walk_in_customer(&payload.name, &payload.email, payload.phone.as_deref())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisteredCustomerResponse {
            user,
            invitation_code,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/staff/customers/{id}/active",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    request_body = SetActivePayload,
    responses((status = 200, body = User)),
    security(("api_jwt" = [])),
    tag = "Staff"
)]
pub async fn staff_set_customer_active(
    State(app_state): State<AppState>,
    _guard: RequireRole<RoleStaff>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<SetActivePayload>,
) -> Result<impl IntoResponse, AppError> {
    let user = app_state
        .auth_service
        .set_user_active(user_id, payload.is_active, true)
        .await?;
    Ok((StatusCode::OK, Json(user)))
}
