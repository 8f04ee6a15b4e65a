// src/middleware/rbac.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use std::marker::PhantomData;

use crate::{common::error::AppError, models::auth::{Role, User}};

// O que uma rota exige: nada, ou exatamente um dos três papéis.
// Não há hierarquia: admin NÃO satisfaz exigência de staff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteRequirement {
    None,
    Customer,
    Staff,
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDenial {
    Unauthenticated,
    AccountDeactivated,
    RoleMismatch { required: Role, found: Role },
}

impl From<AccessDenial> for AppError {
    fn from(denial: AccessDenial) -> Self {
        match denial {
            AccessDenial::Unauthenticated => AppError::InvalidToken,
            AccessDenial::AccountDeactivated => AppError::AccountDeactivated,
            AccessDenial::RoleMismatch { required, found } => {
                AppError::RoleMismatch { required, found }
            }
        }
    }
}

// A decisão de acesso, na ordem que o app espera: sem chamador ->
// Unauthenticated; conta desativada -> AccountDeactivated; papel
// diferente do exigido -> RoleMismatch; senão, passa.
pub fn authorize(
    role: Option<Role>,
    is_active: bool,
    requirement: RouteRequirement,
) -> Result<(), AccessDenial> {
    let Some(role) = role else {
        return Err(AccessDenial::Unauthenticated);
    };

    if !is_active {
        return Err(AccessDenial::AccountDeactivated);
    }

    let required = match requirement {
        RouteRequirement::None => return Ok(()),
        RouteRequirement::Customer => Role::Customer,
        RouteRequirement::Staff => Role::Staff,
        RouteRequirement::Admin => Role::Admin,
    };

    if role != required {
        return Err(AccessDenial::RoleMismatch { required, found: role });
    }
    Ok(())
}

/// 1. O trait que define a exigência de papel de uma rota
pub trait RoleDef: Send + Sync + 'static {
    fn required() -> RouteRequirement;
}

/// 2. O extractor (guardião)
pub struct RequireRole<T>(pub PhantomData<T>);

// 3. Implementação do FromRequestParts

impl<T, S> FromRequestParts<S> for RequireRole<T>
where
    T: RoleDef,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // O auth_guard já rodou e deixou o usuário nos extensions.
        let user = parts.extensions.get::<User>();

        authorize(
            user.map(|u| u.role),
            user.map(|u| u.is_active).unwrap_or(false),
            T::required(),
        )?;

        Ok(RequireRole(PhantomData))
    }
}

// ---
// DEFINIÇÃO DAS EXIGÊNCIAS (TIPOS)
// ---

pub struct RoleCustomer;
impl RoleDef for RoleCustomer {
    fn required() -> RouteRequirement {
        RouteRequirement::Customer
    }
}

pub struct RoleStaff;
impl RoleDef for RoleStaff {
    fn required() -> RouteRequirement {
        RouteRequirement::Staff
    }
}

pub struct RoleAdmin;
impl RoleDef for RoleAdmin {
    fn required() -> RouteRequirement {
        RouteRequirement::Admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROLES: [Role; 3] = [Role::Customer, Role::Staff, Role::Admin];
    const REQUIREMENTS: [(RouteRequirement, Role); 3] = [
        (RouteRequirement::Customer, Role::Customer),
        (RouteRequirement::Staff, Role::Staff),
        (RouteRequirement::Admin, Role::Admin),
    ];

    #[test]
    fn role_specific_routes_pass_iff_roles_match_exactly() {
        for role in ROLES {
            for (requirement, required_role) in REQUIREMENTS {
                let result = authorize(Some(role), true, requirement);
                if role == required_role {
                    assert!(result.is_ok());
                } else {
                    assert_eq!(
                        result,
                        Err(AccessDenial::RoleMismatch {
                            required: required_role,
                            found: role
                        })
                    );
                }
            }
        }
    }

    #[test]
    fn open_routes_accept_any_active_role() {
        for role in ROLES {
            assert!(authorize(Some(role), true, RouteRequirement::None).is_ok());
        }
    }

    #[test]
    fn missing_caller_is_unauthenticated_before_anything_else() {
        assert_eq!(
            authorize(None, true, RouteRequirement::Admin),
            Err(AccessDenial::Unauthenticated)
        );
    }

    #[test]
    fn deactivated_account_is_rejected_even_with_matching_role() {
        assert_eq!(
            authorize(Some(Role::Admin), false, RouteRequirement::Admin),
            Err(AccessDenial::AccountDeactivated)
        );
    }

    #[test]
    fn customer_on_admin_screen_is_redirected_home() {
        let denial = authorize(Some(Role::Customer), true, RouteRequirement::Admin).unwrap_err();
        let AccessDenial::RoleMismatch { found, .. } = denial else {
            panic!("esperava RoleMismatch");
        };
        // O corpo do 403 leva a home do papel real, não um erro cru.
        assert_eq!(found.home_route(), "/customer/home");
    }
}
