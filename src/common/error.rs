use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::models::auth::Role;
use crate::models::orders::OrderStatus;
use crate::services::lifecycle;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Conta desativada")]
    AccountDeactivated,

    // O papel exigido pela rota e o papel de quem chamou. A resposta leva
    // um `redirectTo` para a home do papel real — decisão de UX do app,
    // não a fronteira de segurança (essa é o próprio guard).
    #[error("Acesso negado: rota exige papel '{required:?}'")]
    RoleMismatch { required: Role, found: Role },

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Pedido não encontrado")]
    OrderNotFound,

    #[error("Notificação não encontrada")]
    NotificationNotFound,

    #[error("Serviço não encontrado")]
    ServiceNotFound,

    #[error("Adicional não encontrado")]
    AddOnNotFound,

    #[error("Item de estoque não encontrado")]
    ItemNotFound,

    #[error("Serviço sem preço cadastrado para a moeda '{0}'")]
    PriceNotFound(String),

    #[error("Transição de status inválida: {from:?} -> {to:?}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("Peso só pode ser confirmado com pedido pendente ou coletado (status atual: {0:?})")]
    WeightNotEditable(OrderStatus),

    // Concorrência otimista: a versão observada pelo cliente ficou para trás.
    #[error("Versão do pedido desatualizada")]
    StaleVersion,

    #[error("Código de convite inválido ou já utilizado")]
    InvitationInvalid,

    #[error("Estoque insuficiente")]
    InsufficientStock,

    // Variante para erros de banco de dados (sqlx)
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado.
    // `anyhow::Error` é ótimo para capturar o contexto do erro.
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("Fonte não encontrada: {0}")]
    FontNotFound(String),

    #[error("Falha ao gerar o PDF: {0}")]
    PdfError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }

            // Acesso negado por papel: devolve a home do papel real para o
            // app redirecionar em vez de mostrar um erro cru.
            AppError::RoleMismatch { required, found } => {
                let body = Json(json!({
                    "error": format!(
                        "Esta área exige o papel '{}'.",
                        required.as_str()
                    ),
                    "redirectTo": found.home_route(),
                }));
                return (StatusCode::FORBIDDEN, body).into_response();
            }

            // Transição rejeitada: reapresenta as opções válidas a partir
            // do status atual, como o app espera.
            AppError::InvalidTransition { from, to } => {
                let allowed: Vec<&str> = lifecycle::allowed_next(from)
                    .iter()
                    .map(|s| s.as_str())
                    .collect();
                let body = Json(json!({
                    "error": format!(
                        "Não é possível mudar o pedido de '{}' para '{}'.",
                        from.as_str(),
                        to.as_str()
                    ),
                    "allowedNext": allowed,
                }));
                return (StatusCode::UNPROCESSABLE_ENTITY, body).into_response();
            }

            AppError::EmailAlreadyExists => (StatusCode::CONFLICT, "Este e-mail já está em uso.".to_string()),
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "E-mail ou senha inválidos.".to_string()),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "Token de autenticação inválido ou ausente.".to_string()),
            AppError::AccountDeactivated => (StatusCode::FORBIDDEN, "Esta conta foi desativada. Procure o atendimento.".to_string()),
            AppError::UserNotFound => (StatusCode::NOT_FOUND, "Usuário não encontrado.".to_string()),
            AppError::OrderNotFound => (StatusCode::NOT_FOUND, "Pedido não encontrado.".to_string()),
            AppError::NotificationNotFound => (StatusCode::NOT_FOUND, "Notificação não encontrada.".to_string()),
            AppError::ServiceNotFound => (StatusCode::NOT_FOUND, "Serviço não encontrado.".to_string()),
            AppError::AddOnNotFound => (StatusCode::NOT_FOUND, "Adicional não encontrado.".to_string()),
            AppError::ItemNotFound => (StatusCode::NOT_FOUND, "Item de estoque não encontrado.".to_string()),
            AppError::PriceNotFound(currency) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("O serviço não tem preço cadastrado para a moeda '{}'.", currency),
            ),
            AppError::WeightNotEditable(current) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                format!(
                    "O peso real só pode ser confirmado antes do processamento (status atual: '{}').",
                    current.as_str()
                ),
            ),
            AppError::StaleVersion => (
                StatusCode::CONFLICT,
                "O pedido foi alterado por outra pessoa. Recarregue e tente de novo.".to_string(),
            ),
            AppError::InvitationInvalid => (StatusCode::BAD_REQUEST, "Código de convite inválido ou já utilizado.".to_string()),
            AppError::InsufficientStock => (StatusCode::UNPROCESSABLE_ENTITY, "Estoque insuficiente para esta saída.".to_string()),

            // Todos os outros erros (DatabaseError, InternalServerError...) viram 500.
            // O `tracing` loga a mensagem detalhada que `thiserror` nos deu.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Ocorreu um erro inesperado.".to_string())
            }
        };

        // Resposta padrão para erros simples que só têm uma mensagem.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
