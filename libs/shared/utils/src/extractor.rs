use axum::{extract::FromRequestParts, http::request::Parts};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use shared_models::error::AppError;

pub const ACTOR_HEADER: &str = "x-actor-id";
pub const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";
pub const EMERGENCY_OVERRIDE_HEADER: &str = "x-emergency-override";

/// Who is acting and from where, passed explicitly into every mutating
/// scheduling call instead of being read from ambient state.
///
/// The upstream auth layer is responsible for setting these headers; the
/// emergency override is a capability it grants, never something the
/// scheduling core infers from a role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    pub actor_id: Option<Uuid>,
    pub client_ip: Option<String>,
    pub emergency_override: bool,
}

impl RequestContext {
    pub fn new(actor_id: Uuid) -> Self {
        Self {
            actor_id: Some(actor_id),
            ..Self::default()
        }
    }

    pub fn with_emergency_override(mut self) -> Self {
        self.emergency_override = true;
        self
    }

    pub fn with_client_ip(mut self, ip: impl Into<String>) -> Self {
        self.client_ip = Some(ip.into());
        self
    }

    pub fn from_parts(parts: &Parts) -> Result<Self, AppError> {
        let header = |name: &str| -> Result<Option<&str>, AppError> {
            parts
                .headers
                .get(name)
                .map(|value| {
                    value
                        .to_str()
                        .map_err(|_| AppError::BadRequest(format!("Invalid {} header", name)))
                })
                .transpose()
        };

        let actor_id = header(ACTOR_HEADER)?
            .map(|raw| {
                Uuid::parse_str(raw.trim())
                    .map_err(|_| AppError::BadRequest(format!("Invalid {} header", ACTOR_HEADER)))
            })
            .transpose()?;

        // First hop of a proxy chain is the client.
        let client_ip = header(FORWARDED_FOR_HEADER)?
            .and_then(|raw| raw.split(',').next())
            .map(|ip| ip.trim().to_string())
            .filter(|ip| !ip.is_empty());

        let emergency_override = match header(EMERGENCY_OVERRIDE_HEADER)? {
            None => false,
            Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" => false,
                _ => {
                    return Err(AppError::BadRequest(format!(
                        "Invalid {} header",
                        EMERGENCY_OVERRIDE_HEADER
                    )))
                }
            },
        };

        if emergency_override {
            info!(
                "Emergency override granted to actor {:?} from {:?}",
                actor_id, client_ip
            );
        }

        Ok(Self {
            actor_id,
            client_ip,
            emergency_override,
        })
    }
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        RequestContext::from_parts(parts)
    }
}
