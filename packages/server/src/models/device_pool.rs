use devicefarm::PoolRule;
use serde::Deserialize;

use crate::error::AppError;
use crate::models::shared::validate_name;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateDevicePoolRequest {
    #[schema(example = 1)]
    pub project_id: i32,
    #[schema(example = "Android phones")]
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub rules: Vec<PoolRule>,
}

/// Fields left out are not changed.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct UpdateDevicePoolRequest {
    pub arn: String,
    pub name: Option<String>,
    pub rules: Option<Vec<PoolRule>>,
}

fn validate_rules(rules: &[PoolRule]) -> Result<(), AppError> {
    for rule in rules {
        if rule.attribute.trim().is_empty()
            || rule.operator.trim().is_empty()
            || rule.value.trim().is_empty()
        {
            return Err(AppError::Validation(
                "Each rule needs an attribute, an operator and a value".into(),
            ));
        }
    }
    Ok(())
}

pub fn validate_create_device_pool(payload: &CreateDevicePoolRequest) -> Result<(), AppError> {
    validate_name(&payload.name, "Device pool name", 256)?;
    validate_rules(&payload.rules)
}

pub fn validate_update_device_pool(payload: &UpdateDevicePoolRequest) -> Result<(), AppError> {
    if let Some(name) = &payload.name {
        validate_name(name, "Device pool name", 256)?;
    }
    if let Some(rules) = &payload.rules {
        validate_rules(rules)?;
    }
    Ok(())
}
