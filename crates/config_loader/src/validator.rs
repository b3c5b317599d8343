//! 配置校验模块
//!
//! 校验规则：
//! - 字段规则 (validator derive): name / path 非空, every_n >= 1
//! - 至少一个 endpoint (带 port 的条目)
//! - endpoint 名称唯一
//! - 每个订阅的 service_name 必须指向一个 endpoint

use std::collections::HashSet;

use contracts::{ContractError, ServiceConfigList};
use validator::Validate;

/// 校验 ServiceConfigList
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(list: &ServiceConfigList) -> Result<(), ContractError> {
    validate_fields(list)?;
    validate_endpoints(list)?;
    validate_subscriptions(list)?;
    Ok(())
}

/// 字段级规则
fn validate_fields(list: &ServiceConfigList) -> Result<(), ContractError> {
    list.validate()
        .map_err(|e| ContractError::config_validation("configs", e.to_string()))
}

/// 校验 endpoint 存在且名称唯一
fn validate_endpoints(list: &ServiceConfigList) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for endpoint in list.endpoints() {
        if !seen.insert(endpoint.name.as_str()) {
            return Err(ContractError::config_validation(
                format!("configs[name={}]", endpoint.name),
                "duplicate service name",
            ));
        }
    }
    if seen.is_empty() {
        return Err(ContractError::config_validation(
            "configs",
            "no service with a port configured",
        ));
    }
    Ok(())
}

/// 校验订阅指向已知 endpoint
fn validate_subscriptions(list: &ServiceConfigList) -> Result<(), ContractError> {
    let endpoints: HashSet<_> = list.endpoints().map(|c| c.name.as_str()).collect();

    for config in list.configs.iter().filter(|c| !c.is_endpoint()) {
        for (idx, sub) in config.subscriptions.iter().enumerate() {
            let field = format!("configs[{}].subscriptions[{}]", config.name, idx);
            let Some(service) = sub.service_name() else {
                return Err(ContractError::config_validation(
                    field,
                    format!("query '{}' does not name a service", sub.uri.query),
                ));
            };
            if !endpoints.contains(service) {
                return Err(ContractError::UnknownClient {
                    name: service.to_string(),
                    path: sub.path().to_string(),
                });
            }
        }
    }
    Ok(())
}
