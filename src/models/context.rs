//! Typed views of the mobile SDK context headers.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Client application and device information from `lambda-runtime-client-context`.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientContext {
    #[serde(default)]
    pub client: Option<ClientApplication>,
    #[serde(default)]
    pub custom: HashMap<String, String>,
    #[serde(default)]
    pub env: HashMap<String, String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientApplication {
    #[serde(default)]
    pub installation_id: Option<String>,
    #[serde(default)]
    pub app_title: Option<String>,
    #[serde(default)]
    pub app_version_name: Option<String>,
    #[serde(default)]
    pub app_version_code: Option<String>,
    #[serde(default)]
    pub app_package_name: Option<String>,
}

/// Amazon Cognito identity from `lambda-runtime-cognito-identity`.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CognitoIdentity {
    #[serde(default)]
    pub cognito_identity_id: Option<String>,
    #[serde(default)]
    pub cognito_identity_pool_id: Option<String>,
}
