//! レジストリ認証処理
//!
//! 認証情報を JSON にして URL-safe base64 でエンコードし、プッシュ呼び出しに
//! 渡す単一のトークン (`X-Registry-Auth`) にします。

use crate::error::{StepError, StepResult};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use bollard::auth::DockerCredentials;
use serde::{Deserialize, Serialize};
use std::fmt;

/// レジストリ認証情報
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryAuth {
    pub username: String,
    pub password: String,
    pub serveraddress: String,
}

impl RegistryAuth {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        serveraddress: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            serveraddress: serveraddress.into(),
        }
    }

    /// 認証トークンにエンコード
    pub fn encode(&self) -> StepResult<String> {
        let json = serde_json::to_vec(self)?;
        Ok(URL_SAFE.encode(json))
    }

    /// 認証トークンをデコード
    pub fn decode(token: &str) -> StepResult<Self> {
        let json = URL_SAFE.decode(token).map_err(|e| {
            StepError::Auth(serde::de::Error::custom(format!(
                "Failed to decode auth token: {}",
                e
            )))
        })?;
        Ok(serde_json::from_slice(&json)?)
    }
}

impl From<RegistryAuth> for DockerCredentials {
    fn from(auth: RegistryAuth) -> Self {
        DockerCredentials {
            username: Some(auth.username),
            password: Some(auth.password),
            serveraddress: Some(auth.serveraddress),
            ..Default::default()
        }
    }
}

impl fmt::Debug for RegistryAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryAuth")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("serveraddress", &self.serveraddress)
            .finish()
    }
}
