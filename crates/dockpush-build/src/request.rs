use crate::auth::RegistryAuth;
use dockpush_config::{ImageReference, PublishConfig};
use std::path::PathBuf;

/// イメージビルドの要求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    /// ビルドコンテキストのディレクトリ
    pub context_path: PathBuf,
    /// コンテキストからの Dockerfile の相対パス
    pub dockerfile: String,
    pub image: ImageReference,
    /// 成功時に中間コンテナを削除する
    pub remove_intermediate: bool,
}

impl BuildRequest {
    pub fn from_config(config: &PublishConfig) -> Self {
        Self {
            context_path: config.app_root.clone(),
            dockerfile: config.dockerfile.clone(),
            image: config.image_reference(),
            remove_intermediate: true,
        }
    }
}

/// イメージプッシュの要求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushRequest {
    pub image: ImageReference,
    pub auth: RegistryAuth,
}

impl PushRequest {
    pub fn from_config(config: &PublishConfig) -> Self {
        Self {
            image: config.image_reference(),
            auth: RegistryAuth::new(&config.username, &config.password, &config.registry),
        }
    }
}
