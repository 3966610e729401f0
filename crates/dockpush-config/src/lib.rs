//! dockpush の実行設定
//!
//! CI から渡される環境変数を起動時に一度だけ読み込み、
//! ビルドとプッシュに明示的に渡す。

pub mod error;
pub mod reference;

pub use error::*;
pub use reference::ImageReference;

use std::env::VarError;
use std::fmt;
use std::path::PathBuf;

pub const DOCKER_FILE_NAME_VAR: &str = "INPUT_DOCKER_FILE_NAME";
pub const APP_ROOT_PATH_VAR: &str = "app_root_path";
pub const IMAGE_NAME_VAR: &str = "image_name";
pub const IMAGE_TAG_VAR: &str = "image_tag";
pub const REGISTRY_VAR: &str = "registry";
pub const REGISTRY_USERNAME_VAR: &str = "registry_username";
pub const REGISTRY_PASSWORD_VAR: &str = "registry_password";

/// 1回の実行に必要な設定一式
#[derive(Clone, PartialEq, Eq)]
pub struct PublishConfig {
    /// ビルドコンテキストからの Dockerfile の相対パス
    pub dockerfile: String,
    /// ビルドコンテキストとしてアーカイブするディレクトリ
    pub app_root: PathBuf,
    pub image_name: String,
    pub image_tag: String,
    /// レジストリのアドレス（認証の serveraddress に使う）
    pub registry: String,
    pub username: String,
    pub password: String,
}

impl PublishConfig {
    /// プロセスの環境変数から読み込む
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key))
    }

    /// 任意の参照関数から読み込む
    ///
    /// 値の検証は存在確認のみ。空文字列もそのまま受け付ける。
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&'static str) -> std::result::Result<String, VarError>,
    {
        let get = |key: &'static str| match lookup(key) {
            Ok(value) => Ok(value),
            Err(VarError::NotPresent) => Err(ConfigError::MissingVar(key)),
            Err(VarError::NotUnicode(_)) => Err(ConfigError::NotUnicode(key)),
        };

        Ok(Self {
            dockerfile: get(DOCKER_FILE_NAME_VAR)?,
            app_root: PathBuf::from(get(APP_ROOT_PATH_VAR)?),
            image_name: get(IMAGE_NAME_VAR)?,
            image_tag: get(IMAGE_TAG_VAR)?,
            registry: get(REGISTRY_VAR)?,
            username: get(REGISTRY_USERNAME_VAR)?,
            password: get(REGISTRY_PASSWORD_VAR)?,
        })
    }

    /// `registry_username/image_name:image_tag`
    pub fn image_reference(&self) -> ImageReference {
        ImageReference::new(&self.username, &self.image_name, &self.image_tag)
    }
}

impl fmt::Debug for PublishConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublishConfig")
            .field("dockerfile", &self.dockerfile)
            .field("app_root", &self.app_root)
            .field("image_name", &self.image_name)
            .field("image_tag", &self.image_tag)
            .field("registry", &self.registry)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
