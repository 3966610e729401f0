//! dockpush のイメージビルドとプッシュ
//!
//! ディレクトリを tar にしてエンジンでビルドし、できたイメージを
//! レジストリにプッシュする。どちらのステップも応答は改行区切り JSON の
//! 進捗ストリームで、最終行のエラーシグナルで失敗を判定する。

pub mod auth;
pub mod builder;
pub mod context;
pub mod engine;
pub mod error;
pub mod progress;
pub mod publish;
pub mod pusher;
pub mod request;

#[cfg(test)]
pub(crate) mod testing;

pub use auth::RegistryAuth;
pub use builder::{ImageBuilder, STEP_TIMEOUT};
pub use context::ContextBuilder;
pub use engine::{DockerEngine, Engine, EngineError, ProgressStream};
pub use error::{PublishError, Result, StepError, StepResult};
pub use progress::{ErrorLine, read_progress};
pub use publish::{publish, run};
pub use pusher::ImagePusher;
pub use request::{BuildRequest, PushRequest};
