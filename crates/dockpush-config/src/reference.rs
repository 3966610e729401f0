//! イメージ参照 (`namespace/name:tag`)

use std::fmt;

/// ビルド・プッシュ対象のイメージ参照
///
/// `namespace` にはレジストリのユーザー名が入る。レジストリのアドレスは
/// 参照に含めない（認証とプッシュ先の解決にのみ使う）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
    namespace: String,
    name: String,
    tag: String,
}

impl ImageReference {
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
        tag: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            tag: tag.into(),
        }
    }

    /// タグを除いたリポジトリ名
    ///
    /// # Examples
    /// - `octocat/app:v1` -> `octocat/app`
    pub fn repository(&self) -> String {
        format!("{}/{}", self.namespace, self.name)
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}:{}", self.namespace, self.name, self.tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let reference = ImageReference::new("octocat", "app", "v1.0");
        assert_eq!(reference.to_string(), "octocat/app:v1.0");
    }

    #[test]
    fn test_repository_and_tag() {
        let reference = ImageReference::new("octocat", "app", "latest");
        assert_eq!(reference.repository(), "octocat/app");
        assert_eq!(reference.tag(), "latest");
    }
}
