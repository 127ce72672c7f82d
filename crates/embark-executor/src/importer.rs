//! Local filesystem file importer.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

use embark_core::component::Component;
use embark_core::executor::FileImporter;
use embark_core::{Error, Result};

/// Copies imported files into `<workspace>/<component>/src/<dest>`.
pub struct LocalImporter {
    workspace_root: PathBuf,
}

impl LocalImporter {
    pub fn new(workspace_root: impl Into<PathBuf>) -> Self {
        Self {
            workspace_root: workspace_root.into(),
        }
    }

    fn source_dir(&self, component: &Component) -> PathBuf {
        self.workspace_root.join(component.name.as_str()).join("src")
    }
}

#[async_trait]
impl FileImporter for LocalImporter {
    async fn copy_into(
        &self,
        component: &Component,
        source: &Path,
        dest_name: &str,
    ) -> Result<()> {
        let dir = self.source_dir(component);
        tokio::fs::create_dir_all(&dir).await?;
        let dest = dir.join(dest_name);
        debug!(
            component = %component.name,
            source = %source.display(),
            dest = %dest.display(),
            "Copying source file"
        );
        tokio::fs::copy(source, &dest).await.map_err(|e| {
            Error::ImportFailure(format!("copying {}: {e}", source.display()))
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embark_core::component::{AppConfig, ComponentConfig};
    use embark_core::ComponentName;

    fn app() -> Component {
        Component::new(
            ComponentName::new("app").unwrap(),
            ComponentConfig::Application(AppConfig {
                platform: ComponentName::new("base").unwrap(),
                domain: "standalone_ps7_cortexa9_0".to_string(),
                sources: Default::default(),
            }),
        )
    }

    #[tokio::test]
    async fn test_copy_lands_in_component_src() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("main.c");
        tokio::fs::write(&source, b"int main(void) { return 0; }")
            .await
            .unwrap();

        let importer = LocalImporter::new(dir.path());
        importer.copy_into(&app(), &source, "main.c").await.unwrap();

        let copied = dir.path().join("app").join("src").join("main.c");
        assert!(copied.exists());
    }

    #[tokio::test]
    async fn test_missing_source_is_import_failure() {
        let dir = tempfile::tempdir().unwrap();
        let importer = LocalImporter::new(dir.path());

        let result = importer
            .copy_into(&app(), Path::new("/nonexistent/main.c"), "main.c")
            .await;
        assert!(matches!(result, Err(Error::ImportFailure(_))));
    }
}
