//! Process-wide shared state handed to request handlers.

use agroguard_core::TokenIssuer;
use agroguard_inference::ClassifierHandle;
use agroguard_report::ReportRenderer;
use agroguard_store::Database;
use log::info;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Shared handles for the request orchestrator.
///
/// Everything here is either immutable or internally synchronized; handlers
/// hold no per-request state of their own.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub classifier: Arc<ClassifierHandle>,
    pub tokens: Arc<TokenIssuer>,
    pub renderer: Arc<ReportRenderer>,
    pub upload_dir: PathBuf,
}

impl AppState {
    /// Assemble the shared state, ensuring the upload directory exists.
    pub fn new(
        db: Arc<Database>,
        classifier: Arc<ClassifierHandle>,
        tokens: Arc<TokenIssuer>,
        renderer: Arc<ReportRenderer>,
        upload_dir: impl Into<PathBuf>,
    ) -> std::io::Result<Self> {
        let upload_dir = upload_dir.into();
        std::fs::create_dir_all(&upload_dir)?;
        info!("upload directory ready (dir={})", upload_dir.display());
        Ok(Self {
            db,
            classifier,
            tokens,
            renderer,
            upload_dir,
        })
    }

    /// Resolve a stored image name against the upload directory.
    pub fn upload_path(&self, image_name: &str) -> PathBuf {
        self.upload_dir.join(image_name)
    }
}

/// Reduce a client-supplied filename to its final path component.
pub fn sanitize_filename(name: &str) -> String {
    Path::new(name)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("upload.jpg")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::sanitize_filename;
    use pretty_assertions::assert_eq;

    #[test]
    fn filenames_keep_only_the_final_component() {
        assert_eq!(sanitize_filename("leaf.jpg"), "leaf.jpg");
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("dir/leaf.png"), "leaf.png");
        assert_eq!(sanitize_filename(""), "upload.jpg");
    }
}
