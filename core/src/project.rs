use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

/// Directory that holds one subdirectory per project.
///
/// Resolution is a plain path join: the identifier is not validated and the
/// target is not required to exist. An identifier such as `../other` or an
/// absolute path escapes the root; callers that expose this to untrusted
/// input must validate identifiers upstream. A missing directory surfaces as
/// a spawn failure in the command's stderr.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectsRoot(PathBuf);

impl ProjectsRoot {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self(root.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }

    pub fn resolve(&self, project_id: &str) -> PathBuf {
        let resolved = self.0.join(project_id);
        let escapes = !resolved.starts_with(&self.0)
            || Path::new(project_id)
                .components()
                .any(|component| matches!(component, Component::ParentDir));
        if escapes {
            tracing::warn!(
                project_id,
                cwd = %resolved.display(),
                "project id resolves outside the projects root"
            );
        }
        resolved
    }
}
