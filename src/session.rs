//! Explicit run context passed to every operation

use crate::config::{self, EditorProfile, OsKind, PathContext, ResolvedPaths};
use crate::editor::database::DEFAULT_KEYWORD;
use crate::error::ResetError;

/// Everything one invocation needs to locate and mutate artifacts
#[derive(Debug, Clone)]
pub struct Session {
    pub os: OsKind,
    pub profile: EditorProfile,
    pub ctx: PathContext,
    /// Keyword purged from the state database
    pub keyword: String,
    /// Mark rewritten id files read-only
    pub lock_files: bool,
    /// Archive workspace storage before deleting it
    pub archive_workspace: bool,
    /// Let `all` also wipe Cursor extensions
    pub with_extensions: bool,
}

impl Session {
    pub fn new(profile: EditorProfile, ctx: PathContext) -> Self {
        Self {
            os: OsKind::current(),
            profile,
            ctx,
            keyword: DEFAULT_KEYWORD.to_string(),
            lock_files: true,
            archive_workspace: false,
            with_extensions: false,
        }
    }

    pub fn paths(&self) -> Result<ResolvedPaths, ResetError> {
        config::resolve(&self.os, self.profile, &self.ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ArtifactKind;

    #[test]
    fn test_session_defaults() {
        let session = Session::new(EditorProfile::Code, PathContext::with_home("/home/me"));
        assert_eq!(session.keyword, "augment");
        assert!(session.lock_files);
        assert!(!session.archive_workspace);
    }

    #[test]
    fn test_session_resolves_for_its_os() {
        let mut session = Session::new(EditorProfile::Cursor, PathContext::with_home("/home/me"));
        session.os = OsKind::Linux;

        let paths = session.paths().unwrap();
        assert_eq!(
            paths.get(ArtifactKind::StateDatabase).unwrap(),
            std::path::Path::new("/home/me/.config/Cursor/User/globalStorage/state.vscdb")
        );
    }
}
