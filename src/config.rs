//! Platform-specific configuration and paths
//!
//! VS Code family editors keep their state under a per-variant `User` directory:
//! - macOS: ~/Library/Application Support/<Variant>/User/
//! - Linux: ~/.config/<Variant>/User/
//! - Windows: %APPDATA%/<Variant>/User/
//!
//! JetBrains IDEs share one configuration root holding `PermanentDeviceId`
//! and `PermanentUserId`.

use serde::Serialize;
use std::ffi::OsString;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ResetError;

/// Editor whose artifacts are targeted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EditorProfile {
    #[value(name = "vscodium")]
    VsCodium,
    #[value(name = "code", alias = "vscode")]
    Code,
    Cursor,
    #[value(name = "jetbrains")]
    JetBrains,
}

impl EditorProfile {
    /// Directory name the editor uses under the OS config root
    ///
    /// `None` for JetBrains, which is located by probing instead.
    pub fn variant_dir(&self) -> Option<&'static str> {
        match self {
            Self::VsCodium => Some("VSCodium"),
            Self::Code => Some("Code"),
            Self::Cursor => Some("Cursor"),
            Self::JetBrains => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::VsCodium => "VSCodium",
            Self::Code => "VS Code",
            Self::Cursor => "Cursor",
            Self::JetBrains => "JetBrains",
        }
    }

    pub fn is_jetbrains(&self) -> bool {
        matches!(self, Self::JetBrains)
    }
}

impl fmt::Display for EditorProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Operating system family
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OsKind {
    Windows,
    MacOs,
    Linux,
    Other(String),
}

impl OsKind {
    pub fn current() -> Self {
        Self::from_name(std::env::consts::OS)
    }

    pub fn from_name(name: &str) -> Self {
        match name {
            "windows" => Self::Windows,
            "macos" => Self::MacOs,
            "linux" => Self::Linux,
            other => Self::Other(other.to_string()),
        }
    }
}

/// Environment inputs of path resolution
#[derive(Debug, Clone)]
pub struct PathContext {
    pub home: PathBuf,
    pub appdata: Option<PathBuf>,
    pub userprofile: Option<PathBuf>,
}

impl PathContext {
    /// Read the home directory, `APPDATA` and `USERPROFILE` from the process
    pub fn from_env() -> Result<Self, ResetError> {
        let home = dirs::home_dir()
            .ok_or_else(|| ResetError::Config("Could not determine home directory".into()))?;
        Ok(Self {
            home,
            appdata: non_empty_var("APPDATA"),
            userprofile: non_empty_var("USERPROFILE"),
        })
    }

    /// Context rooted at `home` with no Windows variables set
    pub fn with_home(home: impl Into<PathBuf>) -> Self {
        Self {
            home: home.into(),
            appdata: None,
            userprofile: None,
        }
    }
}

fn non_empty_var(name: &str) -> Option<PathBuf> {
    std::env::var_os(name)
        .filter(|v: &OsString| !v.is_empty())
        .map(PathBuf::from)
}

/// Kind of on-disk artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    StateDatabase,
    SettingsJson,
    MachineIdFile,
    WorkspaceDir,
    PermanentDeviceIdFile,
    PermanentUserIdFile,
    ExtensionsDir,
}

impl ArtifactKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::StateDatabase => "State database",
            Self::SettingsJson => "Settings JSON",
            Self::MachineIdFile => "Machine ID file",
            Self::WorkspaceDir => "Workspace storage",
            Self::PermanentDeviceIdFile => "Permanent device ID",
            Self::PermanentUserIdFile => "Permanent user ID",
            Self::ExtensionsDir => "Extensions",
        }
    }
}

/// A resolved artifact location
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactPath {
    pub kind: ArtifactKind,
    pub path: PathBuf,
}

/// All artifact locations of one editor profile
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedPaths {
    pub profile: EditorProfile,
    /// `User` directory for VS Code family, config root for JetBrains
    pub base: PathBuf,
    pub artifacts: Vec<ArtifactPath>,
}

impl ResolvedPaths {
    pub fn get(&self, kind: ArtifactKind) -> Option<&Path> {
        self.artifacts
            .iter()
            .find(|a| a.kind == kind)
            .map(|a| a.path.as_path())
    }

    /// Like [`get`](Self::get) but fails when the profile has no such artifact
    pub fn require(&self, kind: ArtifactKind) -> Result<&Path, ResetError> {
        self.get(kind).ok_or_else(|| {
            ResetError::Config(format!(
                "{} has no {} artifact",
                self.profile,
                kind.label().to_lowercase()
            ))
        })
    }
}

pub const STATE_DB_FILE: &str = "state.vscdb";
pub const STORAGE_JSON_FILE: &str = "storage.json";
pub const MACHINE_ID_FILE: &str = "machineid";
pub const PERMANENT_DEVICE_ID_FILE: &str = "PermanentDeviceId";
pub const PERMANENT_USER_ID_FILE: &str = "PermanentUserId";

/// Resolve every artifact path of `profile` on `os`
pub fn resolve(
    os: &OsKind,
    profile: EditorProfile,
    ctx: &PathContext,
) -> Result<ResolvedPaths, ResetError> {
    match profile.variant_dir() {
        Some(variant) => resolve_vscode_family(os, profile, variant, ctx),
        None => resolve_jetbrains(ctx),
    }
}

/// Root directory of a VS Code family variant (parent of `User/`)
pub fn variant_root(os: &OsKind, variant: &str, ctx: &PathContext) -> Result<PathBuf, ResetError> {
    match os {
        OsKind::Windows => {
            let appdata = ctx.appdata.as_ref().ok_or_else(|| {
                ResetError::Config(format!(
                    "APPDATA environment variable not set; cannot locate {} data",
                    variant
                ))
            })?;
            Ok(appdata.join(variant))
        }
        OsKind::MacOs => Ok(ctx
            .home
            .join("Library")
            .join("Application Support")
            .join(variant)),
        OsKind::Linux => Ok(ctx.home.join(".config").join(variant)),
        OsKind::Other(name) => Err(ResetError::Config(format!(
            "Unsupported operating system: {}",
            name
        ))),
    }
}

fn resolve_vscode_family(
    os: &OsKind,
    profile: EditorProfile,
    variant: &str,
    ctx: &PathContext,
) -> Result<ResolvedPaths, ResetError> {
    let root = variant_root(os, variant, ctx)?;
    let base = root.join("User");
    let global_storage = base.join("globalStorage");

    // macOS keeps the legacy machineid beside User/, not inside it
    let machine_id = match os {
        OsKind::MacOs => root.join(MACHINE_ID_FILE),
        _ => base.join(MACHINE_ID_FILE),
    };

    let mut artifacts = vec![
        ArtifactPath {
            kind: ArtifactKind::StateDatabase,
            path: global_storage.join(STATE_DB_FILE),
        },
        ArtifactPath {
            kind: ArtifactKind::SettingsJson,
            path: global_storage.join(STORAGE_JSON_FILE),
        },
        ArtifactPath {
            kind: ArtifactKind::MachineIdFile,
            path: machine_id,
        },
        ArtifactPath {
            kind: ArtifactKind::WorkspaceDir,
            path: base.join("workspaceStorage"),
        },
    ];

    if profile == EditorProfile::Cursor {
        artifacts.push(ArtifactPath {
            kind: ArtifactKind::ExtensionsDir,
            path: cursor_extensions_dir(os, ctx)?,
        });
    }

    Ok(ResolvedPaths {
        profile,
        base,
        artifacts,
    })
}

/// Cursor installs extensions under ~/.cursor/extensions (%USERPROFILE% on Windows)
fn cursor_extensions_dir(os: &OsKind, ctx: &PathContext) -> Result<PathBuf, ResetError> {
    let home = match os {
        OsKind::Windows => ctx.userprofile.as_ref().ok_or_else(|| {
            ResetError::Config(
                "USERPROFILE environment variable not set; cannot locate Cursor extensions".into(),
            )
        })?,
        _ => &ctx.home,
    };
    Ok(home.join(".cursor").join("extensions"))
}

/// Candidate JetBrains configuration roots, in probe order
pub fn jetbrains_candidates(home: &Path) -> Vec<PathBuf> {
    vec![
        home.join("AppData").join("Roaming").join("JetBrains"),
        home.join("Library")
            .join("Application Support")
            .join("JetBrains"),
        home.join(".config").join("JetBrains"),
        home.join(".JetBrains"),
    ]
}

fn resolve_jetbrains(ctx: &PathContext) -> Result<ResolvedPaths, ResetError> {
    let candidates = jetbrains_candidates(&ctx.home);
    let base = candidates
        .iter()
        .find(|p| p.is_dir())
        .cloned()
        .ok_or_else(|| {
            ResetError::NotFound(candidates.last().cloned().unwrap_or_default())
        })?;

    Ok(jetbrains_paths(base))
}

/// Artifact set for a known JetBrains configuration root
pub fn jetbrains_paths(base: PathBuf) -> ResolvedPaths {
    ResolvedPaths {
        profile: EditorProfile::JetBrains,
        artifacts: vec![
            ArtifactPath {
                kind: ArtifactKind::PermanentDeviceIdFile,
                path: base.join(PERMANENT_DEVICE_ID_FILE),
            },
            ArtifactPath {
                kind: ArtifactKind::PermanentUserIdFile,
                path: base.join(PERMANENT_USER_ID_FILE),
            },
        ],
        base,
    }
}

/// A JetBrains product directory found under the configuration root
#[derive(Debug, Clone, Serialize)]
pub struct JetBrainsProduct {
    /// Directory name, e.g. `IntelliJIdea2024.1`
    pub name: String,
    pub path: PathBuf,
}

/// List product directories that contain `options/other.xml`
pub fn list_jetbrains_products(config_dir: &Path) -> Vec<JetBrainsProduct> {
    let Ok(entries) = fs::read_dir(config_dir) else {
        return Vec::new();
    };

    let mut products: Vec<JetBrainsProduct> = entries
        .flatten()
        .filter(|e| e.path().join("options").join("other.xml").is_file())
        .map(|e| JetBrainsProduct {
            name: e.file_name().to_string_lossy().to_string(),
            path: e.path(),
        })
        .collect();

    products.sort_by(|a, b| a.name.cmp(&b.name));
    products
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> PathContext {
        PathContext {
            home: PathBuf::from("/home/me"),
            appdata: Some(PathBuf::from("/win/Users/me/AppData/Roaming")),
            userprofile: Some(PathBuf::from("/win/Users/me")),
        }
    }

    #[test]
    fn test_linux_paths() {
        let paths = resolve(&OsKind::Linux, EditorProfile::VsCodium, &ctx()).unwrap();
        let base = PathBuf::from("/home/me/.config/VSCodium/User");

        assert_eq!(paths.base, base);
        assert_eq!(
            paths.get(ArtifactKind::StateDatabase).unwrap(),
            base.join("globalStorage").join("state.vscdb")
        );
        assert_eq!(
            paths.get(ArtifactKind::SettingsJson).unwrap(),
            base.join("globalStorage").join("storage.json")
        );
        assert_eq!(
            paths.get(ArtifactKind::MachineIdFile).unwrap(),
            base.join("machineid")
        );
        assert_eq!(
            paths.get(ArtifactKind::WorkspaceDir).unwrap(),
            base.join("workspaceStorage")
        );
        assert!(paths.get(ArtifactKind::ExtensionsDir).is_none());
    }

    #[test]
    fn test_macos_paths() {
        let paths = resolve(&OsKind::MacOs, EditorProfile::Code, &ctx()).unwrap();
        let root = PathBuf::from("/home/me/Library/Application Support/Code");

        assert_eq!(paths.base, root.join("User"));
        // machineid sits next to User/ on macOS
        assert_eq!(
            paths.get(ArtifactKind::MachineIdFile).unwrap(),
            root.join("machineid")
        );
    }

    #[test]
    fn test_windows_paths_use_appdata() {
        let paths = resolve(&OsKind::Windows, EditorProfile::Code, &ctx()).unwrap();
        assert_eq!(
            paths.base,
            PathBuf::from("/win/Users/me/AppData/Roaming")
                .join("Code")
                .join("User")
        );
    }

    #[test]
    fn test_windows_without_appdata_is_config_error() {
        let mut ctx = ctx();
        ctx.appdata = None;
        let err = resolve(&OsKind::Windows, EditorProfile::Code, &ctx).unwrap_err();
        assert!(matches!(err, ResetError::Config(ref m) if m.contains("APPDATA")));
    }

    #[test]
    fn test_unsupported_os_is_config_error() {
        let err = resolve(
            &OsKind::from_name("freebsd"),
            EditorProfile::Code,
            &ctx(),
        )
        .unwrap_err();
        assert!(matches!(err, ResetError::Config(ref m) if m.contains("freebsd")));
    }

    #[test]
    fn test_cursor_has_extensions_dir() {
        let paths = resolve(&OsKind::Linux, EditorProfile::Cursor, &ctx()).unwrap();
        assert_eq!(
            paths.get(ArtifactKind::ExtensionsDir).unwrap(),
            Path::new("/home/me/.cursor/extensions")
        );

        let paths = resolve(&OsKind::Windows, EditorProfile::Cursor, &ctx()).unwrap();
        assert_eq!(
            paths.get(ArtifactKind::ExtensionsDir).unwrap(),
            Path::new("/win/Users/me/.cursor/extensions")
        );
    }

    #[test]
    fn test_require_missing_artifact() {
        let paths = resolve(&OsKind::Linux, EditorProfile::Code, &ctx()).unwrap();
        assert!(paths.require(ArtifactKind::ExtensionsDir).is_err());
        assert!(paths.require(ArtifactKind::WorkspaceDir).is_ok());
    }

    #[test]
    fn test_jetbrains_probe_order() {
        let home = tempfile::tempdir().unwrap();
        let ctx = PathContext::with_home(home.path());

        // Nothing exists yet
        let err = resolve(&OsKind::Linux, EditorProfile::JetBrains, &ctx).unwrap_err();
        assert!(matches!(err, ResetError::NotFound(_)));

        // Dotfile fallback is found when it is the only candidate
        let dotfile = home.path().join(".JetBrains");
        fs::create_dir_all(&dotfile).unwrap();
        let paths = resolve(&OsKind::Linux, EditorProfile::JetBrains, &ctx).unwrap();
        assert_eq!(paths.base, dotfile);

        // .config/JetBrains wins over the dotfile fallback
        let config = home.path().join(".config").join("JetBrains");
        fs::create_dir_all(&config).unwrap();
        let paths = resolve(&OsKind::Linux, EditorProfile::JetBrains, &ctx).unwrap();
        assert_eq!(paths.base, config);
        assert_eq!(
            paths.get(ArtifactKind::PermanentDeviceIdFile).unwrap(),
            config.join("PermanentDeviceId")
        );
        assert_eq!(
            paths.get(ArtifactKind::PermanentUserIdFile).unwrap(),
            config.join("PermanentUserId")
        );
    }

    #[test]
    fn test_list_jetbrains_products() {
        let root = tempfile::tempdir().unwrap();
        let idea = root.path().join("IntelliJIdea2024.1").join("options");
        fs::create_dir_all(&idea).unwrap();
        fs::write(idea.join("other.xml"), "<application/>").unwrap();
        fs::create_dir_all(root.path().join("consentOptions")).unwrap();

        let products = list_jetbrains_products(root.path());
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].name, "IntelliJIdea2024.1");
    }
}
