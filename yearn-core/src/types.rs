use std::fmt::Display;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub struct RetroSystemInfo {
    pub library_name: String,
    pub library_version: String,
    pub valid_extensions: String,
    pub need_fullpath: bool,
    pub block_extract: bool,
}

/// Where a core's entry points come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreSource {
    /// Shared library exporting the plain `retro_*` symbols
    Dynamic(PathBuf),
    /// Linked into this binary under `<prefix>_retro_*`
    Static(String),
}

impl Display for CoreSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CoreSource::Dynamic(path) => write!(f, "{}", path.display()),
            CoreSource::Static(prefix) => write!(f, "static:{}", prefix),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CoreInfo {
    source: CoreSource,
    sys_info: RetroSystemInfo,
    extensions: Vec<String>,
}

impl CoreInfo {
    pub fn new(source: CoreSource, sys_info: RetroSystemInfo) -> Self {
        let extensions = sys_info
            .valid_extensions
            .split('|')
            .map(|s| s.trim().to_ascii_lowercase())
            .filter(|s| !s.is_empty())
            .collect();
        CoreInfo {
            source,
            sys_info,
            extensions,
        }
    }

    pub fn extensions_str(&self) -> String {
        self.extensions.join(", ")
    }

    pub fn supports(&self, ext: &str) -> bool {
        self.extensions.iter().any(|s| s.eq_ignore_ascii_case(ext))
    }

    pub fn name(&self) -> String {
        self.sys_info.library_name.clone()
    }

    /// Matches either the library name or the static prefix, ignoring case.
    pub fn is_named(&self, name: &str) -> bool {
        if self.sys_info.library_name.eq_ignore_ascii_case(name) {
            return true;
        }
        match &self.source {
            CoreSource::Static(prefix) => prefix.eq_ignore_ascii_case(name),
            CoreSource::Dynamic(path) => path
                .file_stem()
                .and_then(|s| s.to_str())
                .map(|s| s.eq_ignore_ascii_case(name))
                .unwrap_or(false),
        }
    }

    pub fn source(&self) -> &CoreSource {
        &self.source
    }

    pub fn sys_info(&self) -> &RetroSystemInfo {
        &self.sys_info
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(exts: &str) -> RetroSystemInfo {
        RetroSystemInfo {
            library_name: String::from("Gambatte"),
            library_version: String::from("v0.5.0"),
            valid_extensions: String::from(exts),
            need_fullpath: false,
            block_extract: false,
        }
    }

    #[test]
    fn parses_extension_list() {
        let core = CoreInfo::new(CoreSource::Static(String::from("gambatte")), info("gb|GBC|dmg"));
        assert!(core.supports("gb"));
        assert!(core.supports("gbc"));
        assert!(core.supports("DMG"));
        assert!(!core.supports("gba"));
        assert_eq!(core.extensions_str(), "gb, gbc, dmg");
    }

    #[test]
    fn empty_extensions() {
        let core = CoreInfo::new(CoreSource::Static(String::from("gambatte")), info(""));
        assert!(!core.supports(""));
    }

    #[test]
    fn named_by_prefix_or_library() {
        let core = CoreInfo::new(CoreSource::Static(String::from("gambatte")), info("gb"));
        assert!(core.is_named("gambatte"));
        assert!(core.is_named("GAMBATTE"));

        let dynamic = CoreInfo::new(
            CoreSource::Dynamic(PathBuf::from("cores/mgba_libretro.so")),
            RetroSystemInfo {
                library_name: String::from("mGBA"),
                ..info("gba")
            },
        );
        assert!(dynamic.is_named("mgba"));
        assert!(dynamic.is_named("mgba_libretro"));
        assert!(!dynamic.is_named("bsnes"));
    }
}
