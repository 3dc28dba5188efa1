use thiserror::Error;

#[derive(Error, Debug)]
pub enum YearnError {
    /// No content given or found
    #[error("no games found")]
    NoGames,
    /// Error loading game into emulator
    #[error("game load error")]
    GameLoadError,
    /// No core found that supports game
    #[error("no compatible core")]
    NoCore,
    /// Internal System Error
    #[error("internal system error")]
    System,
    /// Corrupted (wrong length) save data
    #[error("mismatched save: {got} bytes, core expects {expected}")]
    MismatchSave { expected: usize, got: usize },
    /// Core reports no serialization support
    #[error("core does not support save states")]
    SerializeUnsupported,
    /// retro_serialize returned false
    #[error("core failed to serialize state")]
    SerializeFailed,
    /// retro_unserialize returned false
    #[error("core failed to restore state")]
    UnserializeFailed,
    /// Save state doesn't match the size the core reports
    #[error("save state is {got} bytes, core expects {expected}")]
    StateSize { expected: usize, got: usize },
    /// Call made outside of the core lifecycle order
    #[error("core is {actual}, operation requires {expected}")]
    Lifecycle {
        expected: &'static str,
        actual: &'static str,
    },
    /// Core built against a different libretro API
    #[error("frontend API v{expected} doesn't match core API v{got}")]
    ApiVersion { expected: u32, got: u32 },
    /// Static core requested but not compiled in
    #[error("static core '{0}' not linked into this build")]
    StaticCoreUnavailable(String),
    /// Another core still owns the callback proxy
    #[error("a core session is already active")]
    SessionActive,
    /// Bad configuration
    #[error("config error: {0}")]
    Config(String),
    /// String error
    #[error("string error")]
    String,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
