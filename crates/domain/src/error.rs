//! Error contract for the hub core subsystems.
//!
//! Each subsystem has its own typed error; layers convert with `#[from]`
//! where an error crosses a boundary. None of these are fatal to the hub
//! process — they are logged and the operation is abandoned.

/// Failure to resolve a module's code through the loader port.
#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    /// No unit with this name is known to the loader.
    #[error("module '{0}' was not found")]
    NotFound(String),

    /// The unit exists but exposes no initialization entry point.
    #[error("module '{0}' has no initialization entry point")]
    MissingEntryPoint(String),
}

/// Failure while loading or unloading a module.
#[derive(Debug, thiserror::Error)]
pub enum ModuleError {
    /// A module with this name is already loaded; loading again is a no-op.
    #[error("module '{0}' is already loaded")]
    AlreadyLoaded(String),

    /// No module with this name is loaded.
    #[error("module '{0}' is not loaded")]
    NotLoaded(String),

    /// The loader could not produce the module's code.
    #[error(transparent)]
    Loader(#[from] LoaderError),

    /// The initialization entry point returned no export block.
    #[error("module '{0}' returned no exports")]
    NoExports(String),

    /// The export block declares an ABI version this runtime does not speak.
    #[error("module '{name}' declares ABI version {found}, runtime requires {expected}")]
    AbiMismatch {
        /// Name of the offending module.
        name: String,
        /// ABI version compiled into the runtime.
        expected: u32,
        /// ABI version the module declared.
        found: u32,
    },
}

/// Failure reported by the broker client port.
#[derive(Debug, thiserror::Error)]
pub enum BrokerError {
    /// The client has no live connection to hand the request to.
    #[error("broker client is not connected")]
    NotConnected,

    /// The connection attempt could not be initiated.
    #[error("broker connection could not be initiated")]
    Connect(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A subscribe/unsubscribe/publish request could not be issued.
    #[error("broker request could not be issued")]
    Request(#[source] Box<dyn std::error::Error + Send + Sync>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_display_duplicate_load_failure() {
        let err = ModuleError::AlreadyLoaded("lights".to_string());
        assert_eq!(err.to_string(), "module 'lights' is already loaded");
    }

    #[test]
    fn should_display_abi_mismatch_with_versions() {
        let err = ModuleError::AbiMismatch {
            name: "alarm".to_string(),
            expected: 1,
            found: 2,
        };
        assert_eq!(
            err.to_string(),
            "module 'alarm' declares ABI version 2, runtime requires 1"
        );
    }

    #[test]
    fn should_convert_loader_error_transparently() {
        let err: ModuleError = LoaderError::NotFound("lights".to_string()).into();
        assert_eq!(err.to_string(), "module 'lights' was not found");
    }
}
