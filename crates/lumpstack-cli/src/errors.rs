use camino::Utf8PathBuf;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    #[error("No resource stack given")]
    #[diagnostic(
        code(stack::not_specified),
        help("Pass --stack <file> or run 'lumpstack config set-default-stack <file>'")
    )]
    NoStack,

    #[error("Stack file not found: {path}")]
    #[diagnostic(
        code(stack::not_found),
        help("Create a lumpstack.toml file listing the directories and archives to load")
    )]
    StackNotFound { path: Utf8PathBuf },

    #[error("Failed to load resource stack")]
    #[diagnostic(
        code(stack::load_failed),
        help("Check the stack file for syntax errors and make sure every location exists")
    )]
    StackLoadFailed {
        path: Utf8PathBuf,
        #[source]
        source: lumpstack::Error,
    },

    #[error("Resource query failed")]
    #[diagnostic(code(stack::query_failed))]
    QueryFailed {
        #[from]
        source: lumpstack::Error,
    },

    #[error("Unknown text lump: {name}")]
    #[diagnostic(
        code(text::unknown_lump),
        help("Use one of: {expected}")
    )]
    UnknownTextLump { name: String, expected: String },

    #[error("Failed to save configuration")]
    #[diagnostic(code(config::save_failed), help("Check file permissions next to the executable"))]
    ConfigSaveFailed {
        #[source]
        source: std::io::Error,
    },
}

impl CliError {
    pub fn stack_not_found(path: Utf8PathBuf) -> Self {
        Self::StackNotFound { path }
    }

    pub fn stack_load_failed(path: Utf8PathBuf, source: lumpstack::Error) -> Self {
        Self::StackLoadFailed { path, source }
    }

    pub fn unknown_text_lump(name: String, expected: String) -> Self {
        Self::UnknownTextLump { name, expected }
    }

    pub fn config_save_failed(source: std::io::Error) -> Self {
        Self::ConfigSaveFailed { source }
    }
}
