use std::fmt;

use tandem_mkml::ParseError;

/// Failure to turn `.mkml` source into a buildable document.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadError {
    Parse(ParseError),
    /// A node names neither a built-in widget nor a registered component.
    UnknownWidget { kind: String, line: usize },
    /// `import ... as Alias` with no document registered under `Alias`.
    UnresolvedImport { path: String, alias: String },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Parse(e) => write!(f, "mkml parse error at {e}"),
            LoadError::UnknownWidget { kind, line } => write!(f, "unknown widget `{kind}` on line {line}"),
            LoadError::UnresolvedImport { path, alias } => {
                write!(f, "import \"{path}\" as {alias} was not registered")
            }
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ParseError> for LoadError {
    fn from(e: ParseError) -> Self {
        LoadError::Parse(e)
    }
}
