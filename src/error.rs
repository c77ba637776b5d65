use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{file}:{line}: {msg}")]
    Parse {
        file: String,
        line: usize,
        msg: String,
    },

    #[error("cannot find wire: {0}")]
    WireNotFound(String),

    #[error("cannot find variable: {0}")]
    VariableNotFound(String),

    #[error("cannot find coverpoint: {0}")]
    CoverPointNotFound(String),

    #[error("cannot find bin: {0}")]
    BinNotFound(String),

    #[error("variable {name} bit {bit} has no circuit signal bound")]
    UnboundVariableBit { name: String, bit: usize },

    #[error("unsupported: {0}")]
    Unsupported(String),
}

impl Error {
    pub fn parse(file: &str, line: usize, msg: impl Into<String>) -> Self {
        Error::Parse {
            file: file.to_string(),
            line,
            msg: msg.into(),
        }
    }
}
