use thiserror::Error;

use crate::chunks::dict::VariableType;
use crate::tag::Tag;

#[derive(Debug, Error)]
pub enum Error {
    #[error("unexpected end of data at offset {offset:#x} (need {need} bytes, have {have})")]
    UnexpectedEof {
        offset: usize,
        need: usize,
        have: usize,
    },

    #[error("{context}: {message}")]
    Structural {
        context: &'static str,
        message: String,
    },

    #[error("unrecognized block {tag} at offset {offset:#x}")]
    UnrecognizedBlock { tag: Tag, offset: usize },

    #[error("variable {id}: declared size {declared} does not match {expected} ({var_type})")]
    TypeSizeMismatch {
        id: String,
        var_type: VariableType,
        declared: u32,
        expected: u32,
    },

    #[error("variable {id}: registry declares {registered} but file declares {decoded}")]
    TypeMismatch {
        id: String,
        registered: VariableType,
        decoded: VariableType,
    },

    #[error("in {tag} block at offset {offset:#x}")]
    InChunk {
        tag: Tag,
        offset: usize,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    pub(crate) fn structural(context: &'static str, message: impl Into<String>) -> Self {
        Self::Structural {
            context,
            message: message.into(),
        }
    }

    /// The innermost error, with all chunk location wrappers removed.
    pub fn root(&self) -> &Error {
        match self {
            Self::InChunk { source, .. } => source.root(),
            other => other,
        }
    }

    /// Chunk locations from the outermost container down to the failing block.
    pub fn chunk_path(&self) -> Vec<(Tag, usize)> {
        let mut path = Vec::new();
        let mut cur = self;
        while let Self::InChunk {
            tag,
            offset,
            source,
        } = cur
        {
            path.push((*tag, *offset));
            cur = &**source;
        }
        path
    }
}

pub type Result<T> = std::result::Result<T, Error>;
