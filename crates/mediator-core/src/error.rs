//! Errors - Mediator のエラー型と分類
//!
//! # 分類
//! - Dispatch: Mediator 自身が呼び出しを成立させられなかった
//! - Handler: handler は実行されたが、handler 自身がエラーを返した

use std::error::Error as StdError;

use thiserror::Error;

use crate::signature::Signature;

/// Handler が返したエラーをそのまま保持する型
///
/// 元の型には `downcast_ref` で戻せます。
pub type HandlerError = Box<dyn StdError + Send + Sync + 'static>;

/// ErrorKind は MediatorError の大分類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Dispatch,
    Handler,
}

#[derive(Debug, Error)]
pub enum MediatorError {
    #[error("passed value is not a callable handler")]
    NotCallable,

    #[error("too many arguments: given={given} capacity={capacity}")]
    TooManyArguments { given: usize, capacity: usize },

    #[error("handler signature {0} already registered")]
    AlreadyRegistered(Signature),

    #[error("handler not found for signature {0}")]
    HandlerNotFound(Signature),

    #[error("handler failed: {0}")]
    Handler(#[source] HandlerError),
}

impl MediatorError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            MediatorError::Handler(_) => ErrorKind::Handler,
            _ => ErrorKind::Dispatch,
        }
    }

    /// true when the mediator failed before or instead of running a handler.
    pub fn is_dispatch(&self) -> bool {
        self.kind() == ErrorKind::Dispatch
    }

    pub fn handler_error(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        match self {
            MediatorError::Handler(err) => Some(&**err),
            _ => None,
        }
    }

    /// Unwraps the handler's own error, or gives back `self` for dispatch failures.
    pub fn into_handler_error(self) -> Result<HandlerError, Self> {
        match self {
            MediatorError::Handler(err) => Ok(err),
            other => Err(other),
        }
    }
}
