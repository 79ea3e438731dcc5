//! mediator-core
//!
//! 引数の型の並び（Signature）で handler を 1 つ選び、同期的に呼び出す in-process Mediator。
//!
//! # モジュール構成
//! - **signature**: TypeTag, Signature（固定長の型タプル + sentinel slot）
//! - **argument**: publish される値の型消去（Argument, Arguments, IntoArguments）
//! - **handler**: 登録できる関数の形（Handler, HandlerOutput）と型消去（Callable）
//! - **registry**: Signature → handler の対応表
//! - **mediator**: register / publish の表面（RwLock で共有可能）
//! - **builder**: 起動時検証付きの構築
//! - **config**: 構築時設定（max_arity）
//! - **error**: MediatorError と ErrorKind
//!
//! # 使用例
//! ```
//! use mediator_core::{Mediator, MediatorError};
//!
//! let mediator = Mediator::new();
//! mediator.register(|first: i32| assert_eq!(first, 1)).unwrap();
//!
//! mediator.publish((1i32,)).unwrap();
//! assert!(matches!(
//!     mediator.publish((1.1f64,)),
//!     Err(MediatorError::HandlerNotFound(_))
//! ));
//! ```

pub mod argument;
pub mod builder;
pub mod config;
pub mod error;
pub mod handler;
pub mod mediator;
mod registry;
pub mod signature;

pub use self::argument::{Argument, Arguments, IntoArguments};
pub use self::builder::{BuildError, MediatorBuilder};
pub use self::config::{ConfigError, DEFAULT_MAX_ARITY, MAX_SUPPORTED_ARITY, MediatorConfig};
pub use self::error::{ErrorKind, HandlerError, MediatorError};
pub use self::handler::{Callable, Handler, HandlerOutput};
pub use self::mediator::Mediator;
pub use self::signature::{ParameterTypes, Signature, TypeTag};
