//! Handler - 登録できる関数の形と型消去
//!
//! # 学習ポイント
//! - tuple 型パラメータを持つジェネリック trait (`Handler<Params>`)
//! - マクロによる arity ごとの blanket impl
//! - Type erasure パターン (`Fn(A, B) -> R` → `Callable`)
//!
//! # 戻り値の形
//! handler の戻り値は `()` か `Result<(), E>`（`E: Into<HandlerError>`）だけです（`HandlerOutput`）。
//! それ以外の形はコンパイル時に弾かれます。

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::argument::{Argument, Arguments};
use crate::error::HandlerError;
use crate::signature::{ParameterTypes, TypeTag};

/// HandlerOutput は handler の戻り値を「成功 / handler のエラー」に解釈する
pub trait HandlerOutput {
    fn into_outcome(self) -> Result<(), HandlerError>;
}

impl HandlerOutput for () {
    fn into_outcome(self) -> Result<(), HandlerError> {
        Ok(())
    }
}

/// `E` は具体的なエラー型でも、すでに box 化された `HandlerError` でも構いません。
impl<E> HandlerOutput for Result<(), E>
where
    E: Into<HandlerError>,
{
    fn into_outcome(self) -> Result<(), HandlerError> {
        self.map_err(Into::into)
    }
}

/// Handler は `Params`（tuple）を位置引数として受け取る関数
///
/// # 使用例
/// ```ignore
/// fn on_order(id: u64, qty: u32) -> Result<(), OrderError> { ... }
///
/// mediator.register(on_order)?;
/// mediator.register(|name: String| println!("hello, {name}"))?;
/// ```
///
/// `Fn()` から `Fn(A1, ..., A8)` まで実装されています。
/// 引数型は `Any + Send`（参照を持たない型）である必要があります。
pub trait Handler<Params>: Send + Sync + 'static {
    fn into_callable(self) -> Callable;
}

pub(crate) enum CallFailure {
    /// Arguments did not line up with the declared parameters.
    Mismatch,
    Handler(HandlerError),
}

type Invoke = dyn Fn(Arguments) -> Result<(), CallFailure> + Send + Sync;

/// Callable は型消去された handler
///
/// 宣言された引数型（`parameter_types`）と、`Arguments` を受け取る
/// 呼び出し口を持ちます。Mediator はこれを `Arc` で共有します。
#[derive(Clone)]
pub struct Callable {
    parameters: Vec<TypeTag>,
    invoke: Arc<Invoke>,
}

impl Callable {
    pub fn new<P, H: Handler<P>>(handler: H) -> Self {
        handler.into_callable()
    }

    fn from_parts<F>(parameters: Vec<TypeTag>, invoke: F) -> Self
    where
        F: Fn(Arguments) -> Result<(), CallFailure> + Send + Sync + 'static,
    {
        Self {
            parameters,
            invoke: Arc::new(invoke),
        }
    }

    pub fn arity(&self) -> usize {
        self.parameters.len()
    }

    pub fn parameter_types(&self) -> &[TypeTag] {
        &self.parameters
    }

    pub(crate) fn invoke(&self, args: Arguments) -> Result<(), CallFailure> {
        (self.invoke)(args)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callable")
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

fn next_value<T: Any>(args: &mut std::vec::IntoIter<Argument>) -> Result<T, CallFailure> {
    args.next()
        .ok_or(CallFailure::Mismatch)?
        .downcast::<T>()
        .map_err(|_| CallFailure::Mismatch)
}

impl<F, R> Handler<()> for F
where
    F: Fn() -> R + Send + Sync + 'static,
    R: HandlerOutput,
{
    fn into_callable(self) -> Callable {
        Callable::from_parts(Vec::new(), move |args: Arguments| {
            if !args.is_empty() {
                return Err(CallFailure::Mismatch);
            }
            (self)().into_outcome().map_err(CallFailure::Handler)
        })
    }
}

macro_rules! impl_handler {
    ($($T:ident $v:ident),+) => {
        impl<F, R, $($T),+> Handler<($($T,)+)> for F
        where
            F: Fn($($T),+) -> R + Send + Sync + 'static,
            R: HandlerOutput,
            $($T: Any + Send,)+
        {
            fn into_callable(self) -> Callable {
                Callable::from_parts(
                    <($($T,)+) as ParameterTypes>::type_tags(),
                    move |args: Arguments| {
                        let mut args = args.into_iter();
                        $(let $v = next_value::<$T>(&mut args)?;)+
                        if args.next().is_some() {
                            return Err(CallFailure::Mismatch);
                        }
                        (self)($($v),+).into_outcome().map_err(CallFailure::Handler)
                    },
                )
            }
        }
    };
}

impl_handler!(A1 a1);
impl_handler!(A1 a1, A2 a2);
impl_handler!(A1 a1, A2 a2, A3 a3);
impl_handler!(A1 a1, A2 a2, A3 a3, A4 a4);
impl_handler!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5);
impl_handler!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6);
impl_handler!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6, A7 a7);
impl_handler!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6, A7 a7, A8 a8);
