//! Argument - publish される値の型消去
//!
//! # 学習ポイント
//! - `Box<dyn Any + Send>` による型消去と `downcast`
//! - 値を作った時点の具体型を TypeTag として一緒に持ち運ぶ
//! - tuple から `Arguments` への変換 trait（`IntoArguments`）

use std::any::Any;
use std::fmt;

use crate::error::MediatorError;
use crate::signature::{Signature, TypeTag};

/// Argument は 1 つの位置引数
///
/// `tag` は `value` の具体型（`Argument::new` に渡された型）です。
pub struct Argument {
    value: Box<dyn Any + Send>,
    tag: TypeTag,
}

impl Argument {
    pub fn new<T: Any + Send>(value: T) -> Self {
        Self {
            value: Box::new(value),
            tag: TypeTag::of::<T>(),
        }
    }

    pub fn type_tag(&self) -> TypeTag {
        self.tag
    }

    pub fn is<T: Any>(&self) -> bool {
        self.tag.is::<T>()
    }

    /// Take the value back out; on a type mismatch the argument is returned untouched.
    pub fn downcast<T: Any>(self) -> Result<T, Self> {
        let tag = self.tag;
        match self.value.downcast::<T>() {
            Ok(value) => Ok(*value),
            Err(value) => Err(Self { value, tag }),
        }
    }
}

impl fmt::Debug for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Argument")
            .field("type", &self.tag)
            .finish_non_exhaustive()
    }
}

/// Arguments は publish 1 回分の位置引数の並び
#[derive(Debug, Default)]
pub struct Arguments(Vec<Argument>);

impl Arguments {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push<T: Any + Send>(&mut self, value: T) {
        self.0.push(Argument::new(value));
    }

    pub fn with<T: Any + Send>(mut self, value: T) -> Self {
        self.push(value);
        self
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn type_tags(&self) -> Vec<TypeTag> {
        self.0.iter().map(Argument::type_tag).collect()
    }

    /// Signature of the runtime types, padded up to `capacity`.
    pub fn signature(&self, capacity: usize) -> Result<Signature, MediatorError> {
        Signature::new(&self.type_tags(), capacity)
    }
}

impl From<Vec<Argument>> for Arguments {
    fn from(args: Vec<Argument>) -> Self {
        Self(args)
    }
}

impl FromIterator<Argument> for Arguments {
    fn from_iter<I: IntoIterator<Item = Argument>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Arguments {
    type Item = Argument;
    type IntoIter = std::vec::IntoIter<Argument>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// IntoArguments は publish に渡せる値の集まり
///
/// # 実装
/// - `()` から 8 要素までの tuple（各要素は `Any + Send`）
/// - `Arguments`, `Vec<Argument>`, 単独の `Argument`
///
/// 1 引数の publish は `(value,)` と書きます。
pub trait IntoArguments {
    fn into_arguments(self) -> Arguments;
}

impl IntoArguments for Arguments {
    fn into_arguments(self) -> Arguments {
        self
    }
}

impl IntoArguments for Vec<Argument> {
    fn into_arguments(self) -> Arguments {
        Arguments(self)
    }
}

impl IntoArguments for Argument {
    fn into_arguments(self) -> Arguments {
        Arguments(vec![self])
    }
}

macro_rules! impl_into_arguments {
    ($($T:ident $v:ident),*) => {
        impl<$($T: Any + Send),*> IntoArguments for ($($T,)*) {
            fn into_arguments(self) -> Arguments {
                let ($($v,)*) = self;
                Arguments(vec![$(Argument::new($v)),*])
            }
        }
    };
}

impl_into_arguments!();
impl_into_arguments!(A1 a1);
impl_into_arguments!(A1 a1, A2 a2);
impl_into_arguments!(A1 a1, A2 a2, A3 a3);
impl_into_arguments!(A1 a1, A2 a2, A3 a3, A4 a4);
impl_into_arguments!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5);
impl_into_arguments!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6);
impl_into_arguments!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6, A7 a7);
impl_into_arguments!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6, A7 a7, A8 a8);
