//! Signature - 引数型の並びによる lookup key
//!
//! # 学習ポイント
//! - `TypeId` による型の同一性判定（reflection の代わり）
//! - 固定長の key と「型なし」sentinel slot
//! - 手書きの `PartialEq` / `Hash`（比較対象を `TypeId` に限定する）

use std::any::{Any, TypeId, type_name};
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::MediatorError;

/// TypeTag は 1 つの位置引数の型を表す
///
/// 同一性は `TypeId` だけで決まります。`name` は表示用です。
#[derive(Clone, Copy)]
pub struct TypeTag {
    id: TypeId,
    name: &'static str,
}

impl TypeTag {
    pub fn of<T: Any>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is<T: Any>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for TypeTag {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeTag {}

impl Hash for TypeTag {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Signature は handler / publish 呼び出しの引数型の並び
///
/// # 不変条件
/// - slot 数は常に capacity（Mediator の最大 arity）と等しい
/// - 先頭から arity 個が `Some`、残りは `None`（sentinel）
/// - 比較は全 slot で行うので、arity が違えば必ず別の key になる
///
/// # 使用例
/// ```ignore
/// let sig = Signature::new(&[TypeTag::of::<i32>()], 2)?;
/// assert_eq!(sig.arity(), 1);
/// assert_eq!(sig.to_string(), "(i32)");
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    slots: Box<[Option<TypeTag>]>,
}

impl Signature {
    /// Build a signature from parameter types, padding unused slots up to `capacity`.
    pub fn new(types: &[TypeTag], capacity: usize) -> Result<Self, MediatorError> {
        if types.len() > capacity {
            return Err(MediatorError::TooManyArguments {
                given: types.len(),
                capacity,
            });
        }

        let mut slots = vec![None; capacity];
        for (slot, tag) in slots.iter_mut().zip(types) {
            *slot = Some(*tag);
        }
        Ok(Self {
            slots: slots.into_boxed_slice(),
        })
    }

    /// Signature for a parameter list given as a tuple type, e.g. `Signature::of::<(i32, String)>(2)`.
    pub fn of<P: ParameterTypes>(capacity: usize) -> Result<Self, MediatorError> {
        Self::new(&P::type_tags(), capacity)
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn arity(&self) -> usize {
        self.slots.iter().take_while(|slot| slot.is_some()).count()
    }

    pub fn slots(&self) -> &[Option<TypeTag>] {
        &self.slots
    }

    pub fn types(&self) -> impl Iterator<Item = TypeTag> + '_ {
        self.slots.iter().map_while(|slot| *slot)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, tag) in self.types().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(tag.name())?;
        }
        f.write_str(")")
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Signature(")?;
        for (i, slot) in self.slots.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match slot {
                Some(tag) => f.write_str(tag.name())?,
                None => f.write_str("_")?,
            }
        }
        f.write_str(")")
    }
}

/// ParameterTypes は tuple 型を TypeTag の並びに変換する
///
/// `()` から 8 要素の tuple まで実装されています。
pub trait ParameterTypes {
    fn type_tags() -> Vec<TypeTag>;
}

macro_rules! impl_parameter_types {
    ($($T:ident),*) => {
        impl<$($T: Any),*> ParameterTypes for ($($T,)*) {
            fn type_tags() -> Vec<TypeTag> {
                vec![$(TypeTag::of::<$T>()),*]
            }
        }
    };
}

impl_parameter_types!();
impl_parameter_types!(A1);
impl_parameter_types!(A1, A2);
impl_parameter_types!(A1, A2, A3);
impl_parameter_types!(A1, A2, A3, A4);
impl_parameter_types!(A1, A2, A3, A4, A5);
impl_parameter_types!(A1, A2, A3, A4, A5, A6);
impl_parameter_types!(A1, A2, A3, A4, A5, A6, A7);
impl_parameter_types!(A1, A2, A3, A4, A5, A6, A7, A8);
