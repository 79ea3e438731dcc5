//! HandlerRegistry - Signature と handler の対応表
//!
//! # 学習ポイント
//! - HashMap での型消去された handler の管理
//! - `entry` API による「存在チェック + 挿入」
//!
//! ロックは持ちません。共有は `Mediator` 側で行います。

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use crate::error::MediatorError;
use crate::handler::Callable;
use crate::signature::Signature;

/// HandlerRegistry は 1 つの Signature につき 1 つの handler を保持する
///
/// 登録は増える一方で、削除はありません。
#[derive(Debug)]
pub struct HandlerRegistry {
    capacity: usize,
    handlers: HashMap<Signature, Callable>,
}

impl HandlerRegistry {
    /// `capacity` must already be validated (see `MediatorConfig::validate`).
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            capacity,
            handlers: HashMap::new(),
        }
    }

    /// Register a handler under the signature of its declared parameters.
    ///
    /// A signature that is already taken is an error; the existing handler stays.
    pub fn register(&mut self, callable: Callable) -> Result<Signature, MediatorError> {
        let signature = Signature::new(callable.parameter_types(), self.capacity)?;
        match self.handlers.entry(signature) {
            Entry::Occupied(entry) => Err(MediatorError::AlreadyRegistered(entry.key().clone())),
            Entry::Vacant(entry) => {
                let signature = entry.key().clone();
                entry.insert(callable);
                Ok(signature)
            }
        }
    }

    pub fn get(&self, signature: &Signature) -> Option<&Callable> {
        self.handlers.get(signature)
    }

    pub fn contains(&self, signature: &Signature) -> bool {
        self.handlers.contains_key(signature)
    }

    pub fn signatures(&self) -> Vec<Signature> {
        self.handlers.keys().cloned().collect()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
