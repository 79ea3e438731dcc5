//! MediatorBuilder - Mediator の構築と起動時検証
//!
//! # 学習ポイント
//! - Builder パターンの実装
//! - 起動時検証（Fail-fast 設計）
//! - 開発体験の改善（明確なエラーメッセージ）

use crate::config::{ConfigError, MediatorConfig};
use crate::error::MediatorError;
use crate::handler::Handler;
use crate::mediator::Mediator;
use crate::signature::{ParameterTypes, Signature, TypeTag};

/// MediatorBuilder は handler を登録した Mediator を構築
///
/// # 使用例
/// ```ignore
/// let mediator = MediatorBuilder::with_capacity(3)?
///     .register(on_order)?
///     .register(on_refund)?
///     .expect::<(OrderId, Qty)>()
///     .build()?;
/// ```
///
/// # Fail-fast 設計
/// - expect() で handler が必要な引数型の並びを宣言
/// - build() 時に「期待集合 ⊆ 登録済み集合」をチェック
/// - 不足があれば BuildError を返す
pub struct MediatorBuilder {
    mediator: Mediator,
    expected: Vec<Vec<TypeTag>>,
}

/// BuildError は Mediator 構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Missing handlers for signatures: {0:?}. These signatures were expected but not registered.")]
    MissingSignatures(Vec<Signature>),

    #[error(transparent)]
    Mediator(#[from] MediatorError),
}

impl MediatorBuilder {
    pub fn new() -> Self {
        Self::from_mediator(Mediator::new())
    }

    pub fn with_capacity(capacity: usize) -> Result<Self, ConfigError> {
        Ok(Self::from_mediator(Mediator::with_capacity(capacity)?))
    }

    pub fn with_config(config: &MediatorConfig) -> Result<Self, ConfigError> {
        Ok(Self::from_mediator(Mediator::from_config(config)?))
    }

    fn from_mediator(mediator: Mediator) -> Self {
        Self {
            mediator,
            expected: Vec::new(),
        }
    }

    /// Handler を登録
    ///
    /// `Mediator::register` と同じ検証をその場で行います。
    pub fn register<P, H: Handler<P>>(self, handler: H) -> Result<Self, MediatorError> {
        self.mediator.register(handler)?;
        Ok(self)
    }

    /// handler が必要な引数型の並びを追加
    ///
    /// # Example
    /// ```ignore
    /// builder.expect::<(u64,)>().expect::<(String, u32)>();
    /// ```
    pub fn expect<P: ParameterTypes>(mut self) -> Self {
        self.expected.push(P::type_tags());
        self
    }

    /// MediatorBuilder を構築して Mediator を生成
    ///
    /// # 検証
    /// - expect() で設定された並びが capacity に収まるか（TooManyArguments）
    /// - その全てに handler が登録されているか（MissingSignatures）
    pub fn build(self) -> Result<Mediator, BuildError> {
        let capacity = self.mediator.capacity();
        let mut missing = Vec::new();
        for types in &self.expected {
            let signature = Signature::new(types, capacity)?;
            if !self.mediator.contains(&signature) {
                missing.push(signature);
            }
        }
        if !missing.is_empty() {
            return Err(BuildError::MissingSignatures(missing));
        }
        Ok(self.mediator)
    }
}

impl Default for MediatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
