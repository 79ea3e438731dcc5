//! Mediator - 引数の型で handler を選んで同期的に呼び出す
//!
//! # 流れ
//! - register: handler → 宣言された引数型 → Signature → 登録
//! - publish: 値 → 実行時の型 → Signature → lookup → 呼び出し
//!
//! # 並行性
//! registry は `RwLock` の内側にあります。
//! publish は lookup の間だけ read lock を取り、handler はロックを外してから呼びます。
//! そのため handler の中から同じ Mediator に publish / register できます。

use std::any::Any;

use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::argument::IntoArguments;
use crate::config::{ConfigError, DEFAULT_MAX_ARITY, MediatorConfig};
use crate::error::MediatorError;
use crate::handler::{CallFailure, Callable, Handler};
use crate::registry::HandlerRegistry;
use crate::signature::Signature;

/// Mediator は Signature ごとに 1 つの handler を持つ
///
/// # 使用例
/// ```ignore
/// let mediator = Mediator::new();
/// mediator.register(|id: u64| println!("order {id}"))?;
///
/// mediator.publish((42u64,))?;           // handler が呼ばれる
/// mediator.publish((42i32,)).unwrap_err(); // HandlerNotFound
/// ```
#[derive(Debug)]
pub struct Mediator {
    registry: RwLock<HandlerRegistry>,
}

impl Mediator {
    pub fn new() -> Self {
        Self::from_registry(HandlerRegistry::new(DEFAULT_MAX_ARITY))
    }

    /// `capacity` is the maximum number of values a handler or publish call may carry.
    ///
    /// # Errors
    /// `ArityOutOfRange` when `capacity` is wider than the widest handler shape (8).
    pub fn with_capacity(capacity: usize) -> Result<Self, ConfigError> {
        Self::from_config(&MediatorConfig::new(capacity))
    }

    pub fn from_config(config: &MediatorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_registry(HandlerRegistry::new(config.max_arity)))
    }

    fn from_registry(registry: HandlerRegistry) -> Self {
        Self {
            registry: RwLock::new(registry),
        }
    }

    pub fn capacity(&self) -> usize {
        self.registry.read().capacity()
    }

    pub fn len(&self) -> usize {
        self.registry.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.read().is_empty()
    }

    pub fn contains(&self, signature: &Signature) -> bool {
        self.registry.read().contains(signature)
    }

    /// Snapshot of the registered signatures, in no particular order.
    pub fn signatures(&self) -> Vec<Signature> {
        self.registry.read().signatures()
    }

    /// Register `handler` under the signature of its parameter types.
    ///
    /// # Errors
    /// - `TooManyArguments`: the handler declares more parameters than the capacity
    /// - `AlreadyRegistered`: another handler already has the same parameter types
    pub fn register<P, H: Handler<P>>(&self, handler: H) -> Result<(), MediatorError> {
        self.register_callable(Callable::new(handler))
    }

    /// Register an already erased handler (see `Callable::new`).
    ///
    /// # Errors
    /// - `TooManyArguments`: the callable declares more parameters than the capacity
    /// - `AlreadyRegistered`: another handler already has the same parameter types
    pub fn register_callable(&self, callable: Callable) -> Result<(), MediatorError> {
        let arity = callable.arity();
        let signature = self.registry.write().register(callable)?;
        debug!(%signature, arity, "handler registered");
        Ok(())
    }

    /// Register a handler handed over as an opaque value.
    ///
    /// Only a boxed `Callable` is accepted; anything else is `NotCallable`.
    /// That includes a boxed closure or fn item: `Box::new(|n: i32| {})` is rejected,
    /// wrap it first with `Box::new(Callable::new(|n: i32| {}))`.
    pub fn register_any(&self, candidate: Box<dyn Any + Send + Sync>) -> Result<(), MediatorError> {
        let callable = candidate
            .downcast::<Callable>()
            .map_err(|_| MediatorError::NotCallable)?;
        self.register_callable(*callable)
    }

    /// Dispatch `args` to the handler whose parameter types match their runtime types exactly.
    ///
    /// # Errors
    /// - `TooManyArguments`: more values than the capacity (checked before lookup)
    /// - `HandlerNotFound`: no handler with exactly these types in this order
    /// - `Handler`: the handler ran and returned this error
    pub fn publish<A: IntoArguments>(&self, args: A) -> Result<(), MediatorError> {
        let args = args.into_arguments();

        let (signature, handler) = {
            let registry = self.registry.read();
            let signature = args.signature(registry.capacity())?;
            match registry.get(&signature) {
                Some(handler) => {
                    let handler = handler.clone();
                    (signature, handler)
                }
                None => return Err(MediatorError::HandlerNotFound(signature)),
            }
        };

        trace!(%signature, "dispatching");
        handler.invoke(args).map_err(|failure| match failure {
            CallFailure::Mismatch => MediatorError::HandlerNotFound(signature),
            CallFailure::Handler(err) => MediatorError::Handler(err),
        })
    }
}

impl Default for Mediator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::argument::Arguments;
    use crate::error::HandlerError;
    use parking_lot::Mutex;
    use rstest::rstest;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, thiserror::Error, PartialEq)]
    #[error("out of stock: {0}")]
    struct OutOfStock(u32);

    struct Marker;

    fn counting(counter: Arc<AtomicUsize>) -> impl Fn(i32) + Send + Sync + 'static {
        move |_n: i32| {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn new_mediator_is_empty_with_default_capacity() {
        let mediator = Mediator::new();
        assert!(mediator.is_empty());
        assert_eq!(mediator.capacity(), 2);
    }

    #[test]
    fn register_one_and_two_arguments() {
        let mediator = Mediator::new();
        mediator.register(|_first: i32| {}).unwrap();
        mediator.register(|_first: i32, _second: i32| {}).unwrap();
        assert_eq!(mediator.len(), 2);
    }

    #[test]
    fn register_rejects_too_many_arguments() {
        let mediator = Mediator::new();
        let err = mediator
            .register(|_a: i32, _b: i32, _c: i32| {})
            .unwrap_err();
        assert!(matches!(err, MediatorError::TooManyArguments { given: 3, capacity: 2 }));
        assert!(mediator.is_empty());
    }

    #[rstest]
    #[case::unit(Box::new(()) as Box<dyn Any + Send + Sync>)]
    #[case::empty_struct(Box::new(Marker) as Box<dyn Any + Send + Sync>)]
    #[case::string(Box::new(String::from("handler")) as Box<dyn Any + Send + Sync>)]
    #[case::number(Box::new(42i32) as Box<dyn Any + Send + Sync>)]
    #[case::bare_closure(Box::new(|_n: i32| {}) as Box<dyn Any + Send + Sync>)]
    #[case::bare_fn_item(Box::new(drop::<i32>) as Box<dyn Any + Send + Sync>)]
    fn register_any_rejects_non_callables(#[case] candidate: Box<dyn Any + Send + Sync>) {
        let mediator = Mediator::new();
        let err = mediator.register_any(candidate).unwrap_err();
        assert!(matches!(err, MediatorError::NotCallable));
    }

    #[test]
    fn register_any_accepts_a_callable() {
        let mediator = Mediator::new();
        let counter = Arc::new(AtomicUsize::new(0));
        mediator
            .register_any(Box::new(Callable::new(counting(counter.clone()))))
            .unwrap();

        mediator.publish((1i32,)).unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn register_callable_reports_capacity_and_duplicates() {
        let mediator = Mediator::new();
        let err = mediator
            .register_callable(Callable::new(|_a: u8, _b: u8, _c: u8| {}))
            .unwrap_err();
        assert!(matches!(err, MediatorError::TooManyArguments { given: 3, capacity: 2 }));

        mediator.register_callable(Callable::new(|_s: String| {})).unwrap();
        let err = mediator
            .register_callable(Callable::new(|_other: String| {}))
            .unwrap_err();
        assert!(matches!(err, MediatorError::AlreadyRegistered(_)));
        assert_eq!(mediator.len(), 1);
    }

    #[test]
    fn duplicate_signature_is_rejected_even_for_different_closures() {
        let mediator = Mediator::new();
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        mediator.register(counting(first.clone())).unwrap();
        let err = mediator.register(counting(second.clone())).unwrap_err();
        assert!(matches!(err, MediatorError::AlreadyRegistered(ref sig) if sig.arity() == 1));

        mediator.publish((9i32,)).unwrap();
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn publish_invokes_exactly_once_with_values_in_order() {
        let mediator = Mediator::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        mediator
            .register(move |name: String, qty: u32| sink.lock().push((name, qty)))
            .unwrap();

        mediator.publish((String::from("apple"), 3u32)).unwrap();
        assert_eq!(*seen.lock(), vec![(String::from("apple"), 3)]);
    }

    #[test]
    fn publish_with_no_arguments_reaches_zero_arity_handler() {
        let mediator = Mediator::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let c = counter.clone();
        mediator
            .register(move || {
                c.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();

        mediator.publish(()).unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[rstest]
    #[case::wrong_type(Arguments::new().with(1.1f64))]
    #[case::wrong_width(Arguments::new().with(1i64))]
    #[case::wrong_count(Arguments::new().with(1i32).with(2i32))]
    #[case::no_arguments(Arguments::new())]
    fn publish_without_exact_match_is_not_found(#[case] args: Arguments) {
        let mediator = Mediator::new();
        let counter = Arc::new(AtomicUsize::new(0));
        mediator.register(counting(counter.clone())).unwrap();

        let err = mediator.publish(args).unwrap_err();
        assert!(matches!(err, MediatorError::HandlerNotFound(_)));
        assert!(err.is_dispatch());
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn publish_too_many_arguments_is_checked_before_lookup() {
        let mediator = Mediator::new();
        mediator.register(|_n: i32| {}).unwrap();

        let err = mediator.publish((1i32, 2i32, 3i32)).unwrap_err();
        assert!(matches!(err, MediatorError::TooManyArguments { given: 3, capacity: 2 }));
    }

    #[test]
    fn handler_error_is_returned_unchanged() {
        let mediator = Mediator::new();
        mediator
            .register(|qty: u32| -> Result<(), OutOfStock> {
                if qty > 10 { Err(OutOfStock(qty)) } else { Ok(()) }
            })
            .unwrap();

        mediator.publish((3u32,)).unwrap();

        let err = mediator.publish((11u32,)).unwrap_err();
        assert!(!err.is_dispatch());
        let inner = err.into_handler_error().unwrap();
        assert_eq!(inner.downcast_ref::<OutOfStock>(), Some(&OutOfStock(11)));
    }

    #[test]
    fn capacity_is_configurable() {
        let mediator = Mediator::with_capacity(3).unwrap();
        mediator.register(|_a: u8, _b: u8, _c: u8| {}).unwrap();
        mediator.publish((1u8, 2u8, 3u8)).unwrap();

        let narrow = Mediator::from_config(&MediatorConfig::new(0)).unwrap();
        assert!(narrow.register(|_n: u8| {}).is_err());
        narrow.register(|| {}).unwrap();
        assert!(matches!(
            narrow.publish((1u8,)),
            Err(MediatorError::TooManyArguments { given: 1, capacity: 0 })
        ));
    }

    #[test]
    fn from_config_validates() {
        let err = Mediator::from_config(&MediatorConfig::new(64)).unwrap_err();
        assert_eq!(err, ConfigError::ArityOutOfRange { given: 64, max: 8 });
    }

    #[rstest]
    #[case::just_too_wide(9)]
    #[case::huge(usize::MAX)]
    fn with_capacity_rejects_out_of_range(#[case] capacity: usize) {
        let err = Mediator::with_capacity(capacity).unwrap_err();
        assert_eq!(err, ConfigError::ArityOutOfRange { given: capacity, max: 8 });
    }

    #[test]
    fn with_capacity_accepts_the_widest_shape() {
        let mediator = Mediator::with_capacity(8).unwrap();
        mediator
            .register(|_a: u8, _b: u8, _c: u8, _d: u8, _e: u8, _f: u8, _g: u8, _h: u8| {})
            .unwrap();
        mediator
            .publish((1u8, 2u8, 3u8, 4u8, 5u8, 6u8, 7u8, 8u8))
            .unwrap();
    }

    #[test]
    fn boxed_error_handlers_are_accepted() {
        let mediator = Mediator::new();
        mediator
            .register(|n: i32| -> Result<(), HandlerError> {
                if n < 0 { Err("boom".into()) } else { Ok(()) }
            })
            .unwrap();

        mediator.publish((1i32,)).unwrap();

        let err = mediator.publish((-1i32,)).unwrap_err();
        assert!(matches!(err, MediatorError::Handler(_)));
        assert_eq!(err.into_handler_error().unwrap().to_string(), "boom");
    }

    #[test]
    fn handler_may_publish_into_the_same_mediator() {
        let mediator = Arc::new(Mediator::new());
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = seen.clone();
        mediator
            .register(move |n: i64| sink.lock().push(n))
            .unwrap();

        let inner = Arc::clone(&mediator);
        mediator
            .register(move |n: i32| inner.publish((i64::from(n) * 2,)))
            .unwrap();

        mediator.publish((21i32,)).unwrap();
        assert_eq!(*seen.lock(), vec![42]);
    }

    #[test]
    fn concurrent_duplicate_registration_has_one_winner() {
        let mediator = Mediator::new();
        let wins = AtomicUsize::new(0);

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    if mediator.register(|_n: i32| {}).is_ok() {
                        wins.fetch_add(1, Ordering::SeqCst);
                    }
                });
            }
        });

        assert_eq!(wins.load(Ordering::SeqCst), 1);
        assert_eq!(mediator.len(), 1);
    }
}
