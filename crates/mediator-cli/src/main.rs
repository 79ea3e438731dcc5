use std::process::ExitCode;

use clap::Parser;
use mediator_core::{
    Argument, Arguments, ConfigError, DEFAULT_MAX_ARITY, Mediator, MediatorConfig, MediatorError,
};
use serde_json::Value;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "mediator-cli", version, about = "Publish values into a demo mediator")]
struct Cli {
    /// Maximum number of values per publish call and per handler
    #[arg(long, default_value_t = DEFAULT_MAX_ARITY)]
    max_arity: usize,

    /// Values to publish, each parsed as JSON (42, -1.5, true, '"text"'); other text is sent as a string
    #[arg(allow_negative_numbers = true)]
    values: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
enum UsageError {
    #[error("unsupported value {0}: only integers, floats, strings and booleans can be published")]
    Unsupported(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Usage(#[from] UsageError),

    #[error(transparent)]
    Publish(#[from] MediatorError),
}

impl CliError {
    fn exit_code(&self) -> u8 {
        match self {
            CliError::Usage(_) => 2,
            CliError::Publish(_) => 1,
        }
    }
}

/// demo handler のエラー
#[derive(Debug, thiserror::Error)]
enum DemoError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("{0} + {1} overflows i64")]
    Overflow(i64, i64),
}

fn greet(name: String) -> Result<(), DemoError> {
    if name.trim().is_empty() {
        return Err(DemoError::EmptyName);
    }
    println!("hello, {name}!");
    Ok(())
}

fn sum(a: i64, b: i64) -> Result<(), DemoError> {
    let total = a.checked_add(b).ok_or(DemoError::Overflow(a, b))?;
    println!("sum: {total}");
    Ok(())
}

/// 1 つの JSON 値を Argument に変換
///
/// 整数 → i64, 小数 → f64, 文字列 → String, 真偽値 → bool。
/// JSON として読めない入力はそのまま String として扱う。
fn parse_argument(raw: &str) -> Result<Argument, UsageError> {
    let value = match serde_json::from_str::<Value>(raw) {
        Ok(value) => value,
        Err(_) => return Ok(Argument::new(raw.to_string())),
    };

    match value {
        Value::Bool(flag) => Ok(Argument::new(flag)),
        Value::String(text) => Ok(Argument::new(text)),
        Value::Number(number) => {
            if let Some(n) = number.as_i64() {
                Ok(Argument::new(n))
            } else if let Some(x) = number.as_f64() {
                Ok(Argument::new(x))
            } else {
                Err(UsageError::Unsupported(raw.to_string()))
            }
        }
        other => Err(UsageError::Unsupported(other.to_string())),
    }
}

fn parse_arguments(raws: &[String]) -> Result<Arguments, UsageError> {
    raws.iter().map(|raw| parse_argument(raw)).collect()
}

/// demo handler を登録した Mediator を作る
///
/// capacity に収まらない handler は警告を出して登録しない。
fn build_mediator(config: &MediatorConfig) -> Result<Mediator, ConfigError> {
    let mediator = Mediator::from_config(config)?;

    let registrations = [
        ("empty", mediator.register(|| println!("nothing was published"))),
        ("integer", mediator.register(|n: i64| println!("integer: {n}"))),
        ("float", mediator.register(|x: f64| println!("float: {x}"))),
        ("flag", mediator.register(|flag: bool| println!("flag: {flag}"))),
        ("greet", mediator.register(greet)),
        ("sum", mediator.register(sum)),
        (
            "scale",
            mediator.register(|x: f64, factor: i64| println!("scaled: {}", x * factor as f64)),
        ),
    ];
    for (name, result) in registrations {
        if let Err(err) = result {
            warn!(handler = name, %err, "demo handler not registered");
        }
    }

    Ok(mediator)
}

fn run(cli: &Cli) -> Result<(), CliError> {
    // (A) 設定から Mediator を用意
    let config = MediatorConfig::new(cli.max_arity);
    let mediator = build_mediator(&config).map_err(UsageError::from)?;
    info!(
        handlers = mediator.len(),
        capacity = mediator.capacity(),
        "mediator ready"
    );

    // (B) コマンドライン引数を値に変換
    let args = parse_arguments(&cli.values)?;

    // (C) publish（handler の選択は値の型だけで決まる）
    mediator.publish(args)?;
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match &err {
                CliError::Publish(inner) if inner.is_dispatch() => {
                    eprintln!("dispatch failed: {inner}")
                }
                _ => eprintln!("error: {err}"),
            }
            ExitCode::from(err.exit_code())
        }
    }
}
