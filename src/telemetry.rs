//! 日志与追踪系统
//! 按配置的级别与格式安装全局 subscriber

use crate::config::{LogFormat, LoggingConfig};
use tracing::Subscriber;
use tracing_subscriber::{
    layer::SubscriberExt, registry::LookupSpan, util::SubscriberInitExt, util::TryInitError,
    EnvFilter, Layer,
};

/// 初始化日志系统
///
/// `RUST_LOG` 存在时优先于配置的级别
pub fn init_telemetry(config: &LoggingConfig) -> Result<(), TryInitError> {
    // 格式已在配置校验时检查过
    let format = config.log_format().unwrap_or(LogFormat::Json);

    tracing_subscriber::registry()
        .with(env_filter(&config.level))
        .with(fmt_layer(format))
        .try_init()?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        level = %config.level,
        format = ?format,
        "Telemetry initialized"
    );

    Ok(())
}

fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// 请求 span 中的 trace_id / request_id 会随每条事件输出
fn fmt_layer<S>(format: LogFormat) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let layer = tracing_subscriber::fmt::layer().with_target(false);

    match format {
        LogFormat::Json => layer
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .boxed(),
        LogFormat::Pretty => layer.pretty().boxed(),
        LogFormat::Compact => layer.compact().boxed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_format_builds_a_layer() {
        for format in [LogFormat::Json, LogFormat::Pretty, LogFormat::Compact] {
            let subscriber = tracing_subscriber::registry().with(fmt_layer(format));
            tracing::subscriber::with_default(subscriber, || {
                let span = tracing::info_span!("http_request", request_id = "req-1");
                let _guard = span.enter();
                tracing::info!("inside request");
            });
        }
    }

    #[test]
    fn test_env_filter_uses_configured_level() {
        if std::env::var("RUST_LOG").is_err() {
            assert_eq!(env_filter("warn").to_string(), "warn");
        }
    }
}
