use std::sync::Once;

use metrics::{Unit, describe_counter};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install the global subscriber: env filter over the configured level, span traces for errors,
/// and one event per line in the configured format.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer().json().flatten_event(true).boxed(),
        LogFormat::Compact => fmt::layer().compact().with_target(true).boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .try_init()
        .map_err(|err| {
            InfraError::telemetry(format!("failed to install tracing subscriber: {err}"))
        })
}

fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            "postboard_posts_created_total",
            Unit::Count,
            "Total number of posts created."
        );
        describe_counter!(
            "postboard_posts_updated_total",
            Unit::Count,
            "Total number of post updates persisted."
        );
        describe_counter!(
            "postboard_posts_deleted_total",
            Unit::Count,
            "Total number of posts deleted."
        );
        describe_counter!(
            "postboard_notifications_delivered_total",
            Unit::Count,
            "Post change notifications delivered, labelled by channel."
        );
        describe_counter!(
            "postboard_notifications_failed_total",
            Unit::Count,
            "Post change notifications that failed, labelled by channel."
        );
    });
}
