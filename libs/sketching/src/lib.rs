#![deny(warnings)]
#![warn(unused_extern_crates)]
#![allow(non_snake_case)]
use num_enum::{IntoPrimitive, TryFromPrimitive};
use tracing_forest::printer::TestCapturePrinter;
use tracing_forest::tag::NoTag;
use tracing_forest::ForestLayer;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::prelude::*;

pub mod macros;

pub use {tracing, tracing_forest, tracing_subscriber};

/// Start up the logging for test mode.
pub fn test_init() {
    let filter = EnvFilter::from_default_env().add_directive(LevelFilter::TRACE.into());

    // start the logging!
    let _ = tracing_subscriber::Registry::default()
        .with(ForestLayer::new(TestCapturePrinter::new(), NoTag).with_filter(filter))
        .try_init();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(u64)]
pub enum EventTag {
    AdminDebug,
    AdminError,
    AdminWarn,
    AdminInfo,
    SecurityInfo,
    SecurityAccess,
    SecurityError,
}

impl EventTag {
    pub fn pretty(self) -> &'static str {
        match self {
            EventTag::AdminDebug => "admin.debug",
            EventTag::AdminError => "admin.error",
            EventTag::AdminWarn => "admin.warn",
            EventTag::AdminInfo => "admin.info",
            EventTag::SecurityInfo => "security.info",
            EventTag::SecurityAccess => "security.access",
            EventTag::SecurityError => "security.error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::EventTag;

    #[test]
    fn test_event_tag_primitive() {
        let id: u64 = EventTag::SecurityAccess.into();
        let back = EventTag::try_from(id).expect("tag id must round trip");
        assert_eq!(back, EventTag::SecurityAccess);
        assert_eq!(back.pretty(), "security.access");
        assert!(EventTag::try_from(u64::MAX).is_err());
    }

    #[test]
    fn test_tagged_macros() {
        crate::test_init();
        crate::admin_info!("admin info {}", 1);
        crate::admin_debug!(value = 2, "admin debug");
        crate::security_access!("access granted");
        crate::security_error!(reason = "test", "security error");
    }
}
