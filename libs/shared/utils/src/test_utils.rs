use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use uuid::Uuid;

use shared_config::{AppConfig, SchedulingConfig};

use crate::clock::FixedClock;
use crate::extractor::RequestContext;

pub struct TestConfig {
    pub server_port: u16,
    pub scheduling: SchedulingConfig,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            server_port: 0,
            scheduling: SchedulingConfig::default(),
        }
    }
}

impl TestConfig {
    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            server_port: self.server_port,
            scheduling: self.scheduling.clone(),
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

pub fn clock_at(y: i32, m: u32, d: u32, h: u32, mi: u32) -> Arc<FixedClock> {
    Arc::new(FixedClock::at(date(y, m, d), time(h, mi)))
}

pub struct TestActor {
    pub id: Uuid,
}

impl Default for TestActor {
    fn default() -> Self {
        Self { id: Uuid::new_v4() }
    }
}

impl TestActor {
    pub fn context(&self) -> RequestContext {
        RequestContext::new(self.id)
    }

    pub fn emergency_context(&self) -> RequestContext {
        RequestContext::new(self.id).with_emergency_override()
    }
}
