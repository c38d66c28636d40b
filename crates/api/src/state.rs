//! Shared application state.

use std::sync::Arc;

use assessment::AssessmentService;
use devices::{DeviceManager, MonitorConfig};
use health_store::HealthStore;
use reminders::{ReminderJob, ReminderSender};
use triage::{InsightLookup, SymptomAnalyzer};

use crate::config::Config;

/// Services shared by every handler.
pub struct AppState<S> {
    pub store: Arc<S>,
    pub assessments: AssessmentService<S>,
    pub devices: DeviceManager<S>,
    pub analyzer: SymptomAnalyzer<dyn InsightLookup>,
    pub reminders: Arc<ReminderJob<S, dyn ReminderSender>>,
}

impl<S: HealthStore + 'static> AppState<S> {
    pub fn new(
        store: Arc<S>,
        lookup: Arc<dyn InsightLookup>,
        sender: Arc<dyn ReminderSender>,
        config: &Config,
    ) -> Self {
        let monitor_config = MonitorConfig {
            interval: config.monitor_interval,
            handshake_delay: config.handshake_delay,
        };

        Self {
            assessments: AssessmentService::new(store.clone()),
            devices: DeviceManager::with_config(store.clone(), monitor_config),
            analyzer: SymptomAnalyzer::with_timeout(lookup, config.insight_timeout),
            reminders: Arc::new(ReminderJob::new(
                store.clone(),
                sender,
                config.app_url.clone(),
            )),
            store,
        }
    }
}
