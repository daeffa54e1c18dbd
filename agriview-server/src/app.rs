use std::sync::Arc;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::configs::{Advisor, Automation, SchemaManager, Settings, Storage};
use crate::handles::*;
use crate::repositories::{ActuatorLogRepository, PreferenceRepository};
use crate::services::{
    AdvisorService, AutomationService, AutomationSwitch, ControlPanel, EventBus, MqttChannel,
    RemoteChannel, RuleStore,
};

/// Services shared by the handlers and the automation listener.
#[derive(Clone)]
pub struct AppServices {
    pub storage: Arc<Storage>,
    pub channel: Arc<dyn RemoteChannel>,
    pub switch: Arc<AutomationSwitch>,
    pub rule_store: Arc<RuleStore>,
    pub panel: Arc<ControlPanel>,
    pub advisor_service: Arc<AdvisorService>,
    pub events: EventBus,
}

impl AppServices {
    pub async fn new(
        storage: Arc<Storage>,
        channel: Arc<dyn RemoteChannel>,
        automation: &Automation,
        advisor: Advisor,
    ) -> Result<Self, anyhow::Error> {
        let switch = Arc::new(AutomationSwitch::new(automation.global_default));
        let rule_store = Arc::new(RuleStore::new(PreferenceRepository::new(storage.clone())).await);
        let panel = Arc::new(ControlPanel::new(
            channel.clone(),
            switch.clone(),
            ActuatorLogRepository::new(storage.clone()),
        ));
        let advisor_service = Arc::new(AdvisorService::new(advisor)?);

        if !advisor_service.is_configured() {
            tracing::warn!("advisor api key missing, crop suggestions disabled");
        }

        Ok(Self {
            storage,
            channel,
            switch,
            rule_store,
            panel,
            advisor_service,
            events: EventBus::default(),
        })
    }

    pub fn automation_service(&self) -> Arc<AutomationService> {
        Arc::new(AutomationService::new(
            self.channel.clone(),
            self.rule_store.clone(),
            self.switch.clone(),
            self.panel.clone(),
            self.events.clone(),
        ))
    }
}

pub fn create_router(services: &AppServices) -> Router {
    Router::new()
        .merge(farm_router(FarmState {
            channel: services.channel.clone(),
            actuator_log_repository: Arc::new(ActuatorLogRepository::new(services.storage.clone())),
        }))
        .merge(panel_router(PanelState {
            panel: services.panel.clone(),
            events: services.events.clone(),
        }))
        .merge(rule_router(RuleState {
            rule_store: services.rule_store.clone(),
        }))
        .merge(setting_router(SettingState {
            switch: services.switch.clone(),
        }))
        .merge(advisor_router(AdvisorState {
            advisor_service: services.advisor_service.clone(),
        }))
        .merge(sse_router(SSEState {
            events: services.events.clone(),
        }))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

pub async fn create_app(settings: &Arc<Settings>) -> Result<Router, anyhow::Error> {
    let storage = Arc::new(Storage::new(settings.database.clone(), SchemaManager::default()).await?);

    let channel: Arc<dyn RemoteChannel> = MqttChannel::connect(&settings.gateway)?;
    tracing::info!(
        "watching farm {} on {}:{}",
        channel.farm_id(),
        settings.gateway.host,
        settings.gateway.port
    );

    let services = AppServices::new(
        storage,
        channel,
        &settings.automation,
        settings.advisor.clone(),
    )
    .await?;

    services.automation_service().start();

    Ok(create_router(&services))
}
