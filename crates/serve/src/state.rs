use adapt::service::Services;
use domain::setting::EventSettings;

#[derive(Clone)]
pub struct AppState {
    pub services: Services,
    pub event: EventSettings,
}

impl AppState {
    #[tracing::instrument(skip_all)]
    pub fn new(services: Services, event: EventSettings) -> Self {
        Self { services, event }
    }
}
