//! The assembled client.

use std::sync::Arc;

use bridge_traits::time::Timer;
use core_api::models::LoginData;
use core_api::resources::{AdminApi, CementPlantApi, FilesApi, GeoFilesApi, PollutionApi, UserApi};
use core_api::{ApiClient, CallWrapper, Classification, Dispatcher, MapServiceConfig, WrapOptions};
use core_auth::{RouteDecision, RouteGuard, SessionStore};
use core_runtime::config::ClientConfig;
use core_runtime::events::{EventBus, EventStream};
use core_runtime::navigation::{Navigator, Route};
use tracing::{info, instrument, warn};

use crate::error::Result;

/// One signed-in (or signed-out) client and everything it owns.
///
/// Cloning is cheap; clones share the session, the event bus and the
/// navigation signal.
#[derive(Clone)]
pub struct PlantClient {
    events: EventBus,
    navigator: Navigator,
    session: Arc<SessionStore>,
    api: ApiClient,
    dispatcher: Arc<Dispatcher>,
    wrapper: CallWrapper,
    guard: RouteGuard,
    timer: Arc<dyn Timer>,
    map: Arc<MapServiceConfig>,
}

impl PlantClient {
    /// Wire every component from `config` and restore the stored session.
    #[instrument(skip(config), fields(base_url = %config.api_base_url))]
    pub async fn bootstrap(config: ClientConfig) -> Result<Self> {
        let events = EventBus::new(config.event_buffer_size);
        let navigator = Navigator::new(events.clone());

        let session = Arc::new(SessionStore::new(
            config.settings_store.clone(),
            Some(events.clone()),
        ));
        session.load().await?;

        let api = ApiClient::new(
            config.http_client.clone(),
            session.clone(),
            &config.api_base_url,
            config.request_timeout,
        )?;
        let dispatcher = Arc::new(Dispatcher::new(
            session.clone(),
            navigator.clone(),
            events.clone(),
        ));
        let wrapper = CallWrapper::new(dispatcher.clone(), events.clone());
        let guard = RouteGuard::new(session.clone());

        info!(
            authenticated = session.is_authenticated(),
            "Plant client ready"
        );

        Ok(Self {
            events,
            navigator,
            session,
            api,
            dispatcher,
            wrapper,
            guard,
            timer: config.timer,
            map: Arc::new(MapServiceConfig::default()),
        })
    }

    /// Replace the map service settings.
    pub fn with_map_config(mut self, map: MapServiceConfig) -> Self {
        self.map = Arc::new(map);
        self
    }

    /// Sign in and persist the token and profile on success.
    ///
    /// Failures come back as a failed [`Classification`] after the usual
    /// notice; only storage errors are returned as `Err`.
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<Classification<LoginData>> {
        let result = self
            .wrapper
            .call(self.users().login(username, password), &WrapOptions::default())
            .await?;

        if let Some(data) = result.data.as_ref().filter(|_| result.success) {
            self.session.set_token(data.token.as_str()).await?;
            self.session.set_user_info(data.profile()).await?;
            info!(username = %data.username, "Signed in");
        }

        Ok(result)
    }

    /// Sign out locally, telling the server when it can be reached.
    ///
    /// The session is cleared and `/login` requested whatever the server says.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<()> {
        let quiet = WrapOptions::default().show_error(false);
        let result = self.wrapper.call(self.users().logout(), &quiet).await?;
        if !result.success {
            warn!(code = result.code, "Server logout failed; clearing local session anyway");
        }

        self.session.clear().await?;
        self.navigator.navigate(Route::Login);
        Ok(())
    }

    /// Guard decision for `path`.
    pub fn check_route(&self, path: &str) -> RouteDecision {
        self.guard.check(path)
    }

    /// Check `path` and publish the resulting navigation when it redirects.
    pub fn enter(&self, path: &str) -> RouteDecision {
        let decision = self.check_route(path);
        if let RouteDecision::Redirect(route) = decision {
            self.navigator.navigate(route);
        }
        decision
    }

    pub fn users(&self) -> UserApi {
        UserApi::new(self.api.clone())
    }

    pub fn admin(&self) -> AdminApi {
        AdminApi::new(self.api.clone())
    }

    pub fn plants(&self) -> CementPlantApi {
        CementPlantApi::new(self.api.clone())
    }

    pub fn files(&self) -> FilesApi {
        FilesApi::new(self.api.clone())
    }

    pub fn geo_files(&self) -> GeoFilesApi {
        GeoFilesApi::new(self.api.clone())
    }

    pub fn pollution(&self) -> PollutionApi {
        PollutionApi::new(self.api.clone(), self.timer.clone())
    }

    pub fn map_config(&self) -> &MapServiceConfig {
        &self.map
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn wrapper(&self) -> &CallWrapper {
        &self.wrapper
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn guard(&self) -> &RouteGuard {
        &self.guard
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Subscribe to every core event.
    pub fn subscribe(&self) -> EventStream {
        self.events.stream()
    }
}

impl std::fmt::Debug for PlantClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlantClient")
            .field("api", &self.api)
            .field("authenticated", &self.session.is_authenticated())
            .finish_non_exhaustive()
    }
}
