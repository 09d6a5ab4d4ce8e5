use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppRoute {
    OrderDetail(Uuid),
    Orders,
    SignIn,
}

impl AppRoute {
    pub fn path(&self) -> String {
        match self {
            AppRoute::OrderDetail(id) => format!("/orders/{id}"),
            AppRoute::Orders => "/orders".to_string(),
            AppRoute::SignIn => "/auth/login".to_string(),
        }
    }
}

pub trait Navigator {
    fn navigate(&mut self, route: AppRoute);
}

/// Keeps every requested route so a caller can act on it later.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    routes: Vec<AppRoute>,
}

impl RecordingNavigator {
    pub fn routes(&self) -> &[AppRoute] {
        &self.routes
    }

    pub fn last(&self) -> Option<AppRoute> {
        self.routes.last().copied()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&mut self, route: AppRoute) {
        tracing::debug!(path = %route.path(), "navigate");
        self.routes.push(route);
    }
}
