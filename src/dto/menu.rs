use serde::Serialize;
use utoipa::ToSchema;

use crate::menu::{MenuEntry, Role};

#[derive(Debug, Serialize, ToSchema)]
pub struct MenuResponse {
    pub role: Role,
    pub entries: Vec<MenuEntry>,
}
