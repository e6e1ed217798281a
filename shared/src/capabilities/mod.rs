pub mod http;

pub use crux_core::render::Render;
pub use crux_http::Http;

pub use self::http::{ApiEndpoints, EndpointError};

#[allow(unused_imports)]
use crate::app::App;
use crate::event::Event;

#[derive(crux_core::macros::Effect)]
pub struct Capabilities {
    pub http: Http<Event>,
    pub render: Render<Event>,
}
