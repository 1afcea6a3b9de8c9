mod cache;
mod http;
mod image_editor;
mod location_editor;
mod navigator;

pub use self::cache::{CacheError, CacheOperation, CacheOutput, QueryCache, QueryKey};
pub use self::http::{
    AppHttp, Http, HttpError, HttpResponse, HttpResult, ValidatedUrl, MAX_REQUEST_BODY_SIZE,
    MAX_URL_LENGTH,
};
pub use self::image_editor::{ImageEditOperation, ImageEditOutcome, ImageEditor};
pub use self::location_editor::{LocationEditOperation, LocationEditOutcome, LocationEditor};
pub use self::navigator::{NavigateOperation, Navigator};

pub use crux_core::render::Render;

#[allow(unused_imports)]
use crate::{event::Event, App};

pub type AppRender = Render<Event>;
pub type AppCache = QueryCache<Event>;
pub type AppNavigator = Navigator<Event>;
pub type AppImageEditor = ImageEditor<Event>;
pub type AppLocationEditor = LocationEditor<Event>;

#[derive(crux_core::macros::Effect)]
pub struct Capabilities {
    pub render: Render<Event>,
    pub http: Http<Event>,
    pub cache: QueryCache<Event>,
    pub navigator: Navigator<Event>,
    pub image_editor: ImageEditor<Event>,
    pub location_editor: LocationEditor<Event>,
}
