#![allow(dead_code)]

use crux_core::testing::AppTester;
use crux_core::Request;
use serde_json::json;

use crux_http::protocol::{HttpRequest, HttpResponse, HttpResult};
use shared::capabilities::{
    CacheOperation, CacheOutput, ImageEditOperation, ImageEditOutcome, LocationEditOperation,
    LocationEditOutcome, NavigateOperation, QueryKey,
};
use shared::{App, Effect, Event, Model, ViewModel};

pub struct Harness {
    pub app: AppTester<App, Effect>,
    pub model: Model,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            app: AppTester::<App, Effect>::default(),
            model: Model::default(),
        }
    }

    /// Sends `event` and every event it produces, returning all effects.
    pub fn send(&mut self, event: Event) -> Vec<Effect> {
        let update = self.app.update(event, &mut self.model);
        let mut effects = update.effects;
        for event in update.events {
            effects.extend(self.send(event));
        }
        effects
    }

    pub fn view(&self) -> ViewModel {
        self.app.view(&self.model)
    }

    pub fn resolve_cache(
        &mut self,
        mut request: Request<CacheOperation>,
        output: CacheOutput,
    ) -> Vec<Effect> {
        let update = self
            .app
            .resolve(&mut request, output)
            .expect("cache request should resolve");
        let mut effects = update.effects;
        for event in update.events {
            effects.extend(self.send(event));
        }
        effects
    }

    pub fn resolve_http(
        &mut self,
        mut request: Request<HttpRequest>,
        result: HttpResult,
    ) -> Vec<Effect> {
        let update = self
            .app
            .resolve(&mut request, result)
            .expect("http request should resolve");
        let mut effects = update.effects;
        for event in update.events {
            effects.extend(self.send(event));
        }
        effects
    }

    pub fn resolve_image_editor(
        &mut self,
        mut request: Request<ImageEditOperation>,
        outcome: ImageEditOutcome,
    ) -> Vec<Effect> {
        let update = self
            .app
            .resolve(&mut request, outcome)
            .expect("image editor request should resolve");
        let mut effects = update.effects;
        for event in update.events {
            effects.extend(self.send(event));
        }
        effects
    }

    pub fn resolve_location_editor(
        &mut self,
        mut request: Request<LocationEditOperation>,
        outcome: LocationEditOutcome,
    ) -> Vec<Effect> {
        let update = self
            .app
            .resolve(&mut request, outcome)
            .expect("location editor request should resolve");
        let mut effects = update.effects;
        for event in update.events {
            effects.extend(self.send(event));
        }
        effects
    }

    /// Opens the page for `id`, misses the cache and answers the fetch with
    /// `record`. Returns the effects of the final step.
    pub fn load(&mut self, id: &str, record: serde_json::Value) -> Vec<Effect> {
        let mut effects = self.send(Event::PageOpened { id: id.into() });
        let lookup = take_cache_get(&mut effects);
        let mut effects = self.resolve_cache(lookup, CacheOutput::Miss);
        let fetch = take_http(&mut effects);
        self.resolve_http(fetch, ok_json(record))
    }
}

pub fn record(id: &str) -> serde_json::Value {
    json!({
        "_id": id,
        "species": "Kedi",
        "description": "Bahçede bulundu",
        "gender": "female",
        "color": "orange",
        "healthStatus": "healthy",
        "image": "uploads/cat.jpg",
        "location": {"latitude": 41.0082, "longitude": 28.9784}
    })
}

pub fn record_without_location(id: &str) -> serde_json::Value {
    json!({
        "_id": id,
        "species": "Köpek",
        "description": "",
        "image": ""
    })
}

pub fn response(status: u16, body: &[u8]) -> HttpResult {
    HttpResult::Ok(HttpResponse::status(status).body(body.to_vec()).build())
}

pub fn ok_json(value: serde_json::Value) -> HttpResult {
    response(200, &serde_json::to_vec(&value).expect("json"))
}

pub fn take_http(effects: &mut Vec<Effect>) -> Request<HttpRequest> {
    let index = effects
        .iter()
        .position(|e| matches!(e, Effect::Http(_)))
        .expect("expected an http effect");
    match effects.remove(index) {
        Effect::Http(request) => request,
        _ => unreachable!(),
    }
}

pub fn take_cache_get(effects: &mut Vec<Effect>) -> Request<CacheOperation> {
    let index = effects
        .iter()
        .position(|e| {
            matches!(e, Effect::QueryCache(r) if matches!(r.operation, CacheOperation::Get { .. }))
        })
        .expect("expected a cache lookup");
    match effects.remove(index) {
        Effect::QueryCache(request) => request,
        _ => unreachable!(),
    }
}

pub fn take_image_editor(effects: &mut Vec<Effect>) -> Request<ImageEditOperation> {
    let index = effects
        .iter()
        .position(|e| matches!(e, Effect::ImageEditor(_)))
        .expect("expected the image editor");
    match effects.remove(index) {
        Effect::ImageEditor(request) => request,
        _ => unreachable!(),
    }
}

pub fn take_location_editor(effects: &mut Vec<Effect>) -> Request<LocationEditOperation> {
    let index = effects
        .iter()
        .position(|e| matches!(e, Effect::LocationEditor(_)))
        .expect("expected the location editor");
    match effects.remove(index) {
        Effect::LocationEditor(request) => request,
        _ => unreachable!(),
    }
}

pub fn http_requests(effects: &[Effect]) -> Vec<&HttpRequest> {
    effects
        .iter()
        .filter_map(|e| match e {
            Effect::Http(r) => Some(&r.operation),
            _ => None,
        })
        .collect()
}

pub fn header<'a>(request: &'a HttpRequest, name: &str) -> Option<&'a str> {
    request
        .headers
        .iter()
        .find(|h| h.name.eq_ignore_ascii_case(name))
        .map(|h| h.value.as_str())
}

pub fn body_text(request: &HttpRequest) -> String {
    String::from_utf8_lossy(&request.body).into_owned()
}

pub fn invalidated_keys(effects: &[Effect]) -> Vec<QueryKey> {
    effects
        .iter()
        .filter_map(|e| match e {
            Effect::QueryCache(r) => match &r.operation {
                CacheOperation::Invalidate { key } => Some(key.clone()),
                _ => None,
            },
            _ => None,
        })
        .collect()
}

pub fn cache_writes(effects: &[Effect]) -> Vec<(QueryKey, serde_json::Value)> {
    effects
        .iter()
        .filter_map(|e| match e {
            Effect::QueryCache(r) => match &r.operation {
                CacheOperation::Set { key, value } => Some((key.clone(), value.clone())),
                _ => None,
            },
            _ => None,
        })
        .collect()
}

pub fn navigations(effects: &[Effect]) -> Vec<String> {
    effects
        .iter()
        .filter_map(|e| match e {
            Effect::Navigator(r) => match &r.operation {
                NavigateOperation::To { route } => Some(route.clone()),
            },
            _ => None,
        })
        .collect()
}

pub fn rendered(effects: &[Effect]) -> bool {
    effects.iter().any(|e| matches!(e, Effect::Render(_)))
}
