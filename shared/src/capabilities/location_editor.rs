use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};

use crate::model::Coordinates;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocationEditOperation {
    pub current: Option<Coordinates>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum LocationEditOutcome {
    /// Picked position as `[latitude, longitude]`.
    Saved { position: [f64; 2] },
    Cancelled,
}

impl Operation for LocationEditOperation {
    type Output = LocationEditOutcome;
}

pub struct LocationEditor<Ev> {
    context: CapabilityContext<LocationEditOperation, Ev>,
}

impl<Ev> Clone for LocationEditor<Ev> {
    fn clone(&self) -> Self {
        Self {
            context: self.context.clone(),
        }
    }
}

impl<Ev> Capability<Ev> for LocationEditor<Ev> {
    type Operation = LocationEditOperation;
    type MappedSelf<MappedEv> = LocationEditor<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        LocationEditor::new(self.context.map_event(f))
    }
}

impl<Ev> LocationEditor<Ev>
where
    Ev: Send + 'static,
{
    pub fn new(context: CapabilityContext<LocationEditOperation, Ev>) -> Self {
        Self { context }
    }

    pub fn edit<F>(&self, current: Option<Coordinates>, callback: F)
    where
        F: FnOnce(LocationEditOutcome) -> Ev + Send + 'static,
    {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            let outcome = ctx
                .request_from_shell(LocationEditOperation { current })
                .await;
            ctx.update_app(callback(outcome));
        });
    }
}
