use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum NavigateOperation {
    /// Replace the current page with the one at `route`.
    To { route: String },
}

impl Operation for NavigateOperation {
    type Output = ();
}

pub struct Navigator<Ev> {
    context: CapabilityContext<NavigateOperation, Ev>,
}

impl<Ev> Clone for Navigator<Ev> {
    fn clone(&self) -> Self {
        Self {
            context: self.context.clone(),
        }
    }
}

impl<Ev> Capability<Ev> for Navigator<Ev> {
    type Operation = NavigateOperation;
    type MappedSelf<MappedEv> = Navigator<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        Navigator::new(self.context.map_event(f))
    }
}

impl<Ev> Navigator<Ev>
where
    Ev: Send + 'static,
{
    pub fn new(context: CapabilityContext<NavigateOperation, Ev>) -> Self {
        Self { context }
    }

    pub fn navigate_to(&self, route: impl Into<String>) {
        let route = route.into();
        let ctx = self.context.clone();
        self.context.spawn(async move {
            ctx.notify_shell(NavigateOperation::To { route }).await;
        });
    }
}
