use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};

use crate::model::ImageRef;

/// Asks the shell to present the image editor modal, seeded with what the
/// draft currently shows.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImageEditOperation {
    pub current: Option<ImageRef>,
    pub preview: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ImageEditOutcome {
    Saved { image: ImageRef, preview: String },
    Cancelled,
}

impl Operation for ImageEditOperation {
    type Output = ImageEditOutcome;
}

pub struct ImageEditor<Ev> {
    context: CapabilityContext<ImageEditOperation, Ev>,
}

impl<Ev> Clone for ImageEditor<Ev> {
    fn clone(&self) -> Self {
        Self {
            context: self.context.clone(),
        }
    }
}

impl<Ev> Capability<Ev> for ImageEditor<Ev> {
    type Operation = ImageEditOperation;
    type MappedSelf<MappedEv> = ImageEditor<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        ImageEditor::new(self.context.map_event(f))
    }
}

impl<Ev> ImageEditor<Ev>
where
    Ev: Send + 'static,
{
    pub fn new(context: CapabilityContext<ImageEditOperation, Ev>) -> Self {
        Self { context }
    }

    pub fn edit<F>(&self, current: Option<ImageRef>, preview: Option<String>, callback: F)
    where
        F: FnOnce(ImageEditOutcome) -> Ev + Send + 'static,
    {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            let outcome = ctx
                .request_from_shell(ImageEditOperation { current, preview })
                .await;
            ctx.update_app(callback(outcome));
        });
    }
}
