use tracing::debug;

use crate::capabilities::Capabilities;
use crate::event::Event;
use crate::gateway::JournalGateway;
use crate::model::Model;
use crate::view::ViewModel;

#[derive(Default)]
pub struct App;

impl crux_core::App for App {
    type Event = Event;
    type Model = Model;
    type ViewModel = ViewModel;
    type Capabilities = Capabilities;

    fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
        let event_name = event.name();
        debug!(event = event_name, user_initiated = event.is_user_initiated(), "update");

        let requests = model.apply(event);
        let gateway = JournalGateway::new(&caps.http, &model.config);
        let failed: Vec<Event> = requests
            .into_iter()
            .filter_map(|request| gateway.dispatch(request))
            .collect();

        for event in failed {
            self.update(event, model, caps);
        }

        caps.render.render();
    }

    fn view(&self, model: &Model) -> ViewModel {
        ViewModel::from_model(model)
    }
}
