//! Background request tasks.
//!
//! Every call to the server runs on its own tokio task and reports back
//! through the event channel, so the draw loop never waits on the network.

use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use crate::api::QuantClient;
use crate::app::{BackendEvent, Dispatch, Outcome, Request};
use crate::models::ModelId;
use crate::tui::AppEvent;

#[derive(Clone)]
pub struct Backend {
    client: QuantClient,
    tx: UnboundedSender<AppEvent>,
}

impl Backend {
    pub fn new(client: QuantClient, tx: UnboundedSender<AppEvent>) -> Self {
        Self { client, tx }
    }

    fn send(tx: &UnboundedSender<AppEvent>, event: BackendEvent) {
        // The receiver only goes away on shutdown.
        if tx.send(AppEvent::Backend(event)).is_err() {
            debug!("event channel closed, dropping backend result");
        }
    }

    pub fn dispatch(&self, dispatch: Dispatch) {
        let client = self.client.clone();
        let tx = self.tx.clone();
        let Dispatch { typing_id, request } = dispatch;

        tokio::spawn(async move {
            let outcome = match request {
                Request::Chat(request) => Outcome::Chat(client.chat(&request).await),
                Request::Analysis(request) => {
                    Outcome::Analysis(client.analyze_stock(&request).await)
                }
                Request::Chart(request) => {
                    let result = client.render_chart(&request).await;
                    Outcome::Chart {
                        result,
                        series: request.data,
                    }
                }
            };
            Self::send(&tx, BackendEvent::Completed { typing_id, outcome });
        });
    }

    pub fn switch_model(&self, model: ModelId) {
        let client = self.client.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = client.switch_model(model).await;
            Self::send(&tx, BackendEvent::ModelSwitched { model, result });
        });
    }

    pub fn load_market(&self) {
        let client = self.client.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = client.market_overview().await;
            Self::send(&tx, BackendEvent::Market(result));
        });
    }

    pub fn check_status(&self) {
        let client = self.client.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = client.status().await;
            Self::send(&tx, BackendEvent::Status(result));
        });
    }
}
