//! Request transport. Callers send typed requests over a bounded channel and
//! await the reply; the service side handles every request in its own task.

use futures::channel::oneshot;

use edm_core::dispatch;
use edm_types::request::{EdmRequest, EdmResponse, PolicyRequest};

use crate::prelude::*;

type Call = (EdmRequest, oneshot::Sender<EdmResponse>);

pub type RequestReceiver = flume::Receiver<Call>;

/// Cloneable caller side of the service
#[derive(Debug, Clone)]
pub struct ServiceHandle {
	tx: flume::Sender<Call>,
}

impl ServiceHandle {
	pub async fn call(&self, req: EdmRequest) -> EdmResult<EdmResponse> {
		let (res_tx, res_rx) = oneshot::channel();
		self.tx.send_async((req, res_tx)).await.map_err(|_| {
			error!("Request channel closed");
			Error::SystemAbnormally("service stopped".into())
		})?;
		res_rx.await.map_err(|_| {
			error!("Request dropped without reply");
			Error::SystemAbnormally("request dropped".into())
		})
	}

	pub async fn policy(&self, req: PolicyRequest) -> EdmResult<EdmResponse> {
		self.call(EdmRequest::Policy(req)).await
	}
}

pub fn channel(bound: usize) -> (ServiceHandle, RequestReceiver) {
	let (tx, rx) = flume::bounded(bound);
	(ServiceHandle { tx }, rx)
}

/// Serves requests until every `ServiceHandle` is dropped
pub async fn serve(app: App, rx: RequestReceiver) {
	while let Ok((req, reply)) = rx.recv_async().await {
		let app = app.clone();
		tokio::spawn(async move {
			let res = dispatch::handle_request(&app, req).await;
			if !res.is_ok() {
				debug!(status = ?res.status, "Request failed");
			}
			let _ignore = reply.send(res);
		});
	}
	info!("Request channel closed, service stopped");
}


// vim: ts=4
