//! Worker pool. Runs blocking external calls with 3 priority levels on dedicated threads.

use flume::{Receiver, Sender};
use futures::channel::oneshot;
use std::{sync::Arc, thread};

use crate::prelude::*;

#[derive(Clone, Copy, Debug)]
pub enum Priority {
	High,
	Medium,
	Low,
}

type Job = Box<dyn FnOnce() + Send>;

#[derive(Debug)]
pub struct WorkerPool {
	high: Sender<Job>,
	med: Sender<Job>,
	low: Sender<Job>,
}

impl WorkerPool {
	/// `n1` threads serve High only, `n2` High + Medium, `n3` all three queues
	pub fn new(n1: usize, n2: usize, n3: usize) -> Self {
		let (high, rx_high) = flume::unbounded();
		let (med, rx_med) = flume::unbounded();
		let (low, rx_low) = flume::unbounded();

		let rx_high = Arc::new(rx_high);
		let rx_med = Arc::new(rx_med);
		let rx_low = Arc::new(rx_low);

		for _ in 0..n1 {
			let rx_high = Arc::clone(&rx_high);
			thread::spawn(move || worker_loop(&[rx_high]));
		}

		for _ in 0..n2 {
			let rx_high = Arc::clone(&rx_high);
			let rx_med = Arc::clone(&rx_med);
			thread::spawn(move || worker_loop(&[rx_high, rx_med]));
		}

		for _ in 0..n3 {
			let rx_high = Arc::clone(&rx_high);
			let rx_med = Arc::clone(&rx_med);
			let rx_low = Arc::clone(&rx_low);
			thread::spawn(move || worker_loop(&[rx_high, rx_med, rx_low]));
		}

		Self { high, med, low }
	}

	/// Submit a closure → returns a Future for its result
	pub fn spawn<F, T>(
		&self,
		priority: Priority,
		f: F,
	) -> impl std::future::Future<Output = EdmResult<T>> + use<F, T>
	where
		F: FnOnce() -> T + Send + 'static,
		T: Send + 'static,
	{
		let (res_tx, res_rx) = oneshot::channel();

		let job: Job = Box::new(move || {
			let result = f();
			let _ignore = res_tx.send(result);
		});

		let queue = match priority {
			Priority::High => &self.high,
			Priority::Medium => &self.med,
			Priority::Low => &self.low,
		};
		if queue.send(job).is_err() {
			error!("Failed to send job to {:?} priority worker queue", priority);
		}

		async move {
			res_rx.await.map_err(|_| {
				error!("Worker dropped result channel (task may have panicked)");
				Error::SystemAbnormally("worker task failed".into())
			})
		}
	}

	/// Like `spawn`, but flattens `EdmResult<EdmResult<T>>` into `EdmResult<T>`.
	pub fn try_spawn<F, T>(
		&self,
		priority: Priority,
		f: F,
	) -> impl std::future::Future<Output = EdmResult<T>> + use<F, T>
	where
		F: FnOnce() -> EdmResult<T> + Send + 'static,
		T: Send + 'static,
	{
		let fut = self.spawn(priority, f);
		async move { fut.await? }
	}
}

type JobQueue = Arc<Receiver<Job>>;

fn run_job(job: Job) {
	if let Err(e) = std::panic::catch_unwind(std::panic::AssertUnwindSafe(job)) {
		error!("Worker thread caught panic: {:?}", e);
	}
}

fn worker_loop(queues: &[JobQueue]) {
	loop {
		// Higher-priority queues first (non-blocking)
		if let Some(job) = queues.iter().find_map(|rx| rx.try_recv().ok()) {
			run_job(job);
			continue;
		}

		let mut selector = flume::Selector::new();
		for rx in queues {
			selector = selector.recv(rx, |res| res);
		}

		match selector.wait() {
			Ok(job) => run_job(job),
			// all senders gone, the pool was dropped
			Err(flume::RecvError::Disconnected) => break,
		}
	}
}


// vim: ts=4
