use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use log::error;
use wasm_bindgen::prelude::*;

use crate::components::dependency_graph::{GraphRenderer, SceneTarget};

pub type FrameCallback = Box<dyn FnOnce()>;

/// Runs callbacks at the next paint frame.
pub trait FrameScheduler {
	fn request_frame(&self, callback: FrameCallback);
}

/// `window.requestAnimationFrame`.
#[derive(Clone, Copy, Debug, Default)]
pub struct AnimationFrames;

impl FrameScheduler for AnimationFrames {
	fn request_frame(&self, callback: FrameCallback) {
		let Some(window) = web_sys::window() else {
			error!("no window to schedule a frame on");
			return;
		};
		let cb = Closure::once_into_js(move || callback());
		if let Err(err) = window.request_animation_frame(cb.unchecked_ref()) {
			error!("requestAnimationFrame failed: {:?}", err);
		}
	}
}

/// Queues callbacks until the owner runs them, one frame at a time.
#[derive(Clone, Default)]
pub struct ManualFrames {
	queue: Rc<RefCell<VecDeque<FrameCallback>>>,
}

impl ManualFrames {
	pub fn pending(&self) -> usize {
		self.queue.borrow().len()
	}

	/// Runs the callbacks queued so far. Callbacks they schedule wait for the
	/// next call. Returns how many ran.
	pub fn run_frame(&self) -> usize {
		let batch: Vec<_> = self.queue.borrow_mut().drain(..).collect();
		let count = batch.len();
		for callback in batch {
			callback();
		}
		count
	}
}

impl FrameScheduler for ManualFrames {
	fn request_frame(&self, callback: FrameCallback) {
		self.queue.borrow_mut().push_back(callback);
	}
}

/// Calls [`GraphRenderer::frame`] on every frame for as long as the page lives.
pub fn drive<S, T>(frames: S, renderer: Rc<RefCell<GraphRenderer<T>>>)
where
	S: FrameScheduler + Clone + 'static,
	T: SceneTarget + 'static,
{
	let next = frames.clone();
	frames.request_frame(Box::new(move || {
		renderer.borrow_mut().frame();
		drive(next, renderer);
	}));
}
