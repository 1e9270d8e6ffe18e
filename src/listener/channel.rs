use std::rc::Rc;

use log::{error, warn};
use wasm_bindgen::prelude::*;
use web_sys::{CustomEvent, CustomEventInit, Event};

use super::{FrameScheduler, RenderRequest, RenderRequestListener};
use crate::components::dependency_graph::SceneTarget;
use crate::components::trace_chart::ChartBackend;
use crate::error::RenderError;

/// Name of the `CustomEvent` on `window` that carries render requests.
pub const RENDER_REQUEST_EVENT: &str = "render-request";

/// Keeps the event handler registered while it is alive.
pub struct Subscription {
	closure: Closure<dyn FnMut(Event)>,
}

impl Subscription {
	/// Leaves the handler registered for the rest of the page's life.
	pub fn keep_alive(self) {
		self.closure.forget();
	}
}

/// Event detail as a JSON string, whether it was sent as a string or an object.
fn detail_json(event: &Event) -> Option<String> {
	let detail = event.dyn_ref::<CustomEvent>()?.detail();
	detail
		.as_string()
		.or_else(|| js_sys::JSON::stringify(&detail).ok().and_then(|s| s.as_string()))
}

/// Routes every [`RENDER_REQUEST_EVENT`] on `window` to `listener`.
pub fn subscribe<C, T, S>(
	listener: Rc<RenderRequestListener<C, T, S>>,
) -> Result<Subscription, RenderError>
where
	C: ChartBackend + 'static,
	T: SceneTarget + 'static,
	S: FrameScheduler + 'static,
{
	let window = web_sys::window().ok_or(RenderError::NoWindow)?;
	let closure = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
		let Some(payload) = detail_json(&event) else {
			warn!("`{}` event without a detail", RENDER_REQUEST_EVENT);
			return;
		};
		if let Err(err) = listener.handle_json(&payload) {
			error!("dropping render request: {}", err);
		}
	});
	window
		.add_event_listener_with_callback(RENDER_REQUEST_EVENT, closure.as_ref().unchecked_ref())
		.map_err(RenderError::from_js)?;
	Ok(Subscription { closure })
}

/// Emits a render request on `window`, as the UI layer does.
pub fn dispatch(request: &RenderRequest) -> Result<(), RenderError> {
	let window = web_sys::window().ok_or(RenderError::NoWindow)?;
	let init = CustomEventInit::new();
	init.set_detail(&JsValue::from_str(&serde_json::to_string(request)?));
	let event = CustomEvent::new_with_event_init_dict(RENDER_REQUEST_EVENT, &init)
		.map_err(RenderError::from_js)?;
	window.dispatch_event(&event).map_err(RenderError::from_js)?;
	Ok(())
}
