/// IntersectionObserver wiring for scroll-triggered section reveals
use js_sys::Array;
use log::debug;
use orbscape_core::RevealConfig;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit};

/// Live observer; disconnects when dropped
pub struct RevealObserver {
    observer: IntersectionObserver,
    _callback: Closure<dyn FnMut(Array, IntersectionObserver)>,
}

impl RevealObserver {
    pub fn install(document: &Document, config: &RevealConfig) -> Result<Self, JsValue> {
        let active_class = config.active_class.clone();
        let callback = Closure::<dyn FnMut(Array, IntersectionObserver)>::new(
            move |entries: Array, _observer: IntersectionObserver| {
                for entry in entries.iter() {
                    let entry: IntersectionObserverEntry = entry.unchecked_into();
                    let toggled = entry
                        .target()
                        .class_list()
                        .toggle_with_force(&active_class, entry.is_intersecting());
                    if let Err(e) = toggled {
                        debug!("Failed to toggle reveal class: {:?}", e);
                    }
                }
            },
        );

        let options = IntersectionObserverInit::new();
        options.set_threshold(&JsValue::from_f64(config.observer_threshold()));
        let observer =
            IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &options)?;

        let elements = document.query_selector_all(&config.selector_list())?;
        let mut observed = 0;
        for index in 0..elements.length() {
            let Some(element) = elements.item(index).and_then(|n| n.dyn_into::<Element>().ok()) else {
                continue;
            };
            element.class_list().add_1(&config.base_class)?;
            observer.observe(&element);
            observed += 1;
        }
        debug!("Observing {} reveal elements", observed);

        Ok(Self {
            observer,
            _callback: callback,
        })
    }
}

impl Drop for RevealObserver {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}
