//! GTK4 measurement primitive and display information for the responsive
//! adapters.

use std::cell::RefCell;
use std::rc::Rc;

use gtk4 as gtk;
use gtk::prelude::*;
use tracing::warn;

use crate::api::{ContainerMeasure, HostDisplay, SizeListener, SizeSubscription};

fn clamp_size(length: i32) -> u32 {
    u32::try_from(length).unwrap_or(0)
}

/// Reports the allocated size of a `DrawingArea` through its `resize` signal.
#[derive(Debug, Clone)]
pub struct GtkContainer {
    area: gtk::DrawingArea,
}

impl GtkContainer {
    #[must_use]
    pub fn new(area: &gtk::DrawingArea) -> Self {
        Self { area: area.clone() }
    }

    #[must_use]
    pub fn area(&self) -> &gtk::DrawingArea {
        &self.area
    }
}

impl ContainerMeasure for GtkContainer {
    fn subscribe(&self, listener: SizeListener) -> SizeSubscription {
        let listener = Rc::new(RefCell::new(listener));
        // An unrealized area reports 0x0, which the adapters treat as not ready.
        (*listener.borrow_mut())(clamp_size(self.area.width()), clamp_size(self.area.height()));

        let on_resize = Rc::clone(&listener);
        let handler = self.area.connect_resize(move |_, width, height| {
            match on_resize.try_borrow_mut() {
                Ok(mut listener) => (*listener)(clamp_size(width), clamp_size(height)),
                Err(_) => warn!(width, height, "size listener is busy, dropping resize"),
            }
        });

        let area = self.area.downgrade();
        SizeSubscription::new(move || {
            if let Some(area) = area.upgrade() {
                area.disconnect(handler);
            }
        })
    }
}

/// Pixel ratio of the monitor a widget is shown on.
#[derive(Debug, Clone)]
pub struct GtkHostDisplay {
    widget: gtk::Widget,
}

impl GtkHostDisplay {
    #[must_use]
    pub fn new(widget: &impl IsA<gtk::Widget>) -> Self {
        Self {
            widget: widget.as_ref().clone(),
        }
    }
}

impl HostDisplay for GtkHostDisplay {
    fn device_pixel_ratio(&self) -> Option<f64> {
        let scale = self.widget.scale_factor();
        (scale > 0).then(|| f64::from(scale))
    }
}
