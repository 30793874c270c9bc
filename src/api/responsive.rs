use std::cell::{Ref, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::{debug, warn};

use crate::core::{Dimensions, Serie};
use crate::error::ChartResult;
use crate::render::{CanvasHost, CanvasRef, Renderer};

use super::{Line, LineCanvas, LineCanvasConfig, LineSvgConfig};

/// Listener receiving `(width, height)` of the observed container.
pub type SizeListener = Box<dyn FnMut(u32, u32)>;

/// Container-measurement primitive: reports the container size on subscribe
/// and on every later change.
pub trait ContainerMeasure {
    fn subscribe(&self, listener: SizeListener) -> SizeSubscription;
}

/// Detach handle of a [`ContainerMeasure`] subscription; detaches on drop.
pub struct SizeSubscription {
    detach: Option<Box<dyn FnOnce()>>,
}

impl SizeSubscription {
    pub fn new(detach: impl FnOnce() + 'static) -> Self {
        Self {
            detach: Some(Box::new(detach)),
        }
    }

    pub fn unsubscribe(mut self) {
        self.detach_now();
    }

    fn detach_now(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl Drop for SizeSubscription {
    fn drop(&mut self) {
        self.detach_now();
    }
}

impl fmt::Debug for SizeSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SizeSubscription")
            .field("attached", &self.detach.is_some())
            .finish()
    }
}

type SharedListener = Rc<RefCell<SizeListener>>;

#[derive(Default)]
struct HeadlessState {
    width: u32,
    height: u32,
    next_id: u64,
    listeners: Vec<(u64, SharedListener)>,
}

/// In-process container whose size is set by the caller.
#[derive(Clone, Default)]
pub struct HeadlessContainer {
    state: Rc<RefCell<HeadlessState>>,
}

impl HeadlessContainer {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        let container = Self::default();
        {
            let mut state = container.state.borrow_mut();
            state.width = width;
            state.height = height;
        }
        container
    }

    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        let state = self.state.borrow();
        (state.width, state.height)
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.state.borrow().listeners.len()
    }

    /// Records a new size and notifies every listener, even when unchanged.
    pub fn resize(&self, width: u32, height: u32) {
        let listeners: Vec<SharedListener> = {
            let mut state = self.state.borrow_mut();
            state.width = width;
            state.height = height;
            state
                .listeners
                .iter()
                .map(|(_, listener)| Rc::clone(listener))
                .collect()
        };
        for listener in listeners {
            notify(&listener, width, height);
        }
    }
}

fn notify(listener: &SharedListener, width: u32, height: u32) {
    match listener.try_borrow_mut() {
        Ok(mut listener) => (*listener)(width, height),
        Err(_) => warn!(width, height, "size listener is busy, dropping notification"),
    }
}

impl ContainerMeasure for HeadlessContainer {
    fn subscribe(&self, listener: SizeListener) -> SizeSubscription {
        let listener = Rc::new(RefCell::new(listener));
        let (id, width, height) = {
            let mut state = self.state.borrow_mut();
            let id = state.next_id;
            state.next_id += 1;
            state.listeners.push((id, Rc::clone(&listener)));
            (id, state.width, state.height)
        };
        notify(&listener, width, height);

        let state = Rc::downgrade(&self.state);
        SizeSubscription::new(move || {
            if let Some(state) = state.upgrade() {
                state.borrow_mut().listeners.retain(|(entry, _)| *entry != id);
            }
        })
    }
}

impl fmt::Debug for HeadlessContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeadlessContainer")
            .field("size", &self.size())
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// Everything a vector renderer needs for one pass.
#[derive(Debug, Clone, Copy)]
pub struct LineSvgProps<'a> {
    pub data: &'a [Serie],
    pub config: &'a LineSvgConfig,
    pub dimensions: Dimensions,
}

pub trait LineSvgRenderer {
    fn render_line(&mut self, props: LineSvgProps<'_>) -> ChartResult<()>;
}

/// Everything a canvas renderer needs for one pass.
#[derive(Debug, Clone, Copy)]
pub struct LineCanvasProps<'a, H> {
    pub data: &'a [Serie],
    pub config: &'a LineCanvasConfig,
    pub dimensions: Dimensions,
    pub canvas_ref: Option<&'a CanvasRef<H>>,
}

pub trait LineCanvasRenderer {
    type Handle;

    fn render_line(&mut self, props: LineCanvasProps<'_, Self::Handle>) -> ChartResult<()>;
}

impl<R: Renderer> LineSvgRenderer for Line<R> {
    fn render_line(&mut self, props: LineSvgProps<'_>) -> ChartResult<()> {
        self.set_dimensions(props.dimensions)?;
        if self.data() != props.data {
            self.set_data(props.data.to_vec());
        }
        if self.config() != props.config {
            self.set_config(props.config.clone());
        }
        self.render()
    }
}

impl<H: CanvasHost> LineCanvasRenderer for LineCanvas<H> {
    type Handle = H::Handle;

    fn render_line(&mut self, props: LineCanvasProps<'_, H::Handle>) -> ChartResult<()> {
        self.set_dimensions(props.dimensions)?;
        if self.data() != props.data {
            self.set_data(props.data.to_vec());
        }
        if self.config() != props.config {
            self.set_config(props.config.clone());
        }
        self.set_canvas_ref(props.canvas_ref.cloned());
        self.render()
    }
}

/// One renderer target of a responsive adapter.
trait ResponsivePass {
    fn render_at(&mut self, dimensions: Dimensions) -> ChartResult<()>;
}

struct SvgPass<R> {
    renderer: R,
    data: Vec<Serie>,
    config: LineSvgConfig,
}

impl<R: LineSvgRenderer> ResponsivePass for SvgPass<R> {
    fn render_at(&mut self, dimensions: Dimensions) -> ChartResult<()> {
        self.renderer.render_line(LineSvgProps {
            data: &self.data,
            config: &self.config,
            dimensions,
        })
    }
}

struct CanvasPass<R: LineCanvasRenderer> {
    renderer: R,
    data: Vec<Serie>,
    config: LineCanvasConfig,
    canvas_ref: Option<CanvasRef<R::Handle>>,
}

impl<R: LineCanvasRenderer> ResponsivePass for CanvasPass<R> {
    fn render_at(&mut self, dimensions: Dimensions) -> ChartResult<()> {
        self.renderer.render_line(LineCanvasProps {
            data: &self.data,
            config: &self.config,
            dimensions,
            canvas_ref: self.canvas_ref.as_ref(),
        })
    }
}

struct Mounted<P> {
    pass: P,
    dimensions: Option<Dimensions>,
    render_count: usize,
}

impl<P: ResponsivePass> Mounted<P> {
    fn on_size(&mut self, width: u32, height: u32) {
        let dimensions = Dimensions::new(width, height);
        if !dimensions.is_valid() {
            debug!(width, height, "container has no size yet, render deferred");
            return;
        }
        self.dimensions = Some(dimensions);
        self.render();
    }

    fn render(&mut self) {
        let Some(dimensions) = self.dimensions else {
            return;
        };
        self.render_count += 1;
        if let Err(err) = self.pass.render_at(dimensions) {
            warn!(error = %err, width = dimensions.width, height = dimensions.height, "responsive render failed");
        }
    }
}

fn subscribe<P: ResponsivePass + 'static>(
    container: &dyn ContainerMeasure,
    state: &Rc<RefCell<Mounted<P>>>,
) -> SizeSubscription {
    let weak: Weak<RefCell<Mounted<P>>> = Rc::downgrade(state);
    container.subscribe(Box::new(move |width, height| {
        let Some(state) = weak.upgrade() else {
            return;
        };
        match state.try_borrow_mut() {
            Ok(mut state) => state.on_size(width, height),
            Err(_) => warn!(width, height, "chart is already rendering, size change skipped"),
        }
    }))
}

/// Vector line chart sized by its container.
pub struct ResponsiveLine<R: LineSvgRenderer> {
    state: Rc<RefCell<Mounted<SvgPass<R>>>>,
    subscription: Option<SizeSubscription>,
}

impl<R: LineSvgRenderer + 'static> ResponsiveLine<R> {
    /// Subscribes to `container`; the first render happens once the
    /// container reports a positive size.
    pub fn mount(
        container: &dyn ContainerMeasure,
        renderer: R,
        data: Vec<Serie>,
        config: LineSvgConfig,
    ) -> Self {
        let state = Rc::new(RefCell::new(Mounted {
            pass: SvgPass {
                renderer,
                data,
                config,
            },
            dimensions: None,
            render_count: 0,
        }));
        let subscription = subscribe(container, &state);
        Self {
            state,
            subscription: Some(subscription),
        }
    }
}

impl<R: LineSvgRenderer> ResponsiveLine<R> {
    /// Replaces data and configuration, re-rendering at the last known size.
    pub fn set_props(&self, data: Vec<Serie>, config: LineSvgConfig) {
        let mut state = self.state.borrow_mut();
        state.pass.data = data;
        state.pass.config = config;
        state.render();
    }

    #[must_use]
    pub fn dimensions(&self) -> Option<Dimensions> {
        self.state.borrow().dimensions
    }

    /// Render passes run so far.
    #[must_use]
    pub fn render_count(&self) -> usize {
        self.state.borrow().render_count
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.subscription.is_some()
    }

    pub fn renderer(&self) -> Ref<'_, R> {
        Ref::map(self.state.borrow(), |state| &state.pass.renderer)
    }

    pub fn unmount(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
    }
}

/// Canvas line chart sized by its container.
pub struct ResponsiveLineCanvas<R: LineCanvasRenderer> {
    state: Rc<RefCell<Mounted<CanvasPass<R>>>>,
    subscription: Option<SizeSubscription>,
}

impl<R: LineCanvasRenderer + 'static> ResponsiveLineCanvas<R> {
    /// Like [`ResponsiveLine::mount`]; `canvas_ref` is forwarded to the
    /// renderer on every pass.
    pub fn mount(
        container: &dyn ContainerMeasure,
        renderer: R,
        data: Vec<Serie>,
        config: LineCanvasConfig,
        canvas_ref: Option<CanvasRef<R::Handle>>,
    ) -> Self {
        let state = Rc::new(RefCell::new(Mounted {
            pass: CanvasPass {
                renderer,
                data,
                config,
                canvas_ref,
            },
            dimensions: None,
            render_count: 0,
        }));
        let subscription = subscribe(container, &state);
        Self {
            state,
            subscription: Some(subscription),
        }
    }
}

impl<R: LineCanvasRenderer> ResponsiveLineCanvas<R> {
    pub fn set_props(&self, data: Vec<Serie>, config: LineCanvasConfig) {
        let mut state = self.state.borrow_mut();
        state.pass.data = data;
        state.pass.config = config;
        state.render();
    }

    #[must_use]
    pub fn dimensions(&self) -> Option<Dimensions> {
        self.state.borrow().dimensions
    }

    #[must_use]
    pub fn render_count(&self) -> usize {
        self.state.borrow().render_count
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.subscription.is_some()
    }

    pub fn renderer(&self) -> Ref<'_, R> {
        Ref::map(self.state.borrow(), |state| &state.pass.renderer)
    }

    pub fn unmount(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::{ContainerMeasure, HeadlessContainer, ResponsiveLine};
    use crate::api::{Line, LineSvgConfig};
    use crate::core::{Datum, Serie};
    use crate::render::NullRenderer;

    #[test]
    fn dropping_a_subscription_detaches_the_listener() {
        let container = HeadlessContainer::new(10, 10);
        let seen = Rc::new(Cell::new(0));
        let counter = Rc::clone(&seen);
        let subscription = container.subscribe(Box::new(move |_, _| counter.set(counter.get() + 1)));
        assert_eq!(seen.get(), 1);
        container.resize(20, 20);
        assert_eq!(seen.get(), 2);
        drop(subscription);
        assert_eq!(container.listener_count(), 0);
        container.resize(30, 30);
        assert_eq!(seen.get(), 2);
    }

    #[test]
    fn zero_size_defers_the_first_render() {
        let container = HeadlessContainer::new(0, 0);
        let data = vec![Serie::new("a", vec![Datum::new(0, 1), Datum::new(1, 3)])];
        let mut chart = ResponsiveLine::mount(
            &container,
            Line::new(NullRenderer::default(), LineSvgConfig::default()),
            data,
            LineSvgConfig::default(),
        );
        assert_eq!(chart.render_count(), 0);
        assert_eq!(chart.renderer().renderer().render_count, 0);

        container.resize(400, 300);
        assert_eq!(chart.render_count(), 1);
        assert_eq!(chart.renderer().renderer().render_count, 1);

        chart.unmount();
        container.resize(500, 300);
        assert_eq!(chart.render_count(), 1);
        assert!(!chart.is_mounted());
    }
}
