//! Pointer and touch handling shared by both chart entry points.

use tracing::trace;

use crate::core::{Axis, Callback};
use crate::interaction::{
    InteractionMode, InteractionState, PointerEvent, nearest_point, span_at,
};

use super::tooltip::{SliceTooltipProps, default_point_tooltip, default_slice_tooltip};
use super::{ChartEventFn, EventTarget, LineCommonProps, LineScene, Point, Slice, Tooltip};

/// What the pointer designates on a given pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Hit {
    Point(usize),
    Slice(usize),
}

/// Inputs of one pointer dispatch.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PointerContext<'a> {
    pub scene: &'a LineScene,
    pub props: &'a LineCommonProps,
    /// Whether hovering resolves points through the Voronoi mesh.
    pub mesh: bool,
    /// Whether touches move the crosshair.
    pub touch_crosshair: bool,
}

impl PointerContext<'_> {
    fn hit(&self, event: PointerEvent) -> Option<Hit> {
        let margin = self.props.margin;
        let inner = self.scene.inner;
        let (x, y) = (event.x - margin.left, event.y - margin.top);
        if !(0.0..=inner.width).contains(&x) || !(0.0..=inner.height).contains(&y) {
            return None;
        }

        if let Some(axis) = self.props.enable_slices.axis() {
            let (spans, coordinate): (Vec<(f64, f64)>, f64) = match axis {
                Axis::X => (
                    self.scene.slices.iter().map(|slice| (slice.x0, slice.width)).collect(),
                    x,
                ),
                Axis::Y => (
                    self.scene.slices.iter().map(|slice| (slice.y0, slice.height)).collect(),
                    y,
                ),
            };
            return span_at(&spans, coordinate).map(Hit::Slice);
        }

        if !self.mesh {
            return None;
        }
        let positions: Vec<(f64, f64)> = self
            .scene
            .points
            .iter()
            .map(|point| (point.x, point.y))
            .collect();
        nearest_point(&positions, x, y).map(Hit::Point)
    }

    fn target(&self, hit: Hit) -> Option<EventTarget<'_>> {
        match hit {
            Hit::Point(index) => self.scene.points.get(index).map(EventTarget::Point),
            Hit::Slice(index) => self.scene.slices.get(index).map(EventTarget::Slice),
        }
    }
}

fn fire(handler: Option<&Callback<ChartEventFn>>, target: Option<EventTarget<'_>>, event: PointerEvent) {
    if let (Some(handler), Some(target)) = (handler, target) {
        handler(target, event);
    }
}

/// Tracks the active point or slice and dispatches event handlers.
#[derive(Debug, Clone, Default)]
pub(crate) struct PointerController {
    state: InteractionState,
}

impl PointerController {
    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn reset(&mut self) {
        self.state.clear();
    }

    fn current(&self, ctx: &PointerContext<'_>) -> Option<Hit> {
        if let Some(index) = self.state.current_slice() {
            return Some(Hit::Slice(index));
        }
        let id = self.state.current_point()?;
        ctx.scene
            .points
            .iter()
            .position(|point| point.id == id)
            .map(Hit::Point)
    }

    fn set_current(
        &mut self,
        ctx: &PointerContext<'_>,
        hit: Option<Hit>,
        mode: InteractionMode,
    ) -> bool {
        let changed = match hit {
            Some(Hit::Slice(index)) => self.state.set_current_slice(Some(index)),
            Some(Hit::Point(index)) => {
                let id = ctx.scene.points.get(index).map(|point| point.id.clone());
                self.state.set_current_point(id, mode)
            }
            None => {
                let active = self.current(ctx).is_some();
                self.state.clear();
                active
            }
        };
        if changed {
            trace!(
                point = ?self.state.current_point(),
                slice = ?self.state.current_slice(),
                "active item changed"
            );
        }
        changed
    }

    /// Returns `true` when the active point or slice changed.
    pub fn pointer_move(&mut self, ctx: &PointerContext<'_>, event: PointerEvent) -> bool {
        if !ctx.props.is_interactive {
            return false;
        }
        let previous = self.current(ctx);
        let hit = ctx.hit(event);
        if previous != hit {
            fire(
                ctx.props.on_mouse_leave.as_ref(),
                previous.and_then(|hit| ctx.target(hit)),
                event,
            );
            fire(
                ctx.props.on_mouse_enter.as_ref(),
                hit.and_then(|hit| ctx.target(hit)),
                event,
            );
        }
        fire(
            ctx.props.on_mouse_move.as_ref(),
            hit.and_then(|hit| ctx.target(hit)),
            event,
        );
        self.set_current(ctx, hit, InteractionMode::Hovering)
    }

    pub fn pointer_leave(&mut self, ctx: &PointerContext<'_>, event: PointerEvent) -> bool {
        if !ctx.props.is_interactive {
            return false;
        }
        fire(
            ctx.props.on_mouse_leave.as_ref(),
            self.current(ctx).and_then(|hit| ctx.target(hit)),
            event,
        );
        let changed = self.current(ctx).is_some();
        self.state.clear();
        changed
    }

    pub fn click(&mut self, ctx: &PointerContext<'_>, event: PointerEvent) -> bool {
        if !ctx.props.is_interactive {
            return false;
        }
        let hit = ctx.hit(event);
        fire(ctx.props.on_click.as_ref(), hit.and_then(|hit| ctx.target(hit)), event);
        self.set_current(ctx, hit, InteractionMode::Hovering)
    }

    pub fn touch_start(&mut self, ctx: &PointerContext<'_>, event: PointerEvent) -> bool {
        self.touch(ctx, event, ctx.props.on_touch_start.as_ref())
    }

    pub fn touch_move(&mut self, ctx: &PointerContext<'_>, event: PointerEvent) -> bool {
        self.touch(ctx, event, ctx.props.on_touch_move.as_ref())
    }

    fn touch(
        &mut self,
        ctx: &PointerContext<'_>,
        event: PointerEvent,
        handler: Option<&Callback<ChartEventFn>>,
    ) -> bool {
        if !ctx.props.is_interactive {
            return false;
        }
        let hit = ctx.hit(event);
        fire(handler, hit.and_then(|hit| ctx.target(hit)), event);
        if !ctx.touch_crosshair {
            return false;
        }
        self.set_current(ctx, hit, InteractionMode::Touching)
    }

    pub fn touch_end(&mut self, ctx: &PointerContext<'_>, event: PointerEvent) -> bool {
        if !ctx.props.is_interactive {
            return false;
        }
        fire(
            ctx.props.on_touch_end.as_ref(),
            self.current(ctx).and_then(|hit| ctx.target(hit)),
            event,
        );
        let changed = self.current(ctx).is_some();
        self.state.clear();
        changed
    }

    pub fn current_point<'a>(&self, scene: &'a LineScene) -> Option<&'a Point> {
        self.state.current_point().and_then(|id| scene.point(id))
    }

    pub fn current_slice<'a>(&self, scene: &'a LineScene) -> Option<&'a Slice> {
        self.state
            .current_slice()
            .and_then(|index| scene.slices.get(index))
    }

    /// Tooltip of the active point or slice, in outer chart coordinates.
    pub fn tooltip(&self, ctx: &PointerContext<'_>) -> Option<Tooltip> {
        let props = ctx.props;
        if !props.is_interactive {
            return None;
        }
        let margin = props.margin;
        let format = props.tooltip_format.as_ref();

        if let Some(slice) = self.current_slice(ctx.scene) {
            let axis = props.enable_slices.axis()?;
            let content = match &props.slice_tooltip {
                Some(render) => render(&SliceTooltipProps { slice, axis }),
                None => default_slice_tooltip(slice, format),
            };
            let (x, y) = match axis {
                Axis::X => (slice.x, slice.height / 2.0),
                Axis::Y => (slice.width / 2.0, slice.y),
            };
            return Some(Tooltip {
                x: x + margin.left,
                y: y + margin.top,
                content,
            });
        }

        let point = self.current_point(ctx.scene)?;
        let content = match &props.tooltip {
            Some(render) => render(point),
            None => default_point_tooltip(point, format),
        };
        Some(Tooltip {
            x: point.x + margin.left,
            y: point.y + margin.top,
            content,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::{PointerContext, PointerController};
    use crate::api::{
        EventTarget, LineCommonProps, LineScene, PartialLineCommonProps, TooltipContent,
        event_handler,
    };
    use crate::core::{Datum, Dimensions, Margin, Serie};
    use crate::interaction::{InteractionMode, PointerEvent, SliceMode};

    fn scene(props: &LineCommonProps) -> LineScene {
        let data = vec![Serie::new(
            "a",
            vec![Datum::new("x1", 0), Datum::new("x2", 10), Datum::new("x3", 5)],
        )];
        LineScene::compute(&data, props, Dimensions::new(220, 120)).expect("scene")
    }

    fn props(log: Rc<RefCell<Vec<String>>>) -> LineCommonProps {
        let enter_log = Rc::clone(&log);
        let leave_log = Rc::clone(&log);
        PartialLineCommonProps {
            margin: Some(Margin::new(10.0, 10.0, 10.0, 10.0)),
            on_mouse_enter: Some(Some(event_handler(move |target, _| {
                if let EventTarget::Point(point) = target {
                    enter_log.borrow_mut().push(format!("enter {}", point.id));
                }
            }))),
            on_mouse_leave: Some(Some(event_handler(move |target, _| {
                if let EventTarget::Point(point) = target {
                    leave_log.borrow_mut().push(format!("leave {}", point.id));
                }
            }))),
            ..PartialLineCommonProps::default()
        }
        .resolve()
    }

    #[test]
    fn mesh_hover_enters_and_leaves_points() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let props = props(Rc::clone(&log));
        let scene = scene(&props);
        let ctx = PointerContext {
            scene: &scene,
            props: &props,
            mesh: true,
            touch_crosshair: false,
        };
        let mut controller = PointerController::default();

        assert!(controller.pointer_move(&ctx, PointerEvent::new(12.0, 100.0)));
        assert!(!controller.pointer_move(&ctx, PointerEvent::new(14.0, 100.0)));
        assert!(controller.pointer_move(&ctx, PointerEvent::new(205.0, 60.0)));
        assert_eq!(controller.state().mode(), InteractionMode::Hovering);
        assert!(controller.pointer_leave(&ctx, PointerEvent::new(0.0, 0.0)));
        assert_eq!(
            *log.borrow(),
            vec!["enter a.0", "leave a.0", "enter a.2", "leave a.2"]
        );
    }

    #[test]
    fn without_mesh_or_slices_hover_does_nothing() {
        let props = props(Rc::new(RefCell::new(Vec::new())));
        let scene = scene(&props);
        let ctx = PointerContext {
            scene: &scene,
            props: &props,
            mesh: false,
            touch_crosshair: false,
        };
        let mut controller = PointerController::default();
        assert!(!controller.pointer_move(&ctx, PointerEvent::new(12.0, 100.0)));
        assert!(controller.tooltip(&ctx).is_none());
    }

    #[test]
    fn slice_hover_shows_a_table_tooltip() {
        let props = PartialLineCommonProps {
            enable_slices: Some(SliceMode::X),
            ..PartialLineCommonProps::default()
        }
        .resolve();
        let scene = scene(&props);
        let ctx = PointerContext {
            scene: &scene,
            props: &props,
            mesh: false,
            touch_crosshair: false,
        };
        let mut controller = PointerController::default();
        assert!(controller.pointer_move(&ctx, PointerEvent::new(190.0, 10.0)));
        assert_eq!(controller.state().current_slice(), Some(2));
        let tooltip = controller.tooltip(&ctx).expect("tooltip");
        assert!(matches!(tooltip.content, TooltipContent::Table { .. }));
    }

    #[test]
    fn touches_move_the_crosshair_only_when_enabled() {
        let props = props(Rc::new(RefCell::new(Vec::new())));
        let scene = scene(&props);
        let mut ctx = PointerContext {
            scene: &scene,
            props: &props,
            mesh: true,
            touch_crosshair: false,
        };
        let mut controller = PointerController::default();
        assert!(!controller.touch_start(&ctx, PointerEvent::new(12.0, 100.0)));
        ctx.touch_crosshair = true;
        assert!(controller.touch_start(&ctx, PointerEvent::new(12.0, 100.0)));
        assert_eq!(controller.state().mode(), InteractionMode::Touching);
        assert!(controller.touch_end(&ctx, PointerEvent::new(12.0, 100.0)));
        assert!(controller.state().current_point().is_none());
    }
}
