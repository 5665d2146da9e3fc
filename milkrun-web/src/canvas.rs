//! Canvas painting for the board.
//!
//! The renderer consumes a read-only [`RenderSnapshot`] each draw and feeds
//! nothing back into the game state.

use milkrun_game::{BOARD_SIZE, Node, Point, RenderSnapshot};
use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

const GRID_SPACING: f64 = 100.0;

const COLOR_BACKGROUND: &str = "#10212f";
const COLOR_GRID: &str = "#1b3347";
const COLOR_DEPOT: &str = "#e4574c";
const COLOR_DEPOT_REMINDER: &str = "#ffd166";
const COLOR_STOP: &str = "#7b8fa3";
const COLOR_STOP_VISITED: &str = "#53c47e";
const COLOR_ROUTE: &str = "#53c47e";
const COLOR_ROUTE_COMPLETE: &str = "#ffd166";
const COLOR_DRAG: &str = "#53c47e88";
const COLOR_SOLUTION: &str = "#5ea0e0";
const COLOR_LABEL: &str = "#0b1620";

const DEPOT_HALF: f64 = 14.0;
const STOP_RADIUS: f64 = 12.0;

/// Paint one frame. `size_px` is the square canvas backing size; board
/// coordinates are scaled onto it.
pub fn draw_board(
    ctx: &CanvasRenderingContext2d,
    snapshot: &RenderSnapshot<'_>,
    drag_preview: Option<Point>,
    size_px: f64,
) {
    ctx.save();
    let scale = size_px / BOARD_SIZE;
    ctx.scale(scale, scale).ok();

    draw_background(ctx);
    if let Some(solution) = snapshot.solution {
        draw_polyline(
            ctx,
            solution.route.iter().take(solution.index + 1),
            COLOR_SOLUTION,
            4.0,
            true,
        );
    }
    let route_color = if snapshot.game_complete {
        COLOR_ROUTE_COMPLETE
    } else {
        COLOR_ROUTE
    };
    draw_polyline(ctx, snapshot.route.iter(), route_color, 5.0, false);
    if let (Some(tail), Some(pointer)) = (snapshot.route.last(), drag_preview) {
        draw_segment(ctx, tail.position(), pointer, COLOR_DRAG, 4.0);
    }
    draw_nodes(ctx, snapshot);

    ctx.restore();
}

fn draw_background(ctx: &CanvasRenderingContext2d) {
    ctx.set_fill_style_str(COLOR_BACKGROUND);
    ctx.fill_rect(0.0, 0.0, BOARD_SIZE, BOARD_SIZE);
    ctx.set_stroke_style_str(COLOR_GRID);
    ctx.set_line_width(1.0);
    let mut offset = GRID_SPACING;
    while offset < BOARD_SIZE {
        ctx.begin_path();
        ctx.move_to(offset, 0.0);
        ctx.line_to(offset, BOARD_SIZE);
        ctx.move_to(0.0, offset);
        ctx.line_to(BOARD_SIZE, offset);
        ctx.stroke();
        offset += GRID_SPACING;
    }
}

fn draw_polyline<'a>(
    ctx: &CanvasRenderingContext2d,
    nodes: impl Iterator<Item = &'a Node>,
    color: &str,
    width: f64,
    dashed: bool,
) {
    let mut nodes = nodes.map(Node::position);
    let Some(first) = nodes.next() else {
        return;
    };
    ctx.set_stroke_style_str(color);
    ctx.set_line_width(width);
    if dashed {
        let pattern = js_sys::Array::of2(&JsValue::from_f64(12.0), &JsValue::from_f64(8.0));
        ctx.set_line_dash(&pattern).ok();
    }
    ctx.begin_path();
    ctx.move_to(first.x, first.y);
    for point in nodes {
        ctx.line_to(point.x, point.y);
    }
    ctx.stroke();
    if dashed {
        ctx.set_line_dash(&js_sys::Array::new()).ok();
    }
}

fn draw_segment(
    ctx: &CanvasRenderingContext2d,
    from: Point,
    to: Point,
    color: &str,
    width: f64,
) {
    ctx.set_stroke_style_str(color);
    ctx.set_line_width(width);
    ctx.begin_path();
    ctx.move_to(from.x, from.y);
    ctx.line_to(to.x, to.y);
    ctx.stroke();
}

fn draw_nodes(ctx: &CanvasRenderingContext2d, snapshot: &RenderSnapshot<'_>) {
    for stop in &snapshot.puzzle.stops {
        let visited = snapshot.visited.contains(&stop.id);
        ctx.set_fill_style_str(if visited { COLOR_STOP_VISITED } else { COLOR_STOP });
        ctx.begin_path();
        ctx.arc(stop.x, stop.y, STOP_RADIUS, 0.0, std::f64::consts::TAU)
            .ok();
        ctx.fill();
        ctx.set_fill_style_str(COLOR_LABEL);
        ctx.set_text_align("center");
        ctx.set_text_baseline("middle");
        ctx.set_font("18px sans-serif");
        ctx.fill_text(&stop.id.to_string(), stop.x, stop.y).ok();
    }

    let depot = snapshot.puzzle.depot;
    ctx.set_fill_style_str(COLOR_DEPOT);
    ctx.fill_rect(
        depot.x - DEPOT_HALF,
        depot.y - DEPOT_HALF,
        DEPOT_HALF * 2.0,
        DEPOT_HALF * 2.0,
    );
    if snapshot.return_reminder {
        ctx.set_stroke_style_str(COLOR_DEPOT_REMINDER);
        ctx.set_line_width(4.0);
        ctx.begin_path();
        ctx.arc(
            depot.x,
            depot.y,
            DEPOT_HALF * 2.0,
            0.0,
            std::f64::consts::TAU,
        )
        .ok();
        ctx.stroke();
    }
}
