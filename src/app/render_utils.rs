use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke, Vec2};

pub(super) fn draw_background(painter: &Painter, rect: Rect, pan: Vec2, zoom: f32) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(250, 250, 251));

    let step = (64.0 * zoom.clamp(0.6, 1.8)).max(24.0);
    let origin = rect.center() + pan;
    let stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(220, 223, 228, 90));

    let mut x = origin.x.rem_euclid(step);
    while x < rect.right() {
        if x >= rect.left() {
            painter.line_segment([Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())], stroke);
        }
        x += step;
    }

    let mut y = origin.y.rem_euclid(step);
    while y < rect.bottom() {
        if y >= rect.top() {
            painter.line_segment([Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)], stroke);
        }
        y += step;
    }
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}

pub(super) fn edge_visible(rect: Rect, start: Pos2, end: Pos2, padding: f32) -> bool {
    let min_x = start.x.min(end.x) - padding;
    let max_x = start.x.max(end.x) + padding;
    let min_y = start.y.min(end.y) - padding;
    let max_y = start.y.max(end.y) + padding;

    !(max_x < rect.left() || min_x > rect.right() || max_y < rect.top() || min_y > rect.bottom())
}

pub(super) fn world_to_screen(rect: Rect, pan: Vec2, zoom: f32, world: Vec2) -> Pos2 {
    rect.center() + pan + world * zoom
}

pub(super) fn screen_to_world(rect: Rect, pan: Vec2, zoom: f32, screen: Pos2) -> Vec2 {
    (screen - rect.center() - pan) / zoom
}

#[cfg(test)]
mod tests {
    use eframe::egui::{pos2, vec2};

    use super::*;

    fn canvas() -> Rect {
        Rect::from_min_max(pos2(0.0, 0.0), pos2(800.0, 600.0))
    }

    #[test]
    fn screen_mapping_round_trips() {
        let world = vec2(-42.0, 17.5);
        let screen = world_to_screen(canvas(), vec2(30.0, -12.0), 1.7, world);
        let back = screen_to_world(canvas(), vec2(30.0, -12.0), 1.7, screen);
        assert!((back - world).length() < 1e-4);
    }

    #[test]
    fn culling_keeps_touching_shapes() {
        assert!(circle_visible(canvas(), pos2(-4.0, 300.0), 5.0));
        assert!(!circle_visible(canvas(), pos2(-10.0, 300.0), 5.0));
        assert!(edge_visible(canvas(), pos2(-50.0, 10.0), pos2(50.0, 10.0), 1.0));
        assert!(!edge_visible(canvas(), pos2(-50.0, -10.0), pos2(-5.0, -40.0), 1.0));
    }
}
