//! Reactive dot field
//!
//! A grid of fixed-origin dots. Every frame each dot's opacity, scale,
//! displacement and color are derived from the cursor distance and the
//! danger level of the nearest hazard. Nothing about the transform is
//! carried over between frames; dots relax to their origin as soon as the
//! cursor leaves.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::Viewport;
use crate::color::{Rgb, Rgba};
use crate::falloff;
use crate::theme::{DotBehavior, DotGlyphs, Theme};

/// Alpha of a dot at rest
pub const DOT_ALPHA: f32 = 0.5;
/// Alpha of a dot tinted by danger
pub const DANGER_DOT_ALPHA: f32 = 0.6;

/// A grid dot. Its origin never changes after the grid is built.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dot {
    pub origin: Vec2,
    /// Drawn instead of a circle when set
    pub glyph: Option<char>,
}

/// Per-frame appearance of a dot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DotVisual {
    pub opacity: f32,
    pub scale: f32,
    /// Translation from the dot's origin
    pub offset: Vec2,
    pub color: Rgba,
}

impl Default for DotVisual {
    fn default() -> Self {
        Self {
            opacity: 0.0,
            scale: 1.0,
            offset: Vec2::ZERO,
            color: Rgb::default().with_alpha(DOT_ALPHA),
        }
    }
}

/// The dot grid plus the visuals computed on the last frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DotField {
    pub spacing: f32,
    pub cols: usize,
    pub rows: usize,
    dots: Vec<Dot>,
    visuals: Vec<DotVisual>,
}

impl DotField {
    /// Build a grid covering `viewport`, with a dot on both edges
    pub fn new(viewport: Viewport, spacing: f32) -> Self {
        let spacing = spacing.max(1.0);
        let cols = (viewport.width.max(0.0) / spacing).ceil() as usize + 1;
        let rows = (viewport.height.max(0.0) / spacing).ceil() as usize + 1;

        let mut dots = Vec::with_capacity(cols * rows);
        for row in 0..rows {
            for col in 0..cols {
                dots.push(Dot {
                    origin: Vec2::new(col as f32 * spacing, row as f32 * spacing),
                    glyph: None,
                });
            }
        }

        Self {
            spacing,
            cols,
            rows,
            visuals: vec![DotVisual::default(); dots.len()],
            dots,
        }
    }

    /// Give every dot a random glyph from `glyphs` (or none for circles)
    pub fn assign_glyphs<R: Rng + ?Sized>(&mut self, rng: &mut R, glyphs: DotGlyphs) {
        let chars = glyphs.characters();
        for dot in self.dots.iter_mut() {
            dot.glyph = if chars.is_empty() {
                None
            } else {
                Some(chars[rng.random_range(0..chars.len())])
            };
        }
    }

    pub fn len(&self) -> usize {
        self.dots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dots.is_empty()
    }

    pub fn dots(&self) -> &[Dot] {
        &self.dots
    }

    /// Visuals from the most recent `update`
    pub fn visuals(&self) -> &[DotVisual] {
        &self.visuals
    }

    /// Dot at grid coordinates
    pub fn get(&self, col: usize, row: usize) -> Option<&Dot> {
        if col >= self.cols || row >= self.rows {
            return None;
        }
        self.dots.get(row * self.cols + col)
    }

    /// Distance from `pos` to the closest dot
    pub fn nearest_dot_distance(&self, pos: Vec2) -> f32 {
        if self.dots.is_empty() {
            return f32::INFINITY;
        }
        let snap = |v: f32, count: usize| -> f32 {
            let max = (count - 1) as f32;
            (v / self.spacing).round().clamp(0.0, max) * self.spacing
        };
        pos.distance(Vec2::new(snap(pos.x, self.cols), snap(pos.y, self.rows)))
    }

    /// True when a cursor at `pos` would visibly disturb the field
    pub fn is_influenced_by(&self, pos: Vec2, behavior: &DotBehavior) -> bool {
        self.nearest_dot_distance(pos) < behavior.push_radius
    }

    /// Recompute every dot's visual for this frame
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        cursor: Vec2,
        nearest_hazard: f32,
        theme: &Theme,
        background: Rgb,
    ) {
        let behavior = &theme.dots;
        let danger = danger_intensity(nearest_hazard, behavior.danger_zone);
        let shake = shake_amplitude(danger, behavior);
        let calm_color = dot_color(theme, background, 0.0);
        let danger_color = dot_color(theme, background, danger);

        for (dot, visual) in self.dots.iter().zip(self.visuals.iter_mut()) {
            let d = cursor.distance(dot.origin);
            // Danger effects only reach dots the cursor is pushing
            let pushed = d < behavior.push_radius;

            let mut offset = push_offset(cursor, dot.origin, behavior);
            if pushed && shake > 0.0 {
                offset += jitter(rng, shake);
            }
            if behavior.base_jitter_amount > 0.0 {
                offset += jitter(rng, behavior.base_jitter_amount);
            }

            *visual = DotVisual {
                opacity: opacity(d, behavior),
                scale: scale(d, behavior),
                offset,
                color: if pushed { danger_color } else { calm_color },
            };
        }
    }
}

/// 0 outside the danger zone, rising linearly to 1 at the hazard
pub fn danger_intensity(nearest_hazard: f32, danger_zone: f32) -> f32 {
    falloff(nearest_hazard, danger_zone)
}

/// Fully opaque near the cursor, linear fade to 0 at the visibility radius
pub fn opacity(d: f32, b: &DotBehavior) -> f32 {
    if d < b.full_visibility_radius {
        1.0
    } else if d < b.visibility_radius {
        1.0 - (d - b.full_visibility_radius) / (b.visibility_radius - b.full_visibility_radius)
    } else {
        0.0
    }
}

/// `max_scale` at the cursor, linear back to 1 at the falloff radius
pub fn scale(d: f32, b: &DotBehavior) -> f32 {
    let radius = b.scale_radius.max(b.visibility_radius);
    if radius <= 0.0 {
        return 1.0;
    }
    let clamped = d.min(radius);
    1.0 + (1.0 - clamped / radius) * (b.max_scale - 1.0)
}

/// Displacement pushing a dot away from the cursor
pub fn push_offset(cursor: Vec2, origin: Vec2, b: &DotBehavior) -> Vec2 {
    let d = cursor.distance(origin);
    if d >= b.push_radius {
        return Vec2::ZERO;
    }
    let strength = (1.0 - d / b.push_radius) * b.max_push_distance;
    let to_cursor = cursor - origin;
    let angle = to_cursor.y.atan2(to_cursor.x);
    Vec2::new(-angle.cos(), -angle.sin()) * strength
}

/// Peak-to-peak shake for a given danger intensity
pub fn shake_amplitude(danger: f32, b: &DotBehavior) -> f32 {
    if danger <= 0.0 {
        return 0.0;
    }
    danger.powf(b.danger_shake_exponent) * b.danger_shake_amount * b.hazard_jitter_boost
}

/// Dot color for the current background and danger level
pub fn dot_color(theme: &Theme, background: Rgb, danger: f32) -> Rgba {
    let base = theme.dot_base_color(background);
    if danger <= 0.0 {
        return base.with_alpha(DOT_ALPHA);
    }
    let red = (danger.clamp(0.0, 1.0) * 220.0).floor() as u8;
    Rgb {
        r: base.r.saturating_add(80),
        g: base.g.saturating_sub(red),
        b: base.b.saturating_sub(red),
    }
    .with_alpha(DANGER_DOT_ALPHA)
}

/// Uniform offset in [-amount/2, amount/2) on each axis
fn jitter<R: Rng + ?Sized>(rng: &mut R, amount: f32) -> Vec2 {
    Vec2::new(
        (rng.random::<f32>() - 0.5) * amount,
        (rng.random::<f32>() - 0.5) * amount,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::ThemePreset;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn behavior() -> DotBehavior {
        ThemePreset::Classic.theme().dots
    }

    #[test]
    fn test_grid_dimensions() {
        let field = DotField::new(
            Viewport {
                width: 800.0,
                height: 610.0,
            },
            40.0,
        );
        assert_eq!(field.cols, 21);
        assert_eq!(field.rows, 17);
        assert_eq!(field.len(), 21 * 17);
        assert_eq!(field.get(0, 0).unwrap().origin, Vec2::ZERO);
        assert_eq!(field.get(20, 16).unwrap().origin, Vec2::new(800.0, 640.0));
        assert!(field.get(21, 0).is_none());
    }

    #[test]
    fn test_opacity_curve() {
        let b = behavior();
        assert_eq!(opacity(0.0, &b), 1.0);
        assert_eq!(opacity(99.9, &b), 1.0);
        assert!((opacity(175.0, &b) - 0.5).abs() < 1e-6);
        assert_eq!(opacity(250.0, &b), 0.0);
        assert_eq!(opacity(1000.0, &b), 0.0);
    }

    #[test]
    fn test_scale_curve() {
        let b = behavior();
        // Falloff runs over max(150, 250) = 250
        assert!((scale(0.0, &b) - 1.5).abs() < 1e-6);
        assert!((scale(125.0, &b) - 1.25).abs() < 1e-6);
        assert_eq!(scale(250.0, &b), 1.0);
        assert_eq!(scale(600.0, &b), 1.0);
    }

    #[test]
    fn test_push_points_away_from_cursor() {
        let b = behavior();
        let cursor = Vec2::new(100.0, 100.0);
        let origin = Vec2::new(175.0, 100.0);
        let offset = push_offset(cursor, origin, &b);
        // Half way into the push radius: half the max push, directed +x
        assert!((offset.x - 30.0).abs() < 1e-4);
        assert!(offset.y.abs() < 1e-4);

        let far = push_offset(cursor, Vec2::new(400.0, 100.0), &b);
        assert_eq!(far, Vec2::ZERO);
    }

    #[test]
    fn test_shake_power_curve() {
        let b = behavior();
        assert_eq!(shake_amplitude(0.0, &b), 0.0);
        assert!((shake_amplitude(1.0, &b) - 20.0 * 1.6).abs() < 1e-4);
        let quarter = shake_amplitude(0.25, &b);
        assert!((quarter - 0.125 * 20.0 * 1.6).abs() < 1e-4);
    }

    #[test]
    fn test_danger_intensity() {
        assert_eq!(danger_intensity(f32::INFINITY, 200.0), 0.0);
        assert_eq!(danger_intensity(200.0, 200.0), 0.0);
        assert!((danger_intensity(50.0, 200.0) - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_dot_color_tints_red_in_danger() {
        let theme = ThemePreset::Classic.theme();
        let calm = dot_color(&theme, Rgb::default(), 0.0);
        assert_eq!(calm.rgb, Rgb::new(215, 239, 255));
        assert_eq!(calm.a, DOT_ALPHA);

        let hot = dot_color(&theme, Rgb::default(), 0.5);
        assert_eq!(hot.rgb, Rgb::new(255, 129, 145));
        assert_eq!(hot.a, DANGER_DOT_ALPHA);
    }

    #[test]
    fn test_update_without_danger_or_jitter_is_exact() {
        let mut theme = ThemePreset::Classic.theme();
        theme.dots.base_jitter_amount = 0.0;
        let mut field = DotField::new(
            Viewport {
                width: 400.0,
                height: 400.0,
            },
            40.0,
        );
        let mut rng = Pcg32::seed_from_u64(7);
        let cursor = Vec2::new(200.0, 200.0);
        field.update(&mut rng, cursor, f32::INFINITY, &theme, Rgb::default());

        for (dot, visual) in field.dots().iter().zip(field.visuals()) {
            assert_eq!(visual.offset, push_offset(cursor, dot.origin, &theme.dots));
            assert_eq!(visual.opacity, opacity(cursor.distance(dot.origin), &theme.dots));
        }
    }

    #[test]
    fn test_base_jitter_bounded() {
        let theme = ThemePreset::Classic.theme();
        let mut field = DotField::new(
            Viewport {
                width: 400.0,
                height: 400.0,
            },
            40.0,
        );
        let mut rng = Pcg32::seed_from_u64(8);
        // Cursor far away: no push, only the 2px base jitter
        field.update(
            &mut rng,
            Vec2::new(-1000.0, -1000.0),
            f32::INFINITY,
            &theme,
            Rgb::default(),
        );
        for visual in field.visuals() {
            assert!(visual.offset.x.abs() <= 1.0 && visual.offset.y.abs() <= 1.0);
            assert_eq!(visual.opacity, 0.0);
        }
    }

    #[test]
    fn test_influence_uses_nearest_dot() {
        let field = DotField::new(
            Viewport {
                width: 400.0,
                height: 400.0,
            },
            40.0,
        );
        let b = behavior();
        assert!(field.is_influenced_by(Vec2::new(200.0, 200.0), &b));
        assert!((field.nearest_dot_distance(Vec2::new(-30.0, 0.0)) - 30.0).abs() < 1e-4);
        assert!(!field.is_influenced_by(Vec2::new(-1000.0, -1000.0), &b));
    }

    #[test]
    fn test_danger_stays_inside_push_radius() {
        let mut theme = ThemePreset::Classic.theme();
        theme.dots.base_jitter_amount = 0.0;
        let mut field = DotField::new(
            Viewport {
                width: 800.0,
                height: 800.0,
            },
            40.0,
        );
        let mut rng = Pcg32::seed_from_u64(9);
        let cursor = Vec2::new(400.0, 400.0);
        // Hazard 20px from the cursor
        field.update(&mut rng, cursor, 20.0, &theme, Rgb::default());

        // 200px away: visible but outside the 150px push radius
        let outside = field.visuals()[5 * field.cols + 10];
        assert!(outside.opacity > 0.0);
        assert_eq!(outside.offset, Vec2::ZERO);
        assert_eq!(outside.color.a, DOT_ALPHA);
        assert_eq!(outside.color.rgb, Rgb::new(215, 239, 255));

        // 40px away: shaken and tinted
        let inside = field.visuals()[9 * field.cols + 10];
        assert_eq!(inside.color.a, DANGER_DOT_ALPHA);
        let push = push_offset(cursor, Vec2::new(400.0, 360.0), &theme.dots);
        assert_ne!(inside.offset, push);
    }

    #[test]
    fn test_base_jitter_outside_push_radius() {
        let theme = ThemePreset::Classic.theme();
        let mut field = DotField::new(
            Viewport {
                width: 800.0,
                height: 800.0,
            },
            40.0,
        );
        let mut rng = Pcg32::seed_from_u64(10);
        field.update(&mut rng, Vec2::new(400.0, 400.0), 20.0, &theme, Rgb::default());
        let outside = field.visuals()[5 * field.cols + 10];
        assert!(outside.offset.x.abs() <= 1.0 && outside.offset.y.abs() <= 1.0);
        assert_eq!(outside.color.a, DOT_ALPHA);
    }

    #[test]
    fn test_assign_glyphs() {
        let mut field = DotField::new(
            Viewport {
                width: 200.0,
                height: 200.0,
            },
            40.0,
        );
        assert!(field.dots().iter().all(|d| d.glyph.is_none()));

        let mut rng = Pcg32::seed_from_u64(11);
        field.assign_glyphs(&mut rng, DotGlyphs::Symbols);
        let symbols = DotGlyphs::Symbols.characters();
        assert!(field
            .dots()
            .iter()
            .all(|d| d.glyph.is_some_and(|c| symbols.contains(&c))));

        field.assign_glyphs(&mut rng, DotGlyphs::Circles);
        assert!(field.dots().iter().all(|d| d.glyph.is_none()));
    }

    proptest! {
        #[test]
        fn prop_opacity_monotonic(a in 0.0f32..600.0, b in 0.0f32..600.0) {
            let beh = behavior();
            let (near, far) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(opacity(near, &beh) >= opacity(far, &beh));
            prop_assert!((0.0..=1.0).contains(&opacity(near, &beh)));
        }
    }
}
