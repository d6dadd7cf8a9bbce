//! Tray icon generation.

use crate::models::Theme;
use thiserror::Error;
use tray_icon::Icon;

const ICON_SIZE: u32 = 22;

#[derive(Error, Debug)]
pub enum TrayError {
    #[error("Failed to load icon: {0}")]
    IconLoad(#[from] tray_icon::BadIcon),
}

struct Palette {
    ring: [u8; 3],
    stem: Option<[u8; 3]>,
}

fn palette(theme: Theme) -> Palette {
    match theme {
        Theme::Light => Palette {
            ring: [220, 50, 47],
            stem: Some([76, 153, 0]),
        },
        Theme::Dark => Palette {
            ring: [255, 107, 107],
            stem: None,
        },
    }
}

/// Draws a ring with a centre dot, anti-aliased, as RGBA bytes.
pub fn icon_rgba(theme: Theme) -> Vec<u8> {
    let size = ICON_SIZE;
    let colors = palette(theme);
    let mut rgba = Vec::with_capacity((size * size * 4) as usize);

    let center = size as f32 / 2.0;
    let outer = center - 2.0;
    let inner = outer - 2.0;
    let dot = 3.0;

    for y in 0..size {
        for x in 0..size {
            let dx = x as f32 + 0.5 - center;
            let dy = y as f32 + 0.5 - center;
            let distance = (dx * dx + dy * dy).sqrt();

            // Coverage of the ring and the dot, with a one pixel soft edge.
            let ring = edge(outer - distance) * edge(distance - inner);
            let centre = edge(dot - distance);
            let alpha = ring.max(centre);

            let [r, g, b] = colors.ring;
            rgba.extend_from_slice(&[r, g, b, (alpha * 255.0) as u8]);
        }
    }

    if let Some([r, g, b]) = colors.stem {
        let stem_center = size / 2;
        for y in 0..3 {
            for x in (stem_center - 1)..=(stem_center + 1) {
                let idx = ((y * size + x) * 4) as usize;
                rgba[idx..idx + 4].copy_from_slice(&[r, g, b, 255]);
            }
        }
    }

    rgba
}

fn edge(signed_distance: f32) -> f32 {
    (signed_distance + 0.5).clamp(0.0, 1.0)
}

/// Builds the tray icon for a theme.
pub fn load_icon(theme: Theme) -> Result<Icon, TrayError> {
    Icon::from_rgba(icon_rgba(theme), ICON_SIZE, ICON_SIZE).map_err(TrayError::IconLoad)
}
