//! Render keymap layers as a text grid or as an HTML/SVG page.
//!
//! Geometry comes from the two halves' matrices: every cell with a position
//! is a key, left half drawn first, right half beside it.

use splitkb_keymap::{mods, Code, Keycode, Keymap};

/// One drawable key.
struct Key {
    x: f64,
    y: f64,
    position: u8,
}

/// Key unit size in SVG pixels.
const U: f64 = 54.0;
/// Gap between keys.
const GAP: f64 = 4.0;
/// Step: key + gap.
const S: f64 = U + GAP;
/// Key corner radius.
const R: f64 = 4.0;
/// Spacing between left and right halves.
const HALF_GAP: f64 = 60.0;
/// Margin around the SVG content.
const MARGIN: f64 = 20.0;
/// Text grid cell width.
const CELL: usize = 6;

/// Short label for a keymap entry. Empty for transparent entries.
pub fn code_label(code: Code) -> String {
    if code.is_transparent() {
        return String::new();
    }
    if let Some(layer) = code.layer_number() {
        return format!("L{}", layer);
    }

    let low = (code.raw() & 0xFF) as u8;
    let name = match Keycode::from_u8(low) {
        Some(kc) => kc.display_name().to_string(),
        None => format!("{:#04X}", low),
    };
    let extra = (code.raw() >> 8) as u8;
    if extra == 0 {
        return name;
    }
    format!("{}({})", mods_prefix(extra), name)
}

fn mods_prefix(bits: u8) -> String {
    let mut prefix = String::new();
    if bits & (mods::LCTRL | mods::RCTRL) != 0 {
        prefix.push('C');
    }
    if bits & (mods::LSHIFT | mods::RSHIFT) != 0 {
        prefix.push('S');
    }
    if bits & (mods::LALT | mods::RALT) != 0 {
        prefix.push('A');
    }
    if bits & (mods::LGUI | mods::RGUI) != 0 {
        prefix.push('G');
    }
    prefix
}

/// Label shown for `position` on `layer`: transparent entries show what they
/// fall through to in parentheses, or `-` when nothing below defines them.
fn shown_label(keymap: &Keymap<'_>, layer: usize, position: u8) -> String {
    match keymap.get(layer, position) {
        Some(code) if code.is_transparent() => match keymap.lookup(layer, position) {
            Some(resolved) => format!("({})", code_label(resolved)),
            None => "-".to_string(),
        },
        Some(code) => code_label(code),
        None => String::new(),
    }
}

/// Render one layer as a plain-text grid, halves side by side.
pub fn render_text(
    keymap: &Keymap<'_>,
    layer: usize,
    left: &[&[u8]],
    right: &[&[u8]],
) -> String {
    let mut out = format!("Layer {}\n", layer);
    let rows = left.len().max(right.len());

    for row in 0..rows {
        let mut line = String::new();
        for (half, matrix) in [left, right].iter().enumerate() {
            if half == 1 {
                line.push_str("   ");
            }
            let cells = matrix.get(row).copied().unwrap_or(&[]);
            line.push('|');
            for &position in cells {
                let label = if position == 0 {
                    String::new()
                } else {
                    shown_label(keymap, layer, position)
                };
                let label: String = label.chars().take(CELL).collect();
                line.push_str(&format!("{:^width$}|", label, width = CELL));
            }
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

fn build_keys(left: &[&[u8]], right: &[&[u8]]) -> Vec<Key> {
    let left_cols = left.iter().map(|r| r.len()).max().unwrap_or(0);
    let right_x = left_cols as f64 * S + HALF_GAP;

    let mut keys = Vec::new();
    for (matrix, bx) in [(left, 0.0), (right, right_x)] {
        for (row, cells) in matrix.iter().enumerate() {
            for (col, &position) in cells.iter().enumerate() {
                if position == 0 {
                    continue;
                }
                keys.push(Key {
                    x: bx + col as f64 * S,
                    y: row as f64 * S,
                    position,
                });
            }
        }
    }
    keys
}

/// Compute the bounding box of all keys: (max_x + w, max_y + h).
fn bbox(keys: &[Key]) -> (f64, f64) {
    let mut max_x: f64 = 0.0;
    let mut max_y: f64 = 0.0;
    for k in keys {
        max_x = max_x.max(k.x + U);
        max_y = max_y.max(k.y + U);
    }
    (max_x, max_y)
}

fn render_layer(keymap: &Keymap<'_>, keys: &[Key], layer: usize, y_offset: f64) -> String {
    let mut svg = String::new();

    svg.push_str(&format!(
        r#"<g transform="translate({MARGIN}, {y_offset})">"#
    ));
    svg.push_str(&format!(
        r#"<text x="0" y="-10" class="layer-title">Layer {layer}{}</text>"#,
        if layer == 0 { " (Base)" } else { "" }
    ));

    for key in keys {
        let code = keymap.get(layer, key.position).unwrap_or(Code::TRANS);
        let key_class = if code.is_transparent() && layer == 0 {
            "key unused"
        } else if code.is_transparent() {
            "key transparent"
        } else if code.is_layer() {
            "key layer"
        } else if code.is_modifier() {
            "key modifier"
        } else {
            "key"
        };
        let label = shown_label(keymap, layer, key.position);

        svg.push_str(&format!(
            r#"<rect x="{}" y="{}" width="{U}" height="{U}" rx="{R}" class="{key_class}"/>"#,
            key.x, key.y,
        ));
        if !label.is_empty() && label != "-" {
            let font_class = if label.len() > 3 { " small" } else { "" };
            svg.push_str(&format!(
                r#"<text x="{}" y="{}" class="label{font_class}">{}</text>"#,
                key.x + U / 2.0,
                key.y + U / 2.0 + 1.0,
                html_escape(&label),
            ));
        }
    }

    svg.push_str("</g>");
    svg
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Complete HTML document with every layer as inline SVG.
pub fn generate_html(keymap: &Keymap<'_>, left: &[&[u8]], right: &[&[u8]]) -> String {
    let keys = build_keys(left, right);
    let (content_w, content_h) = bbox(&keys);
    let layer_height = content_h + 60.0;
    let total_width = content_w + 2.0 * MARGIN;
    let total_height = keymap.num_layers() as f64 * layer_height + 2.0 * MARGIN;

    let mut html = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Split keyboard layout</title>
<style>
  body {{ background: #1a1a2e; color: #eee; font-family: system-ui, sans-serif; padding: 2em; }}
  .key {{ fill: #16213e; stroke: #0f3460; stroke-width: 1.5; }}
  .key.unused {{ fill: #0d1117; stroke: #21262d; stroke-dasharray: 3 3; }}
  .key.transparent {{ fill: #1a1a2e; stroke: #30365e; stroke-dasharray: 2 2; }}
  .key.layer {{ fill: #2d1b4e; stroke: #e94560; stroke-width: 2; }}
  .key.modifier {{ fill: #1b2e4e; stroke: #53a8b6; }}
  .label {{ fill: #eee; font-family: monospace; font-size: 13px; text-anchor: middle; dominant-baseline: middle; }}
  .label.small {{ font-size: 10px; }}
  .layer-title {{ fill: #e94560; font-size: 16px; font-weight: bold; }}
</style>
</head>
<body>
<svg width="{total_width}" height="{total_height}" xmlns="http://www.w3.org/2000/svg">
"#
    );

    for layer in 0..keymap.num_layers() {
        let y_offset = MARGIN + layer as f64 * layer_height + 30.0;
        html.push_str(&render_layer(keymap, &keys, layer, y_offset));
        html.push('\n');
    }

    html.push_str("</svg>\n</body>\n</html>\n");
    html
}
