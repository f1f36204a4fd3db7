//! Layer-aware translation of held keys into HID codes.
//!
//! A pass walks the whole key set in order, starting from layer 0. Layer
//! shift keys raise the current layer for every key after them and are
//! never themselves translated, so they are looked at again on every pass.
//! Keys that were translated on an earlier pass keep their result even if
//! the layer has changed since: a key means what it meant when it went down.

use splitkb_keymap::{Code, Keymap};

use crate::keys::{ActiveKey, KeyTracker};

/// Layer every pass starts from.
pub const BASE_LAYER: usize = 0;

/// Translate every untranslated key in `keys`. Returns the layer in effect
/// at the end of the pass.
pub fn translate(keys: &mut KeyTracker, keymap: &Keymap<'_>) -> usize {
    let mut layer = BASE_LAYER;

    for key in keys.iter_mut().filter(|key| !key.translated) {
        let Some(code) = keymap.lookup(layer, key.position) else {
            // Transparent all the way down, or no entry for this position.
            tracing::debug!(position = key.position, layer, "no mapping");
            continue;
        };

        if let Some(target) = code.layer_number() {
            if target < keymap.num_layers() {
                tracing::debug!(position = key.position, target, "layer shift");
                layer = target;
            }
            continue;
        }

        classify(key, code);
    }

    layer
}

/// Record what a resolved, non-layer code contributes to the report.
fn classify(key: &mut ActiveKey, code: Code) {
    let mut code = code;

    if code.is_modifier() {
        key.translated = true;
        key.has_modifiers = true;
        key.modifier_bits = code.modifier_bits();
        code = code.base();
        tracing::debug!(position = key.position, bits = key.modifier_bits, "modifier");
    }

    if code.is_key() {
        key.translated = true;
        key.is_regular_key = true;
        key.key_code = code.key_code();
        tracing::debug!(position = key.position, key_code = key.key_code, "key");
    }
}
