//! Sensor fusion: reconciling the AI label with physical evidence.
//!
//! The camera can be fooled by labels, lighting, or crushed items; the
//! inductive metal sensor and the scale cannot. [`fuse`] resolves conflicts
//! with a fixed-precedence rule table:
//!
//! 1. overweight → `Other`, unconditionally (no further rules apply)
//! 2. `Can` without metal → `Other`
//! 3. `Plastic` with metal → `Can`
//! 4. `Other` with metal → `Can`
//! 5. otherwise the AI label stands
//!
//! Rule order is significant: the weight veto pre-empts everything, and
//! metal evidence only ever pushes a result *toward* `Can`, never away
//! from it.

use log::info;

use crate::session::Label;

/// Produce the authoritative label for one scanned item.
pub fn fuse(weight_before_g: f32, metal_detected: bool, raw_label: Label, weight_limit_g: f32) -> Label {
    if weight_before_g > weight_limit_g {
        info!("fusion: rejected, too heavy ({weight_before_g:.1}g > {weight_limit_g:.1}g)");
        return Label::Other;
    }

    match (raw_label, metal_detected) {
        (Label::Can, false) => {
            info!("fusion: AI said Can but no metal, demoting to Other");
            Label::Other
        }
        (Label::Plastic, true) => {
            info!("fusion: metal detected, overriding Plastic to Can");
            Label::Can
        }
        (Label::Other, true) => {
            info!("fusion: metal detected, overriding Other to Can");
            Label::Can
        }
        (raw, _) => raw,
    }
}
