//! Daily health tip rotation.

use rand::Rng;
use serde::Serialize;

/// One dashboard tip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Tip {
    pub topic: &'static str,
    pub text: &'static str,
}

/// The fixed tip pool.
pub const TIPS: [Tip; 3] = [
    Tip {
        topic: "hydration",
        text: "Drink 8-10 glasses of water daily",
    },
    Tip {
        topic: "sleep",
        text: "Get 7-8 hours of sleep",
    },
    Tip {
        topic: "nutrition",
        text: "Eat 5 servings of fruits & vegetables",
    },
];

/// Pick the tip to show, uniformly at random.
pub fn daily_tip(rng: &mut impl Rng) -> &'static Tip {
    &TIPS[rng.gen_range(0..TIPS.len())]
}
