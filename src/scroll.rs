//! Scroll loop model and page-side scroll stepping
//!
//! The live loop advances `scrollingElement.scrollTop` inside the page and
//! reads back a [`ScrollSnapshot`] per step. The same arithmetic is exposed
//! as a pure [`ScrollPlan`] so the loop's termination behavior is testable
//! without a browser.

use serde::Deserialize;

/// Page state reported by one scroll step.
///
/// All three values come from the same evaluation, so they are a consistent
/// view of the page: the offset after the advance, the live viewport height,
/// and the current total document height (which grows as lazy content loads).
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollSnapshot {
    pub offset: f64,
    pub viewport_height: f64,
    pub page_height: f64,
}

impl ScrollSnapshot {
    /// Whether another advance is needed to reach the bottom.
    pub fn has_more(&self) -> bool {
        self.offset + self.viewport_height < self.page_height
    }
}

/// Build the page-side expression that advances the scroll offset by `step`
/// pixels and reports the resulting state.
///
/// A step of zero probes the current state without moving the page. The
/// engine clamps `scrollTop` to the maximum scrollable offset, so the
/// reported offset is what the page actually landed on.
pub fn step_script(step: u32) -> String {
    format!(
        r#"(() => {{
            const el = document.scrollingElement || document.documentElement;
            el.scrollTop = el.scrollTop + {step};
            return {{
                offset: el.scrollTop,
                viewportHeight: window.innerHeight,
                pageHeight: el.scrollHeight,
            }};
        }})()"#
    )
}

/// Pure model of the scroll loop over a page of fixed geometry.
///
/// For page height `H`, viewport height `V`, and step `S`, the loop performs
/// `ceil((H - V) / S)` advances when `H > V` and none otherwise, with the
/// offset clamped to `H - V` the way a real engine clamps `scrollTop`.
#[derive(Debug, Clone, Copy)]
pub struct ScrollPlan {
    pub step: u64,
    pub viewport_height: u64,
    pub page_height: u64,
}

impl ScrollPlan {
    pub fn new(step: u64, viewport_height: u64, page_height: u64) -> Self {
        Self {
            step,
            viewport_height,
            page_height,
        }
    }

    /// Maximum offset the engine will allow.
    pub fn max_offset(&self) -> u64 {
        self.page_height.saturating_sub(self.viewport_height)
    }

    /// The sequence of offsets the loop visits, in order.
    pub fn offsets(&self) -> Vec<u64> {
        let mut out = Vec::new();
        let mut offset = 0u64;

        while offset + self.viewport_height < self.page_height {
            offset = (offset + self.step).min(self.max_offset());
            out.push(offset);
        }

        out
    }

    /// Number of scroll advances the loop performs.
    pub fn advances(&self) -> usize {
        if self.page_height <= self.viewport_height {
            return 0;
        }
        let distance = self.page_height - self.viewport_height;
        ((distance + self.step - 1) / self.step) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_page_never_scrolls() {
        let plan = ScrollPlan::new(500, 766, 700);
        assert_eq!(plan.advances(), 0);
        assert!(plan.offsets().is_empty());

        // Exactly one viewport tall is also already at the bottom.
        let exact = ScrollPlan::new(500, 766, 766);
        assert_eq!(exact.advances(), 0);
    }

    #[test]
    fn advance_count_matches_offsets() {
        for (step, viewport, height) in [
            (500u64, 766u64, 2000u64),
            (500, 766, 767),
            (500, 766, 10_000),
            (250, 1080, 5000),
            (1000, 800, 1801),
        ] {
            let plan = ScrollPlan::new(step, viewport, height);
            assert_eq!(
                plan.offsets().len(),
                plan.advances(),
                "step={step} viewport={viewport} height={height}"
            );
        }
    }

    #[test]
    fn results_page_of_height_2000() {
        // Viewport 766, step 500: three advances reach the bottom.
        let plan = ScrollPlan::new(500, 766, 2000);
        assert_eq!(plan.advances(), 3);
        assert_eq!(plan.offsets(), vec![500, 1000, 1234]);
    }

    #[test]
    fn offsets_are_monotonic_and_terminate_at_bottom() {
        let plan = ScrollPlan::new(500, 766, 10_000);
        let offsets = plan.offsets();

        let mut previous = 0;
        for &offset in &offsets {
            assert!(offset > previous, "offset never decreases");
            assert!(offset <= plan.max_offset(), "engine clamp is respected");
            previous = offset;
        }

        let last = *offsets.last().unwrap();
        assert!(last + plan.viewport_height >= plan.page_height);
        // The loop never runs past the first offset that reaches the bottom.
        assert!(last.saturating_sub(plan.step) < plan.max_offset());
    }

    #[test]
    fn step_script_embeds_step() {
        let script = step_script(500);
        assert!(script.contains("el.scrollTop + 500"));
        assert!(script.contains("scrollingElement"));

        let probe = step_script(0);
        assert!(probe.contains("el.scrollTop + 0"));
    }
}
