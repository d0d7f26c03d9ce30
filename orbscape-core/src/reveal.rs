/// Scroll-triggered reveal of page sections
///
/// Independent of the 3D scene: elements matching `selectors` get
/// `base_class` once. `active_class` follows the observer's `isIntersecting`,
/// with callbacks firing as an element crosses `threshold` visibility.

#[derive(Debug, Clone, PartialEq)]
pub struct RevealConfig {
    pub selectors: Vec<String>,
    pub base_class: String,
    pub active_class: String,
    /// Fraction of the element that must be visible, in `[0, 1]`
    pub threshold: f64,
}

impl RevealConfig {
    /// Selectors joined into a single `querySelectorAll` argument
    pub fn selector_list(&self) -> String {
        self.selectors.join(", ")
    }

    /// Threshold as the observer accepts it; values outside `[0, 1]` are a RangeError
    pub fn observer_threshold(&self) -> f64 {
        if self.threshold.is_nan() {
            return 0.0;
        }
        self.threshold.clamp(0.0, 1.0)
    }
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            selectors: ["section", ".hero-stats", ".panel", ".contact-card"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            base_class: "reveal".to_string(),
            active_class: "active".to_string(),
            threshold: 0.35,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_selectors() {
        let config = RevealConfig::default();
        assert_eq!(config.selector_list(), "section, .hero-stats, .panel, .contact-card");
    }

    #[test]
    fn test_default_threshold() {
        assert_eq!(RevealConfig::default().observer_threshold(), 0.35);
    }

    #[test]
    fn test_threshold_clamped() {
        let config = |threshold| RevealConfig {
            threshold,
            ..RevealConfig::default()
        };
        assert_eq!(config(1.5).observer_threshold(), 1.0);
        assert_eq!(config(-0.2).observer_threshold(), 0.0);
        assert_eq!(config(f64::NAN).observer_threshold(), 0.0);
    }
}
