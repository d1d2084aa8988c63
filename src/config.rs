// Dashboard configuration, injected into the report builders instead of a
// process-wide color map.
use crate::error::{ReportError, Result};
use crate::types::{Category, Status};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::Path;

static DEFAULT_CONFIG: Lazy<DashboardConfig> = Lazy::new(DashboardConfig::default);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub abasto: String,
    pub entregado: String,
    pub dh: String,
    pub superficie: String,
    /// Donut background and empty progress track.
    pub gris: String,
}

impl Default for Palette {
    fn default() -> Self {
        Palette {
            abasto: "#004634".to_string(),
            entregado: "#146B4D".to_string(),
            dh: "#6A1B3F".to_string(),
            superficie: "#A1760E".to_string(),
            gris: "#e0e0e0".to_string(),
        }
    }
}

impl Palette {
    pub fn color(&self, category: Category) -> &str {
        match category {
            Category::Supply => &self.abasto,
            Category::Delivered => &self.entregado,
            Category::Beneficiaries => &self.dh,
            Category::Surface => &self.superficie,
        }
    }
}

/// Percent cut-offs for the traffic light.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub green: f64,
    pub amber: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds {
            green: 90.0,
            amber: 70.0,
        }
    }
}

impl Thresholds {
    pub fn status(&self, percent: f64) -> Status {
        if percent >= self.green {
            Status::Green
        } else if percent >= self.amber {
            Status::Amber
        } else {
            Status::Red
        }
    }
}

/// Goals to show when the national payload reports none for a category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackGoals {
    pub beneficiaries: Option<f64>,
    pub surface: Option<f64>,
}

impl FallbackGoals {
    pub fn for_category(&self, category: Category) -> Option<f64> {
        match category {
            Category::Beneficiaries => self.beneficiaries,
            Category::Surface => self.surface,
            Category::Supply | Category::Delivered => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub palette: Palette,
    pub thresholds: Thresholds,
    pub rank_by: Category,
    pub fallback_goals: FallbackGoals,
    pub card_percent_decimals: usize,
    pub table_percent_decimals: usize,
    /// Bars narrower than this get a dark label.
    pub dark_label_below: f64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            palette: Palette::default(),
            thresholds: Thresholds::default(),
            rank_by: Category::Delivered,
            fallback_goals: FallbackGoals::default(),
            card_percent_decimals: 0,
            table_percent_decimals: 1,
            dark_label_below: 20.0,
        }
    }
}

impl DashboardConfig {
    /// Shared default instance for callers that don't carry their own.
    pub fn default_ref() -> &'static DashboardConfig {
        &DEFAULT_CONFIG
    }

    pub fn from_json(s: &str) -> Result<Self> {
        let cfg: DashboardConfig = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let s = std::fs::read_to_string(path)?;
        let cfg = Self::from_json(&s)?;
        tracing::info!(path = %path.display(), "loaded dashboard config");
        Ok(cfg)
    }

    fn validate(&self) -> Result<()> {
        let t = self.thresholds;
        if !t.green.is_finite() || !t.amber.is_finite() || t.amber > t.green {
            return Err(ReportError::Config(format!(
                "thresholds must be finite with amber <= green (amber={}, green={})",
                t.amber, t.green
            )));
        }
        for (name, goal) in [
            ("beneficiaries", self.fallback_goals.beneficiaries),
            ("surface", self.fallback_goals.surface),
        ] {
            if let Some(g) = goal {
                if !g.is_finite() || g < 0.0 {
                    return Err(ReportError::Config(format!(
                        "fallback goal for {} must be a non-negative number, got {}",
                        name, g
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = DashboardConfig::from_json(
            r##"{"palette": {"dh": "#000000"}, "rank_by": "beneficiaries"}"##,
        )
        .unwrap();
        assert_eq!(cfg.palette.dh, "#000000");
        assert_eq!(cfg.palette.abasto, "#004634");
        assert_eq!(cfg.rank_by, Category::Beneficiaries);
        assert_eq!(cfg.table_percent_decimals, 1);
    }

    #[test]
    fn rejects_inverted_thresholds() {
        let err = DashboardConfig::from_json(r#"{"thresholds": {"green": 50, "amber": 80}}"#)
            .unwrap_err();
        assert!(matches!(err, ReportError::Config(_)));
    }

    #[test]
    fn rejects_negative_fallback_goal() {
        let err = DashboardConfig::from_json(r#"{"fallback_goals": {"surface": -1}}"#)
            .unwrap_err();
        assert!(matches!(err, ReportError::Config(_)));
    }

    #[test]
    fn traffic_light_cutoffs() {
        let t = Thresholds::default();
        assert_eq!(t.status(90.0), Status::Green);
        assert_eq!(t.status(89.99), Status::Amber);
        assert_eq!(t.status(70.0), Status::Amber);
        assert_eq!(t.status(12.0), Status::Red);
        assert_eq!(t.status(140.0), Status::Green);
    }
}
