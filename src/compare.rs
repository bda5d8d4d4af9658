//! Launch versus Scale plan comparison.
//!
//! Launch is a flat yearly fee plus one fixed percentage of revenue and
//! is only sold to single-location customers.  Scale charges a fixed
//! fee per location and a take rate chosen by the customer's revenue
//! tier.  The comparator prices both for the same inputs and recommends
//! the cheaper one.

use crate::engine::{effective_rate, PricingEngine};
use crate::models::{
    LaunchConfig, LaunchQuote, PlanComparison, Recommendation, ScaleConfig, ScaleQuote, ScaleTier,
};
use serde::{Deserialize, Serialize};

/// A named set of Launch and Scale terms, as loaded from a catalog file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanCatalog {
    pub name: String,
    pub launch: LaunchConfig,
    pub scale: ScaleConfig,
    #[serde(default)]
    pub tiers: Vec<ScaleTier>,
}

impl PlanCatalog {
    pub fn compare(
        &self,
        engine: &PricingEngine,
        annual_revenue: f64,
        location_count: u32,
        is_launch_available: bool,
    ) -> PlanComparison {
        engine.compare_pricing(
            annual_revenue,
            location_count,
            &self.launch,
            &self.scale,
            &self.tiers,
            is_launch_available,
        )
    }
}

/// Picks the Scale terms for `tier`: the exact row, else the closest
/// lower row, else the baseline config.
fn scale_terms(tier: u8, scale: &ScaleConfig, table: &[ScaleTier]) -> (f64, f64) {
    table
        .iter()
        .filter(|row| row.tier <= tier)
        .max_by_key(|row| row.tier)
        .map(|row| (row.fixed_fee, row.take_rate))
        .unwrap_or((scale.fixed_cost_yearly, scale.take_rate))
}

impl PricingEngine {
    /// Prices both plans for one customer and recommends the cheaper.
    ///
    /// Launch is only on offer when `is_launch_available` holds and the
    /// customer has exactly one location.  An unavailable Launch quote
    /// is still returned, flagged, and the recommendation is Scale with
    /// no savings reported.  Ties go to Scale.
    pub fn compare_pricing(
        &self,
        annual_revenue: f64,
        location_count: u32,
        launch: &LaunchConfig,
        scale: &ScaleConfig,
        scale_tiers: &[ScaleTier],
        is_launch_available: bool,
    ) -> PlanComparison {
        let launch_revenue_cost = annual_revenue * launch.revenue_percentage / 100.0;
        let launch_total = launch.fixed_cost_yearly + launch_revenue_cost;
        let launch_quote = LaunchQuote {
            available: is_launch_available && location_count == 1,
            fixed_cost_yearly: launch.fixed_cost_yearly,
            revenue_cost: launch_revenue_cost,
            total_yearly: launch_total,
            effective_rate: effective_rate(launch_total, annual_revenue),
        };

        let tier = self.config().tiers.detect_tier(annual_revenue);
        let (fixed_fee, take_rate) = scale_terms(tier, scale, scale_tiers);
        let total_fixed_yearly = fixed_fee * f64::from(location_count);
        let scale_revenue_cost = annual_revenue * take_rate / 100.0;
        let scale_total = total_fixed_yearly + scale_revenue_cost;
        let scale_quote = ScaleQuote {
            tier,
            total_fixed_yearly,
            revenue_cost: scale_revenue_cost,
            total_yearly: scale_total,
            effective_rate: effective_rate(scale_total, annual_revenue),
            tier_take_rate: take_rate,
        };

        let (recommendation, savings_amount, savings_percentage) = if launch_quote.available {
            let recommendation = if launch_total < scale_total {
                Recommendation::Launch
            } else {
                Recommendation::Scale
            };
            let high = launch_total.max(scale_total);
            let savings = high - launch_total.min(scale_total);
            let percentage = if high > 0.0 { savings / high * 100.0 } else { 0.0 };
            (recommendation, savings, percentage)
        } else {
            (Recommendation::Scale, 0.0, 0.0)
        };

        tracing::debug!(
            annual_revenue,
            location_count,
            tier,
            ?recommendation,
            "compared plans"
        );

        PlanComparison {
            launch: launch_quote,
            scale: scale_quote,
            recommendation,
            savings_amount,
            savings_percentage,
        }
    }
}
